use serde::{Deserialize, Serialize};

/// Per-game counters, kept both per player and mirrored per team.
///
/// Integer counters accumulate whole events; `min`, `court_time`,
/// `bench_time` are minutes; `energy` is the 0-1 fatigue resource (1 =
/// fresh); `pts_qtrs` grows by one entry per period played.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub ast: u32,
    /// Shot attempts blocked by a defender.
    pub ba: u32,
    pub blk: u32,
    pub drb: u32,
    pub fg: u32,
    pub fg_at_rim: u32,
    pub fg_low_post: u32,
    pub fg_mid_range: u32,
    pub fga: u32,
    pub fga_at_rim: u32,
    pub fga_low_post: u32,
    pub fga_mid_range: u32,
    pub ft: u32,
    pub fta: u32,
    /// Games started (0 or 1 inside a single simulation).
    pub gs: u32,
    pub orb: u32,
    pub pf: u32,
    pub pts: u32,
    pub stl: u32,
    pub tov: u32,
    pub tp: u32,
    pub tpa: u32,
    /// Plus-minus; negative while the opponent outscores the lineup.
    pub pm: i64,
    pub min: f64,
    pub court_time: f64,
    pub bench_time: f64,
    pub energy: f64,
    pub pts_qtrs: Vec<u32>,
}

impl GameStats {
    pub fn new() -> Self {
        Self {
            ast: 0,
            ba: 0,
            blk: 0,
            drb: 0,
            fg: 0,
            fg_at_rim: 0,
            fg_low_post: 0,
            fg_mid_range: 0,
            fga: 0,
            fga_at_rim: 0,
            fga_low_post: 0,
            fga_mid_range: 0,
            ft: 0,
            fta: 0,
            gs: 0,
            orb: 0,
            pf: 0,
            pts: 0,
            stl: 0,
            tov: 0,
            tp: 0,
            tpa: 0,
            pm: 0,
            min: 0.0,
            court_time: 0.0,
            bench_time: 0.0,
            energy: 1.0,
            pts_qtrs: Vec::new(),
        }
    }

    pub fn trb(&self) -> u32 {
        self.orb + self.drb
    }

    pub fn fgp(&self) -> f64 {
        percentage(self.fg, self.fga)
    }

    pub fn ftp(&self) -> f64 {
        percentage(self.ft, self.fta)
    }

    pub fn tpp(&self) -> f64 {
        percentage(self.tp, self.tpa)
    }
}

fn percentage(made: u32, attempted: u32) -> f64 {
    if attempted > 0 {
        made as f64 / attempted as f64 * 100.0
    } else {
        0.0
    }
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer counters addressable by the recording path. Whole-game float
/// bookkeeping (minutes, energy) has dedicated methods on the simulator and
/// is not mirrored through this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Ast,
    Ba,
    Blk,
    Drb,
    Fg,
    FgAtRim,
    FgLowPost,
    FgMidRange,
    Fga,
    FgaAtRim,
    FgaLowPost,
    FgaMidRange,
    Ft,
    Fta,
    Gs,
    Orb,
    Pf,
    Pts,
    Stl,
    Tov,
    Tp,
    Tpa,
}

impl GameStats {
    pub fn add(&mut self, kind: StatKind, amount: u32) {
        match kind {
            StatKind::Ast => self.ast += amount,
            StatKind::Ba => self.ba += amount,
            StatKind::Blk => self.blk += amount,
            StatKind::Drb => self.drb += amount,
            StatKind::Fg => self.fg += amount,
            StatKind::FgAtRim => self.fg_at_rim += amount,
            StatKind::FgLowPost => self.fg_low_post += amount,
            StatKind::FgMidRange => self.fg_mid_range += amount,
            StatKind::Fga => self.fga += amount,
            StatKind::FgaAtRim => self.fga_at_rim += amount,
            StatKind::FgaLowPost => self.fga_low_post += amount,
            StatKind::FgaMidRange => self.fga_mid_range += amount,
            StatKind::Ft => self.ft += amount,
            StatKind::Fta => self.fta += amount,
            StatKind::Gs => self.gs += amount,
            StatKind::Orb => self.orb += amount,
            StatKind::Pf => self.pf += amount,
            StatKind::Pts => self.pts += amount,
            StatKind::Stl => self.stl += amount,
            StatKind::Tov => self.tov += amount,
            StatKind::Tp => self.tp += amount,
            StatKind::Tpa => self.tpa += amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_stats_start_with_full_energy() {
        let stats = GameStats::new();
        assert_eq!(stats.energy, 1.0);
        assert_eq!(stats.pts, 0);
        assert!(stats.pts_qtrs.is_empty());
    }

    #[test]
    fn test_percentages_guard_division_by_zero() {
        let mut stats = GameStats::new();
        assert_eq!(stats.fgp(), 0.0);

        stats.add(StatKind::Fg, 1);
        stats.add(StatKind::Fga, 2);
        assert!((stats.fgp() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_add_routes_to_the_right_counter() {
        let mut stats = GameStats::new();
        stats.add(StatKind::Tp, 3);
        stats.add(StatKind::Orb, 2);
        stats.add(StatKind::Drb, 5);
        assert_eq!(stats.tp, 3);
        assert_eq!(stats.trb(), 7);
    }
}
