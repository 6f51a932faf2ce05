//! Basic per-game summary: duration, peak and final price.

use rugs_record::GameRecord;
use rugs_stats::descriptive::DescriptiveStats;

use crate::{
    AnalysisError, ensure_finite,
    table::{Cell, TableRow},
};

/// Games shorter than this many ticks are instarugs.
pub const INSTARUG_TICKS: i64 = 11;

#[must_use]
pub fn is_instarug(duration_ticks: i64) -> bool {
    duration_ticks < INSTARUG_TICKS
}

/// One row of the summary table. Values are written unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummaryRecord {
    pub game_id: String,
    pub duration_ticks: i64,
    pub peak_multiplier: f64,
    /// The recorder stops at the rug, so this equals `duration_ticks`.
    pub rug_tick: i64,
    pub final_price: f64,
    pub timestamp: String,
    pub is_instarug: bool,
}

impl GameSummaryRecord {
    pub fn from_game(game: &GameRecord) -> Result<Self, AnalysisError> {
        let duration_ticks = game.analysis.final_tick;
        Ok(Self {
            game_id: game.game_id.clone(),
            duration_ticks,
            peak_multiplier: ensure_finite("peak_multiplier", game.analysis.peak_multiplier)?,
            rug_tick: duration_ticks,
            final_price: ensure_finite("final_price", game.final_price())?,
            timestamp: game.recording_start.clone(),
            is_instarug: is_instarug(duration_ticks),
        })
    }
}

impl TableRow for GameSummaryRecord {
    const COLUMNS: &'static [&'static str] = &[
        "gameId",
        "duration_ticks",
        "peak_multiplier",
        "rug_tick",
        "final_price",
        "timestamp",
        "is_instarug",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            self.game_id.as_str().into(),
            self.duration_ticks.into(),
            self.peak_multiplier.into(),
            self.rug_tick.into(),
            self.final_price.into(),
            self.timestamp.as_str().into(),
            self.is_instarug.into(),
        ]
    }
}

/// Batch-level statistics of the summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub total_games: usize,
    /// `None` for an empty batch.
    pub duration: Option<DescriptiveStats>,
    pub peak_multiplier: Option<DescriptiveStats>,
    pub instarug_count: usize,
}

impl SummaryReport {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_rows(rows: &[GameSummaryRecord]) -> Self {
        Self {
            total_games: rows.len(),
            duration: DescriptiveStats::new(rows.iter().map(|r| r.duration_ticks as f64)),
            peak_multiplier: DescriptiveStats::new(rows.iter().map(|r| r.peak_multiplier)),
            instarug_count: rows.iter().filter(|r| r.is_instarug).count(),
        }
    }

    /// Percentage of instarugs; 0 for an empty batch.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn instarug_rate_percent(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        self.instarug_count as f64 / self.total_games as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use rugs_record::PricePoint;

    use super::*;
    use crate::table::render_table;

    fn game(id: &str, final_tick: i64, peak: f64, prices: &[f64]) -> GameRecord {
        let mut game = GameRecord {
            game_id: id.to_owned(),
            recording_start: "2025-01-01T00:00:00Z".to_owned(),
            ..GameRecord::default()
        };
        game.analysis.final_tick = final_tick;
        game.analysis.peak_multiplier = peak;
        game.analysis.price_progression = prices
            .iter()
            .zip(0..)
            .map(|(&price, tick)| PricePoint {
                tick,
                price,
                timestamp: String::new(),
            })
            .collect();
        game
    }

    #[test]
    fn test_instarug_threshold() {
        assert!(is_instarug(0));
        assert!(is_instarug(10));
        assert!(!is_instarug(11));
    }

    #[test]
    fn test_summary_row() {
        let row = GameSummaryRecord::from_game(&game("g", 120, 2.5, &[1.0, 2.5, 0.01])).unwrap();
        assert_eq!(row.rug_tick, 120);
        assert_eq!(row.final_price, 2.5);
        assert!(!row.is_instarug);
        assert_eq!(
            render_table([&row]),
            "gameId,duration_ticks,peak_multiplier,rug_tick,final_price,timestamp,is_instarug\n\
             g,120,2.5,120,2.5,2025-01-01T00:00:00Z,false\n"
        );
    }

    #[test]
    fn test_report() {
        let rows: Vec<_> = [
            game("a", 5, 1.0, &[]),
            game("b", 100, 3.0, &[]),
            game("c", 200, 2.0, &[]),
            game("d", 300, 6.0, &[]),
        ]
        .iter()
        .map(|g| GameSummaryRecord::from_game(g).unwrap())
        .collect();
        let report = SummaryReport::from_rows(&rows);
        assert_eq!(report.total_games, 4);
        assert_eq!(report.instarug_count, 1);
        assert_eq!(report.instarug_rate_percent(), 25.0);
        let duration = report.duration.unwrap();
        assert_eq!(duration.median, 150.0);
        assert_eq!(duration.min, 5.0);
        assert_eq!(report.peak_multiplier.unwrap().median, 2.5);
    }

    #[test]
    fn test_empty_report() {
        let report = SummaryReport::from_rows(&[]);
        assert_eq!(report.total_games, 0);
        assert!(report.duration.is_none());
        assert_eq!(report.instarug_rate_percent(), 0.0);
    }
}
