use anyhow::Result;

use crate::datasets::PLAYER_ID;
use crate::frame::Frame;
use crate::join::{JoinKind, merge};

pub const COUNT_COLUMN: &str = "count";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanPlayersReport {
    pub players: usize,
    pub counted_players: usize,
    pub merged_shape: (usize, usize),
    pub dropped_rows: usize,
    pub clean_shape: (usize, usize),
}

/// Number of game-stats rows per player.
pub fn appearance_counts(game_stats: &Frame) -> Result<Frame> {
    game_stats.count_by(PLAYER_ID, COUNT_COLUMN)
}

/// Attaches appearance counts to the players table and drops every row with
/// any null cell. Players without a joined appearance have a null count and
/// are dropped with the rest.
///
/// Once the left join leaves a null count the column is float-valued, so the
/// surviving counts are written as `2.0` rather than `2`.
pub fn clean_players(players: &Frame, counts: &Frame) -> Result<(Frame, CleanPlayersReport)> {
    let mut merged = merge(players, counts, &[PLAYER_ID], JoinKind::Left)?;
    let merged_shape = merged.shape();
    let uncounted = merged
        .column(COUNT_COLUMN)?
        .into_iter()
        .filter(Option::is_none)
        .count();
    if uncounted > 0 {
        merged.map_column(COUNT_COLUMN, float_text)?;
    }
    let dropped_rows = merged.drop_nulls()?;
    tracing::info!(
        kept = merged.len(),
        dropped = dropped_rows,
        "dropped player rows with missing fields"
    );

    let report = CleanPlayersReport {
        players: players.len(),
        counted_players: counts.len(),
        merged_shape,
        dropped_rows,
        clean_shape: merged.shape(),
    };
    Ok((merged, report))
}

fn float_text(count: &str) -> String {
    match count.parse::<f64>() {
        Ok(value) => format!("{value:.1}"),
        Err(_) => count.to_string(),
    }
}
