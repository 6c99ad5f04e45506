//! Lineup/appearance reconciliation.
//!
//! The two tables describe the same (player, game) pairs from different
//! sources. They are inner-joined, the appearance-side name gaps are
//! backfilled, conflicts are counted and the lineup side is kept as canonical.

use std::collections::HashSet;

use anyhow::Result;

use crate::datasets::{DATE, JOIN_KEYS, PLAYER_NAME};
use crate::frame::{ColumnInfo, Frame};
use crate::join::{JoinKind, LEFT_SUFFIX, RIGHT_SUFFIX, merge};
use crate::names::normalize_name;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueContradictions {
    pub rows: usize,
    pub lineup_names: usize,
    pub appearance_names: usize,
    pub pairs: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub joined_shape: (usize, usize),
    pub joined_info: Vec<ColumnInfo>,
    pub backfilled_names: usize,
    pub backfilled_info: Vec<ColumnInfo>,
    pub date_contradictions: usize,
    pub raw_name_contradictions: UniqueContradictions,
    pub normalized_name_contradictions: UniqueContradictions,
    /// Remaining (lineup, appearance) name pairs after normalization, first seen first.
    pub sample_pairs: Vec<(String, String)>,
    pub cleaned_shape: (usize, usize),
}

pub fn suffixed(column: &str, suffix: &str) -> String {
    format!("{column}{suffix}")
}

/// Builds the cleaned game-stats table from lineups and appearances.
pub fn build_game_stats(
    lineups: &Frame,
    appearances: &Frame,
    sample_pairs: usize,
) -> Result<(Frame, ReconcileReport)> {
    let name_x = suffixed(PLAYER_NAME, LEFT_SUFFIX);
    let name_y = suffixed(PLAYER_NAME, RIGHT_SUFFIX);
    let date_x = suffixed(DATE, LEFT_SUFFIX);
    let date_y = suffixed(DATE, RIGHT_SUFFIX);

    let mut report = ReconcileReport::default();
    let mut game_stats = merge(lineups, appearances, &JOIN_KEYS, JoinKind::Inner)?;
    report.joined_shape = game_stats.shape();
    report.joined_info = game_stats.column_info();
    tracing::info!(rows = game_stats.len(), "joined lineups with appearances");

    report.backfilled_names = game_stats.fill_null_from(&name_y, &name_x)?;
    report.backfilled_info = game_stats.column_info();

    report.date_contradictions = count_mismatches(&game_stats, &date_x, &date_y)?;
    report.raw_name_contradictions = contradicting_names(&game_stats, &name_x, &name_y)?;

    game_stats.map_column(&name_x, normalize_name)?;
    game_stats.map_column(&name_y, normalize_name)?;

    report.normalized_name_contradictions = contradicting_names(&game_stats, &name_x, &name_y)?;
    report.sample_pairs = mismatched_pairs(&game_stats, &name_x, &name_y, sample_pairs)?;
    if report.normalized_name_contradictions.rows > 0 {
        tracing::info!(
            rows = report.normalized_name_contradictions.rows,
            "keeping lineup-side names for remaining mismatches"
        );
    }

    game_stats.drop_columns(&[name_y.as_str(), date_y.as_str()])?;
    game_stats.rename(&[(name_x.as_str(), PLAYER_NAME), (date_x.as_str(), DATE)])?;
    report.cleaned_shape = game_stats.shape();

    Ok((game_stats, report))
}

/// Rows where the two columns differ. A null on either side counts as a
/// mismatch, including null against null.
pub fn count_mismatches(frame: &Frame, left: &str, right: &str) -> Result<usize> {
    Ok(column_pairs(frame, left, right)?
        .filter(|(a, b)| !cells_equal(*a, *b))
        .count())
}

pub fn contradicting_names(frame: &Frame, left: &str, right: &str) -> Result<UniqueContradictions> {
    let mut out = UniqueContradictions::default();
    let mut lefts = HashSet::new();
    let mut rights = HashSet::new();
    let mut pairs = HashSet::new();
    for (a, b) in column_pairs(frame, left, right)? {
        if cells_equal(a, b) {
            continue;
        }
        out.rows += 1;
        if let Some(name) = a {
            lefts.insert(name);
        }
        if let Some(name) = b {
            rights.insert(name);
        }
        pairs.insert((a, b));
    }
    out.lineup_names = lefts.len();
    out.appearance_names = rights.len();
    out.pairs = pairs.len();
    Ok(out)
}

fn mismatched_pairs(
    frame: &Frame,
    left: &str,
    right: &str,
    limit: usize,
) -> Result<Vec<(String, String)>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (a, b) in column_pairs(frame, left, right)? {
        if out.len() >= limit {
            break;
        }
        if cells_equal(a, b) {
            continue;
        }
        let pair = (
            a.unwrap_or_default().to_string(),
            b.unwrap_or_default().to_string(),
        );
        if seen.insert(pair.clone()) {
            out.push(pair);
        }
    }
    Ok(out)
}

fn column_pairs<'a>(
    frame: &'a Frame,
    left: &str,
    right: &str,
) -> Result<impl Iterator<Item = (Option<&'a str>, Option<&'a str>)>> {
    let a = frame.column(left)?;
    let b = frame.column(right)?;
    Ok(a.into_iter().zip(b))
}

/// Number of appearance rows whose (player, game) pair occurs more than once.
/// Duplicates are reported only; nothing is removed.
pub fn duplicate_appearances(appearances: &Frame) -> Result<usize> {
    let flags = appearances.duplicated(&JOIN_KEYS)?;
    let count = flags.into_iter().filter(|dup| *dup).count();
    if count > 0 {
        tracing::warn!(rows = count, "duplicate (player_id, game_id) pairs in appearances");
    }
    Ok(count)
}

fn cells_equal(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(csv: &str) -> Frame {
        Frame::from_reader(csv.as_bytes()).expect("fixture csv should parse")
    }

    fn lineups() -> Frame {
        frame(
            "game_lineups_id,date,game_id,player_id,club_id,player_name,type,team_captain\n\
             a1,2021-08-13,100,1,27,Martin Ødegaard,starting_lineup,0\n\
             a2,2021-08-13,100,2,27,Thomas Müller-Smith,starting_lineup,1\n\
             a3,2021-08-13,100,3,27,Joao Pedro Silva,substitutes,0\n\
             a4,2021-08-13,100,4,27,Nobody Played,substitutes,0\n",
        )
    }

    fn appearances() -> Frame {
        frame(
            "appearance_id,game_id,player_id,date,player_name,goals,assists,minutes_played\n\
             b1,100,1,2021-08-13,Martin Odegaard,1,0,90\n\
             b2,100,2,2021-08-13,,0,1,90\n\
             b3,100,3,2021-08-14,Joao Silva,0,0,12\n\
             b4,101,9,2021-08-20,Other Game,0,0,90\n",
        )
    }

    #[test]
    fn game_stats_drop_appearance_side_columns() {
        let (stats, report) = build_game_stats(&lineups(), &appearances(), 10).unwrap();
        assert_eq!(report.joined_shape, (3, 14));
        assert_eq!(stats.shape(), (3, 12));
        assert_eq!(report.cleaned_shape, (3, 12));
        assert!(stats.has_column(PLAYER_NAME));
        assert!(stats.has_column(DATE));
        assert!(!stats.has_column("player_name_y"));
        assert!(!stats.has_column("date_y"));
        assert!(!stats.has_column("player_name_x"));
    }

    #[test]
    fn backfill_then_normalize_then_prefer_lineup() {
        let (stats, report) = build_game_stats(&lineups(), &appearances(), 10).unwrap();
        assert_eq!(report.backfilled_names, 1);
        assert_eq!(report.date_contradictions, 1);
        assert_eq!(report.raw_name_contradictions.rows, 2);
        assert_eq!(report.raw_name_contradictions.pairs, 2);
        assert_eq!(report.normalized_name_contradictions.rows, 1);
        assert_eq!(
            report.sample_pairs,
            vec![("joao pedro silva".to_string(), "joao silva".to_string())]
        );
        assert_eq!(
            stats.column(PLAYER_NAME).unwrap(),
            vec![
                Some("martin odegaard"),
                Some("thomas muller smith"),
                Some("joao pedro silva"),
            ]
        );
        assert_eq!(
            stats.column(DATE).unwrap(),
            vec![Some("2021-08-13"), Some("2021-08-13"), Some("2021-08-13")]
        );
    }

    #[test]
    fn joined_rows_exist_in_both_sources() {
        let lineups = lineups();
        let apps = appearances();
        let (stats, _) = build_game_stats(&lineups, &apps, 0).unwrap();
        let pairs = |f: &Frame| {
            f.column("player_id")
                .unwrap()
                .into_iter()
                .zip(f.column("game_id").unwrap())
                .map(|(p, g)| (p.map(str::to_string), g.map(str::to_string)))
                .collect::<HashSet<_>>()
        };
        let left = pairs(&lineups);
        let right = pairs(&apps);
        for pair in pairs(&stats) {
            assert!(left.contains(&pair) && right.contains(&pair));
        }
    }

    #[test]
    fn null_against_null_is_a_mismatch() {
        let f = frame("a,b\n,\nx,x\ny,\n");
        assert_eq!(count_mismatches(&f, "a", "b").unwrap(), 2);
        let unique = contradicting_names(&f, "a", "b").unwrap();
        assert_eq!(unique.rows, 2);
        assert_eq!(unique.lineup_names, 1);
        assert_eq!(unique.appearance_names, 0);
        assert_eq!(unique.pairs, 2);
    }

    #[test]
    fn duplicates_are_counted_not_removed() {
        let apps = frame("player_id,game_id\n1,1\n1,1\n2,1\n");
        assert_eq!(duplicate_appearances(&apps).unwrap(), 2);
        assert_eq!(apps.len(), 3);
        assert_eq!(duplicate_appearances(&appearances()).unwrap(), 0);
    }

    #[test]
    fn sample_pairs_respects_limit() {
        let (_, report) = build_game_stats(&lineups(), &appearances(), 0).unwrap();
        assert!(report.sample_pairs.is_empty());
    }
}
