use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::datasets::{self, DATE};
use crate::frame::Frame;
use crate::players::{self, CleanPlayersReport};
use crate::reconcile::{self, ReconcileReport};

pub const GAME_STATS_FILE: &str = "game_stats_cleaned.csv";
pub const PLAYERS_CLEAN_FILE: &str = "result_players_clean.csv";

#[derive(Debug, Clone)]
pub struct TableSummary {
    pub name: &'static str,
    pub shape: (usize, usize),
    pub null_counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub shape: (usize, usize),
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub inputs: Vec<TableSummary>,
    pub clubs: usize,
    pub clubs_without_name: usize,
    pub reconcile: ReconcileReport,
    pub duplicate_appearances: usize,
    pub date_span: Option<(NaiveDate, NaiveDate)>,
    pub players: CleanPlayersReport,
    pub outputs: Vec<OutputFile>,
}

pub struct PipelineOutput {
    pub game_stats: Frame,
    pub players_clean: Frame,
    pub summary: PipelineSummary,
}

/// Runs the whole cleaning chain and writes both output tables.
pub fn run(config: &Config) -> Result<PipelineSummary> {
    let output = build(config)?;
    Ok(output.summary)
}

pub fn build(config: &Config) -> Result<PipelineOutput> {
    tracing::info!(dir = %config.archive_dir.display(), "loading archive");
    let archive = datasets::load_archive(&config.archive_dir)?;

    let inputs = vec![
        table_summary("players", &archive.players),
        table_summary("lineups", &archive.lineups),
        table_summary("appearances", &archive.appearances),
    ];
    let clubs_without_name = archive.clubs.iter().filter(|c| c.name.is_none()).count();

    let (game_stats, reconcile_report) =
        reconcile::build_game_stats(&archive.lineups, &archive.appearances, config.sample_pairs)
            .context("reconcile lineups with appearances")?;
    let duplicate_appearances = reconcile::duplicate_appearances(&archive.appearances)?;
    let date_span = date_span(&game_stats)?;

    let counts = players::appearance_counts(&game_stats)?;
    let (players_clean, players_report) = players::clean_players(&archive.players, &counts)
        .context("attach appearance counts to players")?;

    let outputs = vec![
        write_output(&config.output_dir, GAME_STATS_FILE, &game_stats)?,
        write_output(&config.output_dir, PLAYERS_CLEAN_FILE, &players_clean)?,
    ];

    let summary = PipelineSummary {
        inputs,
        clubs: archive.clubs.len(),
        clubs_without_name,
        reconcile: reconcile_report,
        duplicate_appearances,
        date_span,
        players: players_report,
        outputs,
    };
    Ok(PipelineOutput {
        game_stats,
        players_clean,
        summary,
    })
}

fn table_summary(name: &'static str, frame: &Frame) -> TableSummary {
    TableSummary {
        name,
        shape: frame.shape(),
        null_counts: frame.null_counts(),
    }
}

fn write_output(dir: &Path, file: &str, frame: &Frame) -> Result<OutputFile> {
    let path = dir.join(file);
    frame.write_csv(&path)?;
    let sha256 = file_sha256(&path)?;
    tracing::info!(path = %path.display(), rows = frame.len(), "wrote output");
    Ok(OutputFile {
        path,
        shape: frame.shape(),
        sha256,
    })
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Earliest and latest parseable `date` in the table. Cells that do not start
/// with a `YYYY-MM-DD` date are skipped.
pub fn date_span(frame: &Frame) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let mut span: Option<(NaiveDate, NaiveDate)> = None;
    for cell in frame.column(DATE)?.into_iter().flatten() {
        let Some(date) = parse_date(cell) else {
            continue;
        };
        span = Some(match span {
            Some((lo, hi)) => (lo.min(date), hi.max(date)),
            None => (date, date),
        });
    }
    Ok(span)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}
