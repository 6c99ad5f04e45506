use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::frame::Frame;

pub const PLAYERS_FILE: &str = "players.csv";
pub const LINEUPS_FILE: &str = "game_lineups.csv";
pub const APPEARANCES_FILE: &str = "appearances.csv";
pub const CLUBS_FILE: &str = "clubs.csv";

pub const PLAYER_ID: &str = "player_id";
pub const GAME_ID: &str = "game_id";
pub const PLAYER_NAME: &str = "player_name";
pub const DATE: &str = "date";

pub const JOIN_KEYS: [&str; 2] = [PLAYER_ID, GAME_ID];

const LINEUP_COLUMNS: &[&str] = &[PLAYER_ID, GAME_ID, PLAYER_NAME, DATE];
const APPEARANCE_COLUMNS: &[&str] = &[PLAYER_ID, GAME_ID, PLAYER_NAME, DATE];
const PLAYER_COLUMNS: &[&str] = &[PLAYER_ID];

#[derive(Debug, Clone, Deserialize)]
pub struct Club {
    pub club_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Archive {
    pub players: Frame,
    pub lineups: Frame,
    pub appearances: Frame,
    pub clubs: Vec<Club>,
}

pub fn load_archive(dir: &Path) -> Result<Archive> {
    let players = load_table(dir, PLAYERS_FILE, PLAYER_COLUMNS)?;
    let lineups = load_table(dir, LINEUPS_FILE, LINEUP_COLUMNS)?;
    let appearances = load_table(dir, APPEARANCES_FILE, APPEARANCE_COLUMNS)?;
    let clubs = load_clubs(&dir.join(CLUBS_FILE))?;
    Ok(Archive {
        players,
        lineups,
        appearances,
        clubs,
    })
}

pub fn load_table(dir: &Path, file: &str, required: &[&str]) -> Result<Frame> {
    let path = dir.join(file);
    let frame = Frame::read_csv(&path)?;
    frame
        .require_columns(required)
        .with_context(|| format!("validate {}", path.display()))?;
    let (rows, cols) = frame.shape();
    tracing::info!(file, rows, cols, "loaded table");
    Ok(frame)
}

/// Club id to name mapping. Only `club_id` and `name` are read; other columns
/// are ignored.
pub fn load_clubs(path: &Path) -> Result<Vec<Club>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open csv {}", path.display()))?;
    let mut clubs = Vec::new();
    for record in reader.deserialize::<Club>() {
        let mut club = record.with_context(|| format!("parse club row in {}", path.display()))?;
        club.name = club.name.filter(|name| !name.trim().is_empty());
        clubs.push(club);
    }
    tracing::info!(file = CLUBS_FILE, rows = clubs.len(), "loaded clubs");
    Ok(clubs)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn load_table_rejects_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LINEUPS_FILE), "player_id,game_id,date\n1,2,2020-01-01\n")
            .unwrap();
        let err = load_table(dir.path(), LINEUPS_FILE, LINEUP_COLUMNS).unwrap_err();
        assert!(format!("{err:#}").contains("player_name"));
    }

    #[test]
    fn load_table_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_table(dir.path(), PLAYERS_FILE, PLAYER_COLUMNS).is_err());
    }

    #[test]
    fn clubs_ignore_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CLUBS_FILE);
        fs::write(&path, "club_id,club_code,name,stadium\n5,fcb,FC Bayern,Allianz\n6,x,,\n")
            .unwrap();
        let clubs = load_clubs(&path).unwrap();
        assert_eq!(clubs.len(), 2);
        assert_eq!(clubs[0].name.as_deref(), Some("FC Bayern"));
        assert!(clubs[1].name.is_none());
    }
}
