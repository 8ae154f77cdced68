use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const BATTING_FILE_MARKER: &str = "batting_form_features";
const BOWLING_FILE_MARKER: &str = "bowling_form_features";
const VENUE_FILE: &str = "venue_features.csv";

pub const SELECTOR_LIMIT: usize = 100;

/// One batting innings row from the features export. Optional columns stay
/// optional so older exports without them still load.
#[derive(Debug, Clone, Deserialize)]
pub struct BattingRecord {
    pub batter: String,
    pub runs: f64,
    #[serde(default)]
    pub strike_rate: Option<f64>,
    #[serde(default)]
    pub last_5_avg: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BowlingRecord {
    pub bowler: String,
    #[serde(default)]
    pub wickets: Option<f64>,
    #[serde(default)]
    pub economy: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueRecord {
    pub venue: String,
}

/// Read-only reference data loaded once at startup. A missing or broken
/// file yields an empty table and a note, never a startup failure.
#[derive(Debug, Default)]
pub struct ReferenceTables {
    pub batting: Vec<BattingRecord>,
    pub bowling: Vec<BowlingRecord>,
    pub venues: Vec<VenueRecord>,
    pub load_notes: Vec<String>,
}

impl ReferenceTables {
    pub fn load(features_dir: &Path) -> Self {
        let mut tables = Self::default();

        match load_marked_csv::<BattingRecord>(features_dir, BATTING_FILE_MARKER) {
            Ok(rows) => tables.batting = rows,
            Err(err) => tables.load_notes.push(format!("batting stats: {err:#}")),
        }
        match load_marked_csv::<BowlingRecord>(features_dir, BOWLING_FILE_MARKER) {
            Ok(rows) => tables.bowling = rows,
            Err(err) => tables.load_notes.push(format!("bowling stats: {err:#}")),
        }
        match load_csv::<VenueRecord>(&features_dir.join(VENUE_FILE)) {
            Ok(rows) => tables.venues = rows,
            Err(err) => tables.load_notes.push(format!("venues: {err:#}")),
        }

        tables
    }

    /// Unique batter names in first-seen order, capped for the selector.
    pub fn batter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for row in &self.batting {
            if !names.iter().any(|n| n == &row.batter) {
                names.push(row.batter.clone());
                if names.len() >= SELECTOR_LIMIT {
                    break;
                }
            }
        }
        names
    }

    pub fn venue_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for row in &self.venues {
            if !names.iter().any(|n| n == &row.venue) {
                names.push(row.venue.clone());
            }
        }
        names
    }

    pub fn batting_rows_for(&self, player: &str) -> Vec<&BattingRecord> {
        self.batting.iter().filter(|r| r.batter == player).collect()
    }
}

pub fn default_features_dir() -> PathBuf {
    env::var("CRICVISION_FEATURES_DIR")
        .ok()
        .map(|s| PathBuf::from(s.trim()))
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("data/features"))
}

/// Finds the first file in `dir` whose name contains `marker` and parses
/// it. The exports are date-stamped, so the name is matched by substring.
fn load_marked_csv<T: for<'de> Deserialize<'de>>(dir: &Path, marker: &str) -> Result<Vec<T>> {
    let entries = fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))?;
    let mut candidates: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(marker) && n.ends_with(".csv"))
        })
        .collect();
    candidates.sort();

    let Some(path) = candidates.first() else {
        return Err(anyhow::anyhow!("no file matching '{marker}'"));
    };
    load_csv(path)
}

fn load_csv<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.deserialize::<T>() {
        // Tolerate the odd malformed row; the tables are scraped data.
        match record {
            Ok(row) => rows.push(row),
            Err(_) => continue,
        }
    }
    Ok(rows)
}
