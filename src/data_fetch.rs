use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use reqwest::blocking::Client;
use serde::Serialize;

use crate::http_client::http_client;

const CRICSHEET_BASE_URL: &str = "https://cricsheet.org/downloads/";
const CRICAPI_BASE_URL: &str = "https://api.cricapi.com/v1/";
const ESPN_LIVE_URL: &str = "https://www.espncricinfo.com/live-cricket-score";

const CRICSHEET_DATASETS: [(&str, &str); 5] = [
    ("t20s_male_json", "t20s_male_json.zip"),
    ("odis_male_json", "odis_male_json.zip"),
    ("tests_male_json", "tests_male_json.zip"),
    ("ipl_json", "ipl_json.zip"),
    ("bbl_json", "bbl_json.zip"),
];

const CRICAPI_ENDPOINTS: [(&str, &str); 3] = [
    ("current_matches", "currentMatches"),
    ("match_info", "matches"),
    ("series", "series"),
];

const DEFAULT_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct GatherConfig {
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
    pub request_delay: Duration,
}

impl GatherConfig {
    pub fn from_env() -> Self {
        let data_dir = env::var("CRICVISION_DATA_DIR")
            .ok()
            .map(|s| PathBuf::from(s.trim()))
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("data"));
        let api_key = env::var("CRICAPI_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let delay_ms = env::var("GATHER_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_DELAY_MS)
            .min(60_000);

        Self {
            data_dir,
            api_key,
            request_delay: Duration::from_millis(delay_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cricsheet,
    CricApi,
    Espn,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Cricsheet, Source::CricApi, Source::Espn];

    pub fn label(self) -> &'static str {
        match self {
            Source::Cricsheet => "cricsheet",
            Source::CricApi => "cricapi",
            Source::Espn => "espn",
        }
    }

    pub fn parse_list(raw: &str) -> Vec<Source> {
        let mut out = Vec::new();
        for part in raw.split([',', ';', ' ']) {
            let source = match part.trim().to_ascii_lowercase().as_str() {
                "cricsheet" => Some(Source::Cricsheet),
                "cricapi" => Some(Source::CricApi),
                "espn" | "espncricinfo" => Some(Source::Espn),
                _ => None,
            };
            if let Some(s) = source
                && !out.contains(&s)
            {
                out.push(s);
            }
        }
        out
    }
}

/// Outcome of one gather run; errors are per endpoint and never abort the
/// remaining requests.
#[derive(Debug, Clone, Default)]
pub struct FetchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub written: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl FetchSummary {
    fn record_ok(&mut self, path: PathBuf) {
        self.succeeded += 1;
        self.written.push(path);
    }

    fn record_err(&mut self, label: &str, err: anyhow::Error) {
        self.errors.push(format!("{label}: {err:#}"));
    }
}

/// Runs the requested sources strictly sequentially, one outbound request
/// at a time with a fixed delay between them.
pub fn run_gather(cfg: &GatherConfig, sources: &[Source]) -> Result<FetchSummary> {
    fs::create_dir_all(&cfg.data_dir)
        .with_context(|| format!("create data dir {}", cfg.data_dir.display()))?;
    let client = http_client()?;

    let mut summary = FetchSummary::default();
    for source in sources {
        match source {
            Source::Cricsheet => download_cricsheet(client, cfg, &mut summary),
            Source::CricApi => fetch_cricapi(client, cfg, &mut summary),
            Source::Espn => fetch_espn_page(client, cfg, &mut summary),
        }
    }
    Ok(summary)
}

fn download_cricsheet(client: &Client, cfg: &GatherConfig, summary: &mut FetchSummary) {
    for (name, filename) in CRICSHEET_DATASETS {
        summary.attempted += 1;
        let url = format!("{CRICSHEET_BASE_URL}{filename}");
        let path = cfg.data_dir.join(filename);
        match download_to_file(client, &url, &path) {
            Ok(()) => summary.record_ok(path),
            Err(err) => summary.record_err(name, err),
        }
        thread::sleep(cfg.request_delay);
    }
}

fn fetch_cricapi(client: &Client, cfg: &GatherConfig, summary: &mut FetchSummary) {
    let Some(api_key) = cfg.api_key.as_deref() else {
        summary.errors.push("cricapi: CRICAPI_KEY not set".to_string());
        return;
    };

    let stamp = Local::now().format("%Y%m%d");
    for (name, endpoint) in CRICAPI_ENDPOINTS {
        summary.attempted += 1;
        let url = format!("{CRICAPI_BASE_URL}{endpoint}?apikey={api_key}&offset=0");
        let path = cfg.data_dir.join(format!("cricapi_{name}_{stamp}.json"));
        match fetch_json_to_file(client, &url, &path) {
            Ok(()) => summary.record_ok(path),
            Err(err) => summary.record_err(name, err),
        }
        thread::sleep(cfg.request_delay);
    }
}

fn fetch_espn_page(client: &Client, cfg: &GatherConfig, summary: &mut FetchSummary) {
    summary.attempted += 1;
    let stamp = Local::now().format("%Y%m%d");
    let path = cfg
        .data_dir
        .join(format!("espncricinfo_recent_{stamp}.html"));
    match fetch_text_to_file(client, ESPN_LIVE_URL, &path) {
        Ok(()) => summary.record_ok(path),
        Err(err) => summary.record_err("espncricinfo", err),
    }
}

fn download_to_file(client: &Client, url: &str, path: &Path) -> Result<()> {
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http {status}"));
    }
    let mut file =
        fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut resp = resp;
    resp.copy_to(&mut file).context("stream body to file")?;
    Ok(())
}

fn fetch_json_to_file(client: &Client, url: &str, path: &Path) -> Result<()> {
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("read body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status}"));
    }
    let value =
        serde_json::from_str::<serde_json::Value>(&body).context("response is not json")?;
    let pretty = serde_json::to_string_pretty(&value).context("serialize response")?;
    fs::write(path, pretty).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn fetch_text_to_file(client: &Client, url: &str, path: &Path) -> Result<()> {
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http {status}"));
    }
    let body = resp.text().context("read body")?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// One delivery flattened out of a Cricsheet match file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallRow {
    pub match_id: String,
    pub bowler: String,
    pub runs: u64,
    pub wicket: u8,
    pub extras: u64,
}

/// Flattens a Cricsheet match JSON into per-ball bowling rows. Older
/// archives carry the bowler at the over level; deliveries that name
/// their own bowler win.
pub fn flatten_cricsheet_match(raw: &str) -> Result<Vec<BallRow>> {
    let value =
        serde_json::from_str::<serde_json::Value>(raw).context("parse cricsheet json")?;
    let match_id = value
        .pointer("/info/match_id")
        .and_then(|v| v.as_str())
        .unwrap_or("N/A")
        .to_string();

    let mut rows = Vec::new();
    let innings = value
        .get("innings")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    for inning in innings {
        let overs = inning
            .get("overs")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        for over in overs {
            let over_bowler = over
                .get("bowler")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown");
            let deliveries = over
                .get("deliveries")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            for delivery in deliveries {
                let bowler = delivery
                    .get("bowler")
                    .and_then(|v| v.as_str())
                    .unwrap_or(over_bowler);
                rows.push(BallRow {
                    match_id: match_id.clone(),
                    bowler: bowler.to_string(),
                    runs: delivery
                        .pointer("/runs/total")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0),
                    wicket: u8::from(delivery.get("wickets").is_some()),
                    extras: delivery
                        .pointer("/runs/extras")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0),
                });
            }
        }
    }
    Ok(rows)
}

/// Parses one downloaded match file and writes the per-ball rows as
/// `processed_<stem>.csv` in the data dir.
pub fn process_cricsheet_file(json_path: &Path, data_dir: &Path) -> Result<PathBuf> {
    let raw = fs::read_to_string(json_path)
        .with_context(|| format!("read {}", json_path.display()))?;
    let rows = flatten_cricsheet_match(&raw)?;

    let stem = json_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("bad file name {}", json_path.display()))?;
    let out_path = data_dir.join(format!("processed_{stem}.csv"));

    let mut writer = csv::Writer::from_path(&out_path)
        .with_context(|| format!("create {}", out_path.display()))?;
    for row in &rows {
        writer.serialize(row).context("write ball row")?;
    }
    writer.flush().context("flush csv")?;
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCH_JSON: &str = r#"{
        "info": { "match_id": "m42" },
        "innings": [
            { "overs": [
                { "bowler": "JJ Bumrah", "deliveries": [
                    { "runs": { "total": 1, "extras": 0 } },
                    { "runs": { "total": 0, "extras": 0 }, "wickets": [ { "kind": "bowled" } ] }
                ] },
                { "deliveries": [
                    { "bowler": "R Ashwin", "runs": { "total": 4, "extras": 0 } }
                ] }
            ] }
        ]
    }"#;

    #[test]
    fn flatten_extracts_per_ball_rows() {
        let rows = flatten_cricsheet_match(MATCH_JSON).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].match_id, "m42");
        assert_eq!(rows[0].bowler, "JJ Bumrah");
        assert_eq!(rows[1].wicket, 1);
        assert_eq!(rows[2].bowler, "R Ashwin");
        assert_eq!(rows[2].runs, 4);
    }

    #[test]
    fn flatten_tolerates_missing_sections() {
        let rows = flatten_cricsheet_match(r#"{"info":{}}"#).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn source_list_parses_and_dedups() {
        assert_eq!(
            Source::parse_list("cricapi, espn,cricapi"),
            vec![Source::CricApi, Source::Espn]
        );
        assert!(Source::parse_list("nothing").is_empty());
    }

    #[test]
    fn processed_file_lands_next_to_the_data() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("1234.json");
        fs::write(&src, MATCH_JSON).unwrap();
        let out = process_cricsheet_file(&src, dir.path()).unwrap();
        assert_eq!(
            out.file_name().and_then(|s| s.to_str()),
            Some("processed_1234.csv")
        );
        let body = fs::read_to_string(out).unwrap();
        assert!(body.starts_with("match_id,bowler,runs,wicket,extras"));
        assert_eq!(body.lines().count(), 4);
    }
}
