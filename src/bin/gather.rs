use std::path::PathBuf;

use anyhow::Result;

use cricvision_terminal::data_fetch::{self, GatherConfig, Source};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut cfg = GatherConfig::from_env();
    if let Some(dir) = parse_data_dir_arg() {
        cfg.data_dir = dir;
    }

    if let Some(json_path) = parse_process_arg() {
        let out = data_fetch::process_cricsheet_file(&json_path, &cfg.data_dir)?;
        println!("Processed {} -> {}", json_path.display(), out.display());
        return Ok(());
    }

    let sources = parse_sources_arg().unwrap_or_else(|| Source::ALL.to_vec());

    println!("Fetching sources: {:?}", sources.iter().map(|s| s.label()).collect::<Vec<_>>());
    println!("Data dir: {}", cfg.data_dir.display());
    if cfg.api_key.is_none() && sources.contains(&Source::CricApi) {
        println!("Note: CRICAPI_KEY unset, CricAPI endpoints will be skipped");
    }

    let summary = data_fetch::run_gather(&cfg, &sources)?;

    println!("Gather complete");
    println!("Requests: {}/{} succeeded", summary.succeeded, summary.attempted);
    for path in &summary.written {
        println!("  wrote {}", path.display());
    }
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(10) {
            println!("  - {err}");
        }
    }

    Ok(())
}

fn parse_data_dir_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--data-dir=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--data-dir"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}

fn parse_sources_arg() -> Option<Vec<Source>> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix("--sources=") {
            let sources = Source::parse_list(raw);
            if !sources.is_empty() {
                return Some(sources);
            }
        }
        if arg == "--sources"
            && let Some(next) = args.get(idx + 1)
        {
            let sources = Source::parse_list(next);
            if !sources.is_empty() {
                return Some(sources);
            }
        }
    }
    None
}

fn parse_process_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--process=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--process"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
