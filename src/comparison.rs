use crate::reference_tables::ReferenceTables;

/// Aggregate line for one side of the comparison panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub name: String,
    pub innings: usize,
    pub average_runs: f64,
    pub average_strike_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOutcome {
    Ready(PlayerSummary, PlayerSummary),
    /// One or both names matched zero rows.
    NoData { missing: Vec<String> },
}

pub fn compare_players(tables: &ReferenceTables, a: &str, b: &str) -> ComparisonOutcome {
    let first = summarize(tables, a);
    let second = summarize(tables, b);

    match (first, second) {
        (Some(first), Some(second)) => ComparisonOutcome::Ready(first, second),
        (first, second) => {
            let mut missing = Vec::new();
            if first.is_none() {
                missing.push(a.to_string());
            }
            if second.is_none() {
                missing.push(b.to_string());
            }
            ComparisonOutcome::NoData { missing }
        }
    }
}

fn summarize(tables: &ReferenceTables, player: &str) -> Option<PlayerSummary> {
    let rows = tables.batting_rows_for(player);
    if rows.is_empty() {
        return None;
    }

    let innings = rows.len();
    let average_runs = rows.iter().map(|r| r.runs).sum::<f64>() / innings as f64;

    // Strike rate column can be absent from an export; report 0 then.
    let rates: Vec<f64> = rows.iter().filter_map(|r| r.strike_rate).collect();
    let average_strike_rate = if rates.is_empty() {
        0.0
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    };

    Some(PlayerSummary {
        name: player.to_string(),
        innings,
        average_runs,
        average_strike_rate,
    })
}
