use crate::reference_tables::ReferenceTables;

const MIN_INNINGS: usize = 5;
const WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    NoData,
    /// Some innings exist but fewer than the minimum for a trend.
    InsufficientData { innings: usize },
    Series(FormSeries),
}

/// Most recent innings in chronological order, ready to plot.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSeries {
    pub player: String,
    pub runs: Vec<f64>,
    /// Rolling 5-innings average, present only when the column exists.
    pub rolling_avg: Option<Vec<f64>>,
}

pub fn analyze_form(tables: &ReferenceTables, player: &str) -> FormOutcome {
    let rows = tables.batting_rows_for(player);
    if rows.is_empty() {
        return FormOutcome::NoData;
    }
    if rows.len() < MIN_INNINGS {
        return FormOutcome::InsufficientData {
            innings: rows.len(),
        };
    }

    // Table rows are already chronological; keep the tail as-is.
    let start = rows.len().saturating_sub(WINDOW);
    let recent = &rows[start..];

    let runs: Vec<f64> = recent.iter().map(|r| r.runs).collect();
    let rolling: Vec<f64> = recent.iter().filter_map(|r| r.last_5_avg).collect();
    let rolling_avg = if rolling.len() == recent.len() {
        Some(rolling)
    } else {
        None
    };

    FormOutcome::Series(FormSeries {
        player: player.to_string(),
        runs,
        rolling_avg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_tables::BattingRecord;

    fn tables_with_innings(player: &str, runs: &[f64]) -> ReferenceTables {
        ReferenceTables {
            batting: runs
                .iter()
                .map(|r| BattingRecord {
                    batter: player.to_string(),
                    runs: *r,
                    strike_rate: None,
                    last_5_avg: Some(r / 2.0),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn three_innings_is_insufficient() {
        let t = tables_with_innings("A", &[12.0, 40.0, 7.0]);
        assert_eq!(
            analyze_form(&t, "A"),
            FormOutcome::InsufficientData { innings: 3 }
        );
    }

    #[test]
    fn unknown_player_is_no_data_not_insufficient() {
        let t = tables_with_innings("A", &[12.0, 40.0, 7.0]);
        assert_eq!(analyze_form(&t, "B"), FormOutcome::NoData);
    }

    #[test]
    fn long_history_keeps_last_twenty_in_order() {
        let runs: Vec<f64> = (1..=25).map(|i| i as f64).collect();
        let t = tables_with_innings("A", &runs);
        let FormOutcome::Series(series) = analyze_form(&t, "A") else {
            panic!("expected series");
        };
        assert_eq!(series.runs.len(), 20);
        assert_eq!(series.runs.first(), Some(&6.0));
        assert_eq!(series.runs.last(), Some(&25.0));
        assert!(series.runs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rolling_average_omitted_when_column_incomplete() {
        let mut t = tables_with_innings("A", &[5.0, 6.0, 7.0, 8.0, 9.0]);
        t.batting[2].last_5_avg = None;
        let FormOutcome::Series(series) = analyze_form(&t, "A") else {
            panic!("expected series");
        };
        assert!(series.rolling_avg.is_none());
    }
}
