use std::collections::VecDeque;

use rand::thread_rng;

use crate::comparison::{ComparisonOutcome, compare_players};
use crate::form_trends::{FormOutcome, analyze_form};
use crate::insights::{DerivedMetrics, PhaseRates, ProjectionPoint, compute_insights, phase_chart, projection_series};
use crate::match_state::{MatchState, ScenarioPreset};
use crate::model_store::{ModelStore, ModelUnavailable, default_models_dir};
use crate::reference_tables::{ReferenceTables, default_features_dir};
use crate::wagon_wheel::{ShotSample, generate_shots};

const LOG_CAPACITY: usize = 50;

/// Everything loaded once at process start. Read-only afterwards; every
/// handler takes it by shared reference.
#[derive(Debug)]
pub struct DashboardContext {
    pub models: ModelStore,
    pub tables: ReferenceTables,
}

impl DashboardContext {
    pub fn init() -> Self {
        Self {
            models: ModelStore::load(&default_models_dir()),
            tables: ReferenceTables::load(&default_features_dir()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Predict,
    Compare,
    Form,
    WagonWheel,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Screen::Predict => "PREDICT",
            Screen::Compare => "COMPARE",
            Screen::Form => "FORM",
            Screen::WagonWheel => "WAGON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Over,
    Runs,
    Wickets,
    Balls,
    RunRate,
    Pressure,
}

impl InputField {
    pub const ALL: [InputField; 6] = [
        InputField::Over,
        InputField::Runs,
        InputField::Wickets,
        InputField::Balls,
        InputField::RunRate,
        InputField::Pressure,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InputField::Over => "Current Over",
            InputField::Runs => "Total Runs",
            InputField::Wickets => "Wickets Down",
            InputField::Balls => "Balls Remaining",
            InputField::RunRate => "Current Run Rate",
            InputField::Pressure => "Pressure Index",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// One generated prediction: the metrics plus the chart datasets derived
/// from them.
#[derive(Debug, Clone)]
pub struct PredictionView {
    pub state: MatchState,
    pub metrics: DerivedMetrics,
    pub phases: [PhaseRates; 3],
    pub projection: Vec<ProjectionPoint>,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub inputs: MatchState,
    pub focused: InputField,

    pub prediction: Option<PredictionView>,
    pub prediction_error: Option<String>,

    // Selector lists are snapshotted from the tables at startup.
    pub batters: Vec<String>,
    pub venues: Vec<String>,
    pub selector: usize,
    pub venue_selected: usize,

    pub compare_first: Option<String>,
    pub comparison: Option<ComparisonOutcome>,
    pub form: Option<(String, FormOutcome)>,
    pub wagon: Option<(String, Vec<ShotSample>)>,

    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(ctx: &DashboardContext) -> Self {
        let mut state = Self {
            screen: Screen::Predict,
            inputs: MatchState::default(),
            focused: InputField::Over,
            prediction: None,
            prediction_error: None,
            batters: ctx.tables.batter_names(),
            venues: ctx.tables.venue_names(),
            selector: 0,
            venue_selected: 0,
            compare_first: None,
            comparison: None,
            form: None,
            wagon: None,
            logs: VecDeque::new(),
            help_overlay: false,
        };

        state.push_log(format!(
            "[INFO] Loaded {}/3 model bundles, {} batting rows, {} bowling rows, {} venues",
            ctx.models.loaded_count(),
            ctx.tables.batting.len(),
            ctx.tables.bowling.len(),
            state.venues.len()
        ));
        for err in ctx.models.load_errors() {
            state.push_log(format!("[WARN] {err}"));
        }
        for note in &ctx.tables.load_notes {
            state.push_log(format!("[WARN] {note}"));
        }
        state
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }

    pub fn focus_next(&mut self) {
        let idx = (self.focused.index() + 1) % InputField::ALL.len();
        self.focused = InputField::ALL[idx];
    }

    pub fn focus_prev(&mut self) {
        let len = InputField::ALL.len();
        let idx = (self.focused.index() + len - 1) % len;
        self.focused = InputField::ALL[idx];
    }

    /// Nudges the focused field one step in `direction` (+1 / -1), then
    /// re-clamps the whole state.
    pub fn adjust_focused(&mut self, direction: i32) {
        let up = direction > 0;
        match self.focused {
            InputField::Over => {
                self.inputs.over = step_u8(self.inputs.over, up, 1, 20);
            }
            InputField::Runs => {
                self.inputs.cumulative_runs = step_u32(self.inputs.cumulative_runs, up, 5);
            }
            InputField::Wickets => {
                self.inputs.wickets_down = step_u8(self.inputs.wickets_down, up, 1, 10);
            }
            InputField::Balls => {
                self.inputs.balls_remaining = step_u32(self.inputs.balls_remaining, up, 6);
            }
            InputField::RunRate => {
                self.inputs.current_run_rate =
                    (self.inputs.current_run_rate + if up { 0.1 } else { -0.1 }).max(0.0);
            }
            InputField::Pressure => {
                self.inputs.pressure_index =
                    (self.inputs.pressure_index + if up { 0.5 } else { -0.5 }).clamp(0.0, 10.0);
            }
        }
        self.inputs = self.inputs.clamped();
    }

    pub fn apply_preset(&mut self, preset: ScenarioPreset) {
        self.inputs = preset.match_state();
        self.push_log(format!("[INFO] Scenario applied: {}", preset.label()));
    }

    /// Recomputes the metrics and chart data from the current inputs.
    /// Model failures degrade to a visible placeholder, never a crash.
    pub fn generate_predictions(&mut self, ctx: &DashboardContext) {
        let state = self.inputs.clamped();
        match compute_insights(&ctx.models, &state) {
            Ok(metrics) => {
                let projection = projection_series(&metrics, &state, &mut thread_rng());
                self.prediction = Some(PredictionView {
                    state,
                    metrics,
                    phases: phase_chart(&state),
                    projection,
                });
                self.prediction_error = None;
                self.push_log("[INFO] Predictions generated");
            }
            Err(err) => {
                let message = if let Some(unavailable) = err.downcast_ref::<ModelUnavailable>() {
                    format!("Unavailable ({})", unavailable.target)
                } else {
                    format!("Prediction failed: {err:#}")
                };
                self.prediction = None;
                self.prediction_error = Some(message.clone());
                self.push_log(format!("[WARN] {message}"));
            }
        }
    }

    pub fn selector_next(&mut self) {
        if !self.batters.is_empty() {
            self.selector = (self.selector + 1).min(self.batters.len() - 1);
        }
    }

    pub fn selector_prev(&mut self) {
        self.selector = self.selector.saturating_sub(1);
    }

    pub fn cycle_venue(&mut self) {
        if !self.venues.is_empty() {
            self.venue_selected = (self.venue_selected + 1) % self.venues.len();
        }
    }

    pub fn selected_batter(&self) -> Option<&str> {
        self.batters.get(self.selector).map(|s| s.as_str())
    }

    /// Confirms the highlighted player for the current screen's analysis.
    pub fn choose_selection(&mut self, ctx: &DashboardContext) {
        let Some(player) = self.selected_batter().map(|s| s.to_string()) else {
            self.push_log("[INFO] No player available to select");
            return;
        };

        match self.screen {
            Screen::Predict => {}
            Screen::Compare => match self.compare_first.take() {
                None => {
                    self.comparison = None;
                    self.compare_first = Some(player.clone());
                    self.push_log(format!("[INFO] Player 1: {player}"));
                }
                Some(first) => {
                    let outcome = compare_players(&ctx.tables, &first, &player);
                    if let ComparisonOutcome::NoData { missing } = &outcome {
                        self.push_log(format!(
                            "[WARN] No data found for: {}",
                            missing.join(", ")
                        ));
                    }
                    self.comparison = Some(outcome);
                }
            },
            Screen::Form => {
                let outcome = analyze_form(&ctx.tables, &player);
                match &outcome {
                    FormOutcome::NoData => {
                        self.push_log(format!("[WARN] No innings recorded for {player}"));
                    }
                    FormOutcome::InsufficientData { innings } => {
                        self.push_log(format!(
                            "[INFO] Insufficient data for {player} ({innings} innings)"
                        ));
                    }
                    FormOutcome::Series(_) => {}
                }
                self.form = Some((player, outcome));
            }
            Screen::WagonWheel => {
                let shots = generate_shots(&mut thread_rng());
                self.wagon = Some((player, shots));
            }
        }
    }
}

fn step_u8(value: u8, up: bool, step: u8, max: u8) -> u8 {
    if up {
        value.saturating_add(step).min(max)
    } else {
        value.saturating_sub(step)
    }
}

fn step_u32(value: u32, up: bool, step: u32) -> u32 {
    if up {
        value.saturating_add(step)
    } else {
        value.saturating_sub(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_store::test_support::fixed_store;
    use crate::reference_tables::BattingRecord;

    fn ctx() -> DashboardContext {
        let batting = vec![
            record("V Kohli", 82.0),
            record("V Kohli", 14.0),
            record("RG Sharma", 51.0),
        ];
        DashboardContext {
            models: fixed_store(),
            tables: ReferenceTables {
                batting,
                ..Default::default()
            },
        }
    }

    fn record(batter: &str, runs: f64) -> BattingRecord {
        BattingRecord {
            batter: batter.to_string(),
            runs,
            strike_rate: Some(120.0),
            last_5_avg: None,
        }
    }

    #[test]
    fn preset_overwrites_all_six_inputs() {
        let ctx = ctx();
        let mut app = AppState::new(&ctx);
        app.inputs.cumulative_runs = 999;
        app.apply_preset(ScenarioPreset::DeathOvers);
        assert_eq!(app.inputs, ScenarioPreset::DeathOvers.match_state());
    }

    #[test]
    fn generate_populates_metrics_and_charts() {
        let ctx = ctx();
        let mut app = AppState::new(&ctx);
        app.generate_predictions(&ctx);
        let view = app.prediction.as_ref().expect("prediction");
        assert!(view.metrics.win_probability >= 5.0);
        assert!(!view.projection.is_empty());
        assert!(app.prediction_error.is_none());
    }

    #[test]
    fn generate_against_empty_store_degrades_to_placeholder() {
        let ctx = DashboardContext {
            models: ModelStore::default(),
            tables: ReferenceTables::default(),
        };
        let mut app = AppState::new(&ctx);
        app.generate_predictions(&ctx);
        assert!(app.prediction.is_none());
        let message = app.prediction_error.as_deref().unwrap_or_default();
        assert!(message.contains("Unavailable"));
    }

    #[test]
    fn compare_flow_takes_two_selections() {
        let ctx = ctx();
        let mut app = AppState::new(&ctx);
        app.screen = Screen::Compare;
        app.selector = 0;
        app.choose_selection(&ctx);
        assert!(app.comparison.is_none());
        app.selector = 1;
        app.choose_selection(&ctx);
        match app.comparison {
            Some(ComparisonOutcome::Ready(ref a, ref b)) => {
                assert_eq!(a.name, "V Kohli");
                assert_eq!(b.name, "RG Sharma");
            }
            ref other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn adjust_focused_respects_bounds() {
        let ctx = ctx();
        let mut app = AppState::new(&ctx);
        app.focused = InputField::Over;
        app.inputs.over = 20;
        app.adjust_focused(1);
        assert_eq!(app.inputs.over, 20);

        app.focused = InputField::Pressure;
        app.inputs.pressure_index = 0.0;
        app.adjust_focused(-1);
        assert_eq!(app.inputs.pressure_index, 0.0);
    }

    #[test]
    fn log_ring_is_bounded() {
        let ctx = ctx();
        let mut app = AppState::new(&ctx);
        for i in 0..200 {
            app.push_log(format!("[INFO] line {i}"));
        }
        assert_eq!(app.logs.len(), LOG_CAPACITY);
    }
}
