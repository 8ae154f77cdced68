use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 6;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "over",
    "cumulative_runs",
    "wickets_down",
    "balls_remaining",
    "current_run_rate",
    "pressure_index",
];

/// One innings snapshot. Field order matches the feature vector the
/// models were fitted against, so `features()` is the only place the six
/// inputs are flattened into a positional array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub over: u8,
    pub cumulative_runs: u32,
    pub wickets_down: u8,
    pub balls_remaining: u32,
    pub current_run_rate: f64,
    pub pressure_index: f64,
}

impl Default for MatchState {
    fn default() -> Self {
        // Same resting values the dashboard controls start on.
        Self {
            over: 10,
            cumulative_runs: 80,
            wickets_down: 3,
            balls_remaining: 60,
            current_run_rate: 8.0,
            pressure_index: 2.5,
        }
    }
}

impl MatchState {
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.over as f64,
            self.cumulative_runs as f64,
            self.wickets_down as f64,
            self.balls_remaining as f64,
            self.current_run_rate,
            self.pressure_index,
        ]
    }

    /// Clamps every field into its documented range.
    pub fn clamped(mut self) -> Self {
        self.over = self.over.min(20);
        self.wickets_down = self.wickets_down.min(10);
        self.current_run_rate = self.current_run_rate.max(0.0);
        self.pressure_index = self.pressure_index.clamp(0.0, 10.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioPreset {
    Powerplay,
    MiddleOvers,
    DeathOvers,
}

impl ScenarioPreset {
    pub const ALL: [ScenarioPreset; 3] = [
        ScenarioPreset::Powerplay,
        ScenarioPreset::MiddleOvers,
        ScenarioPreset::DeathOvers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScenarioPreset::Powerplay => "Powerplay",
            ScenarioPreset::MiddleOvers => "Middle Overs",
            ScenarioPreset::DeathOvers => "Death Overs",
        }
    }

    /// The fixed tuple each preset substitutes for the six inputs.
    /// These literals are pinned; tests depend on them exactly.
    pub fn match_state(self) -> MatchState {
        match self {
            ScenarioPreset::Powerplay => MatchState {
                over: 5,
                cumulative_runs: 35,
                wickets_down: 1,
                balls_remaining: 90,
                current_run_rate: 7.0,
                pressure_index: 1.5,
            },
            ScenarioPreset::MiddleOvers => MatchState {
                over: 12,
                cumulative_runs: 95,
                wickets_down: 4,
                balls_remaining: 48,
                current_run_rate: 7.9,
                pressure_index: 3.2,
            },
            ScenarioPreset::DeathOvers => MatchState {
                over: 18,
                cumulative_runs: 145,
                wickets_down: 6,
                balls_remaining: 12,
                current_run_rate: 8.1,
                pressure_index: 4.5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_vector_preserves_field_order() {
        let state = MatchState {
            over: 12,
            cumulative_runs: 95,
            wickets_down: 4,
            balls_remaining: 48,
            current_run_rate: 7.9,
            pressure_index: 3.2,
        };
        assert_eq!(state.features(), [12.0, 95.0, 4.0, 48.0, 7.9, 3.2]);
    }

    #[test]
    fn powerplay_preset_is_exact_literal() {
        let s = ScenarioPreset::Powerplay.match_state();
        assert_eq!(
            (
                s.over,
                s.cumulative_runs,
                s.wickets_down,
                s.balls_remaining,
                s.current_run_rate,
                s.pressure_index
            ),
            (5, 35, 1, 90, 7.0, 1.5)
        );
    }

    #[test]
    fn presets_are_idempotent() {
        for preset in ScenarioPreset::ALL {
            assert_eq!(preset.match_state(), preset.match_state());
        }
    }

    #[test]
    fn clamped_bounds_out_of_range_fields() {
        let s = MatchState {
            over: 33,
            cumulative_runs: 10,
            wickets_down: 14,
            balls_remaining: 5,
            current_run_rate: -1.0,
            pressure_index: 12.0,
        }
        .clamped();
        assert_eq!(s.over, 20);
        assert_eq!(s.wickets_down, 10);
        assert_eq!(s.current_run_rate, 0.0);
        assert_eq!(s.pressure_index, 10.0);
    }
}
