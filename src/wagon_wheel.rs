use rand::Rng;
use rand::seq::SliceRandom;

pub const SHOT_SAMPLES: usize = 50;
pub const RUN_VALUES: [u8; 5] = [1, 2, 3, 4, 6];

/// One synthetic shot. Angle in degrees (0..360), distance 10..100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSample {
    pub angle_deg: f64,
    pub distance: f64,
    pub runs: u8,
}

impl ShotSample {
    /// Cartesian projection for plotting on a square chart, clockwise
    /// from the top like a scoring wagon wheel.
    pub fn xy(&self) -> (f64, f64) {
        let rad = self.angle_deg.to_radians();
        (self.distance * rad.sin(), self.distance * rad.cos())
    }
}

/// Uniformly-random placeholder data for the wagon wheel. There is no
/// shot-location source in the reference tables, so this is purely a
/// visual illustration and must not be read as an analytic result.
pub fn generate_shots<R: Rng>(rng: &mut R) -> Vec<ShotSample> {
    (0..SHOT_SAMPLES)
        .map(|_| ShotSample {
            angle_deg: rng.gen_range(0.0..360.0),
            distance: rng.gen_range(10.0..100.0),
            runs: *RUN_VALUES.choose(rng).unwrap_or(&1),
        })
        .collect()
}

/// Groups shots by run value for the chart legend, in ascending order.
pub fn bucket_by_runs(shots: &[ShotSample]) -> Vec<(u8, Vec<ShotSample>)> {
    RUN_VALUES
        .iter()
        .map(|run| {
            (
                *run,
                shots.iter().copied().filter(|s| s.runs == *run).collect(),
            )
        })
        .collect()
}
