//! Online SOM training.
//!
//! Every iteration walks the full sample sequence in order. Each sample finds
//! its best matching unit and pulls a clipped square window of cells around it
//! towards itself, weighted by a Gaussian of the grid distance. Updates are
//! applied immediately, so a sample sees every update made before it.

use crate::config::SomConfig;
use crate::error::{Result, SomError};
use crate::som::{PrototypeGrid, TrainingSchedule};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Grids with at least this many cells search for the BMU in parallel.
pub const PARALLEL_BMU_THRESHOLD: usize = 4096;

/// Per-iteration training metrics.
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    /// Mean BMU distance over the samples of each iteration, measured at search time.
    pub quantization_errors: Vec<f64>,
    /// Learning rates used.
    pub learning_rates: Vec<f64>,
    /// Neighborhood radii used.
    pub radii: Vec<f64>,
}

/// SOM trainer owning the prototype grid.
#[derive(Debug)]
pub struct SomTrainer {
    config: SomConfig,
    schedule: TrainingSchedule,
    grid: PrototypeGrid,
    metrics: TrainingMetrics,
}

impl SomTrainer {
    /// Creates a trainer with a randomly initialized grid.
    ///
    /// The grid is drawn from `ChaCha8Rng` seeded with `config.seed`, or from
    /// entropy when no seed is set.
    pub fn new(config: SomConfig) -> Result<Self> {
        Self::validate(&config)?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let grid = PrototypeGrid::new_random(
            config.grid_width,
            config.grid_height,
            config.weight_dimension,
            &mut rng,
        );

        Ok(Self::assemble(config, grid))
    }

    /// Creates a trainer around an explicit initial grid.
    pub fn with_grid(config: SomConfig, grid: PrototypeGrid) -> Result<Self> {
        Self::validate(&config)?;

        let expected = (config.grid_width, config.grid_height, config.weight_dimension);
        if grid.shape() != expected {
            return Err(SomError::InvalidParameter(format!(
                "grid shape {:?} does not match configured shape {:?}",
                grid.shape(),
                expected
            )));
        }

        Ok(Self::assemble(config, grid))
    }

    fn assemble(config: SomConfig, grid: PrototypeGrid) -> Self {
        let schedule = TrainingSchedule::new(
            config.initial_radius(),
            config.learning_rate,
            config.max_iterations,
        );
        Self {
            config,
            schedule,
            grid,
            metrics: TrainingMetrics::default(),
        }
    }

    /// Rejects configurations the schedule cannot decay from.
    ///
    /// An initial radius of exactly 1 (2×2, 2×1 and 1×2 grids) is accepted:
    /// `ln(1) = 0` gives an infinite time constant, so radius and learning
    /// rate stay at their initial values. This keeps the single-step 2×2 map,
    /// where every cell is pulled by `rate * exp(-d²/2)`, a valid run. Below 1
    /// (a 1×1 grid) the schedule would grow, and that is an error.
    fn validate(config: &SomConfig) -> Result<()> {
        if config.grid_width == 0 || config.grid_height == 0 {
            return Err(SomError::InvalidParameter(format!(
                "grid dimensions must be positive, got {}x{}",
                config.grid_width, config.grid_height
            )));
        }
        if config.max_iterations == 0 {
            return Err(SomError::InvalidParameter(
                "max_iterations must be positive".to_string(),
            ));
        }
        if config.weight_dimension == 0 {
            return Err(SomError::InvalidParameter(
                "weight_dimension must be positive".to_string(),
            ));
        }
        if !config.learning_rate.is_finite() || config.learning_rate <= 0.0 {
            return Err(SomError::InvalidParameter(format!(
                "learning_rate must be a positive number, got {}",
                config.learning_rate
            )));
        }
        // ln(radius) < 0 would make the schedule grow instead of decay.
        let radius = config.initial_radius();
        if radius < 1.0 {
            return Err(SomError::InvalidParameter(format!(
                "initial neighborhood radius {} is below 1; use a grid with a side of at least 2",
                radius
            )));
        }
        Ok(())
    }

    /// The prototype grid in its current state.
    pub fn grid(&self) -> &PrototypeGrid {
        &self.grid
    }

    /// Metrics recorded by the last call to [`train`](Self::train).
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Trains the grid on `samples` for exactly `max_iterations` passes.
    pub fn train(&mut self, samples: &[Vec<f64>]) -> Result<&PrototypeGrid> {
        self.train_with_callback(samples, |_, _| {})
    }

    /// Trains like [`train`](Self::train), calling `on_iteration(iteration, max_iterations)`
    /// after every completed iteration.
    pub fn train_with_callback<F>(
        &mut self,
        samples: &[Vec<f64>],
        mut on_iteration: F,
    ) -> Result<&PrototypeGrid>
    where
        F: FnMut(usize, usize),
    {
        if samples.is_empty() {
            return Err(SomError::EmptyInput("No training samples provided".to_string()));
        }
        let dim = self.grid.dim();
        if let Some(bad) = samples.iter().find(|s| s.len() != dim) {
            return Err(SomError::DimensionMismatch {
                expected: dim,
                found: bad.len(),
            });
        }

        let max_iterations = self.config.max_iterations;
        let parallel = self.grid.total_cells() >= PARALLEL_BMU_THRESHOLD;
        let log_every = (max_iterations / 10).max(1);

        info!(
            "Starting SOM training: {}x{} grid, {} samples, {} iterations (time constant {:.3})",
            self.grid.width(),
            self.grid.height(),
            samples.len(),
            max_iterations,
            self.schedule.time_constant()
        );

        self.metrics = TrainingMetrics::default();

        for iteration in 0..max_iterations {
            let radius = self.schedule.radius(iteration);
            let rate = self.schedule.learning_rate(iteration);
            if !radius.is_finite() || radius <= 0.0 {
                return Err(SomError::DegenerateRadius { iteration, radius });
            }

            let mut error_sum = 0.0;
            for sample in samples {
                let bmu = if parallel {
                    self.grid.find_bmu_parallel(sample)?
                } else {
                    self.grid.find_bmu(sample)?
                };
                error_sum += bmu.distance_sq.sqrt();
                self.update_neighborhood(sample, bmu.x, bmu.y, radius, rate);
            }

            self.metrics.quantization_errors.push(error_sum / samples.len() as f64);
            self.metrics.learning_rates.push(rate);
            self.metrics.radii.push(radius);

            if iteration % log_every == 0 || iteration == max_iterations - 1 {
                info!(
                    "Iteration {}/{}: lr={:.4}, radius={:.2}",
                    iteration + 1,
                    max_iterations,
                    rate,
                    radius
                );
            }
            on_iteration(iteration, max_iterations);
        }

        debug!(
            "Final quantization error: {:.6}",
            self.metrics.quantization_errors.last().copied().unwrap_or_default()
        );
        info!("SOM training completed");
        Ok(&self.grid)
    }

    /// Pulls every cell in the clipped square window around `(bx, by)` towards `sample`.
    fn update_neighborhood(&mut self, sample: &[f64], bx: usize, by: usize, radius: f64, rate: f64) {
        let (x_min, x_max, y_min, y_max) =
            neighborhood_window(bx, by, radius, self.grid.width(), self.grid.height());
        let two_sigma_sq = 2.0 * radius * radius;

        for gx in x_min..=x_max {
            for gy in y_min..=y_max {
                let dx = gx as f64 - bx as f64;
                let dy = gy as f64 - by as f64;
                let influence = (-(dx * dx + dy * dy) / two_sigma_sq).exp();
                let index = self.grid.cell_index(gx, gy);
                self.grid.pull_towards(index, sample, rate * influence);
            }
        }
    }
}

/// Inclusive window bounds `(x_min, x_max, y_min, y_max)` around a BMU.
///
/// The window reaches `floor(radius) + 1` cells in every direction and is
/// clipped to the grid. It is a square box, not a circle.
pub fn neighborhood_window(
    bx: usize,
    by: usize,
    radius: f64,
    width: usize,
    height: usize,
) -> (usize, usize, usize, usize) {
    let reach = radius.floor() as usize + 1;
    (
        bx.saturating_sub(reach),
        (bx + reach).min(width - 1),
        by.saturating_sub(reach),
        (by + reach).min(height - 1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_config() -> SomConfig {
        SomConfig {
            grid_width: 8,
            grid_height: 6,
            max_iterations: 20,
            learning_rate: 0.1,
            weight_dimension: 3,
            seed: Some(42),
        }
    }

    fn test_samples() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
            vec![0.2, 0.4, 0.6],
        ]
    }

    #[test]
    fn test_zero_width_rejected() {
        let config = SomConfig { grid_width: 0, ..test_config() };
        assert!(matches!(SomTrainer::new(config), Err(SomError::InvalidParameter(_))));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = SomConfig { max_iterations: 0, ..test_config() };
        assert!(matches!(SomTrainer::new(config), Err(SomError::InvalidParameter(_))));
    }

    #[test]
    fn test_bad_learning_rate_rejected() {
        for rate in [0.0, -0.1, f64::NAN] {
            let config = SomConfig { learning_rate: rate, ..test_config() };
            assert!(matches!(SomTrainer::new(config), Err(SomError::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_single_cell_grid_rejected() {
        let config = SomConfig { grid_width: 1, grid_height: 1, ..test_config() };
        assert!(matches!(SomTrainer::new(config), Err(SomError::InvalidParameter(_))));
    }

    #[test]
    fn test_with_grid_shape_mismatch() {
        let grid = PrototypeGrid::new_zeros(4, 4, 3);
        let err = SomTrainer::with_grid(test_config(), grid).unwrap_err();
        assert!(matches!(err, SomError::InvalidParameter(_)));
    }

    #[test]
    fn test_empty_input() {
        let mut trainer = SomTrainer::new(test_config()).unwrap();
        assert!(matches!(trainer.train(&[]), Err(SomError::EmptyInput(_))));
    }

    #[test]
    fn test_dimension_mismatch_leaves_grid_untouched() {
        let mut trainer = SomTrainer::new(test_config()).unwrap();
        let before = trainer.grid().clone();
        let samples = vec![vec![0.5, 0.5, 0.5], vec![1.0, 1.0]];

        let err = trainer.train(&samples).unwrap_err();
        assert!(matches!(err, SomError::DimensionMismatch { expected: 3, found: 2 }));
        assert_eq!(trainer.grid(), &before);
    }

    #[test]
    fn test_shape_invariance() {
        let mut trainer = SomTrainer::new(test_config()).unwrap();
        let grid = trainer.train(&test_samples()).unwrap();
        assert_eq!(grid.shape(), (8, 6, 3));
        assert!(grid.is_finite());
    }

    #[test]
    fn test_deterministic_with_seed() {
        let samples = test_samples();

        let mut a = SomTrainer::new(test_config()).unwrap();
        let mut b = SomTrainer::new(test_config()).unwrap();
        assert_eq!(a.grid(), b.grid());

        a.train(&samples).unwrap();
        b.train(&samples).unwrap();
        assert_eq!(a.grid().as_slice(), b.grid().as_slice());
    }

    #[test]
    fn test_samples_not_mutated() {
        let samples = test_samples();
        let copy = samples.clone();
        let mut trainer = SomTrainer::new(test_config()).unwrap();
        trainer.train(&samples).unwrap();
        assert_eq!(samples, copy);
    }

    #[test]
    fn test_metrics_recorded() {
        let mut trainer = SomTrainer::new(test_config()).unwrap();
        trainer.train(&test_samples()).unwrap();

        let metrics = trainer.metrics();
        assert_eq!(metrics.radii.len(), 20);
        assert_eq!(metrics.learning_rates.len(), 20);
        assert_eq!(metrics.quantization_errors.len(), 20);
        assert_relative_eq!(metrics.radii[0], 4.0);
        assert!(metrics.quantization_errors[19] < metrics.quantization_errors[0]);
    }

    #[test]
    fn test_callback_sees_every_iteration() {
        let mut trainer = SomTrainer::new(test_config()).unwrap();
        let mut seen = Vec::new();
        trainer
            .train_with_callback(&test_samples(), |i, total| seen.push((i, total)))
            .unwrap();
        assert_eq!(seen.len(), 20);
        assert_eq!(seen[0], (0, 20));
        assert_eq!(seen[19], (19, 20));
    }

    #[test]
    fn test_window_clipped_at_corners() {
        assert_eq!(neighborhood_window(0, 0, 10.0, 5, 4), (0, 4, 0, 3));
        assert_eq!(neighborhood_window(4, 3, 10.0, 5, 4), (0, 4, 0, 3));
        assert_eq!(neighborhood_window(4, 0, 0.5, 5, 4), (3, 4, 0, 1));
    }

    #[test]
    fn test_window_reach() {
        // floor(2.7) + 1 = 3 cells each way.
        assert_eq!(neighborhood_window(10, 10, 2.7, 30, 30), (7, 13, 7, 13));
        assert_eq!(neighborhood_window(10, 10, 3.0, 30, 30), (6, 14, 6, 14));
    }

    #[test]
    fn test_cells_outside_window_untouched() {
        // 12x12 grid, radius0 = 6, single iteration: reach = 7.
        let config = SomConfig {
            grid_width: 12,
            grid_height: 12,
            max_iterations: 1,
            ..test_config()
        };
        let mut trainer =
            SomTrainer::with_grid(config, PrototypeGrid::new_zeros(12, 12, 3)).unwrap();
        trainer.train(&[vec![1.0, 1.0, 1.0]]).unwrap();

        let grid = trainer.grid();
        // BMU is (0, 0); x and y in 0..=7 are updated, 8.. are not.
        assert!(grid.get(7, 7).unwrap()[0] > 0.0);
        assert_eq!(grid.get(8, 0).unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(grid.get(0, 8).unwrap(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_two_by_two_single_step() {
        let config = SomConfig {
            grid_width: 2,
            grid_height: 2,
            max_iterations: 1,
            learning_rate: 0.5,
            weight_dimension: 3,
            seed: None,
        };
        let mut trainer =
            SomTrainer::with_grid(config, PrototypeGrid::new_zeros(2, 2, 3)).unwrap();
        let grid = trainer.train(&[vec![1.0, 1.0, 1.0]]).unwrap();

        // radius(0) = 1, rate(0) = 0.5, BMU (0, 0) by tie-break.
        let expected = |d_sq: f64| 0.5 * (-d_sq / 2.0).exp();
        for &(x, y, d_sq) in &[(0, 0, 0.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 2.0)] {
            for &v in grid.get(x, y).unwrap() {
                assert_relative_eq!(v, expected(d_sq), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_unit_radius_grids_keep_a_constant_schedule() {
        for &(width, height) in &[(2, 2), (2, 1), (1, 2)] {
            let config = SomConfig {
                grid_width: width,
                grid_height: height,
                max_iterations: 4,
                learning_rate: 0.3,
                ..test_config()
            };
            let mut trainer = SomTrainer::new(config).unwrap();
            trainer.train(&test_samples()).unwrap();

            let metrics = trainer.metrics();
            assert_eq!(metrics.radii, vec![1.0; 4]);
            assert_eq!(metrics.learning_rates, vec![0.3; 4]);
            assert!(trainer.grid().is_finite());
        }
    }

    #[test]
    fn test_identical_samples_converge() {
        let config = SomConfig { max_iterations: 30, ..test_config() };
        let mut trainer = SomTrainer::new(config).unwrap();
        let samples = vec![vec![0.3, 0.6, 0.9]; 4];

        let mut distances = Vec::new();
        for _ in 0..5 {
            trainer.train(&samples).unwrap();
            distances.push(trainer.grid().find_bmu(&samples[0]).unwrap().distance_sq);
        }

        for pair in distances.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-15);
        }
        let qe = &trainer.metrics().quantization_errors;
        for pair in qe.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-15);
        }
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        // 64x64 = 4096 cells takes the parallel BMU path.
        let config = SomConfig {
            grid_width: 64,
            grid_height: 64,
            max_iterations: 2,
            ..test_config()
        };
        let mut parallel = SomTrainer::new(config.clone()).unwrap();
        parallel.train(&test_samples()).unwrap();

        let mut grid = SomTrainer::new(config.clone()).unwrap().grid().clone();
        let schedule = TrainingSchedule::new(config.initial_radius(), config.learning_rate, 2);
        for iteration in 0..2 {
            let radius = schedule.radius(iteration);
            let rate = schedule.learning_rate(iteration);
            for sample in test_samples() {
                let bmu = grid.find_bmu(&sample).unwrap();
                let (x0, x1, y0, y1) = neighborhood_window(bmu.x, bmu.y, radius, 64, 64);
                for gx in x0..=x1 {
                    for gy in y0..=y1 {
                        let dx = gx as f64 - bmu.x as f64;
                        let dy = gy as f64 - bmu.y as f64;
                        let influence = (-(dx * dx + dy * dy) / (2.0 * radius * radius)).exp();
                        let index = grid.cell_index(gx, gy);
                        grid.pull_towards(index, &sample, rate * influence);
                    }
                }
            }
        }

        assert_eq!(parallel.grid().as_slice(), grid.as_slice());
    }
}
