//! Exponential decay of the neighborhood radius and learning rate.

/// Decay schedule shared by the neighborhood radius and the learning rate.
///
/// Both decay as `initial * exp(-iteration / time_constant)` with
/// `time_constant = max_iterations / ln(initial_radius)`. An initial radius
/// of exactly 1 gives an infinite time constant and a constant schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSchedule {
    initial_radius: f64,
    initial_learning_rate: f64,
    time_constant: f64,
}

impl TrainingSchedule {
    /// Creates a schedule. Callers validate `initial_radius >= 1`.
    pub fn new(initial_radius: f64, initial_learning_rate: f64, max_iterations: usize) -> Self {
        let log_radius = initial_radius.ln();
        let time_constant = if log_radius == 0.0 {
            f64::INFINITY
        } else {
            max_iterations as f64 / log_radius
        };

        Self {
            initial_radius,
            initial_learning_rate,
            time_constant,
        }
    }

    /// The decay time constant.
    #[inline]
    pub fn time_constant(&self) -> f64 {
        self.time_constant
    }

    /// Multiplicative decay factor at `iteration`, in `(0, 1]`.
    #[inline]
    pub fn decay(&self, iteration: usize) -> f64 {
        (-(iteration as f64) / self.time_constant).exp()
    }

    /// Neighborhood radius at `iteration`.
    #[inline]
    pub fn radius(&self, iteration: usize) -> f64 {
        self.initial_radius * self.decay(iteration)
    }

    /// Learning rate at `iteration`.
    #[inline]
    pub fn learning_rate(&self, iteration: usize) -> f64 {
        self.initial_learning_rate * self.decay(iteration)
    }
}
