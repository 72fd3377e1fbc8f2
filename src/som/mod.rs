//! Self-Organizing Map (SOM) module.
//!
//! - **Grid**: flat x-major prototype storage and BMU search (grid.rs)
//! - **Schedule**: exponential radius and learning-rate decay (schedule.rs)
//! - **Training**: sequential online training loop (training.rs)

mod grid;
mod schedule;
pub mod training;

pub use grid::{Bmu, PrototypeGrid};
pub use schedule::TrainingSchedule;
pub use training::{neighborhood_window, SomTrainer, TrainingMetrics, PARALLEL_BMU_THRESHOLD};
