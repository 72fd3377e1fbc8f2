//! Prototype grid for the Self-Organizing Map.

use crate::error::{Result, SomError};
use rand::Rng;
use rayon::prelude::*;

/// The best matching unit for a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bmu {
    /// Grid x coordinate.
    pub x: usize,
    /// Grid y coordinate.
    pub y: usize,
    /// Flat cell index (`x * height + y`).
    pub index: usize,
    /// Squared Euclidean distance between the sample and the cell's prototype.
    pub distance_sq: f64,
}

/// A `width × height` grid of prototype vectors of length `dim`.
///
/// Cells are stored x-major in one flat buffer: cell `(x, y)` occupies
/// `data[(x * height + y) * dim..][..dim]`. This is also the BMU scan order,
/// so ties are resolved towards the smallest x, then the smallest y.
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeGrid {
    width: usize,
    height: usize,
    dim: usize,
    data: Vec<f64>,
}

impl PrototypeGrid {
    /// Creates a grid with every component drawn uniformly from `[0, 1)`.
    pub fn new_random<R: Rng>(width: usize, height: usize, dim: usize, rng: &mut R) -> Self {
        let data = (0..width * height * dim).map(|_| rng.gen::<f64>()).collect();
        Self {
            width,
            height,
            dim,
            data,
        }
    }

    /// Creates a grid with zero-initialized prototypes.
    pub fn new_zeros(width: usize, height: usize, dim: usize) -> Self {
        Self {
            width,
            height,
            dim,
            data: vec![0.0; width * height * dim],
        }
    }

    /// Number of cells along x.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of cells along y.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Length of each prototype vector.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns `(width, height, dim)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.dim)
    }

    /// Returns the total number of cells.
    #[inline]
    pub fn total_cells(&self) -> usize {
        self.width * self.height
    }

    /// The flat x-major component buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Converts 2D coordinates to a flat cell index.
    #[inline]
    pub fn cell_index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// Converts a flat cell index to 2D coordinates.
    #[inline]
    pub fn cell_coords(&self, index: usize) -> (usize, usize) {
        (index / self.height, index % self.height)
    }

    /// Gets the prototype at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&[f64]> {
        if x < self.width && y < self.height {
            let offset = self.cell_index(x, y) * self.dim;
            Some(&self.data[offset..offset + self.dim])
        } else {
            None
        }
    }

    /// Gets a mutable reference to the prototype at `(x, y)`.
    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut [f64]> {
        if x < self.width && y < self.height {
            let offset = self.cell_index(x, y) * self.dim;
            Some(&mut self.data[offset..offset + self.dim])
        } else {
            None
        }
    }

    fn check_sample(&self, sample: &[f64]) -> Result<()> {
        if sample.len() != self.dim {
            return Err(SomError::DimensionMismatch {
                expected: self.dim,
                found: sample.len(),
            });
        }
        if self.data.is_empty() {
            return Err(SomError::EmptyInput("grid has no cells".to_string()));
        }
        Ok(())
    }

    #[inline]
    fn distance_sq_at(&self, index: usize, sample: &[f64]) -> f64 {
        let offset = index * self.dim;
        let mut dist = 0.0;
        for (w, s) in self.data[offset..offset + self.dim].iter().zip(sample) {
            let diff = s - w;
            dist += diff * diff;
        }
        dist
    }

    fn bmu_at(&self, index: usize, distance_sq: f64) -> Bmu {
        let (x, y) = self.cell_coords(index);
        Bmu {
            x,
            y,
            index,
            distance_sq,
        }
    }

    /// Finds the Best Matching Unit (BMU) for a sample.
    ///
    /// Scans cells in x-major order and keeps the first cell with the
    /// strictly smallest squared distance.
    pub fn find_bmu(&self, sample: &[f64]) -> Result<Bmu> {
        self.check_sample(sample)?;

        let mut best_idx = 0;
        let mut best_dist = f64::INFINITY;
        for i in 0..self.total_cells() {
            let dist = self.distance_sq_at(i, sample);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        Ok(self.bmu_at(best_idx, best_dist))
    }

    /// Finds the Best Matching Unit (BMU) in parallel.
    ///
    /// Reduces on `(distance, index)` so ties go to the lowest flat index,
    /// giving the same cell as [`find_bmu`](Self::find_bmu).
    pub fn find_bmu_parallel(&self, sample: &[f64]) -> Result<Bmu> {
        self.check_sample(sample)?;

        let (best_idx, best_dist) = (0..self.total_cells())
            .into_par_iter()
            .map(|i| (i, self.distance_sq_at(i, sample)))
            .reduce(
                || (usize::MAX, f64::INFINITY),
                |a, b| {
                    if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) {
                        b
                    } else {
                        a
                    }
                },
            );

        // Every distance was NaN; fall back to the sequential answer.
        if best_idx == usize::MAX {
            return Ok(self.bmu_at(0, best_dist));
        }
        Ok(self.bmu_at(best_idx, best_dist))
    }

    /// Mean Euclidean distance from each sample to its BMU.
    pub fn quantization_error(&self, samples: &[Vec<f64>]) -> Result<f64> {
        if samples.is_empty() {
            return Err(SomError::EmptyInput("no samples to measure".to_string()));
        }
        let mut total = 0.0;
        for sample in samples {
            total += self.find_bmu(sample)?.distance_sq.sqrt();
        }
        Ok(total / samples.len() as f64)
    }

    /// Moves the prototype at `index` towards `sample` by `amount`.
    #[inline]
    pub(crate) fn pull_towards(&mut self, index: usize, sample: &[f64], amount: f64) {
        let offset = index * self.dim;
        for (w, s) in self.data[offset..offset + self.dim].iter_mut().zip(sample) {
            *w += amount * (s - *w);
        }
    }

    /// Returns true if every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}
