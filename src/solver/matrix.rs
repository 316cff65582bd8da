//! Augmented matrix assembly and exact solving.

use num_traits::Zero;

use crate::circuit::Scalar;
use crate::error::{NodalError, Result};

/// Augmented nodal system `[A | z]` over exact rationals.
///
/// `size` rows, one per non-ground node, each holding `size` coefficients
/// followed by the right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedMatrix {
    /// Coefficients and right-hand sides (row-major, `size + 1` columns)
    pub data: Vec<Scalar>,
    /// Number of unknowns
    pub size: usize,
}

impl AugmentedMatrix {
    /// Create an all-zero system with `size` unknowns.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![Scalar::zero(); size * (size + 1)],
            size,
        }
    }

    /// Number of columns including the right-hand side.
    pub fn width(&self) -> usize {
        self.size + 1
    }

    /// Get coefficient at (row, col).
    pub fn get(&self, row: usize, col: usize) -> &Scalar {
        &self.data[row * self.width() + col]
    }

    /// Set coefficient at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: Scalar) {
        let w = self.width();
        self.data[row * w + col] = value;
    }

    /// Add to coefficient at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: &Scalar) {
        let w = self.width();
        self.data[row * w + col] += value;
    }

    /// Subtract from coefficient at (row, col).
    pub fn sub(&mut self, row: usize, col: usize, value: &Scalar) {
        let w = self.width();
        self.data[row * w + col] -= value;
    }

    /// Get the right-hand side of a row.
    pub fn rhs(&self, row: usize) -> &Scalar {
        self.get(row, self.size)
    }

    /// Set the right-hand side of a row.
    pub fn set_rhs(&mut self, row: usize, value: Scalar) {
        let n = self.size;
        self.set(row, n, value);
    }

    /// Add to the right-hand side of a row.
    pub fn add_rhs(&mut self, row: usize, value: &Scalar) {
        let n = self.size;
        self.add(row, n, value);
    }

    /// Subtract from the right-hand side of a row.
    pub fn sub_rhs(&mut self, row: usize, value: &Scalar) {
        let n = self.size;
        self.sub(row, n, value);
    }

    /// Zero a whole row, right-hand side included.
    pub fn clear_row(&mut self, row: usize) {
        let w = self.width();
        self.data[row * w..(row + 1) * w].fill(Scalar::zero());
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        let w = self.width();
        for j in 0..w {
            self.data.swap(a * w + j, b * w + j);
        }
    }

    /// Reduce the system in place to reduced row-echelon form.
    ///
    /// Fails with [`NodalError::SingularSystem`] when some column has no
    /// pivot, i.e. the system has no unique solution.
    pub fn reduce(&mut self) -> Result<()> {
        let n = self.size;
        let w = self.width();

        for col in 0..n {
            let pivot_row = (col..n)
                .find(|&r| !self.data[r * w + col].is_zero())
                .ok_or(NodalError::SingularSystem)?;
            if pivot_row != col {
                self.swap_rows(pivot_row, col);
            }

            // Normalize pivot row
            let pivot = self.data[col * w + col].clone();
            for j in col..w {
                self.data[col * w + j] /= &pivot;
            }

            // Eliminate the column from every other row
            for r in 0..n {
                if r == col || self.data[r * w + col].is_zero() {
                    continue;
                }
                let factor = self.data[r * w + col].clone();
                for j in col..w {
                    let delta = &factor * &self.data[col * w + j];
                    self.data[r * w + j] -= delta;
                }
            }
        }

        Ok(())
    }

    /// Solve the system, returning one value per unknown in row order.
    pub fn solve(&self) -> Result<Vec<Scalar>> {
        let mut reduced = self.clone();
        reduced.reduce()?;
        Ok((0..reduced.size).map(|r| reduced.rhs(r).clone()).collect())
    }
}
