// src/solution.rs

use crate::matrix::{is_zero, Column, Matrix, PivotPosition};
use ndarray::ArrayView1;
use rand::Rng;

/// Parametric description of the solution set of a consistent, underdetermined system.
///
/// Built from a matrix in reduced row-echelon form and a right-hand side column that
/// has been replayed into the same frame. A concrete solution is
/// `particular + Σ tᵢ · dependents[i]` for any choice of free parameters `tᵢ`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionDescriptor {
    particular: Column,
    dependents: Vec<Column>,
}

impl SolutionDescriptor {
    /// Builds the descriptor for `reduced · x = column`.
    ///
    /// # Arguments
    /// * `reduced`: Coefficient matrix in RREF.
    /// * `column`: Right-hand side in the frame of `reduced`.
    /// * `pivots`: Pivot positions of `reduced`.
    pub fn new(reduced: &Matrix, column: ArrayView1<'_, f64>, pivots: &[PivotPosition]) -> Self {
        let unknowns = reduced.ncols();
        let mut is_pivot_col = vec![false; unknowns];
        let mut particular = Column::zeros(unknowns);
        for pivot in pivots {
            is_pivot_col[pivot.col] = true;
            particular[pivot.col] = column[pivot.row];
        }

        let mut dependents = Vec::new();
        for free_col in (0..unknowns).filter(|&col| !is_pivot_col[col]) {
            if reduced.column(free_col).iter().all(|&v| is_zero(v)) {
                continue;
            }
            let mut coefficients = Column::zeros(unknowns);
            for pivot in pivots {
                coefficients[pivot.col] = -reduced[[pivot.row, free_col]];
            }
            coefficients[free_col] = 1.0;
            dependents.push(coefficients);
        }

        SolutionDescriptor {
            particular,
            dependents,
        }
    }

    /// The solution obtained with every free parameter set to zero.
    pub fn particular(&self) -> &Column {
        &self.particular
    }

    /// Direction vectors, one per free parameter.
    pub fn dependents(&self) -> &[Column] {
        &self.dependents
    }

    /// Number of free parameters.
    pub fn free_parameters(&self) -> usize {
        self.dependents.len()
    }

    /// Materializes the solution for the given free-parameter values.
    ///
    /// Missing values count as zero; extra values are ignored.
    pub fn insert_free_parameters(&self, values: &[f64]) -> Column {
        let mut solution = self.particular.clone();
        for (direction, &value) in self.dependents.iter().zip(values) {
            solution.scaled_add(value, direction);
        }
        solution
    }

    /// Materializes one solution with each free parameter drawn uniformly from `[0, 1)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Column {
        let values: Vec<f64> = (0..self.free_parameters()).map(|_| rng.gen::<f64>()).collect();
        self.insert_free_parameters(&values)
    }
}
