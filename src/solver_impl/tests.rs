//! Tests for the Davidson eigensolver

#[cfg(test)]
mod tests {
    use super::super::{davidson, LinearOperator, SolverParams};
    use crate::error::CiError;
    use crate::test_utils::sorted_eigenvalues;
    use nalgebra::{DMatrix, DVector};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Dense symmetric matrix behind the operator interface
    struct Dense {
        matrix: DMatrix<f64>,
        diag: Vec<f64>,
        precondition: bool,
    }

    impl Dense {
        fn random(dim: usize, seed: u64, precondition: bool) -> Self {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut matrix = DMatrix::zeros(dim, dim);
            for i in 0..dim {
                matrix[(i, i)] = i as f64 * 0.5 + rng.gen_range(-0.1..0.1);
                for j in 0..i {
                    let value = rng.gen_range(-0.1..0.1);
                    matrix[(i, j)] = value;
                    matrix[(j, i)] = value;
                }
            }
            let diag = matrix.diagonal().iter().copied().collect();
            Dense {
                matrix,
                diag,
                precondition,
            }
        }
    }

    impl LinearOperator for Dense {
        fn rows(&self) -> usize {
            self.matrix.nrows()
        }

        fn cols(&self) -> usize {
            self.matrix.ncols()
        }

        fn perform_op(&self, x: &[f64], y: &mut [f64]) {
            let result = &self.matrix * DVector::from_column_slice(x);
            y.copy_from_slice(result.as_slice());
        }

        fn diagonal(&self) -> Option<&[f64]> {
            if self.precondition {
                Some(&self.diag)
            } else {
                None
            }
        }
    }

    fn check_against_dense(op: &Dense, params: &SolverParams) {
        let spectrum = davidson(op, params, None).unwrap();
        let reference = sorted_eigenvalues(op.matrix.clone());
        assert_eq!(spectrum.energies.len(), params.n_eigen);
        for (k, energy) in spectrum.energies.iter().enumerate() {
            assert!(
                (energy - reference[k]).abs() < 1e-9,
                "eigenvalue {}: {} vs {}",
                k,
                energy,
                reference[k]
            );
            let x = &spectrum.states[k];
            assert!((x.norm() - 1.0).abs() < 1e-12);
            let residual = &op.matrix * x - x * *energy;
            assert!(residual.norm() < 1e-8);
        }
    }

    #[test]
    fn test_lowest_eigenpairs() {
        let op = Dense::random(40, 1, true);
        check_against_dense(&op, &SolverParams::new(3, 1e-10, 200));
    }

    #[test]
    fn test_restart_with_small_subspace() {
        let op = Dense::random(60, 2, true);
        let params = SolverParams::new(2, 1e-10, 500).with_max_subspace(6);
        check_against_dense(&op, &params);
    }

    #[test]
    fn test_without_preconditioner() {
        let op = Dense::random(25, 3, false);
        check_against_dense(&op, &SolverParams::new(1, 1e-10, 200));
    }

    #[test]
    fn test_full_dimension_is_exact() {
        let op = Dense::random(4, 4, true);
        check_against_dense(&op, &SolverParams::new(4, 1e-10, 50).with_max_subspace(8));
    }

    #[test]
    fn test_guess_is_used() {
        let op = Dense::random(30, 5, true);
        let cold = davidson(&op, &SolverParams::default(), None).unwrap();
        let guess = cold.ground_state().as_slice().to_vec();
        let warm = davidson(&op, &SolverParams::default(), Some(&guess)).unwrap();
        assert!(warm.iterations <= 2);
        assert!((warm.ground_energy() - cold.ground_energy()).abs() < 1e-10);
    }

    #[test]
    fn test_state_sign_convention() {
        let op = Dense::random(20, 6, true);
        let spectrum = davidson(&op, &SolverParams::new(2, 1e-10, 200), None).unwrap();
        for state in &spectrum.states {
            assert!(state[state.iamax()] > 0.0);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let op = Dense::random(5, 7, true);
        for params in [
            SolverParams::new(0, 1e-8, 100),
            SolverParams::new(6, 1e-8, 100),
            SolverParams::new(1, 0.0, 100),
            SolverParams::new(1, f64::NAN, 100),
            SolverParams::new(2, 1e-8, 100).with_max_subspace(3),
        ] {
            assert!(matches!(
                davidson(&op, &params, None),
                Err(CiError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_guess_length_mismatch() {
        let op = Dense::random(5, 8, true);
        let guess = vec![1.0; 4];
        assert!(matches!(
            davidson(&op, &SolverParams::default(), Some(&guess)),
            Err(CiError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_iteration_budget() {
        let op = Dense::random(40, 9, true);
        match davidson(&op, &SolverParams::new(1, 1e-12, 1), None) {
            Err(CiError::NonConvergence { iterations, residual }) => {
                assert_eq!(iterations, 1);
                assert!(residual > 1e-12);
            }
            other => panic!("expected non-convergence, got {:?}", other),
        }
    }
}
