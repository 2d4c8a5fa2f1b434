//! Heat-bath selection rounds and the selection state machine

use crate::bitdet::Word;
use crate::error::{CiError, Result};
use crate::excite_impl::connections;
use crate::ham_impl::{Elements, Hamiltonian};
use crate::solver_impl::{SolverParams, Spectrum};
use crate::sparse_impl::SparseOp;
use crate::wfn_impl::Wavefunction;
use rayon::prelude::*;
use tracing::{debug, info};

/// Run one heat-bath selection round
///
/// Every determinant `i` with `|c_i| * bound > eps` (where `bound` is the
/// largest coupling the Hamiltonian allows) is expanded through its single
/// and double replacements. A candidate `j` not yet in the store survives
/// when `|c_i <j|H|i>| > eps`. Screening runs in parallel against the frozen
/// store; survivors are then merged by a single writer in determinant order,
/// so a candidate reached from several determinants is inserted once.
///
/// # Arguments
///
/// * `wfn` - Store to grow
/// * `ham` - Hamiltonian integrals over the store's orbitals
/// * `coeffs` - Current eigenvector over the store's indexing
/// * `eps` - Positive selection threshold
///
/// # Returns
///
/// The number of determinants added; zero means the selection has converged.
pub fn run_hci(wfn: &mut Wavefunction, ham: &Hamiltonian, coeffs: &[f64], eps: f64) -> Result<usize> {
    if !(eps.is_finite() && eps > 0.0) {
        return Err(CiError::InvalidParameter(format!(
            "selection threshold must be positive, got {}",
            eps
        )));
    }
    if coeffs.len() != wfn.len() {
        return Err(CiError::FormatMismatch(format!(
            "coefficient vector has length {}, wavefunction has {} determinants",
            coeffs.len(),
            wfn.len()
        )));
    }
    let elements = Elements::new(wfn.space(), ham)?;
    let bound = ham.coupling_bound(wfn.space());
    let ndet = wfn.len();

    let candidates: Vec<Vec<Word>> = {
        let frozen: &Wavefunction = wfn;
        let elements = &elements;
        (0..ndet)
            .into_par_iter()
            .filter(|&i| coeffs[i].abs() * bound > eps)
            .flat_map_iter(|i| {
                let det = frozen.det_unchecked(i);
                let c = coeffs[i];
                connections(frozen.space(), det).filter(move |conn| {
                    frozen.index_of(conn).is_none()
                        && (c * elements.element(conn, det)).abs() > eps
                })
            })
            .collect()
    };
    debug!(
        "HCI screening: {} surviving candidates from {} determinants",
        candidates.len(),
        ndet
    );

    let added = wfn.merge_unchecked(candidates);
    info!(
        "HCI round (eps = {:.2e}): {} determinants added, {} total",
        eps,
        added,
        wfn.len()
    );
    Ok(added)
}

/// Phase of a heat-bath selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Rounds may still add determinants
    Screening,
    /// The last round added nothing; terminal
    Converged,
}

/// Heat-bath selector: the two-state machine around [`run_hci`]
#[derive(Debug, Clone)]
pub struct Selector {
    eps: f64,
    state: SelectionState,
    rounds: usize,
    total_added: usize,
}

impl Selector {
    pub fn new(eps: f64) -> Result<Self> {
        if !(eps.is_finite() && eps > 0.0) {
            return Err(CiError::InvalidParameter(format!(
                "selection threshold must be positive, got {}",
                eps
            )));
        }
        Ok(Selector {
            eps,
            state: SelectionState::Screening,
            rounds: 0,
            total_added: 0,
        })
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_converged(&self) -> bool {
        self.state == SelectionState::Converged
    }

    /// Rounds run so far, the converging round included
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn total_added(&self) -> usize {
        self.total_added
    }

    /// Run one round; once converged, returns zero without touching `wfn`
    pub fn round(&mut self, wfn: &mut Wavefunction, ham: &Hamiltonian, coeffs: &[f64]) -> Result<usize> {
        if self.is_converged() {
            return Ok(0);
        }
        let added = run_hci(wfn, ham, coeffs, self.eps)?;
        self.rounds += 1;
        self.total_added += added;
        if added == 0 {
            self.state = SelectionState::Converged;
        }
        Ok(added)
    }
}

/// Per-round record of a driven selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundReport {
    pub round: usize,
    pub added: usize,
    pub ndet: usize,
    pub energy: f64,
}

/// Outcome of [`HciDriver::run`]
#[derive(Debug, Clone)]
pub struct HciSummary {
    pub spectrum: Spectrum,
    pub converged: bool,
    pub rounds: Vec<RoundReport>,
    pub op: SparseOp,
}

/// Select, extend the operator and re-solve until no determinant is added
#[derive(Debug, Clone)]
pub struct HciDriver {
    pub selector: Selector,
    pub solver: SolverParams,
    pub max_rounds: usize,
    pub screen: f64,
}

impl HciDriver {
    pub fn new(eps: f64, solver: SolverParams, max_rounds: usize) -> Result<Self> {
        Ok(HciDriver {
            selector: Selector::new(eps)?,
            solver,
            max_rounds,
            screen: 0.0,
        })
    }

    /// Drive the selection loop over `wfn`
    ///
    /// An empty store is seeded with the Hartree-Fock determinant. Each round
    /// feeds the ground state into [`Selector::round`], extends the operator
    /// with [`SparseOp::update`] and re-solves starting from the previous
    /// ground state padded with zeros for the new determinants.
    pub fn run(&mut self, wfn: &mut Wavefunction, ham: &Hamiltonian) -> Result<HciSummary> {
        if wfn.is_empty() {
            wfn.add_hartreefock();
        }

        info!("===========================================");
        info!("      Heat-bath CI selection");
        info!("===========================================");
        info!("Wavefunction: {}", wfn.space().kind);
        info!("Selection threshold: {:.2e}", self.selector.eps());
        info!("Initial determinants: {}", wfn.len());
        info!("Maximum rounds: {}", self.max_rounds);
        info!("===========================================");

        let mut op = SparseOp::with_screen(wfn, ham, self.screen)?;
        let mut spectrum = op.solve_with(&self.params_for(op.rows()), None)?;
        let mut rounds = Vec::new();

        while !self.selector.is_converged() && self.selector.rounds() < self.max_rounds {
            let added = self
                .selector
                .round(wfn, ham, spectrum.ground_state().as_slice())?;
            if added == 0 {
                break;
            }

            op.update(wfn, ham)?;
            let mut guess = spectrum.ground_state().as_slice().to_vec();
            guess.resize(op.rows(), 0.0);
            spectrum = op.solve_with(&self.params_for(op.rows()), Some(&guess))?;

            let report = RoundReport {
                round: self.selector.rounds(),
                added,
                ndet: wfn.len(),
                energy: spectrum.ground_energy(),
            };
            info!(
                "Round {:>3}: +{:>8} determinants, {:>9} total, E = {:.10} Eh",
                report.round, report.added, report.ndet, report.energy
            );
            rounds.push(report);
        }

        let converged = self.selector.is_converged();
        info!("===========================================");
        info!("      HCI Results Summary");
        info!("===========================================");
        info!("Converged: {}", converged);
        info!("Rounds: {}", self.selector.rounds());
        info!("Determinants: {}", wfn.len());
        info!("Ground state energy: {:.10} Eh", spectrum.ground_energy());
        info!("===========================================");

        Ok(HciSummary {
            spectrum,
            converged,
            rounds,
            op,
        })
    }

    /// Solver settings for an operator of dimension `dim`
    fn params_for(&self, dim: usize) -> SolverParams {
        let mut params = self.solver;
        params.n_eigen = params.n_eigen.min(dim).max(1);
        params
    }
}
