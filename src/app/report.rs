use super::runner::CiOutcome;
use color_eyre::eyre::Result;
use selci::{compute_rdms, rdm_energy, Hamiltonian, Rdms};
use tracing::info;

/// Number of leading determinants listed per state
const N_LEADING: usize = 5;

pub fn report_summary(outcome: &CiOutcome) {
    let space = outcome.wfn.space();
    info!("\nCI calculation finished.");
    info!("  Wavefunction: {}", space.kind);
    info!("  Determinants: {}", outcome.wfn.len());
    info!("  Stored Hamiltonian elements: {}", outcome.op.nnz());
    if let Some(converged) = outcome.converged {
        info!(
            "  Selection rounds: {} ({})",
            outcome.rounds.len(),
            if converged { "converged" } else { "round limit reached" }
        );
    }

    info!("\nEigenvalues:");
    for (k, energy) in outcome.spectrum.energies.iter().enumerate() {
        info!("  State {}: {:.10} Eh", k, energy);
    }

    for (k, state) in outcome.spectrum.states.iter().enumerate() {
        let mut order: Vec<usize> = (0..state.len()).collect();
        order.sort_by(|&a, &b| state[b].abs().total_cmp(&state[a].abs()));
        info!("\nLeading determinants of state {}:", k);
        for &i in order.iter().take(N_LEADING) {
            // positions come from the same store, so the lookup cannot fail
            if let Ok(det) = outcome.wfn.det(i) {
                info!("  {:>+12.8}  {:?}", state[i], space.occs_of(det));
            }
        }
    }
}

/// Recompute the ground-state energy from its density matrices
pub fn report_rdms(outcome: &CiOutcome, ham: &Hamiltonian) -> Result<()> {
    let rdms = compute_rdms(&outcome.wfn, outcome.spectrum.ground_state().as_slice())?;
    let energy = rdm_energy(outcome.wfn.space(), ham, &rdms)?;

    info!("\nDensity matrices of the ground state:");
    match &rdms {
        Rdms::Pair(pair) => {
            info!("  Pair occupations:");
            for (i, occ) in pair.d0.diagonal().iter().enumerate() {
                info!("    Orbital {:>3}: {:.8}", i, occ);
            }
        }
        Rdms::SpinOrbital(so) => {
            info!("  Spin-orbital occupations:");
            for (p, occ) in so.rdm1.diagonal().iter().enumerate() {
                info!("    Spin-orbital {:>3}: {:.8}", p, occ);
            }
        }
    }
    info!("  Energy from RDMs: {:.10} Eh", energy);
    info!(
        "  Deviation from eigenvalue: {:.3e} Eh",
        (energy - outcome.spectrum.ground_energy()).abs()
    );
    Ok(())
}
