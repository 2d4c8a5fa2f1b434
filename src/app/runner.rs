use crate::config::{Args, Config, SpaceParams};
use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use selci::io::{load_wfn, FcidumpHeader};
use selci::{
    Hamiltonian, HciDriver, RoundReport, SolverParams, SparseOp, Space, Spectrum, Wavefunction,
    WfnKind,
};
use tracing::info;

/// Result of a fixed-space or selected CI run
pub struct CiOutcome {
    pub wfn: Wavefunction,
    pub spectrum: Spectrum,
    pub op: SparseOp,
    pub rounds: Vec<RoundReport>,
    pub converged: Option<bool>,
}

/// Integrals in the orbital basis the requested variant works in
pub fn prepare_hamiltonian(kind: WfnKind, ham: Hamiltonian) -> Result<Hamiltonian> {
    match kind {
        WfnKind::Genci => {
            info!("Expanding {} spatial orbitals into spin-orbitals", ham.nbasis);
            ham.to_spin_orbital()
                .wrap_err("Failed to build spin-orbital integrals")
        }
        _ => Ok(ham),
    }
}

/// Determinant space from the configuration, falling back to the FCIDUMP header
pub fn resolve_space(config: &Config, ham: &Hamiltonian, header: &FcidumpHeader) -> Result<Space> {
    let system = &config.system;
    let kind = config.kind();
    let space = match kind {
        WfnKind::Doci => {
            let nocc = match system.nocc {
                Some(nocc) => nocc,
                None => {
                    if header.nelec % 2 != 0 || header.ms2 != 0 {
                        bail!(
                            "DOCI needs a closed-shell system, FCIDUMP has NELEC = {}, MS2 = {}",
                            header.nelec,
                            header.ms2
                        );
                    }
                    header.nelec / 2
                }
            };
            Space::doci(ham.nbasis, nocc)
        }
        WfnKind::Fci => {
            let (up, dn) = match (system.nocc_up, system.nocc_dn) {
                (Some(up), Some(dn)) => (up, dn),
                (None, None) => header.occupations()?,
                _ => bail!("FCI needs both nocc_up and nocc_dn, or neither"),
            };
            Space::fci(ham.nbasis, up, dn)
        }
        WfnKind::Genci => Space::genci(ham.nbasis, system.nocc.unwrap_or(header.nelec)),
    };
    space.wrap_err("Invalid determinant space")
}

/// Initial store as described by the `space` section
pub fn build_wavefunction(space: Space, params: &SpaceParams) -> Result<Wavefunction> {
    let mut wfn = match &params.wfn_file {
        Some(path) => {
            let wfn = load_wfn(path)
                .wrap_err_with(|| format!("Unable to load wavefunction file: {}", path))?;
            if *wfn.space() != space {
                bail!(
                    "Wavefunction file {} does not match the configured {} space",
                    path,
                    space.kind
                );
            }
            wfn
        }
        None => Wavefunction::new(space),
    };

    if params.hf.unwrap_or(true) {
        wfn.add_hartreefock();
    }
    if params.all.unwrap_or(false) {
        let added = wfn.add_all();
        info!("Added all {} determinants of the space", added);
    }
    if let Some(level) = params.excited.as_ref().and_then(|e| e.max_level) {
        let hf = space.hartreefock();
        let added = wfn.add_excited_up_to(&hf, level)?;
        info!("Added {} determinants up to excitation level {}", added, level);
    }
    if let Some(seniority) = params.seniority {
        let added = wfn.add_seniority(seniority)?;
        info!("Added {} determinants of seniority {}", added, seniority);
    }
    if wfn.is_empty() {
        return Err(eyre!("The configured space section produced no determinants"));
    }
    Ok(wfn)
}

pub fn solver_params(args: &Args, config: &Config) -> SolverParams {
    let defaults = SolverParams::default();
    SolverParams {
        n_eigen: args.n_eigen.or(config.solver.n_eigen).unwrap_or(defaults.n_eigen),
        tolerance: args
            .tolerance
            .or(config.solver.tolerance)
            .unwrap_or(defaults.tolerance),
        max_iterations: config
            .solver
            .max_iterations
            .unwrap_or(defaults.max_iterations),
        max_subspace: config.solver.max_subspace.unwrap_or(defaults.max_subspace),
    }
}

/// Diagonalize the Hamiltonian over a fixed store
pub fn run_fixed(
    wfn: Wavefunction,
    ham: &Hamiltonian,
    params: &SolverParams,
    screen: f64,
) -> Result<CiOutcome> {
    info!("\nBuilding sparse Hamiltonian over {} determinants...", wfn.len());
    let op = SparseOp::with_screen(&wfn, ham, screen)?;
    info!("\nSolving for {} eigenpairs...", params.n_eigen);
    let spectrum = op
        .solve_with(params, None)
        .wrap_err("Eigensolver failed")?;
    Ok(CiOutcome {
        wfn,
        spectrum,
        op,
        rounds: Vec::new(),
        converged: None,
    })
}

/// Grow the store by heat-bath selection, re-solving after every round
pub fn run_selected(
    mut wfn: Wavefunction,
    ham: &Hamiltonian,
    params: &SolverParams,
    screen: f64,
    eps: f64,
    max_rounds: usize,
) -> Result<CiOutcome> {
    let mut driver = HciDriver::new(eps, *params, max_rounds)?;
    driver.screen = screen;
    let summary = driver
        .run(&mut wfn, ham)
        .wrap_err("Heat-bath selection failed")?;
    Ok(CiOutcome {
        wfn,
        spectrum: summary.spectrum,
        op: summary.op,
        rounds: summary.rounds,
        converged: Some(summary.converged),
    })
}
