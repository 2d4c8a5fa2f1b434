mod report;
mod runner;

use self::report::{report_rdms, report_summary};
use self::runner::{
    build_wavefunction, prepare_hamiltonian, resolve_space, run_fixed, run_selected, solver_params,
};
use crate::config::{Args, Config};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use selci::io::{read_fcidump, save_wfn, setup_output};
use std::fs;
use tracing::info;

pub struct SelciApplication {
    args: Args,
    config: Config,
}

impl SelciApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref(), self.args.verbose);
        info!("Configuration loaded:\n{:?}", self.config);

        if let Some(threads) = self.args.threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .wrap_err("Failed to configure the worker thread pool")?;
            info!("Using {} worker threads", threads);
        }

        let fcidump_path = &self.config.system.fcidump;
        let dump = read_fcidump(fcidump_path)
            .wrap_err_with(|| format!("Unable to read integrals from: {}", fcidump_path))?;
        let kind = self.config.kind();
        let ham = prepare_hamiltonian(kind, dump.ham)?;
        let space = resolve_space(&self.config, &ham, &dump.header)?;
        info!(
            "\n{} space: {} orbitals, occupations ({}, {}), {} determinants in full space",
            space.kind,
            space.nbasis,
            space.nocc_up,
            space.nocc_dn,
            space.ndet_full()
        );

        let wfn = build_wavefunction(space, &self.config.space_params())?;
        let params = solver_params(&self.args, &self.config);
        let screen = self.config.solver.screen.unwrap_or(0.0);

        let selection = match self.args.eps {
            Some(eps) => Some(eps),
            None if self.config.is_hci_enabled() => Some(self.config.hci_eps()),
            None => None,
        };
        let outcome = match selection {
            Some(eps) => {
                let max_rounds = self
                    .args
                    .max_rounds
                    .unwrap_or_else(|| self.config.hci_max_rounds());
                run_selected(wfn, &ham, &params, screen, eps, max_rounds)?
            }
            None => run_fixed(wfn, &ham, &params, screen)?,
        };

        report_summary(&outcome);
        if self.config.is_rdm_report_enabled() {
            report_rdms(&outcome, &ham)?;
        }

        if let Some(path) = self.args.save_wfn.clone().or(self.config.wavefunction_output()) {
            save_wfn(&path, &outcome.wfn)
                .wrap_err_with(|| format!("Unable to save wavefunction to: {}", path))?;
        }

        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
