//! Configuration management for selected-CI calculations
//!
//! This module handles the YAML configuration structures and their
//! defaults. Command-line overrides live in [`Args`].

mod args;

pub use args::Args;

use selci::WfnKind;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub system: SystemParams,
    pub space: Option<SpaceParams>,
    #[serde(default)]
    pub solver: SolverConfig,
    pub hci: Option<HciParams>,
    pub output: Option<OutputParams>,
}

/// Integrals and electron counts
#[derive(Debug, Deserialize, Serialize)]
pub struct SystemParams {
    /// Path of the FCIDUMP file holding the integrals
    pub fcidump: String,
    pub kind: Option<WfnKind>,
    /// Occupied pairs (DOCI) or spin-orbitals (GenCI)
    pub nocc: Option<usize>,
    pub nocc_up: Option<usize>,
    pub nocc_dn: Option<usize>,
}

/// Initial determinant space
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpaceParams {
    /// Wavefunction file to start from
    pub wfn_file: Option<String>,
    pub hf: Option<bool>,
    pub all: Option<bool>,
    pub excited: Option<ExcitedParams>,
    pub seniority: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExcitedParams {
    pub max_level: Option<usize>,
}

impl Default for SpaceParams {
    fn default() -> Self {
        SpaceParams {
            wfn_file: None,
            hf: Some(true),
            all: Some(false),
            excited: None,
            seniority: None,
        }
    }
}

impl SpaceParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.hf.is_none() {
            self.hf = defaults.hf;
        }
        if self.all.is_none() {
            self.all = defaults.all;
        }
        if let Some(excited) = self.excited.as_mut() {
            excited.max_level.get_or_insert(2);
        }
        self
    }
}

/// Eigensolver parameters
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SolverConfig {
    pub n_eigen: Option<usize>,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
    pub max_subspace: Option<usize>,
    /// Off-diagonal elements at or below this magnitude are not stored
    pub screen: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            n_eigen: Some(1),
            tolerance: Some(1e-8),
            max_iterations: Some(500),
            max_subspace: Some(30),
            screen: Some(0.0),
        }
    }
}

impl SolverConfig {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.n_eigen.is_none() {
            self.n_eigen = defaults.n_eigen;
        }
        if self.tolerance.is_none() {
            self.tolerance = defaults.tolerance;
        }
        if self.max_iterations.is_none() {
            self.max_iterations = defaults.max_iterations;
        }
        if self.max_subspace.is_none() {
            self.max_subspace = defaults.max_subspace;
        }
        if self.screen.is_none() {
            self.screen = defaults.screen;
        }
        self
    }
}

/// Heat-bath selection parameters
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HciParams {
    pub enabled: Option<bool>,
    pub eps: Option<f64>,
    pub max_rounds: Option<usize>,
}

impl Default for HciParams {
    fn default() -> Self {
        HciParams {
            enabled: Some(false),
            eps: Some(1e-4),
            max_rounds: Some(20),
        }
    }
}

impl HciParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.enabled.is_none() {
            self.enabled = defaults.enabled;
        }
        if self.eps.is_none() {
            self.eps = defaults.eps;
        }
        if self.max_rounds.is_none() {
            self.max_rounds = defaults.max_rounds;
        }
        self
    }
}

/// Result files
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OutputParams {
    /// Where to save the final wavefunction
    pub wavefunction: Option<String>,
    /// Report the energy recomputed from the density matrices
    pub rdms: Option<bool>,
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.space = Some(self.space.take().unwrap_or_default().with_defaults());
        self.solver = self.solver.with_defaults();
        if let Some(hci) = self.hci.take() {
            self.hci = Some(hci.with_defaults());
        }
        self
    }

    pub fn kind(&self) -> WfnKind {
        self.system.kind.unwrap_or(WfnKind::Fci)
    }

    pub fn space_params(&self) -> SpaceParams {
        self.space.clone().unwrap_or_default().with_defaults()
    }

    /// Check if heat-bath selection is enabled
    pub fn is_hci_enabled(&self) -> bool {
        self.hci.as_ref().and_then(|h| h.enabled).unwrap_or(false)
    }

    pub fn hci_eps(&self) -> f64 {
        self.hci.as_ref().and_then(|h| h.eps).unwrap_or(1e-4)
    }

    pub fn hci_max_rounds(&self) -> usize {
        self.hci.as_ref().and_then(|h| h.max_rounds).unwrap_or(20)
    }

    pub fn wavefunction_output(&self) -> Option<String> {
        self.output.as_ref().and_then(|o| o.wavefunction.clone())
    }

    pub fn is_rdm_report_enabled(&self) -> bool {
        self.output.as_ref().and_then(|o| o.rdms).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let yaml = "system:\n  fcidump: h2.fcidump\n";
        let config = serde_yml::from_str::<Config>(yaml).unwrap().with_defaults();
        assert_eq!(config.kind(), WfnKind::Fci);
        assert_eq!(config.solver.n_eigen, Some(1));
        assert_eq!(config.solver.tolerance, Some(1e-8));
        assert!(!config.is_hci_enabled());
        let space = config.space_params();
        assert_eq!(space.hf, Some(true));
        assert_eq!(space.all, Some(false));
        assert!(config.wavefunction_output().is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
system:
  fcidump: lih.fcidump
  kind: doci
  nocc: 2
space:
  hf: true
  excited:
    max_level: 1
solver:
  n_eigen: 2
  tolerance: 1.0e-9
hci:
  enabled: true
  eps: 1.0e-5
output:
  wavefunction: lih.wfn
  rdms: true
"#;
        let config = serde_yml::from_str::<Config>(yaml).unwrap().with_defaults();
        assert_eq!(config.kind(), WfnKind::Doci);
        assert_eq!(config.system.nocc, Some(2));
        assert_eq!(config.space_params().excited.unwrap().max_level, Some(1));
        assert_eq!(config.solver.n_eigen, Some(2));
        assert_eq!(config.solver.max_iterations, Some(500));
        assert!(config.is_hci_enabled());
        assert_eq!(config.hci_eps(), 1e-5);
        assert_eq!(config.hci_max_rounds(), 20);
        assert_eq!(config.wavefunction_output().as_deref(), Some("lih.wfn"));
        assert!(config.is_rdm_report_enabled());
    }
}
