//! Command-line argument parsing for selected-CI calculations

use clap::Parser;

/// Selected configuration interaction with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override the heat-bath selection threshold (enables selection)
    #[arg(long)]
    pub eps: Option<f64>,

    /// Override the number of eigenpairs
    #[arg(long)]
    pub n_eigen: Option<usize>,

    /// Override the eigensolver residual tolerance
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Override the maximum number of selection rounds
    #[arg(long)]
    pub max_rounds: Option<usize>,

    /// Number of worker threads (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Save the final wavefunction to this file
    #[arg(long)]
    pub save_wfn: Option<String>,

    /// Log solver iterations and screening statistics
    #[arg(short, long)]
    pub verbose: bool,
}
