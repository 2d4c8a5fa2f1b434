//! Selected-CI command-line interface
//!
//! Reads integrals from an FCIDUMP file, builds the determinant space given
//! in the YAML configuration, optionally grows it by heat-bath selection and
//! reports the lowest eigenpairs.

use color_eyre::eyre::Result;

mod app;
mod config;

use app::SelciApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    SelciApplication::from_cli()?.run()
}
