//! Input/Output for selected-CI calculations
//!
//! Logging set-up, the binary wavefunction file and the FCIDUMP integral
//! format.

mod fcidump;
mod output;
mod wfn_file;

pub use fcidump::{parse_fcidump, read_fcidump, write_fcidump, Fcidump, FcidumpHeader};
pub use output::setup_output;
pub use wfn_file::{load_wfn, read_wfn, save_wfn, write_wfn, WFN_MAGIC};
