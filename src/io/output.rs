//! Logging set-up

use std::fmt;
use std::fs::File;
use std::time::Instant;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Layer, Registry,
};

/// Wall time since start-up, whole seconds only
struct SecondPrecisionTimer {
    start: Instant,
}

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let total = self.start.elapsed().as_secs();
        write!(
            w,
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total / 60) % 60,
            total % 60
        )
    }
}

/// Route log records to `output_path` (plain text) or to stdout (coloured)
///
/// `verbose` lowers the level to DEBUG, which adds solver iterations and
/// screening statistics.
pub fn setup_output(output_path: Option<&String>, verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let timer = SecondPrecisionTimer {
        start: Instant::now(),
    };

    let installed = match output_path {
        Some(path) => match File::create(path) {
            Ok(log) => {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(timer)
                    .with_ansi(false)
                    .with_filter(level);
                Registry::default().with(file_layer).try_init()
            }
            Err(err) => {
                eprintln!("Could not create output file {}: {}", path, err);
                return;
            }
        },
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(timer)
                .with_ansi(true)
                .with_filter(level);
            Registry::default().with(stdout_layer).try_init()
        }
    };

    match installed {
        Ok(()) => match output_path {
            Some(path) => info!("Output will be written to: {}", path),
            None => info!("Output will be printed to stdout"),
        },
        Err(err) => eprintln!("Logging already configured: {}", err),
    }
}
