//! Subcommand implementations.

use std::path::Path;

use anyhow::Result;
use console::style;

use admissions_core::observe::ObservedStore;
use admissions_core::traits::DataStore;
use admissions_store::config::load_config_from;
use admissions_store::{create_store, AdmissionsConfig, MemoryStore};

pub mod catalog;
pub mod check;
pub mod enroll;
pub mod init;
pub mod questions;

/// Load the configuration and open the store it describes.
///
/// With `demo` the configured backend is ignored in favour of a seeded
/// in-memory store. A missing URL or key prints a banner and fails.
pub(crate) fn open_store(
    config_path: Option<&Path>,
    demo: bool,
) -> Result<(AdmissionsConfig, Box<dyn DataStore>)> {
    let config = load_config_from(config_path)?;
    if demo {
        tracing::info!("using in-memory demo store");
        let store = ObservedStore::traced(MemoryStore::demo());
        return Ok((config, Box::new(store)));
    }

    if let Err(e) = config.store.validate() {
        print_banner(&format!("Configuration error: {e}"));
        eprintln!(
            "  {}",
            style("Run `admissions init` or pass --demo to try the wizard offline.").dim()
        );
        return Err(e.into());
    }
    let store = create_store(&config)?;
    Ok((config, store))
}

/// A prominent one-line error.
pub(crate) fn print_banner(message: &str) {
    eprintln!();
    eprintln!("  {} {}", style("✗").red().bold(), style(message).red().bold());
    eprintln!();
}
