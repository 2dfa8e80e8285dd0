//! Command-line interface for normalising GeoJSON and TopoJSON documents.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod normalise;

pub use error::CliError;
use normalise::{NormaliseArgs, run_normalise};

const ARG_SOURCE: &str = "source";
const ARG_PROJ4_BASE_URL: &str = "proj4-base-url";
const ARG_BUNDLED_DEFINITIONS: &str = "bundled-definitions";
const ARG_OUTPUT: &str = "output";
const ENV_SOURCE: &str = "GEOINGEST_CMDS_NORMALISE_SOURCE";

/// Run the geoingest CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration, reading the
/// document, ingestion or writing the results fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Normalise(args) => run_normalise(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "geoingest",
    about = "Normalise GeoJSON documents to longitude/latitude coordinates",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reproject a document to EPSG:4326 and report its extent.
    Normalise(NormaliseArgs),
}

#[cfg(test)]
mod tests;
