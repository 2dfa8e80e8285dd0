//! Error types emitted by the geoingest CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use geoingest_data::IngestError;
use geoingest_data::definitions::SourceBuildError;
use thiserror::Error;

/// Errors emitted by the geoingest CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag or argument name.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Argument naming the path.
        field: &'static str,
        /// The missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Argument naming the path.
        field: &'static str,
        /// The offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Argument naming the path.
        field: &'static str,
        /// The path being inspected.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The HTTP definition source could not be built.
    #[error("failed to build definition source for {base_url:?}: {source}")]
    BuildDefinitionSource {
        /// Configured base URL.
        base_url: String,
        /// Underlying construction error.
        #[source]
        source: SourceBuildError,
    },
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Reading the source document failed.
    #[error("failed to read document at {path:?}: {source}")]
    OpenDocument {
        /// Document path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The source document is not valid JSON.
    #[error("failed to parse document JSON at {path:?}: {source}")]
    ParseDocument {
        /// Document path.
        path: Utf8PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// Reprojection or extent computation failed.
    #[error("failed to ingest {path:?}: {source}")]
    Ingest {
        /// Document path.
        path: Utf8PathBuf,
        /// Underlying ingestion error.
        #[source]
        source: IngestError,
    },
    /// Serialising the normalised document or summary failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the normalised document failed.
    #[error("failed to write normalised document to {path:?}: {source}")]
    WriteDocument {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Writing the summary failed.
    #[error("failed to write summary: {0}")]
    WriteSummary(#[source] std::io::Error),
}
