//! Normalise command implementation for the geoingest CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use geoingest_core::{CrsCode, Extent};
use geoingest_data::definitions::{
    BundledDefinitionSource, DEFAULT_BASE_URL, HttpDefinitionSource,
};
use geoingest_data::{IngestedDocument, ProjectionResolver, ingest_document};
use geoingest_fs::{file_is_file, read_utf8_file, write_utf8_file};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ARG_BUNDLED_DEFINITIONS, ARG_OUTPUT, ARG_PROJ4_BASE_URL, ARG_SOURCE, CliError, ENV_SOURCE,
};

/// CLI arguments for the `normalise` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a GeoJSON or TopoJSON document, reproject any \
                 declared projected CRS to EPSG:4326 and print a JSON \
                 summary of its name, source CRS and extent. Projection \
                 definitions come from a proj4 definition service or the \
                 bundled EPSG registry.",
    about = "Normalise a document to longitude/latitude"
)]
#[ortho_config(prefix = "GEOINGEST")]
pub(crate) struct NormaliseArgs {
    /// Path to the GeoJSON or TopoJSON document.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) source: Option<Utf8PathBuf>,
    /// Base URL of the proj4 definition service.
    #[arg(long = ARG_PROJ4_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) proj4_base_url: Option<String>,
    /// Resolve definitions from the bundled EPSG registry instead of HTTP.
    #[arg(
        long = ARG_BUNDLED_DEFINITIONS,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) bundled_definitions: Option<bool>,
    /// Write the normalised document to this path.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl NormaliseArgs {
    pub(crate) fn into_config(self) -> Result<NormaliseConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NormaliseConfig::try_from(merged)
    }
}

/// Where projection definitions are obtained from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DefinitionSourceKind {
    /// The `crs-definitions` registry compiled into the binary.
    Bundled,
    /// A proj4 definition service at this base URL.
    Http(String),
}

/// Resolved `normalise` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormaliseConfig {
    /// Document to read.
    pub(crate) source: Utf8PathBuf,
    /// Definition source to resolve projected CRS codes against.
    pub(crate) definitions: DefinitionSourceKind,
    /// Optional destination for the normalised document.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl NormaliseConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        let field = ARG_SOURCE;
        let path = &self.source;
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.clone(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.clone(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.clone(),
                source,
            }),
        }
    }
}

impl TryFrom<NormaliseArgs> for NormaliseConfig {
    type Error = CliError;

    fn try_from(args: NormaliseArgs) -> Result<Self, Self::Error> {
        let source = args.source.ok_or(CliError::MissingArgument {
            field: ARG_SOURCE,
            env: ENV_SOURCE,
        })?;
        let definitions = if args.bundled_definitions.unwrap_or(false) {
            DefinitionSourceKind::Bundled
        } else {
            DefinitionSourceKind::Http(
                args.proj4_base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            )
        };
        Ok(Self {
            source,
            definitions,
            output: args.output,
        })
    }
}

/// Summary printed after a document has been normalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct NormaliseSummary {
    /// Name of the wrapper member, if the document was wrapped.
    pub(crate) name: Option<String>,
    /// CRS the document declared before normalisation.
    pub(crate) source_crs: Option<CrsCode>,
    /// CRS of the normalised document.
    pub(crate) crs: CrsCode,
    /// Extent of the normalised document, absent when it has no points.
    pub(crate) extent: Option<Extent>,
}

impl From<&IngestedDocument> for NormaliseSummary {
    fn from(ingested: &IngestedDocument) -> Self {
        Self {
            name: ingested.name.clone(),
            source_crs: ingested.source_crs.clone(),
            crs: CrsCode::wgs84(),
            extent: (!ingested.extent.is_empty()).then_some(ingested.extent),
        }
    }
}

/// Builds the projection resolver for the current invocation.
pub(crate) trait ResolverBuilder {
    fn build(&self, config: &NormaliseConfig) -> Result<ProjectionResolver, CliError>;
}

pub(crate) struct DefaultResolverBuilder;

impl ResolverBuilder for DefaultResolverBuilder {
    fn build(&self, config: &NormaliseConfig) -> Result<ProjectionResolver, CliError> {
        match &config.definitions {
            DefinitionSourceKind::Bundled => Ok(ProjectionResolver::new(BundledDefinitionSource)),
            DefinitionSourceKind::Http(base_url) => HttpDefinitionSource::new(base_url)
                .map(ProjectionResolver::new)
                .map_err(|source| CliError::BuildDefinitionSource {
                    base_url: base_url.clone(),
                    source,
                }),
        }
    }
}

pub(crate) fn run_normalise(args: NormaliseArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_normalise_with(args, &DefaultResolverBuilder, &mut stdout)
}

pub(crate) fn run_normalise_with(
    args: NormaliseArgs,
    builder: &dyn ResolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_normalise_config(args)?;
    let ingested = execute_normalise(&config, builder)?;
    if let Some(output) = &config.output {
        write_document(output, &ingested.document)?;
    }
    write_summary(writer, &NormaliseSummary::from(&ingested))
}

fn resolve_normalise_config(args: NormaliseArgs) -> Result<NormaliseConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_normalise(
    config: &NormaliseConfig,
    builder: &dyn ResolverBuilder,
) -> Result<IngestedDocument, CliError> {
    let document = load_document(&config.source)?;
    let resolver = builder.build(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime
        .block_on(ingest_document(document, &resolver))
        .map_err(|source| CliError::Ingest {
            path: config.source.clone(),
            source,
        })
}

/// Loads a JSON document from disk.
pub(crate) fn load_document(path: &Utf8Path) -> Result<Value, CliError> {
    let text = read_utf8_file(path).map_err(|source| CliError::OpenDocument {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseDocument {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document(path: &Utf8Path, document: &Value) -> Result<(), CliError> {
    let mut payload = serde_json::to_string(document).map_err(CliError::SerialiseOutput)?;
    payload.push('\n');
    write_utf8_file(path, &payload).map_err(|source| CliError::WriteDocument {
        path: path.to_path_buf(),
        source,
    })
}

fn write_summary(writer: &mut dyn Write, summary: &NormaliseSummary) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(summary).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSummary)?;
    writer.write_all(b"\n").map_err(CliError::WriteSummary)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<NormaliseConfig, CliError> {
    let merged = NormaliseArgs::merge_from_layers(layers).map_err(CliError::from)?;
    NormaliseConfig::try_from(merged)
}
