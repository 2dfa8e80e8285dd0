//! Behaviour-driven step definitions driving the normalise CLI scenarios.

use super::helpers::{StubResolverBuilder, projected_feature, temp_workspace, write_utf8};
use super::*;
use crate::normalise::{NormaliseSummary, run_normalise_with};
use camino::Utf8PathBuf;
use geoingest_data::{IngestError, ReprojectError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct NormaliseWorld {
    _tmp: TempDir,
    source_path: Utf8PathBuf,
    output_path: Utf8PathBuf,
    include_source: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl NormaliseWorld {
    fn new() -> Self {
        let (tmp, root) = temp_workspace();
        Self {
            _tmp: tmp,
            source_path: root.join("source.geojson"),
            output_path: root.join("normalised/source.geojson"),
            include_source: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["geoingest".to_owned(), "normalise".to_owned()];
        if *self.include_source.borrow() {
            argv.push(self.source_path.as_str().to_owned());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> NormaliseWorld {
    NormaliseWorld::new()
}

#[given("a wrapped Web Mercator document exists on disk")]
fn wrapped_document_exists(#[from(world)] world: &NormaliseWorld) {
    let document = json!({"depot": projected_feature(3857, 0.0, 0.0)});
    write_utf8(&world.source_path, document.to_string().as_bytes());
}

#[given("I ask for the normalised document to be written out")]
fn request_output(#[from(world)] world: &NormaliseWorld) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_OUTPUT}"),
        world.output_path.as_str().to_owned(),
    ]);
}

#[given("I omit the source path")]
fn omit_source_path(#[from(world)] world: &NormaliseWorld) {
    *world.include_source.borrow_mut() = false;
}

#[given("the source document contains invalid JSON")]
fn source_contains_invalid_json(#[from(world)] world: &NormaliseWorld) {
    write_utf8(&world.source_path, b"{ not valid json");
}

#[given("a document declared in an unknown projection exists on disk")]
fn unknown_projection_exists(#[from(world)] world: &NormaliseWorld) {
    let document = projected_feature(28356, 334_000.0, 6_252_000.0);
    write_utf8(&world.source_path, document.to_string().as_bytes());
}

#[when("I run the normalise command")]
fn run_normalise_command(#[from(world)] world: &NormaliseWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Normalise(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_normalise_with(args, &StubResolverBuilder, &mut *buffer)
        }
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints a summary named {name}")]
fn command_succeeds(#[from(world)] world: &NormaliseWorld, name: String) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let summary: NormaliseSummary =
        serde_json::from_slice(&world.stdout.borrow()).expect("summary should be JSON");
    assert_eq!(summary.name.as_deref(), Some(name.trim_matches('"')));
}

#[then("the written document declares EPSG:4326")]
fn written_document_is_geographic(#[from(world)] world: &NormaliseWorld) {
    let text = std::fs::read_to_string(world.output_path.as_std_path()).expect("output written");
    let written: Value = serde_json::from_str(&text).expect("output is JSON");
    assert_eq!(written["crs"]["properties"]["code"], json!("4326"));
}

#[then("the command fails because the source path is missing")]
fn fails_missing_source(#[from(world)] world: &NormaliseWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_SOURCE),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because the document JSON is invalid")]
fn fails_invalid_json(#[from(world)] world: &NormaliseWorld) {
    match &*world.error() {
        CliError::ParseDocument { .. } => {}
        other => panic!("expected ParseDocument, found {other:?}"),
    }
}

#[then("the command fails because the projection is unsupported")]
fn fails_unsupported(#[from(world)] world: &NormaliseWorld) {
    match &*world.error() {
        CliError::Ingest {
            source: IngestError::Reproject(ReprojectError::UnsupportedCrs { .. }),
            ..
        } => {}
        other => panic!("expected an unsupported CRS, found {other:?}"),
    }
}

macro_rules! register_normalise_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/normalise_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: NormaliseWorld) {
            let _ = world;
        }
    };
}

register_normalise_scenario!(
    normalise_wrapped_document,
    "normalising a wrapped projected document"
);
register_normalise_scenario!(normalise_missing_source, "rejecting missing source paths");
register_normalise_scenario!(normalise_invalid_json, "rejecting invalid JSON input");
register_normalise_scenario!(
    normalise_unsupported_projection,
    "reporting unsupported projections"
);
