//! Subcommand implementations

use std::path::{Path, PathBuf};

use anyhow::Context;
use propform_core::{
    EngineConfig, ErrorEntry, RecordingSink, RenderDescriptor, RowEvent, RowFormController,
    RowReducer,
};
use serde::Serialize;

/// Inputs of the `render` subcommand
#[derive(Debug, Default)]
pub(crate) struct RenderArgs {
    pub(crate) catalog: PathBuf,
    pub(crate) state: Option<String>,
    pub(crate) state_file: Option<PathBuf>,
    pub(crate) events: Option<PathBuf>,
    pub(crate) errors: Option<PathBuf>,
    pub(crate) schemas: Vec<PathBuf>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) disabled: bool,
}

/// Output of the `render` subcommand
#[derive(Debug, Serialize)]
pub(crate) struct RenderOutput {
    /// Final transport string
    pub(crate) transport: String,
    /// Every notification emitted while applying events and rendering
    pub(crate) emitted: Vec<String>,
    /// Render descriptor of the final state
    pub(crate) render: RenderDescriptor,
}

/// Summary printed by the `check` subcommand
#[derive(Debug, Serialize)]
pub(crate) struct CheckOutput {
    pub(crate) transforms: usize,
    pub(crate) properties: usize,
    pub(crate) filters: usize,
    pub(crate) config: EngineConfig,
}

pub(crate) fn load_reducer(catalog: &Path, config: Option<&Path>) -> anyhow::Result<RowReducer> {
    RowReducer::load(catalog, config).with_context(|| match config {
        Some(config) => format!(
            "loading catalog {} with config {}",
            catalog.display(),
            config.display()
        ),
        None => format!("loading catalog {}", catalog.display()),
    })
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = read(path)?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub(crate) fn render(args: &RenderArgs) -> anyhow::Result<RenderOutput> {
    let reducer =
        load_reducer(&args.catalog, args.config.as_deref())?.with_disabled(args.disabled);

    let transport = match (&args.state, &args.state_file) {
        (Some(state), _) => state.clone(),
        (None, Some(path)) => read(path)?.trim().to_string(),
        (None, None) => String::new(),
    };

    let events: Vec<RowEvent> = match &args.events {
        Some(path) => load_json(path)?,
        None => Vec::new(),
    };
    let errors: Vec<ErrorEntry> = match &args.errors {
        Some(path) => load_json(path)?,
        None => Vec::new(),
    };
    let schemas = args
        .schemas
        .iter()
        .map(PathBuf::as_path)
        .map(read)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut row = RowFormController::from_reducer(&transport, reducer, RecordingSink::default());

    for event in &events {
        row.dispatch(event);
    }
    tracing::info!(events = events.len(), errors = errors.len(), "applied row events");

    let render = row.render(&errors, &schemas);
    let transport = row.transport();

    Ok(RenderOutput {
        transport,
        emitted: row.into_sink().emitted,
        render,
    })
}

pub(crate) fn check(catalog: &Path, config: Option<&Path>) -> anyhow::Result<CheckOutput> {
    let reducer = load_reducer(catalog, config)?;
    let catalog = reducer.catalog();

    Ok(CheckOutput {
        transforms: catalog.transforms.len(),
        properties: catalog.transforms.iter().map(|t| t.options.len()).sum(),
        filters: catalog.filters.len(),
        config: reducer.config().clone(),
    })
}
