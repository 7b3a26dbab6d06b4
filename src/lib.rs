pub mod actions;
pub mod models;
pub mod preview;
pub mod repository;
pub mod settings;
pub mod utils;
pub mod validation;
pub mod workflow;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc;

use actions::ActionBar;
use repository::{ConsultTypeCatalog, InMemoryRepository, PatientRepository};
use settings::{SettingsStore, WorkflowSettings};
use workflow::{
    commands::{submit_report, view_report, DraftInput},
    ChannelSink, EventSink, ReportWorkflow, WorkflowEvent,
};

/// Env var naming the settings file; defaults to `clinireport-settings.json`.
pub const SETTINGS_PATH_ENV: &str = "CLINIREPORT_SETTINGS";

pub struct AppState {
    pub(crate) repository: Arc<dyn PatientRepository>,
    pub(crate) catalog: Arc<dyn ConsultTypeCatalog>,
    pub(crate) workflow: ReportWorkflow,
    pub(crate) actions: ActionBar,
    pub(crate) settings: SettingsStore,
}

impl AppState {
    pub fn new<R>(repository: Arc<R>, settings: SettingsStore, sink: Arc<dyn EventSink>) -> Self
    where
        R: PatientRepository + ConsultTypeCatalog + 'static,
    {
        let workflow_settings = settings.workflow().with_env_overrides();
        let workflow = ReportWorkflow::new(sink.clone(), &workflow_settings);
        let actions = ActionBar::new(workflow.clone(), sink, &workflow_settings);

        Self {
            repository: repository.clone(),
            catalog: repository,
            workflow,
            actions,
            settings,
        }
    }

    pub fn with_fixtures(settings: SettingsStore, sink: Arc<dyn EventSink>) -> Self {
        Self::new(Arc::new(InMemoryRepository::with_fixtures()), settings, sink)
    }
}

pub fn get_workflow_settings(state: &AppState) -> Result<WorkflowSettings, String> {
    Ok(state.settings.workflow())
}

/// Persists new timing settings and hands them to both controllers. The next
/// submission or button press uses them; work already in flight does not change.
pub fn set_workflow_settings(state: &AppState, settings: WorkflowSettings) -> Result<(), String> {
    state
        .settings
        .update_workflow(settings.clone())
        .map_err(|e| e.to_string())?;

    let effective = settings.with_env_overrides();
    state.workflow.update_timing(&effective);
    state.actions.update_timing(&effective);
    Ok(())
}

/// Runs one report through the workflow: reads the form values from the JSON
/// file given as the first argument and prints the rendered preview.
pub async fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("clinireport starting up...");

    let draft_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: clinireport <draft.json>"))?;

    let settings_path = std::env::var(SETTINGS_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("clinireport-settings.json"));
    let settings = SettingsStore::new(settings_path)?;

    let text = render_draft_file(&draft_path, settings).await?;
    println!("{text}");

    Ok(())
}

/// Submits the draft stored at `draft_path`, waits for the run to complete and
/// returns the rendered preview text.
pub async fn render_draft_file(draft_path: &Path, settings: SettingsStore) -> Result<String> {
    let contents = std::fs::read_to_string(draft_path)
        .with_context(|| format!("Failed to read draft from {}", draft_path.display()))?;
    let input: DraftInput = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse draft in {}", draft_path.display()))?;

    let (sink, mut events) = ChannelSink::new();
    let state = AppState::with_fixtures(settings, Arc::new(sink));

    submit_report(&state, input).await.map_err(|err| anyhow!(err))?;
    wait_for_completion(&mut events).await?;

    let preview = view_report(&state).await.map_err(|err| anyhow!(err))?;
    Ok(preview.text)
}

async fn wait_for_completion(events: &mut mpsc::UnboundedReceiver<WorkflowEvent>) -> Result<()> {
    while let Some(event) = events.recv().await {
        match event {
            WorkflowEvent::Progress {
                progress, message, ..
            } => log::info!("{progress:>3}% {message}"),
            WorkflowEvent::Completed { report_id, .. } => {
                log::info!("Report {report_id} generated");
                return Ok(());
            }
            _ => {}
        }
    }
    Err(anyhow!("workflow event stream closed before the report completed"))
}
