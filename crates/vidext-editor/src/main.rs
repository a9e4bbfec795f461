// # vidext-editor - Video Field Editor
//
// Thin host for the video form widget. It plays the role the content
// platform normally plays: it provides the entry fields, decides where the
// widget is loaded, and feeds it user input.
//
// The editor is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Opening the entry field store
// 4. Mounting the widget and driving it from stdin line commands
//
// All form behavior lives in vidext-core.
//
// ## Configuration
//
// - `VIDEXT_STORE_TYPE`: Field store type (file, memory). Default: file
// - `VIDEXT_ENTRY_PATH`: Entry JSON file (required for file store)
// - `VIDEXT_OPTION_SHAPE`: Option set shape (flat, split). Default: split
// - `VIDEXT_LOCATION`: Host location the widget is loaded in. Default: entry-editor
// - `VIDEXT_EVENT_CAPACITY`: Write event channel capacity
// - `VIDEXT_LOG_LEVEL`: trace, debug, info, warn, error. Default: info
//
// ## Example
//
// ```bash
// export VIDEXT_ENTRY_PATH=./entry.json
// printf 'platform youtube\nvideo-id dQw4w9WgXcQ\noption mute 1\n' | vidext-editor
// ```

mod commands;

use anyhow::{Context, Result};
use commands::{Command, HELP};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use vidext_core::{
    FieldStore, FieldSync, FileFieldStore, FormController, HostLocation, MemoryFieldStore,
    OptionSelection, OptionShape, WidgetConfig, WriteEvent,
};

/// Exit codes for different termination scenarios
///
/// - 0: Clean exit
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum EditorExitCode {
    CleanExit = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<EditorExitCode> for ExitCode {
    fn from(code: EditorExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    store_type: String,
    entry_path: Option<String>,
    option_shape: String,
    location: String,
    event_capacity: Option<usize>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            store_type: env::var("VIDEXT_STORE_TYPE").unwrap_or_else(|_| "file".to_string()),
            entry_path: env::var("VIDEXT_ENTRY_PATH").ok(),
            option_shape: env::var("VIDEXT_OPTION_SHAPE").unwrap_or_else(|_| "split".to_string()),
            location: env::var("VIDEXT_LOCATION").unwrap_or_else(|_| "entry-editor".to_string()),
            event_capacity: env::var("VIDEXT_EVENT_CAPACITY")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .context("VIDEXT_EVENT_CAPACITY must be a positive integer")?,
            log_level: env::var("VIDEXT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.store_type.as_str() {
            "file" => match self.entry_path.as_deref() {
                None | Some("") => anyhow::bail!(
                    "VIDEXT_ENTRY_PATH is required when VIDEXT_STORE_TYPE=file. \
                    Set it via: export VIDEXT_ENTRY_PATH=./entry.json"
                ),
                Some(path) => {
                    if let Some(parent) = std::path::Path::new(path).parent()
                        && !parent.as_os_str().is_empty()
                        && !parent.exists()
                    {
                        anyhow::bail!(
                            "VIDEXT_ENTRY_PATH parent directory does not exist: {}. \
                            Create it first: mkdir -p {}",
                            parent.display(),
                            parent.display()
                        );
                    }
                }
            },
            "memory" => {}
            other => anyhow::bail!(
                "VIDEXT_STORE_TYPE '{}' is not supported. Supported types: file, memory",
                other
            ),
        }

        OptionShape::parse(&self.option_shape)?;
        self.location.parse::<HostLocation>()?;

        if let Some(capacity) = self.event_capacity
            && !(1..=65536).contains(&capacity)
        {
            anyhow::bail!(
                "VIDEXT_EVENT_CAPACITY must be between 1 and 65536. Got: {}",
                capacity
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "VIDEXT_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn widget_config(&self) -> Result<WidgetConfig> {
        let mut config = WidgetConfig::new(OptionShape::parse(&self.option_shape)?);
        if let Some(capacity) = self.event_capacity {
            config = config.with_event_channel_capacity(capacity);
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return EditorExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return EditorExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the form; logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return EditorExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return EditorExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_editor(config).await {
            Ok(()) => EditorExitCode::CleanExit,
            Err(e) => {
                error!("Editor error: {:#}", e);
                EditorExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Open the configured field store
async fn open_store(config: &Config) -> Result<Arc<dyn FieldStore>> {
    match (config.store_type.as_str(), config.entry_path.as_deref()) {
        ("file", Some(path)) => {
            let store = FileFieldStore::open(path)
                .await
                .with_context(|| format!("Failed to open entry file {}", path))?;
            info!("Editing entry file {}", store.path().display());
            Ok(Arc::new(store))
        }
        _ => {
            info!("Editing an in-memory entry; changes are discarded on exit");
            Ok(Arc::new(MemoryFieldStore::new()))
        }
    }
}

/// Run the editor until quit or end of input
async fn run_editor(config: Config) -> Result<()> {
    let location: HostLocation = config.location.parse()?;
    let store = open_store(&config).await?;

    let Some(mounted) = vidext_core::mount(location, store, config.widget_config()?)? else {
        info!("Widget is not shown at location {}, nothing to edit", location);
        return Ok(());
    };
    let mut controller = mounted.controller;
    let events = tokio::spawn(log_events(ReceiverStream::new(mounted.events)));

    print!("{}", controller.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Nothing => continue,
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Show => print!("{}", controller.view()),
            Command::Status => print_status(&controller),
            change => {
                apply_change(&mut controller, change);
                print!("{}", controller.view());
            }
        }
    }

    controller.unmount().await?;
    if let Err(e) = events.await {
        warn!("Event logger task failed: {}", e);
    }

    info!("Editor closed");
    Ok(())
}

/// Apply a change command; the write settles in the background
fn apply_change(controller: &mut FormController, command: Command) {
    let pending = match command {
        Command::Platform(value) => controller.change_platform(value),
        Command::VideoId(value) => controller.change_video_id(value),
        Command::Option { name, value } => {
            controller.change_option(&name, OptionSelection::parse(&value))
        }
        other => {
            debug!("Not a change command: {:?}", other);
            return;
        }
    };
    debug!("Queued write #{} to {}", pending.seq(), pending.field());
}

fn print_status(controller: &FormController) {
    for (field, status) in controller.sync_report() {
        let text = match status {
            FieldSync::Idle => "unchanged".to_string(),
            FieldSync::Pending { seq } => format!("saving (write #{})", seq),
            FieldSync::Committed { seq, at } => {
                format!("saved (write #{} at {})", seq, at.to_rfc3339())
            }
            FieldSync::Failed { seq, error, at } => {
                format!("NOT saved (write #{} at {}): {}", seq, at.to_rfc3339(), error)
            }
        };
        println!("{}: {}", field, text);
    }
}

/// Log write events until the writer stops
async fn log_events(mut events: ReceiverStream<WriteEvent>) {
    while let Some(event) = events.next().await {
        match event {
            WriteEvent::Queued { field, seq } => debug!("Write #{} to {} queued", seq, field),
            WriteEvent::Committed { field, seq } => debug!("Write #{} to {} saved", seq, field),
            WriteEvent::Failed { field, seq, error } => {
                warn!("Write #{} to {} failed: {}", seq, field, error)
            }
            WriteEvent::Stopped { writes_applied } => {
                info!("Saved {} write(s) this session", writes_applied);
            }
        }
    }
}
