//! joykeys helper entry point.
//!
//! Parses the command line, sets up logging, loads the mapping file and runs
//! the dispatcher until Ctrl-C / SIGTERM.
//!
//! # Usage
//!
//! ```text
//! joykeys [OPTIONS]
//!
//! Options:
//!   --config <PATH>      Mapping file [default: <config dir>/joykeys/config.toml]
//!   --create-config      Write the default mapping file and exit
//!   --joystick-events    Print joystick button and hat events
//!   --keyboard-events    Print key presses with their mapping names
//!   --dry-run            Log key output instead of typing it
//!   --log-level <LEVEL>  error | warn | info | debug | trace
//!   --log-file <PATH>    Write logs to a file instead of stderr
//! ```
//!
//! # Log level precedence
//!
//! `RUST_LOG` beats `--log-level`, which beats `log_level` in the mapping
//! file.  The default is `info`.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_or_default()          -- mapping file or built-in hat mappings
//!  └─ ActionRegistry              -- swappable mapping table
//!  └─ ControlHandle               -- stop / reload, wired to signals
//!  └─ EvdevInputSource::start()   -- one reader thread per device
//!  └─ Dispatcher::run()           -- event loop, one task per sequence
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use joykeys_core::EventNamer;
use joykeys_helper::application::action_registry::ActionRegistry;
use joykeys_helper::application::dispatch_input::Dispatcher;
use joykeys_helper::application::execute_sequence::KeyOutput;
use joykeys_helper::application::hooks::HookRegistry;
use joykeys_helper::application::reload_config::ReloadCoordinator;
use joykeys_helper::infrastructure::control::{spawn_signal_handlers, spawn_stop_handlers, ControlHandle};
use joykeys_helper::infrastructure::input_capture::{joystick_count, InputSource};
use joykeys_helper::infrastructure::key_emulation::logging::LoggingKeyOutput;
use joykeys_helper::infrastructure::monitor::{run_monitor, MonitorMode};
use joykeys_helper::infrastructure::storage::config::{
    create_default_config, default_config_path, load_mapping_file, load_or_default,
    FileConfigSource,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Maps joystick buttons, hat directions and keys to keyboard sequences.
#[derive(Debug, Parser)]
#[command(name = "joykeys", version)]
struct Cli {
    /// Path of the TOML mapping file.
    #[arg(long, env = "JOYKEYS_CONFIG")]
    config: Option<PathBuf>,

    /// Write the default mapping file (if none exists) and exit.
    #[arg(long)]
    create_config: bool,

    /// Print joystick button and hat events instead of running mappings.
    #[arg(long, conflicts_with = "keyboard_events")]
    joystick_events: bool,

    /// Print key presses with the names a mapping would use.
    #[arg(long)]
    keyboard_events: bool,

    /// Log synthesized key presses instead of typing them.
    #[arg(long)]
    dry_run: bool,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long)]
    log_level: Option<String>,

    /// Append logs to this file instead of writing them to stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn monitor_mode(&self) -> Option<MonitorMode> {
        if self.joystick_events {
            Some(MonitorMode::Joystick)
        } else if self.keyboard_events {
            Some(MonitorMode::Keyboard)
        } else {
            None
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => default_config_path().context("cannot determine the mapping file location")?,
    };

    if cli.create_config {
        let written = create_default_config(&config_path)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        if written {
            println!("wrote default mappings to {}", config_path.display());
        } else {
            println!("{} already exists, left unchanged", config_path.display());
        }
        return Ok(());
    }

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // The file is peeked once for `log_level` so that loading it for real is
    // already logged at the configured level.
    let level = cli.log_level.clone().unwrap_or_else(|| {
        load_mapping_file(&config_path)
            .map(|file| file.settings.log_level)
            .unwrap_or_else(|_| "info".to_string())
    });
    init_tracing(&level, cli.log_file.as_deref())?;

    info!("joykeys starting");

    let hooks = HookRegistry::with_builtins();
    let (file, table) = load_or_default(&config_path, &hooks);
    let settings = file.settings;

    if let Some(mode) = cli.monitor_mode() {
        let source = open_input_source(mode == MonitorMode::Keyboard)?;
        let running = Arc::new(AtomicBool::new(true));
        spawn_stop_handlers(Arc::clone(&running));
        let namer = EventNamer::new(settings.device_suffix, 0);
        run_monitor(source.as_ref(), namer, mode, running).await?;
        return Ok(());
    }

    // ── Mapping table and control surface ─────────────────────────────────────
    let registry = Arc::new(ActionRegistry::new(table));
    let reloader = Arc::new(ReloadCoordinator::new(
        Arc::new(FileConfigSource::new(config_path, hooks)),
        Arc::clone(&registry),
    ));
    let handle = ControlHandle::new(reloader);
    spawn_signal_handlers(handle.clone());

    // ── Input and output ──────────────────────────────────────────────────────
    let source = open_input_source(true)?;
    let namer = EventNamer::new(settings.device_suffix, joystick_count(&source.devices()));
    if namer.uses_device_suffix() {
        info!("button and hat names carry a _DEV<n> suffix");
    }

    let sink = open_key_output(cli.dry_run)?;

    // ── Event loop ────────────────────────────────────────────────────────────
    let events = source.start().context("failed to start input capture")?;
    info!("joykeys ready.  Press Ctrl-C to exit.");

    let mut dispatcher = Dispatcher::new(registry, sink, namer, settings.dispatcher_settings());
    let report = dispatcher.run(events, handle.running_flag()).await;
    source.stop();

    if report.aborted > 0 {
        warn!(aborted = report.aborted, "some sequences were cut short");
    }
    info!(drained = report.drained, "joykeys stopped");
    Ok(())
}

// ── Setup helpers ─────────────────────────────────────────────────────────────

/// Installs the global `tracing` subscriber.
fn init_tracing(level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn open_input_source(include_keyboards: bool) -> anyhow::Result<Box<dyn InputSource>> {
    use joykeys_helper::infrastructure::input_capture::linux::EvdevInputSource;
    use joykeys_helper::infrastructure::key_emulation::VIRTUAL_KEYBOARD_NAME;

    Ok(Box::new(EvdevInputSource::open(include_keyboards, VIRTUAL_KEYBOARD_NAME)))
}

#[cfg(not(target_os = "linux"))]
fn open_input_source(_include_keyboards: bool) -> anyhow::Result<Box<dyn InputSource>> {
    use joykeys_helper::infrastructure::input_capture::CaptureError;

    Err(CaptureError::UnsupportedPlatform(std::env::consts::OS.to_string()).into())
}

#[cfg(target_os = "linux")]
fn open_key_output(dry_run: bool) -> anyhow::Result<Arc<dyn KeyOutput>> {
    use joykeys_helper::infrastructure::key_emulation::linux::UinputKeyOutput;

    if dry_run {
        info!("dry run: key output is logged, not typed");
        return Ok(Arc::new(LoggingKeyOutput));
    }
    let output = UinputKeyOutput::new()
        .context("cannot create the virtual keyboard (is /dev/uinput writable? try --dry-run)")?;
    Ok(Arc::new(output))
}

#[cfg(not(target_os = "linux"))]
fn open_key_output(dry_run: bool) -> anyhow::Result<Arc<dyn KeyOutput>> {
    if !dry_run {
        warn!("no native key output on this platform, logging key presses instead");
    }
    Ok(Arc::new(LoggingKeyOutput))
}
