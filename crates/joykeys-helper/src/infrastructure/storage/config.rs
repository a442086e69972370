//! TOML mapping file persistence.
//!
//! Reads and writes [`MappingFile`] from the platform-appropriate config file:
//! - Linux:    `$XDG_CONFIG_HOME/joykeys/config.toml` (or `~/.config/joykeys/config.toml`)
//! - Windows:  `%APPDATA%\joykeys\config.toml`
//! - macOS:    `~/Library/Application Support/joykeys/config.toml`
//!
//! # File layout (for beginners)
//!
//! ```toml
//! [settings]
//! device_suffix = "auto"      # auto | always | never
//! poll_interval_ms = 10
//! shutdown_policy = "drain"   # drain | cancel
//!
//! [mappings.HAT_0_up]
//! sequence = [{ key = "v" }, { key = "x", repeat = 2 }, { wait = 0.2 }]
//! delay = 0.1                 # seconds between every press and release
//! modifier = "BUTTON_3"       # only fire while BUTTON_3 is held
//! pre_run = "log_start"
//! after_run = "log_end"
//! ```
//!
//! Each key under `[mappings]` is a canonical event identifier.  A step is
//! either `{ key = ..., repeat = ... }` or `{ wait = <seconds> }`; anything
//! else is rejected.  Hook names must be registered in the
//! [`HookRegistry`]; the file never contains code.
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, so a file with
//! only a `[mappings]` section is complete.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use joykeys_core::{
    Action, ActionStep, ActionTable, CanonicalEventId, DeviceSuffix, KeyParseError, KeyRef,
    DEFAULT_INTER_KEY_DELAY,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::dispatch_input::{DispatcherSettings, ShutdownPolicy};
use crate::application::hooks::HookRegistry;
use crate::application::reload_config::ConfigSource;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A mapping is structurally valid TOML but makes no sense.
    #[error("mapping {id:?}: {reason}")]
    InvalidMapping { id: String, reason: String },

    /// A key name could not be parsed.
    #[error("mapping {id:?}: {source}")]
    InvalidKey {
        id: String,
        #[source]
        source: KeyParseError,
    },

    /// A hook name is not registered.
    #[error("mapping {id:?}: unknown hook {name:?}")]
    UnknownHook { id: String, name: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level mapping file stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MappingFile {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub mappings: BTreeMap<String, MappingEntry>,
}

/// Runtime settings.  Only read at startup; a reload replaces mappings only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// When button and hat identifiers carry a `_DEV<n>` suffix.
    #[serde(default)]
    pub device_suffix: DeviceSuffix,
    /// Idle sleep of the event loop in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Maximum number of sequences running at once.  Absent = unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,
    /// What happens to running sequences on exit.
    #[serde(default)]
    pub shutdown_policy: ShutdownPolicy,
    /// How long `drain` waits before aborting.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// One trigger's action as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MappingEntry {
    pub sequence: Vec<StepEntry>,
    /// Seconds after every press and release.  Default 0.1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_run: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_run: Option<String>,
}

/// One step as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StepEntry {
    Key(KeyStep),
    Wait(WaitStep),
}

/// `{ key = "x", repeat = 2 }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KeyStep {
    pub key: String,
    #[serde(default = "default_repeat", skip_serializing_if = "is_one")]
    pub repeat: u32,
}

/// `{ wait = 0.2 }` (seconds)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WaitStep {
    pub wait: f64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_poll_interval_ms() -> u64 {
    10
}
fn default_shutdown_grace_ms() -> u64 {
    2000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_repeat() -> u32 {
    1
}
fn is_one(n: &u32) -> bool {
    *n == 1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_suffix: DeviceSuffix::default(),
            poll_interval_ms: default_poll_interval_ms(),
            max_in_flight: None,
            shutdown_policy: ShutdownPolicy::default(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// The dispatcher tunables these settings describe.
    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            max_in_flight: self.max_in_flight,
            shutdown_policy: self.shutdown_policy,
            shutdown_grace: Duration::from_millis(self.shutdown_grace_ms),
        }
    }
}

impl StepEntry {
    /// `{ key = <key>, repeat = <repeat> }`
    pub fn key(key: &str, repeat: u32) -> Self {
        StepEntry::Key(KeyStep {
            key: key.to_string(),
            repeat,
        })
    }

    /// `{ wait = <seconds> }`
    pub fn wait(seconds: f64) -> Self {
        StepEntry::Wait(WaitStep { wait: seconds })
    }
}

impl MappingEntry {
    /// An entry with only a sequence.
    pub fn new(sequence: Vec<StepEntry>) -> Self {
        Self {
            sequence,
            delay: None,
            modifier: None,
            pre_run: None,
            after_run: None,
        }
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

impl MappingFile {
    /// The four hat presets written by `--create-config` and used when no
    /// usable mapping file exists.
    pub fn default_mappings() -> Self {
        let presets: [(&str, &[(&str, u32)]); 4] = [
            ("HAT_0_up", &[("v", 1), ("x", 2)]),
            ("HAT_0_down", &[("v", 1), ("c", 2)]),
            ("HAT_0_left", &[("v", 1), ("z", 1), ("x", 1)]),
            ("HAT_0_right", &[("v", 1), ("c", 1), ("x", 1)]),
        ];
        let mappings = presets
            .into_iter()
            .map(|(id, keys)| {
                let sequence = keys.iter().map(|&(key, n)| StepEntry::key(key, n)).collect();
                (id.to_string(), MappingEntry::new(sequence))
            })
            .collect();
        Self {
            settings: Settings::default(),
            mappings,
        }
    }

    /// Validates every mapping and builds the table the registry holds.
    ///
    /// # Errors
    ///
    /// The first invalid mapping (in identifier order) is reported; nothing
    /// is partially built.
    pub fn into_table(&self, hooks: &HookRegistry) -> Result<ActionTable, ConfigError> {
        let mut table = ActionTable::new();
        for (id, entry) in &self.mappings {
            let action = build_action(id, entry, hooks)?;
            let trigger = CanonicalEventId::new(id.as_str());
            if action.is_self_gated(&trigger) {
                warn!(trigger = %trigger, "mapping uses its own trigger as modifier and always fires");
            }
            table.insert(trigger, Arc::new(action));
        }
        Ok(table)
    }
}

fn build_action(id: &str, entry: &MappingEntry, hooks: &HookRegistry) -> Result<Action, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidMapping {
        id: id.to_string(),
        reason,
    };

    if id.trim().is_empty() {
        return Err(invalid("identifier is empty".to_string()));
    }
    if entry.sequence.is_empty() {
        return Err(invalid("sequence is empty".to_string()));
    }

    let mut steps = Vec::with_capacity(entry.sequence.len());
    for step in &entry.sequence {
        match step {
            StepEntry::Key(KeyStep { key, repeat }) => {
                let key: KeyRef = key.parse().map_err(|source| ConfigError::InvalidKey {
                    id: id.to_string(),
                    source,
                })?;
                let repeat = NonZeroU32::new(*repeat)
                    .ok_or_else(|| invalid(format!("key {key} has repeat 0")))?;
                steps.push(ActionStep::key(key, repeat));
            }
            StepEntry::Wait(WaitStep { wait }) => {
                let duration = seconds(*wait).ok_or_else(|| invalid(format!("invalid wait {wait}")))?;
                steps.push(ActionStep::wait(duration));
            }
        }
    }

    let delay = match entry.delay {
        Some(d) => seconds(d).ok_or_else(|| invalid(format!("invalid delay {d}")))?,
        None => DEFAULT_INTER_KEY_DELAY,
    };
    let mut action = Action::new(steps).with_delay(delay);

    if let Some(modifier) = &entry.modifier {
        if modifier.trim().is_empty() {
            return Err(invalid("modifier is empty".to_string()));
        }
        action = action.with_modifier(modifier.as_str());
    }

    let resolve = |name: &String| {
        hooks.resolve(name).ok_or_else(|| ConfigError::UnknownHook {
            id: id.to_string(),
            name: name.clone(),
        })
    };
    if let Some(name) = &entry.pre_run {
        action = action.with_pre_hook(resolve(name)?);
    }
    if let Some(name) = &entry.after_run {
        action = action.with_post_hook(resolve(name)?);
    }
    Ok(action)
}

/// Seconds from the file as a `Duration`; `None` for negative, non-finite or
/// out-of-range values.
fn seconds(value: f64) -> Option<Duration> {
    (value >= 0.0).then(|| Duration::try_from_secs_f64(value).ok()).flatten()
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default path to the mapping file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Reads and parses the mapping file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for any file-system error, including a missing
/// file, and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_mapping_file(path: &Path) -> Result<MappingFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Loads the mapping file at startup, falling back to the default mappings
/// when it is missing or unusable.
pub fn load_or_default(path: &Path, hooks: &HookRegistry) -> (MappingFile, ActionTable) {
    let loaded = load_mapping_file(path).and_then(|file| {
        let table = file.into_table(hooks)?;
        Ok((file, table))
    });
    match loaded {
        Ok(loaded) => {
            info!(path = %path.display(), mappings = loaded.1.len(), "using mapping file");
            return loaded;
        }
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "mapping file not found, using default mappings");
        }
        Err(e) => {
            error!("error loading mapping file, falling back to default mappings: {e}");
        }
    }
    let defaults = MappingFile::default_mappings();
    let table = defaults.into_table(hooks).unwrap_or_default();
    (defaults, table)
}

/// Persists `file` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_mapping_file(path: &Path, file: &MappingFile) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(file)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the default mapping file unless `path` already exists.
///
/// Returns `true` if a file was written.
pub fn create_default_config(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    save_mapping_file(path, &MappingFile::default_mappings())?;
    Ok(true)
}

/// Resolves the platform config directory including the `joykeys` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("joykeys"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("joykeys"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("joykeys"))
    }
}

// ── Config collaborator ───────────────────────────────────────────────────────

/// [`ConfigSource`] backed by the mapping file.
///
/// A missing or invalid file is an error here: on reload the previous table
/// stays active instead of silently reverting to the defaults.
pub struct FileConfigSource {
    path: PathBuf,
    hooks: HookRegistry,
}

impl FileConfigSource {
    pub fn new(path: PathBuf, hooks: HookRegistry) -> Self {
        Self { path, hooks }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<ActionTable, ConfigError> {
        load_mapping_file(&self.path)?.into_table(&self.hooks)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::hooks::{LOG_END, LOG_START};

    fn parse(toml_str: &str) -> MappingFile {
        toml::from_str(toml_str).expect("valid TOML")
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("joykeys_test_{}_{name}", std::process::id()))
            .join("config.toml")
    }

    // ── Schema ────────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.poll_interval_ms, 10);
        assert_eq!(settings.shutdown_grace_ms, 2000);
        assert_eq!(settings.shutdown_policy, ShutdownPolicy::Drain);
        assert_eq!(settings.device_suffix, DeviceSuffix::Auto);
        assert_eq!(settings.log_level, "info");
        assert!(settings.max_in_flight.is_none());
    }

    #[test]
    fn test_deserialize_full_mapping() {
        // Arrange
        let file = parse(
            r#"
[settings]
device_suffix = "always"
max_in_flight = 4
shutdown_policy = "cancel"

[mappings.HAT_0_up]
sequence = [{ key = "v" }, { wait = 0.2 }, { key = "x", repeat = 2 }]
delay = 0.05
modifier = "BUTTON_3"
pre_run = "log_start"
after_run = "log_end"
"#,
        );

        // Act
        let table = file.into_table(&HookRegistry::with_builtins()).expect("valid");

        // Assert
        assert_eq!(file.settings.device_suffix, DeviceSuffix::Always);
        assert_eq!(file.settings.dispatcher_settings().max_in_flight, Some(4));
        let action = table.get("HAT_0_up").expect("mapped");
        assert_eq!(
            action.steps,
            vec![
                ActionStep::tap(KeyRef::Char('v')),
                ActionStep::wait(Duration::from_millis(200)),
                ActionStep::key(KeyRef::Char('x'), NonZeroU32::new(2).unwrap()),
            ]
        );
        assert_eq!(action.inter_key_delay, Duration::from_millis(50));
        assert_eq!(action.required_modifier, Some(CanonicalEventId::new("BUTTON_3")));
        assert_eq!(action.pre_hook.as_ref().map(|h| h.name().to_string()), Some(LOG_START.to_string()));
        assert_eq!(action.post_hook.as_ref().map(|h| h.name().to_string()), Some(LOG_END.to_string()));
    }

    #[test]
    fn test_missing_delay_uses_default() {
        let file = parse("[mappings.BUTTON_1]\nsequence = [{ key = \"KEY_SPACE\" }]\n");
        let table = file.into_table(&HookRegistry::new()).expect("valid");
        assert_eq!(table["BUTTON_1"].inter_key_delay, DEFAULT_INTER_KEY_DELAY);
    }

    #[test]
    fn test_step_with_key_and_wait_is_rejected() {
        let result: Result<MappingFile, _> =
            toml::from_str("[mappings.A]\nsequence = [{ key = \"v\", wait = 1.0 }]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_mapping_field_is_rejected() {
        let result: Result<MappingFile, _> =
            toml::from_str("[mappings.A]\nsequence = [{ key = \"v\" }]\npreRun = \"print\"\n");
        assert!(result.is_err());
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_sequence_is_invalid() {
        let file = parse("[mappings.HAT_0_left]\nsequence = []\n");
        let err = file.into_table(&HookRegistry::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMapping { ref id, .. } if id == "HAT_0_left"));
    }

    #[test]
    fn test_unknown_key_name_is_invalid() {
        let file = parse("[mappings.A]\nsequence = [{ key = \"KEY_WARP_DRIVE\" }]\n");
        let err = file.into_table(&HookRegistry::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { .. }));
    }

    #[test]
    fn test_zero_repeat_is_invalid() {
        let file = parse("[mappings.A]\nsequence = [{ key = \"v\", repeat = 0 }]\n");
        assert!(matches!(
            file.into_table(&HookRegistry::new()),
            Err(ConfigError::InvalidMapping { .. })
        ));
    }

    #[test]
    fn test_negative_delay_and_wait_are_invalid() {
        let delay = parse("[mappings.A]\nsequence = [{ key = \"v\" }]\ndelay = -0.1\n");
        let wait = parse("[mappings.A]\nsequence = [{ wait = -1.0 }]\n");
        assert!(delay.into_table(&HookRegistry::new()).is_err());
        assert!(wait.into_table(&HookRegistry::new()).is_err());
    }

    #[test]
    fn test_delay_too_large_for_duration_is_invalid() {
        let file = parse("[mappings.A]\nsequence = [{ key = \"v\" }]\ndelay = 1e20\n");
        assert!(matches!(
            file.into_table(&HookRegistry::new()),
            Err(ConfigError::InvalidMapping { .. })
        ));
    }

    #[test]
    fn test_unknown_hook_is_rejected() {
        let file = parse("[mappings.A]\nsequence = [{ key = \"v\" }]\npre_run = \"print_starting\"\n");
        let err = file.into_table(&HookRegistry::with_builtins()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownHook { ref name, .. } if name == "print_starting"));
    }

    #[test]
    fn test_empty_modifier_is_invalid() {
        let file = parse("[mappings.A]\nsequence = [{ key = \"v\" }]\nmodifier = \"\"\n");
        assert!(file.into_table(&HookRegistry::new()).is_err());
    }

    #[test]
    fn test_self_gated_mapping_is_accepted() {
        let file = parse("[mappings.BUTTON_1]\nsequence = [{ key = \"v\" }]\nmodifier = \"BUTTON_1\"\n");
        let table = file.into_table(&HookRegistry::new()).expect("accepted with a warning");
        assert!(table["BUTTON_1"].is_self_gated(&CanonicalEventId::new("BUTTON_1")));
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_mappings_match_hat_presets() {
        // Arrange / Act
        let table = MappingFile::default_mappings()
            .into_table(&HookRegistry::new())
            .expect("defaults are valid");

        // Assert
        assert_eq!(table.len(), 4);
        assert_eq!(table["HAT_0_up"].key_press_count(), 3);
        assert_eq!(table["HAT_0_down"].key_press_count(), 3);
        assert_eq!(table["HAT_0_left"].key_press_count(), 3);
        assert_eq!(
            table["HAT_0_right"].steps,
            vec![
                ActionStep::tap(KeyRef::Char('v')),
                ActionStep::tap(KeyRef::Char('c')),
                ActionStep::tap(KeyRef::Char('x')),
            ]
        );
    }

    // ── File round trip ───────────────────────────────────────────────────────

    #[test]
    fn test_save_then_load_round_trips_defaults() {
        // Arrange
        let path = temp_path("round_trip");
        let file = MappingFile::default_mappings();

        // Act
        save_mapping_file(&path, &file).expect("save");
        let loaded = load_mapping_file(&path).expect("load");

        // Assert
        assert_eq!(loaded, file);

        // Cleanup
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_create_default_config_does_not_overwrite() {
        // Arrange
        let path = temp_path("create");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();

        // Act
        let first = create_default_config(&path).expect("create");
        let second = create_default_config(&path).expect("create again");

        // Assert
        assert!(first);
        assert!(!second);

        // Cleanup
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_or_default_falls_back_when_file_absent() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");
        let (file, table) = load_or_default(&path, &HookRegistry::new());
        assert_eq!(file, MappingFile::default_mappings());
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_load_or_default_falls_back_on_malformed_file() {
        // Arrange
        let path = temp_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let (_, table) = load_or_default(&path, &HookRegistry::new());

        // Assert
        assert_eq!(table.len(), 4);

        // Cleanup
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_or_default_falls_back_on_huge_wait() {
        // Arrange
        let path = temp_path("huge_wait");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[mappings.A]\nsequence = [{ wait = 1e300 }]\n").unwrap();

        // Act
        let (file, table) = load_or_default(&path, &HookRegistry::new());

        // Assert
        assert_eq!(file, MappingFile::default_mappings());
        assert_eq!(table.len(), 4);

        // Cleanup
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_file_source_reports_missing_file() {
        let source = FileConfigSource::new(
            PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml"),
            HookRegistry::new(),
        );
        assert!(matches!(source.load(), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_default_config_path_ends_with_config_toml() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("joykeys/config.toml"), "got {path:?}");
        }
        // NoPlatformConfigDir is acceptable in a stripped environment.
    }
}
