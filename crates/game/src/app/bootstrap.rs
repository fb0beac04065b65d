use std::env;
use std::path::{Path, PathBuf};

use dungeon_engine::{
    load_layout_file, parse_layout, resolve_app_paths, AppError, AppPaths, AudioCue, AudioSink,
    ClockMode, DungeonLayout, JsonSaveStore, LayoutError, LoopConfig, Simulation,
    SimulationServices,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::script::{ScriptError, ScriptedInput};

const LAYOUT_ENV_VAR: &str = "DUNGEON_LAYOUT";
const SCRIPT_ENV_VAR: &str = "DUNGEON_SCRIPT";
const MAX_TICKS_ENV_VAR: &str = "DUNGEON_MAX_TICKS";
const REALTIME_ENV_VAR: &str = "DUNGEON_REALTIME";

const EMBEDDED_LAYOUT_NAME: &str = "<embedded>/dungeon.xml";
const EMBEDDED_LAYOUT: &str = include_str!("../../../../assets/dungeon.xml");
/// Walks the embedded layout from the entrance to the treasure chest.
const DEFAULT_SCRIPT: &str = "E*136,S*100";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("invalid DUNGEON_SCRIPT program: {0}")]
    Script(#[from] ScriptError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) simulation: Simulation,
    pub(crate) input: ScriptedInput,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Dungeon Startup ===");

    let paths = resolve_app_paths().map_err(AppError::from)?;
    info!(
        root = %paths.root.display(),
        saves_dir = %paths.saves_dir.display(),
        "app_paths_resolved"
    );

    let layout_source = resolve_layout_source(read_env(LAYOUT_ENV_VAR), &paths);
    let layout = load_layout(&layout_source).map_err(AppError::from)?;

    let script = read_env(SCRIPT_ENV_VAR).unwrap_or_else(|| DEFAULT_SCRIPT.to_string());
    let input = ScriptedInput::parse(&script)?;
    info!(script_ticks = input.total_ticks(), "input_script_loaded");

    let services = SimulationServices::new(
        Box::new(TracingAudio),
        Box::new(JsonSaveStore::in_dir(&paths.saves_dir)),
    );
    let simulation =
        Simulation::at_start(layout.dungeon, services).with_layout_fingerprint(layout.fingerprint);

    let config = LoopConfig {
        max_ticks: parse_max_ticks(read_env(MAX_TICKS_ENV_VAR).as_deref()),
        clock: parse_clock_mode(read_env(REALTIME_ENV_VAR).as_deref()),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        simulation,
        input,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Logs every cue instead of playing it.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TracingAudio;

impl AudioSink for TracingAudio {
    fn notify(&mut self, cue: AudioCue) {
        info!(sound = cue.sound_key(), cue = ?cue, "audio_cue");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LayoutSource {
    File(PathBuf),
    Embedded,
}

fn resolve_layout_source(env_value: Option<String>, paths: &AppPaths) -> LayoutSource {
    if let Some(raw) = env_value {
        let path = PathBuf::from(raw);
        return if path.is_absolute() {
            LayoutSource::File(path)
        } else {
            LayoutSource::File(paths.root.join(path))
        };
    }
    let default_path = paths.default_layout_path();
    if default_path.is_file() {
        LayoutSource::File(default_path)
    } else {
        LayoutSource::Embedded
    }
}

fn load_layout(source: &LayoutSource) -> Result<DungeonLayout, LayoutError> {
    match source {
        LayoutSource::File(path) => load_layout_file(path),
        LayoutSource::Embedded => {
            info!("layout file not found; using embedded layout");
            parse_layout(EMBEDDED_LAYOUT, Path::new(EMBEDDED_LAYOUT_NAME))
        }
    }
}

fn read_env(var: &'static str) -> Option<String> {
    match env::var(var) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var = var,
                error = %err,
                "unable to read env var; falling back to default"
            );
            None
        }
    }
}

fn parse_max_ticks(raw: Option<&str>) -> Option<u64> {
    let value = raw?;
    match value.trim().parse::<u64>() {
        Ok(ticks) => Some(ticks),
        Err(_) => {
            warn!(
                env_var = MAX_TICKS_ENV_VAR,
                value, "invalid max-ticks env var value; running without a tick limit"
            );
            None
        }
    }
}

fn parse_clock_mode(raw: Option<&str>) -> ClockMode {
    let Some(value) = raw else {
        return ClockMode::Stepped;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => ClockMode::Realtime,
        "" | "0" | "false" | "no" | "off" => ClockMode::Stepped,
        _ => {
            warn!(
                env_var = REALTIME_ENV_VAR,
                value, "invalid realtime env var value; falling back to stepped clock"
            );
            ClockMode::Stepped
        }
    }
}
