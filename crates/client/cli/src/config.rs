//! CLI run configuration and its environment loader.
use std::env;
use std::path::PathBuf;

/// Everything one `arena-cli` run needs besides the content itself.
#[derive(Clone, Debug, PartialEq)]
pub struct CliConfig {
    /// Directory holding `config.toml`, `tunings.ron` and `scenarios/`.
    pub data_dir: PathBuf,
    /// Scenario name under `scenarios/`, or a path to a `.ron` file.
    pub scenario: String,
    /// Overrides `data_dir/config.toml`.
    pub config_path: Option<PathBuf>,
    /// Simulated seconds to run.
    pub duration: f32,
    /// Frames per second fed to the runtime.
    pub tick_hz: f32,
    /// Pace frames against the wall clock instead of running flat out.
    pub realtime: bool,
    /// Write a log file here in addition to stderr.
    pub log_dir: Option<PathBuf>,
    /// Overrides the scenario seed.
    pub seed: Option<u64>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            scenario: "arena".to_string(),
            config_path: None,
            duration: 30.0,
            tick_hz: 50.0,
            realtime: false,
            log_dir: None,
            seed: None,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_DATA_DIR` - Content directory (default: `data`)
    /// - `ARENA_SCENARIO` - Scenario name or `.ron` path (default: `arena`)
    /// - `ARENA_CONFIG` - Game config TOML (default: `<data dir>/config.toml`)
    /// - `ARENA_DURATION` - Seconds to simulate (default: 30)
    /// - `ARENA_TICK_HZ` - Frame rate (default: 50)
    /// - `ARENA_REALTIME` - Pace frames in real time (default: false)
    /// - `ARENA_LOG_DIR` - Also log to `<dir>/arena.log`
    /// - `ARENA_SEED` - Override the scenario seed
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`CliConfig::from_env`], reading variables through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("ARENA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(scenario) = lookup("ARENA_SCENARIO").filter(|s| !s.is_empty()) {
            config.scenario = scenario;
        }
        config.config_path = lookup("ARENA_CONFIG").map(PathBuf::from);

        if let Some(duration) = read_env::<f32>(&lookup, "ARENA_DURATION")
            && duration.is_finite()
        {
            config.duration = duration.max(0.0);
        }
        if let Some(hz) = read_env::<f32>(&lookup, "ARENA_TICK_HZ")
            && hz.is_finite()
        {
            config.tick_hz = hz.max(1.0);
        }

        // A bare `ARENA_REALTIME=` counts as enabled
        if let Some(realtime) = read_env::<bool>(&lookup, "ARENA_REALTIME") {
            config.realtime = realtime;
        } else if let Some(value) = lookup("ARENA_REALTIME") {
            config.realtime = value.is_empty() || value == "1";
        }

        config.log_dir = lookup("ARENA_LOG_DIR").map(PathBuf::from);
        config.seed = read_env::<u64>(&lookup, "ARENA_SEED");

        config
    }

    /// Seconds per frame.
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.tick_hz
    }

    /// Whole frames covering `duration`.
    pub fn frames(&self) -> u64 {
        (self.duration * self.tick_hz).round() as u64
    }
}

fn read_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.parse().ok()
}
