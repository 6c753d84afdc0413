use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const GMT_PROGRAM_ENV: &str = "GMTPLOT_GMT";
pub const TEMP_DIR_ENV: &str = "GMTPLOT_TMPDIR";

/// Where to find the engine and where to stage tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable, resolved through `PATH` when not absolute
    pub program: PathBuf,
    /// Directory for staged tables; the system temp dir when unset
    pub temp_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gmt"),
            temp_dir: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `GMTPLOT_GMT` and `GMTPLOT_TMPDIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(program) = lookup(GMT_PROGRAM_ENV).filter(|v| !v.is_empty()) {
            config.program = PathBuf::from(program);
        }
        if let Some(dir) = lookup(TEMP_DIR_ENV).filter(|v| !v.is_empty()) {
            config.temp_dir = Some(PathBuf::from(dir));
        }
        config
    }
}
