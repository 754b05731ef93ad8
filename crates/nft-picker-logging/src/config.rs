//! Logging configuration
//!
//! Serializable, so an embedder can load it with the rest of its settings and
//! hand it to [`PickerSubscriberBuilder`](crate::PickerSubscriberBuilder).

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where log output goes and how it is filtered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level for targets without an override; `RUST_LOG` wins over it
    pub default_level: String,

    pub console: ConsoleOutput,

    /// JSONL file output, off when `None`
    pub file: Option<FileConfig>,

    /// Shape of JSONL lines, on the console and in files
    pub jsonl: JsonlConfig,

    /// Per-target level overrides, e.g. `nft_picker_engine::hydrator = "trace"`
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            console: ConsoleOutput::default(),
            file: None,
            jsonl: JsonlConfig::default(),
            targets: HashMap::new(),
        }
    }
}

impl LogConfig {
    /// Debug level, human-readable colored console
    pub fn development() -> Self {
        Self {
            default_level: "debug".to_string(),
            console: ConsoleOutput::Pretty { ansi: true },
            ..Default::default()
        }
    }

    /// Daily-rotated JSONL files in `log_dir`, nothing on the console
    pub fn production(log_dir: PathBuf) -> Self {
        Self {
            console: ConsoleOutput::Off,
            file: Some(FileConfig {
                directory: log_dir,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Warnings only, as JSONL on the console
    pub fn testing() -> Self {
        Self {
            default_level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// Env-filter directives: the default level, then each target override
    ///
    /// Targets are sorted so the directive string is stable.
    pub fn filter_directives(&self) -> String {
        let mut targets: Vec<_> = self.targets.iter().collect();
        targets.sort();

        let mut directives = vec![self.default_level.clone()];
        directives.extend(targets.into_iter().map(|(t, l)| format!("{}={}", t, l)));
        directives.join(",")
    }
}

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleOutput {
    Off,
    /// One JSON object per line on stdout
    #[default]
    Jsonl,
    Pretty {
        ansi: bool,
    },
}

impl ConsoleOutput {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ConsoleOutput::Off)
    }
}

/// JSONL file output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub directory: PathBuf,
    /// File name prefix; `Never` rotation writes `<prefix>.log`
    pub prefix: String,
    pub rotation: RotationStrategy,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            prefix: "nft-picker".to_string(),
            rotation: RotationStrategy::Daily,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RotationStrategy {
    #[default]
    Daily,
    Hourly,
    /// One file, truncated on install
    Never,
}

/// Extra content on each JSONL line
///
/// Event fields are always flattened to the top level, and the innermost
/// span (with its fields) is always included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonlConfig {
    /// Also list every enclosing span, outermost first
    pub span_list: bool,
    /// Source file and line of the logging call
    pub source_location: bool,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            span_list: true,
            source_location: false,
        }
    }
}
