//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`
//! so a partial JSON file only overrides what it names.

use std::path::{Path, PathBuf};

use detwidth_core::HeaderPosition;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "tools": { "root": "/opt/detwidth", "oracle": "build/det-width.x" },
///   "pipeline": { "dataDir": "data", "prunedHeader": "last" },
///   "logging": { "level": "info" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetwidthSettings {
    /// Locations of the external collaborator executables.
    pub tools: ToolSettings,
    /// Pipeline behavior.
    pub pipeline: PipelineSettings,
    /// Diagnostic logging.
    pub logging: LoggingSettings,
}

impl DetwidthSettings {
    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let verdict = &self.pipeline.verdict_file;
        if verdict.is_empty() || verdict.contains(['/', '\\']) {
            return Err(SettingsError::InvalidValue(format!(
                "pipeline.verdictFile must be a bare file name, got {verdict:?}"
            )));
        }
        if self.pipeline.data_dir.as_os_str().is_empty() {
            return Err(SettingsError::InvalidValue(
                "pipeline.dataDir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// External collaborator executables.
///
/// Relative paths resolve against `root`; when `root` is unset the directory
/// holding the running binary is used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolSettings {
    /// Directory that relative tool paths resolve against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Regex to minimum DFA compiler.
    pub compiler: PathBuf,
    /// DFA minimizer (stdin to stdout).
    pub minimizer: PathBuf,
    /// Minimum DFA pruner.
    pub pruner: PathBuf,
    /// Partition refinement for infimum/supremum automata.
    pub partition_refiner: PathBuf,
    /// Infimum/supremum merger producing the interval artifact.
    pub merger: PathBuf,
    /// Decision procedure.
    pub oracle: PathBuf,
    /// Memory-optimized decision procedure (`--memory`).
    pub oracle_low_memory: PathBuf,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            root: None,
            compiler: PathBuf::from("external/RegexpToAutomaton/regToAutomaton"),
            minimizer: PathBuf::from(
                "external/dfaMinimizationComparison/Cpp/Modified/minimizer.x",
            ),
            pruner: PathBuf::from("build/prune.x"),
            partition_refiner: PathBuf::from(
                "external/finite-automata-partition-refinement/build/part-ref32.x",
            ),
            merger: PathBuf::from("external/finite-automata-partition-refinement/build/merge32.x"),
            oracle: PathBuf::from("build/det-width.x"),
            oracle_low_memory: PathBuf::from("build/det-width-rm.x"),
        }
    }
}

impl ToolSettings {
    /// Resolve `tool` against `root` unless it is already absolute.
    pub fn resolve(root: &Path, tool: &Path) -> PathBuf {
        if tool.is_absolute() {
            tool.to_path_buf()
        } else {
            root.join(tool)
        }
    }

    /// The configured root, or `fallback` when none is set.
    pub fn root_or(&self, fallback: &Path) -> PathBuf {
        self.root.clone().unwrap_or_else(|| fallback.to_path_buf())
    }
}

/// Pipeline behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    /// Where regex-mode artifacts and the regex log are written (relative to
    /// the tools root unless absolute).
    pub data_dir: PathBuf,
    /// Name of the file the decision procedure writes its verdict to.
    pub verdict_file: String,
    /// Which record of the pruned automaton carries its header.
    pub pruned_header: HeaderPosition,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            verdict_file: "answer".to_string(),
            pruned_header: HeaderPosition::First,
        }
    }
}

/// Diagnostic logging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_install_layout() {
        let s = DetwidthSettings::default();
        assert_eq!(s.tools.pruner, PathBuf::from("build/prune.x"));
        assert_eq!(s.tools.oracle, PathBuf::from("build/det-width.x"));
        assert_eq!(s.pipeline.verdict_file, "answer");
        assert_eq!(s.pipeline.pruned_header, HeaderPosition::First);
        assert_eq!(s.logging.level, "warn");
        assert!(s.validate().is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(DetwidthSettings::default()).unwrap();
        assert!(json["tools"]["partitionRefiner"].is_string());
        assert!(json["tools"]["oracleLowMemory"].is_string());
        assert_eq!(json["pipeline"]["prunedHeader"], "first");
        assert!(json["tools"].get("root").is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s: DetwidthSettings =
            serde_json::from_str(r#"{"pipeline": {"prunedHeader": "last"}}"#).unwrap();
        assert_eq!(s.pipeline.pruned_header, HeaderPosition::Last);
        assert_eq!(s.pipeline.data_dir, PathBuf::from("data"));
        assert_eq!(s.tools, ToolSettings::default());
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let root = Path::new("/opt/detwidth");
        assert_eq!(
            ToolSettings::resolve(root, Path::new("build/prune.x")),
            PathBuf::from("/opt/detwidth/build/prune.x")
        );
        assert_eq!(
            ToolSettings::resolve(root, Path::new("/usr/bin/prune")),
            PathBuf::from("/usr/bin/prune")
        );
    }

    #[test]
    fn root_falls_back() {
        let mut tools = ToolSettings::default();
        assert_eq!(tools.root_or(Path::new("/bin")), PathBuf::from("/bin"));
        tools.root = Some(PathBuf::from("/opt"));
        assert_eq!(tools.root_or(Path::new("/bin")), PathBuf::from("/opt"));
    }

    #[test]
    fn validate_rejects_bad_verdict_file() {
        let mut s = DetwidthSettings::default();
        s.pipeline.verdict_file = "sub/answer".into();
        assert!(matches!(s.validate(), Err(SettingsError::InvalidValue(_))));
        s.pipeline.verdict_file = String::new();
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_data_dir() {
        let mut s = DetwidthSettings::default();
        s.pipeline.data_dir = PathBuf::new();
        assert!(s.validate().is_err());
    }
}
