//! Harness settings loading and management
//!
//! Architecture: Anti-Corruption Layer - settings translate an optional YAML file into tool invocations
//! - Defaults reproduce the stock Scrutinizer setup for Go projects
//! - Every command line, file name and rewrite target used by the pipeline comes from here

use crate::domain::errors::{ScrutinizeError, ScrutinizeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched, in order, when no settings file is given explicitly
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    ["go_scrutinize.yaml", "go_scrutinize.yml", ".go_scrutinize.yaml"];

const SUPPORTED_VERSIONS: [&str; 1] = ["1.0"];

/// Main settings structure for go-scrutinize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrutinizeConfig {
    /// Settings format version
    pub version: String,
    /// Dependency installation
    #[serde(default)]
    pub dependencies: DependencyConfig,
    /// Linter installation and invocation
    #[serde(default)]
    pub lint: LintConfig,
    /// Coverage tooling and report rewriting
    #[serde(default)]
    pub coverage: CoverageConfig,
}

/// How project dependencies are fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Package-fetch program, also used to install tools
    pub fetch_program: String,
    /// Sub-command used to fetch a package
    pub fetch_command: String,
    /// Arguments fetching the project's own dependencies
    pub project_args: Vec<String>,
}

/// How the linter is installed and run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Package installing the linter
    pub package: String,
    /// Linter binary name under `<tool_path>/bin`
    pub binary: String,
    /// Project-local linter configuration file, passed with `--config=` when present
    pub config_file: String,
    /// Value of the linter's `--deadline=` flag
    pub deadline: String,
    /// Report file written from the linter's standard output
    pub report_file: String,
    /// Additional arguments appended after the standard ones
    pub extra_args: Vec<String>,
}

/// How tests are run with coverage and how the report is produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Packages installing the collector and the converter
    pub packages: Vec<String>,
    /// Coverage collector binary name under `<tool_path>/bin`
    pub collector: String,
    /// Converter binary name under `<tool_path>/bin`
    pub converter: String,
    /// Arguments given to the collector
    pub test_args: Vec<String>,
    /// Report file written from the converter's output
    pub report_file: String,
    /// Replacement for the local checkout path inside the report
    pub build_path: String,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            fetch_program: "go".to_string(),
            fetch_command: "get".to_string(),
            project_args: strings(&["-t", "./..."]),
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            package: "github.com/alecthomas/gometalinter".to_string(),
            binary: "gometalinter".to_string(),
            config_file: "go-scrutinize.config".to_string(),
            deadline: "1m".to_string(),
            report_file: "checkstyle_report.xml".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            packages: strings(&["github.com/axw/gocov/...", "github.com/AlekSi/gocov-xml"]),
            collector: "gocov".to_string(),
            converter: "gocov-xml".to_string(),
            test_args: strings(&["test", "./...", "-race", "-v"]),
            report_file: "coverage.xml".to_string(),
            build_path: "/home/scrutinizer/build".to_string(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl ScrutinizeConfig {
    /// Load settings from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ScrutinizeResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            ScrutinizeError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            ScrutinizeError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load settings from string content
    pub fn load_from_str(content: &str) -> ScrutinizeResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| ScrutinizeError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load the explicit file if given, else the first default file found in
    /// `dir`, else the built-in defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> ScrutinizeResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match Self::find_default_file(dir) {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::load_from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// First default settings file present in `dir`
    pub fn find_default_file(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES.iter().map(|name| dir.join(name)).find(|path| path.is_file())
    }

    /// Validate the settings for consistency
    pub fn validate(&self) -> ScrutinizeResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(ScrutinizeError::config(format!(
                "Unsupported configuration version: {}. Supported versions: {}",
                self.version,
                SUPPORTED_VERSIONS.join(", ")
            )));
        }

        let required = [
            ("dependencies.fetch_program", &self.dependencies.fetch_program),
            ("dependencies.fetch_command", &self.dependencies.fetch_command),
            ("lint.package", &self.lint.package),
            ("lint.binary", &self.lint.binary),
            ("lint.config_file", &self.lint.config_file),
            ("lint.deadline", &self.lint.deadline),
            ("lint.report_file", &self.lint.report_file),
            ("coverage.collector", &self.coverage.collector),
            ("coverage.converter", &self.coverage.converter),
            ("coverage.report_file", &self.coverage.report_file),
            ("coverage.build_path", &self.coverage.build_path),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ScrutinizeError::config(format!("'{field}' must not be empty")));
            }
        }

        if self.lint.report_file == self.coverage.report_file {
            return Err(ScrutinizeError::config(format!(
                "Lint and coverage reports would both be written to '{}'",
                self.lint.report_file
            )));
        }

        Ok(())
    }

    /// Convert to JSON for display
    pub fn to_json(&self) -> ScrutinizeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScrutinizeError::config(format!("Failed to serialize config: {e}")))
    }

    /// Convert to YAML, the format settings files are written in
    pub fn to_yaml(&self) -> ScrutinizeResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ScrutinizeError::config(format!("Failed to serialize config: {e}")))
    }
}

impl Default for ScrutinizeConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            dependencies: DependencyConfig::default(),
            lint: LintConfig::default(),
            coverage: CoverageConfig::default(),
        }
    }
}

/// Settings builder for programmatic construction
pub struct ConfigBuilder {
    config: ScrutinizeConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self { config: ScrutinizeConfig::default() }
    }

    /// Set the linter deadline
    pub fn lint_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.config.lint.deadline = deadline.into();
        self
    }

    /// Append an argument to the linter invocation
    pub fn add_lint_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.lint.extra_args.push(arg.into());
        self
    }

    /// Set the canonical build path written into the coverage report
    pub fn build_path(mut self, path: impl Into<String>) -> Self {
        self.config.coverage.build_path = path.into();
        self
    }

    /// Set both report file names
    pub fn report_files(mut self, lint: impl Into<String>, coverage: impl Into<String>) -> Self {
        self.config.lint.report_file = lint.into();
        self.config.coverage.report_file = coverage.into();
        self
    }

    /// Build the final settings
    pub fn build(self) -> ScrutinizeResult<ScrutinizeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_stock_setup() {
        let config = ScrutinizeConfig::default();
        config.validate().unwrap();

        assert_eq!(config.dependencies.project_args, vec!["-t", "./..."]);
        assert_eq!(config.lint.report_file, "checkstyle_report.xml");
        assert_eq!(config.lint.config_file, "go-scrutinize.config");
        assert_eq!(config.coverage.report_file, "coverage.xml");
        assert_eq!(config.coverage.build_path, "/home/scrutinizer/build");
        assert_eq!(config.coverage.test_args, vec!["test", "./...", "-race", "-v"]);

        let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(json["lint"]["deadline"], "1m");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ScrutinizeConfig::load_from_str(
            "version: \"1.0\"\nlint:\n  deadline: 5m\n  extra_args: [\"--vendor\"]\n",
        )
        .unwrap();

        assert_eq!(config.lint.deadline, "5m");
        assert_eq!(config.lint.extra_args, vec!["--vendor"]);
        assert_eq!(config.lint.binary, "gometalinter");
        assert_eq!(config.coverage, CoverageConfig::default());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = ScrutinizeConfig::load_from_str("version: \"2.0\"\n").unwrap_err();
        assert!(err.to_string().contains("Unsupported configuration version"));
    }

    #[test]
    fn test_rejects_empty_program() {
        let err = ScrutinizeConfig::load_from_str(
            "version: \"1.0\"\ncoverage:\n  converter: \"\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("coverage.converter"));
    }

    #[test]
    fn test_rejects_shared_report_file() {
        let result = ConfigBuilder::new().report_files("out.xml", "out.xml").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_discover_prefers_explicit_then_default_file() {
        let temp_dir = TempDir::new().unwrap();

        let config = ScrutinizeConfig::discover(None, temp_dir.path()).unwrap();
        assert_eq!(config, ScrutinizeConfig::default());

        fs::write(
            temp_dir.path().join(".go_scrutinize.yaml"),
            "version: \"1.0\"\nlint:\n  deadline: 2m\n",
        )
        .unwrap();
        let config = ScrutinizeConfig::discover(None, temp_dir.path()).unwrap();
        assert_eq!(config.lint.deadline, "2m");

        let explicit = temp_dir.path().join("custom.yaml");
        fs::write(&explicit, "version: \"1.0\"\nlint:\n  deadline: 9m\n").unwrap();
        let config = ScrutinizeConfig::discover(Some(&explicit), temp_dir.path()).unwrap();
        assert_eq!(config.lint.deadline, "9m");
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("go_scrutinize.yaml");
        let config = ConfigBuilder::new().lint_deadline("3m").add_lint_arg("--fast").build().unwrap();

        fs::write(&path, config.to_yaml().unwrap()).unwrap();
        assert_eq!(ScrutinizeConfig::load_from_file(&path).unwrap(), config);
    }
}
