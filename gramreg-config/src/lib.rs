//! Shared configuration loader for gramreg.
//!
//! `defaults/gramreg.default.toml` is embedded into the binary so that docs and runtime
//! behavior stay in sync. The CLI layers user files and flag overrides on top of those
//! defaults via [`Loader`] before deserializing into [`GramregConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use gramreg_engine::EngineSettings;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub use config::ConfigError as Error;

const DEFAULT_TOML: &str = include_str!("../defaults/gramreg.default.toml");

/// Top-level configuration consumed by gramreg.
#[derive(Debug, Clone, Deserialize)]
pub struct GramregConfig {
    pub generator: GeneratorConfig,
    pub run: RunConfig,
    pub sanitizer: SanitizerConfig,
    pub environment: EnvironmentConfig,
}

/// How the external engine is invoked.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub program: String,
    pub generate_args: Vec<String>,
    pub test_args: Vec<String>,
    pub generation_timeout_ms: u64,
    pub parse_timeout_ms: u64,
}

impl GeneratorConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }

    /// `None` when parsing is unbounded.
    pub fn parse_timeout(&self) -> Option<Duration> {
        (self.parse_timeout_ms > 0).then(|| Duration::from_millis(self.parse_timeout_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub max_generated: usize,
    pub update_subfolder: String,
    pub source_environment: String,
    pub update_environment: String,
    pub keep_going: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SanitizerConfig {
    pub markers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub command: Vec<String>,
}

impl GramregConfig {
    /// Reject settings that would make every run fail or produce nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.program.trim().is_empty() {
            return Err(invalid("generator.program must name the engine program"));
        }
        if self.generator.generation_timeout_ms == 0 {
            return Err(invalid("generator.generation_timeout_ms must be greater than 0"));
        }
        if self.run.max_generated == 0 {
            return Err(invalid("run.max_generated must be at least 1"));
        }
        // An empty marker is contained in every line and would drop all engine output.
        if self.sanitizer.markers.is_empty() || self.sanitizer.markers.iter().any(String::is_empty) {
            return Err(invalid("sanitizer.markers must hold at least one non-empty marker"));
        }
        Ok(())
    }

    /// Settings for the process-backed engine.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            program: self.generator.program.clone(),
            generate_args: self.generator.generate_args.clone(),
            test_args: self.generator.test_args.clone(),
            parse_timeout: self.generator.parse_timeout(),
            environment_command: self.environment.command.clone(),
        }
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Message(message.to_string())
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder, deserialize the resulting configuration and validate it.
    pub fn build(self) -> Result<GramregConfig, ConfigError> {
        let config: GramregConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<GramregConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.generator.program, "xmlgenerator");
        assert_eq!(config.generator.generation_timeout(), Duration::from_secs(30));
        assert_eq!(config.generator.parse_timeout(), None);
        assert_eq!(config.run.max_generated, 100);
        assert_eq!(config.run.update_subfolder, "updated");
        assert_eq!(config.sanitizer.markers, vec![":", "|", "=="]);
        assert!(config.environment.command.is_empty());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("run.max_generated", 5_i64)
            .expect("override to apply")
            .set_override("generator.parse_timeout_ms", 1500_i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.run.max_generated, 5);
        assert_eq!(config.generator.parse_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn user_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gramreg.toml");
        fs::write(
            &path,
            "[environment]\ncommand = [\"bash\", \"/opt/xmlgenerator/{env}/env.sh\"]\n",
        )
        .unwrap();

        let config = Loader::new().with_file(&path).build().expect("config to build");
        let settings = config.engine_settings();
        assert_eq!(settings.environment_command, vec!["bash", "/opt/xmlgenerator/{env}/env.sh"]);
        assert_eq!(settings.generate_args, vec!["-g_s", "-m_g"]);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/gramreg.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.run.source_environment, "ver_1");
    }

    #[test]
    fn blank_program_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gramreg.toml");
        fs::write(&path, "[generator]\nprogram = \"  \"\n").unwrap();

        let err = Loader::new().with_file(&path).build().unwrap_err();
        assert!(err.to_string().contains("generator.program"));
    }

    #[test]
    fn empty_marker_is_rejected() {
        let err = Loader::new()
            .set_override("sanitizer.markers", vec![":", ""])
            .expect("override to apply")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("non-empty marker"));
    }

    #[test]
    fn zero_sentences_is_rejected() {
        let err = Loader::new()
            .set_override("run.max_generated", 0_i64)
            .expect("override to apply")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("run.max_generated"));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        assert!(Loader::new().with_file("/nonexistent/gramreg.toml").build().is_err());
    }
}
