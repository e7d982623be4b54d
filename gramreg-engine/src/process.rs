//! Process-backed grammar engine
//!
//! Runs the engine program as a child process:
//!
//! ```text
//! xmlgenerator <grammar> -g_s -m_g <count>      # generation
//! xmlgenerator <grammar> -t_f <sentence file>   # parsing
//! ```
//!
//! Children are driven by a single-threaded tokio runtime owned by the engine so a time
//! budget can be enforced; a child that outlives its budget is killed.

use crate::capability::{EnvironmentSwitcher, GrammarParser, SentenceGenerator, Stage};
use crate::error::{EngineError, Result};
use crate::fault::Fault;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::Runtime;
use tracing::debug;

/// Placeholder replaced by the environment name in the environment command.
pub const ENV_PLACEHOLDER: &str = "{env}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Engine program, looked up on `PATH` unless it is a path.
    pub program: String,
    /// Arguments placed between the grammar and the sentence count when generating.
    pub generate_args: Vec<String>,
    /// Arguments placed between the grammar and the sentence file when parsing.
    pub test_args: Vec<String>,
    /// Budget for a parse run; `None` waits for as long as it takes.
    pub parse_timeout: Option<Duration>,
    /// Command selecting an engine installation. Empty disables switching.
    pub environment_command: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            program: "xmlgenerator".to_string(),
            generate_args: vec!["-g_s".to_string(), "-m_g".to_string()],
            test_args: vec!["-t_f".to_string()],
            parse_timeout: None,
            environment_command: Vec::new(),
        }
    }
}

pub struct ProcessEngine {
    settings: EngineSettings,
    runtime: Runtime,
}

impl ProcessEngine {
    pub fn new(settings: EngineSettings) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)?;
        Ok(ProcessEngine { settings, runtime })
    }

    /// Run `program` to completion and return its stdout.
    fn run(
        &self,
        program: &str,
        stage: Stage,
        args: Vec<OsString>,
        timeout: Option<Duration>,
    ) -> Result<String> {
        let resolved = which::which(program).map_err(|source| EngineError::NotInstalled {
            program: program.to_string(),
            source,
        })?;
        debug!(program, %stage, ?args, "running engine");

        let spawn_error = |source: std::io::Error| EngineError::Spawn {
            program: program.to_string(),
            stage,
            source,
        };

        self.runtime.block_on(async {
            let child = Command::new(&resolved)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(spawn_error)?;

            let waiting = child.wait_with_output();
            let output = match timeout {
                Some(budget) => match tokio::time::timeout(budget, waiting).await {
                    Ok(output) => output,
                    Err(_) => {
                        return Err(EngineError::Timeout {
                            program: program.to_string(),
                            stage,
                            budget,
                        })
                    }
                },
                None => waiting.await,
            }
            .map_err(spawn_error)?;

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            if !output.status.success() {
                let mut printed = stdout;
                printed.push_str(&String::from_utf8_lossy(&output.stderr));
                return Err(EngineError::Invocation {
                    program: program.to_string(),
                    stage,
                    status: output.status.code().unwrap_or(-1),
                    fault: Fault::classify(&printed),
                    output: printed,
                });
            }
            Ok(stdout)
        })
    }
}

impl SentenceGenerator for ProcessEngine {
    fn generate(&self, grammar: &Path, count: usize, timeout: Duration) -> Result<String> {
        let mut args = vec![grammar.as_os_str().to_owned()];
        args.extend(self.settings.generate_args.iter().map(OsString::from));
        args.push(count.to_string().into());
        self.run(&self.settings.program, Stage::Generation, args, Some(timeout))
    }
}

impl GrammarParser for ProcessEngine {
    fn parse(&self, grammar: &Path, sentences: &Path) -> Result<String> {
        let mut args = vec![grammar.as_os_str().to_owned()];
        args.extend(self.settings.test_args.iter().map(OsString::from));
        args.push(sentences.as_os_str().to_owned());
        self.run(
            &self.settings.program,
            Stage::Parsing,
            args,
            self.settings.parse_timeout,
        )
    }
}

impl EnvironmentSwitcher for ProcessEngine {
    fn activate(&self, environment: &str) -> Result<()> {
        let mut command = self
            .settings
            .environment_command
            .iter()
            .map(|part| part.replace(ENV_PLACEHOLDER, environment));

        let Some(program) = command.next() else {
            debug!(environment, "no environment command configured, keeping current engine");
            return Ok(());
        };
        if program.is_empty() {
            return Err(EngineError::Environment(
                "command must start with a program".to_string(),
            ));
        }

        let args: Vec<OsString> = command.map(OsString::from).collect();
        let printed = self.run(&program, Stage::Environment, args, None)?;
        debug!(environment, output = %printed.trim_end(), "environment switched");
        Ok(())
    }
}
