//! Command-line interface for gramreg
//! Generates sentences from a grammar, parses them back and either compares the slots with an
//! updated grammar or stores them as a regression test set.
//!
//! Usage:
//!   gramreg --source `<grammar.xml>`              - Compare with `updated/<grammar.xml>`
//!   gramreg --source `<folder>`                   - Compare every grammar in the folder
//!   gramreg --source `<path>` --tset              - Write `.tset` files instead
//!
//! Exit status: 0 on success, 1 when the run was aborted or a grammar failed under
//! `--keep-going`, 2 with `--strict` when mismatches were found and no grammar failed.

mod cli;
mod error;
mod runner;

use clap::ArgMatches;
use error::RunError;
use gramreg_config::{GramregConfig, Loader};
use gramreg_core::Sanitizer;
use gramreg_engine::ProcessEngine;
use runner::{RunOptions, RunSummary, Runner};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Picked up from the working directory when present.
const LOCAL_CONFIG: &str = "gramreg.toml";

fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();

    init_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            if let Some(hint) = err.hint() {
                eprintln!("Hint: {}", hint);
            }
            if let RunError::Engine(engine_err) = &err {
                if let Some(output) = engine_err.output().filter(|o| !o.trim().is_empty()) {
                    eprintln!("\nEngine output:\n{}", output.trim_end());
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8) {
    let default_level = if verbosity > 0 { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &ArgMatches) -> Result<ExitCode, RunError> {
    let config = load_config(matches)?;
    let engine = ProcessEngine::new(config.engine_settings())?;

    let options = RunOptions {
        max_generated: config.run.max_generated,
        generation_timeout: config.generator.generation_timeout(),
        update_subfolder: config.run.update_subfolder.clone(),
        source_environment: config.run.source_environment.clone(),
        update_environment: config.run.update_environment.clone(),
        tset: matches.get_flag("tset"),
        delete_sentence_files: matches.get_flag("delete"),
        keep_going: config.run.keep_going,
    };
    let sanitizer = Sanitizer::new(config.sanitizer.markers.iter().cloned());

    let source = matches
        .get_one::<String>("source")
        .expect("source is a required argument");
    let summary = Runner::new(&engine, sanitizer, options).run(Path::new(source))?;

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error formatting summary: {}", e),
        }
    }

    Ok(ExitCode::from(exit_status(&summary, matches.get_flag("strict"))))
}

/// Failed grammars outrank regressions: a run that could not finish is reported as such.
fn exit_status(summary: &RunSummary, strict: bool) -> u8 {
    if summary.failures() > 0 {
        1
    } else if strict && summary.has_regressions() {
        2
    } else {
        0
    }
}

/// Defaults, then `./gramreg.toml`, then `--config`, then flags.
fn load_config(matches: &ArgMatches) -> Result<GramregConfig, RunError> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }

    if let Some(max) = matches.get_one::<usize>("max-gen") {
        loader = loader.set_override("run.max_generated", *max as i64)?;
    }
    for (flag, key) in [
        ("update", "run.update_subfolder"),
        ("source-env", "run.source_environment"),
        ("update-env", "run.update_environment"),
    ] {
        if let Some(value) = matches.get_one::<String>(flag) {
            loader = loader.set_override(key, value.as_str())?;
        }
    }
    if matches.get_flag("keep-going") {
        loader = loader.set_override("run.keep_going", true)?;
    }

    Ok(loader.build()?)
}
