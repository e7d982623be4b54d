//! Regression run orchestration
//!
//! For every grammar:
//!
//! 1. activate the source environment and generate sentences with the source grammar
//! 2. write them to `<grammar>.utt` and parse them back with the source grammar
//! 3. either write `<grammar>.tset` (appending the updated grammar's values when it exists),
//!    or activate the update environment, parse the same sentences with the updated grammar
//!    and write the comparison to `<grammar>.comp`
//!
//! The updated grammar has the same file name inside the update subfolder next to the source
//! grammar. In folder mode a grammar without an updated counterpart is skipped; any other
//! failure stops the whole run unless `keep_going` is set.

use crate::error::{Result, RunError};
use gramreg_core::{
    compare_extractions, extract_all, split_lines, write_test_set, Extraction, LengthMismatch,
    Sanitizer, WriteMode,
};
use gramreg_engine::GrammarEngine;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

const GRAMMAR_EXTENSION: &str = "xml";
const SENTENCE_EXTENSION: &str = "utt";
const TEST_SET_EXTENSION: &str = "tset";
const COMPARISON_EXTENSION: &str = "comp";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_generated: usize,
    pub generation_timeout: Duration,
    pub update_subfolder: String,
    pub source_environment: String,
    pub update_environment: String,
    pub tset: bool,
    pub delete_sentence_files: bool,
    pub keep_going: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GrammarOutcome {
    TestSet {
        path: PathBuf,
        cases: usize,
        compare_appended: bool,
    },
    Compared {
        path: PathBuf,
        key_mismatches: usize,
        slot_mismatches: usize,
        length_mismatch: Option<LengthMismatch>,
        skipped: usize,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrammarReport {
    pub grammar: PathBuf,
    #[serde(flatten)]
    pub outcome: GrammarOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub grammars: Vec<GrammarReport>,
}

impl RunSummary {
    pub fn has_regressions(&self) -> bool {
        self.grammars.iter().any(|report| match &report.outcome {
            GrammarOutcome::Compared {
                key_mismatches,
                slot_mismatches,
                length_mismatch,
                ..
            } => *key_mismatches > 0 || *slot_mismatches > 0 || length_mismatch.is_some(),
            _ => false,
        })
    }

    pub fn failures(&self) -> usize {
        self.grammars
            .iter()
            .filter(|report| matches!(report.outcome, GrammarOutcome::Failed { .. }))
            .count()
    }
}

pub struct Runner<'a, E> {
    engine: &'a E,
    sanitizer: Sanitizer,
    options: RunOptions,
}

impl<'a, E: GrammarEngine> Runner<'a, E> {
    pub fn new(engine: &'a E, sanitizer: Sanitizer, options: RunOptions) -> Self {
        Runner {
            engine,
            sanitizer,
            options,
        }
    }

    /// Run a single grammar file or every grammar in a folder.
    pub fn run(&self, source: &Path) -> Result<RunSummary> {
        if source.is_file() {
            self.run_file(source)
        } else if source.is_dir() {
            self.run_folder(source)
        } else {
            Err(RunError::SourceNotFound(source.to_path_buf()))
        }
    }

    fn run_file(&self, grammar: &Path) -> Result<RunSummary> {
        let outcome = self.process_grammar(grammar)?;
        if self.options.delete_sentence_files {
            remove_if_present(&grammar.with_extension(SENTENCE_EXTENSION))?;
            remove_if_present(&self.compare_grammar(grammar).with_extension(SENTENCE_EXTENSION))?;
        }
        info!("Grammar file processed.");
        Ok(RunSummary {
            grammars: vec![GrammarReport {
                grammar: grammar.to_path_buf(),
                outcome,
            }],
        })
    }

    fn run_folder(&self, folder: &Path) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for grammar in list_files(folder, GRAMMAR_EXTENSION)? {
            let outcome = match self.process_grammar(&grammar) {
                Ok(outcome) => outcome,
                Err(RunError::MissingComparisonTarget { compare, .. }) => {
                    warn!(
                        "Provide a second grammar at {} for comparison or generate a tset file.",
                        compare.display()
                    );
                    GrammarOutcome::Skipped {
                        reason: format!("no grammar at {}", compare.display()),
                    }
                }
                Err(err) if self.options.keep_going => {
                    error!(grammar = %grammar.display(), "{}", err);
                    GrammarOutcome::Failed {
                        error: err.to_string(),
                    }
                }
                Err(err) => return Err(err),
            };
            summary.grammars.push(GrammarReport { grammar, outcome });
        }

        if self.options.delete_sentence_files {
            for folder in [folder.to_path_buf(), folder.join(&self.options.update_subfolder)] {
                if folder.is_dir() {
                    for file in list_files(&folder, SENTENCE_EXTENSION)? {
                        remove_if_present(&file)?;
                    }
                }
            }
        }

        info!("All grammar files in {} processed.", folder.display());
        Ok(summary)
    }

    fn process_grammar(&self, grammar: &Path) -> Result<GrammarOutcome> {
        let compare = self.compare_grammar(grammar);
        let has_compare = compare.is_file();
        if !has_compare && !self.options.tset {
            return Err(RunError::MissingComparisonTarget {
                grammar: grammar.to_path_buf(),
                compare,
            });
        }

        info!("Processing {}", grammar.display());
        self.engine.activate(&self.options.source_environment)?;
        let sentences = self.generate_sentences(grammar)?;
        let source = self.extract(grammar, &sentences)?;

        if self.options.tset {
            let path = grammar.with_extension(TEST_SET_EXTENSION);
            write_test_set(source.cases(), &path, WriteMode::Overwrite)?;
            if has_compare {
                self.engine.activate(&self.options.update_environment)?;
                let updated = self.extract(&compare, &sentences)?;
                write_test_set(updated.cases(), &path, WriteMode::Append)?;
            }
            info!("A test set was added to {}.", path.display());
            return Ok(GrammarOutcome::TestSet {
                path,
                cases: source.cases().count(),
                compare_appended: has_compare,
            });
        }

        info!("Starting comparison to the second grammar.");
        self.engine.activate(&self.options.update_environment)?;
        let updated = self.extract(&compare, &sentences)?;
        let report = compare_extractions(&source, &updated);

        let path = grammar.with_extension(COMPARISON_EXTENSION);
        report.write_to(&path)?;

        if let Some(LengthMismatch {
            source: source_len,
            compare: compare_len,
        }) = report.length_mismatch
        {
            warn!(
                "Grammars returned {} and {} parses for the same sentences, compared the first {}.",
                source_len,
                compare_len,
                source_len.min(compare_len)
            );
        }
        if report.has_regressions() {
            warn!("MISMATCHES FOUND!");
        }
        info!(
            "There were {} slot (key) and {} value mismatches during comparison.",
            report.key_mismatches, report.slot_mismatches
        );
        info!("See {} for details.", path.display());

        Ok(GrammarOutcome::Compared {
            path,
            key_mismatches: report.key_mismatches,
            slot_mismatches: report.slot_mismatches,
            length_mismatch: report.length_mismatch,
            skipped: report.skipped,
        })
    }

    fn compare_grammar(&self, grammar: &Path) -> PathBuf {
        let folder = grammar.parent().unwrap_or_else(|| Path::new(""));
        let name = grammar.file_name().unwrap_or_default();
        folder.join(&self.options.update_subfolder).join(name)
    }

    fn generate_sentences(&self, grammar: &Path) -> Result<Vec<String>> {
        info!(
            "Generating {} test statements from {}...",
            self.options.max_generated,
            file_name(grammar)
        );
        let raw = self.engine.generate(
            grammar,
            self.options.max_generated,
            self.options.generation_timeout,
        )?;
        let sentences = self.sanitizer.sanitize_output(&raw);
        if sentences.is_empty() {
            return Err(RunError::NoSentences(grammar.to_path_buf()));
        }
        Ok(sentences)
    }

    /// Write the sentence file next to `grammar`, parse it and extract one case per result.
    fn extract(&self, grammar: &Path, sentences: &[String]) -> Result<Extraction> {
        let sentence_file = grammar.with_extension(SENTENCE_EXTENSION);
        fs::write(&sentence_file, sentences.join("\n"))
            .map_err(|err| RunError::io(&sentence_file, err))?;

        info!("Testing {} to extract slots...", file_name(grammar));
        let raw = self.engine.parse(grammar, &sentence_file)?;
        let documents = split_lines(&self.sanitizer.sanitize_output(&raw));

        let extraction = extract_all(&grammar.display().to_string(), &documents, sentences);
        let failed = extraction.failure_count();
        if failed > 0 {
            warn!(grammar = %grammar.display(), "{} parse results could not be read", failed);
        }
        Ok(extraction)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Files in `folder` (not recursive) with the given extension, sorted by name.
fn list_files(folder: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(folder).map_err(|err| RunError::io(folder, err))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| RunError::io(folder, err))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(RunError::io(path, err)),
    }
}
