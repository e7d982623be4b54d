// Shared with build.rs, which generates shell completions from it. Keep it free of crate imports.

use clap::{value_parser, Arg, ArgAction, Command, ValueHint};

pub fn build_cli() -> Command {
    Command::new("gramreg")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Regression tests for xmlgenerator grammars")
        .long_about(
            "Generates sentences from a source grammar and parses them back to extract slot \
             values. With an updated grammar of the same name in the update subfolder, both \
             results are compared and written to a .comp file. With --tset, a .tset regression \
             test set is written instead.",
        )
        .arg_required_else_help(true)
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Grammar file, or folder of grammar files (*.xml)")
                .required(true)
                .value_hint(ValueHint::AnyPath),
        )
        .arg(
            Arg::new("max-gen")
                .long("max-gen")
                .short('m')
                .help("Maximum number of sentences generated per grammar")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("update")
                .long("update")
                .short('u')
                .help("Subfolder holding the updated grammar(s)"),
        )
        .arg(
            Arg::new("source-env")
                .long("source-env")
                .help("Engine environment used for the source grammar(s)"),
        )
        .arg(
            Arg::new("update-env")
                .long("update-env")
                .help("Engine environment used for the updated grammar(s)"),
        )
        .arg(
            Arg::new("tset")
                .long("tset")
                .short('t')
                .help("Write a .tset file instead of comparing on the fly")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("delete")
                .long("delete")
                .short('d')
                .help("Delete the generated sentence (.utt) files afterwards")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keep-going")
                .long("keep-going")
                .help("In folder mode, continue with the next grammar when the engine fails")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Exit with status 2 when mismatches are found")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the run summary as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show engine invocations")
                .action(ArgAction::Count),
        )
}
