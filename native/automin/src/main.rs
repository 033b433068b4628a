use std::io::Read;

use anyhow::{bail, Context};
use automin::{
    chars, process, validate, Automaton, AutomatonDescription, ConversionOptions, PipelineOptions,
};
use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, Level};

fn input_arg() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .help("automaton file in the JSON interchange format (stdin if omitted)")
}

fn main() -> anyhow::Result<()> {
    let matches = command!()
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
                .conflicts_with("debug"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Turn on debugging information")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .subcommand(
            Command::new("process")
                .about("Convert to a DFA if needed, minimize and verify")
                .arg(input_arg())
                .arg(Arg::new("output").short('o').long("output"))
                .arg(
                    Arg::new("force-conversion")
                        .long("force-conversion")
                        .help("Run subset construction even on deterministic input")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("verify-length")
                        .long("verify-length")
                        .help("Longest word compared between input and result")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("max-states")
                        .long("max-states")
                        .help("Fail if subset construction needs more states")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("no-metadata")
                        .long("no-metadata")
                        .help("Omit the metadata block from the output")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Report structural errors and warnings")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("accepts")
                .about("Run the automaton on words of one-character symbols ('-' is the empty word)")
                .arg(input_arg())
                .arg(Arg::new("words").num_args(1..).required(true)),
        )
        .subcommand_required(true)
        .get_matches();

    let level = if matches.get_flag("verbose") {
        Level::TRACE
    } else if matches.get_flag("debug") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match matches.subcommand() {
        Some(("process", sub)) => run_process(sub),
        Some(("validate", sub)) => run_validate(sub),
        Some(("accepts", sub)) => run_accepts(sub),
        _ => unreachable!("a subcommand is required"),
    }
}

fn run_process(matches: &ArgMatches) -> anyhow::Result<()> {
    let description = read_description(matches.get_one("input"))?;
    let defaults = PipelineOptions::default();
    let options = PipelineOptions {
        force_conversion: matches.get_flag("force-conversion"),
        verify_max_len: matches
            .get_one::<usize>("verify-length")
            .copied()
            .unwrap_or(defaults.verify_max_len),
        conversion: ConversionOptions {
            max_states: matches.get_one::<usize>("max-states").copied(),
        },
        ..defaults
    };

    let report = process(&description, &options);
    let Some(automaton) = report.automaton else {
        bail!("processing failed: {}", report.errors.join("; "));
    };

    if let Some(statistics) = &report.statistics {
        eprintln!("{}", serde_json::to_string_pretty(statistics)?);
    }

    let mut out = automaton.to_description();
    if !matches.get_flag("no-metadata") {
        out = out.with_metadata(&automaton);
    }
    to_file_or_stdout(matches.get_one("output"), &out.to_json_pretty()?)
}

fn run_validate(matches: &ArgMatches) -> anyhow::Result<()> {
    let description = read_description(matches.get_one("input"))?;
    let report = validate(&description);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_valid() {
        bail!("automaton has {} structural errors", report.errors.len());
    }
    Ok(())
}

fn run_accepts(matches: &ArgMatches) -> anyhow::Result<()> {
    let description = read_description(matches.get_one("input"))?;
    let automaton = Automaton::from_description(&description)?;
    for word in matches.get_many::<String>("words").into_iter().flatten() {
        let symbols = if word == "-" { Vec::new() } else { chars(word) };
        let verdict = if automaton.accepts(&symbols)? {
            "accept"
        } else {
            "reject"
        };
        println!("{word}\t{verdict}");
    }
    Ok(())
}

fn read_description(maybe_file_name: Option<&String>) -> anyhow::Result<AutomatonDescription> {
    let json = match maybe_file_name {
        Some(file_name) => {
            debug!("Input file name specified: {:?}", file_name);
            std::fs::read_to_string(file_name)
                .with_context(|| format!("unable to read {file_name}"))?
        }
        None => {
            debug!("No input files specified, using stdin");
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("error when reading from stdin")?;
            buf
        }
    };
    Ok(AutomatonDescription::from_json(&json)?)
}

fn to_file_or_stdout(maybe_file_name: Option<&String>, output: &str) -> anyhow::Result<()> {
    if let Some(file_name) = maybe_file_name {
        debug!("Output file name specified: {:?}", file_name);
        if let Some(parent) = std::path::Path::new(file_name).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(file_name, output)?;
    } else {
        println!("{output}");
    }
    Ok(())
}
