//! `viz`: tools for persisted chart builder configurations

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use viz_core::{telemetry, StudioConfig};

mod commands;

fn cli() -> Command {
    Command::new("viz")
        .version(viz_core::VERSION)
        .about("Inspect and migrate persisted chart builder configurations")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("TOML")
                .value_parser(value_parser!(PathBuf))
                .help("Studio configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Migrate a chart config or configurator state to the latest version")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Persisted JSON document"),
                )
                .arg(
                    Arg::new("iri-map")
                        .long("iri-map")
                        .value_name("JSON")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON object mapping old cube identities to current ones"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print the result"),
                ),
        )
        .subcommand(
            Command::new("filters")
                .about("Print the editor filters of a chart")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Persisted JSON document"),
                )
                .arg(
                    Arg::new("chart")
                        .long("chart")
                        .value_name("KEY")
                        .help("Chart key, defaults to the active chart"),
                )
                .arg(
                    Arg::new("joined")
                        .long("joined")
                        .action(ArgAction::SetTrue)
                        .help("Key join dimensions by their placeholder"),
                ),
        )
        .subcommand(Command::new("versions").about("List supported schema versions"))
}

fn file_arg(args: &ArgMatches) -> Result<&PathBuf> {
    args.get_one::<PathBuf>("file").context("missing file argument")
}

async fn run(matches: &ArgMatches) -> Result<String> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    };
    if matches.get_flag("log-json") {
        config.logging.json = true;
    }
    let _ = telemetry::init_tracing(&config.logging);

    match matches.subcommand() {
        Some(("migrate", args)) => {
            commands::migrate(
                &config,
                file_arg(args)?,
                args.get_one::<PathBuf>("iri-map").map(PathBuf::as_path),
                args.get_flag("pretty"),
            )
            .await
        }
        Some(("filters", args)) => {
            commands::filters(
                &config,
                file_arg(args)?,
                args.get_one::<String>("chart").map(String::as_str),
                args.get_flag("joined"),
            )
            .await
        }
        Some(("versions", _)) => commands::versions(),
        _ => anyhow::bail!("unknown command"),
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    match run(&matches).await {
        Ok(output) => println!("{output}"),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let matches = cli()
            .try_get_matches_from(["viz", "filters", "state.json", "--joined", "--log-json"])
            .unwrap();
        assert!(matches.get_flag("log-json"));
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "filters");
        assert!(args.get_flag("joined"));
        assert!(args.get_one::<String>("chart").is_none());
    }
}
