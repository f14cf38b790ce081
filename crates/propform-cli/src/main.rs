use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

mod commands;
mod logging;

use commands::RenderArgs;
use logging::LogFormat;

fn cli() -> Command {
    Command::new("propform")
        .version(propform_core::VERSION)
        .about("Drive a configurable property row from the command line")
        .subcommand_required(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("info")
                .help("Tracing filter, overridden by RUST_LOG"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("compact")
                .value_parser(["compact", "json"])
                .help("Log output format"),
        )
        .subcommand(
            Command::new("render")
                .about("Load a row, apply events, and print its render descriptor")
                .arg(catalog_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("state")
                        .long("state")
                        .conflicts_with("state-file")
                        .help("Serialized row (empty for a fresh row)"),
                )
                .arg(
                    Arg::new("state-file")
                        .long("state-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("File holding the serialized row"),
                )
                .arg(
                    Arg::new("events")
                        .long("events")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of row events to apply"),
                )
                .arg(
                    Arg::new("errors")
                        .long("errors")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of validation errors"),
                )
                .arg(
                    Arg::new("schema")
                        .long("schema")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(PathBuf))
                        .help("Upstream stage schema; repeat for several stages"),
                )
                .arg(
                    Arg::new("disabled")
                        .long("disabled")
                        .action(ArgAction::SetTrue)
                        .help("Treat the row as disabled"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a catalog and engine config")
                .arg(catalog_arg())
                .arg(config_arg()),
        )
}

fn catalog_arg() -> Arg {
    Arg::new("catalog")
        .long("catalog")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Transform catalog (JSON or YAML)")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Engine config (JSON, YAML or TOML)")
}

fn render_args(args: &ArgMatches) -> RenderArgs {
    RenderArgs {
        catalog: args
            .get_one::<PathBuf>("catalog")
            .cloned()
            .unwrap_or_default(),
        state: args.get_one::<String>("state").cloned(),
        state_file: args.get_one::<PathBuf>("state-file").cloned(),
        events: args.get_one::<PathBuf>("events").cloned(),
        errors: args.get_one::<PathBuf>("errors").cloned(),
        schemas: args
            .get_many::<PathBuf>("schema")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        config: args.get_one::<PathBuf>("config").cloned(),
        disabled: args.get_flag("disabled"),
    }
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map_or("info", String::as_str);
    let format = matches
        .get_one::<String>("log-format")
        .map_or(LogFormat::Compact, |f| LogFormat::parse(f));
    logging::init_logging(level, format)?;

    match matches.subcommand() {
        Some(("render", args)) => {
            let output = commands::render(&render_args(args))?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Some(("check", args)) => {
            let catalog = args
                .get_one::<PathBuf>("catalog")
                .cloned()
                .unwrap_or_default();
            let config = args.get_one::<PathBuf>("config");
            let summary = commands::check(&catalog, config.map(PathBuf::as_path))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {}
    }

    Ok(())
}
