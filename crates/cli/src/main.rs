// FILE: crates/cli/src/main.rs

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};

mod commands;

fn build_cli() -> Command {
    Command::new("shelfscope")
        .version(env!("CARGO_PKG_VERSION"))
        .author("DrTomLLC")
        .about("Charts and book lists from a Kindle library database")
        .arg(
            Arg::new("db-path")
                .short('d')
                .long("db-path")
                .value_name("PATH")
                .help("Path to BookData.sqlite (discovered when omitted)")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Config file to use instead of the per-user one")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("analyze")
                .about("Count books by year, month, publisher, author or tag and draw charts")
                .arg(
                    Arg::new("output-dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Directory the SVG charts are written into"),
                )
                .arg(
                    Arg::new("year")
                        .short('y')
                        .long("year")
                        .help("Books per year")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("monthly")
                        .short('m')
                        .long("monthly")
                        .help("Books per month")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("publisher")
                        .short('p')
                        .long("publisher")
                        .help("Top publishers")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("author")
                        .short('a')
                        .long("author")
                        .help("Top authors")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("tag")
                        .short('t')
                        .long("tag")
                        .help("Books per content tag")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Every report (the default when none is selected)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("top-n")
                        .long("top-n")
                        .value_name("N")
                        .help("Length of the publisher and author rankings")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("year-basis")
                        .long("year-basis")
                        .value_name("DATE")
                        .help("Date the yearly report groups by")
                        .value_parser(["purchase", "publication"]),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write a sorted list of books")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output file (defaults to the configured path with the format's extension)"),
                )
                .arg(
                    Arg::new("sort-by")
                        .short('s')
                        .long("sort-by")
                        .value_name("KEY")
                        .help("title, author, publisher, purchase_date or publication_date"),
                )
                .arg(
                    Arg::new("ascending")
                        .short('a')
                        .long("ascending")
                        .help("Sort oldest/lowest first")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("descending")
                        .long("descending")
                        .help("Sort newest/highest first, even if the config says ascending")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("ascending"),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .value_name("N")
                        .help("List at most N books (0 for all)")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_name("FORMAT")
                        .help("Output format")
                        .value_parser(["markdown", "json"]),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Show the effective configuration")
                .arg(
                    Arg::new("init")
                        .long("init")
                        .help("Write a default config file if none exists")
                        .action(ArgAction::SetTrue),
                ),
        )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let logging = commands::Logging::init(matches.get_flag("verbose"));
    let manager = commands::config_manager(matches.get_one::<String>("config"));
    let config = manager.load_with_env_overrides();
    logging.apply_config(config.app.log_level);

    let db_path = matches.get_one::<String>("db-path").map(String::as_str);

    match matches.subcommand() {
        Some(("analyze", sub_matches)) => commands::analyze(db_path, &config, sub_matches).await,
        Some(("export", sub_matches)) => commands::export(db_path, &config, sub_matches).await,
        Some(("config", sub_matches)) => commands::show_config(&manager, &config, sub_matches),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
