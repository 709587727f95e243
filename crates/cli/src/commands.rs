// FILE: crates/cli/src/commands.rs

use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use console::style;
use shelfscope_config::{Config, ConfigManager, LogLevel, SourceConfig, CONFIG_FILE_NAME};
use shelfscope_core::{AppError, BookRecord, DateField, GroupedCount};
use shelfscope_database::load_library;
use shelfscope_report::{
    export_books, ExportFormat, ExportRequest, LibrarySummary, ReportKind, ReportOptions,
    ReportRunner, ReportStatus, RunSummary,
};
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Picks the config file: `--config`, else the per-user one, else `./config.toml`
pub fn config_manager(config_path: Option<&String>) -> ConfigManager {
    if let Some(path) = config_path {
        return ConfigManager::with_file(path);
    }

    ConfigManager::new().unwrap_or_else(|_| ConfigManager::with_file(CONFIG_FILE_NAME))
}

/// Logger started before the config file is read
///
/// Until [`Logging::apply_config`] runs, only warnings and errors get through
/// unless `RUST_LOG` or `--verbose` already fixed the level.
pub struct Logging {
    config_decides: bool,
}

impl Logging {
    pub fn init(verbose: bool) -> Self {
        let config_decides = level_left_to_config(verbose, std::env::var_os("RUST_LOG").as_deref());

        let env = env_logger::Env::default().default_filter_or("trace");
        let mut builder = env_logger::Builder::from_env(env);
        if verbose {
            builder.filter_level(log::LevelFilter::Debug);
        }
        builder.init();

        if config_decides {
            log::set_max_level(log::LevelFilter::Warn);
        }
        Self { config_decides }
    }

    /// Switches to `app.log_level` once the config is loaded
    pub fn apply_config(&self, level: LogLevel) {
        if self.config_decides {
            log::set_max_level(level.into());
        }
    }
}

fn level_left_to_config(verbose: bool, rust_log: Option<&OsStr>) -> bool {
    !verbose && rust_log.is_none_or(OsStr::is_empty)
}

/// Run the selected aggregations and draw one chart per result
pub async fn analyze(db_path: Option<&str>, config: &Config, matches: &ArgMatches) -> Result<()> {
    let options = report_options(config, matches)?;
    let kinds = selected_reports(matches);

    let path = resolve_db_path(db_path, config)?;
    let records = load(&path).await?;

    print_summary(&LibrarySummary::from_records(&records));

    let runner = ReportRunner::new(options);
    let summary = runner.run(&records, &kinds);

    for outcome in summary.outcomes() {
        print_table(outcome.kind, &outcome.table);
    }
    print_run_result(&summary);

    let failed = summary.failed().len();
    if failed > 0 {
        bail!("{} of {} reports failed", failed, kinds.len());
    }

    Ok(())
}

/// Write a sorted, optionally limited list of books
pub async fn export(db_path: Option<&str>, config: &Config, matches: &ArgMatches) -> Result<()> {
    // Bad sort keys must fail before anything is read or written
    let request = export_request(config, matches).map_err(fatal)?;
    let output = export_output(config, matches, request.format);

    let path = resolve_db_path(db_path, config)?;
    let records = load(&path).await?;

    let count = export_books(&records, &request, &output).map_err(fatal)?;

    println!(
        "{} Exported {} books to {}",
        style("✓").green().bold(),
        style(count).bold(),
        output.display()
    );

    Ok(())
}

/// Print the effective configuration, or create the config file with `--init`
pub fn show_config(manager: &ConfigManager, config: &Config, matches: &ArgMatches) -> Result<()> {
    let path = manager.config_path();

    if matches.get_flag("init") {
        let created = manager
            .initialize()
            .context("Failed to write default config file")?;
        if created {
            println!("{} Created {}", style("✓").green().bold(), path.display());
        } else {
            println!("Config file already exists at {}", path.display());
        }
        return Ok(());
    }

    println!("{} {}", style("Config file:").bold(), path.display());
    if !path.exists() {
        println!("  (not present, showing defaults; run 'config --init' to create it)");
    }
    println!();
    println!(
        "{}",
        toml::to_string_pretty(config).context("Failed to serialize config")?
    );

    if let Err(errors) = config.validate() {
        println!("{}", style("Problems:").yellow().bold());
        for error in errors {
            println!("  - {}", error);
        }
    }

    Ok(())
}

/// `--db-path`, then the configured path, then the well-known locations
fn resolve_db_path(db_path: Option<&str>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = db_path {
        return Ok(PathBuf::from(path));
    }

    config.source.resolve().ok_or_else(|| {
        let tried: Vec<String> = SourceConfig::default_candidates()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        anyhow!(
            "No library database found (tried {}). Use --db-path to point at BookData.sqlite.",
            tried.join(", ")
        )
    })
}

async fn load(path: &Path) -> Result<Vec<BookRecord>> {
    log::debug!("Reading library from {}", path.display());
    load_library(path).await.map_err(fatal)
}

/// Wraps a fatal error so the console shows its user message first
fn fatal(error: AppError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

fn selected_reports(matches: &ArgMatches) -> Vec<ReportKind> {
    let flags = [
        ("year", ReportKind::Yearly),
        ("monthly", ReportKind::Monthly),
        ("publisher", ReportKind::Publisher),
        ("author", ReportKind::Author),
        ("tag", ReportKind::Tag),
    ];

    let selected: Vec<ReportKind> = flags
        .iter()
        .filter(|(flag, _)| matches.get_flag(flag))
        .map(|(_, kind)| *kind)
        .collect();

    if matches.get_flag("all") || selected.is_empty() {
        ReportKind::ALL.to_vec()
    } else {
        selected
    }
}

fn report_options(config: &Config, matches: &ArgMatches) -> Result<ReportOptions> {
    let output_dir = matches
        .get_one::<String>("output-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.report.output_dir.clone());

    let top_n = matches
        .get_one::<usize>("top-n")
        .copied()
        .unwrap_or(config.report.top_n);

    let basis = matches
        .get_one::<String>("year-basis")
        .unwrap_or(&config.report.year_basis);
    let year_basis: DateField = basis.parse().map_err(anyhow::Error::msg)?;

    let mut options = ReportOptions::new(output_dir)
        .with_top_n(top_n)
        .with_year_basis(year_basis);
    if let Some(family) = &config.chart.font_family {
        options = options.with_font_family(family.as_str());
    }

    Ok(options)
}

fn export_request(config: &Config, matches: &ArgMatches) -> Result<ExportRequest, AppError> {
    let sort_by = matches
        .get_one::<String>("sort-by")
        .unwrap_or(&config.export.sort_by);
    let ascending = if matches.get_flag("ascending") {
        true
    } else if matches.get_flag("descending") {
        false
    } else {
        config.export.ascending
    };
    let limit = matches
        .get_one::<usize>("limit")
        .copied()
        .or(config.export.limit);
    let format: ExportFormat = matches
        .get_one::<String>("format")
        .unwrap_or(&config.export.format)
        .parse()?;

    Ok(ExportRequest::parse(sort_by, ascending, limit)?
        .with_format(format)
        .with_title(config.export.title.as_str()))
}

/// `--output`, else the configured path with the format's extension
fn export_output(config: &Config, matches: &ArgMatches, format: ExportFormat) -> PathBuf {
    match matches.get_one::<String>("output") {
        Some(path) => PathBuf::from(path),
        None => config.export.output.with_extension(format.extension()),
    }
}

fn print_summary(summary: &LibrarySummary) {
    println!("\n{}", style("Library Summary").bold().cyan());
    println!("{}", "=".repeat(60));
    println!("Total Books: {}", style(summary.total_books).bold());
    if summary.unreadable_count > 0 {
        println!(
            "Unreadable: {}",
            style(summary.unreadable_count).yellow()
        );
    }
    println!(
        "With Purchase Date: {} ({:.1}%)",
        summary.with_purchase_date,
        summary.dated_percentage()
    );
    println!("Authors: {}", summary.authors_count);
    println!("Publishers: {}", summary.publishers_count);
    println!("Content Tags: {}", summary.tags_count);
    if let (Some(first), Some(last)) = (summary.first_purchase, summary.last_purchase) {
        println!("Purchased: {} to {}", first, last);
    }
}

fn print_table(kind: ReportKind, table: &GroupedCount) {
    println!("\n{}", style(heading(kind)).bold());
    println!("{}", "-".repeat(60));

    if table.is_empty() {
        println!("  {}", style("(no data)").dim());
        return;
    }
    print!("{}", table_rows(table));
}

/// Key/count rows padded to the widest key, then a total line
fn table_rows(table: &GroupedCount) -> String {
    let rows: Vec<(String, usize)> = table
        .pairs()
        .into_iter()
        .map(|(key, count)| (truncate(key, 40), count))
        .collect();
    let width = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .chain(std::iter::once("Total".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (key, count) in &rows {
        let _ = writeln!(out, "  {:<width$}  {:>5}", key, count, width = width);
    }
    let _ = writeln!(out, "  {:<width$}  {:>5}", "Total", table.total(), width = width);
    out
}

fn print_run_result(summary: &RunSummary) {
    println!();
    for outcome in summary.outcomes() {
        match &outcome.status {
            ReportStatus::Written(path) => {
                println!("{} {}", style("✓").green().bold(), path.display());
            }
            ReportStatus::Skipped(error) => {
                println!("{} {}", style("-").yellow().bold(), error.user_message());
            }
            ReportStatus::Failed(error) => {
                println!(
                    "{} {} chart: {}",
                    style("✗").red().bold(),
                    outcome.kind,
                    error
                );
            }
        }
    }
}

fn heading(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Yearly => "Books per Year",
        ReportKind::Monthly => "Books per Month",
        ReportKind::Publisher => "Top Publishers",
        ReportKind::Author => "Top Authors",
        ReportKind::Tag => "Books per Content Tag",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", kept)
    }
}
