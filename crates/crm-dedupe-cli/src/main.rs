mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use crm_dedupe_core::analysis::merge_plan::MergePlan;
use crm_dedupe_core::audit::TracingEventSink;
use crm_dedupe_core::storage::Database;
use crm_dedupe_core::{
    ingest, AppConfig, ClientRecord, DedupeEngine, DuplicateType, ScanReport, SelectionTracker,
};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match crm_dedupe_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    let engine = DedupeEngine::new(config.clone());

    let result = match args.command {
        Some(Commands::Import { input }) => run_import(&engine, &input),
        Some(Commands::Scan { input, json }) => run_scan(&engine, input.as_deref(), json),
        Some(Commands::MergePlan { input }) => run_merge_plan(&engine, input.as_deref()),
        Some(Commands::Select) => run_select(&engine),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        Some(Commands::TruncateDb) => run_truncate(&config),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }

    Ok(())
}

fn run_import(engine: &DedupeEngine, input: &Path) -> anyhow::Result<()> {
    let written = engine
        .import(input)
        .with_context(|| format!("importing {}", input.display()))?;
    info!("{} clients imported", format!("{}", written).green());
    Ok(())
}

fn scan_report(engine: &DedupeEngine, input: Option<&Path>) -> anyhow::Result<ScanReport> {
    let reporter = CliReporter::new();
    match input {
        Some(path) => {
            let clients = ingest::load_clients(path)
                .with_context(|| format!("loading {}", path.display()))?;
            Ok(engine.scan_records(&clients, &reporter))
        }
        None => Ok(engine.scan(&reporter)?),
    }
}

fn run_scan(engine: &DedupeEngine, input: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let report = scan_report(engine, input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.groups)?);
        return Ok(());
    }

    if report.groups.is_empty() {
        println!(
            "{} no duplicates found among {} clients",
            "✓".green(),
            report.total_clients
        );
        return Ok(());
    }

    for group in &report.groups {
        let label = match group.duplicate_type {
            DuplicateType::Exact => "same phone".red(),
            DuplicateType::Name => "similar name".yellow(),
        };
        println!(
            "{} {} ({}% confidence, {} clients)",
            group.id.bold(),
            label,
            group.confidence,
            group.clients.len()
        );
        for client in &group.clients {
            println!("    {}", describe_client(client));
        }
    }

    println!();
    info!(
        "Load: {}, Scan: {}",
        format!("{:.2}s", report.load_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.scan_duration.as_secs_f64()).green(),
    );
    info!(
        "{} exact groups, {} name groups, {} of {} clients flagged",
        format!("{}", report.exact_groups).red(),
        format!("{}", report.name_groups).yellow(),
        format!("{}", report.flagged_clients).cyan(),
        report.total_clients,
    );

    Ok(())
}

fn run_merge_plan(engine: &DedupeEngine, input: Option<&Path>) -> anyhow::Result<()> {
    let report = scan_report(engine, input)?;
    let plan = MergePlan::build(&report.groups);

    if plan.is_empty() {
        println!("{} no duplicates found, nothing to merge", "✓".green());
        return Ok(());
    }

    for entry in &plan.entries {
        println!(
            "{} keep {} (total paid {}), remove {}",
            entry.group_id.bold(),
            entry.keep.id.green(),
            entry
                .keep
                .total_paid
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string()),
            entry.remove_ids.join(", ").red()
        );
    }
    info!(
        "{} groups, {} clients would be removed",
        plan.entries.len(),
        format!("{}", plan.removal_count()).red()
    );
    Ok(())
}

fn run_select(engine: &DedupeEngine) -> anyhow::Result<()> {
    let db = engine.open_database()?;
    let total = db.count_clients()?;
    let mut tracker = SelectionTracker::new(total, engine.config().page_size)
        .with_event_sink(Arc::new(TracingEventSink));
    let mut rows = show_page(&db, &mut tracker, 1)?;

    println!("Commands: n, p, page N, t ID, tp, all, clear, stats, q");
    let mut input = String::new();
    loop {
        input.clear();
        print!("select> ");
        io::stdout().flush()?;
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts.as_slice() {
            ["q"] | ["quit"] => break,
            ["n"] if tracker.current_page() < tracker.total_pages() => {
                let next = tracker.current_page() + 1;
                rows = show_page(&db, &mut tracker, next)?;
            }
            ["p"] if tracker.current_page() > 1 => {
                let previous = tracker.current_page() - 1;
                rows = show_page(&db, &mut tracker, previous)?;
            }
            ["page", n] => match n.parse::<usize>() {
                Ok(page) if page >= 1 && page <= tracker.total_pages() => {
                    rows = show_page(&db, &mut tracker, page)?;
                }
                _ => println!("no such page: {}", n),
            },
            ["t", id] => {
                if rows.iter().any(|c| c.id == *id) {
                    tracker.toggle_item(id);
                    print_page(&tracker, &rows);
                } else {
                    println!("{} is not on this page", id);
                }
            }
            ["tp"] => {
                tracker.toggle_current_page();
                print_page(&tracker, &rows);
            }
            ["all"] => match tracker.select_all_pages(&db) {
                Ok(count) => println!("{} clients selected", count),
                Err(e) => println!("{} {}", "select all failed:".red(), e),
            },
            ["clear"] => {
                tracker.clear_all();
                print_page(&tracker, &rows);
            }
            ["stats"] => println!("{}", serde_json::to_string_pretty(&tracker.stats())?),
            _ => println!("Commands: n, p, page N, t ID, tp, all, clear, stats, q"),
        }
    }

    let stats = tracker.stats();
    info!(
        "{} clients selected across {} pages",
        stats.selected_count, stats.selected_page_count
    );
    Ok(())
}

fn show_page(
    db: &Database,
    tracker: &mut SelectionTracker,
    page: usize,
) -> anyhow::Result<Vec<ClientRecord>> {
    let rows = db.get_clients_page(page, tracker.page_size())?;
    tracker.show_page(page, rows.iter().map(|c| c.id.clone()).collect());
    print_page(tracker, &rows);
    Ok(rows)
}

fn print_page(tracker: &SelectionTracker, rows: &[ClientRecord]) {
    let stats = tracker.stats();
    println!(
        "{} {}/{}  ({} selected{})",
        "page".bold(),
        tracker.current_page(),
        stats.total_pages.max(1),
        stats.selected_count,
        if tracker.is_all_selected() { ", all" } else { "" }
    );
    for client in rows {
        let mark = if tracker.is_selected(&client.id) { "[x]".green() } else { "[ ]".normal() };
        println!("  {} {}", mark, describe_client(client));
    }
}

fn describe_client(client: &ClientRecord) -> String {
    format!(
        "{}  {}  {}  {}",
        client.id.dimmed(),
        client.name,
        client.phone.cyan(),
        client.city
    )
}

fn run_truncate(config: &AppConfig) -> anyhow::Result<()> {
    match prompt_confirm(
        "Are you SURE you want to delete every stored client?",
        Some(false),
    ) {
        Ok(true) => {
            let db = Database::open(&config.db_path)?;
            db.truncate_all()?;
            println!("All tables truncated");
        }
        _ => {
            process::exit(0);
        }
    }
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
