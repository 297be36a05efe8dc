use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use mrm_events::{EmittedEvent, RecordingSink};
use mrm_registry::{
    ConsistencyReport, Merchant, MerchantId, MerchantListing, MerchantRegistry, Outcome,
};
use mrm_store::FileKvStore;
use serde_json::json;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}

/// Run `cli` against its store, writing results and notifications to `out`.
pub fn execute(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let store_path = config.resolve_store_path(cli.store.as_deref());
    debug!(store = %store_path.display(), "opening merchant store");
    let store = FileKvStore::open(&store_path)
        .with_context(|| format!("opening store {}", store_path.display()))?;

    let sink = Arc::new(RecordingSink::new());
    let registry = MerchantRegistry::new(Arc::new(store), sink.clone(), config.registry)?;

    let format = cli.format;
    let result = dispatch(&registry, cli.command, format, out);
    print_events(&sink.drain(), format, out)?;
    result
}

fn dispatch(
    registry: &MerchantRegistry,
    command: Command,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Init(args) => cmd_invoke(registry, "init", &[args.message], format, out),
        Command::Create(args) => {
            cmd_invoke(registry, "createMerchant", &args.to_args(), format, out)
        }
        Command::Update(args) => {
            cmd_invoke(registry, "updateMerchant", &args.to_args(), format, out)
        }
        Command::Delete(args) => cmd_invoke(registry, "deleteMerchant", &[args.id], format, out),
        Command::Get(args) => cmd_get(registry, &args.id, format, out),
        Command::List => cmd_list(registry, format, out),
        Command::Invoke(call) => cmd_invoke(registry, &call.function, &call.args, format, out),
        Command::Query(call) => cmd_query(registry, &call.function, &call.args, format, out),
        Command::Check => {
            let report = registry.check_consistency()?;
            print_report(&report, "Index consistent", format, out)
        }
        Command::Reconcile => {
            let report = registry.reconcile()?;
            print_report(&report, "Index already consistent", format, out)
        }
    }
}

fn cmd_invoke(
    registry: &MerchantRegistry,
    function: &str,
    args: &[String],
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match registry.invoke(function, args)? {
        Outcome::Completed(()) => {
            if format == OutputFormat::Json {
                writeln!(out, "{}", json!({ "function": function, "status": "ok" }))?;
            } else {
                writeln!(out, "{} {}", "✓".green().bold(), function.bold())?;
            }
            Ok(())
        }
        Outcome::Rejected(rejection) => bail!("{function}: {rejection}"),
    }
}

fn cmd_query(
    registry: &MerchantRegistry,
    function: &str,
    args: &[String],
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match registry.query(function, args)? {
        Outcome::Completed(bytes) => {
            let value: serde_json::Value = serde_json::from_slice(&bytes)?;
            match format {
                OutputFormat::Json => writeln!(out, "{value}")?,
                OutputFormat::Text => writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?,
            }
            Ok(())
        }
        Outcome::Rejected(rejection) => bail!("{function}: {rejection}"),
    }
}

fn cmd_get(
    registry: &MerchantRegistry,
    id: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let Ok(id) = MerchantId::parse(id) else {
        // The query path reports malformed ids.
        return cmd_query(registry, "getMerchantByID", &[id.to_string()], format, out);
    };
    match registry.get(&id)? {
        Outcome::Completed(merchant) => match format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&merchant)?)
                .map_err(Into::into),
            OutputFormat::Text => print_merchant(&merchant, out),
        },
        Outcome::Rejected(rejection) => bail!("{rejection}"),
    }
}

fn cmd_list(
    registry: &MerchantRegistry,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let listing = registry.list_all()?;
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&listing)?)?,
        OutputFormat::Text => print_listing(&listing, out)?,
    }
    Ok(())
}

fn print_merchant(merchant: &Merchant, out: &mut dyn Write) -> anyhow::Result<()> {
    let f = &merchant.fields;
    writeln!(out, "{}  {}", merchant.id.as_str().yellow().bold(), f.name.bold())?;
    writeln!(out, "  Industry: {}", f.industry)?;
    writeln!(out, "  Logo: {}", f.logo.blue())?;
    writeln!(out, "  Points per unit: {}", f.points_rate)?;
    writeln!(out, "  Currency: {} (rate {})", f.currency.cyan(), f.exchange_rate)?;
    writeln!(out, "  Updated: {}", f.updated_at.dimmed())?;
    Ok(())
}

fn print_listing(listing: &MerchantListing, out: &mut dyn Write) -> anyhow::Result<()> {
    if listing.is_empty() {
        writeln!(out, "No merchants.")?;
        return Ok(());
    }
    for merchant in listing {
        writeln!(
            out,
            "{}  {}  {}",
            merchant.id.as_str().yellow(),
            merchant.fields.name.bold(),
            merchant.fields.industry.dimmed()
        )?;
    }
    writeln!(out, "{} merchant(s)", listing.len())?;
    Ok(())
}

fn print_report(
    report: &ConsistencyReport,
    clean: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        writeln!(out, "{}", serde_json::to_string(report)?)?;
        return Ok(());
    }
    if report.is_consistent() {
        writeln!(
            out,
            "{} {} ({} merchants)",
            "✓".green().bold(),
            clean,
            report.records
        )?;
        return Ok(());
    }
    writeln!(
        out,
        "{} {} index entries, {} records",
        "✗".red().bold(),
        report.indexed,
        report.records
    )?;
    let join = |ids: &[MerchantId]| {
        ids.iter()
            .map(MerchantId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    if !report.orphaned.is_empty() {
        writeln!(out, "  Orphaned: {}", join(&report.orphaned).yellow())?;
    }
    if !report.dangling.is_empty() {
        writeln!(out, "  Dangling: {}", join(&report.dangling).red())?;
    }
    if !report.duplicates.is_empty() {
        writeln!(out, "  Duplicates: {}", join(&report.duplicates).yellow())?;
    }
    Ok(())
}

fn print_events(events: &[EmittedEvent], format: OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    for event in events {
        let Ok(notification) = event.notification() else {
            continue;
        };
        match format {
            OutputFormat::Json => writeln!(
                out,
                "{}",
                json!({ "event": event.name, "payload": notification })
            )?,
            OutputFormat::Text => {
                let code = if notification.is_success() {
                    notification.code.to_string().green()
                } else {
                    notification.code.to_string().red()
                };
                let subject = notification.merchant_id.as_deref().unwrap_or("-");
                writeln!(
                    out,
                    "  {} [{}] {} {}",
                    event.name.dimmed(),
                    code,
                    subject.yellow(),
                    notification.message
                )?;
            }
        }
    }
    Ok(())
}
