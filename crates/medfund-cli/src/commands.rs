use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use tracing::debug;

use medfund_chaincode::{Chaincode, Function, Response};
use medfund_ledger::{Application, AuditReport, Engine, EngineConfig};
use medfund_store::FileLedgerStore;
use medfund_types::ApplicationId;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Invoke(args) => cmd_invoke(&open(&cli.store, config)?, args, cli.format),
        Command::Info(args) => cmd_info(&open(&cli.store, config)?, args, cli.format),
        Command::Audit(args) => cmd_audit(&open(&cli.store, config)?, args, cli.format),
        Command::Functions => cmd_functions(cli.format),
        Command::Config => cmd_config(&config),
    }
}

/// Engine settings from `path`, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: EngineConfig =
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    debug!(path = %path.display(), stages = ?config.workflow.stages, "loaded config");
    Ok(config)
}

fn open(path: &Path, config: EngineConfig) -> anyhow::Result<Chaincode<FileLedgerStore>> {
    let store = FileLedgerStore::open(path)
        .with_context(|| format!("opening ledger {}", path.display()))?;
    Ok(Chaincode::new(Engine::new(store, config)?))
}

fn cmd_invoke(
    chaincode: &Chaincode<FileLedgerStore>,
    args: InvokeArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let response = chaincode.invoke(&args.function, &args.args);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => {
            if let Response::Success { payload } = &response {
                println!("{} {}", "✓".green().bold(), payload);
            }
        }
    }
    match response {
        Response::Success { .. } => Ok(()),
        Response::Error { kind, message } => bail!("{kind}: {message}"),
    }
}

fn cmd_info(
    chaincode: &Chaincode<FileLedgerStore>,
    args: InfoArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let id = ApplicationId::new(&args.application)?;
    let app = chaincode.engine().get_info(&id)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&app)?),
        OutputFormat::Text => print_application(&app),
    }
    Ok(())
}

fn print_application(app: &Application) {
    println!("Application {}", app.application_id.to_string().yellow().bold());
    println!("  State: {}", app.state.to_string().cyan());
    println!("  Applicant: {}", app.identity.applicant_name);
    println!("  Requested: {}", app.requested_amount);
    for review in &app.reviews {
        let approved = review
            .approved_amount
            .map(|a| format!(" ({a})"))
            .unwrap_or_default();
        println!(
            "  Review: {} {:?} by {}{}",
            review.stage, review.decision, review.operator, approved
        );
    }
    println!(
        "  Raised: {} in {} donations (balance {})",
        app.amount_raised.to_string().green(),
        app.donation_counter,
        app.balance
    );
    println!(
        "  Loaned: {} in {} loans, {} received (available {})",
        app.total_loaned, app.loan_counter, app.total_received,
        app.available_credit()
    );
    println!(
        "  Recharged: {} in {} recharges",
        app.recharge_total, app.recharge_counter
    );
}

fn cmd_audit(
    chaincode: &Chaincode<FileLedgerStore>,
    args: AuditArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let id = ApplicationId::new(&args.application)?;
    let report = chaincode.engine().audit(&id)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    if !report.is_consistent() {
        bail!("{} violation(s) found", report.violations.len());
    }
    Ok(())
}

fn print_report(report: &AuditReport) {
    println!("Audit of {}", report.application_id.to_string().yellow().bold());
    println!("  Donations: {} summing to {}", report.donations, report.donation_sum);
    println!(
        "  Loans: {} summing to {}, {} received",
        report.loans, report.loan_sum, report.received_sum
    );
    println!("  Recharges: {} summing to {}", report.recharges, report.recharge_sum);
    if report.is_consistent() {
        println!("{} Ledger consistent", "✓".green().bold());
        return;
    }
    for violation in &report.violations {
        println!("  {} {}: {}", "✗".red().bold(), violation.kind, violation.description);
    }
}

fn cmd_functions(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let names: Vec<&str> = Function::ALL.iter().map(Function::name).collect();
            println!("{}", serde_json::to_string_pretty(&names)?);
        }
        OutputFormat::Text => {
            for function in Function::ALL {
                let arity = function.arity();
                let args = if arity.start() == arity.end() {
                    arity.start().to_string()
                } else {
                    format!("{}-{}", arity.start(), arity.end())
                };
                let marker = if function.is_mutating() { "write" } else { "read" };
                println!("{:<22} {:>4} args  {}", function.name().bold(), args, marker.dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_config(config: &EngineConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
