//! Tears down a multi-region deployment of the usage-plan governance platform.
//!
//! ```sh
//! upg-teardown --regions us-east-1,eu-west-1 stack --force-delete-protected
//! upg-teardown --all-regions plans            # dry run
//! upg-teardown --all-regions plans --confirm
//! ```
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use teardown::{
    aws::AwsConnector, CascadeMode, GovernanceReport, Handoff, Ledger, Markers, Outcome,
    RegionReport, RegionSelection, RunConfig,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Sets the verbosity level
    #[arg(short, action = clap::ArgAction::Count, global = true)]
    verbosity: u8,

    /// Named profile from the AWS configuration.
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Comma separated list of regions to operate on.
    #[arg(long, global = true, conflicts_with = "all_regions")]
    regions: Option<String>,

    /// Operate on every region enabled for the account.
    #[arg(long, global = true)]
    all_regions: bool,

    /// TOML file replacing the built-in classification markers.
    #[arg(long, global = true, value_name = "PATH")]
    markers: Option<PathBuf>,

    /// Number of regions processed at once.
    #[arg(long, global = true, default_value_t = 1)]
    parallel: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tear down the deployment stack, everything blocking its deletion, and
    /// the region's usage plans and API keys.
    Stack {
        /// Strip deletion protection from the stack's tables and delete them.
        #[arg(long)]
        force_delete_protected: bool,

        /// Leave usage plans and API keys in place.
        #[arg(long)]
        keep_plans: bool,

        /// Wait for the stack deletion to finish.
        #[arg(long)]
        wait: bool,

        /// Hand the stack to this framework CLI instead of calling
        /// CloudFormation directly, e.g. `sam`.
        #[arg(long, value_name = "PROGRAM")]
        framework_cli: Option<String>,
    },
    /// Clean up usage plans and API keys. Changes nothing without `--confirm`
    /// or `--unassociate`.
    Plans {
        /// Delete plans, their associations and the API keys.
        #[arg(long, conflicts_with_all = ["inspect", "unassociate"])]
        confirm: bool,

        /// Only list every plan's API stages.
        #[arg(long, conflicts_with = "unassociate")]
        inspect: bool,

        /// Only remove every plan's API stages.
        #[arg(long)]
        unassociate: bool,
    },
}

impl Cli {
    fn run_config(&self) -> teardown::Result<RunConfig> {
        let regions = match (&self.regions, self.all_regions) {
            (_, true) => RegionSelection::All,
            (Some(list), false) => RegionSelection::parse_list(list),
            (None, false) => RegionSelection::Default,
        };
        let markers = match &self.markers {
            Some(path) => Markers::load(path)?,
            None => Markers::default(),
        };
        let mut config = RunConfig {
            profile: self.profile.clone(),
            regions,
            markers,
            concurrency: self.parallel.max(1),
            ..Default::default()
        };
        match &self.command {
            Command::Stack {
                force_delete_protected,
                keep_plans,
                wait,
                framework_cli,
            } => {
                config.override_protected = *force_delete_protected;
                config.keep_plans = *keep_plans;
                config.wait_for_deletion = *wait;
                config.handoff = framework_cli
                    .clone()
                    .map(Handoff::Command)
                    .unwrap_or_default();
            }
            Command::Plans {
                confirm,
                inspect,
                unassociate,
            } => {
                config.cascade = if *inspect {
                    CascadeMode::Inspect
                } else if *unassociate {
                    CascadeMode::Unassociate
                } else if *confirm {
                    CascadeMode::Confirm
                } else {
                    CascadeMode::DryRun
                };
            }
        }
        Ok(config)
    }
}

fn write_ledger(out: &mut impl Write, ledger: &Ledger) -> std::io::Result<()> {
    for notice in ledger.notices() {
        writeln!(out, "  {} {notice}", "-".dimmed())?;
    }
    for record in ledger.records() {
        let line = record.to_string();
        let line = match record.outcome {
            Outcome::Done => line.green(),
            Outcome::Skipped(_) => line.yellow(),
            Outcome::Failed(_) => line.red(),
        };
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

fn write_governance(out: &mut impl Write, report: &GovernanceReport) -> std::io::Result<()> {
    writeln!(
        out,
        "{} {} ({}): {} plan(s), {} key(s)",
        "governance".bold(),
        report.region().bold(),
        report.mode,
        report.plans.len(),
        report.keys.len()
    )?;
    for plan in &report.plans {
        writeln!(out, "  plan '{}' ({})", plan.name, plan.id)?;
        for stage in &plan.api_stages {
            writeln!(out, "    stage {stage}")?;
        }
    }
    for key in &report.keys {
        writeln!(out, "  key '{}' ({})", key.name, key.id)?;
    }
    write_ledger(out, report)
}

fn write_region(out: &mut impl Write, report: &RegionReport) -> std::io::Result<()> {
    let region = report.region().bold();
    match &report.stack {
        Some(stack) => writeln!(out, "{} {region} (stack '{stack}')", "region".bold())?,
        None => writeln!(out, "{} {region} (no stack)", "region".bold())?,
    }
    write_ledger(out, report)?;
    if let Some(governance) = &report.governance {
        write_governance(out, governance)?;
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.run_config()?;
    let connector = AwsConnector::new(&config);
    match cli.command {
        Command::Stack { .. } => {
            let report = teardown::run_teardown(&connector, &config).await?;
            let mut out = std::io::stdout().lock();
            writeln!(
                out,
                "{} {} ({})",
                "account".bold(),
                report.identity.account,
                report.identity.arn
            )?;
            for region in &report.regions {
                write_region(&mut out, region)?;
            }
        }
        Command::Plans { .. } => {
            if !config.cascade.is_destructive() {
                log::info!("running in {} mode, nothing will be changed", config.cascade);
            }
            let reports = teardown::run_cleanup(&connector, &config).await;
            let mut out = std::io::stdout().lock();
            for report in &reports {
                write_governance(&mut out, report)?;
            }
        }
    }
    Ok(())
}

#[::tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("teardown", level)
        .filter_module("upg_teardown", level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
