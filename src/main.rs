//! Jusur deal calculator CLI
//!
//! Evaluates deal files under a sharing model, compares models, solves for
//! break-even prices, sweeps profit sensitivity, exports CSV reports and
//! keeps named deals and input profiles in the data directory.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use jusur_calc::config::{AppConfig, LoggingConfig};
use jusur_calc::engine::{derive, derive_all, sensitivity, try_break_even_price};
use jusur_calc::persistence::{JsonFileStore, RecordStore};
use jusur_calc::report::{
    format_money, format_pct, timeline, write_deal_csv, write_sensitivity_csv,
};
use jusur_calc::types::{DealInputs, DealProfile, DealResults, DealSnapshot, SharingModel};

#[derive(Parser)]
#[command(name = "jusur", version, about = "Investor / Jusur profit-sharing calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive costs, profit and shares under one model
    Derive {
        #[command(flatten)]
        deal: DealArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Also print the holding-period timeline
        #[arg(long)]
        timeline: bool,
    },
    /// Derive the deal under every model side by side
    Compare {
        #[command(flatten)]
        deal: DealArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Minimum sale price reaching the target ROI
    BreakEven {
        #[command(flatten)]
        deal: DealArgs,
    },
    /// Sweep 50%..150% of the current profit across all models
    Sensitivity {
        #[command(flatten)]
        deal: DealArgs,
        /// Write the sweep as CSV instead of printing it
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Write a CSV report for the deal
    Export {
        #[command(flatten)]
        deal: DealArgs,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = "deal")]
        name: String,
    },
    /// Save the deal and its results under a name
    Save {
        #[command(flatten)]
        deal: DealArgs,
        #[arg(long)]
        name: String,
    },
    /// List saved deals, newest first
    List,
    /// Show a saved deal
    Show {
        id: Uuid,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Delete a saved deal
    Delete { id: Uuid },
    /// Save the deal inputs as a reusable profile
    ProfileSave {
        #[command(flatten)]
        deal: DealArgs,
        #[arg(long)]
        name: String,
    },
    /// List saved profiles
    Profiles,
}

#[derive(Args)]
struct DealArgs {
    /// YAML or JSON deal file
    file: Option<PathBuf>,
    /// Start from a saved profile (the file, if any, overrides it)
    #[arg(long)]
    profile: Option<String>,
    /// Sharing model: sliding, progressive, flat, roi_tiered
    #[arg(long)]
    model: Option<SharingModel>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load()?;
    init_tracing(&cfg.logging);
    info!(config = %cfg, "jusur starting");

    // The data directory is created by the first save
    let deals = JsonFileStore::<DealSnapshot>::new(&cfg.persistence.data_dir);
    let profiles = JsonFileStore::<DealProfile>::new(&cfg.persistence.data_dir);

    match cli.command {
        Command::Derive {
            deal,
            format,
            timeline: with_timeline,
        } => {
            let (model, inputs) = resolve_deal(&cfg, &profiles, &deal)?;
            let results = derive(model, &inputs);
            match format {
                OutputFormat::Text => {
                    print_results(model, &results);
                    if with_timeline {
                        print_timeline(&inputs, &results);
                    }
                }
                _ => emit(format, &results)?,
            }
        }
        Command::Compare { deal, format } => {
            let (_, inputs) = resolve_deal(&cfg, &profiles, &deal)?;
            let all = derive_all(&inputs);
            match format {
                OutputFormat::Text => print_comparison(&all),
                _ => {
                    let keyed: Vec<ModelResults> = all
                        .iter()
                        .map(|(model, results)| ModelResults {
                            model: *model,
                            results: *results,
                        })
                        .collect();
                    emit(format, &keyed)?
                }
            }
        }
        Command::BreakEven { deal } => {
            let (_, inputs) = resolve_deal(&cfg, &profiles, &deal)?;
            match try_break_even_price(&inputs) {
                Some(price) => println!(
                    "Break-even sale price for {} ROI: {}",
                    format_pct(inputs.target_roi_pct),
                    format_money(price)
                ),
                None => {
                    warn!("sale-side rates sum to 100% or more");
                    println!("Break-even sale price: not achievable");
                }
            }
        }
        Command::Sensitivity { deal, csv } => {
            let (model, inputs) = resolve_deal(&cfg, &profiles, &deal)?;
            let base = derive(model, &inputs);
            let plan = sensitivity(&inputs, &base);
            if let Some(gap) = plan.gap() {
                println!("No sensitivity sweep: {}", gap);
                return Ok(());
            }
            match csv {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    let rows = write_sensitivity_csv(file, &plan)?;
                    info!(rows, path = %path.display(), "sensitivity exported");
                }
                None => {
                    let stdout = io::stdout();
                    write_sensitivity_csv(stdout.lock(), &plan)?;
                }
            }
        }
        Command::Export { deal, out, name } => {
            let (model, inputs) = resolve_deal(&cfg, &profiles, &deal)?;
            let results = derive(model, &inputs);
            let file = File::create(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            write_deal_csv(file, &name, model, &inputs, &results)?;
            println!("Report written to {}", out.display());
        }
        Command::Save { deal, name } => {
            let (model, inputs) = resolve_deal(&cfg, &profiles, &deal)?;
            let snapshot = DealSnapshot::new(name, model, inputs);
            let id = snapshot.id;
            deals.save(snapshot)?;
            println!("Saved deal {}", id);
        }
        Command::List => {
            for s in deals.list()? {
                println!(
                    "{}  {}  {:<12} {:<24} profit {}",
                    s.id,
                    s.created_at.format("%Y-%m-%d %H:%M"),
                    s.model.as_str(),
                    s.name,
                    format_money(s.results.total_profit)
                );
            }
        }
        Command::Show { id, format } => {
            let snapshot = deals
                .load(id)?
                .ok_or_else(|| anyhow!("No saved deal with id {}", id))?;
            match format {
                OutputFormat::Text => {
                    println!("{} ({})", snapshot.name, snapshot.created_at.to_rfc3339());
                    print_results(snapshot.model, &snapshot.results);
                }
                _ => emit(format, &snapshot)?,
            }
        }
        Command::Delete { id } => {
            if deals.delete(id)? {
                println!("Deleted deal {}", id);
            } else {
                println!("No saved deal with id {}", id);
            }
        }
        Command::ProfileSave { deal, name } => {
            let (model, inputs) = resolve_deal(&cfg, &profiles, &deal)?;
            let profile = DealProfile::new(name, model, inputs);
            let id = profile.id;
            profiles.save(profile)?;
            println!("Saved profile {}", id);
        }
        Command::Profiles => {
            for p in profiles.list()? {
                println!(
                    "{}  {}  {:<12} {}",
                    p.id,
                    p.created_at.format("%Y-%m-%d %H:%M"),
                    p.model.as_str(),
                    p.name
                );
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ModelResults {
    model: SharingModel,
    results: DealResults,
}

/// Model and inputs from profile, deal file and config defaults, in that order
fn resolve_deal(
    cfg: &AppConfig,
    profiles: &dyn RecordStore<DealProfile>,
    args: &DealArgs,
) -> Result<(SharingModel, DealInputs)> {
    let mut base = cfg.clone();
    let mut model = cfg.model;

    if let Some(name) = &args.profile {
        let profile = profiles
            .find_by_name(name)?
            .ok_or_else(|| anyhow!("No saved profile named '{}'", name))?;
        base.deal = profile.inputs;
        model = profile.model;
    }

    let inputs = match &args.file {
        Some(path) => base.load_deal(path)?,
        None => base.deal,
    };

    Ok((args.model.unwrap_or(model), inputs))
}

fn emit<T: Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Json | OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(value)?)
        }
    }
    Ok(())
}

fn print_results(model: SharingModel, r: &DealResults) {
    let lines = [
        ("Model", model.as_str().to_string()),
        ("Buy commission", format_money(r.buy_commission_amount)),
        ("Cost to buy", format_money(r.cost_to_buy)),
        ("Sell commission", format_money(r.sell_commission_amount)),
        ("Agent commission", format_money(r.agent_commission_amount)),
        ("Transaction tax", format_money(r.transaction_tax_amount)),
        ("Other expenses", format_money(r.other_expenses)),
        ("Net sale revenue", format_money(r.net_sale_revenue)),
        ("Total profit", format_money(r.total_profit)),
        ("Jusur share", format_pct(r.share_pct * 100.0)),
        ("Jusur profit cut", format_money(r.profit_cut)),
        ("Investor profit", format_money(r.investor_profit)),
        ("Investor final return", format_money(r.investor_final_return)),
        ("Jusur total revenue", format_money(r.managing_party_revenue)),
        ("  Partner A", format_money(r.partner_share_a)),
        ("  Partner B", format_money(r.partner_share_b)),
        ("Investor ROI", format_pct(r.investor_roi_pct)),
        ("Investor share of profit", format_pct(r.investor_profit_share_pct)),
    ];
    for (label, value) in lines {
        println!("{:<26}{:>20}", label, value);
    }
}

fn print_comparison(all: &[(SharingModel, DealResults); 4]) {
    println!(
        "{:<12}{:>10}{:>18}{:>18}{:>14}",
        "model", "share", "jusur cut", "investor", "investor roi"
    );
    for (model, r) in all {
        println!(
            "{:<12}{:>10}{:>18}{:>18}{:>14}",
            model.as_str(),
            format_pct(r.share_pct * 100.0),
            format_money(r.profit_cut),
            format_money(r.investor_profit),
            format_pct(r.investor_roi_pct)
        );
    }
}

fn print_timeline(inputs: &DealInputs, results: &DealResults) {
    let points = timeline(inputs, results);
    if points.is_empty() {
        println!("No holding period set");
        return;
    }
    println!();
    println!("{:<8}{:>20}", "month", "investor value");
    for p in points {
        println!("{:<8}{:>20}", p.month, format_money(p.value));
    }
}
