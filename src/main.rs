//! StumpCalc - Main entry point
//!
//! Command line front end: edits the persisted job and pricing settings,
//! prints the quote, and relays it by email.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use stumpcalc_lib::core::{Config, Job, JobStatus, PricingConfig, StumpUpdate};
use stumpcalc_lib::db::Store;
use stumpcalc_lib::export;
use stumpcalc_lib::i18n::I18n;
use stumpcalc_lib::quote::compute_quote;
use stumpcalc_lib::relay::{EmailRelay, EmailRequest, PhotoAttachment, RelayCredentials};

#[derive(Parser)]
#[command(name = "stumpcalc", version, about = "Quote calculator for stump grinding jobs")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "STUMPCALC_CONFIG")]
    config: Option<PathBuf>,

    /// Display language: auto, en, fr
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the quote for the current job
    Quote {
        /// Print the raw quote result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit job-level fields
    Job {
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// Flat amount added to the subtotal
        #[arg(long)]
        access_fee: Option<f64>,
        /// DRAFT, SENT, COMPLETED or ARCHIVED
        #[arg(long)]
        status: Option<JobStatus>,
    },
    /// Append a stump with default values, then apply any given fields
    AddStump(StumpArgs),
    /// Edit the stump at a 1-based position
    EditStump {
        position: usize,
        #[command(flatten)]
        fields: StumpArgs,
    },
    /// Remove the stump at a 1-based position
    RemoveStump { position: usize },
    /// Show pricing settings, or update them with KEY=VALUE pairs
    Settings {
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Discard the current job and start a new one
    Reset,
    /// Email the quote through the relay
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: Option<String>,
        /// JPEG photo to attach (repeatable)
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct StumpArgs {
    /// Diameter in inches
    #[arg(long)]
    diameter: Option<f64>,
    #[arg(long)]
    location: Option<String>,
    /// Feet of root to chase
    #[arg(long)]
    roots: Option<f64>,
    #[arg(long)]
    haul_away: Option<bool>,
    #[arg(long)]
    deep_grind: Option<bool>,
    #[arg(long)]
    access_issue: Option<bool>,
}

impl From<StumpArgs> for StumpUpdate {
    fn from(args: StumpArgs) -> Self {
        StumpUpdate {
            diameter: args.diameter,
            location_description: args.location,
            root_chasing_ft: args.roots,
            haul_away: args.haul_away,
            deep_grind: args.deep_grind,
            access_issue: args.access_issue,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;

    let language = cli.lang.as_deref().unwrap_or(&config.general.language);
    let i18n = I18n::new(language);

    let store = Store::open(&config.store_path()?).context("opening data store")?;
    let settings = store.load_settings()?;
    let mut job = store.load_job()?;

    match cli.command.unwrap_or(Command::Quote { json: false }) {
        Command::Quote { json } => {
            let quote = compute_quote(&job, &settings);
            if json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                println!("{}", export::quote_summary(&job, &settings, &quote, &i18n));
                println!();
                print_notes(&settings, &i18n);
            }
        }
        Command::Job {
            client,
            address,
            access_fee,
            status,
        } => {
            if let Some(client) = client {
                job.client_name = client;
            }
            if let Some(address) = address {
                job.address = address;
            }
            if let Some(fee) = access_fee {
                job.access_fee = fee;
            }
            if let Some(status) = status {
                job.status = status;
            }
            store.save_job(&job)?;
            print_job(&job, &i18n);
        }
        Command::AddStump(fields) => {
            let id = job.add_stump().id.clone();
            job.update_stump(&id, &fields.into())?;
            store.save_job(&job)?;
            log::info!("Added stump #{}", job.stumps.len());
            print_total(&job, &settings, &i18n);
        }
        Command::EditStump { position, fields } => {
            let update: StumpUpdate = fields.into();
            if update.is_empty() {
                bail!("nothing to change; pass at least one stump option");
            }
            let id = job.stump_id_at(position)?;
            job.update_stump(&id, &update)?;
            store.save_job(&job)?;
            print_total(&job, &settings, &i18n);
        }
        Command::RemoveStump { position } => {
            let id = job.stump_id_at(position)?;
            job.remove_stump(&id)?;
            store.save_job(&job)?;
            log::info!("Removed stump #{}", position);
            print_total(&job, &settings, &i18n);
        }
        Command::Settings { set } => {
            let settings = if set.is_empty() {
                settings
            } else {
                let updated = settings.merged(&parse_assignments(&set)?)?;
                updated.validate()?;
                store.save_settings(&updated)?;
                updated
            };
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Reset => {
            let job = store.reset_job()?;
            print_job(&job, &i18n);
        }
        Command::Send { to, subject, photos } => {
            let mut relay_config = config.relay.clone();
            relay_config.apply_overrides(|key| std::env::var(key).ok());
            let credentials = RelayCredentials::from_env()?;

            let mut attachments = Vec::with_capacity(photos.len());
            for path in &photos {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("reading photo {}", path.display()))?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "photo.jpg".to_string());
                attachments.push(PhotoAttachment::from_bytes(&filename, &bytes));
            }

            let quote = compute_quote(&job, &settings);
            let request = EmailRequest {
                to,
                subject: subject.unwrap_or_else(|| i18n.get("email.subject")),
                html: export::quote_html(&job, &settings, &quote, &i18n),
                photos: attachments,
            };

            EmailRelay::new(relay_config, credentials)
                .send(&request)
                .await
                .context("sending quote email")?;

            if job.status == JobStatus::Draft {
                job.status = JobStatus::Sent;
                store.save_job(&job)?;
            }
            println!("{}: {}", i18n.get("email.sent"), request.to);
        }
    }

    Ok(())
}

/// Parse `key=value` pairs into a JSON object. Values that parse as JSON
/// (numbers, booleans) keep their type; anything else is a string.
fn parse_assignments(pairs: &[String]) -> anyhow::Result<serde_json::Value> {
    let mut object = serde_json::Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected KEY=VALUE, got {:?}", pair);
        };
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        object.insert(key.trim().to_string(), value);
    }
    Ok(serde_json::Value::Object(object))
}

fn print_job(job: &Job, i18n: &I18n) {
    let status_key = format!("status.{}", format!("{:?}", job.status).to_lowercase());
    println!("{} ({})", job.id, i18n.get(&status_key));
    if !job.client_name.is_empty() {
        println!("{}: {}", i18n.get("quote.client"), job.client_name);
    }
    if !job.address.is_empty() {
        println!("{}: {}", i18n.get("quote.address"), job.address);
    }
    println!("{}: {}", i18n.get("quote.stumps"), job.stumps.len());
}

fn print_total(job: &Job, settings: &PricingConfig, i18n: &I18n) {
    let quote = compute_quote(job, settings);
    println!(
        "{}: {}  {}: {}",
        i18n.get("quote.stumps"),
        job.stumps.len(),
        i18n.get("quote.total"),
        i18n.format_currency(quote.total, &settings.currency)
    );
}

fn print_notes(settings: &PricingConfig, i18n: &I18n) {
    println!(
        "{} {}",
        i18n.get("quote.minimum_call_out"),
        i18n.format_currency(settings.min_call_out_fee, &settings.currency)
    );
    println!("{}", i18n.get("quote.volume_discount"));
    println!(
        "{} {}\"",
        i18n.get("quote.access_threshold"),
        settings.machine_width
    );
}
