use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use leadflow_common::{dedupe, load_config, load_contacts, ExportDocument, FileConfig, Secrets};
use leadflow_enricher::{
    ChannelObserver, Enricher, Orchestrator, PauseSignal, ProviderEnricher, ProxyEnricher,
    RunConfig, RunError, RunObserver, RunReport, RunState, TracingObserver,
};

mod progress;

#[derive(Parser)]
#[command(name = "leadflow", about = "Batch contact enrichment", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich a contact file in batches
    Enrich(EnrichArgs),

    /// Print the statistics stored in a JSON export
    Stats {
        /// Export written by `leadflow enrich`
        path: PathBuf,
    },
}

#[derive(Args)]
struct EnrichArgs {
    /// Contacts to enrich (.csv or .json)
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write results (.csv or .json)
    #[arg(short, long)]
    output: PathBuf,

    /// Path to config TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Provider API key. Falls back to APOLLO_API_KEY.
    #[arg(long)]
    api_key: Option<String>,

    /// One of 5, 10, 25
    #[arg(long)]
    batch_size: Option<usize>,

    /// Pause between batches, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Send batches through a deployed enrichment function
    #[arg(long)]
    proxy_url: Option<String>,

    /// Drop duplicate contacts before enriching
    #[arg(long)]
    dedupe: bool,

    #[arg(long)]
    reveal_personal_emails: bool,

    #[arg(long)]
    reveal_phone_numbers: bool,

    #[arg(long)]
    include_social_profiles: bool,

    #[arg(long)]
    include_employment_history: bool,

    /// Stop at Ctrl-C instead of offering to resume
    #[arg(long)]
    no_resume_prompt: bool,
}

impl EnrichArgs {
    /// Flags override the file; the result is re-validated.
    fn apply(&self, config: &mut FileConfig) -> Result<()> {
        if let Some(size) = self.batch_size {
            config.run.batch_size = size;
        }
        if let Some(ms) = self.delay_ms {
            config.run.inter_batch_delay_ms = ms;
        }
        if let Some(url) = &self.proxy_url {
            config.provider.proxy_url = Some(url.clone());
        }
        config.run.dedupe |= self.dedupe;
        config.options.reveal_personal_emails |= self.reveal_personal_emails;
        config.options.reveal_phone_numbers |= self.reveal_phone_numbers;
        config.options.include_social_profiles |= self.include_social_profiles;
        config.options.include_employment_history |= self.include_employment_history;
        config.validate()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leadflow=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Enrich(args) => enrich(args).await,
        Commands::Stats { path } => stats(path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn stats(path: PathBuf) -> Result<()> {
    let file = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open export: {}", path.display()))?;
    let doc = ExportDocument::read_json(file)
        .with_context(|| format!("Failed to parse export: {}", path.display()))?;
    println!("{}", doc.statistics);
    Ok(())
}

fn build_enricher(config: &FileConfig) -> Result<Box<dyn Enricher>> {
    let timeout = config.run.call_timeout();
    let enricher: Box<dyn Enricher> = match &config.provider.proxy_url {
        Some(url) => {
            info!(endpoint = %url, "Enriching through deployed function");
            Box::new(ProxyEnricher::with_timeout(url, timeout)?)
        }
        None => {
            info!(provider = %config.provider.base_url, "Enriching through provider API");
            Box::new(ProviderEnricher::with_timeout(&config.provider.base_url, timeout)?)
        }
    };
    Ok(enricher)
}

async fn enrich(args: EnrichArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config)?;

    let credential = args
        .api_key
        .clone()
        .or_else(|| Secrets::from_env().apollo_api_key)
        .unwrap_or_default();

    let upload = load_contacts(&args.input)?;
    if upload.skipped > 0 {
        warn!(skipped = upload.skipped, "Dropped rows without first and last name");
    }
    let contacts = if config.run.dedupe {
        dedupe(upload.contacts).0
    } else {
        upload.contacts
    };

    let pause = PauseSignal::new();
    let trigger = pause.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("Pause requested; finishing the current batch");
            trigger.raise();
        }
    });

    let (channel, rx) = ChannelObserver::channel();
    let progress = tokio::spawn(progress::render(rx));
    let observers: Vec<Box<dyn RunObserver>> = vec![Box::new(TracingObserver), Box::new(channel)];

    let orchestrator = Orchestrator::new(build_enricher(&config)?, RunConfig::from(&config))
        .with_observer(observers);

    let mut outcome = orchestrator.run(contacts, &credential, &pause).await;
    let result = loop {
        let report = match outcome {
            Ok(report) => report,
            Err(e) => break Err(e),
        };
        if report.state != RunState::Paused
            || args.no_resume_prompt
            || !confirm_resume(report.remaining().len()).await?
        {
            break Ok(report);
        }
        pause.reset();
        outcome = orchestrator.resume(report, &credential, &pause).await;
    };

    // Closes the event channel so the progress bar task finishes.
    drop(orchestrator);
    progress.await.ok();

    match result {
        Ok(report) => write_report(&report, &args.output),
        Err(RunError::Orchestration { error, context }) => {
            write_report(&context, &args.output)?;
            Err(error).context("Enrichment aborted; partial results were written")
        }
        Err(e) => Err(e.into()),
    }
}

async fn confirm_resume(remaining: usize) -> Result<bool> {
    let answer = tokio::task::spawn_blocking(move || {
        dialoguer::Confirm::new()
            .with_prompt(format!("Paused with {remaining} contacts left. Resume?"))
            .default(true)
            .interact()
    })
    .await??;
    Ok(answer)
}

fn write_report(report: &RunReport, output: &Path) -> Result<()> {
    let doc = ExportDocument::new(report.results.clone(), report.stats);
    doc.write_to(output)
        .with_context(|| format!("Failed to write results: {}", output.display()))?;

    println!("{}", report.stats);
    if report.state == RunState::Paused {
        println!("{} contacts were not processed", report.remaining().len());
    }
    Ok(())
}
