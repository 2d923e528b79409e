use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use covid_panel::config::{ConfigLoader, ResolvedConfig};
use covid_panel::domain::{Metric, Scope};
use covid_panel::error::PanelError;
use covid_panel::output::{JsonOutput, ScopeList};
use covid_panel::service::PanelService;
use covid_panel::source::{CsseHttpClient, DirectorySourceClient, SourceClient};

#[derive(Parser)]
#[command(name = "covid-panel")]
#[command(about = "Cumulative and daily COVID-19 case series per country and province/state")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    source_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List countries/regions")]
    Regions,
    #[command(about = "List provinces/states of a region")]
    SubRegions(SubRegionArgs),
    #[command(about = "Print cumulative and daily-change series")]
    Series(SeriesArgs),
}

#[derive(Args)]
struct SubRegionArgs {
    region: Scope,
}

#[derive(Args)]
struct SeriesArgs {
    region: Scope,

    #[arg(long, default_value = "<all>")]
    sub_region: Scope,

    #[arg(long = "metric", value_enum)]
    metrics: Vec<Metric>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<PanelError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &PanelError) -> u8 {
    match error {
        PanelError::ConfigRead(_) | PanelError::ConfigParse(_) | PanelError::ConfigValue(_) => 2,
        PanelError::SourceHttp(_) | PanelError::SourceStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    if let Some(dir) = cli.source_dir.as_deref() {
        config.source_dir = Some(Utf8PathBuf::from(dir));
    }

    match config.source_dir.clone() {
        Some(dir) => run_command(cli.command, DirectorySourceClient::new(dir), &config),
        None => {
            let client =
                CsseHttpClient::new(&config.base_url, config.timeout, config.max_retries)?;
            run_command(cli.command, client, &config)
        }
    }
}

fn run_command<C: SourceClient>(
    command: Commands,
    client: C,
    config: &ResolvedConfig,
) -> miette::Result<()> {
    let service = PanelService::new(client);
    let panel = service.refresh()?;

    match command {
        Commands::Regions => {
            let result = ScopeList {
                parent: None,
                values: service.list_regions()?,
                last_updated: panel.built_at(),
            };
            JsonOutput::print_scopes(&result).into_diagnostic()
        }
        Commands::SubRegions(args) => {
            let result = ScopeList {
                values: service.list_sub_regions(&args.region)?,
                parent: Some(args.region),
                last_updated: panel.built_at(),
            };
            JsonOutput::print_scopes(&result).into_diagnostic()
        }
        Commands::Series(args) => {
            let metrics = if args.metrics.is_empty() {
                config.metrics.clone()
            } else {
                args.metrics
            };
            let view = service.get_series(&args.region, &args.sub_region, &metrics)?;
            if view.cumulative.is_empty() {
                tracing::info!(
                    region = %args.region,
                    sub_region = %args.sub_region,
                    "no data for selection"
                );
            }
            JsonOutput::print_series(&view).into_diagnostic()
        }
    }
}
