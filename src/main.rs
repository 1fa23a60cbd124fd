use clap::{Parser, Subcommand};
use port_cluster::{
    config::Config,
    observability::init_tracing,
    pipeline::AnalysisPipeline,
    report::{ReportFormat, Reporter},
    state::create_source,
    AppError,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "port-cluster")]
#[command(about = "Group recorded port-scan observations into common port clusters", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Scan-results SQLite database
    #[arg(short, long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Number of clusters to form
    #[arg(short = 'k', long, value_name = "K")]
    clusters: Option<usize>,

    /// Seed for reproducible clustering
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster recorded ports and print the cluster centres (default)
    Analyze,

    /// Print the most frequent ports, banners and busiest day
    Stats {
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            let code = err
                .downcast_ref::<AppError>()
                .map(AppError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?.with_overrides(
        cli.store,
        cli.clusters,
        cli.seed,
    )?;

    init_tracing(&config.observability)?;
    tracing::debug!(?config, "Effective configuration");

    let source = create_source(&config.store)?;
    let pipeline = AnalysisPipeline::new(source, config.analysis, Reporter::new(cli.format));
    let mut stdout = std::io::stdout().lock();

    match cli.command.unwrap_or(Commands::Analyze) {
        Commands::Analyze => {
            pipeline.run(&mut stdout)?;
        }
        Commands::Stats { limit } => {
            pipeline.statistics(limit, &mut stdout)?;
        }
    }

    Ok(())
}
