//! Resume ranker: rank candidate resumes against a job description

use clap::Parser;
use log::{error, info};
use resume_ranker::cli::{self, Cli, Commands, ConfigAction, RankArgs};
use resume_ranker::input::text_extractor::DocumentSource;
use resume_ranker::output::formatter::{parse_output_format, save_report_to_file, ReportGenerator};
use resume_ranker::processing::analyzer::RankingEngine;
use resume_ranker::{Config, Result, ResumeRankerError};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config.as_deref()).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Rank(args) => run_rank(args, config).await,

        Commands::Config { action } => {
            match action {
                Some(ConfigAction::Show) | None => {
                    let content = toml::to_string_pretty(&config)
                        .map_err(|e| ResumeRankerError::Configuration(format!("Failed to serialize config: {}", e)))?;
                    println!("{}", content);
                }

                Some(ConfigAction::Reset) => {
                    let path = Config::reset(config_path)?;
                    println!("Configuration reset: {}", path.display());
                }

                Some(ConfigAction::Path) => match config_path {
                    Some(path) => println!("{}", path.display()),
                    None => println!("{}", Config::config_path().display()),
                },
            }
            Ok(())
        }
    }
}

async fn run_rank(args: RankArgs, config: Config) -> Result<()> {
    let top_k = args.top_k.unwrap_or(config.ranking.top_k);
    let output_format = match &args.output {
        Some(format) => parse_output_format(format)?,
        None => config.output.format,
    };

    let mut candidates = args
        .candidates
        .iter()
        .map(|arg| cli::parse_candidate_arg(arg).map_err(ResumeRankerError::InvalidInput))
        .collect::<Result<Vec<_>>>()?;

    let mut engine = RankingEngine::from_config(&config, args.model.as_deref());

    let job_description = match (&args.job, &args.job_text) {
        (_, Some(text)) => text.clone(),
        (Some(path), None) => {
            info!("Reading job description from {}", cli::file_label(path));
            engine.load_job_description(&DocumentSource::Path(path.clone())).await?
        }
        (None, None) => {
            return Err(ResumeRankerError::InvalidInput(
                "Provide a job description with --job or --job-text".to_string(),
            ))
        }
    };

    let report = engine.rank(&job_description, &mut candidates, top_k).await?;

    let use_colors = config.output.color_output && args.save.is_none();
    let rendered = ReportGenerator::with_options(use_colors, true, true).generate_report(&report, output_format)?;

    match &args.save {
        Some(path) => {
            save_report_to_file(&rendered, path)?;
            info!("Ranking saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
