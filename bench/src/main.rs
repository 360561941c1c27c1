use anyhow::Result;
use bench::commands::{self, Outcome};
use bench::settings::{load_catalog, load_execution_config};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_appender::rolling;
use util::config;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(version, about = "Runs benchmark programs and checks their results")]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Output format for verdicts and tables
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run programs for a task and verify each result
    Verify {
        /// Task id, read from DATA_DIR/tasks/<id>.json
        task: String,
        /// Program files. Defaults to every program stored for the task
        programs: Vec<PathBuf>,
        /// Print the compared table for passing programs too
        #[arg(long, short)]
        verbose: bool,
    },
    /// Run one program and print its result without verifying it
    Show { task: String, program: PathBuf },
    /// List the recognized languages
    Languages,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _log_guard = init_logging(&config::log_file(), &config::log_level());
    let args = Args::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "bench failed");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// `Ok(false)` when at least one program did not pass.
async fn run(args: Args) -> Result<bool> {
    let catalog = load_catalog()?;

    match args.command {
        Command::Languages => {
            let table = commands::languages(&catalog);
            match args.format {
                OutputFormat::Text => println!("{table}"),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
            }
            Ok(true)
        }
        Command::Show { task, program } => {
            let config = load_execution_config()?;
            let table = commands::show(&task, &program, &catalog, &config).await?;
            match args.format {
                OutputFormat::Text => println!("{table}"),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
            }
            Ok(true)
        }
        Command::Verify {
            task,
            programs,
            verbose,
        } => {
            let config = load_execution_config()?;
            let outcomes = commands::verify_task(&task, &programs, &catalog, &config).await?;
            print_outcomes(&outcomes, args.format, verbose)?;
            Ok(outcomes.iter().all(Outcome::passed))
        }
    }
}

fn print_outcomes(outcomes: &[Outcome], format: OutputFormat, verbose: bool) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", commands::render_text(outcomes, verbose)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcomes)?),
    }
    Ok(())
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let log_to_stdout = config::log_to_stdout();

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true);

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("bench=info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if log_to_stdout {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
