//! terra CLI entry point.
//!
//! Usage:
//!   terra [--state DIR] [--config FILE]              # Interactive console
//!   terra [--state DIR] [--config FILE] <command...> # Run one command and exit

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use cli_console::{run_session, CommandHandler};
use services_settings::BridgeConfig;
use tokio::io::BufReader;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_STATE_DIR: &str = ".terra";

struct Options {
    state_dir: PathBuf,
    config: Option<PathBuf>,
    command: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        config: None,
        command: Vec::new(),
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--state" => {
                let dir = iter.next().context("--state requires a directory")?;
                options.state_dir = PathBuf::from(dir);
            }
            "--config" => {
                let file = iter.next().context("--config requires a file")?;
                options.config = Some(PathBuf::from(file));
            }
            flag if flag.starts_with('-') && options.command.is_empty() => {
                bail!("unknown option: {}", flag)
            }
            word => options.command.push(word.to_string()),
        }
    }

    Ok(options)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().skip(1).collect();
    if matches!(args.first().map(String::as_str), Some("--help" | "-h")) {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }
    let options = parse_args(&args)?;

    let config = match &options.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    tokio::fs::create_dir_all(&options.state_dir)
        .await
        .with_context(|| format!("failed to create {}", options.state_dir.display()))?;

    let handler = CommandHandler::new(&options.state_dir, config);
    let phase = handler.boot().await;
    tracing::info!(state = %options.state_dir.display(), "{}", phase);

    if !options.command.is_empty() {
        return match handler.execute(&options.command.join(" ")).await {
            Ok(output) => {
                println!("{}", output.trim_end());
                Ok(ExitCode::SUCCESS)
            }
            Err(message) => {
                eprintln!("{}", message);
                Ok(ExitCode::FAILURE)
            }
        };
    }

    println!("{} (type help for commands, quit to leave)", phase);
    let failures = run_session(
        &handler,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_help() {
    println!("terra - keep a working tree in step with a folder on disk");
    println!();
    println!("Usage: terra [--state DIR] [--config FILE] [command...]");
    println!();
    println!("Options:");
    println!("  --state DIR     where handles and settings are kept (default {})", DEFAULT_STATE_DIR);
    println!("  --config FILE   JSON bridge configuration");
    println!();
    println!("Commands:");
    println!("  open <dir>               attach a folder");
    println!("  close                    detach the folder");
    println!("  status                   show the session");
    println!("  tree                     list the tree");
    println!("  cat <file>               print a file");
    println!("  write <file> <text...>   replace a file's content");
    println!("  mkdir <dir>              create a folder");
    println!("  rm <path>                remove a file or folder");
    println!("  mv <from> <to> [name]    move into folder <to>");
}
