use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tower_lsp::{LspService, Server};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use phake_lsp::{Backend, Config};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter (e.g. `debug`, `phake_lsp=trace`).  `RUST_LOG` wins
    /// over this; the config file's `[log] level` is the fallback.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the language server on stdio (the default)
    Serve,
    /// Print the Phake calls recognised in a PHP file
    Inspect {
        /// The PHP file to analyse
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Workspace to index first (default: the file's directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Log to stderr; stdout carries the LSP protocol.
fn init_logging(cli_level: Option<&str>) {
    let fallback = match cli_level {
        Some(level) => level.to_string(),
        None => {
            let cwd = std::env::current_dir().ok();
            Config::load(cwd.as_deref()).log.level
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

async fn serve() {
    tracing::info!("starting phake-lsp {}", env!("CARGO_PKG_VERSION"));
    let (service, socket) = LspService::new(Backend::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            serve().await;
            ExitCode::SUCCESS
        }
        Command::Inspect {
            file,
            workspace,
            json,
        } => {
            let report = match phake_lsp::inspect::inspect(&file, workspace.as_deref()) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            if json {
                match report.to_json() {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("error: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print!("{}", report);
            }
            ExitCode::SUCCESS
        }
    }
}
