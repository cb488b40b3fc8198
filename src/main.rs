use std::fs::File;

use clap::{Parser, Subcommand};
use minichat::core::config::{self, CliOverrides};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

const LOG_FILE: &str = "minichat.log";

#[derive(Parser)]
#[command(name = "minichat", version, about = "Minimal AI chat client with a server-side proxy")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the proxy that relays chats to OpenRouter (POST /api/chat)
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3000
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Open the terminal chat client
    Chat {
        /// Base URL of a running proxy, e.g. http://127.0.0.1:3000
        #[arg(short, long)]
        backend: Option<String>,
    },
}

/// File logging always; `serve` also logs to the terminal since it has no UI.
fn init_logging(to_terminal: bool) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if to_terminal {
        loggers.push(TermLogger::new(
            LevelFilter::Info,
            log_config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if let Ok(log_file) = File::create(LOG_FILE) {
        loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, log_file));
    }
    let _ = CombinedLogger::init(loggers);
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let (is_server, cli) = match &args.command {
        Command::Serve { bind } => (
            true,
            CliOverrides {
                bind_addr: bind.clone(),
                ..Default::default()
            },
        ),
        Command::Chat { backend } => (
            false,
            CliOverrides {
                backend_url: backend.clone(),
                ..Default::default()
            },
        ),
    };
    init_logging(is_server);

    let file_config = config::load_config().map_err(|e| {
        log::error!("{}", e);
        std::io::Error::other(e.to_string())
    })?;
    let resolved = config::resolve(&file_config, &cli);

    match args.command {
        Command::Serve { .. } => {
            log::info!("MiniChat proxy starting up");
            minichat::server::serve(resolved).await
        }
        Command::Chat { .. } => {
            log::info!("MiniChat client starting up");
            minichat::tui::run(resolved)
        }
    }
}
