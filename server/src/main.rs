use clap::Parser;
use log::{error, info};
use server::config::{GameRules, ServerConfig};
use server::network::{Server, ServerMessage};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Maximum number of concurrent connections
    #[arg(short, long, default_value = "64")]
    max_clients: usize,

    /// How often due countdown ticks are checked, in milliseconds
    #[arg(long, default_value = "50")]
    timer_resolution_ms: u64,

    /// Seconds of silence before a connection is dropped
    #[arg(long, default_value = "5")]
    client_timeout_secs: u64,

    /// Length of a round in seconds
    #[arg(short, long, default_value_t = shared::ROUND_SECONDS)]
    round_seconds: u32,

    /// Contestants required before a round can start
    #[arg(long, default_value_t = shared::MIN_CONTESTANTS)]
    min_contestants: usize,
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            max_clients: self.max_clients,
            timer_resolution: Duration::from_millis(self.timer_resolution_ms.max(1)),
            client_timeout: Duration::from_secs(self.client_timeout_secs),
            rules: GameRules {
                round_seconds: self.round_seconds,
                min_contestants: self.min_contestants,
                ..GameRules::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    let args = Args::parse();
    let config = args.config();
    info!(
        "Starting trivia server: {}s rounds, {} contestants minimum",
        config.rules.round_seconds, config.rules.min_contestants
    );

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, config).await?;
    let control = server.control_handle();

    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server stopped with error: {}", e);
        }
    });

    let result = tokio::select! {
        result = &mut server_handle => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
            if let Err(e) = control.send(ServerMessage::Shutdown) {
                error!("Failed to signal shutdown: {}", e);
            }
            server_handle.await
        }
    };

    if let Err(e) = result {
        error!("Server task panicked: {}", e);
    }

    Ok(())
}
