//! Bulletin bot binary.
//!
//! The bot speaks length-prefixed CBOR frames over plain TCP (see
//! `bulletin_core::StreamTransport`). That is not the ZeroMQ REQ/REP
//! MessagePack wire of the reference broker, so the bot cannot talk to it
//! directly; today the only peer speaking this framing is the model broker in
//! `bulletin-harness`.
//!
//! # Usage
//!
//! ```bash
//! # Autonomous loop against the default broker
//! bulletin-bot
//!
//! # Named bot, bounded run
//! BROKER_ADDR=localhost:5555 CLIENT_NAME=bot_1 bulletin-bot --cycles 10
//!
//! # One-shot request
//! bulletin-bot --user alice publish geral "ola"
//! ```

use std::time::Duration;

use bulletin_bot::{BotConfig, Command, DEFAULT_BROKER};
use bulletin_client::{AgentConfig, LoginPolicy, MalformedClockPolicy, SessionPolicy};
use bulletin_core::TransportConfig;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Bulletin bot
#[derive(Parser, Debug)]
#[command(name = "bulletin-bot")]
#[command(about = "Autonomous clock-stamped client for a pub/sub message broker")]
#[command(version)]
struct Args {
    /// Broker address (host:port)
    #[arg(short, long, env = "BROKER_ADDR", default_value = DEFAULT_BROKER)]
    broker: String,

    /// Username (generated as bot_NNNN if unset)
    #[arg(short, long, env = "CLIENT_NAME")]
    user: Option<String>,

    /// Bound on connecting and sending one request
    #[arg(long, env = "SEND_TIMEOUT_MS", default_value = "10000")]
    send_timeout_ms: u64,

    /// Bound on awaiting one reply
    #[arg(long, env = "RECEIVE_TIMEOUT_MS", default_value = "10000")]
    receive_timeout_ms: u64,

    /// Pause after a successful operation
    #[arg(long, default_value = "3000")]
    cycle_pause_ms: u64,

    /// Pause after a failed operation (must exceed the cycle pause)
    #[arg(long, default_value = "5000")]
    error_cooldown_ms: u64,

    /// Rejected login handling (ignore, halt)
    #[arg(long, default_value = "ignore")]
    login_policy: LoginPolicy,

    /// Malformed reply clock handling (ignore, reject)
    #[arg(long, default_value = "ignore")]
    malformed_clock: MalformedClockPolicy,

    /// Stop after this many scheduled operations
    #[arg(long)]
    cycles: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Args {
    fn config(&self) -> BotConfig {
        BotConfig {
            broker: self.broker.clone(),
            user: self.user.clone().filter(|u| !u.trim().is_empty()),
            transport: TransportConfig {
                send_timeout: Duration::from_millis(self.send_timeout_ms),
                receive_timeout: Duration::from_millis(self.receive_timeout_ms),
                ..TransportConfig::default()
            },
            agent: AgentConfig {
                cycle_pause: Duration::from_millis(self.cycle_pause_ms),
                error_cooldown: Duration::from_millis(self.error_cooldown_ms),
                policy: SessionPolicy {
                    login: self.login_policy,
                    malformed_clock: self.malformed_clock,
                },
            },
            cycles: self.cycles,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = args.config();
    let command = args.command.clone().unwrap_or_default();

    if let Err(e) = bulletin_bot::run(&config, &command).await {
        tracing::error!(error = %e, "bot stopped");
        return Err(e.into());
    }

    Ok(())
}
