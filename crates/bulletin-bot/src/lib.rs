//! Bulletin bot.
//!
//! Production wiring for a bulletin session agent:
//!
//! ```text
//! bulletin-bot
//!   ├─ SystemEnv        (system time, tokio sleep, OS randomness)
//!   ├─ TcpConnector     (tokio TCP for StreamTransport)
//!   ├─ BotConfig        (broker address, bounds, pauses, policies)
//!   └─ SessionAgent     (login, then the five-operation schedule)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod config;
mod error;
mod system_env;
mod tcp;

use bulletin_client::{SessionAgent, fallback_user};
use bulletin_core::StreamTransport;
use bulletin_proto::RequestBody;
pub use command::Command;
pub use config::{BotConfig, DEFAULT_BROKER};
pub use error::BotError;
pub use system_env::SystemEnv;
pub use tcp::TcpConnector;

/// Production agent type.
pub type Bot = SessionAgent<SystemEnv, StreamTransport<TcpConnector>>;

/// Build an agent from configuration. Nothing is sent until it runs.
pub fn connect(config: &BotConfig) -> Result<Bot, BotError> {
    config.validate()?;

    let env = SystemEnv::new();
    let user = config.user.clone().unwrap_or_else(|| fallback_user(&env));
    let connector = TcpConnector::new(config.broker.clone());
    let transport = StreamTransport::new(connector, config.transport);

    Ok(SessionAgent::new(env, transport, user, config.agent)?)
}

/// Run `command` against the configured broker.
///
/// `Run` logs in (retrying until the broker answers) and then runs the
/// schedule, forever or for `config.cycles` operations. One-shot commands
/// log in once and issue a single request; any failure is returned.
pub async fn run(config: &BotConfig, command: &Command) -> Result<(), BotError> {
    let mut bot = connect(config)?;
    tracing::info!(user = %bot.user(), broker = %config.broker, ?command, "bot starting");

    if *command == Command::Run {
        match config.cycles {
            Some(cycles) => bot.run_operations(cycles).await?,
            None => bot.run().await?,
        }
        return Ok(());
    }

    bot.execute(RequestBody::Login { user: bot.user().to_string() }).await?;
    if let Some(body) = command.request(bot.user()) {
        bot.execute(body).await?;
    }
    Ok(())
}
