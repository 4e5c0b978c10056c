//! Session agent: drives a [`Session`] over a [`Transport`].
//!
//! The agent logs in, then runs one scheduled operation per cycle. Each
//! operation is one or two strictly sequential exchanges. Failures never stop
//! the loop: the failed operation is logged and abandoned, the agent cools
//! down, and the next cycle runs the next scheduled operation.

use bulletin_core::{Environment, Transport};
use bulletin_proto::{RequestBody, StatusKind};

use crate::{
    AgentConfig, Catalog, ConfigError, Exchange, FALLBACK_CHANNEL, OperationKind, OperationReport,
    Session, SessionError, schedule::pick,
};

/// Simulated participant bound to one broker connection.
pub struct SessionAgent<E: Environment, T: Transport> {
    env: E,
    transport: T,
    session: Session,
    config: AgentConfig,
    catalog: Catalog,
    cycle: u64,
}

impl<E: Environment, T: Transport> SessionAgent<E, T> {
    /// Create an agent for `user` with the default catalog.
    pub fn new(
        env: E,
        transport: T,
        user: impl Into<String>,
        config: AgentConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let session = Session::new(user, config.policy);
        Ok(Self { env, transport, session, config, catalog: Catalog::default(), cycle: 0 })
    }

    /// Replace the canned content.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// The underlying session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Session user.
    pub fn user(&self) -> &str {
        self.session.user()
    }

    /// Current logical clock.
    pub fn clock(&self) -> u64 {
        self.session.clock()
    }

    /// Number of scheduled operations started so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One request/reply round trip.
    ///
    /// Ticks before sending; merges after receiving. On transport failure the
    /// outstanding request is abandoned and the tick is kept.
    pub async fn exchange(&mut self, body: RequestBody) -> Result<Exchange, SessionError> {
        let outbound = self.session.compose(body, self.env.wall_clock())?;
        let service = outbound.envelope.service;
        tracing::debug!(
            user = %self.session.user(),
            %service,
            clock = outbound.envelope.clock(),
            "sending"
        );

        match self.transport.request(&outbound.bytes).await {
            Ok(bytes) => self.session.receive(&bytes),
            Err(e) => {
                self.session.abort();
                Err(e.into())
            },
        }
    }

    /// Log in, retrying after the error cooldown until a reply arrives.
    ///
    /// Returns early only on a fatal error (rejected login under the halt
    /// policy).
    pub async fn establish(&mut self) -> Result<Exchange, SessionError> {
        loop {
            let body = RequestBody::Login { user: self.session.user().to_string() };
            match self.exchange(body).await {
                Ok(exchange) => {
                    tracing::info!(
                        user = %self.session.user(),
                        clock = exchange.clock,
                        status = ?exchange.reply.data.status,
                        "logged in"
                    );
                    return Ok(exchange);
                },
                Err(e) if e.is_fatal() => {
                    tracing::error!(user = %self.session.user(), error = %e, "login failed");
                    return Err(e);
                },
                Err(e) => {
                    tracing::warn!(
                        user = %self.session.user(),
                        error = %e,
                        clock = self.session.clock(),
                        "login attempt failed, retrying"
                    );
                    self.env.sleep(self.config.error_cooldown).await;
                },
            }
        }
    }

    /// Run the next scheduled operation without pausing.
    pub async fn step(&mut self) -> Result<OperationReport, SessionError> {
        self.cycle += 1;
        let kind = OperationKind::for_cycle(self.cycle);
        self.perform(kind).await
    }

    /// Log in, then run scheduled operations forever.
    ///
    /// Returns only on a fatal error.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        if !self.session.is_established() {
            self.establish().await?;
        }
        loop {
            self.run_cycle().await?;
        }
    }

    /// Log in if needed, then run `cycles` scheduled operations with pauses.
    pub async fn run_operations(&mut self, cycles: u64) -> Result<(), SessionError> {
        if !self.session.is_established() {
            self.establish().await?;
        }
        for _ in 0..cycles {
            self.run_cycle().await?;
        }
        Ok(())
    }

    /// Issue one operator-chosen request and log its outcome.
    pub async fn execute(&mut self, body: RequestBody) -> Result<Exchange, SessionError> {
        let service = body.service();
        let result = self.exchange(body).await;
        match &result {
            Ok(exchange) => tracing::info!(
                user = %self.session.user(),
                %service,
                clock = exchange.clock,
                reply = ?exchange.payload,
                "reply"
            ),
            Err(e) => {
                tracing::error!(
                    user = %self.session.user(),
                    %service,
                    error = %e,
                    "request failed"
                );
            },
        }
        result
    }

    async fn run_cycle(&mut self) -> Result<(), SessionError> {
        match self.step().await {
            Ok(report) => {
                self.log_report(&report);
                self.env.sleep(self.config.cycle_pause).await;
                Ok(())
            },
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::error!(
                    user = %self.session.user(),
                    cycle = self.cycle,
                    error = %e,
                    clock = self.session.clock(),
                    "operation failed, cooling down"
                );
                self.env.sleep(self.config.error_cooldown).await;
                Ok(())
            },
        }
    }

    async fn perform(&mut self, kind: OperationKind) -> Result<OperationReport, SessionError> {
        match kind {
            OperationKind::ListUsers => {
                let exchange = self.exchange(RequestBody::Users).await?;
                Ok(OperationReport::ListedUsers { users: exchange.users().to_vec() })
            },
            OperationKind::RegisterChannel => {
                let channel = self.catalog.channel(&self.env).to_string();
                let exchange =
                    self.exchange(RequestBody::Channel { channel: channel.clone() }).await?;
                Ok(OperationReport::RegisteredChannel { channel, status: exchange.status_kind() })
            },
            OperationKind::ListChannels => {
                let exchange = self.exchange(RequestBody::Channels).await?;
                Ok(OperationReport::ListedChannels { channels: exchange.channels().to_vec() })
            },
            OperationKind::Publish => self.publish().await,
            OperationKind::PrivateMessage => self.private_message().await,
        }
    }

    async fn publish(&mut self) -> Result<OperationReport, SessionError> {
        let listing = self.exchange(RequestBody::Channels).await?;
        let channel =
            pick(&self.env, listing.channels()).unwrap_or(FALLBACK_CHANNEL).to_string();
        let message = self.catalog.channel_message(&self.env).to_string();

        let exchange = self
            .exchange(RequestBody::Publish {
                user: self.session.user().to_string(),
                channel: channel.clone(),
                message: message.clone(),
            })
            .await?;

        if exchange.status_kind() == StatusKind::Rejected {
            tracing::warn!(
                user = %self.session.user(),
                %channel,
                detail = ?exchange.reply.data.message,
                "broker rejected publish"
            );
        }
        Ok(OperationReport::Published { channel, message, status: exchange.status_kind() })
    }

    async fn private_message(&mut self) -> Result<OperationReport, SessionError> {
        let listing = self.exchange(RequestBody::Users).await?;
        let user = self.session.user();
        let others: Vec<String> =
            listing.users().iter().filter(|u| u.as_str() != user).cloned().collect();

        let Some(dst) = pick(&self.env, &others).map(str::to_string) else {
            return Ok(OperationReport::NoRecipient);
        };
        let message = self.catalog.private_message(&self.env).to_string();

        let exchange = self
            .exchange(RequestBody::Message {
                src: self.session.user().to_string(),
                dst: dst.clone(),
                message: message.clone(),
            })
            .await?;

        Ok(OperationReport::Messaged { dst, message, status: exchange.status_kind() })
    }

    fn log_report(&self, report: &OperationReport) {
        let user = self.session.user();
        let clock = self.session.clock();
        match report {
            OperationReport::ListedUsers { users } => {
                tracing::info!(%user, clock, count = users.len(), "listed users");
            },
            OperationReport::RegisteredChannel { channel, status } => {
                if *status == StatusKind::Accepted {
                    tracing::info!(%user, clock, %channel, "registered channel");
                } else {
                    tracing::info!(%user, clock, %channel, ?status, "channel not registered");
                }
            },
            OperationReport::ListedChannels { channels } => {
                tracing::info!(%user, clock, count = channels.len(), "listed channels");
            },
            OperationReport::Published { channel, message, .. } => {
                tracing::info!(%user, clock, %channel, %message, "published");
            },
            OperationReport::Messaged { dst, message, .. } => {
                tracing::info!(%user, clock, %dst, %message, "sent private message");
            },
            OperationReport::NoRecipient => {
                tracing::info!(%user, clock, "no other user available for private message");
            },
        }
    }
}
