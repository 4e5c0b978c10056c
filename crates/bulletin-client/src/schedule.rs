//! Operation schedule and canned content.

use bulletin_core::Environment;

use crate::ConfigError;

/// Channel used for publishing when the broker lists none.
pub const FALLBACK_CHANNEL: &str = "geral";

const DEFAULT_CHANNELS: [&str; 5] = ["geral", "noticias", "tecnologia", "esportes", "games"];

const DEFAULT_CHANNEL_MESSAGES: [&str; 10] = [
    "Ola a todos!",
    "Mensagem automatica.",
    "Testando o canal.",
    "Mensagem de exemplo.",
    "Pub/Sub funcionando.",
    "Mais uma mensagem.",
    "Rust e legal.",
    "Distribuido e melhor.",
    "Broker test.",
    "Fim das mensagens.",
];

const DEFAULT_PRIVATE_MESSAGES: [&str; 8] = [
    "Oi!",
    "Tudo bem?",
    "Mensagem privada teste.",
    "Ola amigo!",
    "Falou!",
    "E ai?",
    "Beleza?",
    "Mensagem direta.",
];

/// The five steady-state operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// One `users` exchange.
    ListUsers,
    /// One `channel` exchange.
    RegisterChannel,
    /// One `channels` exchange.
    ListChannels,
    /// `channels` then `publish`.
    Publish,
    /// `users` then `message`.
    PrivateMessage,
}

impl OperationKind {
    /// Operation for a cycle number: `cycle % 5`.
    ///
    /// Cycles are counted from 1, so the first steady-state operation is
    /// `RegisterChannel`.
    pub fn for_cycle(cycle: u64) -> Self {
        match cycle % 5 {
            0 => Self::ListUsers,
            1 => Self::RegisterChannel,
            2 => Self::ListChannels,
            3 => Self::Publish,
            _ => Self::PrivateMessage,
        }
    }

    /// Number of exchanges the operation performs when it runs to completion.
    pub fn exchanges(self) -> usize {
        match self {
            Self::ListUsers | Self::RegisterChannel | Self::ListChannels => 1,
            Self::Publish | Self::PrivateMessage => 2,
        }
    }
}

/// Canned channel names and message texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    channels: Vec<String>,
    channel_messages: Vec<String>,
    private_messages: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            channels: owned(&DEFAULT_CHANNELS),
            channel_messages: owned(&DEFAULT_CHANNEL_MESSAGES),
            private_messages: owned(&DEFAULT_PRIVATE_MESSAGES),
        }
    }
}

impl Catalog {
    /// Build a catalog. Every list must be non-empty.
    pub fn new(
        channels: Vec<String>,
        channel_messages: Vec<String>,
        private_messages: Vec<String>,
    ) -> Result<Self, ConfigError> {
        if channels.is_empty() {
            return Err(ConfigError::EmptyCatalog { list: "channels" });
        }
        if channel_messages.is_empty() {
            return Err(ConfigError::EmptyCatalog { list: "channel_messages" });
        }
        if private_messages.is_empty() {
            return Err(ConfigError::EmptyCatalog { list: "private_messages" });
        }
        Ok(Self { channels, channel_messages, private_messages })
    }

    /// Channel name to register.
    pub fn channel<E: Environment>(&self, env: &E) -> &str {
        pick(env, &self.channels).unwrap_or(FALLBACK_CHANNEL)
    }

    /// Text to publish on a channel.
    pub fn channel_message<E: Environment>(&self, env: &E) -> &str {
        pick(env, &self.channel_messages).unwrap_or_default()
    }

    /// Text to send privately.
    pub fn private_message<E: Environment>(&self, env: &E) -> &str {
        pick(env, &self.private_messages).unwrap_or_default()
    }
}

/// Uniform choice from `items`. `None` only when `items` is empty.
pub(crate) fn pick<'a, E: Environment>(env: &E, items: &'a [String]) -> Option<&'a str> {
    env.random_index(items.len()).and_then(|i| items.get(i)).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_cycles_through_all_five() {
        let kinds: Vec<_> = (1..=5).map(OperationKind::for_cycle).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::RegisterChannel,
                OperationKind::ListChannels,
                OperationKind::Publish,
                OperationKind::PrivateMessage,
                OperationKind::ListUsers,
            ]
        );
    }

    #[test]
    fn schedule_repeats_every_five() {
        for cycle in 0..50 {
            assert_eq!(OperationKind::for_cycle(cycle), OperationKind::for_cycle(cycle + 5));
        }
    }

    #[test]
    fn two_step_operations() {
        assert_eq!(OperationKind::Publish.exchanges(), 2);
        assert_eq!(OperationKind::PrivateMessage.exchanges(), 2);
        assert_eq!(OperationKind::ListUsers.exchanges(), 1);
    }

    #[test]
    fn empty_catalog_rejected() {
        let result = Catalog::new(vec![], vec!["hi".into()], vec!["oi".into()]);
        assert_eq!(result, Err(ConfigError::EmptyCatalog { list: "channels" }));
    }

    #[test]
    fn default_catalog_contains_fallback_channel() {
        let catalog = Catalog::default();
        assert!(catalog.channels.iter().any(|c| c == FALLBACK_CHANNEL));
    }
}
