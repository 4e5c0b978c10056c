//! Agent scenarios over a scripted transport.
//!
//! Every test runs in virtual time: `SimEnv` sleeps return immediately and
//! are recorded, so pauses and cooldowns are asserted rather than waited on.

use std::time::Duration;

use bulletin_client::{
    AgentConfig, FALLBACK_CHANNEL, LoginPolicy, MalformedClockPolicy, OperationKind,
    OperationReport, SessionAgent, SessionError, SessionState,
};
use bulletin_core::{Phase, TransportError};
use bulletin_harness::{
    ModelBroker, ScriptedTransport, SimEnv, lock_broker, sim_env::SIM_EPOCH_SECS,
};
use bulletin_proto::{ReplyData, ReplyEnvelope, Service, StatusKind};

type Agent = SessionAgent<SimEnv, ScriptedTransport>;

const USER: &str = "bot_4242";

fn agent(env: &SimEnv, transport: &ScriptedTransport) -> Agent {
    agent_with(env, transport, AgentConfig::default())
}

fn agent_with(env: &SimEnv, transport: &ScriptedTransport, config: AgentConfig) -> Agent {
    SessionAgent::new(env.clone(), transport.clone(), USER, config).unwrap()
}

fn receive_timeout() -> TransportError {
    TransportError::Timeout { phase: Phase::Receive, after: Duration::from_secs(10) }
}

fn clocks(transport: &ScriptedTransport) -> Vec<u64> {
    transport.requests().iter().map(|r| r.clock()).collect()
}

fn services(transport: &ScriptedTransport) -> Vec<Service> {
    transport.requests().iter().map(|r| r.service).collect()
}

/// Established agent whose next `step` runs `kind`, driven by the broker.
async fn agent_before(
    kind: OperationKind,
    env: &SimEnv,
    transport: &ScriptedTransport,
) -> Agent {
    let mut agent = agent(env, transport);
    agent.establish().await.unwrap();
    while OperationKind::for_cycle(agent.cycle() + 1) != kind {
        agent.step().await.unwrap();
    }
    agent
}

#[tokio::test]
async fn login_reply_clock_is_merged() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::new();
    transport.reply(&ReplyEnvelope::with_clock(5)).reply(&ReplyEnvelope::with_clock(6));

    let mut agent = agent(&env, &transport);
    let login = agent.establish().await.unwrap();
    assert_eq!(login.request_clock, 1);
    assert_eq!(login.clock, 5);
    assert!(agent.session().is_established());

    agent.step().await.unwrap();
    assert_eq!(clocks(&transport), vec![1, 6]);
    assert_eq!(agent.clock(), 6);
}

#[tokio::test]
async fn reply_without_clock_keeps_local_clock() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::new();
    transport.reply(&ReplyEnvelope::default()).reply(&ReplyEnvelope::default());

    let mut agent = agent(&env, &transport);
    agent.establish().await.unwrap();
    assert_eq!(agent.clock(), 1);

    agent.step().await.unwrap();
    assert_eq!(clocks(&transport), vec![1, 2]);
}

#[tokio::test]
async fn stale_reply_clock_never_moves_backwards() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::new();
    transport
        .reply(&ReplyEnvelope::with_clock(9))
        .reply(&ReplyEnvelope::with_clock(2))
        .reply(&ReplyEnvelope::default());

    let mut agent = agent(&env, &transport);
    agent.establish().await.unwrap();
    let stale = agent.step().await;
    assert!(stale.is_ok());
    assert_eq!(agent.clock(), 10);

    agent.step().await.unwrap();
    assert_eq!(clocks(&transport), vec![1, 10, 11]);
}

#[tokio::test]
async fn timeout_keeps_the_tick() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::new();
    transport
        .reply(&ReplyEnvelope::with_clock(6))
        .fail(receive_timeout())
        .reply(&ReplyEnvelope::default());

    let mut agent = agent(&env, &transport);
    agent.establish().await.unwrap();

    let err = agent.step().await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(ref e) if e.is_timeout()));
    assert!(!err.is_fatal());
    assert_eq!(agent.clock(), 7);
    assert_eq!(agent.session().outstanding(), None);

    agent.step().await.unwrap();
    assert_eq!(clocks(&transport), vec![1, 7, 8]);
}

#[tokio::test]
async fn failure_cools_down_longer_than_success_pauses() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::with_broker(ModelBroker::new());
    transport
        .push(bulletin_harness::Scripted::Broker)
        .fail(TransportError::Failure { reason: "connection reset".to_string() });

    let mut agent = agent(&env, &transport);
    agent.run_operations(2).await.unwrap();

    let config = AgentConfig::default();
    assert_eq!(env.sleeps(), vec![config.error_cooldown, config.cycle_pause]);
    assert_eq!(env.elapsed(), config.error_cooldown + config.cycle_pause);
    assert!(config.error_cooldown > config.cycle_pause);
    assert_eq!(agent.cycle(), 2);
}

#[tokio::test]
async fn login_retries_until_answered() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::with_broker(ModelBroker::new());
    transport
        .fail(receive_timeout())
        .fail(TransportError::Failure { reason: "connection refused".to_string() });

    let mut agent = agent(&env, &transport);
    agent.establish().await.unwrap();

    assert_eq!(services(&transport), vec![Service::Login; 3]);
    assert_eq!(clocks(&transport), vec![1, 2, 3]);
    let cooldown = AgentConfig::default().error_cooldown;
    assert_eq!(env.sleeps(), vec![cooldown, cooldown]);

    let broker = lock_broker(transport.broker().unwrap());
    assert_eq!(broker.users(), [USER.to_string()]);
}

#[tokio::test]
async fn rejected_login_continues_by_default() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::new();
    transport.reply(&ReplyEnvelope {
        data: ReplyData { status: Some("erro".to_string()), ..ReplyData::with_clock(3) },
    });

    let mut agent = agent(&env, &transport);
    let login = agent.establish().await.unwrap();
    assert_eq!(login.status_kind(), StatusKind::Rejected);
    assert!(agent.session().is_established());
}

#[tokio::test]
async fn rejected_login_halts_under_halt_policy() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::new();
    transport.reply(&ReplyEnvelope {
        data: ReplyData { status: Some("erro".to_string()), ..ReplyData::with_clock(3) },
    });

    let mut config = AgentConfig::default();
    config.policy.login = LoginPolicy::Halt;
    let mut agent = agent_with(&env, &transport, config);

    let err = agent.run().await.unwrap_err();
    assert!(matches!(err, SessionError::LoginRejected { ref status } if status == "erro"));
    assert_eq!(agent.session().state(), SessionState::Halted);
    assert!(env.sleeps().is_empty());

    let err = agent.step().await.unwrap_err();
    assert_eq!(err, SessionError::Halted);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn malformed_clock_is_skipped_by_default() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::new();
    transport.reply(&ReplyEnvelope::with_clock(4)).reply(&ReplyEnvelope {
        data: ReplyData {
            clock: Some(ciborium::Value::Text("soon".into())),
            ..ReplyData::default()
        },
    });

    let mut agent = agent(&env, &transport);
    agent.establish().await.unwrap();
    agent.step().await.unwrap();
    assert_eq!(agent.clock(), 5);
}

#[tokio::test]
async fn malformed_clock_fails_operation_under_reject_policy() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::new();
    transport.reply(&ReplyEnvelope::with_clock(4)).reply(&ReplyEnvelope {
        data: ReplyData {
            clock: Some(ciborium::Value::Integer((-3).into())),
            ..ReplyData::default()
        },
    });

    let mut config = AgentConfig::default();
    config.policy.malformed_clock = MalformedClockPolicy::Reject;
    let mut agent = agent_with(&env, &transport, config);
    agent.establish().await.unwrap();

    let err = agent.step().await.unwrap_err();
    assert_eq!(err, SessionError::MalformedClock { service: Service::Channel });
    assert!(!err.is_fatal());
    assert_eq!(agent.clock(), 5);
}

#[tokio::test]
async fn steady_state_follows_the_schedule() {
    let env = SimEnv::new();
    let mut broker = ModelBroker::new();
    broker.add_user("alice");
    let transport = ScriptedTransport::with_broker(broker);

    let mut agent = agent(&env, &transport);
    agent.run_operations(5).await.unwrap();

    let expected: usize = (1..=5).map(|c| OperationKind::for_cycle(c).exchanges()).sum();
    assert_eq!(transport.requests().len(), 1 + expected);

    assert_eq!(
        services(&transport),
        vec![
            Service::Login,
            Service::Channel,
            Service::Channels,
            Service::Channels,
            Service::Publish,
            Service::Users,
            Service::Message,
            Service::Users,
        ]
    );

    let clocks = clocks(&transport);
    assert!(clocks.windows(2).all(|w| w[0] < w[1]), "clocks not increasing: {clocks:?}");

    let pause = AgentConfig::default().cycle_pause;
    assert_eq!(env.sleeps(), vec![pause; 5]);

    let broker = lock_broker(transport.broker().unwrap());
    assert_eq!(broker.publications().len(), 1);
    assert_eq!(broker.messages().len(), 1);
    assert_eq!(broker.messages()[0].src, USER);
    assert_eq!(broker.messages()[0].dst, "alice");
}

#[tokio::test]
async fn reports_match_the_schedule() {
    let env = SimEnv::new();
    let mut broker = ModelBroker::new();
    broker.add_user("alice");
    let transport = ScriptedTransport::with_broker(broker);

    let mut agent = agent(&env, &transport);
    agent.establish().await.unwrap();

    for _ in 0..10 {
        let before = transport.requests().len();
        let report = agent.step().await.unwrap();
        let kind = OperationKind::for_cycle(agent.cycle());

        assert_eq!(report.kind(), kind);
        assert_eq!(transport.requests().len() - before, kind.exchanges());
    }
}

#[tokio::test]
async fn broker_ahead_pulls_clock_forward() {
    let env = SimEnv::new();
    let mut broker = ModelBroker::new();
    broker.observe(100);
    let transport = ScriptedTransport::with_broker(broker);

    let mut agent = agent(&env, &transport);
    let login = agent.establish().await.unwrap();
    assert_eq!(login.request_clock, 1);
    assert_eq!(login.clock, 101);

    agent.step().await.unwrap();
    assert_eq!(clocks(&transport), vec![1, 102]);
}

#[tokio::test]
async fn publish_targets_a_listed_channel() {
    let env = SimEnv::new();
    let mut broker = ModelBroker::new();
    broker.add_channel("esportes");
    let transport = ScriptedTransport::with_broker(broker);
    let mut agent = agent_before(OperationKind::Publish, &env, &transport).await;

    let report = agent.step().await.unwrap();
    let OperationReport::Published { channel, status, .. } = report else {
        panic!("expected publish, got {report:?}");
    };
    assert_eq!(status, StatusKind::Accepted);

    let broker = lock_broker(transport.broker().unwrap());
    assert!(broker.channels().contains(&channel));
    assert_eq!(broker.publications()[0].channel, channel);
    assert_eq!(broker.publications()[0].user, USER);
}

#[tokio::test]
async fn malformed_login_clock_establishes_under_reject_policy() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::with_broker(ModelBroker::new());
    transport.reply(&ReplyEnvelope {
        data: ReplyData {
            clock: Some(ciborium::Value::Text("x".into())),
            status: Some("OK".to_string()),
            ..ReplyData::default()
        },
    });

    let mut config = AgentConfig::default();
    config.policy.malformed_clock = MalformedClockPolicy::Reject;
    let mut agent = agent_with(&env, &transport, config);
    agent.establish().await.unwrap();

    assert!(agent.session().is_established());
    assert_eq!(services(&transport), vec![Service::Login]);
    assert!(env.sleeps().is_empty());
}

#[tokio::test]
async fn request_timestamp_is_wall_clock() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::with_broker(ModelBroker::new());

    let mut agent = agent(&env, &transport);
    agent.run_operations(1).await.unwrap();
    agent.step().await.unwrap();

    let requests = transport.requests();
    assert!((requests[0].data.timestamp - SIM_EPOCH_SECS).abs() < f64::EPSILON);
    let pause = AgentConfig::default().cycle_pause.as_secs_f64();
    assert!((requests[2].data.timestamp - (SIM_EPOCH_SECS + pause)).abs() < 1e-6);
}

#[tokio::test]
async fn publish_falls_back_when_no_channels_listed() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::new();
    transport
        .reply(&ReplyEnvelope::default())
        .reply(&ReplyEnvelope::default())
        .reply(&ReplyEnvelope::default())
        .reply(&ReplyEnvelope::default())
        .reply(&ReplyEnvelope::default());

    let mut agent = agent(&env, &transport);
    agent.establish().await.unwrap();
    agent.step().await.unwrap();
    agent.step().await.unwrap();

    let report = agent.step().await.unwrap();
    assert!(matches!(
        report,
        OperationReport::Published { ref channel, .. } if channel == FALLBACK_CHANNEL
    ));

    let publish = transport.requests().pop().unwrap();
    assert_eq!(publish.service, Service::Publish);
    assert_eq!(publish.data.channel.as_deref(), Some(FALLBACK_CHANNEL));
    assert_eq!(publish.data.user.as_deref(), Some(USER));
}

#[tokio::test]
async fn broker_rejection_is_reported_not_failed() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::with_broker(ModelBroker::new());
    let mut agent = agent_before(OperationKind::Publish, &env, &transport).await;

    transport
        .reply(&ReplyEnvelope {
            data: ReplyData { channels: Some(vec!["ghost".to_string()]), ..ReplyData::default() },
        })
        .push(bulletin_harness::Scripted::Broker);

    let report = agent.step().await.unwrap();
    assert!(matches!(
        report,
        OperationReport::Published {
            ref channel,
            status: StatusKind::Rejected,
            ..
        } if channel == "ghost"
    ));
}

#[tokio::test]
async fn private_message_never_targets_self() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::with_broker(ModelBroker::new());
    let mut agent = agent_before(OperationKind::PrivateMessage, &env, &transport).await;
    let before = transport.requests().len();

    let report = agent.step().await.unwrap();
    assert_eq!(report, OperationReport::NoRecipient);
    assert_eq!(transport.requests().len(), before + 1);
    assert_eq!(transport.requests().last().unwrap().service, Service::Users);

    let broker = lock_broker(transport.broker().unwrap());
    assert!(broker.messages().is_empty());
}

#[tokio::test]
async fn failed_listing_abandons_second_exchange() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::with_broker(ModelBroker::new());
    let mut agent = agent_before(OperationKind::Publish, &env, &transport).await;
    let before = transport.requests().len();

    transport.fail(receive_timeout());
    agent.run_operations(1).await.unwrap();

    assert_eq!(transport.requests().len(), before + 1);
    assert_eq!(env.sleeps().last(), Some(&AgentConfig::default().error_cooldown));

    agent.step().await.unwrap();
    let last = transport.requests().pop().unwrap();
    assert_eq!(last.service, Service::Users);
}

#[tokio::test]
async fn execute_issues_one_request() {
    let env = SimEnv::new();
    let transport = ScriptedTransport::with_broker(ModelBroker::new());
    let mut agent = agent(&env, &transport);
    agent.establish().await.unwrap();

    let exchange = agent
        .execute(bulletin_proto::RequestBody::Channel { channel: "noticias".to_string() })
        .await
        .unwrap();
    assert_eq!(exchange.status_kind(), StatusKind::Accepted);

    let exchange = agent.execute(bulletin_proto::RequestBody::Channels).await.unwrap();
    assert_eq!(exchange.channels(), ["noticias".to_string()]);
    assert_eq!(agent.cycle(), 0);
}

#[tokio::test]
async fn invalid_config_rejected() {
    let config = AgentConfig { error_cooldown: Duration::from_secs(1), ..AgentConfig::default() };
    let result = SessionAgent::new(SimEnv::new(), ScriptedTransport::new(), USER, config);
    assert!(result.is_err());
}
