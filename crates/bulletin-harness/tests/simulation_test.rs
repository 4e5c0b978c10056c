//! Agents over the framed stream transport on turmoil's simulated network.
//!
//! These exercise the real `StreamTransport` (length-prefixed frames,
//! independent send/receive bounds, reconnect after failure) against the
//! model broker, with virtual network time.

use std::time::Duration;

use bulletin_client::{AgentConfig, SessionAgent};
use bulletin_core::{StreamTransport, TransportConfig};
use bulletin_harness::{
    ModelBroker, ServerBehavior, SharedBroker, SimConnector, SimEnv, lock_broker, serve,
};
use bulletin_proto::Service;

const PORT: u16 = 5555;

fn agent(user: &str) -> SessionAgent<SimEnv, StreamTransport<SimConnector>> {
    let transport = StreamTransport::new(
        SimConnector::new(format!("broker:{PORT}")),
        TransportConfig::default(),
    );
    SessionAgent::new(SimEnv::new(), transport, user, AgentConfig::default()).unwrap()
}

fn host_broker(sim: &mut turmoil::Sim<'_>, broker: &SharedBroker, behavior: ServerBehavior) {
    let broker = broker.clone();
    sim.host("broker", move || {
        let broker = broker.clone();
        let behavior = behavior.clone();
        async move { serve(PORT, broker, behavior).await }
    });
}

#[test]
fn schedule_over_simulated_tcp() {
    let mut sim = turmoil::Builder::new().simulation_duration(Duration::from_secs(60)).build();

    let mut model = ModelBroker::new();
    model.add_user("alice");
    let broker = model.shared();
    host_broker(&mut sim, &broker, ServerBehavior::normal());

    sim.client("bot", async move {
        let mut agent = agent("bot_1234");
        agent.run_operations(5).await?;
        assert!(agent.transport().is_connected());
        assert!(agent.clock() > 8);
        Ok(())
    });

    sim.run().unwrap();

    let broker = lock_broker(&broker);
    let clocks: Vec<u64> = broker.received().iter().map(|r| r.clock()).collect();
    assert_eq!(clocks.len(), 8);
    assert!(clocks.windows(2).all(|w| w[0] < w[1]), "clocks not increasing: {clocks:?}");
    assert_eq!(broker.publications().len(), 1);
    assert_eq!(broker.messages()[0].dst, "alice");
}

#[test]
fn silent_service_times_out_and_keeps_tick() {
    let mut sim = turmoil::Builder::new().simulation_duration(Duration::from_secs(120)).build();

    let broker = ModelBroker::new().shared();
    host_broker(&mut sim, &broker, ServerBehavior::normal().silent_on(Service::Users));

    sim.client("bot", async move {
        let env = SimEnv::new();
        let transport = StreamTransport::new(
            SimConnector::new(format!("broker:{PORT}")),
            TransportConfig::default(),
        );
        let mut agent =
            SessionAgent::new(env.clone(), transport, "bot_1234", AgentConfig::default())?;

        agent.run_operations(5).await?;

        let config = AgentConfig::default();
        assert_eq!(
            env.sleeps(),
            vec![
                config.cycle_pause,
                config.cycle_pause,
                config.cycle_pause,
                config.error_cooldown,
                config.error_cooldown,
            ]
        );
        assert_eq!(agent.session().outstanding(), None);
        Ok(())
    });

    sim.run().unwrap();

    let broker = lock_broker(&broker);
    let received = broker.received();
    let services: Vec<Service> = received.iter().map(|r| r.service).collect();
    assert_eq!(
        services,
        vec![
            Service::Login,
            Service::Channel,
            Service::Channels,
            Service::Channels,
            Service::Publish,
            Service::Users,
            Service::Users,
        ]
    );
    assert_eq!(received[6].clock(), received[5].clock() + 1);
}

#[test]
fn latency_within_bounds_completes() {
    let mut sim = turmoil::Builder::new()
        .simulation_duration(Duration::from_secs(60))
        .min_message_latency(Duration::from_millis(100))
        .max_message_latency(Duration::from_millis(100))
        .build();

    let broker = ModelBroker::new().shared();
    host_broker(&mut sim, &broker, ServerBehavior::normal());

    sim.client("bot", async move {
        let mut agent = agent("bot_5678");
        agent.establish().await?;
        agent.step().await?;
        agent.step().await?;
        Ok(())
    });

    sim.run().unwrap();

    let broker = lock_broker(&broker);
    assert_eq!(broker.users(), ["bot_5678".to_string()]);
    assert_eq!(broker.channels().len(), 1);
}

#[test]
fn tight_receive_bound_times_out_and_drops_stream() {
    let mut sim = turmoil::Builder::new()
        .simulation_duration(Duration::from_secs(60))
        .min_message_latency(Duration::from_millis(400))
        .max_message_latency(Duration::from_millis(400))
        .build();

    let broker = ModelBroker::new().shared();
    host_broker(&mut sim, &broker, ServerBehavior::normal());

    sim.client("bot", async move {
        let config = TransportConfig {
            receive_timeout: Duration::from_millis(200),
            ..TransportConfig::default()
        };
        let transport = StreamTransport::new(SimConnector::new(format!("broker:{PORT}")), config);
        let mut agent =
            SessionAgent::new(SimEnv::new(), transport, "bot_9", AgentConfig::default())?;

        let err = agent.exchange(bulletin_proto::RequestBody::Login {
            user: "bot_9".to_string(),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, bulletin_client::SessionError::Transport(ref e) if e.is_timeout()));
        assert!(!agent.transport().is_connected());
        assert_eq!(agent.clock(), 1);
        Ok(())
    });

    sim.run().unwrap();
}
