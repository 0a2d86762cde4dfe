//! Simulated EAP-Identity exchange.
//!
//! Plays both ends in memory: the dispatcher sends an Identity request, the
//! simulated peer answers with `--identity`, and every frame is logged. With
//! `--relay` the session runs as a relay under PEAP and the simulated inner
//! method becomes ready after `--ready-after` deferred rounds.

mod logging;

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use eap_harness::{
    DispatchAction, DispatchError, DispatchStatus, Dispatcher, RecordingHost, SimRelayPeer,
};
use eap_proto::{Frame, MethodType, Vendor};
use eap_server::{
    InstanceRole, MethodRegistry, RelayConfig, RelayCountdown, ServerSession, register_identity,
};
use tracing::{error, info, trace};

#[derive(Parser)]
#[command(name = "eap-sim", about = "Simulated EAP-Identity exchange")]
struct Cli {
    /// Identity the simulated peer answers with
    #[arg(short, long, default_value = "alice")]
    identity: String,

    /// Prompt text carried in the Identity request
    #[arg(short, long)]
    prompt: Option<String>,

    /// Identifier of the first request
    #[arg(long, default_value_t = 0)]
    identifier: u8,

    /// Peer sends its identity unsolicited
    #[arg(long)]
    pick_up: bool,

    /// Run the session as a relay under PEAP
    #[arg(long)]
    relay: bool,

    /// Relay delay rounds
    #[arg(long, default_value_t = RelayConfig::default().initial_rounds)]
    rounds: u32,

    /// Deferred rounds before the inner method has data to relay
    #[arg(long)]
    ready_after: Option<u32>,

    /// Log filter, overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("exchange failed: {e}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<bool, DispatchError> {
    let config = RelayConfig { initial_rounds: cli.rounds, ..RelayConfig::default() };
    let countdown = cli.relay.then(|| RelayCountdown::new(config));

    let mut registry = MethodRegistry::new();
    register_identity(&mut registry, countdown.clone())?;

    let host = Arc::new(match &cli.prompt {
        Some(prompt) => RecordingHost::with_prompt(prompt.as_bytes()),
        None => RecordingHost::new(),
    });
    let peer = Arc::new(SimRelayPeer::new());

    let mut session = ServerSession::new().with_callbacks(host.clone());
    if cli.relay {
        session = session.with_role(InstanceRole::RelayServer).with_relay_channel(peer.clone());
        session.set_current_method(config.protected_method);
    }

    let mut dispatcher =
        Dispatcher::new(Arc::new(registry), session).with_first_identifier(cli.identifier);

    let mut actions = if cli.pick_up {
        let response = respond(cli, cli.identifier)?;
        dispatcher.pick_up(Vendor::IETF, MethodType::IDENTITY, response)?
    } else {
        let actions = dispatcher.start(Vendor::IETF, MethodType::IDENTITY)?;
        report(&actions);
        let identifier = dispatcher.last_request().map_or(cli.identifier, Frame::identifier);
        dispatcher.handle_response(respond(cli, identifier)?)?
    };
    report(&actions);

    let mut rounds = 0;
    while dispatcher.status() == DispatchStatus::Pending {
        rounds += 1;
        if cli.ready_after == Some(rounds) {
            info!(rounds, "inner method ready to relay");
            peer.mark_ready();
        }
        actions = dispatcher.retry()?;
        report(&actions);
    }

    for event in host.events() {
        info!(event, "session log");
    }
    if let Some(countdown) = &countdown {
        info!(
            retransmissions = dispatcher.retransmissions(),
            disabled = countdown.is_disabled(),
            "relay delay summary"
        );
    }

    let success = matches!(dispatcher.status(), DispatchStatus::Finished { success: true });
    let identity = dispatcher.session().identity();
    info!(success, identity = ?identity, "exchange finished");
    Ok(success)
}

fn respond(cli: &Cli, identifier: u8) -> Result<Frame, DispatchError> {
    let identity = cli.identity.as_bytes();
    let frame = Frame::response(Vendor::IETF, MethodType::IDENTITY, identifier, identity)?;
    trace!(frame = %hex::encode(frame.as_bytes()), "peer response");
    Ok(frame)
}

fn report(actions: &[DispatchAction]) {
    for action in actions {
        match action {
            DispatchAction::SendFrame(frame) => {
                info!(identifier = frame.identifier(), len = frame.len(), "send");
                trace!(frame = %hex::encode(frame.as_bytes()), "send bytes");
            },
            DispatchAction::Retransmit(frame) => {
                info!(identifier = frame.identifier(), "retransmit");
            },
            DispatchAction::Finished { success } => {
                info!(success, "method finished");
            },
        }
    }
}
