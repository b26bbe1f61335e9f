//! Ticket admission simulator.
//!
//! Runs an issuer and a set of requesters in one process: every requester asks
//! to register under the same topic, waits out its ticket and redeems it,
//! retrying with the fresh ticket it gets back until it is admitted.
//!
//! # Usage
//!
//! ```bash
//! ticket_sim --topic a1b2 --requesters 8 --ticket-base-wait 500
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use disco_common::crypto::PublicKey;
use disco_common::logger::{default_logs_datetime_format, setup_logger, LogLevel};
use disco_common::serializer::Serializer;
use disco_common::time::get_current_time_in_millis;
use disco_common::tokio::spawn_task;
use disco_daemon::discovery::{
    Admission, Endpoint, Node, TicketConfig, TicketIssuer, TicketMessage, TicketScheduler, Topic,
};

/// Disco ticket simulator
#[derive(Parser)]
#[command(name = "ticket_sim")]
#[command(about = "Simulate topic registration through tickets")]
#[command(version, styles = disco_common::get_cli_styles())]
struct Cli {
    /// Topic to register under (hex)
    #[arg(long, default_value = "a1b2")]
    topic: String,

    /// Number of competing requesters
    #[arg(long, default_value_t = 4)]
    requesters: u8,

    /// Redemptions a requester attempts before giving up
    #[arg(long, default_value_t = 16)]
    max_attempts: usize,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Disable colors in logs
    #[arg(long)]
    disable_log_color: bool,

    #[command(flatten)]
    tickets: TicketConfig,
}

fn requester_node(index: u8) -> Result<Node> {
    let endpoint = Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, index)), 30303, Some(30303))
        .context("Invalid requester endpoint")?;
    Ok(Node::new(endpoint, PublicKey::random()))
}

// Register `node` under `topic`, returning the number of redemptions it took
async fn register(
    issuer: Arc<TicketIssuer>,
    topic: Topic,
    node: Node,
    max_attempts: usize,
) -> Result<usize> {
    let request_id = disco_common::crypto::random::secure_random_bytes::<8>().to_vec();
    let (scheduler, mut resends) = TicketScheduler::new();

    let message = issuer.request(&topic, &node, &request_id, get_current_time_in_millis());
    // exercise the wire codec like a real requester would
    let message = TicketMessage::from_bytes(&message.to_bytes())?;
    info!("{} got ticket with wait time {}ms", node, message.wait_time);
    scheduler.schedule(topic.clone(), message);

    for attempt in 1..=max_attempts {
        let Some(resend) = resends.recv().await else {
            bail!("Resend channel closed");
        };

        match issuer.redeem(&topic, &node, &resend.request_id, &resend.ticket, get_current_time_in_millis()) {
            Admission::Admitted => return Ok(attempt),
            Admission::Rejected { reason, fresh } => {
                debug!("{} rejected: {}, retrying in {}ms", node, reason, fresh.wait_time);
                scheduler.schedule(topic.clone(), fresh);
            }
        }
    }

    bail!("{} not admitted after {} attempts", node, max_attempts)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.log_level, cli.disable_log_color, &default_logs_datetime_format())?;

    let topic: Topic = cli.topic.parse()?;
    let issuer = Arc::new(TicketIssuer::from_config(&cli.tickets)?);
    info!(
        "Simulating {} requesters on topic {} (base wait {}ms, spacing {}ms)",
        cli.requesters, topic, cli.tickets.base_wait, cli.tickets.spacing
    );

    let mut handles = Vec::with_capacity(cli.requesters as usize);
    for index in 1..=cli.requesters {
        let node = requester_node(index)?;
        handles.push(spawn_task(
            "ticket-requester",
            register(Arc::clone(&issuer), topic.clone(), node, cli.max_attempts),
        ));
    }

    let mut admitted = 0;
    for handle in handles {
        match handle.await? {
            Ok(attempts) => {
                admitted += 1;
                info!("Requester admitted after {} redemption(s)", attempts);
            }
            Err(e) => warn!("{:#}", e),
        }
    }

    let advertisers = issuer.lookup(&topic, get_current_time_in_millis());
    info!("{}/{} requesters admitted, {} advertisers for topic {}", admitted, cli.requesters, advertisers.len(), topic);
    for node in advertisers {
        info!("  {}", node);
    }

    Ok(())
}
