// End-to-end ticket admission: a requester registers under a topic through
// the issuer, with resends driven by the scheduler.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use disco_common::crypto::PublicKey;
use disco_common::serializer::Serializer;
use disco_daemon::discovery::{
    Admission, Endpoint, Node, RejectReason, TicketConfig, TicketIssuer, TicketMessage,
    TicketScheduler, Topic,
};
use tokio::time::Instant;

fn requester(last_octet: u8) -> Node {
    let endpoint = Endpoint::new(IpAddr::V4(Ipv4Addr::new(192, 168, 0, last_octet)), 30303, Some(30303)).unwrap();
    Node::new(endpoint, PublicKey::random())
}

fn issuer() -> TicketIssuer {
    let config = TicketConfig {
        base_wait: 500,
        spacing: 100,
        ..Default::default()
    };
    TicketIssuer::from_config(&config).unwrap()
}

#[test]
fn test_early_redemption_rejected_then_admitted() {
    let issuer = issuer();
    let topic = Topic::new("a1b2").unwrap();
    let node = requester(1);

    let t1 = issuer.request(&topic, &node, b"R1", 10_000);
    assert_eq!(t1.request_id, b"R1");
    assert_eq!(t1.wait_time, 500);

    // the message survives the wire unchanged
    let t1 = TicketMessage::from_bytes(&t1.to_bytes()).unwrap();

    match issuer.redeem(&topic, &node, b"R1", &t1.ticket, 10_499) {
        Admission::Rejected { reason, fresh } => {
            assert_eq!(reason, RejectReason::TooEarly { remaining: 1 });
            assert_eq!(fresh.request_id, b"R1");
            assert_ne!(fresh.ticket, t1.ticket);
            assert!(fresh.wait_time >= 1);
        }
        Admission::Admitted => panic!("early redemption must not admit"),
    }
    assert!(issuer.lookup(&topic, 10_499).is_empty());

    assert!(issuer.redeem(&topic, &node, b"R1", &t1.ticket, 10_500).is_admitted());
    assert_eq!(issuer.lookup(&topic, 10_500), vec![node]);
}

#[test]
fn test_wait_time_monotonic_under_pressure() {
    let issuer = issuer();
    let topic = Topic::new("a1b2").unwrap();

    let mut previous_deadline = 0;
    for (i, now) in [0u64, 10, 10, 50, 200, 201].into_iter().enumerate() {
        let message = issuer.request(&topic, &requester(i as u8 + 1), b"R", now);
        let deadline = now + message.wait_time;
        assert!(
            deadline >= previous_deadline,
            "ticket {} redeemable at {} before the previous one at {}",
            i,
            deadline,
            previous_deadline
        );
        previous_deadline = deadline;
    }
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_resend_is_admitted() {
    let issuer = issuer();
    let topic = Topic::new("a1b2").unwrap();
    let node = requester(1);

    let start = Instant::now();
    let now = || start.elapsed().as_millis() as u64;

    let (scheduler, mut resends) = TicketScheduler::new();
    scheduler.schedule(topic.clone(), issuer.request(&topic, &node, b"R1", now()));

    let resend = resends.recv().await.unwrap();
    assert!(now() >= 500);
    assert_eq!(resend.request_id, b"R1");
    assert!(issuer.redeem(&topic, &node, &resend.request_id, &resend.ticket, now()).is_admitted());
}

#[tokio::test(start_paused = true)]
async fn test_competing_requesters_all_admitted() {
    let issuer = issuer();
    let topic = Topic::new("a1b2").unwrap();
    let nodes: Vec<Node> = (1..=5).map(requester).collect();

    let start = Instant::now();
    let now = || start.elapsed().as_millis() as u64;

    let mut schedulers = Vec::new();
    for node in &nodes {
        let (scheduler, resends) = TicketScheduler::new();
        scheduler.schedule(topic.clone(), issuer.request(&topic, node, b"R", now()));
        schedulers.push((scheduler, resends));
    }

    for (node, (_scheduler, resends)) in nodes.iter().zip(schedulers.iter_mut()) {
        let resend = tokio::time::timeout(Duration::from_secs(10), resends.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(issuer.redeem(&topic, node, &resend.request_id, &resend.ticket, now()).is_admitted());
    }

    assert_eq!(issuer.lookup(&topic, now()).len(), nodes.len());
}
