use std::time::Duration;

use tokio::net::TcpListener;

use lanshare_core::Message;
use lanshared::transport::send_message;
use lanshared::Delivery;

use crate::*;

/// A → B → C → D, each link one-directional.
fn chain(nodes: &[TestNode]) {
    for pair in nodes.windows(2) {
        pair[0].knows(&pair[1]);
    }
}

#[tokio::test]
async fn search_reaches_end_of_chain_and_answer_goes_straight_home() {
    let nodes = start_nodes(&[&[], &[], &[], &["song.mp3"]]).await.unwrap();
    chain(&nodes);
    let (a, d) = (&nodes[0], &nodes[3]);

    let dispatch = a.node.search("song.mp3", Some(4)).unwrap();
    assert!(!dispatch.local_hit);
    assert_eq!(dispatch.forwarded_to, 1);

    assert!(
        eventually(PATIENCE, || a.node.results().get("song.mp3") == Some(d.addr)).await,
        "origin never recorded the responder"
    );

    // Relays only pass the query along, they learn nothing.
    for relay in &nodes[1..] {
        assert!(relay.node.results().is_empty());
    }
    // D had no route back to A; the FOUND went direct.
    assert!(!d.node.registry().contains(&a.addr));
}

#[tokio::test]
async fn ttl_bounds_the_hop_count() {
    let nodes = start_nodes(&[&[], &[], &[], &[], &["far.iso"]]).await.unwrap();
    chain(&nodes);
    let a = &nodes[0];

    // ttl 3 reaches B, C and D; E is four hops away.
    a.node.search("far.iso", Some(3)).unwrap();
    tokio::time::sleep(SETTLE).await;
    assert_eq!(a.node.results().get("far.iso"), None);

    a.node.search("far.iso", Some(4)).unwrap();
    assert!(eventually(PATIENCE, || a.node.results().get("far.iso") == Some(nodes[4].addr)).await);
}

#[tokio::test]
async fn ttl_one_only_asks_direct_neighbours() {
    let nodes = start_nodes(&[&[], &["near.txt"], &["far.txt"]]).await.unwrap();
    chain(&nodes);
    let a = &nodes[0];

    a.node.search("near.txt", Some(1)).unwrap();
    a.node.search("far.txt", Some(1)).unwrap();

    assert!(eventually(PATIENCE, || a.node.results().get("near.txt") == Some(nodes[1].addr)).await);
    tokio::time::sleep(SETTLE).await;
    assert_eq!(a.node.results().get("far.txt"), None);
}

#[tokio::test]
async fn missing_file_leaves_no_result() {
    let nodes = start_nodes(&[&[], &["a.txt"], &["b.txt"]]).await.unwrap();
    chain(&nodes);

    nodes[0].node.search("nowhere.bin", None).unwrap();
    tokio::time::sleep(SETTLE).await;

    for n in &nodes {
        assert!(n.node.results().get("nowhere.bin").is_none());
    }
}

#[tokio::test]
async fn search_around_a_cycle_terminates() {
    let nodes = start_nodes(&[&[], &[], &[]]).await.unwrap();
    // A → B → C → A
    nodes[0].knows(&nodes[1]);
    nodes[1].knows(&nodes[2]);
    nodes[2].knows(&nodes[0]);

    nodes[0].node.search("ghost.dat", Some(10)).unwrap();
    tokio::time::sleep(SETTLE).await;

    for n in &nodes {
        assert!(n.node.results().is_empty());
    }
}

#[tokio::test]
async fn local_hit_is_recorded_without_network_traffic() {
    let a = TestNode::start(&["mine.pdf"]).await.unwrap();
    let watcher = TcpListener::bind("127.0.0.1:0").await.unwrap();
    a.node.registry().insert(watcher.local_addr().unwrap().into());

    let dispatch = a.node.search("mine.pdf", None).unwrap();
    assert!(dispatch.local_hit);
    assert_eq!(dispatch.forwarded_to, 0);
    assert_eq!(a.node.results().get("mine.pdf"), Some(a.addr));

    let accepted = tokio::time::timeout(Duration::from_millis(300), watcher.accept()).await;
    assert!(accepted.is_err(), "a local hit must not reach the network");
}

#[tokio::test]
async fn later_answer_overwrites_earlier() {
    let nodes = start_nodes(&[&[], &["dup.txt"], &["dup.txt"]]).await.unwrap();
    let (a, b, c) = (&nodes[0], &nodes[1], &nodes[2]);

    a.knows(b);
    a.node.search("dup.txt", Some(1)).unwrap();
    assert!(eventually(PATIENCE, || a.node.results().get("dup.txt") == Some(b.addr)).await);

    // Hand C the same query directly, as if it had arrived by another path.
    let query = Message::search("dup.txt", 1, a.addr).unwrap();
    let sent = a
        .node
        .deliver(vec![Delivery {
            target: c.addr,
            message: query,
        }])
        .await;
    assert_eq!(sent, 1);
    assert!(eventually(PATIENCE, || a.node.results().get("dup.txt") == Some(c.addr)).await);
}

#[tokio::test]
async fn file_added_at_runtime_becomes_findable() {
    let nodes = start_nodes(&[&[], &[]]).await.unwrap();
    nodes[0].knows(&nodes[1]);

    nodes[0].node.search("late.txt", Some(1)).unwrap();
    tokio::time::sleep(SETTLE).await;
    assert!(nodes[0].node.results().get("late.txt").is_none());

    nodes[1].catalog.add("late.txt");
    nodes[0].node.search("late.txt", Some(1)).unwrap();
    assert!(eventually(PATIENCE, || nodes[0].node.results().get("late.txt") == Some(nodes[1].addr)).await);
}

#[tokio::test]
async fn own_query_handed_back_is_not_reflooded() {
    let a = TestNode::start(&[]).await.unwrap();
    let watcher = TcpListener::bind("127.0.0.1:0").await.unwrap();
    a.node.registry().insert(watcher.local_addr().unwrap().into());

    // A peer that knows A by its exact address relays A's query back to it.
    let echo = Message::search("boomerang.iso", 4, a.addr).unwrap();
    send_message(a.addr, &echo, Duration::from_secs(1)).await.unwrap();

    let accepted = tokio::time::timeout(SETTLE, watcher.accept()).await;
    assert!(accepted.is_err(), "own query must not go out again");
    assert!(a.node.results().is_empty());
}

#[tokio::test]
async fn own_query_handed_back_for_a_hosted_file_records_self() {
    let a = TestNode::start(&["boomerang.iso"]).await.unwrap();
    let watcher = TcpListener::bind("127.0.0.1:0").await.unwrap();
    a.node.registry().insert(watcher.local_addr().unwrap().into());

    let echo = Message::search("boomerang.iso", 4, a.addr).unwrap();
    send_message(a.addr, &echo, Duration::from_secs(1)).await.unwrap();

    assert!(eventually(PATIENCE, || a.node.results().get("boomerang.iso") == Some(a.addr)).await);
    let accepted = tokio::time::timeout(SETTLE, watcher.accept()).await;
    assert!(accepted.is_err(), "no FOUND to self over the network");
}
