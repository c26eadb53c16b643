use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use lanshare_core::wire::MAX_MESSAGE_BYTES;
use lanshare_core::Message;

use crate::*;

async fn send_raw(target: NodeAddress, bytes: &[u8]) {
    let mut stream = TcpStream::connect(target.socket_addr()).await.unwrap();
    // The node may hang up early on oversize input.
    let _ = stream.write_all(bytes).await;
    let _ = stream.shutdown().await;
}

/// A well-formed FOUND still gets through after junk.
async fn assert_alive(node: &TestNode) {
    let probe = NodeAddress::loopback(1);
    send_raw(node.addr, &Message::found("probe.txt", probe).encode().unwrap()).await;
    assert!(
        eventually(PATIENCE, || node.node.results().get("probe.txt") == Some(probe)).await,
        "node stopped handling messages"
    );
}

#[tokio::test]
async fn garbage_is_dropped_and_node_keeps_serving() {
    let a = TestNode::start(&[]).await.unwrap();

    send_raw(a.addr, b"definitely not json\n").await;
    send_raw(a.addr, b"{\"type\":\"PING\"}\n").await;
    send_raw(a.addr, b"{\"type\":\"SEARCH\",\"filename\":\"x\",\"ttl\":0,\"originAddress\":\"127.0.0.1:1\"}\n").await;
    send_raw(a.addr, b"\n").await;

    assert_alive(&a).await;
    assert_eq!(a.node.results().len(), 1);
    assert!(a.node.registry().is_empty());
}

#[tokio::test]
async fn oversize_message_is_dropped() {
    let a = TestNode::start(&[]).await.unwrap();

    let mut huge = vec![b'a'; MAX_MESSAGE_BYTES + 10];
    huge.push(b'\n');
    send_raw(a.addr, &huge).await;

    assert_alive(&a).await;
}

#[tokio::test]
async fn silent_connection_times_out_without_blocking_others() {
    let a = TestNode::start(&[]).await.unwrap();

    // Connect and say nothing; the read timeout cleans this up.
    let _idle = TcpStream::connect(a.addr.socket_addr()).await.unwrap();

    assert_alive(&a).await;
}

#[tokio::test]
async fn dead_peer_does_not_stop_the_flood() {
    let nodes = start_nodes(&[&[], &["alive.txt"]]).await.unwrap();
    let (a, b) = (&nodes[0], &nodes[1]);

    let dead = {
        let l = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        NodeAddress::from(l.local_addr().unwrap())
    };
    a.node.registry().insert(dead);
    a.knows(b);

    let dispatch = a.node.search("alive.txt", Some(1)).unwrap();
    assert_eq!(dispatch.forwarded_to, 2);
    assert!(eventually(PATIENCE, || a.node.results().get("alive.txt") == Some(b.addr)).await);
}

#[tokio::test]
async fn stopped_node_is_just_unreachable() {
    let nodes = start_nodes(&[&[], &["gone.txt"]]).await.unwrap();
    let mut nodes = nodes.into_iter();
    let a = nodes.next().unwrap();
    let b = nodes.next().unwrap();
    a.knows(&b);
    drop(b);
    tokio::time::sleep(Duration::from_millis(100)).await;

    a.node.search("gone.txt", Some(2)).unwrap();
    tokio::time::sleep(SETTLE).await;
    assert!(a.node.results().is_empty());
    assert_alive(&a).await;
}
