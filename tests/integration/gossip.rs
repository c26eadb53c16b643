use crate::*;

#[tokio::test]
async fn introduction_links_both_sides() {
    let nodes = start_nodes(&[&[], &[]]).await.unwrap();
    let (x, y) = (&nodes[0], &nodes[1]);

    let sent = x.node.introduce(y.addr).await.unwrap();
    assert_eq!(sent, 1, "empty registry plus self");
    assert!(x.node.registry().contains(&y.addr));

    assert!(eventually(PATIENCE, || y.node.registry().contains(&x.addr)).await);
    assert_eq!(y.node.registry().len(), 1);
}

#[tokio::test]
async fn peer_list_spreads_known_addresses() {
    let nodes = start_nodes(&[&[], &[], &[]]).await.unwrap();
    let (x, y, z) = (&nodes[0], &nodes[1], &nodes[2]);

    x.knows(z);
    x.node.introduce(y.addr).await.unwrap();

    // Y learns X from the sender entry and Z from X's registry.
    assert!(
        eventually(PATIENCE, || {
            y.node.registry().contains(&x.addr) && y.node.registry().contains(&z.addr)
        })
        .await
    );
    assert!(!y.node.registry().contains(&y.addr), "never its own peer");
}

#[tokio::test]
async fn repeated_introduction_is_idempotent() {
    let nodes = start_nodes(&[&[], &[]]).await.unwrap();
    let (x, y) = (&nodes[0], &nodes[1]);

    for _ in 0..3 {
        x.node.introduce(y.addr).await.unwrap();
    }
    assert!(eventually(PATIENCE, || y.node.registry().contains(&x.addr)).await);
    tokio::time::sleep(SETTLE).await;
    assert_eq!(y.node.registry().snapshot(), vec![x.addr]);
    assert_eq!(x.node.registry().snapshot(), vec![y.addr]);
}

#[tokio::test]
async fn introduction_makes_search_possible() {
    let nodes = start_nodes(&[&[], &["shared.doc"]]).await.unwrap();
    let (x, y) = (&nodes[0], &nodes[1]);

    x.node.introduce(y.addr).await.unwrap();
    x.node.search("shared.doc", Some(1)).unwrap();
    assert!(eventually(PATIENCE, || x.node.results().get("shared.doc") == Some(y.addr)).await);
}

#[tokio::test]
async fn introduction_to_dead_address_fails_cleanly() {
    let x = TestNode::start(&[]).await.unwrap();
    let dead = {
        let l = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        NodeAddress::from(l.local_addr().unwrap())
    };

    assert!(x.node.introduce(dead).await.is_err());
    assert!(x.node.registry().is_empty());
}
