//! The catalog wire protocol, served by one node and read by another.

use thoth_services::{NeighborClient, PeerDirectory, Reply};

use crate::*;

fn seeded(label: &str) -> TempCatalog {
    let catalog = TempCatalog::new(label);
    catalog
        .seed("interface/queue.rb", "module Queue; end")
        .seed("implementation/queue/fifo.rb", "class Fifo; end")
        .seed("implementation/queue/lifo.rb", "class Lifo; end")
        .seed("specification/queue/order.rb", "order spec");
    catalog
}

#[tokio::test]
async fn interface_descriptor_and_content() {
    let remote = seeded("proto-iface");
    let node = spawn_node(remote.root(), PeerDirectory::new()).await.unwrap();
    let client = NeighborClient::connect(&node.addr, test_timeouts()).await.unwrap();

    let descriptor = client.check_interface_exists("queue").await.found().unwrap();
    assert_eq!(descriptor.name, "queue");
    assert_eq!(descriptor.path.as_deref(), Some("interface/queue.rb"));
    assert_eq!(descriptor.extension(), Some("rb"));

    let content = client.fetch_interface_content("queue").await.found().unwrap();
    assert_eq!(&content[..], b"module Queue; end");

    assert_eq!(client.check_interface_exists("ghost").await, Reply::NotFound);
    assert_eq!(client.fetch_interface_content("ghost").await, Reply::NotFound);
}

#[tokio::test]
async fn listings_and_entry_content() {
    let remote = seeded("proto-list");
    let node = spawn_node(remote.root(), PeerDirectory::new()).await.unwrap();
    let client = NeighborClient::connect(&node.addr, test_timeouts()).await.unwrap();

    let interfaces = client.list_interfaces().await.found().unwrap();
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].name, "queue");

    let impls = client.list_implementations("queue").await.found().unwrap();
    let names: Vec<&str> = impls.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["fifo", "lifo"]);
    assert_eq!(impls[0].path.as_deref(), Some("implementation/queue/fifo.rb"));

    let specs = client.list_specifications("queue").await.found().unwrap();
    assert_eq!(specs.len(), 1);

    let body = client
        .fetch_implementation_content("queue", "lifo")
        .await
        .found()
        .unwrap();
    assert_eq!(&body[..], b"class Lifo; end");
    let body = client
        .fetch_specification_content("queue", "order")
        .await
        .found()
        .unwrap();
    assert_eq!(&body[..], b"order spec");

    // Unknown interfaces list empty; unknown entries are absent.
    assert_eq!(client.list_specifications("ghost").await, Reply::Found(Vec::new()));
    assert_eq!(
        client.fetch_implementation_content("queue", "ghost").await,
        Reply::NotFound
    );
}

#[tokio::test]
async fn overview_and_status() {
    let remote = seeded("proto-status");
    let dead = dead_neighbor();
    let node = spawn_node(remote.root(), peers(&[&dead])).await.unwrap();

    let overview: serde_json::Value = reqwest::get(node.url("/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(overview["interfaces"].as_array().unwrap().len(), 1);
    assert_eq!(overview["implementations"][0]["name"], "queue");
    assert_eq!(
        overview["implementations"][0]["files"].as_array().unwrap().len(),
        2
    );
    assert_eq!(overview["specifications"][0]["files"][0]["name"], "order");

    let status: serde_json::Value = reqwest::get(node.url("/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["interfaces"], 1);
    assert_eq!(status["implementations"], 2);
    assert_eq!(status["specifications"], 1);
    assert_eq!(status["neighbors"], 1);

    let neighbors: serde_json::Value = reqwest::get(node.url("/neighbors"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(neighbors["neighbors"][0]["port"], dead.port);
}

#[tokio::test]
async fn sync_over_http() {
    let remote = seeded("proto-sync-remote");
    let local = TempCatalog::new("proto-sync-local");

    let upstream = spawn_node(remote.root(), PeerDirectory::new()).await.unwrap();
    let node = spawn_node(local.root(), peers(&[&upstream.addr])).await.unwrap();
    let http = reqwest::Client::new();

    let report: serde_json::Value = http
        .post(node.url("/sync"))
        .json(&serde_json::json!({"interface": "queue"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let q = &report["interfaces"][0];
    assert_eq!(q["located"]["state"], "fetched");
    assert_eq!(q["implementations"]["fetched"].as_array().unwrap().len(), 2);
    assert_eq!(local.read("implementation/queue/fifo.rb"), "class Fifo; end");

    // The node's own registries saw the writes.
    assert_eq!(node.state.catalog.implementations.len().await.unwrap(), 2);

    let resp = http
        .post(node.url("/sync"))
        .json(&serde_json::json!({"interface": "../etc"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    // An empty body syncs everything.
    let resp = http.post(node.url("/sync")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}
