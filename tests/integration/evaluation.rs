//! Running specifications through the node API.

use thoth_services::PeerDirectory;

use crate::*;

#[tokio::test]
async fn evaluate_reports_each_specification() {
    let catalog = TempCatalog::new("eval");
    catalog
        .seed("interface/queue.rb", "module Queue; end")
        .seed("specification/queue/empty.sh", "exit 0\n")
        .seed("specification/queue/order.sh", "echo out of order >&2; exit 1\n");
    let node = spawn_node(catalog.root(), PeerDirectory::new()).await.unwrap();
    let http = reqwest::Client::new();

    let resp: serde_json::Value = http
        .post(node.url("/evaluate/queue"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["interface"], "queue");
    assert_eq!(resp["passed"], false);
    assert_eq!(resp["results"][0]["name"], "empty");
    assert_eq!(resp["results"][0]["passed"], true);
    assert_eq!(resp["results"][1]["name"], "order");
    assert_eq!(resp["results"][1]["passed"], false);

    assert_eq!(
        node.state.catalog.specifications.passes("queue").await.unwrap(),
        Some(false)
    );
}

#[tokio::test]
async fn interface_without_specifications_passes() {
    let catalog = TempCatalog::new("eval-none");
    catalog.seed("interface/queue.rb", "module Queue; end");
    let node = spawn_node(catalog.root(), PeerDirectory::new()).await.unwrap();

    let resp: serde_json::Value = reqwest::Client::new()
        .post(node.url("/evaluate/queue"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["passed"], true);
    assert!(resp["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_interface_is_not_found() {
    let catalog = TempCatalog::new("eval-unknown");
    let node = spawn_node(catalog.root(), PeerDirectory::new()).await.unwrap();

    let resp = reqwest::Client::new()
        .post(node.url("/evaluate/ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}
