//! Pulling entries from neighbors into a local catalog.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use thoth_core::report::Located;
use thoth_services::{PeerDirectory, SyncTarget};

use crate::*;

fn queue() -> SyncTarget {
    SyncTarget::Interface("queue".to_string())
}

#[tokio::test]
async fn only_missing_entries_are_fetched() {
    let remote = TempCatalog::new("dedup-remote");
    remote
        .seed("interface/queue.rb", "module Queue; end")
        .seed("specification/queue/a.rb", "remote a")
        .seed("specification/queue/b.rb", "remote b");
    let local = TempCatalog::new("dedup-local");
    local
        .seed("interface/queue.rb", "module Queue; end")
        .seed("specification/queue/a.rb", "local a");

    let node = spawn_node(remote.root(), PeerDirectory::new()).await.unwrap();
    let report = engine(local.root(), peers(&[&node.addr]))
        .sync(queue())
        .await
        .unwrap();

    let q = report.interface("queue").unwrap();
    assert_eq!(q.located, Located::Local);
    assert!(q.specifications.found);
    assert_eq!(q.specifications.fetched, vec!["b".to_string()]);
    assert!(!q.implementations.found);
    assert!(report.issues.is_empty(), "issues: {:?}", report.issues);

    assert_eq!(local.read("specification/queue/a.rb"), "local a");
    assert_eq!(local.read("specification/queue/b.rb"), "remote b");
}

#[tokio::test]
async fn unreachable_neighbor_does_not_stop_the_sync() {
    let remote = TempCatalog::new("iso-remote");
    remote
        .seed("interface/queue.rb", "module Queue; end")
        .seed("implementation/queue/fifo.rb", "class Fifo; end");
    let local = TempCatalog::new("iso-local");

    let node = spawn_node(remote.root(), PeerDirectory::new()).await.unwrap();
    let dead = dead_neighbor();
    let report = engine(local.root(), peers(&[&dead, &node.addr]))
        .sync(queue())
        .await
        .unwrap();

    assert!(report.found());
    let q = report.interface("queue").unwrap();
    assert_eq!(
        q.located,
        Located::Fetched {
            from: node.addr.clone()
        }
    );
    assert_eq!(q.implementations.fetched, vec!["fifo".to_string()]);

    assert_eq!(local.read("interface/queue.rb"), "module Queue; end");
    assert_eq!(local.read("implementation/queue/fifo.rb"), "class Fifo; end");

    // One skip per stage, all for the dead neighbor.
    assert_eq!(report.issues.len(), 3);
    assert!(report.issues.iter().all(|i| i.neighbor == dead));
}

#[tokio::test]
async fn wildcard_covers_every_listed_interface() {
    let remote = TempCatalog::new("all-remote");
    remote
        .seed("interface/x.rb", "module X; end")
        .seed("interface/y.rb", "module Y; end")
        .seed("implementation/x/one.rb", "x one")
        .seed("specification/y/check.rb", "y check");
    let local = TempCatalog::new("all-local");

    let node = spawn_node(remote.root(), PeerDirectory::new()).await.unwrap();
    let report = engine(local.root(), peers(&[&node.addr]))
        .sync(SyncTarget::All)
        .await
        .unwrap();

    let names: Vec<&str> = report.interfaces.iter().map(|r| r.interface.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert!(report.interfaces.iter().all(|r| r.found()));

    assert_eq!(
        local.files_under(""),
        vec![
            "implementation/x/one.rb",
            "interface/x.rb",
            "interface/y.rb",
            "specification/y/check.rb",
        ]
    );
}

#[tokio::test]
async fn neighbor_listed_twice_writes_each_entry_once() {
    let remote = TempCatalog::new("twice-remote");
    remote
        .seed("interface/queue.rb", "module Queue; end")
        .seed("specification/queue/a.rb", "a")
        .seed("specification/queue/b.rb", "b");
    let local = TempCatalog::new("twice-local");

    let node = spawn_node(remote.root(), PeerDirectory::new()).await.unwrap();
    let engine = engine(local.root(), peers(&[&node.addr, &node.addr]));
    let report = engine.sync(queue()).await.unwrap();

    let q = report.interface("queue").unwrap();
    assert_eq!(q.specifications.fetched, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(engine.catalog().specifications.len().await.unwrap(), 2);
    assert_eq!(
        local.files_under("specification"),
        vec!["specification/queue/a.rb", "specification/queue/b.rb"]
    );

    // A second run has nothing left to do.
    let again = engine.sync(queue()).await.unwrap();
    let q = again.interface("queue").unwrap();
    assert!(q.specifications.fetched.is_empty());
    assert!(q.implementations.fetched.is_empty());
}

#[tokio::test]
async fn first_neighbor_in_order_wins() {
    let first = TempCatalog::new("order-first");
    first
        .seed("interface/queue.rb", "first queue")
        .seed("specification/queue/a.rb", "first a");
    let second = TempCatalog::new("order-second");
    second
        .seed("interface/queue.rb", "second queue")
        .seed("specification/queue/a.rb", "second a")
        .seed("implementation/queue/fifo.rb", "second fifo");
    let local = TempCatalog::new("order-local");

    let n1 = spawn_node(first.root(), PeerDirectory::new()).await.unwrap();
    let n2 = spawn_node(second.root(), PeerDirectory::new()).await.unwrap();
    let report = engine(local.root(), peers(&[&n1.addr, &n2.addr]))
        .sync(queue())
        .await
        .unwrap();
    assert!(report.issues.is_empty(), "issues: {:?}", report.issues);

    let q = report.interface("queue").unwrap();
    assert_eq!(
        q.located,
        Located::Fetched {
            from: n1.addr.clone()
        }
    );
    assert_eq!(q.specifications.fetched, vec!["a".to_string()]);
    assert_eq!(local.read("interface/queue.rb"), "first queue");
    assert_eq!(local.read("specification/queue/a.rb"), "first a");

    // Later neighbors still fill in what earlier ones lack.
    assert_eq!(q.implementations.fetched, vec!["fifo".to_string()]);
    assert_eq!(local.read("implementation/queue/fifo.rb"), "second fifo");
}

#[tokio::test]
async fn interface_absent_everywhere_fetches_nothing() {
    let remote = TempCatalog::new("absent-remote");
    remote
        .seed("interface/queue.rb", "module Queue; end")
        .seed("specification/queue/a.rb", "a");
    let local = TempCatalog::new("absent-local");

    let node = spawn_node(remote.root(), PeerDirectory::new()).await.unwrap();
    let report = engine(local.root(), peers(&[&node.addr]))
        .sync(SyncTarget::Interface("ghost".to_string()))
        .await
        .unwrap();

    assert!(!report.found());
    let ghost = report.interface("ghost").unwrap();
    assert_eq!(ghost.located, Located::NotFound);
    assert!(!ghost.specifications.found);
    assert!(!ghost.implementations.found);
    assert!(report.issues.is_empty());
    assert!(local.files_under("").is_empty());
}

#[tokio::test]
async fn new_implementation_invalidates_specification_results() {
    let remote = TempCatalog::new("inval-remote");
    remote
        .seed("interface/queue.rb", "module Queue; end")
        .seed("implementation/queue/fifo.rb", "class Fifo; end");
    let local = TempCatalog::new("inval-local");
    local
        .seed("interface/queue.rb", "module Queue; end")
        .seed("specification/queue/check.sh", "exit 0\n");

    let node = spawn_node(remote.root(), PeerDirectory::new()).await.unwrap();
    let engine = engine(local.root(), peers(&[&node.addr]));
    let runner = sh_runner(local.root());

    let spec = engine
        .catalog()
        .specifications
        .find_by_interface_and_name("queue", "check")
        .await
        .unwrap()
        .unwrap();
    assert!(runner.evaluate(&spec).await.unwrap());
    assert_eq!(spec.last_result(), Some(true));

    let report = engine.sync(queue()).await.unwrap();
    assert_eq!(
        report.interface("queue").unwrap().implementations.fetched,
        vec!["fifo".to_string()]
    );
    assert_eq!(spec.last_result(), None);

    // Nothing new the second time, so a fresh result survives.
    assert!(runner.evaluate(&spec).await.unwrap());
    engine.sync(queue()).await.unwrap();
    assert_eq!(spec.last_result(), Some(true));
}

#[tokio::test]
async fn bad_names_and_malformed_listings_are_skipped() {
    let router = Router::new()
        .route(
            "/specifications/queue",
            get(|| async {
                Json(json!({"specifications": [{"name": "queue", "files": [
                    {"name": "../evil", "path": "specification/queue/evil.rb"},
                    {"name": ".hidden"},
                    {"name": "ok", "path": "specification/queue/ok.py"}
                ]}]}))
            }),
        )
        .route("/specifications/queue/ok", get(|| async { "print('ok')" }))
        .route("/implementations/queue", get(|| async { "this is not json" }));
    let (addr, task) = spawn_router(router).await.unwrap();

    let local = TempCatalog::new("bad-local");
    local.seed("interface/queue.rb", "module Queue; end");

    let report = engine(local.root(), peers(&[&addr]))
        .sync(queue())
        .await
        .unwrap();
    task.abort();

    let q = report.interface("queue").unwrap();
    assert_eq!(q.specifications.fetched, vec!["ok".to_string()]);
    assert!(!q.implementations.found);
    assert_eq!(local.read("specification/queue/ok.py"), "print('ok')");
    assert_eq!(
        local.files_under(""),
        vec!["interface/queue.rb", "specification/queue/ok.py"]
    );

    let stages: Vec<&str> = report.issues.iter().map(|i| i.stage.as_str()).collect();
    assert_eq!(stages, vec!["specification", "specification", "implementation"]);
    assert!(report.issues[2].reason.starts_with("malformed reply"));
}
