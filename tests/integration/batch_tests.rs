use crate::common::{config, fast_settings, mount_cyclic_site, mount_page};
use depthcrawl::crawler::{crawl, Coordinator, ExecutionMode};
use depthcrawl::storage::{BatchContextStore, BatchQueue, SqliteBatchStore};
use depthcrawl::{CrawlFlavor, HttpFetcher, NodeState};
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

fn sqlite_coordinator(path: &Path, depth: u32) -> Coordinator<HttpFetcher, SqliteBatchStore> {
    Coordinator::new(
        config(&fast_settings(depth)),
        HttpFetcher::new().unwrap(),
        SqliteBatchStore::new(path).unwrap(),
    )
}

/// Same cyclic site as `mount_cyclic_site`, but every page is expected twice
async fn mount_cyclic_site_twice(server: &MockServer) {
    mount_page(server, "/", &["/a", "/b"], 2).await;
    mount_page(server, "/a", &["/", "/b", "/a1"], 2).await;
    mount_page(server, "/b", &["/a", "/"], 2).await;
    mount_page(server, "/a1", &["/"], 2).await;
}

#[tokio::test]
async fn test_batched_matches_synchronous() {
    let server = MockServer::start().await;
    mount_cyclic_site_twice(&server).await;
    let seed = format!("{}/", server.uri());
    let dir = TempDir::new().unwrap();

    let expected = crawl(config(&fast_settings(3)), &seed, CrawlFlavor::Content)
        .await
        .unwrap();

    let mut coordinator = sqlite_coordinator(&dir.path().join("batch.db"), 3);
    let outcome = coordinator
        .run(&seed, CrawlFlavor::Content, ExecutionMode::Batched)
        .await
        .unwrap();
    assert!(outcome.deferred);
    let run_id = outcome.run_id.unwrap();

    coordinator.run_pending(None).await.unwrap();
    let report = coordinator.collect(run_id).unwrap().unwrap();

    assert_eq!(report, expected);
}

#[tokio::test]
async fn test_link_flavor_batched_matches_synchronous() {
    let server = MockServer::start().await;
    // Depth 1 link crawl fetches only the seed; the leaves are recorded unfetched
    mount_page(&server, "/", &["/x", "/y", "/x"], 2).await;
    mount_page(&server, "/x", &[], 0).await;
    mount_page(&server, "/y", &[], 0).await;
    let seed = format!("{}/", server.uri());
    let dir = TempDir::new().unwrap();

    let expected = crawl(config(&fast_settings(1)), &seed, CrawlFlavor::Links)
        .await
        .unwrap();

    let mut coordinator = sqlite_coordinator(&dir.path().join("batch.db"), 1);
    let run_id = coordinator
        .run(&seed, CrawlFlavor::Links, ExecutionMode::Batched)
        .await
        .unwrap()
        .run_id
        .unwrap();
    coordinator.run_pending(None).await.unwrap();
    let report = coordinator.collect(run_id).unwrap().unwrap();

    assert_eq!(report, expected);
    assert_eq!(
        report.links,
        vec![format!("{}/x", server.uri()), format!("{}/y", server.uri())]
    );
}

#[tokio::test]
async fn test_steps_replay_preorder() {
    let server = MockServer::start().await;
    mount_cyclic_site(&server).await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    let mut coordinator = sqlite_coordinator(&dir.path().join("batch.db"), 3);
    let run_id = coordinator
        .run(&format!("{}/", base), CrawlFlavor::Content, ExecutionMode::Batched)
        .await
        .unwrap()
        .run_id
        .unwrap();

    let mut visited = Vec::new();
    while let Some(step) = coordinator.process_step().await.unwrap() {
        assert_eq!(step.run_id, run_id);
        visited.push((step.url, step.state));
    }

    let fetched: Vec<_> = visited
        .iter()
        .filter(|(_, state)| *state != NodeState::Skipped)
        .map(|(url, _)| url.clone())
        .collect();
    assert_eq!(
        fetched,
        vec![
            format!("{}/", base),
            format!("{}/a", base),
            format!("{}/b", base),
            format!("{}/a1", base),
        ]
    );
    // The copy of /b scheduled by the seed is claimed already by the time it runs
    assert_eq!(visited.last().unwrap().1, NodeState::Skipped);
}

#[tokio::test]
async fn test_run_survives_store_reopen() {
    let server = MockServer::start().await;
    mount_cyclic_site(&server).await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("batch.db");

    let run_id = {
        let mut coordinator = sqlite_coordinator(&db, 3);
        let run_id = coordinator
            .run(&format!("{}/", base), CrawlFlavor::Content, ExecutionMode::Batched)
            .await
            .unwrap()
            .run_id
            .unwrap();
        assert_eq!(coordinator.run_pending(Some(2)).await.unwrap(), 2);
        run_id
    };

    let mut coordinator = sqlite_coordinator(&db, 3);
    assert!(coordinator.collect(run_id).unwrap().is_none());
    assert_eq!(coordinator.run_pending(None).await.unwrap(), 3);

    let report = coordinator.collect(run_id).unwrap().unwrap();
    let texts: Vec<_> = report.contents.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["/", "/a", "/b", "/a1"]);
    assert_eq!(report.pages_fetched, 4);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_cancel_keeps_partial_report() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a", "/b"], 1).await;
    mount_page(&server, "/a", &[], 0).await;
    mount_page(&server, "/b", &[], 0).await;
    let dir = TempDir::new().unwrap();

    let mut coordinator = sqlite_coordinator(&dir.path().join("batch.db"), 2);
    let run_id = coordinator
        .run(
            &format!("{}/", server.uri()),
            CrawlFlavor::Content,
            ExecutionMode::Batched,
        )
        .await
        .unwrap()
        .run_id
        .unwrap();

    let first = coordinator.process_step().await.unwrap().unwrap();
    assert_eq!(first.scheduled, 2);
    assert_eq!(coordinator.cancel_run(run_id).unwrap(), 2);

    assert_eq!(coordinator.run_pending(None).await.unwrap(), 0);
    let report = coordinator.collect(run_id).unwrap().unwrap();
    assert!(report.cancelled);
    assert_eq!(report.contents.len(), 1);
    assert_eq!(report.contents[0].text, "/");

    // Collecting forgets the run
    assert!(coordinator.backend().run_ids().unwrap().is_empty());
}

#[tokio::test]
async fn test_interrupted_step_is_redone_by_next_driver() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a"], 1).await;
    mount_page(&server, "/a", &[], 1).await;
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("batch.db");

    let run_id = {
        let mut coordinator = sqlite_coordinator(&db, 1);
        let run_id = coordinator
            .run(&format!("{}/", server.uri()), CrawlFlavor::Content, ExecutionMode::Batched)
            .await
            .unwrap()
            .run_id
            .unwrap();
        // A driver claims the seed step and exits before finishing it
        let claimed = coordinator.backend().peek().unwrap().unwrap();
        assert_eq!(claimed.step.run_id, run_id);
        run_id
    };

    let mut coordinator = sqlite_coordinator(&db, 1);
    assert_eq!(coordinator.backend().pending(run_id).unwrap(), 1);
    assert_eq!(coordinator.run_pending(None).await.unwrap(), 2);

    let report = coordinator.collect(run_id).unwrap().unwrap();
    let texts: Vec<_> = report.contents.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["/", "/a"]);
    assert!(!report.incomplete);
}
