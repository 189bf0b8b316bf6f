//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the combination oracle and run
//! the full load, pair, merge and save cycle against a snapshot on disk.

use infc::config::{Config, CrawlerConfig, OracleConfig, OutputConfig, RetryConfig};
use infc::crawler::{Coordinator, CrawlCommand};
use infc::graph::{GraphError, GraphSnapshot, GraphStore, JsonFileStore, SnapshotStore};
use infc::output::ProgressReporter;
use infc::InfcError;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration pointing at the mock oracle
fn create_test_config(base_url: &str, snapshot_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            chunk_size: 1000,
            workers: 8,
        },
        retry: RetryConfig {
            max_attempts: 2,
            bound_network_failures: true,
            delay_ms: 0,
        },
        oracle: OracleConfig {
            base_url: base_url.to_string(),
            ..OracleConfig::default()
        },
        output: OutputConfig {
            snapshot_path: snapshot_path.display().to_string(),
        },
    }
}

/// Writes a snapshot holding `texts` and no recipes
fn seed_snapshot(dir: &TempDir, texts: &[(&str, &str)]) -> PathBuf {
    let mut graph = GraphStore::new();
    for (text, icon) in texts {
        graph.append_element(text, icon).unwrap();
    }
    let path = dir.path().join("data.json");
    JsonFileStore::new(&path).save(&graph.snapshot()).unwrap();
    path
}

fn coordinator(config: Config) -> Coordinator {
    let store = Arc::new(JsonFileStore::new(&config.output.snapshot_path));
    Coordinator::new(config, store, ProgressReporter::hidden()).unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

fn combination(result: &str, emoji: &str, is_new: bool) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "result": result,
        "emoji": emoji,
        "isNew": is_new,
    }))
}

#[tokio::test]
async fn test_pair_from_to_discovers_element() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let snapshot = seed_snapshot(&dir, &[("Water", "💧"), ("Fire", "🔥")]);

    Mock::given(method("GET"))
        .and(path("/pair"))
        .and(query_param("first", "Water"))
        .and(query_param("second", "Fire"))
        .respond_with(combination("Steam", "💨", false))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &snapshot);
    let report = coordinator(config)
        .run(&CrawlCommand::PairFromTo { from: 0, to: 2 })
        .await
        .unwrap();

    assert_eq!(report.status.total_attempted, 1);
    assert_eq!(report.status.new_elements_found, 1);
    assert_eq!(report.status.new_recipes_found, 1);
    assert_eq!(report.status.new_discoveries, 0);
    assert_eq!(report.elements, 3);
    assert_eq!(report.recipes, 1);
    assert!(!report.interrupted);

    let saved = read_json(&snapshot);
    assert_eq!(saved["elements"][2]["text"], "Steam");
    assert_eq!(saved["elements"][2]["icon"], "💨");
    assert_eq!(saved["recipes"]["0-1"], 2);
}

#[tokio::test]
async fn test_nothing_leaves_graph_unchanged() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let snapshot = seed_snapshot(&dir, &[("Water", "💧"), ("Fire", "🔥")]);
    let before = std::fs::read(&snapshot).unwrap();

    Mock::given(method("GET"))
        .and(path("/pair"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "Nothing" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &snapshot);
    let report = coordinator(config)
        .run(&CrawlCommand::PairFromTo { from: 0, to: 2 })
        .await
        .unwrap();

    assert_eq!(report.status.total_attempted, 1);
    assert_eq!(report.status.new_elements_found, 0);
    assert_eq!(report.status.new_recipes_found, 0);
    assert_eq!(std::fs::read(&snapshot).unwrap(), before);
}

#[tokio::test]
async fn test_empty_range_is_rejected_without_requests() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let snapshot = seed_snapshot(&dir, &[("Water", "💧"), ("Fire", "🔥")]);

    Mock::given(method("GET"))
        .respond_with(combination("Steam", "💨", false))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &snapshot);
    let result = coordinator(config)
        .run(&CrawlCommand::PairFromTo { from: 1, to: 1 })
        .await;

    assert!(matches!(result, Err(InfcError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_rerun_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let snapshot = seed_snapshot(&dir, &[("Water", "💧"), ("Fire", "🔥")]);

    Mock::given(method("GET"))
        .and(path("/pair"))
        .respond_with(combination("Steam", "💨", false))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &snapshot);
    let command = CrawlCommand::PairFromTo { from: 0, to: 2 };

    coordinator(config.clone()).run(&command).await.unwrap();
    let after_first = read_json(&snapshot);

    let report = coordinator(config).run(&command).await.unwrap();
    assert_eq!(report.status.total_attempted, 0);
    assert_eq!(report.status.already_known, 1);
    assert_eq!(read_json(&snapshot), after_first);
}

#[tokio::test]
async fn test_pair_all_for_pairs_new_elements_too() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let snapshot = seed_snapshot(&dir, &[("Water", "💧"), ("Fire", "🔥"), ("Earth", "🌍")]);

    Mock::given(method("GET"))
        .and(path("/pair"))
        .and(query_param("first", "Water"))
        .respond_with(combination("Mud", "🟫", false))
        .expect(4)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &snapshot);
    let report = coordinator(config)
        .run(&CrawlCommand::PairAllFor {
            name: "Water".to_string(),
            non_sensitive: false,
        })
        .await
        .unwrap();

    // Water pairs with the three seeds, then with Mud once Mud exists
    assert_eq!(report.elements, 4);
    assert_eq!(report.recipes, 4);
    assert_eq!(report.status.total_attempted, 4);
    assert_eq!(report.status.new_elements_found, 1);
    assert_eq!(report.chunks, 2);

    let saved = read_json(&snapshot);
    for key in ["0-0", "0-1", "0-2", "0-3"] {
        assert_eq!(saved["recipes"][key], 3, "recipe {}", key);
    }
}

#[tokio::test]
async fn test_unknown_target_is_rejected() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let snapshot = seed_snapshot(&dir, &[("Water", "💧")]);

    let config = create_test_config(&mock_server.uri(), &snapshot);
    let result = coordinator(config)
        .run(&CrawlCommand::PairAllFor {
            name: "water".to_string(),
            non_sensitive: false,
        })
        .await;

    assert!(matches!(result, Err(InfcError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_random_pairs_on_single_element_collapse() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let snapshot = seed_snapshot(&dir, &[("Water", "💧")]);

    Mock::given(method("GET"))
        .and(path("/pair"))
        .and(query_param("first", "Water"))
        .and(query_param("second", "Water"))
        .respond_with(combination("Lake", "🌊", false))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &snapshot);
    let report = coordinator(config)
        .run(&CrawlCommand::RandomPair {
            count: 10,
            infinite: false,
        })
        .await
        .unwrap();

    assert_eq!(report.recipes, 1);
    assert_eq!(report.elements, 2);
    assert_eq!(report.status.new_recipes_found, 1);
    assert_eq!(report.status.new_elements_found, 1);
    assert_eq!(report.status.processed(), 10);

    let saved = read_json(&snapshot);
    assert_eq!(saved["recipes"]["0-0"], 1);
}

#[tokio::test]
async fn test_unavailable_oracle_skips_pair() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let snapshot = seed_snapshot(&dir, &[("Water", "💧"), ("Fire", "🔥")]);

    Mock::given(method("GET"))
        .and(path("/pair"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &snapshot);
    let report = coordinator(config)
        .run(&CrawlCommand::PairFromTo { from: 0, to: 2 })
        .await
        .unwrap();

    assert_eq!(report.status.unavailable, 1);
    assert_eq!(report.status.total_attempted, 0);
    assert_eq!(report.recipes, 0);
    assert_eq!(report.chunks, 1);

    let saved = JsonFileStore::new(&snapshot).load().unwrap();
    assert_eq!(saved.elements.len(), 2);
    assert!(saved.recipes.is_empty());
}

#[tokio::test]
async fn test_legacy_emoji_field_is_read() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("data.json");
    std::fs::write(
        &snapshot,
        r#"{"elements": [{"text": "Water", "emoji": "💧"}, {"text": "Fire", "emoji": "🔥"}], "recipes": {}}"#,
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/pair"))
        .respond_with(combination("Steam", "💨", true))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &snapshot);
    let report = coordinator(config)
        .run(&CrawlCommand::PairFromTo { from: 0, to: 2 })
        .await
        .unwrap();
    assert_eq!(report.status.new_discoveries, 1);

    let saved = read_json(&snapshot);
    assert_eq!(saved["elements"][0]["icon"], "💧");
    assert!(saved["elements"][0].get("emoji").is_none());
}

/// Oracle that names each result after its inputs, optionally raising a stop
/// flag on the first request it answers
struct JoiningOracle {
    stop: Option<Arc<AtomicBool>>,
}

impl Respond for JoiningOracle {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if let Some(stop) = &self.stop {
            stop.store(true, Ordering::SeqCst);
        }
        let mut first = String::new();
        let mut second = String::new();
        for (key, value) in request.url.query_pairs() {
            match key.as_ref() {
                "first" => first = value.into_owned(),
                "second" => second = value.into_owned(),
                _ => {}
            }
        }
        combination(&format!("{}{}", first, second), "", false)
    }
}

#[tokio::test]
async fn test_resume_after_stop_keeps_saved_progress() {
    let dir = TempDir::new().unwrap();
    let snapshot = seed_snapshot(&dir, &[("Water", ""), ("Fire", ""), ("Earth", "")]);
    let command = CrawlCommand::PairFromTo { from: 0, to: 3 };

    let first_server = MockServer::start().await;
    let mut config = create_test_config(&first_server.uri(), &snapshot);
    config.crawler.chunk_size = 1;
    config.crawler.workers = 1;

    let interrupted = coordinator(config.clone());
    Mock::given(method("GET"))
        .and(path("/pair"))
        .respond_with(JoiningOracle {
            stop: Some(interrupted.stop_handle()),
        })
        .expect(1)
        .mount(&first_server)
        .await;

    let report = interrupted.run(&command).await.unwrap();
    assert!(report.interrupted);
    assert_eq!(report.chunks, 1);

    let saved = JsonFileStore::new(&snapshot).load().unwrap();
    assert_eq!(saved.elements.len(), 4);
    assert_eq!(saved.recipes.len(), 1);

    let second_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pair"))
        .respond_with(JoiningOracle { stop: None })
        .expect(2)
        .mount(&second_server)
        .await;
    config.oracle.base_url = second_server.uri();

    let report = coordinator(config).run(&command).await.unwrap();
    assert!(!report.interrupted);
    assert_eq!(report.status.already_known, 1);
    assert_eq!(report.status.total_attempted, 2);

    let resumed = JsonFileStore::new(&snapshot).load().unwrap();
    assert_eq!(resumed.elements[..saved.elements.len()], saved.elements[..]);
    for recipe in &saved.recipes {
        assert!(resumed.recipes.contains(recipe), "lost recipe {:?}", recipe);
    }
    assert_eq!(resumed.elements.len(), 6);
    assert_eq!(resumed.recipes.len(), 3);
}

/// Store whose saves always fail
struct FailingStore {
    snapshot: GraphSnapshot,
    path: PathBuf,
}

impl SnapshotStore for FailingStore {
    fn load(&self) -> Result<GraphSnapshot, GraphError> {
        Ok(self.snapshot.clone())
    }

    fn save(&self, _snapshot: &GraphSnapshot) -> Result<(), GraphError> {
        Err(GraphError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[tokio::test]
async fn test_snapshot_write_failure_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pair"))
        .respond_with(combination("Steam", "💨", false))
        .mount(&mock_server)
        .await;

    let mut graph = GraphStore::new();
    graph.append_element("Water", "💧").unwrap();
    graph.append_element("Fire", "🔥").unwrap();
    let store = Arc::new(FailingStore {
        snapshot: graph.snapshot(),
        path: PathBuf::from("/read-only/data.json"),
    });

    let config = create_test_config(&mock_server.uri(), &store.path);
    let coordinator = Coordinator::new(config, store, ProgressReporter::hidden()).unwrap();
    let result = coordinator
        .run(&CrawlCommand::PairFromTo { from: 0, to: 2 })
        .await;

    match result {
        Err(InfcError::SnapshotWrite { path, .. }) => {
            assert_eq!(path, PathBuf::from("/read-only/data.json"));
        }
        other => panic!("expected SnapshotWrite, got {:?}", other.map(|r| r.status)),
    }
}
