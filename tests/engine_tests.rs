//! Integration tests for the traversal engine
//!
//! These tests run the full engine against an in-memory fake store and a
//! recording processor; no network or real Drive account is involved.

use async_trait::async_trait;
use drive_walker::config::{ListingPolicy, WalkConfig};
use drive_walker::drive::{ChildEntry, ListPage, Node, NodeKind, ObjectStore};
use drive_walker::engine::{FileProcessor, Traversal};
use drive_walker::error::{DriveError, DriveResult, ProcessError, ProcessResult, TraverseError};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory object store with paginated listings
struct FakeStore {
    dirs: HashMap<String, Vec<ChildEntry>>,
    page_size: usize,
    fail_parents: HashSet<String>,
    pages_served: AtomicU64,
}

impl FakeStore {
    fn new(page_size: usize) -> Self {
        Self {
            dirs: HashMap::new(),
            page_size,
            fail_parents: HashSet::new(),
            pages_served: AtomicU64::new(0),
        }
    }

    fn add_folder(&mut self, parent: &str, id: &str, name: &str) {
        self.dirs.entry(parent.to_string()).or_default().push(ChildEntry {
            id: id.to_string(),
            name: name.to_string(),
            kind: NodeKind::Folder,
            size: 0,
        });
    }

    fn add_file(&mut self, parent: &str, id: &str, name: &str, size: u64) {
        self.dirs.entry(parent.to_string()).or_default().push(ChildEntry {
            id: id.to_string(),
            name: name.to_string(),
            kind: NodeKind::File,
            size,
        });
    }

    fn fail_listing_of(&mut self, parent: &str) {
        self.fail_parents.insert(parent.to_string());
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn list_children(
        &self,
        parent_id: &str,
        page_token: Option<&str>,
    ) -> DriveResult<ListPage> {
        if self.fail_parents.contains(parent_id) {
            return Err(DriveError::Api {
                parent: parent_id.to_string(),
                status: 500,
                message: "injected failure".into(),
            });
        }

        self.pages_served.fetch_add(1, Ordering::Relaxed);

        let children = self.dirs.get(parent_id).cloned().unwrap_or_default();
        let offset: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (offset + self.page_size).min(children.len());
        let next_page_token = if end < children.len() {
            Some(end.to_string())
        } else {
            None
        };

        Ok(ListPage {
            entries: children[offset..end].to_vec(),
            next_page_token,
        })
    }
}

/// Processor that records every path it sees, optionally failing or
/// sleeping per call
struct RecordingProcessor {
    seen: Mutex<Vec<String>>,
    fail_paths: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingProcessor {
    fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail_paths: HashSet::new(),
            delay: None,
        }
    }

    fn failing_on(paths: &[&str]) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail_paths: paths.iter().map(|p| p.to_string()).collect(),
            delay: None,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail_paths: HashSet::new(),
            delay: Some(delay),
        }
    }

    fn seen_paths(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileProcessor for RecordingProcessor {
    async fn process(&self, node: &Node) -> ProcessResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.seen.lock().unwrap().push(node.path.clone());
        if self.fail_paths.contains(&node.path) {
            return Err(ProcessError::Other(format!("injected failure: {}", node.path)));
        }
        Ok(())
    }
}

/// Processor that requests shutdown on its first file, then dawdles so
/// the rest of the queue is still in flight when the flag lands
struct CancellingProcessor {
    flag: Mutex<Option<Arc<AtomicBool>>>,
    calls: AtomicU64,
}

impl CancellingProcessor {
    fn new() -> Self {
        Self {
            flag: Mutex::new(None),
            calls: AtomicU64::new(0),
        }
    }

    fn arm(&self, flag: Arc<AtomicBool>) {
        *self.flag.lock().unwrap() = Some(flag);
    }
}

#[async_trait]
impl FileProcessor for CancellingProcessor {
    async fn process(&self, _node: &Node) -> ProcessResult<()> {
        if let Some(flag) = self.flag.lock().unwrap().clone() {
            flag.store(true, Ordering::SeqCst);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }
}

fn test_config() -> WalkConfig {
    WalkConfig {
        root_id: "root".into(),
        token_path: PathBuf::from("token.json"),
        worker_count: 4,
        expand_concurrency: 4,
        dir_queue_size: 64,
        file_queue_size: 64,
        page_size: 100,
        max_depth: None,
        exclude_patterns: vec![],
        listing_policy: ListingPolicy::Fatal,
        show_progress: false,
        verbose: false,
    }
}

fn run_traversal(
    config: WalkConfig,
    store: FakeStore,
    processor: RecordingProcessor,
) -> (
    Result<drive_walker::engine::TraverseReport, TraverseError>,
    Arc<RecordingProcessor>,
) {
    let processor = Arc::new(processor);
    let traversal = Traversal::new(
        Arc::new(config),
        Arc::new(store),
        Arc::clone(&processor) as Arc<dyn FileProcessor>,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap();

    let result = runtime.block_on(traversal.run(Node::root("root")));
    (result, processor)
}

/// The spec scenario: root with D1 (file F1) and D2 (file F2, subfolder D3
/// containing F3) - every file processed exactly once, in any order.
#[test]
fn test_scenario_tree_processed_exactly_once() {
    let mut store = FakeStore::new(100);
    store.add_folder("root", "d1", "D1");
    store.add_folder("root", "d2", "D2");
    store.add_file("d1", "f1", "F1", 10);
    store.add_file("d2", "f2", "F2", 20);
    store.add_folder("d2", "d3", "D3");
    store.add_file("d3", "f3", "F3", 30);

    let (result, processor) = run_traversal(test_config(), store, RecordingProcessor::new());
    let report = result.unwrap();

    let mut seen = processor.seen_paths();
    seen.sort();
    assert_eq!(seen, vec!["/D1/F1", "/D2/D3/F3", "/D2/F2"]);

    assert!(report.completed);
    assert!(report.is_clean());
    assert_eq!(report.dirs_expanded, 4); // root, D1, D2, D3
    assert_eq!(report.files_found, 3);
    assert_eq!(report.files_processed, 3);
    assert_eq!(report.bytes_found, 60);
}

#[test]
fn test_empty_root_terminates() {
    let store = FakeStore::new(100);

    let (result, processor) = run_traversal(test_config(), store, RecordingProcessor::new());
    let report = result.unwrap();

    assert!(report.completed);
    assert_eq!(report.dirs_expanded, 1);
    assert_eq!(report.files_found, 0);
    assert!(processor.seen_paths().is_empty());
}

#[test]
fn test_single_file_root() {
    let mut store = FakeStore::new(100);
    store.add_file("root", "f1", "only.txt", 42);

    let (result, processor) = run_traversal(test_config(), store, RecordingProcessor::new());
    let report = result.unwrap();

    assert!(report.completed);
    assert_eq!(processor.seen_paths(), vec!["/only.txt"]);
    assert_eq!(report.bytes_found, 42);
}

#[test]
fn test_single_empty_directory() {
    let mut store = FakeStore::new(100);
    store.add_folder("root", "d1", "Empty");

    let (result, processor) = run_traversal(test_config(), store, RecordingProcessor::new());
    let report = result.unwrap();

    assert!(report.completed);
    assert_eq!(report.dirs_expanded, 2);
    assert_eq!(report.files_found, 0);
    assert!(processor.seen_paths().is_empty());
}

/// A listing split across pages must yield the exact union of entries,
/// nothing dropped, nothing duplicated.
#[test]
fn test_pagination_across_pages() {
    let mut store = FakeStore::new(10);
    for i in 0..25 {
        store.add_file("root", &format!("f{}", i), &format!("file{:02}", i), 1);
    }

    let (result, processor) = run_traversal(test_config(), store, RecordingProcessor::new());
    let report = result.unwrap();

    let seen = processor.seen_paths();
    assert_eq!(seen.len(), 25);
    let unique: HashSet<&String> = seen.iter().collect();
    assert_eq!(unique.len(), 25, "no file may be processed twice");

    assert_eq!(report.files_found, 25);
    assert_eq!(report.files_processed, 25);
}

#[test]
fn test_pagination_page_count() {
    let mut store = FakeStore::new(10);
    for i in 0..25 {
        store.add_file("root", &format!("f{}", i), &format!("file{:02}", i), 1);
    }

    let processor = Arc::new(RecordingProcessor::new());
    let store = Arc::new(store);
    let traversal = Traversal::new(
        Arc::new(test_config()),
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        Arc::clone(&processor) as Arc<dyn FileProcessor>,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(traversal.run(Node::root("root"))).unwrap();

    // 25 entries at page size 10 = 3 pages
    assert_eq!(store.pages_served.load(Ordering::Relaxed), 3);
}

/// With a tiny file queue and a slow processor the expanders must block,
/// not drop; every file still arrives exactly once.
#[test]
fn test_backpressure_loses_nothing() {
    let mut store = FakeStore::new(100);
    for i in 0..16 {
        store.add_file("root", &format!("f{}", i), &format!("slow{:02}", i), 1);
    }

    let mut config = test_config();
    config.file_queue_size = 2;
    config.worker_count = 2;

    let (result, processor) = run_traversal(
        config,
        store,
        RecordingProcessor::slow(Duration::from_millis(10)),
    );
    let report = result.unwrap();

    let seen = processor.seen_paths();
    assert_eq!(seen.len(), 16);
    let unique: HashSet<&String> = seen.iter().collect();
    assert_eq!(unique.len(), 16);
    assert_eq!(report.files_processed, 16);
}

/// A processing failure on one file must not prevent any other file from
/// being processed or reported.
#[test]
fn test_processing_failure_is_isolated() {
    let mut store = FakeStore::new(100);
    store.add_folder("root", "d1", "D1");
    store.add_file("d1", "f1", "bad.txt", 1);
    store.add_file("d1", "f2", "good.txt", 1);
    store.add_file("root", "f3", "other.txt", 1);

    let (result, processor) = run_traversal(
        test_config(),
        store,
        RecordingProcessor::failing_on(&["/D1/bad.txt"]),
    );
    let report = result.unwrap();

    let mut seen = processor.seen_paths();
    seen.sort();
    assert_eq!(seen, vec!["/D1/bad.txt", "/D1/good.txt", "/other.txt"]);

    assert!(report.completed);
    assert_eq!(report.files_processed, 2);
    assert_eq!(report.process_failures.len(), 1);
    assert_eq!(report.process_failures[0].path, "/D1/bad.txt");
    assert!(!report.is_clean());
}

/// Under the default fatal policy a listing failure aborts the traversal
/// with a distinguishable error - and the join must not deadlock.
#[test]
fn test_fatal_listing_error_aborts() {
    let mut store = FakeStore::new(100);
    store.add_folder("root", "d1", "D1");
    store.add_folder("root", "d2", "D2");
    store.add_file("d1", "f1", "F1", 1);
    store.fail_listing_of("d2");

    let (result, _processor) = run_traversal(test_config(), store, RecordingProcessor::new());

    match result {
        Err(TraverseError::Drive(DriveError::Api { parent, status, .. })) => {
            assert_eq!(parent, "d2");
            assert_eq!(status, 500);
        }
        other => panic!("expected fatal Drive error, got {:?}", other.map(|r| r.completed)),
    }
}

/// Under the keep-going policy the failure is recorded and the rest of the
/// tree still completes.
#[test]
fn test_keep_going_records_listing_failure() {
    let mut store = FakeStore::new(100);
    store.add_folder("root", "d1", "D1");
    store.add_folder("root", "d2", "D2");
    store.add_file("d1", "f1", "F1", 1);
    store.add_file("root", "f2", "F2", 1);
    store.fail_listing_of("d2");

    let mut config = test_config();
    config.listing_policy = ListingPolicy::Skip;

    let (result, processor) = run_traversal(config, store, RecordingProcessor::new());
    let report = result.unwrap();

    let mut seen = processor.seen_paths();
    seen.sort();
    assert_eq!(seen, vec!["/D1/F1", "/F2"]);

    assert!(report.completed);
    assert_eq!(report.listing_failures.len(), 1);
    assert_eq!(report.listing_failures[0].path, "/D2");
    assert!(!report.is_clean());
}

#[test]
fn test_max_depth_limits_expansion() {
    let mut store = FakeStore::new(100);
    store.add_folder("root", "d1", "D1");
    store.add_file("d1", "f1", "shallow.txt", 1);
    store.add_folder("d1", "d2", "D2");
    store.add_file("d2", "f2", "deep.txt", 1);

    let mut config = test_config();
    config.max_depth = Some(1);

    let (result, processor) = run_traversal(config, store, RecordingProcessor::new());
    let report = result.unwrap();

    // D1 (depth 1) is expanded; D2 (depth 2) is skipped, so deep.txt is
    // never discovered
    assert_eq!(processor.seen_paths(), vec!["/D1/shallow.txt"]);
    assert_eq!(report.skipped, 1);
}

#[test]
fn test_exclude_pattern_skips_directory() {
    let mut store = FakeStore::new(100);
    store.add_folder("root", "d1", "Active");
    store.add_folder("root", "d2", "Archive");
    store.add_file("d1", "f1", "keep.txt", 1);
    store.add_file("d2", "f2", "drop.txt", 1);

    let mut config = test_config();
    config.exclude_patterns = vec![regex::Regex::new(r"/Archive(/|$)").unwrap()];

    let (result, processor) = run_traversal(config, store, RecordingProcessor::new());
    let report = result.unwrap();

    assert_eq!(processor.seen_paths(), vec!["/Active/keep.txt"]);
    assert_eq!(report.skipped, 1);
}

/// A tiny bounded directory queue must not stall dispatch: expanders
/// blocked publishing subfolders into a full queue need the scheduler to
/// keep receiving, or every permit stays held and the frontier never
/// drains.
#[test]
fn test_tiny_directory_queue_completes() {
    let mut store = FakeStore::new(100);
    let mut expected = Vec::new();
    for d in 0..6 {
        let dir_id = format!("d{}", d);
        store.add_folder("root", &dir_id, &format!("dir{}", d));
        for s in 0..3 {
            let sub_id = format!("d{}s{}", d, s);
            store.add_folder(&dir_id, &sub_id, &format!("sub{}", s));
            store.add_file(&sub_id, &format!("{}f", sub_id), "leaf.txt", 1);
            expected.push(format!("/dir{}/sub{}/leaf.txt", d, s));
        }
    }
    expected.sort();

    let mut config = test_config();
    config.dir_queue_size = 1;
    config.expand_concurrency = 1;

    let processor = Arc::new(RecordingProcessor::new());
    let traversal = Traversal::new(
        Arc::new(config),
        Arc::new(store),
        Arc::clone(&processor) as Arc<dyn FileProcessor>,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap();

    let report = runtime
        .block_on(async {
            tokio::time::timeout(Duration::from_secs(30), traversal.run(Node::root("root"))).await
        })
        .expect("traversal did not finish")
        .unwrap();

    let mut seen = processor.seen_paths();
    seen.sort();
    assert_eq!(seen, expected);
    assert!(report.completed);
    assert_eq!(report.dirs_expanded, 25); // root + 6 dirs + 18 subdirs
}

/// A shutdown request mid-run must return promptly with `completed`
/// false; files still queued are drained and counted as skipped, never
/// processed.
#[test]
fn test_interrupt_drains_queued_files_as_skipped() {
    let mut store = FakeStore::new(100);
    for i in 0..12 {
        store.add_file("root", &format!("f{}", i), &format!("file{:02}", i), 1);
    }

    let mut config = test_config();
    config.worker_count = 1;
    config.file_queue_size = 2;

    let processor = Arc::new(CancellingProcessor::new());
    let traversal = Traversal::new(
        Arc::new(config),
        Arc::new(store),
        Arc::clone(&processor) as Arc<dyn FileProcessor>,
    );
    processor.arm(traversal.shutdown_flag());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap();

    let report = runtime.block_on(traversal.run(Node::root("root"))).unwrap();

    assert!(!report.completed);
    assert!(report.skipped >= 1, "queued files must drain as skipped");
    assert_eq!(report.files_processed + report.skipped, 12);
    assert_eq!(
        report.files_processed,
        processor.calls.load(Ordering::SeqCst)
    );
    assert!(report.process_failures.is_empty());
}

/// Wider tree to shake out races between concurrent expansions: every
/// file exactly once regardless of discovery order.
#[test]
fn test_wide_tree_completeness() {
    let mut store = FakeStore::new(7);
    let mut expected = Vec::new();
    for d in 0..8 {
        let dir_id = format!("d{}", d);
        store.add_folder("root", &dir_id, &format!("dir{}", d));
        for f in 0..12 {
            let file_id = format!("d{}f{}", d, f);
            let name = format!("file{:02}", f);
            store.add_file(&dir_id, &file_id, &name, 1);
            expected.push(format!("/dir{}/{}", d, name));
        }
    }
    expected.sort();

    let (result, processor) = run_traversal(test_config(), store, RecordingProcessor::new());
    let report = result.unwrap();

    let mut seen = processor.seen_paths();
    seen.sort();
    assert_eq!(seen, expected);
    assert_eq!(report.dirs_expanded, 9);
    assert_eq!(report.files_processed, 96);
}
