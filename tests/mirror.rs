//! End-to-end pipeline scenarios against an in-memory HTTP backend.

use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pagesnap::http::{HttpError, HttpGet, HttpResponse};
use pagesnap::pipeline::{mirror, MirrorOptions};

/// Canned (status, body) per URL; anything unknown is a transport error.
struct FakeSite {
    responses: HashMap<String, (u32, Vec<u8>)>,
    calls: Cell<usize>,
}

impl FakeSite {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    fn page(mut self, url: &str, html: &str) -> Self {
        self.responses
            .insert(url.to_string(), (200, html.as_bytes().to_vec()));
        self
    }

    fn asset(mut self, url: &str, status: u32, body: &[u8]) -> Self {
        self.responses
            .insert(url.to_string(), (status, body.to_vec()));
        self
    }
}

impl HttpGet for FakeSite {
    fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, HttpError> {
        self.calls.set(self.calls.get() + 1);
        self.responses
            .get(url)
            .map(|(status, body)| HttpResponse {
                status: *status,
                body: body.clone(),
            })
            .ok_or_else(|| HttpError::Transport(format!("no route to {url}")))
    }
}

fn options(url: &str, budget_secs: u64) -> MirrorOptions {
    MirrorOptions {
        url: url.to_string(),
        budget: Duration::from_secs(budget_secs),
    }
}

/// The single run directory created under `parent`.
fn run_dir(parent: &Path) -> PathBuf {
    let mut entries: Vec<_> = fs::read_dir(parent)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected exactly one run directory");
    entries.remove(0)
}

const DEMO_PAGE: &str = "<html><head><title>Demo Page Title</title></head>\
                         <body><img src=\"a.png\"></body></html>";

#[test]
fn mirrors_a_page_and_its_image() {
    let site = FakeSite::new()
        .page("http://example.test/", DEMO_PAGE)
        .asset("http://example.test/a.png", 200, &[1, 2, 3]);
    let tmp = tempfile::tempdir().unwrap();

    let report = mirror(&options("http://example.test/", 4), &site, tmp.path()).unwrap();

    assert_eq!(report.saved, 1);
    assert_eq!(report.failed, 0);
    assert!(!report.truncated);

    let root = run_dir(tmp.path());
    let name = root.file_name().unwrap().to_string_lossy().into_owned();
    assert!(
        name.ends_with("_Demo_Page_Title"),
        "unexpected run directory name: {name}"
    );

    assert_eq!(fs::read(root.join("images/a.png")).unwrap(), vec![1, 2, 3]);

    let index = fs::read_to_string(root.join("index.html")).unwrap();
    assert!(index.contains("src=\"images/a.png\""), "index: {index}");
}

#[test]
fn failed_asset_still_gets_a_local_reference() {
    let site = FakeSite::new()
        .page("http://example.test/", DEMO_PAGE)
        .asset("http://example.test/a.png", 404, b"");
    let tmp = tempfile::tempdir().unwrap();

    let report = mirror(&options("http://example.test/", 4), &site, tmp.path()).unwrap();
    assert_eq!(report.saved, 0);
    assert_eq!(report.failed, 1);

    let root = run_dir(tmp.path());
    assert!(!root.join("images/a.png").exists());

    // Best-effort contract: the reference is rewritten even though the
    // fetch failed, leaving a broken-but-local path.
    let index = fs::read_to_string(root.join("index.html")).unwrap();
    assert!(index.contains("src=\"images/a.png\""));
}

#[test]
fn zero_budget_truncates_but_still_persists_the_page() {
    let imgs: String = (0..10).map(|i| format!("<img src=\"i{i}.png\">")).collect();
    let html = format!("<html><head><title>Busy</title></head><body>{imgs}</body></html>");
    let site = FakeSite::new().page("http://example.test/", &html);
    let tmp = tempfile::tempdir().unwrap();

    let report = mirror(&options("http://example.test/", 0), &site, tmp.path()).unwrap();

    assert!(report.truncated);
    assert_eq!(report.attempted, 0);
    assert_eq!(report.total_references, 10);
    // Only the root page itself was fetched.
    assert_eq!(site.calls.get(), 1);

    let root = run_dir(tmp.path());
    assert!(root.join("index.html").exists());
    assert!(root.join("images").is_dir());

    // No reference was attempted, so none may be rewritten.
    let index = fs::read_to_string(root.join("index.html")).unwrap();
    assert!(index.contains("src=\"i0.png\""));
    assert!(!index.contains("images/"));
}

#[test]
fn stylesheets_are_fetched_into_css() {
    let html = "<html><head><title>Styled</title>\
                <link rel=\"stylesheet\" href=\"main.css\"></head><body></body></html>";
    let site = FakeSite::new()
        .page("http://example.test/", html)
        .asset("http://example.test/main.css", 200, b"body{}");
    let tmp = tempfile::tempdir().unwrap();

    let report = mirror(&options("http://example.test/", 4), &site, tmp.path()).unwrap();
    assert_eq!(report.saved, 1);

    let root = run_dir(tmp.path());
    assert_eq!(fs::read(root.join("css/main.css")).unwrap(), b"body{}");
    let index = fs::read_to_string(root.join("index.html")).unwrap();
    assert!(index.contains("href=\"css/main.css\""));
}

#[test]
fn raw_page_copy_is_persisted_unmodified() {
    let site = FakeSite::new()
        .page("http://example.test/", DEMO_PAGE)
        .asset("http://example.test/a.png", 200, &[1]);
    let tmp = tempfile::tempdir().unwrap();

    mirror(&options("http://example.test/", 4), &site, tmp.path()).unwrap();

    let root = run_dir(tmp.path());
    let raw = fs::read(root.join("page.orig.html")).unwrap();
    assert_eq!(raw, DEMO_PAGE.as_bytes());
}

#[test]
fn unreachable_root_page_is_fatal() {
    let site = FakeSite::new();
    let tmp = tempfile::tempdir().unwrap();

    let err = mirror(&options("http://example.test/", 4), &site, tmp.path()).unwrap_err();
    assert!(err.to_string().contains("failed to access website"));
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn missing_title_is_fatal() {
    let site = FakeSite::new().page("http://example.test/", "<html><body>no title</body></html>");
    let tmp = tempfile::tempdir().unwrap();

    let err = mirror(&options("http://example.test/", 4), &site, tmp.path()).unwrap_err();
    assert!(err.to_string().contains("no usable <title>"));
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn invalid_root_url_is_fatal() {
    let site = FakeSite::new();
    let tmp = tempfile::tempdir().unwrap();

    assert!(mirror(&options("not a url", 4), &site, tmp.path()).is_err());
    assert_eq!(site.calls.get(), 0);
}
