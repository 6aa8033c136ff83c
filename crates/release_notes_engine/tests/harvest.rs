use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use release_notes_engine::{
    FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher, HarvestEvent, Harvester,
    NotesCache, NullProgressSink, ProgressSink, ReleasesConfig, ReqwestFetcher, SiteProfile,
    NOT_FOUND_SENTINEL,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<HarvestEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<HarvestEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: HarvestEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Serves canned bodies by exact URL; anything else is a 404.
struct StubFetcher {
    pages: HashMap<String, (String, &'static str)>,
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str, _accept: Option<&str>) -> Result<FetchOutput, FetchError> {
        let (body, content_type) = self
            .pages
            .get(url)
            .ok_or_else(|| FetchError::new(FailureKind::HttpStatus(404), "404 Not Found"))?;
        Ok(FetchOutput {
            bytes: body.clone().into_bytes(),
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: Some(content_type.to_string()),
                byte_len: body.len() as u64,
            },
        })
    }
}

fn init_logging() {
    harvest_logging::initialize_for_tests();
}

fn reqwest_harvester(api_base: &str) -> Harvester {
    Harvester::new(Arc::new(ReqwestFetcher::default())).with_github_api_base(api_base)
}

#[tokio::test]
async fn github_release_body_is_cached_unconverted() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/example/lang/releases/tags/1.0"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r###"{"tag_name": "1.0", "body": "## Changes\n- fixed bug"}"###,
            "application/json",
        ))
        .mount(&server)
        .await;

    let config = ReleasesConfig::from_json(
        r#"{
            "languages": {
                "examplelang": {
                    "name": "ExampleLang",
                    "releases": {"1.0": "https://github.com/example/lang/releases/tag/1.0"}
                }
            },
            "releases": {"examplelang": ["1.0"]}
        }"#,
    )
    .unwrap();

    let harvester = reqwest_harvester(&server.uri());
    let mut cache = NotesCache::new();
    let sink = TestSink::default();
    harvester.harvest(&config, &mut cache, &sink).await;

    let record = cache.get("examplelang-1.0").expect("record cached");
    assert_eq!(record.notes, "## Changes\n- fixed bug");
    assert_eq!(record.language, "ExampleLang");
    assert_eq!(record.version, "1.0");
    assert_eq!(record.url, "https://github.com/example/lang/releases/tag/1.0");

    assert_eq!(
        sink.take(),
        vec![
            HarvestEvent::Started,
            HarvestEvent::LanguageStarted {
                name: "ExampleLang".to_string()
            },
            HarvestEvent::VersionStarted {
                version: "1.0".to_string()
            },
            HarvestEvent::VersionFinished {
                version: "1.0".to_string(),
                chars: 22
            },
        ]
    );
}

#[tokio::test]
async fn github_empty_body_and_failures_become_sentinels() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/releases/tags/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"body": null}"#, "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/releases/tags/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/releases/tags/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let harvester = reqwest_harvester(&server.uri());

    assert_eq!(
        harvester
            .fetch_notes("https://github.com/o/r/releases/tag/empty")
            .await,
        "No release notes available."
    );
    assert!(harvester
        .fetch_notes("https://github.com/o/r/releases/tag/broken")
        .await
        .starts_with("Error fetching release notes: "));
    assert!(harvester
        .fetch_notes("https://github.com/o/r/releases/tag/gone")
        .await
        .starts_with("Error fetching release notes: http status 404"));
    assert_eq!(
        harvester.fetch_notes("https://github.com/o/r/tree/main").await,
        "Invalid GitHub URL format"
    );
}

#[tokio::test]
async fn unknown_hosts_are_not_fetched() {
    init_logging();
    let harvester = Harvester::new(Arc::new(StubFetcher {
        pages: HashMap::new(),
    }));
    assert_eq!(
        harvester.fetch_notes("https://example.org/notes").await,
        "Unknown source"
    );
}

#[tokio::test]
async fn html_pages_are_routed_by_host_fragment() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/code.jsoftware.com/wiki/System/ReleaseNotes/J9.6"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><div id="mw-content-text"><div class="mw-parser-output"><h2>Contents</h2><h3>Core</h3><p>Primitive speedups everywhere.</p></div></div></body></html>"#,
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs.dyalog.com/20.0/release-notes/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><article><h1>Version 20.0</h1><ul><li>New <b>array</b> notation</li></ul></article></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/www.dyalog.com/dyalog/dyalog-versions/190.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><main><h1>Version 19.0</h1><p>Highlights of this release.</p></main></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let harvester = reqwest_harvester(&server.uri());
    let base = server.uri();

    assert_eq!(
        harvester
            .fetch_notes(&format!("{base}/code.jsoftware.com/wiki/System/ReleaseNotes/J9.6"))
            .await,
        "### Core\n\nPrimitive speedups everywhere."
    );
    assert_eq!(
        harvester
            .fetch_notes(&format!("{base}/docs.dyalog.com/20.0/release-notes/"))
            .await,
        "# Version 20.0\n\n* New **array** notation"
    );
    assert_eq!(
        harvester
            .fetch_notes(&format!("{base}/www.dyalog.com/dyalog/dyalog-versions/190.htm"))
            .await,
        "# Version 19.0\n\nHighlights of this release."
    );
}

#[tokio::test]
async fn page_without_content_root_yields_not_found() {
    init_logging();
    let url = "https://docs.dyalog.com/19.0/missing/".to_string();
    let harvester = Harvester::new(Arc::new(StubFetcher {
        pages: HashMap::from([(
            url.clone(),
            ("<html><body><div>No article here</div></body></html>".to_string(), "text/html"),
        )]),
    }));

    assert_eq!(harvester.fetch_notes(&url).await, NOT_FOUND_SENTINEL);
    assert_eq!(
        harvester.fetch_page_notes(&url, &SiteProfile::WIKI).await,
        NOT_FOUND_SENTINEL
    );
}

#[tokio::test]
async fn undecodable_page_yields_error_sentinel() {
    init_logging();
    let url = "https://docs.dyalog.com/bad/".to_string();

    struct BadBytes;
    #[async_trait::async_trait]
    impl Fetcher for BadBytes {
        async fn fetch(&self, url: &str, _accept: Option<&str>) -> Result<FetchOutput, FetchError> {
            Ok(FetchOutput {
                bytes: b"<article>\xff\xfe</article>".to_vec(),
                metadata: FetchMetadata {
                    original_url: url.to_string(),
                    final_url: url.to_string(),
                    redirect_count: 0,
                    content_type: Some("text/html; charset=utf-8".to_string()),
                    byte_len: 22,
                },
            })
        }
    }
    let harvester = Harvester::new(Arc::new(BadBytes));
    assert!(harvester.fetch_notes(&url).await.starts_with("Error: "));
}

#[tokio::test]
async fn missing_urls_are_skipped_and_failures_recorded() {
    init_logging();
    let config = ReleasesConfig::from_json(
        r#"{
            "languages": {
                "dyalog": {
                    "name": "Dyalog APL",
                    "releases": {"20.0": "https://docs.dyalog.com/20.0/release-notes/"}
                },
                "tinyapl": {
                    "name": "TinyAPL",
                    "url_template": "https://tinyapl.example/releases/{version}"
                }
            },
            "releases": {"dyalog": ["20.0", "18.2"], "tinyapl": ["0.1"], "ghost": ["1.0"]}
        }"#,
    )
    .unwrap();
    let harvester = Harvester::new(Arc::new(StubFetcher {
        pages: HashMap::new(),
    }));

    let mut cache = NotesCache::new();
    let sink = TestSink::default();
    harvester.harvest(&config, &mut cache, &sink).await;

    assert_eq!(cache.len(), 2);
    assert_eq!(
        cache.get("dyalog-20.0").unwrap().notes,
        "Error fetching release notes: http status 404: 404 Not Found"
    );
    assert!(cache.get("dyalog-18.2").is_none());
    assert_eq!(cache.get("tinyapl-0.1").unwrap().notes, "Unknown source");
    assert_eq!(
        cache.get("tinyapl-0.1").unwrap().url,
        "https://tinyapl.example/releases/0.1"
    );

    let events = sink.take();
    assert!(events.contains(&HarvestEvent::VersionSkipped {
        version: "18.2".to_string(),
        reason: "No URL found".to_string(),
    }));
    assert!(!events.contains(&HarvestEvent::LanguageStarted {
        name: "ghost".to_string()
    }));
}

#[tokio::test]
async fn later_runs_overwrite_same_key() {
    init_logging();
    let config = ReleasesConfig::from_json(
        r#"{
            "languages": {"x": {"name": "X", "url_template": "https://nowhere.example/{version}"}},
            "releases": {"x": ["1.0", "1.0"]}
        }"#,
    )
    .unwrap();
    let harvester = Harvester::new(Arc::new(StubFetcher {
        pages: HashMap::new(),
    }));

    let mut cache = NotesCache::new();
    harvester.harvest(&config, &mut cache, &NullProgressSink).await;
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn languages_and_cache_keys_follow_file_order() {
    init_logging();
    let config = ReleasesConfig::from_json(
        r#"{
            "languages": {
                "alpha": {"name": "Alpha", "url_template": "https://nowhere.example/a/{version}"},
                "zeta": {"name": "Zeta", "url_template": "https://nowhere.example/z/{version}"}
            },
            "releases": {"zeta": ["2", "1"], "alpha": ["1"]}
        }"#,
    )
    .unwrap();
    let harvester = Harvester::new(Arc::new(StubFetcher {
        pages: HashMap::new(),
    }));

    let mut cache = NotesCache::new();
    let sink = TestSink::default();
    harvester.harvest(&config, &mut cache, &sink).await;

    let languages: Vec<String> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            HarvestEvent::LanguageStarted { name } => Some(name),
            _ => None,
        })
        .collect();
    assert_eq!(languages, vec!["Zeta", "Alpha"]);

    let json = cache.to_json().unwrap();
    let positions: Vec<usize> = ["\"zeta-2\"", "\"zeta-1\"", "\"alpha-1\""]
        .iter()
        .map(|key| json.find(key).expect("key present"))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{json}");
}
