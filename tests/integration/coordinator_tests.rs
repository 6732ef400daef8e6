//! End-to-end runs of the coordinator

use crate::common::{pages, urlset, RecordingReporter};
use sitemap_submit::config::{parse_config, Config};
use sitemap_submit::runner::{Coordinator, Endpoints, RunOptions};
use sitemap_submit::{HistoryStore, Platform};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One `[[site]]` table
fn site(domain: &str, sitemap_url: &str, quotas: &str) -> String {
    format!(
        r#"
[[site]]
domain = "{domain}"
sitemap-url = "{sitemap_url}"
quotas = {{ {quotas} }}

[site.api.baidu]
token = "tok"
site = "https://{domain}"

[site.api.bing]
api-key = "bingkey"

[site.api.google]
api-key = "googlekey"
"#
    )
}

fn config(data_dir: &Path, sites: &[String]) -> Config {
    let toml = format!(
        "[settings]\ndata-dir = \"{}\"\nbatch-size = 10\n{}",
        data_dir.display(),
        sites.concat()
    );
    parse_config(&toml).unwrap()
}

fn coordinator(config: Config, server: &MockServer, reporter: Arc<RecordingReporter>) -> Coordinator {
    Coordinator::new(config, reporter)
        .unwrap()
        .with_endpoints(Endpoints {
            baidu: server.uri(),
            indexnow: format!("{}/indexnow", server.uri()),
        })
}

async fn serve_sitemap(server: &MockServer, at: &str, locs: &[String], times: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(locs)))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_run_records_history_and_skips_on_next_run() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();
    let base = server.uri();
    let all = pages(&base, 0, 5);

    // Fetched once; the second run reads the cache
    serve_sitemap(&server, "/sitemap.xml", &all, 1).await;

    Mock::given(method("POST"))
        .and(path("/urls"))
        .and(body_string(all.join("\n")))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":5,"remain":0}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexnow"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let config = config(
        data.path(),
        &[site(
            "example.com",
            &format!("{}/sitemap.xml", base),
            "baidu = 10, bing = 3",
        )],
    );
    let reporter = Arc::new(RecordingReporter::default());
    let coordinator = coordinator(config, &server, reporter.clone());

    let first = coordinator.run(&RunOptions::default()).await;
    assert_eq!(first.len(), 2);
    let (baidu, bing) = (&first[0], &first[1]);
    assert_eq!(baidu.platform, Platform::Baidu);
    assert_eq!(baidu.submitted_count, 5);
    assert_eq!(baidu.success_count, 5);
    assert_eq!(baidu.history_count, 5);
    assert_eq!(bing.platform, Platform::Bing);
    assert_eq!(bing.pending_count, 5);
    assert_eq!(bing.submitted_count, 3);
    assert_eq!(bing.history_count, 3);
    assert!(first.iter().all(|s| s.error.is_none()));

    let second = coordinator.run(&RunOptions::default()).await;
    let (baidu, bing) = (&second[0], &second[1]);
    assert_eq!(baidu.pending_count, 0);
    assert_eq!(baidu.submitted_count, 0);
    assert_eq!(bing.pending_count, 2);
    assert_eq!(bing.success_count, 2);
    assert_eq!(bing.history_count, 5);

    // History is durable, not just cached in memory
    let store = HistoryStore::new(data.path());
    assert_eq!(store.load("example.com", Platform::Bing).unwrap(), 5);
    assert_eq!(store.load("example.com", Platform::Baidu).unwrap(), 5);
    assert_eq!(reporter.error_count(), 0);
}

#[tokio::test]
async fn test_rejected_urls_are_not_recorded() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();
    let base = server.uri();
    serve_sitemap(&server, "/sitemap.xml", &pages(&base, 0, 2), 1).await;

    Mock::given(method("POST"))
        .and(path("/indexnow"))
        .respond_with(ResponseTemplate::new(403).set_body_string("key not verified"))
        .mount(&server)
        .await;

    let config = config(
        data.path(),
        &[site("example.com", &format!("{}/sitemap.xml", base), "google = 5")],
    );
    let coordinator = coordinator(config, &server, Arc::new(RecordingReporter::default()));

    let stats = coordinator.run(&RunOptions::default()).await;
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].failed_count, 2);
    assert_eq!(stats[0].history_count, 0);
    assert!(stats[0].error.as_deref().unwrap().contains("403"));

    let retry = coordinator.run(&RunOptions::default()).await;
    assert_eq!(retry[0].pending_count, 2);
}

#[tokio::test]
async fn test_unreachable_sitemap_skips_only_that_site() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();
    let base = server.uri();
    serve_sitemap(&server, "/good.xml", &pages(&base, 0, 1), 1).await;
    Mock::given(method("GET"))
        .and(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexnow"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(
        data.path(),
        &[
            site("broken.example", &format!("{}/broken.xml", base), "bing = 5"),
            site("good.example", &format!("{}/good.xml", base), "bing = 5"),
        ],
    );
    let reporter = Arc::new(RecordingReporter::default());
    let coordinator = coordinator(config, &server, reporter.clone());

    let stats = coordinator.run(&RunOptions::default()).await;

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].site, "good.example");
    assert_eq!(stats[0].success_count, 1);
    assert_eq!(reporter.error_count(), 1);
    assert!(reporter.errors.lock().unwrap()[0].contains("broken.example"));
}

#[tokio::test]
async fn test_dry_run_submits_nothing() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();
    let base = server.uri();
    serve_sitemap(&server, "/sitemap.xml", &pages(&base, 0, 4), 1).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config(
        data.path(),
        &[site(
            "example.com",
            &format!("{}/sitemap.xml", base),
            "baidu = 2, bing = 10",
        )],
    );
    let coordinator = coordinator(config, &server, Arc::new(RecordingReporter::default()));

    let options = RunOptions {
        dry_run: true,
        ..Default::default()
    };
    let stats = coordinator.run(&options).await;

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].submitted_count, 2);
    assert_eq!(stats[1].submitted_count, 4);
    assert!(stats.iter().all(|s| s.success_count == 0 && s.history_count == 0));
}

#[tokio::test]
async fn test_platform_filter_and_duplicate_locations() {
    let server = MockServer::start().await;
    let data = TempDir::new().unwrap();
    let base = server.uri();
    let unique = pages(&base, 0, 2);
    let listed = vec![unique[0].clone(), unique[1].clone(), unique[0].clone()];
    serve_sitemap(&server, "/sitemap.xml", &listed, 1).await;

    Mock::given(method("POST"))
        .and(path("/indexnow"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(
        data.path(),
        &[site(
            "example.com",
            &format!("{}/sitemap.xml", base),
            "baidu = 10, google = 10",
        )],
    );
    let reporter = Arc::new(RecordingReporter::default());
    let coordinator = coordinator(config, &server, reporter.clone());

    let options = RunOptions {
        platforms: Some(vec![Platform::Google]),
        ..Default::default()
    };
    let stats = coordinator.run(&options).await;

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].platform, Platform::Google);
    assert_eq!(stats[0].candidate_count, 2);

    let finished = reporter.finished.lock().unwrap();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].2.succeeded_urls, unique);
}
