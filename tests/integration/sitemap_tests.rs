//! Sitemap fetching and index resolution

use crate::common::{pages, sitemap_index, urlset, RecordingReporter};
use flate2::write::GzEncoder;
use flate2::Compression;
use sitemap_submit::sitemap::{build_http_client, SitemapError};
use sitemap_submit::SitemapResolver;
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver(reporter: Arc<RecordingReporter>) -> SitemapResolver {
    SitemapResolver::new(build_http_client(5).unwrap(), reporter)
}

async fn serve(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

fn locs(entries: &[sitemap_submit::SitemapUrl]) -> Vec<String> {
    entries.iter().map(|e| e.loc.clone()).collect()
}

#[tokio::test]
async fn test_plain_urlset() {
    let server = MockServer::start().await;
    let base = server.uri();
    let expected = pages(&base, 0, 3);
    serve(&server, "/sitemap.xml", urlset(&expected)).await;

    let reporter = Arc::new(RecordingReporter::default());
    let entries = resolver(reporter.clone())
        .resolve(&format!("{}/sitemap.xml", base))
        .await
        .unwrap();

    assert_eq!(locs(&entries), expected);
    assert_eq!(
        *reporter.parsed.lock().unwrap(),
        vec![(format!("{}/sitemap.xml", base), 3)]
    );
}

#[tokio::test]
async fn test_index_flattens_children_in_order() {
    let server = MockServer::start().await;
    let base = server.uri();
    let first = pages(&base, 0, 2);
    let second = pages(&base, 2, 3);

    serve(
        &server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{}/posts.xml", base),
            format!("{}/pages.xml", base),
        ]),
    )
    .await;
    serve(&server, "/posts.xml", urlset(&first)).await;
    serve(&server, "/pages.xml", urlset(&second)).await;

    let reporter = Arc::new(RecordingReporter::default());
    let entries = resolver(reporter.clone())
        .resolve(&format!("{}/sitemap_index.xml", base))
        .await
        .unwrap();

    assert_eq!(locs(&entries), [first, second].concat());
    assert!(reporter.skipped_urls().is_empty());
}

#[tokio::test]
async fn test_failing_child_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();
    let good = pages(&base, 0, 2);

    serve(
        &server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{}/missing.xml", base),
            format!("{}/good.xml", base),
        ]),
    )
    .await;
    serve(&server, "/good.xml", urlset(&good)).await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let reporter = Arc::new(RecordingReporter::default());
    let entries = resolver(reporter.clone())
        .resolve(&format!("{}/sitemap_index.xml", base))
        .await
        .unwrap();

    assert_eq!(locs(&entries), good);
    assert_eq!(
        reporter.skipped_urls(),
        vec![format!("{}/missing.xml", base)]
    );
}

#[tokio::test]
async fn test_self_referencing_index_terminates() {
    let server = MockServer::start().await;
    let base = server.uri();
    let root = format!("{}/sitemap_index.xml", base);
    let leaf = pages(&base, 0, 1);

    serve(
        &server,
        "/sitemap_index.xml",
        sitemap_index(&[root.clone(), format!("{}/leaf.xml", base)]),
    )
    .await;
    serve(&server, "/leaf.xml", urlset(&leaf)).await;

    let reporter = Arc::new(RecordingReporter::default());
    let entries = resolver(reporter.clone()).resolve(&root).await.unwrap();

    assert_eq!(locs(&entries), leaf);
    assert_eq!(reporter.skipped_urls(), vec![root]);
}

#[tokio::test]
async fn test_gzipped_sitemap() {
    let server = MockServer::start().await;
    let base = server.uri();
    let expected = pages(&base, 0, 4);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(urlset(&expected).as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(compressed)
                .insert_header("content-type", "application/x-gzip"),
        )
        .mount(&server)
        .await;

    let entries = resolver(Arc::new(RecordingReporter::default()))
        .resolve(&format!("{}/sitemap.xml.gz", base))
        .await
        .unwrap();

    assert_eq!(locs(&entries), expected);
}

#[tokio::test]
async fn test_gzip_content_encoding_on_plain_xml_url() {
    let server = MockServer::start().await;
    let base = server.uri();
    let expected = pages(&base, 0, 3);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(urlset(&expected).as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(compressed)
                .insert_header("content-type", "application/xml")
                .insert_header("content-encoding", "gzip"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let entries = resolver(Arc::new(RecordingReporter::default()))
        .resolve(&format!("{}/sitemap.xml", base))
        .await
        .unwrap();

    assert_eq!(locs(&entries), expected);
}

#[tokio::test]
async fn test_top_level_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = resolver(Arc::new(RecordingReporter::default()))
        .resolve(&format!("{}/sitemap.xml", server.uri()))
        .await;

    assert!(matches!(
        result,
        Err(SitemapError::HttpStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_top_level_malformed_xml() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/sitemap.xml",
        "<urlset><url><loc>https://example.com/</loc></url>".to_string(),
    )
    .await;

    let result = resolver(Arc::new(RecordingReporter::default()))
        .resolve(&format!("{}/sitemap.xml", server.uri()))
        .await;

    assert!(matches!(result, Err(SitemapError::Parse { .. })));
}
