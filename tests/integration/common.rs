use depthcrawl::config::CrawlSettings;
use depthcrawl::ContentMode;
use depthcrawl::CrawlConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings with no cooldown and `<p>` selection, so page content is predictable
pub fn fast_settings(depth: u32) -> CrawlSettings {
    let mut settings = CrawlSettings::default();
    settings.crawl.depth = depth;
    settings.crawl.cool_down_ms = 0;
    settings.content.mode = ContentMode::Selector;
    settings.content.selector_tag = "p".to_string();
    settings
}

pub fn config(settings: &CrawlSettings) -> CrawlConfig {
    CrawlConfig::from_settings(settings).expect("valid test settings")
}

/// Mounts an HTML page whose body is `<p>{route}</p>` followed by one anchor per href
pub async fn mount_page(server: &MockServer, route: &str, hrefs: &[&str], expected_hits: u64) {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>\n", href))
        .collect();
    let html = format!(
        "<html><head><title>{route}</title></head><body><p>{route}</p>\n{anchors}</body></html>"
    );

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

/// Mounts a small cyclic site:
///
/// ```text
/// /  -> /a, /b
/// /a -> /, /b, /a1
/// /b -> /a, /
/// /a1 -> /
/// ```
pub async fn mount_cyclic_site(server: &MockServer) {
    mount_page(server, "/", &["/a", "/b"], 1).await;
    mount_page(server, "/a", &["/", "/b", "/a1"], 1).await;
    mount_page(server, "/b", &["/a", "/"], 1).await;
    mount_page(server, "/a1", &["/"], 1).await;
}
