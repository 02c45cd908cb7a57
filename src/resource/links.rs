//! Link discovery in HTML bodies.

use scraper::{Html, Selector};
use url::Url;

const LINK_SELECTOR: &str =
    "a[href], area[href], link[href], img[src], script[src], iframe[src], frame[src]";

/// Absolute http(s) links in document order, fragments removed, duplicates
/// dropped.
pub fn links_in(base: &str, body: &[u8]) -> Vec<String> {
    let Ok(base) = Url::parse(base) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        tracing::error!(selector = LINK_SELECTOR, "Link selector failed to parse");
        return Vec::new();
    };

    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let mut links: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        let attr = element
            .value()
            .attr("href")
            .or_else(|| element.value().attr("src"));
        let Some(link) = attr.and_then(|raw| normalize(&base, raw)) else {
            continue;
        };
        if !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

/// Resolve `raw` against `base`; None for non-http(s) targets.
pub fn normalize(base: &Url, raw: &str) -> Option<String> {
    let mut url = base.join(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

/// `links_in` on the blocking pool.
pub async fn extract_links(base: String, body: Vec<u8>) -> Vec<String> {
    match tokio::task::spawn_blocking(move || links_in(&base, &body)).await {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!(error = %e, "Link extraction task failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_resolved_and_deduplicated() {
        let body = br#"<html><head><link rel="stylesheet" href="/style.css"></head>
            <body>
              <a href="next.html#top">next</a>
              <a href="next.html">again</a>
              <a href="mailto:someone@example.com">mail</a>
              <a href="javascript:void(0)">js</a>
              <img src="https://cdn.example.org/logo.png">
            </body></html>"#;

        assert_eq!(
            links_in("http://example.com/dir/page.html", body),
            vec![
                "http://example.com/style.css",
                "http://example.com/dir/next.html",
                "https://cdn.example.org/logo.png",
            ]
        );
    }

    #[test]
    fn test_bad_base() {
        assert!(links_in("not a uri", b"<a href='/x'>x</a>").is_empty());
    }

    #[tokio::test]
    async fn test_extract_on_blocking_pool() {
        let links = extract_links("http://example.com/".to_string(), b"<a href='/a'>a</a>".to_vec()).await;
        assert_eq!(links, vec!["http://example.com/a"]);
    }
}
