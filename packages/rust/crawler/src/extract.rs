//! Text and link extraction from parsed HTML.
//!
//! Boilerplate elements (scripts, navigation, headers, footers, banners) are
//! skipped while walking text nodes, so the extracted text matches what a
//! reader sees in the main content region.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Title and visible text extracted from a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    /// Whitespace-normalized text; empty when the page has no visible content.
    pub content: String,
}

/// Elements whose text never counts as page content.
const BOILERPLATE_TAGS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "template",
    "nav",
    "header",
    "footer",
    "aside",
    "advertisement",
    "cookie",
    "banner",
];

/// Content containers, tried in order. The first one present wins.
static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "main",
        "article",
        r#"[role="main"]"#,
        ".content",
        "#content",
        ".documentation",
        ".help-content",
        ".article-content",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static H1_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Extract the page title and main-content text.
///
/// Title comes from `<title>`, falling back to the first visible `<h1>`.
/// Content comes from the first matching container in [`CONTENT_SELECTORS`],
/// falling back to the whole `<body>` when that container has no text.
pub fn extract_content(doc: &Html) -> ExtractedContent {
    let title = doc
        .select(&TITLE_SEL)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            doc.select(&H1_SEL)
                .find(|el| !in_boilerplate(*el))
                .map(visible_text)
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_default();

    let mut content = String::new();
    for selector in CONTENT_SELECTORS.iter() {
        if let Some(container) = doc.select(selector).find(|el| !in_boilerplate(*el)) {
            content = visible_text(container);
            break;
        }
    }

    if content.is_empty() {
        content = doc
            .select(&BODY_SEL)
            .next()
            .map(visible_text)
            .unwrap_or_else(|| visible_text(doc.root_element()));
    }

    ExtractedContent { title, content }
}

/// Extract same-host links from a document, resolved against `base_url`.
///
/// Fragments are stripped, duplicates collapsed (first occurrence kept), and
/// empty, anchor-only, and `javascript:` hrefs ignored.
pub fn extract_links(doc: &Html, base_url: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&LINK_SEL) {
        let Some(href) = el.value().attr("href").map(str::trim) else {
            continue;
        };

        if href.is_empty()
            || href.starts_with('#')
            || href.to_ascii_lowercase().starts_with("javascript:")
        {
            continue;
        }

        let Ok(mut resolved) = base_url.join(href) else {
            continue;
        };
        resolved.set_fragment(None);

        if !matches!(resolved.scheme(), "http" | "https") || !is_same_domain(&resolved, base_url)
        {
            continue;
        }

        if seen.insert(resolved.as_str().to_string()) {
            links.push(resolved);
        }
    }

    links
}

/// Two URLs are the same domain iff their host components are identical.
pub fn is_same_domain(a: &Url, b: &Url) -> bool {
    a.host_str().is_some() && a.host_str() == b.host_str()
}

/// Visited-set key: scheme, host, path and query with the fragment removed.
pub fn normalize_url(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.to_string()
}

/// Text of `root` with boilerplate subtrees skipped, joined by single spaces.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(is_boilerplate);
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

fn in_boilerplate(el: ElementRef<'_>) -> bool {
    is_boilerplate(el)
        || el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(is_boilerplate)
}

fn is_boilerplate(el: ElementRef<'_>) -> bool {
    BOILERPLATE_TAGS.contains(&el.value().name())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> Html {
        let path = format!("../../../fixtures/html/{name}");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {path}"));
        Html::parse_document(&content)
    }

    #[test]
    fn extracts_main_region_without_chrome() {
        let doc = load_fixture("help_center.html");
        let extracted = extract_content(&doc);

        assert_eq!(extracted.title, "Billing | Example Help Center");
        assert!(extracted.content.starts_with("Billing and Invoices"));
        assert!(extracted.content.contains("How to update your payment method"));
        assert!(!extracted.content.contains("Sign in"));
        assert!(!extracted.content.contains("Copyright"));
        assert!(!extracted.content.contains("trackPageView"));
        assert!(!extracted.content.contains("Related articles"));
        assert!(!extracted.content.contains("  "));
    }

    #[test]
    fn falls_back_to_body_and_h1_title() {
        let html = r#"<html><body>
            <nav>Home | Docs</nav>
            <h1>Account Settings</h1>
            <p>Change your   password
               and email.</p>
            <script>var x = 1;</script>
        </body></html>"#;
        let extracted = extract_content(&Html::parse_document(html));

        assert_eq!(extracted.title, "Account Settings");
        assert_eq!(
            extracted.content,
            "Account Settings Change your password and email."
        );
    }

    #[test]
    fn empty_main_falls_back_to_body() {
        let html = r#"<html><body><main>  </main><div>Loose body text here.</div></body></html>"#;
        let extracted = extract_content(&Html::parse_document(html));
        assert_eq!(extracted.content, "Loose body text here.");
    }

    #[test]
    fn page_with_only_chrome_has_no_content() {
        let html = r#"<html><body><header>Logo</header><footer>Footer</footer></body></html>"#;
        let extracted = extract_content(&Html::parse_document(html));
        assert!(extracted.content.is_empty());
        assert!(extracted.title.is_empty());
    }

    #[test]
    fn links_are_same_host_and_fragment_free() {
        let html = r##"<html><body>
            <a href="/page2">Page 2</a>
            <a href="/page2#section">Page 2 again</a>
            <a href="https://external.com/docs">External</a>
            <a href="#top">Anchor</a>
            <a href="javascript:void(0)">JS</a>
            <a href="">Empty</a>
            <a href="mailto:help@example.com">Mail</a>
            <a href="guide/intro?lang=en#step-2">Relative</a>
            <a href="http://docs.example.com/http-variant">Other scheme</a>
        </body></html>"##;
        let base = Url::parse("https://docs.example.com/start/").unwrap();
        let links: Vec<String> = extract_links(&Html::parse_document(html), &base)
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(
            links,
            vec![
                "https://docs.example.com/page2",
                "https://docs.example.com/start/guide/intro?lang=en",
                "http://docs.example.com/http-variant",
            ]
        );
    }

    #[test]
    fn same_domain_ignores_scheme_but_not_subdomain() {
        let a = Url::parse("https://help.example.com/a").unwrap();
        let b = Url::parse("http://help.example.com/b").unwrap();
        let c = Url::parse("https://example.com/a").unwrap();
        assert!(is_same_domain(&a, &b));
        assert!(!is_same_domain(&a, &c));
    }

    #[test]
    fn normalize_strips_fragment_only() {
        let url = Url::parse("https://docs.example.com/guide/intro?v=2#section-1").unwrap();
        assert_eq!(normalize_url(&url), "https://docs.example.com/guide/intro?v=2");
    }
}
