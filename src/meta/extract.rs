use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Card-relevant metadata scraped from a page.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PageMetadata {
    /// Text of the first `<title>` element; `None` when the page has none.
    pub title: Option<String>,
    /// Title shown on the card (`clean:title`, then `title` meta, then `<title>`).
    pub clean_title: Option<String>,
    pub sub_title: Option<String>,
    pub section: Option<String>,
    pub description: Option<String>,
    /// `<img src>` values with a jpg/png/gif extension, in document order.
    pub images: Vec<String>,
}

impl PageMetadata {
    /// Title used by layouts; empty when nothing resolved.
    pub fn display_title(&self) -> &str {
        self.clean_title.as_deref().unwrap_or("")
    }
}

const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".png", ".gif"];

fn meta_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<meta[^>]+(name|property)="([^")]*)[^>]+content="([^"]*).*?>"#)
            .expect("meta regex compiles")
    })
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<title>(.*)</title>").expect("title regex compiles"))
}

fn img_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<img src="([^"]+)""#).expect("img regex compiles"))
}

/// Extract card metadata from raw HTML.
///
/// Extraction never fails: patterns that do not match simply leave fields empty. Meta keys that
/// appear more than once keep the last value in document order. Fallback chains skip empty
/// values, so `content=""` on `clean:title` still falls through to `title`.
pub fn extract(html: &str) -> PageMetadata {
    let mut values = HashMap::<&str, &str>::new();
    for caps in meta_re().captures_iter(html) {
        let (Some(key), Some(content)) = (caps.get(2), caps.get(3)) else {
            continue;
        };
        values.insert(key.as_str(), content.as_str());
    }

    let title = title_re()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str()));

    let images = img_re()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|src| has_image_extension(src))
        .map(str::to_string)
        .collect();

    let pick = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .filter_map(|k| values.get(k).copied())
            .find(|v| !v.is_empty())
            .map(decode_entities)
    };

    let clean_title = pick(&["clean:title", "title"])
        .or_else(|| title.clone().filter(|t| !t.is_empty()));

    PageMetadata {
        clean_title,
        sub_title: pick(&["clean:subtitle", "subtitle"]),
        section: pick(&["clean:section", "section"]),
        description: pick(&["og:description", "description"]),
        title,
        images,
    }
}

fn has_image_extension(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Decode the handful of entities that routinely show up in titles and descriptions.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[path = "../../tests/unit/meta/extract.rs"]
mod tests;
