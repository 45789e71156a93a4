use super::*;

#[test]
fn title_only_page_falls_back_to_title_text() {
    let html = "<html><head><title>Hello World</title></head><body></body></html>";
    let meta = extract(html);
    assert_eq!(meta.title.as_deref(), Some("Hello World"));
    assert_eq!(meta.clean_title.as_deref(), Some("Hello World"));
    assert_eq!(meta.sub_title, None);
    assert_eq!(meta.section, None);
    assert_eq!(meta.description, None);
    assert!(meta.images.is_empty());
}

#[test]
fn clean_title_meta_overrides_every_other_source() {
    let html = r#"<html><head>
        <title>Page Title</title>
        <meta name="title" content="Generic Title">
        <meta name="clean:title" content="Clean Title">
        </head></html>"#;
    let meta = extract(html);
    assert_eq!(meta.clean_title.as_deref(), Some("Clean Title"));
    assert_eq!(meta.title.as_deref(), Some("Page Title"));
}

#[test]
fn generic_title_meta_beats_title_element() {
    let html = r#"<title>Page Title</title><meta property="title" content="Meta Title">"#;
    assert_eq!(extract(html).clean_title.as_deref(), Some("Meta Title"));
}

#[test]
fn missing_title_is_none_not_empty() {
    let meta = extract("<html><body><p>no head</p></body></html>");
    assert_eq!(meta.title, None);
    assert_eq!(meta.clean_title, None);
    assert_eq!(meta.display_title(), "");
}

#[test]
fn empty_title_element_is_distinct_from_missing() {
    let meta = extract("<title></title>");
    assert_eq!(meta.title.as_deref(), Some(""));
    assert_eq!(meta.clean_title, None);
}

#[test]
fn later_meta_values_win_for_the_same_key() {
    let html = r#"<meta name="description" content="first">
<meta name="description" content="second">"#;
    assert_eq!(extract(html).description.as_deref(), Some("second"));
}

#[test]
fn og_description_outranks_description() {
    let html = r#"<meta name="description" content="plain">
<meta property="og:description" content="A post">"#;
    assert_eq!(extract(html).description.as_deref(), Some("A post"));
}

#[test]
fn empty_override_falls_through_to_generic_key() {
    let html = r#"<meta name="clean:subtitle" content="">
<meta name="subtitle" content="Sub">
<meta name="section" content="Blog">
<meta name="clean:section" content="Engineering">"#;
    let meta = extract(html);
    assert_eq!(meta.sub_title.as_deref(), Some("Sub"));
    assert_eq!(meta.section.as_deref(), Some("Engineering"));
}

#[test]
fn images_are_order_preserving_and_case_insensitively_filtered() {
    let html = r#"<img src="A.PNG"><img src="b.txt"><img src="C.jpg">"#;
    assert_eq!(extract(html).images, vec!["A.PNG", "C.jpg"]);
}

#[test]
fn images_are_not_deduplicated() {
    let html = r#"<img src="/a.gif"><img src="/a.gif"><img alt="x" src="/skipped.jpg">"#;
    assert_eq!(extract(html).images, vec!["/a.gif", "/a.gif"]);
}

#[test]
fn malformed_html_yields_empty_metadata() {
    let meta = extract("<meta name=\"title\" <title>broken <img src=");
    assert_eq!(meta, PageMetadata::default());
}

#[test]
fn common_entities_are_decoded_in_text_fields() {
    let html = r#"<title>Tom &amp; Jerry</title><meta name="description" content="&quot;quoted&quot; &lt;b&gt;">"#;
    let meta = extract(html);
    assert_eq!(meta.clean_title.as_deref(), Some("Tom & Jerry"));
    assert_eq!(meta.description.as_deref(), Some("\"quoted\" <b>"));
}
