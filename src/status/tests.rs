//! Tests for status banner extraction.

use rstest::rstest;

use super::extract_banner;

#[rstest]
fn extracts_and_collapses_banner_text() {
    let html = concat!(
        "<html><body>",
        "<div class=\"page-status status-none\">\n",
        "  <span>All</span>\n  <span>Systems Operational</span>\n",
        "</div>",
        "</body></html>"
    );
    assert_eq!(
        extract_banner(html),
        Some("All Systems Operational".to_owned())
    );
}

#[rstest]
#[case::no_banner("<html><body><p>maintenance</p></body></html>")]
#[case::empty_banner("<div class=\"page-status\">  \n </div>")]
#[case::empty_body("")]
fn missing_banner_yields_none(#[case] html: &str) {
    assert_eq!(extract_banner(html), None);
}
