//! Markdown rendering for blog articles.

use comrak::{Options, markdown_to_html};

/// Render article Markdown to HTML with GitHub Flavored Markdown extensions.
///
/// Raw HTML in the source is not passed through.
#[must_use]
pub fn render(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());

    options.render.r#unsafe = false;

    markdown_to_html(content, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_gfm() {
        let html = render("# Buna\n\n~~old~~ price | new\n");
        assert!(html.contains("<h1"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_raw_html_is_dropped() {
        let html = render("<script>alert(1)</script>\n\nhello");
        assert!(!html.contains("<script>"));
        assert!(html.contains("hello"));
    }
}
