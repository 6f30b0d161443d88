//! gift-render-html — Render gift shop DomNode trees to HTML strings
//!
//! Produces SSR-ready HTML. Node keys become `data-key` attributes and event
//! bindings become `data-a_<event>` attributes, which the page bootstrap
//! script turns into action posts.

use gift_dom::DomNode;

/// Void elements that must not have closing tags
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Posts `data-a_click` actions to the server and reloads the page.
pub const ACTION_BOOTSTRAP: &str = r#"document.addEventListener("click", function (e) {
  var el = e.target.closest("[data-a_click]");
  if (!el || el.disabled) return;
  e.preventDefault();
  fetch("/actions/" + encodeURIComponent(el.getAttribute("data-a_click")), { method: "POST" })
    .then(function () { window.location.reload(); });
});"#;

/// Render a DomNode tree to an HTML string.
pub fn render_to_html(node: &DomNode) -> String {
    let mut buf = String::with_capacity(4096);
    write_node(node, &mut buf);
    buf
}

/// Options for rendering a full HTML page.
pub struct PageOptions {
    pub root: DomNode,
    pub title: Option<String>,
    pub description: Option<String>,
    pub styles: Vec<String>,
    pub inline_css: Option<String>,
    pub mount_selector: Option<String>,
    /// Inline script blocks appended at the end of the body.
    pub inline_scripts: Vec<String>,
}

impl PageOptions {
    pub fn new(root: DomNode) -> Self {
        Self {
            root,
            title: None,
            description: None,
            styles: Vec::new(),
            inline_css: None,
            mount_selector: None,
            inline_scripts: vec![ACTION_BOOTSTRAP.to_string()],
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Render a full HTML page with SSR content, scripts, and styles.
pub fn render_page(opts: &PageOptions) -> String {
    let body_html = render_to_html(&opts.root);

    let mut html = String::with_capacity(body_html.len() + 2048);
    html.push_str("<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");

    if let Some(title) = &opts.title {
        html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    }
    if let Some(desc) = &opts.description {
        html.push_str(&format!("<meta name=\"description\" content=\"{}\" />\n", escape_attr(desc)));
    }

    if let Some(css) = &opts.inline_css {
        html.push_str(&format!("<style>{}</style>", css));
    }
    for href in &opts.styles {
        html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\" />", escape_attr(href)));
    }

    html.push_str("\n</head>\n<body>\n");

    let mount = opts.mount_selector.as_deref().unwrap_or("#app");
    let id = mount.trim_start_matches('#');
    html.push_str(&format!("<div id=\"{}\">{}</div>\n", id, body_html));

    for script in &opts.inline_scripts {
        html.push_str("<script>\n");
        html.push_str(script);
        html.push_str("\n</script>\n");
    }

    html.push_str("</body>\n</html>");
    html
}

fn write_node(node: &DomNode, buf: &mut String) {
    let is_void = VOID_ELEMENTS.contains(&node.tag.as_str());

    buf.push('<');
    buf.push_str(&node.tag);

    if let Some(key) = &node.key {
        buf.push_str(" data-key=\"");
        buf.push_str(&escape_attr(key));
        buf.push('"');
    }

    if let Some(attrs) = &node.attrs {
        // Sort for deterministic output
        let mut keys: Vec<&String> = attrs.keys().collect();
        keys.sort();
        for k in keys {
            let v = &attrs[k];
            buf.push(' ');
            buf.push_str(k);
            buf.push_str("=\"");
            buf.push_str(&escape_attr(v));
            buf.push('"');
        }
    }

    if let Some(events) = &node.events {
        let mut keys: Vec<&String> = events.keys().collect();
        keys.sort();
        for k in keys {
            let v = &events[k];
            buf.push_str(" data-a_");
            buf.push_str(k);
            buf.push_str("=\"");
            buf.push_str(&escape_attr(v));
            buf.push('"');
        }
    }

    buf.push('>');

    if is_void {
        return;
    }

    if let Some(text) = &node.text {
        buf.push_str(&escape_html(text));
    }

    for child in node.children_iter() {
        write_node(child, buf);
    }

    buf.push_str("</");
    buf.push_str(&node.tag);
    buf.push('>');
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gift_dom::DomNode;

    #[test]
    fn test_simple_render() {
        let node = DomNode::element("section")
            .with_key("ranking")
            .with_class("ranking-section")
            .with_child(DomNode::text("h2", "실시간 급상승 선물랭킹"))
            .with_child(
                DomNode::text("button", "더보기")
                    .with_key("more")
                    .on("click", "more"),
            );

        let html = render_to_html(&node);
        assert!(html.contains("data-key=\"ranking\""));
        assert!(html.contains("class=\"ranking-section\""));
        assert!(html.contains("data-a_click=\"more\""));
        assert!(html.contains("<h2>실시간 급상승 선물랭킹</h2>"));
    }

    #[test]
    fn test_void_element() {
        let node = DomNode::element("img").with_attr("src", "http://example.com/a.jpg");
        let html = render_to_html(&node);
        assert_eq!(html, "<img src=\"http://example.com/a.jpg\">");
    }

    #[test]
    fn test_escapes_text_and_attrs() {
        let node = DomNode::text("p", "<b>&</b>").with_attr("title", "\"quoted\"");
        let html = render_to_html(&node);
        assert_eq!(html, "<p title=\"&quot;quoted&quot;\">&lt;b&gt;&amp;&lt;/b&gt;</p>");
    }

    #[test]
    fn test_page_includes_bootstrap_and_mount() {
        let page = render_page(&PageOptions::new(DomNode::text("h1", "선물하기")).with_title("Gift"));
        assert!(page.contains("<title>Gift</title>"));
        assert!(page.contains("<div id=\"app\"><h1>선물하기</h1></div>"));
        assert!(page.contains("data-a_click"));
    }
}
