//! Markdown to HTML rendering with a pluggable fenced code hook

use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;

use crate::syntax_highlight::highlight_classed;

/// A fenced code block as written, e.g. ```` ```html_example,12 ````.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedCode<'a> {
    pub language: &'a str,
    pub line_number: Option<&'a str>,
    pub code: &'a str,
}

impl FencedCode<'_> {
    pub fn is_example(&self) -> bool {
        self.language.contains("example")
    }
}

/// The one override point of [`MarkdownRenderer`]: turns a fenced block into
/// HTML.
pub trait FencedCodeHandler {
    fn render(&self, fence: &FencedCode<'_>) -> String;
}

/// Default fenced block markup.
///
/// Blocks whose language mentions `example` are emitted twice inside a
/// `codeExample` wrapper: the raw code as live HTML, then the escaped listing.
#[derive(Debug, Clone, Default)]
pub struct ExampleFenceHandler {
    pub highlight: bool,
}

impl ExampleFenceHandler {
    pub fn highlighted() -> Self {
        Self { highlight: true }
    }

    fn listing(&self, fence: &FencedCode<'_>) -> String {
        let highlighted = if self.highlight {
            highlight_classed(fence.code, fence.language)
        } else {
            None
        };

        let mut classes = Vec::new();
        if highlighted.is_none() {
            classes.push("prettyprint".to_string());
        }
        if !fence.language.is_empty() {
            classes.push(format!("language-{}", fence.language));
        }
        if let Some(line) = fence.line_number {
            classes.push(format!("linenums:{line}"));
        }
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", escape_attr(&classes.join(" ")))
        };
        let body = highlighted.unwrap_or_else(|| escape_html_text(fence.code));
        format!("<div class=\"codeBlock\"><pre{class_attr}>{body}</pre></div>")
    }
}

impl FencedCodeHandler for ExampleFenceHandler {
    fn render(&self, fence: &FencedCode<'_>) -> String {
        let listing = self.listing(fence);
        if fence.is_example() {
            format!(
                "<div class=\"codeExample\"><div class=\"exampleOutput\">{}</div>{listing}</div>\n",
                fence.code
            )
        } else {
            format!("{listing}\n")
        }
    }
}

pub struct MarkdownRenderer {
    handler: Box<dyn FencedCodeHandler>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(Box::new(ExampleFenceHandler::default()))
    }
}

impl MarkdownRenderer {
    pub fn new(handler: Box<dyn FencedCodeHandler>) -> Self {
        Self { handler }
    }

    pub fn render(&self, md: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        let parser = Parser::new_ext(md, options);

        let mut events = Vec::new();
        let mut pending: Option<(String, String)> = None;
        for event in parser {
            if let Some((info, code)) = pending.as_mut() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        let (language, line_number) = parse_fence_info(info.as_str());
                        let fence = FencedCode {
                            language,
                            line_number,
                            code: code.as_str(),
                        };
                        events.push(Event::Html(self.handler.render(&fence).into()));
                        pending = None;
                    }
                    Event::Text(text) => code.push_str(&text),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    pending = Some((info.to_string(), String::new()));
                }
                other => events.push(other),
            }
        }

        let mut html_out = String::new();
        html::push_html(&mut html_out, events.into_iter());
        html_out
    }
}

fn fence_info_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([\w-]+)?(?:, ?(\d+))?\s*$").expect("valid fence info regex")
    })
}

/// Splits `lang,N` into its language and optional starting line number.
pub fn parse_fence_info(info: &str) -> (&str, Option<&str>) {
    let info = info.trim();
    match fence_info_regex().captures(info) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map(|m| m.as_str()),
        ),
        None => (info.split_whitespace().next().unwrap_or(""), None),
    }
}

pub(crate) fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_html_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> String {
        MarkdownRenderer::default().render(md)
    }

    #[test]
    fn renders_plain_markdown() {
        let html = render("# Title\n\nSome *text*.\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn raw_html_headings_pass_through() {
        let html = render("<h2>Raw</h2>\n\nBody\n");
        assert!(html.contains("<h2>Raw</h2>"));
    }

    #[test]
    fn fence_info_grammar() {
        assert_eq!(parse_fence_info("html"), ("html", None));
        assert_eq!(parse_fence_info("html,21"), ("html", Some("21")));
        assert_eq!(parse_fence_info("html_example, 3"), ("html_example", Some("3")));
        assert_eq!(parse_fence_info(""), ("", None));
        assert_eq!(parse_fence_info("rust ignore"), ("rust", None));
    }

    #[test]
    fn plain_fence_is_escaped_listing() {
        let html = render("```html\n<b>bold</b>\n```\n");
        assert_eq!(
            html,
            "<div class=\"codeBlock\"><pre class=\"prettyprint language-html\">&lt;b&gt;bold&lt;/b&gt;\n</pre></div>\n"
        );
    }

    #[test]
    fn line_number_directive_adds_class() {
        let html = render("```css,12\n.a {}\n```\n");
        assert!(html.contains("class=\"prettyprint language-css linenums:12\""));
    }

    #[test]
    fn fence_without_language() {
        let html = render("```\nplain\n```\n");
        assert!(html.contains("<pre class=\"prettyprint\">plain\n</pre>"));
    }

    #[test]
    fn example_fence_renders_twice() {
        let html = render("```html_example\n<button class=\"btn\">Go</button>\n```\n");
        assert!(html.starts_with("<div class=\"codeExample\"><div class=\"exampleOutput\"><button class=\"btn\">Go</button>\n</div>"));
        assert!(html.contains("<div class=\"codeBlock\"><pre class=\"prettyprint language-html_example\">&lt;button class=\"btn\"&gt;Go&lt;/button&gt;\n</pre></div></div>"));
    }

    #[test]
    fn indented_code_is_left_to_the_engine() {
        let html = render("    indented <code>\n");
        assert!(html.contains("<pre><code>indented &lt;code&gt;"));
    }

    struct Shout;

    impl FencedCodeHandler for Shout {
        fn render(&self, fence: &FencedCode<'_>) -> String {
            format!("<p>{}</p>", fence.code.trim().to_uppercase())
        }
    }

    #[test]
    fn handler_is_swappable() {
        let renderer = MarkdownRenderer::new(Box::new(Shout));
        let html = renderer.render("```html_example\nhello\n```\n");
        assert_eq!(html, "<p>HELLO</p>");
    }

    #[test]
    fn highlighted_listing_drops_prettyprint() {
        let renderer = MarkdownRenderer::new(Box::new(ExampleFenceHandler::highlighted()));
        let html = renderer.render("```css\n.a { color: red; }\n```\n");
        assert!(html.contains("<pre class=\"language-css\">"));
        assert!(html.contains("<span"));
    }
}
