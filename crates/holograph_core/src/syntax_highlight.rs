//! Server-side highlighting for code listings

use std::cell::RefCell;

use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use syntect_assets::assets::HighlightingAssets;

thread_local! {
    static ASSETS: RefCell<HighlightingAssets> = RefCell::new(HighlightingAssets::from_binary());
}

/// Drops the `_example` / `-example` marker so `html_example` highlights as
/// `html`.
pub fn listing_language(language: &str) -> &str {
    let trimmed = language.trim();
    trimmed
        .strip_suffix("_example")
        .or_else(|| trimmed.strip_suffix("-example"))
        .unwrap_or(trimmed)
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, language: &str) -> Option<&'a SyntaxReference> {
    let token = listing_language(language).to_lowercase();
    if token.is_empty() {
        return None;
    }
    let token = match token.as_str() {
        "scss" | "less" => "css",
        "htm" | "xhtml" => "html",
        "sh" | "shell" => "bash",
        other => other,
    };
    syntax_set
        .find_syntax_by_token(token)
        .or_else(|| syntax_set.find_syntax_by_extension(token))
}

/// Classed `<span>` markup for `code`, or `None` for unknown languages.
pub fn highlight_classed(code: &str, language: &str) -> Option<String> {
    ASSETS.with(|cell| {
        let assets = cell.borrow();
        let syntax_set = assets.get_syntax_set().ok()?;
        let syntax = find_syntax(syntax_set, language)?;

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line).ok()?;
        }
        Some(generator.finalize())
    })
}

/// Stylesheet matching the classes emitted by [`highlight_classed`].
pub fn theme_css(theme: &str) -> Option<String> {
    let wanted = theme.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    ASSETS.with(|cell| {
        let assets = cell.borrow();
        let name = assets
            .themes()
            .find(|name| name.to_lowercase() == wanted)?
            .to_string();
        css_for_theme_with_class_style(assets.get_theme(&name), ClassStyle::Spaced).ok()
    })
}
