//! CSS preprocessing into the main stylesheet

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::discover::{STYLESHEET_PATTERN, find_files};
use crate::log::Logger;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessorKind {
    #[default]
    Minify,
    None,
}

/// Compresses every stylesheet under `source_dir` and writes them, joined by
/// newlines in discovery order, to `main_stylesheet`.
///
/// Returns the written path, or `None` when nothing was written.
pub fn run_preprocessor(
    kind: PreprocessorKind,
    source_dir: &Path,
    main_stylesheet: &Path,
    logger: &dyn Logger,
) -> Result<Option<PathBuf>> {
    if kind == PreprocessorKind::None {
        return Ok(None);
    }

    let files = find_files(STYLESHEET_PATTERN, source_dir)?;
    if files.is_empty() {
        logger.info(&format!(
            "No stylesheets to minify in '{}'",
            source_dir.display()
        ));
        return Ok(None);
    }

    let mut buffer = Vec::with_capacity(files.len());
    for file in &files {
        let content = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        buffer.push(minify_css(&content));
    }

    if let Some(parent) = main_stylesheet.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(main_stylesheet, buffer.join("\n"))
        .with_context(|| format!("failed to write {}", main_stylesheet.display()))?;
    logger.notice(&format!(
        "Minified {} stylesheets into '{}'",
        files.len(),
        main_stylesheet.display()
    ));
    Ok(Some(main_stylesheet.to_path_buf()))
}

fn comment_or_string_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)/\*.*?\*/|"(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*'"#)
            .expect("valid comment regex")
    })
}

fn string_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*'"#).expect("valid string regex")
    })
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

fn punctuation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" ?([{};,>]) ?").expect("valid punctuation regex"))
}

fn declaration_colon_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([{;])([\w-]+) ?: ?").expect("valid declaration regex"))
}

/// Strips comments and insignificant whitespace. Quoted strings are copied
/// unchanged.
///
/// Only the colon after a property name is tightened, so `a :hover` and
/// `a:hover` keep selecting different elements.
pub fn minify_css(css: &str) -> String {
    let without_comments = comment_or_string_regex().replace_all(css, |caps: &Captures<'_>| {
        let span = &caps[0];
        if span.starts_with("/*") {
            String::new()
        } else {
            span.to_string()
        }
    });

    let mut out = String::with_capacity(without_comments.len());
    let mut last = 0;
    for string in string_regex().find_iter(&without_comments) {
        out.push_str(&minify_code(&without_comments[last..string.start()]));
        out.push_str(string.as_str());
        last = string.end();
    }
    out.push_str(&minify_code(&without_comments[last..]));
    out.trim().to_string()
}

fn minify_code(code: &str) -> String {
    let out = whitespace_regex().replace_all(code, " ");
    let out = punctuation_regex().replace_all(&out, "$1");
    let out = declaration_colon_regex().replace_all(&out, "${1}${2}:");
    out.replace(";}", "}")
}
