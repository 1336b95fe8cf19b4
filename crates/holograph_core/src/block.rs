//! Doc block parsing for `/*doc ... */` stylesheet comments

use std::sync::OnceLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::log::Logger;
use crate::model::{BlockMap, DEFAULT_CATEGORY, DocumentBlock, capitalize};

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("required parameter 'name' not found in comment block")]
    MissingName,
    #[error("front matter key '{0}' must be a scalar value")]
    InvalidField(String),
    #[error("invalid front matter YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Front matter keys recognised on a doc block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSettings {
    pub name: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub parent: Option<String>,
    pub output_file: Option<String>,
}

impl BlockSettings {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn from_mapping(mapping: &Mapping) -> Result<Self, BlockError> {
        Ok(Self {
            name: scalar_field(mapping, "name")?,
            title: scalar_field(mapping, "title")?,
            category: scalar_field(mapping, "category")?,
            parent: scalar_field(mapping, "parent")?,
            output_file: scalar_field(mapping, "outputFile")?,
        })
    }
}

impl DocumentBlock {
    pub fn new(settings: BlockSettings, markdown: &str) -> Result<Self, BlockError> {
        let name = settings
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or(BlockError::MissingName)?;
        let title = non_empty(settings.title).unwrap_or_else(|| capitalize(&name));
        let category =
            non_empty(settings.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        Ok(Self {
            name,
            title,
            category,
            parent: non_empty(settings.parent).unwrap_or_default(),
            output_file: non_empty(settings.output_file).unwrap_or_default(),
            markdown: markdown.to_string(),
            children: BlockMap::new(),
        })
    }
}

fn doc_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?ms)^\s*/\*doc(.*?)\*/").expect("valid doc comment regex"))
}

fn front_matter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?ms)\s*---\s(.*?)\s---$").expect("valid front matter regex"))
}

/// Returns the inner text of every `/*doc ... */` region in `contents`.
pub fn doc_comments(contents: &str) -> Vec<&str> {
    doc_comment_regex()
        .captures_iter(contents)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Builds a block from one comment region.
///
/// `Ok(None)` means the region carries no front matter and is not a doc
/// block. Front matter that is not a mapping is used as the block name.
pub fn create_document_block(
    comment: &str,
    source: &str,
    logger: &dyn Logger,
) -> Result<Option<DocumentBlock>, BlockError> {
    let Some(caps) = front_matter_regex().captures(comment) else {
        return Ok(None);
    };
    let (Some(whole), Some(front_matter)) = (caps.get(0), caps.get(1)) else {
        return Ok(None);
    };
    let markdown = &comment[whole.end()..];
    let raw = front_matter.as_str();

    let settings = match serde_yaml::from_str::<Value>(raw)? {
        Value::Mapping(mapping) => BlockSettings::from_mapping(&mapping)?,
        other => {
            logger.warning(&format!(
                "Front matter in '{source}' is not a mapping, using it as the block name: {raw}"
            ));
            let name = scalar_to_string(&other, "name")
                .unwrap_or_else(|_| Some(raw.trim().to_string()));
            BlockSettings {
                name,
                ..BlockSettings::default()
            }
        }
    };

    DocumentBlock::new(settings, markdown).map(Some)
}

/// Parses every doc block found in a stylesheet's text.
pub fn parse_stylesheet(
    contents: &str,
    source: &str,
    logger: &dyn Logger,
) -> Result<Vec<DocumentBlock>, BlockError> {
    let mut blocks = Vec::new();
    for comment in doc_comments(contents) {
        if let Some(block) = create_document_block(comment, source, logger)? {
            blocks.push(block);
        }
    }
    Ok(blocks)
}

fn scalar_field(mapping: &Mapping, key: &str) -> Result<Option<String>, BlockError> {
    match mapping.get(key) {
        Some(value) => scalar_to_string(value, key),
        None => Ok(None),
    }
}

fn scalar_to_string(value: &Value, key: &str) -> Result<Option<String>, BlockError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value, key),
        Value::Sequence(_) | Value::Mapping(_) => Err(BlockError::InvalidField(key.to_string())),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
