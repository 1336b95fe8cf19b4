//! Block collection into the two-level block tree

use crate::log::Logger;
use crate::model::{BlockMap, DocumentBlock};

pub struct BlockCollector<'a> {
    blocks: BlockMap,
    logger: &'a dyn Logger,
}

impl<'a> BlockCollector<'a> {
    pub fn new(logger: &'a dyn Logger) -> Self {
        Self {
            blocks: BlockMap::new(),
            logger,
        }
    }

    /// Files a block into the tree and prepends its heading.
    ///
    /// A child whose parent has not been collected yet gets a placeholder
    /// parent. If the real parent shows up later it replaces the placeholder
    /// like any other duplicate, and the children filed so far are dropped.
    pub fn add(&mut self, mut block: DocumentBlock) {
        if block.is_top_level() {
            self.add_top_level(block);
            return;
        }

        let parent_name = block.parent.clone();
        block.markdown = format!("\n\n## {}\n{}", block.title, block.markdown);

        if !self.blocks.contains(&parent_name) {
            self.logger.info(&format!(
                "Parent block '{}' not found for '{}', creating a placeholder",
                parent_name, block.name
            ));
            self.add_top_level(DocumentBlock::placeholder(&parent_name));
        }
        if let Some(parent) = self.blocks.get_mut(&parent_name) {
            parent.children.insert(block);
        }
    }

    fn add_top_level(&mut self, mut block: DocumentBlock) {
        if block.output_file.is_empty() {
            block.output_file = block.category.clone();
        }
        block.markdown = format!("\n\n# {}\n{}", block.title, block.markdown);

        if self.blocks.contains(&block.name) {
            self.logger.warning(&format!(
                "Overwriting block with name '{}'",
                block.name
            ));
        }
        self.blocks.insert(block);
    }

    pub fn blocks(&self) -> &BlockMap {
        &self.blocks
    }

    pub fn into_blocks(self) -> BlockMap {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockSettings;
    use crate::log::MemoryLogger;

    fn block(name: &str, parent: Option<&str>, markdown: &str) -> DocumentBlock {
        let settings = BlockSettings {
            parent: parent.map(str::to_string),
            ..BlockSettings::named(name)
        };
        DocumentBlock::new(settings, markdown).expect("valid block")
    }

    #[test]
    fn top_level_block_gets_heading_and_output_file() {
        let logger = MemoryLogger::new();
        let mut collector = BlockCollector::new(&logger);
        collector.add(block("buttons", None, "body"));

        let stored = collector.blocks().get("buttons").expect("stored");
        assert_eq!(stored.markdown, "\n\n# Buttons\nbody");
        assert_eq!(stored.output_file, "Index");
    }

    #[test]
    fn explicit_output_file_is_kept() {
        let logger = MemoryLogger::new();
        let mut collector = BlockCollector::new(&logger);
        let settings = BlockSettings {
            output_file: Some("Forms".to_string()),
            category: Some("Widgets".to_string()),
            ..BlockSettings::named("inputs")
        };
        collector.add(DocumentBlock::new(settings, "").expect("valid block"));
        assert_eq!(
            collector.blocks().get("inputs").map(|b| b.output_file.as_str()),
            Some("Forms")
        );
    }

    #[test]
    fn duplicate_name_overwrites_and_warns() {
        let logger = MemoryLogger::new();
        let mut collector = BlockCollector::new(&logger);
        collector.add(block("b", None, "first"));
        collector.add(block("b", None, "second"));

        let blocks = collector.into_blocks();
        assert_eq!(blocks.len(), 1);
        assert!(blocks.get("b").expect("stored").markdown.ends_with("second"));

        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Overwriting block with name"));
        assert!(warnings[0].contains("'b'"));
    }

    #[test]
    fn child_is_filed_under_existing_parent() {
        let logger = MemoryLogger::new();
        let mut collector = BlockCollector::new(&logger);
        collector.add(block("a", None, "parent"));
        collector.add(block("b", Some("a"), "child"));

        let blocks = collector.into_blocks();
        assert_eq!(blocks.names(), vec!["a"]);
        let parent = blocks.get("a").expect("parent");
        let child = parent.children.get("b").expect("child");
        assert_eq!(child.markdown, "\n\n## B\nchild");
        assert_eq!(child.output_file, "");
    }

    #[test]
    fn missing_parent_gets_placeholder() {
        let logger = MemoryLogger::new();
        let mut collector = BlockCollector::new(&logger);
        collector.add(block("a", None, "a"));
        collector.add(block("b", Some("x"), "child"));

        let blocks = collector.into_blocks();
        assert_eq!(blocks.names(), vec!["a", "x"]);
        let placeholder = blocks.get("x").expect("placeholder");
        assert_eq!(placeholder.title, "X");
        assert_eq!(placeholder.markdown, "\n\n# X\n");
        assert_eq!(placeholder.children.names(), vec!["b"]);
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn siblings_share_one_placeholder() {
        let logger = MemoryLogger::new();
        let mut collector = BlockCollector::new(&logger);
        collector.add(block("b", Some("x"), ""));
        collector.add(block("c", Some("x"), ""));

        let blocks = collector.into_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks.get("x").expect("placeholder").children.names(), vec!["b", "c"]);
    }

    // Sharp edge for documentation authors: a parent declared after its
    // children replaces the placeholder and the children are lost.
    #[test]
    fn late_parent_replaces_placeholder_without_merging() {
        let logger = MemoryLogger::new();
        let mut collector = BlockCollector::new(&logger);
        collector.add(block("b", Some("x"), "child"));
        collector.add(block("x", None, "real parent"));

        let blocks = collector.into_blocks();
        assert_eq!(blocks.len(), 1);
        let parent = blocks.get("x").expect("parent");
        assert_eq!(parent.markdown, "\n\n# X\nreal parent");
        assert!(parent.children.is_empty());
        assert_eq!(logger.warnings().len(), 1);
    }
}
