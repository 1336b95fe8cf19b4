//! Page assembly from the collected block tree

use crate::model::{BlockMap, DEFAULT_PAGE, Navigation, Pages};

/// Walks `blocks` depth-first and appends each block's markdown to its page.
///
/// `output_file` is the page inherited from the enclosing level. A block that
/// declares its own output file switches the page for itself and every later
/// sibling; earlier siblings keep theirs.
pub fn assemble_pages(
    blocks: &BlockMap,
    output_file: &str,
    pages: &mut Pages,
    navigation: &mut Navigation,
) {
    let mut current = output_file.to_string();
    for block in blocks {
        let declared = block.output_file.trim();
        if !declared.is_empty() {
            current = normalize_output_file(declared);
            navigation.record(&current, declared);
        }
        if current.is_empty() {
            current = DEFAULT_PAGE.to_string();
        }

        pages.append(&current, &block.markdown);

        if !block.children.is_empty() {
            assemble_pages(&block.children, &current, pages, navigation);
        }
    }
}

pub fn build_pages(blocks: &BlockMap) -> (Pages, Navigation) {
    let mut pages = Pages::default();
    let mut navigation = Navigation::default();
    assemble_pages(blocks, "", &mut pages, &mut navigation);
    (pages, navigation)
}

/// `"My Example"` -> `"my_example.html"`.
pub fn normalize_output_file(name: &str) -> String {
    let mut file = name.trim().to_lowercase();
    if !file.ends_with(".html") {
        file.push_str(".html");
    }
    file.replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockSettings;
    use crate::model::DocumentBlock;

    fn block(name: &str, output_file: Option<&str>, markdown: &str) -> DocumentBlock {
        let settings = BlockSettings {
            output_file: output_file.map(str::to_string),
            ..BlockSettings::named(name)
        };
        DocumentBlock::new(settings, markdown).expect("valid block")
    }

    #[test]
    fn normalizes_output_file_names() {
        assert_eq!(normalize_output_file("My Example"), "my_example.html");
        assert_eq!(normalize_output_file(" Index "), "index.html");
        assert_eq!(normalize_output_file("example.html"), "example.html");
        assert_eq!(normalize_output_file("Page.HTML"), "page.html");
    }

    #[test]
    fn single_block_defaults_to_index() {
        let blocks: BlockMap = [block("a", None, "foo1.txt")].into_iter().collect();
        let (pages, navigation) = build_pages(&blocks);
        assert_eq!(pages.file_names(), vec!["index.html"]);
        assert_eq!(pages.get("index.html"), Some("\nfoo1.txt"));
        assert!(navigation.is_empty());
    }

    #[test]
    fn multiple_blocks_share_default_page() {
        let blocks: BlockMap = [block("a", None, "foo1"), block("b", None, "foo2")]
            .into_iter()
            .collect();
        let (pages, _) = build_pages(&blocks);
        assert_eq!(pages.get("index.html"), Some("\nfoo1\nfoo2"));
    }

    #[test]
    fn explicit_output_file_is_normalized() {
        let blocks: BlockMap = [
            block("a", Some("My Example"), "foo1"),
            block("b", Some("My Example"), "foo2"),
        ]
        .into_iter()
        .collect();
        let (pages, navigation) = build_pages(&blocks);
        assert_eq!(pages.file_names(), vec!["my_example.html"]);
        assert_eq!(pages.get("my_example.html"), Some("\nfoo1\nfoo2"));
        assert_eq!(navigation.get("my_example.html"), Some("My Example"));
    }

    #[test]
    fn children_follow_parent_on_same_page() {
        let mut parent = block("a", Some("index"), "foo1");
        parent.children.insert(block("b", None, "im a child"));
        parent.children.insert(block("c", None, "im a child2"));
        let blocks: BlockMap = [parent].into_iter().collect();

        let (pages, _) = build_pages(&blocks);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages.get("index.html"), Some("\nfoo1\nim a child\nim a child2"));
    }

    #[test]
    fn child_with_own_output_file_moves_later_siblings() {
        let mut parent = block("a", Some("Parent"), "p");
        parent.children.insert(block("b", None, "b"));
        parent.children.insert(block("c", Some("Other"), "c"));
        parent.children.insert(block("d", None, "d"));
        let blocks: BlockMap = [parent, block("e", None, "e")].into_iter().collect();

        let (pages, navigation) = build_pages(&blocks);
        assert_eq!(pages.get("parent.html"), Some("\np\nb\ne"));
        assert_eq!(pages.get("other.html"), Some("\nc\nd"));
        assert_eq!(navigation.len(), 2);
    }

    #[test]
    fn output_file_change_is_sticky_left_to_right() {
        let blocks: BlockMap = [
            block("a", None, "a"),
            block("b", Some("Second"), "b"),
            block("c", None, "c"),
        ]
        .into_iter()
        .collect();
        let (pages, _) = build_pages(&blocks);
        assert_eq!(pages.file_names(), vec!["index.html", "second.html"]);
        assert_eq!(pages.get("index.html"), Some("\na"));
        assert_eq!(pages.get("second.html"), Some("\nb\nc"));
    }

    #[test]
    fn starting_output_file_is_inherited() {
        let blocks: BlockMap = [block("a", None, "a")].into_iter().collect();
        let mut pages = Pages::default();
        let mut navigation = Navigation::default();
        assemble_pages(&blocks, "forms.html", &mut pages, &mut navigation);
        assert_eq!(pages.get("forms.html"), Some("\na"));
    }
}
