//! Core block, page and navigation models

pub const DEFAULT_CATEGORY: &str = "Index";
pub const DEFAULT_PAGE: &str = "index.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    pub name: String,
    pub title: String,
    pub category: String,
    pub parent: String,
    pub output_file: String,
    pub markdown: String,
    pub children: BlockMap,
}

impl DocumentBlock {
    /// Stand-in for a parent that has not been seen yet. Only the name is
    /// known, everything else takes the regular defaults.
    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            title: capitalize(name),
            category: DEFAULT_CATEGORY.to_string(),
            parent: String::new(),
            output_file: String::new(),
            markdown: String::new(),
            children: BlockMap::new(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_empty()
    }
}

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Blocks keyed by name, iterated in insertion order.
///
/// Replacing an existing name keeps the slot of the original entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockMap {
    entries: Vec<DocumentBlock>,
}

impl BlockMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, block: DocumentBlock) -> Option<DocumentBlock> {
        match self.entries.iter_mut().find(|entry| entry.name == block.name) {
            Some(existing) => Some(std::mem::replace(existing, block)),
            None => {
                self.entries.push(block);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&DocumentBlock> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DocumentBlock> {
        self.entries.iter_mut().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentBlock> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a BlockMap {
    type Item = &'a DocumentBlock;
    type IntoIter = std::slice::Iter<'a, DocumentBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<DocumentBlock> for BlockMap {
    fn from_iter<I: IntoIterator<Item = DocumentBlock>>(iter: I) -> Self {
        let mut map = BlockMap::new();
        for block in iter {
            map.insert(block);
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub file_name: String,
    pub content: String,
}

/// Output pages in first-write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pages {
    pages: Vec<Page>,
}

impl Pages {
    pub fn insert(&mut self, file_name: &str, content: String) {
        match self.pages.iter_mut().find(|page| page.file_name == file_name) {
            Some(page) => page.content = content,
            None => self.pages.push(Page {
                file_name: file_name.to_string(),
                content,
            }),
        }
    }

    /// Appends `"\n" + text` to the page, creating it when missing.
    pub fn append(&mut self, file_name: &str, text: &str) {
        let index = match self.pages.iter().position(|page| page.file_name == file_name) {
            Some(index) => index,
            None => {
                self.pages.push(Page {
                    file_name: file_name.to_string(),
                    content: String::new(),
                });
                self.pages.len() - 1
            }
        };
        let page = &mut self.pages[index];
        page.content.push('\n');
        page.content.push_str(text);
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|page| page.file_name == file_name)
            .map(|page| page.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.pages.iter().map(|page| page.file_name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationItem {
    pub file_name: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    items: Vec<NavigationItem>,
}

impl Navigation {
    pub fn record(&mut self, file_name: &str, name: &str) {
        match self.items.iter_mut().find(|item| item.file_name == file_name) {
            Some(item) => item.name = name.to_string(),
            None => self.items.push(NavigationItem {
                file_name: file_name.to_string(),
                name: name.to_string(),
            }),
        }
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.file_name == file_name)
            .map(|item| item.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NavigationItem> {
        self.items.iter()
    }
}
