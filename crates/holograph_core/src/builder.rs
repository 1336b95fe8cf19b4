//! End-to-end build: sources in, static site out

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::assets::copy_asset_dirs;
use crate::block::parse_stylesheet;
use crate::collect::BlockCollector;
use crate::config::Config;
use crate::discover::source_files;
use crate::layout::{Layout, PageContext, render_navigation};
use crate::log::Logger;
use crate::model::{Navigation, Pages};
use crate::pages::assemble_pages;
use crate::preprocess::run_preprocessor;
use crate::render::{ExampleFenceHandler, MarkdownRenderer};
use crate::syntax_highlight::theme_css;

pub const SYNTAX_STYLESHEET: &str = "syntax.css";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    NothingFound,
}

impl BuildStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            BuildStatus::Success => 0,
            BuildStatus::NothingFound => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub status: BuildStatus,
    pub blocks: usize,
    pub pages: Vec<PathBuf>,
}

pub struct Builder<'a> {
    config: Config,
    root: PathBuf,
    logger: &'a dyn Logger,
    renderer: MarkdownRenderer,
}

impl<'a> Builder<'a> {
    pub fn new(config: Config, logger: &'a dyn Logger) -> Self {
        let handler = ExampleFenceHandler {
            highlight: config.syntax_highlight,
        };
        Self {
            config,
            root: PathBuf::from("."),
            logger,
            renderer: MarkdownRenderer::new(Box::new(handler)),
        }
    }

    /// Directory relative config paths are resolved against.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_renderer(mut self, renderer: MarkdownRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn execute(&self) -> Result<BuildReport> {
        if let Ok(yaml) = self.config.to_yaml() {
            self.logger.info(&format!("Using configuration:\n{yaml}"));
        }

        let source_dir = self.resolve(&self.config.source);
        self.logger
            .notice(&format!("Reading source dir '{}'...", source_dir.display()));
        let files = source_files(&source_dir)?;
        self.logger
            .info(&format!("Found {} files in source dir", files.len()));
        if files.is_empty() {
            self.logger.warning(&format!(
                "No source files found in '{}'",
                source_dir.display()
            ));
            return Ok(BuildReport {
                status: BuildStatus::NothingFound,
                blocks: 0,
                pages: Vec::new(),
            });
        }

        run_preprocessor(
            self.config.preprocessor,
            &source_dir,
            &self.resolve(Path::new(&self.config.main_stylesheet)),
            self.logger,
        )?;

        let mut pages = Pages::default();
        let mut navigation = Navigation::default();
        let mut collector = BlockCollector::new(self.logger);
        let mut blocks = 0;
        for file in &files {
            if file.extension().and_then(|ext| ext.to_str()) == Some("md") {
                self.add_markdown_page(file, &mut pages, &mut navigation)?;
            } else {
                blocks += self.parse_stylesheet_file(file, &mut collector)?;
            }
        }
        assemble_pages(collector.blocks(), "", &mut pages, &mut navigation);

        let written = self.write_pages(&pages, &navigation)?;
        self.copy_assets()?;

        Ok(BuildReport {
            status: BuildStatus::Success,
            blocks,
            pages: written,
        })
    }

    /// Adds every doc block in a stylesheet to `collector`, returning how
    /// many were found.
    pub fn parse_stylesheet_file(
        &self,
        path: &Path,
        collector: &mut BlockCollector<'_>,
    ) -> Result<usize> {
        self.logger
            .info(&format!("Reading file '{}'", path.display()));
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let source = path.display().to_string();
        let blocks = parse_stylesheet(&contents, &source, self.logger)
            .with_context(|| format!("failed to parse doc block in {source}"))?;
        let count = blocks.len();
        for block in blocks {
            collector.add(block);
        }
        Ok(count)
    }

    fn add_markdown_page(
        &self,
        path: &Path,
        pages: &mut Pages,
        navigation: &mut Navigation,
    ) -> Result<()> {
        self.logger
            .info(&format!("Reading file '{}'", path.display()));
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("index");
        let file_name = format!("{stem}.html");
        pages.insert(&file_name, contents);
        navigation.record(&file_name, stem);
        Ok(())
    }

    fn write_pages(&self, pages: &Pages, navigation: &Navigation) -> Result<Vec<PathBuf>> {
        let destination = self.resolve(&self.config.destination);
        fs::create_dir_all(&destination)
            .with_context(|| format!("failed to create {}", destination.display()))?;
        self.logger.notice(&format!(
            "Writing to dest dir '{}'...",
            destination.display()
        ));

        let layout = Layout::load(
            &self.resolve(&self.config.documentation_assets),
            self.config.compat_mode,
            self.logger,
        )?;
        let navigation_html = render_navigation(navigation);

        let mut written = Vec::with_capacity(pages.len());
        for page in pages.iter() {
            let out_path = destination.join(&page.file_name);
            self.logger
                .info(&format!("Writing file '{}'", out_path.display()));
            let content = self.renderer.render(&page.content);
            let html = layout.render(&PageContext {
                title: &self.config.title,
                main_stylesheet: &self.config.main_stylesheet,
                navigation: &navigation_html,
                content: &content,
            })?;
            fs::write(&out_path, html)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            written.push(out_path);
        }

        if self.config.syntax_highlight {
            match theme_css(&self.config.syntax_theme) {
                Some(css) => {
                    let out_path = destination.join(SYNTAX_STYLESHEET);
                    fs::write(&out_path, css)
                        .with_context(|| format!("failed to write {}", out_path.display()))?;
                }
                None => self.logger.warning(&format!(
                    "Unknown syntax theme '{}'",
                    self.config.syntax_theme
                )),
            }
        }
        Ok(written)
    }

    fn copy_assets(&self) -> Result<usize> {
        let destination = self.resolve(&self.config.destination);
        self.logger.notice(&format!(
            "Copying assets to dest dir '{}'...",
            destination.display()
        ));
        let dependencies: Vec<PathBuf> = self
            .config
            .dependencies
            .iter()
            .map(|dep| self.resolve(dep))
            .collect();
        copy_asset_dirs(
            &self.resolve(&self.config.documentation_assets),
            &dependencies,
            &destination,
            self.logger,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemoryLogger;
    use tempfile::TempDir;

    #[test]
    fn exit_codes() {
        assert_eq!(BuildStatus::Success.exit_code(), 0);
        assert_eq!(BuildStatus::NothingFound.exit_code(), 1);
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let logger = MemoryLogger::new();
        let builder = Builder::new(Config::default(), &logger).with_root("/project");
        assert_eq!(
            builder.resolve(Path::new("docs")),
            PathBuf::from("/project/docs")
        );
        assert_eq!(builder.resolve(Path::new("/abs")), PathBuf::from("/abs"));
    }

    #[test]
    fn parse_stylesheet_file_counts_blocks() {
        let temp = TempDir::new().unwrap();
        let logger = MemoryLogger::new();
        let builder = Builder::new(Config::default(), &logger).with_root(temp.path());
        let mut collector = BlockCollector::new(&logger);

        let without = temp.path().join("plain.css");
        fs::write(&without, "/*doc\nfoobar\n*/").unwrap();
        assert_eq!(
            builder.parse_stylesheet_file(&without, &mut collector).expect("parse"),
            0
        );

        let with = temp.path().join("doc.css");
        fs::write(&with, "/*doc\n---\nfoobar\n---\n*/").unwrap();
        assert_eq!(
            builder.parse_stylesheet_file(&with, &mut collector).expect("parse"),
            1
        );
        assert_eq!(collector.blocks().names(), vec!["foobar"]);
    }

    #[test]
    fn missing_name_aborts_with_file_context() {
        let temp = TempDir::new().unwrap();
        let logger = MemoryLogger::new();
        let builder = Builder::new(Config::default(), &logger);
        let mut collector = BlockCollector::new(&logger);
        let path = temp.path().join("bad.css");
        fs::write(&path, "/*doc\n---\ntitle: No Name\n---\n*/").unwrap();

        let err = builder
            .parse_stylesheet_file(&path, &mut collector)
            .expect_err("expected error");
        assert!(format!("{err:#}").contains("bad.css"));
        assert!(format!("{err:#}").contains("'name'"));
    }
}
