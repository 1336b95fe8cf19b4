//! Built-in templates and asset directory copying

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

use crate::log::Logger;

pub struct BuiltinFile {
    pub path: &'static str,
    pub contents: &'static str,
}

pub const LAYOUT_FILE: &str = "layout.html";
pub const HEADER_FILE: &str = "header.html";
pub const FOOTER_FILE: &str = "footer.html";

pub const BUILTIN_TEMPLATES: &[BuiltinFile] = &[
    BuiltinFile {
        path: LAYOUT_FILE,
        contents: include_str!("../templates/layout.html"),
    },
    BuiltinFile {
        path: HEADER_FILE,
        contents: include_str!("../templates/header.html"),
    },
    BuiltinFile {
        path: FOOTER_FILE,
        contents: include_str!("../templates/footer.html"),
    },
    BuiltinFile {
        path: "static/css/doc.css",
        contents: include_str!("../templates/static/css/doc.css"),
    },
];

pub fn builtin_template(path: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|file| file.path == path)
        .map(|file| file.contents)
}

/// Writes the built-in templates under `target`, skipping files that exist.
pub fn write_builtin_templates(target: &Path) -> Result<usize> {
    write_builtin(target, BUILTIN_TEMPLATES.iter())
}

/// Writes only the built-in asset files (everything in a subdirectory).
pub fn write_builtin_assets(destination: &Path) -> Result<usize> {
    write_builtin(
        destination,
        BUILTIN_TEMPLATES.iter().filter(|file| file.path.contains('/')),
    )
}

fn write_builtin<'a>(
    target: &Path,
    files: impl Iterator<Item = &'a BuiltinFile>,
) -> Result<usize> {
    let mut written = 0;
    for file in files {
        let out_path = target.join(file.path);
        if out_path.exists() {
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&out_path, file.contents)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        written += 1;
    }
    Ok(written)
}

/// Copies each subdirectory of `assets_dir` plus every dependency directory
/// to `destination/<basename>`, replacing earlier copies.
///
/// Without an `assets_dir` the built-in assets are written instead.
pub fn copy_asset_dirs(
    assets_dir: &Path,
    dependencies: &[PathBuf],
    destination: &Path,
    logger: &dyn Logger,
) -> Result<usize> {
    let mut dirs = Vec::new();
    if assets_dir.is_dir() {
        for entry in fs::read_dir(assets_dir)
            .with_context(|| format!("failed to read {}", assets_dir.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
    } else {
        logger.warning(&format!(
            "Documentation assets dir '{}' not found, using built-in assets",
            assets_dir.display()
        ));
        write_builtin_assets(destination)?;
    }

    let mut copied = 0;
    for dir in dependencies.iter().chain(dirs.iter()) {
        if !dir.is_dir() {
            logger.info(&format!("Skipping missing asset dir '{}'", dir.display()));
            continue;
        }
        let Some(basename) = dir.file_name() else {
            logger.warning(&format!(
                "Refusing to copy asset dir '{}' without a directory name",
                dir.display()
            ));
            continue;
        };
        let target = destination.join(basename);
        if target.exists() {
            logger.info(&format!("Removing '{}'", target.display()));
            fs::remove_dir_all(&target)
                .with_context(|| format!("failed to remove {}", target.display()))?;
        }
        logger.info(&format!(
            "Copying '{}' to '{}'",
            dir.display(),
            target.display()
        ));
        copy_dir_recursive(dir, &target)?;
        copied += 1;
    }
    Ok(copied)
}

fn copy_dir_recursive(source: &Path, target: &Path) -> Result<()> {
    if target.starts_with(source) {
        bail!(
            "cannot copy {} into itself ({})",
            source.display(),
            target.display()
        );
    }
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(source).with_context(|| {
            format!("failed to read relative path for {}", entry.path().display())
        })?;
        let out_path = target.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&out_path)
                .with_context(|| format!("failed to create {}", out_path.display()))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &out_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    out_path.display()
                )
            })?;
        }
    }
    Ok(())
}
