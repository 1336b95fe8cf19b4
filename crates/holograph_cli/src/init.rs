use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use holograph_core::assets::write_builtin_templates;
use holograph_core::config::{CONFIG_FILE_NAME, Config, annotated_config};

const SAMPLE_COMPONENT: &str = "/*doc
---
name: buttons
title: Buttons
category: Base Elements
---
Use `.btn` for any clickable action.

```html_example
<button class=\"btn\">Click me</button>
```
*/
.btn {
    padding: 0.5em 1em;
    border: 1px solid #333;
    border-radius: 3px;
}
";

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub target_dir: PathBuf,
    /// Config file to create, relative to `target_dir` unless absolute.
    pub config_path: Option<PathBuf>,
}

/// Scaffolds a project: annotated config, layout templates and one sample
/// component. Refuses to touch an existing config file.
pub fn init_project(options: InitOptions) -> Result<Vec<PathBuf>> {
    let target_dir = options.target_dir;
    if !target_dir.exists() {
        fs::create_dir_all(&target_dir)
            .with_context(|| format!("failed to create {}", target_dir.display()))?;
    }

    let config_path = match options.config_path {
        Some(path) if path.is_absolute() => path,
        Some(path) => target_dir.join(path),
        None => target_dir.join(CONFIG_FILE_NAME),
    };
    if config_path.exists() {
        bail!("init aborted: {} already exists", config_path.display());
    }

    let mut created = Vec::new();
    fs::write(&config_path, annotated_config())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    created.push(config_path);

    let defaults = Config::default();
    let templates_dir = target_dir.join(&defaults.documentation_assets);
    if write_builtin_templates(&templates_dir)? > 0 {
        created.push(templates_dir);
    }

    let sample = target_dir.join(&defaults.source).join("buttons.css");
    if write_if_missing(&sample, SAMPLE_COMPONENT)? {
        created.push(sample);
    }

    Ok(created)
}

fn write_if_missing(path: &Path, contents: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
