//! Page chrome around rendered content

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use minijinja::{AutoEscape, Environment, context};

use crate::assets::{FOOTER_FILE, HEADER_FILE, LAYOUT_FILE, builtin_template};
use crate::log::Logger;
use crate::model::Navigation;
use crate::render::{escape_attr, escape_html_text};

pub struct PageContext<'a> {
    pub title: &'a str,
    pub main_stylesheet: &'a str,
    pub navigation: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Clone)]
pub enum Layout {
    /// A minijinja template with `{{title}}`, `{{main_stylesheet}}`,
    /// `{{navigation}}` and `{{content}}`. Literal `{%` or `{#` in inline
    /// scripts or styles must sit inside `{% raw %}...{% endraw %}`.
    Template(String),
    /// Compat mode: fixed header and footer fragments.
    Fragments { header: String, footer: String },
}

impl Layout {
    pub fn load(assets_dir: &Path, compat_mode: bool, logger: &dyn Logger) -> Result<Self> {
        if compat_mode {
            Ok(Layout::Fragments {
                header: read_or_builtin(assets_dir, HEADER_FILE, logger)?,
                footer: read_or_builtin(assets_dir, FOOTER_FILE, logger)?,
            })
        } else {
            Ok(Layout::Template(read_or_builtin(
                assets_dir,
                LAYOUT_FILE,
                logger,
            )?))
        }
    }

    pub fn render(&self, page: &PageContext<'_>) -> Result<String> {
        match self {
            Layout::Fragments { header, footer } => {
                Ok(format!("{header}{}{footer}", page.content))
            }
            Layout::Template(source) => {
                let mut env = Environment::new();
                env.set_auto_escape_callback(|_| AutoEscape::None);
                env.render_str(
                    source,
                    context! {
                        title => page.title,
                        main_stylesheet => page.main_stylesheet,
                        navigation => page.navigation,
                        content => page.content,
                    },
                )
                .with_context(|| {
                    format!(
                        "failed to render {LAYOUT_FILE}: layouts are minijinja templates, \
                         wrap literal `{{%` or `{{#` in `{{% raw %}}...{{% endraw %}}`"
                    )
                })
            }
        }
    }
}

fn read_or_builtin(assets_dir: &Path, name: &str, logger: &dyn Logger) -> Result<String> {
    let path = assets_dir.join(name);
    if path.is_file() {
        return fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    logger.warning(&format!(
        "Template '{}' not found, using the built-in default",
        path.display()
    ));
    Ok(builtin_template(name).unwrap_or_default().to_string())
}

/// `<ul>` of links to every page in the navigation, in recorded order.
pub fn render_navigation(navigation: &Navigation) -> String {
    if navigation.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"navigation\">\n");
    for item in navigation.iter() {
        out.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_attr(&item.file_name),
            escape_html_text(&item.name)
        ));
    }
    out.push_str("</ul>");
    out
}
