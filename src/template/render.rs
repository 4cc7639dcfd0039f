use std::fs;
use std::io::Write;
use std::path::Path;

use handlebars::Handlebars;
use log::debug;
use tempfile::NamedTempFile;

use crate::error::{GroveError, Result};

use super::context::TemplateContext;

/// Renders template files with Handlebars.
///
/// Strict mode is on: a placeholder naming a key missing from the context is
/// an error rather than an empty string.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // Outputs are config files, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Render a template string against a context.
    pub fn render_str(&self, template: &str, context: &TemplateContext) -> Result<String> {
        self.handlebars
            .render_template(template, context)
            .map_err(|e| GroveError::Template(e.to_string()))
    }

    /// Render `source` into `dest`.
    ///
    /// Parent directories of `dest` are created as needed. The output is written
    /// to a temporary file beside `dest` and renamed over it, so a failed render
    /// never leaves a partial destination behind.
    pub fn render(&self, source: &Path, dest: &Path, context: &TemplateContext) -> Result<()> {
        let template = fs::read_to_string(source)
            .map_err(|e| GroveError::Template(format!("Failed to read {}: {}", source.display(), e)))?;

        let rendered = self
            .handlebars
            .render_template(&template, context)
            .map_err(|e| GroveError::Template(format!("{}: {}", source.display(), e)))?;

        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        create_dirs(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(rendered.as_bytes())?;
        tmp.as_file().sync_all()?;
        set_output_permissions(&tmp, dest)?;
        tmp.persist(dest).map_err(|e| GroveError::Io(e.error))?;

        debug!("Rendered {} -> {}", source.display(), dest.display());
        Ok(())
    }
}

#[cfg(unix)]
fn create_dirs(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn create_dirs(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

/// Temp files are created 0600; keep an existing file's mode, otherwise 0644.
#[cfg(unix)]
fn set_output_permissions(tmp: &NamedTempFile, dest: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let permissions = match fs::metadata(dest) {
        Ok(meta) => meta.permissions(),
        Err(_) => fs::Permissions::from_mode(0o644),
    };
    tmp.as_file().set_permissions(permissions)
}

#[cfg(not(unix))]
fn set_output_permissions(_tmp: &NamedTempFile, _dest: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::template::{ContextBuilder, TemplateValue};
    use tempfile::TempDir;

    fn context(pairs: &[(&str, &str)]) -> TemplateContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), TemplateValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_render_str_simple() {
        let renderer = TemplateRenderer::new();
        let result = renderer
            .render_str("Hello, {{name}}!", &context(&[("name", "World")]))
            .unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_render_str_missing_variable_fails() {
        let renderer = TemplateRenderer::new();
        let result = renderer.render_str("Hello, {{name}}!", &TemplateContext::default());
        assert!(matches!(result, Err(GroveError::Template(_))));
    }

    #[test]
    fn test_render_str_parse_error() {
        let renderer = TemplateRenderer::default();
        let result = renderer.render_str("{{#if x}}unterminated", &context(&[("x", "1")]));
        assert!(matches!(result, Err(GroveError::Template(_))));
    }

    #[test]
    fn test_render_str_no_escape() {
        let renderer = TemplateRenderer::new();
        let result = renderer
            .render_str("url={{u}}", &context(&[("u", "http://a/?x=1&y=<2>")]))
            .unwrap();
        assert_eq!(result, "url=http://a/?x=1&y=<2>");
    }

    #[test]
    fn test_render_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("env.tmpl");
        fs::write(&source, "BRANCH={{BranchName}}\n").unwrap();
        let dest = temp.path().join("out").join("nested").join(".env");

        TemplateRenderer::new()
            .render(&source, &dest, &context(&[("BranchName", "feature-x")]))
            .unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "BRANCH=feature-x\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_render_output_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.tmpl");
        fs::write(&source, "static").unwrap();
        let dest = temp.path().join("a");

        TemplateRenderer::new()
            .render(&source, &dest, &TemplateContext::default())
            .unwrap();

        let mode = fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_render_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.tmpl");
        fs::write(&source, "v={{v}}").unwrap();
        let dest = temp.path().join("a.txt");
        fs::write(&dest, "old contents that are longer").unwrap();

        TemplateRenderer::new()
            .render(&source, &dest, &context(&[("v", "new")]))
            .unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "v=new");
    }

    #[test]
    fn test_render_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.txt");
        let result = TemplateRenderer::new().render(
            &temp.path().join("missing.tmpl"),
            &dest,
            &TemplateContext::default(),
        );
        assert!(matches!(result, Err(GroveError::Template(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn test_render_error_names_source_once() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("compose.tmpl");
        fs::write(&source, "port={{WebPort}}").unwrap();

        let err = TemplateRenderer::new()
            .render(&source, &temp.path().join("out"), &TemplateContext::default())
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.starts_with(&format!("Template error: {}: ", source.display())));
        assert_eq!(msg.matches("Template error: ").count(), 1);
    }

    #[test]
    fn test_render_failure_leaves_existing_dest_untouched() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.tmpl");
        fs::write(&source, "port={{WebPort}}").unwrap();
        let dest = temp.path().join("a.txt");
        fs::write(&dest, "previous").unwrap();

        let result = TemplateRenderer::new().render(&source, &dest, &TemplateContext::default());
        assert!(matches!(result, Err(GroveError::Template(_))));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "previous");

        let leftovers: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 2);
    }

    #[test]
    fn test_render_every_context_key() {
        let config = Config::default();
        let ctx = ContextBuilder::new(&config).build(Path::new("/w/feature-x"), "feature/x");
        let template: String = ctx.keys().map(|k| format!("{}={{{{{}}}}}\n", k, k)).collect();

        let rendered = TemplateRenderer::new().render_str(&template, &ctx).unwrap();

        assert!(!rendered.contains("{{"));
        assert!(!rendered.contains("}}"));
        assert!(rendered.contains("BranchName=feature-x\n"));
        assert!(rendered.contains("WebPort="));
    }
}
