//! Template engine: loading and rendering templates.
//!
//! [`Engine`] wraps a [Tera](https://keats.github.io/tera/) instance. Templates
//! come from the directories listed in [`Settings::template_dirs`] or are
//! registered as strings. Rendering takes the context mapping the views build
//! (`HashMap<String, serde_json::Value>`).

use std::collections::HashMap;
use std::error::Error as _;
use std::path::PathBuf;
use std::sync::RwLock;

use cbv_rs_core::settings::Settings;
use cbv_rs_core::{CbvError, CbvResult};

/// The context mapping passed to templates.
pub type Context = HashMap<String, serde_json::Value>;

/// The template engine.
///
/// Templates can be added after construction through a shared reference, so
/// an `Arc<Engine>` can be handed to several views and still be extended.
///
/// # Examples
///
/// ```
/// use cbv_rs_template::{Context, Engine};
///
/// let engine = Engine::new();
/// engine.add_string_template("hello.html", "Hello {{ name }}!").unwrap();
///
/// let mut context = Context::new();
/// context.insert("name".to_string(), serde_json::json!("World"));
///
/// let result = engine.render_to_string("hello.html", &context).unwrap();
/// assert_eq!(result, "Hello World!");
/// ```
pub struct Engine {
    tera: RwLock<tera::Tera>,
    dirs: Vec<PathBuf>,
    auto_escape: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("dirs", &self.dirs)
            .field("auto_escape", &self.auto_escape)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an empty engine with auto-escaping of HTML templates enabled.
    pub fn new() -> Self {
        Self {
            tera: RwLock::new(tera::Tera::default()),
            dirs: Vec::new(),
            auto_escape: true,
        }
    }

    /// Creates an engine that loads every template under `settings.template_dirs`.
    ///
    /// Template names are paths relative to their directory. When two
    /// directories provide the same name, the later directory wins.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::ConfigurationError`] if a directory does not exist and
    /// [`CbvError::TemplateSyntaxError`] if a template fails to parse.
    pub fn from_settings(settings: &Settings) -> CbvResult<Self> {
        let mut engine = Self::new();
        engine.set_auto_escape(settings.autoescape);
        for dir in &settings.template_dirs {
            engine.add_dir(dir.clone())?;
        }
        Ok(engine)
    }

    /// Loads every template below `dir`.
    pub fn add_dir(&mut self, dir: PathBuf) -> CbvResult<()> {
        if !dir.is_dir() {
            return Err(CbvError::ConfigurationError(format!(
                "Template directory '{}' does not exist",
                dir.display()
            )));
        }

        let glob = format!("{}/**/*", dir.display());
        let loaded = tera::Tera::new(&glob).map_err(|e| convert_error(&e))?;
        tracing::debug!(
            dir = %dir.display(),
            count = loaded.get_template_names().count(),
            "loaded templates"
        );

        self.tera_mut()?.extend(&loaded).map_err(|e| convert_error(&e))?;
        self.dirs.push(dir);
        Ok(())
    }

    /// Returns the directories templates were loaded from.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Enables or disables auto-escaping for `.html`, `.htm` and `.xml` templates.
    pub fn set_auto_escape(&mut self, enabled: bool) {
        self.auto_escape = enabled;
        let suffixes = if enabled {
            vec![".html", ".htm", ".xml"]
        } else {
            Vec::new()
        };
        if let Ok(tera) = self.tera.get_mut() {
            tera.autoescape_on(suffixes);
        }
    }

    /// Returns whether auto-escaping is enabled.
    pub const fn auto_escape(&self) -> bool {
        self.auto_escape
    }

    /// Registers an in-memory template, replacing any template with that name.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::TemplateSyntaxError`] if the source fails to parse.
    pub fn add_string_template(&self, name: &str, source: &str) -> CbvResult<()> {
        let mut tera = self
            .tera
            .write()
            .map_err(|_| CbvError::InternalServerError("template engine lock poisoned".into()))?;
        tera.add_raw_template(name, source)
            .map_err(|e| convert_error(&e))
    }

    /// Returns `true` if a template with this name is registered.
    pub fn has_template(&self, name: &str) -> bool {
        self.tera
            .read()
            .is_ok_and(|tera| tera.get_template_names().any(|n| n == name))
    }

    /// Renders a template by name with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::TemplateDoesNotExist`] for unknown names and
    /// [`CbvError::TemplateSyntaxError`] when rendering fails (undefined
    /// variables, filter errors, ...).
    pub fn render_to_string(&self, name: &str, context: &Context) -> CbvResult<String> {
        let mut tera_context = tera::Context::new();
        for (key, value) in context {
            tera_context.insert(key.as_str(), value);
        }

        let tera = self
            .tera
            .read()
            .map_err(|_| CbvError::InternalServerError("template engine lock poisoned".into()))?;
        tera.render(name, &tera_context)
            .map_err(|e| convert_error(&e))
    }

    fn tera_mut(&mut self) -> CbvResult<&mut tera::Tera> {
        self.tera
            .get_mut()
            .map_err(|_| CbvError::InternalServerError("template engine lock poisoned".into()))
    }
}

/// Maps a Tera error onto the framework taxonomy, keeping the cause chain.
fn convert_error(err: &tera::Error) -> CbvError {
    if let tera::ErrorKind::TemplateNotFound(name) = &err.kind {
        return CbvError::TemplateDoesNotExist(format!("Template '{name}' could not be found"));
    }

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    CbvError::TemplateSyntaxError(message)
}
