//! Template rendering mixins and `TemplateView`.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde_json::Value;

use cbv_rs_core::settings::{Settings, SETTINGS};
use cbv_rs_core::{CbvError, CbvResult};
use cbv_rs_http::{HttpRequest, HttpResponse};
use cbv_rs_template::{Context, Engine};

use super::base::View;
use super::config::ViewConfig;

static DEFAULT_ENGINE: OnceLock<Arc<Engine>> = OnceLock::new();

/// The engine views render with when none is attached.
///
/// Built on first use from the global settings (or the defaults if they were
/// never configured). A template directory that fails to load is logged and
/// leaves the engine empty.
pub fn default_engine() -> Arc<Engine> {
    Arc::clone(DEFAULT_ENGINE.get_or_init(|| {
        let defaults;
        let settings = if SETTINGS.is_configured() {
            SETTINGS.get()
        } else {
            defaults = Settings::default();
            &defaults
        };
        match Engine::from_settings(settings) {
            Ok(engine) => Arc::new(engine),
            Err(err) => {
                tracing::error!(error = %err, "failed to load templates; using an empty engine");
                Arc::new(Engine::new())
            }
        }
    }))
}

/// Provides the context mapping for a template.
pub trait ContextMixin {
    /// Builds the context from the URL keyword arguments.
    fn get_context_data(&self, kwargs: &HashMap<String, String>) -> Context;
}

/// Renders a template to a response.
pub trait TemplateResponseMixin: View {
    /// The configured template name, if any.
    fn template_name(&self) -> Option<&str> {
        None
    }

    /// The template to render.
    ///
    /// # Errors
    ///
    /// Returns [`CbvError::ImproperlyConfigured`] when no template name is set
    /// and this method is not overridden.
    fn get_template_name(&self) -> CbvResult<String> {
        match self.template_name() {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(CbvError::ImproperlyConfigured(
                "TemplateResponseMixin requires either a template_name or an implementation of get_template_name"
                    .to_string(),
            )),
        }
    }

    /// The engine to render with.
    fn engine(&self) -> Arc<Engine> {
        default_engine()
    }

    /// Renders the template with `context` into a 200 `text/html` response.
    fn render_to_response(&self, context: Context) -> CbvResult<HttpResponse> {
        let template_name = self.get_template_name()?;
        let html = self.engine().render_to_string(&template_name, &context)?;
        tracing::trace!(template = %template_name, "rendered template");
        Ok(HttpResponse::ok(html))
    }
}

/// Renders a template with the URL keyword arguments under `params`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cbv_rs_template::Engine;
/// use cbv_rs_views::{TemplateView, View};
///
/// let engine = Arc::new(Engine::new());
/// engine.add_string_template("about.html", "About {{ params.section }}").unwrap();
/// let view = TemplateView::new("about.html").with_engine(engine);
/// let handler = view.as_view();
/// ```
pub struct TemplateView {
    template_name: Option<String>,
    extra_context: Context,
    engine: Option<Arc<Engine>>,
}

impl std::fmt::Debug for TemplateView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateView")
            .field("template_name", &self.template_name)
            .field("extra_context", &self.extra_context)
            .finish_non_exhaustive()
    }
}

impl TemplateView {
    /// Creates a view rendering `template_name`.
    pub fn new(template_name: &str) -> Self {
        Self {
            template_name: Some(template_name.to_string()),
            extra_context: Context::new(),
            engine: None,
        }
    }

    /// Creates a view from the `template_name` and `engine` of `config`.
    pub fn from_config(config: &ViewConfig) -> Self {
        Self {
            template_name: config.template_name.clone(),
            extra_context: Context::new(),
            engine: config.engine.clone(),
        }
    }

    /// Attaches a template engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<Engine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Adds a fixed context value next to `params`.
    #[must_use]
    pub fn with_context(mut self, key: &str, value: Value) -> Self {
        self.extra_context.insert(key.to_string(), value);
        self
    }
}

impl ContextMixin for TemplateView {
    fn get_context_data(&self, kwargs: &HashMap<String, String>) -> Context {
        let params: serde_json::Map<String, Value> = kwargs
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let mut context = self.extra_context.clone();
        context.insert("params".to_string(), Value::Object(params));
        context
    }
}

impl TemplateResponseMixin for TemplateView {
    fn template_name(&self) -> Option<&str> {
        self.template_name.as_deref()
    }

    fn engine(&self) -> Arc<Engine> {
        self.engine.clone().unwrap_or_else(default_engine)
    }
}

#[async_trait]
impl View for TemplateView {
    async fn get(&self, request: HttpRequest) -> CbvResult<HttpResponse> {
        let context = self.get_context_data(request.kwargs());
        self.render_to_response(context)
    }
}
