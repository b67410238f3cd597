mod context;
pub use context::*;

mod store;
pub use store::*;

mod substitute;
pub use substitute::*;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::TemplateError;


/// Locale used when none is requested or the requested text variant is missing.
pub const DEFAULT_LOCALE: &str = "cs";

/// HTML template wrapped around every rendered HTML body, when present.
pub const LAYOUT_TEMPLATE: &str = "base";


/// Renders email bodies from a [`TemplateStore`].
///
/// Rendering is a pure function of the store contents, the template name,
/// the context and the locale. Nothing is cached between calls.
#[derive(Clone)]
pub struct EmailTemplates {
    store: Arc<dyn TemplateStore>,
}

impl std::fmt::Debug for EmailTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailTemplates").finish_non_exhaustive()
    }
}

impl EmailTemplates {
    pub fn new(store: impl TemplateStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Templates embedded in the binary.
    pub fn builtin() -> Self {
        Self::new(MemoryStore::builtin())
    }

    /// Renders the plain-text body of `template_name`.
    ///
    /// Looks up `(locale, name)` first, then `(cs, name)`. Fails with
    /// [`TemplateError::NotFound`] when neither exists.
    pub fn render_text(
        &self,
        template_name: &str,
        context: &Context,
        locale: Option<&str>,
    ) -> Result<String, TemplateError> {
        let locale = locale.unwrap_or(DEFAULT_LOCALE);

        let body = match self.store.text(locale, template_name)? {
            Some(body) => body,
            None if locale != DEFAULT_LOCALE => {
                debug!(
                    "Text template {} missing for locale {}, falling back to {}",
                    template_name, locale, DEFAULT_LOCALE
                );
                self.store
                    .text(DEFAULT_LOCALE, template_name)?
                    .ok_or_else(|| {
                        warn!("Template not found: {}/{}.txt", DEFAULT_LOCALE, template_name);
                        TemplateError::not_found(template_name, Some(locale))
                    })?
            }
            None => {
                warn!("Template not found: {}/{}.txt", locale, template_name);
                return Err(TemplateError::not_found(template_name, Some(locale)));
            }
        };

        Ok(substitute(&body, context))
    }

    /// Renders the HTML body of `template_name`.
    ///
    /// HTML is locale-independent. When the store has a `base` layout, the
    /// rendered body is inserted into it as `{{content}}`.
    ///
    /// Context values are inserted without escaping. Anything user-controlled
    /// must be sanitized by the caller before it is put in the context.
    pub fn render_html(&self, template_name: &str, context: &Context) -> Result<String, TemplateError> {
        let body = self.store.html(template_name)?.ok_or_else(|| {
            warn!("Template not found: {}.html", template_name);
            TemplateError::not_found(template_name, None)
        })?;

        let rendered = substitute(&body, context);

        if template_name == LAYOUT_TEMPLATE {
            return Ok(rendered);
        }

        match self.store.html(LAYOUT_TEMPLATE)? {
            Some(layout) => {
                let mut layout_context = context.clone();
                layout_context.insert("content", rendered);
                Ok(substitute(&layout, &layout_context))
            }
            None => Ok(rendered),
        }
    }
}
