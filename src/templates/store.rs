use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::TemplateError;


/// Read-only source of template bodies.
///
/// Text bodies are keyed by `(locale, name)`, HTML bodies by `name` alone.
/// A missing entry is `Ok(None)`; errors are reserved for entries that exist
/// but cannot be read.
pub trait TemplateStore: Send + Sync {
    fn text(&self, locale: &str, name: &str) -> Result<Option<String>, TemplateError>;

    fn html(&self, name: &str) -> Result<Option<String>, TemplateError>;
}

/// Templates on disk: `<root>/<locale>/<name>.txt` and `<root>/<name>.html`.
///
/// Files are read on every lookup.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, path: PathBuf) -> Result<Option<String>, TemplateError> {
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No template file at {}", path.display());
                Ok(None)
            }
            Err(source) => Err(TemplateError::Io { path, source }),
        }
    }
}

impl TemplateStore for FileStore {
    fn text(&self, locale: &str, name: &str) -> Result<Option<String>, TemplateError> {
        if !safe_segment(locale) || !safe_segment(name) {
            return Ok(None);
        }
        self.read(self.root.join(locale).join(format!("{}.txt", name)))
    }

    fn html(&self, name: &str) -> Result<Option<String>, TemplateError> {
        if !safe_segment(name) {
            return Ok(None);
        }
        self.read(self.root.join(format!("{}.html", name)))
    }
}

// Keeps lookups inside the template root.
fn safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && !segment.contains("..")
        && !segment.contains(['/', '\\', '\0'])
}

/// In-memory templates.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    text: HashMap<(String, String), String>,
    html: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Templates shipped in the repository `templates/` directory.
    pub fn builtin() -> Self {
        let mut store = MemoryStore::new();
        for (locale, name, body) in BUILTIN_TEXT {
            store.insert_text(*locale, *name, *body);
        }
        for (name, body) in BUILTIN_HTML {
            store.insert_html(*name, *body);
        }
        store
    }

    pub fn insert_text(&mut self, locale: impl Into<String>, name: impl Into<String>, body: impl Into<String>) {
        self.text.insert((locale.into(), name.into()), body.into());
    }

    pub fn insert_html(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.html.insert(name.into(), body.into());
    }

    pub fn with_text(mut self, locale: &str, name: &str, body: &str) -> Self {
        self.insert_text(locale, name, body);
        self
    }

    pub fn with_html(mut self, name: &str, body: &str) -> Self {
        self.insert_html(name, body);
        self
    }
}

impl TemplateStore for MemoryStore {
    fn text(&self, locale: &str, name: &str) -> Result<Option<String>, TemplateError> {
        Ok(self.text.get(&(locale.to_string(), name.to_string())).cloned())
    }

    fn html(&self, name: &str) -> Result<Option<String>, TemplateError> {
        Ok(self.html.get(name).cloned())
    }
}

const BUILTIN_TEXT: &[(&str, &str, &str)] = &[
    ("cs", "welcome", include_str!("../../templates/cs/welcome.txt")),
    ("cs", "password_reset", include_str!("../../templates/cs/password_reset.txt")),
    ("cs", "group_approval", include_str!("../../templates/cs/group_approval.txt")),
    ("en", "welcome", include_str!("../../templates/en/welcome.txt")),
    ("en", "password_reset", include_str!("../../templates/en/password_reset.txt")),
    ("en", "group_approval", include_str!("../../templates/en/group_approval.txt")),
];

const BUILTIN_HTML: &[(&str, &str)] = &[
    ("base", include_str!("../../templates/base.html")),
    ("welcome", include_str!("../../templates/welcome.html")),
    ("password_reset", include_str!("../../templates/password_reset.html")),
    ("group_approval", include_str!("../../templates/group_approval.html")),
];
