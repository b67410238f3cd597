mod generate;

use serde::{Serialize, Deserialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::templates::DEFAULT_LOCALE;

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    app: Option<App>,
    smtp: Option<SMTP>,
    templates: Option<Templates>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();

        let config_content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return Err(format!("Failed to read config file: {}", e)),
        };

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        let config: Config = match toml::from_str(content) {
            Ok(config) => config,
            Err(e) => return Err(format!("Failed to parse config file: {}", e)),
        };

        Ok(Self {
            app: Some(config.app),
            smtp: Some(config.smtp),
            templates: Some(config.templates),
        })
    }

    pub fn with_app(mut self, app: App) -> Self {
        self.app = Some(app);
        self
    }

    pub fn with_smtp(mut self, smtp: SMTP) -> Self {
        self.smtp = Some(smtp);
        self
    }

    pub fn with_smtp_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        let smtp = self.smtp.get_or_insert(SMTP::default());
        if let Some(username) = username {
            smtp.username = username;
        }
        if let Some(password) = password {
            smtp.password = password;
        }
        self
    }

    /// Applies `SMTP_USER` (or `SMTP_USERNAME`) and `SMTP_PASSWORD` from the environment, when set.
    pub fn with_env_credentials(self) -> Self {
        self.with_credentials_from(|name| std::env::var(name).ok())
    }

    fn with_credentials_from(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let username = lookup("SMTP_USER").or_else(|| lookup("SMTP_USERNAME"));
        self.with_smtp_credentials(username, lookup("SMTP_PASSWORD"))
    }

    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let templates = self.templates.get_or_insert(Templates::default());
        templates.dir = Some(dir.into());
        self
    }

    pub fn with_locale(mut self, locale: String) -> Self {
        let app = self.app.get_or_insert(App::default());
        app.locale = locale;
        self
    }

    pub fn build(self) -> Result<Config, anyhow::Error> {
        let app = self.app.unwrap_or_default();

        if app.name.trim().is_empty() {
            return Err(anyhow::anyhow!("app.name must not be empty"));
        }

        if !app.password_reset_url.contains(TOKEN_PLACEHOLDER) {
            return Err(anyhow::anyhow!(
                "app.password_reset_url must contain {}: {}",
                TOKEN_PLACEHOLDER,
                app.password_reset_url
            ));
        }

        if !valid_locale(&app.locale) {
            return Err(anyhow::anyhow!("app.locale is not a valid locale code: {}", app.locale));
        }

        Ok(Config {
            app,
            smtp: self.smtp.unwrap_or_default(),
            templates: self.templates.unwrap_or_default(),
        })
    }
}

const TOKEN_PLACEHOLDER: &str = "{token}";
const APP_URL_PLACEHOLDER: &str = "{app_url}";

fn valid_locale(locale: &str) -> bool {
    (2..=3).contains(&locale.len()) && locale.chars().all(|c| c.is_ascii_lowercase())
}

impl Config {
    pub fn is_smtp_configured(&self) -> bool {
        self.smtp.has_credentials()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub smtp: SMTP,
    #[serde(default)]
    pub templates: Templates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    pub name: String,
    pub url: String,
    pub locale: String,
    pub password_reset_url: String,
    pub reset_expiry_hours: u32,
}

impl Default for App {
    fn default() -> Self {
        App {
            name: "RaSl Data Browser".to_string(),
            url: "http://localhost:8501".to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            password_reset_url: format!("{}?reset_token={}", APP_URL_PLACEHOLDER, TOKEN_PLACEHOLDER),
            reset_expiry_hours: 1,
        }
    }
}

impl App {
    /// Expands `{app_url}` and `{token}` in the configured reset URL pattern.
    ///
    /// The token is inserted as given.
    pub fn reset_url(&self, token: &str) -> String {
        self.password_reset_url
            .replace(APP_URL_PLACEHOLDER, &self.url)
            .replace(TOKEN_PLACEHOLDER, token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SMTP {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender_name: String,
    /// From address. Falls back to `username` when empty.
    pub account: String,
    pub timeout_secs: u64,
    pub tls: SmtpTls,
}

impl Default for SMTP {
    fn default() -> Self {
        SMTP {
            server: "smtp.gmail.com".to_string(),
            port: 587,
            username: "".to_string(),
            password: "".to_string(),
            sender_name: "Data Browser".to_string(),
            account: "".to_string(),
            timeout_secs: 10,
            tls: SmtpTls::default(),
        }
    }
}

impl SMTP {
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn sender_address(&self) -> &str {
        if self.account.is_empty() {
            &self.username
        } else {
            &self.account
        }
    }
}

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    #[default]
    StartTls,
    Tls,
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    /// Template directory. Built-in templates are used when unset.
    pub dir: Option<PathBuf>,
}
