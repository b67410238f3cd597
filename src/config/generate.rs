use crate::config::Config;

use std::fs;
use std::path::Path;

use tracing::info;

impl Config {
    /// Writes a commented sample configuration, refusing to overwrite an existing file.
    pub fn generate(path: impl AsRef<Path>) -> Result<(), anyhow::Error> {
        let path = path.as_ref();

        if path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file already exists at: {}",
                path.display()
            ));
        }

        Config::write_template_config(path)?;
        info!("Configuration file created at: {}", path.display());
        Ok(())
    }

    pub fn write_template_config(path: impl AsRef<Path>) -> Result<(), anyhow::Error> {
        fs::write(path, CONFIG_TEMPLATE)
            .map_err(|e| anyhow::anyhow!("Failed to write config file: {}", e))?;
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r#"# Sample configuration file
# Copy this to config.toml and modify as needed

[app]
# Application name, available to templates as {{app_name}}
name = "RaSl Data Browser"
# Public URL, available to templates as {{app_url}}
url = "http://localhost:8501"
# Locale of plain-text bodies; missing variants fall back to "cs"
locale = "cs"
# Password reset link. {token} is replaced by the reset token,
# {app_url} by the url above.
password_reset_url = "{app_url}?reset_token={token}"
reset_expiry_hours = 1

[smtp]
server = "smtp.gmail.com"
port = 587
# Leave username or password empty to skip sending (test/sandbox mode).
# SMTP_USER (or SMTP_USERNAME) and SMTP_PASSWORD environment variables override these.
username = ""
password = ""
sender_name = "Data Browser"
# From address, defaults to username
# account = "noreply@example.com"
timeout_secs = 10
# "starttls", "tls" or "none"
tls = "starttls"

[templates]
# Directory with <locale>/<name>.txt and <name>.html files.
# Built-in templates are used when unset.
# dir = "templates"
"#;
