use std::path::PathBuf;

use thiserror::Error;


#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {name} (locale: {})", .locale.as_deref().unwrap_or("none"))]
    NotFound {
        name: String,
        locale: Option<String>,
    },
    #[error("Failed to read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    pub fn not_found(name: &str, locale: Option<&str>) -> Self {
        TemplateError::NotFound {
            name: name.to_string(),
            locale: locale.map(str::to_string),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TemplateError::NotFound { .. })
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("SMTP credentials are not configured")]
    Credentials,
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),
    #[error("SMTP error: {0}")]
    Protocol(String),
    #[error("Invalid message: {0}")]
    Message(String),
}

impl From<lettre::address::AddressError> for TransportError {
    fn from(e: lettre::address::AddressError) -> Self {
        TransportError::Message(e.to_string())
    }
}

impl From<lettre::error::Error> for TransportError {
    fn from(e: lettre::error::Error) -> Self {
        TransportError::Message(e.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        let auth_failure = e
            .status()
            .map(|code| matches!(code.to_string().as_str(), "454" | "530" | "534" | "535"))
            .unwrap_or(false);

        if auth_failure {
            TransportError::Authentication(e.to_string())
        } else {
            TransportError::Protocol(e.to_string())
        }
    }
}
