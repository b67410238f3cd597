mod service;
pub use service::*;

mod transport;
pub use transport::*;

use std::fmt;

use crate::config::App;
use crate::error::TransportError;
use crate::templates::Context;


/// A composed message, ready for a [`MailTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub sender_name: String,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// The notification kinds the service knows how to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Welcome,
    PasswordReset { token: String },
    GroupApproval { group_name: String },
}

impl Notification {
    pub fn template_name(&self) -> &'static str {
        match self {
            Notification::Welcome => "welcome",
            Notification::PasswordReset { .. } => "password_reset",
            Notification::GroupApproval { .. } => "group_approval",
        }
    }

    pub fn context(&self, app: &App) -> Context {
        let context = Context::new()
            .with("app_name", &app.name)
            .with("app_url", &app.url);

        match self {
            Notification::Welcome => context,
            Notification::PasswordReset { token } => context
                .with("reset_url", app.reset_url(token))
                .with("expiry_hours", app.reset_expiry_hours),
            Notification::GroupApproval { group_name } => context.with("group_name", group_name),
        }
    }

    /// Subject line in the configured locale. Unknown locales get the Czech subject.
    pub fn subject(&self, app: &App) -> String {
        let name = &app.name;
        match (self, app.locale.as_str()) {
            (Notification::Welcome, "en") => format!("Welcome to {}", name),
            (Notification::Welcome, _) => format!("Vítejte v {}", name),
            (Notification::PasswordReset { .. }, "en") => format!("Password reset - {}", name),
            (Notification::PasswordReset { .. }, _) => format!("Reset hesla - {}", name),
            (Notification::GroupApproval { .. }, "en") => format!("Group request approved - {}", name),
            (Notification::GroupApproval { .. }, _) => {
                format!("Žádost o skupinu schválena - {}", name)
            }
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    CredentialsAbsent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::CredentialsAbsent => f.write_str("SMTP credentials are not configured"),
        }
    }
}

/// What happened to a notification once its bodies were rendered.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Sent,
    Skipped(SkipReason),
    Failed(TransportError),
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent)
    }
}

impl From<DeliveryOutcome> for bool {
    fn from(outcome: DeliveryOutcome) -> bool {
        outcome.is_sent()
    }
}
