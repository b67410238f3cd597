use crate::config::{App, Config};
use crate::error::{TemplateError, TransportError};
use crate::templates::{EmailTemplates, FileStore};

use super::{DeliveryOutcome, MailTransport, Notification, OutgoingEmail, SkipReason, SmtpMailer};

use tracing::{error, info, warn};


/// Renders notifications and hands them to a [`MailTransport`].
///
/// Holds only read-only state, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct EmailService<T = SmtpMailer> {
    transport: T,
    templates: EmailTemplates,
    app: App,
    sender_name: String,
    sender: String,
}

impl EmailService<SmtpMailer> {
    /// SMTP-backed service. Templates come from `templates.dir`, or the
    /// built-in set when no directory is configured.
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let templates = match &config.templates.dir {
            Some(dir) => EmailTemplates::new(FileStore::new(dir)),
            None => EmailTemplates::builtin(),
        };

        let transport = SmtpMailer::new(&config.smtp)?;

        Ok(Self::new(config, templates, transport))
    }
}

impl<T: MailTransport> EmailService<T> {
    pub fn new(config: &Config, templates: EmailTemplates, transport: T) -> Self {
        Self {
            transport,
            templates,
            app: config.app.clone(),
            sender_name: config.smtp.sender_name.clone(),
            sender: config.smtp.sender_address().to_string(),
        }
    }

    pub fn templates(&self) -> &EmailTemplates {
        &self.templates
    }

    /// Renders and sends one notification.
    ///
    /// A missing template is returned as an error. Transport problems never
    /// are: they come back as [`DeliveryOutcome::Failed`].
    pub fn notify(
        &self,
        recipient: &str,
        notification: &Notification,
    ) -> Result<DeliveryOutcome, TemplateError> {
        if !self.transport.has_credentials() {
            warn!("SMTP is not configured, skipping {} email to {}", notification, recipient);
            return Ok(DeliveryOutcome::Skipped(SkipReason::CredentialsAbsent));
        }

        let name = notification.template_name();
        let context = notification.context(&self.app);

        let text = self.templates.render_text(name, &context, Some(&self.app.locale))?;
        let html = self.templates.render_html(name, &context)?;

        let email = OutgoingEmail {
            sender_name: self.sender_name.clone(),
            sender: self.sender.clone(),
            recipient: recipient.to_string(),
            subject: notification.subject(&self.app),
            text,
            html,
        };

        match self.transport.send(&email) {
            Ok(()) => {
                info!("Email successfully sent to {} ({})", recipient, notification);
                Ok(DeliveryOutcome::Sent)
            }
            Err(TransportError::Credentials) => {
                warn!("SMTP is not configured, skipping {} email to {}", notification, recipient);
                Ok(DeliveryOutcome::Skipped(SkipReason::CredentialsAbsent))
            }
            Err(e) => {
                error!("Failed to send {} email to {}: {}", notification, recipient, e);
                Ok(DeliveryOutcome::Failed(e))
            }
        }
    }

    pub fn send_welcome(&self, recipient: &str) -> Result<bool, TemplateError> {
        self.notify(recipient, &Notification::Welcome)
            .map(bool::from)
    }

    pub fn send_password_reset(&self, recipient: &str, reset_token: &str) -> Result<bool, TemplateError> {
        let notification = Notification::PasswordReset {
            token: reset_token.to_string(),
        };
        self.notify(recipient, &notification).map(bool::from)
    }

    pub fn send_group_approval(&self, recipient: &str, group_name: &str) -> Result<bool, TemplateError> {
        let notification = Notification::GroupApproval {
            group_name: group_name.to_string(),
        };
        self.notify(recipient, &notification).map(bool::from)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::templates::MemoryStore;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingTransport {
        credentials: bool,
        fail_auth: bool,
        fail_protocol: bool,
        attempts: AtomicUsize,
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    impl RecordingTransport {
        fn ready() -> Self {
            Self {
                credentials: true,
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MailTransport for RecordingTransport {
        fn has_credentials(&self) -> bool {
            self.credentials
        }

        fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_auth {
                return Err(TransportError::Authentication("535 5.7.8 bad credentials".to_string()));
            }
            if self.fail_protocol {
                return Err(TransportError::Protocol("554 5.6.0 message rejected".to_string()));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn config() -> Config {
        ConfigBuilder::from_toml(
            r#"
            [app]
            name = "Demo"
            url = "https://app"
            password_reset_url = "https://app/reset?token={token}"

            [smtp]
            username = "bot@example.com"
            password = "secret"
            sender_name = "Demo Bot"
            "#,
        )
        .unwrap()
        .build()
        .unwrap()
    }

    fn service(transport: RecordingTransport) -> EmailService<RecordingTransport> {
        EmailService::new(&config(), EmailTemplates::builtin(), transport)
    }

    #[test]
    fn test_send_welcome() {
        let service = service(RecordingTransport::ready());
        assert!(service.send_welcome("a@b.com").unwrap());

        let sent = service.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "a@b.com");
        assert_eq!(sent[0].sender, "bot@example.com");
        assert_eq!(sent[0].sender_name, "Demo Bot");
        assert_eq!(sent[0].subject, "Vítejte v Demo");
        assert!(sent[0].text.contains("Vítejte v aplikaci Demo!"));
        assert!(sent[0].text.contains("https://app"));
        assert!(sent[0].html.contains("<a href=\"https://app\""));
    }

    #[test]
    fn test_send_password_reset_embeds_token() {
        let service = service(RecordingTransport::ready());
        assert!(service.send_password_reset("a@b.com", "tok123").unwrap());

        let sent = service.transport.sent();
        assert!(sent[0].text.contains("https://app/reset?token=tok123"));
        assert!(sent[0].html.contains("https://app/reset?token=tok123"));
        assert!(sent[0].text.contains("1 hod."));
        assert!(!sent[0].text.contains("{{"));
    }

    #[test]
    fn test_send_group_approval() {
        let service = service(RecordingTransport::ready());
        assert!(service.send_group_approval("a@b.com", "Finance").unwrap());

        let sent = service.transport.sent();
        assert_eq!(sent[0].subject, "Žádost o skupinu schválena - Demo");
        assert!(sent[0].html.contains("<strong>Finance</strong>"));
    }

    #[test]
    fn test_skips_without_credentials() {
        let service = service(RecordingTransport::default());

        assert!(!service.send_welcome("a@b.com").unwrap());
        let outcome = service.notify("a@b.com", &Notification::Welcome).unwrap();
        assert!(matches!(outcome, DeliveryOutcome::Skipped(SkipReason::CredentialsAbsent)));
        assert_eq!(service.transport.attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_skip_does_not_need_templates() {
        let service = EmailService::new(
            &config(),
            EmailTemplates::new(MemoryStore::new()),
            RecordingTransport::default(),
        );
        assert!(!service.send_welcome("a@b.com").unwrap());
    }

    #[test]
    fn test_transport_failure_becomes_false() {
        let transport = RecordingTransport {
            fail_auth: true,
            ..RecordingTransport::ready()
        };
        let service = service(transport);

        assert!(!service.send_welcome("a@b.com").unwrap());
        let outcome = service.notify("a@b.com", &Notification::Welcome).unwrap();
        assert!(matches!(outcome, DeliveryOutcome::Failed(TransportError::Authentication(_))));
        assert_eq!(service.transport.attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_protocol_failure_becomes_false() {
        let transport = RecordingTransport {
            fail_protocol: true,
            ..RecordingTransport::ready()
        };
        let service = service(transport);

        let notification = Notification::PasswordReset { token: "tok".to_string() };
        let outcome = service.notify("a@b.com", &notification).unwrap();
        assert!(matches!(outcome, DeliveryOutcome::Failed(TransportError::Protocol(_))));

        assert!(!service.send_password_reset("a@b.com", "tok").unwrap());
        assert!(!service.send_group_approval("a@b.com", "Finance").unwrap());
        assert!(!service.send_welcome("a@b.com").unwrap());
        assert!(service.transport.sent().is_empty());
    }

    #[test]
    fn test_missing_template_is_error() {
        let service = EmailService::new(
            &config(),
            EmailTemplates::new(MemoryStore::new().with_html("welcome", "<p>hi</p>")),
            RecordingTransport::ready(),
        );

        let err = service.send_welcome("a@b.com").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(service.transport.attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_locale_fallback_for_text() {
        let config = ConfigBuilder::new()
            .with_locale("de".to_string())
            .with_smtp_credentials(Some("bot@example.com".to_string()), Some("x".to_string()))
            .build()
            .unwrap();
        let service = EmailService::new(&config, EmailTemplates::builtin(), RecordingTransport::ready());

        assert!(service.send_welcome("a@b.com").unwrap());
        assert!(service.transport.sent()[0].text.contains("Vítejte v aplikaci"));
    }

    #[test]
    fn test_english_locale() {
        let config = ConfigBuilder::new()
            .with_locale("en".to_string())
            .with_smtp_credentials(Some("bot@example.com".to_string()), Some("x".to_string()))
            .build()
            .unwrap();
        let service = EmailService::new(&config, EmailTemplates::builtin(), RecordingTransport::ready());

        assert!(service.send_group_approval("a@b.com", "Finance").unwrap());
        let sent = service.transport.sent();
        assert_eq!(sent[0].subject, "Group request approved - RaSl Data Browser");
        assert!(sent[0].text.contains("your request to join the group \"Finance\""));
    }

    #[test]
    fn test_concurrent_sends() {
        let service = service(RecordingTransport::ready());

        std::thread::scope(|s| {
            for i in 0..4 {
                let service = &service;
                s.spawn(move || {
                    let recipient = format!("user{}@example.com", i);
                    assert!(service.send_password_reset(&recipient, &format!("tok{}", i)).unwrap());
                });
            }
        });

        let sent = service.transport.sent();
        assert_eq!(sent.len(), 4);
        for email in sent {
            let n = email.recipient.trim_start_matches("user").trim_end_matches("@example.com");
            assert!(email.text.contains(&format!("token=tok{}", n)));
        }
    }
}
