use crate::config::{SMTP, SmtpTls};
use crate::error::TransportError;

use super::OutgoingEmail;

use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Address, Message, SmtpTransport, Transport,
};

use std::time::Duration;


/// Delivers composed messages.
///
/// Implementations block until the exchange with the server is finished.
pub trait MailTransport: Send + Sync {
    /// Whether credentials are configured. Without them the service skips sending.
    fn has_credentials(&self) -> bool;

    fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError>;
}

impl OutgoingEmail {
    /// Builds a multipart/alternative message with text and HTML parts.
    pub fn to_message(&self) -> Result<Message, TransportError> {
        let from = Mailbox::new(
            Some(self.sender_name.clone()),
            self.sender.parse::<Address>()?,
        );

        let email = Message::builder()
            .from(from)
            .to(self.recipient.parse::<Mailbox>()?)
            .subject(self.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(self.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(self.html.clone()),
                    ),
            )?;

        Ok(email)
    }
}

/// SMTP delivery through a blocking lettre transport.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
    credentials: bool,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    pub fn new(smtp: &SMTP) -> Result<Self, TransportError> {
        let builder = match smtp.tls {
            SmtpTls::StartTls => SmtpTransport::starttls_relay(&smtp.server)?,
            SmtpTls::Tls => SmtpTransport::relay(&smtp.server)?,
            SmtpTls::None => SmtpTransport::builder_dangerous(&smtp.server),
        };

        let credentials = Credentials::new(smtp.username.to_string(), smtp.password.to_string());

        let transport = builder
            .port(smtp.port)
            .timeout(Some(Duration::from_secs(smtp.timeout_secs)))
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            credentials: smtp.has_credentials(),
        })
    }
}

impl MailTransport for SmtpMailer {
    fn has_credentials(&self) -> bool {
        self.credentials
    }

    fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError> {
        if !self.credentials {
            return Err(TransportError::Credentials);
        }

        let message = email.to_message()?;
        self.transport.send(&message)?;

        Ok(())
    }
}
