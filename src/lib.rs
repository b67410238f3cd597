pub mod config;
pub mod templates;
pub mod email;
pub mod error;

pub use email::{DeliveryOutcome, EmailService, MailTransport, Notification, SmtpMailer};
pub use error::{TemplateError, TransportError};
pub use templates::{Context, EmailTemplates};


use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
pub struct Args {
    #[arg(short, long, default_value = "config.toml")]
    pub config: std::path::PathBuf,
    /// Override the template directory from the config file
    #[arg(short, long)]
    pub templates: Option<std::path::PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render a template and print it
    Render {
        name: String,
        #[arg(short, long)]
        locale: Option<String>,
        /// Render the HTML body instead of the text body
        #[arg(long)]
        html: bool,
        /// Context value as key=value, may be repeated
        #[arg(short = 'v', long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        /// JSON object with context values, read from a file or `-` for stdin.
        /// `--var` entries override its members.
        #[arg(long)]
        json: Option<std::path::PathBuf>,
    },
    /// Send the welcome email
    SendWelcome {
        recipient: String,
    },
    /// Send a password reset link
    SendPasswordReset {
        recipient: String,
        token: String,
    },
    /// Notify a user that their group request was approved
    SendGroupApproval {
        recipient: String,
        group_name: String,
    },
    /// Write a sample configuration file
    GenerateConfig {
        #[arg(default_value = "config.toml")]
        path: std::path::PathBuf,
    },
}

impl Args {
    pub fn build() -> Self {
        Args::parse()
    }
}

/// Context for the `render` command: members of the JSON input, overridden by `--var` pairs.
///
/// A JSON path of `-` reads standard input.
pub fn render_context(
    vars: Vec<(String, String)>,
    json: Option<&std::path::Path>,
) -> Result<Context, anyhow::Error> {
    let mut context = match json {
        Some(path) => {
            let raw = if path.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin())?
            } else {
                std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?
            };
            let data: serde_json::Value = serde_json::from_str(&raw)?;
            Context::from_json(data)
        }
        None => Context::new(),
    };

    for (key, value) in vars {
        context.insert(key, value);
    }

    Ok(context)
}

/// Renders one body the way the send commands would, in the configured
/// locale unless another one is requested.
pub fn render_body(
    templates: &EmailTemplates,
    app: &config::App,
    name: &str,
    locale: Option<&str>,
    html: bool,
    context: &Context,
) -> Result<String, TemplateError> {
    if html {
        templates.render_html(name, context)
    } else {
        templates.render_text(name, context, Some(locale.unwrap_or(&app.locale)))
    }
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got: {}", s)),
    }
}
