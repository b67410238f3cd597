use mailnote::*;
use mailnote::config::{Config, ConfigBuilder};

use std::process::ExitCode;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_appender::non_blocking::WorkerGuard;


fn main() -> ExitCode {

    let _logging_guard = setup_tracing();

    let args = Args::build();

    if let Command::GenerateConfig { path } = &args.command {
        return match Config::generate(path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(args.command, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<Config, anyhow::Error> {
    let builder = if args.config.exists() {
        ConfigBuilder::from_file(&args.config).map_err(anyhow::Error::msg)?
    } else {
        warn!("Config file {} not found, using defaults", args.config.display());
        ConfigBuilder::new()
    };

    let builder = match &args.templates {
        Some(dir) => builder.with_templates_dir(dir),
        None => builder,
    };

    builder.with_env_credentials().build()
}

fn run(command: Command, config: &Config) -> Result<bool, anyhow::Error> {
    let service = EmailService::from_config(config)?;

    let sent = match command {
        Command::Render { name, locale, html, vars, json } => {
            let context = render_context(vars, json.as_deref())?;
            let rendered = render_body(
                service.templates(),
                &config.app,
                &name,
                locale.as_deref(),
                html,
                &context,
            )?;
            let unresolved = templates::placeholders(&rendered);
            if !unresolved.is_empty() {
                warn!("Unresolved placeholders in {}: {}", name, unresolved.join(", "));
            }
            println!("{}", rendered);
            return Ok(true);
        }
        Command::SendWelcome { recipient } => service.send_welcome(&recipient)?,
        Command::SendPasswordReset { recipient, token } => {
            service.send_password_reset(&recipient, &token)?
        }
        Command::SendGroupApproval { recipient, group_name } => {
            service.send_group_approval(&recipient, &group_name)?
        }
        Command::GenerateConfig { .. } => return Ok(true),
    };

    info!("Notification {}", if sent { "sent" } else { "not sent" });
    Ok(sent)
}

pub fn setup_tracing() -> WorkerGuard {
    let default_filter = if cfg!(debug_assertions) {
        "debug,lettre=info"
    } else {
        "info"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let file_appender = tracing_appender::rolling::daily("./logs", "mailnote.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
