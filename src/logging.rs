//! Structured logging setup

use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  /// One JSON object per line
  Json,
  /// Multi-line, human oriented
  Pretty,
  Compact,
}

impl LogFormat {
  pub fn parse(value: &str) -> Self {
    match value.trim().to_lowercase().as_str() {
      "json" => LogFormat::Json,
      "compact" => LogFormat::Compact,
      _ => LogFormat::Pretty,
    }
  }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
  /// Default filter when RUST_LOG is unset
  pub level: String,
  pub format: LogFormat,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".into(),
      format: LogFormat::Pretty,
    }
  }
}

impl LoggingConfig {
  /// Defaults fill in whatever is unset
  pub fn from_env() -> Self {
    let defaults = Self::default();
    Self {
      level: env::var("RUST_LOG").unwrap_or(defaults.level),
      format: env::var("LOG_FORMAT")
        .map(|v| LogFormat::parse(&v))
        .unwrap_or(defaults.format),
    }
  }

  fn filter(&self) -> EnvFilter {
    // HTTP and pool internals are noisy at info
    EnvFilter::new(&self.level)
      .add_directive("hyper=warn".parse().unwrap_or_else(|_| tracing::Level::WARN.into()))
      .add_directive("reqwest=warn".parse().unwrap_or_else(|_| tracing::Level::WARN.into()))
      .add_directive("sqlx=warn".parse().unwrap_or_else(|_| tracing::Level::WARN.into()))
  }

  /// Install the global subscriber. Logs go to stderr so stdout stays
  /// clean for command output.
  pub fn init(&self) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(self.filter());

    match self.format {
      LogFormat::Json => registry
        .with(fmt::layer().json().with_target(true).with_writer(io::stderr))
        .try_init()?,
      LogFormat::Pretty => registry
        .with(fmt::layer().pretty().with_target(true).with_writer(io::stderr))
        .try_init()?,
      LogFormat::Compact => registry
        .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
        .try_init()?,
    }

    info!(
      service.version = env!("CARGO_PKG_VERSION"),
      log.level = %self.level,
      log.format = ?self.format,
      "Logging initialized"
    );

    Ok(())
  }
}
