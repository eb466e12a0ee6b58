//! Console logging, plus a daily log file in production.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn default_filter(is_production: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("debug")
        }
    })
}

/// Initialize the global subscriber. `RUST_LOG` overrides the level.
pub fn setup(is_production: bool, log_dir: &Path) {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_filter(default_filter(is_production));

    let file_layer = if is_production {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
            None
        } else {
            let file_appender =
                RollingFileAppender::new(Rotation::DAILY, log_dir, "inputhook-monitor.log");
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(file_appender)
                    .with_filter(EnvFilter::new("info")),
            )
        }
    } else {
        None
    };

    let registry = tracing_subscriber::registry().with(console_layer);
    let initialized = match file_layer {
        Some(file_layer) => registry.with(file_layer).try_init(),
        None => registry.try_init(),
    };
    if initialized.is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
        return;
    }

    if is_production {
        tracing::info!("File logging enabled: {:?}", log_dir);
    }
    tracing::info!("Logging initialized (production={})", is_production);
}
