//! Diagnostic logging for the CLI.
//!
//! Off unless `MARTIAN_LOG` (or `RUST_LOG`) is set; the value uses `RUST_LOG`
//! filter syntax, e.g. `MARTIAN_LOG=martian::driver=trace`.
//! `MARTIAN_LOG_FORMAT=json` switches to one JSON object per event.
//! Everything goes to stderr so generated code on stdout stays clean.
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("MARTIAN_LOG_FORMAT").unwrap_or_default())
    }
}

fn build_filter() -> EnvFilter {
    match std::env::var("MARTIAN_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

pub fn init_tracing() {
    if std::env::var("MARTIAN_LOG").is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }
    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
