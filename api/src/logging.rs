//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Crates whose events pass the default filter at the configured level.
/// Everything else (hyper, reqwest, tower_governor) stays at `warn`.
const SCOPED_TARGETS: [&str; 2] = ["mediakit_api", "tower_http"];

/// Expand the configured level into filter directives.
///
/// A bare level such as `debug` is scoped to this crate; anything already
/// containing directives (`=` or `,`) is used as written.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        return filter_directives(&LoggingConfig::default().level);
    }
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directives = String::from("warn");
    for target in SCOPED_TARGETS {
        directives.push_str(&format!(",{}={}", target, level));
    }
    directives
}

fn build_filter(config: &LoggingConfig) -> (EnvFilter, Option<String>) {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return (filter, None);
    }

    let directives = filter_directives(&config.level);
    match EnvFilter::try_new(&directives) {
        Ok(filter) => (filter, None),
        Err(e) => {
            let fallback = filter_directives(&LoggingConfig::default().level);
            let warning = format!("invalid LOG_LEVEL {:?} ({}), using {:?}", directives, e, fallback);
            (EnvFilter::new(fallback), Some(warning))
        }
    }
}

/// Install the global subscriber. RUST_LOG wins over the configured level.
pub fn init(config: &LoggingConfig) {
    let (filter, warning) = build_filter(config);

    let installed = if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = fmt::Subscriber::builder().with_env_filter(filter).finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };

    // A subscriber installed earlier (tests, embedding) keeps its own settings.
    if let (true, Some(warning)) = (installed, warning) {
        tracing::warn!("{}", warning);
    }
}
