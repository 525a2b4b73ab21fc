use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, prelude::*};

/// Install color-eyre for binaries.
///
/// Call this early in main() before any fallible operations. Safe to call
/// multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Directives used when `RUST_LOG` is not set
///
/// Driver internals stay at `warn`; the driver logs every topology refresh at `info`.
pub fn default_filter(environment: &Environment) -> &'static str {
    if environment.is_production() {
        "info,scylla=warn"
    } else {
        "debug,scylla=warn"
    }
}

/// Initialize tracing with environment-aware output and span capture for errors.
///
/// - **Production** (`APP_ENV=production`): flattened JSON events, no targets
/// - **Development** (default): pretty, human-readable events
///
/// Both register `tracing_error::ErrorLayer` so `color-eyre` reports carry span
/// traces. `RUST_LOG` overrides [`default_filter`].
///
/// Returns `false` when a global subscriber was already installed (common in tests).
pub fn init_tracing(environment: &Environment) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(environment)));

    let result = if environment.is_production() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(()) => {
            info!(environment = ?environment, "Tracing initialized");
            true
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_per_environment() {
        assert_eq!(
            default_filter(&Environment::Production),
            "info,scylla=warn"
        );
        assert_eq!(
            default_filter(&Environment::Development),
            "debug,scylla=warn"
        );
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        // Whichever call wins, the second one must not install again
        let env = Environment::Development;
        init_tracing(&env);
        assert!(!init_tracing(&env));
    }

    #[test]
    fn test_init_tracing_with_rust_log_env() {
        temp_env::with_var("RUST_LOG", Some("warn,repository=trace"), || {
            // Should not panic
            init_tracing(&Environment::Production);
        });
    }
}
