use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info,lakshya=debug` with `verbose`
/// and `warn` without. Logs go to stderr so stdout stays free for chat
/// output and flow results. `json` switches to one JSON object per line.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_telemetry(verbose: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if verbose { "info,lakshya=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| {
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
        }))
        .try_init()?;

    debug!(verbose, json, "Telemetry initialized");
    Ok(())
}
