//! Flow command handler.

use lakshya::{AppContext, CancellationToken, FlowError, FlowErrorKind, FlowKind};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Run flow `name` on the JSON in `input` and print the result.
pub async fn run_flow(
    app: &AppContext,
    name: &str,
    input: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = FlowKind::from_str(name)
        .map_err(|_| FlowError::new(FlowErrorKind::UnknownFlow(name.to_string())))?;

    let text = tokio::fs::read_to_string(input).await?;
    let input: serde_json::Value = serde_json::from_str(&text)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    info!(flow = %kind, "Running flow");
    let output = app.flow_runner().run_named(kind, input, &cancel).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
