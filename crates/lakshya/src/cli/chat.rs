//! Interactive counselor chat over stdin.

use lakshya::{AppContext, CancellationToken, StudentProfile, TurnStatus};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Read student messages line by line and stream each reply to stdout.
///
/// Ctrl-C cancels the reply in progress and ends the session. The last
/// save is awaited before returning.
pub async fn run_chat(
    app: &AppContext,
    profile: StudentProfile,
    session: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut chat = app.chat(profile, session).await?;
    if !chat.transcript().is_empty() {
        println!("(resumed session '{}', {} messages)", session, chat.transcript().len());
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_save = None;

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        print!("disha> ");
        let mut printed = 0;
        let turn = chat
            .send_turn(
                text,
                |snapshot| {
                    // Snapshots are cumulative; print only the new tail
                    print!("{}", &snapshot[printed..]);
                    let _ = std::io::stdout().flush();
                    printed = snapshot.len();
                },
                &cancel,
            )
            .await;

        match turn.status {
            TurnStatus::Complete => println!(),
            TurnStatus::Interrupted => println!(" [interrupted]"),
            TurnStatus::Failed => println!("{}", turn.reply),
        }
        if let Some(error) = &turn.error {
            warn!(error = %error.kind, "Turn did not complete");
        }
        if let Some(save) = turn.persistence {
            last_save = Some(save);
        }

        if cancel.is_cancelled() {
            break;
        }
    }

    if let Some(save) = last_save {
        let saved = save.await?;
        debug!(saved, "Final save finished");
    }
    Ok(())
}
