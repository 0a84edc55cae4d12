use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;

use leadflow_enricher::RunEvent;

const TEMPLATE: &str = "{bar:40.cyan/blue} {pos:>3}% {msg}";

/// Drive a progress bar from run events until the sender is dropped.
pub async fn render(mut rx: UnboundedReceiver<RunEvent>) {
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
        bar.set_style(style.progress_chars("=> "));
    }

    while let Some(event) = rx.recv().await {
        match &event {
            RunEvent::RunStarted { .. } => {
                bar.reset();
                bar.set_message(event.to_string());
            }
            RunEvent::BatchStarted { index, total, .. } => {
                bar.set_message(format!("batch {index}/{total}"));
            }
            RunEvent::BatchFailed { .. } => bar.println(event.to_string()),
            RunEvent::Progress { percent, .. } => bar.set_position(u64::from(*percent)),
            RunEvent::RunCompleted { .. } => bar.finish_with_message(event.to_string()),
            RunEvent::RunPaused { .. } | RunEvent::RunFailed { .. } => {
                bar.abandon_with_message(event.to_string())
            }
            RunEvent::BatchCompleted { .. } => {}
        }
    }
}
