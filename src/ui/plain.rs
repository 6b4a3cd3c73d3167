use crate::model::SampleEvent;
use crate::ui::Presenter;
use anyhow::Result;
use chrono::Local;
use std::io::{stdout, Write};
use tokio::sync::mpsc::Receiver;

pub fn spawn_plain(
    mut rx: Receiver<SampleEvent>,
    mut presenter: Presenter,
) -> tokio::task::JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let mut out = stdout();
        while let Some(event) = rx.recv().await {
            writeln!(out, "{}", render_line(&mut presenter, &event))?;
            out.flush()?;
        }
        Ok(())
    })
}

/// Status line prefixed with the sample's local wall-clock time.
fn render_line(presenter: &mut Presenter, event: &SampleEvent) -> String {
    let local = event.timestamp.with_timezone(&Local);
    format!("[{}] {}", local.format("%H:%M:%S"), presenter.render(&event.result))
}
