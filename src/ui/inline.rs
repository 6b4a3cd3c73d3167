use crate::model::SampleEvent;
use crate::ui::Presenter;
use anyhow::Result;
use crossterm::cursor::{Hide, MoveToColumn, Show};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use std::io::{stdout, Write};
use tokio::sync::mpsc::Receiver;

/// Redraws one status line in place, like a panel indicator would.
pub fn spawn_inline(
    mut rx: Receiver<SampleEvent>,
    mut presenter: Presenter,
) -> tokio::task::JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let mut out = stdout();
        execute!(out, Hide)?;

        while let Some(event) = rx.recv().await {
            let line = presenter.render(&event.result);
            queue!(
                out,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(line.to_string())
            )?;
            out.flush()?;
        }

        execute!(out, Show, Print("\n"))?;
        Ok(())
    })
}
