//! Crash containment for the presentation surface.
//!
//! A [`FaultBoundary`] wraps a [`Surface`]. If rendering panics, the boundary
//! logs the fault, marks itself faulted, and from then on draws only the
//! surface's degraded view. Transcript and exchange state are never touched.

use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::Style,
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};
use tracing::error;

use crate::core::constants::RENDER_FALLBACK_MESSAGE;
use crate::core::transcript::TranscriptStore;
use crate::utils::logging::contain_panics;

pub trait Surface {
    fn render(&mut self, frame: &mut Frame, store: &TranscriptStore);

    /// Degraded view drawn once rendering has faulted.
    fn on_fault(&mut self, frame: &mut Frame) {
        render_fallback(frame, Style::default());
    }
}

pub fn render_fallback(frame: &mut Frame, style: Style) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);

    let message = Paragraph::new(RENDER_FALLBACK_MESSAGE)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(message, middle);
}

pub struct FaultBoundary<S> {
    inner: S,
    faulted: bool,
}

impl<S: Surface> FaultBoundary<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            faulted: false,
        }
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn draw(&mut self, frame: &mut Frame, store: &TranscriptStore) {
        if !self.faulted {
            let inner = &mut self.inner;
            match contain_panics(|| inner.render(frame, store)) {
                Ok(()) => return,
                Err(payload) => {
                    let reason = payload
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown".to_string());
                    error!(%reason, "Rendering faulted; switching to fallback view");
                    self.faulted = true;
                }
            }
        }

        // A panicking render may have left a partly drawn frame.
        let fallback = contain_panics(|| self.inner.on_fault(frame));
        if fallback.is_err() {
            render_fallback(frame, Style::default());
        }
    }
}
