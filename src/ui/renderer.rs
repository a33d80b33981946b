//! The chat surface: header, scrolling transcript, and the draft input box.

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

use crate::core::constants::INPUT_PLACEHOLDER;
use crate::core::message::Message;
use crate::core::transcript::TranscriptStore;
use crate::ui::fault_boundary::{render_fallback, Surface};
use crate::ui::text_wrapping::wrap_text;
use crate::ui::theme::Theme;

const USER_LABEL: &str = "You";
const ASSISTANT_LABEL: &str = "Agents";

pub struct ChatView {
    title: String,
    theme: Theme,
    input: TextArea<'static>,
    /// Rows scrolled up from the newest message; 0 follows the tail.
    scroll_from_bottom: u16,
    transcript_height: u16,
    pulse_start: Instant,
}

impl ChatView {
    pub fn new(title: impl Into<String>, theme: Theme) -> Self {
        let input = fresh_input(&theme);
        Self {
            title: title.into(),
            theme,
            input,
            scroll_from_bottom: 0,
            transcript_height: 0,
            pulse_start: Instant::now(),
        }
    }

    /// Current unsent text.
    pub fn draft(&self) -> String {
        self.input.lines().join("\n")
    }

    pub fn clear_draft(&mut self) {
        self.input = fresh_input(&self.theme);
    }

    pub fn input_mut(&mut self) -> &mut TextArea<'static> {
        &mut self.input
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }

    /// Rows moved by one page-up/page-down press.
    pub fn page_rows(&self) -> u16 {
        self.transcript_height.saturating_sub(1).max(1)
    }

    pub fn draw(&mut self, f: &mut Frame, store: &TranscriptStore) {
        let [header_area, transcript_area, input_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .areas(f.area());

        let header = Paragraph::new(Line::from(format!(" {}", self.title)))
            .style(self.theme.header_style);
        f.render_widget(header, header_area);

        let pending = store.is_pending();
        self.draw_transcript(f, transcript_area, store, pending);
        self.draw_input(f, input_area, pending);
    }

    fn draw_transcript(
        &mut self,
        f: &mut Frame,
        area: Rect,
        store: &TranscriptStore,
        pending: bool,
    ) {
        let width = area.width.max(1) as usize;
        let mut lines =
            store.with_messages(|messages| transcript_lines(messages, &self.theme, width));

        if pending {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(vec![
                Span::styled(ASSISTANT_LABEL, self.theme.assistant_prefix_style),
                Span::styled(
                    format!(" are working {}", self.pulse_symbol()),
                    self.theme.pending_indicator_style,
                ),
            ]));
        }

        self.transcript_height = area.height;
        let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let max_offset = total.saturating_sub(area.height);
        self.scroll_from_bottom = self.scroll_from_bottom.min(max_offset);
        let offset = max_offset - self.scroll_from_bottom;

        let transcript = Paragraph::new(lines).scroll((offset, 0));
        f.render_widget(transcript, area);
    }

    fn draw_input(&mut self, f: &mut Frame, area: Rect, pending: bool) {
        let (title, border_style, cursor_style) = if pending {
            (
                " Waiting for a reply… ",
                self.theme.input_disabled_style,
                Style::default(),
            )
        } else {
            (
                " Enter to send · PgUp/PgDn to scroll · Ctrl+C to quit ",
                self.theme.input_border_style,
                Style::default().add_modifier(Modifier::REVERSED),
            )
        };

        self.input.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(title, self.theme.input_title_style)),
        );
        self.input.set_cursor_style(cursor_style);
        self.input.set_style(if pending {
            self.theme.input_disabled_style
        } else {
            Style::default()
        });

        f.render_widget(&self.input, area);
    }

    fn pulse_symbol(&self) -> &'static str {
        let elapsed = self.pulse_start.elapsed().as_millis() as f32 / 1000.0;
        let phase = (elapsed * 2.0) % 2.0;
        let intensity = if phase < 1.0 { phase } else { 2.0 - phase };
        if intensity < 0.33 {
            "○"
        } else if intensity < 0.66 {
            "◐"
        } else {
            "●"
        }
    }
}

impl Surface for ChatView {
    fn render(&mut self, frame: &mut Frame, store: &TranscriptStore) {
        self.draw(frame, store);
    }

    fn on_fault(&mut self, frame: &mut Frame) {
        render_fallback(frame, self.theme.fallback_style);
    }
}

fn fresh_input(theme: &Theme) -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_placeholder_text(INPUT_PLACEHOLDER);
    input.set_placeholder_style(theme.placeholder_style);
    input.set_cursor_line_style(Style::default());
    input
}

/// Flatten messages into pre-wrapped display lines.
///
/// User messages are right-aligned, assistant messages left-aligned, with a
/// blank row between messages.
pub fn transcript_lines(
    messages: &[Message],
    theme: &Theme,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (index, message) in messages.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }

        let (label, label_style, text_style, alignment) = if message.is_user() {
            (
                USER_LABEL,
                theme.user_prefix_style,
                theme.user_text_style,
                Alignment::Right,
            )
        } else {
            (
                ASSISTANT_LABEL,
                theme.assistant_prefix_style,
                theme.assistant_text_style,
                Alignment::Left,
            )
        };

        lines.push(Line::from(Span::styled(label, label_style)).alignment(alignment));
        for row in wrap_text(&message.content, width) {
            lines.push(Line::from(Span::styled(row, text_style)).alignment(alignment));
        }
    }

    lines
}
