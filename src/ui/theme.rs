use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Header bar
    pub header_style: Style,

    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,

    // Chrome
    pub pending_indicator_style: Style,
    pub input_border_style: Style,
    pub input_disabled_style: Style,
    pub input_title_style: Style,
    pub placeholder_style: Style,

    // Static text shown after a rendering fault
    pub fallback_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            header_style: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_prefix_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::White),
            pending_indicator_style: Style::default().fg(Color::Yellow),
            input_border_style: Style::default().fg(Color::Blue),
            input_disabled_style: Style::default().fg(Color::DarkGray),
            input_title_style: Style::default().fg(Color::Gray),
            placeholder_style: Style::default().fg(Color::DarkGray),
            fallback_style: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn monochrome() -> Self {
        Theme {
            header_style: Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED),
            user_prefix_style: Style::default().add_modifier(Modifier::BOLD),
            user_text_style: Style::default(),
            assistant_prefix_style: Style::default().add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default(),
            pending_indicator_style: Style::default().add_modifier(Modifier::DIM),
            input_border_style: Style::default(),
            input_disabled_style: Style::default().add_modifier(Modifier::DIM),
            input_title_style: Style::default(),
            placeholder_style: Style::default().add_modifier(Modifier::DIM),
            fallback_style: Style::default().add_modifier(Modifier::BOLD),
        }
    }

    /// `NO_COLOR` (https://no-color.org) selects the monochrome palette.
    pub fn from_env() -> Self {
        match std::env::var_os("NO_COLOR") {
            Some(value) if !value.is_empty() => Self::monochrome(),
            _ => Self::dark_default(),
        }
    }
}
