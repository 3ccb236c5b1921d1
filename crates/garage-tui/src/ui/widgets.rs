//! Small reusable building blocks shared by cards, forms, and tabs.
//!
//! Widgets here return `Span`s, `Line`s, or `Block`s rather than drawing,
//! so callers can compose them into a single `Paragraph`.

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::styles::Palette;

const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Width of the text inside an input box.
const INPUT_WIDTH: usize = 32;

// ============================================================================
// Button
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    Primary,
    Outline,
    Danger,
}

#[derive(Debug, Clone, Copy)]
pub struct Button<'a> {
    pub label: &'a str,
    pub key: &'a str,
    pub variant: ButtonVariant,
    pub loading: bool,
    pub disabled: bool,
}

impl<'a> Button<'a> {
    pub fn new(label: &'a str, key: &'a str, variant: ButtonVariant) -> Self {
        Self {
            label,
            key,
            variant,
            loading: false,
            disabled: false,
        }
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Text shown inside the brackets. A loading button shows the spinner
    /// and cannot be activated.
    pub fn text(&self, tick: u64) -> String {
        if self.loading {
            format!("{} {}...", spinner_frame(tick), self.label)
        } else {
            format!("{} {}", self.key, self.label)
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.loading && !self.disabled
    }

    pub fn span(&self, palette: &Palette, tick: u64) -> Span<'static> {
        let style = if !self.is_enabled() {
            palette.muted_style()
        } else {
            match self.variant {
                ButtonVariant::Primary => palette.title_style().add_modifier(Modifier::REVERSED),
                ButtonVariant::Outline => palette.text_style(),
                ButtonVariant::Danger => palette.error_style().add_modifier(Modifier::BOLD),
            }
        };
        Span::styled(format!("[ {} ]", self.text(tick)), style)
    }
}

// ============================================================================
// Input
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    pub error: Option<&'a str>,
    pub focused: bool,
    pub required: bool,
}

impl<'a> Input<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            placeholder: "",
            error: None,
            focused: false,
            required: false,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Label line, value line, and an error line when invalid.
    pub fn lines(&self, palette: &Palette) -> Vec<Line<'static>> {
        let mut label = vec![Span::styled(self.label.to_string(), palette.text_style())];
        if self.required {
            label.push(Span::styled(" *", palette.error_style()));
        }

        let border = if self.error.is_some() {
            palette.error_style()
        } else {
            palette.border_style(self.focused)
        };
        let (shown, style) = if self.value.is_empty() && !self.focused {
            (self.placeholder.to_string(), palette.muted_style())
        } else {
            (tail(self.value, INPUT_WIDTH - 1), palette.text_style())
        };
        let cursor = if self.focused { "▌" } else { "" };
        let padding = INPUT_WIDTH.saturating_sub(shown.chars().count() + cursor.chars().count());
        let value_style = if self.focused {
            style.patch(palette.selected_style())
        } else {
            style
        };

        let mut lines = vec![
            Line::from(label),
            Line::from(vec![
                Span::styled("[", border),
                Span::styled(format!("{}{}{}", shown, cursor, " ".repeat(padding)), value_style),
                Span::styled("]", border),
            ]),
        ];
        if let Some(error) = self.error {
            lines.push(Line::from(Span::styled(error.to_string(), palette.error_style())));
        }
        lines
    }
}

/// Last `max` chars of `s`, so the cursor end stays visible.
fn tail(s: &str, max: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(max)).collect()
}

// ============================================================================
// Modal
// ============================================================================

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// Draw `lines` in a bordered dialog centered over `area`.
pub fn render_modal(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line<'static>>,
    width: u16,
    palette: &Palette,
) {
    let height = lines.len() as u16 + 2;
    let dialog = centered_rect_fixed(width, height, area);
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(palette.title_style())
        .borders(Borders::ALL)
        .border_style(palette.border_style(true));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, dialog);
}

// ============================================================================
// Badge, Card, Spinner
// ============================================================================

pub fn badge(text: &str, palette: &Palette) -> Span<'static> {
    Span::styled(format!(" {} ", text), palette.selected_style())
}

/// Bordered block for one card; the selected card gets the focus border.
pub fn card_block(title: String, selected: bool, palette: &Palette) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(palette.title_style())
        .borders(Borders::ALL)
        .border_style(palette.border_style(selected))
}

pub fn spinner_frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick as usize / 2) % SPINNER_FRAMES.len()]
}

/// A spinner followed by a message.
pub fn spinner_line(message: &str, tick: u64, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{} ", spinner_frame(tick)), palette.highlight_style()),
        Span::styled(message.to_string(), palette.muted_style()),
    ])
}
