//! Tab-specific content rendering.
//!
//! - `cars`: search bar and car card grid
//! - `owners`: search bar and owner card grid
//! - `dashboard`: statistics summary and owner ranking

pub mod cars;
pub mod dashboard;
pub mod owners;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::styles::Palette;
use super::widgets::spinner_line;

/// Narrowest card before the grid drops a column.
const MIN_CARD_WIDTH: u16 = 36;
const MAX_COLUMNS: u16 = 3;

pub fn render_search_bar(
    frame: &mut Frame,
    area: Rect,
    term: &str,
    placeholder: &str,
    focused: bool,
    palette: &Palette,
) {
    let line = if term.is_empty() && !focused {
        Line::from(vec![
            Span::styled(" 🔍 ", palette.muted_style()),
            Span::styled(placeholder.to_string(), palette.muted_style()),
        ])
    } else {
        let cursor = if focused { "▌" } else { "" };
        Line::from(vec![
            Span::styled(" 🔍 ", palette.search_style()),
            Span::styled(format!("{}{}", term, cursor), palette.text_style()),
        ])
    };

    let block = Block::default()
        .title(" Поиск [/] ")
        .title_style(palette.muted_style())
        .borders(Borders::ALL)
        .border_style(palette.border_style(focused));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

pub fn render_loading(frame: &mut Frame, area: Rect, tick: u64, palette: &Palette) {
    let lines = vec![Line::from(""), spinner_line("Загрузка...", tick, palette)];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

pub fn render_error(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let lines = vec![
        Line::from(Span::styled("Ошибка загрузки данных", palette.error_style())),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), palette.text_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[r]", palette.help_key_style()),
            Span::styled(" Попробовать снова", palette.muted_style()),
        ]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.error_style());
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

pub fn render_empty(
    frame: &mut Frame,
    area: Rect,
    (title, hint): (&str, &str),
    palette: &Palette,
) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(title.to_string(), palette.highlight_style())),
        Line::from(Span::styled(hint.to_string(), palette.muted_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[n]", palette.help_key_style()),
            Span::styled(" Добавить", palette.muted_style()),
        ]),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Header line above a grid: title with count, busy spinner, add hint.
pub fn grid_header(title: &str, count: usize, busy: bool, tick: u64, palette: &Palette) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!(" {} ({})", title, count), palette.title_style()),
    ];
    if busy {
        spans.push(Span::raw("  "));
        spans.extend(spinner_line("обновление", tick, palette).spans);
    }
    spans.push(Span::styled("   [n] Добавить", palette.muted_style()));
    Line::from(spans)
}

/// Cells for a card grid, scrolled so `selection` is visible.
///
/// Returns `(item index, cell)` pairs for the visible items only.
pub fn grid_layout(area: Rect, card_height: u16, count: usize, selection: usize) -> Vec<(usize, Rect)> {
    if count == 0 || area.width == 0 || area.height == 0 {
        return Vec::new();
    }
    let columns = (area.width / MIN_CARD_WIDTH).clamp(1, MAX_COLUMNS) as usize;
    let visible_rows = (area.height / card_height).max(1) as usize;
    let selected_row = selection.min(count - 1) / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let cell_width = area.width / columns as u16;
    let mut cells = Vec::new();
    for row in 0..visible_rows {
        for col in 0..columns {
            let index = (first_row + row) * columns + col;
            if index >= count {
                return cells;
            }
            let y = area.y + row as u16 * card_height;
            let height = card_height.min(area.bottom().saturating_sub(y));
            // Last column takes the rounding remainder
            let width = if col == columns - 1 {
                area.width - cell_width * col as u16
            } else {
                cell_width
            };
            cells.push((index, Rect::new(area.x + col as u16 * cell_width, y, width, height)));
        }
    }
    cells
}
