use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};
use crate::pages::PageView;
use crate::ui::cards::{render_owner_card, CardActions, OWNER_CARD_HEIGHT};
use crate::ui::styles::Palette;

use super::{grid_header, grid_layout, render_empty, render_error, render_loading, render_search_bar};

/// Render the Owners tab - search bar and a grid of owner cards
pub fn render(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);

    let page = &app.owners;
    render_search_bar(
        frame,
        chunks[0],
        &page.list.term,
        "Поиск по имени или фамилии...",
        app.state == AppState::Searching,
        palette,
    );

    match page.list.view(&app.owner_cache) {
        PageView::Loading => render_loading(frame, chunks[2], app.tick, palette),
        PageView::Error(message) => render_error(frame, chunks[2], message, palette),
        PageView::Empty => render_empty(frame, chunks[2], page.empty_message(), palette),
        PageView::Populated { items, refreshing } => {
            let header = grid_header("Владельцы", items.len(), refreshing, app.tick, palette);
            frame.render_widget(Paragraph::new(header), chunks[1]);

            for (index, cell) in grid_layout(chunks[2], OWNER_CARD_HEIGHT, items.len(), page.list.selection) {
                render_owner_card(
                    frame,
                    cell,
                    &items[index],
                    index == page.list.selection,
                    CardActions::BOTH,
                    palette,
                );
            }
        }
    }
}
