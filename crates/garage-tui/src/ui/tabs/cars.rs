use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};
use crate::pages::PageView;
use crate::ui::cards::{render_car_card, CardActions, CAR_CARD_HEIGHT};
use crate::ui::styles::Palette;

use super::{grid_header, grid_layout, render_empty, render_error, render_loading, render_search_bar};

/// Render the Cars tab - search bar and a grid of car cards
pub fn render(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Cards
        ])
        .split(area);

    let page = &app.cars;
    render_search_bar(
        frame,
        chunks[0],
        &page.list.term,
        "Поиск по марке...",
        app.state == AppState::Searching,
        palette,
    );

    match page.list.view(&app.car_cache) {
        PageView::Loading => render_loading(frame, chunks[2], app.tick, palette),
        PageView::Error(message) => render_error(frame, chunks[2], message, palette),
        PageView::Empty => render_empty(frame, chunks[2], page.empty_message(), palette),
        PageView::Populated { items, refreshing } => {
            let header = grid_header("Автомобили", items.len(), refreshing, app.tick, palette);
            frame.render_widget(Paragraph::new(header), chunks[1]);

            for (index, cell) in grid_layout(chunks[2], CAR_CARD_HEIGHT, items.len(), page.list.selection) {
                render_car_card(
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
