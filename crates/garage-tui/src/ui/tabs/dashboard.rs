use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use garage_core::models::{CarStatistics, CarSummary, OwnerStatistics};
use garage_core::utils::format_price;

use crate::app::App;
use crate::pages::dashboard::DashboardView;
use crate::ui::styles::Palette;
use crate::ui::widgets::spinner_frame;

use super::{render_error, render_loading};

pub fn render(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    match app.dashboard.view(&app.car_stats, &app.owner_stats) {
        DashboardView::Loading => render_loading(frame, area, app.tick, palette),
        DashboardView::Error(message) => render_error(frame, area, message, palette),
        DashboardView::Ready {
            cars,
            owners,
            refreshing,
        } => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(8), // Summary
                    Constraint::Min(5),    // Owner ranking
                ])
                .split(area);

            let busy = refreshing.then(|| spinner_frame(app.tick));
            render_summary(frame, cars, busy, chunks[0], palette);
            render_owner_ranking(frame, &owners, app.dashboard.selection, chunks[1], palette);
        }
    }
}

fn summary_line(label: &str, car: Option<&CarSummary>, palette: &Palette) -> Line<'static> {
    let value = match car {
        Some(car) => format!("{} {}, {}", car.brand, car.model, format_price(car.price)),
        None => "-".to_string(),
    };
    Line::from(vec![
        Span::styled(format!("{:<16}", label), palette.muted_style()),
        Span::styled(value, palette.text_style()),
    ])
}

pub fn summary_lines(stats: &CarStatistics, palette: &Palette) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled(format!("{:<16}", "Автомобилей"), palette.muted_style()),
            Span::styled(stats.total_cars.to_string(), palette.highlight_style()),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<16}", "Владельцев"), palette.muted_style()),
            Span::styled(stats.total_owners.to_string(), palette.highlight_style()),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<16}", "Средняя цена"), palette.muted_style()),
            Span::styled(
                format_price(stats.average_price.round() as i64),
                palette.success_style(),
            ),
        ]),
        summary_line("Самый дорогой", stats.most_expensive.as_ref(), palette),
        summary_line("Самый дешевый", stats.cheapest.as_ref(), palette),
    ]
}

fn render_summary(
    frame: &mut Frame,
    stats: &CarStatistics,
    busy: Option<&str>,
    area: Rect,
    palette: &Palette,
) {
    let title = match busy {
        Some(spinner) => format!(" Статистика {} ", spinner),
        None => " Статистика ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .title_style(palette.title_style())
        .borders(Borders::ALL)
        .border_style(palette.border_style(true));

    let paragraph = Paragraph::new(summary_lines(stats, palette)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_owner_ranking(
    frame: &mut Frame,
    owners: &[&OwnerStatistics],
    selection: usize,
    area: Rect,
    palette: &Palette,
) {
    let header = Row::new(vec![Cell::from("Владелец"), Cell::from("Автомобилей")])
        .style(palette.title_style())
        .height(1);

    let rows: Vec<Row> = owners
        .iter()
        .map(|owner| {
            Row::new(vec![
                Cell::from(owner.full_name()),
                Cell::from(format!("{:>5}", owner.car_count)),
            ])
            .style(palette.text_style())
        })
        .collect();

    let widths = [Constraint::Fill(1), Constraint::Length(12)];
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Владельцы по числу автомобилей ({}) ", owners.len()))
                .title_style(palette.muted_style())
                .borders(Borders::ALL)
                .border_style(palette.border_style(false)),
        )
        .row_highlight_style(palette.selected_style());

    let mut state = TableState::default();
    if !owners.is_empty() {
        state.select(Some(selection.min(owners.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines_handle_missing_extremes() {
        let stats = CarStatistics {
            total_cars: 4,
            total_owners: 2,
            average_price: 1_500_000.4,
            most_expensive: Some(CarSummary {
                id: 1,
                brand: "BMW".to_string(),
                model: "X5".to_string(),
                price: 30_000_000,
            }),
            cheapest: None,
        };
        let lines: Vec<String> = summary_lines(&stats, &Palette::LIGHT)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(lines[0].ends_with('4'));
        assert!(lines[2].ends_with("1 500 000 ₸"));
        assert!(lines[3].ends_with("BMW X5, 30 000 000 ₸"));
        assert!(lines[4].ends_with('-'));
    }
}
