use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use garage_core::services::NotificationLevel;

use crate::app::{App, AppState, Tab};
use crate::pages::{CarsPage, Modal, OwnersPage};

use super::forms::{render_car_form, render_delete_confirm, render_owner_form, DeleteConfirm};
use super::styles::Palette;
use super::tabs::{cars, dashboard, owners};
use super::widgets::{render_modal, spinner_frame};

pub fn render(frame: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.services.theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0], &palette);
    render_tabs(frame, app, chunks[1], &palette);
    render_main_content(frame, app, chunks[2], &palette);
    render_status_bar(frame, app, chunks[3], &palette);

    // Render overlays
    render_page_modal(frame, app, &palette);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, &palette);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame, &palette);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let title = "  🚗 Garage";
    let user = format!("{}  ", app.services.auth.display_name());
    let help_hint = "[?] Справка";
    let used = title.chars().count() + user.chars().count() + help_hint.chars().count() + 4;

    let title_line = Line::from(vec![
        Span::styled(title, palette.title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(user, palette.text_style()),
        Span::styled(help_hint, palette.muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(palette.muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let tabs = [Tab::Cars, Tab::Owners, Tab::Dashboard];

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", palette.muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        spans.push(Span::styled(label, palette.tab_style(*tab == app.current_tab)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(palette.muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    match app.current_tab {
        Tab::Cars => cars::render(frame, app, area, palette),
        Tab::Owners => owners::render(frame, app, area, palette),
        Tab::Dashboard => dashboard::render(frame, app, area, palette),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let shortcuts = match app.state {
        AppState::Searching => "Enter/Esc: готово",
        _ => "[r] обновить | [t] тема | [q] выход",
    };
    let right_text = format!(" {} ", shortcuts);

    let (left_text, left_style) = match app.services.notifications.visible(Instant::now()) {
        Some(note) => {
            let style = match note.level {
                NotificationLevel::Success => palette.success_style(),
                NotificationLevel::Error => palette.error_style(),
            };
            (format!(" {} ", note.message), style)
        }
        None => {
            let mut text = match app.data_age() {
                Some(age) => format!(" Обновлено {} ", age),
                None => " ".to_string(),
            };
            if app.is_busy() {
                text.push_str(spinner_frame(app.tick));
            }
            (text, palette.muted_style())
        }
    };

    let width = area.width as usize;
    let padding = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, palette.muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(palette.status_bar_style()),
        area,
    );
}

fn render_page_modal(frame: &mut Frame, app: &App, palette: &Palette) {
    let area = frame.area();
    match app.current_tab {
        Tab::Cars => {
            let page = &app.cars;
            match &page.list.modal {
                Modal::None => {}
                Modal::Create | Modal::Edit(_) => {
                    render_car_form(frame, area, &page.form, palette, app.tick)
                }
                Modal::ConfirmDelete(car) => {
                    let confirm = DeleteConfirm {
                        title: "Удалить автомобиль",
                        prompt: CarsPage::delete_prompt(car),
                        warning: None,
                        pending: page.list.pending.delete,
                    };
                    render_delete_confirm(frame, area, &confirm, palette, app.tick);
                }
            }
        }
        Tab::Owners => {
            let page = &app.owners;
            match &page.list.modal {
                Modal::None => {}
                Modal::Create | Modal::Edit(_) => {
                    render_owner_form(frame, area, &page.form, palette, app.tick)
                }
                Modal::ConfirmDelete(owner) => {
                    let confirm = DeleteConfirm {
                        title: "Удалить владельца",
                        prompt: OwnersPage::delete_prompt(owner),
                        warning: OwnersPage::delete_warning(owner),
                        pending: page.list.pending.delete,
                    };
                    render_delete_confirm(frame, area, &confirm, palette, app.tick);
                }
            }
        }
        Tab::Dashboard => {}
    }
}

fn help_row(key: &'static str, desc: &'static str, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), palette.help_key_style()),
        Span::styled(desc, palette.help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, palette: &Palette) {
    let version = env!("CARGO_PKG_VERSION");

    let lines = vec![
        Line::from(Span::styled(format!(" версия {}", version), palette.muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Навигация", palette.highlight_style())),
        help_row("1-3", "Переключить вкладку", palette),
        help_row("←/→", "Предыдущая/следующая вкладка", palette),
        help_row("↑/↓ j/k", "Выбор карточки", palette),
        help_row("PgUp/PgDn", "Прокрутка", palette),
        Line::from(""),
        Line::from(Span::styled(" Действия", palette.highlight_style())),
        help_row("/", "Поиск", palette),
        help_row("n", "Добавить", palette),
        help_row("e, Enter", "Изменить", palette),
        help_row("d", "Удалить", palette),
        help_row("r", "Обновить данные", palette),
        help_row("t", "Светлая/темная тема", palette),
        help_row("x", "Скрыть уведомление", palette),
        help_row("q", "Выход", palette),
        Line::from(""),
        Line::from(Span::styled(" Формы", palette.highlight_style())),
        help_row("Tab", "Следующее поле", palette),
        help_row("←/→", "Выбор владельца", palette),
        help_row("Enter", "Сохранить", palette),
        help_row("Esc", "Закрыть", palette),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Нажмите ", palette.muted_style()),
            Span::styled("?", palette.help_key_style()),
            Span::styled(" или ", palette.muted_style()),
            Span::styled("Esc", palette.help_key_style()),
            Span::styled(" чтобы закрыть", palette.muted_style()),
        ]),
    ];

    render_modal(frame, frame.area(), "Garage: справка", lines, 52, palette);
}

fn render_quit_overlay(frame: &mut Frame, palette: &Palette) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Выйти из приложения?", palette.highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Нажмите ", palette.muted_style()),
            Span::styled("[Y]", palette.help_key_style()),
            Span::styled(" для выхода, ", palette.muted_style()),
            Span::styled("[N]", palette.help_key_style()),
            Span::styled(" для отмены", palette.muted_style()),
        ]),
    ];

    render_modal(frame, frame.area(), "Garage", lines, 46, palette);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use garage_core::cache::PersistedStore;
    use garage_core::models::Owner;
    use garage_core::services::{AuthContext, Services};
    use garage_core::{ApiClient, Config};
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        let config = Config::default();
        let services = Services::init(
            &config,
            AuthContext::new(Some("Оператор".to_string())),
            PersistedStore::in_dir(dir.path()),
        );
        App::from_parts(config, ApiClient::new("http://127.0.0.1:9").unwrap(), services)
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 40)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_initial_screen_shows_tabs_and_loading() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let text = screen(&app);
        assert!(text.contains("[1] Автомобили"));
        assert!(text.contains("[3] Статистика"));
        assert!(text.contains("Оператор"));
        assert!(text.contains("Загрузка..."));
    }

    #[test]
    fn test_owner_delete_modal_shows_cascade_warning() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.current_tab = Tab::Owners;
        let owner: Owner = serde_json::from_value(serde_json::json!({
            "ownerid": 1, "firstname": "Иван", "lastname": "Петров",
            "cars": [{
                "id": 5, "brand": "Lada", "model": "Vesta", "color": "Серый",
                "registrationNumber": "1AAA01", "modelYear": 2019, "price": 1, "owner_id": 1
            }]
        }))
        .unwrap();
        let key = app.owners.list.query_key();
        app.owner_cache
            .complete(&key, Ok(vec![owner.clone()]), Instant::now(), Utc::now());
        app.owners.open_delete(owner);

        let text = screen(&app);
        assert!(text.contains("Удалить владельца"));
        assert!(text.contains("Это действие нельзя отменить."));
        assert!(text.contains("Внимание:"));
    }

    #[test]
    fn test_error_state_offers_retry() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let key = app.cars.list.query_key();
        app.car_cache
            .complete(&key, Err("Сервер недоступен".to_string()), Instant::now(), Utc::now());

        let text = screen(&app);
        assert!(text.contains("Ошибка загрузки данных"));
        assert!(text.contains("Попробовать снова"));
    }
}
