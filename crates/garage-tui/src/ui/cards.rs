//! Entity cards for the car and owner grids.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use garage_core::models::{CarWithOwner, Owner};
use garage_core::utils::{format_price, initials, truncate_string};

use super::styles::Palette;
use super::widgets::{badge, card_block};

/// Cars listed on an owner card before the "+N" overflow.
const OWNER_CARD_CARS: usize = 3;

pub const CAR_CARD_HEIGHT: u16 = 9;
pub const OWNER_CARD_HEIGHT: u16 = 9;

/// Which actions the card offers. Key hints are shown only when both are
/// available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardActions {
    pub edit: bool,
    pub delete: bool,
}

impl CardActions {
    pub const BOTH: CardActions = CardActions {
        edit: true,
        delete: true,
    };

    fn show_hints(&self) -> bool {
        self.edit && self.delete
    }
}

fn action_hints(palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled("[e]", palette.help_key_style()),
        Span::styled(" Изменить  ", palette.muted_style()),
        Span::styled("[d]", palette.help_key_style()),
        Span::styled(" Удалить", palette.muted_style()),
    ])
}

fn field(label: &str, value: String, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), palette.muted_style()),
        Span::styled(value, palette.text_style()),
    ])
}

// ============================================================================
// Car card
// ============================================================================

pub fn car_card_title(car: &CarWithOwner) -> String {
    format!(" 🚗 {} ", car.title())
}

pub fn car_card_lines(car: &CarWithOwner, actions: CardActions, palette: &Palette) -> Vec<Line<'static>> {
    let owner = car.owner_name().unwrap_or_else(|| "Не назначен".to_string());
    let mut lines = vec![
        field("Номер", car.registration_number.clone(), palette),
        field("Год", car.model_year.to_string(), palette),
        Line::from(vec![
            Span::styled("Цена: ", palette.muted_style()),
            Span::styled(format_price(car.price), palette.success_style()),
        ]),
        field("Владелец", owner, palette),
        Line::from(vec![Span::styled("Цвет: ", palette.muted_style()), badge(&car.color, palette)]),
    ];
    if actions.show_hints() {
        lines.push(Line::from(""));
        lines.push(action_hints(palette));
    }
    lines
}

pub fn render_car_card(
    frame: &mut Frame,
    area: Rect,
    car: &CarWithOwner,
    selected: bool,
    actions: CardActions,
    palette: &Palette,
) {
    let width = area.width.saturating_sub(4) as usize;
    let title = truncate_string(&car_card_title(car), width);
    let paragraph = Paragraph::new(car_card_lines(car, actions, palette))
        .block(card_block(title, selected, palette));
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Owner card
// ============================================================================

pub fn owner_card_title(owner: &Owner) -> String {
    format!(
        " ({}) {} ",
        initials(&owner.firstname, &owner.lastname),
        owner.full_name()
    )
}

pub fn owner_card_lines(owner: &Owner, actions: CardActions, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![field("Автомобилей", owner.car_count().to_string(), palette)];

    if owner.cars.is_empty() {
        lines.push(Line::from(Span::styled("Нет автомобилей", palette.muted_style())));
    } else {
        for car in owner.cars.iter().take(OWNER_CARD_CARS) {
            lines.push(Line::from(vec![
                Span::styled("• ", palette.muted_style()),
                Span::styled(car.title(), palette.text_style()),
                Span::styled(format!(" ({})", car.registration_number), palette.muted_style()),
            ]));
        }
        let rest = owner.cars.len().saturating_sub(OWNER_CARD_CARS);
        if rest > 0 {
            lines.push(Line::from(Span::styled(format!("+{}", rest), palette.muted_style())));
        }
    }

    if actions.show_hints() {
        lines.push(Line::from(""));
        lines.push(action_hints(palette));
    }
    lines
}

pub fn render_owner_card(
    frame: &mut Frame,
    area: Rect,
    owner: &Owner,
    selected: bool,
    actions: CardActions,
    palette: &Palette,
) {
    let width = area.width.saturating_sub(4) as usize;
    let title = truncate_string(&owner_card_title(owner), width);
    let paragraph = Paragraph::new(owner_card_lines(owner, actions, palette))
        .block(card_block(title, selected, palette));
    frame.render_widget(paragraph, area);
}
