//! Modal views for the entity forms and delete confirmations.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    Frame,
};

use garage_core::forms::{CarForm, FieldKind, FormState, OwnerForm};

use super::styles::Palette;
use super::widgets::{render_modal, Button, ButtonVariant, Input};

const FORM_WIDTH: u16 = 48;
const CONFIRM_WIDTH: u16 = 56;

fn placeholder(field: &str) -> &'static str {
    match field {
        "brand" => "Toyota",
        "model" => "Camry",
        "color" => "Белый",
        "registrationNumber" => "123ABC01",
        "firstname" => "Иван",
        "lastname" => "Петров",
        _ => "",
    }
}

/// Field inputs followed by the submit/cancel buttons.
///
/// `select_value` is the display text for the form's select field, if any.
pub fn form_lines(
    state: &FormState,
    select_value: Option<String>,
    submit_label: &str,
    palette: &Palette,
    tick: u64,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, rule) in state.rules().iter().enumerate() {
        let focused = state.focus() == i;
        let error = state.error(rule.field);
        if matches!(rule.kind, FieldKind::Select) {
            let mut label = vec![Span::styled(rule.label.to_string(), palette.text_style())];
            if rule.required.is_some() {
                label.push(Span::styled(" *", palette.error_style()));
            }
            lines.push(Line::from(label));
            let style = if focused {
                palette.selected_style()
            } else {
                palette.text_style()
            };
            let shown = select_value.clone().unwrap_or_else(|| "Нет владельцев".to_string());
            lines.push(Line::from(Span::styled(format!("◀ {} ▶", shown), style)));
            if let Some(error) = error {
                lines.push(Line::from(Span::styled(error.to_string(), palette.error_style())));
            }
            continue;
        }
        lines.extend(
            Input::new(rule.label, state.value(rule.field))
                .placeholder(placeholder(rule.field))
                .required(rule.required.is_some())
                .error(error)
                .focused(focused)
                .lines(palette),
        );
    }

    if let Some(message) = state.submit_error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(message.to_string(), palette.error_style())));
    }

    let submitting = state.is_submitting();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Button::new("Отмена", "Esc", ButtonVariant::Outline)
            .disabled(submitting)
            .span(palette, tick),
        Span::raw("  "),
        Button::new(submit_label, "Enter", ButtonVariant::Primary)
            .loading(submitting)
            .span(palette, tick),
    ]));
    lines.push(Line::from(Span::styled(
        "Tab: следующее поле  ←/→: выбор владельца",
        palette.muted_style(),
    )));
    lines
}

pub fn render_car_form(frame: &mut Frame, area: Rect, form: &CarForm, palette: &Palette, tick: u64) {
    let select_value = form.selected_owner().map(|o| o.name.clone());
    let lines = form_lines(form.state(), select_value, form.submit_label(), palette, tick);
    render_modal(frame, area, form.title(), lines, FORM_WIDTH, palette);
}

pub fn render_owner_form(frame: &mut Frame, area: Rect, form: &OwnerForm, palette: &Palette, tick: u64) {
    let mut lines = form_lines(form.state(), None, form.submit_label(), palette, tick);
    // Owners have no select field
    lines.pop();
    lines.push(Line::from(Span::styled("Tab: следующее поле", palette.muted_style())));
    render_modal(frame, area, form.title(), lines, FORM_WIDTH, palette);
}

// ============================================================================
// Delete confirmation
// ============================================================================

pub struct DeleteConfirm<'a> {
    pub title: &'a str,
    pub prompt: String,
    pub warning: Option<String>,
    pub pending: bool,
}

pub fn confirm_lines(confirm: &DeleteConfirm, palette: &Palette, tick: u64) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(confirm.prompt.clone(), palette.text_style())),
        Line::from(Span::styled("Это действие нельзя отменить.", palette.muted_style())),
    ];
    if let Some(ref warning) = confirm.warning {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(warning.clone(), palette.error_style())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Button::new("Отмена", "[N]", ButtonVariant::Outline)
            .disabled(confirm.pending)
            .span(palette, tick),
        Span::raw("  "),
        Button::new("Удалить", "[Y]", ButtonVariant::Danger)
            .loading(confirm.pending)
            .span(palette, tick),
    ]));
    lines
}

pub fn render_delete_confirm(
    frame: &mut Frame,
    area: Rect,
    confirm: &DeleteConfirm,
    palette: &Palette,
    tick: u64,
) {
    let lines = confirm_lines(confirm, palette, tick);
    render_modal(frame, area, confirm.title, lines, CONFIRM_WIDTH, palette);
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_core::models::Owner;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn owners() -> Vec<Owner> {
        vec![Owner {
            ownerid: 7,
            firstname: "Айгуль".to_string(),
            lastname: "Садыкова".to_string(),
            cars: vec![],
        }]
    }

    #[test]
    fn test_car_form_shows_errors_and_selected_owner() {
        let mut form = CarForm::create(&owners());
        assert!(form.submit().is_none());
        let select = form.selected_owner().map(|o| o.name.clone());
        let lines = text(&form_lines(form.state(), select, form.submit_label(), &Palette::LIGHT, 0));

        assert!(lines.contains(&"Марка обязательна".to_string()));
        assert!(lines.contains(&"◀ Айгуль Садыкова ▶".to_string()));
        assert!(lines.iter().any(|l| l.contains("Enter Добавить")));
    }

    #[test]
    fn test_submitting_form_shows_loading_button() {
        let mut form = OwnerForm::edit(&owners()[0]);
        assert!(form.submit().is_some());
        let lines = text(&form_lines(form.state(), None, form.submit_label(), &Palette::DARK, 0));
        assert!(lines.iter().any(|l| l.contains("Сохранить...")));
    }

    #[test]
    fn test_confirm_includes_warning_when_present() {
        let confirm = DeleteConfirm {
            title: "Удалить владельца",
            prompt: "Удалить?".to_string(),
            warning: Some("Все автомобили также будут удалены!".to_string()),
            pending: false,
        };
        let lines = text(&confirm_lines(&confirm, &Palette::LIGHT, 0));
        assert_eq!(lines[1], "Это действие нельзя отменить.");
        assert!(lines.contains(&"Все автомобили также будут удалены!".to_string()));

        let confirm = DeleteConfirm {
            warning: None,
            ..confirm
        };
        let lines = text(&confirm_lines(&confirm, &Palette::LIGHT, 0));
        assert!(!lines.iter().any(|l| l.contains("также будут удалены")));
    }
}
