use super::rules::FieldRule;
use super::state::{FormMode, FormState};
use crate::models::{Owner, OwnerCreate};

pub static OWNER_RULES: [FieldRule; 2] = [
    FieldRule::text("firstname", "Имя")
        .required("Имя обязательно")
        .max_len(100, "Максимум 100 символов"),
    FieldRule::text("lastname", "Фамилия")
        .required("Фамилия обязательна")
        .max_len(100, "Максимум 100 символов"),
];

/// Create/edit form for an owner.
#[derive(Debug, Clone)]
pub struct OwnerForm {
    state: FormState,
}

impl OwnerForm {
    pub fn create() -> Self {
        Self {
            state: FormState::new(&OWNER_RULES, FormMode::Create, Vec::new()),
        }
    }

    pub fn edit(owner: &Owner) -> Self {
        Self {
            state: FormState::new(&OWNER_RULES, FormMode::Edit(owner.ownerid), Self::edit_values(owner)),
        }
    }

    fn edit_values(owner: &Owner) -> Vec<String> {
        vec![owner.firstname.clone(), owner.lastname.clone()]
    }

    pub fn retarget(&mut self, owner: Option<&Owner>) {
        match owner {
            Some(owner) => self
                .state
                .reset(FormMode::Edit(owner.ownerid), Self::edit_values(owner)),
            None => self.state.reset(FormMode::Create, Vec::new()),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    pub fn title(&self) -> &'static str {
        if self.state.mode().is_edit() {
            "Редактировать владельца"
        } else {
            "Добавить владельца"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.state.mode().is_edit() {
            "Сохранить"
        } else {
            "Добавить"
        }
    }

    pub fn submit(&mut self) -> Option<OwnerCreate> {
        if !self.state.begin_submit() {
            return None;
        }
        Some(OwnerCreate {
            firstname: self.state.trimmed("firstname"),
            lastname: self.state.trimmed("lastname"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Owner {
        Owner {
            ownerid: 2,
            firstname: "Айгуль".to_string(),
            lastname: "Садыкова".to_string(),
            cars: vec![],
        }
    }

    #[test]
    fn test_required_names() {
        let mut form = OwnerForm::create();
        assert!(form.submit().is_none());
        assert_eq!(form.state().error("firstname"), Some("Имя обязательно"));
        assert_eq!(form.state().error("lastname"), Some("Фамилия обязательна"));
    }

    #[test]
    fn test_name_length_limit() {
        let mut form = OwnerForm::create();
        form.state_mut().set_value("firstname", "a".repeat(101));
        assert_eq!(form.state().error("firstname"), Some("Максимум 100 символов"));
    }

    #[test]
    fn test_edit_prepopulates_and_submits_trimmed() {
        let mut form = OwnerForm::edit(&owner());
        assert_eq!(form.state().mode(), FormMode::Edit(2));
        assert_eq!(form.state().value("firstname"), "Айгуль");
        assert_eq!(form.state().value("lastname"), "Садыкова");

        form.state_mut().set_value("lastname", " Ахметова ");
        let payload = form.submit().expect("valid form");
        assert_eq!(payload.firstname, "Айгуль");
        assert_eq!(payload.lastname, "Ахметова");
    }

    #[test]
    fn test_retarget_to_create_clears() {
        let mut form = OwnerForm::edit(&owner());
        form.retarget(None);
        assert_eq!(form.state().mode(), FormMode::Create);
        assert_eq!(form.state().value("firstname"), "");
        assert_eq!(form.title(), "Добавить владельца");
    }
}
