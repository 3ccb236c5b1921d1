use chrono::Datelike;

use super::rules::FieldRule;
use super::state::{FormMode, FormState};
use crate::models::{CarCreate, CarWithOwner, Owner};

pub const MIN_MODEL_YEAR: i64 = 1900;
pub const MAX_MODEL_YEAR: i64 = 2030;

pub static CAR_RULES: [FieldRule; 7] = [
    FieldRule::text("brand", "Марка")
        .required("Марка обязательна")
        .min_len(1, "Минимум 1 символ")
        .max_len(100, "Максимум 100 символов"),
    FieldRule::text("model", "Модель")
        .required("Модель обязательна")
        .min_len(1, "Минимум 1 символ")
        .max_len(100, "Максимум 100 символов"),
    FieldRule::text("color", "Цвет")
        .required("Цвет обязателен")
        .min_len(1, "Минимум 1 символ")
        .max_len(40, "Максимум 40 символов"),
    FieldRule::text("registrationNumber", "Регистрационный номер")
        .required("Номер обязателен")
        .min_len(1, "Минимум 1 символ")
        .max_len(40, "Максимум 40 символов"),
    FieldRule::number("modelYear", "Год выпуска")
        .required("Год обязателен")
        .min(MIN_MODEL_YEAR, "Минимум 1900 год")
        .max(MAX_MODEL_YEAR, "Максимум 2030 год"),
    FieldRule::number("price", "Цена (тенге)")
        .required("Цена обязательна")
        .min(0, "Цена не может быть отрицательной"),
    FieldRule::select("owner_id", "Владелец").required("Владелец обязателен"),
];

/// An owner the car can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerChoice {
    pub id: i64,
    pub name: String,
}

impl From<&Owner> for OwnerChoice {
    fn from(owner: &Owner) -> Self {
        Self {
            id: owner.ownerid,
            name: owner.full_name(),
        }
    }
}

/// Create/edit form for a car.
#[derive(Debug, Clone)]
pub struct CarForm {
    state: FormState,
    owners: Vec<OwnerChoice>,
}

impl CarForm {
    /// Empty form: current year, zero price, first known owner.
    pub fn create(owners: &[Owner]) -> Self {
        let owners: Vec<OwnerChoice> = owners.iter().map(OwnerChoice::from).collect();
        let values = Self::create_values(&owners);
        Self {
            state: FormState::new(&CAR_RULES, FormMode::Create, values),
            owners,
        }
    }

    /// Form pre-populated with every field of `car`.
    pub fn edit(car: &CarWithOwner, owners: &[Owner]) -> Self {
        Self {
            state: FormState::new(&CAR_RULES, FormMode::Edit(car.id), Self::edit_values(car)),
            owners: owners.iter().map(OwnerChoice::from).collect(),
        }
    }

    fn create_values(owners: &[OwnerChoice]) -> Vec<String> {
        vec![
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            chrono::Local::now().year().to_string(),
            "0".to_string(),
            owners.first().map(|o| o.id.to_string()).unwrap_or_default(),
        ]
    }

    fn edit_values(car: &CarWithOwner) -> Vec<String> {
        vec![
            car.brand.clone(),
            car.model.clone(),
            car.color.clone(),
            car.registration_number.clone(),
            car.model_year.to_string(),
            car.price.to_string(),
            car.owner_id.to_string(),
        ]
    }

    /// Point the form at a different target; every field is reset.
    pub fn retarget(&mut self, car: Option<&CarWithOwner>) {
        match car {
            Some(car) => self.state.reset(FormMode::Edit(car.id), Self::edit_values(car)),
            None => {
                let values = Self::create_values(&self.owners);
                self.state.reset(FormMode::Create, values);
            }
        }
    }

    /// Refresh the owner list, e.g. after the owners query completes.
    ///
    /// A create form with no owner selected picks the first one.
    pub fn set_owner_choices(&mut self, owners: &[Owner]) {
        self.owners = owners.iter().map(OwnerChoice::from).collect();
        if self.state.value("owner_id").is_empty() && !self.state.mode().is_edit() {
            if let Some(first) = self.owners.first() {
                self.state.set_value("owner_id", first.id.to_string());
            }
        }
    }

    pub fn owner_choices(&self) -> &[OwnerChoice] {
        &self.owners
    }

    /// Display name of the selected owner.
    pub fn selected_owner(&self) -> Option<&OwnerChoice> {
        let id: i64 = self.state.value("owner_id").parse().ok()?;
        self.owners.iter().find(|o| o.id == id)
    }

    /// Move the owner selection forward or backward, wrapping.
    pub fn cycle_owner(&mut self, forward: bool) {
        if self.owners.is_empty() || self.state.is_submitting() {
            return;
        }
        let len = self.owners.len();
        let next = match self.selected_owner().and_then(|s| self.owners.iter().position(|o| o.id == s.id)) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        let id = self.owners[next].id;
        self.state.set_value("owner_id", id.to_string());
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    pub fn title(&self) -> &'static str {
        if self.state.mode().is_edit() {
            "Редактировать автомобиль"
        } else {
            "Добавить автомобиль"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.state.mode().is_edit() {
            "Сохранить"
        } else {
            "Добавить"
        }
    }

    /// Validate and build the payload. `None` means either a field is
    /// invalid (errors are now set) or a submit is already pending.
    pub fn submit(&mut self) -> Option<CarCreate> {
        if !self.state.begin_submit() {
            return None;
        }
        let s = &self.state;
        Some(CarCreate {
            brand: s.trimmed("brand"),
            model: s.trimmed("model"),
            color: s.trimmed("color"),
            registration_number: s.trimmed("registrationNumber"),
            model_year: s.parse_number("modelYear") as i32,
            price: s.parse_number("price"),
            owner_id: s.parse_number("owner_id"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners() -> Vec<Owner> {
        vec![
            Owner {
                ownerid: 3,
                firstname: "Иван".to_string(),
                lastname: "Петров".to_string(),
                cars: vec![],
            },
            Owner {
                ownerid: 8,
                firstname: "Анна".to_string(),
                lastname: "Ким".to_string(),
                cars: vec![],
            },
        ]
    }

    fn car() -> CarWithOwner {
        CarWithOwner {
            id: 11,
            brand: "Toyota".to_string(),
            model: "Camry".to_string(),
            color: "Белый".to_string(),
            registration_number: "777AAA02".to_string(),
            model_year: 2019,
            price: 11_500_000,
            owner_id: 8,
            owner: Some("Анна Ким".to_string()),
            owner_firstname: None,
            owner_lastname: None,
        }
    }

    fn fill_valid(form: &mut CarForm) {
        let state = form.state_mut();
        state.set_value("brand", "Lada");
        state.set_value("model", "Vesta");
        state.set_value("color", "Серый");
        state.set_value("registrationNumber", "123ABC01");
    }

    #[test]
    fn test_create_defaults() {
        let form = CarForm::create(&owners());
        let state = form.state();
        assert_eq!(state.mode(), FormMode::Create);
        assert_eq!(state.value("brand"), "");
        assert_eq!(state.value("modelYear"), chrono::Local::now().year().to_string());
        assert_eq!(state.value("price"), "0");
        assert_eq!(state.value("owner_id"), "3");
        assert_eq!(form.title(), "Добавить автомобиль");
        assert_eq!(form.submit_label(), "Добавить");
    }

    #[test]
    fn test_empty_required_fields_block_submit() {
        let mut form = CarForm::create(&owners());
        assert!(form.submit().is_none());
        let state = form.state();
        assert_eq!(state.error("brand"), Some("Марка обязательна"));
        assert_eq!(state.error("model"), Some("Модель обязательна"));
        assert_eq!(state.error("color"), Some("Цвет обязателен"));
        assert_eq!(state.error("registrationNumber"), Some("Номер обязателен"));
        assert!(!state.is_submitting());
    }

    #[test]
    fn test_no_owner_is_required() {
        let mut form = CarForm::create(&[]);
        fill_valid(&mut form);
        assert!(form.submit().is_none());
        assert_eq!(form.state().error("owner_id"), Some("Владелец обязателен"));
    }

    #[test]
    fn test_year_out_of_range() {
        let mut form = CarForm::create(&owners());
        fill_valid(&mut form);
        form.state_mut().set_value("modelYear", "1899");
        assert!(form.submit().is_none());
        assert_eq!(form.state().error("modelYear"), Some("Минимум 1900 год"));

        form.state_mut().set_value("modelYear", "2031");
        assert!(form.submit().is_none());
        assert_eq!(form.state().error("modelYear"), Some("Максимум 2030 год"));
    }

    #[test]
    fn test_negative_price_blocked() {
        let mut form = CarForm::create(&owners());
        fill_valid(&mut form);
        form.state_mut().set_value("price", "-5");
        assert!(form.submit().is_none());
        assert_eq!(
            form.state().error("price"),
            Some("Цена не может быть отрицательной")
        );
    }

    #[test]
    fn test_long_color_rejected() {
        let mut form = CarForm::create(&owners());
        fill_valid(&mut form);
        form.state_mut().set_value("color", "к".repeat(41));
        assert!(form.submit().is_none());
        assert_eq!(form.state().error("color"), Some("Максимум 40 символов"));
    }

    #[test]
    fn test_valid_submit_builds_payload_once() {
        let mut form = CarForm::create(&owners());
        fill_valid(&mut form);
        form.state_mut().set_value("price", "4500000");
        let payload = form.submit().expect("valid form");
        assert_eq!(payload.brand, "Lada");
        assert_eq!(payload.registration_number, "123ABC01");
        assert_eq!(payload.price, 4_500_000);
        assert_eq!(payload.owner_id, 3);
        assert!(form.state().is_submitting());
        assert!(form.submit().is_none());
    }

    #[test]
    fn test_edit_prepopulates_exactly() {
        let car = car();
        let form = CarForm::edit(&car, &owners());
        let state = form.state();
        assert_eq!(state.mode(), FormMode::Edit(11));
        assert_eq!(state.value("brand"), "Toyota");
        assert_eq!(state.value("model"), "Camry");
        assert_eq!(state.value("color"), "Белый");
        assert_eq!(state.value("registrationNumber"), "777AAA02");
        assert_eq!(state.value("modelYear"), "2019");
        assert_eq!(state.value("price"), "11500000");
        assert_eq!(form.selected_owner().map(|o| o.name.as_str()), Some("Анна Ким"));
        assert_eq!(form.title(), "Редактировать автомобиль");
        assert_eq!(form.submit_label(), "Сохранить");
    }

    #[test]
    fn test_retarget_resets_fields() {
        let mut form = CarForm::create(&owners());
        form.state_mut().set_value("brand", "");
        form.retarget(Some(&car()));
        assert_eq!(form.state().value("brand"), "Toyota");
        assert!(form.state().errors().is_empty());

        form.retarget(None);
        assert_eq!(form.state().mode(), FormMode::Create);
        assert_eq!(form.state().value("brand"), "");
        assert_eq!(form.state().value("owner_id"), "3");
    }

    #[test]
    fn test_cycle_owner_wraps() {
        let mut form = CarForm::create(&owners());
        form.cycle_owner(true);
        assert_eq!(form.state().value("owner_id"), "8");
        form.cycle_owner(true);
        assert_eq!(form.state().value("owner_id"), "3");
        form.cycle_owner(false);
        assert_eq!(form.state().value("owner_id"), "8");
    }

    #[test]
    fn test_late_owner_choices_fill_create_form() {
        let mut form = CarForm::create(&[]);
        assert_eq!(form.state().value("owner_id"), "");
        form.set_owner_choices(&owners());
        assert_eq!(form.state().value("owner_id"), "3");
    }
}
