use garage_core::api::{ApiClient, ApiError};
use garage_core::forms::CarForm;
use garage_core::models::{CarCreate, CarUpdate, CarWithOwner, EntityKind, Owner};

use super::{ListPage, Modal, MutationKind};

/// How the car list is fetched for a search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarListRequest {
    Brand(String),
    Page { skip: u32, limit: u32 },
}

impl CarListRequest {
    /// A non-empty term searches by brand; an empty one lists the first page.
    pub fn for_term(term: &str, page_size: u32) -> Self {
        let term = term.trim();
        if term.is_empty() {
            CarListRequest::Page {
                skip: 0,
                limit: page_size,
            }
        } else {
            CarListRequest::Brand(term.to_string())
        }
    }

    pub async fn run(&self, api: &ApiClient) -> Result<Vec<CarWithOwner>, ApiError> {
        match self {
            CarListRequest::Brand(brand) => api.search_cars_by_brand(brand).await,
            CarListRequest::Page { skip, limit } => api.list_cars(*skip, *limit).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CarMutation {
    Create(CarCreate),
    Update(i64, CarUpdate),
    Delete(i64),
}

impl CarMutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            CarMutation::Create(_) => MutationKind::Create,
            CarMutation::Update(..) => MutationKind::Update,
            CarMutation::Delete(_) => MutationKind::Delete,
        }
    }

    /// Send the mutation; the success value is the notification text.
    pub async fn run(self, api: &ApiClient) -> Result<String, ApiError> {
        match self {
            CarMutation::Create(body) => {
                let car = api.create_car(&body).await?;
                Ok(format!("Автомобиль {} добавлен", car.title()))
            }
            CarMutation::Update(id, body) => {
                let car = api.update_car(id, &body).await?;
                Ok(format!("Автомобиль {} обновлен", car.title()))
            }
            CarMutation::Delete(id) => {
                api.delete_car(id).await?;
                Ok("Автомобиль удален".to_string())
            }
        }
    }
}

#[derive(Debug)]
pub struct CarsPage {
    pub list: ListPage<CarWithOwner>,
    pub form: CarForm,
}

impl CarsPage {
    pub fn new(term: String) -> Self {
        Self {
            list: ListPage::new(EntityKind::Cars, term),
            form: CarForm::create(&[]),
        }
    }

    pub fn open_create(&mut self, owners: &[Owner]) {
        self.form.set_owner_choices(owners);
        self.form.retarget(None);
        self.list.open_create();
    }

    pub fn open_edit(&mut self, car: CarWithOwner, owners: &[Owner]) {
        self.form.set_owner_choices(owners);
        self.form.retarget(Some(&car));
        self.list.open_edit(car);
    }

    pub fn open_delete(&mut self, car: CarWithOwner) {
        self.list.open_delete(car);
    }

    /// Validate the open form and produce the mutation to send.
    pub fn submit(&mut self) -> Option<CarMutation> {
        let (kind, target) = match &self.list.modal {
            Modal::Create => (MutationKind::Create, None),
            Modal::Edit(car) => (MutationKind::Update, Some(car.id)),
            _ => return None,
        };
        if self.list.pending.get(kind) {
            return None;
        }
        let payload = self.form.submit()?;
        self.list.begin(kind);
        Some(match target {
            Some(id) => CarMutation::Update(id, CarUpdate::from(payload)),
            None => CarMutation::Create(payload),
        })
    }

    pub fn confirm_delete(&mut self) -> Option<CarMutation> {
        let id = match &self.list.modal {
            Modal::ConfirmDelete(car) => car.id,
            _ => return None,
        };
        self.list
            .begin(MutationKind::Delete)
            .then_some(CarMutation::Delete(id))
    }

    pub fn mutation_finished(&mut self, kind: MutationKind, result: &Result<String, String>) {
        self.list.finish(kind, result.is_ok());
        if let Err(message) = result {
            if kind != MutationKind::Delete {
                self.form.state_mut().submit_failed(message.clone());
            }
        }
    }

    pub fn empty_message(&self) -> (&'static str, &'static str) {
        if self.list.has_term() {
            ("Автомобили не найдены", "Попробуйте изменить поисковый запрос")
        } else {
            ("Автомобили отсутствуют", "Добавьте первый автомобиль в систему")
        }
    }

    pub fn delete_prompt(car: &CarWithOwner) -> String {
        format!(
            "Вы уверены, что хотите удалить автомобиль {} ({})?",
            car.title(),
            car.registration_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners() -> Vec<Owner> {
        vec![Owner {
            ownerid: 4,
            firstname: "Иван".to_string(),
            lastname: "Петров".to_string(),
            cars: vec![],
        }]
    }

    fn car() -> CarWithOwner {
        CarWithOwner {
            id: 9,
            brand: "BMW".to_string(),
            model: "X5".to_string(),
            color: "Черный".to_string(),
            registration_number: "555BBB02".to_string(),
            model_year: 2021,
            price: 30_000_000,
            owner_id: 4,
            owner: Some("Иван Петров".to_string()),
            owner_firstname: None,
            owner_lastname: None,
        }
    }

    #[test]
    fn test_list_request_for_term() {
        assert_eq!(
            CarListRequest::for_term("Toyota", 100),
            CarListRequest::Brand("Toyota".to_string())
        );
        assert_eq!(
            CarListRequest::for_term("  ", 50),
            CarListRequest::Page { skip: 0, limit: 50 }
        );
    }

    #[test]
    fn test_invalid_create_sends_nothing() {
        let mut page = CarsPage::new(String::new());
        page.open_create(&owners());
        assert!(page.submit().is_none());
        assert!(!page.list.pending.create);
        assert_eq!(page.form.state().error("brand"), Some("Марка обязательна"));
    }

    #[test]
    fn test_edit_submit_produces_update() {
        let mut page = CarsPage::new(String::new());
        page.open_edit(car(), &owners());
        page.form.state_mut().set_value("price", "29000000");

        match page.submit() {
            Some(CarMutation::Update(9, update)) => {
                assert_eq!(update.price, Some(29_000_000));
                assert_eq!(update.brand.as_deref(), Some("BMW"));
            }
            other => panic!("unexpected mutation: {:?}", other),
        }
        assert!(page.list.pending.update);
        assert!(page.submit().is_none());
    }

    #[test]
    fn test_failed_update_keeps_form_open() {
        let mut page = CarsPage::new(String::new());
        page.open_edit(car(), &owners());
        let mutation = page.submit().unwrap();
        page.mutation_finished(mutation.kind(), &Err("Сервер отклонил данные".to_string()));

        assert!(matches!(page.list.modal, Modal::Edit(_)));
        assert!(!page.list.pending.update);
        assert_eq!(page.form.state().submit_error(), Some("Сервер отклонил данные"));
        assert!(page.submit().is_some());
    }

    #[test]
    fn test_successful_create_closes_modal() {
        let mut page = CarsPage::new(String::new());
        page.open_create(&owners());
        {
            let state = page.form.state_mut();
            state.set_value("brand", "Kia");
            state.set_value("model", "Rio");
            state.set_value("color", "Синий");
            state.set_value("registrationNumber", "100KIA01");
        }
        let mutation = page.submit().unwrap();
        assert!(matches!(mutation, CarMutation::Create(ref body) if body.owner_id == 4));
        page.mutation_finished(MutationKind::Create, &Ok("ok".to_string()));
        assert_eq!(page.list.modal, Modal::None);
    }

    #[test]
    fn test_delete_requires_confirmation_modal() {
        let mut page = CarsPage::new(String::new());
        assert!(page.confirm_delete().is_none());
        page.open_delete(car());
        assert_eq!(page.confirm_delete(), Some(CarMutation::Delete(9)));
        assert!(page.confirm_delete().is_none());
        assert!(CarsPage::delete_prompt(&car()).contains("BMW X5 (555BBB02)"));
    }

    #[test]
    fn test_reopening_create_after_edit_resets_fields() {
        let mut page = CarsPage::new(String::new());
        page.open_edit(car(), &owners());
        page.list.close_modal();
        page.open_create(&owners());
        assert_eq!(page.form.state().value("brand"), "");
        assert_eq!(page.form.state().value("owner_id"), "4");
    }
}
