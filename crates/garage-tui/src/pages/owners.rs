use garage_core::api::{ApiClient, ApiError};
use garage_core::cache::QueryKey;
use garage_core::forms::OwnerForm;
use garage_core::models::{EntityKind, Owner, OwnerCreate, OwnerUpdate};

use super::{ListPage, Modal, MutationKind};

/// Owners requested when no search term is set.
pub const OWNER_LIST_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerListRequest {
    Search(String),
    All,
}

impl OwnerListRequest {
    pub fn for_term(term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            OwnerListRequest::All
        } else {
            OwnerListRequest::Search(term.to_string())
        }
    }

    pub async fn run(&self, api: &ApiClient) -> Result<Vec<Owner>, ApiError> {
        match self {
            OwnerListRequest::Search(term) => api.search_owners_by_term(term).await,
            OwnerListRequest::All => api.list_owners(0, OWNER_LIST_LIMIT).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OwnerMutation {
    Create(OwnerCreate),
    Update(i64, OwnerUpdate),
    Delete(i64),
}

impl OwnerMutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            OwnerMutation::Create(_) => MutationKind::Create,
            OwnerMutation::Update(..) => MutationKind::Update,
            OwnerMutation::Delete(_) => MutationKind::Delete,
        }
    }

    pub async fn run(self, api: &ApiClient) -> Result<String, ApiError> {
        match self {
            OwnerMutation::Create(body) => {
                let owner = api.create_owner(&body).await?;
                Ok(format!("Владелец {} добавлен", owner.full_name()))
            }
            OwnerMutation::Update(id, body) => {
                let owner = api.update_owner(id, &body).await?;
                Ok(format!("Владелец {} обновлен", owner.full_name()))
            }
            OwnerMutation::Delete(id) => {
                api.delete_owner(id).await?;
                Ok("Владелец удален".to_string())
            }
        }
    }
}

#[derive(Debug)]
pub struct OwnersPage {
    pub list: ListPage<Owner>,
    pub form: OwnerForm,
}

impl OwnersPage {
    pub fn new(term: String) -> Self {
        Self {
            list: ListPage::new(EntityKind::Owners, term),
            form: OwnerForm::create(),
        }
    }

    /// Unfiltered owner list, also used for the car form's owner choices.
    pub fn all_owners_key() -> QueryKey {
        QueryKey::list(EntityKind::Owners, "")
    }

    pub fn open_create(&mut self) {
        self.form.retarget(None);
        self.list.open_create();
    }

    pub fn open_edit(&mut self, owner: Owner) {
        self.form.retarget(Some(&owner));
        self.list.open_edit(owner);
    }

    pub fn open_delete(&mut self, owner: Owner) {
        self.list.open_delete(owner);
    }

    pub fn submit(&mut self) -> Option<OwnerMutation> {
        let (kind, target) = match &self.list.modal {
            Modal::Create => (MutationKind::Create, None),
            Modal::Edit(owner) => (MutationKind::Update, Some(owner.ownerid)),
            _ => return None,
        };
        if self.list.pending.get(kind) {
            return None;
        }
        let payload = self.form.submit()?;
        self.list.begin(kind);
        Some(match target {
            Some(id) => OwnerMutation::Update(id, OwnerUpdate::from(payload)),
            None => OwnerMutation::Create(payload),
        })
    }

    pub fn confirm_delete(&mut self) -> Option<OwnerMutation> {
        let id = match &self.list.modal {
            Modal::ConfirmDelete(owner) => owner.ownerid,
            _ => return None,
        };
        self.list
            .begin(MutationKind::Delete)
            .then_some(OwnerMutation::Delete(id))
    }

    pub fn mutation_finished(&mut self, kind: MutationKind, result: &Result<String, String>) {
        self.list.finish(kind, result.is_ok());
        if let Err(message) = result {
            if kind != MutationKind::Delete {
                self.form.state_mut().submit_failed(message.clone());
            }
        }
    }

    pub fn delete_prompt(owner: &Owner) -> String {
        format!(
            "Вы уверены, что хотите удалить владельца {}?",
            owner.full_name()
        )
    }

    /// Cascade warning, present only when the owner still has cars.
    pub fn delete_warning(owner: &Owner) -> Option<String> {
        owner.has_cars().then(|| {
            format!(
                "⚠️ Внимание: У этого владельца есть {} автомобилей. Все автомобили также будут удалены!",
                owner.car_count()
            )
        })
    }

    pub fn empty_message(&self) -> (&'static str, &'static str) {
        if self.list.has_term() {
            ("Владельцы не найдены", "Попробуйте изменить поисковый запрос")
        } else {
            ("Владельцы отсутствуют", "Добавьте первого владельца в систему")
        }
    }
}
