//! Entity forms: rule tables, validation, and editable form state.

mod car;
mod owner;
mod rules;
mod state;

pub use car::{CarForm, OwnerChoice, CAR_RULES, MAX_MODEL_YEAR, MIN_MODEL_YEAR};
pub use owner::{OwnerForm, OWNER_RULES};
pub use rules::{validate, FieldErrors, FieldKind, FieldRule, NOT_A_NUMBER};
pub use state::{FormMode, FormState};
