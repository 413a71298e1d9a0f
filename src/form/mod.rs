//! Company form: view-model, list-field rules and validation

pub mod list_field;
pub mod validation;
pub mod view;

pub use list_field::ListKind;
pub use view::{CompanyDraft, CompanyField, CompanyFormView, FormEvent, ViewState, DELETE_PROMPT};
