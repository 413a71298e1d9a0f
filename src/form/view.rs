//! Company form view-model
//!
//! `CompanyFormView` owns one in-memory company draft, applies explicit field
//! edits to it and talks to the server through the injected
//! [`RecordLoader`] / [`RecordSubmitter`]. Remote calls run as spawned tokio
//! tasks so the UI keeps accepting input; the UI loop collects results with
//! [`CompanyFormView::update_progress`]. At most one request is outstanding
//! at a time.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{Result, RpelError};
use crate::form::list_field::{self, ListKind};
use crate::form::validation;
use crate::models::{Company, ContactShort, PracticeList, SelectItem};
use crate::remote::protocol::{COMPANY, SCOPE_SELECT};
use crate::remote::{DbObject, Item, RecordLoader, RecordSubmitter};

/// Question asked before a record is deleted
pub const DELETE_PROMPT: &str = "Вы действительно хотите удалить эту запись?";

/// Lifecycle of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Waiting for the record to arrive
    Loading,
    /// Editable, no request outstanding
    Ready,
    /// Save or delete in flight
    Submitting,
}

/// Editable scalar or list element of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    Address,
    Note,
    List(ListKind, usize),
}

/// Result of a finished request, reported to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Loaded,
    Saved { id: i64 },
    Deleted,
    Failed(String),
}

/// In-memory copy of the company being edited
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyDraft {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub note: String,
    scope: Option<SelectItem>,
    emails: Vec<String>,
    phones: Vec<String>,
    faxes: Vec<String>,
    pub practices: Vec<PracticeList>,
    pub contacts: Vec<ContactShort>,
}

impl CompanyDraft {
    /// Fresh unsaved record with one blank slot per list
    pub fn blank() -> Self {
        Self {
            id: 0,
            name: String::new(),
            address: String::new(),
            note: String::new(),
            scope: None,
            emails: vec![String::new()],
            phones: vec![String::new()],
            faxes: vec![String::new()],
            practices: Vec::new(),
            contacts: Vec::new(),
        }
    }

    /// Build a draft from a server record, resolving its scope against `scopes`
    pub fn from_company(company: Company, scopes: &[SelectItem]) -> Self {
        let scope = company.scope_id.map(|scope_id| {
            scopes
                .iter()
                .find(|s| s.id == scope_id)
                .cloned()
                .unwrap_or(SelectItem {
                    id: scope_id,
                    name: None,
                })
        });
        Self {
            id: company.id,
            name: company.name.unwrap_or_default(),
            address: company.address.unwrap_or_default(),
            note: company.note.unwrap_or_default(),
            scope,
            emails: list_field::with_trailing_blank(&company.emails),
            phones: list_field::with_trailing_blank(&to_strings(&company.phones)),
            faxes: list_field::with_trailing_blank(&to_strings(&company.faxes)),
            practices: company.practices,
            contacts: company.contacts,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    pub fn scope(&self) -> Option<&SelectItem> {
        self.scope.as_ref()
    }

    /// Foreign key of the selected scope, always derived from the selection
    pub fn scope_id(&self) -> Option<i64> {
        self.scope.as_ref().map(|s| s.id)
    }

    pub fn list(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::Emails => &self.emails,
            ListKind::Phones => &self.phones,
            ListKind::Faxes => &self.faxes,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut Vec<String> {
        match kind {
            ListKind::Emails => &mut self.emails,
            ListKind::Phones => &mut self.phones,
            ListKind::Faxes => &mut self.faxes,
        }
    }

    pub fn value(&self, field: CompanyField) -> Option<&str> {
        match field {
            CompanyField::Name => Some(&self.name),
            CompanyField::Address => Some(&self.address),
            CompanyField::Note => Some(&self.note),
            CompanyField::List(kind, index) => self.list(kind).get(index).map(String::as_str),
        }
    }

    /// Server form of the draft: blanks dropped, phones as integers
    pub fn to_company(&self) -> Company {
        let optional = |value: &str| {
            if value.trim().is_empty() {
                None
            } else {
                Some(value.trim().to_string())
            }
        };

        Company {
            id: self.id,
            name: optional(&self.name),
            address: optional(&self.address),
            scope_id: self.scope_id(),
            note: optional(&self.note),
            emails: list_field::compact(&self.emails),
            phones: list_field::phone_numbers(&self.phones),
            faxes: list_field::phone_numbers(&self.faxes),
            ..Default::default()
        }
    }
}

fn to_strings(numbers: &[i64]) -> Vec<String> {
    numbers.iter().map(|n| n.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RequestKind {
    Load,
    Save,
    Delete,
}

#[derive(Debug)]
enum Outcome {
    Loaded {
        company: Option<Company>,
        scopes: Vec<SelectItem>,
    },
    Inserted(i64),
    Updated,
    Deleted,
}

struct PendingRequest {
    kind: RequestKind,
    /// Model revision captured when the request was issued
    revision: u64,
    handle: JoinHandle<Result<Outcome>>,
}

/// Form view-model for a single company record
pub struct CompanyFormView {
    loader: Arc<dyn RecordLoader>,
    submitter: Arc<dyn RecordSubmitter>,
    state: ViewState,
    record_id: i64,
    draft: CompanyDraft,
    scopes: Vec<SelectItem>,
    loaded: bool,
    dirty: bool,
    closed: bool,
    revision: u64,
    last_error: Option<String>,
    pending: Option<PendingRequest>,
}

impl CompanyFormView {
    pub fn new(loader: Arc<dyn RecordLoader>, submitter: Arc<dyn RecordSubmitter>) -> Self {
        Self {
            loader,
            submitter,
            state: ViewState::Ready,
            record_id: 0,
            draft: CompanyDraft::blank(),
            scopes: Vec::new(),
            loaded: false,
            dirty: false,
            closed: false,
            revision: 0,
            last_error: None,
            pending: None,
        }
    }

    /// Create a view and start loading record `id` (0 opens a new record)
    pub fn open(
        loader: Arc<dyn RecordLoader>,
        submitter: Arc<dyn RecordSubmitter>,
        id: i64,
    ) -> Result<Self> {
        let mut view = Self::new(loader, submitter);
        view.load(id)?;
        Ok(view)
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn draft(&self) -> &CompanyDraft {
        &self.draft
    }

    pub fn scopes(&self) -> &[SelectItem] {
        &self.scopes
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Edits are accepted once the record has loaded, even while saving
    pub fn is_editable(&self) -> bool {
        self.loaded && !self.closed
    }

    /// Whether save/delete may be issued right now
    pub fn can_submit(&self) -> bool {
        self.pending.is_none() && self.is_editable()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Inline validation message for the email at `index`
    pub fn email_error(&self, index: usize) -> Option<&'static str> {
        self.draft
            .emails
            .get(index)
            .and_then(|value| validation::email_error(value))
    }

    /// Number of emails currently failing validation
    pub fn invalid_email_count(&self) -> usize {
        self.draft
            .emails
            .iter()
            .filter(|value| validation::email_error(value).is_some())
            .count()
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.dirty = true;
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.pending.is_some() {
            Err(RpelError::Busy)
        } else {
            Ok(())
        }
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(RpelError::NotEditable)
        }
    }

    /// Start fetching record `id` together with the scope list
    pub fn load(&mut self, id: i64) -> Result<()> {
        self.ensure_idle()?;
        info!("Loading company {}", id);

        self.record_id = id;
        self.state = ViewState::Loading;
        self.last_error = None;

        let loader = Arc::clone(&self.loader);
        let handle = tokio::spawn(async move {
            let scopes = loader
                .fetch_list(SCOPE_SELECT.to_string())
                .await?
                .into_select_items()?;
            let company = if id == 0 {
                None
            } else {
                Some(loader.fetch_item(Item::new(COMPANY, id)).await?.into_company()?)
            };
            Ok(Outcome::Loaded { company, scopes })
        });

        self.pending = Some(PendingRequest {
            kind: RequestKind::Load,
            revision: self.revision,
            handle,
        });
        Ok(())
    }

    /// Load the current record again, e.g. after a failed fetch
    pub fn reload(&mut self) -> Result<()> {
        self.load(self.record_id)
    }

    pub fn on_field_edit(&mut self, field: CompanyField, value: String) -> Result<()> {
        self.ensure_editable()?;
        match field {
            CompanyField::Name => self.draft.name = value,
            CompanyField::Address => self.draft.address = value,
            CompanyField::Note => self.draft.note = value,
            CompanyField::List(kind, index) => {
                let slot = self
                    .draft
                    .list_mut(kind)
                    .get_mut(index)
                    .ok_or(RpelError::FieldIndex {
                        list: kind.as_str(),
                        index,
                    })?;
                *slot = value;
            }
        }
        self.touch();
        Ok(())
    }

    /// Normalize a list field when its input loses focus
    pub fn on_blur(&mut self, kind: ListKind) {
        if !self.is_editable() {
            return;
        }
        let normalized = list_field::with_trailing_blank(self.draft.list(kind));
        if normalized != self.draft.list(kind) {
            debug!("Normalized {} to {} entries", kind.as_str(), normalized.len());
            *self.draft.list_mut(kind) = normalized;
            self.revision += 1;
        }
    }

    pub fn on_scope_select(&mut self, scope: SelectItem) -> Result<()> {
        self.ensure_editable()?;
        debug!("Scope selected: {} ({})", scope.label(), scope.id);
        self.draft.scope = Some(scope);
        self.touch();
        Ok(())
    }

    /// Start saving the draft; creates when the id is 0, updates otherwise
    pub fn submit(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.ensure_editable()?;

        for kind in ListKind::ALL {
            self.on_blur(kind);
        }
        let invalid = self.invalid_email_count();
        if invalid > 0 {
            warn!("Saving company with {} invalid email(s)", invalid);
        }

        let company = self.draft.to_company();
        let is_new = self.draft.is_new();
        info!(
            "{} company {}",
            if is_new { "Inserting" } else { "Updating" },
            company.id
        );

        let submitter = Arc::clone(&self.submitter);
        let handle = tokio::spawn(async move {
            let object = DbObject::Company(Box::new(company));
            if is_new {
                Ok(Outcome::Inserted(submitter.insert_item(object).await?))
            } else {
                submitter.update_item(object).await?;
                Ok(Outcome::Updated)
            }
        });

        self.state = ViewState::Submitting;
        self.last_error = None;
        self.pending = Some(PendingRequest {
            kind: RequestKind::Save,
            revision: self.revision,
            handle,
        });
        Ok(())
    }

    /// Delete the record after `confirm` approves [`DELETE_PROMPT`].
    ///
    /// Returns `Ok(false)` when the confirmation is declined. An unsaved
    /// record is simply closed.
    pub fn delete<F>(&mut self, confirm: F) -> Result<bool>
    where
        F: FnOnce(&str) -> bool,
    {
        self.ensure_idle()?;
        self.ensure_editable()?;

        if !confirm(DELETE_PROMPT) {
            debug!("Delete of company {} cancelled", self.draft.id);
            return Ok(false);
        }

        if self.draft.is_new() {
            info!("Discarding unsaved company");
            self.close();
            return Ok(true);
        }

        let id = self.draft.id;
        info!("Deleting company {}", id);
        let submitter = Arc::clone(&self.submitter);
        let handle = tokio::spawn(async move {
            submitter.delete_item(Item::new(COMPANY, id)).await?;
            Ok(Outcome::Deleted)
        });

        self.state = ViewState::Submitting;
        self.last_error = None;
        self.pending = Some(PendingRequest {
            kind: RequestKind::Delete,
            revision: self.revision,
            handle,
        });
        Ok(true)
    }

    /// Discard the draft and mark the view closed. An in-flight request is
    /// left to finish on its own; its result is ignored.
    pub fn close(&mut self) {
        if self.dirty {
            info!("Closing company {} with unsaved changes", self.draft.id);
        }
        self.pending = None;
        self.draft = CompanyDraft::blank();
        self.dirty = false;
        self.loaded = false;
        self.closed = true;
        self.state = ViewState::Ready;
        self.revision += 1;
    }

    /// Collect the outstanding request if it has finished, without waiting
    pub async fn update_progress(&mut self) -> Option<FormEvent> {
        let finished = self
            .pending
            .as_ref()
            .map_or(false, |pending| pending.handle.is_finished());
        if finished {
            self.settle().await
        } else {
            None
        }
    }

    /// Wait for the outstanding request and apply its result
    pub async fn settle(&mut self) -> Option<FormEvent> {
        let pending = self.pending.take()?;
        let result = match pending.handle.await {
            Ok(result) => result,
            Err(e) => Err(RpelError::Task(e)),
        };
        Some(self.apply(pending.kind, pending.revision, result))
    }

    fn apply(&mut self, kind: RequestKind, revision: u64, result: Result<Outcome>) -> FormEvent {
        self.state = ViewState::Ready;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{:?} request failed: {}", kind, e);
                if kind == RequestKind::Load {
                    self.loaded = false;
                }
                let message = e.to_string();
                self.last_error = Some(message.clone());
                self.revision += 1;
                return FormEvent::Failed(message);
            }
        };

        // Edits made while saving keep the draft dirty
        let unchanged = self.revision == revision;
        self.revision += 1;

        match outcome {
            Outcome::Loaded { company, scopes } => {
                self.draft = match company {
                    Some(company) => CompanyDraft::from_company(company, &scopes),
                    None => CompanyDraft::blank(),
                };
                self.scopes = scopes;
                self.loaded = true;
                self.dirty = false;
                info!("Company {} loaded", self.draft.id);
                FormEvent::Loaded
            }
            Outcome::Inserted(id) => {
                self.draft.id = id;
                self.record_id = id;
                if unchanged {
                    self.dirty = false;
                }
                info!("Company inserted with id {}", id);
                FormEvent::Saved { id }
            }
            Outcome::Updated => {
                if unchanged {
                    self.dirty = false;
                }
                info!("Company {} updated", self.draft.id);
                FormEvent::Saved { id: self.draft.id }
            }
            Outcome::Deleted => {
                info!("Company {} deleted", self.draft.id);
                self.close();
                FormEvent::Deleted
            }
        }
    }
}
