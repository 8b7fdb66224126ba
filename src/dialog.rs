//! Headless record editing forms
//!
//! A [`RecordDialog`] binds one record to a set of [`FieldWidget`]s and runs
//! the editing protocol of the data-entry forms: every edit goes through the
//! record's setter and decorates its widget, saving is only offered while
//! something changed, and moving to another record with unsaved edits asks
//! Yes/No/Cancel through a [`Prompt`]. Front ends supply the prompt and
//! render the widgets.

use std::collections::BTreeMap;
use std::str::FromStr;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::record::{FieldName, Properties, Record};
use crate::core::store::{Store, StoreError};
use crate::core::validate::{FieldValue, Validation};

/// Whether the form is creating a record or editing a stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    AddElement,
    EditElement,
}

/// What the form does after a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneMode {
    /// Close the form
    Close,
    /// Start over with an empty record
    New,
    /// Keep editing the saved record
    Stay,
}

impl FromStr for DoneMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "close" => Ok(DoneMode::Close),
            "new" => Ok(DoneMode::New),
            "stay" => Ok(DoneMode::Stay),
            other => Err(format!("unknown done mode '{}'", other)),
        }
    }
}

/// Result of [`RecordDialog::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SaveStatus {
    Success = 0,
    RecordInvalid = 1,
    /// The caller asked for a done mode that does not exist; the form closes
    UnknownDoneMode = 2,
    StoreRejected = 3,
}

impl SaveStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self == SaveStatus::Success
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum DialogError {
    #[error("nothing is selected")]
    #[diagnostic(
        code(partstracker::dialog::nothing_selected),
        help("select a saved record before deleting")
    )]
    NothingSelected,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Display state of one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWidget {
    pub base_tooltip: &'static str,
    pub tooltip: String,
    /// Error decoration shown
    pub error: bool,
    /// What the field shows
    pub text: String,
}

impl FieldWidget {
    pub fn new(base_tooltip: &'static str) -> Self {
        Self {
            base_tooltip,
            tooltip: base_tooltip.to_string(),
            error: false,
            text: String::new(),
        }
    }

    fn reset(&mut self, text: String) {
        self.error = false;
        self.tooltip = self.base_tooltip.to_string();
        self.text = text;
    }
}

/// Show a validation result on a widget
pub fn decorate(widget: &mut FieldWidget, result: &Validation) {
    widget.text = result.entry.to_string();
    if result.valid {
        widget.error = false;
        widget.tooltip = widget.base_tooltip.to_string();
    } else {
        widget.error = true;
        widget.tooltip = format!("{}\n{}", result.msg, widget.base_tooltip);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Yes,
    No,
    Cancel,
}

/// User interaction the form needs from its front end
pub trait Prompt {
    /// Ask whether to save unsaved changes before moving on
    fn confirm_save(&mut self, message: &str) -> PromptAnswer;

    fn warn(&mut self, message: &str);
}

/// How a [`RecordDialog::navigate`] call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Nothing was pending; the target is loaded
    Loaded,
    /// Pending changes were saved, then the target was loaded
    SavedAndLoaded,
    /// Pending changes were dropped, then the target was loaded
    Discarded,
    /// The user kept the current record
    Cancelled,
    /// Saving the pending changes failed; the current record stays
    SaveFailed(SaveStatus),
}

/// A form bound to one record
#[derive(Debug)]
pub struct RecordDialog<R: Record> {
    record: R,
    mode: DialogMode,
    widgets: BTreeMap<R::Field, FieldWidget>,
    change_in_process: bool,
    open: bool,
    last_error: Option<String>,
}

impl<R: Record> RecordDialog<R> {
    /// A form for a new record
    pub fn add() -> Self {
        Self::with_record(R::new(), DialogMode::AddElement)
    }

    /// A form on a stored record
    pub fn edit(record: R) -> Self {
        let mode = if record.record_id() == 0 {
            DialogMode::AddElement
        } else {
            DialogMode::EditElement
        };
        Self::with_record(record, mode)
    }

    /// Open the record with `key`; an unknown key gives an add form for it
    pub fn open_key(store: &Store, key: &str) -> Result<Self, StoreError> {
        let mut dialog = Self::add();
        dialog.load(store, key)?;
        Ok(dialog)
    }

    fn with_record(record: R, mode: DialogMode) -> Self {
        let widgets = R::Field::ALL
            .iter()
            .map(|f| (*f, FieldWidget::new(f.tooltip())))
            .collect();
        let mut dialog = Self {
            record,
            mode,
            widgets,
            change_in_process: false,
            open: true,
            last_error: None,
        };
        dialog.refresh_widgets();
        dialog
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn mode(&self) -> DialogMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn widget(&self, field: R::Field) -> &FieldWidget {
        &self.widgets[&field]
    }

    pub fn widgets(&self) -> impl Iterator<Item = (R::Field, &FieldWidget)> {
        self.widgets.iter().map(|(f, w)| (*f, w))
    }

    /// Message of the last failed write
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn title(&self) -> String {
        match self.mode {
            DialogMode::AddElement => format!("Add {}", R::KIND),
            DialogMode::EditElement => format!("Edit {}", R::KIND),
        }
    }

    /// Mark a field change as started; false if one is already running
    pub fn begin_change(&mut self) -> bool {
        if self.change_in_process {
            return false;
        }
        self.change_in_process = true;
        true
    }

    pub fn end_change(&mut self) {
        self.change_in_process = false;
    }

    /// Run one field edit through the record and decorate its widget
    ///
    /// Returns `None` when another change is still being processed.
    pub fn edit_field(
        &mut self,
        store: &Store,
        field: R::Field,
        input: impl Into<FieldValue>,
    ) -> Result<Option<Validation>, StoreError> {
        if !self.begin_change() {
            tracing::debug!(field = field.column(), "ignoring re-entrant change");
            return Ok(None);
        }
        let result = self.apply_edit(store, field, input.into());
        self.end_change();
        result.map(Some)
    }

    fn apply_edit(
        &mut self,
        store: &Store,
        field: R::Field,
        input: FieldValue,
    ) -> Result<Validation, StoreError> {
        let result = self.record.set_field(field, input);
        if let Some(widget) = self.widgets.get_mut(&field) {
            decorate(widget, &result);
            if result.valid {
                widget.text = self.record.display_value(field);
            }
        }

        if result.valid && self.mode == DialogMode::EditElement && Some(field) == R::KEY_FIELD {
            let key = self.record.field_value(field);
            let initial = self.record.state().initial().get(field);
            if key != initial && !R::key_exists(store, &key.to_string())? {
                self.switch_to_add();
            }
        }
        Ok(result)
    }

    /// Keep what was typed but save it as a new record
    fn switch_to_add(&mut self) {
        let mut fresh = R::new();
        fresh.set_properties(self.record.properties());
        tracing::debug!(kind = R::KIND, "new key entered, switching to add mode");
        self.record = fresh;
        self.mode = DialogMode::AddElement;
    }

    /// Save is offered only while something changed
    pub fn save_enabled(&self) -> bool {
        self.record.have_values_changed()
    }

    /// Write the record and act on `done`
    pub fn save(&mut self, store: &Store, done: &str) -> SaveStatus {
        self.last_error = None;
        let Ok(done) = done.parse::<DoneMode>() else {
            tracing::error!(done, "unknown done mode, closing {} form", R::KIND);
            self.open = false;
            return SaveStatus::UnknownDoneMode;
        };

        if !self.record.is_element_valid() {
            for field in self.record.state().flags().invalid_fields() {
                if let Some(widget) = self.widgets.get_mut(&field) {
                    widget.error = true;
                }
            }
            return SaveStatus::RecordInvalid;
        }

        let written = match self.mode {
            DialogMode::AddElement => self.record.add(store).map(|_| ()),
            DialogMode::EditElement => self.record.update(store),
        };
        if let Err(e) = written {
            tracing::warn!(kind = R::KIND, error = %e, "save rejected");
            self.last_error = Some(e.to_string());
            return SaveStatus::StoreRejected;
        }

        match done {
            DoneMode::Close => {
                self.open = false;
                self.mode = DialogMode::EditElement;
            }
            DoneMode::New => self.reset(),
            DoneMode::Stay => self.mode = DialogMode::EditElement,
        }
        self.refresh_widgets();
        SaveStatus::Success
    }

    /// Delete the loaded record and start over with an empty one
    pub fn delete(&mut self, store: &Store) -> Result<(), DialogError> {
        if self.record.record_id() == 0 {
            return Err(DialogError::NothingSelected);
        }
        self.record.delete(store)?;
        self.reset();
        Ok(())
    }

    /// Move to the record named by `key`, asking first if edits are pending
    pub fn navigate(
        &mut self,
        store: &Store,
        key: &str,
        prompt: &mut dyn Prompt,
    ) -> Result<Navigation, StoreError> {
        if !self.record.have_values_changed() {
            self.load(store, key)?;
            return Ok(Navigation::Loaded);
        }

        let message = format!("Save changes to this {}?", R::KIND);
        match prompt.confirm_save(&message) {
            PromptAnswer::Yes => {
                let status = self.save(store, "stay");
                if !status.is_success() {
                    let reason = self
                        .last_error
                        .clone()
                        .unwrap_or_else(|| "fix the highlighted fields".to_string());
                    prompt.warn(&format!("Could not save {}: {}", R::KIND, reason));
                    return Ok(Navigation::SaveFailed(status));
                }
                self.load(store, key)?;
                Ok(Navigation::SavedAndLoaded)
            }
            PromptAnswer::No => {
                self.load(store, key)?;
                Ok(Navigation::Discarded)
            }
            PromptAnswer::Cancel => Ok(Navigation::Cancelled),
        }
    }

    /// Replace the record with the one named by `key`
    ///
    /// Records with an alternate key are looked up by it, others by record
    /// id. A keyed miss gives an add form carrying the key.
    fn load(&mut self, store: &Store, key: &str) -> Result<(), StoreError> {
        let record = match R::KEY_FIELD {
            Some(field) => {
                let found = R::fetch_by_key(store, key)?;
                if found.record_id() == 0 {
                    let mut fresh = R::new();
                    fresh.set_field(field, key.into());
                    fresh
                } else {
                    found
                }
            }
            None => {
                let record_id = key.trim().parse::<i64>().map_err(|_| StoreError::NotFound {
                    kind: R::KIND,
                    key: key.to_string(),
                })?;
                R::fetch(store, record_id)?
            }
        };

        self.mode = if record.record_id() == 0 {
            DialogMode::AddElement
        } else {
            DialogMode::EditElement
        };
        self.record = record;
        self.refresh_widgets();
        Ok(())
    }

    fn reset(&mut self) {
        self.record = R::new();
        self.mode = DialogMode::AddElement;
        self.refresh_widgets();
    }

    fn refresh_widgets(&mut self) {
        for (field, widget) in self.widgets.iter_mut() {
            widget.reset(self.record.display_value(*field));
        }
    }
}
