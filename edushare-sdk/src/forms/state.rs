//! Submission state machine shared by every form.

use std::collections::BTreeMap;

use crate::errors::{Result, ValidationError};

/// Kind of input, used by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Email address.
    Email,
    /// Secret, never echoed.
    Password,
    /// `YYYY-MM-DD`.
    Date,
    /// On/off.
    Checkbox,
}

/// One input as currently filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Name used by [`FormMachine::set_field`] and in error details.
    pub name: &'static str,
    /// Label shown to the user.
    pub label: &'static str,
    /// Input kind.
    pub kind: FieldKind,
    /// Current value; checkboxes hold `"true"` or `"false"`.
    pub value: String,
    /// Whether the field must be filled in.
    pub required: bool,
    /// Live feedback such as password strength.
    pub hint: Option<String>,
}

impl Field {
    pub(crate) fn new(name: &'static str, label: &'static str, kind: FieldKind, value: &str) -> Self {
        Self {
            name,
            label,
            kind,
            value: value.to_string(),
            required: true,
            hint: None,
        }
    }

    pub(crate) fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub(crate) fn hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint;
        self
    }
}

/// The fields and rules of one form.
pub trait FormSpec {
    /// What a valid form submits.
    type Values;

    /// Heading of the form.
    const TITLE: &'static str;
    /// Label of the submit button.
    const SUBMIT_LABEL: &'static str;

    /// Inputs in display order. May change with the values, e.g. with the
    /// role a registration key grants.
    fn fields(&self) -> Vec<Field>;

    /// Stores a value typed in `name`.
    fn set(&mut self, name: &str, value: &str) -> std::result::Result<(), ValidationError>;

    /// Validates one field.
    fn check(&self, name: &str) -> std::result::Result<(), ValidationError>;

    /// Fields whose validity depends on `name`.
    fn dependents(&self, _name: &str) -> &'static [&'static str] {
        &[]
    }

    /// Builds the submitted values; only called once every field checks.
    fn build(&self) -> Self::Values;
}

/// Where a form is in its submit cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    /// Being filled in.
    #[default]
    Editing,
    /// Waiting for the submit callback; submit is disabled.
    Submitting,
    /// The callback succeeded.
    Succeeded,
    /// The callback failed. The form is editable again and shows the error.
    Failed {
        /// Message for the error banner.
        banner: String,
        /// Field the error is about, also shown inline.
        field: Option<String>,
    },
}

/// A form plus its submit cycle:
/// `Editing -> Submitting -> (Succeeded | Failed)`, where `Failed` is still
/// editable and a new submit starts over.
///
/// There is no retry: a failed submit waits for the user to submit again.
#[derive(Debug, Clone, Default)]
pub struct FormMachine<F: FormSpec> {
    form: F,
    state: FormState,
    errors: BTreeMap<String, String>,
}

impl<F: FormSpec> FormMachine<F> {
    /// Machine in the `Editing` state.
    pub fn new(form: F) -> Self {
        Self {
            form,
            state: FormState::Editing,
            errors: BTreeMap::new(),
        }
    }

    /// The form and its values.
    pub fn form(&self) -> &F {
        &self.form
    }

    /// Current state.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Inline errors by field name.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Inline error of one field.
    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Shows `message` under field `name`, or clears it with `None`. For
    /// checks done outside the form, like asking the backend about a key.
    pub fn set_error(&mut self, name: &str, message: Option<String>) {
        match message {
            Some(message) => self.errors.insert(name.to_string(), message),
            None => self.errors.remove(name),
        };
    }

    /// True while the submit callback runs.
    pub fn is_busy(&self) -> bool {
        self.state == FormState::Submitting
    }

    fn value_of(&self, name: &str) -> Option<String> {
        self.form
            .fields()
            .into_iter()
            .find(|f| f.name == name)
            .map(|f| f.value)
    }

    fn recheck(&mut self, name: &str) {
        match self.form.check(name) {
            Ok(()) => {
                self.errors.remove(name);
            }
            Err(e) => {
                let field = e.field.unwrap_or_else(|| name.to_string());
                self.errors.insert(field, e.message);
            }
        }
    }

    /// Stores a value and re-validates that field, plus the fields depending
    /// on it that already show an error or hold a value. Allowed in every
    /// state.
    pub fn set_field(&mut self, name: &str, value: &str) -> std::result::Result<(), ValidationError> {
        self.form.set(name, value)?;
        self.recheck(name);
        for dependent in self.form.dependents(name) {
            let touched = self.errors.contains_key(*dependent)
                || self.value_of(dependent).is_some_and(|v| !v.is_empty());
            if touched {
                self.recheck(dependent);
            }
        }
        Ok(())
    }

    /// Validates every field. On success moves to `Submitting` and returns
    /// the values; otherwise stays editable with the field errors shown.
    /// Returns `None` while a submit is already running.
    pub fn begin_submit(&mut self) -> Option<F::Values> {
        if self.is_busy() {
            tracing::debug!(form = F::TITLE, "submit ignored while submitting");
            return None;
        }
        self.errors.clear();
        for field in self.form.fields() {
            self.recheck(field.name);
        }
        if !self.errors.is_empty() {
            self.state = FormState::Editing;
            return None;
        }
        self.state = FormState::Submitting;
        Some(self.form.build())
    }

    /// Records the outcome of the submit callback.
    pub fn finish<T>(&mut self, outcome: &Result<T>) {
        match outcome {
            Ok(_) => {
                self.errors.clear();
                self.state = FormState::Succeeded;
            }
            Err(e) => {
                let banner = e.user_message();
                let field = e.field();
                if let Some(field) = &field {
                    self.errors.insert(field.clone(), banner.clone());
                }
                tracing::debug!(form = F::TITLE, error = %e, "submit failed");
                self.state = FormState::Failed { banner, field };
            }
        }
    }

    /// Runs the whole cycle: validate, await `callback` with the values,
    /// record the outcome. `None` when the form did not validate or was
    /// already submitting, in which case `callback` is not called.
    pub async fn submit<T, C, Fut>(&mut self, callback: C) -> Option<Result<T>>
    where
        C: FnOnce(F::Values) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let values = self.begin_submit()?;
        let outcome = callback(values).await;
        self.finish(&outcome);
        Some(outcome)
    }
}
