//! Display model of a form, decoupled from any UI toolkit.

use std::fmt::{self, Display};

use super::state::{Field, FieldKind, FormMachine, FormSpec, FormState};

/// A field with its inline error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    /// The input.
    pub field: Field,
    /// Inline error, if any.
    pub error: Option<String>,
}

/// Everything a renderer needs to draw a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    /// Heading.
    pub title: &'static str,
    /// Inputs in display order.
    pub rows: Vec<FieldRow>,
    /// Error banner of the last failed submit.
    pub banner: Option<String>,
    /// Whether the last submit succeeded.
    pub succeeded: bool,
    /// True while submitting.
    pub busy: bool,
    /// Submit button label.
    pub submit_label: &'static str,
    /// False only while submitting.
    pub submit_enabled: bool,
}

impl FormView {
    /// Snapshot of `machine`.
    pub fn of<F: FormSpec>(machine: &FormMachine<F>) -> Self {
        let rows = machine
            .form()
            .fields()
            .into_iter()
            .map(|field| FieldRow {
                error: machine.error(field.name).map(str::to_string),
                field,
            })
            .collect();
        let banner = match machine.state() {
            FormState::Failed { banner, .. } => Some(banner.clone()),
            _ => None,
        };
        let busy = machine.is_busy();
        FormView {
            title: F::TITLE,
            rows,
            banner,
            succeeded: *machine.state() == FormState::Succeeded,
            busy,
            submit_label: F::SUBMIT_LABEL,
            submit_enabled: !busy,
        }
    }
}

impl Display for FieldRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = &self.field;
        let required = if field.required { "*" } else { "" };
        match field.kind {
            FieldKind::Checkbox => {
                let mark = if field.value == "true" { 'x' } else { ' ' };
                write!(f, "[{mark}] {}", field.label)?;
            }
            FieldKind::Password => {
                let masked = "•".repeat(field.value.chars().count());
                write!(f, "{}{required}: {masked}", field.label)?;
            }
            FieldKind::Text | FieldKind::Email | FieldKind::Date => {
                write!(f, "{}{required}: {}", field.label, field.value)?;
            }
        }
        if let Some(hint) = &field.hint {
            write!(f, " ({hint})")?;
        }
        if let Some(error) = &self.error {
            write!(f, "\n  ! {error}")?;
        }
        Ok(())
    }
}

impl Display for FormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        if let Some(banner) = &self.banner {
            writeln!(f, "!! {banner}")?;
        }
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        if self.busy {
            write!(f, "[ {} ... ]", self.submit_label)
        } else {
            write!(f, "[ {} ]", self.submit_label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::{Error, RequestError},
        forms::login::LoginForm,
    };
    use reqwest::StatusCode;

    #[test]
    fn renders_states() {
        let mut machine = FormMachine::new(LoginForm::default());
        machine.set_field("email", "marie@lycee.fr").unwrap();
        machine.set_field("password", "Secret12").unwrap();

        let idle = FormView::of(&machine);
        assert!(idle.submit_enabled);
        assert_eq!(
            idle.to_string(),
            "== Connexion ==\n\
             Email*: marie@lycee.fr\n\
             Mot de passe*: ••••••••\n\
             [ ] Se souvenir de moi\n\
             [ Se connecter ]"
        );

        machine.begin_submit().unwrap();
        let busy = FormView::of(&machine);
        assert!(busy.busy);
        assert!(!busy.submit_enabled);

        machine.finish::<()>(&Err(Error::Request(RequestError::Server {
            status: StatusCode::UNAUTHORIZED,
            message: "Identifiants invalides".into(),
            details: None,
        })));
        let failed = FormView::of(&machine);
        assert!(failed.submit_enabled);
        assert_eq!(failed.banner.as_deref(), Some("Identifiants invalides"));
        assert!(failed.to_string().contains("!! Identifiants invalides"));
    }

    #[test]
    fn inline_errors_are_listed_under_their_field() {
        let mut machine = FormMachine::new(LoginForm::default());
        machine.set_field("email", "nope").unwrap();
        let text = FormView::of(&machine).to_string();
        assert!(text.contains("Email*: nope\n  ! Format d'email invalide"));
    }
}
