//! Sign-up form.
//!
//! The registration key decides the role, and the role decides which
//! affiliation is asked for: a class for students, a subject for teachers.

use edushare_common::{
    key::{role_from_key, validate_key},
    password::{password_strength, validate_password, PasswordStrength},
    validation::{require, validate_date, validate_email},
    Role,
};

use super::state::{Field, FieldKind, FormMachine, FormSpec};
use crate::{
    api::auth::{AuthClient, AuthResponse, KeyValidation, Registration},
    errors::{Result, ValidationError},
};

/// Values of the sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    /// Registration key as typed.
    pub registration_key: String,
    /// Email.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password again.
    pub confirm_password: String,
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Birth date, optional.
    pub date_naissance: String,
    /// Class, asked of students.
    pub classe: String,
    /// Subject, asked of teachers.
    pub matiere: String,
}

impl RegisterForm {
    /// Role granted by the key typed so far.
    pub fn role(&self) -> Option<Role> {
        role_from_key(self.registration_key.trim())
    }
}

fn strength_label(strength: PasswordStrength) -> &'static str {
    match strength {
        PasswordStrength::Weak => "Force : faible",
        PasswordStrength::Medium => "Force : moyenne",
        PasswordStrength::Strong => "Force : forte",
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl FormSpec for RegisterForm {
    type Values = Registration;

    const TITLE: &'static str = "Inscription";
    const SUBMIT_LABEL: &'static str = "Créer mon compte";

    fn fields(&self) -> Vec<Field> {
        let role = self.role();
        let key_hint = role.map(|role| match role {
            Role::Professeur => "Compte professeur".to_string(),
            Role::Eleve => "Compte élève".to_string(),
        });
        let strength = (!self.password.is_empty())
            .then(|| strength_label(password_strength(&self.password)).to_string());

        let mut fields = vec![
            Field::new(
                "registration_key",
                "Clé d'inscription",
                FieldKind::Text,
                &self.registration_key,
            )
            .hint(key_hint),
            Field::new("email", "Email", FieldKind::Email, &self.email),
            Field::new("password", "Mot de passe", FieldKind::Password, &self.password)
                .hint(strength),
            Field::new(
                "confirm_password",
                "Confirmation du mot de passe",
                FieldKind::Password,
                &self.confirm_password,
            ),
            Field::new("nom", "Nom", FieldKind::Text, &self.nom),
            Field::new("prenom", "Prénom", FieldKind::Text, &self.prenom),
            Field::new(
                "date_naissance",
                "Date de naissance",
                FieldKind::Date,
                &self.date_naissance,
            )
            .optional(),
        ];
        match role {
            Some(Role::Eleve) => {
                fields.push(Field::new("classe", "Classe", FieldKind::Text, &self.classe))
            }
            Some(Role::Professeur) => {
                fields.push(Field::new("matiere", "Matière", FieldKind::Text, &self.matiere))
            }
            None => {}
        }
        fields
    }

    fn set(&mut self, name: &str, value: &str) -> std::result::Result<(), ValidationError> {
        let slot = match name {
            "registration_key" => &mut self.registration_key,
            "email" => &mut self.email,
            "password" => &mut self.password,
            "confirm_password" => &mut self.confirm_password,
            "nom" => &mut self.nom,
            "prenom" => &mut self.prenom,
            "date_naissance" => &mut self.date_naissance,
            "classe" => &mut self.classe,
            "matiere" => &mut self.matiere,
            other => return Err(ValidationError::field(other, "Champ inconnu")),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn check(&self, name: &str) -> std::result::Result<(), ValidationError> {
        match name {
            "registration_key" => validate_key(name, self.registration_key.trim()).map(|_| ()),
            "email" => validate_email(name, &self.email),
            "password" => validate_password(&self.password).into_result(name),
            "confirm_password" if self.confirm_password.is_empty() => Err(
                ValidationError::field(name, "Confirmez le mot de passe"),
            ),
            "confirm_password" if self.confirm_password != self.password => Err(
                ValidationError::field(name, "Les mots de passe ne correspondent pas"),
            ),
            "nom" => require(name, &self.nom, "Le nom est requis"),
            "prenom" => require(name, &self.prenom, "Le prénom est requis"),
            "date_naissance" if !self.date_naissance.trim().is_empty() => {
                validate_date(name, &self.date_naissance)
            }
            "classe" if self.role() == Some(Role::Eleve) => require(name, &self.classe, "La classe est requise"),
            "matiere" if self.role() == Some(Role::Professeur) => {
                require(name, &self.matiere, "La matière est requise")
            }
            _ => Ok(()),
        }
    }

    fn dependents(&self, name: &str) -> &'static [&'static str] {
        match name {
            "password" => &["confirm_password"],
            "registration_key" => &["classe", "matiere"],
            _ => &[],
        }
    }

    fn build(&self) -> Registration {
        let role = self.role();
        Registration {
            registration_key: self.registration_key.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            nom: self.nom.trim().to_string(),
            prenom: self.prenom.trim().to_string(),
            date_naissance: optional(&self.date_naissance),
            classe: (role == Some(Role::Eleve))
                .then(|| optional(&self.classe))
                .flatten(),
            matiere: (role == Some(Role::Professeur))
                .then(|| optional(&self.matiere))
                .flatten(),
        }
    }
}

impl FormMachine<RegisterForm> {
    /// Asks the backend whether the typed key is still usable and shows the
    /// answer on the key field. Errors are shown as they come, a 401
    /// included: no session exists yet to reject.
    pub async fn check_key(&mut self, auth: &AuthClient) -> Result<KeyValidation> {
        let key = self.form().registration_key.trim().to_string();
        let outcome = auth.validate_key(&key).await;
        let error = match &outcome {
            Ok(validation) if !validation.valid => Some(
                validation
                    .message
                    .clone()
                    .unwrap_or_else(|| "Clé d'inscription invalide ou déjà utilisée".into()),
            ),
            Ok(_) => None,
            Err(e) => Some(e.user_message()),
        };
        self.set_error("registration_key", error);
        outcome
    }

    /// Submits the form through `auth`.
    pub async fn register(&mut self, auth: &AuthClient) -> Option<Result<AuthResponse>> {
        self.submit(|registration| async move { auth.register(&registration).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(key: &str) -> FormMachine<RegisterForm> {
        let mut machine = FormMachine::new(RegisterForm::default());
        for (name, value) in [
            ("registration_key", key),
            ("email", "leo@lycee.fr"),
            ("password", "Secret123"),
            ("confirm_password", "Secret123"),
            ("nom", "Martin"),
            ("prenom", "Léo"),
        ] {
            machine.set_field(name, value).unwrap();
        }
        machine
    }

    #[test]
    fn key_decides_the_affiliation_field() {
        let mut machine = filled("ELEVE_2024_AB12CD");
        let names: Vec<&str> = machine.form().fields().iter().map(|f| f.name).collect();
        assert!(names.contains(&"classe"));
        assert!(!names.contains(&"matiere"));

        assert!(machine.begin_submit().is_none());
        assert_eq!(machine.error("classe"), Some("La classe est requise"));

        machine.set_field("classe", "2nde B").unwrap();
        machine.set_field("matiere", "ignored").unwrap();
        let registration = machine.begin_submit().unwrap();
        assert_eq!(registration.classe.as_deref(), Some("2nde B"));
        assert_eq!(registration.matiere, None);
        assert_eq!(registration.date_naissance, None);
    }

    #[test]
    fn teacher_key_asks_for_a_subject() {
        let mut machine = filled("PROF_2024_AB12CD");
        machine.set_field("matiere", "Physique").unwrap();
        let registration = machine.begin_submit().unwrap();
        assert_eq!(registration.matiere.as_deref(), Some("Physique"));
        assert_eq!(registration.classe, None);
    }

    #[test]
    fn password_rules_and_confirmation() {
        let mut machine = filled("PROF_2024_AB12CD");
        machine.set_field("password", "abc").unwrap();
        let error = machine.error("password").unwrap();
        assert!(error.contains("Au moins 8 caractères"));
        assert!(error.contains("Au moins une majuscule"));
        assert_eq!(
            machine.error("confirm_password"),
            Some("Les mots de passe ne correspondent pas")
        );

        machine.set_field("password", "Secret123").unwrap();
        assert_eq!(machine.error("password"), None);
        assert_eq!(machine.error("confirm_password"), None);
    }

    #[test]
    fn bad_key_and_date() {
        let mut machine = filled("prof_2024_ab12cd");
        assert!(machine.error("registration_key").is_some());
        machine.set_field("date_naissance", "2010-13-01").unwrap();
        assert!(machine.error("date_naissance").is_some());
        machine.set_field("date_naissance", "").unwrap();
        assert_eq!(machine.error("date_naissance"), None);
    }

    #[test]
    fn strength_hint() {
        let mut machine = filled("PROF_2024_AB12CD");
        let hint = |m: &FormMachine<RegisterForm>| {
            m.form()
                .fields()
                .into_iter()
                .find(|f| f.name == "password")
                .and_then(|f| f.hint)
        };
        assert_eq!(hint(&machine).as_deref(), Some("Force : moyenne"));
        machine.set_field("password", "Secret123!long").unwrap();
        assert_eq!(hint(&machine).as_deref(), Some("Force : forte"));
    }
}
