//! Users as cached by the client.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Id;

/// Account role, assigned from the registration key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Teacher.
    Professeur,
    /// Student.
    Eleve,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Professeur => "professeur",
            Role::Eleve => "eleve",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professeur" => Ok(Role::Professeur),
            "eleve" => Ok(Role::Eleve),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Profile snapshot of a user.
///
/// The backend owns this record; the client keeps a read-mostly copy. Fields
/// the client does not know about are kept in `extra` so that the cached
/// snapshot round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend id.
    pub id: Id,
    /// Login email.
    pub email: String,
    /// Family name.
    #[serde(default)]
    pub nom: String,
    /// Given name.
    #[serde(default)]
    pub prenom: String,
    /// Account role.
    pub role: Role,
    /// Class, for students.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classe: Option<String>,
    /// Subject, for teachers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matiere: Option<String>,
    /// Birth date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_naissance: Option<String>,
    /// Whether the email address was confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// Number of followers.
    #[serde(default)]
    pub followers_count: u64,
    /// Number of followed users.
    #[serde(default)]
    pub following_count: u64,
    /// Number of published resources.
    #[serde(default)]
    pub ressources_count: u64,
    /// Number of collections.
    #[serde(default)]
    pub collections_count: u64,
    /// Account creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Fields unknown to this client.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// `Prénom Nom`, falling back to the email when both are blank.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.prenom.trim(), self.nom.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Class for students, subject for teachers.
    pub fn affiliation(&self) -> Option<&str> {
        match self.role {
            Role::Eleve => self.classe.as_deref(),
            Role::Professeur => self.matiere.as_deref(),
        }
    }
}
