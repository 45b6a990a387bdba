//! Shared resources (documents, images, videos) and upload rules.

use serde::{Deserialize, Serialize};

use crate::{
    constants::upload::{ALLOWED_EXTENSIONS, MAX_FILE_SIZE},
    validation::ValidationError,
    Id,
};

/// A published resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Backend id.
    pub id: Id,
    /// Title.
    pub titre: String,
    /// Optional free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind of resource (cours, exercice, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_ressource: Option<String>,
    /// School subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matiere: Option<String>,
    /// School level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niveau: Option<String>,
    /// Download location of the attached file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fichier_url: Option<String>,
    /// Original name of the attached file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fichier_nom: Option<String>,
    /// Author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id>,
    /// Visible to everyone when true.
    #[serde(default)]
    pub is_public: bool,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Lowercased extension of `file_name`, if it has one.
pub fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Checks an upload against the size limit and the extension allow-list.
pub fn validate_upload(file_name: &str, size: u64) -> Result<(), ValidationError> {
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::field(
            "fichier",
            "Le fichier dépasse la taille maximale de 50 Mo",
        ));
    }
    match extension(file_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::field(
            "fichier",
            format!(
                "Type de fichier non autorisé (formats acceptés : {})",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        )),
    }
}
