//! Collections: ordered lists of resources curated by a user.
//!
//! Ordering is carried by the `ordre` of each item. Values should be unique
//! per collection; [`validate_items`] reports violations before anything is
//! submitted, while the sorting helpers tolerate them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    constants::limits::{COLLECTION_DESCRIPTION_MAX_LEN, COLLECTION_NAME_MAX_LEN},
    validation::ValidationError,
    Id,
};

/// A resource placed in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    /// The referenced resource.
    pub ressource_id: Id,
    /// Position in the collection. Missing values sort as `0`.
    #[serde(default)]
    pub ordre: Option<i64>,
}

impl CollectionItem {
    /// Item at an explicit position.
    pub fn new(ressource_id: impl Into<Id>, ordre: i64) -> Self {
        Self {
            ressource_id: ressource_id.into(),
            ordre: Some(ordre),
        }
    }

    fn order_key(&self) -> i64 {
        self.ordre.unwrap_or(0)
    }
}

/// A collection as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Backend id.
    pub id: Id,
    /// Display name.
    pub nom: String,
    /// Optional free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Visible to everyone when true.
    #[serde(default)]
    pub is_public: bool,
    /// Owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id>,
    /// Resources in the collection.
    #[serde(default)]
    pub ressources: Vec<CollectionItem>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last edit timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A problem found by [`validate_items`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionIssue {
    /// The same resource appears twice.
    #[error("Ressource en double : {0}")]
    DuplicateRessource(Id),
    /// Two items share a position.
    #[error("Ordre en double : {0}")]
    DuplicateOrder(i64),
}

/// Items sorted by ascending `ordre`, ties keeping their input order.
pub fn sort_by_order(items: &[CollectionItem]) -> Vec<CollectionItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(CollectionItem::order_key);
    sorted
}

/// Reports duplicate resources and duplicate positions, in input order.
pub fn validate_items(items: &[CollectionItem]) -> Result<(), Vec<CollectionIssue>> {
    let mut ids = HashSet::new();
    let mut orders = HashSet::new();
    let mut issues = Vec::new();

    for item in items {
        if !ids.insert(&item.ressource_id) {
            issues.push(CollectionIssue::DuplicateRessource(item.ressource_id.clone()));
        }
        if let Some(ordre) = item.ordre {
            if !orders.insert(ordre) {
                issues.push(CollectionIssue::DuplicateOrder(ordre));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Position for an item appended at the end: highest `ordre` plus one, or
/// `1` for an empty collection.
pub fn next_order(items: &[CollectionItem]) -> i64 {
    items
        .iter()
        .map(CollectionItem::order_key)
        .max()
        .map_or(1, |max| max + 1)
}

/// Sorts, then rewrites positions as `1..=n`.
pub fn renumber(items: &[CollectionItem]) -> Vec<CollectionItem> {
    sort_by_order(items)
        .into_iter()
        .zip(1..)
        .map(|(item, ordre)| CollectionItem {
            ordre: Some(ordre),
            ..item
        })
        .collect()
}

/// Moves the item at sorted position `from` to sorted position `to`, then
/// renumbers. Out of range indices leave the order untouched.
pub fn move_item(items: &[CollectionItem], from: usize, to: usize) -> Vec<CollectionItem> {
    let mut sorted = sort_by_order(items);
    if from < sorted.len() && to < sorted.len() {
        let item = sorted.remove(from);
        sorted.insert(to, item);
    }
    sorted
        .into_iter()
        .zip(1..)
        .map(|(item, ordre)| CollectionItem {
            ordre: Some(ordre),
            ..item
        })
        .collect()
}

/// Checks the name and description of a collection.
pub fn validate_details(nom: &str, description: Option<&str>) -> Result<(), ValidationError> {
    if nom.trim().is_empty() {
        return Err(ValidationError::field("nom", "Le nom de la collection est requis"));
    }
    if nom.chars().count() > COLLECTION_NAME_MAX_LEN {
        return Err(ValidationError::field(
            "nom",
            format!("Le nom dépasse {COLLECTION_NAME_MAX_LEN} caractères"),
        ));
    }
    validate_description(description)
}

/// Checks the length of a collection description.
pub fn validate_description(description: Option<&str>) -> Result<(), ValidationError> {
    if description.is_some_and(|d| d.chars().count() > COLLECTION_DESCRIPTION_MAX_LEN) {
        return Err(ValidationError::field(
            "description",
            format!("La description dépasse {COLLECTION_DESCRIPTION_MAX_LEN} caractères"),
        ));
    }
    Ok(())
}

/// Joins the issues of [`validate_items`] into one validation error.
pub fn issues_to_error(issues: &[CollectionIssue]) -> ValidationError {
    let message = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    ValidationError::field("ressources", message)
}
