//! `/collections`: curated, ordered lists of resources.

use edushare_common::{
    collection::{
        issues_to_error, validate_description, validate_details, validate_items, Collection,
        CollectionItem,
    },
    Id,
};
use serde::Serialize;
use serde_json::json;

use super::{segment, Ack, Entity, ListOptions, Listing};
use crate::{client::transport::Transport, errors::Result, Query};

/// Filters of `GET /collections`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionListOptions {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Field to sort on.
    pub sort: Option<String>,
    /// Only public (`true`) or only private (`false`) collections.
    pub is_public: Option<bool>,
}

impl CollectionListOptions {
    fn to_query(&self) -> Query {
        Query::new()
            .opt("page", self.page)
            .opt("limit", self.limit)
            .opt("sort", self.sort.as_deref())
            .opt("is_public", self.is_public)
    }
}

/// Payload of `create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewCollection {
    /// Display name, required.
    pub nom: String,
    /// Optional free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visible to everyone when true.
    pub is_public: bool,
    /// Initial content.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ressources: Vec<CollectionItem>,
}

impl NewCollection {
    /// An empty private collection.
    pub fn named(nom: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            ..Self::default()
        }
    }
}

/// Payload of `update`; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Client of the `/collections` namespace.
///
/// `create`, `update` and `reorder` run the local checks of
/// [`edushare_common::collection`] before sending anything.
#[derive(Debug, Clone)]
pub struct CollectionsClient {
    transport: Transport,
}

impl CollectionsClient {
    /// Client over `transport`.
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    fn path(collection: impl Into<Id>) -> String {
        format!("/collections/{}", segment(collection.into()))
    }

    /// Lists collections.
    pub async fn all(&self, options: &CollectionListOptions) -> Result<Listing<Collection>> {
        self.transport.get("/collections", options.to_query()).await
    }

    /// One collection with its items.
    pub async fn get(&self, collection: impl Into<Id>) -> Result<Collection> {
        Ok(self
            .transport
            .get::<Entity<Collection>>(&Self::path(collection), Query::new())
            .await?
            .into_inner())
    }

    /// Most followed public collections.
    pub async fn popular(&self, options: &ListOptions) -> Result<Listing<Collection>> {
        self.transport
            .get("/collections/popular", options.to_query())
            .await
    }

    /// Latest public collections.
    pub async fn recent(&self, options: &ListOptions) -> Result<Listing<Collection>> {
        self.transport
            .get("/collections/recent", options.to_query())
            .await
    }

    /// Searches collections by text.
    pub async fn search(&self, text: &str, options: &ListOptions) -> Result<Listing<Collection>> {
        let query = options.append_to(Query::new().text("q", text));
        self.transport.get("/collections/search", query).await
    }

    /// Collections of the signed-in user.
    pub async fn my(&self, options: &ListOptions) -> Result<Listing<Collection>> {
        self.transport
            .get("/collections/my", options.to_query())
            .await
    }

    /// Collections containing a resource.
    pub async fn by_ressource(&self, ressource: impl Into<Id>) -> Result<Listing<Collection>> {
        let path = format!("/collections/by-ressource/{}", segment(ressource.into()));
        self.transport.get(&path, Query::new()).await
    }

    /// Creates a collection.
    pub async fn create(&self, collection: &NewCollection) -> Result<Collection> {
        validate_details(&collection.nom, collection.description.as_deref())?;
        validate_items(&collection.ressources).map_err(|issues| issues_to_error(&issues))?;
        Ok(self
            .transport
            .post::<Entity<Collection>, _>("/collections", collection)
            .await?
            .into_inner())
    }

    /// Edits name, description or visibility.
    pub async fn update(
        &self,
        collection: impl Into<Id>,
        update: &CollectionUpdate,
    ) -> Result<Collection> {
        match &update.nom {
            Some(nom) => validate_details(nom, update.description.as_deref())?,
            None => validate_description(update.description.as_deref())?,
        }
        Ok(self
            .transport
            .put::<Entity<Collection>, _>(&Self::path(collection), update)
            .await?
            .into_inner())
    }

    /// Deletes a collection.
    pub async fn delete(&self, collection: impl Into<Id>) -> Result<Ack> {
        self.transport.delete(&Self::path(collection)).await
    }

    /// Adds a resource, at `ordre` or wherever the backend appends it.
    pub async fn add_ressource(
        &self,
        collection: impl Into<Id>,
        ressource: impl Into<Id>,
        ordre: Option<i64>,
    ) -> Result<Ack> {
        let path = format!("{}/ressources", Self::path(collection));
        let ressource: Id = ressource.into();
        let mut body = json!({ "ressource_id": ressource });
        if let Some(ordre) = ordre {
            body["ordre"] = json!(ordre);
        }
        self.transport.post(&path, &body).await
    }

    /// Removes a resource.
    pub async fn remove_ressource(
        &self,
        collection: impl Into<Id>,
        ressource: impl Into<Id>,
    ) -> Result<Ack> {
        let path = format!(
            "{}/ressources/{}",
            Self::path(collection),
            segment(ressource.into())
        );
        self.transport.delete(&path).await
    }

    /// Sends a new order. Duplicate resources or positions are rejected
    /// locally.
    pub async fn reorder(&self, collection: impl Into<Id>, items: &[CollectionItem]) -> Result<Ack> {
        validate_items(items).map_err(|issues| issues_to_error(&issues))?;
        let path = format!("{}/reorder", Self::path(collection));
        self.transport
            .put(&path, &json!({ "ressources": items }))
            .await
    }

    /// Copies a collection into the signed-in user's account.
    pub async fn duplicate(&self, collection: impl Into<Id>, nom: Option<&str>) -> Result<Collection> {
        if let Some(nom) = nom {
            validate_details(nom, None)?;
        }
        let path = format!("{}/duplicate", Self::path(collection));
        let body = match nom {
            Some(nom) => json!({ "nom": nom }),
            None => json!({}),
        };
        Ok(self
            .transport
            .post::<Entity<Collection>, _>(&path, &body)
            .await?
            .into_inner())
    }
}
