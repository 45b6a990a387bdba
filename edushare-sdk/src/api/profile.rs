//! `/profil`: public profiles, social graph and activity.

use edushare_common::{collection::Collection, resource::Resource, Id, Role, User};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{segment, Ack, Entity, ListOptions, Listing};
use crate::{client::transport::Transport, errors::Result, Query};

/// Filters of `GET /profil/search`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Free text matched against names and emails (`q`).
    pub query: Option<String>,
    /// Restrict to one role.
    pub role: Option<Role>,
    /// Restrict to one class.
    pub classe: Option<String>,
    /// Restrict to one subject.
    pub matiere: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

impl SearchOptions {
    /// Search by free text.
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    fn to_query(&self) -> Query {
        Query::new()
            .opt("q", self.query.as_deref())
            .opt("role", self.role)
            .opt("classe", self.classe.as_deref())
            .opt("matiere", self.matiere.as_deref())
            .opt("page", self.page)
            .opt("limit", self.limit)
    }
}

/// One entry of a user's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Kind of event (`ressource`, `collection`, `commentaire`, ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// When it happened.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Everything else the backend sent.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// Client of the `/profil` namespace.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    transport: Transport,
}

impl ProfileClient {
    /// Client over `transport`.
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    async fn list_of<T>(&self, user: Id, tail: &str, options: &ListOptions) -> Result<Listing<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let path = format!("/profil/{}/{tail}", segment(user));
        self.transport.get(&path, options.to_query()).await
    }

    /// Every profile.
    pub async fn all(&self, options: &ListOptions) -> Result<Listing<User>> {
        self.transport.get("/profil/all", options.to_query()).await
    }

    /// Profiles with the given role.
    pub async fn by_role(&self, role: Role, options: &ListOptions) -> Result<Listing<User>> {
        let path = format!("/profil/role/{}", role.as_str());
        self.transport.get(&path, options.to_query()).await
    }

    /// Searches profiles.
    pub async fn search(&self, options: &SearchOptions) -> Result<Listing<User>> {
        self.transport
            .get("/profil/search", options.to_query())
            .await
    }

    /// One profile.
    pub async fn get(&self, user: impl Into<Id>) -> Result<User> {
        let path = format!("/profil/{}", segment(user.into()));
        Ok(self
            .transport
            .get::<Entity<User>>(&path, Query::new())
            .await?
            .into_inner())
    }

    /// Resources published by a user.
    pub async fn ressources(
        &self,
        user: impl Into<Id>,
        options: &ListOptions,
    ) -> Result<Listing<Resource>> {
        self.list_of(user.into(), "ressources", options).await
    }

    /// Public collections of a user.
    pub async fn collections(
        &self,
        user: impl Into<Id>,
        options: &ListOptions,
    ) -> Result<Listing<Collection>> {
        self.list_of(user.into(), "collections", options).await
    }

    /// Users following `user`.
    pub async fn followers(&self, user: impl Into<Id>, options: &ListOptions) -> Result<Listing<User>> {
        self.list_of(user.into(), "followers", options).await
    }

    /// Users `user` follows.
    pub async fn following(&self, user: impl Into<Id>, options: &ListOptions) -> Result<Listing<User>> {
        self.list_of(user.into(), "following", options).await
    }

    /// Recent activity of a user.
    pub async fn activity(
        &self,
        user: impl Into<Id>,
        options: &ListOptions,
    ) -> Result<Listing<Activity>> {
        self.list_of(user.into(), "activity", options).await
    }

    /// Follows `user` as the signed-in user.
    pub async fn follow(&self, user: impl Into<Id>) -> Result<Ack> {
        let path = format!("/profil/{}/follow", segment(user.into()));
        self.transport.post(&path, &json!({})).await
    }

    /// Stops following `user`.
    pub async fn unfollow(&self, user: impl Into<Id>) -> Result<Ack> {
        let path = format!("/profil/{}/follow", segment(user.into()));
        self.transport.delete(&path).await
    }
}
