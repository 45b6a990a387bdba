//! `/ressources`: published documents and their files.

use edushare_common::{resource::Resource, validation::require, Id};
use serde::Serialize;

use super::{segment, Ack, Entity, ListOptions, Listing};
use crate::{
    client::transport::{FileUpload, Transport},
    errors::Result,
    Query,
};

/// Filters of `GET /ressources` and `/ressources/search`. Unset fields are
/// not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Free text.
    pub search: Option<String>,
    /// School subject.
    pub matiere: Option<String>,
    /// School level.
    pub niveau: Option<String>,
    /// Kind of resource.
    pub type_ressource: Option<String>,
    /// Field to sort on.
    pub sort: Option<String>,
}

impl ResourceFilter {
    fn to_query(&self) -> Query {
        Query::new()
            .opt("page", self.page)
            .opt("limit", self.limit)
            .opt("search", self.search.as_deref())
            .opt("matiere", self.matiere.as_deref())
            .opt("niveau", self.niveau.as_deref())
            .opt("type_ressource", self.type_ressource.as_deref())
            .opt("sort", self.sort.as_deref())
    }
}

/// Metadata sent next to the file of a new resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewResource {
    /// Title, required.
    pub titre: String,
    /// Optional free text.
    pub description: Option<String>,
    /// Kind of resource.
    pub type_ressource: Option<String>,
    /// School subject.
    pub matiere: Option<String>,
    /// School level.
    pub niveau: Option<String>,
    /// Visible to everyone when true.
    pub is_public: bool,
}

impl NewResource {
    fn into_fields(self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("titre".to_string(), self.titre),
            ("is_public".to_string(), self.is_public.to_string()),
        ];
        let optional = [
            ("description", self.description),
            ("type_ressource", self.type_ressource),
            ("matiere", self.matiere),
            ("niveau", self.niveau),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| Some((key.to_string(), value?)))
                .filter(|(_, value)| !value.trim().is_empty()),
        );
        fields
    }
}

/// Metadata edit; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titre: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_ressource: Option<String>,
    /// New subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matiere: Option<String>,
    /// New level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niveau: Option<String>,
    /// New visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Client of the `/ressources` namespace.
#[derive(Debug, Clone)]
pub struct ResourcesClient {
    transport: Transport,
}

impl ResourcesClient {
    /// Client over `transport`.
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    fn path(ressource: impl Into<Id>) -> String {
        format!("/ressources/{}", segment(ressource.into()))
    }

    /// Lists public resources.
    pub async fn list(&self, filter: &ResourceFilter) -> Result<Listing<Resource>> {
        self.transport.get("/ressources", filter.to_query()).await
    }

    /// One resource.
    pub async fn get(&self, ressource: impl Into<Id>) -> Result<Resource> {
        Ok(self
            .transport
            .get::<Entity<Resource>>(&Self::path(ressource), Query::new())
            .await?
            .into_inner())
    }

    /// Resources of the signed-in user.
    pub async fn my(&self, options: &ListOptions) -> Result<Listing<Resource>> {
        self.transport
            .get("/ressources/my", options.to_query())
            .await
    }

    /// Full-text search, narrowed by `filter`.
    pub async fn search(&self, text: &str, filter: &ResourceFilter) -> Result<Listing<Resource>> {
        let mut query = Query::new().text("q", text);
        for (key, value) in filter.to_query().pairs() {
            query = query.text(key, value);
        }
        self.transport.get("/ressources/search", query).await
    }

    /// Publishes a resource with its file.
    ///
    /// The title, size and extension are checked before anything is sent.
    pub async fn create(&self, resource: NewResource, file: FileUpload) -> Result<Resource> {
        require("titre", &resource.titre, "Le titre est requis")?;
        let created: Entity<Resource> = self
            .transport
            .upload("/ressources", file, resource.into_fields())
            .await?;
        let created = created.into_inner();
        tracing::info!(id = %created.id, "resource published");
        Ok(created)
    }

    /// Edits metadata.
    pub async fn update(
        &self,
        ressource: impl Into<Id>,
        update: &ResourceUpdate,
    ) -> Result<Resource> {
        if let Some(titre) = &update.titre {
            require("titre", titre, "Le titre est requis")?;
        }
        Ok(self
            .transport
            .put::<Entity<Resource>, _>(&Self::path(ressource), update)
            .await?
            .into_inner())
    }

    /// Deletes a resource.
    pub async fn delete(&self, ressource: impl Into<Id>) -> Result<Ack> {
        self.transport.delete(&Self::path(ressource)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::Error, session::core::SessionStore, EduHttpClient};
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> ResourcesClient {
        let http = EduHttpClient::new(server.url("/api")).unwrap();
        ResourcesClient::new(Transport::new(http, SessionStore::in_memory()))
    }

    #[test]
    fn blank_optional_fields_are_not_sent() {
        let fields = NewResource {
            titre: "Cours".into(),
            matiere: Some("Physique".into()),
            niveau: Some(" ".into()),
            ..NewResource::default()
        }
        .into_fields();
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["titre", "is_public", "matiere"]);
    }

    #[tokio::test]
    async fn create_uploads_file_and_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/ressources")
                    .body_contains("name=\"titre\"")
                    .body_contains("Optique")
                    .body_contains("filename=\"optique.pdf\"");
                then.status(201).json_body(json!({
                    "ressource": { "id": 12, "titre": "Optique", "fichier_nom": "optique.pdf" }
                }));
            })
            .await;

        let created = client(&server)
            .create(
                NewResource {
                    titre: "Optique".into(),
                    ..NewResource::default()
                },
                FileUpload::new("optique.pdf", b"%PDF".to_vec()),
            )
            .await
            .unwrap();
        assert_eq!(created.id, Id::Int(12));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_without_title_is_rejected() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/ressources");
                then.status(201).json_body(json!({ "id": 1, "titre": "x" }));
            })
            .await;

        let err = client(&server)
            .create(NewResource::default(), FileUpload::new("a.pdf", vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.field().as_deref(), Some("titre"));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn list_and_search_filters() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/ressources")
                    .query_param("matiere", "Maths")
                    .query_param("page", "1");
                then.status(200).json_body(json!({
                    "ressources": [{ "id": 1, "titre": "Fractions", "matiere": "Maths" }],
                    "pagination": { "page": 1, "limit": 10, "total": 11, "pages": 2 }
                }));
            })
            .await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/ressources/search")
                    .query_param("q", "fractions")
                    .query_param("niveau", "6e");
                then.status(200).json_body(json!([]));
            })
            .await;

        let resources = client(&server);
        let page = resources
            .list(&ResourceFilter {
                page: Some(1),
                matiere: Some("Maths".into()),
                ..ResourceFilter::default()
            })
            .await
            .unwrap();
        assert!(page.has_more());

        let found = resources
            .search(
                "fractions",
                &ResourceFilter {
                    niveau: Some("6e".into()),
                    ..ResourceFilter::default()
                },
            )
            .await
            .unwrap();
        assert!(found.is_empty());
        list.assert_async().await;
        search.assert_async().await;
    }
}
