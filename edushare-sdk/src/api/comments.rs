//! `/commentaires`: comments on resources and their replies.

use edushare_common::{
    comment::{build_tree, validate_content, Comment, CommentNode},
    Id,
};
use serde_json::json;

use super::{segment, Ack, Entity, Listing};
use crate::{client::transport::Transport, errors::Result, Query};

/// Client of the `/commentaires` namespace.
#[derive(Debug, Clone)]
pub struct CommentsClient {
    transport: Transport,
}

impl CommentsClient {
    /// Client over `transport`.
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Flat comment list of a resource, in backend order.
    pub async fn for_ressource(&self, ressource: impl Into<Id>) -> Result<Vec<Comment>> {
        let path = format!("/commentaires/ressource/{}", segment(ressource.into()));
        let listing: Listing<Comment> = self.transport.get(&path, Query::new()).await?;
        Ok(listing.items)
    }

    /// Reply forest of a resource. Replies whose parent is missing from the
    /// list are dropped, see [`build_tree`].
    pub async fn tree(&self, ressource: impl Into<Id>) -> Result<Vec<CommentNode>> {
        let comments = self.for_ressource(ressource).await?;
        let forest = build_tree(&comments);
        tracing::debug!(
            fetched = comments.len(),
            kept = edushare_common::comment::count_all(&forest),
            "built comment tree"
        );
        Ok(forest)
    }

    /// Comments a resource.
    pub async fn create(&self, ressource: impl Into<Id>, contenu: &str) -> Result<Comment> {
        validate_content(contenu)?;
        let ressource: Id = ressource.into();
        Ok(self
            .transport
            .post::<Entity<Comment>, _>(
                "/commentaires",
                &json!({ "ressource_id": ressource, "contenu": contenu }),
            )
            .await?
            .into_inner())
    }

    /// Replies to `parent`, which must belong to `ressource`.
    pub async fn reply(
        &self,
        ressource: impl Into<Id>,
        parent: impl Into<Id>,
        contenu: &str,
    ) -> Result<Comment> {
        validate_content(contenu)?;
        let ressource: Id = ressource.into();
        let parent: Id = parent.into();
        let path = format!("/commentaires/{}", segment(&parent));
        Ok(self
            .transport
            .post::<Entity<Comment>, _>(
                &path,
                &json!({ "ressource_id": ressource, "parent_id": parent, "contenu": contenu }),
            )
            .await?
            .into_inner())
    }

    /// Edits the text of a comment.
    pub async fn update(&self, comment: impl Into<Id>, contenu: &str) -> Result<Comment> {
        validate_content(contenu)?;
        let path = format!("/commentaires/{}", segment(comment.into()));
        Ok(self
            .transport
            .put::<Entity<Comment>, _>(&path, &json!({ "contenu": contenu }))
            .await?
            .into_inner())
    }

    /// Deletes a comment.
    pub async fn delete(&self, comment: impl Into<Id>) -> Result<Ack> {
        let path = format!("/commentaires/{}", segment(comment.into()));
        self.transport.delete(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::core::SessionStore, EduHttpClient};
    use edushare_common::comment::max_depth;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> CommentsClient {
        let http = EduHttpClient::new(server.url("/api")).unwrap();
        CommentsClient::new(Transport::new(http, SessionStore::in_memory()))
    }

    #[tokio::test]
    async fn tree_drops_orphans() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/commentaires/ressource/7");
                then.status(200).json_body(json!({ "commentaires": [
                    { "id": 1, "contenu": "Merci !", "parent_id": null },
                    { "id": 2, "contenu": "Avec plaisir", "parent_id": 1 },
                    { "id": 3, "contenu": "Orphelin", "parent_id": 999 },
                    { "id": 4, "contenu": "Sous l'orphelin", "parent_id": 3 }
                ] }));
            })
            .await;

        let forest = client(&server).tree(7).await.unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].comment.id, Id::Int(1));
        assert_eq!(forest[0].total_replies(), 1);
        assert_eq!(max_depth(&forest), 2);
    }

    #[tokio::test]
    async fn reply_posts_to_the_parent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/commentaires/1")
                    .json_body(json!({ "ressource_id": 7, "parent_id": 1, "contenu": "D'accord" }));
                then.status(201).json_body(json!({
                    "commentaire": { "id": 5, "contenu": "D'accord", "parent_id": 1 }
                }));
            })
            .await;

        let reply = client(&server).reply(7, 1, "D'accord").await.unwrap();
        assert_eq!(reply.parent_id, Some(Id::Int(1)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn blank_or_long_content_is_not_sent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/commentaires");
                then.status(201).json_body(json!({ "id": 1, "contenu": "x" }));
            })
            .await;

        let comments = client(&server);
        let err = comments.create(7, "   ").await.unwrap_err();
        assert_eq!(err.field().as_deref(), Some("contenu"));
        let err = comments.create(7, &"a".repeat(1001)).await.unwrap_err();
        assert_eq!(err.field().as_deref(), Some("contenu"));
        assert_eq!(mock.hits_async().await, 0);

        comments.create(7, "x").await.unwrap();
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let server = MockServer::start_async().await;
        let update = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/commentaires/5")
                    .json_body(json!({ "contenu": "Corrigé" }));
                then.status(200)
                    .json_body(json!({ "id": 5, "contenu": "Corrigé", "updated_at": "2024-10-01" }));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/commentaires/5");
                then.status(200).json_body(json!({ "message": "Supprimé" }));
            })
            .await;

        let comments = client(&server);
        let edited = comments.update(5, "Corrigé").await.unwrap();
        assert_eq!(edited.updated_at.as_deref(), Some("2024-10-01"));
        comments.delete(5).await.unwrap();
        update.assert_async().await;
        delete.assert_async().await;
    }
}
