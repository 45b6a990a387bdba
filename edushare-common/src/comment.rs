//! Comments and their reply trees.
//!
//! The backend returns the comments of a resource as a flat, ordered list in
//! which replies point at their parent through `parent_id`. [`build_tree`]
//! turns that list into a forest.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{constants::limits::COMMENT_MAX_LEN, validation::ValidationError, Id};

/// A comment on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Backend id.
    pub id: Id,
    /// Resource the comment belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ressource_id: Option<Id>,
    /// Author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id>,
    /// Text of the comment.
    #[serde(default)]
    pub contenu: String,
    /// Comment this one replies to.
    #[serde(default)]
    pub parent_id: Option<Id>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last edit timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A comment together with its replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    /// The comment itself.
    #[serde(flatten)]
    pub comment: Comment,
    /// Direct replies, in the order the backend listed them.
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of replies below this node, at any depth.
    pub fn total_replies(&self) -> usize {
        self.replies
            .iter()
            .map(|reply| 1 + reply.total_replies())
            .sum()
    }

    /// Levels in this subtree; a comment without replies has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::depth).max().unwrap_or(0)
    }
}

/// Builds the reply forest of a flat comment list.
///
/// Roots are comments without `parent_id`, kept in input order, as are the
/// replies under each parent. A comment whose `parent_id` names a comment
/// absent from `comments` is an orphan: it is dropped together with its own
/// replies rather than promoted to a root. Parent cycles are unreachable
/// from any root and are dropped the same way.
pub fn build_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let mut children: HashMap<&Id, Vec<&Comment>> = HashMap::new();
    let mut roots = Vec::new();

    for comment in comments {
        match &comment.parent_id {
            Some(parent) => children.entry(parent).or_default().push(comment),
            None => roots.push(comment),
        }
    }

    let mut seen = HashSet::new();
    roots
        .into_iter()
        .filter_map(|root| attach(root, &children, &mut seen))
        .collect()
}

fn attach<'a>(
    comment: &'a Comment,
    children: &HashMap<&'a Id, Vec<&'a Comment>>,
    seen: &mut HashSet<&'a Id>,
) -> Option<CommentNode> {
    // Duplicate ids would otherwise graft the same subtree twice.
    if !seen.insert(&comment.id) {
        return None;
    }
    let replies = children
        .get(&comment.id)
        .map(|kids| {
            kids.iter()
                .filter_map(|kid| attach(*kid, children, seen))
                .collect()
        })
        .unwrap_or_default();
    Some(CommentNode {
        comment: comment.clone(),
        replies,
    })
}

/// Comments reachable in the forest, roots included.
pub fn count_all(forest: &[CommentNode]) -> usize {
    forest.iter().map(|node| 1 + node.total_replies()).sum()
}

/// Deepest level of the forest; 0 when empty.
pub fn max_depth(forest: &[CommentNode]) -> usize {
    forest.iter().map(CommentNode::depth).max().unwrap_or(0)
}

/// Flattens a forest back to a list in depth-first order, paired with the
/// nesting level of each comment (0 for roots).
pub fn flatten(forest: &[CommentNode]) -> Vec<(usize, &Comment)> {
    fn walk<'a>(nodes: &'a [CommentNode], level: usize, out: &mut Vec<(usize, &'a Comment)>) {
        for node in nodes {
            out.push((level, &node.comment));
            walk(&node.replies, level + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(forest, 0, &mut out);
    out
}

/// Checks comment text: not blank, at most [`COMMENT_MAX_LEN`] characters.
pub fn validate_content(contenu: &str) -> Result<(), ValidationError> {
    if contenu.trim().is_empty() {
        return Err(ValidationError::field("contenu", "Le commentaire est vide"));
    }
    if contenu.chars().count() > COMMENT_MAX_LEN {
        return Err(ValidationError::field(
            "contenu",
            format!("Le commentaire dépasse {COMMENT_MAX_LEN} caractères"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i64, parent: Option<i64>) -> Comment {
        Comment {
            id: Id::Int(id),
            ressource_id: Some(Id::Int(7)),
            user_id: None,
            contenu: format!("c{id}"),
            parent_id: parent.map(Id::Int),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn orphans_are_dropped() {
        let flat = vec![comment(1, None), comment(2, Some(1)), comment(3, Some(999))];
        let tree = build_tree(&flat);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].comment.id, Id::Int(1));
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].comment.id, Id::Int(2));
        assert_eq!(count_all(&tree), 2);
    }

    #[test]
    fn orphan_descendants_are_dropped_too() {
        let flat = vec![comment(1, None), comment(3, Some(999)), comment(4, Some(3))];
        let tree = build_tree(&flat);
        assert_eq!(count_all(&tree), 1);
    }

    #[test]
    fn nesting_and_order() {
        let flat = vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(5, None),
            comment(3, Some(2)),
            comment(4, Some(1)),
        ];
        let tree = build_tree(&flat);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].total_replies(), 3);
        assert_eq!(tree[0].depth(), 3);
        assert_eq!(tree[1].total_replies(), 0);
        assert_eq!(max_depth(&tree), 3);

        let order: Vec<_> = flatten(&tree)
            .into_iter()
            .map(|(level, c)| (level, c.id.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "1".to_string()),
                (1, "2".to_string()),
                (2, "3".to_string()),
                (1, "4".to_string()),
                (0, "5".to_string()),
            ]
        );
    }

    #[test]
    fn cycles_terminate() {
        let flat = vec![comment(1, Some(2)), comment(2, Some(1)), comment(3, Some(3))];
        assert!(build_tree(&flat).is_empty());
        assert_eq!(max_depth(&[]), 0);
    }

    #[test]
    fn decodes_backend_payload() {
        let raw = r#"[{"id":1,"parent_id":null,"contenu":"a"},{"id":2,"parent_id":1,"contenu":"b"}]"#;
        let flat: Vec<Comment> = serde_json::from_str(raw).unwrap();
        let tree = build_tree(&flat);
        assert_eq!(tree[0].replies[0].comment.contenu, "b");
    }

    #[test]
    fn content_rules() {
        assert!(validate_content("Merci !").is_ok());
        assert!(validate_content("   ").is_err());
        assert!(validate_content(&"x".repeat(COMMENT_MAX_LEN)).is_ok());
        assert!(validate_content(&"x".repeat(COMMENT_MAX_LEN + 1)).is_err());
    }
}
