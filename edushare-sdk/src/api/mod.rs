//! One client per backend route namespace.
//!
//! Every client owns a [`crate::Transport`] (HTTP client plus injected
//! session) and returns the transport's errors unchanged. None of them
//! applies the 401 policy: that is the job of [`crate::Dispatcher`].

use std::fmt::Display;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Query;

pub mod auth;
pub mod collections;
pub mod comments;
pub mod profile;
pub mod resources;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending (`asc`).
    Asc,
    /// Descending (`desc`).
    Desc,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// Paging and sorting shared by most list routes.
///
/// Every field defaults to `None`, meaning "let the backend decide"; unset
/// fields are not sent at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// 1-based page number (`page`).
    pub page: Option<u32>,
    /// Page size (`limit`).
    pub limit: Option<u32>,
    /// Field to sort on (`sort`).
    pub sort: Option<String>,
    /// Sort direction (`order`).
    pub order: Option<SortOrder>,
}

impl ListOptions {
    /// Options for page `page` of `limit` items.
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub(crate) fn to_query(&self) -> Query {
        self.append_to(Query::new())
    }

    pub(crate) fn append_to(&self, query: Query) -> Query {
        query
            .opt("page", self.page)
            .opt("limit", self.limit)
            .opt("sort", self.sort.as_deref())
            .opt("order", self.order)
    }
}

/// Paging metadata returned alongside some lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page.
    #[serde(default)]
    pub page: u32,
    /// Page size.
    #[serde(default)]
    pub limit: u32,
    /// Total number of items.
    #[serde(default)]
    pub total: u64,
    /// Total number of pages.
    #[serde(default, alias = "totalPages", alias = "total_pages")]
    pub pages: u32,
}

/// A list answer.
///
/// Accepts both a bare JSON array and an object wrapping the array under
/// `data` (or `items`, `results`, or the entity name) with optional
/// `pagination`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing<T> {
    /// The listed entities.
    pub items: Vec<T>,
    /// Paging metadata, when the backend sent it.
    pub pagination: Option<Pagination>,
}

impl<T> Listing<T> {
    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the pagination says more pages follow.
    pub fn has_more(&self) -> bool {
        self.pagination
            .as_ref()
            .is_some_and(|p| p.page < p.pages)
    }
}

impl<T> IntoIterator for Listing<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Listing<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Bare(Vec<T>),
            Wrapped {
                #[serde(
                    alias = "items",
                    alias = "results",
                    alias = "users",
                    alias = "collections",
                    alias = "commentaires",
                    alias = "ressources"
                )]
                data: Vec<T>,
                #[serde(default)]
                pagination: Option<Pagination>,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(items) => Listing {
                items,
                pagination: None,
            },
            Repr::Wrapped { data, pagination } => Listing {
                items: data,
                pagination,
            },
        })
    }
}

/// Key under which routes may wrap a single entity.
pub(crate) trait Envelope {
    const KEY: &'static str;
}

impl Envelope for edushare_common::User {
    const KEY: &'static str = "user";
}

impl Envelope for edushare_common::collection::Collection {
    const KEY: &'static str = "collection";
}

impl Envelope for edushare_common::comment::Comment {
    const KEY: &'static str = "commentaire";
}

impl Envelope for edushare_common::resource::Resource {
    const KEY: &'static str = "ressource";
}

/// A single entity, bare or wrapped as `{ "data": {..} }` or under its
/// [`Envelope::KEY`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entity<T>(pub(crate) T);

impl<T> Entity<T> {
    pub(crate) fn into_inner(self) -> T {
        self.0
    }
}

impl<'de, T: DeserializeOwned + Envelope> Deserialize<'de> for Entity<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut value = Value::deserialize(deserializer)?;
        let inner = match value.as_object_mut() {
            Some(fields) if fields.get(T::KEY).is_some_and(Value::is_object) => fields.remove(T::KEY),
            Some(fields) if fields.get("data").is_some_and(Value::is_object) => fields.remove("data"),
            _ => None,
        };
        T::deserialize(inner.unwrap_or(value))
            .map(Entity)
            .map_err(serde::de::Error::custom)
    }
}

/// Acknowledgement returned by write routes that have nothing else to say.
///
/// Decodes from any body: empty, `null`, or an object with a `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Optional confirmation text.
    pub message: Option<String>,
}

impl<'de> Deserialize<'de> for Ack {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Ack {
            message: value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

// Everything but RFC 3986 unreserved characters, '/' included.
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encodes one path segment.
pub(crate) fn segment(value: impl Display) -> String {
    utf8_percent_encode(&value.to_string(), SEGMENT_ENCODE_SET).to_string()
}
