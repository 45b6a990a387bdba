//! Query strings built only from the options that are actually set.

use std::fmt::Display;

use url::Url;

/// Ordered query parameters.
///
/// `None` and blank values are skipped, so an unset option never shows up as
/// `page=` or `page=None` on the wire.
///
/// ```
/// # use edushare::Query;
/// let q = Query::new()
///     .opt("page", Some(2))
///     .opt("limit", None::<u32>)
///     .text("q", "  ")
///     .text("role", "eleve");
/// assert_eq!(
///     q.pairs().to_vec(),
///     vec![
///         ("page".to_string(), "2".to_string()),
///         ("role".to_string(), "eleve".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key=value` when `value` is set and not blank.
    pub fn opt<V: Display>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.trim().is_empty() {
                self.pairs.push((key.to_string(), value));
            }
        }
        self
    }

    /// Adds `key=value` when `value` is not blank.
    pub fn text(self, key: &str, value: &str) -> Self {
        self.opt(key, Some(value))
    }

    /// True when no parameter survived.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The retained parameters, in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Appends the parameters to `url`, percent-encoding them.
    pub fn apply(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        let mut query = url.query_pairs_mut();
        for (key, value) in &self.pairs {
            query.append_pair(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_options_are_never_sent() {
        let mut url = Url::parse("http://localhost/api/profil/search").unwrap();
        Query::new()
            .text("q", "Marie Curie")
            .opt("page", None::<u32>)
            .opt("classe", Some(""))
            .opt("limit", Some(20))
            .apply(&mut url);
        assert_eq!(
            url.as_str(),
            "http://localhost/api/profil/search?q=Marie+Curie&limit=20"
        );
    }

    #[test]
    fn empty_query_leaves_url_alone() {
        let mut url = Url::parse("http://localhost/api/collections").unwrap();
        Query::new().opt("page", None::<u32>).apply(&mut url);
        assert_eq!(url.as_str(), "http://localhost/api/collections");
        assert_eq!(url.query(), None);
    }
}
