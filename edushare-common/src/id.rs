//! Backend identifiers.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// An identifier as sent by the backend.
///
/// Some routes hand out integer ids and others string ids (`"u1"`), so the
/// original JSON form is kept and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// Numeric id.
    Int(i64),
    /// Textual id.
    Text(String),
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Id::Int(n) => write!(f, "{n}"),
            Id::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_from_int {
    ($($int:ty),*) => {
        $(impl From<$int> for Id {
            fn from(value: $int) -> Self {
                Id::Int(i64::from(value))
            }
        })*
    };
}

impl_from_int!(i32, i64, u32);

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Text(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Id::Text(value)
    }
}

/// Digits parse as [`Id::Int`], anything else as [`Id::Text`].
impl FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<i64>().map_or_else(|_| Id::Text(s.to_string()), Id::Int))
    }
}

impl From<&Id> for Id {
    fn from(value: &Id) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_json_shape() {
        let ids: Vec<Id> = serde_json::from_str(r#"[1, "u1"]"#).unwrap();
        assert_eq!(ids, vec![Id::Int(1), Id::from("u1")]);
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[1,"u1"]"#);
        assert_eq!(ids[0].to_string(), "1");
        assert_eq!(Id::from(7), Id::Int(7));
    }

    #[test]
    fn parses_from_text() {
        assert_eq!(" 42 ".parse::<Id>(), Ok(Id::Int(42)));
        assert_eq!("u1".parse::<Id>(), Ok(Id::from("u1")));
    }
}
