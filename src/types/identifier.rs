//! Primary keys and object identifiers.

use std::fmt::{Display, Formatter, Result as FmtResult};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AclError;

/// An opaque identifier: either numeric or textual.
///
/// Used as the identifier half of an [`ObjectIdentity`](super::ObjectIdentity)
/// and as the primary key of persisted ACLs and entries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl Identifier {
    /// Returns true for a textual identifier that is empty.
    pub fn is_blank(&self) -> bool {
        matches!(self, Identifier::Text(text) if text.trim().is_empty())
    }

    /// Render for use after `Type::`, quoting textual identifiers.
    pub(crate) fn fmt_qualified(&self) -> String {
        match self {
            Identifier::Number(number) => number.to_string(),
            Identifier::Text(text) => format!(r#""{text}""#),
        }
    }

    pub(crate) fn from_parts(parts: &QualifiedParts) -> Self {
        if !parts.quoted {
            if let Ok(number) = parts.value.parse::<i64>() {
                return Identifier::Number(number);
            }
        }
        Identifier::Text(parts.value.clone())
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Identifier::Number(number) => write!(f, "{number}"),
            Identifier::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Identifier::Number(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::Text(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Identifier::Text(value)
    }
}

static QUALIFIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<kind>.+?)::(?:"(?P<quoted>[^"]*)"|(?P<bare>[^:"]+))$"#)
        .expect("qualified identifier pattern is valid")
});

/// The pieces of a `Kind::"value"` or `Kind::value` string.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct QualifiedParts {
    pub(crate) kind: String,
    pub(crate) value: String,
    pub(crate) quoted: bool,
}

pub(crate) fn split_qualified(s: &str) -> Result<QualifiedParts, AclError> {
    let captures = QUALIFIED.captures(s.trim()).ok_or_else(|| {
        AclError::InvalidFormat(format!(
            "expected 'Kind::\"value\"' or 'Kind::value', found '{s}'"
        ))
    })?;

    let kind = captures["kind"].to_string();
    match (captures.name("quoted"), captures.name("bare")) {
        (Some(quoted), _) => Ok(QualifiedParts {
            kind,
            value: quoted.as_str().to_string(),
            quoted: true,
        }),
        (None, Some(bare)) => Ok(QualifiedParts {
            kind,
            value: bare.as_str().to_string(),
            quoted: false,
        }),
        (None, None) => Err(AclError::InvalidFormat(format!("missing value in '{s}'"))),
    }
}
