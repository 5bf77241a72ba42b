//! Configured mapping of TestRail suite names to suite ids
//!
//! The map is written either as a TOML table or as structured-literal text
//! such as `{'Bookmarks': 10, 'History': '20'}`. Insertion order is kept: it
//! decides the order of plan entries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::SuiteId;

/// Ordered suite name to suite id mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SuiteMapRepr", into = "IndexMap<String, SuiteId>")]
pub struct SuiteMap(IndexMap<String, SuiteId>);

#[derive(Deserialize)]
#[serde(untagged)]
enum SuiteMapRepr {
    Literal(String),
    Table(IndexMap<String, SuiteId>),
}

impl TryFrom<SuiteMapRepr> for SuiteMap {
    type Error = Error;

    fn try_from(repr: SuiteMapRepr) -> Result<Self> {
        match repr {
            SuiteMapRepr::Literal(text) => Self::parse_literal(&text),
            SuiteMapRepr::Table(map) => Ok(Self(map)),
        }
    }
}

impl From<SuiteMap> for IndexMap<String, SuiteId> {
    fn from(map: SuiteMap) -> Self {
        map.0
    }
}

impl FromIterator<(String, SuiteId)> for SuiteMap {
    fn from_iter<I: IntoIterator<Item = (String, SuiteId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl SuiteMap {
    /// Parse structured-literal text into a suite map
    pub fn parse_literal(text: &str) -> Result<Self> {
        let json = literal_to_json(text)?;
        let map: IndexMap<String, SuiteId> = serde_json::from_str(&json)
            .map_err(|e| Error::InvalidSuiteMap(format!("{}: {}", text.trim(), e)))?;
        Ok(Self(map))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SuiteId)> {
        self.0.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn get(&self, name: &str) -> Option<SuiteId> {
        self.0.get(name).copied()
    }

    /// First configured name for a suite id
    pub fn name_of(&self, suite_id: SuiteId) -> Option<&str> {
        self.iter().find(|(_, id)| *id == suite_id).map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Rewrite single-quoted strings and trailing commas into plain JSON.
fn literal_to_json(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                let mut value = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => break,
                        },
                        '\'' => {
                            closed = true;
                            break;
                        }
                        other => value.push(other),
                    }
                }
                if !closed {
                    return Err(Error::InvalidSuiteMap(format!(
                        "unterminated string in {}",
                        text.trim()
                    )));
                }
                out.push_str(&serde_json::to_string(&value)?);
            }
            '"' => {
                out.push('"');
                let mut closed = false;
                while let Some(c) = chars.next() {
                    out.push(c);
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(Error::InvalidSuiteMap(format!(
                        "unterminated string in {}",
                        text.trim()
                    )));
                }
            }
            '}' => {
                let kept = out.trim_end().len();
                out.truncate(kept);
                if out.ends_with(',') {
                    out.pop();
                }
                out.push('}');
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
