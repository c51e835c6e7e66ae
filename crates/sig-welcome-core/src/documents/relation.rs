//! The relation document: path patterns mapped to owners.

use super::{ParseError, is_blank};
use crate::Identity;
use crate::matching::PathPattern;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An owner listed by a relation rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OwnerEntry {
    /// The owner's username on the hosting platform.
    #[serde(alias = "github_id", alias = "login", alias = "username")]
    pub gitee_id: Identity,
}

impl OwnerEntry {
    /// Creates an owner entry for a username.
    pub fn new(id: impl Into<Identity>) -> Self {
        Self { gitee_id: id.into() }
    }
}

/// One rule: any of `path` matching a changed file makes `owner` responsible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OwnershipRule {
    /// Path patterns, see [`crate::matching`].
    #[serde(default)]
    pub path: Vec<String>,
    /// Owners responsible for matching files.
    #[serde(default)]
    pub owner: Vec<OwnerEntry>,
}

/// A parsed relation document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelationDocument {
    /// Rules in document order.
    #[serde(default)]
    pub relations: Vec<OwnershipRule>,
}

impl RelationDocument {
    /// Parses a relation document from raw YAML bytes.
    ///
    /// Blank input yields a document without rules.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        if is_blank(raw) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(raw).map_err(|e| ParseError::yaml("relation document", e))
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Returns true if the document has no rules.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Collects the owners of every rule with a pattern matching any of the
    /// changed paths.
    ///
    /// Every pattern is compiled up front, so a broken pattern fails the whole
    /// call even if no path would have reached it.
    pub fn owners_for<I, S>(&self, changed_paths: I) -> Result<BTreeSet<Identity>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = self
            .relations
            .iter()
            .map(|rule| -> Result<_, ParseError> {
                let patterns = rule
                    .path
                    .iter()
                    .map(|p| PathPattern::compile(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((patterns, rule.owner.as_slice()))
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        let mut owners = BTreeSet::new();
        for changed in changed_paths {
            let changed = changed.as_ref();
            for (patterns, rule_owners) in &compiled {
                if let Some(hit) = patterns.iter().find(|p| p.matches(changed)) {
                    trace!("Path '{}' matched pattern '{}'", changed, hit.as_str());
                    owners.extend(rule_owners.iter().map(|o| o.gitee_id.clone()));
                }
            }
        }

        Ok(owners)
    }
}
