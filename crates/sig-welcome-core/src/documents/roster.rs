//! A SIG's `sig-info.yaml` roster.

use super::relation::OwnerEntry;
use super::{ParseError, is_blank};
use crate::Identity;
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Default, Deserialize)]
struct RawRoster {
    #[serde(default)]
    maintainers: Vec<OwnerEntry>,
    #[serde(default)]
    committers: Vec<OwnerEntry>,
}

/// Maintainers and committers of a SIG.
///
/// The two sets may overlap; each role is reported on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigRoster {
    /// People listed under `maintainers`.
    pub maintainers: BTreeSet<Identity>,
    /// People listed under `committers`.
    pub committers: BTreeSet<Identity>,
}

impl SigRoster {
    /// Parses a roster from raw YAML bytes.
    ///
    /// A missing role list yields an empty set for that role. Any other keys
    /// in the file are ignored.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        if is_blank(raw) {
            return Ok(Self::default());
        }
        let raw: RawRoster =
            serde_yaml::from_slice(raw).map_err(|e| ParseError::yaml("sig-info document", e))?;

        Ok(Self {
            maintainers: raw.maintainers.into_iter().map(|o| o.gitee_id).collect(),
            committers: raw.committers.into_iter().map(|o| o.gitee_id).collect(),
        })
    }

    /// Returns true if neither role lists anyone.
    pub fn is_empty(&self) -> bool {
        self.maintainers.is_empty() && self.committers.is_empty()
    }
}
