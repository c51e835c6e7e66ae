//! Repository collaborators and their access levels.

use crate::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A collaborator's permission tier, as numbered by the hosting platform.
///
/// The tiers are fixed by the platform's permission model; only compare
/// against the named constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(pub u32);

impl AccessLevel {
    /// May view the project.
    pub const GUEST: Self = Self(10);
    /// May read code and triage issues.
    pub const REPORTER: Self = Self(20);
    /// May push code.
    pub const DEVELOPER: Self = Self(30);
    /// May manage the project.
    pub const MAINTAINER: Self = Self(40);
    /// Owns the project.
    pub const OWNER: Self = Self(50);

    /// Returns true for the tiers that count as fallback maintainers.
    pub fn is_maintainer_tier(self) -> bool {
        matches!(self, Self::DEVELOPER | Self::MAINTAINER | Self::OWNER)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::GUEST => write!(f, "guest"),
            Self::REPORTER => write!(f, "reporter"),
            Self::DEVELOPER => write!(f, "developer"),
            Self::MAINTAINER => write!(f, "maintainer"),
            Self::OWNER => write!(f, "owner"),
            Self(other) => write!(f, "level {}", other),
        }
    }
}

/// A repository collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    /// The collaborator's username.
    pub username: Identity,
    /// Their access level on the repository.
    pub access_level: AccessLevel,
}

impl Collaborator {
    /// Creates a collaborator.
    pub fn new(username: impl Into<Identity>, access_level: AccessLevel) -> Self {
        Self {
            username: username.into(),
            access_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maintainer_tiers() {
        assert!(!AccessLevel::GUEST.is_maintainer_tier());
        assert!(!AccessLevel::REPORTER.is_maintainer_tier());
        assert!(AccessLevel::DEVELOPER.is_maintainer_tier());
        assert!(AccessLevel::MAINTAINER.is_maintainer_tier());
        assert!(AccessLevel::OWNER.is_maintainer_tier());
    }

    #[test]
    fn undefined_levels_do_not_qualify() {
        assert!(!AccessLevel(35).is_maintainer_tier());
        assert!(!AccessLevel(60).is_maintainer_tier());
        assert!(!AccessLevel(0).is_maintainer_tier());
    }

    #[test]
    fn access_level_display() {
        assert_eq!(AccessLevel::DEVELOPER.to_string(), "developer");
        assert_eq!(AccessLevel(5).to_string(), "level 5");
    }
}
