//! Maintainers derived from repository permissions.

use crate::Identity;
use crate::hosting::Collaborator;
use std::collections::BTreeSet;

/// Returns the collaborators whose access level is developer, maintainer or
/// owner.
pub fn fallback_maintainers(collaborators: &[Collaborator]) -> BTreeSet<Identity> {
    collaborators
        .iter()
        .filter(|c| c.access_level.is_maintainer_tier())
        .map(|c| c.username.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosting::AccessLevel;

    #[test]
    fn keeps_top_three_tiers() {
        let collaborators = vec![
            Collaborator::new("guest", AccessLevel(10)),
            Collaborator::new("reporter", AccessLevel(20)),
            Collaborator::new("developer", AccessLevel(30)),
            Collaborator::new("maintainer", AccessLevel(40)),
            Collaborator::new("owner", AccessLevel(50)),
        ];

        let maintainers = fallback_maintainers(&collaborators);
        let expected: BTreeSet<Identity> = ["developer", "maintainer", "owner"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(maintainers, expected);
    }

    #[test]
    fn empty_input() {
        assert!(fallback_maintainers(&[]).is_empty());
    }

    #[test]
    fn no_qualifying_collaborators() {
        let collaborators = vec![Collaborator::new("guest", AccessLevel::GUEST)];
        assert!(fallback_maintainers(&collaborators).is_empty());
    }
}
