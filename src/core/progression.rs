//! Role progression: which role an employee is working towards.

use super::model::Role;

/// Title fragments that carry the level rather than the job track.
const LEVEL_PREFIXES: [&str; 3] = ["Junior ", "Mid-Level ", "Senior "];

/// Job track of a role, derived by removing level words from its title.
///
/// Each prefix is removed once, in order, wherever it appears.
#[must_use]
pub fn role_family(title: &str) -> String {
    LEVEL_PREFIXES
        .iter()
        .fold(title.to_string(), |acc, prefix| acc.replacen(prefix, "", 1))
}

/// Resolve the single role the holder of `current` progresses to.
///
/// Candidates must sit at the next level and contain the current role's
/// family in their title (case-insensitive). The first match in
/// `candidates` order wins. `None` means there is no next level, the family
/// is blank, or nothing matched.
#[must_use]
pub fn resolve_next_role(current: &Role, candidates: &[Role]) -> Option<Role> {
    let target_level = current.level.next()?;
    let family = role_family(&current.title).to_lowercase();
    if family.trim().is_empty() {
        return None;
    }

    candidates
        .iter()
        .filter(|candidate| candidate.level == target_level)
        .find(|candidate| candidate.title.to_lowercase().contains(&family))
        .cloned()
}

/// Which role a flow evaluates against.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "basis", content = "role", rename_all = "snake_case")]
pub enum GatingTarget {
    /// The resolved next role.
    Next(Role),
    /// No next role resolved; the current role stands in.
    CurrentFallback(Role),
}

impl GatingTarget {
    /// Next role if one resolves, otherwise the current role.
    #[must_use]
    pub fn resolve(current: &Role, candidates: &[Role]) -> Self {
        resolve_next_role(current, candidates)
            .map_or_else(|| Self::CurrentFallback(current.clone()), Self::Next)
    }

    #[must_use]
    pub const fn role(&self) -> &Role {
        match self {
            Self::Next(role) | Self::CurrentFallback(role) => role,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::CurrentFallback(_))
    }
}
