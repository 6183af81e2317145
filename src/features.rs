//! Feature flags read from the `FEATURE_FLAGS` environment variable.

use std::collections::HashSet;

/// Gates the Six Ways MOOC pages.
pub const SIX_WAYS_MOOC: &str = "six_ways_mooc";

/// Set of active feature names.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlags {
    active: HashSet<String>,
}

impl FeatureFlags {
    /// Parse a comma separated list such as `"six_ways_mooc, beta_apply"`.
    pub fn parse(raw: &str) -> Self {
        let active = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Self { active }
    }

    pub fn is_active(&self, feature: &str) -> bool {
        self.active.contains(feature)
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            active: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_empty_entries() {
        let flags = FeatureFlags::parse(" six_ways_mooc , ,beta ");

        assert!(flags.is_active(SIX_WAYS_MOOC));
        assert!(flags.is_active("beta"));
        assert!(!flags.is_active(""));
    }

    #[test]
    fn test_empty_flags() {
        assert!(!FeatureFlags::parse("").is_active(SIX_WAYS_MOOC));
        assert!(!FeatureFlags::default().is_active(SIX_WAYS_MOOC));
    }
}
