// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Display policy: which traits get a chart link, and how tiers classify.
//!
//! The analysis service always returns the same four-tier shape:
//!
//! ```text
//! tier 1  personality / needs / values          header
//! tier 2  Big 5 grouping wrapper                hidden
//! tier 3  Openness, Conscientiousness, ...      subheader (or leaf)
//! tier 4  facets                                leaf
//! ```
//!
//! [`TierPolicy::default`] encodes exactly that shape. Trees deeper than four
//! tiers are not rejected; their extra tiers are emitted unclassified.

use std::collections::BTreeSet;

/// Trait ids that get a chart link by default.
pub const DEFAULT_CHARTABLE_IDS: [&str; 8] = [
    "personality",
    "Openness",
    "Conscientiousness",
    "Extraversion",
    "Agreeableness",
    "Neuroticism",
    "needs",
    "values",
];

/// Tier classification rules. Tiers are 1-based; the root's direct children
/// are tier 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    pub header_tier: u32,
    /// Tier whose nodes become subheaders when they have a children field.
    pub subheader_tier: u32,
    /// Tiers whose childless nodes are leaves.
    pub leaf_tiers: BTreeSet<u32>,
    /// Tiers dropped from the outline after classification.
    pub hidden_tiers: BTreeSet<u32>,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            header_tier: 1,
            subheader_tier: 3,
            leaf_tiers: [3, 4].into_iter().collect(),
            hidden_tiers: [2].into_iter().collect(),
        }
    }
}

impl TierPolicy {
    pub fn is_header(&self, tier: u32) -> bool {
        tier == self.header_tier
    }

    pub fn is_subheader(&self, tier: u32, has_children: bool) -> bool {
        tier == self.subheader_tier && has_children
    }

    pub fn is_leaf(&self, tier: u32, has_children: bool) -> bool {
        !has_children && self.leaf_tiers.contains(&tier)
    }

    pub fn is_hidden(&self, tier: u32) -> bool {
        self.hidden_tiers.contains(&tier)
    }
}

/// Everything the flattener needs to know besides the tree itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPolicy {
    chartable_ids: BTreeSet<String>,
    pub tiers: TierPolicy,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self::with_chartable_ids(DEFAULT_CHARTABLE_IDS)
    }
}

impl DisplayPolicy {
    pub fn with_chartable_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chartable_ids: ids.into_iter().map(Into::into).collect(),
            tiers: TierPolicy::default(),
        }
    }

    pub fn with_tiers(mut self, tiers: TierPolicy) -> Self {
        self.tiers = tiers;
        self
    }

    /// Exact, case-sensitive membership test.
    pub fn is_chartable(&self, id: &str) -> bool {
        self.chartable_ids.contains(id)
    }

    pub fn chartable_ids(&self) -> impl Iterator<Item = &str> {
        self.chartable_ids.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let tiers = TierPolicy::default();
        assert!(tiers.is_header(1));
        assert!(!tiers.is_header(2));
        assert!(tiers.is_subheader(3, true));
        assert!(!tiers.is_subheader(3, false));
        assert!(tiers.is_leaf(3, false));
        assert!(tiers.is_leaf(4, false));
        assert!(!tiers.is_leaf(4, true));
        assert!(tiers.is_hidden(2));
    }

    #[test]
    fn test_tier_two_is_unclassified() {
        let tiers = TierPolicy::default();
        for has_children in [true, false] {
            assert!(!tiers.is_header(2));
            assert!(!tiers.is_subheader(2, has_children));
            assert!(!tiers.is_leaf(2, has_children));
        }
    }

    #[test]
    fn test_default_allow_list() {
        let policy = DisplayPolicy::default();
        assert!(policy.is_chartable("Openness"));
        assert!(policy.is_chartable("needs"));
        assert!(!policy.is_chartable("openness"));
        assert!(!policy.is_chartable("Adventurousness"));
        assert_eq!(policy.chartable_ids().count(), 8);
    }
}
