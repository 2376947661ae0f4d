//! Provenance tags recording which search components produced a solution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A search component that contributed to a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Initial construction by greedy insertion.
    InitialConstruct,
    /// Local search to the first local optimum.
    InitialLocalSearchOpt,
    /// New solution built by greedy insertion.
    LocalSearchConstruct,
    /// New solution built by weight-based assignment plus one local search step.
    RandomWeightConstruct,
    /// Local search to a local optimum.
    LocalSearchOpt,
    RuinRecreate,
    /// Ruin and recreate run per sub-problem.
    Split,
    /// Searched with the travel-target comparator.
    TargetTravelComparator,
    /// Searched with the standard comparator.
    StandardComparator,
}

impl Tag {
    /// Short code used in summaries.
    pub fn code(self) -> &'static str {
        match self {
            Self::InitialConstruct => "INIT_CSTR",
            Self::InitialLocalSearchOpt => "INIT_LS_OPT",
            Self::LocalSearchConstruct => "LS_CSTR",
            Self::RandomWeightConstruct => "RW_CSTR_LS1",
            Self::LocalSearchOpt => "LS_OPT",
            Self::RuinRecreate => "RR",
            Self::Split => "SPLIT",
            Self::TargetTravelComparator => "COMP_TT",
            Self::StandardComparator => "COMP_STD",
        }
    }
}

/// Insertion-ordered set of [`Tag`]s.
///
/// # Examples
///
/// ```
/// use u_territory::solver::{Tag, Tags};
///
/// let mut tags = Tags::from_tags(&[Tag::RuinRecreate, Tag::LocalSearchOpt]);
/// tags.add(Tag::RuinRecreate);
/// tags.add(Tag::StandardComparator);
/// assert_eq!(tags.summary(), "RR+LS_OPT+COMP_STD");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tags(tags: &[Tag]) -> Self {
        let mut out = Self::new();
        out.extend(tags);
        out
    }

    /// Adds `tag` unless already present.
    pub fn add(&mut self, tag: Tag) -> &mut Self {
        if !self.0.contains(&tag) {
            self.0.push(tag);
        }
        self
    }

    pub fn extend(&mut self, tags: &[Tag]) -> &mut Self {
        for &tag in tags {
            self.add(tag);
        }
        self
    }

    /// Returns a copy with `tags` added.
    pub fn with(&self, tags: &[Tag]) -> Self {
        let mut out = self.clone();
        out.extend(tags);
        out
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Codes joined with `+`.
    pub fn summary(&self) -> String {
        self.0.iter().map(|t| t.code()).collect::<Vec<_>>().join("+")
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_position() {
        let mut tags = Tags::new();
        tags.add(Tag::Split).add(Tag::RuinRecreate).add(Tag::Split);
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec![Tag::Split, Tag::RuinRecreate]);
        assert_eq!(tags.to_string(), "SPLIT+RR");
    }

    #[test]
    fn test_with_leaves_original() {
        let base = Tags::from_tags(&[Tag::InitialConstruct]);
        let extended = base.with(&[Tag::LocalSearchOpt]);
        assert!(!base.contains(Tag::LocalSearchOpt));
        assert!(extended.contains(Tag::InitialConstruct));
        assert_eq!(extended.summary(), "INIT_CSTR+LS_OPT");
    }

    #[test]
    fn test_empty_summary() {
        assert!(Tags::new().is_empty());
        assert_eq!(Tags::new().summary(), "");
    }
}
