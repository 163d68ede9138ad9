//! Matching an applicant's years of experience against free-text job requirements.

use std::sync::LazyLock;

use regex::Regex;

/// Experience demand extracted from a requirements text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceRequirement {
    /// `N+ years`, `minimum N years`, `at least N years`, `N years of experience`
    Minimum(u32),
    /// `A-B years`, `A to B years`; both ends inclusive
    Range(u32, u32),
}

// Tried in order, first match wins. A second capture group marks a range.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"([0-9]+)\s*\+\s*years?",
        r"([0-9]+)\s*-\s*([0-9]+)\s*years?",
        r"([0-9]+)\s*to\s*([0-9]+)\s*years?",
        r"minimum\s*([0-9]+)\s*years?",
        r"at\s*least\s*([0-9]+)\s*years?",
        r"([0-9]+)\s*years?\s*(?:of\s*)?experience",
    ]
    .iter()
    .map(|pattern| Regex::new(&format!("(?i){}", pattern)).expect("experience pattern is valid"))
    .collect()
});

impl ExperienceRequirement {
    pub fn parse(requirements: &str) -> Option<Self> {
        let captures = PATTERNS.iter().find_map(|pattern| pattern.captures(requirements))?;

        let min = captures.get(1)?.as_str().parse().ok()?;
        match captures.get(2) {
            Some(max) => Some(Self::Range(min, max.as_str().parse().ok()?)),
            None => Some(Self::Minimum(min)),
        }
    }

    pub fn is_satisfied_by(&self, years: u32) -> bool {
        match *self {
            Self::Minimum(min) => years >= min,
            Self::Range(min, max) => (min..=max).contains(&years),
        }
    }
}

/// A job is kept when its requirements state nothing parseable or when
/// `years` satisfies what they state.
pub fn accepts(requirements: Option<&str>, years: u32) -> bool {
    requirements
        .and_then(ExperienceRequirement::parse)
        .is_none_or(|requirement| requirement.is_satisfied_by(years))
}
