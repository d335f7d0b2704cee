//! Intersects staleness report output tokens with the test registry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::parser::{ActionLineParser, NinjaLineParser};
use crate::registry::TestRegistry;

/// Labels of tests whose artifacts are stale, in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffectedSet {
    labels: BTreeSet<String>,
}

impl AffectedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        self.labels.insert(label.into())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sorted labels.
    pub fn into_vec(self) -> Vec<String> {
        self.labels.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for AffectedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Resolve with the default ninja line parser.
pub fn resolve<'a, I>(report: I, registry: &TestRegistry) -> AffectedSet
where
    I: IntoIterator<Item = &'a str>,
{
    resolve_with(&NinjaLineParser, report, registry)
}

/// Resolve the labels whose artifact paths appear as output tokens in `report`.
///
/// Lines the parser rejects and tokens missing from the registry are skipped.
pub fn resolve_with<'a, P, I>(parser: &P, report: I, registry: &TestRegistry) -> AffectedSet
where
    P: ActionLineParser + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut affected = AffectedSet::new();
    if registry.is_empty() {
        return affected;
    }

    for line in report {
        let Some(token) = parser.output_token(line) else {
            continue;
        };
        if let Some(label) = registry.get(token) {
            affected.insert(label);
        }
    }
    affected
}
