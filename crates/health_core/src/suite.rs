//! Static check catalog.
//!
//! A suite is an ordered list of categories, each holding an ordered list of
//! test names. Declaration order is both the run order and the display order.
//! Tests are addressed internally by a [`TestKey`] (category index, test
//! index); names only appear at this boundary.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HealthError, HealthResult};

/// Composite index of a test within a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestKey {
    pub category: usize,
    pub test: usize,
}

impl TestKey {
    pub fn new(category: usize, test: usize) -> Self {
        Self { category, test }
    }
}

/// A resolved test identifier: the key plus the names it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestId<'a> {
    pub key: TestKey,
    pub category: &'a str,
    pub name: &'a str,
}

impl fmt::Display for TestId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.category, self.name)
    }
}

/// A named group of checks, typically one target application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub tests: Vec<String>,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        tests: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            tests: tests.into_iter().map(Into::into).collect(),
        }
    }
}

/// The full catalog. Immutable once handed to an orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteDefinition {
    categories: Vec<Category>,
}

impl SuiteDefinition {
    /// Create an empty suite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a suite from already-constructed categories.
    pub fn from_categories(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Append a category with its tests.
    pub fn category(
        mut self,
        name: impl Into<String>,
        tests: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.categories.push(Category::new(name, tests));
        self
    }

    /// The default Microsoft Office compatibility catalog.
    pub fn office() -> Self {
        Self::new()
            .category(
                "Word",
                [
                    "Launch",
                    "Sign In",
                    "Create & Type",
                    "Save (Local)",
                    "Save (OneDrive)",
                    "Export PDF",
                    "Print Dialog",
                ],
            )
            .category(
                "Excel",
                [
                    "Launch",
                    "Open Sample",
                    "Recalc",
                    "Filter/Pivot",
                    "Save & Reopen",
                    "CSV Import",
                ],
            )
            .category(
                "PowerPoint",
                ["Launch", "Insert Image", "Slide Show", "Export PDF", "Save (OneDrive)"],
            )
            .category(
                "Outlook",
                [
                    "Account Connected",
                    "Send Test Mail",
                    "Receive Loopback",
                    "Search",
                    "Calendar Event",
                ],
            )
            .category("Teams", ["Sign In", "Device Check", "Join Meeting", "Share Screen"])
    }

    /// Reject catalogs with blank or duplicate names.
    pub fn validate(&self) -> HealthResult<()> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(HealthError::EmptyCategoryName);
            }
            if !seen.insert(category.name.as_str()) {
                return Err(HealthError::DuplicateCategory(category.name.clone()));
            }
            let mut tests = HashSet::new();
            for test in &category.tests {
                if !tests.insert(test.as_str()) {
                    return Err(HealthError::DuplicateTest {
                        category: category.name.clone(),
                        test: test.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Total number of tests across all categories.
    pub fn total_count(&self) -> usize {
        self.categories.iter().map(|c| c.tests.len()).sum()
    }

    /// Every test in run order: categories in declaration order, each
    /// expanded to its tests in declaration order.
    pub fn flatten(&self) -> Vec<TestId<'_>> {
        self.categories
            .iter()
            .enumerate()
            .flat_map(|(ci, category)| {
                category
                    .tests
                    .iter()
                    .enumerate()
                    .map(move |(ti, name)| TestId {
                        key: TestKey::new(ci, ti),
                        category: &category.name,
                        name,
                    })
            })
            .collect()
    }

    /// Index of a category by name.
    pub fn category_index(&self, name: &str) -> HealthResult<usize> {
        self.categories
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| HealthError::UnknownCategory(name.to_string()))
    }

    /// Resolve a (category, test) name pair to its key.
    pub fn lookup(&self, category: &str, test: &str) -> HealthResult<TestKey> {
        let ci = self.category_index(category)?;
        self.categories[ci]
            .tests
            .iter()
            .position(|t| t == test)
            .map(|ti| TestKey::new(ci, ti))
            .ok_or_else(|| HealthError::UnknownTest {
                category: category.to_string(),
                test: test.to_string(),
            })
    }

    /// Resolve a key back to its names.
    pub fn resolve(&self, key: TestKey) -> Option<TestId<'_>> {
        let category = self.categories.get(key.category)?;
        let name = category.tests.get(key.test)?;
        Some(TestId {
            key,
            category: &category.name,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SuiteDefinition {
        SuiteDefinition::new()
            .category("A", ["t1", "t2"])
            .category("B", ["t3"])
    }

    #[test]
    fn test_flatten_preserves_declaration_order() {
        let suite = small();
        let order: Vec<(&str, &str)> =
            suite.flatten().iter().map(|t| (t.category, t.name)).collect();
        assert_eq!(order, vec![("A", "t1"), ("A", "t2"), ("B", "t3")]);
        assert_eq!(suite.flatten()[2].key, TestKey::new(1, 0));
    }

    #[test]
    fn test_office_catalog() {
        let suite = SuiteDefinition::office();
        assert_eq!(suite.categories().len(), 5);
        assert_eq!(suite.total_count(), 27);
        assert!(suite.validate().is_ok());
        assert!(suite.lookup("Outlook", "Receive Loopback").is_ok());
    }

    #[test]
    fn test_same_test_name_in_different_categories() {
        let suite = SuiteDefinition::office();
        let word = suite.lookup("Word", "Launch").unwrap();
        let excel = suite.lookup("Excel", "Launch").unwrap();
        assert_ne!(word, excel);
    }

    #[test]
    fn test_lookup_errors() {
        let suite = small();
        assert!(matches!(suite.lookup("C", "t1"), Err(HealthError::UnknownCategory(_))));
        assert!(matches!(suite.lookup("A", "t3"), Err(HealthError::UnknownTest { .. })));
    }

    #[test]
    fn test_resolve_round_trip() {
        let suite = small();
        let key = suite.lookup("B", "t3").unwrap();
        let id = suite.resolve(key).unwrap();
        assert_eq!(id.to_string(), "B / t3");
        assert!(suite.resolve(TestKey::new(5, 0)).is_none());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let dup_category = small().category("A", ["x"]);
        assert!(matches!(dup_category.validate(), Err(HealthError::DuplicateCategory(_))));

        let dup_test = SuiteDefinition::new().category("A", ["t1", "t1"]);
        assert!(matches!(dup_test.validate(), Err(HealthError::DuplicateTest { .. })));

        let blank = SuiteDefinition::new().category("  ", ["t1"]);
        assert!(matches!(blank.validate(), Err(HealthError::EmptyCategoryName)));
    }

    #[test]
    fn test_empty_suite() {
        let suite = SuiteDefinition::new();
        assert!(suite.is_empty());
        assert!(suite.flatten().is_empty());
    }
}
