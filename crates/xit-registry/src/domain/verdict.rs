//! Comparing observed outcomes with expected ones.
//!
//! Every compared test gets a two-character code that is easy to grep for:
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | `++` | expected to pass and passed                      |
//! | `--` | expected to fail and failed                      |
//! | `XX` | the outcome differs from the expectation         |
//! | `??` | the test is only known on one side               |

use std::collections::BTreeMap;
use std::fmt;

use xit_core::TestOutcome;

use super::model::Registry;

/// Agreement between an expected and an observed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    ExpectedPass,
    ExpectedFail,
    Differs,
    Missing,
}

impl StatusCode {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::ExpectedPass => "++",
            Self::ExpectedFail => "--",
            Self::Differs => "XX",
            Self::Missing => "??",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The comparison result for one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub code: StatusCode,
    pub suite: String,
    pub name: String,
    /// Observed outcome; `None` if the test was not observed.
    pub actual: Option<bool>,
    /// Expected outcome; `None` if nothing is expected of the test.
    pub expected: Option<bool>,
}

impl Verdict {
    pub fn new(
        suite: impl Into<String>,
        name: impl Into<String>,
        expected: Option<bool>,
        actual: Option<bool>,
    ) -> Self {
        let code = match (expected, actual) {
            (Some(expected), Some(actual)) if expected != actual => StatusCode::Differs,
            (Some(true), Some(_)) => StatusCode::ExpectedPass,
            (Some(false), Some(_)) => StatusCode::ExpectedFail,
            _ => StatusCode::Missing,
        };
        Self {
            code,
            suite: suite.into(),
            name: name.into(),
            actual,
            expected,
        }
    }

    /// `true` for `XX` where the test now passes.
    pub fn is_improvement(&self) -> bool {
        self.code == StatusCode::Differs && self.actual == Some(true)
    }
}

/// Pairs up two keyed sides and produces one verdict per key, sorted.
fn pair_up(
    expected: impl IntoIterator<Item = ((String, String), bool)>,
    actual: impl IntoIterator<Item = ((String, String), bool)>,
) -> Vec<Verdict> {
    let mut sides: BTreeMap<(String, String), (Option<bool>, Option<bool>)> = BTreeMap::new();
    for (key, success) in expected {
        sides.entry(key).or_default().0 = Some(success);
    }
    for (key, success) in actual {
        sides.entry(key).or_default().1 = Some(success);
    }
    sides
        .into_iter()
        .map(|((suite, name), (expected, actual))| Verdict::new(suite, name, expected, actual))
        .collect()
}

fn expectations(registry: &Registry) -> impl Iterator<Item = ((String, String), bool)> + '_ {
    registry
        .tests
        .iter()
        .map(|t| ((t.suite.clone(), t.name.clone()), t.success))
}

/// What `verify` does with registered tests the run did not include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotRun {
    /// Leave them out; a filtered run is verified only for what it ran.
    #[default]
    Hide,
    /// Report them as `??`.
    Show,
}

/// Verifies run outcomes against `registry`.
///
/// Tests that ran but are not in the registry are reported as `??`; so are
/// registered tests that did not run when `not_run` is [`NotRun::Show`].
pub fn verify_outcomes(registry: &Registry, outcomes: &[TestOutcome], not_run: NotRun) -> Vec<Verdict> {
    let ran = |suite: &str, name: &str| {
        outcomes
            .iter()
            .any(|o| o.suite == suite && o.name == name)
    };
    pair_up(
        expectations(registry)
            .filter(|((suite, name), _)| not_run == NotRun::Show || ran(suite, name)),
        outcomes
            .iter()
            .map(|o| ((o.suite.clone(), o.name.clone()), o.success)),
    )
}

/// Compares two registries test by test, treating `first` as the
/// expectation and `second` as the observation.
pub fn compare_tests(first: &Registry, second: &Registry) -> Vec<Verdict> {
    pair_up(expectations(first), expectations(second))
}

/// One row of a module version comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleComparison {
    pub module: String,
    /// Version in the first registry; empty if it does not list the module.
    pub first: String,
    /// Version in the second registry; empty if it does not list the module.
    pub second: String,
}

impl ModuleComparison {
    pub fn differs(&self) -> bool {
        self.first != self.second
    }
}

/// Lists every module of `first` followed by those only `second` has.
pub fn compare_module_versions(first: &Registry, second: &Registry) -> Vec<ModuleComparison> {
    let mut modules: Vec<&str> = first
        .module_versions
        .iter()
        .map(|mv| mv.module.as_str())
        .collect();
    for mv in &second.module_versions {
        if !modules.contains(&mv.module.as_str()) {
            modules.push(&mv.module);
        }
    }

    let version_in = |registry: &Registry, module: &str| {
        registry
            .module_version(module)
            .map(|mv| mv.version.clone())
            .unwrap_or_default()
    };
    modules
        .into_iter()
        .map(|module| ModuleComparison {
            module: module.to_string(),
            first: version_in(first, module),
            second: version_in(second, module),
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RegistryTest;
    use chrono::NaiveDate;

    fn registry(name: &str, tests: &[(&str, &str, bool)]) -> Registry {
        let date = NaiveDate::from_ymd_opt(2013, 1, 31).expect("valid date");
        let mut registry = Registry::new(name, date);
        for (suite, test, success) in tests {
            registry.add_test(RegistryTest::new(*suite, *test, *success));
        }
        registry
    }

    #[test]
    fn test_codes_follow_expected_and_actual() {
        assert_eq!(Verdict::new("S", "n", Some(true), Some(true)).code, StatusCode::ExpectedPass);
        assert_eq!(Verdict::new("S", "n", Some(false), Some(false)).code, StatusCode::ExpectedFail);
        assert_eq!(Verdict::new("S", "n", Some(false), Some(true)).code, StatusCode::Differs);
        assert_eq!(Verdict::new("S", "n", Some(true), None).code, StatusCode::Missing);
        assert_eq!(Verdict::new("S", "n", None, Some(true)).code, StatusCode::Missing);
        assert_eq!(StatusCode::Differs.to_string(), "XX");
    }

    #[test]
    fn test_verify_with_not_run_shown_reports_every_test_on_either_side() {
        // Arrange
        let registry = registry(
            "run",
            &[("S", "fixed", false), ("S", "pass", true), ("S", "not-run", true)],
        );
        let outcomes = vec![
            TestOutcome::passed("S", "pass"),
            TestOutcome::passed("S", "fixed"),
            TestOutcome::failed("S", "new", "boom"),
        ];

        // Act
        let verdicts = verify_outcomes(&registry, &outcomes, NotRun::Show);

        // Assert
        let codes: Vec<(&str, &str)> = verdicts
            .iter()
            .map(|v| (v.name.as_str(), v.code.symbol()))
            .collect();
        assert_eq!(
            codes,
            vec![("fixed", "XX"), ("new", "??"), ("not-run", "??"), ("pass", "++")]
        );
        assert!(verdicts[0].is_improvement());
    }

    #[test]
    fn test_verify_hides_registered_tests_that_did_not_run_by_default() {
        // Arrange: a filtered run covering one of three registered tests
        let registry = registry(
            "run",
            &[("S", "a", true), ("S", "b", true), ("T", "c", false)],
        );
        let outcomes = vec![TestOutcome::passed("S", "a"), TestOutcome::passed("S", "new")];

        // Act
        let verdicts = verify_outcomes(&registry, &outcomes, NotRun::default());

        // Assert
        let codes: Vec<(&str, &str)> = verdicts
            .iter()
            .map(|v| (v.name.as_str(), v.code.symbol()))
            .collect();
        assert_eq!(codes, vec![("a", "++"), ("new", "??")]);
    }

    #[test]
    fn test_compare_uses_first_registry_as_expectation() {
        let first = registry("a", &[("S", "t", true)]);
        let second = registry("a", &[("S", "t", false)]);

        let verdicts = compare_tests(&first, &second);

        assert_eq!(verdicts[0].expected, Some(true));
        assert_eq!(verdicts[0].actual, Some(false));
        assert!(!verdicts[0].is_improvement());
    }

    #[test]
    fn test_module_comparison_covers_both_sides() {
        // Arrange
        let mut first = registry("a", &[]);
        first.set_module_version("xserver", "1.13", None);
        first.set_module_version("evdev", "2.7", None);
        let mut second = registry("a", &[]);
        second.set_module_version("xserver", "1.14", None);
        second.set_module_version("wacom", "0.19", None);

        // Act
        let rows = compare_module_versions(&first, &second);

        // Assert
        let modules: Vec<&str> = rows.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(modules, vec!["evdev", "xserver", "wacom"]);
        assert_eq!(rows[0].second, "");
        assert!(rows[1].differs());
    }
}
