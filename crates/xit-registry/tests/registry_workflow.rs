//! End-to-end registry workflow on files: a harness run becomes a registry,
//! the registry is annotated, and later runs are verified against it.

use chrono::NaiveDate;
use xit_core::{RunReport, TestOutcome};
use xit_registry::application::{commands, table::Color};
use xit_registry::domain::{EditAction, MetaAction, NotRun, RegistryError};
use xit_registry::infrastructure::store::{load_registry_file, RegistryStore};

const LEGACY: &str = "LegacyInputDriverTest";

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2013, 2, 14).expect("valid date")
}

fn first_run() -> RunReport {
    let mut report = RunReport::new();
    report.push(TestOutcome::passed("EvdevDriverMouseTest", "ScrollWheel"));
    report.push(TestOutcome::passed(LEGACY, "DriverDevice/acecad"));
    report.push(TestOutcome::failed(
        LEGACY,
        "DriverDevice/fpit",
        "Expected 6 devices, found 5",
    ));
    report
}

/// Saves `report` as `<stem>.toml` and creates a registry named after it.
fn create_registry(dir: &std::path::Path, stem: &str, report: &RunReport) -> RegistryStore {
    let results = dir.join(format!("{stem}.toml"));
    report.save(&results).expect("save results");

    let loaded = RunReport::load(&results).expect("load results");
    let file = commands::create(&[(stem.to_string(), loaded.outcomes)], None, date())
        .expect("create");

    let store = RegistryStore::new(Some(dir.join("registry.toml")));
    store.save(&file).expect("save registry");
    store
}

#[test]
fn test_created_registry_expects_the_run_it_came_from() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let store = create_registry(dir.path(), "fedora-18", &first_run());

    // Act
    let file = store.load().expect("load registry");
    let registry = commands::registry_for_results(&file, None, &dir.path().join("fedora-18.toml"))
        .expect("registry named after results");
    let table = commands::verify(registry, &first_run().outcomes, NotRun::Hide);

    // Assert
    assert_eq!(registry.date, date());
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows_with_code("++").count(), 2);
    assert_eq!(table.rows_with_code("--").count(), 1);
    assert!(table.rows.iter().all(|row| row.color == Color::Default));
}

#[test]
fn test_verify_flags_regressions_improvements_and_unknown_tests() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = create_registry(dir.path(), "fedora-18", &first_run());
    let file = store.load().expect("load registry");

    let mut second = RunReport::new();
    second.push(TestOutcome::failed("EvdevDriverMouseTest", "ScrollWheel", "no events"));
    second.push(TestOutcome::passed(LEGACY, "DriverDevice/fpit"));
    second.push(TestOutcome::passed(LEGACY, "DriverDevice/penmount"));

    let registry = file.select(None).expect("registry");
    let table = commands::verify(registry, &second.outcomes, NotRun::Show);

    let color_of = |name: &str| {
        table
            .rows
            .iter()
            .find(|row| row.cells[2] == name)
            .map(|row| (row.cells[0].clone(), row.color))
    };
    assert_eq!(color_of("ScrollWheel"), Some(("XX".to_string(), Color::Red)));
    assert_eq!(color_of("DriverDevice/fpit"), Some(("XX".to_string(), Color::Green)));
    assert_eq!(color_of("DriverDevice/penmount"), Some(("??".to_string(), Color::Blue)));
    // Registered but not run.
    assert_eq!(color_of("DriverDevice/acecad"), Some(("??".to_string(), Color::Blue)));
}

#[test]
fn test_verify_of_a_filtered_run_lists_only_what_ran() {
    // Arrange: the registry knows three tests, the run covers one
    let dir = tempfile::tempdir().expect("tempdir");
    let store = create_registry(dir.path(), "fedora-18", &first_run());
    let file = store.load().expect("load registry");
    let mut filtered = RunReport::new();
    filtered.push(TestOutcome::passed("EvdevDriverMouseTest", "ScrollWheel"));

    // Act
    let registry = file.select(None).expect("registry");
    let table = commands::verify(registry, &filtered.outcomes, NotRun::Hide);

    // Assert
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].cells[0], "++");
    assert_eq!(table.rows_with_code("??").count(), 0);
}

#[test]
fn test_edits_are_persisted_and_shown_by_info() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = create_registry(dir.path(), "fedora-18", &first_run());

    let mut file = store.load().expect("load");
    commands::edit(
        &mut file,
        None,
        LEGACY,
        "DriverDevice/fpit",
        &EditAction::AddBug {
            url: "https://bugs.freedesktop.org/show_bug.cgi?id=60000".into(),
        },
    )
    .expect("add bug");
    commands::edit(
        &mut file,
        None,
        LEGACY,
        "DriverDevice/fpit",
        &EditAction::SetStatus {
            status: "true".into(),
        },
    )
    .expect("set status");
    commands::meta(
        &mut file,
        None,
        &MetaAction::SetModuleVersion {
            module: "xf86-input-fpit".into(),
            version: "1.4.0".into(),
            kind: None,
        },
    )
    .expect("module version");
    store.save(&file).expect("save");

    let reloaded = load_registry_file(&dir.path().join("registry.toml")).expect("reload");
    let text = commands::info(&reloaded, None, LEGACY, "DriverDevice/fpit").expect("info");

    assert!(text.contains("Expected result: Success"));
    assert!(text.contains("show_bug.cgi?id=60000"));
    let registry = reloaded.select(None).expect("registry");
    assert_eq!(
        registry
            .module_version("xf86-input-fpit")
            .map(|m| m.version.as_str()),
        Some("1.4.0")
    );
}

#[test]
fn test_editing_an_unknown_test_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = create_registry(dir.path(), "fedora-18", &first_run());
    let mut file = store.load().expect("load");

    let err = commands::edit(
        &mut file,
        None,
        LEGACY,
        "DriverDevice/void",
        &EditAction::RemoveRpm {
            nvr: "xorg-x11-drv-void-1.4.0-1".into(),
        },
    )
    .expect_err("unknown test");

    assert!(matches!(err, RegistryError::UnknownTest { .. }));
}

#[test]
fn test_merge_keeps_existing_expectations_and_adds_new_tests() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = create_registry(dir.path(), "fedora-18", &first_run())
        .load()
        .expect("first");

    let mut later = RunReport::new();
    later.push(TestOutcome::passed(LEGACY, "DriverDevice/fpit"));
    later.push(TestOutcome::passed(LEGACY, "DriverDevice/penmount"));
    let second = commands::create(&[("fedora-18".into(), later.outcomes)], None, date())
        .expect("second");

    let merged = commands::merge(first, &second, None).expect("merge");

    let registry = merged.select(Some("fedora-18")).expect("registry");
    assert_eq!(registry.tests.len(), 4);
    assert_eq!(
        registry.test(LEGACY, "DriverDevice/fpit").map(|t| t.success),
        Some(false)
    );
    assert_eq!(
        registry.test(LEGACY, "DriverDevice/penmount").map(|t| t.success),
        Some(true)
    );
}

#[test]
fn test_compare_reports_differences_between_registry_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = create_registry(dir.path(), "fedora-18", &first_run())
        .load()
        .expect("first");
    let mut second = first.clone();
    commands::edit(
        &mut second,
        None,
        LEGACY,
        "DriverDevice/fpit",
        &EditAction::SetStatus {
            status: "success".into(),
        },
    )
    .expect("set status");

    let tables = commands::compare(&first, &second, None, ("old.toml", "new.toml"))
        .expect("compare");

    let verdicts = tables.last().expect("verdict table");
    assert_eq!(verdicts.headers[3], "new.toml");
    assert_eq!(verdicts.rows_with_code("XX").count(), 1);
    assert_eq!(verdicts.rows_with_code("++").count(), 2);
}
