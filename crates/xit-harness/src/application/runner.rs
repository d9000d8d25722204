//! Runs the selected cases one after another and collects their outcomes.
//!
//! Every case goes through the same steps:
//!
//! 1. create the synthetic device its recording describes (if any),
//! 2. build and write its xorg.conf,
//! 3. start the server and connect to it,
//! 4. run the check for its [`CaseKind`],
//! 5. drop the server, then the device.
//!
//! A failure in any step fails that case only; the runner moves on to the
//! next one.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info};
use xit_core::{LayoutTable, RunReport, TestFilter, TestOutcome};

use super::{
    session::{DisplayConnection, InputDevice, SetupError, TestEnvironment, VerifyError},
    suites::{CaseKind, TestCase},
    verify_devices::{device_exists, legacy_driver_device},
    verify_keyboard::KeyboardLayoutVerifier,
    verify_scroll::ScrollWheelVerifier,
};

/// Why a single case failed.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("setup failed: {0}")]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error("{0} replays events but has no device")]
    NoDevice(String),
}

/// Runs cases against a [`TestEnvironment`].
pub struct TestRunner<E> {
    env: E,
    table: LayoutTable,
    work_dir: PathBuf,
    video_driver: String,
}

impl<E: TestEnvironment> TestRunner<E> {
    /// `work_dir` receives the per-case config and log files; `video_driver`
    /// drives the single screen every config declares.
    pub fn new(
        env: E,
        table: LayoutTable,
        work_dir: impl Into<PathBuf>,
        video_driver: impl Into<String>,
    ) -> Self {
        Self {
            env,
            table,
            work_dir: work_dir.into(),
            video_driver: video_driver.into(),
        }
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    /// Runs every case in `cases` selected by `filter`, in order.
    pub fn run(&mut self, cases: &[TestCase], filter: &TestFilter) -> RunReport {
        let mut report = RunReport::new();
        let selected: Vec<&TestCase> = cases
            .iter()
            .filter(|case| filter.matches(&case.full_name()))
            .collect();
        info!(run_id = %report.run_id, cases = selected.len(), "starting run");

        for case in selected {
            let full_name = case.full_name();
            info!(case = %full_name, "running");
            match self.run_case(case) {
                Ok(()) => {
                    info!(case = %full_name, "passed");
                    report.push(TestOutcome::passed(case.suite, case.name.clone()));
                }
                Err(e) => {
                    error!(case = %full_name, error = %e, "failed");
                    report.push(TestOutcome::failed(case.suite, case.name.clone(), e.to_string()));
                }
            }
        }

        info!(
            passed = report.passed(),
            failed = report.failed(),
            "run complete"
        );
        report
    }

    /// Runs a single case.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Setup`] if the device, config or server cannot be set
    /// up, [`HarnessError::Verify`] if the check itself fails.
    pub fn run_case(&mut self, case: &TestCase) -> Result<(), HarnessError> {
        let mut device = case
            .recording()
            .map(|recording| self.env.create_device(recording))
            .transpose()?;

        let fixture = case.fixture(
            &self.work_dir,
            &self.video_driver,
            device.as_ref().map(|d| d.device_node()),
        );
        fixture
            .config
            .write_config(&fixture.config_path)
            .map_err(SetupError::from)?;

        // Declared after the device so it is dropped (and the server stopped)
        // before the device disappears.
        let mut server = self.env.launch(&fixture)?;
        let display = server.display();

        let verdict = self.check(case, &mut device, display);
        // A dead server explains whatever the check saw afterwards.
        display.check_connection().map_err(VerifyError::from)?;
        verdict
    }

    fn check(
        &self,
        case: &TestCase,
        device: &mut Option<Box<dyn InputDevice>>,
        display: &mut dyn DisplayConnection,
    ) -> Result<(), HarnessError> {
        let no_device = || HarnessError::NoDevice(case.full_name());
        let device = device.as_deref_mut();
        match &case.kind {
            CaseKind::DeviceExists { .. } => device_exists(display)?,
            CaseKind::KeyboardLayout { layout } => {
                let device = device.ok_or_else(no_device)?;
                KeyboardLayoutVerifier::new(&self.table, device, display).run(layout)?;
            }
            CaseKind::ScrollWheel => {
                let device = device.ok_or_else(no_device)?;
                ScrollWheelVerifier::new(device, display).run()?;
            }
            CaseKind::LegacyDriverDevice { driver } => legacy_driver_device(display, driver)?,
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        session::{DeviceError, DisplayError, RunningServer},
        suites::{registered_cases, CaseFixture},
    };
    use crate::infrastructure::{
        display::scripted::ScriptedDisplay, input_device::mock::MockInputDevice,
    };
    use xit_core::DeviceInfo;

    struct ScriptedServer {
        display: ScriptedDisplay,
    }

    impl RunningServer for ScriptedServer {
        fn display(&mut self) -> &mut dyn DisplayConnection {
            &mut self.display
        }
    }

    /// Hands out recording devices and servers reporting a fixed device list.
    #[derive(Default)]
    struct FakeEnvironment {
        devices: Vec<DeviceInfo>,
        fail_devices: bool,
        server_dies: bool,
        created: Vec<String>,
        launched: Vec<CaseFixture>,
    }

    impl TestEnvironment for FakeEnvironment {
        fn create_device(&mut self, recording: &str) -> Result<Box<dyn InputDevice>, SetupError> {
            if self.fail_devices {
                return Err(DeviceError::NoDeviceNode(recording.to_string()).into());
            }
            self.created.push(recording.to_string());
            Ok(Box::new(MockInputDevice::new("/dev/input/event42")))
        }

        fn launch(&mut self, fixture: &CaseFixture) -> Result<Box<dyn RunningServer>, SetupError> {
            self.launched.push(fixture.clone());
            let mut display = ScriptedDisplay::new();
            display.set_devices(self.devices.clone());
            if self.server_dies {
                display.disconnect();
            }
            Ok(Box::new(ScriptedServer { display }))
        }
    }

    fn runner(env: FakeEnvironment, dir: &tempfile::TempDir) -> TestRunner<FakeEnvironment> {
        TestRunner::new(env, LayoutTable::builtin(), dir.path(), "dummy")
    }

    #[test]
    fn test_device_exists_case_writes_config_and_passes() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let env = FakeEnvironment {
            devices: vec![DeviceInfo::new(2, "Virtual core pointer"), DeviceInfo::new(6, "--device--")],
            ..FakeEnvironment::default()
        };
        let mut runner = runner(env, &dir);
        let cases = registered_cases(&LayoutTable::builtin());

        // Act
        let report = runner.run(&cases, &TestFilter::parse("*.DeviceExists/de"));

        // Assert
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.all_passed(), "{:?}", report.outcomes);
        let conf = std::fs::read_to_string(dir.path().join("evdev-driver-xkb.conf")).unwrap();
        assert!(conf.contains("Option \"XkbLayout\" \"de\""));
        assert!(conf.contains("Option \"Device\" \"/dev/input/event42\""));
        assert_eq!(runner.environment().created.len(), 1);
    }

    #[test]
    fn test_failing_cases_are_recorded_and_the_run_continues() {
        // Arrange: no devices at all, so every presence check fails
        let dir = tempfile::tempdir().unwrap();
        let mut runner = runner(FakeEnvironment::default(), &dir);
        let cases = registered_cases(&LayoutTable::builtin());

        // Act
        let report = runner.run(&cases, &TestFilter::parse("LegacyInputDriverTest.*"));

        // Assert
        assert_eq!(report.outcomes.len(), 7);
        assert_eq!(report.failed(), 7);
        let message = report.outcomes[0].message.clone().unwrap_or_default();
        assert!(message.contains("Drivers required for this test: mouse, keyboard, acecad"));
        assert!(runner.environment().created.is_empty(), "legacy cases need no device");
    }

    #[test]
    fn test_setup_failure_fails_only_that_case() {
        let dir = tempfile::tempdir().unwrap();
        let env = FakeEnvironment {
            fail_devices: true,
            ..FakeEnvironment::default()
        };
        let mut runner = runner(env, &dir);
        let cases = registered_cases(&LayoutTable::builtin());

        let report = runner.run(&cases, &TestFilter::parse("EvdevDriverMouseTest.*"));

        assert_eq!(report.failed(), 1);
        let message = report.outcomes[0].message.clone().unwrap_or_default();
        assert!(message.starts_with("setup failed"), "{message}");
        assert!(runner.environment().launched.is_empty());
    }

    #[test]
    fn test_filter_excluding_everything_yields_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = runner(FakeEnvironment::default(), &dir);
        let cases = registered_cases(&LayoutTable::builtin());

        let report = runner.run(&cases, &TestFilter::parse("NoSuchSuite.*"));

        assert!(report.outcomes.is_empty());
        assert!(report.all_passed());
    }

    #[test]
    fn test_lost_server_fails_the_case_with_connection_lost() {
        // Arrange: the server dies right after the connection is made
        let dir = tempfile::tempdir().unwrap();
        let env = FakeEnvironment {
            server_dies: true,
            ..FakeEnvironment::default()
        };
        let mut runner = runner(env, &dir);
        let cases = registered_cases(&LayoutTable::builtin());

        // Act
        let report = runner.run(&cases, &TestFilter::parse("EvdevDriverMouseTest.*"));

        // Assert: the case fails, the run itself survives
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.failed(), 1);
        let message = report.outcomes[0].message.clone().unwrap_or_default();
        assert_eq!(
            message,
            DisplayError::ConnectionLost("scripted".to_string()).to_string()
        );
    }
}
