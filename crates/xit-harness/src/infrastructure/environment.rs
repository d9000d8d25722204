//! The production [`TestEnvironment`]: uinput devices and a real Xorg.

use tracing::debug;

use super::{input_device::uinput::UinputDevice, server::XorgServer, settings::HarnessSettings};
use crate::application::{
    session::{InputDevice, RunningServer, SetupError, TestEnvironment},
    suites::CaseFixture,
};

/// Creates devices from the recordings directory and starts the configured
/// server binary for every case.
pub struct XorgEnvironment {
    settings: HarnessSettings,
}

impl XorgEnvironment {
    pub fn new(settings: HarnessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }
}

impl TestEnvironment for XorgEnvironment {
    fn create_device(&mut self, recording: &str) -> Result<Box<dyn InputDevice>, SetupError> {
        let path = self.settings.paths.recordings_dir.join(recording);
        debug!(recording = %path.display(), "creating device");
        let device = UinputDevice::from_recording(&path)?;
        Ok(Box::new(device))
    }

    fn launch(&mut self, fixture: &CaseFixture) -> Result<Box<dyn RunningServer>, SetupError> {
        let server = XorgServer::start(&self.settings.server, &fixture.config_path, &fixture.log_path)
            .map_err(|e| SetupError::Server(e.to_string()))?;
        Ok(Box::new(server))
    }
}
