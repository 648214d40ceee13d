//! CLI enum types for device selectors and camera actions.

use clap::ValueEnum;

use crate::arlo::DeviceKind;

/// Which device categories a command covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DeviceSelector {
    #[default]
    All,
    Cameras,
    Bases,
    Lights,
    Doorbells,
}

impl DeviceSelector {
    /// Categories in output order.
    pub fn kinds(self) -> &'static [DeviceKind] {
        match self {
            DeviceSelector::All => &[
                DeviceKind::Base,
                DeviceKind::Camera,
                DeviceKind::Light,
                DeviceKind::Doorbell,
            ],
            DeviceSelector::Cameras => &[DeviceKind::Camera],
            DeviceSelector::Bases => &[DeviceKind::Base],
            DeviceSelector::Lights => &[DeviceKind::Light],
            DeviceSelector::Doorbells => &[DeviceKind::Doorbell],
        }
    }

    /// The name as typed on the command line.
    pub fn name(self) -> &'static str {
        match self {
            DeviceSelector::All => "all",
            DeviceSelector::Cameras => "cameras",
            DeviceSelector::Bases => "bases",
            DeviceSelector::Lights => "lights",
            DeviceSelector::Doorbells => "doorbells",
        }
    }
}

/// What to do with the selected camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CameraAction {
    StartStream,
    StopStream,
    LastThumbnail,
}
