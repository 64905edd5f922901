//! Location selection as a stream of events.
//!
//! Whatever produces locations (a search prompt, a saved default, a device
//! position source) pushes [`LocationEvent`]s into a channel and the
//! [`crate::orchestrator::Orchestrator`] consumes them.

use tokio::sync::mpsc;

use crate::model::{Coordinate, LocationResult};

/// Label used for a device fix that has no resolved place name.
pub const CURRENT_LOCATION: &str = "Current Location";

#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// The user picked a named place.
    Selected { name: String, coord: Coordinate },
    /// The device reported its position.
    DeviceFix { coord: Coordinate, name: Option<String> },
    /// Access to the device position was refused.
    PermissionDenied,
}

impl LocationEvent {
    /// Place name and coordinate to load, if the event carries one.
    pub fn target(&self) -> Option<(String, Coordinate)> {
        match self {
            LocationEvent::Selected { name, coord } => Some((name.clone(), *coord)),
            LocationEvent::DeviceFix { coord, name } => Some((
                name.clone().unwrap_or_else(|| CURRENT_LOCATION.to_string()),
                *coord,
            )),
            LocationEvent::PermissionDenied => None,
        }
    }
}

impl From<&LocationResult> for LocationEvent {
    fn from(result: &LocationResult) -> Self {
        LocationEvent::Selected {
            name: result.display_name(),
            coord: result.coordinate(),
        }
    }
}

pub type LocationSender = mpsc::Sender<LocationEvent>;
pub type LocationReceiver = mpsc::Receiver<LocationEvent>;

/// Bounded channel for location events.
pub fn channel(buffer: usize) -> (LocationSender, LocationReceiver) {
    mpsc::channel(buffer.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_fix_without_name_uses_placeholder() {
        let ev = LocationEvent::DeviceFix {
            coord: Coordinate::new(1.0, 2.0),
            name: None,
        };
        assert_eq!(
            ev.target(),
            Some((CURRENT_LOCATION.to_string(), Coordinate::new(1.0, 2.0)))
        );
    }

    #[test]
    fn permission_denied_has_no_target() {
        assert_eq!(LocationEvent::PermissionDenied.target(), None);
    }

    #[test]
    fn search_result_becomes_selection() {
        let result = LocationResult {
            name: "Nairobi".into(),
            lat: -1.29,
            lon: 36.82,
            country: "KE".into(),
            state: None,
        };
        assert_eq!(
            LocationEvent::from(&result),
            LocationEvent::Selected {
                name: "Nairobi, KE".into(),
                coord: Coordinate::new(-1.29, 36.82),
            }
        );
    }
}
