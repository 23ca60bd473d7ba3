//! Collaborator traits the controller drives.
//!
//! The controller never draws, prompts or locates anything itself. A
//! host supplies implementations of these traits: a browser binding, the
//! terminal host in `mapty_cli`, or recording fakes in tests.

use crate::render::{Marker, PanOptions, WorkoutEntry};
use crate::{Coords, GeolocationError, WorkoutType};
use std::time::Duration;

/// Source of the user's current position
pub trait Geolocator {
    /// Single-shot position request. No retry, no timeout.
    fn current_position(&mut self) -> Result<Coords, GeolocationError>;
}

/// Tile source shown beneath the markers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
}

/// Map rendering library
pub trait MapView {
    /// Create the map centered on `center`
    fn load(&mut self, center: Coords, zoom: u8, tiles: &TileLayer);

    /// Add a marker and open its popup
    fn add_marker(&mut self, marker: &Marker);

    /// Move the camera
    fn set_view(&mut self, target: Coords, zoom: u8, pan: &PanOptions);

    /// Tear the map down, dropping every marker
    fn remove(&mut self);
}

/// The page around the map: input form, workout list, alerts
pub trait Page {
    /// Reveal the input form and focus the distance field
    fn show_form(&mut self);

    /// Clear and hide the form. Layout is restored after `restore_after`.
    fn hide_form(&mut self, restore_after: Duration);

    /// Show the cadence row for running, the elevation row for cycling
    fn show_fields_for(&mut self, workout_type: WorkoutType);

    /// Append an entry after the form
    fn insert_workout(&mut self, entry: &WorkoutEntry);

    /// Remove every rendered entry
    fn clear_workouts(&mut self);

    /// Blocking user notification
    fn alert(&mut self, message: &str);
}

/// Geolocator that answers with a fixed position
///
/// Without a position it behaves like a host with no position service.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticLocator {
    position: Option<Coords>,
}

impl StaticLocator {
    pub fn new(position: Option<Coords>) -> Self {
        Self { position }
    }
}

impl Geolocator for StaticLocator {
    fn current_position(&mut self) -> Result<Coords, GeolocationError> {
        self.position.ok_or(GeolocationError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_locator() {
        let mut located = StaticLocator::new(Some(Coords::new(1.0, 2.0)));
        assert_eq!(located.current_position(), Ok(Coords::new(1.0, 2.0)));

        let mut unknown = StaticLocator::default();
        assert_eq!(
            unknown.current_position(),
            Err(GeolocationError::Unsupported)
        );
    }
}
