//! Terminal implementations of the controller's collaborators.
//!
//! The map has nothing to draw on, so it logs what it would render and
//! reports camera moves on stdout. The page prints list entries to stdout
//! and alerts to stderr.

use mapty_core::{Coords, MapView, Marker, Page, PanOptions, TileLayer, WorkoutEntry, WorkoutType};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct TerminalMap {
    markers: usize,
}

impl MapView for TerminalMap {
    fn load(&mut self, center: Coords, zoom: u8, tiles: &TileLayer) {
        tracing::debug!("Loading map at {} zoom {} from {}", center, zoom, tiles.url);
        self.markers = 0;
    }

    fn add_marker(&mut self, marker: &Marker) {
        self.markers += 1;
        tracing::debug!(
            "Marker {} at {} [{}]: {}",
            marker.workout_id,
            marker.coords,
            marker.popup.class_name,
            marker.content
        );
    }

    fn set_view(&mut self, target: Coords, zoom: u8, pan: &PanOptions) {
        println!(
            "→ Map centered on {} (zoom {}, {}s pan)",
            target, zoom, pan.duration
        );
    }

    fn remove(&mut self) {
        tracing::debug!("Removing map with {} markers", self.markers);
        self.markers = 0;
    }
}

/// Page surface. Entries are printed only when `show_entries` is set.
#[derive(Debug)]
pub struct TerminalPage {
    show_entries: bool,
}

impl TerminalPage {
    pub fn new(show_entries: bool) -> Self {
        Self { show_entries }
    }
}

impl Page for TerminalPage {
    fn show_form(&mut self) {
        tracing::debug!("Form shown");
    }

    fn hide_form(&mut self, restore_after: Duration) {
        tracing::debug!("Form hidden, layout restored after {:?}", restore_after);
    }

    fn show_fields_for(&mut self, workout_type: WorkoutType) {
        tracing::debug!("Form fields switched to {}", workout_type);
    }

    fn insert_workout(&mut self, entry: &WorkoutEntry) {
        if self.show_entries {
            println!("{}", entry);
        }
    }

    fn clear_workouts(&mut self) {
        tracing::debug!("Workout list cleared");
    }

    fn alert(&mut self, message: &str) {
        eprintln!("⚠ {}", message);
    }
}
