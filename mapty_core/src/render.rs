//! Payloads handed to the map and page collaborators.
//!
//! Nothing here draws anything. These types describe what a marker,
//! popup, camera move or list entry should contain so that any host can
//! render them.

use crate::{Coords, Workout, WorkoutKind, WorkoutType};
use std::fmt;

/// Popup options attached to every workout marker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopupConfig {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
}

impl PopupConfig {
    pub fn for_type(workout_type: WorkoutType) -> Self {
        Self {
            max_width: 250,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
            class_name: format!("{}-popup", workout_type.as_str()),
        }
    }
}

/// A marker with an opened popup
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub workout_id: String,
    pub coords: Coords,
    pub popup: PopupConfig,
    pub content: String,
}

impl Marker {
    pub fn for_workout(workout: &Workout) -> Self {
        let workout_type = workout.workout_type();
        Self {
            workout_id: workout.id().to_string(),
            coords: workout.coords(),
            popup: PopupConfig::for_type(workout_type),
            content: format!("{} {}", workout_type.icon(), workout.description()),
        }
    }
}

/// Camera animation for focusing a workout
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanOptions {
    pub animate: bool,
    /// Seconds
    pub duration: f64,
}

impl Default for PanOptions {
    fn default() -> Self {
        Self {
            animate: true,
            duration: 1.0,
        }
    }
}

/// One value row of a list entry, e.g. `⏱ 25 min`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Detail {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.icon, self.value, self.unit)
    }
}

/// A workout as shown in the sidebar list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkoutEntry {
    pub id: String,
    pub workout_type: WorkoutType,
    pub title: String,
    pub details: Vec<Detail>,
}

impl WorkoutEntry {
    pub fn for_workout(workout: &Workout) -> Self {
        let workout_type = workout.workout_type();
        let mut details = vec![
            Detail::new(workout_type.icon(), workout.distance().to_string(), "km"),
            Detail::new("⏱", workout.duration().to_string(), "min"),
        ];

        match workout.kind() {
            WorkoutKind::Running { cadence, pace } => {
                details.push(Detail::new("⚡️", format!("{:.1}", pace), "min/km"));
                details.push(Detail::new("🦶🏼", cadence.to_string(), "spm"));
            }
            WorkoutKind::Cycling {
                elevation_gain,
                speed,
            } => {
                details.push(Detail::new("⚡️", format!("{:.1}", speed), "km/h"));
                details.push(Detail::new("⛰", elevation_gain.to_string(), "m"));
            }
        }

        Self {
            id: workout.id().to_string(),
            workout_type,
            title: workout.description().to_string(),
            details,
        }
    }

    /// CSS classes for the list item: `workout workout--running`
    pub fn class_name(&self) -> String {
        format!("workout workout--{}", self.workout_type)
    }
}

impl fmt::Display for WorkoutEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.title)?;
        for detail in &self.details {
            write!(f, " | {}", detail)?;
        }
        Ok(())
    }
}
