//! Workout form input and validation.
//!
//! Every field arrives as a raw string. Numbers are coerced the way the
//! page's unary plus does it: whitespace is trimmed, an empty field is
//! zero, and anything else that does not parse is NaN. Validation then
//! rejects non-finite values and non-positive distance, duration and
//! cadence. Elevation gain may be zero or negative. Inputs whose pace or
//! speed overflows are rejected as well.

use crate::{Activity, Error, Result, WorkoutType};

/// Raw contents of the workout form
#[derive(Clone, Debug, Default)]
pub struct WorkoutForm {
    pub workout_type: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation_gain: String,
}

/// Form contents that passed validation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatedWorkout {
    pub distance: f64,
    pub duration: f64,
    pub activity: Activity,
}

impl WorkoutForm {
    pub fn running(distance: &str, duration: &str, cadence: &str) -> Self {
        Self {
            workout_type: WorkoutType::Running.as_str().into(),
            distance: distance.into(),
            duration: duration.into(),
            cadence: cadence.into(),
            elevation_gain: String::new(),
        }
    }

    pub fn cycling(distance: &str, duration: &str, elevation_gain: &str) -> Self {
        Self {
            workout_type: WorkoutType::Cycling.as_str().into(),
            distance: distance.into(),
            duration: duration.into(),
            cadence: String::new(),
            elevation_gain: elevation_gain.into(),
        }
    }

    /// Parse and check the fields required by the selected type
    pub fn validate(&self) -> Result<ValidatedWorkout> {
        let workout_type: WorkoutType = self.workout_type.parse()?;
        let distance = positive("distance", &self.distance)?;
        let duration = positive("duration", &self.duration)?;

        let activity = match workout_type {
            WorkoutType::Running => Activity::Running {
                cadence: positive("cadence", &self.cadence)?,
            },
            WorkoutType::Cycling => Activity::Cycling {
                elevation_gain: finite("elevation gain", &self.elevation_gain)?,
            },
        };
        derived_metric(distance, duration, &activity)?;

        Ok(ValidatedWorkout {
            distance,
            duration,
            activity,
        })
    }
}

/// Coerce a field to a number: empty is 0, garbage is NaN
pub fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn finite(field: &str, raw: &str) -> Result<f64> {
    let value = parse_number(raw);
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{} must be a number, got {:?}",
            field, raw
        )));
    }
    Ok(value)
}

// JSON has no encoding for inf, so such a workout would not load back
fn derived_metric(distance: f64, duration: f64, activity: &Activity) -> Result<()> {
    let (field, value) = match activity {
        Activity::Running { .. } => ("pace", duration / distance),
        Activity::Cycling { .. } => ("speed", distance / (duration / 60.0)),
    };
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{} is out of range for distance {} and duration {}",
            field, distance, duration
        )));
    }
    Ok(())
}

fn positive(field: &str, raw: &str) -> Result<f64> {
    let value = finite(field, raw)?;
    if value <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be positive, got {}",
            field, value
        )));
    }
    Ok(value)
}
