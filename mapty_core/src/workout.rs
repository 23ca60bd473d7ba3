//! Workout domain model.
//!
//! A workout is a set of shared fields (id, date, position, distance,
//! duration, description, click counter) plus a variant payload:
//! - Running carries cadence and the derived pace
//! - Cycling carries elevation gain and the derived speed
//!
//! Derived values are computed once at construction. The model performs
//! no validation; callers check inputs first (see [`crate::form`]).

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ============================================================================
// Coordinates
// ============================================================================

/// A latitude/longitude pair, stored as `[lat, lng]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude within ±90 and longitude within ±180
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(coords: Coords) -> Self {
        [coords.lat, coords.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for Coords {
    type Err = crate::Error;

    /// Parse `"LAT,LNG"`, rejecting positions off the globe
    fn from_str(s: &str) -> crate::Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| crate::Error::Other(format!("Expected LAT,LNG, got {:?}", s)))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| crate::Error::Other(format!("Invalid coordinate {:?}", part)))
        };
        let coords = Self::new(parse(lat)?, parse(lng)?);
        if !coords.in_range() {
            return Err(crate::Error::Other(format!(
                "Coordinates {} are out of range",
                coords
            )));
        }
        Ok(coords)
    }
}

// ============================================================================
// Workout type and variant payloads
// ============================================================================

/// Discriminant of a workout
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Running,
    Cycling,
}

impl WorkoutType {
    /// Lowercase tag used in storage and CSS class names
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
        }
    }

    /// Capitalized name used in descriptions
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WorkoutType::Running => "🏃‍♂️",
            WorkoutType::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "running" => Ok(WorkoutType::Running),
            "cycling" => Ok(WorkoutType::Cycling),
            _ => Err(crate::Error::UnknownWorkoutType(s.to_string())),
        }
    }
}

/// Variant-specific input, before derived metrics exist
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Activity {
    Running { cadence: f64 },
    Cycling { elevation_gain: f64 },
}

impl Activity {
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            Activity::Running { .. } => WorkoutType::Running,
            Activity::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

/// Variant payload of a constructed workout
///
/// Flattened into the workout object with a `type` tag, so a running
/// workout serializes as `{..., "type": "running", "cadence": .., "pace": ..}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutKind {
    /// Pace in min/km
    Running { cadence: f64, pace: f64 },
    /// Speed in km/h
    #[serde(rename_all = "camelCase")]
    Cycling { elevation_gain: f64, speed: f64 },
}

impl WorkoutKind {
    pub fn workout_type(&self) -> WorkoutType {
        match self {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

// ============================================================================
// Id generation
// ============================================================================

/// How new workout ids are produced
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// Last 10 digits of the creation time in epoch milliseconds.
    /// Two workouts created in the same millisecond share an id.
    #[default]
    Timestamp,
    /// Random v4 UUID
    Uuid,
}

impl IdScheme {
    pub fn generate(&self, date: DateTime<Utc>) -> String {
        match self {
            IdScheme::Timestamp => timestamp_id(date),
            IdScheme::Uuid => Uuid::new_v4().simple().to_string(),
        }
    }
}

/// Last 10 characters of the millisecond timestamp
pub fn timestamp_id(date: DateTime<Utc>) -> String {
    let millis = date.timestamp_millis().to_string();
    let start = millis.len().saturating_sub(10);
    millis[start..].to_string()
}

// ============================================================================
// Workout
// ============================================================================

/// One logged exercise session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    id: String,
    date: DateTime<Utc>,
    coords: Coords,
    /// km
    distance: f64,
    /// minutes
    duration: f64,
    description: String,
    #[serde(default)]
    clicks: u32,
    #[serde(flatten)]
    kind: WorkoutKind,
}

impl Workout {
    /// Construct a workout with an explicit id and creation date.
    ///
    /// The description names the calendar day of `date` in its own time
    /// zone, so pass a [`Local`] time for the day the user sees. The date
    /// itself is stored in UTC.
    ///
    /// Never fails: zero or non-finite inputs yield `NaN`/`inf` metrics.
    pub fn new<Tz: TimeZone>(
        id: impl Into<String>,
        date: DateTime<Tz>,
        coords: Coords,
        distance: f64,
        duration: f64,
        activity: Activity,
    ) -> Self {
        let kind = match activity {
            Activity::Running { cadence } => WorkoutKind::Running {
                cadence,
                pace: duration / distance,
            },
            Activity::Cycling { elevation_gain } => WorkoutKind::Cycling {
                elevation_gain,
                speed: distance / (duration / 60.0),
            },
        };
        let description = describe(kind.workout_type(), &date);

        Self {
            id: id.into(),
            date: date.with_timezone(&Utc),
            coords,
            distance,
            duration,
            description,
            clicks: 0,
            kind,
        }
    }

    /// A running workout created now, with a timestamp id
    pub fn running(coords: Coords, distance: f64, duration: f64, cadence: f64) -> Self {
        let now = Local::now();
        Self::new(
            timestamp_id(now.with_timezone(&Utc)),
            now,
            coords,
            distance,
            duration,
            Activity::Running { cadence },
        )
    }

    /// A cycling workout created now, with a timestamp id
    pub fn cycling(coords: Coords, distance: f64, duration: f64, elevation_gain: f64) -> Self {
        let now = Local::now();
        Self::new(
            timestamp_id(now.with_timezone(&Utc)),
            now,
            coords,
            distance,
            duration,
            Activity::Cycling { elevation_gain },
        )
    }

    /// Record one interaction with this workout
    pub fn click(&mut self) {
        self.clicks += 1;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    pub fn cadence(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { cadence, .. } => Some(cadence),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    pub fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { pace, .. } => Some(pace),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    pub fn elevation_gain(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { elevation_gain, .. } => Some(elevation_gain),
            WorkoutKind::Running { .. } => None,
        }
    }

    pub fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { speed, .. } => Some(speed),
            WorkoutKind::Running { .. } => None,
        }
    }
}

/// `"Running on April 14"`
fn describe<Tz: TimeZone>(workout_type: WorkoutType, date: &DateTime<Tz>) -> String {
    format!(
        "{} on {} {}",
        workout_type.label(),
        MONTHS[date.month0() as usize],
        date.day()
    )
}
