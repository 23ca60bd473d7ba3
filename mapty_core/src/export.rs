//! CSV export of the workout list.
//!
//! One row per workout, variant-specific columns left empty for the
//! other variant. The file is rewritten on every export.

use crate::{Result, Workout};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    date: String,
    #[serde(rename = "type")]
    workout_type: &'static str,
    description: String,
    latitude: f64,
    longitude: f64,
    distance: f64,
    duration: f64,
    cadence: Option<f64>,
    pace: Option<f64>,
    elevation_gain: Option<f64>,
    speed: Option<f64>,
    clicks: u32,
}

impl From<&Workout> for CsvRow {
    fn from(workout: &Workout) -> Self {
        let coords = workout.coords();
        CsvRow {
            id: workout.id().to_string(),
            date: workout.date().to_rfc3339(),
            workout_type: workout.workout_type().as_str(),
            description: workout.description().to_string(),
            latitude: coords.lat,
            longitude: coords.lng,
            distance: workout.distance(),
            duration: workout.duration(),
            cadence: workout.cadence(),
            pace: workout.pace(),
            elevation_gain: workout.elevation_gain(),
            speed: workout.speed(),
            clicks: workout.clicks(),
        }
    }
}

/// Write every workout to `csv_path`, replacing the file
///
/// The header row is always written, even for an empty list. Returns
/// the number of workouts written.
pub fn export_csv(workouts: &[Workout], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(csv_path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record([
        "id",
        "date",
        "type",
        "description",
        "latitude",
        "longitude",
        "distance",
        "duration",
        "cadence",
        "pace",
        "elevation_gain",
        "speed",
        "clicks",
    ])?;

    for workout in workouts {
        writer.serialize(CsvRow::from(workout))?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} workouts to {:?}", workouts.len(), csv_path);
    Ok(workouts.len())
}
