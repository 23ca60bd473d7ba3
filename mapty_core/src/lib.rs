#![forbid(unsafe_code)]

//! Core domain model and controller for the Mapty workout tracker.
//!
//! This crate provides:
//! - Workout model (running and cycling, derived pace/speed)
//! - Form parsing and validation
//! - Collaborator traits for the map, page and position service
//! - Persistence over a key-value store
//! - The `App` controller tying them together
//! - CSV export

pub mod workout;
pub mod error;
pub mod form;
pub mod render;
pub mod ports;
pub mod storage;
pub mod config;
pub mod logging;
pub mod app;
pub mod export;

// Re-export commonly used types
pub use error::{Error, GeolocationError, Result};
pub use workout::*;
pub use form::{ValidatedWorkout, WorkoutForm};
pub use render::{Marker, PanOptions, WorkoutEntry};
pub use ports::{Geolocator, MapView, Page, StaticLocator, TileLayer};
pub use storage::{load_workouts, save_workouts, FileStore, KeyValueStore, MemoryStore};
pub use config::Config;
pub use app::{App, Settings};
pub use export::export_csv;
