//! The application controller.
//!
//! `App` owns the session state (workouts, map center, pending click)
//! and its collaborators. Hosts feed it events: position results, map
//! clicks, type changes, form submissions and list clicks. It answers by
//! driving the map, the page and the store.
//!
//! Startup runs two steps in order: position → map, then storage → list.
//! Loading the map always draws markers for every workout already held,
//! so markers appear no matter which step finishes first.

use crate::form::WorkoutForm;
use crate::ports::{Geolocator, MapView, Page, TileLayer};
use crate::render::{Marker, PanOptions, WorkoutEntry};
use crate::storage::{load_workouts, save_workouts, KeyValueStore};
use crate::{Coords, Error, GeolocationError, IdScheme, Result, Workout, WorkoutType};
use chrono::{Local, Utc};
use std::time::Duration;

/// Shown when the position request fails
pub const POSITION_ALERT: &str = "Could not get your position!";

/// Shown when form validation fails
pub const INVALID_INPUT_ALERT: &str = "Inputs have to be positive numbers!";

/// Controller parameters, usually built by [`crate::Config::settings`]
#[derive(Clone, Debug)]
pub struct Settings {
    pub zoom_level: u8,
    pub pan: PanOptions,
    pub tiles: TileLayer,
    pub storage_key: String,
    pub form_reset_delay: Duration,
    pub id_scheme: IdScheme,
}

/// Workout tracker controller
pub struct App<M, P, S> {
    settings: Settings,
    map: M,
    page: P,
    store: S,
    map_center: Option<Coords>,
    pending_click: Option<Coords>,
    workouts: Vec<Workout>,
}

impl<M: MapView, P: Page, S: KeyValueStore> App<M, P, S> {
    pub fn new(settings: Settings, map: M, page: P, store: S) -> Self {
        Self {
            settings,
            map,
            page,
            store,
            map_center: None,
            pending_click: None,
            workouts: Vec::new(),
        }
    }

    /// Request the position, load the map, then load stored workouts
    pub fn start<G: Geolocator + ?Sized>(&mut self, locator: &mut G) -> Result<()> {
        let position = locator.current_position();
        self.handle_position(position);
        self.load_stored()?;
        Ok(())
    }

    /// Deliver the outcome of a position request
    ///
    /// Failure is not retried: the user is alerted and the map stays
    /// unloaded for the rest of the session.
    pub fn handle_position(&mut self, position: std::result::Result<Coords, GeolocationError>) {
        match position {
            Ok(center) => self.load_map(center),
            Err(e) => {
                tracing::warn!("Position request failed: {}", e);
                self.page.alert(POSITION_ALERT);
            }
        }
    }

    fn load_map(&mut self, center: Coords) {
        self.map
            .load(center, self.settings.zoom_level, &self.settings.tiles);
        self.map_center = Some(center);
        tracing::info!(
            "Map loaded at {} (zoom {})",
            center,
            self.settings.zoom_level
        );

        for workout in &self.workouts {
            self.map.add_marker(&Marker::for_workout(workout));
        }
    }

    /// Rehydrate stored workouts and render them
    ///
    /// Replaces the in-memory list. Returns how many workouts were loaded.
    pub fn load_stored(&mut self) -> Result<usize> {
        let stored = load_workouts(&self.store, &self.settings.storage_key)?;

        for workout in &stored {
            self.page.insert_workout(&WorkoutEntry::for_workout(workout));
            if self.map_center.is_some() {
                self.map.add_marker(&Marker::for_workout(workout));
            }
        }

        tracing::info!("Loaded {} stored workouts", stored.len());
        let count = stored.len();
        self.workouts = stored;
        Ok(count)
    }

    /// A click on the map: remember where, then open the form
    pub fn handle_map_click(&mut self, coords: Coords) -> Result<()> {
        if self.map_center.is_none() {
            return Err(Error::MapNotLoaded);
        }
        self.pending_click = Some(coords);
        self.page.show_form();
        tracing::debug!("Map clicked at {}", coords);
        Ok(())
    }

    /// The form's type selector changed
    pub fn handle_type_change(&mut self, workout_type: WorkoutType) {
        self.page.show_fields_for(workout_type);
    }

    /// Validate the form and record a workout at the pending click
    ///
    /// On invalid input the user is alerted, the form stays open and
    /// nothing else changes. On success the marker is drawn, then the
    /// list entry, then the form is hidden, then the list is persisted.
    pub fn submit_workout(&mut self, form: &WorkoutForm) -> Result<Workout> {
        let coords = self.pending_click.ok_or(Error::NoPendingClick)?;

        let input = match form.validate() {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("Rejected workout form: {}", e);
                self.page.alert(INVALID_INPUT_ALERT);
                return Err(e);
            }
        };

        let now = Local::now();
        let workout = Workout::new(
            self.settings.id_scheme.generate(now.with_timezone(&Utc)),
            now,
            coords,
            input.distance,
            input.duration,
            input.activity,
        );
        self.workouts.push(workout.clone());

        self.map.add_marker(&Marker::for_workout(&workout));
        self.page.insert_workout(&WorkoutEntry::for_workout(&workout));
        self.page.hide_form(self.settings.form_reset_delay);
        self.save()?;

        tracing::info!("Added workout {}: {}", workout.id(), workout.description());
        Ok(workout)
    }

    /// A click on a list entry: pan the map to that workout
    ///
    /// The first workout with a matching id wins.
    pub fn focus_workout(&mut self, id: &str) -> Result<()> {
        if self.map_center.is_none() {
            return Err(Error::MapNotLoaded);
        }

        let workout = self
            .workouts
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or_else(|| Error::WorkoutNotFound(id.to_string()))?;
        workout.click();
        let target = workout.coords();

        self.map
            .set_view(target, self.settings.zoom_level, &self.settings.pan);
        self.save()?;
        Ok(())
    }

    /// Wipe storage and start over from scratch
    pub fn reset<G: Geolocator + ?Sized>(&mut self, locator: &mut G) -> Result<()> {
        self.store.remove(&self.settings.storage_key)?;
        self.page.clear_workouts();
        if self.map_center.take().is_some() {
            self.map.remove();
        }
        self.pending_click = None;
        self.workouts.clear();
        tracing::info!("Reset: stored workouts removed");

        self.start(locator)
    }

    fn save(&mut self) -> Result<()> {
        save_workouts(&mut self.store, &self.settings.storage_key, &self.workouts)
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn find(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn is_map_loaded(&self) -> bool {
        self.map_center.is_some()
    }

    pub fn map_center(&self) -> Option<Coords> {
        self.map_center
    }

    pub fn pending_click(&self) -> Option<Coords> {
        self.pending_click
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::StaticLocator;
    use crate::storage::MemoryStore;
    use crate::{Activity, WorkoutKind};
    use chrono::Datelike;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct RecordingMap {
        log: Log,
        markers: Vec<Marker>,
        views: Vec<(Coords, u8, PanOptions)>,
        loaded_at: Option<(Coords, u8)>,
    }

    impl MapView for RecordingMap {
        fn load(&mut self, center: Coords, zoom: u8, _tiles: &TileLayer) {
            self.log.borrow_mut().push("map.load".into());
            self.loaded_at = Some((center, zoom));
        }

        fn add_marker(&mut self, marker: &Marker) {
            self.log.borrow_mut().push("map.marker".into());
            self.markers.push(marker.clone());
        }

        fn set_view(&mut self, target: Coords, zoom: u8, pan: &PanOptions) {
            self.log.borrow_mut().push("map.view".into());
            self.views.push((target, zoom, *pan));
        }

        fn remove(&mut self) {
            self.log.borrow_mut().push("map.remove".into());
            self.markers.clear();
            self.loaded_at = None;
        }
    }

    #[derive(Default)]
    struct RecordingPage {
        log: Log,
        entries: Vec<WorkoutEntry>,
        alerts: Vec<String>,
        form_visible: bool,
        fields_for: Option<WorkoutType>,
    }

    impl Page for RecordingPage {
        fn show_form(&mut self) {
            self.form_visible = true;
        }

        fn hide_form(&mut self, _restore_after: Duration) {
            self.log.borrow_mut().push("page.hide_form".into());
            self.form_visible = false;
        }

        fn show_fields_for(&mut self, workout_type: WorkoutType) {
            self.fields_for = Some(workout_type);
        }

        fn insert_workout(&mut self, entry: &WorkoutEntry) {
            self.log.borrow_mut().push("page.entry".into());
            self.entries.push(entry.clone());
        }

        fn clear_workouts(&mut self) {
            self.entries.clear();
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        log: Log,
        inner: MemoryStore,
    }

    impl KeyValueStore for RecordingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.log.borrow_mut().push("store.set".into());
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.log.borrow_mut().push("store.remove".into());
            self.inner.remove(key)
        }
    }

    type TestApp = App<RecordingMap, RecordingPage, RecordingStore>;

    fn settings() -> Settings {
        Settings::default()
    }

    fn new_app(log: &Log, store: MemoryStore) -> TestApp {
        App::new(
            settings(),
            RecordingMap {
                log: log.clone(),
                ..Default::default()
            },
            RecordingPage {
                log: log.clone(),
                ..Default::default()
            },
            RecordingStore {
                log: log.clone(),
                inner: store,
            },
        )
    }

    fn home() -> StaticLocator {
        StaticLocator::new(Some(Coords::new(40.0, -70.0)))
    }

    fn started_app() -> (TestApp, Log) {
        let log = Log::default();
        let mut app = new_app(&log, MemoryStore::new());
        app.start(&mut home()).unwrap();
        (app, log)
    }

    fn stored(workouts: &[Workout]) -> MemoryStore {
        let mut store = MemoryStore::new();
        save_workouts(&mut store, "workouts", workouts).unwrap();
        store
    }

    #[test]
    fn test_start_loads_map_at_position() {
        let (app, _) = started_app();
        assert!(app.is_map_loaded());
        assert_eq!(app.map().loaded_at, Some((Coords::new(40.0, -70.0), 13)));
        assert!(app.workouts().is_empty());
        assert!(app.page().alerts.is_empty());
    }

    #[test]
    fn test_position_failure_alerts_and_leaves_map_unloaded() {
        crate::logging::init_test();
        let log = Log::default();
        let mut app = new_app(&log, MemoryStore::new());
        app.start(&mut StaticLocator::default()).unwrap();

        assert!(!app.is_map_loaded());
        assert_eq!(app.page().alerts, vec![POSITION_ALERT.to_string()]);
        assert!(matches!(
            app.handle_map_click(Coords::new(1.0, 1.0)),
            Err(Error::MapNotLoaded)
        ));
    }

    #[test]
    fn test_submit_running_scenario() {
        let (mut app, _) = started_app();
        app.handle_map_click(Coords::new(40.0, -70.0)).unwrap();
        assert!(app.page().form_visible);

        let workout = app
            .submit_workout(&WorkoutForm::running("5", "25", "180"))
            .unwrap();

        assert_eq!(workout.pace(), Some(5.0));
        assert_eq!(workout.coords(), Coords::new(40.0, -70.0));
        assert!(workout.description().starts_with("Running on "));
        let local_day = workout.date().with_timezone(&Local).day();
        assert!(workout
            .description()
            .ends_with(&format!(" {}", local_day)));
        assert_eq!(app.workouts().len(), 1);
        assert!(!app.page().form_visible);
        assert_eq!(app.map().markers.len(), 1);
        assert_eq!(app.page().entries.len(), 1);
    }

    #[test]
    fn test_submit_cycling_with_negative_elevation() {
        let (mut app, _) = started_app();
        app.handle_map_click(Coords::new(41.0, -71.0)).unwrap();

        let workout = app
            .submit_workout(&WorkoutForm::cycling("20", "60", "-10"))
            .unwrap();

        assert_eq!(workout.speed(), Some(20.0));
        assert_eq!(workout.elevation_gain(), Some(-10.0));
    }

    #[test]
    fn test_invalid_input_changes_nothing() {
        let (mut app, log) = started_app();
        app.handle_map_click(Coords::new(40.0, -70.0)).unwrap();
        let events_before = log.borrow().len();

        let result = app.submit_workout(&WorkoutForm::running("abc", "25", "180"));

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(app.workouts().is_empty());
        assert_eq!(app.page().alerts, vec![INVALID_INPUT_ALERT.to_string()]);
        assert!(app.page().form_visible);
        assert_eq!(log.borrow().len(), events_before);
        assert_eq!(app.store().get("workouts").unwrap(), None);
    }

    #[test]
    fn test_submit_without_click_is_rejected() {
        let (mut app, _) = started_app();
        let result = app.submit_workout(&WorkoutForm::running("5", "25", "180"));
        assert!(matches!(result, Err(Error::NoPendingClick)));
        assert!(app.workouts().is_empty());
    }

    #[test]
    fn test_submission_order_marker_entry_form_store() {
        let (mut app, log) = started_app();
        app.handle_map_click(Coords::new(40.0, -70.0)).unwrap();
        log.borrow_mut().clear();

        app.submit_workout(&WorkoutForm::running("5", "25", "180"))
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["map.marker", "page.entry", "page.hide_form", "store.set"]
        );
    }

    #[test]
    fn test_every_submission_persists_full_list() {
        let (mut app, _) = started_app();
        app.handle_map_click(Coords::new(40.0, -70.0)).unwrap();
        app.submit_workout(&WorkoutForm::running("5", "25", "180"))
            .unwrap();
        app.handle_map_click(Coords::new(40.5, -70.5)).unwrap();
        app.submit_workout(&WorkoutForm::cycling("20", "60", "100"))
            .unwrap();

        let persisted = load_workouts(app.store(), "workouts").unwrap();
        assert_eq!(persisted, app.workouts());
        assert_eq!(persisted[0].workout_type(), WorkoutType::Running);
        assert_eq!(persisted[1].workout_type(), WorkoutType::Cycling);
    }

    #[test]
    fn test_restart_rehydrates_list_and_markers() {
        let first = Workout::new(
            "0000000001",
            Utc::now(),
            Coords::new(40.0, -70.0),
            5.0,
            25.0,
            Activity::Running { cadence: 180.0 },
        );
        let second = Workout::new(
            "0000000002",
            Utc::now(),
            Coords::new(40.2, -70.2),
            20.0,
            60.0,
            Activity::Cycling {
                elevation_gain: -10.0,
            },
        );
        let expected_entries = vec![
            WorkoutEntry::for_workout(&first),
            WorkoutEntry::for_workout(&second),
        ];

        let log = Log::default();
        let mut app = new_app(&log, stored(&[first, second]));
        app.start(&mut home()).unwrap();

        assert_eq!(app.workouts().len(), 2);
        assert_eq!(app.page().entries, expected_entries);
        assert_eq!(app.map().markers.len(), 2);
    }

    #[test]
    fn test_markers_drawn_when_map_loads_after_storage() {
        let workout = Workout::running(Coords::new(40.0, -70.0), 5.0, 25.0, 180.0);
        let log = Log::default();
        let mut app = new_app(&log, stored(&[workout]));

        app.load_stored().unwrap();
        assert!(app.map().markers.is_empty());
        assert_eq!(app.page().entries.len(), 1);

        app.handle_position(Ok(Coords::new(40.0, -70.0)));
        assert_eq!(app.map().markers.len(), 1);
    }

    #[test]
    fn test_focus_pans_and_counts_click() {
        let (mut app, _) = started_app();
        app.handle_map_click(Coords::new(45.0, -75.0)).unwrap();
        let workout = app
            .submit_workout(&WorkoutForm::running("5", "25", "180"))
            .unwrap();

        app.focus_workout(workout.id()).unwrap();
        app.focus_workout(workout.id()).unwrap();

        let (target, zoom, pan) = app.map().views[0];
        assert_eq!(target, Coords::new(45.0, -75.0));
        assert_eq!(zoom, 13);
        assert!(pan.animate);
        assert_eq!(pan.duration, 1.0);
        assert_eq!(app.find(workout.id()).unwrap().clicks(), 2);

        let persisted = load_workouts(app.store(), "workouts").unwrap();
        assert_eq!(persisted[0].clicks(), 2);
    }

    #[test]
    fn test_focus_unknown_id() {
        let (mut app, _) = started_app();
        assert!(matches!(
            app.focus_workout("nope"),
            Err(Error::WorkoutNotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_focus_duplicate_id_first_match_wins() {
        let date = Utc::now();
        let a = Workout::new(
            "dup",
            date,
            Coords::new(1.0, 1.0),
            5.0,
            25.0,
            Activity::Running { cadence: 180.0 },
        );
        let b = Workout::new(
            "dup",
            date,
            Coords::new(2.0, 2.0),
            5.0,
            25.0,
            Activity::Running { cadence: 180.0 },
        );
        let log = Log::default();
        let mut app = new_app(&log, stored(&[a, b]));
        app.start(&mut home()).unwrap();

        app.focus_workout("dup").unwrap();
        assert_eq!(app.map().views[0].0, Coords::new(1.0, 1.0));
        assert_eq!(app.workouts()[0].clicks(), 1);
        assert_eq!(app.workouts()[1].clicks(), 0);
    }

    #[test]
    fn test_rehydrated_derived_fields_are_not_recomputed() {
        let blob = r#"[{"id":"7","date":"2024-04-14T09:30:00Z","coords":[1,2],
            "distance":10,"duration":50,"type":"running",
            "description":"Running on April 14","clicks":0,"cadence":170,"pace":99}]"#;
        let mut store = MemoryStore::new();
        store.set("workouts", blob).unwrap();

        let log = Log::default();
        let mut app = new_app(&log, store);
        app.start(&mut home()).unwrap();

        assert_eq!(
            app.workouts()[0].kind(),
            &WorkoutKind::Running {
                cadence: 170.0,
                pace: 99.0
            }
        );
    }

    #[test]
    fn test_type_change_toggles_fields() {
        let (mut app, _) = started_app();
        app.handle_type_change(WorkoutType::Cycling);
        assert_eq!(app.page().fields_for, Some(WorkoutType::Cycling));
    }

    #[test]
    fn test_reset_clears_everything_and_restarts() {
        let (mut app, log) = started_app();
        app.handle_map_click(Coords::new(40.0, -70.0)).unwrap();
        app.submit_workout(&WorkoutForm::running("5", "25", "180"))
            .unwrap();
        log.borrow_mut().clear();

        app.reset(&mut home()).unwrap();

        assert!(app.workouts().is_empty());
        assert!(app.page().entries.is_empty());
        assert!(app.map().markers.is_empty());
        assert_eq!(app.pending_click(), None);
        assert!(app.is_map_loaded());
        assert_eq!(app.store().get("workouts").unwrap(), None);
        assert_eq!(
            *log.borrow(),
            vec!["store.remove", "map.remove", "map.load"]
        );
    }

    #[test]
    fn test_overflowing_pace_is_rejected_and_history_survives_restart() {
        crate::logging::init_test();
        let (mut app, _) = started_app();
        app.handle_map_click(Coords::new(40.0, -70.0)).unwrap();
        app.submit_workout(&WorkoutForm::running("5", "25", "180"))
            .unwrap();
        app.submit_workout(&WorkoutForm::cycling("20", "60", "10"))
            .unwrap();

        let result = app.submit_workout(&WorkoutForm::running("1e-320", "25", "180"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(app.page().alerts, vec![INVALID_INPUT_ALERT.to_string()]);
        assert_eq!(app.workouts().len(), 2);

        let log = Log::default();
        let mut restarted = new_app(&log, app.store().inner.clone());
        restarted.start(&mut home()).unwrap();
        assert_eq!(restarted.workouts(), app.workouts());
    }

    #[test]
    fn test_uuid_ids_do_not_collide() {
        let log = Log::default();
        let mut app = App::new(
            Settings {
                id_scheme: IdScheme::Uuid,
                ..settings()
            },
            RecordingMap::default(),
            RecordingPage::default(),
            RecordingStore {
                log: log.clone(),
                inner: MemoryStore::new(),
            },
        );
        app.start(&mut home()).unwrap();
        app.handle_map_click(Coords::new(40.0, -70.0)).unwrap();
        let a = app
            .submit_workout(&WorkoutForm::running("5", "25", "180"))
            .unwrap();
        let b = app
            .submit_workout(&WorkoutForm::running("6", "30", "180"))
            .unwrap();
        assert_ne!(a.id(), b.id());
    }
}
