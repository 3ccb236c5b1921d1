//! Application state management for Garage.
//!
//! `App` owns the services, the query caches, and the page states. Network
//! work runs in spawned tasks that report back through an MPSC channel; the
//! main loop drains it each tick, so UI state is only mutated on one thread.

use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::join;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use garage_core::cache::{fetch_with_retry, PersistedStore, QueryCache, QueryKey, QueryPolicy};
use garage_core::cache::store::{CARS_SEARCH_TERM, OWNERS_SEARCH_TERM};
use garage_core::models::{CarStatistics, CarWithOwner, EntityKind, Owner, OwnerStatistics};
use garage_core::services::{AuthContext, Services};
use garage_core::{ApiClient, Config};

use crate::pages::cars::{CarListRequest, CarMutation};
use crate::pages::owners::{OwnerListRequest, OwnerMutation};
use crate::pages::{CarsPage, DashboardPage, MutationKind, OwnersPage};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: isize = 6;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Cars,
    Owners,
    Dashboard,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Cars => "Автомобили",
            Tab::Owners => "Владельцы",
            Tab::Dashboard => "Статистика",
        }
    }

    /// Name stored in the config file.
    pub fn key(&self) -> &'static str {
        match self {
            Tab::Cars => "cars",
            Tab::Owners => "owners",
            Tab::Dashboard => "dashboard",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "cars" => Some(Tab::Cars),
            "owners" => Some(Tab::Owners),
            "dashboard" => Some(Tab::Dashboard),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Cars => Tab::Owners,
            Tab::Owners => Tab::Dashboard,
            Tab::Dashboard => Tab::Cars,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Tab::Cars => Tab::Dashboard,
            Tab::Owners => Tab::Cars,
            Tab::Dashboard => Tab::Owners,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from spawned tasks back to the main loop.
#[derive(Debug)]
enum BackgroundResult {
    Cars(QueryKey, Result<Vec<CarWithOwner>, String>),
    Owners(QueryKey, Result<Vec<Owner>, String>),
    CarStatistics(QueryKey, Result<CarStatistics, String>),
    OwnerStatistics(QueryKey, Result<Vec<OwnerStatistics>, String>),
    Mutation {
        entity: EntityKind,
        kind: MutationKind,
        result: Result<String, String>,
    },
}

/// Entities whose cached queries go stale after a mutation of `entity`.
///
/// Owners embed their cars and cars carry their owner's name, and deleting
/// an owner removes its cars, so both sides are always refreshed.
fn affected_entities(entity: EntityKind) -> [EntityKind; 2] {
    match entity {
        EntityKind::Cars => [EntityKind::Cars, EntityKind::Owners],
        EntityKind::Owners => [EntityKind::Owners, EntityKind::Cars],
    }
}

fn failure_prefix(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Create | MutationKind::Update => "Ошибка при сохранении",
        MutationKind::Delete => "Ошибка при удалении",
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub services: Services,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub cars: CarsPage,
    pub owners: OwnersPage,
    pub dashboard: DashboardPage,
    /// Incremented every loop iteration, drives the spinner.
    pub tick: u64,

    // Query caches
    pub car_cache: QueryCache<Vec<CarWithOwner>>,
    pub owner_cache: QueryCache<Vec<Owner>>,
    pub car_stats: QueryCache<CarStatistics>,
    pub owner_stats: QueryCache<Vec<OwnerStatistics>>,

    // Background task channel
    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    /// Create a new application instance from the loaded config.
    pub fn new(config: Config) -> Result<Self> {
        let base_url = config.base_url();
        info!(%base_url, "Using backend");
        let api = ApiClient::new(&base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;

        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");
        let store = PersistedStore::in_dir(&cache_dir);

        let services = Services::init(&config, AuthContext::from_env(), store);
        Ok(Self::from_parts(config, api, services))
    }

    pub fn from_parts(config: Config, api: ApiClient, services: Services) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let cars_term: String = services.store.get(CARS_SEARCH_TERM).unwrap_or_default();
        let owners_term: String = services.store.get(OWNERS_SEARCH_TERM).unwrap_or_default();
        let current_tab = config
            .last_tab
            .as_deref()
            .and_then(Tab::from_key)
            .unwrap_or(Tab::Cars);

        Self {
            config,
            api,
            services,

            state: AppState::Normal,
            current_tab,
            cars: CarsPage::new(cars_term),
            owners: OwnersPage::new(owners_term),
            dashboard: DashboardPage::default(),
            tick: 0,

            car_cache: QueryCache::new(),
            owner_cache: QueryCache::new(),
            car_stats: QueryCache::new(),
            owner_stats: QueryCache::new(),

            result_rx: rx,
            result_tx: tx,
        }
    }

    /// Persist state that should survive a restart.
    pub fn shutdown(&mut self) {
        self.persist_search_terms();
        self.config.last_tab = Some(self.current_tab.key().to_string());
        self.services.dispose(&mut self.config);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// Search term of the current tab; the dashboard has none.
    pub fn search_term(&self) -> Option<&str> {
        match self.current_tab {
            Tab::Cars => Some(&self.cars.list.term),
            Tab::Owners => Some(&self.owners.list.term),
            Tab::Dashboard => None,
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        match self.current_tab {
            Tab::Cars => {
                self.cars.list.set_term(term);
            }
            Tab::Owners => {
                self.owners.list.set_term(term);
            }
            Tab::Dashboard => {}
        }
    }

    pub fn persist_search_terms(&mut self) {
        let terms = [
            (CARS_SEARCH_TERM, self.cars.list.term.trim().to_string()),
            (OWNERS_SEARCH_TERM, self.owners.list.term.trim().to_string()),
        ];
        for (key, term) in terms {
            let result = if term.is_empty() {
                self.services.store.remove(key)
            } else {
                self.services.store.set(key, &term)
            };
            if let Err(e) = result {
                warn!(key, error = %e, "Failed to persist search term");
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Per-iteration housekeeping: advance the spinner, drop expired
    /// notifications, then sync queries.
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.services.notifications.current(Instant::now());
        self.sync_queries();
    }

    /// Observe the queries the current view depends on and start fetches
    /// for those that are missing, stale, or invalidated.
    pub fn sync_queries(&mut self) {
        let now = Instant::now();
        match self.current_tab {
            Tab::Cars => {
                let key = self.cars.list.query_key();
                if self.car_cache.observe(&key, QueryPolicy::LIST, now) {
                    self.spawn_car_list(key);
                }
                // The car form needs the owner list for its selector
                if self.cars.list.modal.is_form() {
                    self.observe_owner_list(OwnersPage::all_owners_key(), now);
                }
            }
            Tab::Owners => {
                let key = self.owners.list.query_key();
                self.observe_owner_list(key, now);
            }
            Tab::Dashboard => {
                let car_key = DashboardPage::car_key();
                let owner_key = DashboardPage::owner_key();
                let cars = self
                    .car_stats
                    .observe(&car_key, QueryPolicy::APP_DEFAULT, now)
                    .then_some(car_key);
                let owners = self
                    .owner_stats
                    .observe(&owner_key, QueryPolicy::APP_DEFAULT, now)
                    .then_some(owner_key);
                self.spawn_statistics(cars, owners);
            }
        }

        self.car_cache.collect_garbage(now);
        self.owner_cache.collect_garbage(now);
        self.car_stats.collect_garbage(now);
        self.owner_stats.collect_garbage(now);
    }

    fn observe_owner_list(&mut self, key: QueryKey, now: Instant) {
        if self.owner_cache.observe(&key, QueryPolicy::LIST, now) {
            self.spawn_owner_list(key);
        }
    }

    /// Helper to send background results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - channel closed");
        }
    }

    fn spawn_car_list(&mut self, key: QueryKey) {
        if !self.car_cache.begin_fetch(&key, Instant::now()) {
            return;
        }
        let request = CarListRequest::for_term(key.term(), self.config.effective_page_size());
        debug!(%key, ?request, "Fetching cars");
        let api = self.api.clone();
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            let result = fetch_with_retry(QueryPolicy::LIST, "cars", || request.run(&api))
                .await
                .map_err(|e| e.user_message());
            Self::send_result(&tx, BackgroundResult::Cars(key, result)).await;
        });
    }

    fn spawn_owner_list(&mut self, key: QueryKey) {
        if !self.owner_cache.begin_fetch(&key, Instant::now()) {
            return;
        }
        let request = OwnerListRequest::for_term(key.term());
        debug!(%key, ?request, "Fetching owners");
        let api = self.api.clone();
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            let result = fetch_with_retry(QueryPolicy::LIST, "owners", || request.run(&api))
                .await
                .map_err(|e| e.user_message());
            Self::send_result(&tx, BackgroundResult::Owners(key, result)).await;
        });
    }

    /// Fetch both statistics concurrently in one task. Keys that are
    /// already in flight are skipped.
    fn spawn_statistics(&mut self, cars: Option<QueryKey>, owners: Option<QueryKey>) {
        let now = Instant::now();
        let cars = cars.filter(|key| self.car_stats.begin_fetch(key, now));
        let owners = owners.filter(|key| self.owner_stats.begin_fetch(key, now));
        if cars.is_none() && owners.is_none() {
            return;
        }
        debug!(cars = cars.is_some(), owners = owners.is_some(), "Fetching statistics");
        let api = self.api.clone();
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            let api = &api;
            let car_fetch = async move {
                match cars {
                    Some(key) => {
                        let result = fetch_with_retry(QueryPolicy::APP_DEFAULT, "car statistics", || {
                            api.car_statistics()
                        })
                        .await
                        .map_err(|e| e.user_message());
                        Some(BackgroundResult::CarStatistics(key, result))
                    }
                    None => None,
                }
            };
            let owner_fetch = async move {
                match owners {
                    Some(key) => {
                        let result = fetch_with_retry(QueryPolicy::APP_DEFAULT, "owner statistics", || {
                            api.owner_statistics()
                        })
                        .await
                        .map_err(|e| e.user_message());
                        Some(BackgroundResult::OwnerStatistics(key, result))
                    }
                    None => None,
                }
            };

            let (car_result, owner_result) = join(car_fetch, owner_fetch).await;
            for result in [car_result, owner_result].into_iter().flatten() {
                Self::send_result(&tx, result).await;
            }
        });
    }

    /// Mark every cached query of `entity` for refetch.
    pub fn invalidate(&mut self, entity: EntityKind) {
        match entity {
            EntityKind::Cars => {
                self.car_cache.invalidate_entity(entity);
                self.car_stats.invalidate_entity(entity);
            }
            EntityKind::Owners => {
                self.owner_cache.invalidate_entity(entity);
                self.owner_stats.invalidate_entity(entity);
            }
        }
    }

    /// "Try again" / manual refresh of the current view.
    pub fn refresh_current(&mut self) {
        match self.current_tab {
            Tab::Cars => self.invalidate(EntityKind::Cars),
            Tab::Owners => self.invalidate(EntityKind::Owners),
            Tab::Dashboard => {
                self.invalidate(EntityKind::Cars);
                self.invalidate(EntityKind::Owners);
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn open_car_create(&mut self) {
        let owners = self.known_owners();
        self.cars.open_create(&owners);
    }

    pub fn open_car_edit(&mut self, car: CarWithOwner) {
        let owners = self.known_owners();
        self.cars.open_edit(car, &owners);
    }

    fn known_owners(&self) -> Vec<Owner> {
        self.owner_cache
            .data(&OwnersPage::all_owners_key())
            .cloned()
            .unwrap_or_default()
    }

    pub fn submit_car_form(&mut self) {
        if let Some(mutation) = self.cars.submit() {
            self.spawn_car_mutation(mutation);
        }
    }

    pub fn confirm_car_delete(&mut self) {
        if let Some(mutation) = self.cars.confirm_delete() {
            self.spawn_car_mutation(mutation);
        }
    }

    pub fn submit_owner_form(&mut self) {
        if let Some(mutation) = self.owners.submit() {
            self.spawn_owner_mutation(mutation);
        }
    }

    pub fn confirm_owner_delete(&mut self) {
        if let Some(mutation) = self.owners.confirm_delete() {
            self.spawn_owner_mutation(mutation);
        }
    }

    fn spawn_car_mutation(&self, mutation: CarMutation) {
        let kind = mutation.kind();
        info!(?kind, "Sending car mutation");
        let api = self.api.clone();
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            let result = mutation.run(&api).await.map_err(|e| e.user_message());
            Self::send_result(
                &tx,
                BackgroundResult::Mutation {
                    entity: EntityKind::Cars,
                    kind,
                    result,
                },
            )
            .await;
        });
    }

    fn spawn_owner_mutation(&self, mutation: OwnerMutation) {
        let kind = mutation.kind();
        info!(?kind, "Sending owner mutation");
        let api = self.api.clone();
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            let result = mutation.run(&api).await.map_err(|e| e.user_message());
            Self::send_result(
                &tx,
                BackgroundResult::Mutation {
                    entity: EntityKind::Owners,
                    kind,
                    result,
                },
            )
            .await;
        });
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Drain finished background tasks and apply their results.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_result(result);
        }
    }

    fn process_result(&mut self, result: BackgroundResult) {
        let now = Instant::now();
        match result {
            BackgroundResult::Cars(key, result) => {
                self.car_cache.complete(&key, result, now, Utc::now());
                self.cars.list.note_loaded(&key, &self.car_cache);
            }
            BackgroundResult::Owners(key, result) => {
                self.owner_cache.complete(&key, result, now, Utc::now());
                self.owners.list.note_loaded(&key, &self.owner_cache);
                if key == OwnersPage::all_owners_key() {
                    if let Some(owners) = self.owner_cache.data(&key) {
                        self.cars.form.set_owner_choices(owners);
                    }
                }
            }
            BackgroundResult::CarStatistics(key, result) => {
                self.car_stats.complete(&key, result, now, Utc::now());
            }
            BackgroundResult::OwnerStatistics(key, result) => {
                self.owner_stats.complete(&key, result, now, Utc::now());
            }
            BackgroundResult::Mutation {
                entity,
                kind,
                result,
            } => {
                match entity {
                    EntityKind::Cars => self.cars.mutation_finished(kind, &result),
                    EntityKind::Owners => self.owners.mutation_finished(kind, &result),
                }
                match result {
                    Ok(message) => {
                        for affected in affected_entities(entity) {
                            self.invalidate(affected);
                        }
                        self.services.notifications.push_success(message, now);
                    }
                    Err(message) => {
                        error!(%entity, ?kind, error = %message, "Mutation failed");
                        self.services
                            .notifications
                            .push_error(format!("{}: {}", failure_prefix(kind), message), now);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Display helpers
    // =========================================================================

    /// Age of the data shown on the current tab, for the status bar.
    pub fn data_age(&self) -> Option<String> {
        let wall = Utc::now();
        match self.current_tab {
            Tab::Cars => self
                .car_cache
                .entry(&self.cars.list.query_key())
                .and_then(|e| e.age_display(wall)),
            Tab::Owners => self
                .owner_cache
                .entry(&self.owners.list.query_key())
                .and_then(|e| e.age_display(wall)),
            Tab::Dashboard => self
                .car_stats
                .entry(&DashboardPage::car_key())
                .and_then(|e| e.age_display(wall)),
        }
    }

    /// Whether any query of the current tab is in flight.
    pub fn is_busy(&self) -> bool {
        match self.current_tab {
            Tab::Cars => self.car_cache.is_fetching(&self.cars.list.query_key()),
            Tab::Owners => self.owner_cache.is_fetching(&self.owners.list.query_key()),
            Tab::Dashboard => {
                self.car_stats.is_fetching(&DashboardPage::car_key())
                    || self.owner_stats.is_fetching(&DashboardPage::owner_key())
            }
        }
    }

    pub fn any_modal_open(&self) -> bool {
        match self.current_tab {
            Tab::Cars => self.cars.list.modal.is_open(),
            Tab::Owners => self.owners.list.modal.is_open(),
            Tab::Dashboard => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{Path, Query, State};
    use axum::routing::get;
    use axum::{Json, Router};
    use garage_core::models::Car;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use crate::pages::Modal;

    fn app_with(base_url: &str, dir: &TempDir) -> App {
        let config = Config::default();
        let api = ApiClient::new(base_url).unwrap();
        let services = Services::init(
            &config,
            AuthContext::default(),
            PersistedStore::in_dir(dir.path()),
        );
        App::from_parts(config, api, services)
    }

    fn car_json(id: i64, brand: &str) -> Value {
        json!({
            "id": id, "brand": brand, "model": "M", "color": "Белый",
            "registrationNumber": format!("{}XYZ01", id), "modelYear": 2020,
            "price": 1000000, "owner_id": 1, "owner": "Иван Петров"
        })
    }

    fn owner() -> Owner {
        Owner {
            ownerid: 1,
            firstname: "Иван".to_string(),
            lastname: "Петров".to_string(),
            cars: vec![Car {
                id: 1,
                brand: "Lada".to_string(),
                model: "Vesta".to_string(),
                color: "Серый".to_string(),
                registration_number: "1AAA01".to_string(),
                model_year: 2019,
                price: 5_000_000,
                owner_id: 1,
            }],
        }
    }

    #[test]
    fn test_tab_cycle_and_keys() {
        assert_eq!(Tab::Cars.next(), Tab::Owners);
        assert_eq!(Tab::Cars.prev(), Tab::Dashboard);
        for tab in [Tab::Cars, Tab::Owners, Tab::Dashboard] {
            assert_eq!(Tab::from_key(tab.key()), Some(tab));
        }
        assert_eq!(Tab::from_key("garage"), None);
    }

    #[test]
    fn test_search_terms_restored_from_store() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = PersistedStore::in_dir(dir.path());
            store.set(CARS_SEARCH_TERM, &"Toyota").unwrap();
        }
        let app = app_with("http://127.0.0.1:9", &dir);
        assert_eq!(app.cars.list.term, "Toyota");
        assert_eq!(app.owners.list.term, "");
    }

    #[test]
    fn test_cleared_search_term_is_removed_from_store() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with("http://127.0.0.1:9", &dir);
        app.set_search_term("Kia".to_string());
        app.persist_search_terms();
        assert_eq!(
            PersistedStore::in_dir(dir.path()).get::<String>(CARS_SEARCH_TERM).as_deref(),
            Some("Kia")
        );

        app.set_search_term(String::new());
        app.persist_search_terms();
        let reopened = PersistedStore::in_dir(dir.path());
        assert_eq!(reopened.get::<String>(CARS_SEARCH_TERM), None);
        assert_eq!(reopened.get::<String>(OWNERS_SEARCH_TERM), None);
    }

    #[test]
    fn test_successful_mutation_invalidates_both_entities() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with("http://127.0.0.1:9", &dir);
        let now = Instant::now();
        let car_key = app.cars.list.query_key();
        let owner_key = app.owners.list.query_key();
        app.car_cache.complete(&car_key, Ok(vec![]), now, Utc::now());
        app.owner_cache.complete(&owner_key, Ok(vec![owner()]), now, Utc::now());
        assert!(!app.owner_cache.observe(&owner_key, QueryPolicy::LIST, now));

        app.owners.open_delete(owner());
        let mutation = app.owners.confirm_delete().unwrap();
        app.process_result(BackgroundResult::Mutation {
            entity: EntityKind::Owners,
            kind: mutation.kind(),
            result: Ok("Владелец удален".to_string()),
        });

        assert_eq!(app.owners.list.modal, Modal::None);
        assert!(app.owner_cache.observe(&owner_key, QueryPolicy::LIST, now));
        assert!(app.car_cache.observe(&car_key, QueryPolicy::LIST, now));
        let note = app.services.notifications.current(now).unwrap();
        assert_eq!(note.message, "Владелец удален");
    }

    #[test]
    fn test_mutation_during_list_fetch_schedules_another_fetch() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with("http://127.0.0.1:9", &dir);
        let now = Instant::now();
        let owner_key = app.owners.list.query_key();
        assert!(app.owner_cache.observe(&owner_key, QueryPolicy::LIST, now));
        assert!(app.owner_cache.begin_fetch(&owner_key, now));

        app.owners.open_delete(owner());
        let mutation = app.owners.confirm_delete().unwrap();
        app.process_result(BackgroundResult::Mutation {
            entity: EntityKind::Owners,
            kind: mutation.kind(),
            result: Ok("Владелец удален".to_string()),
        });

        // The in-flight response predates the delete
        app.process_result(BackgroundResult::Owners(owner_key.clone(), Ok(vec![owner()])));
        assert!(app.owner_cache.observe(&owner_key, QueryPolicy::LIST, now));
    }

    #[test]
    fn test_failed_mutation_keeps_modal_and_notifies() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with("http://127.0.0.1:9", &dir);
        app.owners.open_create();
        app.owners.form.state_mut().set_value("firstname", "Анна");
        app.owners.form.state_mut().set_value("lastname", "Ким");
        let mutation = app.owners.submit().unwrap();

        app.process_result(BackgroundResult::Mutation {
            entity: EntityKind::Owners,
            kind: mutation.kind(),
            result: Err("Сервер отклонил данные".to_string()),
        });

        assert_eq!(app.owners.list.modal, Modal::Create);
        assert_eq!(
            app.owners.form.state().submit_error(),
            Some("Сервер отклонил данные")
        );
        let note = app.services.notifications.current(Instant::now()).unwrap();
        assert_eq!(note.message, "Ошибка при сохранении: Сервер отклонил данные");
    }

    #[test]
    fn test_owner_list_feeds_car_form_choices() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with("http://127.0.0.1:9", &dir);
        app.open_car_create();
        assert_eq!(app.cars.form.state().value("owner_id"), "");

        app.process_result(BackgroundResult::Owners(
            OwnersPage::all_owners_key(),
            Ok(vec![owner()]),
        ));
        assert_eq!(app.cars.form.state().value("owner_id"), "1");
    }

    #[derive(Clone, Default)]
    struct Requests(Arc<Mutex<Vec<String>>>);

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn wait_for(app: &mut App, mut done: impl FnMut(&App) -> bool) {
        for _ in 0..200 {
            app.check_background_tasks();
            if done(app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("background fetch did not finish");
    }

    #[tokio::test]
    async fn test_search_term_switches_between_brand_and_paged_list() {
        let requests = Requests::default();
        let router = Router::new()
            .route(
                "/cars",
                get(
                    |State(r): State<Requests>, Query(q): Query<std::collections::HashMap<String, String>>| async move {
                        r.0.lock().unwrap().push(format!(
                            "list skip={} limit={}",
                            q.get("skip").cloned().unwrap_or_default(),
                            q.get("limit").cloned().unwrap_or_default()
                        ));
                        Json(json!([car_json(1, "Lada"), car_json(2, "Toyota")]))
                    },
                ),
            )
            .route(
                "/cars/search/brand/{brand}",
                get(|State(r): State<Requests>, Path(brand): Path<String>| async move {
                    r.0.lock().unwrap().push(format!("brand {}", brand));
                    Json(json!([car_json(2, &brand)]))
                }),
            )
            .with_state(requests.clone());
        let base = serve(router).await;

        let dir = TempDir::new().unwrap();
        let mut app = app_with(&base, &dir);
        app.current_tab = Tab::Cars;

        app.cars.list.set_term("Toyota");
        app.sync_queries();
        let key = app.cars.list.query_key();
        wait_for(&mut app, |a| a.car_cache.data(&key).is_some()).await;
        assert_eq!(app.car_cache.data(&key).map(Vec::len), Some(1));

        app.cars.list.set_term("");
        app.sync_queries();
        let key = app.cars.list.query_key();
        wait_for(&mut app, |a| a.car_cache.data(&key).is_some()).await;
        assert_eq!(app.car_cache.data(&key).map(Vec::len), Some(2));

        let seen = requests.0.lock().unwrap().clone();
        assert_eq!(seen, vec!["brand Toyota".to_string(), "list skip=0 limit=100".to_string()]);
    }

    #[tokio::test]
    async fn test_mutation_refetches_visible_list() {
        let requests = Requests::default();
        let router = Router::new()
            .route(
                "/owners",
                get(|State(r): State<Requests>| async move {
                    let mut seen = r.0.lock().unwrap();
                    seen.push("list".to_string());
                    let owners: Vec<Value> = (1..=seen.len() as i64)
                        .map(|id| json!({ "ownerid": id, "firstname": "A", "lastname": "B", "cars": [] }))
                        .collect();
                    Json(Value::Array(owners))
                })
                .post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "ownerid": 99,
                        "firstname": body["firstname"],
                        "lastname": body["lastname"],
                        "cars": []
                    }))
                }),
            )
            .with_state(requests.clone());
        let base = serve(router).await;

        let dir = TempDir::new().unwrap();
        let mut app = app_with(&base, &dir);
        app.current_tab = Tab::Owners;
        let key = app.owners.list.query_key();

        app.sync_queries();
        wait_for(&mut app, |a| a.owner_cache.data(&key).is_some()).await;
        assert_eq!(app.owner_cache.data(&key).map(Vec::len), Some(1));

        app.owners.open_create();
        app.owners.form.state_mut().set_value("firstname", "Анна");
        app.owners.form.state_mut().set_value("lastname", "Ким");
        app.submit_owner_form();
        wait_for(&mut app, |a| !a.owners.list.modal.is_open()).await;

        app.sync_queries();
        wait_for(&mut app, |a| a.owner_cache.data(&key).map(Vec::len) == Some(2)).await;
        assert_eq!(requests.0.lock().unwrap().len(), 2);
    }
}
