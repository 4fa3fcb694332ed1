use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::geo::validated_radius;
use crate::core::state::{SearchAction, SearchState};
use crate::models::{Coordinate, SearchQuery, Station, ValidationError, ViewportBounds};
use crate::services::{GatewayError, SearchGateway};

/// Search parameters the controller stamps onto every query
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub max_results: u32,
    pub distance_filter_enabled: bool,
    /// Used on mount when no geolocated center is available
    pub default_center: Coordinate,
    /// Radius of the mount search, before any viewport bounds are known
    pub initial_radius_meters: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_results: 200,
            distance_filter_enabled: true,
            default_center: Coordinate::PARIS,
            initial_radius_meters: 5000.0,
        }
    }
}

/// How a single issued search ended
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Latest search succeeded; its stations are now displayed
    Applied { stations: usize },
    /// Latest search failed; the error is now displayed
    Failed(String),
    /// A newer search (or a clear) was issued first; nothing was changed
    Superseded,
}

/// State and sequence counter shared with in-flight search tasks
struct Shared {
    state: watch::Sender<SearchState>,
    /// Sequence number of the most recently issued search.
    /// Only written while holding the state's write lock.
    latest: AtomicU64,
}

impl Shared {
    fn apply(&self, action: SearchAction) {
        self.state
            .send_modify(|state| *state = std::mem::take(state).reduce(action));
    }

    /// Record a new search and return its sequence number
    fn start(&self, query: SearchQuery) -> u64 {
        let mut sequence = 0;
        self.state.send_modify(|state| {
            sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = std::mem::take(state).reduce(SearchAction::Start(query));
        });
        sequence
    }

    /// Apply a gateway result if `sequence` is still the latest search
    fn resolve(
        &self,
        sequence: u64,
        result: Result<Vec<Station>, GatewayError>,
    ) -> SearchOutcome {
        let mut outcome = SearchOutcome::Superseded;

        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != sequence {
                return false;
            }
            let action = match result {
                Ok(stations) => {
                    outcome = SearchOutcome::Applied {
                        stations: stations.len(),
                    };
                    SearchAction::Success(stations)
                }
                Err(e) => {
                    let message = e.to_string();
                    outcome = SearchOutcome::Failed(message.clone());
                    SearchAction::Error(message)
                }
            };
            *state = std::mem::take(state).reduce(action);
            true
        });

        match &outcome {
            SearchOutcome::Applied { stations } => {
                info!("Search #{} applied: {} stations", sequence, stations)
            }
            SearchOutcome::Failed(message) => warn!("Search #{} failed: {}", sequence, message),
            SearchOutcome::Superseded => debug!("Search #{} superseded, result dropped", sequence),
        }

        outcome
    }
}

/// Keeps a single [`SearchState`] in step with the map viewport
///
/// Each settle event becomes one search. Searches may overlap; every one is
/// tagged with an increasing sequence number and only the result of the most
/// recently issued search is ever applied. Earlier results are dropped
/// without touching the state, so a slow response can never overwrite a
/// newer one.
///
/// The controller does not debounce; it expects one call per finished
/// pan/zoom gesture. Searches run on the ambient Tokio runtime, so the event
/// methods must be called from within one.
pub struct ViewportSearchController<G> {
    gateway: Arc<G>,
    shared: Arc<Shared>,
    config: ControllerConfig,
}

impl<G: SearchGateway> ViewportSearchController<G> {
    pub fn new(gateway: Arc<G>, config: ControllerConfig) -> Self {
        let (state, _) = watch::channel(SearchState::new());

        Self {
            gateway,
            shared: Arc::new(Shared {
                state,
                latest: AtomicU64::new(0),
            }),
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    /// Sequence number of the most recently issued search (0 before any)
    pub fn latest_sequence(&self) -> u64 {
        self.shared.latest.load(Ordering::SeqCst)
    }

    /// Apply a raw action to the state, bypassing the sequence guard
    pub fn dispatch(&self, action: SearchAction) {
        self.shared.apply(action);
    }

    /// Reset to the initial state. Searches still in flight become stale.
    pub fn clear(&self) {
        self.shared.state.send_modify(|state| {
            self.shared.latest.fetch_add(1, Ordering::SeqCst);
            *state = std::mem::take(state).reduce(SearchAction::Clear);
        });
        debug!("Search state cleared");
    }

    /// First search when the map becomes interactive
    ///
    /// Uses the geolocated `center` if there is one, the configured default
    /// otherwise.
    pub fn on_initial_mount(&self, center: Option<Coordinate>) -> JoinHandle<SearchOutcome> {
        let center = center.unwrap_or(self.config.default_center);
        info!(
            "Initial search at ({}, {})",
            center.latitude(),
            center.longitude()
        );
        self.search(self.query(center, self.config.initial_radius_meters))
    }

    /// A pan or zoom gesture has finished
    ///
    /// Bounds that give a non-positive or non-finite radius are dropped: no
    /// search is issued and the state is untouched.
    pub fn on_viewport_settled(
        &self,
        bounds: &ViewportBounds,
        center: Coordinate,
    ) -> Result<JoinHandle<SearchOutcome>, ValidationError> {
        let radius = validated_radius(bounds).map_err(|e| {
            debug!("Viewport event discarded: {}", e);
            e
        })?;

        Ok(self.search(self.query(center, radius)))
    }

    /// Issue `query` now and resolve it in the background
    ///
    /// `Start` is dispatched before this returns.
    pub fn search(&self, query: SearchQuery) -> JoinHandle<SearchOutcome> {
        let sequence = self.shared.start(query.clone());

        info!(
            "Search #{} issued: ({}, {}) radius {:.0}m",
            sequence,
            query.center.latitude(),
            query.center.longitude(),
            query.radius_meters
        );

        let gateway = Arc::clone(&self.gateway);
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            let result = gateway.search(&query).await;
            shared.resolve(sequence, result)
        })
    }

    fn query(&self, center: Coordinate, radius_meters: f64) -> SearchQuery {
        SearchQuery {
            center,
            radius_meters,
            max_results: self.config.max_results,
            distance_filter_enabled: self.config.distance_filter_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Reply = Result<Vec<Station>, GatewayError>;

    /// Gateway whose replies are released by the test, keyed by radius
    #[derive(Default)]
    struct ScriptedGateway {
        replies: Mutex<HashMap<u64, oneshot::Receiver<Reply>>>,
        queries: Mutex<Vec<SearchQuery>>,
    }

    impl ScriptedGateway {
        fn expect(&self, radius: u64) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.replies.lock().unwrap().insert(radius, rx);
            tx
        }

        fn calls(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    impl SearchGateway for ScriptedGateway {
        async fn search(&self, query: &SearchQuery) -> Reply {
            self.queries.lock().unwrap().push(query.clone());
            let key = query.radius_meters.round() as u64;
            let rx = self
                .replies
                .lock()
                .unwrap()
                .remove(&key)
                .expect("no reply scripted for this radius");
            rx.await
                .unwrap_or_else(|_| Err(GatewayError::InvalidResponse("reply dropped".into())))
        }
    }

    fn station(id: &str) -> Station {
        Station {
            id: id.to_string(),
            name: format!("Station {}", id),
            services: vec!["fuel".to_string()],
            address: Address {
                street_line_1: "1 Rue de Rivoli".to_string(),
                street_line_2: None,
                street_line_3: None,
                city: "Paris".to_string(),
                region: None,
                postal_code: "75001".to_string(),
                country: "FR".to_string(),
                location: Coordinate::new(48.86, 2.34).unwrap(),
            },
        }
    }

    fn paris() -> Coordinate {
        Coordinate::new(48.8566, 2.3522).unwrap()
    }

    fn setup() -> (Arc<ScriptedGateway>, ViewportSearchController<ScriptedGateway>) {
        let gateway = Arc::new(ScriptedGateway::default());
        let controller =
            ViewportSearchController::new(Arc::clone(&gateway), ControllerConfig::default());
        (gateway, controller)
    }

    fn query(radius: f64) -> SearchQuery {
        SearchQuery {
            center: paris(),
            radius_meters: radius,
            max_results: 200,
            distance_filter_enabled: true,
        }
    }

    #[tokio::test]
    async fn test_settle_issues_query_with_viewport_radius() {
        let (gateway, controller) = setup();
        let reply = gateway.expect(555);

        let bounds = ViewportBounds::new(48.86, 48.85, 2.36, 2.34);
        let handle = controller.on_viewport_settled(&bounds, paris()).unwrap();

        let state = controller.snapshot();
        assert!(state.loading);
        let issued = state.last_query.unwrap();
        assert!((issued.radius_meters - 555.0).abs() < 1e-6);
        assert_eq!(issued.max_results, 200);
        assert!(issued.distance_filter_enabled);
        assert_eq!(issued.center, paris());

        reply.send(Ok(vec![station("a")])).unwrap();
        assert_eq!(handle.await.unwrap(), SearchOutcome::Applied { stations: 1 });
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_degenerate_bounds_issue_nothing() {
        let (gateway, controller) = setup();

        for bounds in [
            ViewportBounds::new(48.85, 48.85, 2.36, 2.34),
            ViewportBounds::new(48.84, 48.85, 2.36, 2.34),
            ViewportBounds::new(f64::NAN, 48.85, 2.36, 2.34),
        ] {
            assert!(controller.on_viewport_settled(&bounds, paris()).is_err());
        }

        tokio::task::yield_now().await;
        assert_eq!(gateway.calls(), 0);
        assert_eq!(controller.latest_sequence(), 0);
        assert_eq!(controller.snapshot(), SearchState::new());
    }

    #[tokio::test]
    async fn test_late_response_from_older_query_is_ignored() {
        let (gateway, controller) = setup();
        let reply_a = gateway.expect(1000);
        let reply_b = gateway.expect(2000);

        let a = controller.search(query(1000.0));
        let b = controller.search(query(2000.0));

        reply_b.send(Ok(vec![station("b1"), station("b2")])).unwrap();
        assert_eq!(b.await.unwrap(), SearchOutcome::Applied { stations: 2 });

        let after_b = controller.snapshot();

        reply_a.send(Ok(vec![station("a1")])).unwrap();
        assert_eq!(a.await.unwrap(), SearchOutcome::Superseded);

        assert_eq!(controller.snapshot(), after_b);
        assert_eq!(after_b.stations, vec![station("b1"), station("b2")]);
        assert!(!after_b.loading);
    }

    #[tokio::test]
    async fn test_stale_error_is_not_surfaced() {
        let (gateway, controller) = setup();
        let reply_a = gateway.expect(1000);
        let reply_b = gateway.expect(2000);

        let a = controller.search(query(1000.0));
        let b = controller.search(query(2000.0));

        reply_a
            .send(Err(GatewayError::Backend {
                status_code: 502,
                message: "bad gateway".into(),
            }))
            .unwrap();
        assert_eq!(a.await.unwrap(), SearchOutcome::Superseded);

        // B is still outstanding
        let state = controller.snapshot();
        assert!(state.loading);
        assert!(!state.has_error());

        reply_b.send(Ok(vec![station("b")])).unwrap();
        b.await.unwrap();
        assert_eq!(controller.snapshot().stations, vec![station("b")]);
    }

    #[tokio::test]
    async fn test_identical_queries_replace_not_merge() {
        let (gateway, controller) = setup();

        let reply = gateway.expect(1000);
        let first = controller.search(query(1000.0));
        reply.send(Ok(vec![station("a"), station("b")])).unwrap();
        first.await.unwrap();

        let reply = gateway.expect(1000);
        let second = controller.search(query(1000.0));
        reply.send(Ok(vec![station("c")])).unwrap();
        second.await.unwrap();

        assert_eq!(gateway.calls(), 2);
        assert_eq!(controller.latest_sequence(), 2);
        assert_eq!(controller.snapshot().stations, vec![station("c")]);
    }

    #[tokio::test]
    async fn test_error_clears_previous_results() {
        let (gateway, controller) = setup();

        let reply = gateway.expect(1000);
        let first = controller.search(query(1000.0));
        reply.send(Ok(vec![station("a")])).unwrap();
        first.await.unwrap();

        let reply = gateway.expect(1000);
        let second = controller.search(query(1000.0));
        assert_eq!(controller.snapshot().stations, vec![station("a")]);

        reply
            .send(Err(GatewayError::Backend {
                status_code: 500,
                message: "Failed to fetch stations from backend".into(),
            }))
            .unwrap();
        assert!(matches!(second.await.unwrap(), SearchOutcome::Failed(_)));

        let state = controller.snapshot();
        assert!(!state.loading);
        assert!(state.has_error());
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_clear_invalidates_in_flight_search() {
        let (gateway, controller) = setup();
        let reply = gateway.expect(1000);

        let pending = controller.search(query(1000.0));
        controller.clear();
        assert_eq!(controller.snapshot(), SearchState::new());

        reply.send(Ok(vec![station("a")])).unwrap();
        assert_eq!(pending.await.unwrap(), SearchOutcome::Superseded);
        assert_eq!(controller.snapshot(), SearchState::new());
    }

    #[tokio::test]
    async fn test_mount_falls_back_to_default_center() {
        let (gateway, controller) = setup();
        let reply = gateway.expect(5000);

        let handle = controller.on_initial_mount(None);
        reply.send(Ok(vec![])).unwrap();
        assert_eq!(handle.await.unwrap(), SearchOutcome::Applied { stations: 0 });

        let issued = gateway.queries.lock().unwrap()[0].clone();
        assert_eq!(issued.center, paris());
        assert_eq!(issued.radius_meters, 5000.0);
    }

    #[tokio::test]
    async fn test_mount_prefers_geolocated_center() {
        let (gateway, controller) = setup();
        let reply = gateway.expect(5000);
        let lyon = Coordinate::new(45.764, 4.8357).unwrap();

        let handle = controller.on_initial_mount(Some(lyon));
        reply.send(Ok(vec![station("a")])).unwrap();
        handle.await.unwrap();

        assert_eq!(controller.snapshot().last_query.unwrap().center, lyon);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let (gateway, controller) = setup();
        let mut rx = controller.subscribe();
        let reply = gateway.expect(1000);

        let handle = controller.search(query(1000.0));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().loading);

        reply.send(Ok(vec![station("a")])).unwrap();
        handle.await.unwrap();
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert!(!seen.loading);
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_applies_raw_action() {
        let (_gateway, controller) = setup();
        controller.dispatch(SearchAction::SetLoading(true));
        assert!(controller.snapshot().loading);
        controller.dispatch(SearchAction::Clear);
        assert_eq!(controller.snapshot(), SearchState::new());
    }
}
