use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::NaiveDateTime;
use kartalla::{
    simulation::{Config, Inbox, Simulation, SubscriptionIndex, TickReport},
    timetable::Timetable,
};
use tokio::sync::{Mutex, Notify, RwLock};

pub struct AppState {
    pub dataset_path: RwLock<PathBuf>,
    pub config: Config,
    /// Only the tick task holds this lock for longer than a restart.
    pub simulation: Mutex<Simulation>,
    /// Last published tick.
    pub report: RwLock<Arc<TickReport>>,
    /// Producer handle of the current session, replaced on restart.
    pub inbox: RwLock<Inbox>,
    pub subscriptions: Mutex<SubscriptionIndex>,
    /// Live position intake, switched through `/vp/usage`.
    pub live_enabled: AtomicBool,
    /// Signalled after every restart.
    pub restarted: Notify,
}

impl AppState {
    pub fn new(
        dataset_path: PathBuf,
        timetable: Timetable,
        config: Config,
        sim_start: NaiveDateTime,
    ) -> Self {
        let simulation = Simulation::new(Arc::new(timetable), config.clone(), sim_start);
        let inbox = simulation.inbox();
        Self {
            dataset_path: RwLock::new(dataset_path),
            subscriptions: Mutex::new(SubscriptionIndex::new(config.max_subscription_cells)),
            live_enabled: AtomicBool::new(config.live_positions),
            config,
            simulation: Mutex::new(simulation),
            report: RwLock::new(Arc::new(TickReport::default())),
            inbox: RwLock::new(inbox),
            restarted: Notify::new(),
        }
    }

    pub fn is_live_enabled(&self) -> bool {
        self.live_enabled.load(Ordering::Relaxed)
    }

    /// Switches live intake and forwards the switch to the running session.
    pub async fn set_live_enabled(&self, enabled: bool) {
        self.live_enabled.store(enabled, Ordering::Relaxed);
        self.inbox.read().await.push_live_usage(enabled);
    }

    /// Swaps in a new timetable and starts a fresh session on it. Returns the
    /// live filters that were detached and must be unsubscribed.
    pub async fn restart(&self, timetable: Timetable, sim_start: NaiveDateTime) -> Vec<String> {
        let mut simulation = self.simulation.lock().await;
        simulation.restart(Arc::new(timetable), sim_start);
        let inbox = simulation.inbox();
        inbox.push_live_usage(self.is_live_enabled());
        *self.inbox.write().await = inbox;
        *self.report.write().await = Arc::new(TickReport::default());
        let unsubscribe = self.subscriptions.lock().await.clear();
        self.restarted.notify_one();
        unsubscribe
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use kartalla::simulation::Viewport;
    use serde_json::json;

    use super::*;

    fn empty_timetable() -> Timetable {
        let keys = json!({
            "root": {
                "array_keys": 0, "gtfs_epoch": 1, "json_epoch": 2,
                "dates": 3, "route_types": 4, "routes": 5
            }
        });
        let payload = json!([keys, 1714521600, 1714608000, ["20240501"], ["bus"], []]);
        Timetable::from_str(&payload.to_string()).unwrap()
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn state() -> AppState {
        AppState::new(
            PathBuf::from("payload.json"),
            empty_timetable(),
            Config::default(),
            start(),
        )
    }

    #[tokio::test]
    async fn restart_detaches_subscriptions_test() {
        let state = state();
        let viewport = Viewport {
            zoom: 14,
            south: 60.165,
            west: 24.935,
            north: 60.171,
            east: 24.949,
        };
        let change = state.subscriptions.lock().await.update(&viewport).unwrap();
        let unsubscribe = state.restart(empty_timetable(), start()).await;
        assert_eq!(unsubscribe, change.subscribe);
        assert_eq!(state.subscriptions.lock().await.current().count(), 0);
        // the same viewport subscribes again after the restart
        assert!(state.subscriptions.lock().await.update(&viewport).is_some());
    }

    #[tokio::test]
    async fn restart_wakes_alerts_test() {
        let state = state();
        let generation = state.inbox.read().await.generation();
        state.restart(empty_timetable(), start()).await;
        assert_eq!(state.inbox.read().await.generation(), generation + 1);
        let notified = tokio::time::timeout(Duration::from_secs(1), state.restarted.notified());
        assert!(notified.await.is_ok());
    }

    #[tokio::test]
    async fn live_usage_survives_restart_test() {
        let state = state();
        assert!(state.is_live_enabled());
        state.set_live_enabled(false).await;
        state.simulation.lock().await.tick();
        assert!(!state.simulation.lock().await.live_enabled());

        state.restart(empty_timetable(), start()).await;
        state.simulation.lock().await.tick();
        assert!(!state.is_live_enabled());
        assert!(!state.simulation.lock().await.live_enabled());
    }
}
