use crate::alarm::WakeAlarm;
use crate::config::Config;
use crate::media_gate::{GateHandle, PlayerCommand};
use crate::models::{Coordinates, DisplayState, PageId};
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::{Notify, RwLock};
use tracing::info;

#[derive(Debug)]
pub struct Session {
    pub coordinates: Coordinates,
    pub display: DisplayState,
    pub alarm: WakeAlarm,
    pub page: PageId,
    pub player_commands: VecDeque<PlayerCommand>,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            coordinates: config.coordinates,
            display: DisplayState {
                display_name: config.display_name.clone(),
                overlay_visible: true,
                ..DisplayState::default()
            },
            alarm: WakeAlarm::new(config.sleep_duration),
            page: PageId::default(),
            player_commands: VecDeque::new(),
        }
    }

    /// A freshly loaded page starts locked with the overlay up. Commands meant
    /// for the previous page are dropped.
    pub fn begin_page(&mut self) -> PageId {
        self.page = self.page.next();
        self.display.overlay_visible = true;
        let dropped = self.player_commands.len();
        self.player_commands.clear();
        info!(page = %self.page, dropped, "page loaded");
        self.page
    }

    pub fn drain_commands(&mut self, page: PageId) -> Vec<PlayerCommand> {
        if page != self.page {
            return Vec::new();
        }
        self.player_commands.drain(..).collect()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<RwLock<Session>>,
    pub gate: GateHandle,
    pub refresh: Arc<Notify>,
}

impl AppState {
    pub fn new(config: Config, gate: GateHandle) -> Self {
        let session = Session::new(&config);
        Self {
            config: Arc::new(config),
            session: Arc::new(RwLock::new(session)),
            gate,
            refresh: Arc::new(Notify::new()),
        }
    }
}
