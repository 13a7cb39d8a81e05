use crate::models::PageId;
use crate::state::AppState;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const CHANNEL_CAPACITY: usize = 32;
const UNMUTED_VOLUME: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPlayerState")]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPlayerState {
    Code(i64),
    Name(String),
}

impl TryFrom<RawPlayerState> for PlayerState {
    type Error = String;

    fn try_from(raw: RawPlayerState) -> Result<Self, Self::Error> {
        match raw {
            RawPlayerState::Code(code) => PlayerState::from_code(code)
                .ok_or_else(|| format!("unknown player state code {code}")),
            RawPlayerState::Name(name) => PlayerState::from_name(&name)
                .ok_or_else(|| format!("unknown player state {name:?}")),
        }
    }
}

impl PlayerState {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "unstarted" => Some(Self::Unstarted),
            "ended" => Some(Self::Ended),
            "playing" => Some(Self::Playing),
            "paused" => Some(Self::Paused),
            "buffering" => Some(Self::Buffering),
            "cued" => Some(Self::Cued),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSignal {
    Ready,
    StateChange(PlayerState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlayerCommand {
    HideOverlay,
    RequestFullscreen,
    Unmute,
    SetVolume { volume: u8 },
}

#[derive(Debug, Clone)]
pub struct MediaGate {
    phase: GatePhase,
    player_ready: bool,
    unmute_pending: bool,
}

impl Default for MediaGate {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaGate {
    pub fn new() -> Self {
        Self {
            phase: GatePhase::Locked,
            player_ready: false,
            unmute_pending: false,
        }
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn is_unlocked(&self) -> bool {
        self.phase == GatePhase::Unlocked
    }

    pub fn gesture(&mut self) -> Vec<PlayerCommand> {
        if self.is_unlocked() {
            return Vec::new();
        }
        self.phase = GatePhase::Unlocked;

        let mut commands = vec![PlayerCommand::HideOverlay];
        if self.player_ready {
            commands.extend(unmute_commands());
        } else {
            self.unmute_pending = true;
        }
        commands.push(PlayerCommand::RequestFullscreen);
        commands
    }

    pub fn player_ready(&mut self) -> Vec<PlayerCommand> {
        if self.player_ready {
            return Vec::new();
        }
        self.player_ready = true;

        if self.unmute_pending {
            self.unmute_pending = false;
            unmute_commands().to_vec()
        } else {
            Vec::new()
        }
    }

    pub fn player_state_changed(&mut self, state: PlayerState) -> Vec<PlayerCommand> {
        if state == PlayerState::Playing && self.is_unlocked() && self.player_ready {
            vec![PlayerCommand::Unmute]
        } else {
            Vec::new()
        }
    }

    pub fn handle(&mut self, signal: PlayerSignal) -> Vec<PlayerCommand> {
        match signal {
            PlayerSignal::Ready => self.player_ready(),
            PlayerSignal::StateChange(state) => self.player_state_changed(state),
        }
    }
}

fn unmute_commands() -> [PlayerCommand; 2] {
    [
        PlayerCommand::Unmute,
        PlayerCommand::SetVolume {
            volume: UNMUTED_VOLUME,
        },
    ]
}

#[derive(Debug, thiserror::Error)]
#[error("media gate is not running")]
pub struct GateClosed;

#[derive(Debug, Clone)]
pub struct GateHandle {
    gestures: mpsc::Sender<PageId>,
    signals: mpsc::Sender<(PageId, PlayerSignal)>,
}

#[derive(Debug)]
pub struct GateInbox {
    gestures: mpsc::Receiver<PageId>,
    signals: mpsc::Receiver<(PageId, PlayerSignal)>,
}

impl GateHandle {
    pub fn channel() -> (GateHandle, GateInbox) {
        let (gesture_tx, gesture_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (signal_tx, signal_rx) = mpsc::channel(CHANNEL_CAPACITY);
        (
            GateHandle {
                gestures: gesture_tx,
                signals: signal_tx,
            },
            GateInbox {
                gestures: gesture_rx,
                signals: signal_rx,
            },
        )
    }

    pub async fn gesture(&self, page: PageId) -> Result<(), GateClosed> {
        self.gestures.send(page).await.map_err(|_| GateClosed)
    }

    pub async fn signal(&self, page: PageId, signal: PlayerSignal) -> Result<(), GateClosed> {
        self.signals.send((page, signal)).await.map_err(|_| GateClosed)
    }
}

/// One gate per loaded page.
#[derive(Debug, Default)]
struct PageGate {
    page: PageId,
    gate: MediaGate,
}

impl PageGate {
    fn for_page(&mut self, page: PageId) -> &mut MediaGate {
        if self.page != page {
            debug!(%page, previous = %self.page, "media gate reset for new page");
            self.page = page;
            self.gate = MediaGate::new();
        }
        &mut self.gate
    }
}

pub async fn run_media_gate(state: AppState, mut inbox: GateInbox) {
    let mut current = PageGate::default();
    let mut gestures_open = true;
    let mut signals_open = true;

    while gestures_open || signals_open {
        tokio::select! {
            gesture = inbox.gestures.recv(), if gestures_open => {
                let Some(page) = gesture else {
                    gestures_open = false;
                    continue;
                };
                let mut session = state.session.write().await;
                if page != session.page {
                    debug!(%page, current = %session.page, "gesture from a stale page ignored");
                    continue;
                }
                let gate = current.for_page(page);
                if gate.is_unlocked() {
                    debug!(%page, "gesture ignored, gate already unlocked");
                    continue;
                }

                let commands = gate.gesture();
                info!(
                    %page,
                    unmuted = commands.contains(&PlayerCommand::Unmute),
                    "media gate unlocked"
                );
                session.display.overlay_visible = false;
                session.alarm.arm(Utc::now());
                session.player_commands.extend(commands);
            }
            signal = inbox.signals.recv(), if signals_open => {
                let Some((page, signal)) = signal else {
                    signals_open = false;
                    continue;
                };
                debug!(%page, ?signal, "player signal");
                let mut session = state.session.write().await;
                if page != session.page {
                    debug!(%page, current = %session.page, "signal from a stale page ignored");
                    continue;
                }
                let commands = current.for_page(page).handle(signal);
                session.player_commands.extend(commands);
            }
        }
    }

    warn!("media gate channels closed, sound unlock disabled");
}
