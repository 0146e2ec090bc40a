//! Game Events
//!
//! Events generated during simulation for the audio and render
//! collaborators, logs and replays. The core never consumes its own events.

use serde::{Serialize, Deserialize};

use crate::game::moveset::AttackKind;
use crate::game::state::{MatchOutcome, Side};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Knockouts first
    Knockout = 0,
    /// Then landed hits
    Hit = 1,
    /// Then blocked hits
    Block = 2,
    /// Then attack activations
    Activation = 3,
    /// Then movement cues
    Movement = 4,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Character left the ground
    Jumped {
        side: Side,
    },

    /// Character touched the ground after being airborne
    Landed {
        side: Side,
    },

    /// An attack connected
    HitConnected {
        attacker: Side,
        kind: AttackKind,
        damage: u32,
        counter: bool,
        defender_hp: u32,
    },

    /// An attack was blocked
    HitBlocked {
        attacker: Side,
        kind: AttackKind,
    },

    /// Ultimate attack started
    UltimateActivated {
        side: Side,
    },

    /// A projectile attack released its projectile
    ProjectileLaunched {
        side: Side,
    },

    /// Character was knocked out
    KnockedOut {
        victim: Side,
    },

    /// Match reached a terminal outcome
    MatchEnded {
        outcome: MatchOutcome,
        duration_frames: u32,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Frame when event occurred
    pub frame: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Side involved (for tie-breaking)
    pub side: Option<Side>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(frame: u32, priority: EventPriority, data: GameEventData) -> Self {
        let side = match &data {
            GameEventData::Jumped { side } => Some(*side),
            GameEventData::Landed { side } => Some(*side),
            GameEventData::HitConnected { attacker, .. } => Some(*attacker),
            GameEventData::HitBlocked { attacker, .. } => Some(*attacker),
            GameEventData::UltimateActivated { side } => Some(*side),
            GameEventData::ProjectileLaunched { side } => Some(*side),
            GameEventData::KnockedOut { victim } => Some(*victim),
            GameEventData::MatchEnded { .. } => None,
        };

        Self {
            frame,
            priority,
            side,
            data,
        }
    }

    /// Create jump event.
    pub fn jumped(frame: u32, side: Side) -> Self {
        Self::new(frame, EventPriority::Movement, GameEventData::Jumped { side })
    }

    /// Create landing event.
    pub fn landed(frame: u32, side: Side) -> Self {
        Self::new(frame, EventPriority::Movement, GameEventData::Landed { side })
    }

    /// Create hit event.
    pub fn hit_connected(
        frame: u32,
        attacker: Side,
        kind: AttackKind,
        damage: u32,
        counter: bool,
        defender_hp: u32,
    ) -> Self {
        Self::new(
            frame,
            EventPriority::Hit,
            GameEventData::HitConnected {
                attacker,
                kind,
                damage,
                counter,
                defender_hp,
            },
        )
    }

    /// Create blocked hit event.
    pub fn hit_blocked(frame: u32, attacker: Side, kind: AttackKind) -> Self {
        Self::new(frame, EventPriority::Block, GameEventData::HitBlocked { attacker, kind })
    }

    /// Create ultimate activation event.
    pub fn ultimate_activated(frame: u32, side: Side) -> Self {
        Self::new(frame, EventPriority::Activation, GameEventData::UltimateActivated { side })
    }

    /// Create projectile release event.
    pub fn projectile_launched(frame: u32, side: Side) -> Self {
        Self::new(frame, EventPriority::Activation, GameEventData::ProjectileLaunched { side })
    }

    /// Create knockout event.
    pub fn knocked_out(frame: u32, victim: Side) -> Self {
        Self::new(frame, EventPriority::Knockout, GameEventData::KnockedOut { victim })
    }

    /// Create match ended event.
    pub fn match_ended(frame: u32, outcome: MatchOutcome) -> Self {
        Self::new(
            frame,
            EventPriority::Other,
            GameEventData::MatchEnded {
                outcome,
                duration_frames: frame,
            },
        )
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.frame == other.frame
            && self.priority == other.priority
            && self.side == other.side
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: frame, then priority, then side
        self.frame
            .cmp(&other.frame)
            .then(self.priority.cmp(&other.priority))
            .then(self.side.cmp(&other.side))
    }
}

// =============================================================================
// SINK
// =============================================================================

/// Receiver for events, e.g. the audio collaborator.
pub trait EventSink {
    /// Called once per event, in priority order.
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> EventSink for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}
