//! Telemetry event catalog and ring buffer shared by firmware and host targets.
//!
//! The control loop records every observable state change here: debounced
//! button edges, backlight transitions, motion triggers and each die drawn
//! during a roll. Records are kept in a fixed-capacity ring so the history
//! stays `no_std` friendly and bounded.

use core::{fmt, time::Duration};

use heapless::HistoryBuf;

use crate::animation::DieFace;
use crate::hal::{Acceleration, MonotonicInstant};
use crate::input::{ButtonEdge, ButtonId};
use crate::motion::Axis;
use crate::power::PowerTransition;

/// Identifier assigned to each telemetry record.
pub type EventId = u32;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 64;

/// Discriminated telemetry events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryEventKind {
    ButtonPressed(ButtonId),
    ButtonReleased(ButtonId),
    BacklightDimmed,
    BacklightWoken,
    MotionTriggered,
    DieRolled { slot: u8, face: DieFace },
    SampleExhausted { slot: u8 },
}

impl fmt::Display for TelemetryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEventKind::ButtonPressed(id) => write!(f, "button-pressed {id}"),
            TelemetryEventKind::ButtonReleased(id) => write!(f, "button-released {id}"),
            TelemetryEventKind::BacklightDimmed => f.write_str("backlight-dimmed"),
            TelemetryEventKind::BacklightWoken => f.write_str("backlight-woken"),
            TelemetryEventKind::MotionTriggered => f.write_str("motion-triggered"),
            TelemetryEventKind::DieRolled { slot, face } => {
                write!(f, "die-rolled slot={slot} face={face}")
            }
            TelemetryEventKind::SampleExhausted { slot } => {
                write!(f, "sample-exhausted slot={slot}")
            }
        }
    }
}

/// Payloads carried alongside telemetry events.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TelemetryPayload {
    /// No additional metadata accompanies the event.
    None,
    /// Inactivity observed when the backlight changed state.
    Power { idle_for: Duration },
    /// Axis and reading that crossed the motion threshold.
    Motion { axis: Axis, reading: Acceleration },
    /// Attempt budget consumed by a failed draw.
    Sampler { attempts: u8 },
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TelemetryRecord<TInstant>
where
    TInstant: Copy,
{
    pub id: EventId,
    pub timestamp: TInstant,
    pub event: TelemetryEventKind,
    pub details: TelemetryPayload,
}

/// Records telemetry events into a fixed-size ring buffer.
pub struct TelemetryRecorder<TInstant, const CAPACITY: usize = TELEMETRY_RING_CAPACITY>
where
    TInstant: Copy,
{
    ring: HistoryBuf<TelemetryRecord<TInstant>, CAPACITY>,
    next_event_id: EventId,
}

impl<TInstant, const CAPACITY: usize> TelemetryRecorder<TInstant, CAPACITY>
where
    TInstant: MonotonicInstant,
{
    /// Creates a new telemetry recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_event_id: 0,
        }
    }

    /// Returns the recorded telemetry in chronological order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &TelemetryRecord<TInstant>> + '_ {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent telemetry record, if available.
    pub fn latest(&self) -> Option<&TelemetryRecord<TInstant>> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no telemetry records are stored.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Identifier the next record will receive.
    pub const fn next_event_id(&self) -> EventId {
        self.next_event_id
    }

    pub fn record_button(
        &mut self,
        id: ButtonId,
        edge: ButtonEdge,
        timestamp: TInstant,
    ) -> EventId {
        let event = match edge {
            ButtonEdge::Pressed => TelemetryEventKind::ButtonPressed(id),
            ButtonEdge::Released => TelemetryEventKind::ButtonReleased(id),
        };
        self.record(event, TelemetryPayload::None, timestamp)
    }

    pub fn record_power(&mut self, transition: PowerTransition, timestamp: TInstant) -> EventId {
        let (event, idle_for) = match transition {
            PowerTransition::Dimmed { idle_for } => (TelemetryEventKind::BacklightDimmed, idle_for),
            PowerTransition::Woken { idle_for } => (TelemetryEventKind::BacklightWoken, idle_for),
        };
        self.record(event, TelemetryPayload::Power { idle_for }, timestamp)
    }

    pub fn record_motion(
        &mut self,
        axis: Axis,
        reading: Acceleration,
        timestamp: TInstant,
    ) -> EventId {
        self.record(
            TelemetryEventKind::MotionTriggered,
            TelemetryPayload::Motion { axis, reading },
            timestamp,
        )
    }

    pub fn record_roll(&mut self, slot: usize, face: DieFace, timestamp: TInstant) -> EventId {
        self.record(
            TelemetryEventKind::DieRolled {
                slot: truncate_slot(slot),
                face,
            },
            TelemetryPayload::None,
            timestamp,
        )
    }

    pub fn record_exhausted(&mut self, slot: usize, attempts: u8, timestamp: TInstant) -> EventId {
        self.record(
            TelemetryEventKind::SampleExhausted {
                slot: truncate_slot(slot),
            },
            TelemetryPayload::Sampler { attempts },
            timestamp,
        )
    }

    /// Records an arbitrary telemetry event with the supplied payload.
    pub fn record(
        &mut self,
        event: TelemetryEventKind,
        payload: TelemetryPayload,
        timestamp: TInstant,
    ) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(TelemetryRecord {
            id,
            timestamp,
            event,
            details: payload,
        });

        id
    }
}

impl<TInstant, const CAPACITY: usize> Default for TelemetryRecorder<TInstant, CAPACITY>
where
    TInstant: MonotonicInstant,
{
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_slot(slot: usize) -> u8 {
    u8::try_from(slot).unwrap_or(u8::MAX)
}
