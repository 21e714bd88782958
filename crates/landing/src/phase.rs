//! Sequence phases and the forward-only state machine that tracks them.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Loading,
    SpaceTravel,
    BlobPlanet,
    EnteringRoom,
    Room,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Loading,
        Phase::SpaceTravel,
        Phase::BlobPlanet,
        Phase::EnteringRoom,
        Phase::Room,
    ];

    /// The only phase this one may hand over to. `Room` is terminal.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Loading => Some(Phase::SpaceTravel),
            Phase::SpaceTravel => Some(Phase::BlobPlanet),
            Phase::BlobPlanet => Some(Phase::EnteringRoom),
            Phase::EnteringRoom => Some(Phase::Room),
            Phase::Room => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::SpaceTravel => "space-travel",
            Phase::BlobPlanet => "blob-planet",
            Phase::EnteringRoom => "entering-room",
            Phase::Room => "room",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("illegal phase transition {from} -> {to}")]
    IllegalTransition { from: Phase, to: Phase },
}

/// Current phase plus when each phase was entered.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    current: Phase,
    entered_at: Duration,
    history: Vec<(Phase, Duration)>,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            current: Phase::Loading,
            entered_at: Duration::ZERO,
            history: vec![(Phase::Loading, Duration::ZERO)],
        }
    }

    pub fn current(&self) -> Phase {
        self.current
    }

    pub fn entered_at(&self) -> Duration {
        self.entered_at
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.entered_at)
    }

    /// Every phase entered so far, in order, with its entry time.
    pub fn history(&self) -> &[(Phase, Duration)] {
        &self.history
    }

    /// Move to `to` at time `at`. Anything but the immediate successor is rejected.
    pub fn advance(&mut self, to: Phase, at: Duration) -> Result<(), SequenceError> {
        if self.current.next() != Some(to) {
            return Err(SequenceError::IllegalTransition {
                from: self.current,
                to,
            });
        }
        log::info!("Phase {} -> {} at {:.3}s", self.current, to, at.as_secs_f32());
        self.current = to;
        self.entered_at = at;
        self.history.push((to, at));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_chain_forward_to_room() {
        let mut walked = vec![Phase::Loading];
        let mut phase = Phase::Loading;
        while let Some(next) = phase.next() {
            walked.push(next);
            phase = next;
        }
        assert_eq!(walked, Phase::ALL.to_vec());
    }

    #[test]
    fn machine_records_entry_times() {
        let mut machine = PhaseMachine::new();
        machine.advance(Phase::SpaceTravel, Duration::from_millis(3000)).unwrap();
        assert_eq!(machine.elapsed(Duration::from_millis(4000)), Duration::from_millis(1000));
        assert_eq!(machine.history().len(), 2);
        assert_eq!(machine.history()[1], (Phase::SpaceTravel, Duration::from_millis(3000)));
    }

    #[test]
    fn skipping_or_going_back_is_rejected() {
        let mut machine = PhaseMachine::new();
        let err = machine.advance(Phase::BlobPlanet, Duration::ZERO).unwrap_err();
        assert_eq!(
            err,
            SequenceError::IllegalTransition {
                from: Phase::Loading,
                to: Phase::BlobPlanet
            }
        );
        assert_eq!(machine.current(), Phase::Loading);

        machine.advance(Phase::SpaceTravel, Duration::ZERO).unwrap();
        assert!(machine.advance(Phase::Loading, Duration::ZERO).is_err());
        assert!(machine.advance(Phase::SpaceTravel, Duration::ZERO).is_err());
        assert_eq!(machine.history().len(), 2);
    }

    #[test]
    fn room_is_terminal() {
        assert_eq!(Phase::Room.next(), None);
        assert_eq!(Phase::EnteringRoom.to_string(), "entering-room");
    }
}
