//! # Audio Focus Arbitration
//!
//! Per-player bookkeeping around the host's [`FocusService`]: requesting and
//! abandoning the focus token, and remembering what to do when focus comes
//! back (resume after a transient loss, restore volume after ducking).
//!
//! Every player instance has independent focus bookkeeping; nothing here is
//! process-wide. The focus-change transitions themselves live in the player
//! state machine, which owns the engine calls they trigger.

use player_bridge::focus::{FocusAttributes, FocusService};
use tracing::debug;

/// Volume multiplier applied while another app holds transient+duck focus.
pub const DUCKING_VOLUME_MULTIPLIER: f64 = 0.2;

/// Focus session state for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    /// No focus held (initial state, or after abandon/permanent loss).
    NoFocus,
    /// Focus held; playback has priority.
    HasFocus,
    /// Focus held but volume reduced for another app's transient request.
    Ducked,
}

/// Arbitration wrapper owning the host focus service for one player.
pub struct FocusArbitrator {
    service: Box<dyn FocusService>,
    attributes: FocusAttributes,
    /// Per-instance switch: when false, request/abandon are no-ops.
    enabled: bool,
    state: FocusState,
    /// Set on transient loss while playing; cleared on gain, permanent loss,
    /// and explicit user commands.
    resume_pending: bool,
    /// User volume snapshotted when ducking began.
    volume_before_ducking: Option<f64>,
}

impl FocusArbitrator {
    /// Create an arbitrator over the host focus service.
    pub fn new(service: Box<dyn FocusService>, attributes: FocusAttributes, enabled: bool) -> Self {
        Self {
            service,
            attributes,
            enabled,
            state: FocusState::NoFocus,
            resume_pending: false,
            volume_before_ducking: None,
        }
    }

    /// Request the focus token.
    ///
    /// Returns `false` when focus management is disabled for this player or
    /// the system denied the request. Denial is non-fatal by design: the
    /// caller logs and proceeds.
    pub fn request(&mut self) -> bool {
        if !self.enabled {
            return false;
        }

        let granted = self.service.request_focus(&self.attributes).is_granted();
        if granted {
            self.state = FocusState::HasFocus;
        }
        debug!(granted, "audio focus requested");
        granted
    }

    /// Abandon the focus token. No-op when focus management is disabled.
    pub fn abandon(&mut self) {
        if !self.enabled {
            return;
        }

        self.service.abandon_focus();
        self.state = FocusState::NoFocus;
        debug!("audio focus abandoned");
    }

    /// Current focus session state.
    pub fn state(&self) -> FocusState {
        self.state
    }

    /// Whether this player manages focus at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record that playback should resume when focus returns.
    pub fn set_resume_pending(&mut self) {
        self.resume_pending = true;
    }

    /// Consume the resume-on-gain intent.
    pub fn take_resume_pending(&mut self) -> bool {
        std::mem::take(&mut self.resume_pending)
    }

    /// Snapshot the user volume and enter the ducked state.
    pub fn begin_ducking(&mut self, current_volume: f64) {
        self.volume_before_ducking = Some(current_volume);
        self.state = FocusState::Ducked;
    }

    /// Consume the ducked-volume snapshot, leaving the ducked state.
    pub fn take_ducked_volume(&mut self) -> Option<f64> {
        if self.state == FocusState::Ducked {
            self.state = FocusState::HasFocus;
        }
        self.volume_before_ducking.take()
    }

    /// Returns `true` while volume is ducked.
    pub fn is_ducked(&self) -> bool {
        self.volume_before_ducking.is_some()
    }

    /// Drop any resume/ducking memory.
    ///
    /// Called before acting on a permanent loss so a stale resume decision
    /// cannot race the resulting stop, and by explicit user commands that
    /// supersede pending intent.
    pub fn clear_memory(&mut self) {
        self.resume_pending = false;
        self.volume_before_ducking = None;
        // Dropping the snapshot ends ducking, so the state must follow.
        if self.state == FocusState::Ducked {
            self.state = FocusState::HasFocus;
        }
    }

    /// Mark the focus session fully lost (permanent loss notification).
    pub fn mark_lost(&mut self) {
        self.state = FocusState::NoFocus;
    }
}

impl std::fmt::Debug for FocusArbitrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusArbitrator")
            .field("enabled", &self.enabled)
            .field("state", &self.state)
            .field("resume_pending", &self.resume_pending)
            .field("volume_before_ducking", &self.volume_before_ducking)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use player_bridge::focus::FocusRequestOutcome;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingFocusService {
        requests: Arc<AtomicUsize>,
        abandons: Arc<AtomicUsize>,
        grant: bool,
    }

    impl FocusService for CountingFocusService {
        fn request_focus(&mut self, _attributes: &FocusAttributes) -> FocusRequestOutcome {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.grant {
                FocusRequestOutcome::Granted
            } else {
                FocusRequestOutcome::Denied
            }
        }

        fn abandon_focus(&mut self) {
            self.abandons.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn arbitrator(enabled: bool, grant: bool) -> (FocusArbitrator, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let requests = Arc::new(AtomicUsize::new(0));
        let abandons = Arc::new(AtomicUsize::new(0));
        let service = CountingFocusService {
            requests: requests.clone(),
            abandons: abandons.clone(),
            grant,
        };
        (
            FocusArbitrator::new(Box::new(service), FocusAttributes::default(), enabled),
            requests,
            abandons,
        )
    }

    #[test]
    fn disabled_arbitrator_never_calls_service() {
        let (mut arb, requests, abandons) = arbitrator(false, true);

        assert!(!arb.request());
        arb.abandon();

        assert_eq!(requests.load(Ordering::SeqCst), 0);
        assert_eq!(abandons.load(Ordering::SeqCst), 0);
        assert_eq!(arb.state(), FocusState::NoFocus);
    }

    #[test]
    fn granted_request_tracks_state() {
        let (mut arb, requests, _) = arbitrator(true, true);

        assert!(arb.request());
        assert_eq!(arb.state(), FocusState::HasFocus);
        assert_eq!(requests.load(Ordering::SeqCst), 1);

        arb.abandon();
        assert_eq!(arb.state(), FocusState::NoFocus);
    }

    #[test]
    fn denied_request_leaves_no_focus() {
        let (mut arb, _, _) = arbitrator(true, false);

        assert!(!arb.request());
        assert_eq!(arb.state(), FocusState::NoFocus);
    }

    #[test]
    fn resume_intent_is_consumed_once() {
        let (mut arb, _, _) = arbitrator(true, true);

        arb.set_resume_pending();
        assert!(arb.take_resume_pending());
        assert!(!arb.take_resume_pending());
    }

    #[test]
    fn ducking_snapshot_round_trip() {
        let (mut arb, _, _) = arbitrator(true, true);
        arb.request();

        arb.begin_ducking(0.5);
        assert!(arb.is_ducked());
        assert_eq!(arb.state(), FocusState::Ducked);

        assert_eq!(arb.take_ducked_volume(), Some(0.5));
        assert!(!arb.is_ducked());
        assert_eq!(arb.state(), FocusState::HasFocus);
    }

    #[test]
    fn clear_memory_drops_pending_intent() {
        let (mut arb, _, _) = arbitrator(true, true);

        arb.set_resume_pending();
        arb.begin_ducking(0.8);
        arb.clear_memory();

        assert!(!arb.take_resume_pending());
        assert_eq!(arb.take_ducked_volume(), None);
    }

    #[test]
    fn clear_memory_ends_the_ducked_state() {
        let (mut arb, _, _) = arbitrator(true, true);
        arb.request();
        arb.begin_ducking(0.5);

        arb.clear_memory();

        assert_eq!(arb.state(), FocusState::HasFocus);
        assert!(!arb.is_ducked());
    }
}
