//! Start-Location Preference Flow.
//!
//! One decision flow per delivered fix: adopt an already-persisted "start
//! here" answer, or ask the user and persist whatever they decide. At most
//! one confirmation dialog is open at a time; a fix arriving while one is
//! pending is dropped by the flow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use waymark_domain::{PositionFix, StartPreference};
use waymark_gateways::DialogPort;
use waymark_store::StateStore;

use crate::config::PromptPolicy;

/// Question shown for the binary start-location choice.
const CONFIRM_MESSAGE: &str =
    "Do you wish to start the application at this location in the future?";

// =============================================================================
// Start Preference Flow
// =============================================================================

/// Read-decide-write flow over the persisted start-location preference.
pub struct StartPreferenceFlow {
    state: StateStore,
    dialog: Arc<dyn DialogPort>,
    policy: PromptPolicy,
    /// Session flag: a usable "start here" answer is in effect
    start_at_last_location: AtomicBool,
    /// An answered confirmation happened this session
    prompted: AtomicBool,
    /// A confirmation dialog is currently open
    prompt_open: AtomicBool,
}

impl StartPreferenceFlow {
    /// Create a flow with no session state yet.
    pub fn new(state: StateStore, dialog: Arc<dyn DialogPort>, policy: PromptPolicy) -> Self {
        Self {
            state,
            dialog,
            policy,
            start_at_last_location: AtomicBool::new(false),
            prompted: AtomicBool::new(false),
            prompt_open: AtomicBool::new(false),
        }
    }

    /// Whether a usable "start here" preference is in effect this session.
    pub fn start_at_last_location(&self) -> bool {
        self.start_at_last_location.load(Ordering::SeqCst)
    }

    /// Run the decision flow for one delivered fix.
    pub async fn on_fix(&self, fix: PositionFix) {
        if self.start_at_last_location() {
            return;
        }

        let stored = match self.state.load_preference().await {
            Ok(stored) => stored,
            Err(e) if e.is_malformed() => {
                warn!(error = %e, "Malformed start preference, treating as undecided");
                None
            }
            Err(e) => {
                // Never overwrite a persisted answer we could not read
                warn!(error = %e, "Could not read start preference, skipping prompt");
                return;
            }
        };

        if let Some(pref) = stored {
            if pref.is_usable() {
                self.start_at_last_location.store(true, Ordering::SeqCst);
                debug!("Adopted persisted start-location preference");
                return;
            }
        }

        if self.policy == PromptPolicy::OncePerSession && self.prompted.load(Ordering::SeqCst) {
            return;
        }

        if self
            .prompt_open
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Confirmation already open, dropping fix");
            return;
        }

        let answer = self.dialog.confirm(CONFIRM_MESSAGE).await;
        self.prompt_open.store(false, Ordering::SeqCst);

        let answer = match answer {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Start-location prompt failed");
                return;
            }
        };

        self.prompted.store(true, Ordering::SeqCst);

        let pref = if answer {
            self.start_at_last_location.store(true, Ordering::SeqCst);
            StartPreference::remember(fix.coord)
        } else {
            StartPreference::declined()
        };

        if let Err(e) = self.state.save_preference(&pref).await {
            warn!(error = %e, "Could not save start preference");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use waymark_domain::Coordinate;
    use waymark_gateways::StubDialog;
    use waymark_store::{keys, MemoryKvStore};

    struct Fixture {
        kv: Arc<MemoryKvStore>,
        dialog: Arc<StubDialog>,
        flow: Arc<StartPreferenceFlow>,
    }

    fn fixture(policy: PromptPolicy) -> Fixture {
        let kv = Arc::new(MemoryKvStore::new());
        let dialog = Arc::new(StubDialog::new());
        let flow = Arc::new(StartPreferenceFlow::new(
            StateStore::new(kv.clone()),
            dialog.clone(),
            policy,
        ));
        Fixture { kv, dialog, flow }
    }

    fn fix(lat: f64, lng: f64) -> PositionFix {
        PositionFix::new(Coordinate::new(lat, lng).unwrap())
    }

    #[tokio::test]
    async fn test_adopts_persisted_answer_without_prompting() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.kv.seed(
            keys::START_AT_LAST_LOCATION,
            json!({"startHere": true, "latlng": {"lat": 51.5, "lng": -0.12}}),
        );

        f.flow.on_fix(fix(48.0, 2.0)).await;

        assert!(f.flow.start_at_last_location());
        assert_eq!(f.dialog.confirm_count(), 0);
        // Nothing was rewritten
        assert_eq!(f.kv.write_count(keys::START_AT_LAST_LOCATION), 0);
    }

    #[tokio::test]
    async fn test_affirmative_persists_the_active_fix() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.dialog.push_confirm(true);

        f.flow.on_fix(fix(51.5, -0.12)).await;

        assert!(f.flow.start_at_last_location());
        let raw = f.kv.raw(keys::START_AT_LAST_LOCATION).unwrap();
        assert_eq!(raw["startHere"], true);
        assert_eq!(raw["latlng"]["lat"], 51.5);
        assert_eq!(raw["latlng"]["lng"], -0.12);
    }

    #[tokio::test]
    async fn test_negative_clears_any_earlier_ambiguity() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.dialog.push_confirm(false);

        f.flow.on_fix(fix(51.5, -0.12)).await;

        assert!(!f.flow.start_at_last_location());
        let raw = f.kv.raw(keys::START_AT_LAST_LOCATION).unwrap();
        assert_eq!(raw["startHere"], false);
        assert!(raw.get("latlng").is_none());
    }

    #[tokio::test]
    async fn test_no_reprompt_after_affirmative() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.dialog.push_confirm(true);

        f.flow.on_fix(fix(51.5, -0.12)).await;
        f.flow.on_fix(fix(48.0, 2.0)).await;
        f.flow.on_fix(fix(40.0, -3.7)).await;

        assert_eq!(f.dialog.confirm_count(), 1);
    }

    #[tokio::test]
    async fn test_once_per_session_suppresses_reprompt_after_negative() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.dialog.push_confirm(false);

        f.flow.on_fix(fix(51.5, -0.12)).await;
        f.flow.on_fix(fix(48.0, 2.0)).await;

        assert_eq!(f.dialog.confirm_count(), 1);
    }

    #[tokio::test]
    async fn test_every_fix_policy_reprompts_after_negative() {
        let f = fixture(PromptPolicy::EveryFix);
        f.dialog.push_confirm(false);
        f.dialog.push_confirm(false);

        f.flow.on_fix(fix(51.5, -0.12)).await;
        f.flow.on_fix(fix(48.0, 2.0)).await;

        assert_eq!(f.dialog.confirm_count(), 2);
    }

    #[tokio::test]
    async fn test_overlapping_fix_does_not_open_second_prompt() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.dialog.push_confirm(true);
        f.dialog.hold_confirms();

        let pending = {
            let flow = f.flow.clone();
            tokio::spawn(async move { flow.on_fix(fix(51.5, -0.12)).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(f.dialog.confirm_count(), 1);

        // A second fix while the dialog is open is dropped by the flow
        f.flow.on_fix(fix(48.0, 2.0)).await;
        assert_eq!(f.dialog.confirm_count(), 1);

        f.dialog.release_confirms();
        pending.await.unwrap();

        assert!(f.flow.start_at_last_location());
        let raw = f.kv.raw(keys::START_AT_LAST_LOCATION).unwrap();
        assert_eq!(raw["latlng"]["lat"], 51.5);
    }

    #[tokio::test]
    async fn test_read_failure_skips_prompt() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.kv.set_fail_next(true);

        f.flow.on_fix(fix(51.5, -0.12)).await;

        assert_eq!(f.dialog.confirm_count(), 0);
        assert!(f.kv.raw(keys::START_AT_LAST_LOCATION).is_none());
    }

    #[tokio::test]
    async fn test_malformed_preference_prompts_again() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.kv.seed(keys::START_AT_LAST_LOCATION, json!("yes please"));
        f.dialog.push_confirm(true);

        f.flow.on_fix(fix(51.5, -0.12)).await;

        assert_eq!(f.dialog.confirm_count(), 1);
        assert!(f.flow.start_at_last_location());
    }

    #[tokio::test]
    async fn test_inconsistent_persisted_record_prompts() {
        let f = fixture(PromptPolicy::OncePerSession);
        // startHere without a coordinate is undecided, not adoptable
        f.kv.seed(keys::START_AT_LAST_LOCATION, json!({"startHere": true}));
        f.dialog.push_confirm(false);

        f.flow.on_fix(fix(51.5, -0.12)).await;

        assert_eq!(f.dialog.confirm_count(), 1);
        assert!(!f.flow.start_at_last_location());
    }

    #[tokio::test]
    async fn test_dialog_failure_leaves_flow_retryable() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.dialog.set_fail_next(true);

        f.flow.on_fix(fix(51.5, -0.12)).await;
        assert!(f.kv.raw(keys::START_AT_LAST_LOCATION).is_none());

        // The failed attempt does not count as an answered prompt
        f.dialog.push_confirm(true);
        f.flow.on_fix(fix(51.5, -0.12)).await;
        assert!(f.flow.start_at_last_location());
    }

    #[tokio::test]
    async fn test_write_failure_is_nonfatal() {
        let f = fixture(PromptPolicy::OncePerSession);
        f.dialog.push_confirm(true);
        f.dialog.hold_confirms();

        let pending = {
            let flow = f.flow.clone();
            tokio::spawn(async move { flow.on_fix(fix(51.5, -0.12)).await })
        };
        tokio::task::yield_now().await;

        // Fail the write that follows the (already completed) read
        f.kv.set_fail_next(true);
        f.dialog.release_confirms();
        pending.await.unwrap();

        // The session flag is set even though persisting failed
        assert!(f.flow.start_at_last_location());
        assert!(f.kv.raw(keys::START_AT_LAST_LOCATION).is_none());
    }
}
