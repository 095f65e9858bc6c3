//! Claim engine: drives the daily-UBI and engagement-reward claim sequences
//! against the SDK seams defined in `pax-lib`, and publishes every state
//! transition for the hosting surface to render.
//!
//! Table of contents:
//! - [`ubi`]: the daily-UBI claim flow and its state machine.
//! - [`countdown`]: the cancellable cooldown ticker.
//! - [`engagement`]: the engagement-reward claim sequence.
//! - [`app_signature`]: client for the backend app-signature endpoint.
//! - [`verification`]: wallet verification status and the FV-link flow.
//! - [`analytics`]: event vocabulary and delivery sinks.
//! - [`attribution`]: ad click-id persistence.
//! - [`balance`]: token balance reads for the home screen.

pub mod analytics;
pub mod app_signature;
pub mod attribution;
pub mod balance;
pub mod countdown;
pub mod engagement;
pub mod ubi;
pub mod verification;

pub use analytics::{AnalyticsEvent, AnalyticsSink, NoopSink, PixelSink};
pub use app_signature::{AppSignatureApi, HttpAppSignatureClient};
pub use attribution::ClickIdStore;
pub use balance::TokenInfo;
pub use countdown::Countdown;
pub use engagement::{EngagementFlow, EngagementState};
pub use ubi::{ClaimFlow, ClaimPhase, ClaimState};
pub use verification::VerificationStatus;

pub(crate) const COOLDOWN_PATTERN: &str = "Claim cooldown not reached";
pub(crate) const COOLDOWN_FRIENDLY: &str =
    "You already claimed. Try again after the cooldown period.";

/// Submission failures surface the underlying message verbatim, except for
/// the known cooldown rejection, which gets the friendly wording.
pub(crate) fn claim_failure_status(message: &str) -> String {
    if message.contains(COOLDOWN_PATTERN) {
        COOLDOWN_FRIENDLY.to_owned()
    } else {
        format!("Claim failed: {message}")
    }
}
