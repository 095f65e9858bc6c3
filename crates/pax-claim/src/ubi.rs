use crate::{
    analytics::{AnalyticsEvent, AnalyticsSink},
    claim_failure_status,
    countdown::{format_countdown, Countdown},
};
use alloy_primitives::U256;
use chrono::Utc;
use futures_util::future::BoxFuture;
use pax_lib::{
    eth,
    sdk::{CitizenSdkConnector, ClaimSdk, IdentitySdk},
    WalletSession,
};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::sync::watch;

pub const STATUS_CONNECT_WALLET: &str = "Please connect your wallet first";
pub const STATUS_NOT_READY: &str = "Claim system not ready. Please try again.";
pub const STATUS_NO_ENTITLEMENT: &str = "No entitlement available to claim";
pub const STATUS_PROCESSING: &str = "Processing claim...";
pub const STATUS_INIT_FAILED: &str = "Failed to initialize claim system";
pub const STATUS_ENTITLEMENT_FAILED: &str = "Failed to check entitlement";

const TOKEN_DECIMALS: u32 = 18;
const DISPLAY_DECIMALS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimPhase {
    Uninitialized,
    Initializing,
    Ready,
    Submitting,
    Succeeded,
    Failed,
}

/// Everything the hosting surface renders. Published through a watch channel
/// so observers see every transition; every async boundary in the flow ends
/// in a state write.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimState {
    pub phase: ClaimPhase,
    /// Last entitlement read, in base units. `None` until a read completes.
    pub entitlement: Option<U256>,
    pub status: String,
    /// Cooldown display, `H:MM:SS` while a countdown runs, empty otherwise.
    pub countdown: String,
}

impl Default for ClaimState {
    fn default() -> Self {
        Self {
            phase: ClaimPhase::Uninitialized,
            entitlement: None,
            status: String::new(),
            countdown: String::new(),
        }
    }
}

/// The daily-UBI claim flow.
///
/// Construction of the SDK pairing is keyed off the wallet session: call
/// [`deps_changed`][ClaimFlow::deps_changed] whenever the wallet connects,
/// disconnects or switches accounts. Re-entry is idempotent; a generation
/// counter invalidates anything still in flight from the previous
/// dependencies, including a running cooldown countdown.
pub struct ClaimFlow {
    inner: Arc<Inner>,
}

struct Inner {
    connector: Arc<dyn CitizenSdkConnector>,
    analytics: Arc<dyn AnalyticsSink>,
    state: watch::Sender<ClaimState>,
    session: Mutex<WalletSession>,
    identity: Mutex<Option<Arc<dyn IdentitySdk>>>,
    sdk: Mutex<Option<Arc<dyn ClaimSdk>>>,
    countdown: Mutex<Option<Countdown>>,
    generation: AtomicU64,
}

impl ClaimFlow {
    pub fn new(connector: Arc<dyn CitizenSdkConnector>, analytics: Arc<dyn AnalyticsSink>) -> Self {
        let (state, _) = watch::channel(ClaimState::default());
        Self {
            inner: Arc::new(Inner {
                connector,
                analytics,
                state,
                session: Mutex::new(WalletSession::disconnected()),
                identity: Mutex::new(None),
                sdk: Mutex::new(None),
                countdown: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ClaimState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> ClaimState {
        self.inner.state.borrow().clone()
    }

    /// The identity handle, once initialization has succeeded. Used by the
    /// verification flow to generate FV links.
    pub fn identity_sdk(&self) -> Option<Arc<dyn IdentitySdk>> {
        self.inner.identity.lock().unwrap().clone()
    }

    pub fn sdk_ready(&self) -> bool {
        self.inner.sdk.lock().unwrap().is_some()
    }

    /// The claim trigger is enabled iff the wallet is connected, the SDK
    /// pairing is ready, the last entitlement read was nonzero, and no
    /// submission is in flight.
    pub fn can_claim(&self) -> bool {
        let connected = self.inner.session.lock().unwrap().account().is_some();
        let ready = self.sdk_ready();
        let state = self.inner.state.borrow();
        connected
            && ready
            && state.phase != ClaimPhase::Submitting
            && state.entitlement.is_some_and(|amount| !amount.is_zero())
    }

    /// React to a dependency change: tear down whatever was built for the
    /// previous session and, if a connected account is available, run the
    /// two-step SDK construction followed by an entitlement read.
    pub async fn deps_changed(&self, session: WalletSession) {
        let inner = &self.inner;
        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *inner.session.lock().unwrap() = session;
        inner.identity.lock().unwrap().take();
        inner.sdk.lock().unwrap().take();
        inner.countdown.lock().unwrap().take();

        if session.account().is_none() {
            inner.set(|s| {
                s.phase = ClaimPhase::Uninitialized;
                s.entitlement = None;
                s.status.clear();
                s.countdown.clear();
            });
            return;
        }

        inner.set(|s| {
            s.phase = ClaimPhase::Initializing;
            s.entitlement = None;
            s.status.clear();
            s.countdown.clear();
        });

        // the claim SDK depends on a live identity handle: strictly sequential
        let identity = match inner.connector.connect_identity().await {
            Ok(identity) => identity,
            Err(error) => return inner.init_failed(generation, &error),
        };
        if inner.stale(generation) {
            return;
        }
        let sdk = match inner.connector.connect_claim(identity.clone()).await {
            Ok(sdk) => sdk,
            Err(error) => return inner.init_failed(generation, &error),
        };
        if inner.stale(generation) {
            return;
        }
        *inner.identity.lock().unwrap() = Some(identity);
        *inner.sdk.lock().unwrap() = Some(sdk);
        inner.clone().refresh_entitlement(generation).await;
    }

    /// User-triggered claim. Precondition failures are refused with a status
    /// string, never an error; the chain stays authoritative for anything
    /// the local checks miss.
    pub async fn claim(&self) {
        let inner = &self.inner;
        if inner.session.lock().unwrap().account().is_none() {
            inner.set(|s| s.status = STATUS_CONNECT_WALLET.to_owned());
            return;
        }
        let sdk = inner.sdk.lock().unwrap().clone();
        let Some(sdk) = sdk else {
            inner.set(|s| s.status = STATUS_NOT_READY.to_owned());
            return;
        };

        let mut amount = U256::ZERO;
        let mut started = false;
        inner.state.send_modify(|s| {
            if s.phase == ClaimPhase::Submitting {
                return;
            }
            amount = s.entitlement.unwrap_or(U256::ZERO);
            if amount.is_zero() {
                s.status = STATUS_NO_ENTITLEMENT.to_owned();
                return;
            }
            s.phase = ClaimPhase::Submitting;
            s.status = STATUS_PROCESSING.to_owned();
            started = true;
        });
        if !started {
            return;
        }

        let generation = inner.generation.load(Ordering::SeqCst);
        match sdk.claim().await {
            Ok(receipt) => {
                let display = eth::format_units(amount, TOKEN_DECIMALS, DISPLAY_DECIMALS);
                inner.analytics.track(AnalyticsEvent::UbiClaimed {
                    transaction_hash: receipt.transaction_hash,
                    amount: display.clone(),
                });
                if inner.stale(generation) {
                    return;
                }
                inner.set(|s| {
                    s.phase = ClaimPhase::Succeeded;
                    s.status =
                        format!("Claim successful! Check your wallet for the {display} G$ tokens.");
                });
                // reflect the post-claim state with exactly one follow-up read
                inner.clone().refresh_entitlement(generation).await;
            }
            Err(error) => {
                tracing::warn!("claim failed: {error:#}");
                if inner.stale(generation) {
                    return;
                }
                inner.set(|s| {
                    s.phase = ClaimPhase::Failed;
                    s.status = claim_failure_status(&error.to_string());
                });
            }
        }
    }
}

impl Inner {
    fn set(&self, modify: impl FnOnce(&mut ClaimState)) {
        self.state.send_modify(modify);
    }

    fn stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn init_failed(&self, generation: u64, error: &pax_lib::SdkError) {
        tracing::error!("failed to initialize claim SDK: {error:#}");
        if self.stale(generation) {
            return;
        }
        self.set(|s| {
            s.phase = ClaimPhase::Failed;
            s.status = STATUS_INIT_FAILED.to_owned();
        });
    }

    async fn refresh_entitlement(self: Arc<Self>, generation: u64) {
        let sdk = self.sdk.lock().unwrap().clone();
        let Some(sdk) = sdk else {
            return;
        };
        match sdk.check_entitlement().await {
            Ok(entitlement) => {
                if self.stale(generation) {
                    return;
                }
                if entitlement.is_claimable() {
                    // a fresh nonzero entitlement invalidates any countdown
                    self.countdown.lock().unwrap().take();
                    self.set(|s| {
                        s.phase = ClaimPhase::Ready;
                        s.entitlement = Some(entitlement.amount);
                        s.countdown.clear();
                    });
                } else {
                    self.set(|s| {
                        s.phase = ClaimPhase::Ready;
                        s.entitlement = Some(U256::ZERO);
                    });
                    self.start_countdown(sdk, generation).await;
                }
            }
            Err(error) => {
                tracing::warn!("entitlement check failed: {error:#}");
                if self.stale(generation) {
                    return;
                }
                self.set(|s| {
                    s.phase = ClaimPhase::Failed;
                    s.entitlement = None;
                    s.status = STATUS_ENTITLEMENT_FAILED.to_owned();
                });
            }
        }
    }

    fn refresh_task(self: Arc<Self>, generation: u64) -> BoxFuture<'static, ()> {
        Box::pin(self.refresh_entitlement(generation))
    }

    /// With zero entitlement and a known next-claim time, tick down once per
    /// second and re-check entitlement exactly once when the target passes.
    /// The countdown is advisory; failure to fetch the target is logged and
    /// leaves the flow in `Ready` with no ticker.
    async fn start_countdown(self: Arc<Self>, sdk: Arc<dyn ClaimSdk>, generation: u64) {
        let target = match sdk.next_claim_time().await {
            Ok(target) => target,
            Err(error) => {
                tracing::warn!("next claim time unavailable: {error:#}");
                return;
            }
        };
        if self.stale(generation) {
            return;
        }
        let total = (target - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        if total.is_zero() {
            return;
        }

        let countdown = Countdown::start(total);
        let mut ticks = countdown.subscribe();
        if let Some(remaining) = *ticks.borrow() {
            self.set(|s| s.countdown = format_countdown(remaining));
        }
        *self.countdown.lock().unwrap() = Some(countdown);

        let inner = self.clone();
        tokio::spawn(async move {
            while ticks.changed().await.is_ok() {
                let remaining = *ticks.borrow();
                if inner.stale(generation) {
                    return;
                }
                match remaining {
                    Some(remaining) => inner.set(|s| s.countdown = format_countdown(remaining)),
                    None => {
                        inner.set(|s| s.countdown.clear());
                        inner.clone().refresh_task(generation).await;
                        return;
                    }
                }
            }
        });
    }
}
