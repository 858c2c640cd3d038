//! Expiration Sweep Service
//!
//! Owns the recurring timer that retires options past their settlement
//! date. The sweep is single-flight: a tick that fires while the
//! previous run is still working is skipped, so two runs can never
//! double-release the same reservation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::BankingPort;
use crate::application::services::option_lifecycle::OptionLifecycleService;
use crate::domain::negotiation::repository::OfferRepository;
use crate::domain::option_contract::repository::OptionRepository;
use crate::domain::payment_saga::TrackedPaymentRepository;
use crate::domain::portfolio::repository::PortfolioRepository;

/// Periodic driver for [`OptionLifecycleService::check_expirations`].
pub struct ExpirationSweepService<Q, O, P, T, B>
where
    Q: OptionRepository,
    O: OfferRepository,
    P: PortfolioRepository,
    T: TrackedPaymentRepository,
    B: BankingPort,
{
    lifecycle: Arc<OptionLifecycleService<Q, O, P, T, B>>,
    interval: Duration,
    in_flight: Arc<Mutex<()>>,
    shutdown: CancellationToken,
}

impl<Q, O, P, T, B> ExpirationSweepService<Q, O, P, T, B>
where
    Q: OptionRepository + 'static,
    O: OfferRepository + 'static,
    P: PortfolioRepository + 'static,
    T: TrackedPaymentRepository + 'static,
    B: BankingPort + 'static,
{
    /// Create a sweep service ticking at `interval`.
    pub fn new(lifecycle: Arc<OptionLifecycleService<Q, O, P, T, B>>, interval: Duration) -> Self {
        Self {
            lifecycle,
            interval,
            in_flight: Arc::new(Mutex::new(())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Spawn the timer loop. Runs until [`Self::shutdown`] is called.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            tracing::info!(interval_secs = service.interval.as_secs(), "expiration sweep started");
            let mut ticker = tokio::time::interval(service.interval);
            // The first tick fires immediately; catch up on anything
            // that expired while the process was down.
            loop {
                tokio::select! {
                    () = service.shutdown.cancelled() => {
                        tracing::info!("expiration sweep stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        service.sweep_once().await;
                    }
                }
            }
        })
    }

    /// Run a single sweep now, unless one is already in flight.
    ///
    /// Returns true if a sweep ran, false if it was skipped.
    pub async fn sweep_once(&self) -> bool {
        // try_lock, not lock: an overlapping tick is dropped, not queued.
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("expiration sweep still running, tick skipped");
            return false;
        };

        if let Err(e) = self.lifecycle.check_expirations().await {
            tracing::error!(error = %e, "expiration sweep failed");
        }
        true
    }

    /// Ask the timer loop to stop after the current tick.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
