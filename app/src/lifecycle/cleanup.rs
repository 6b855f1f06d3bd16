use models::schemas::lifecycle::{CleanupOutcome, ExpiryProbe};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    config::LifecycleConfig,
    error::{LifecycleError, Result},
    store::TournamentStore,
};

/// Polling frequency. Every tier runs the same sweep, only the period differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupTier {
    Normal,
    Aggressive,
    UltraAggressive,
}

impl CleanupTier {
    pub fn interval(self, config: &LifecycleConfig) -> Duration {
        match self {
            CleanupTier::Normal => config.cleanup_interval,
            CleanupTier::Aggressive => config.aggressive_interval,
            CleanupTier::UltraAggressive => config.ultra_interval,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "normal" => Some(CleanupTier::Normal),
            "aggressive" => Some(CleanupTier::Aggressive),
            "ultra" | "ultra-aggressive" => Some(CleanupTier::UltraAggressive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pass {
    Expired,
    Backstop,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Sweep {
    deleted: usize,
    failed: usize,
}

/// The part of the agent that poller tasks carry around.
#[derive(Clone)]
struct Sweeper {
    store: Arc<dyn TournamentStore>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
}

impl Sweeper {
    async fn run(&self, pass: Pass) -> Result<Sweep> {
        let now = self.clock.now();
        let targets = match pass {
            Pass::Expired => self.store.find_expired(now).await?,
            Pass::Backstop => {
                self.store
                    .find_stale_untagged(now - self.config.ttl_after_start)
                    .await?
            }
        };

        let mut sweep = Sweep::default();
        for tournament in targets {
            match self.store.delete(&tournament.id).await {
                Ok(true) => sweep.deleted += 1,
                // Another session got there first.
                Ok(false) => debug!(tournament = %tournament.id, "Tournament already deleted"),
                Err(e) => {
                    warn!(tournament = %tournament.id, ?pass, "Failed to delete tournament: {}", e);
                    sweep.failed += 1;
                }
            }
        }
        Ok(sweep)
    }

    async fn probe(&self) -> Result<ExpiryProbe> {
        let now = self.clock.now();
        let expired = self.store.find_expired(now).await?;
        let stale = self
            .store
            .find_stale_untagged(now - self.config.ttl_after_start)
            .await?;

        Ok(ExpiryProbe {
            expired: expired.into_iter().map(|t| t.id).collect(),
            stale_untagged: stale.into_iter().map(|t| t.id).collect(),
        })
    }

    fn spawn_poller(&self, pass: Pass, period: Duration) -> JoinHandle<()> {
        let sweeper = self.clone();
        tokio::spawn(async move {
            let budget = tick_budget(period);
            let mut interval = tokio::time::interval(period);
            // A slow tick is superseded by the next one rather than queued behind it.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match tokio::time::timeout(budget, sweeper.run(pass)).await {
                    Ok(Ok(sweep)) if sweep.deleted > 0 || sweep.failed > 0 => info!(
                        ?pass,
                        deleted = sweep.deleted,
                        failed = sweep.failed,
                        "Cleanup tick finished"
                    ),
                    Ok(Ok(_)) => debug!(?pass, "Cleanup tick found nothing"),
                    Ok(Err(e)) => warn!(?pass, "Cleanup tick failed: {}", e),
                    Err(_) => warn!(?pass, "Cleanup tick abandoned: {}", LifecycleError::Timeout),
                }
            }
        })
    }
}

/// How long one tick may spend on the store before it is abandoned.
fn tick_budget(period: Duration) -> Duration {
    period / 2
}

#[derive(Default)]
struct AgentState {
    initialized: bool,
    pollers: BTreeMap<CleanupTier, JoinHandle<()>>,
    backstop: Option<JoinHandle<()>>,
}

/// Session-side cleanup loop.
///
/// Any number of agents may run against the same store at once; they never
/// coordinate and do not need to, since deletes are idempotent. Pollers are
/// aborted on [`CleanupAgent::stop`] or when the agent is dropped.
pub struct CleanupAgent {
    sweeper: Sweeper,
    state: Mutex<AgentState>,
}

impl CleanupAgent {
    pub fn new(
        store: Arc<dyn TournamentStore>,
        clock: Arc<dyn Clock>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            sweeper: Sweeper {
                store,
                clock,
                config,
            },
            state: Mutex::new(AgentState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, AgentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts the normal-tier poller and the backstop poller.
    ///
    /// Only the first call does anything; returns whether this call started them.
    /// Must be called from within a tokio runtime.
    pub fn initialize_cleanup(&self) -> bool {
        let mut state = self.state();
        if state.initialized {
            debug!("Cleanup agent already initialized");
            return false;
        }
        state.initialized = true;

        self.enable_locked(&mut state, CleanupTier::Normal);
        let backstop = self
            .sweeper
            .spawn_poller(Pass::Backstop, self.sweeper.config.backstop_interval);
        state.backstop = Some(backstop);

        info!("Cleanup agent initialized");
        true
    }

    pub fn start_aggressive_cleanup(&self) -> bool {
        self.enable(CleanupTier::Aggressive)
    }

    pub fn start_ultra_aggressive_cleanup(&self) -> bool {
        self.enable(CleanupTier::UltraAggressive)
    }

    /// Starts the poller for `tier` unless it is already running.
    pub fn enable(&self, tier: CleanupTier) -> bool {
        let mut state = self.state();
        self.enable_locked(&mut state, tier)
    }

    fn enable_locked(&self, state: &mut AgentState, tier: CleanupTier) -> bool {
        if state.pollers.contains_key(&tier) {
            return false;
        }
        let period = tier.interval(&self.sweeper.config);
        info!(?tier, ?period, "Starting cleanup poller");
        state
            .pollers
            .insert(tier, self.sweeper.spawn_poller(Pass::Expired, period));
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    pub fn running_tiers(&self) -> Vec<CleanupTier> {
        self.state().pollers.keys().copied().collect()
    }

    /// Aborts every poller. The agent can be initialized again afterwards.
    pub fn stop(&self) {
        let mut state = self.state();
        for (_, handle) in std::mem::take(&mut state.pollers) {
            handle.abort();
        }
        if let Some(handle) = state.backstop.take() {
            handle.abort();
        }
        if state.initialized {
            info!("Cleanup agent stopped");
        }
        state.initialized = false;
    }

    /// One forced pass over everything past its `ttl`.
    pub async fn delete_expired_tournaments(&self) -> CleanupOutcome {
        match self.sweeper.run(Pass::Expired).await {
            Ok(Sweep { deleted, failed: 0 }) => {
                info!(deleted, "Manual cleanup finished");
                CleanupOutcome::deleted(deleted)
            }
            Ok(Sweep { deleted, failed }) => CleanupOutcome::failed(
                deleted,
                format!("Failed to delete {failed} expired tournaments"),
            ),
            Err(e) => {
                warn!("Manual cleanup failed: {}", e);
                CleanupOutcome::failed(0, e.to_string())
            }
        }
    }

    /// Deletes tournaments that started over `ttl_after_start` ago and were
    /// never tagged. Returns how many were removed.
    pub async fn run_backstop(&self) -> Result<usize> {
        let sweep = self.sweeper.run(Pass::Backstop).await?;
        if sweep.deleted > 0 {
            info!(deleted = sweep.deleted, "Backstop removed untagged tournaments");
        }
        Ok(sweep.deleted)
    }

    /// Reports what a cleanup pass would remove, without touching anything.
    pub async fn check_for_expired_tournaments(&self) -> Result<ExpiryProbe> {
        self.sweeper.probe().await
    }
}

impl Drop for CleanupAgent {
    fn drop(&mut self) {
        self.stop();
    }
}
