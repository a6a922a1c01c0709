//! Offline-fallback state machine
//!
//! Counts consecutive failed backend calls and switches the client into
//! offline mock mode once the count reaches a threshold. Both the counter
//! and the mock-mode flag are persisted, so a client that went offline
//! stays offline across restarts until the user switches it back.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::store::{KeyValueStoreExt, SharedStore};

use super::ApiResponse;

/// Store key for the mock-mode flag
pub const MOCK_MODE_KEY: &str = "edupulse-mock-mode";

/// Store key for the consecutive failure counter
pub const FAILURE_COUNT_KEY: &str = "edupulse-failure-count";

/// Failures needed to switch into mock mode
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 2;

/// Observable state of the fallback machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackState {
    /// No recent failures, live backend in use
    Online,

    /// Some failures, still below the threshold
    Degraded,

    /// Mock mode is on, backend calls are replaced with canned data
    OfflineMock,
}

impl fmt::Display for FallbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "Online"),
            Self::Degraded => write!(f, "Degraded"),
            Self::OfflineMock => write!(f, "OfflineMock"),
        }
    }
}

/// Point-in-time copy of the persisted values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FallbackSnapshot {
    pub failure_count: u32,
    pub mock_mode: bool,
}

impl FallbackSnapshot {
    pub fn state(&self) -> FallbackState {
        if self.mock_mode {
            FallbackState::OfflineMock
        } else if self.failure_count > 0 {
            FallbackState::Degraded
        } else {
            FallbackState::Online
        }
    }
}

/// Persisted failure counter and mock-mode flag
pub struct OfflineFallback {
    store: SharedStore,
    threshold: u32,
    snapshot: Mutex<FallbackSnapshot>,
}

impl OfflineFallback {
    /// Load the machine from `store`, defaulting to `Online` when nothing
    /// was persisted yet
    pub async fn load(store: SharedStore, threshold: u32) -> Result<Self> {
        let mock_mode = store.get_typed::<bool>(MOCK_MODE_KEY).await?.unwrap_or(false);
        let failure_count = store.get_typed::<u32>(FAILURE_COUNT_KEY).await?.unwrap_or(0);
        let snapshot = FallbackSnapshot {
            failure_count,
            mock_mode,
        };

        log::debug!(
            "Loaded offline fallback: {} (failures {}, threshold {})",
            snapshot.state(),
            failure_count,
            threshold
        );

        Ok(Self {
            store,
            threshold: threshold.max(1),
            snapshot: Mutex::new(snapshot),
        })
    }

    /// Load with the default threshold of two failures
    pub async fn load_default(store: SharedStore) -> Result<Self> {
        Self::load(store, DEFAULT_FAILURE_THRESHOLD).await
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub async fn snapshot(&self) -> FallbackSnapshot {
        *self.snapshot.lock().await
    }

    pub async fn state(&self) -> FallbackState {
        self.snapshot().await.state()
    }

    pub async fn is_mock_mode(&self) -> bool {
        self.snapshot().await.mock_mode
    }

    pub async fn failure_count(&self) -> u32 {
        self.snapshot().await.failure_count
    }

    /// A call succeeded: the counter resets, mock mode stays as it is
    pub async fn record_success(&self) -> Result<FallbackState> {
        let mut snapshot = self.snapshot.lock().await;
        if snapshot.failure_count > 0 {
            self.store.set_typed(FAILURE_COUNT_KEY, &0u32).await?;
            snapshot.failure_count = 0;
        }
        Ok(snapshot.state())
    }

    /// A call failed: the counter grows, and reaching the threshold turns
    /// mock mode on
    pub async fn record_failure(&self) -> Result<FallbackState> {
        let mut snapshot = self.snapshot.lock().await;
        let failures = snapshot.failure_count.saturating_add(1);
        self.store.set_typed(FAILURE_COUNT_KEY, &failures).await?;
        snapshot.failure_count = failures;

        if failures >= self.threshold && !snapshot.mock_mode {
            self.store.set_typed(MOCK_MODE_KEY, &true).await?;
            snapshot.mock_mode = true;
            log::warn!(
                "{} consecutive failures, switching to offline mock mode",
                failures
            );
        }

        Ok(snapshot.state())
    }

    /// Feed the outcome of a call into the machine
    pub async fn record<T>(&self, response: &ApiResponse<T>) -> Result<FallbackState> {
        if response.is_ok() {
            self.record_success().await
        } else {
            self.record_failure().await
        }
    }

    /// Turn mock mode on regardless of the counter
    pub async fn enable_mock_mode(&self) -> Result<FallbackState> {
        let mut snapshot = self.snapshot.lock().await;
        self.store.set_typed(MOCK_MODE_KEY, &true).await?;
        snapshot.mock_mode = true;
        Ok(snapshot.state())
    }

    /// Return to the live backend and clear the counter
    pub async fn disable_mock_mode(&self) -> Result<FallbackState> {
        let mut snapshot = self.snapshot.lock().await;
        self.store.set_typed(MOCK_MODE_KEY, &false).await?;
        self.store.set_typed(FAILURE_COUNT_KEY, &0u32).await?;
        *snapshot = FallbackSnapshot::default();
        log::info!("Offline mock mode disabled");
        Ok(snapshot.state())
    }

    /// Re-read the persisted values, e.g. after another process changed them
    pub async fn reload(&self) -> Result<FallbackState> {
        let mut snapshot = self.snapshot.lock().await;
        snapshot.mock_mode = self.store.get_typed::<bool>(MOCK_MODE_KEY).await?.unwrap_or(false);
        snapshot.failure_count = self.store.get_typed::<u32>(FAILURE_COUNT_KEY).await?.unwrap_or(0);
        Ok(snapshot.state())
    }
}
