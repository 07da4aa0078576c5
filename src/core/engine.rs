//! # Engine Session
//!
//! Readiness of the language-model engine, shared between whoever starts it
//! and whoever waits on it.
//!
//! ```text
//! Uninitialized ──initialize()──► Initializing{progress} ──► Ready
//!                                        │
//!                                        └──────────────────► Failed(reason)
//! ```
//!
//! State lives in a `tokio::sync::watch` channel so any number of observers
//! can follow progress. A second `initialize()` while one is in flight is
//! rejected rather than queued.

use std::fmt;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::watch;

use crate::inference::CompletionProvider;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineState {
    Uninitialized,
    Initializing { progress: f32, label: String },
    Ready,
    Failed(String),
}

impl EngineState {
    pub fn is_ready(&self) -> bool {
        matches!(self, EngineState::Ready)
    }

    /// Short human-readable form for status lines.
    pub fn describe(&self) -> String {
        match self {
            EngineState::Uninitialized => "Model not loaded".to_string(),
            EngineState::Initializing { progress, label } => {
                format!("{label} ({:.0}%)", progress.clamp(0.0, 1.0) * 100.0)
            }
            EngineState::Ready => "Model ready".to_string(),
            EngineState::Failed(reason) => format!("Model failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// `initialize` was called while another initialization is running.
    AlreadyInitializing,
    /// Initialization finished unsuccessfully.
    Failed(String),
    /// The engine did not become ready in time.
    Timeout(Duration),
    /// Nobody is driving the session any more.
    Closed,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::AlreadyInitializing => write!(f, "model is already initializing"),
            EngineError::Failed(reason) => write!(f, "model failed to initialize: {reason}"),
            EngineError::Timeout(after) => {
                write!(f, "model not ready after {}s", after.as_secs())
            }
            EngineError::Closed => write!(f, "model session closed"),
        }
    }
}

impl std::error::Error for EngineError {}

pub struct EngineSession {
    state: watch::Sender<EngineState>,
}

impl Default for EngineSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(EngineState::Uninitialized);
        Self { state }
    }

    pub fn state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.subscribe()
    }

    /// Records initialization progress. Ignored unless currently initializing.
    pub fn report_progress(&self, progress: f32, label: &str) {
        self.state.send_if_modified(|state| {
            if !matches!(state, EngineState::Initializing { .. }) {
                return false;
            }
            *state = EngineState::Initializing {
                progress: progress.clamp(0.0, 1.0),
                label: label.to_string(),
            };
            true
        });
    }

    /// Brings the engine up using the provider's readiness hook.
    ///
    /// Allowed from `Uninitialized` and `Failed` (retry), and a no-op once
    /// `Ready`.
    pub async fn initialize(
        &self,
        provider: &dyn CompletionProvider,
        model: &str,
    ) -> Result<(), EngineError> {
        let mut already_ready = false;
        let started = self.state.send_if_modified(|state| match state {
            EngineState::Initializing { .. } => false,
            EngineState::Ready => {
                already_ready = true;
                false
            }
            _ => {
                *state = EngineState::Initializing {
                    progress: 0.0,
                    label: "Starting".to_string(),
                };
                true
            }
        });
        if already_ready {
            return Ok(());
        }
        if !started {
            warn!("Ignoring initialize: already in progress");
            return Err(EngineError::AlreadyInitializing);
        }

        info!("Initializing {} for model {}", provider.name(), model);
        let progress = |fraction: f32, label: &str| self.report_progress(fraction, label);
        match provider.prepare(model, &progress).await {
            Ok(()) => {
                info!("Engine ready");
                self.state.send_replace(EngineState::Ready);
                Ok(())
            }
            Err(e) => {
                warn!("Engine initialization failed: {}", e);
                self.state.send_replace(EngineState::Failed(e.to_string()));
                Err(EngineError::Failed(e.to_string()))
            }
        }
    }

    /// Waits until the engine is `Ready`, failing fast on `Failed` and giving
    /// up after `timeout`. Does not start initialization itself.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<(), EngineError> {
        let mut rx = self.state.subscribe();
        let wait = async {
            loop {
                let outcome = match &*rx.borrow_and_update() {
                    EngineState::Ready => Some(Ok(())),
                    EngineState::Failed(reason) => Some(Err(EngineError::Failed(reason.clone()))),
                    _ => None,
                };
                if let Some(outcome) = outcome {
                    return outcome;
                }
                if rx.changed().await.is_err() {
                    return Err(EngineError::Closed);
                }
            }
        };
        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| EngineError::Timeout(timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_initialize_reaches_ready() {
        let session = EngineSession::new();
        assert_eq!(session.state(), EngineState::Uninitialized);

        session
            .initialize(&ScriptedProvider::answering("- A"), "m")
            .await
            .unwrap();
        assert!(session.is_ready());
        assert_eq!(session.wait_ready(Duration::from_millis(10)).await, Ok(()));
    }

    #[tokio::test]
    async fn test_failed_prepare_is_reported() {
        let session = EngineSession::new();
        let provider = ScriptedProvider::answering("- A").failing_prepare("no GPU");

        let result = session.initialize(&provider, "m").await;
        assert!(matches!(result, Err(EngineError::Failed(_))));
        assert!(matches!(session.state(), EngineState::Failed(reason) if reason.contains("no GPU")));
        assert!(matches!(
            session.wait_ready(Duration::from_millis(10)).await,
            Err(EngineError::Failed(_))
        ));
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let session = EngineSession::new();
        let failing = ScriptedProvider::answering("- A").failing_prepare("offline");
        tokio_test::assert_err!(session.initialize(&failing, "m").await);

        tokio_test::assert_ok!(
            session
                .initialize(&ScriptedProvider::answering("- A"), "m")
                .await
        );
        assert!(session.is_ready());
    }

    #[tokio::test]
    async fn test_wait_ready_times_out_when_never_started() {
        let session = EngineSession::new();
        let result = session.wait_ready(Duration::from_millis(20)).await;
        assert_eq!(result, Err(EngineError::Timeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_second_initialize_is_rejected_while_running() {
        let session = Arc::new(EngineSession::new());
        let provider = Arc::new(ScriptedProvider::answering("- A").slow_prepare(Duration::from_millis(100)));

        let first = {
            let session = Arc::clone(&session);
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { session.initialize(provider.as_ref(), "m").await })
        };
        // Let the first call flip the state to Initializing
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(matches!(session.state(), EngineState::Initializing { .. }));

        let second = session.initialize(provider.as_ref(), "m").await;
        assert_eq!(second, Err(EngineError::AlreadyInitializing));

        assert_eq!(first.await.unwrap(), Ok(()));
        assert!(session.is_ready());
    }

    #[tokio::test]
    async fn test_waiter_sees_ready_from_other_task() {
        let session = Arc::new(EngineSession::new());
        let waiter = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.wait_ready(Duration::from_secs(5)).await })
        };
        session
            .initialize(&ScriptedProvider::answering("- A"), "m")
            .await
            .unwrap();
        assert_eq!(waiter.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_progress_is_observable() {
        let session = EngineSession::new();
        let mut rx = session.subscribe();
        session
            .initialize(&ScriptedProvider::answering("- A"), "m")
            .await
            .unwrap();
        // The receiver was created before initialize; it now sees the final state
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), EngineState::Ready);
    }

    #[test]
    fn test_progress_ignored_outside_initializing() {
        let session = EngineSession::new();
        session.report_progress(0.5, "loading");
        assert_eq!(session.state(), EngineState::Uninitialized);
    }

    #[test]
    fn test_describe() {
        let state = EngineState::Initializing {
            progress: 0.4,
            label: "Loading weights".to_string(),
        };
        assert_eq!(state.describe(), "Loading weights (40%)");
        assert_eq!(EngineState::Ready.describe(), "Model ready");
    }
}
