//! A small saga runner for multi-step operations across independent systems.
//!
//! The identity provider and the relational store are administratively
//! independent, so no native multi-resource transaction exists. Instead,
//! each step that succeeds registers a compensation; when a later step
//! fails, [`Saga::unwind`] runs the registered compensations in reverse
//! order. A compensation that itself fails is logged and skipped so the
//! original failure still reaches the caller — after that the system is not
//! guaranteed consistent and operators reconcile manually.

use futures::future::BoxFuture;

/// Error type compensations may return; only ever logged.
pub type CompensationError = Box<dyn std::error::Error + Send + Sync>;

struct Compensation {
    label: &'static str,
    undo: BoxFuture<'static, Result<(), CompensationError>>,
}

/// Collects compensations for completed steps of one logical operation.
#[derive(Default)]
pub struct Saga {
    compensations: Vec<Compensation>,
}

impl Saga {
    /// Create an empty saga.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the compensation for a step that just succeeded.
    pub fn push<F>(&mut self, label: &'static str, undo: F)
    where
        F: Future<Output = Result<(), CompensationError>> + Send + 'static,
    {
        self.compensations.push(Compensation {
            label,
            undo: Box::pin(undo),
        });
    }

    /// The operation succeeded; drop all compensations without running them.
    pub fn commit(mut self) {
        self.compensations.clear();
    }

    /// A step failed; run the registered compensations in reverse order.
    ///
    /// Compensation failures never propagate. They are logged at ERROR so an
    /// operator can reconcile the stores by hand.
    pub async fn unwind(self) {
        for compensation in self.compensations.into_iter().rev() {
            tracing::debug!(step = compensation.label, "running compensation");
            if let Err(error) = compensation.undo.await {
                tracing::error!(
                    step = compensation.label,
                    error = %error,
                    "compensation failed; manual reconciliation required"
                );
            }
        }
    }

    /// Number of registered compensations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compensations.len()
    }

    /// True when no compensations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compensations.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, entry: &'static str) -> impl Future<Output = Result<(), CompensationError>> + Send + 'static {
        let log = Arc::clone(log);
        async move {
            log.lock().unwrap().push(entry);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unwind_runs_in_reverse_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut saga = Saga::new();
        saga.push("first", recorder(&log, "first"));
        saga.push("second", recorder(&log, "second"));
        saga.push("third", recorder(&log, "third"));

        saga.unwind().await;

        assert_eq!(*log.lock().unwrap(), vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_commit_skips_compensations() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut saga = Saga::new();
        saga.push("only", recorder(&log, "only"));

        saga.commit();

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_compensation_does_not_stop_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut saga = Saga::new();
        saga.push("first", recorder(&log, "first"));
        saga.push("failing", async { Err::<(), CompensationError>("boom".into()) });

        saga.unwind().await;

        assert_eq!(*log.lock().unwrap(), vec!["first"]);
    }
}
