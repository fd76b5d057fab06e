//! Retrying notification delivery.
//!
//! Delivery failures have no fallback channel: once the retry budget is
//! spent the failure is logged and the caller carries on.

use std::sync::Arc;

use crate::retry::RetryPolicy;

use super::sender::MessageSender;

/// Delivers notifications through a [`MessageSender`] with bounded retry.
pub struct Notifier<M> {
    sender: Arc<M>,
    policy: RetryPolicy,
}

impl<M> Clone for Notifier<M> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
            policy: self.policy,
        }
    }
}

impl<M: MessageSender> Notifier<M> {
    pub fn new(sender: Arc<M>, policy: RetryPolicy) -> Self {
        Self { sender, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Deliver `text` to `recipient`.
    ///
    /// Returns `false` when every attempt failed.
    pub async fn notify(&self, recipient: &str, text: &str) -> bool {
        let result = self
            .policy
            .run("chat.postMessage", |_| self.sender.send(recipient, text))
            .await;

        match result {
            Ok(()) => true,
            Err(exhausted) => {
                tracing::error!(
                    recipient,
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "unable to deliver message, max retries reached"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slackgpt_types::error::DeliveryError;
    use std::future::Future;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Fails the first `failures` sends, then records deliveries.
    struct FlakySender {
        failures: u32,
        calls: AtomicU32,
        delivered: Mutex<Vec<(String, String)>>,
    }

    impl FlakySender {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                delivered: Mutex::new(Vec::new()),
            }
        }
    }

    impl MessageSender for FlakySender {
        fn send(
            &self,
            recipient: &str,
            text: &str,
        ) -> impl Future<Output = Result<(), DeliveryError>> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let result = if call <= self.failures {
                Err(DeliveryError::Transport(format!("reset on call {call}")))
            } else {
                self.delivered
                    .lock()
                    .unwrap()
                    .push((recipient.to_string(), text.to_string()));
                Ok(())
            };
            async move { result }
        }
    }

    #[tokio::test]
    async fn test_notify_delivers_once() {
        let sender = Arc::new(FlakySender::new(0));
        let notifier = Notifier::new(Arc::clone(&sender), RetryPolicy::new(3));

        assert!(notifier.notify("U1", "hello").await);
        assert_eq!(sender.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *sender.delivered.lock().unwrap(),
            vec![("U1".to_string(), "hello".to_string())]
        );
    }

    #[tokio::test]
    async fn test_notify_retries_transient_failure() {
        let sender = Arc::new(FlakySender::new(2));
        let notifier = Notifier::new(Arc::clone(&sender), RetryPolicy::new(3));

        assert!(notifier.notify("U1", "hello").await);
        assert_eq!(sender.calls.load(Ordering::SeqCst), 3);
        assert_eq!(sender.delivered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notify_gives_up_after_limit() {
        let sender = Arc::new(FlakySender::new(u32::MAX));
        let notifier = Notifier::new(Arc::clone(&sender), RetryPolicy::new(3));

        assert!(!notifier.notify("U1", "hello").await);
        assert_eq!(sender.calls.load(Ordering::SeqCst), 3);
        assert!(sender.delivered.lock().unwrap().is_empty());
    }
}
