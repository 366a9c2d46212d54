//! Write-once rendezvous between the OAuth callback and the waiting caller.
//!
//! [`channel`] returns a producer half that may be cloned into request
//! handlers and a consumer half that is awaited once. Only the first
//! [`Handoff::fulfill`] delivers a value; later calls are rejected.

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, oneshot};

use crate::{Error, Res};

/// Producer half. Cloning shares the same single slot.
pub struct Handoff<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Handoff<T> {
    fn clone(&self) -> Self {
        Handoff {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Consumer half.
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

pub fn channel<T>() -> (Handoff<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Handoff {
            slot: Arc::new(Mutex::new(Some(tx))),
        },
        Pending { rx },
    )
}

impl<T> Handoff<T> {
    /// Delivers `value` if the slot is still empty.
    ///
    /// Returns `false` when a value was already delivered or the consumer is
    /// gone; `value` is dropped in that case.
    pub async fn fulfill(&self, value: T) -> bool {
        let sender = self.slot.lock().await.take();
        match sender {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    pub async fn is_fulfilled(&self) -> bool {
        self.slot.lock().await.is_none()
    }
}

impl<T> Pending<T> {
    /// Waits for the producer.
    ///
    /// `None` waits without bound.
    ///
    /// # Errors
    ///
    /// - [`Error::AuthTimeout`] when `timeout` elapses first
    /// - [`Error::Auth`] when every producer is dropped without delivering
    pub async fn wait(self, timeout: Option<Duration>) -> Res<T> {
        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, self.rx)
                .await
                .map_err(|_| Error::AuthTimeout(limit))?,
            None => self.rx.await,
        };

        received.map_err(|_| Error::Auth("authorization handoff closed without a client".into()))
    }
}
