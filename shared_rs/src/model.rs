use std::{
    sync::{Arc, RwLock},
    time::Instant,
};

use async_trait::async_trait;

/// A loaded model runtime owned by a service for its whole lifetime.
#[async_trait]
pub trait ModelHandle: Send + Sync {
    /// Frees the runtime's resources. Called at most once, on shutdown.
    async fn close(&self) {}
}

/// Install-once, release-once holder for a service's model handle.
///
/// Requests read a clone of the `Arc`; a request already in flight keeps its
/// handle alive even if the slot is released under it.
pub struct ModelSlot<M: ?Sized + ModelHandle> {
    inner: RwLock<Option<Arc<M>>>,
}

impl<M: ?Sized + ModelHandle> ModelSlot<M> {
    pub fn empty() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    pub fn loaded(model: Arc<M>) -> Self {
        Self {
            inner: RwLock::new(Some(model)),
        }
    }

    /// Returns `false` when a model is already installed; the new one is dropped.
    pub fn install(&self, model: Arc<M>) -> bool {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_some() {
            tracing::warn!("model slot already holds a model; ignoring second install");
            return false;
        }
        *guard = Some(model);
        true
    }

    pub fn get(&self) -> Option<Arc<M>> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.get().is_some()
    }

    /// Takes the model out and closes it. Later calls are no-ops and return `false`.
    pub async fn release(&self) -> bool {
        let taken = match self.inner.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match taken {
            Some(model) => {
                tracing::info!("releasing model handle");
                model.close().await;
                true
            }
            None => false,
        }
    }
}

impl<M: ?Sized + ModelHandle> Default for ModelSlot<M> {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    started_at: Instant,
}

impl Uptime {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    /// Seconds since start, rounded to one decimal.
    pub fn seconds(&self) -> f64 {
        (self.started_at.elapsed().as_secs_f64() * 10.0).round() / 10.0
    }
}
