//! Process-wide, lazily-initialised model handles.
//!
//! A `LazyModel` loads its model on the first `get()` and hands out the same
//! `Arc` to every later caller. Loading is serialised by a mutex so concurrent
//! first calls load once; a failed load leaves the handle empty and the next
//! call tries again.

use crate::error::{MultisumError, Result};
use std::sync::{Arc, Mutex, OnceLock};

type Loader<T> = Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>;

pub struct LazyModel<T: ?Sized> {
    name: String,
    cell: OnceLock<Arc<T>>,
    load_lock: Mutex<()>,
    loader: Loader<T>,
}

impl<T: ?Sized + Send + Sync + 'static> LazyModel<T> {
    /// Handle that runs `loader` on first use.
    pub fn new<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            cell: OnceLock::new(),
            load_lock: Mutex::new(()),
            loader: Box::new(loader),
        }
    }

    /// Handle around an already loaded model.
    pub fn ready(name: impl Into<String>, model: Arc<T>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::clone(&model));
        Self {
            name: name.into(),
            cell,
            load_lock: Mutex::new(()),
            loader: Box::new(move || Ok(Arc::clone(&model))),
        }
    }

    /// Shared model, loading it if this is the first call.
    pub fn get(&self) -> Result<Arc<T>> {
        if let Some(model) = self.cell.get() {
            return Ok(Arc::clone(model));
        }

        let _guard = self
            .load_lock
            .lock()
            .map_err(|e| MultisumError::model(format!("Model load lock poisoned: {e}")))?;

        // Another caller may have finished loading while we waited
        if let Some(model) = self.cell.get() {
            return Ok(Arc::clone(model));
        }

        let started = std::time::Instant::now();
        let model = (self.loader)()?;
        tracing::info!(
            model = %self.name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model loaded"
        );

        let _ = self.cell.set(Arc::clone(&model));
        Ok(model)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: ?Sized> std::fmt::Debug for LazyModel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyModel")
            .field("name", &self.name)
            .field("loaded", &self.cell.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn loads_once_and_shares_the_same_arc() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let lazy = LazyModel::new("counter", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(42u32))
        });

        assert!(!lazy.is_loaded());
        let first = lazy.get().unwrap();
        let second = lazy.get().unwrap();

        assert!(lazy.is_loaded());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_first_calls_load_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let lazy = Arc::new(LazyModel::new("slow", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            Ok(Arc::new(String::from("model")))
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lazy = Arc::clone(&lazy);
                thread::spawn(move || lazy.get().unwrap())
            })
            .collect();
        let models: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(models.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn failed_load_is_retried_on_next_call() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let lazy = LazyModel::new("flaky", move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(MultisumError::model("first load fails"))
            } else {
                Ok(Arc::new(7u8))
            }
        });

        assert!(lazy.get().is_err());
        assert!(!lazy.is_loaded());
        assert_eq!(*lazy.get().unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn ready_handle_is_loaded_up_front() {
        let model: Arc<dyn std::fmt::Debug + Send + Sync> = Arc::new("preloaded");
        let lazy = LazyModel::ready("preloaded", Arc::clone(&model));

        assert!(lazy.is_loaded());
        assert!(Arc::ptr_eq(&lazy.get().unwrap(), &model));
        assert_eq!(lazy.name(), "preloaded");
    }
}
