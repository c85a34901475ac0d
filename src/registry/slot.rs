//! Lazily built backend list for one traffic class.
//!
//! # State Transitions
//! ```text
//! Uninitialized → Initializing: first connection request
//! Initializing → Ready: default pool resolved (list stored, never rebuilt)
//! Initializing → Failed: default pool unresolvable (next request retries)
//! Failed → Initializing: next connection request
//! ```
//!
//! The init mutex is held for the whole build, so concurrent first callers
//! wait for the winner and then observe its result, including a failure.
//! Only requests that arrive after an attempt finished start a new one.
//! Ready lists are read through a `OnceLock` without taking the mutex.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, TryLockError};

use crate::load_balancer::Backend;
use crate::observability::metrics;
use crate::registry::{ConfigurationError, RegistryError, TrafficClass};

pub type BackendList<S> = Vec<Arc<Backend<S>>>;

/// Observable state of a traffic class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassState {
    Uninitialized,
    /// Another caller is building the list right now.
    Initializing,
    /// Every attempt so far failed; the next request tries again.
    Failed { attempts: u32 },
    Ready { backends: usize },
}

#[derive(Debug, Clone)]
enum InitState {
    Uninitialized,
    /// `cause` is `None` when the build produced an empty list.
    Failed {
        attempts: u32,
        cause: Option<ConfigurationError>,
    },
    Ready,
}

pub(crate) struct BackendSlot<S> {
    class: TrafficClass,
    ready: OnceLock<BackendList<S>>,
    init: Mutex<InitState>,
    /// Finished failed attempts, readable without the mutex.
    failed_attempts: AtomicU32,
}

impl<S> BackendSlot<S> {
    pub(crate) fn new(class: TrafficClass) -> Self {
        Self {
            class,
            ready: OnceLock::new(),
            init: Mutex::new(InitState::Uninitialized),
            failed_attempts: AtomicU32::new(0),
        }
    }

    /// Return the backend list, building it with `build` if not ready yet.
    ///
    /// `build` runs at most once at a time and its result is stored only on
    /// success. An empty list is never stored. Callers that were waiting
    /// while an attempt failed get that attempt's error instead of building
    /// again.
    pub(crate) fn get_or_try_init<F>(&self, build: F) -> Result<&[Arc<Backend<S>>], RegistryError>
    where
        F: FnOnce() -> Result<BackendList<S>, ConfigurationError>,
    {
        if let Some(list) = self.ready.get() {
            return Ok(list.as_slice());
        }

        let seen = self.failed_attempts.load(Ordering::Acquire);
        let mut state = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished while we waited for the lock.
        if let Some(list) = self.ready.get() {
            return Ok(list.as_slice());
        }

        let attempts = match &*state {
            InitState::Failed { attempts, cause } => {
                if *attempts != seen {
                    return Err(self.failure(cause));
                }
                *attempts
            }
            _ => 0,
        };

        let result = build().map_err(Some).and_then(|list| {
            if list.is_empty() {
                Err(None)
            } else {
                Ok(list)
            }
        });

        match result {
            Ok(list) => {
                tracing::info!(
                    class = %self.class,
                    backends = list.len(),
                    names = ?list.iter().map(|b| b.name()).collect::<Vec<_>>(),
                    "Data sources ready"
                );
                metrics::record_initialization(self.class, true);
                *state = InitState::Ready;
                Ok(self.ready.get_or_init(|| list).as_slice())
            }
            Err(cause) => {
                let attempts = attempts.saturating_add(1);
                let error = self.failure(&cause);
                tracing::error!(
                    class = %self.class,
                    attempts,
                    error = %error,
                    "Data source initialization failed, will retry on next request"
                );
                metrics::record_initialization(self.class, false);
                *state = InitState::Failed { attempts, cause };
                self.failed_attempts.store(attempts, Ordering::Release);
                Err(error)
            }
        }
    }

    fn failure(&self, cause: &Option<ConfigurationError>) -> RegistryError {
        match cause {
            Some(e) => e.clone().into(),
            None => RegistryError::NoBackends(self.class),
        }
    }

    pub(crate) fn get(&self) -> Option<&[Arc<Backend<S>>]> {
        self.ready.get().map(Vec::as_slice)
    }

    pub(crate) fn state(&self) -> ClassState {
        if let Some(list) = self.ready.get() {
            return ClassState::Ready { backends: list.len() };
        }
        let guard = match self.init.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return ClassState::Initializing,
        };
        match &*guard {
            InitState::Uninitialized => ClassState::Uninitialized,
            InitState::Failed { attempts, .. } => ClassState::Failed { attempts: *attempts },
            // Ready is only set after the list is stored
            InitState::Ready => ClassState::Initializing,
        }
    }
}
