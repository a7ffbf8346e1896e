use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use thiserror::Error;

static LISTENER_ACTIVE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListenerError {
    #[error("a keyboard listener is already registered")]
    AlreadyRegistered,
}

/// Process-wide keyboard listener registration.
///
/// At most one guard exists at a time; dropping it deregisters the listener,
/// so teardown by early return, `?` or unwinding all release it.
#[derive(Debug)]
pub struct ListenerGuard {
    _private: (),
}

impl ListenerGuard {
    pub fn register() -> Result<Self, ListenerError> {
        LISTENER_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ListenerError::AlreadyRegistered)?;
        debug!("Keyboard listener registered");
        Ok(Self { _private: () })
    }

    pub fn is_registered() -> bool {
        LISTENER_ACTIVE.load(Ordering::Acquire)
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        LISTENER_ACTIVE.store(false, Ordering::Release);
        debug!("Keyboard listener deregistered");
    }
}
