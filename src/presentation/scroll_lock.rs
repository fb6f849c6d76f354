use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

const HIDDEN: &str = "hidden";

/// Document-level overflow style, as a CSS value. An empty string means unset.
pub trait PageStyle: Send + Sync {
    fn overflow(&self) -> String;
    fn set_overflow(&self, value: &str);
}

#[derive(Debug, Default)]
pub struct InMemoryPageStyle {
    overflow: Mutex<String>,
}

impl InMemoryPageStyle {
    pub fn with_overflow(value: impl Into<String>) -> Self {
        Self {
            overflow: Mutex::new(value.into()),
        }
    }
}

impl PageStyle for InMemoryPageStyle {
    fn overflow(&self) -> String {
        self.overflow
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_overflow(&self, value: &str) {
        *self.overflow.lock().unwrap_or_else(PoisonError::into_inner) = value.to_string();
    }
}

#[derive(Debug, Default)]
struct LockState {
    holders: usize,
    saved: Option<String>,
}

struct Shared {
    page: Arc<dyn PageStyle>,
    state: Mutex<LockState>,
}

/// Reference-counted page scroll suppression.
///
/// The first holder saves the page overflow and hides it; the last one to
/// release puts the saved value back. Overlays can nest freely.
#[derive(Clone)]
pub struct ScrollLock {
    shared: Arc<Shared>,
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &self.holders())
            .finish()
    }
}

impl ScrollLock {
    pub fn new(page: Arc<dyn PageStyle>) -> Self {
        Self {
            shared: Arc::new(Shared {
                page,
                state: Mutex::new(LockState::default()),
            }),
        }
    }

    #[must_use = "the page unlocks as soon as the guard is dropped"]
    pub fn acquire(&self) -> ScrollLockGuard {
        let mut state = self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if state.holders == 0 {
            state.saved = Some(self.shared.page.overflow());
            self.shared.page.set_overflow(HIDDEN);
        }
        state.holders += 1;
        ScrollLockGuard {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn holders(&self) -> usize {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .holders
    }

    pub fn is_locked(&self) -> bool {
        self.holders() > 0
    }
}

pub struct ScrollLockGuard {
    shared: Arc<Shared>,
}

impl fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScrollLockGuard")
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let mut state = self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.holders = state.holders.saturating_sub(1);
        if state.holders == 0 {
            if let Some(saved) = state.saved.take() {
                self.shared.page.set_overflow(&saved);
            }
        }
    }
}
