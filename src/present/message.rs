use std::sync::{Arc, Mutex, PoisonError};

/// Speech-bubble text shared between the feed poller and the render loop.
///
/// Cloning yields another handle to the same slot. A message persists until
/// replaced; an empty string clears it.
#[derive(Debug, Clone, Default)]
pub struct MessageSlot {
    inner: Arc<Mutex<Option<Arc<str>>>>,
}

impl MessageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the message. Returns false if it was already showing.
    pub fn set(&self, text: &str) -> bool {
        let next = (!text.is_empty()).then(|| Arc::<str>::from(text));
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if *slot == next {
            return false;
        }
        *slot = next;
        true
    }

    pub fn get(&self) -> Option<Arc<str>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
