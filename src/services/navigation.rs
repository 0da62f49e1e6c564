use std::sync::{Arc, Mutex};

use tracing::debug;

/// Client-side router seam: coordinators ask for a page change, the host
/// decides how to show it.
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// In-memory history stack.
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Arc<Mutex<Vec<String>>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.entries.lock().expect("history mutex poisoned").last().cloned()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("history mutex poisoned").clone()
    }
}

impl Navigator for History {
    fn push(&self, path: &str) {
        debug!(path, "navigate");
        self.entries
            .lock()
            .expect("history mutex poisoned")
            .push(path.to_string());
    }
}
