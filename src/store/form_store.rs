use std::sync::{Arc, Mutex};

use crate::store::StateSink;
use crate::utils::validation::FormErrors;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub is_submitting: bool,
    pub error: Option<String>,
    pub form_errors: FormErrors,
}

#[derive(Debug, Default)]
struct Inner {
    state: FormState,
    in_flight: usize,
}

/// Submission state of the public forms (sign-in, registration), which have
/// no resource behind them.
#[derive(Debug, Clone, Default)]
pub struct FormStore {
    inner: Arc<Mutex<Inner>>,
}

impl FormStore {
    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut guard = self.inner.lock().expect("form store mutex poisoned");
        f(&mut guard)
    }

    pub fn snapshot(&self) -> FormState {
        self.with(|inner| FormState {
            is_submitting: inner.in_flight > 0,
            ..inner.state.clone()
        })
    }

    pub fn reset(&self) {
        self.with(|inner| {
            inner.state.error = None;
            inner.state.form_errors.clear();
        })
    }

    pub fn clear(&self) {
        self.with(|inner| inner.state = FormState::default())
    }
}

impl StateSink for FormStore {
    fn begin_loading(&self) {
        self.with(|inner| inner.in_flight += 1)
    }

    fn end_loading(&self) {
        self.with(|inner| inner.in_flight = inner.in_flight.saturating_sub(1))
    }

    fn set_error(&self, error: Option<String>) {
        self.with(|inner| inner.state.error = error)
    }

    fn set_form_errors(&self, errors: FormErrors) {
        self.with(|inner| inner.state.form_errors = errors)
    }
}
