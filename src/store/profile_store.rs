use std::sync::{Arc, Mutex};

use crate::store::StateSink;
use crate::utils::validation::FormErrors;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileState<T> {
    pub profile: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub form_errors: FormErrors,
}

impl<T> Default for ProfileState<T> {
    fn default() -> Self {
        Self {
            profile: None,
            is_loading: false,
            error: None,
            form_errors: FormErrors::new(),
        }
    }
}

#[derive(Debug)]
struct Inner<T> {
    state: ProfileState<T>,
    in_flight: usize,
}

/// Cached profile of the signed-in principal (user or company).
#[derive(Debug)]
pub struct ProfileStore<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for ProfileStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ProfileStore<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: ProfileState::default(),
                in_flight: 0,
            })),
        }
    }
}

impl<T: Clone> ProfileStore<T> {
    fn with<R>(&self, f: impl FnOnce(&mut Inner<T>) -> R) -> R {
        let mut guard = self.inner.lock().expect("profile store mutex poisoned");
        f(&mut guard)
    }

    pub fn snapshot(&self) -> ProfileState<T> {
        self.with(|inner| {
            let mut state = inner.state.clone();
            state.is_loading = inner.in_flight > 0;
            state
        })
    }

    pub fn profile(&self) -> Option<T> {
        self.with(|inner| inner.state.profile.clone())
    }

    pub fn set_profile(&self, profile: T) {
        self.with(|inner| {
            inner.state.profile = Some(profile);
            inner.state.error = None;
        })
    }

    /// Applies `f` to the cached profile, if any.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.with(|inner| {
            if let Some(profile) = inner.state.profile.as_mut() {
                f(profile);
            }
        })
    }

    pub fn clear_form_errors(&self) {
        self.with(|inner| inner.state.form_errors.clear())
    }

    pub fn clear(&self) {
        self.with(|inner| inner.state = ProfileState::default())
    }
}

impl<T: Clone + Send> StateSink for ProfileStore<T> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::UserProfile;

    fn ana() -> UserProfile {
        UserProfile {
            name: "ANA SILVA".into(),
            username: "ana123".into(),
            email: None,
            phone: None,
            experience: None,
            education: None,
        }
    }

    #[test]
    fn set_update_clear() {
        let store = ProfileStore::<UserProfile>::default();
        store.set_error(Some("boom".into()));
        store.set_profile(ana());
        assert_eq!(store.snapshot().error, None);

        store.update(|p| p.phone = Some("41999990000".into()));
        assert_eq!(store.profile().unwrap().phone.as_deref(), Some("41999990000"));

        store.clear();
        assert_eq!(store.snapshot(), ProfileState::default());
    }

    #[test]
    fn update_without_cache_is_noop() {
        let store = ProfileStore::<UserProfile>::default();
        store.update(|p| p.name = "X".into());
        assert!(store.profile().is_none());
    }
}
