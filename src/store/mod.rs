pub mod form_store;
pub mod jobs_store;
pub mod profile_store;

use crate::models::profile::{CompanyProfile, UserProfile};
use crate::utils::validation::FormErrors;

pub use form_store::{FormState, FormStore};
pub use jobs_store::{JobsState, JobsStore, Slice, Ticket};
pub use profile_store::{ProfileState, ProfileStore};

/// Loading/error bookkeeping every resource store exposes to the shared
/// failure policy.
pub trait StateSink: Send + Sync {
    fn begin_loading(&self);
    fn end_loading(&self);
    fn set_error(&self, error: Option<String>);
    fn set_form_errors(&self, errors: FormErrors);
}

/// Holds the loading flag up for as long as it lives. Dropping it (return,
/// `?`, panic) always releases the flag.
pub struct LoadingGuard<'a> {
    sink: &'a dyn StateSink,
}

impl<'a> LoadingGuard<'a> {
    pub fn new(sink: &'a dyn StateSink) -> Self {
        sink.begin_loading();
        Self { sink }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.sink.end_loading();
    }
}

/// All client-held resource state. Cloning shares the same containers.
#[derive(Clone, Default)]
pub struct Stores {
    pub auth: FormStore,
    pub jobs: JobsStore,
    pub user: ProfileStore<UserProfile>,
    pub company: ProfileStore<CompanyProfile>,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_all(&self) {
        self.auth.clear();
        self.jobs.clear();
        self.user.clear();
        self.company.clear();
    }
}
