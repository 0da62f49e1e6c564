use std::sync::{Arc, Mutex};

use crate::models::application::{JobCandidate, UserApplication};
use crate::models::job::{Job, JobPatch};
use crate::store::StateSink;
use crate::utils::validation::FormErrors;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobsState {
    pub jobs: Vec<Job>,
    pub company_jobs: Vec<Job>,
    pub selected_job: Option<Job>,
    pub applications: Vec<UserApplication>,
    pub candidates: Vec<JobCandidate>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub form_errors: FormErrors,
}

/// Independently fetched pieces of job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Jobs,
    CompanyJobs,
    SelectedJob,
    Applications,
    Candidates,
}

impl Slice {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            Slice::Jobs => 0,
            Slice::CompanyJobs => 1,
            Slice::SelectedJob => 2,
            Slice::Applications => 3,
            Slice::Candidates => 4,
        }
    }
}

/// Issued when a fetch starts. Its reply is applied only while no newer
/// fetch of the same slice has been issued and the store was not cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    slice: Slice,
    generation: u64,
}

#[derive(Debug, Default)]
struct Inner {
    state: JobsState,
    in_flight: usize,
    generations: [u64; Slice::COUNT],
}

impl Inner {
    fn is_current(&self, ticket: Ticket) -> bool {
        self.generations[ticket.slice.index()] == ticket.generation
    }
}

#[derive(Clone, Default)]
pub struct JobsStore {
    inner: Arc<Mutex<Inner>>,
}

impl JobsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut guard = self.inner.lock().expect("jobs store mutex poisoned");
        f(&mut guard)
    }

    pub fn snapshot(&self) -> JobsState {
        self.with(|inner| {
            let mut state = inner.state.clone();
            state.is_loading = inner.in_flight > 0;
            state
        })
    }

    pub fn issue(&self, slice: Slice) -> Ticket {
        self.with(|inner| {
            let slot = &mut inner.generations[slice.index()];
            *slot += 1;
            Ticket {
                slice,
                generation: *slot,
            }
        })
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.with(|inner| inner.is_current(ticket))
    }

    fn commit(&self, ticket: Ticket, f: impl FnOnce(&mut JobsState)) -> bool {
        self.with(|inner| {
            if !inner.is_current(ticket) {
                tracing::debug!(slice = ?ticket.slice, "Dropping superseded reply");
                return false;
            }
            f(&mut inner.state);
            true
        })
    }

    pub fn set_jobs(&self, ticket: Ticket, jobs: Vec<Job>) -> bool {
        self.commit(ticket, |state| {
            state.jobs = jobs;
            state.error = None;
        })
    }

    pub fn set_company_jobs(&self, ticket: Ticket, jobs: Vec<Job>) -> bool {
        self.commit(ticket, |state| {
            state.company_jobs = jobs;
            state.error = None;
        })
    }

    pub fn set_selected_job(&self, ticket: Ticket, job: Option<Job>) -> bool {
        self.commit(ticket, |state| state.selected_job = job)
    }

    pub fn set_applications(&self, ticket: Ticket, items: Vec<UserApplication>) -> bool {
        self.commit(ticket, |state| state.applications = items)
    }

    pub fn set_candidates(&self, ticket: Ticket, items: Vec<JobCandidate>) -> bool {
        self.commit(ticket, |state| state.candidates = items)
    }

    pub fn add_job(&self, job: Job) {
        self.with(|inner| {
            inner.state.jobs.push(job.clone());
            inner.state.company_jobs.push(job);
        })
    }

    pub fn update_job(&self, job_id: i64, patch: &JobPatch) {
        self.with(|inner| {
            let state = &mut inner.state;
            state
                .jobs
                .iter_mut()
                .chain(state.company_jobs.iter_mut())
                .chain(state.selected_job.iter_mut())
                .filter(|job| job.job_id == job_id)
                .for_each(|job| job.apply(patch));
        })
    }

    pub fn remove_job(&self, job_id: i64) {
        self.with(|inner| {
            let state = &mut inner.state;
            state.jobs.retain(|job| job.job_id != job_id);
            state.company_jobs.retain(|job| job.job_id != job_id);
            if state.selected_job.as_ref().map(|job| job.job_id) == Some(job_id) {
                state.selected_job = None;
            }
        })
    }

    pub fn clear_form_errors(&self) {
        self.with(|inner| inner.state.form_errors.clear())
    }

    /// Wipes every slice and invalidates all outstanding tickets. The
    /// in-flight count is left to the live guards that own it.
    pub fn clear(&self) {
        self.with(|inner| {
            inner.state = JobsState::default();
            for generation in inner.generations.iter_mut() {
                *generation += 1;
            }
        })
    }
}

impl StateSink for JobsStore {
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

    fn job(id: i64, title: &str) -> Job {
        Job {
            job_id: id,
            title: title.to_string(),
            area: "Tecnologia da Informação".to_string(),
            description: "Backend role".to_string(),
            company: "ACME".to_string(),
            state: "PR".to_string(),
            city: "Curitiba".to_string(),
            salary: Some(4500.0),
            contact: "rh@acme.co".to_string(),
        }
    }

    #[test]
    fn last_issued_fetch_wins() {
        let store = JobsStore::new();
        let first = store.issue(Slice::Jobs);
        let second = store.issue(Slice::Jobs);

        assert!(store.set_jobs(second, vec![job(2, "newer")]));
        assert!(!store.set_jobs(first, vec![job(1, "older")]));
        assert_eq!(store.snapshot().jobs, vec![job(2, "newer")]);
    }

    #[test]
    fn slices_are_independent() {
        let store = JobsStore::new();
        let jobs = store.issue(Slice::Jobs);
        let _company = store.issue(Slice::CompanyJobs);
        assert!(store.is_current(jobs));
        assert!(store.set_jobs(jobs, vec![job(1, "a")]));
    }

    #[test]
    fn clear_drops_in_flight_replies() {
        let store = JobsStore::new();
        let ticket = store.issue(Slice::CompanyJobs);
        store.clear();
        assert!(!store.set_company_jobs(ticket, vec![job(1, "late")]));
        assert!(store.snapshot().company_jobs.is_empty());
    }

    #[test]
    fn remove_job_purges_every_slice() {
        let store = JobsStore::new();
        let t = store.issue(Slice::Jobs);
        store.set_jobs(t, vec![job(1, "a"), job(7, "b")]);
        let t = store.issue(Slice::CompanyJobs);
        store.set_company_jobs(t, vec![job(7, "b")]);
        let t = store.issue(Slice::SelectedJob);
        store.set_selected_job(t, Some(job(7, "b")));

        store.remove_job(7);

        let state = store.snapshot();
        assert!(state.jobs.iter().all(|j| j.job_id != 7));
        assert!(state.company_jobs.is_empty());
        assert_eq!(state.selected_job, None);
        assert_eq!(state.jobs.len(), 1);
    }

    #[test]
    fn update_job_merges_everywhere() {
        let store = JobsStore::new();
        store.add_job(job(3, "old"));
        let t = store.issue(Slice::SelectedJob);
        store.set_selected_job(t, Some(job(3, "old")));

        store.update_job(
            3,
            &JobPatch {
                title: Some("new".into()),
                salary: Some(None),
                ..JobPatch::default()
            },
        );

        let state = store.snapshot();
        assert_eq!(state.jobs[0].title, "new");
        assert_eq!(state.company_jobs[0].title, "new");
        let selected = state.selected_job.unwrap();
        assert_eq!(selected.title, "new");
        assert_eq!(selected.salary, None);
        assert_eq!(selected.city, "Curitiba");
    }
}
