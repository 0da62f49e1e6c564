use tracing::{info, instrument};

use crate::dto::job_dto::{ApplicationForm, FeedbackForm, JobForm, JobSearchFilters, SearchRequest, UpdateJobForm};
use crate::error::Result;
use crate::models::application::{JobCandidate, JobCandidatesResponse, UserApplication, UserApplicationsResponse};
use crate::models::job::{Job, JobPatch, JobsResponse};
use crate::models::principal::Role;
use crate::services::context::{decode_reply, Handled, OnNotFound, ServiceContext};
use crate::services::response_validator::{JOB, JOB_CANDIDATE_ITEM, USER_APPLICATION_ITEM};
use crate::store::{JobsStore, LoadingGuard, Slice, StateSink};
use crate::utils::validation::check;

const JOB_NOT_FOUND: &str = "Job not found";

/// Postings, applications, candidates and feedback.
#[derive(Clone)]
pub struct JobService {
    ctx: ServiceContext,
}

impl JobService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn store(&self) -> &JobsStore {
        &self.ctx.stores.jobs
    }

    /// Open postings matching `filters`, in backend order.
    #[instrument(skip(self))]
    pub async fn search_jobs(&self, filters: Option<JobSearchFilters>) -> Vec<Job> {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        let ticket = store.issue(Slice::Jobs);

        match self.fetch_search(&SearchRequest::from(filters)).await {
            Ok(items) => {
                store.set_jobs(ticket, items.clone());
                items
            }
            Err(err) => {
                let handled = self.ctx.handle_failure(&err, store, OnNotFound::EmptyResult, "Error fetching jobs");
                if handled == Handled::NotFound {
                    store.set_jobs(ticket, Vec::new());
                }
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: i64) -> Option<Job> {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        let ticket = store.issue(Slice::SelectedJob);

        match self.fetch_job(job_id).await {
            Ok(job) => {
                store.set_selected_job(ticket, Some(job.clone()));
                Some(job)
            }
            Err(err) => {
                self.ctx
                    .handle_failure(&err, store, OnNotFound::Notify(JOB_NOT_FOUND), "Error fetching job");
                None
            }
        }
    }

    /// The signed-in company's own postings. Any `company` filter is dropped.
    #[instrument(skip(self))]
    pub async fn company_jobs(&self, filters: Option<JobSearchFilters>) -> Vec<Job> {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);

        let Some(company_id) = self.ctx.require_subject() else {
            return Vec::new();
        };
        if !self
            .ctx
            .require_role(Role::Company, "Only companies can access their jobs.")
        {
            return Vec::new();
        }
        let ticket = store.issue(Slice::CompanyJobs);

        let request = SearchRequest::from(filters.map(JobSearchFilters::without_company));
        match self.fetch_company_jobs(&company_id, &request).await {
            Ok(items) => {
                store.set_company_jobs(ticket, items.clone());
                items
            }
            Err(err) => {
                let handled = self.ctx.handle_failure(
                    &err,
                    store,
                    OnNotFound::EmptyResult,
                    "Error fetching company jobs",
                );
                if handled == Handled::NotFound {
                    store.set_company_jobs(ticket, Vec::new());
                }
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, form))]
    pub async fn create_job(&self, form: JobForm) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        store.clear_form_errors();

        if !self.ctx.require_role(Role::Company, "Only companies can create jobs.") {
            return false;
        }
        let form = match check(form) {
            Ok(form) => form,
            Err(errors) => {
                self.ctx.reject_form(store, errors);
                return false;
            }
        };

        match self.ctx.api.post("/jobs", &form).await {
            Ok(reply) => {
                // Only replies carrying the full posting can be cached.
                if let Ok(job) = serde_json::from_value::<Job>(reply) {
                    info!(job_id = job.job_id, "Job created");
                    store.add_job(job);
                }
                self.ctx.notifier.success("Job created successfully!");
                true
            }
            Err(err) => {
                self.ctx
                    .handle_failure(&err, store, OnNotFound::Notify(JOB_NOT_FOUND), "Error creating job");
                false
            }
        }
    }

    #[instrument(skip(self, form))]
    pub async fn update_job(&self, job_id: i64, form: UpdateJobForm) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        store.clear_form_errors();

        if !self.ctx.require_role(Role::Company, "Only companies can edit jobs.") {
            return false;
        }
        let form = match check(form) {
            Ok(form) => form,
            Err(errors) => {
                self.ctx.reject_form(store, errors);
                return false;
            }
        };

        match self.ctx.api.patch(&format!("/jobs/{}", job_id), &form).await {
            Ok(_) => {
                store.update_job(job_id, &JobPatch::from(&form));
                self.ctx.notifier.success("Job updated successfully!");
                true
            }
            Err(err) => {
                self.ctx
                    .handle_failure(&err, store, OnNotFound::Notify(JOB_NOT_FOUND), "Error updating job");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_job(&self, job_id: i64) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);

        if !self.ctx.require_role(Role::Company, "Only companies can delete jobs.") {
            return false;
        }

        match self.ctx.api.delete(&format!("/jobs/{}", job_id)).await {
            Ok(_) => {
                store.remove_job(job_id);
                self.ctx.notifier.success("Job deleted successfully!");
                true
            }
            Err(err) => {
                self.ctx
                    .handle_failure(&err, store, OnNotFound::Notify(JOB_NOT_FOUND), "Error deleting job");
                false
            }
        }
    }

    /// Applying never touches the cached job lists.
    #[instrument(skip(self, form))]
    pub async fn apply_to_job(&self, job_id: i64, form: ApplicationForm) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        store.clear_form_errors();

        if !self.ctx.require_role(Role::User, "Only users can apply to jobs.") {
            return false;
        }
        let form = match check(form) {
            Ok(form) => form,
            Err(errors) => {
                self.ctx.reject_form(store, errors);
                return false;
            }
        };

        match self.ctx.api.post(&format!("/jobs/{}", job_id), &form).await {
            Ok(_) => {
                self.ctx.notifier.success("Application sent successfully!");
                true
            }
            Err(err) => {
                self.ctx
                    .handle_failure(&err, store, OnNotFound::Notify(JOB_NOT_FOUND), "Error applying to job");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn user_applications(&self) -> Vec<UserApplication> {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);

        let Some(user_id) = self.ctx.require_subject() else {
            return Vec::new();
        };
        if !self
            .ctx
            .require_role(Role::User, "Only users can view their applications.")
        {
            return Vec::new();
        }
        let ticket = store.issue(Slice::Applications);

        match self.fetch_applications(&user_id).await {
            Ok(items) => {
                store.set_applications(ticket, items.clone());
                items
            }
            Err(err) => {
                let handled = self.ctx.handle_failure(
                    &err,
                    store,
                    OnNotFound::EmptyResult,
                    "Error fetching applications",
                );
                if handled == Handled::NotFound {
                    store.set_applications(ticket, Vec::new());
                }
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn job_candidates(&self, job_id: i64) -> Vec<JobCandidate> {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);

        let Some(company_id) = self.ctx.require_subject() else {
            return Vec::new();
        };
        if !self
            .ctx
            .require_role(Role::Company, "Only companies can view candidates.")
        {
            return Vec::new();
        }
        let ticket = store.issue(Slice::Candidates);

        match self.fetch_candidates(&company_id, job_id).await {
            Ok(items) => {
                store.set_candidates(ticket, items.clone());
                items
            }
            Err(err) => {
                let handled = self.ctx.handle_failure(
                    &err,
                    store,
                    OnNotFound::Notify(JOB_NOT_FOUND),
                    "Error fetching candidates",
                );
                if handled == Handled::NotFound {
                    store.set_candidates(ticket, Vec::new());
                }
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, form), fields(user_id = form.user_id))]
    pub async fn send_feedback(&self, job_id: i64, form: FeedbackForm) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        store.clear_form_errors();

        if !self.ctx.require_role(Role::Company, "Only companies can send feedback.") {
            return false;
        }
        let form = match check(form) {
            Ok(form) => form,
            Err(errors) => {
                self.ctx.reject_form(store, errors);
                return false;
            }
        };

        match self
            .ctx
            .api
            .post(&format!("/jobs/{}/feedback", job_id), &form)
            .await
        {
            Ok(_) => {
                self.ctx.notifier.success("Feedback sent successfully!");
                true
            }
            Err(err) => {
                self.ctx.handle_failure(
                    &err,
                    store,
                    OnNotFound::Notify("Job or user not found"),
                    "Error sending feedback",
                );
                false
            }
        }
    }

    async fn fetch_search(&self, request: &SearchRequest) -> Result<Vec<Job>> {
        let reply = self.ctx.api.post("/jobs/search", request).await?;
        self.ctx
            .validator
            .validate_collection("POST /jobs/search", &reply, JOB)
            .await;
        Ok(decode_reply::<JobsResponse>(reply)?.items)
    }

    async fn fetch_job(&self, job_id: i64) -> Result<Job> {
        let reply = self.ctx.api.get(&format!("/jobs/{}", job_id)).await?;
        self.ctx
            .validator
            .validate_object("GET /jobs/{job_id}", &reply, JOB)
            .await;
        Ok(serde_json::from_value(reply)?)
    }

    async fn fetch_company_jobs(&self, company_id: &str, request: &SearchRequest) -> Result<Vec<Job>> {
        let reply = self
            .ctx
            .api
            .post(&format!("/companies/{}/jobs", company_id), request)
            .await?;
        self.ctx
            .validator
            .validate_collection("POST /companies/{company_id}/jobs", &reply, JOB)
            .await;
        Ok(decode_reply::<JobsResponse>(reply)?.items)
    }

    async fn fetch_applications(&self, user_id: &str) -> Result<Vec<UserApplication>> {
        let reply = self.ctx.api.get(&format!("/users/{}/jobs", user_id)).await?;
        self.ctx
            .validator
            .validate_collection("GET /users/{user_id}/jobs", &reply, USER_APPLICATION_ITEM)
            .await;
        Ok(decode_reply::<UserApplicationsResponse>(reply)?.items)
    }

    async fn fetch_candidates(&self, company_id: &str, job_id: i64) -> Result<Vec<JobCandidate>> {
        let reply = self
            .ctx
            .api
            .get(&format!("/companies/{}/jobs/{}", company_id, job_id))
            .await?;
        self.ctx
            .validator
            .validate_collection("GET /companies/{company_id}/jobs/{job_id}", &reply, JOB_CANDIDATE_ITEM)
            .await;
        Ok(decode_reply::<JobCandidatesResponse>(reply)?.items)
    }
}
