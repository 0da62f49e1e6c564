use tracing::instrument;

use crate::dto::auth_dto::MessageResponse;
use crate::dto::profile_dto::UpdateCompanyForm;
use crate::error::Result;
use crate::models::principal::Role;
use crate::models::profile::CompanyProfile;
use crate::routes;
use crate::services::context::{OnNotFound, ServiceContext};
use crate::services::response_validator::{COMPANY_PROFILE, MESSAGE_RESPONSE};
use crate::store::{LoadingGuard, ProfileStore, StateSink};
use crate::utils::validation::check;

const COMPANY_NOT_FOUND: &str = "Company not found";

#[derive(Clone)]
pub struct CompanyService {
    ctx: ServiceContext,
}

impl CompanyService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn store(&self) -> &ProfileStore<CompanyProfile> {
        &self.ctx.stores.company
    }

    /// No-op for non-company sessions.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Option<CompanyProfile> {
        let store = self.store();
        if let Some(profile) = store.profile() {
            return Some(profile);
        }
        if self.ctx.session.role() != Some(Role::Company) {
            return None;
        }

        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        let company_id = self.ctx.require_subject()?;

        match self.fetch_profile(&company_id).await {
            Ok(profile) => {
                store.set_profile(profile.clone());
                Some(profile)
            }
            Err(err) => {
                self.ctx.handle_failure(
                    &err,
                    store,
                    OnNotFound::Notify(COMPANY_NOT_FOUND),
                    "Error fetching company data",
                );
                None
            }
        }
    }

    #[instrument(skip(self, form))]
    pub async fn update(&self, form: UpdateCompanyForm) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        store.clear_form_errors();

        if !self
            .ctx
            .require_role(Role::Company, "Only companies can edit this profile.")
        {
            return false;
        }
        let form = match check(form) {
            Ok(form) => form,
            Err(errors) => {
                self.ctx.reject_form(store, errors);
                return false;
            }
        };
        let Some(company_id) = self.ctx.require_subject() else {
            return false;
        };

        match self
            .ctx
            .api
            .patch(&format!("/companies/{}", company_id), &form)
            .await
        {
            Ok(_) => {
                store.update(|profile| form.merge_into(profile));
                self.ctx.notifier.success("Profile updated successfully!");
                self.ctx.navigator.push(routes::PROFILE);
                true
            }
            Err(err) => {
                self.ctx.handle_failure(
                    &err,
                    store,
                    OnNotFound::Notify(COMPANY_NOT_FOUND),
                    "Error updating profile",
                );
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);

        if !self
            .ctx
            .require_role(Role::Company, "Only companies can delete this profile.")
        {
            return false;
        }
        let Some(company_id) = self.ctx.require_subject() else {
            return false;
        };

        match self.delete_profile(&company_id).await {
            Ok(message) => {
                self.ctx.session.clear_token();
                self.ctx.stores.clear_all();
                self.ctx
                    .notifier
                    .success(message.as_deref().unwrap_or("Company deleted successfully!"));
                self.ctx.navigator.push(routes::SIGN_IN);
                true
            }
            Err(err) => {
                self.ctx.handle_failure(
                    &err,
                    store,
                    OnNotFound::Notify(COMPANY_NOT_FOUND),
                    "Error deleting company",
                );
                false
            }
        }
    }

    async fn fetch_profile(&self, company_id: &str) -> Result<CompanyProfile> {
        let reply = self.ctx.api.get(&format!("/companies/{}", company_id)).await?;
        self.ctx
            .validator
            .validate_object("GET /companies/{company_id}", &reply, COMPANY_PROFILE)
            .await;
        Ok(serde_json::from_value(reply)?)
    }

    async fn delete_profile(&self, company_id: &str) -> Result<Option<String>> {
        let reply = self
            .ctx
            .api
            .delete(&format!("/companies/{}", company_id))
            .await?;
        self.ctx
            .validator
            .validate_object("DELETE /companies/{company_id}", &reply, MESSAGE_RESPONSE)
            .await;
        Ok(serde_json::from_value::<MessageResponse>(reply)
            .ok()
            .map(|r| r.message)
            .filter(|m| !m.is_empty()))
    }
}
