use tracing::instrument;

use crate::dto::auth_dto::MessageResponse;
use crate::dto::profile_dto::UpdateUserForm;
use crate::error::Result;
use crate::models::principal::Role;
use crate::models::profile::UserProfile;
use crate::routes;
use crate::services::context::{OnNotFound, ServiceContext};
use crate::services::response_validator::{MESSAGE_RESPONSE, USER_PROFILE};
use crate::store::{LoadingGuard, ProfileStore, StateSink};
use crate::utils::validation::check;

const USER_NOT_FOUND: &str = "User not found";

/// Profile of the signed-in job seeker.
#[derive(Clone)]
pub struct UserService {
    ctx: ServiceContext,
}

impl UserService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn store(&self) -> &ProfileStore<UserProfile> {
        &self.ctx.stores.user
    }

    /// Served from cache once loaded. Company sessions have no user profile.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Option<UserProfile> {
        let store = self.store();
        if let Some(profile) = store.profile() {
            return Some(profile);
        }
        if self.ctx.session.role() != Some(Role::User) {
            return None;
        }

        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        let user_id = self.ctx.require_subject()?;

        match self.fetch_profile(&user_id).await {
            Ok(profile) => {
                store.set_profile(profile.clone());
                Some(profile)
            }
            Err(err) => {
                self.ctx.handle_failure(
                    &err,
                    store,
                    OnNotFound::Notify(USER_NOT_FOUND),
                    "Error fetching user data",
                );
                None
            }
        }
    }

    #[instrument(skip(self, form))]
    pub async fn update(&self, form: UpdateUserForm) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);
        store.clear_form_errors();

        if !self.ctx.require_role(Role::User, "Only users can edit this profile.") {
            return false;
        }
        let form = match check(form) {
            Ok(form) => form,
            Err(errors) => {
                self.ctx.reject_form(store, errors);
                return false;
            }
        };
        let Some(user_id) = self.ctx.require_subject() else {
            return false;
        };

        match self.ctx.api.patch(&format!("/users/{}", user_id), &form).await {
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
                    OnNotFound::Notify(USER_NOT_FOUND),
                    "Error updating profile",
                );
                false
            }
        }
    }

    /// Deleting the account ends the session.
    #[instrument(skip(self))]
    pub async fn delete(&self) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.set_error(None);

        if !self.ctx.require_role(Role::User, "Only users can delete this profile.") {
            return false;
        }
        let Some(user_id) = self.ctx.require_subject() else {
            return false;
        };

        match self.delete_profile(&user_id).await {
            Ok(message) => {
                self.ctx.session.clear_token();
                self.ctx.stores.clear_all();
                self.ctx
                    .notifier
                    .success(message.as_deref().unwrap_or("User deleted successfully!"));
                self.ctx.navigator.push(routes::SIGN_IN);
                true
            }
            Err(err) => {
                self.ctx.handle_failure(
                    &err,
                    store,
                    OnNotFound::Notify(USER_NOT_FOUND),
                    "Error deleting user",
                );
                false
            }
        }
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile> {
        let reply = self.ctx.api.get(&format!("/users/{}", user_id)).await?;
        self.ctx
            .validator
            .validate_object("GET /users/{user_id}", &reply, USER_PROFILE)
            .await;
        Ok(serde_json::from_value(reply)?)
    }

    async fn delete_profile(&self, user_id: &str) -> Result<Option<String>> {
        let reply = self.ctx.api.delete(&format!("/users/{}", user_id)).await?;
        self.ctx
            .validator
            .validate_object("DELETE /users/{user_id}", &reply, MESSAGE_RESPONSE)
            .await;
        Ok(serde_json::from_value::<MessageResponse>(reply)
            .ok()
            .map(|r| r.message)
            .filter(|m| !m.is_empty()))
    }
}
