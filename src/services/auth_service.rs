use tracing::{info, instrument, warn};

use crate::dto::auth_dto::{LoginForm, LoginResponse, RegisterCompanyForm, RegisterUserForm};
use crate::error::{Error, Result};
use crate::routes;
use crate::services::context::{ServiceContext, CHECK_FIELDS};
use crate::services::response_validator::LOGIN_RESPONSE;
use crate::store::{FormStore, LoadingGuard, StateSink};
use crate::utils::validation::{check, from_details};

/// Sign-in, registration and sign-out.
#[derive(Clone)]
pub struct AuthService {
    ctx: ServiceContext,
}

impl AuthService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn store(&self) -> &FormStore {
        &self.ctx.stores.auth
    }

    /// Stores the issued token and lands on the authenticated home page.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: LoginForm) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.reset();

        let form = match check(form) {
            Ok(form) => form,
            Err(errors) => {
                self.ctx.reject_form(store, errors);
                return false;
            }
        };

        match self.request_login(&form).await {
            Ok(token) => {
                self.ctx.session.set_token(&token);
                // A previous principal's cached data must not leak into this session.
                self.ctx.stores.jobs.clear();
                self.ctx.stores.user.clear();
                self.ctx.stores.company.clear();

                info!(role = ?self.ctx.session.role(), "Signed in");
                self.ctx.notifier.success("Signed in successfully!");
                // Both roles land on the dashboard, which renders per role.
                self.ctx.navigator.push(routes::DASHBOARD);
                true
            }
            Err(err) => {
                self.public_failure(&err, "Error signing in");
                false
            }
        }
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register_user(&self, form: RegisterUserForm) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.reset();

        let form = match check(form) {
            Ok(form) => form,
            Err(errors) => {
                self.ctx.reject_form(store, errors);
                return false;
            }
        };

        match self.ctx.api.post("/users", &form).await {
            Ok(_) => {
                self.ctx
                    .notifier
                    .success("Account created successfully! Sign in to continue.");
                self.ctx.navigator.push(routes::SIGN_IN);
                true
            }
            Err(err) => {
                self.public_failure(&err, "Error creating account");
                false
            }
        }
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register_company(&self, form: RegisterCompanyForm) -> bool {
        let store = self.store();
        let _loading = LoadingGuard::new(store);
        store.reset();

        let form = match check(form) {
            Ok(form) => form,
            Err(errors) => {
                self.ctx.reject_form(store, errors);
                return false;
            }
        };

        match self.ctx.api.post("/companies", &form).await {
            Ok(_) => {
                self.ctx
                    .notifier
                    .success("Company registered successfully! Sign in to continue.");
                self.ctx.navigator.push(routes::SIGN_IN);
                true
            }
            Err(err) => {
                self.public_failure(&err, "Error creating account");
                false
            }
        }
    }

    /// The backend call is best-effort; the local session always ends.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.ctx.api.post_empty("/logout").await {
            warn!(error = %e, "Logout request failed");
        }
        self.ctx.session.clear_token();
        self.ctx.stores.clear_all();
        self.ctx.notifier.success("Signed out successfully!");
        self.ctx.navigator.push(routes::SIGN_IN);
    }

    async fn request_login(&self, form: &LoginForm) -> Result<String> {
        let reply = self.ctx.api.post("/login", form).await?;
        self.ctx
            .validator
            .validate_object("POST /login", &reply, LOGIN_RESPONSE)
            .await;
        let login: LoginResponse = serde_json::from_value(reply)?;
        if login.token.trim().is_empty() {
            return Err(Error::ResponseShape("login reply carried an empty token".to_string()));
        }
        Ok(login.token)
    }

    /// Public forms have no session to expire: any field details go to the
    /// form, everything else is a message.
    fn public_failure(&self, err: &Error, fallback: &str) {
        let store = self.store();
        match err {
            Error::HttpStatus { status, .. } => {
                let body = err.api_body().unwrap_or_default();
                if let Some(details) = body.details.as_deref().filter(|d| !d.is_empty()) {
                    store.set_form_errors(from_details(details));
                    self.ctx.notifier.error(CHECK_FIELDS);
                    return;
                }
                warn!(status, "{}", fallback);
                let message = body.message.unwrap_or_else(|| fallback.to_string());
                store.set_error(Some(message.clone()));
                self.ctx.notifier.error(&message);
            }
            other => {
                warn!(error = %other, "{}", fallback);
                store.set_error(Some(fallback.to_string()));
                self.ctx
                    .notifier
                    .error(&format!("{}. Please try again.", fallback));
            }
        }
    }
}
