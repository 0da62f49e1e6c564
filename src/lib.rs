pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pages;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::pages::Pages;
use crate::services::{
    api_client::{ApiClient, EndpointStore},
    auth_service::AuthService,
    company_service::CompanyService,
    context::ServiceContext,
    job_service::JobService,
    navigation::Navigator,
    notification_service::Notifier,
    response_validator::ResponseValidator,
    session_service::{FileCookieJar, SessionStore},
    user_service::UserService,
};
use crate::store::Stores;

#[derive(Clone)]
pub struct AppState {
    pub ctx: ServiceContext,
    pub auth: AuthService,
    pub jobs: JobService,
    pub users: UserService,
    pub companies: CompanyService,
    pub pages: Pages,
}

impl AppState {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            auth: AuthService::new(ctx.clone()),
            jobs: JobService::new(ctx.clone()),
            users: UserService::new(ctx.clone()),
            companies: CompanyService::new(ctx.clone()),
            pages: Pages::new(ctx.clone()),
            ctx,
        }
    }

    /// Session and server address persist under the configured data dir.
    pub fn from_config(
        config: &Config,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let session = SessionStore::new(Arc::new(FileCookieJar::new(config.cookie_file())));
        let endpoint = EndpointStore::new(config.api_url.clone(), Some(config.endpoint_file()));
        let api = ApiClient::with_timeout(endpoint, session, config.request_timeout_secs)?;
        let validator = ResponseValidator::new(api.clone())
            .with_enabled(config.validate_responses)
            .with_type_checks(config.check_response_types);

        let ctx = ServiceContext::new(api, validator, Stores::new(), notifier, navigator);
        Ok(Self::new(ctx))
    }

    /// Points the client at another backend; takes effect on the next request.
    pub fn set_server(&self, raw: &str) -> bool {
        match self.ctx.api.endpoint().set_base_url(raw) {
            Ok(_) => {
                self.ctx.notifier.success("Server address updated successfully!");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected API base URL");
                self.ctx.notifier.error(&e.to_string());
                false
            }
        }
    }
}
