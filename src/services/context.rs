use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::principal::Role;
use crate::routes;
use crate::services::api_client::ApiClient;
use crate::services::navigation::Navigator;
use crate::services::notification_service::Notifier;
use crate::services::response_validator::ResponseValidator;
use crate::services::session_service::SessionStore;
use crate::store::{StateSink, Stores};
use crate::utils::validation::{from_details, FormErrors};

pub const SESSION_EXPIRED: &str = "Session expired. Please sign in again.";
pub const FORBIDDEN: &str = "You do not have permission to perform this action.";
pub const CHECK_FIELDS: &str = "Validation error. Check the fields.";

/// What a 404 means for the call at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnNotFound {
    /// List fetch: no results. The caller empties its slice.
    EmptyResult,
    /// Single entity: tell the user.
    Notify(&'static str),
}

/// How a failed call was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    SessionExpired,
    Forbidden,
    NotFound,
    FieldErrors,
    Failed,
}

/// Everything a coordinator needs, passed in instead of reached for.
#[derive(Clone)]
pub struct ServiceContext {
    pub api: ApiClient,
    pub session: SessionStore,
    pub validator: ResponseValidator,
    pub stores: Stores,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl ServiceContext {
    pub fn new(
        api: ApiClient,
        validator: ResponseValidator,
        stores: Stores,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session: api.session().clone(),
            api,
            validator,
            stores,
            notifier,
            navigator,
        }
    }

    /// Local role gate; on mismatch notifies `denied` and no request is made.
    pub fn require_role(&self, role: Role, denied: &str) -> bool {
        if self.session.role() == Some(role) {
            return true;
        }
        warn!(required = %role, "Operation refused for current principal");
        self.notifier.error(denied);
        false
    }

    /// Subject id for self-scoped endpoints. Without one the user is sent to
    /// sign in again.
    pub fn require_subject(&self) -> Option<String> {
        let subject = self.session.subject_id();
        if subject.is_none() {
            self.notifier.error(SESSION_EXPIRED);
            self.navigator.push(routes::SIGN_IN);
        }
        subject
    }

    /// Drops the token and every piece of resource state, then sends the
    /// user to sign in.
    pub fn expire_session(&self) {
        info!("Session invalidated");
        self.session.clear_token();
        self.stores.clear_all();
        self.notifier.error(SESSION_EXPIRED);
        self.navigator.push(routes::SIGN_IN);
    }

    /// Client-side rejection: the form never reaches the backend.
    pub fn reject_form(&self, sink: &dyn StateSink, errors: FormErrors) {
        sink.set_form_errors(errors);
        self.notifier.error(CHECK_FIELDS);
    }

    /// Shared status-code policy for every coordinator.
    pub fn handle_failure(
        &self,
        err: &Error,
        sink: &dyn StateSink,
        on_not_found: OnNotFound,
        fallback: &str,
    ) -> Handled {
        match err.http_status() {
            Some(401) => {
                self.expire_session();
                Handled::SessionExpired
            }
            Some(403) => {
                self.notifier.error(FORBIDDEN);
                Handled::Forbidden
            }
            Some(404) => {
                if let OnNotFound::Notify(message) = on_not_found {
                    self.notifier.error(message);
                }
                Handled::NotFound
            }
            Some(status) => {
                let body = err.api_body().unwrap_or_default();
                if status == 422 {
                    if let Some(details) = body.details.as_deref().filter(|d| !d.is_empty()) {
                        sink.set_form_errors(from_details(details));
                        self.notifier.error(CHECK_FIELDS);
                        return Handled::FieldErrors;
                    }
                }
                warn!(status, error = %err, "{}", fallback);
                let message = body.message.unwrap_or_else(|| fallback.to_string());
                sink.set_error(Some(message.clone()));
                self.notifier.error(&message);
                Handled::Failed
            }
            None => {
                warn!(error = %err, "{}", fallback);
                sink.set_error(Some(fallback.to_string()));
                self.notifier.error(&format!("{}. Please try again.", fallback));
                Handled::Failed
            }
        }
    }
}

/// An empty reply body decodes to the type's default.
pub fn decode_reply<T: DeserializeOwned + Default>(value: JsonValue) -> Result<T> {
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value)?)
}
