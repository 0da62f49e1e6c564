//! Diagnostic check of backend replies against the fields each endpoint is
//! expected to return. Mismatches are reported to the backend's `/error`
//! sink and logged; callers always carry on with the payload they got.

use serde_json::{json, Value as JsonValue};
use tracing::warn;

use crate::services::api_client::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty, required: true }
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty, required: false }
    }
}

use self::FieldType::{Number, String as Str};

pub const LOGIN_RESPONSE: &[FieldSpec] = &[
    FieldSpec::required("token", Str),
    FieldSpec::required("expires_in", Number),
];

pub const MESSAGE_RESPONSE: &[FieldSpec] = &[FieldSpec::required("message", Str)];

pub const USER_PROFILE: &[FieldSpec] = &[
    FieldSpec::required("name", Str),
    FieldSpec::required("username", Str),
    FieldSpec::required("email", Str),
    FieldSpec::required("phone", Str),
    FieldSpec::required("experience", Str),
    FieldSpec::required("education", Str),
];

pub const COMPANY_PROFILE: &[FieldSpec] = &[
    FieldSpec::required("name", Str),
    FieldSpec::required("business", Str),
    FieldSpec::required("username", Str),
    FieldSpec::required("street", Str),
    FieldSpec::required("number", Str),
    FieldSpec::required("city", Str),
    FieldSpec::required("state", Str),
    FieldSpec::required("phone", Str),
    FieldSpec::required("email", Str),
];

/// A posting, both as a single reply and as a list item.
pub const JOB: &[FieldSpec] = &[
    FieldSpec::required("job_id", Number),
    FieldSpec::required("title", Str),
    FieldSpec::required("area", Str),
    FieldSpec::required("description", Str),
    FieldSpec::required("company", Str),
    FieldSpec::required("city", Str),
    FieldSpec::required("state", Str),
    FieldSpec::required("contact", Str),
    FieldSpec::required("salary", Number),
];

pub const USER_APPLICATION_ITEM: &[FieldSpec] = &[
    FieldSpec::required("job_id", Number),
    FieldSpec::required("title", Str),
    FieldSpec::required("area", Str),
    FieldSpec::required("company", Str),
    FieldSpec::required("description", Str),
    FieldSpec::required("state", Str),
    FieldSpec::required("city", Str),
    FieldSpec::required("salary", Number),
    FieldSpec::required("contact", Str),
    FieldSpec::optional("applied_at", Str),
    FieldSpec::optional("feedback", Str),
];

pub const JOB_CANDIDATE_ITEM: &[FieldSpec] = &[
    FieldSpec::required("user_id", Number),
    FieldSpec::required("name", Str),
    FieldSpec::required("email", Str),
    FieldSpec::required("phone", Str),
    FieldSpec::required("education", Str),
    FieldSpec::required("experience", Str),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeMismatch {
    NotAnObject,
    MissingField(String),
    ExtraField(String),
    WrongType {
        field: String,
        expected: &'static str,
        received: &'static str,
    },
}

impl ShapeMismatch {
    pub fn message(&self, endpoint: &str) -> String {
        match self {
            ShapeMismatch::NotAnObject => {
                format!("Invalid response format. Expected object. Endpoint: {}", endpoint)
            }
            ShapeMismatch::MissingField(field) => {
                format!("Index '{}' not found in server data. Endpoint: {}", field, endpoint)
            }
            ShapeMismatch::ExtraField(field) => {
                format!("Unexpected index '{}' found in server data. Endpoint: {}", field, endpoint)
            }
            ShapeMismatch::WrongType { field, expected, received } => format!(
                "Wrong type for field '{}'. Expected '{}', received '{}'. Endpoint: {}",
                field, expected, received, endpoint
            ),
        }
    }

    fn prefixed(self, prefix: &str) -> Self {
        match self {
            ShapeMismatch::MissingField(f) => ShapeMismatch::MissingField(format!("{}{}", prefix, f)),
            ShapeMismatch::ExtraField(f) => ShapeMismatch::ExtraField(format!("{}{}", prefix, f)),
            ShapeMismatch::WrongType { field, expected, received } => ShapeMismatch::WrongType {
                field: format!("{}{}", prefix, field),
                expected,
                received,
            },
            other => other,
        }
    }
}

pub fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Missing required fields first, then unexpected ones, then (only when
/// `check_types`) wrong types. `null` always passes for numbers and for
/// optional fields.
pub fn check_object(payload: &JsonValue, schema: &[FieldSpec], check_types: bool) -> Vec<ShapeMismatch> {
    let Some(object) = payload.as_object() else {
        return vec![ShapeMismatch::NotAnObject];
    };

    let mut mismatches = Vec::new();

    for spec in schema.iter().filter(|s| s.required) {
        if !object.contains_key(spec.name) {
            mismatches.push(ShapeMismatch::MissingField(spec.name.to_string()));
        }
    }

    for key in object.keys() {
        if !schema.iter().any(|s| s.name == key) {
            mismatches.push(ShapeMismatch::ExtraField(key.clone()));
        }
    }

    if check_types {
        for spec in schema {
            let Some(value) = object.get(spec.name) else { continue };
            let received = json_type(value);
            if received == "null" && (spec.ty == FieldType::Number || !spec.required) {
                continue;
            }
            if received != spec.ty.as_str() {
                mismatches.push(ShapeMismatch::WrongType {
                    field: spec.name.to_string(),
                    expected: spec.ty.as_str(),
                    received,
                });
            }
        }
    }

    mismatches
}

/// `{items: [...]}` replies. Stops at the first item that mismatches.
pub fn check_collection(payload: &JsonValue, item_schema: &[FieldSpec], check_types: bool) -> Vec<ShapeMismatch> {
    let Some(object) = payload.as_object() else {
        return vec![ShapeMismatch::NotAnObject];
    };
    let Some(items) = object.get("items") else {
        return vec![ShapeMismatch::MissingField("items".to_string())];
    };
    let Some(items) = items.as_array() else {
        return vec![ShapeMismatch::WrongType {
            field: "items".to_string(),
            expected: "array",
            received: json_type(items),
        }];
    };

    for (i, item) in items.iter().enumerate() {
        if !item.is_object() {
            return vec![ShapeMismatch::WrongType {
                field: format!("items[{}]", i),
                expected: "object",
                received: json_type(item),
            }];
        }
        let mismatches = check_object(item, item_schema, check_types);
        if !mismatches.is_empty() {
            let prefix = format!("items[{}].", i);
            return mismatches.into_iter().map(|m| m.prefixed(&prefix)).collect();
        }
    }

    Vec::new()
}

#[derive(Clone)]
pub struct ResponseValidator {
    api: ApiClient,
    enabled: bool,
    check_types: bool,
}

impl ResponseValidator {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            enabled: true,
            check_types: false,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_type_checks(mut self, check_types: bool) -> Self {
        self.check_types = check_types;
        self
    }

    pub async fn validate_object(&self, endpoint: &str, payload: &JsonValue, schema: &[FieldSpec]) -> bool {
        if !self.enabled {
            return true;
        }
        let mismatches = check_object(payload, schema, self.check_types);
        self.report_all(endpoint, &mismatches).await
    }

    pub async fn validate_collection(&self, endpoint: &str, payload: &JsonValue, item_schema: &[FieldSpec]) -> bool {
        if !self.enabled {
            return true;
        }
        let mismatches = check_collection(payload, item_schema, self.check_types);
        self.report_all(endpoint, &mismatches).await
    }

    async fn report_all(&self, endpoint: &str, mismatches: &[ShapeMismatch]) -> bool {
        for mismatch in mismatches {
            self.report(&mismatch.message(endpoint)).await;
        }
        mismatches.is_empty()
    }

    async fn report(&self, message: &str) {
        warn!(message, "Response shape mismatch");
        if let Err(e) = self.api.post("/error", &json!({ "message": message })).await {
            warn!(error = %e, "Failed to report response shape mismatch");
        }
    }
}
