pub mod api_client;
pub mod auth_service;
pub mod company_service;
pub mod context;
pub mod job_service;
pub mod navigation;
pub mod notification_service;
pub mod response_validator;
pub mod session_service;
pub mod user_service;
