pub mod application;
pub mod job;
pub mod principal;
pub mod profile;
