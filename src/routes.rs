//! Page taxonomy of the front-end: which paths are public-only, which are
//! scoped to one role, and what page a path renders.

use crate::models::principal::Role;

pub const DASHBOARD: &str = "/";
pub const SIGN_IN: &str = "/sign-in";
pub const REGISTER: &str = "/register";
pub const JOBS: &str = "/jobs";
pub const COMPANY_JOBS: &str = "/jobs/company";
pub const NEW_JOB: &str = "/jobs/new";
pub const APPLICATIONS: &str = "/applications";
pub const PROFILE: &str = "/profile";
pub const EDIT_PROFILE: &str = "/profile/edit";

/// Reachable only without a session; a signed-in visitor is sent to the landing page.
pub const PUBLIC_ONLY: [&str; 6] = [
    "/sign-in",
    "/sign-in/user",
    "/sign-in/company",
    "/register",
    "/register/user",
    "/register/company",
];

const GUARD_BYPASS_PREFIXES: [&str; 3] = ["/api", "/_next", "/static"];

pub fn is_public_only(path: &str) -> bool {
    PUBLIC_ONLY.contains(&normalize(path))
}

/// Asset and API paths are never routed through the guard.
pub fn bypasses_guard(path: &str) -> bool {
    path == "/favicon.ico"
        || GUARD_BYPASS_PREFIXES
            .iter()
            .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    SignIn,
    Register,
    RegisterUser,
    RegisterCompany,
    Jobs,
    NewJob,
    CompanyJobs,
    JobDetail(i64),
    EditJob(i64),
    JobCandidates(i64),
    Applications,
    Profile,
    EditProfile,
    Unknown,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = normalize(path)
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Route::Dashboard,
            ["sign-in"] | ["sign-in", "user"] | ["sign-in", "company"] => Route::SignIn,
            ["register"] => Route::Register,
            ["register", "user"] => Route::RegisterUser,
            ["register", "company"] => Route::RegisterCompany,
            ["jobs"] => Route::Jobs,
            ["jobs", "new"] => Route::NewJob,
            ["jobs", "company"] => Route::CompanyJobs,
            ["jobs", id] => parse_id(id).map(Route::JobDetail).unwrap_or(Route::Unknown),
            ["jobs", id, "edit"] => parse_id(id).map(Route::EditJob).unwrap_or(Route::Unknown),
            ["jobs", id, "candidates"] => parse_id(id)
                .map(Route::JobCandidates)
                .unwrap_or(Route::Unknown),
            ["applications"] => Route::Applications,
            ["profile"] => Route::Profile,
            ["profile", "edit"] => Route::EditProfile,
            _ => Route::Unknown,
        }
    }

    /// The only role allowed to open this page, if it is role-scoped.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::NewJob | Route::CompanyJobs | Route::EditJob(_) | Route::JobCandidates(_) => {
                Some(Role::Company)
            }
            Route::Applications => Some(Role::User),
            _ => None,
        }
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pages() {
        assert_eq!(Route::parse("/"), Route::Dashboard);
        assert_eq!(Route::parse(""), Route::Dashboard);
        assert_eq!(Route::parse("/sign-in/company"), Route::SignIn);
        assert_eq!(Route::parse("/jobs/42"), Route::JobDetail(42));
        assert_eq!(Route::parse("/jobs/42/edit/"), Route::EditJob(42));
        assert_eq!(Route::parse("/jobs/7/candidates"), Route::JobCandidates(7));
        assert_eq!(Route::parse("/jobs/company"), Route::CompanyJobs);
        assert_eq!(Route::parse("/jobs/abc"), Route::Unknown);
    }

    #[test]
    fn named_paths_round_trip() {
        assert_eq!(Route::parse(DASHBOARD), Route::Dashboard);
        assert_eq!(Route::parse(SIGN_IN), Route::SignIn);
        assert_eq!(Route::parse(REGISTER), Route::Register);
        assert_eq!(Route::parse(JOBS), Route::Jobs);
        assert_eq!(Route::parse(COMPANY_JOBS), Route::CompanyJobs);
        assert_eq!(Route::parse(NEW_JOB), Route::NewJob);
        assert_eq!(Route::parse(APPLICATIONS), Route::Applications);
        assert_eq!(Route::parse(PROFILE), Route::Profile);
        assert_eq!(Route::parse(EDIT_PROFILE), Route::EditProfile);
    }

    #[test]
    fn role_scopes() {
        assert_eq!(Route::parse("/jobs/new").required_role(), Some(Role::Company));
        assert_eq!(Route::parse("/applications").required_role(), Some(Role::User));
        assert_eq!(Route::parse("/jobs/9").required_role(), None);
        assert_eq!(Route::parse("/profile").required_role(), None);
    }

    #[test]
    fn public_only_and_bypass() {
        assert!(is_public_only("/register/user"));
        assert!(is_public_only("/sign-in/"));
        assert!(!is_public_only("/jobs"));
        assert!(bypasses_guard("/api/health"));
        assert!(bypasses_guard("/_next/static/chunk.js"));
        assert!(bypasses_guard("/favicon.ico"));
        assert!(!bypasses_guard("/apply"));
    }
}
