//! Thin presentation layer: a navigation runs through the route guard, then
//! the page's data is loaded through the coordinators.

use std::fmt;

use axum::{extract::Request, middleware, response::IntoResponse, Extension, Router};

use crate::middleware::route_guard::{route_guard, GuardDecision, RouteGuard};
use crate::models::application::{JobCandidate, UserApplication};
use crate::models::job::Job;
use crate::models::principal::{Principal, Role};
use crate::models::profile::{CompanyProfile, UserProfile};
use crate::routes::{self, Route};
use crate::services::company_service::CompanyService;
use crate::services::context::ServiceContext;
use crate::services::job_service::JobService;
use crate::services::user_service::UserService;
use crate::utils::time;

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileView {
    User(Option<UserProfile>),
    Company(Option<CompanyProfile>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageView {
    Redirect { to: String },
    SignIn,
    Register,
    RegisterUser,
    RegisterCompany,
    UserDashboard { jobs: Vec<Job> },
    CompanyDashboard { jobs: Vec<Job> },
    Jobs(Vec<Job>),
    JobDetail(Option<Job>),
    NewJob,
    EditJob(Option<Job>),
    CompanyJobs(Vec<Job>),
    Candidates { job_id: i64, candidates: Vec<JobCandidate> },
    Applications(Vec<UserApplication>),
    Profile(ProfileView),
    EditProfile(ProfileView),
    NotFound,
}

#[derive(Clone)]
pub struct Pages {
    guard: RouteGuard,
    ctx: ServiceContext,
    jobs: JobService,
    users: UserService,
    companies: CompanyService,
}

impl Pages {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            guard: RouteGuard::new(),
            jobs: JobService::new(ctx.clone()),
            users: UserService::new(ctx.clone()),
            companies: CompanyService::new(ctx.clone()),
            ctx,
        }
    }

    pub async fn open(&self, path: &str) -> PageView {
        let token = self.ctx.session.get_token();
        match self.guard.evaluate(path, token.as_deref(), time::now()) {
            GuardDecision::Redirect { to, clear_token } => {
                if clear_token {
                    self.ctx.session.clear_token();
                }
                self.ctx.navigator.push(&to);
                PageView::Redirect { to }
            }
            GuardDecision::Allow { .. } => {
                self.ctx.navigator.push(path);
                self.render(Route::parse(path)).await
            }
        }
    }

    async fn render(&self, route: Route) -> PageView {
        match route {
            Route::SignIn => PageView::SignIn,
            Route::Register => PageView::Register,
            Route::RegisterUser => PageView::RegisterUser,
            Route::RegisterCompany => PageView::RegisterCompany,
            Route::Dashboard => match self.ctx.session.principal() {
                Some(Principal::Company { .. }) => PageView::CompanyDashboard {
                    jobs: self.jobs.company_jobs(None).await,
                },
                Some(Principal::User { .. }) => PageView::UserDashboard {
                    jobs: self.jobs.search_jobs(None).await,
                },
                None => PageView::Redirect {
                    to: routes::SIGN_IN.to_string(),
                },
            },
            Route::Jobs => PageView::Jobs(self.jobs.search_jobs(None).await),
            Route::JobDetail(id) => PageView::JobDetail(self.jobs.get_job(id).await),
            Route::NewJob => PageView::NewJob,
            Route::EditJob(id) => PageView::EditJob(self.jobs.get_job(id).await),
            Route::CompanyJobs => PageView::CompanyJobs(self.jobs.company_jobs(None).await),
            Route::JobCandidates(job_id) => PageView::Candidates {
                job_id,
                candidates: self.jobs.job_candidates(job_id).await,
            },
            Route::Applications => PageView::Applications(self.jobs.user_applications().await),
            Route::Profile => PageView::Profile(self.profile().await),
            Route::EditProfile => PageView::EditProfile(self.profile().await),
            Route::Unknown => PageView::NotFound,
        }
    }

    async fn profile(&self) -> ProfileView {
        match self.ctx.session.principal() {
            Some(Principal::Company { .. }) => ProfileView::Company(self.companies.fetch().await),
            _ => ProfileView::User(self.users.fetch().await),
        }
    }
}

/// Edge router: every page path passes the guard before the page shell is
/// served. The shell only reports what the guard let through.
pub fn edge_router() -> Router {
    Router::new()
        .fallback(page_shell)
        .layer(middleware::from_fn_with_state(RouteGuard::new(), route_guard))
}

async fn page_shell(role: Option<Extension<Role>>, req: Request) -> impl IntoResponse {
    let route = Route::parse(req.uri().path());
    match role {
        Some(Extension(role)) => format!("{:?} as {}", route, role),
        None => format!("{:?}", route),
    }
}

fn write_jobs(f: &mut fmt::Formatter<'_>, jobs: &[Job]) -> fmt::Result {
    if jobs.is_empty() {
        return writeln!(f, "  (no jobs)");
    }
    for job in jobs {
        let salary = job
            .salary
            .map(|s| format!("R$ {:.2}", s))
            .unwrap_or_else(|| "salary not informed".to_string());
        writeln!(
            f,
            "  #{:<5} {} | {} | {} - {}/{} | {}",
            job.job_id, job.title, job.company, job.area, job.city, job.state, salary
        )?;
    }
    Ok(())
}

fn write_job(f: &mut fmt::Formatter<'_>, job: &Job) -> fmt::Result {
    writeln!(f, "{} (#{})", job.title, job.job_id)?;
    writeln!(f, "  Company: {}", job.company)?;
    writeln!(f, "  Area: {}", job.area)?;
    writeln!(f, "  Location: {}/{}", job.city, job.state)?;
    match job.salary {
        Some(s) => writeln!(f, "  Salary: R$ {:.2}", s)?,
        None => writeln!(f, "  Salary: not informed")?,
    }
    writeln!(f, "  Contact: {}", job.contact)?;
    writeln!(f, "  {}", job.description)
}

fn write_profile(f: &mut fmt::Formatter<'_>, profile: &ProfileView) -> fmt::Result {
    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    match profile {
        ProfileView::User(Some(p)) => {
            writeln!(f, "{} (@{})", p.name, p.username)?;
            writeln!(f, "  Email: {}", dash(&p.email))?;
            writeln!(f, "  Phone: {}", dash(&p.phone))?;
            writeln!(f, "  Experience: {}", dash(&p.experience))?;
            writeln!(f, "  Education: {}", dash(&p.education))
        }
        ProfileView::Company(Some(p)) => {
            writeln!(f, "{} (@{})", p.name, p.username)?;
            writeln!(f, "  Business: {}", p.business)?;
            writeln!(f, "  Address: {}, {} - {}/{}", p.street, p.number, p.city, p.state)?;
            writeln!(f, "  Email: {}", dash(&p.email))?;
            writeln!(f, "  Phone: {}", dash(&p.phone))
        }
        ProfileView::User(None) | ProfileView::Company(None) => writeln!(f, "(profile unavailable)"),
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageView::Redirect { to } => writeln!(f, "→ redirected to {}", to),
            PageView::SignIn => writeln!(f, "Sign in: jobboard login --username <u> --password <p>"),
            PageView::Register => writeln!(f, "Register as a user or as a company"),
            PageView::RegisterUser => writeln!(f, "Register a user: jobboard register-user --help"),
            PageView::RegisterCompany => writeln!(f, "Register a company: jobboard register-company --help"),
            PageView::UserDashboard { jobs } => {
                writeln!(f, "Open positions")?;
                write_jobs(f, jobs)
            }
            PageView::CompanyDashboard { jobs } | PageView::CompanyJobs(jobs) => {
                writeln!(f, "Your postings")?;
                write_jobs(f, jobs)
            }
            PageView::Jobs(jobs) => {
                writeln!(f, "Jobs")?;
                write_jobs(f, jobs)
            }
            PageView::JobDetail(Some(job)) | PageView::EditJob(Some(job)) => write_job(f, job),
            PageView::JobDetail(None) | PageView::EditJob(None) => writeln!(f, "(job unavailable)"),
            PageView::NewJob => writeln!(f, "New job: jobboard jobs create --help"),
            PageView::Candidates { job_id, candidates } => {
                writeln!(f, "Candidates for job #{}", job_id)?;
                if candidates.is_empty() {
                    return writeln!(f, "  (no candidates)");
                }
                for c in candidates {
                    writeln!(
                        f,
                        "  [{}] {} | {} | {}",
                        c.user_id,
                        c.name,
                        c.email.as_deref().unwrap_or("-"),
                        c.phone.as_deref().unwrap_or("-")
                    )?;
                }
                Ok(())
            }
            PageView::Applications(items) => {
                writeln!(f, "My applications")?;
                if items.is_empty() {
                    return writeln!(f, "  (no applications)");
                }
                for a in items {
                    let applied = a
                        .applied_at
                        .as_deref()
                        .and_then(|raw| time::from_rfc3339(raw).ok())
                        .map(|at| at.format("%d/%m/%Y").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    writeln!(f, "  #{:<5} {} | {} | applied {}", a.job_id, a.title, a.company, applied)?;
                    if let Some(feedback) = &a.feedback {
                        writeln!(f, "         feedback: {}", feedback)?;
                    }
                }
                Ok(())
            }
            PageView::Profile(profile) | PageView::EditProfile(profile) => write_profile(f, profile),
            PageView::NotFound => writeln!(f, "Page not found"),
        }
    }
}
