use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use jobboard_frontend::{
    config::{get_config, init_config, LogFormat},
    dto::auth_dto::{LoginForm, RegisterCompanyForm, RegisterUserForm},
    dto::job_dto::{parse_salary, ApplicationForm, FeedbackForm, JobForm, JobSearchFilters, SalaryRange},
    dto::profile_dto::{UpdateCompanyForm, UpdateUserForm},
    models::principal::Principal,
    pages::{self, PageView, ProfileView},
    services::{navigation::History, notification_service::ConsoleNotifier},
    utils::validation::FormErrors,
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobboard", version, about = "Job board client: browse, post and apply to jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Create a job seeker account
    RegisterUser(RegisterUserArgs),
    /// Create a company account
    RegisterCompany(CompanyArgs),
    /// Show who is signed in
    Whoami,
    /// Show or change the backend address
    Server { url: Option<String> },
    /// Navigate to a page, as the browser would
    Open { path: String },
    /// Serve the page guard over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    #[command(subcommand)]
    Jobs(JobsCommand),
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Subcommand)]
enum JobsCommand {
    /// Search open positions
    Search(SearchArgs),
    /// Show one posting
    Show { job_id: i64 },
    /// List the signed-in company's postings
    Mine(SearchArgs),
    Create(JobArgs),
    Update {
        job_id: i64,
        #[command(flatten)]
        job: JobArgs,
    },
    Delete { job_id: i64 },
    /// Apply to a posting as the signed-in user
    Apply {
        job_id: i64,
        #[command(flatten)]
        application: ApplicationArgs,
    },
    /// List the signed-in user's applications
    Applications,
    /// List candidates for one of the company's postings
    Candidates { job_id: i64 },
    /// Send feedback to a candidate
    Feedback {
        job_id: i64,
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    Show,
    UpdateUser(UpdateUserArgs),
    UpdateCompany(CompanyArgs),
    /// Delete the signed-in account
    Delete,
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    area: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    min_salary: Option<String>,
    #[arg(long)]
    max_salary: Option<String>,
}

impl SearchArgs {
    fn into_filters(self) -> Option<JobSearchFilters> {
        let filters = JobSearchFilters {
            title: self.title,
            area: self.area,
            company: self.company,
            state: self.state,
            city: self.city,
            salary_range: Some(SalaryRange {
                min: self.min_salary.as_deref().and_then(parse_salary),
                max: self.max_salary.as_deref().and_then(parse_salary),
            }),
        }
        .compact();
        (filters != JobSearchFilters::default()).then_some(filters)
    }
}

#[derive(Args)]
struct JobArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    area: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    city: String,
    /// Accepts a decimal comma, e.g. 1500,50
    #[arg(long)]
    salary: Option<String>,
}

impl From<JobArgs> for JobForm {
    fn from(args: JobArgs) -> Self {
        JobForm {
            title: args.title,
            area: args.area,
            description: args.description,
            state: args.state,
            city: args.city,
            salary: args.salary.as_deref().and_then(parse_salary),
        }
    }
}

#[derive(Args)]
struct ApplicationArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    education: String,
    #[arg(long)]
    experience: String,
}

#[derive(Args)]
struct RegisterUserArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    username: String,
    #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    experience: Option<String>,
    #[arg(long)]
    education: Option<String>,
}

#[derive(Args)]
struct UpdateUserArgs {
    #[arg(long)]
    name: String,
    /// Leave out to keep the current password
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    experience: Option<String>,
    #[arg(long)]
    education: Option<String>,
}

#[derive(Args)]
struct CompanyArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    business: String,
    /// Required on registration; optional on update
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    street: String,
    #[arg(long)]
    number: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    email: String,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn print_form_errors(errors: &FormErrors) {
    for (field, message) in errors {
        eprintln!("  {}: {}", field, message);
    }
}

fn outcome(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_config()?;
    let config = get_config()?;
    init_tracing(config.log_format);

    let history = History::new();
    let app = AppState::from_config(config, Arc::new(ConsoleNotifier), Arc::new(history.clone()))?;

    let code = match cli.command {
        Command::Login { username, password } => {
            let ok = app.auth.login(LoginForm { username, password }).await;
            print_form_errors(&app.auth.store().snapshot().form_errors);
            outcome(ok)
        }
        Command::Logout => {
            app.auth.logout().await;
            ExitCode::SUCCESS
        }
        Command::RegisterUser(args) => {
            let ok = app
                .auth
                .register_user(RegisterUserForm {
                    name: args.name,
                    username: args.username,
                    email: args.email,
                    password: args.password,
                    phone: args.phone,
                    experience: args.experience,
                    education: args.education,
                })
                .await;
            print_form_errors(&app.auth.store().snapshot().form_errors);
            outcome(ok)
        }
        Command::RegisterCompany(args) => {
            let ok = app
                .auth
                .register_company(RegisterCompanyForm {
                    name: args.name,
                    business: args.business,
                    username: args.username.unwrap_or_default(),
                    password: args.password.unwrap_or_default(),
                    street: args.street,
                    number: args.number,
                    city: args.city,
                    state: args.state,
                    phone: args.phone,
                    email: args.email,
                })
                .await;
            print_form_errors(&app.auth.store().snapshot().form_errors);
            outcome(ok)
        }
        Command::Whoami => match app.ctx.session.claims() {
            Some(claims) => {
                let expires = claims
                    .expires_at()
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                let principal = claims.principal();
                println!(
                    "{} ({} #{}), session expires {}",
                    principal.username(),
                    principal.role(),
                    principal.id(),
                    expires
                );
                outcome(!app.ctx.session.is_expired())
            }
            None => {
                println!("Not signed in");
                ExitCode::FAILURE
            }
        },
        Command::Server { url: Some(url) } => outcome(app.set_server(&url)),
        Command::Server { url: None } => match app.ctx.api.endpoint().resolve() {
            Ok(url) => {
                println!("{}", url);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        Command::Open { path } => {
            let view = app.pages.open(&path).await;
            print!("{}", view);
            outcome(!matches!(view, PageView::NotFound))
        }
        Command::Serve { addr } => {
            let listener = TcpListener::bind(addr).await?;
            info!("Page guard listening on {}", addr);
            axum::serve(listener, pages::edge_router()).await?;
            ExitCode::SUCCESS
        }
        Command::Jobs(command) => run_jobs(&app, command).await,
        Command::Profile(command) => run_profile(&app, command).await,
    };

    if let Some(location) = history.current() {
        println!("→ {}", location);
    }
    Ok(code)
}

async fn run_jobs(app: &AppState, command: JobsCommand) -> ExitCode {
    let jobs = &app.jobs;
    let code = match command {
        JobsCommand::Search(args) => {
            let found = jobs.search_jobs(args.into_filters()).await;
            print!("{}", PageView::Jobs(found));
            outcome(jobs.store().snapshot().error.is_none())
        }
        JobsCommand::Show { job_id } => {
            let job = jobs.get_job(job_id).await;
            let ok = job.is_some();
            print!("{}", PageView::JobDetail(job));
            outcome(ok)
        }
        JobsCommand::Mine(args) => {
            let found = jobs.company_jobs(args.into_filters()).await;
            print!("{}", PageView::CompanyJobs(found));
            outcome(jobs.store().snapshot().error.is_none())
        }
        JobsCommand::Create(args) => outcome(jobs.create_job(args.into()).await),
        JobsCommand::Update { job_id, job } => outcome(jobs.update_job(job_id, job.into()).await),
        JobsCommand::Delete { job_id } => outcome(jobs.delete_job(job_id).await),
        JobsCommand::Apply { job_id, application } => {
            let form = ApplicationForm {
                name: application.name,
                email: application.email,
                phone: application.phone,
                education: application.education,
                experience: application.experience,
            };
            outcome(jobs.apply_to_job(job_id, form).await)
        }
        JobsCommand::Applications => {
            let items = jobs.user_applications().await;
            print!("{}", PageView::Applications(items));
            outcome(jobs.store().snapshot().error.is_none())
        }
        JobsCommand::Candidates { job_id } => {
            let candidates = jobs.job_candidates(job_id).await;
            print!("{}", PageView::Candidates { job_id, candidates });
            outcome(jobs.store().snapshot().error.is_none())
        }
        JobsCommand::Feedback {
            job_id,
            user_id,
            message,
        } => outcome(jobs.send_feedback(job_id, FeedbackForm { user_id, message }).await),
    };
    print_form_errors(&jobs.store().snapshot().form_errors);
    code
}

async fn run_profile(app: &AppState, command: ProfileCommand) -> ExitCode {
    let code = match command {
        ProfileCommand::Show => {
            let view = match app.ctx.session.principal() {
                Some(Principal::Company { .. }) => ProfileView::Company(app.companies.fetch().await),
                _ => ProfileView::User(app.users.fetch().await),
            };
            let ok = !matches!(view, ProfileView::User(None) | ProfileView::Company(None));
            print!("{}", PageView::Profile(view));
            outcome(ok)
        }
        ProfileCommand::UpdateUser(args) => outcome(
            app.users
                .update(UpdateUserForm {
                    name: args.name,
                    email: args.email,
                    password: args.password,
                    phone: args.phone,
                    experience: args.experience,
                    education: args.education,
                })
                .await,
        ),
        ProfileCommand::UpdateCompany(args) => outcome(
            app.companies
                .update(UpdateCompanyForm {
                    name: args.name,
                    business: args.business,
                    password: args.password,
                    street: args.street,
                    number: args.number,
                    city: args.city,
                    state: args.state,
                    phone: args.phone,
                    email: args.email,
                })
                .await,
        ),
        ProfileCommand::Delete => match app.ctx.session.principal() {
            Some(Principal::Company { .. }) => outcome(app.companies.delete().await),
            _ => outcome(app.users.delete().await),
        },
    };
    print_form_errors(&app.users.store().snapshot().form_errors);
    print_form_errors(&app.companies.store().snapshot().form_errors);
    code
}
