use std::collections::HashMap;
use std::ffi::OsString;
use std::process::ExitCode;

use clap::error::{ContextKind, ErrorKind};
use clap::{CommandFactory, Parser, ValueEnum};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::{debug, instrument, warn};

use crate::errors::AppError;
use crate::jobs::services as jobs;
use crate::models::{JobChanges, JobLookup, JobPosting, NewUser, SearchCriteria, Submission};
use crate::reply::TaskReply;
use crate::users::services as users;
use crate::validation::{
    parse_flag, parse_int, BAD_EDUCATION_FORMAT, BAD_EXPERIENCE_FORMAT, BAD_SALARY_FORMAT,
};

pub const INVALID_TASK: &str = "Invalid task specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Task {
    /// Create a new user in the database
    Register,
    /// Create a new job posting
    Create,
    /// General search for jobs
    Search,
    /// Detailed information about a selected job
    Detail,
    /// Jobs created by me
    Offered,
    /// Jobs I have applied for
    Applied,
    /// Modify a job created by me
    Modify,
    /// Submit an application for a job
    Submit,
    /// Applicants for a job created by me
    Candidates,
}

impl Task {
    pub fn from_name(name: &str) -> Option<Task> {
        <Task as ValueEnum>::from_str(name.trim(), true).ok()
    }

    /// Flags read by this task.
    pub fn usage(self) -> &'static str {
        match self {
            Task::Register => {
                "--email <email> --first <name> --last <name> --phone <0XXXXXXXXX> --education <0-4>"
            }
            Task::Create => {
                "--creator <email> --title <text, 64 max> --description <text, 1024 max> \
                 [--min_education <0-4>] [--min_experience <0-75>] [--salary <0-1000000>]"
            }
            Task::Search => {
                "--email <email> [--posted <YYYY-MM-DD>] [--min_experience <years>] \
                 [--min_education <0-4>] [--salary <minimum>] [--keyword <title text>]"
            }
            Task::Detail => "--email <email> --job_id <id>",
            Task::Offered => "--creator <email>",
            Task::Applied => "--email <email>",
            Task::Modify => {
                "--creator <email> --job_id <id> [--title <text>] [--description <text>] \
                 [--min_education <1-4>] [--min_experience <1-75>] [--salary <1-1000000>] \
                 [--is_open <true|false>]"
            }
            Task::Submit => "--email <email> --job_id <id>",
            Task::Candidates => "--creator <email> --job_id <id>",
        }
    }
}

/// JobWizard: register users, post and search jobs, apply. Writes results to standard output as JSON.
///
/// Values are taken as text and checked by the task, so a bad number or a
/// swallowed flag is reported as a JSON error like any other input mistake.
#[derive(Debug, Parser)]
#[command(name = "jobwizard", version)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Expose the REST API instead of running a single task
    #[arg(long)]
    pub server: bool,

    /// Task to perform
    #[arg(long, allow_hyphen_values = true)]
    pub task: Option<String>,

    /// Show the arguments of one task
    #[arg(long, value_name = "TASK", allow_hyphen_values = true)]
    pub taskhelp: Option<String>,

    /// Email of the user performing the task
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub email: String,

    /// First name of user registering
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub first: String,

    /// Last name of user registering
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub last: String,

    /// 10 digit phone number of user registering
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub phone: String,

    /// Education of user registering - 0 to 4 (doctoral)
    #[arg(long, allow_hyphen_values = true)]
    pub education: Option<String>,

    /// Email of the user who created (or is creating) the job
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub creator: String,

    /// Job title, in quotes - 64 chars max
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub title: String,

    /// Job description, in quotes - 1024 chars max
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub description: String,

    /// Minimum education level required - integer from 0 to 4
    #[arg(long = "min_education", allow_hyphen_values = true)]
    pub min_education: Option<String>,

    /// Minimum years of experience
    #[arg(long = "min_experience", allow_hyphen_values = true)]
    pub min_experience: Option<String>,

    /// Monthly salary - integer, max 1 million
    #[arg(long, allow_hyphen_values = true)]
    pub salary: Option<String>,

    /// Open or close a job when modifying it (true or false)
    #[arg(long = "is_open", allow_hyphen_values = true)]
    pub is_open: Option<String>,

    /// Only jobs posted on or after this date (YYYY-MM-DD)
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub posted: String,

    /// Keyword for title search
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub keyword: String,

    /// Id of the job
    #[arg(long = "job_id", default_value = "", allow_hyphen_values = true)]
    pub job_id: String,

    /// Anything after the first stray value is ignored.
    #[arg(hide = true, num_args = 1.., trailing_var_arg = true)]
    pub trailing: Vec<String>,
}

/// Why the command line could not be turned into a `Cli`.
#[derive(Debug)]
pub enum ArgsError {
    /// `--help` or `--version`; clap prints these itself.
    Display(clap::Error),
    Invalid(AppError),
}

/// Accept single-dash long flags (`-task register`) alongside `--task register`.
///
/// Only names of real long flags are rewritten, and never the token right
/// after a flag that takes a value, so `-keyword -net` keeps `-net` as the keyword.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut cmd = Cli::command();
    cmd.build();
    let long_flags: HashMap<String, bool> = cmd
        .get_arguments()
        .filter_map(|arg| {
            arg.get_long()
                .map(|long| (long.to_string(), arg.get_action().takes_values()))
        })
        .collect();

    let mut out = Vec::new();
    let mut value_expected = false;
    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || std::mem::take(&mut value_expected) {
            out.push(arg);
            continue;
        }
        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        let name = s.strip_prefix("--").or_else(|| s.strip_prefix('-'));
        let Some(name) = name else {
            out.push(arg);
            continue;
        };
        let (flag, inline_value) = match name.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (name, false),
        };
        match long_flags.get(flag) {
            Some(&takes_value) => {
                value_expected = takes_value && !inline_value;
                if s.starts_with("--") {
                    out.push(arg);
                } else {
                    out.push(OsString::from(format!("-{s}")));
                }
            }
            None => out.push(arg),
        }
    }
    out
}

/// Parse the process arguments, single-dash long flags included.
pub fn parse_args<I>(args: I) -> Result<Cli, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    Cli::try_parse_from(normalize_args(args)).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ArgsError::Display(e),
        kind => {
            let msg = match e.get(ContextKind::InvalidArg) {
                Some(arg) => format!("Invalid arguments: {kind} ({arg})"),
                None => format!("Invalid arguments: {kind}"),
            };
            ArgsError::Invalid(AppError::Validation(msg))
        }
    })
}

impl Cli {
    /// The task named by `--task`, matched case-insensitively.
    pub fn selected_task(&self) -> Result<Task, AppError> {
        self.task
            .as_deref()
            .and_then(Task::from_name)
            .ok_or_else(|| AppError::Validation(INVALID_TASK.into()))
    }

    fn new_user(&self) -> Result<NewUser, AppError> {
        Ok(NewUser {
            email: self.email.clone(),
            first: self.first.clone(),
            last: self.last.clone(),
            phone: self.phone.clone(),
            education: parse_int(self.education.as_deref(), BAD_EDUCATION_FORMAT)?,
        })
    }

    fn min_education(&self) -> Result<i64, AppError> {
        Ok(parse_int(self.min_education.as_deref(), BAD_EDUCATION_FORMAT)?)
    }

    fn min_experience(&self) -> Result<i64, AppError> {
        Ok(parse_int(self.min_experience.as_deref(), BAD_EXPERIENCE_FORMAT)?)
    }

    fn salary(&self) -> Result<i64, AppError> {
        Ok(parse_int(self.salary.as_deref(), BAD_SALARY_FORMAT)?)
    }

    fn job_posting(&self) -> Result<JobPosting, AppError> {
        Ok(JobPosting {
            creator: self.creator.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            min_education: self.min_education()?,
            min_experience: self.min_experience()?,
            salary: self.salary()?,
        })
    }

    fn job_changes(&self) -> Result<JobChanges, AppError> {
        Ok(JobChanges {
            creator: self.creator.clone(),
            job_id: self.job_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            min_education: self.min_education()?,
            min_experience: self.min_experience()?,
            salary: self.salary()?,
            is_open: parse_flag(self.is_open.as_deref())?,
        })
    }

    fn search_criteria(&self) -> Result<SearchCriteria, AppError> {
        Ok(SearchCriteria {
            user_email: self.email.clone(),
            posted: self.posted.clone(),
            experience: self.min_experience()?,
            education: self.min_education()?,
            salary: self.salary()?,
            keyword: self.keyword.clone(),
        })
    }

    fn lookup(&self, email: &str) -> JobLookup {
        JobLookup {
            email: email.to_string(),
            job_id: self.job_id.clone(),
        }
    }

    fn submission(&self) -> Submission {
        Submission {
            email: self.email.clone(),
            job_id: self.job_id.clone(),
        }
    }
}

/// Run one task against the database and return the reply to print.
#[instrument(skip(db, cli))]
pub async fn run_task(db: &SqlitePool, task: Task, cli: &Cli) -> Result<TaskReply, AppError> {
    let reply = match task {
        Task::Register => TaskReply::registered(&users::register_user(db, cli.new_user()?).await?),
        Task::Create => TaskReply::Created {
            job_id: jobs::create_job(db, cli.job_posting()?).await?,
        },
        Task::Search => TaskReply::summaries(jobs::search_jobs(db, cli.search_criteria()?).await?),
        Task::Detail => TaskReply::Detail(jobs::job_detail(db, cli.lookup(&cli.email)).await?),
        Task::Offered => TaskReply::summaries(jobs::search_offered(db, &cli.creator).await?),
        Task::Applied => TaskReply::summaries(jobs::search_applied(db, &cli.email).await?),
        Task::Modify => TaskReply::Modified {
            modified_job_id: jobs::modify_job(db, cli.job_changes()?).await?,
        },
        Task::Submit => jobs::submit_application(db, cli.submission()).await?.into(),
        Task::Candidates => {
            TaskReply::candidates(jobs::list_candidates(db, cli.lookup(&cli.creator)).await?)
        }
    };
    Ok(reply)
}

/// The one JSON document a CLI run prints, and whether the run succeeded.
#[derive(Debug)]
pub struct Outcome {
    pub body: Value,
    pub success: bool,
}

impl Outcome {
    pub fn failed(err: &AppError) -> Self {
        Self {
            body: err.to_json(),
            success: false,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            body: json!({ "error": message }),
            success: false,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Run a task and turn its reply or error into the document to print.
pub async fn execute(db: &SqlitePool, task: Task, cli: &Cli) -> Outcome {
    if !cli.trailing.is_empty() {
        warn!(ignored = ?cli.trailing, "ignoring trailing arguments");
    }
    let result = run_task(db, task, cli).await.and_then(|reply| {
        serde_json::to_value(&reply).map_err(|e| AppError::Internal(e.into()))
    });
    match result {
        Ok(body) => Outcome {
            body,
            success: true,
        },
        Err(e) => {
            debug!(error = %e, "task failed");
            Outcome::failed(&e)
        }
    }
}

/// General usage text, or the flags of one task.
pub fn usage(task: Option<Task>) -> String {
    let mut out = String::from(
        "General usage: jobwizard --task <taskname> [arguments...]\n\
         \tWrites results to standard output in JSON format\n\n",
    );
    match task {
        Some(t) => {
            let name = t
                .to_possible_value()
                .map(|v| v.get_name().to_string())
                .unwrap_or_default();
            out.push_str(&format!("Arguments for '{name}':\n\t{}\n", t.usage()));
        }
        None => {
            out.push_str("Available tasks:\n");
            for t in Task::value_variants() {
                if let Some(v) = t.to_possible_value() {
                    let help = v.get_help().map(|h| h.to_string()).unwrap_or_default();
                    out.push_str(&format!("\t{} - {}\n", v.get_name(), help));
                }
            }
            out.push_str("\nFor task arguments, type jobwizard --taskhelp <task_name>\n");
        }
    }
    out
}
