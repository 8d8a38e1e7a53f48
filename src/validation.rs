//! Field rules and the per-task checks built from them.
//!
//! Everything here is pure: checks that need the database (is the user
//! registered, does the job exist) live in the services.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::{macros::format_description, Date};

use crate::models::{JobChanges, JobId, JobLookup, JobPosting, NewUser, SearchCriteria, Submission};

pub const MAX_EMAIL_LEN: usize = 32;
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_TITLE_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 1024;
pub const MAX_EDUCATION: i64 = 4;
pub const MAX_EXPERIENCE: i64 = 75;
pub const MAX_SALARY: i64 = 1_000_000;

pub const BAD_EXPERIENCE_FORMAT: &str = "Invalid experience format - must be integer";
pub const BAD_EDUCATION_FORMAT: &str = "Invalid education format - must be integer from 0 to 4";
pub const BAD_SALARY_FORMAT: &str = "Invalid salary format - must be integer less than one million";
pub const BAD_IS_OPEN_FORMAT: &str = "Invalid is_open value - must be true or false";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

pub type Validated<T = ()> = Result<T, ValidationError>;

fn fail<T>(msg: impl Into<String>) -> Validated<T> {
    Err(ValidationError(msg.into()))
}

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^0[0-9]{9}$").unwrap();
}

pub fn validate_email(email: &str) -> Validated {
    if email.trim().is_empty() {
        return fail("Missing user email");
    }
    validate_length(email, MAX_EMAIL_LEN, "Email")?;
    if !EMAIL_RE.is_match(email) {
        return fail("Invalid email address");
    }
    Ok(())
}

/// `which` is "first" or "last" and only shapes the message.
pub fn validate_name(name: &str, which: &str) -> Validated {
    if name.is_empty() {
        return fail(format!("Missing user {which} name"));
    }
    validate_length(name, MAX_NAME_LEN, &format!("{which} name"))?;
    if !NAME_RE.is_match(name) {
        return fail(format!("Invalid {which} name"));
    }
    Ok(())
}

/// Ten digits, leading zero.
pub fn validate_phone(phone: &str) -> Validated {
    if phone.is_empty() {
        return fail("Missing user phone number");
    }
    if !PHONE_RE.is_match(phone) {
        return fail("Invalid phone number");
    }
    Ok(())
}

pub fn validate_education(level: i64) -> Validated {
    if !(0..=MAX_EDUCATION).contains(&level) {
        return fail("Invalid education level");
    }
    Ok(())
}

pub fn validate_experience(years: i64) -> Validated {
    if !(0..=MAX_EXPERIENCE).contains(&years) {
        return fail("Invalid years of experience");
    }
    Ok(())
}

/// Monthly salary; zero means unspecified.
pub fn validate_salary(salary: i64) -> Validated {
    if !(0..=MAX_SALARY).contains(&salary) {
        return fail("Invalid salary");
    }
    Ok(())
}

pub fn validate_date(value: &str) -> Validated<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .or_else(|_| fail("Invalid date"))
}

/// A value starting with `-` is almost always the next flag swallowed as a value.
pub fn validate_non_empty(value: &str, label: &str) -> Validated {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return fail(format!("{label} must not be blank"));
    }
    Ok(())
}

/// Limits count characters, not bytes, matching the "characters or less" wording.
pub fn validate_length(value: &str, max: usize, label: &str) -> Validated {
    if value.chars().count() > max {
        return fail(format!("{label} must be {max} characters or less"));
    }
    Ok(())
}

/// Numbers that arrive as text. Absent or blank means zero ("not given").
pub fn parse_int(value: Option<&str>, msg: &str) -> Validated<i64> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(0),
        Some(v) => v.parse().or_else(|_| fail(msg)),
    }
}

pub fn parse_flag(value: Option<&str>) -> Validated<Option<bool>> {
    let Some(v) = value.map(str::trim) else {
        return Ok(None);
    };
    match v.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(Some(true)),
        "false" | "f" | "0" => Ok(Some(false)),
        _ => fail(BAD_IS_OPEN_FORMAT),
    }
}

pub fn parse_job_id(value: &str) -> Validated<JobId> {
    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(JobId(id)),
        _ => fail("Invalid job ID specified"),
    }
}

// ---- per-task checks ----

pub fn validate_new_user(user: &NewUser) -> Validated {
    validate_email(&user.email)?;
    validate_name(&user.first, "first")?;
    validate_name(&user.last, "last")?;
    validate_phone(&user.phone)?;
    validate_education(user.education)
}

pub fn validate_job_posting(job: &JobPosting) -> Validated {
    validate_email(&job.creator)?;
    validate_non_empty(&job.title, "title")?;
    validate_length(&job.title, MAX_TITLE_LEN, "title")?;
    validate_non_empty(&job.description, "description")?;
    validate_length(&job.description, MAX_DESCRIPTION_LEN, "description")?;
    validate_education(job.min_education)?;
    validate_experience(job.min_experience)?;
    validate_salary(job.salary)
}

pub fn validate_job_changes(changes: &JobChanges) -> Validated<JobId> {
    validate_email(&changes.creator)?;
    let id = parse_job_id(&changes.job_id)?;
    validate_length(&changes.title, MAX_TITLE_LEN, "title")?;
    validate_length(&changes.description, MAX_DESCRIPTION_LEN, "description")?;
    if changes.min_education != 0 {
        validate_education(changes.min_education)?;
    }
    if changes.min_experience != 0 {
        validate_experience(changes.min_experience)?;
    }
    if changes.salary != 0 {
        validate_salary(changes.salary)?;
    }
    if changes.is_empty() {
        return fail("No changes specified");
    }
    Ok(id)
}

pub fn validate_search_criteria(criteria: &SearchCriteria) -> Validated {
    validate_email(&criteria.user_email)?;
    if !criteria.posted.is_empty() {
        validate_date(&criteria.posted)?;
    }
    if criteria.experience != 0 {
        validate_experience(criteria.experience)?;
    }
    if criteria.education != 0 {
        validate_education(criteria.education)?;
    }
    if criteria.salary != 0 {
        validate_salary(criteria.salary)?;
    }
    Ok(())
}

pub fn validate_job_lookup(lookup: &JobLookup) -> Validated<JobId> {
    validate_email(&lookup.email)?;
    parse_job_id(&lookup.job_id)
}

pub fn validate_submission(submission: &Submission) -> Validated<JobId> {
    validate_email(&submission.email)?;
    parse_job_id(&submission.job_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg<T: std::fmt::Debug>(r: Validated<T>) -> String {
        r.unwrap_err().0
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("jane.doe+jobs@example.co.th").is_ok());
        assert_eq!(msg(validate_email("  ")), "Missing user email");
        assert_eq!(msg(validate_email("not-an-email")), "Invalid email address");
        assert_eq!(msg(validate_email("a@b.c")), "Invalid email address");
        let long = format!("{}@example.com", "a".repeat(30));
        assert_eq!(msg(validate_email(&long)), "Email must be 32 characters or less");
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("Sally", "first").is_ok());
        assert_eq!(msg(validate_name("", "last")), "Missing user last name");
        assert_eq!(msg(validate_name("O'Neil", "last")), "Invalid last name");
        assert_eq!(msg(validate_name("Ann2", "first")), "Invalid first name");
        assert_eq!(
            msg(validate_name(&"x".repeat(33), "first")),
            "first name must be 32 characters or less"
        );
    }

    #[test]
    fn phone_needs_ten_digits_with_leading_zero() {
        assert!(validate_phone("0812345678").is_ok());
        assert_eq!(msg(validate_phone("")), "Missing user phone number");
        assert_eq!(msg(validate_phone("1812345678")), "Invalid phone number");
        assert_eq!(msg(validate_phone("081234567")), "Invalid phone number");
        assert_eq!(msg(validate_phone("08123456789")), "Invalid phone number");
    }

    #[test]
    fn numeric_bounds() {
        assert!(validate_education(0).is_ok());
        assert!(validate_education(4).is_ok());
        assert!(validate_education(5).is_err());
        assert!(validate_education(-1).is_err());
        assert!(validate_experience(75).is_ok());
        assert_eq!(msg(validate_experience(76)), "Invalid years of experience");
        assert!(validate_salary(1_000_000).is_ok());
        assert_eq!(msg(validate_salary(1_000_001)), "Invalid salary");
        assert_eq!(msg(validate_salary(-10)), "Invalid salary");
    }

    #[test]
    fn dates_must_be_real_calendar_days() {
        assert!(validate_date("2025-06-23").is_ok());
        assert!(validate_date("2024-02-29").is_ok());
        assert_eq!(msg(validate_date("2025-02-30")), "Invalid date");
        assert_eq!(msg(validate_date("23/06/2025")), "Invalid date");
    }

    #[test]
    fn job_ids() {
        assert_eq!(parse_job_id("00012").unwrap(), JobId(12));
        assert_eq!(parse_job_id("7").unwrap(), JobId(7));
        assert_eq!(msg(parse_job_id("0")), "Invalid job ID specified");
        assert_eq!(msg(parse_job_id("-3")), "Invalid job ID specified");
        assert_eq!(msg(parse_job_id("abc")), "Invalid job ID specified");
        assert_eq!(msg(parse_job_id("")), "Invalid job ID specified");
    }

    #[test]
    fn blank_and_swallowed_flag_values_are_rejected() {
        assert_eq!(msg(validate_non_empty("   ", "title")), "title must not be blank");
        assert_eq!(msg(validate_non_empty("-salary", "title")), "title must not be blank");
        assert!(validate_non_empty("Engineer", "title").is_ok());
    }

    fn posting() -> JobPosting {
        JobPosting {
            creator: "boss@example.com".into(),
            title: "Backend engineer".into(),
            description: "Build the job board".into(),
            min_education: 2,
            min_experience: 3,
            salary: 80_000,
        }
    }

    #[test]
    fn posting_requires_title_and_description() {
        assert!(validate_job_posting(&posting()).is_ok());

        let mut job = posting();
        job.title.clear();
        assert_eq!(msg(validate_job_posting(&job)), "title must not be blank");

        let mut job = posting();
        job.description = "d".repeat(MAX_DESCRIPTION_LEN + 1);
        assert_eq!(
            msg(validate_job_posting(&job)),
            "description must be 1024 characters or less"
        );

        let mut job = posting();
        job.salary = 2_000_000;
        assert_eq!(msg(validate_job_posting(&job)), "Invalid salary");
    }

    #[test]
    fn textual_numbers_and_flags() {
        assert_eq!(parse_int(None, BAD_SALARY_FORMAT), Ok(0));
        assert_eq!(parse_int(Some("  "), BAD_SALARY_FORMAT), Ok(0));
        assert_eq!(parse_int(Some("-5"), BAD_SALARY_FORMAT), Ok(-5));
        assert_eq!(msg(parse_int(Some("lots"), BAD_SALARY_FORMAT)), BAD_SALARY_FORMAT);

        assert_eq!(parse_flag(None), Ok(None));
        assert_eq!(parse_flag(Some("FALSE")), Ok(Some(false)));
        assert_eq!(parse_flag(Some("1")), Ok(Some(true)));
        assert_eq!(msg(parse_flag(Some("maybe"))), BAD_IS_OPEN_FORMAT);
    }

    #[test]
    fn length_limits_count_characters() {
        let mut job = posting();
        job.title = "é".repeat(MAX_TITLE_LEN);
        assert!(validate_job_posting(&job).is_ok());

        job.title.push('é');
        assert_eq!(
            msg(validate_job_posting(&job)),
            "title must be 64 characters or less"
        );
    }

    #[test]
    fn changes_treat_zero_and_empty_as_unchanged() {
        let changes = JobChanges {
            creator: "boss@example.com".into(),
            job_id: "00004".into(),
            salary: 90_000,
            ..Default::default()
        };
        assert_eq!(validate_job_changes(&changes).unwrap(), JobId(4));

        let nothing = JobChanges {
            creator: "boss@example.com".into(),
            job_id: "4".into(),
            ..Default::default()
        };
        assert_eq!(msg(validate_job_changes(&nothing)), "No changes specified");

        let bad_id = JobChanges {
            job_id: "x".into(),
            ..changes.clone()
        };
        assert_eq!(msg(validate_job_changes(&bad_id)), "Invalid job ID specified");

        let bad_edu = JobChanges {
            min_education: 9,
            ..changes
        };
        assert_eq!(msg(validate_job_changes(&bad_edu)), "Invalid education level");
    }

    #[test]
    fn search_criteria_only_checks_set_fields() {
        let mut criteria = SearchCriteria {
            user_email: "seeker@example.com".into(),
            ..Default::default()
        };
        assert!(validate_search_criteria(&criteria).is_ok());

        criteria.posted = "2025-13-01".into();
        assert_eq!(msg(validate_search_criteria(&criteria)), "Invalid date");

        criteria.posted = "2025-06-01".into();
        criteria.experience = 80;
        assert_eq!(
            msg(validate_search_criteria(&criteria)),
            "Invalid years of experience"
        );

        criteria.experience = 5;
        criteria.user_email.clear();
        assert_eq!(msg(validate_search_criteria(&criteria)), "Missing user email");
    }

    #[test]
    fn register_checks_every_field_in_order() {
        let user = NewUser {
            email: "jane@example.com".into(),
            first: "Jane".into(),
            last: "Doe".into(),
            phone: "0812345678".into(),
            education: 3,
        };
        assert!(validate_new_user(&user).is_ok());
        let bad = NewUser {
            phone: "12345".into(),
            education: 7,
            ..user
        };
        assert_eq!(msg(validate_new_user(&bad)), "Invalid phone number");
    }

    #[test]
    fn submission_and_lookup_return_the_parsed_id() {
        let sub = Submission {
            email: "seeker@example.com".into(),
            job_id: "00009".into(),
        };
        assert_eq!(validate_submission(&sub).unwrap(), JobId(9));
        let lookup = JobLookup {
            email: "bad".into(),
            job_id: "1".into(),
        };
        assert_eq!(msg(validate_job_lookup(&lookup)), "Invalid email address");
    }
}
