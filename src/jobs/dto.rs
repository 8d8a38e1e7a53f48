use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{JobLookup, SearchCriteria};
use crate::validation::{parse_int, BAD_EDUCATION_FORMAT, BAD_EXPERIENCE_FORMAT, BAD_SALARY_FORMAT};

/// Query string of `GET /search`. Numbers arrive as text so a bad value can
/// be reported with its own message.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub user_email: String,
    pub posted: String,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub salary: Option<String>,
    pub keyword: String,
}

impl TryFrom<SearchQuery> for SearchCriteria {
    type Error = AppError;

    fn try_from(q: SearchQuery) -> Result<Self, Self::Error> {
        Ok(SearchCriteria {
            experience: parse_int(q.experience.as_deref(), BAD_EXPERIENCE_FORMAT)?,
            education: parse_int(q.education.as_deref(), BAD_EDUCATION_FORMAT)?,
            salary: parse_int(q.salary.as_deref(), BAD_SALARY_FORMAT)?,
            user_email: q.user_email,
            posted: q.posted,
            keyword: q.keyword,
        })
    }
}

/// `GET /search/detail?user_email=..&job_id=..`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetailQuery {
    pub user_email: String,
    pub job_id: String,
}

impl From<DetailQuery> for JobLookup {
    fn from(q: DetailQuery) -> Self {
        JobLookup {
            email: q.user_email,
            job_id: q.job_id,
        }
    }
}

/// `GET /search/candidates?creator=..&job_id=..`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CandidatesQuery {
    pub creator: String,
    pub job_id: String,
}

impl From<CandidatesQuery> for JobLookup {
    fn from(q: CandidatesQuery) -> Self {
        JobLookup {
            email: q.creator,
            job_id: q.job_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OfferedQuery {
    pub creator: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppliedQuery {
    pub user_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_numbers_mean_unset() {
        let q = SearchQuery {
            user_email: "a@b.com".into(),
            experience: Some("".into()),
            salary: Some(" 5000 ".into()),
            ..Default::default()
        };
        let c = SearchCriteria::try_from(q).unwrap();
        assert_eq!(c.experience, 0);
        assert_eq!(c.education, 0);
        assert_eq!(c.salary, 5000);
    }

    #[test]
    fn non_integer_numbers_are_rejected_with_field_message() {
        let q = SearchQuery {
            education: Some("phd".into()),
            ..Default::default()
        };
        let err = SearchCriteria::try_from(q).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid education format - must be integer from 0 to 4"
        );
    }
}
