//! Query-parameter filters for the recruitment listing.
//!
//! Every supplied parameter adds one `AND` condition on top of `r.active`.
//! Missing or blank parameters add nothing.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct RecruitmentQuery {
    pub company_id: Option<String>,
    pub category_id: Option<String>,
    pub work_type_id: Option<String>,
    /// Case-insensitive substring of the title.
    pub key: Option<String>,
    /// Case-insensitive substring of the location.
    pub province: Option<String>,
    /// `YYYY-MM-DD`; postings starting on or after this day.
    pub date_start: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecruitmentCriteria {
    pub company_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub work_type_id: Option<Uuid>,
    pub title_contains: Option<String>,
    pub location_contains: Option<String>,
    pub starts_on_or_after: Option<NaiveDate>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Optional id query parameter; blank is absent, garbage is a field error.
pub(crate) fn parse_id(field: &str, value: &Option<String>) -> Result<Option<Uuid>, AppError> {
    non_blank(value)
        .map(|raw| {
            Uuid::parse_str(raw).map_err(|_| AppError::invalid(field, "Must be a valid UUID."))
        })
        .transpose()
}

impl RecruitmentQuery {
    pub fn criteria(&self) -> Result<RecruitmentCriteria, AppError> {
        Ok(RecruitmentCriteria {
            company_id: parse_id("company_id", &self.company_id)?,
            category_id: parse_id("category_id", &self.category_id)?,
            work_type_id: parse_id("work_type_id", &self.work_type_id)?,
            title_contains: non_blank(&self.key).map(str::to_string),
            location_contains: non_blank(&self.province).map(str::to_string),
            // A malformed date is ignored rather than rejected.
            starts_on_or_after: non_blank(&self.date_start)
                .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()),
        })
    }
}

/// `%needle%` with LIKE wildcards in the needle escaped.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

impl RecruitmentCriteria {
    /// Appends the WHERE clause; the query must alias `recruitments` as `r`.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE r.active");
        if let Some(id) = self.company_id {
            qb.push(" AND r.company_id = ").push_bind(id);
        }
        if let Some(id) = self.category_id {
            qb.push(" AND r.category_id = ").push_bind(id);
        }
        if let Some(id) = self.work_type_id {
            qb.push(" AND r.work_type_id = ").push_bind(id);
        }
        if let Some(key) = &self.title_contains {
            qb.push(" AND r.title ILIKE ").push_bind(like_pattern(key));
        }
        if let Some(province) = &self.location_contains {
            qb.push(" AND r.location ILIKE ").push_bind(like_pattern(province));
        }
        if let Some(date) = self.starts_on_or_after {
            qb.push(" AND r.work_time_start::date >= ").push_bind(date);
        }
    }
}
