//! Recruitment statistics report: postings per category and per work type
//! with their average salary, optionally bounded by creation date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Inclusive creation-date window. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::invalid(field, "Date has wrong format. Use YYYY-MM-DD.")),
    }
}

impl StatsQuery {
    pub fn range(&self) -> Result<DateRange, AppError> {
        let range = DateRange {
            start: parse_date("start", self.start.as_deref())?,
            end: parse_date("end", self.end.as_deref())?,
        };
        if let (Some(start), Some(end)) = (range.start, range.end) {
            if start > end {
                return Err(AppError::invalid("end", "End date is before start date."));
            }
        }
        Ok(range)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatLine {
    pub id: Uuid,
    pub name: String,
    pub recruitment_count: i64,
    /// `None` when the group has no postings in range.
    pub average_salary: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecruitmentStats {
    pub range: DateRange,
    pub by_category: Vec<StatLine>,
    pub by_work_type: Vec<StatLine>,
    /// Postings in range. Every posting has exactly one category, so this is
    /// the category column summed.
    pub total: i64,
}

pub fn total_count(lines: &[StatLine]) -> i64 {
    lines.iter().map(|line| line.recruitment_count).sum()
}

fn round_averages(lines: &mut [StatLine]) {
    for line in lines {
        line.average_salary = line.average_salary.map(|avg| avg.round_dp(2));
    }
}

pub async fn recruitment_stats(pool: &PgPool, range: DateRange) -> Result<RecruitmentStats, AppError> {
    let mut by_category = sqlx::query_as::<_, StatLine>(
        r#"
        SELECT c.id, c.name,
               COUNT(r.id) AS recruitment_count,
               AVG(r.salary) AS average_salary
        FROM categories c
        LEFT JOIN recruitments r
               ON r.category_id = c.id
              AND ($1::date IS NULL OR r.created_at::date >= $1)
              AND ($2::date IS NULL OR r.created_at::date <= $2)
        GROUP BY c.id, c.name
        ORDER BY c.name
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;

    let mut by_work_type = sqlx::query_as::<_, StatLine>(
        r#"
        SELECT w.id, w.name,
               COUNT(r.id) AS recruitment_count,
               AVG(r.salary) AS average_salary
        FROM work_types w
        LEFT JOIN recruitments r
               ON r.work_type_id = w.id
              AND ($1::date IS NULL OR r.created_at::date >= $1)
              AND ($2::date IS NULL OR r.created_at::date <= $2)
        GROUP BY w.id, w.name
        ORDER BY w.name
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;

    round_averages(&mut by_category);
    round_averages(&mut by_work_type);

    Ok(RecruitmentStats {
        range,
        total: total_count(&by_category),
        by_category,
        by_work_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start: Option<&str>, end: Option<&str>) -> StatsQuery {
        StatsQuery {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    fn line(count: i64, avg: Option<Decimal>) -> StatLine {
        StatLine {
            id: Uuid::new_v4(),
            name: "IT".to_string(),
            recruitment_count: count,
            average_salary: avg,
        }
    }

    #[test]
    fn test_open_range_when_blank() {
        let range = query(None, Some("  ")).range().unwrap();
        assert_eq!(range, DateRange::default());
    }

    #[test]
    fn test_inclusive_bounds_parse() {
        let range = query(Some("2024-01-01"), Some("2024-01-31")).range().unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn test_malformed_date_names_its_field() {
        assert!(matches!(
            query(Some("01/02/2024"), None).range(),
            Err(AppError::Invalid { ref field, .. }) if field == "start"
        ));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        assert!(query(Some("2024-02-01"), Some("2024-01-01")).range().is_err());
        assert!(query(Some("2024-02-01"), Some("2024-02-01")).range().is_ok());
    }

    #[test]
    fn test_total_sums_counts() {
        let lines = vec![line(3, None), line(0, None), line(4, None)];
        assert_eq!(total_count(&lines), 7);
        assert_eq!(total_count(&[]), 0);
    }

    #[test]
    fn test_averages_round_to_cents() {
        let mut lines = vec![line(3, Some(Decimal::new(1_000_006_667, 5))), line(0, None)];
        round_averages(&mut lines);
        assert_eq!(lines[0].average_salary, Some(Decimal::new(1_000_007, 2)));
        assert_eq!(lines[1].average_salary, None);
    }
}
