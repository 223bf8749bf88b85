//! 请求参数校验
//!
//! 每个请求 DTO 实现 [`Validate`]，在服务层执行任何查询之前调用；
//! 校验失败返回 `AppError::ValidationError`，其中 `field` 为出错字段名。

use crate::error::{AppError, AppResult};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

pub trait Validate {
    fn validate(&self) -> AppResult<()>;
}

pub fn require_text(field: &str, value: &str, min: usize, max: usize) -> AppResult<()> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(AppError::invalid(field, "is required"));
    }
    if len < min || len > max {
        return Err(AppError::invalid(
            field,
            format!("length must be between {min} and {max} characters"),
        ));
    }
    Ok(())
}

pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.chars().count() > max
    {
        return Err(AppError::invalid(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: i64) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::invalid(field, "must be positive"));
    }
    Ok(())
}

pub fn require_at_most(field: &str, value: i64, max: i64) -> AppResult<()> {
    if value > max {
        return Err(AppError::invalid(field, format!("must be at most {max}")));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: i64) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::invalid(field, "must not be negative"));
    }
    Ok(())
}

/// 取值范围 (min, max]
pub fn require_range_f64(field: &str, value: f64, min_exclusive: f64, max: f64) -> AppResult<()> {
    if !value.is_finite() || value <= min_exclusive || value > max {
        return Err(AppError::invalid(
            field,
            format!("must be greater than {min_exclusive} and at most {max}"),
        ));
    }
    Ok(())
}

pub fn validate_email(field: &str, value: &str) -> AppResult<()> {
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(AppError::invalid(field, "must be a valid email address"));
    }
    Ok(())
}

pub fn validate_url(field: &str, value: Option<&str>) -> AppResult<()> {
    if let Some(v) = value
        && !(v.starts_with("https://") || v.starts_with("http://"))
    {
        return Err(AppError::invalid(field, "must be an http(s) URL"));
    }
    Ok(())
}

pub fn validate_date_order(
    end_field: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> AppResult<()> {
    if let (Some(s), Some(e)) = (start, end)
        && e < s
    {
        return Err(AppError::invalid(end_field, "must not be before the start date"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: AppResult<()>) -> String {
        match result {
            Err(AppError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("title", "Clean water", 3, 200).is_ok());
        assert_eq!(field_of(require_text("title", "   ", 3, 200)), "title");
        assert_eq!(field_of(require_text("title", "ab", 3, 200)), "title");
    }

    #[test]
    fn test_numeric_ranges() {
        assert!(require_positive("amount", 1).is_ok());
        assert_eq!(field_of(require_positive("amount", 0)), "amount");
        assert!(require_non_negative("ticket_price", 0).is_ok());
        assert!(require_at_most("amount", 100, 100).is_ok());
        assert_eq!(field_of(require_at_most("amount", 101, 100)), "amount");
        assert!(require_range_f64("hours", 24.0, 0.0, 24.0).is_ok());
        assert_eq!(field_of(require_range_f64("hours", 0.0, 0.0, 24.0)), "hours");
        assert!(require_range_f64("hours", f64::NAN, 0.0, 24.0).is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("email", "grace@example.org").is_ok());
        assert!(validate_email("email", "grace@localhost").is_err());
        assert!(validate_email("email", "not-an-email").is_err());
    }

    #[test]
    fn test_date_order() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1);
        let before = NaiveDate::from_ymd_opt(2025, 2, 1);
        assert!(validate_date_order("end_date", start, start).is_ok());
        assert_eq!(field_of(validate_date_order("end_date", start, before)), "end_date");
        assert!(validate_date_order("end_date", None, before).is_ok());
    }
}
