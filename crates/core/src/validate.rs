//! Field validators shared by the user and product rules.
//!
//! Each `require_*` helper returns the validated value or an
//! `InvalidInput` carrying the caller's message. The `accept_*` helpers are
//! their lenient counterparts used by partial updates: an unacceptable value
//! simply yields `None`.

use chrono::NaiveDate;

use crate::error::{DomainError, DomainResult};

/// Text that is present and non-empty after trimming.
pub fn require_text<'a>(value: Option<&'a str>, msg: &str) -> DomainResult<&'a str> {
    accept_text(value).ok_or_else(|| DomainError::invalid_input(msg))
}

/// Number that is present and strictly positive.
pub fn require_positive<T>(value: Option<T>, msg: &str) -> DomainResult<T>
where
    T: Copy + Default + PartialOrd,
{
    accept_positive(value).ok_or_else(|| DomainError::invalid_input(msg))
}

/// Date that is present and not strictly after `today`.
pub fn require_not_future(
    value: Option<NaiveDate>,
    today: NaiveDate,
    msg: &str,
) -> DomainResult<NaiveDate> {
    accept_not_future(value, today).ok_or_else(|| DomainError::invalid_input(msg))
}

pub fn accept_text(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn accept_positive<T>(value: Option<T>) -> Option<T>
where
    T: Copy + Default + PartialOrd,
{
    value.filter(|v| *v > T::default())
}

pub fn accept_not_future(value: Option<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
    value.filter(|d| *d <= today)
}
