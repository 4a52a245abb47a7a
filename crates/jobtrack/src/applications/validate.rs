//! Field-level checks for application input that need no database access.

use super::{ApplicationInput, NumericInput, MAX_LINK_LEN, MAX_TEXT_LEN};
use crate::error::StoreError;
use crate::timestamp;

/// Input that passed the field-level checks. References are still unchecked
/// and `applied_on` holds the submitted text until `normalize_applied_on`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedFields {
    pub company: String,
    pub title: String,
    pub link: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub status: i64,
    pub last_step: i64,
    pub modality: Option<i64>,
    pub applied_on: String,
    pub notes: String,
}

/// Trims and validates a required bounded text field.
fn required_text(field: &str, value: Option<&str>) -> Result<String, StoreError> {
    let value = value.unwrap_or("").trim();
    if value.is_empty() {
        return Err(StoreError::invalid(format!("{} is required", field)));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(StoreError::invalid(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LEN
        )));
    }
    Ok(value.to_string())
}

fn optional_link(value: Option<&str>) -> Result<Option<String>, StoreError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(link) if link.chars().count() > MAX_LINK_LEN => Err(StoreError::invalid(format!(
            "link must be at most {} characters",
            MAX_LINK_LEN
        ))),
        Some(link) => Ok(Some(link.to_string())),
    }
}

/// Coerces a salary: absent or empty → `None`, otherwise a finite,
/// non-negative number.
pub fn coerce_salary(field: &str, value: Option<&NumericInput>) -> Result<Option<f64>, StoreError> {
    let number = match value {
        None => return Ok(None),
        Some(NumericInput::Number(n)) => *n,
        Some(NumericInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map_err(|_| StoreError::invalid(format!("{} must be a number", field)))?
        }
    };
    if !number.is_finite() {
        return Err(StoreError::invalid(format!("{} must be a number", field)));
    }
    if number < 0.0 {
        return Err(StoreError::invalid(format!("{} must not be negative", field)));
    }
    Ok(Some(number))
}

/// Runs the checks that come before the reference lookups: text fields,
/// link, salaries, then presence of the references and the date.
///
/// `applied_on` is left as submitted (trimmed); `normalize_applied_on`
/// validates it once the references have been checked.
pub fn check_fields(input: &ApplicationInput) -> Result<CheckedFields, StoreError> {
    let company = required_text("company", input.company.as_deref())?;
    let title = required_text("title", input.title.as_deref())?;
    let link = optional_link(input.link.as_deref())?;

    let salary_min = coerce_salary("salary_min", input.salary_min.as_ref())?;
    let salary_max = coerce_salary("salary_max", input.salary_max.as_ref())?;
    if let (Some(min), Some(max)) = (salary_min, salary_max) {
        if min > max {
            return Err(StoreError::invalid(
                "salary_min must not exceed salary_max",
            ));
        }
    }

    let status = input
        .status
        .ok_or_else(|| StoreError::invalid("status is required"))?;
    let last_step = input
        .last_step
        .ok_or_else(|| StoreError::invalid("last_step is required"))?;
    let applied_on = input
        .applied_on
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StoreError::invalid("applied_on is required"))?
        .to_string();

    Ok(CheckedFields {
        company,
        title,
        link,
        salary_min,
        salary_max,
        status,
        last_step,
        modality: input.modality,
        applied_on,
        notes: input.notes.clone().unwrap_or_default(),
    })
}

/// Replaces the submitted `applied_on` with the ISO instant of its calendar
/// date, rejecting text that is not a real date.
pub fn normalize_applied_on(mut fields: CheckedFields) -> Result<CheckedFields, StoreError> {
    let date = timestamp::parse_calendar_date(&fields.applied_on).ok_or_else(|| {
        StoreError::invalid(format!(
            "applied_on '{}' is not a valid date",
            fields.applied_on
        ))
    })?;
    fields.applied_on = timestamp::date_to_iso(date);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> ApplicationInput {
        ApplicationInput {
            company: Some("Acme".to_string()),
            title: Some("SWE".to_string()),
            applied_on: Some("2024-01-15".to_string()),
            status: Some(1),
            last_step: Some(2),
            ..Default::default()
        }
    }

    fn invalid_message(input: &ApplicationInput) -> String {
        match check_fields(input) {
            Err(StoreError::InvalidArgument(msg)) => msg,
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_input_is_trimmed_and_normalised() {
        let mut input = valid_input();
        input.company = Some("  Acme  ".to_string());
        input.link = Some("   ".to_string());
        let checked = normalize_applied_on(check_fields(&input).unwrap()).unwrap();
        assert_eq!(checked.company, "Acme");
        assert_eq!(checked.link, None);
        assert_eq!(checked.applied_on, "2024-01-15T00:00:00.000Z");
        assert_eq!(checked.notes, "");
    }

    #[test]
    fn test_company_and_title_required() {
        let mut input = valid_input();
        input.company = Some("".to_string());
        assert!(invalid_message(&input).contains("company"));

        let mut input = valid_input();
        input.title = Some("   ".to_string());
        assert!(invalid_message(&input).contains("title"));
    }

    #[test]
    fn test_text_length_bounds() {
        let mut input = valid_input();
        input.company = Some("x".repeat(MAX_TEXT_LEN));
        assert!(check_fields(&input).is_ok());

        input.company = Some("x".repeat(MAX_TEXT_LEN + 1));
        assert!(invalid_message(&input).contains("company"));

        let mut input = valid_input();
        input.link = Some("x".repeat(MAX_LINK_LEN + 1));
        assert!(invalid_message(&input).contains("link"));
    }

    #[test]
    fn test_salary_coercion() {
        assert_eq!(coerce_salary("s", None).unwrap(), None);
        assert_eq!(coerce_salary("s", Some(&"".into())).unwrap(), None);
        assert_eq!(coerce_salary("s", Some(&" 120.5 ".into())).unwrap(), Some(120.5));
        assert_eq!(coerce_salary("s", Some(&0.0_f64.into())).unwrap(), Some(0.0));
        assert!(coerce_salary("s", Some(&"abc".into())).is_err());
        assert!(coerce_salary("s", Some(&"NaN".into())).is_err());
        assert!(coerce_salary("s", Some(&(-5.0_f64).into())).is_err());
    }

    #[test]
    fn test_salary_range() {
        let mut input = valid_input();
        input.salary_min = Some(100.0_f64.into());
        input.salary_max = Some(50.0_f64.into());
        assert!(invalid_message(&input).contains("salary_min"));

        input.salary_max = None;
        assert!(check_fields(&input).is_ok());

        input.salary_min = None;
        input.salary_max = Some(50.0_f64.into());
        assert!(check_fields(&input).is_ok());

        input.salary_min = Some(50.0_f64.into());
        assert!(check_fields(&input).is_ok());
    }

    #[test]
    fn test_references_and_date_required() {
        let mut input = valid_input();
        input.status = None;
        assert!(invalid_message(&input).contains("status"));

        let mut input = valid_input();
        input.last_step = None;
        assert!(invalid_message(&input).contains("last_step"));

        let mut input = valid_input();
        input.applied_on = None;
        assert!(invalid_message(&input).contains("applied_on"));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let mut input = valid_input();
        input.applied_on = Some("2023-02-29".to_string());
        let checked = check_fields(&input).unwrap();
        assert_eq!(checked.applied_on, "2023-02-29");
        match normalize_applied_on(checked) {
            Err(StoreError::InvalidArgument(msg)) => assert!(msg.contains("not a valid date")),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }
}
