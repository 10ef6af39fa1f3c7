use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(AppError::from)
}

pub fn validate_gender(gender: &str) -> Result<(), validator::ValidationError> {
    if gender != "male" && gender != "female" {
        return Err(validator::ValidationError::new("Gender must be either 'male' or 'female'"));
    }
    Ok(())
}

/// Parses a path id, answering 400 rather than 404 when it isn't a UUID.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", what)))
}

/// Trims a name and treats a blank one as absent.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// For PATCH bodies: a present field becomes `Some`, so an explicit `null` is `Some(None)`.
/// Pair with `#[serde(default)]` so an absent field stays `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_must_be_lowercase_word() {
        assert!(validate_gender("male").is_ok());
        assert!(validate_gender("female").is_ok());
        assert!(validate_gender("Male").is_err());
        assert!(validate_gender("x").is_err());
    }

    #[test]
    fn bad_uuid_is_bad_request() {
        let err = parse_id("abc", "employee").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Invalid employee ID"));
    }

    #[test]
    fn blank_names_are_absent() {
        assert_eq!(non_blank(Some("  Retail ")), Some("Retail".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
