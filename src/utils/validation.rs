use crate::utils::error::{RoomError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static CONTACT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("contact number pattern is valid"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RoomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RoomError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RoomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RoomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RoomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(RoomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RoomError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

// Listing field checks below report ValidationError so the view can show them next to the field.

pub fn validate_required_text(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RoomError::validation(field_name, "is required"));
    }
    Ok(())
}

pub fn validate_rent(field_name: &str, rent: f64) -> Result<()> {
    if !rent.is_finite() {
        return Err(RoomError::validation(field_name, "must be a number"));
    }
    if rent < 0.0 {
        return Err(RoomError::validation(field_name, "cannot be negative"));
    }
    Ok(())
}

pub fn validate_contact_number(field_name: &str, value: &str) -> Result<()> {
    if !CONTACT_NUMBER.is_match(value) {
        return Err(RoomError::validation(
            field_name,
            "must be a valid 10-digit phone number",
        ));
    }
    Ok(())
}

pub fn validate_image_urls(field_name: &str, urls: &[String]) -> Result<()> {
    for (index, url) in urls.iter().enumerate() {
        if validate_url(field_name, url).is_err() {
            return Err(RoomError::validation(
                format!("{}[{}]", field_name, index),
                format!("'{}' is not a valid http(s) URL", url),
            ));
        }
    }
    Ok(())
}

pub fn validate_email(field_name: &str, email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(RoomError::validation(field_name, "is required"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(RoomError::validation(
            field_name,
            "must be a valid email address",
        )),
    }
}
