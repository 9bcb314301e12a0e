use crate::errors::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;

// Optional scheme, optional userinfo, domain with TLD or dotted IPv4, optional
// port, then anything non-blank after a path/query/fragment delimiter.
static WEB_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:https?|rtsp)://)?(?:[a-z0-9\-._~%!$&'()*+,;=]+(?::[^@\s]*)?@)?(?:(?:[a-z0-9](?:[a-z0-9\-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}|\d{1,3}(?:\.\d{1,3}){3})(?::\d{1,5})?(?:[/?#]\S*)?$",
    )
    .expect("valid web url regex")
});

pub fn validate_web_url(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Attachment("Enter URL".to_string()));
    }
    if !WEB_URL_RE.is_match(trimmed) {
        return Err(AppError::Attachment("Enter Valid URL".to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn validate_image_path(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Attachment("No image selected".to_string()));
    }

    let metadata = fs::metadata(trimmed)
        .map_err(|error| AppError::Attachment(format!("Unable to read image {}: {}", trimmed, error)))?;
    if !metadata.is_file() {
        return Err(AppError::Attachment(format!("{} is not an image file", trimmed)));
    }

    Ok(trimmed.to_string())
}
