//! Filenames for downloaded applicant documents.

use chrono::Utc;

/// `"Ada Lovelace!"` → `"ada_lovelace"`. Empty input yields `"unknown"`.
pub fn clean_name_for_filename(name: &str) -> String {
    if name.is_empty() {
        return "unknown".to_string();
    }
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// `{clean}_{kind}_{millis}.{ext}`
pub fn user_filename(user_name: &str, kind: &str, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        clean_name_for_filename(user_name),
        kind,
        Utc::now().timestamp_millis(),
        extension
    )
}

/// `{clean}_{kind}.{ext}`
pub fn simple_user_filename(user_name: &str, kind: &str, extension: &str) -> String {
    format!("{}_{}.{}", clean_name_for_filename(user_name), kind, extension)
}

/// Pull the `filename=` value out of a `Content-Disposition` header.
pub fn disposition_filename(header: &str) -> Option<String> {
    let (_, rest) = header.split_once("filename=")?;
    let name = rest.split(';').next()?.trim().trim_matches('"');
    (!name.is_empty()).then(|| name.to_string())
}
