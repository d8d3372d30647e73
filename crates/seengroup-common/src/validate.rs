//! Shallow input pre-checks. The backend remains the source of truth; these
//! only stop obviously malformed input before a network round-trip.

use regex::Regex;
use std::sync::OnceLock;

/// MIME types accepted for résumé uploads: PDF, DOC, DOCX.
pub const RESUME_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const OTP_CODE_LEN: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    re.is_match(email)
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Exactly six ASCII digits.
pub fn is_valid_otp_code(code: &str) -> bool {
    code.len() == OTP_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeRejection {
    TooLarge,
    DisallowedType,
}

impl ResumeRejection {
    pub fn message(&self) -> &'static str {
        match self {
            ResumeRejection::TooLarge => "Resume file size must be less than 5MB.",
            ResumeRejection::DisallowedType => "Resume must be a PDF, DOC, or DOCX file.",
        }
    }
}

/// Size is checked before type, matching the order applicants see errors in.
pub fn check_resume(
    size: usize,
    content_type: Option<&str>,
    max_bytes: usize,
    allowed: &[String],
) -> Result<(), ResumeRejection> {
    if size > max_bytes {
        return Err(ResumeRejection::TooLarge);
    }
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    match mime {
        Some(m) if allowed.iter().any(|a| a.eq_ignore_ascii_case(&m)) => Ok(()),
        _ => Err(ResumeRejection::DisallowedType),
    }
}
