//! Occupation code normalization.
//!
//! The wage dataset keys occupations by a six-digit SOC code that may arrive
//! hyphenated (`15-1252`), bare (`151252`) or padded with whitespace. The
//! competency service keys the same occupations by a versioned code
//! (`15-1252.00`). Everything stored in the search index uses the canonical
//! hyphenated `XX-XXXX` form.

use thiserror::Error;

/// Revision suffix appended to a canonical code to address the competency service.
pub const VERSION_SUFFIX: &str = ".00";

/// Errors produced while handling occupation codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The raw code could not be reduced to the canonical `XX-XXXX` form.
    #[error("Could not normalize occupation code: {0:?}")]
    NormalizationFailed(String),
}

impl CodeError {
    /// Create a normalization failure for the given raw code.
    pub fn normalization_failed(raw: impl Into<String>) -> Self {
        Self::NormalizationFailed(raw.into())
    }
}

/// Normalize a raw occupation code to `XX-XXXX`.
///
/// Hyphens, dots and whitespace are stripped; when at least six characters
/// remain and the first six are digits, the canonical form is returned.
/// Otherwise the input is returned unchanged, which callers must treat as
/// a normalization failure.
///
/// ```
/// use occupation_indexer_shared::soc::normalize_soc_code;
///
/// assert_eq!(normalize_soc_code("151252"), "15-1252");
/// assert_eq!(normalize_soc_code("15-1252.00"), "15-1252");
/// assert_eq!(normalize_soc_code("ab"), "ab");
/// ```
pub fn normalize_soc_code(raw: &str) -> String {
    match canonical_digits(raw) {
        Some(digits) => format!("{}-{}", &digits[..2], &digits[2..6]),
        None => raw.to_string(),
    }
}

/// Like [`normalize_soc_code`], but reports failure as an error.
pub fn try_normalize_soc_code(raw: &str) -> Result<String, CodeError> {
    canonical_digits(raw)
        .map(|digits| format!("{}-{}", &digits[..2], &digits[2..6]))
        .ok_or_else(|| CodeError::normalization_failed(raw))
}

/// Convert a canonical SOC code into the competency service's versioned form.
pub fn to_versioned_code(soc_code: &str) -> String {
    format!("{}{}", soc_code, VERSION_SUFFIX)
}

/// Strip the revision suffix (and any trailing non-digit junk) from a versioned code.
pub fn from_versioned_code(versioned: &str) -> String {
    let base = versioned.split('.').next().unwrap_or_default();
    base.trim()
        .trim_end_matches(|c: char| !c.is_ascii_digit())
        .to_string()
}

fn canonical_digits(raw: &str) -> Option<String> {
    let stripped: String = raw
        .chars()
        .filter(|c| *c != '-' && *c != '.' && !c.is_whitespace())
        .collect();

    if stripped.len() < 6 || !stripped.is_char_boundary(6) {
        return None;
    }
    if !stripped[..6].chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(stripped[..6].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accepts_every_punctuation_style() {
        assert_eq!(normalize_soc_code("15-1252"), "15-1252");
        assert_eq!(normalize_soc_code("151252"), "15-1252");
        assert_eq!(normalize_soc_code("15-1252.00"), "15-1252");
        assert_eq!(normalize_soc_code("  15-1252 "), "15-1252");
        assert_eq!(normalize_soc_code("15 1252"), "15-1252");
    }

    #[test]
    fn test_normalize_returns_input_when_too_short() {
        assert_eq!(normalize_soc_code("ab"), "ab");
        assert_eq!(normalize_soc_code("15-12"), "15-12");
        assert_eq!(normalize_soc_code(""), "");
    }

    #[test]
    fn test_normalize_rejects_non_digit_codes() {
        assert_eq!(normalize_soc_code("abcdefgh"), "abcdefgh");
        assert!(try_normalize_soc_code("abcdefgh").is_err());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["151252", "15-1252", "15-1252.00", " 29-1141.01 ", "000000"] {
            let once = normalize_soc_code(raw);
            assert_eq!(normalize_soc_code(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_try_normalize_reports_failure() {
        assert_eq!(try_normalize_soc_code("151252"), Ok("15-1252".to_string()));
        assert_eq!(
            try_normalize_soc_code("ab"),
            Err(CodeError::NormalizationFailed("ab".to_string()))
        );
    }

    #[test]
    fn test_versioned_round_trip() {
        for raw in ["151252", "15-1252.00", "29-1141"] {
            let canonical = normalize_soc_code(raw);
            let versioned = to_versioned_code(&canonical);
            assert_eq!(versioned, format!("{}.00", canonical));
            assert_eq!(normalize_soc_code(&versioned), canonical);
        }
    }

    #[test]
    fn test_from_versioned_strips_suffix_and_junk() {
        assert_eq!(from_versioned_code("15-1252.00"), "15-1252");
        assert_eq!(from_versioned_code("15-1252x.01"), "15-1252");
        assert_eq!(from_versioned_code(&to_versioned_code("11-1011")), "11-1011");
    }
}
