//! Job-title input validation. A guard in front of the pipeline, not part of
//! it: a rejected title never costs an LLM call.

/// Characters that have no business in a job title.
const DISALLOWED_CHARS: &str = "!@#$%^&*()+=[]{}|\\:;\"<>?/";

/// Substrings that mark URL-ish input.
const URL_PATTERNS: [&str; 5] = ["www.", "http", ".com", ".net", ".org"];

/// Validates a job position string. Returns the specific human-readable
/// reason on rejection.
///
/// Rules: non-empty after trimming, 3 to 100 characters, no disallowed
/// punctuation, not purely numeric, no URL-like substrings.
pub fn validate_job_position(position: &str) -> Result<(), String> {
    let position = position.trim();
    if position.is_empty() {
        return Err("Job position cannot be empty".to_string());
    }
    let length = position.chars().count();
    if length < 3 {
        return Err("Job position must be at least 3 characters long".to_string());
    }
    if length > 100 {
        return Err("Job position cannot exceed 100 characters".to_string());
    }
    if position.chars().any(|c| DISALLOWED_CHARS.contains(c)) {
        return Err("Job position contains invalid special characters".to_string());
    }
    let without_spaces: String = position.chars().filter(|c| !c.is_whitespace()).collect();
    if !without_spaces.is_empty() && without_spaces.chars().all(|c| c.is_ascii_digit()) {
        return Err("Job position cannot be numeric only".to_string());
    }
    let lowered = position.to_lowercase();
    if URL_PATTERNS.iter().any(|pattern| lowered.contains(pattern)) {
        return Err("Job position cannot contain URLs".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_titles() {
        assert!(validate_job_position("Backend Developer").is_ok());
        assert!(validate_job_position("  Data Scientist  ").is_ok());
        assert!(validate_job_position("C-Level Executive Assistant").is_ok());
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert_eq!(
            validate_job_position("").unwrap_err(),
            "Job position cannot be empty"
        );
        assert_eq!(
            validate_job_position("   ").unwrap_err(),
            "Job position cannot be empty"
        );
    }

    #[test]
    fn test_rejects_too_short() {
        assert_eq!(
            validate_job_position("ab").unwrap_err(),
            "Job position must be at least 3 characters long"
        );
    }

    #[test]
    fn test_rejects_too_long() {
        let long = "a".repeat(101);
        assert_eq!(
            validate_job_position(&long).unwrap_err(),
            "Job position cannot exceed 100 characters"
        );
        assert!(validate_job_position(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_rejects_special_characters() {
        assert_eq!(
            validate_job_position("DevOps @ Scale").unwrap_err(),
            "Job position contains invalid special characters"
        );
        assert_eq!(
            validate_job_position("Engineer;DROP TABLE").unwrap_err(),
            "Job position contains invalid special characters"
        );
    }

    #[test]
    fn test_rejects_numeric_only() {
        assert_eq!(
            validate_job_position("12345").unwrap_err(),
            "Job position cannot be numeric only"
        );
        assert_eq!(
            validate_job_position("12 34 5").unwrap_err(),
            "Job position cannot be numeric only"
        );
    }

    #[test]
    fn test_rejects_urls() {
        assert_eq!(
            validate_job_position("see httpx jobs").unwrap_err(),
            "Job position cannot contain URLs"
        );
        assert_eq!(
            validate_job_position("hire.com manager").unwrap_err(),
            "Job position cannot contain URLs"
        );
        assert_eq!(
            validate_job_position("www. recruiter").unwrap_err(),
            "Job position cannot contain URLs"
        );
    }

    #[test]
    fn test_url_in_title_with_scheme_hits_special_chars_first() {
        // "http://x.com" carries '/' which trips the punctuation rule before
        // the URL rule; either way the title is rejected.
        assert!(validate_job_position("http://x.com").is_err());
    }
}
