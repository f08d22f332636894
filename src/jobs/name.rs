//! Job name synthesis.
//!
//! Batch job identifiers must match `^[a-z]([a-z0-9-]{0,62})$`. The
//! synthesizer derives a unique, legal identifier from an arbitrary
//! user-supplied prefix plus a random suffix and never fails:
//! lower-case + trim, truncate to 50 chars, append 8 random hex chars, strip
//! everything outside `[a-z0-9-]`, and prefix-fix with `job-` when the result
//! would not start with a lowercase letter.

use uuid::Uuid;

/// Prefix used when a submission omits `job_name_prefix`.
pub const DEFAULT_PREFIX: &str = "java-batch-job-";

/// Synthesize a unique, API-legal job identifier.
pub fn synthesize(prefix: &str) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    synthesize_with_suffix(prefix, &uuid[..8])
}

fn synthesize_with_suffix(prefix: &str, suffix: &str) -> String {
    let truncated: String = prefix.trim().to_lowercase().chars().take(50).collect();
    let name: String = format!("{truncated}{suffix}")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    if name.is_empty() {
        return format!("job-{suffix}");
    }
    if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        return format!("job-{name}");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_legal(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[test]
    fn keeps_clean_prefix() {
        let name = synthesize_with_suffix("nightly-report-", "deadbeef");
        assert_eq!(name, "nightly-report-deadbeef");
    }

    #[test]
    fn lowercases_and_strips_illegal_characters() {
        let name = synthesize_with_suffix("My_Report.Job ", "deadbeef");
        assert_eq!(name, "myreportjobdeadbeef");
    }

    #[test]
    fn truncates_prefix_to_fifty_characters() {
        let long = "a".repeat(80);
        let name = synthesize_with_suffix(&long, "deadbeef");
        assert_eq!(name.len(), 50 + 8);
    }

    #[test]
    fn digit_start_gets_job_prefix() {
        let name = synthesize_with_suffix("2024-run-", "deadbeef");
        assert_eq!(name, "job-2024-run-deadbeef");
    }

    #[test]
    fn dash_start_gets_job_prefix() {
        let name = synthesize_with_suffix("-run-", "deadbeef");
        assert_eq!(name, "job--run-deadbeef");
        assert!(is_legal(&name));
    }

    #[test]
    fn empty_prefix_still_yields_legal_name() {
        // Hex suffixes can start with a digit; the prefix fix covers that.
        assert_eq!(synthesize_with_suffix("", "deadbeef"), "deadbeef");
        assert_eq!(synthesize_with_suffix("", "0eadbeef"), "job-0eadbeef");
    }

    #[test]
    fn random_suffixes_differ() {
        assert_ne!(synthesize(DEFAULT_PREFIX), synthesize(DEFAULT_PREFIX));
    }

    proptest! {
        #[test]
        fn output_is_always_legal(prefix in "\\PC{0,80}") {
            let name = synthesize(&prefix);
            prop_assert!(is_legal(&name), "illegal name {:?} from prefix {:?}", name, prefix);
        }
    }
}
