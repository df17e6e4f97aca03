//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent between log lines, error
//! reports and the test capture layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_EVENT_ID: &str = "event_id";

// Source identity
pub const FIELD_SOURCE: &str = "source";

// Change counts
pub const FIELD_ADDED: &str = "added";
pub const FIELD_MODIFIED: &str = "modified";
pub const FIELD_DELETED: &str = "deleted";
pub const FIELD_IGNORED: &str = "ignored";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Suffixes for the derived property subsets of one change batch
pub const SUFFIX_ADDED: &str = "#added";
pub const SUFFIX_MODIFIED: &str = "#modified";
pub const SUFFIX_DELETED: &str = "#deleted";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_SOURCE.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_subset_suffixes_are_distinct() {
        assert_ne!(SUFFIX_ADDED, SUFFIX_MODIFIED);
        assert_ne!(SUFFIX_MODIFIED, SUFFIX_DELETED);
        assert!(SUFFIX_DELETED.starts_with('#'));
    }
}
