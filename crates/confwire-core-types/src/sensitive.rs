//! Sensitive data marker for automatic redaction
//!
//! Config-center access-key secrets travel through the same option structs
//! as app ids and cluster names. Wrapping them in `Sensitive<T>` keeps them
//! out of `Debug` output, log fields and CLI listings.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Placeholder printed instead of the wrapped value
pub const REDACTED: &str = "***REDACTED***";

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use confwire_core_types::Sensitive;
///
/// let secret = Sensitive::new("ak-secret-123");
/// assert_eq!(format!("{:?}", secret), "***REDACTED***");
///
/// // Access the actual value when needed
/// assert_eq!(secret.expose(), &"ak-secret-123");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Only the code that hands the secret to its final destination
    /// (the system-property table) should call this.
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: PartialEq> PartialEq for Sensitive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Eq> Eq for Sensitive<T> {}

// Secrets may be read from config files, but are never written back out.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sensitive<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let secret = Sensitive::new("my-access-key");
        let debug_str = format!("{:?}", secret);
        assert_eq!(debug_str, REDACTED);
        assert!(!debug_str.contains("my-access-key"));
    }

    #[test]
    fn test_sensitive_display_redaction() {
        let secret = Sensitive::new("ak-12345");
        assert_eq!(format!("{}", secret), REDACTED);
    }

    #[test]
    fn test_sensitive_into_inner() {
        let secret = Sensitive::new(String::from("test"));
        assert_eq!(secret.into_inner(), "test");
    }

    #[test]
    fn test_sensitive_deserialize() {
        let secret: Sensitive<String> = serde_json::from_str("\"s3cr3t\"").unwrap();
        assert_eq!(secret.expose(), "s3cr3t");
    }

    #[test]
    fn test_sensitive_inside_struct_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Options {
            app_id: String,
            secret: Sensitive<String>,
        }

        let options = Options {
            app_id: "orders".to_string(),
            secret: Sensitive::new("hunter2".to_string()),
        };

        let debug_str = format!("{:?}", options);
        assert!(debug_str.contains("orders"));
        assert!(debug_str.contains(REDACTED));
        assert!(!debug_str.contains("hunter2"));
    }
}
