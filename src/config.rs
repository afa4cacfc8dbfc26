//! Annotation options
//!
//! Options arrive as string key/value pairs (the way a host passes an
//! options map) and are checked once, when the `Options` value is built.
//! Unknown keys and malformed values never reach an invocation.

use crate::builder::{AttributeCursor, MergeStrategy};
use crate::dom::Balancing;
use crate::error::ConfigError;

/// Recognized option keys
pub const OPTION_KEYS: &[&str] = &[
    "fail-on-error",
    "verbose",
    "trace",
    "timing",
    "merge",
    "balancing",
    "attribute-cursor",
];

/// Options for one annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Propagate event-source failures instead of reporting them
    pub fail_on_error: bool,
    /// Trace merges and invocation summaries
    pub verbose: bool,
    /// Trace every event
    pub trace: bool,
    /// Measure and report elapsed time
    pub timing: bool,
    /// When finished nodes reach the host document
    pub merge: MergeStrategy,
    /// How new spans reconcile with crossing markup
    pub balancing: Balancing,
    /// Whether terminals inside attributes advance the cursor
    pub attribute_cursor: AttributeCursor,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            fail_on_error: false,
            verbose: false,
            trace: false,
            timing: false,
            merge: MergeStrategy::Deferred,
            balancing: Balancing::Inner,
            attribute_cursor: AttributeCursor::Hold,
        }
    }
}

impl Options {
    /// Build options from key/value pairs, starting from the defaults
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Options::default();
        for (key, value) in pairs {
            options.set(key.as_ref(), value.as_ref())?;
        }
        Ok(options)
    }

    /// Set one option from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "fail-on-error" => self.fail_on_error = parse_bool(key, value)?,
            "verbose" => self.verbose = parse_bool(key, value)?,
            "trace" => self.trace = parse_bool(key, value)?,
            "timing" => self.timing = parse_bool(key, value)?,
            "merge" => {
                self.merge = match value {
                    "deferred" => MergeStrategy::Deferred,
                    "incremental" => MergeStrategy::Incremental,
                    _ => return Err(invalid(key, value, "\"deferred\" or \"incremental\"")),
                }
            }
            "balancing" => {
                self.balancing = match value {
                    "inner" => Balancing::Inner,
                    "strict" => Balancing::Strict,
                    _ => return Err(invalid(key, value, "\"inner\" or \"strict\"")),
                }
            }
            "attribute-cursor" => {
                self.attribute_cursor = match value {
                    "hold" => AttributeCursor::Hold,
                    "unqualified" => AttributeCursor::Unqualified,
                    "advance" => AttributeCursor::Advance,
                    _ => {
                        return Err(invalid(
                            key,
                            value,
                            "\"hold\", \"unqualified\" or \"advance\"",
                        ))
                    }
                }
            }
            _ => {
                return Err(ConfigError::UnknownOption {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Set the merge strategy
    pub fn with_merge(mut self, merge: MergeStrategy) -> Self {
        self.merge = merge;
        self
    }

    /// Set the balancing policy
    pub fn with_balancing(mut self, balancing: Balancing) -> Self {
        self.balancing = balancing;
        self
    }

    /// Set the attribute cursor rule
    pub fn with_attribute_cursor(mut self, rule: AttributeCursor) -> Self {
        self.attribute_cursor = rule;
        self
    }

    /// Enable or disable source-failure propagation
    pub fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    /// Enable or disable per-event tracing
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Enable or disable verbose tracing
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable timing
    pub fn with_timing(mut self, timing: bool) -> Self {
        self.timing = timing;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value, "\"true\" or \"false\"")),
    }
}

fn invalid(key: &str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(!options.fail_on_error);
        assert!(!options.trace);
        assert_eq!(options.merge, MergeStrategy::Deferred);
        assert_eq!(options.balancing, Balancing::Inner);
        assert_eq!(options.attribute_cursor, AttributeCursor::Hold);
    }

    #[test]
    fn test_from_pairs() {
        let options = Options::from_pairs([
            ("fail-on-error", "true"),
            ("trace", "true"),
            ("merge", "incremental"),
            ("attribute-cursor", "unqualified"),
        ])
        .unwrap();
        assert!(options.fail_on_error);
        assert!(options.trace);
        assert!(!options.timing);
        assert_eq!(options.merge, MergeStrategy::Incremental);
        assert_eq!(options.attribute_cursor, AttributeCursor::Unqualified);
    }

    #[test]
    fn test_every_key_is_recognized() {
        let values = ["true", "true", "true", "true", "deferred", "inner", "hold"];
        let pairs = OPTION_KEYS.iter().copied().zip(values);
        assert!(Options::from_pairs(pairs).is_ok());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Options::from_pairs([("verbose", "true"), ("colour", "red")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownOption {
                key: "colour".to_string(),
                value: "red".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_value_rejected() {
        let err = Options::from_pairs([("timing", "yes")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "timing"));

        let err = Options::from_pairs([("merge", "eager")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref value, .. } if value == "eager"));
    }

    #[test]
    fn test_with_methods() {
        let options = Options::default()
            .with_merge(MergeStrategy::Incremental)
            .with_balancing(Balancing::Strict)
            .with_timing(true);
        assert_eq!(options.merge, MergeStrategy::Incremental);
        assert_eq!(options.balancing, Balancing::Strict);
        assert!(options.timing);
    }
}
