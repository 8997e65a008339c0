// perfsplit - core/classifier.rs
//
// Line classification: extract the source IP token from a performance log
// line. Core layer: works on raw line bytes, never touches the filesystem.
// Lines are not assumed to be UTF-8; only the captured key is decoded.
//
// A line that does not match yields the empty key. That is not an error;
// the line is still pooled, under the empty key.

use crate::util::constants;
use crate::util::error::ClassifierError;
use regex::bytes::Regex;
use std::borrow::Cow;
use std::ops::Range;

/// Compiled line classifier.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    pattern: Regex,
    group: usize,
}

impl LineClassifier {
    /// Build a classifier from a regex that defines a named `ip` group.
    pub fn new(pattern: &str) -> Result<Self, ClassifierError> {
        if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
            return Err(ClassifierError::RegexTooLong {
                length: pattern.len(),
                max_length: constants::MAX_REGEX_PATTERN_LENGTH,
            });
        }

        let regex = Regex::new(pattern).map_err(|e| ClassifierError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })?;

        // Resolve the group index once so find() avoids a name lookup per line.
        let group = regex
            .capture_names()
            .position(|name| name == Some(constants::IP_CAPTURE_GROUP))
            .ok_or_else(|| ClassifierError::MissingCaptureGroup {
                pattern: pattern.to_string(),
                group: constants::IP_CAPTURE_GROUP,
            })?;

        tracing::debug!(pattern, "Line classifier compiled");

        Ok(Self {
            pattern: regex,
            group,
        })
    }

    /// Byte range of the IP token within `line`, or `None` when the line
    /// does not match.
    pub fn find(&self, line: &[u8]) -> Option<Range<usize>> {
        self.pattern
            .captures(line)
            .and_then(|caps| caps.get(self.group))
            .map(|m| m.range())
    }

    /// Return the IP token of `line`, or `""` when the line does not match.
    pub fn classify<'a>(&self, line: &'a [u8]) -> Cow<'a, str> {
        match self.find(line) {
            Some(range) => String::from_utf8_lossy(&line[range]),
            None => Cow::Borrowed(""),
        }
    }

    /// The source pattern this classifier was built from.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}
