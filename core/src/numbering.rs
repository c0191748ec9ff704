//! Human-readable ticket numbers.
//!
//! A ticket number is a fixed prefix followed by a zero-padded decimal
//! sequence, e.g. `T000042`. The width is a minimum: sequences wider than the
//! padding are rendered in full (`T1234567` with width 6).
//!
//! This module only computes numbers. Uniqueness under concurrency is the job
//! of the store (a unique constraint) and the issuer's retry loop.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix and minimum digit width for ticket numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketNumberFormat {
    prefix: String,
    width: usize,
}

impl Default for TicketNumberFormat {
    fn default() -> Self {
        Self {
            prefix: "T".to_string(),
            width: 6,
        }
    }
}

impl TicketNumberFormat {
    /// Create a format.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidNumberFormat`] if the prefix is empty, ends
    /// in a digit, or the width is zero.
    pub fn new(prefix: impl Into<String>, width: usize) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(CoreError::InvalidNumberFormat("prefix must not be empty"));
        }
        if prefix.ends_with(|c: char| c.is_ascii_digit()) {
            return Err(CoreError::InvalidNumberFormat("prefix must not end in a digit"));
        }
        if width == 0 {
            return Err(CoreError::InvalidNumberFormat("width must be at least 1"));
        }
        Ok(Self { prefix, width })
    }

    /// The prefix, e.g. `T`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Minimum digit count.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Render a sequence value.
    #[must_use]
    pub fn format(&self, sequence: u64) -> String {
        format!("{}{:0width$}", self.prefix, sequence, width = self.width)
    }

    /// Recover the sequence value from a display identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedTicketNumber`] if the prefix is wrong, the
    /// remainder is empty or not all ASCII digits, the value does not fit in a
    /// `u64`, or the value is zero.
    pub fn parse(&self, value: &str) -> Result<u64> {
        let malformed = |reason| CoreError::MalformedTicketNumber {
            value: value.to_string(),
            reason,
        };

        let digits = value
            .strip_prefix(self.prefix.as_str())
            .ok_or_else(|| malformed("wrong prefix"))?;
        if digits.is_empty() {
            return Err(malformed("missing digits"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("non-digit characters"));
        }
        let sequence: u64 = digits.parse().map_err(|_| malformed("out of range"))?;
        if sequence == 0 {
            return Err(malformed("sequence starts at 1"));
        }
        Ok(sequence)
    }

    /// Sequence to issue after `max_issued`.
    ///
    /// An empty history (or a recorded zero) starts at 1.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SequenceOverflow`] when `max_issued` is `u64::MAX`.
    pub fn next_sequence(&self, max_issued: Option<u64>) -> Result<u64> {
        match max_issued {
            None | Some(0) => Ok(1),
            Some(max) => max.checked_add(1).ok_or(CoreError::SequenceOverflow(max)),
        }
    }

    /// Highest sequence among existing display identifiers.
    ///
    /// Missing and unparseable identifiers are skipped; legacy rows without a
    /// number must not block issuance.
    pub fn max_issued<'a, I>(&self, numbers: I) -> Option<u64>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        numbers
            .into_iter()
            .flatten()
            .filter_map(|number| self.parse(number).ok())
            .max()
    }

    /// Build a [`TicketNumber`] for a sequence value.
    #[must_use]
    pub fn number(&self, sequence: u64) -> TicketNumber {
        TicketNumber {
            display: self.format(sequence),
            sequence,
        }
    }
}

/// An issued ticket number: display form plus its sequence value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketNumber {
    sequence: u64,
    display: String,
}

impl TicketNumber {
    /// Parse a display identifier with a specific format.
    ///
    /// # Errors
    ///
    /// See [`TicketNumberFormat::parse`].
    pub fn parse_with(format: &TicketNumberFormat, value: &str) -> Result<Self> {
        let sequence = format.parse(value)?;
        Ok(Self {
            sequence,
            display: value.to_string(),
        })
    }

    /// Rebuild a number from persisted columns without re-validating.
    #[must_use]
    pub const fn from_stored(sequence: u64, display: String) -> Self {
        Self { sequence, display }
    }

    /// Sequence value.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Display identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.display
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl FromStr for TicketNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_with(&TicketNumberFormat::default(), s)
    }
}

impl Serialize for TicketNumber {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display)
    }
}
