//! Five-digit postal code newtype
//!
//! Codes arrive from CSV files, SQLite rows and user input in a handful of
//! shapes (`"2016"`, `"20164"`, `"20164-1234"`, integer columns). Everything is
//! normalized to exactly five zero-padded digits before it is stored or used as
//! a lookup key, so codes with leading zeros are never corrupted.

use crate::error::QueryError;
use std::fmt;
use std::str::FromStr;

pub const POSTAL_CODE_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostalCode(String);

impl PostalCode {
    /// Normalize raw input into a five-digit code
    ///
    /// Accepts 1-5 digits (left-padded with zeros) or the ZIP+4 form
    /// `ddddd-dddd` (the extension is dropped). Surrounding whitespace is
    /// ignored. Anything else is rejected.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        let base = match trimmed.split_once('-') {
            Some((head, ext))
                if head.len() == POSTAL_CODE_LEN
                    && ext.len() == 4
                    && ext.bytes().all(|b| b.is_ascii_digit()) =>
            {
                head
            }
            _ => trimmed,
        };

        if base.is_empty()
            || base.len() > POSTAL_CODE_LEN
            || !base.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(QueryError::InvalidInput(format!(
                "'{}' is not a valid ZIP code",
                raw.trim()
            )));
        }

        Ok(Self(format!("{:0>width$}", base, width = POSTAL_CODE_LEN)))
    }

    /// Build a code from an integer column value (e.g. `2016` -> `"02016"`)
    pub fn from_number(value: i64) -> Result<Self, QueryError> {
        if !(0..100_000).contains(&value) {
            return Err(QueryError::InvalidInput(format!(
                "{} is out of range for a ZIP code",
                value
            )));
        }
        Ok(Self(format!("{:05}", value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for PostalCode {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_digit_code_is_padded() {
        assert_eq!(PostalCode::parse("2016").unwrap().as_str(), "02016");
        assert_eq!(PostalCode::parse("501").unwrap().as_str(), "00501");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in ["2016", "20164", " 02016 ", "7", "20164-1234"] {
            let once = PostalCode::parse(raw).unwrap();
            let twice = PostalCode::parse(once.as_str()).unwrap();
            assert_eq!(once, twice, "normalizing '{}' twice changed it", raw);
        }
    }

    #[test]
    fn test_zip_plus_four_keeps_base() {
        assert_eq!(PostalCode::parse("20164-1234").unwrap().as_str(), "20164");
    }

    #[test]
    fn test_rejects_malformed_codes() {
        for raw in ["", "   ", "201645", "2016a", "ABCDE", "20164-12", "-2016"] {
            let result = PostalCode::parse(raw);
            assert!(
                matches!(result, Err(QueryError::InvalidInput(_))),
                "'{}' should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_from_number() {
        assert_eq!(PostalCode::from_number(2016).unwrap().as_str(), "02016");
        assert_eq!(PostalCode::from_number(90210).unwrap().as_str(), "90210");
        assert!(PostalCode::from_number(100_000).is_err());
        assert!(PostalCode::from_number(-1).is_err());
    }
}
