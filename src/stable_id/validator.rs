use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::DEFAULT_MIN_ID_LENGTH;

static TRNA_SCAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Trna").expect("tRNA-scan pattern is valid"));
static COORDINATES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+:\d+\.\.\d+").expect("coordinate pattern is valid"));
static RANGE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.").expect("range pattern is valid"));
static SPECIAL_CHARACTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ |]").expect("special character pattern is valid"));

/// The first rule a rejected identifier violates
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRejection {
    #[error("looks like a tRNA from tRNA-scan")]
    TrnaScan,
    #[error("looks like genomic coordinates")]
    Coordinates,
    #[error("contains a space or a pipe")]
    SpecialCharacters,
    #[error("shorter than {0} characters")]
    TooShort(usize),
}

/// Checks whether a stable identifier is acceptable
///
/// An identifier is rejected if it
/// 1. starts with `Trna` (any case), an artifact of tRNA-scan
/// 2. looks like coordinates (`chr1:100..200`) or contains a `..` range
/// 3. contains a space or a `|`
/// 4. is shorter than [`IdValidator::min_id_length`]
///
/// The rules are checked in this order and the first failing one is reported.
///
/// # Examples
///
/// ```
/// use gff3_tidy::{IdRejection, IdValidator};
///
/// let validator = IdValidator::default();
/// assert!(validator.is_valid("LOREMIPSUM_01"));
/// assert_eq!(validator.check("CHR1:100..200"), Err(IdRejection::Coordinates));
/// assert_eq!(validator.check("Abc"), Err(IdRejection::TooShort(7)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdValidator {
    validate: bool,
    min_id_length: usize,
}

impl Default for IdValidator {
    fn default() -> Self {
        Self {
            validate: true,
            min_id_length: DEFAULT_MIN_ID_LENGTH,
        }
    }
}

impl IdValidator {
    /// Sets the minimum number of characters of a valid identifier
    #[must_use]
    pub fn with_min_id_length(mut self, min_id_length: usize) -> Self {
        self.min_id_length = min_id_length;
        self
    }

    /// Enables or disables all checks
    ///
    /// A disabled validator accepts every identifier.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn min_id_length(&self) -> usize {
        self.min_id_length
    }

    pub fn validates(&self) -> bool {
        self.validate
    }

    pub fn set_min_id_length(&mut self, min_id_length: usize) {
        self.min_id_length = min_id_length;
    }

    pub fn set_validation(&mut self, validate: bool) {
        self.validate = validate;
    }

    /// Returns the first rule that `candidate` violates
    ///
    /// # Errors
    ///
    /// The [`IdRejection`] describing why the identifier is not acceptable
    pub fn check(&self, candidate: &str) -> Result<(), IdRejection> {
        if !self.validate {
            return Ok(());
        }

        let rejection = if TRNA_SCAN.is_match(candidate) {
            Some(IdRejection::TrnaScan)
        } else if COORDINATES.is_match(candidate) || RANGE_SEPARATOR.is_match(candidate) {
            Some(IdRejection::Coordinates)
        } else if SPECIAL_CHARACTERS.is_match(candidate) {
            Some(IdRejection::SpecialCharacters)
        } else if candidate.chars().count() < self.min_id_length {
            Some(IdRejection::TooShort(self.min_id_length))
        } else {
            None
        };

        match rejection {
            Some(reason) => {
                debug!("Stable id {candidate} is {reason}");
                Err(reason)
            }
            None => Ok(()),
        }
    }

    /// Returns `true` if `candidate` is an acceptable stable identifier
    pub fn is_valid(&self, candidate: &str) -> bool {
        self.check(candidate).is_ok()
    }
}
