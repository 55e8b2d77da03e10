//! Built-in validators for completed scans.
//!
//! A [`Validator`] is a plain predicate over the accumulated code. The kinds
//! selectable from configuration are listed in [`ValidatorKind`].

use std::sync::Arc;

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use regex::Regex;
use serde::Deserialize;

pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    strum::Display,
    strum::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValidatorKind {
    /// Accept every code
    #[default]
    Any,
    /// Only ASCII digits
    Digits,
    /// GS1 check digit of EAN-8, UPC-A, EAN-13 and ITF-14 codes
    Gtin,
    /// The whole code matches a regular expression
    Pattern,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub kind: ValidatorKind,
    /// Used by [`ValidatorKind::Pattern`]
    pub pattern: Option<String>,
}

impl ValidatorConfig {
    pub fn build(&self) -> Result<Validator> {
        match self.kind {
            ValidatorKind::Any => Ok(always_valid()),
            ValidatorKind::Digits => Ok(Arc::new(is_digits)),
            ValidatorKind::Gtin => Ok(Arc::new(is_valid_gtin)),
            ValidatorKind::Pattern => {
                let pattern = self
                    .pattern
                    .as_deref()
                    .ok_or_else(|| eyre!("validator kind `pattern` needs `pattern` to be set"))?;
                matches_pattern(pattern)
            }
        }
    }
}

pub fn always_valid() -> Validator {
    Arc::new(|_: &str| true)
}

pub fn is_digits(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

/// Checks the trailing mod-10 check digit of a GTIN-8/12/13/14.
///
/// Weights alternate 3, 1, 3, ... starting from the digit left of the check digit.
pub fn is_valid_gtin(code: &str) -> bool {
    if !matches!(code.len(), 8 | 12 | 13 | 14) || !is_digits(code) {
        return false;
    }
    let digits: Vec<u32> = code.bytes().map(|b| u32::from(b - b'0')).collect();
    let Some((check, body)) = digits.split_last() else {
        return false;
    };
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    (10 - sum % 10) % 10 == *check
}

/// The whole code has to match; the pattern is anchored on both ends.
pub fn matches_pattern(pattern: &str) -> Result<Validator> {
    let re = Regex::new(&format!("^(?:{pattern})$"))
        .with_context(|| format!("Invalid validator pattern `{pattern}`"))?;
    Ok(Arc::new(move |code: &str| re.is_match(code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gtin_check_digits() {
        assert!(is_valid_gtin("96385074")); // EAN-8
        assert!(is_valid_gtin("036000291452")); // UPC-A
        assert!(is_valid_gtin("4006381333931")); // EAN-13
        assert!(is_valid_gtin("10012345678902")); // ITF-14

        assert!(!is_valid_gtin("4006381333932"));
        assert!(!is_valid_gtin("400638133393"));
        assert!(!is_valid_gtin("40063813339A1"));
        assert!(!is_valid_gtin(""));
    }

    #[test]
    fn digits_only() {
        assert!(is_digits("0123"));
        assert!(!is_digits(""));
        assert!(!is_digits("12 3"));
        assert!(!is_digits("１２"));
    }

    #[test]
    fn pattern_is_anchored() {
        let v = matches_pattern(r"[A-Z]{2}\d+").unwrap();
        assert!(v("AB123"));
        assert!(!v("xAB123"));
        assert!(!v("AB123x"));

        let v = matches_pattern("A|B").unwrap();
        assert!(v("A"));
        assert!(!v("AB"));
    }

    #[test]
    fn build_from_config() {
        let any = ValidatorConfig::default().build().unwrap();
        assert!(any(""));

        let gtin = ValidatorConfig {
            kind: ValidatorKind::Gtin,
            pattern: None,
        }
        .build()
        .unwrap();
        assert!(gtin("4006381333931"));
        assert!(!gtin("hello"));

        let missing = ValidatorConfig {
            kind: ValidatorKind::Pattern,
            pattern: None,
        };
        assert!(missing.build().is_err());

        let invalid = ValidatorConfig {
            kind: ValidatorKind::Pattern,
            pattern: Some("(".into()),
        };
        assert!(invalid.build().is_err());
    }

    #[test]
    fn kind_from_str() {
        assert_eq!("gtin".parse::<ValidatorKind>().unwrap(), ValidatorKind::Gtin);
        assert_eq!(ValidatorKind::Pattern.to_string(), "pattern");
    }
}
