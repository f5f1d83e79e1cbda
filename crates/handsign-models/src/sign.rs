//! Sign vocabulary and class-index mapping.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label reported for class indices outside the vocabulary.
pub const UNKNOWN_LABEL: &str = "Unknown label";

/// Signs the classifier was trained on, in class-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Sign {
    #[serde(rename = "Hello")]
    Hello,
    #[serde(rename = "I Love You")]
    ILoveYou,
    #[serde(rename = "Yes")]
    Yes,
    #[serde(rename = "No")]
    No,
    #[serde(rename = "Thanks")]
    Thanks,
}

impl Sign {
    pub const ALL: [Sign; 5] = [Sign::Hello, Sign::ILoveYou, Sign::Yes, Sign::No, Sign::Thanks];

    /// Map a classifier output to a sign.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sign::Hello => "Hello",
            Sign::ILoveYou => "I Love You",
            Sign::Yes => "Yes",
            Sign::No => "No",
            Sign::Thanks => "Thanks",
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown sign: {0}")]
pub struct SignParseError(String);

impl FromStr for Sign {
    type Err = SignParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sign| sign.as_str() == s)
            .ok_or_else(|| SignParseError(s.to_string()))
    }
}

/// Human-readable label for a class index, or [`UNKNOWN_LABEL`].
pub fn label_for_index(index: i64) -> String {
    Sign::from_index(index)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// Drop entries equal to their immediate predecessor.
pub fn collapse_adjacent<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        let label = label.as_ref();
        if out.last().map(String::as_str) != Some(label) {
            out.push(label.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping() {
        assert_eq!(label_for_index(0), "Hello");
        assert_eq!(label_for_index(1), "I Love You");
        assert_eq!(label_for_index(2), "Yes");
        assert_eq!(label_for_index(3), "No");
        assert_eq!(label_for_index(4), "Thanks");
    }

    #[test]
    fn test_unknown_indices() {
        assert_eq!(label_for_index(5), UNKNOWN_LABEL);
        assert_eq!(label_for_index(-1), UNKNOWN_LABEL);
        assert_eq!(Sign::from_index(i64::MAX), None);
    }

    #[test]
    fn test_index_roundtrip_and_parse() {
        for sign in Sign::ALL {
            assert_eq!(Sign::from_index(sign.index() as i64), Some(sign));
            assert_eq!(sign.as_str().parse::<Sign>().unwrap(), sign);
        }
        assert!("Goodbye".parse::<Sign>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        assert_eq!(serde_json::to_string(&Sign::ILoveYou).unwrap(), "\"I Love You\"");
    }

    #[test]
    fn test_collapse_adjacent() {
        let labels = ["Hello", "Hello", "Yes", "Hello", "Thanks", "Thanks", "Thanks"];
        assert_eq!(collapse_adjacent(labels), vec!["Hello", "Yes", "Hello", "Thanks"]);
        assert!(collapse_adjacent(Vec::<String>::new()).is_empty());
    }
}
