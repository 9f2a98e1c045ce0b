use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::{MockWeaveError, Result};

/// Names accepted by [`Preset::from_str`].
pub const AVAILABLE_PRESETS: &[&str] = &["blog", "ecommerce", "social"];

/// A built-in cardinality profile for array relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Blog,
    Ecommerce,
    Social,
}

/// `(model, relation field, min, max)`
type CardinalityRule = (&'static str, &'static str, usize, usize);

static BLOG: &[CardinalityRule] = &[
    ("User", "posts", 1, 5),
    ("User", "comments", 0, 10),
    ("Author", "posts", 1, 5),
    ("Post", "comments", 0, 8),
    ("Post", "tags", 1, 4),
    ("Post", "categories", 1, 2),
    ("Category", "posts", 2, 10),
    ("Tag", "posts", 1, 6),
];

static ECOMMERCE: &[CardinalityRule] = &[
    ("User", "orders", 0, 5),
    ("Customer", "orders", 0, 5),
    ("Order", "items", 1, 6),
    ("Order", "products", 1, 5),
    ("Product", "reviews", 0, 10),
    ("Product", "categories", 1, 3),
    ("Category", "products", 3, 15),
    ("Cart", "items", 0, 8),
];

static SOCIAL: &[CardinalityRule] = &[
    ("User", "followers", 0, 20),
    ("User", "following", 0, 20),
    ("User", "friends", 0, 15),
    ("User", "posts", 0, 15),
    ("Post", "likes", 0, 30),
    ("Post", "comments", 0, 10),
    ("Group", "members", 3, 25),
];

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Blog => "blog",
            Preset::Ecommerce => "ecommerce",
            Preset::Social => "social",
        }
    }

    fn rules(&self) -> &'static [CardinalityRule] {
        match self {
            Preset::Blog => BLOG,
            Preset::Ecommerce => ECOMMERCE,
            Preset::Social => SOCIAL,
        }
    }

    /// Count range for an array relation, if this preset configures it.
    pub fn range_for(&self, model: &str, field: &str) -> Option<RangeInclusive<usize>> {
        self.rules()
            .iter()
            .find(|(m, f, _, _)| *m == model && *f == field)
            .map(|&(_, _, min, max)| min..=max)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = MockWeaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "blog" => Ok(Preset::Blog),
            "ecommerce" | "e-commerce" => Ok(Preset::Ecommerce),
            "social" => Ok(Preset::Social),
            _ => Err(MockWeaveError::UnknownPreset {
                name: s.to_string(),
                available: AVAILABLE_PRESETS.join(", "),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_lookup() {
        assert_eq!(Preset::Blog.range_for("User", "posts"), Some(1..=5));
        assert_eq!(Preset::Blog.range_for("User", "orders"), None);
        assert_eq!(Preset::Ecommerce.range_for("Order", "items"), Some(1..=6));
    }

    #[test]
    fn test_parse() {
        assert_eq!("Social".parse::<Preset>().unwrap(), Preset::Social);
        let err = "forum".parse::<Preset>().unwrap_err();
        assert!(matches!(err, MockWeaveError::UnknownPreset { .. }));
        assert!(err.to_string().contains("blog, ecommerce, social"));
    }
}
