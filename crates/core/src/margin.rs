//! CSS `rootMargin` values for intersection observers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One margin component, in pixels or percent of the root box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    Px(f64),
    Percent(f64),
}

impl MarginLength {
    fn parse(token: &str, whole: &str) -> Result<Self, Error> {
        let (number, build): (&str, fn(f64) -> Self) = if let Some(n) = token.strip_suffix("px") {
            (n, Self::Px)
        } else if let Some(n) = token.strip_suffix('%') {
            (n, Self::Percent)
        } else if token == "0" {
            ("0", Self::Px)
        } else {
            return Err(Error::invalid_root_margin(
                whole,
                format!("'{token}' must be a length in px or %"),
            ));
        };

        number
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(build)
            .ok_or_else(|| Error::invalid_root_margin(whole, format!("'{token}' is not a number")))
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// Parsed `rootMargin` shorthand with one to four components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    components: Vec<MarginLength>,
}

impl RootMargin {
    /// A zero margin (`"0px"`).
    #[must_use]
    pub fn zero() -> Self {
        Self::px(0.0)
    }

    /// The same pixel margin on every side.
    #[must_use]
    pub fn px(value: f64) -> Self {
        Self {
            components: vec![MarginLength::Px(value)],
        }
    }

    /// Expand the shorthand to `[top, right, bottom, left]`.
    #[must_use]
    pub fn sides(&self) -> [MarginLength; 4] {
        let zero = MarginLength::Px(0.0);
        let at = |i: usize| self.components.get(i).copied().unwrap_or(zero);
        match self.components.len() {
            1 => [at(0); 4],
            2 => [at(0), at(1), at(0), at(1)],
            3 => [at(0), at(1), at(2), at(1)],
            _ => [at(0), at(1), at(2), at(3)],
        }
    }

    /// CSS text suitable for `IntersectionObserverInit.rootMargin`.
    #[must_use]
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for RootMargin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.is_empty() || tokens.len() > 4 {
            return Err(Error::invalid_root_margin(
                s,
                "expected one to four components",
            ));
        }

        let components = tokens
            .into_iter()
            .map(|token| MarginLength::parse(token, s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(margin: RootMargin) -> Self {
        margin.to_css()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .components
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_single_component() {
        let margin: RootMargin = "200px".parse().unwrap();
        assert_eq!(margin.sides(), [MarginLength::Px(200.0); 4]);
        assert_eq!(margin.to_css(), "200px");
    }

    #[test]
    fn test_parse_shorthand_expansion() {
        let margin: RootMargin = "10% 0px -50px".parse().unwrap();
        assert_eq!(
            margin.sides(),
            [
                MarginLength::Percent(10.0),
                MarginLength::Px(0.0),
                MarginLength::Px(-50.0),
                MarginLength::Px(0.0),
            ]
        );
    }

    #[test]
    fn test_bare_zero_is_pixels() {
        let margin: RootMargin = "0".parse().unwrap();
        assert_eq!(margin, RootMargin::zero());
    }

    #[test]
    fn test_rejects_bad_units_and_counts() {
        assert!("10em".parse::<RootMargin>().is_err());
        assert!("".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
        assert!("abcpx".parse::<RootMargin>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let margin: RootMargin = serde_json::from_str("\"200px 0px\"").unwrap();
        assert_eq!(serde_json::to_string(&margin).unwrap(), "\"200px 0px\"");
        assert!(serde_json::from_str::<RootMargin>("\"wide\"").is_err());
    }
}
