//! Numeric range parsing for range attributes
//!
//! Census tables label numeric bins in a handful of shapes (`"0-14"`,
//! `"15 to 24"`, `"75+"`, `"<5"`). This module turns those labels into
//! bounds and a normalized model string.

use std::fmt;

/// Numeric bounds of a range value. A missing bound is open-ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBound {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// The lower bound itself lies outside the range
    pub lower_exclusive: bool,
    /// The upper bound itself lies outside the range
    pub upper_exclusive: bool,
}

impl RangeBound {
    /// Parse a range label into bounds
    ///
    /// # Arguments
    /// * `input` - The label as found in source data
    ///
    /// # Returns
    /// The parsed bounds, or a reason string describing why parsing failed
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        let label = input.trim().to_lowercase();
        if label.is_empty() {
            return Err("empty range label".to_string());
        }

        if let Some(rest) = label.strip_suffix('+') {
            return Ok(Self::at_least(parse_number(rest)?));
        }
        for suffix in [" and more", " and over", " or more"] {
            if let Some(rest) = label.strip_suffix(suffix) {
                return Ok(Self::at_least(parse_number(rest)?));
            }
        }
        if let Some(rest) = label.strip_prefix(">=") {
            return Ok(Self::at_least(parse_number(rest)?));
        }
        if let Some(rest) = label.strip_prefix("<=") {
            return Ok(Self::at_most(parse_number(rest)?));
        }
        // Integer labels describe integer bins: "<5" is the same bin as "<=4"
        if let Some(rest) = label.strip_prefix('<') {
            let bound = parse_number(rest)?;
            if bound.fract() == 0.0 {
                return Ok(Self::at_most(bound - 1.0));
            }
            return Ok(Self {
                upper_exclusive: true,
                ..Self::at_most(bound)
            });
        }
        if let Some(rest) = label.strip_prefix('>') {
            let bound = parse_number(rest)?;
            if bound.fract() == 0.0 {
                return Ok(Self::at_least(bound + 1.0));
            }
            return Ok(Self {
                lower_exclusive: true,
                ..Self::at_least(bound)
            });
        }

        let parts: Vec<&str> = if label.contains(" to ") {
            label.splitn(2, " to ").collect()
        } else {
            label.splitn(2, '-').collect()
        };

        match parts.as_slice() {
            [single] => {
                let value = parse_number(single)?;
                Ok(Self::closed(value, value))
            }
            [lower, upper] => {
                let lower = parse_number(lower)?;
                let upper = parse_number(upper)?;
                if lower > upper {
                    return Err(format!("lower bound {lower} exceeds upper bound {upper}"));
                }
                Ok(Self::closed(lower, upper))
            }
            _ => Err("unrecognized range shape".to_string()),
        }
    }

    const fn closed(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
            lower_exclusive: false,
            upper_exclusive: false,
        }
    }

    const fn at_least(lower: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
            lower_exclusive: false,
            upper_exclusive: false,
        }
    }

    const fn at_most(upper: f64) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
            lower_exclusive: false,
            upper_exclusive: false,
        }
    }

    /// Check whether a number falls inside the bounds
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let above = self.lower.is_none_or(|lower| {
            if self.lower_exclusive { value > lower } else { value >= lower }
        });
        let below = self.upper.is_none_or(|upper| {
            if self.upper_exclusive { value < upper } else { value <= upper }
        });
        above && below
    }

    /// Check whether two ranges share at least one number
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        // Tightest lower and upper bounds with their exclusivity
        let lower = match (self.lower, other.lower) {
            (Some(a), Some(b)) if a > b => Some((a, self.lower_exclusive)),
            (Some(a), Some(b)) if b > a => Some((b, other.lower_exclusive)),
            (Some(a), Some(_)) => Some((a, self.lower_exclusive || other.lower_exclusive)),
            (Some(a), None) => Some((a, self.lower_exclusive)),
            (None, Some(b)) => Some((b, other.lower_exclusive)),
            (None, None) => None,
        };
        let upper = match (self.upper, other.upper) {
            (Some(a), Some(b)) if a < b => Some((a, self.upper_exclusive)),
            (Some(a), Some(b)) if b < a => Some((b, other.upper_exclusive)),
            (Some(a), Some(_)) => Some((a, self.upper_exclusive || other.upper_exclusive)),
            (Some(a), None) => Some((a, self.upper_exclusive)),
            (None, Some(b)) => Some((b, other.upper_exclusive)),
            (None, None) => None,
        };
        match (lower, upper) {
            (Some((lower, lower_exclusive)), Some((upper, upper_exclusive))) => {
                lower < upper || (lower == upper && !lower_exclusive && !upper_exclusive)
            }
            _ => true,
        }
    }

    /// Normalized model representation, e.g. `[15, 24]` or `[75, *]`
    #[must_use]
    pub fn model_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_bound = |bound: Option<f64>| match bound {
            Some(value) if value.fract() == 0.0 => format!("{value:.0}"),
            Some(value) => format!("{value}"),
            None => "*".to_string(),
        };
        let open = if self.lower_exclusive { '(' } else { '[' };
        let close = if self.upper_exclusive { ')' } else { ']' };
        write!(f, "{open}{}, {}{close}", fmt_bound(self.lower), fmt_bound(self.upper))
    }
}

fn parse_number(raw: &str) -> std::result::Result<f64, String> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| format!("'{trimmed}' is not a number"))
}
