//! Clearance arithmetic: posted-height parsing, margin classification,
//! feet/inch formatting.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const INCHES_PER_METRE: f64 = 39.3701;

/// Margin below which the vehicle does not fit.
pub const CRITICAL_MARGIN_INCHES: f64 = 0.0;
/// Margin below which passage is very tight.
pub const DANGER_MARGIN_INCHES: f64 = 4.0;
/// Margin below which passage is tight. At or above it is comfortable.
pub const WARNING_MARGIN_INCHES: f64 = 6.0;

static IMPERIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\d+(?:\.\d+)?)\s*(?:'|′|ft)\s*(?:(\d+(?:\.\d+)?)\s*(?:"|″|in)?)?"#)
        .expect("imperial maxheight pattern")
});

static METRIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:[.,]\d+)?)\s*m?$").expect("metric maxheight pattern"));

/// Parse an OSM-style `maxheight` value into inches.
///
/// Accepts imperial forms (`10'6"`, `10'`, `10 ft 6 in`) and metric forms
/// (`3.2`, `3,2`, `3.2 m`). Returns `None` for anything else, including the
/// OSM keywords `default`, `none` and `below_default`.
pub fn parse_maxheight(raw: &str) -> Option<f64> {
    let text = raw.trim().to_lowercase();

    let inches = if let Some(caps) = IMPERIAL.captures(&text) {
        let feet: f64 = caps[1].parse().ok()?;
        let extra = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0.0,
        };
        feet * 12.0 + extra
    } else if let Some(caps) = METRIC.captures(&text) {
        let metres: f64 = caps[1].replace(',', ".").parse().ok()?;
        metres * INCHES_PER_METRE
    } else {
        return None;
    };

    if inches <= 0.0 {
        return None;
    }
    Some((inches * 10.0).round() / 10.0)
}

/// Format inches as feet and inches, rounded to the nearest inch (ex: `13'6"`).
pub fn format_feet_inches(inches: f64) -> String {
    let total = inches.max(0.0).round() as i64;
    format!("{}'{}\"", total / 12, total % 12)
}

/// How comfortably a vehicle passes under a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClearanceStatus {
    WillNotFit,
    VeryTight,
    Tight,
    Safe,
}

impl ClearanceStatus {
    /// Classify the margin between a bridge clearance and a vehicle height.
    pub fn classify(bridge_clearance_inches: f64, vehicle_height_inches: f64) -> Self {
        Self::from_margin(bridge_clearance_inches - vehicle_height_inches)
    }

    pub fn from_margin(margin_inches: f64) -> Self {
        if margin_inches < CRITICAL_MARGIN_INCHES {
            ClearanceStatus::WillNotFit
        } else if margin_inches < DANGER_MARGIN_INCHES {
            ClearanceStatus::VeryTight
        } else if margin_inches < WARNING_MARGIN_INCHES {
            ClearanceStatus::Tight
        } else {
            ClearanceStatus::Safe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClearanceStatus::WillNotFit => "WILL NOT FIT",
            ClearanceStatus::VeryTight => "VERY TIGHT",
            ClearanceStatus::Tight => "TIGHT",
            ClearanceStatus::Safe => "SAFE",
        }
    }
}

impl std::fmt::Display for ClearanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feet_and_inches() {
        assert_eq!(parse_maxheight("10'6\""), Some(126.0));
        assert_eq!(parse_maxheight("14'0\""), Some(168.0));
        assert_eq!(parse_maxheight("11'"), Some(132.0));
        assert_eq!(parse_maxheight("12 ft 4 in"), Some(148.0));
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(parse_maxheight("3.2"), Some(126.0));
        assert_eq!(parse_maxheight("4.1 m"), Some(161.4));
        assert_eq!(parse_maxheight("3,5"), Some(137.8));
    }

    #[test]
    fn test_parse_rejects_surrounding_text() {
        // "left" and "soft" contain "ft" but are not a unit
        assert_eq!(parse_maxheight("3.5 (left lane)"), None);
        assert_eq!(parse_maxheight("left lane 3.5"), None);
        assert_eq!(parse_maxheight("soft 4"), None);
        assert_eq!(parse_maxheight("13'6\" posted"), Some(162.0));
    }

    #[test]
    fn test_parse_rejects_keywords() {
        assert_eq!(parse_maxheight("default"), None);
        assert_eq!(parse_maxheight("none"), None);
        assert_eq!(parse_maxheight("below_default"), None);
        assert_eq!(parse_maxheight(""), None);
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(ClearanceStatus::classify(126.0, 130.0), ClearanceStatus::WillNotFit);
        assert_eq!(ClearanceStatus::classify(126.0, 126.0), ClearanceStatus::VeryTight);
        assert_eq!(ClearanceStatus::classify(126.0, 121.0), ClearanceStatus::Tight);
        assert_eq!(ClearanceStatus::classify(126.0, 120.0), ClearanceStatus::Safe);
    }

    #[test]
    fn test_format_feet_inches() {
        assert_eq!(format_feet_inches(162.0), "13'6\"");
        assert_eq!(format_feet_inches(125.6), "10'6\"");
        assert_eq!(format_feet_inches(-3.0), "0'0\"");
    }
}
