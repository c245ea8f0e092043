//! Risk vocabularies used in reasoning-service replies
//!
//! Deserialization is case-insensitive so that "High" and "HIGH" from the
//! reasoning service both land on the same variant; anything outside the
//! vocabulary is rejected.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Overall strike risk for the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum RiskLevel {
    /// Every bridge clears with margin
    Safe,
    Low,
    Medium,
    High,
    /// A strike is likely on the current route
    Critical,
    /// Not assessed (missing height or bridge data)
    #[default]
    Unknown,
}

impl RiskLevel {
    pub fn is_known(&self) -> bool {
        !matches!(self, RiskLevel::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Ok(RiskLevel::Safe),
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            "CRITICAL" => Ok(RiskLevel::Critical),
            "UNKNOWN" => Ok(RiskLevel::Unknown),
            other => Err(format!("unknown risk level '{}'", other)),
        }
    }
}

impl TryFrom<String> for RiskLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-bridge verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum BridgeVerdict {
    Safe,
    Caution,
    Danger,
    Critical,
}

impl BridgeVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeVerdict::Safe => "SAFE",
            BridgeVerdict::Caution => "CAUTION",
            BridgeVerdict::Danger => "DANGER",
            BridgeVerdict::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for BridgeVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BridgeVerdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Ok(BridgeVerdict::Safe),
            "CAUTION" => Ok(BridgeVerdict::Caution),
            "DANGER" => Ok(BridgeVerdict::Danger),
            "CRITICAL" => Ok(BridgeVerdict::Critical),
            other => Err(format!("unknown bridge verdict '{}'", other)),
        }
    }
}

impl TryFrom<String> for BridgeVerdict {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Letter grade for a bridge passage or a whole route, A best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum SafetyGrade {
    A,
    B,
    C,
    D,
    F,
}

impl SafetyGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyGrade::A => "A",
            SafetyGrade::B => "B",
            SafetyGrade::C => "C",
            SafetyGrade::D => "D",
            SafetyGrade::F => "F",
        }
    }
}

impl std::fmt::Display for SafetyGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafetyGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(SafetyGrade::A),
            "B" => Ok(SafetyGrade::B),
            "C" => Ok(SafetyGrade::C),
            "D" => Ok(SafetyGrade::D),
            "F" => Ok(SafetyGrade::F),
            other => Err(format!("unknown safety grade '{}'", other)),
        }
    }
}

impl TryFrom<String> for SafetyGrade {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
