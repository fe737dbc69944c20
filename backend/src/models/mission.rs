//! Mission and camp input records.
//!
//! Missions (disaster alerts) and camps are owned by the alert and camp
//! management subsystems; the impact engine only reads them. Free-text labels
//! carried by those records are exposed through total parse functions that
//! never fail: anything unrecognised lands in an explicit fallback variant.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::define_id_type;

define_id_type!(MissionId);
define_id_type!(CampId);

/// Label reported when a mission carries no disaster type or severity.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A disaster event that relief camps are attached to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: MissionId,
    /// Free-text disaster kind ("FLOOD", "Earthquake", ...)
    #[serde(rename = "type", default)]
    pub disaster_type: Option<String>,
    /// Severity or magnitude label, e.g. "7.2" or "Critical"
    #[serde(default)]
    pub magnitude: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
}

impl Mission {
    pub fn new(id: impl Into<MissionId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_disaster_type(mut self, disaster_type: impl Into<String>) -> Self {
        self.disaster_type = Some(disaster_type.into());
        self
    }

    pub fn with_magnitude(mut self, magnitude: impl Into<String>) -> Self {
        self.magnitude = Some(magnitude.into());
        self
    }

    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }

    /// Parsed disaster kind, if the mission carries one.
    pub fn kind(&self) -> Option<DisasterType> {
        non_blank(self.disaster_type.as_deref()).map(DisasterType::parse)
    }

    /// Disaster type as reported to callers ("Unknown" when absent).
    pub fn disaster_type_label(&self) -> String {
        self.kind()
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    }

    /// Severity label as reported to callers ("Unknown" when absent).
    pub fn severity_label(&self) -> String {
        non_blank(self.magnitude.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    }

    pub fn severity(&self) -> Severity {
        non_blank(self.magnitude.as_deref())
            .map(Severity::parse)
            .unwrap_or(Severity::Unknown)
    }
}

/// A relief shelter serving a population, linked to exactly one mission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camp {
    pub id: CampId,
    #[serde(alias = "alertId")]
    pub mission_id: MissionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub injured_count: Option<i64>,
    /// Per-camp override of the mission urgency
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Camp {
    pub fn new(
        id: impl Into<CampId>,
        mission_id: impl Into<MissionId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            mission_id: mission_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_population(mut self, population: i64) -> Self {
        self.population = Some(population);
        self
    }

    pub fn with_injured(mut self, injured: i64) -> Self {
        self.injured_count = Some(injured);
        self
    }

    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Population with missing or negative values coerced to zero.
    pub fn headcount(&self) -> u64 {
        coerce_count(self.population)
    }

    /// Injured count with missing or negative values coerced to zero.
    pub fn injured(&self) -> u64 {
        coerce_count(self.injured_count)
    }

    /// Urgency label in effect for this camp: the camp override first, then
    /// the mission urgency.
    pub fn effective_urgency<'a>(&'a self, mission: &'a Mission) -> Option<&'a str> {
        non_blank(self.urgency.as_deref()).or_else(|| non_blank(mission.urgency.as_deref()))
    }
}

fn coerce_count(value: Option<i64>) -> u64 {
    value.map(|v| v.max(0) as u64).unwrap_or(0)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Disaster kinds known to the alert subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisasterType {
    Earthquake,
    Flood,
    Cyclone,
    Fire,
    Tsunami,
    Landslide,
    FieldReport,
    Medical,
    Infrastructure,
    Supplies,
    /// Any label the alert subsystem did not standardise
    Other(String),
}

impl DisasterType {
    pub fn parse(label: &str) -> Self {
        let normalized = label
            .trim()
            .to_uppercase()
            .replace([' ', '-'], "_");
        match normalized.as_str() {
            "EARTHQUAKE" => Self::Earthquake,
            "FLOOD" | "FLOODS" | "FLOODING" => Self::Flood,
            "CYCLONE" | "HURRICANE" | "TYPHOON" => Self::Cyclone,
            "FIRE" | "WILDFIRE" | "FOREST_FIRE" => Self::Fire,
            "TSUNAMI" => Self::Tsunami,
            "LANDSLIDE" => Self::Landslide,
            "FIELD_REPORT" => Self::FieldReport,
            "MEDICAL" => Self::Medical,
            "INFRASTRUCTURE" => Self::Infrastructure,
            "SUPPLIES" => Self::Supplies,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Earthquake => "EARTHQUAKE",
            Self::Flood => "FLOOD",
            Self::Cyclone => "CYCLONE",
            Self::Fire => "FIRE",
            Self::Tsunami => "TSUNAMI",
            Self::Landslide => "LANDSLIDE",
            Self::FieldReport => "FIELD_REPORT",
            Self::Medical => "MEDICAL",
            Self::Infrastructure => "INFRASTRUCTURE",
            Self::Supplies => "SUPPLIES",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mission severity bucket.
///
/// Alerts carry either a word ("Critical") or a numeric magnitude ("7.2");
/// both forms map onto the same four buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Low,
    Moderate,
    Unknown,
    High,
    Critical,
}

impl Severity {
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "low" | "minor" => return Self::Low,
            "moderate" | "medium" => return Self::Moderate,
            "high" | "severe" | "major" => return Self::High,
            "critical" | "extreme" | "catastrophic" => return Self::Critical,
            _ => {}
        }

        match normalized.parse::<f64>() {
            Ok(magnitude) if magnitude.is_finite() => Self::from_magnitude(magnitude),
            _ => Self::Unknown,
        }
    }

    /// Bucket a numeric magnitude (Richter-style scale).
    pub fn from_magnitude(magnitude: f64) -> Self {
        if magnitude >= 7.0 {
            Self::Critical
        } else if magnitude >= 6.0 {
            Self::High
        } else if magnitude >= 4.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// Urgency bucket derived from a free-text label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UrgencyLevel {
    Immediate,
    ShortTerm,
    Medium,
    LongTerm,
    /// No label was supplied
    Unspecified,
    /// A label that matched none of the known buckets
    Other(String),
}

impl UrgencyLevel {
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Self::Unspecified;
        }

        let compact: String = trimmed
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();

        match compact.as_str() {
            "immediate" | "immediately" | "critical" | "urgent" | "now" | "0hours" | "0h" => {
                Self::Immediate
            }
            "6hours" | "6hour" | "6hrs" | "6h" | "high" | "shortterm" | "short" => Self::ShortTerm,
            "12hours" | "12hour" | "12hrs" | "12h" | "medium" | "moderate" | "mediumterm" => {
                Self::Medium
            }
            "24hours" | "24hour" | "24hrs" | "24h" | "1day" | "low" | "longterm" | "long" => {
                Self::LongTerm
            }
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Parse an optional label; a missing label is `Unspecified`.
    pub fn from_label(label: Option<&str>) -> Self {
        label.map(Self::parse).unwrap_or(Self::Unspecified)
    }

    /// Hours of supply considered safe for this urgency bucket.
    ///
    /// Unrecognised and missing labels fall back to the least urgent bucket.
    pub fn supply_window_hours(&self) -> u32 {
        match self {
            Self::Immediate => 0,
            Self::ShortTerm => 6,
            Self::Medium => 12,
            Self::LongTerm | Self::Unspecified | Self::Other(_) => 24,
        }
    }
}
