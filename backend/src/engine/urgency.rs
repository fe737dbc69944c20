//! Urgency evaluation: free-text urgency label to supply window in hours.

use crate::models::UrgencyLevel;

/// Label reported for camps whose mission carries no urgency at all.
pub const UNSPECIFIED_URGENCY: &str = "Unspecified";

/// Hours of supply treated as safe when nothing better is known.
pub const SAFE_SUPPLY_WINDOW_HOURS: u32 = 24;

/// Outcome of evaluating an urgency label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrgencyAssessment {
    pub level: UrgencyLevel,
    /// The label as supplied (trimmed), or [`UNSPECIFIED_URGENCY`]
    pub label: String,
    pub supply_window_hours: u32,
}

/// Evaluate an optional urgency label. Never fails.
pub fn evaluate_urgency(label: Option<&str>) -> UrgencyAssessment {
    let trimmed = label.map(str::trim).filter(|s| !s.is_empty());
    let level = UrgencyLevel::from_label(trimmed);
    UrgencyAssessment {
        supply_window_hours: level.supply_window_hours(),
        label: trimmed.unwrap_or(UNSPECIFIED_URGENCY).to_string(),
        level,
    }
}

/// Shorthand for the supply window of a label.
pub fn supply_window_hours(label: Option<&str>) -> u32 {
    evaluate_urgency(label).supply_window_hours
}
