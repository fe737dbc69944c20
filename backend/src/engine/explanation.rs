//! Human-readable justifications for a camp analysis.
//!
//! Lines are emitted in a fixed order:
//! 1. population with its food and water need (always)
//! 2. injured with bed need, plus medical kits when any are required (injured > 0)
//! 3. urgency level, uppercased (always)
//! 4. ambulance recommendation (ambulances > 0)

use super::CampContext;
use crate::models::RequirementEstimate;

pub fn generate_explanations(ctx: &CampContext, requirements: &RequirementEstimate) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);

    lines.push(format!(
        "Population of {} requires {} food packets and {} liters of water per day.",
        ctx.population, requirements.food_packets, requirements.water_liters
    ));

    if ctx.injured > 0 {
        let mut line = format!(
            "{} injured people require {} beds",
            ctx.injured, requirements.beds
        );
        if requirements.medical_kits > 0 {
            line.push_str(" and medical kits");
        }
        line.push('.');
        lines.push(line);
    }

    lines.push(format!(
        "Urgency level: {}.",
        ctx.urgency.label.to_uppercase()
    ));

    match requirements.ambulances {
        0 => {}
        1 => lines.push("Recommend deploying 1 ambulance.".to_string()),
        n => lines.push(format!("Recommend deploying {} ambulances.", n)),
    }

    lines
}
