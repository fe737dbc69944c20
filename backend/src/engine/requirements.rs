//! Requirement rule calculator.
//!
//! The food, water, bed, medical-kit and ambulance formulas are the source of
//! truth for those quantities and are not configurable. The remaining fields
//! come from a tunable proportional policy table; every heuristic is
//! non-decreasing in population and injured count.

use serde::{Deserialize, Serialize};

use super::CampContext;
use crate::models::{RequirementEstimate, Severity};

pub const FOOD_PACKETS_PER_PERSON: u64 = 3;
pub const WATER_LITERS_PER_PERSON: u64 = 5;
pub const INJURED_PER_MEDICAL_KIT: u64 = 2;
pub const INJURED_PER_AMBULANCE: u64 = 4;

/// Coefficients for the secondary (non-mandated) requirement fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementPolicy {
    pub people_per_toilet: u64,
    pub people_per_power_unit: u64,
    pub blankets_per_person: u64,
    pub people_per_volunteer: u64,
    pub injured_per_volunteer: u64,
    /// Extra volunteer headcount, in percent, for high-severity missions
    pub high_severity_surge_pct: u64,
    /// Extra volunteer headcount, in percent, for critical missions
    pub critical_severity_surge_pct: u64,
}

impl Default for RequirementPolicy {
    fn default() -> Self {
        Self {
            people_per_toilet: 20,
            people_per_power_unit: 100,
            blankets_per_person: 2,
            people_per_volunteer: 50,
            injured_per_volunteer: 10,
            high_severity_surge_pct: 25,
            critical_severity_surge_pct: 50,
        }
    }
}

impl RequirementPolicy {
    /// Check that every divisor is at least one.
    pub fn validate(&self) -> Result<(), String> {
        let divisors = [
            ("people_per_toilet", self.people_per_toilet),
            ("people_per_power_unit", self.people_per_power_unit),
            ("people_per_volunteer", self.people_per_volunteer),
            ("injured_per_volunteer", self.injured_per_volunteer),
        ];
        for (name, value) in divisors {
            if value == 0 {
                return Err(format!("requirements.{} must be at least 1", name));
            }
        }
        Ok(())
    }

    /// Compute the full requirement estimate for a camp.
    pub fn estimate(&self, ctx: &CampContext) -> RequirementEstimate {
        let population = ctx.population;
        let injured = ctx.injured;

        RequirementEstimate {
            food_packets: population.saturating_mul(FOOD_PACKETS_PER_PERSON),
            water_liters: population.saturating_mul(WATER_LITERS_PER_PERSON),
            beds: injured,
            medical_kits: injured.div_ceil(INJURED_PER_MEDICAL_KIT),
            ambulances: injured.div_ceil(INJURED_PER_AMBULANCE),
            toilets: population.div_ceil(self.people_per_toilet.max(1)),
            power_units: population.div_ceil(self.people_per_power_unit.max(1)),
            blankets: population.saturating_mul(self.blankets_per_person),
            volunteers: self.volunteers(population, injured, ctx.severity),
        }
    }

    fn volunteers(&self, population: u64, injured: u64, severity: Severity) -> u64 {
        let base = population
            .div_ceil(self.people_per_volunteer.max(1))
            .saturating_add(injured.div_ceil(self.injured_per_volunteer.max(1)));
        let surge = match severity {
            Severity::High => self.high_severity_surge_pct,
            Severity::Critical => self.critical_severity_surge_pct,
            Severity::Low | Severity::Moderate | Severity::Unknown => 0,
        };
        base.saturating_mul(100 + surge).div_ceil(100)
    }
}

#[cfg(test)]
#[path = "requirements_tests.rs"]
mod requirements_tests;
