//! Risk score calculator.
//!
//! The score is a sum of bounded, integer components:
//!
//! ```text
//! supply     = (24 - min(hours, 24)) * supply_weight / 24
//! injured    = min(injured, injured_cap) * injured_weight / injured_cap
//! population = min(population, population_cap) * population_weight / population_cap
//! severity   = fixed points per severity bucket
//! score      = min(supply + injured + population + severity, 100)
//! ```
//!
//! Each component is monotone in its input, so the score never rises when the
//! supply window grows and never falls when injured or population grow.

use serde::{Deserialize, Serialize};

use super::CampContext;
use crate::engine::urgency::SAFE_SUPPLY_WINDOW_HOURS;
use crate::models::Severity;

pub const MAX_RISK_SCORE: u8 = 100;

/// Weighting table for the risk components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub supply_weight: u64,
    pub injured_weight: u64,
    pub injured_cap: u64,
    pub population_weight: u64,
    pub population_cap: u64,
    pub severity_low: u64,
    pub severity_moderate: u64,
    pub severity_unknown: u64,
    pub severity_high: u64,
    pub severity_critical: u64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            supply_weight: 40,
            injured_weight: 30,
            injured_cap: 200,
            population_weight: 20,
            population_cap: 5000,
            severity_low: 0,
            severity_moderate: 3,
            severity_unknown: 5,
            severity_high: 7,
            severity_critical: 10,
        }
    }
}

impl RiskWeights {
    pub fn validate(&self) -> Result<(), String> {
        if self.injured_cap == 0 {
            return Err("risk.injured_cap must be at least 1".to_string());
        }
        if self.population_cap == 0 {
            return Err("risk.population_cap must be at least 1".to_string());
        }
        Ok(())
    }

    /// Integer risk score in `[0, 100]`.
    pub fn score(&self, ctx: &CampContext) -> u8 {
        let window = u64::from(SAFE_SUPPLY_WINDOW_HOURS);
        let hours = u64::from(ctx.urgency.supply_window_hours).min(window);
        let supply = (window - hours).saturating_mul(self.supply_weight) / window;

        let injured_cap = self.injured_cap.max(1);
        let injured = ctx.injured.min(injured_cap).saturating_mul(self.injured_weight) / injured_cap;

        let population_cap = self.population_cap.max(1);
        let population = ctx
            .population
            .min(population_cap)
            .saturating_mul(self.population_weight)
            / population_cap;

        let total = supply
            .saturating_add(injured)
            .saturating_add(population)
            .saturating_add(self.severity_points(ctx.severity));

        total.min(u64::from(MAX_RISK_SCORE)) as u8
    }

    fn severity_points(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Low => self.severity_low,
            Severity::Moderate => self.severity_moderate,
            Severity::Unknown => self.severity_unknown,
            Severity::High => self.severity_high,
            Severity::Critical => self.severity_critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::urgency::evaluate_urgency;
    use proptest::prelude::*;

    fn ctx(population: u64, injured: u64, urgency: &str, severity: Severity) -> CampContext {
        CampContext {
            population,
            injured,
            severity,
            urgency: evaluate_urgency(Some(urgency)),
        }
    }

    #[test]
    fn test_reference_camp_score() {
        // supply 40 + injured 1 (10*30/200) + population 0 (100*20/5000) + unknown severity 5
        let score = RiskWeights::default().score(&ctx(100, 10, "Immediate", Severity::Unknown));
        assert_eq!(score, 46);
    }

    #[test]
    fn test_quiet_camp_is_low() {
        let score = RiskWeights::default().score(&ctx(0, 0, "24 Hours", Severity::Low));
        assert_eq!(score, 0);
    }

    #[test]
    fn test_worst_case_hits_ceiling() {
        let score = RiskWeights::default().score(&ctx(1_000_000, 10_000, "Immediate", Severity::Critical));
        assert_eq!(score, MAX_RISK_SCORE);
    }

    #[test]
    fn test_oversized_weights_are_clamped() {
        let weights = RiskWeights {
            supply_weight: 500,
            ..Default::default()
        };
        let score = weights.score(&ctx(10, 0, "Immediate", Severity::Low));
        assert_eq!(score, 100);
    }

    #[test]
    fn test_supply_window_ordering() {
        let weights = RiskWeights::default();
        let immediate = weights.score(&ctx(500, 20, "Immediate", Severity::High));
        let six = weights.score(&ctx(500, 20, "6 Hours", Severity::High));
        let twelve = weights.score(&ctx(500, 20, "12 Hours", Severity::High));
        let day = weights.score(&ctx(500, 20, "24 Hours", Severity::High));
        assert!(immediate > six);
        assert!(six > twelve);
        assert!(twelve > day);
    }

    fn ctx_hours(population: u64, injured: u64, hours: u32) -> CampContext {
        let mut c = ctx(population, injured, "24 Hours", Severity::Moderate);
        c.urgency.supply_window_hours = hours;
        c
    }

    proptest! {
        #[test]
        fn prop_score_in_range(population in any::<u64>(), injured in any::<u64>(), hours in 0u32..1000) {
            let score = RiskWeights::default().score(&ctx_hours(population, injured, hours));
            prop_assert!(score <= MAX_RISK_SCORE);
        }

        #[test]
        fn prop_non_increasing_in_hours(
            population in 0u64..20_000,
            injured in 0u64..1_000,
            hours in 0u32..48,
            extra in 0u32..48,
        ) {
            let weights = RiskWeights::default();
            let shorter = weights.score(&ctx_hours(population, injured, hours));
            let longer = weights.score(&ctx_hours(population, injured, hours + extra));
            prop_assert!(longer <= shorter);
        }

        #[test]
        fn prop_non_decreasing_in_injured_and_population(
            population in 0u64..20_000,
            injured in 0u64..1_000,
            extra_population in 0u64..5_000,
            extra_injured in 0u64..500,
            hours in 0u32..24,
        ) {
            let weights = RiskWeights::default();
            let base = weights.score(&ctx_hours(population, injured, hours));
            let more_injured = weights.score(&ctx_hours(population, injured + extra_injured, hours));
            let more_people = weights.score(&ctx_hours(population + extra_population, injured, hours));
            prop_assert!(more_injured >= base);
            prop_assert!(more_people >= base);
        }
    }
}
