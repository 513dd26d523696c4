//! Stat-driven cooldown and duration scaling.
//!
//! Ability tiers encode times as `"<number><unit>"` (`"30s"`, `"0.5s"`,
//! `"10m"`). MEM shortens cooldowns and INT lengthens durations. Both curves
//! approach their cap without reaching it. Values without a numeric prefix
//! (`"Instant"`, `"Toggle"`, `"Passive"`) are left alone.

use crate::character::{Attribute, Attributes};
use crate::registry::AbilityTier;
use crate::rules::ProgressionRules;

/// Durations that do not exist and therefore cannot be extended.
const UNSCALED_DURATIONS: [&str; 2] = ["Instant", "Toggle"];

/// A parsed `"<number><unit>"` value.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeValue<'a> {
    pub amount: f64,
    pub unit: &'a str,
}

/// Split a time string into its leading number and the remaining unit.
///
/// Returns `None` when the string does not start with a number.
pub fn parse_time_value(text: &str) -> Option<TimeValue<'_>> {
    let trimmed = text.trim_start();
    let mut seen_dot = false;
    let end = trimmed
        .char_indices()
        .find(|(_, c)| match c {
            '0'..='9' => false,
            '.' if !seen_dot => {
                seen_dot = true;
                false
            }
            _ => true,
        })
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    let (number, unit) = trimmed.split_at(end);
    if !number.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let amount = number.parse::<f64>().ok()?;
    Some(TimeValue { amount, unit })
}

/// Round to one decimal place, dropping a trailing `.0`.
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

fn scale(text: &str, factor: f64) -> String {
    match parse_time_value(text) {
        Some(value) => format!("{}{}", format_amount(value.amount * factor), value.unit),
        None => text.to_string(),
    }
}

/// Cooldown and duration of one tier after stat scaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledTier {
    pub cooldown: Option<String>,
    pub duration: Option<String>,
}

impl ProgressionRules {
    /// Fraction removed from cooldowns, in `[0, cooldown_cap)`.
    pub fn cooldown_reduction(&self, mem: u32) -> f64 {
        let mem = f64::from(mem);
        self.cooldown_cap * mem / (mem + self.cooldown_half)
    }

    /// Shorten a cooldown string by the MEM reduction.
    pub fn apply_cooldown_reduction(&self, cooldown: &str, mem: u32) -> String {
        scale(cooldown, 1.0 - self.cooldown_reduction(mem))
    }

    /// Fraction added to durations, in `[0, duration_cap)`.
    pub fn duration_extension(&self, int: u32) -> f64 {
        let int = f64::from(int);
        self.duration_cap * int / (int + self.duration_half)
    }

    /// Lengthen a duration string by the INT extension.
    ///
    /// `"Instant"` and `"Toggle"` stay as they are.
    pub fn apply_duration_extension(&self, duration: &str, int: u32) -> String {
        let trimmed = duration.trim();
        if UNSCALED_DURATIONS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(trimmed))
        {
            return duration.to_string();
        }
        scale(duration, 1.0 + self.duration_extension(int))
    }

    /// Scale a tier's cooldown and duration with the given attributes.
    pub fn scale_tier(&self, tier: &AbilityTier, attributes: &Attributes) -> ScaledTier {
        ScaledTier {
            cooldown: tier.cooldown.as_deref().map(|c| {
                self.apply_cooldown_reduction(c, attributes.get(Attribute::Memory))
            }),
            duration: tier.duration.as_deref().map(|d| {
                self.apply_duration_extension(d, attributes.get(Attribute::Intelligence))
            }),
        }
    }
}
