//! Heat-tier classification and the choropleth palette.

use grievance_map_models::HeatTier;

/// Classifies a complaint count against the maximum count in the current
/// result set.
///
/// The maximum is clamped to at least 1 so an all-zero result set still
/// classifies cleanly. A zero count is always [`HeatTier::None`]
/// regardless of the maximum; non-zero counts bucket by quartile of
/// `count / max`.
#[must_use]
pub fn classify(count: u64, max_count: u64) -> HeatTier {
    if count == 0 {
        return HeatTier::None;
    }

    #[allow(clippy::cast_precision_loss)]
    let percentage = count as f64 / max_count.max(1) as f64 * 100.0;

    if percentage <= 25.0 {
        HeatTier::Low
    } else if percentage <= 50.0 {
        HeatTier::Medium
    } else if percentage <= 75.0 {
        HeatTier::High
    } else {
        HeatTier::VeryHigh
    }
}

/// Fill color for a heat tier.
///
/// The ramp darkens monotonically with density. [`HeatTier::None`] is a
/// neutral gray outside the yellow-red ramp so zero-complaint areas read
/// as a baseline rather than as "very low".
#[must_use]
pub const fn tier_color(tier: HeatTier) -> &'static str {
    match tier {
        HeatTier::None => "#d9d9d9",
        HeatTier::Low => "#ffffb2",
        HeatTier::Medium => "#fecc5c",
        HeatTier::High => "#fd8d3c",
        HeatTier::VeryHigh => "#e31a1c",
    }
}
