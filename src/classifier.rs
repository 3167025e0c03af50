use crate::domain::StatusTier;
use crate::ranges::ParameterRange;

/// Fraction of the `[min, max]` span tolerated outside the domain before a
/// value is considered dangerous.
pub const CAUTION_TOLERANCE: f64 = 0.1;

/// Classify a value against its range.
///
/// Total over every `f64`: a missing range yields [`StatusTier::Unknown`], a
/// non-finite value with a range yields [`StatusTier::Danger`].
pub fn classify(value: f64, range: Option<&ParameterRange>) -> StatusTier {
    let Some(range) = range else {
        return StatusTier::Unknown;
    };

    if range.is_optimal(value) {
        return StatusTier::Optimal;
    }

    if range.contains(value) {
        return StatusTier::Acceptable;
    }

    let tolerance = (range.max - range.min) * CAUTION_TOLERANCE;
    if value >= range.min - tolerance && value <= range.max + tolerance {
        return StatusTier::Caution;
    }

    StatusTier::Danger
}

/// Whether the value lies inside `[min, max]`. Values without a range entry
/// count as in range, since there is nothing to compare against.
pub fn is_within_range(value: f64, range: Option<&ParameterRange>) -> bool {
    range.map_or(true, |range| range.contains(value))
}
