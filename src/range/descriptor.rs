//! Range descriptor algebra
//!
//! A [`RangeDescriptor`] is a `(start, stop, step)` triple with the same
//! addressing rules as a stepped half-open slice. The functions here resolve
//! descriptors against a length, count and probe the selected indices, and
//! fold a chain of descriptors into a single equivalent one.

use std::fmt;
use std::str::FromStr;

use crate::errors::{
    OutOfRangeReason, Result, generic_error, index_out_of_range_error, invalid_step_error,
};

/// Length used for sequences that never run out in practice
pub const EFFECTIVELY_UNBOUNDED: i64 = 1 << 48;

/// A stepped sub-selection of an ordered sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeDescriptor {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: i64,
}

impl RangeDescriptor {
    pub const fn new(start: Option<i64>, stop: Option<i64>, step: i64) -> Self {
        RangeDescriptor { start, stop, step }
    }

    /// Every element, front to back
    pub const fn full() -> Self {
        RangeDescriptor::new(None, None, 1)
    }

    /// Every element, back to front
    pub const fn reversed() -> Self {
        RangeDescriptor::new(None, None, -1)
    }

    /// The canonical empty selection
    pub const fn empty(step: i64) -> Self {
        RangeDescriptor::new(Some(0), Some(0), step)
    }

    /// `start..stop` with a unit step
    pub const fn span(start: i64, stop: i64) -> Self {
        RangeDescriptor::new(Some(start), Some(stop), 1)
    }

    /// `start..` with a unit step
    pub const fn from_start(start: i64) -> Self {
        RangeDescriptor::new(Some(start), None, 1)
    }
}

impl Default for RangeDescriptor {
    fn default() -> Self {
        RangeDescriptor::full()
    }
}

impl fmt::Display for RangeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |value: Option<i64>| value.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}:{}:{}", bound(self.start), bound(self.stop), self.step)
    }
}

impl FromStr for RangeDescriptor {
    type Err = crate::errors::Error;

    /// Parses slice notation: `start:stop:step`, `start:stop`, `start:` or a
    /// lone `start`. Empty fields fall back to their defaults.
    fn from_str(s: &str) -> Result<Self> {
        let parse_bound = |field: &str| -> Result<Option<i64>> {
            let field = field.trim();
            if field.is_empty() {
                return Ok(None);
            }
            field
                .parse::<i64>()
                .map(Some)
                .map_err(|e| generic_error(&format!("Invalid range bound '{field}': {e}")))
        };

        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() > 3 {
            return Err(generic_error(&format!(
                "Invalid range '{s}': expected start:stop:step"
            )));
        }

        let start = parse_bound(fields[0])?;
        let stop = match fields.get(1) {
            Some(field) => parse_bound(field)?,
            None => None,
        };
        let step = match fields.get(2) {
            Some(field) => parse_bound(field)?.unwrap_or(1),
            None => 1,
        };
        if step == 0 {
            return Err(invalid_step_error());
        }

        Ok(RangeDescriptor::new(start, stop, step))
    }
}

/// Concrete bounds of a descriptor against a known length: the first index
/// visited and the exclusive stop, which is `-1` when a descending range runs
/// down through index 0.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    start: i64,
    stop: i64,
    step: i64,
}

impl Bounds {
    fn count(&self) -> i64 {
        let (start, stop, step) = (
            i128::from(self.start),
            i128::from(self.stop),
            i128::from(self.step),
        );
        let count = if step > 0 {
            if stop > start {
                (stop - start - 1) / step + 1
            } else {
                0
            }
        } else if start > stop {
            (start - stop - 1) / -step + 1
        } else {
            0
        };
        count as i64
    }
}

fn resolve(desc: &RangeDescriptor, length: i64) -> Result<Bounds> {
    if desc.step == 0 {
        return Err(invalid_step_error());
    }

    let length = length.max(0);
    let descending = desc.step < 0;
    let (lower, upper) = if descending {
        (-1, length - 1)
    } else {
        (0, length)
    };

    let clamp = |value: Option<i64>, default: i64| match value {
        None => default,
        Some(v) if v < 0 => v.saturating_add(length).max(lower),
        Some(v) => v.min(upper),
    };

    let (default_start, default_stop) = if descending {
        (upper, lower)
    } else {
        (lower, upper)
    };

    Ok(Bounds {
        start: clamp(desc.start, default_start),
        stop: clamp(desc.stop, default_stop),
        step: desc.step,
    })
}

/// Builds the canonical descriptor for the progression `first, first + step, ...`
/// of `count` elements inside a sequence of `length`.
fn from_progression(
    first: i64,
    step: i64,
    count: i64,
    length: i64,
    allow_open_stop: bool,
) -> RangeDescriptor {
    if count <= 0 {
        return RangeDescriptor::empty(step);
    }

    let last = first + (count - 1) * step;
    if step > 0 {
        return RangeDescriptor::new(Some(first), Some(last + 1), step);
    }

    let stop = last - 1;
    if stop >= 0 {
        RangeDescriptor::new(Some(first), Some(stop), step)
    } else if allow_open_stop {
        RangeDescriptor::new(Some(first), None, step)
    } else {
        RangeDescriptor::new(Some(first), Some(-length - 1), step)
    }
}

/// Resolves `None`, negative and out-of-range bounds of `desc` against `length`.
///
/// The result selects exactly the same indices as `desc`. A selection of zero
/// elements collapses to `(0, 0, step)`. A descending range that runs down
/// through index 0 keeps an open stop when `allow_open_stop` is set, and is
/// clamped to `-length - 1` otherwise.
///
/// # Errors
/// * `InvalidStep` if the step is zero
pub fn normalize(desc: &RangeDescriptor, length: i64, allow_open_stop: bool) -> Result<RangeDescriptor> {
    let bounds = resolve(desc, length)?;
    Ok(from_progression(
        bounds.start,
        bounds.step,
        bounds.count(),
        length.max(0),
        allow_open_stop,
    ))
}

/// Number of indices `desc` selects from a sequence of `length`
pub fn count(desc: &RangeDescriptor, length: i64) -> Result<i64> {
    Ok(resolve(desc, length)?.count())
}

/// Whether iterating `desc` over a sequence of `length` visits `raw_index`.
///
/// A negative `raw_index` is first read as `raw_index + length`.
pub fn contains(raw_index: i64, desc: &RangeDescriptor, length: i64) -> Result<bool> {
    let bounds = resolve(desc, length)?;
    let length = length.max(0);
    let raw_index = if raw_index < 0 {
        raw_index.saturating_add(length)
    } else {
        raw_index
    };
    if raw_index < 0 || raw_index >= length {
        return Ok(false);
    }

    let offset = raw_index - bounds.start;
    if offset % bounds.step != 0 {
        return Ok(false);
    }
    let position = offset / bounds.step;
    Ok(position >= 0 && position < bounds.count())
}

/// Maps a position within the selection to an index of the underlying sequence.
///
/// A negative `position` counts from the end of the selection.
///
/// # Errors
/// * `InvalidStep` if the step is zero
/// * `IndexOutOfRange` if the position does not name a selected element
pub fn to_raw_index(position: i64, desc: &RangeDescriptor, length: i64) -> Result<i64> {
    let bounds = resolve(desc, length)?;
    let selected = bounds.count();
    let resolved = if position < 0 {
        position.saturating_add(selected)
    } else {
        position
    };
    if resolved < 0 || resolved >= selected {
        return Err(index_out_of_range_error(
            position,
            selected,
            OutOfRangeReason::NotAMember,
        ));
    }
    Ok(bounds.start + resolved * bounds.step)
}

/// Folds a chain of descriptors into one.
///
/// Each descriptor is applied to the output of the previous one, resolved
/// against the number of elements that output holds. Applying the result to
/// a sequence of `length` selects the same elements in the same order as
/// applying the chain.
///
/// # Errors
/// * `InvalidStep` if any descriptor has a zero step
pub fn compose(descs: &[RangeDescriptor], length: i64) -> Result<RangeDescriptor> {
    let length = length.max(0);
    let (mut first, mut step, mut selected) = (0_i64, 1_i64, length);

    for desc in descs {
        let bounds = resolve(desc, selected)?;
        let next = bounds.count();
        if next > 0 {
            first += bounds.start * step;
        }
        // With fewer than two elements the magnitude of the step is irrelevant.
        step = step
            .checked_mul(bounds.step)
            .unwrap_or(step.signum() * bounds.step.signum());
        selected = next;
    }

    Ok(from_progression(first, step, selected, length, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_empty_selection() {
        let desc = RangeDescriptor::new(Some(4), Some(1), 1);
        assert_eq!(normalize(&desc, 10, false).unwrap(), RangeDescriptor::empty(1));

        let desc = RangeDescriptor::new(Some(3), Some(3), -2);
        assert_eq!(normalize(&desc, 10, true).unwrap(), RangeDescriptor::empty(-2));
    }

    #[test]
    fn test_normalize_descending_stop() {
        let desc = RangeDescriptor::reversed();
        assert_eq!(
            normalize(&desc, 5, true).unwrap(),
            RangeDescriptor::new(Some(4), None, -1)
        );
        assert_eq!(
            normalize(&desc, 5, false).unwrap(),
            RangeDescriptor::new(Some(4), Some(-6), -1)
        );
    }

    #[test]
    fn test_normalize_clamps_negative_and_oversized_bounds() {
        let desc = RangeDescriptor::new(Some(-3), Some(100), 1);
        assert_eq!(
            normalize(&desc, 10, false).unwrap(),
            RangeDescriptor::new(Some(7), Some(10), 1)
        );
    }

    #[test]
    fn test_zero_step_is_rejected() {
        let desc = RangeDescriptor::new(None, None, 0);
        assert!(matches!(normalize(&desc, 3, true), Err(crate::errors::Error::InvalidStep)));
        assert!(matches!(count(&desc, 3), Err(crate::errors::Error::InvalidStep)));
        assert!(matches!(compose(&[desc], 3), Err(crate::errors::Error::InvalidStep)));
    }

    #[test]
    fn test_to_raw_index_counts_from_selection_end() {
        let desc = RangeDescriptor::new(Some(1), None, 3);
        // selects 1, 4, 7
        assert_eq!(to_raw_index(0, &desc, 9).unwrap(), 1);
        assert_eq!(to_raw_index(-1, &desc, 9).unwrap(), 7);
        assert!(to_raw_index(3, &desc, 9).is_err());
        assert!(to_raw_index(-4, &desc, 9).is_err());
    }

    #[test]
    fn test_contains_reads_negative_index_from_end() {
        let desc = RangeDescriptor::new(None, None, 2);
        assert!(contains(-1, &desc, 5).unwrap());
        assert!(!contains(-2, &desc, 5).unwrap());
        assert!(!contains(5, &desc, 5).unwrap());
    }

    #[test]
    fn test_compose_with_empty_is_empty() {
        let descs = [RangeDescriptor::span(2, 2), RangeDescriptor::reversed()];
        assert_eq!(count(&compose(&descs, 10).unwrap(), 10).unwrap(), 0);
    }

    #[test]
    fn test_parse_slice_notation() {
        assert_eq!(
            "1:5".parse::<RangeDescriptor>().unwrap(),
            RangeDescriptor::span(1, 5)
        );
        assert_eq!(
            "::-1".parse::<RangeDescriptor>().unwrap(),
            RangeDescriptor::reversed()
        );
        assert_eq!(
            "3".parse::<RangeDescriptor>().unwrap(),
            RangeDescriptor::from_start(3)
        );
        assert!("1:2:0".parse::<RangeDescriptor>().is_err());
        assert!("a:b".parse::<RangeDescriptor>().is_err());
        assert_eq!(RangeDescriptor::new(Some(2), None, -1).to_string(), "2::-1");
    }
}
