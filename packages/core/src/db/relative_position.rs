use thiserror::Error;

/// Lower bound of the position space.
pub const MIN_POSITION: i64 = 0;

/// Upper bound of the position space (largest signed 32-bit value).
pub const MAX_POSITION: i64 = i32::MAX as i64;

/// Position assigned to the first record placed in an empty scope.
pub const START_POSITION: i64 = MAX_POSITION / 2;

/// Preferred spacing around a fresh insertion, so nearby follow-up
/// insertions do not immediately force a midpoint split.
pub const DISTANCE: i64 = 500;

/// Errors from position arithmetic
#[derive(Error, Debug)]
pub enum PositionError {
    /// No integer exists strictly between the two bounds
    #[error("No integer position fits between {pos_before} and {pos_after}")]
    ExhaustedGap { pos_before: i64, pos_after: i64 },

    /// A position is outside `[MIN_POSITION, MAX_POSITION]`
    #[error("Position {position} is outside the representable range")]
    OutOfRange { position: i64 },
}

/// Calculate an integer position strictly between two bounds.
///
/// A missing bound defaults to `MIN_POSITION` / `MAX_POSITION`. The bounds
/// are semantic roles rather than a numerically ordered pair; collision
/// handling can pass them inverted, so they are normalized first.
///
/// When the gap is wide enough, appending (`pos_after == MAX_POSITION`) and
/// prepending (`pos_before == MIN_POSITION`) step by `DISTANCE` instead of
/// bisecting toward the sentinel bound; everything else takes the floor
/// midpoint.
///
/// # Errors
///
/// Returns `ExhaustedGap` when the normalized bounds are 1 or less apart,
/// and `OutOfRange` when a bound falls outside the position space.
///
/// # Examples
///
/// ```
/// use worklist_core::db::{position_between, DISTANCE, START_POSITION};
///
/// // Appending after the current maximum advances by a fixed step
/// let appended = position_between(Some(START_POSITION), None).unwrap();
/// assert_eq!(appended, START_POSITION + DISTANCE);
///
/// // Inserting between close neighbours bisects
/// let between = position_between(Some(100), Some(200)).unwrap();
/// assert_eq!(between, 150);
/// ```
pub fn position_between(
    pos_before: Option<i64>,
    pos_after: Option<i64>,
) -> Result<i64, PositionError> {
    let pos_before = pos_before.unwrap_or(MIN_POSITION);
    let pos_after = pos_after.unwrap_or(MAX_POSITION);

    for position in [pos_before, pos_after] {
        if !(MIN_POSITION..=MAX_POSITION).contains(&position) {
            return Err(PositionError::OutOfRange { position });
        }
    }

    let (pos_before, pos_after) = if pos_before <= pos_after {
        (pos_before, pos_after)
    } else {
        (pos_after, pos_before)
    };

    if pos_after - pos_before <= 1 {
        return Err(PositionError::ExhaustedGap {
            pos_before,
            pos_after,
        });
    }

    let position = if pos_after - pos_before < DISTANCE * 2 {
        // Tight space: no room to preserve full spacing, just bisect
        (pos_after + pos_before) / 2
    } else if pos_before == MIN_POSITION {
        pos_after - DISTANCE
    } else if pos_after == MAX_POSITION {
        pos_before + DISTANCE
    } else {
        (pos_after + pos_before) / 2
    };

    Ok(position)
}
