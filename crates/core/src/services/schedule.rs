//! Schedule-slot allocator.
//!
//! Pure logic over a trip day: at most [`MAX_ACTIVITIES_PER_DAY`] scheduled
//! items, day indexes 1..=10, and the six fixed time-of-day buckets that a
//! clock time must agree with.

use chrono::{NaiveTime, Timelike};
use tripcrew_common::{AppError, AppResult};
use tripcrew_db::entities::activity::TimeSlot;

/// Maximum number of scheduled activities per trip day.
pub const MAX_ACTIVITIES_PER_DAY: u64 = 10;

/// Smallest valid schedule day index.
pub const MIN_DAY_INDEX: i32 = 1;

/// Largest valid schedule day index.
pub const MAX_DAY_INDEX: i32 = 10;

/// Map a clock time to its time-of-day bucket.
///
/// Total over the 24h clock: [06,11) morning, [11,13) lunch, [13,17)
/// afternoon, [17,19) dinner, [19,23) evening, everything else late night.
#[must_use]
pub fn time_slot_from_clock(time: NaiveTime) -> TimeSlot {
    match time.hour() {
        6..=10 => TimeSlot::Morning,
        11 | 12 => TimeSlot::Lunch,
        13..=16 => TimeSlot::Afternoon,
        17 | 18 => TimeSlot::Dinner,
        19..=22 => TimeSlot::Evening,
        _ => TimeSlot::LateNight,
    }
}

/// Validate a (start, end, bucket) combination.
///
/// Fails if end is not after start (when both given), or if a bucket is
/// given alongside a start time that falls into a different bucket.
pub fn validate_time_logic(
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    slot: Option<TimeSlot>,
) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start, end)
        && end <= start
    {
        return Err(AppError::BadRequest(
            "End time must be after start time".to_string(),
        ));
    }

    if let (Some(start), Some(slot)) = (start, slot)
        && time_slot_from_clock(start) != slot
    {
        return Err(AppError::BadRequest(format!(
            "Start time {start} does not fall into the {slot:?} slot"
        )));
    }

    Ok(())
}

/// Validate that a day index is within 1..=10.
pub fn ensure_day_index_in_range(day_index: i32) -> AppResult<()> {
    if (MIN_DAY_INDEX..=MAX_DAY_INDEX).contains(&day_index) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Day index must be between {MIN_DAY_INDEX} and {MAX_DAY_INDEX}, got {day_index}"
        )))
    }
}

/// The free day indexes given the ones already taken.
#[must_use]
pub fn available_day_indexes(occupied: &[i32]) -> Vec<i32> {
    (MIN_DAY_INDEX..=MAX_DAY_INDEX)
        .filter(|idx| !occupied.contains(idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_slot_partition_boundaries() {
        assert_eq!(time_slot_from_clock(t(6, 0)), TimeSlot::Morning);
        assert_eq!(time_slot_from_clock(t(10, 59)), TimeSlot::Morning);
        assert_eq!(time_slot_from_clock(t(11, 0)), TimeSlot::Lunch);
        assert_eq!(time_slot_from_clock(t(12, 59)), TimeSlot::Lunch);
        assert_eq!(time_slot_from_clock(t(13, 0)), TimeSlot::Afternoon);
        assert_eq!(time_slot_from_clock(t(16, 59)), TimeSlot::Afternoon);
        assert_eq!(time_slot_from_clock(t(17, 0)), TimeSlot::Dinner);
        assert_eq!(time_slot_from_clock(t(18, 59)), TimeSlot::Dinner);
        assert_eq!(time_slot_from_clock(t(19, 0)), TimeSlot::Evening);
        assert_eq!(time_slot_from_clock(t(22, 59)), TimeSlot::Evening);
        assert_eq!(time_slot_from_clock(t(23, 0)), TimeSlot::LateNight);
        assert_eq!(time_slot_from_clock(t(0, 0)), TimeSlot::LateNight);
        assert_eq!(time_slot_from_clock(t(5, 59)), TimeSlot::LateNight);
    }

    #[test]
    fn test_partition_is_total() {
        // Every hour of the day maps to exactly one bucket.
        for hour in 0..24 {
            let _ = time_slot_from_clock(t(hour, 30));
        }
    }

    #[test]
    fn test_validate_time_logic_ordering() {
        assert!(validate_time_logic(Some(t(9, 0)), Some(t(10, 0)), None).is_ok());
        assert!(validate_time_logic(Some(t(10, 0)), Some(t(10, 0)), None).is_err());
        assert!(validate_time_logic(Some(t(10, 0)), Some(t(9, 0)), None).is_err());
        // Missing sides are fine
        assert!(validate_time_logic(None, Some(t(9, 0)), None).is_ok());
        assert!(validate_time_logic(Some(t(9, 0)), None, None).is_ok());
        assert!(validate_time_logic(None, None, None).is_ok());
    }

    #[test]
    fn test_validate_time_logic_slot_mismatch() {
        assert!(validate_time_logic(Some(t(9, 0)), None, Some(TimeSlot::Morning)).is_ok());
        assert!(validate_time_logic(Some(t(9, 0)), None, Some(TimeSlot::Dinner)).is_err());
        // Slot without start time is not checked against the clock
        assert!(validate_time_logic(None, None, Some(TimeSlot::Dinner)).is_ok());
    }

    #[test]
    fn test_available_day_indexes() {
        assert_eq!(available_day_indexes(&[]).len(), 10);
        assert_eq!(available_day_indexes(&[1, 2, 3]), vec![4, 5, 6, 7, 8, 9, 10]);
        assert!(available_day_indexes(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).is_empty());
    }

    #[test]
    fn test_day_index_range() {
        assert!(ensure_day_index_in_range(1).is_ok());
        assert!(ensure_day_index_in_range(10).is_ok());
        assert!(ensure_day_index_in_range(0).is_err());
        assert!(ensure_day_index_in_range(11).is_err());
    }
}
