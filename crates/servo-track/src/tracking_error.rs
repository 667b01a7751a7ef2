/// Horizontal tracking error: `center_x - reference_x`, clamped to
/// `[-max_error_range, max_error_range]`.
///
/// The difference is taken in 64-bit so extreme inputs cannot overflow.
pub fn compute_tracking_error(center_x: i32, reference_x: i32, max_error_range: u16) -> i32 {
    let limit = i64::from(max_error_range);
    (i64::from(center_x) - i64::from(reference_x)).clamp(-limit, limit) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_offset_from_reference() {
        assert_eq!(compute_tracking_error(35, 160, 200), -125);
        assert_eq!(compute_tracking_error(170, 160, 100), 10);
        assert_eq!(compute_tracking_error(160, 160, 100), 0);
    }

    #[test]
    fn error_is_clamped_symmetrically() {
        assert_eq!(compute_tracking_error(35, 160, 100), -100);
        assert_eq!(compute_tracking_error(400, 160, 100), 100);
    }

    #[test]
    fn extreme_inputs_stay_in_range() {
        for (c, r) in [
            (i32::MAX, i32::MIN),
            (i32::MIN, i32::MAX),
            (i32::MIN, 0),
            (0, i32::MIN),
        ] {
            for range in [0u16, 1, 100, i16::MAX as u16, u16::MAX] {
                let e = compute_tracking_error(c, r, range);
                assert!(e.abs() <= i32::from(range), "{c} {r} {range} -> {e}");
            }
        }
    }
}
