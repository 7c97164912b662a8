#[inline]
pub fn floor_to_int(value: f32) -> i32 {
    value.floor() as i32
}

/// Checks whether any bit of `flag` is set in `mask`.
#[inline]
pub fn is_flag_set(mask: i32, flag: i32) -> bool {
    (mask & flag) != 0
}
