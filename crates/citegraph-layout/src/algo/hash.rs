/// Stable unit-interval value for an identifier.
///
/// Accumulates `h = h * 31 + unit` over the UTF-16 code units of `id` with 32-bit signed
/// wrap-around, then maps `|h| mod 1000` onto `[0, 1)` in steps of 1/1000. Results are
/// bit-identical across platforms and match other front ends laying out the same graph.
pub fn unit_hash(id: &str) -> f64 {
    let mut h: i32 = 0;
    for unit in id.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    // `i32::MIN.abs()` overflows; widen first.
    let folded = i64::from(h).abs() % 1000;
    folded as f64 / 1000.0
}

/// Unit vector in the stacking/jitter plane derived from an identifier pair. Used when two
/// overlapping nodes share the same (y, z) and no displacement direction exists.
pub fn pair_direction(a: &str, b: &str) -> nalgebra::Vector2<f64> {
    let angle = unit_hash(&format!("{a}:{b}")) * std::f64::consts::TAU;
    nalgebra::Vector2::new(angle.cos(), angle.sin())
}
