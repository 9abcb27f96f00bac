//! Integer fixed-point helpers.
//!
//! Every division truncates toward zero. Callers that distribute value rely
//! on this: a truncated result never pays out more than was earned.

/// 1.0 in 18-decimal fixed point.
pub const WAD: i128 = 1_000_000_000_000_000_000;

/// Computes `floor(a * b / d)` for non-negative operands without overflowing
/// on the intermediate product when the result itself fits.
///
/// Returns `None` on a negative operand, a non-positive divisor, or when the
/// result cannot be represented.
pub fn mul_div_floor(a: i128, b: i128, d: i128) -> Option<i128> {
    if a < 0 || b < 0 || d <= 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / d);
    }

    // a = q*d + r  =>  a*b/d = q*b + r*b/d, with r < d.
    let q = a / d;
    let r = a % d;
    let whole = q.checked_mul(b)?;
    let frac = match r.checked_mul(b) {
        Some(p) => p / d,
        // Split on b as well: r*b/d = r*(qb*d + rb)/d = r*qb + r*rb/d.
        None => {
            let qb = b / d;
            let rb = b % d;
            r.checked_mul(qb)?.checked_add(r.checked_mul(rb)? / d)?
        }
    };
    whole.checked_add(frac)
}

/// `floor(a * b / WAD)`.
pub fn wad_mul(a: i128, b: i128) -> Option<i128> {
    mul_div_floor(a, b, WAD)
}
