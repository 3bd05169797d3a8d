// src/math.rs
//! Wide integer helpers for fixed-point token math

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two u128 values as `(high, low)`
pub fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a_lo, a_hi) = (a & LOW_MASK, a >> 64);
    let (b_lo, b_hi) = (b & LOW_MASK, b >> 64);

    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;

    let mid = (lo_lo >> 64) + (lo_hi & LOW_MASK) + (hi_lo & LOW_MASK);
    let low = (lo_lo & LOW_MASK) | ((mid & LOW_MASK) << 64);
    let high = hi_hi + (lo_hi >> 64) + (hi_lo >> 64) + (mid >> 64);
    (high, low)
}

/// `floor(a * b / divisor)` without intermediate overflow.
///
/// Returns `None` when `divisor` is zero or the quotient does not fit in u128.
pub fn mul_div_floor(a: u128, b: u128, divisor: u128) -> Option<u128> {
    if divisor == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / divisor);
    }

    let (high, low) = widening_mul(a, b);
    if high >= divisor {
        return None;
    }

    // restoring long division of (high:low) by divisor, high < divisor
    let mut remainder = high;
    let mut quotient = 0u128;
    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((low >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || remainder >= divisor {
            remainder = remainder.wrapping_sub(divisor);
            quotient |= 1;
        }
    }
    Some(quotient)
}

/// `(a * b) >> 128`, the integer part of a Q128 product
pub fn mul_shr_128(a: u128, b: u128) -> u128 {
    widening_mul(a, b).0
}
