//! Lag-shifted alignment of two series

use crate::error::{ForecastError, Result};

/// Trim two series to their common overlap under a signed lag.
///
/// A positive lag pairs `a[i + lag]` with `b[i]`; a negative lag pairs
/// `a[i]` with `b[i - lag]`. Both outputs are then cut to the shorter
/// length, so they are always equally long and never empty.
pub fn align<'a>(a: &'a [f64], b: &'a [f64], lag: i64) -> Result<(&'a [f64], &'a [f64])> {
    let shift = lag.unsigned_abs() as usize;
    if shift >= a.len() || shift >= b.len() {
        return Err(ForecastError::AlignmentError {
            lag,
            len_a: a.len(),
            len_b: b.len(),
        });
    }

    let (a, b) = match lag {
        l if l > 0 => (&a[shift..], &b[..b.len() - shift]),
        l if l < 0 => (&a[..a.len() - shift], &b[shift..]),
        _ => (a, b),
    };

    let len = a.len().min(b.len());
    Ok((&a[..len], &b[..len]))
}
