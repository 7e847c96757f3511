//! Thread-local counters of floating-point operations.
//!
//! Evaluation, arithmetic and fitting kernels report their multiply/add
//! counts here. The counters are per thread, so concurrent work on
//! independent polynomials (including the parallel test harness) never
//! mixes tallies.

use std::cell::Cell;

thread_local! {
    static FLOPS: Cell<u64> = const { Cell::new(0) };
}

/// Returns the number of floating-point operations recorded on the current
/// thread since the last [`reset`].
///
/// # Example
///
/// ```
/// use multipoly::{flops, Polynomial};
///
/// let mut p = Polynomial::new(1).unwrap();
/// p.set_coeff(&[3], 2.0).unwrap();
/// flops::reset();
/// p.eval_1d(1.5).unwrap();
/// assert!(flops::count() > 0);
/// ```
pub fn count() -> u64 {
    FLOPS.with(|f| f.get())
}

/// Resets the current thread's counter to zero.
pub fn reset() {
    FLOPS.with(|f| f.set(0));
}

/// Records `n` floating-point operations on the current thread.
pub(crate) fn add(n: u64) {
    FLOPS.with(|f| f.set(f.get().wrapping_add(n)));
}
