//! Compare-and-swap retry loops for monotone updates of shared cells.
use std::sync::atomic::{AtomicU32, Ordering};

/// Lower `cell` to `next` unless it already holds a value `<= next`.
///
/// Returns `true` when this call stored a new value.
#[inline]
pub fn atomic_min(cell: &AtomicU32, next: u32) -> bool {
    let mut current = cell.load(Ordering::Relaxed);
    loop {
        if current <= next {
            return false;
        }
        match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return true,
            Err(actual) => current = actual,
        }
    }
}

/// Raise `cell` to `next` unless it already holds a value `>= next`.
///
/// Returns `true` when this call stored a new value.
#[inline]
pub fn atomic_max(cell: &AtomicU32, next: u32) -> bool {
    let mut current = cell.load(Ordering::Relaxed);
    loop {
        if current >= next {
            return false;
        }
        match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return true,
            Err(actual) => current = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn min_and_max_are_monotone() {
        let cell = AtomicU32::new(10);
        assert!(!atomic_min(&cell, 12));
        assert!(atomic_min(&cell, 3));
        assert_eq!(cell.load(Ordering::Relaxed), 3);
        assert!(!atomic_max(&cell, 2));
        assert!(atomic_max(&cell, 8));
        assert_eq!(cell.load(Ordering::Relaxed), 8);
    }

    #[test]
    fn concurrent_updates_settle_on_extremes() {
        let lo = AtomicU32::new(u32::MAX);
        let hi = AtomicU32::new(0);
        (0..10_000u32).into_par_iter().for_each(|v| {
            atomic_min(&lo, v ^ 0x155);
            atomic_max(&hi, v ^ 0x155);
        });
        let values: Vec<u32> = (0..10_000u32).map(|v| v ^ 0x155).collect();
        assert_eq!(lo.into_inner(), *values.iter().min().unwrap());
        assert_eq!(hi.into_inner(), *values.iter().max().unwrap());
    }
}
