use std::hint::black_box;

use super::PORTABLE_CHAINS;

/// Plain `f64` multiplies and adds, whatever instructions the compiler picks for them.
pub(crate) fn fp64(loops: u64) {
    let mul = black_box(1.0_f64);
    let add = black_box(0.0_f64);

    let mut products = [black_box(1.5_f64); PORTABLE_CHAINS];
    let mut sums = [black_box(2.5_f64); PORTABLE_CHAINS];

    for _ in 0..loops {
        for product in &mut products {
            *product *= mul;
        }

        for sum in &mut sums {
            *sum += add;
        }
    }

    black_box((products, sums));
}
