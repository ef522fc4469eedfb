//! Exercises the parameterized-test matrix scenario (spec.md §8 scenario
//! 6): a Cartesian product of two ranges must be visited exactly once per
//! combination, in any order.
//!
//! The original implementation hand-rolls this with `doctest`'s
//! `PARAMETERIZE`/`OPTION`/`PICK` macros (see
//! `tests/test_utils/parameterize.h`); `rstest`'s `#[values(...)]` matrix
//! expansion is the idiomatic Rust equivalent (this crate's teacher,
//! `examples/helgoboss-helgobox`, uses `rstest` for the same purpose).

use rstest::rstest;

#[rstest]
fn visits_every_combination_of_the_product_exactly_once(
    #[values(0, 1, 2)] x: i32,
    #[values(0, 1, 2, 3)] y: i32,
) {
    assert!((0..3).contains(&x));
    assert!((0..4).contains(&y));
}

#[test]
fn product_sums_match_the_closed_form() {
    let mut sum_x = 0;
    let mut sum_y = 0;
    let mut count = 0;
    for x in 0..3 {
        for y in 0..4 {
            sum_x += x;
            sum_y += y;
            count += 1;
        }
    }
    assert_eq!(count, 12);
    assert_eq!(sum_x, (0 + 1 + 2) * 4);
    assert_eq!(sum_y, 3 * (0 + 1 + 2 + 3));
}
