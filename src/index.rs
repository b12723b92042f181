//! Conversion between 1d and 2d pixel indices within one slice.
//!
//! Pixels are stored row-major with the grid's `x` index as the row: the flat
//! index of pixel `[ix, iy]` in a grid of `[nx, ny]` pixels is `iy + ix * ny`.

use std::ops::{Add, Div, Mul, Rem};

pub type Index1 = usize;
pub type Index2 = [usize; 2];

pub fn index2_to_1<T>([ix, iy]: [T; 2], [_nx, ny]: [T; 2]) -> T
where
    T: Mul<Output = T> + Add<Output = T>
{
    iy + ix * ny
}

pub fn index1_to_2<T>(i: T, [_nx, ny]: [T; 2]) -> [T; 2]
where
    T: Div<Output = T> + Rem<Output = T> + Copy
{
    [i / ny, i % ny]
}

#[cfg(test)]
mod test_index_conversion {
    use super::*;
    use rstest::rstest;

    // -------------------- Some hand-picked examples ------------------------------
    #[rstest(/**/  size , index2, index1,
             // 1-d examples
             case([1, 1], [0, 0],   0),
             case([9, 1], [3, 0],   3),
             case([1, 8], [0, 4],   4),
             // Counting in binary: note that y varies fastest
             case([2, 2], [0, 0],   0),
             case([2, 2], [0, 1],   1),
             case([2, 2], [1, 0],   2),
             case([2, 2], [1, 1],   3),
             // Relation to decimal
             case([10, 10], [1, 2],  12),
             case([10, 10], [7, 9],  79),
             // Non-square
             case([4, 3], [3, 2],  11),
    )]
    fn hand_picked(size: Index2, index2: Index2, index1: Index1) {
        assert_eq!(index2_to_1(index2, size), index1);
        assert_eq!(index1_to_2(index1, size), index2);
    }

    // -------------------- Exhaustive roundtrip testing ------------------------------
    use proptest::prelude::*;

    // A strategy that picks 2-d index limits, and a 1-d index guaranteed to lie
    // within those bounds.
    fn size_and_in_range_index() -> impl Strategy<Value = (Index2, Index1)> {
        [1..500_usize, 1..500_usize]
            .prop_flat_map(|i| (Just(i), 0..(i[0] * i[1])))
    }

    proptest! {
        #[test]
        fn index_roundtrip((size, index) in size_and_in_range_index()) {
            let there = index1_to_2(index, size);
            let back  = index2_to_1(there, size);
            assert_eq!(back, index)
        }
    }
}
