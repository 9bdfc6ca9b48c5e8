// Tournament arg-min
//
// Finding the best of a heap node's children is the hot loop of popping from
// a d-ary heap. A balanced tournament keeps the comparisons independent of
// each other, which lets the CPU overlap them, unlike a left-to-right scan.
//
// ```text
// 0   1 2   3 4   5   6
// *   * *   * *   *   *
//  \ /   \ /   \ /   /
//   *     *     *   /
//    \   /       \ /
//      *          *
//        \       /
//            *
// ```

/// Core comparison and index selection. Ties go left.
#[inline(always)]
#[must_use]
fn fight<T: PartialOrd>(a: &[T], l: usize, r: usize) -> usize {
    if a[l] <= a[r] { l } else { r }
}

/// Index of the smallest element, the leftmost one on ties.
///
/// ```
/// use route_planner::derank::derank;
/// assert_eq!(derank(&[3, 1, 2]), 1);
/// assert_eq!(derank(&[2, 1, 1, 5]), 1);
/// ```
#[inline]
#[must_use]
pub fn derank<T: PartialOrd>(a: &[T]) -> usize {
    debug_assert!(!a.is_empty(), "There's no best of nothing");
    match a.len() {
        1 => 0usize,
        2 => fight(a, 0, 1),
        n => {
            // Left bracket is the largest power of 2 below `n`.
            let mid = n.next_power_of_two() / 2;
            let l = derank(&a[..mid]);
            let r = mid + derank(&a[mid..]);
            fight(a, l, r)
        }
    }
}
