/// Path costs.
///
/// Costs add up along a route and get scaled once at the end to convert
/// graph units into real-world units, hence the `Mul` bound.
pub trait Cost:
    Copy
    + std::fmt::Debug
    + std::fmt::Display
    + PartialEq
    + core::cmp::Eq
    + PartialOrd
    + Ord
    + num_traits::SaturatingAdd
    + num_traits::bounds::UpperBounded
    + num_traits::Zero
    + std::ops::Add<Self, Output = Self>
    + std::ops::Mul<Self, Output = Self>
    + std::ops::AddAssign
{
    /// Whether the cost is finite.
    #[inline(always)]
    fn valid(&self) -> bool {
        *self != num_traits::bounds::UpperBounded::max_value()
    }
}

/// Integer costs, for graphs with pre-rounded distances.
impl Cost for u32 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_costs() {
        assert!(7u32.valid());
        assert!(!u32::MAX.valid());
        assert_eq!(num_traits::SaturatingAdd::saturating_add(&u32::MAX, &1), u32::MAX);
    }
}
