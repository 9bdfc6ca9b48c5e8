use std::cmp::Ordering;
use std::fmt::Debug;

use derive_more::Display;
use num_traits::SaturatingAdd;
use num_traits::Zero;
use num_traits::bounds::UpperBounded;
use ordered_float::FloatCore;
use ordered_float::OrderedFloat;

use crate::cost::Cost;

/// A floating point distance with a total order.
///
/// NaN sorts above infinity through [`OrderedFloat`], so it can't sneak to the
/// top of the frontier.
#[derive(Copy, Clone, Default, Debug, Display)]
#[repr(transparent)]
#[display("{_0}")]
pub struct FloatCost<F: FloatCore>(pub OrderedFloat<F>);

impl<F> Cost for FloatCost<F>
where
    FloatCost<F>: Debug + std::ops::AddAssign + std::ops::Mul<Output = FloatCost<F>> + UpperBounded,
    F: FloatCore + std::fmt::Display,
{
}

impl<F> FloatCost<F>
where
    F: FloatCore,
{
    pub fn new(f: F) -> Self {
        Self(OrderedFloat(f))
    }

    /// The raw floating point value.
    #[inline(always)]
    pub fn value(&self) -> F {
        self.0.into_inner()
    }

    #[inline(always)]
    pub fn infinity() -> Self {
        Self(OrderedFloat::infinity())
    }
}

// Arithmetic
// ----------
impl<F> std::ops::Add for FloatCost<F>
where
    F: FloatCore,
{
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl<F> std::ops::AddAssign for FloatCost<F>
where
    F: FloatCore,
{
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0 + rhs.0;
    }
}
impl<F> std::ops::Mul for FloatCost<F>
where
    F: FloatCore,
{
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}
/// Floats already saturate at infinity.
impl<F> SaturatingAdd for FloatCost<F>
where
    F: FloatCore,
{
    #[inline(always)]
    fn saturating_add(&self, rhs: &Self) -> Self {
        *self + *rhs
    }
}

impl<F> Zero for FloatCost<F>
where
    F: FloatCore,
{
    #[inline(always)]
    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
    #[inline(always)]
    fn zero() -> Self {
        Self(OrderedFloat::zero())
    }
}
impl<F> UpperBounded for FloatCost<F>
where
    F: FloatCore,
{
    fn max_value() -> Self {
        Self::infinity()
    }
}

// Ordering
// --------
// `f32: !Ord`, so these can't be derived.
impl<F: FloatCore> PartialEq for FloatCost<F> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<F: FloatCore> Eq for FloatCost<F> {}

impl<F: FloatCore> PartialOrd for FloatCost<F> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<F: FloatCore> Ord for FloatCost<F> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero() {
        assert!(FloatCost::new(0.0f32).is_zero());
        assert!(FloatCost::<f32>::zero().value() == 0.0);
        assert!(FloatCost::new(0.0f32).valid());
    }

    #[test]
    fn accumulate_and_scale() {
        let mut d = FloatCost::new(0.5f32);
        d += FloatCost::new(1.0f32);
        assert_eq!(d, FloatCost::new(1.5f32));
        assert_eq!(d * FloatCost::new(2.0f32), FloatCost::new(3.0f32));

        d += FloatCost::infinity();
        assert_eq!(d, FloatCost::max_value());
        assert!(!d.valid());
    }

    #[test]
    fn nan_sorts_last() {
        let nan = FloatCost::new(f32::NAN);
        assert!(FloatCost::new(1.0f32) < nan);
        assert!(FloatCost::<f32>::infinity() < nan);
    }
}
