use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Add;

/// The cost of a solution or the priority of a state; lower is more promising.
///
/// A [`Cost`] is totally ordered. [`Cost::INFINITE`] is the sentinel which denotes a failure, a
/// NaN value is turned into that sentinel upon construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cost(f64);

impl Cost {
    pub const ZERO: Cost = Cost(0.0);
    pub const INFINITE: Cost = Cost(f64::INFINITY);

    pub fn new(value: f64) -> Cost {
        if value.is_nan() {
            Cost::INFINITE
        } else if value == 0.0 {
            // Both zeroes should compare and hash equal.
            Cost::ZERO
        } else {
            Cost(value)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    pub fn is_infinite(self) -> bool {
        !self.is_finite()
    }
}

impl From<f64> for Cost {
    fn from(value: f64) -> Self {
        Cost::new(value)
    }
}

impl From<u32> for Cost {
    fn from(value: u32) -> Self {
        Cost::new(f64::from(value))
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Self::Output {
        Cost::new(self.0 + rhs.0)
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Cost {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_infinite() {
            write!(f, "inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cost;

    #[test]
    fn nan_is_a_failure() {
        assert!(Cost::new(f64::NAN).is_infinite());
        assert_eq!(Cost::INFINITE, Cost::new(f64::NAN));
    }

    #[test]
    fn zeroes_are_equal() {
        assert_eq!(Cost::new(-0.0), Cost::new(0.0));
    }

    #[test]
    fn infinite_is_the_most_expensive() {
        assert!(Cost::new(1e300) < Cost::INFINITE);
        assert_eq!(Cost::INFINITE, Cost::new(3.0) + Cost::INFINITE);
        assert_eq!("inf", Cost::INFINITE.to_string());
    }
}
