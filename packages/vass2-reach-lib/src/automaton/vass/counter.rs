use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub},
};

use serde::{Deserialize, Serialize};

/// A counter valuation or counter update of a 2-dimensional VASS.
///
/// The same type is used for both, a valuation is simply an update applied to
/// the zero vector. Serialized as a JSON array `[x, y]`.
///
/// The operators overflow like the ones of `i64`, the `checked_*` methods
/// report overflow as `None` instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct Vector2 {
    pub x: i64,
    pub y: i64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0, y: 0 };

    pub const fn new(x: i64, y: i64) -> Self {
        Vector2 { x, y }
    }

    pub fn is_non_negative(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }

    /// Checks that `self` is at least `guard` in both dimensions.
    pub fn covers(&self, guard: &Vector2) -> bool {
        self.x >= guard.x && self.y >= guard.y
    }

    pub fn checked_add(&self, other: &Vector2) -> Option<Vector2> {
        Some(Vector2 {
            x: self.x.checked_add(other.x)?,
            y: self.y.checked_add(other.y)?,
        })
    }

    pub fn checked_scale(&self, factor: i64) -> Option<Vector2> {
        Some(Vector2 {
            x: self.x.checked_mul(factor)?,
            y: self.y.checked_mul(factor)?,
        })
    }

    /// Component-wise minimum of two vectors, e.g. `(3, -2)` and `(1, 0)`
    /// give `(1, -2)`.
    pub fn component_min(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }

    pub fn checked_neg(&self) -> Option<Vector2> {
        Some(Vector2 {
            x: self.x.checked_neg()?,
            y: self.y.checked_neg()?,
        })
    }

    pub fn to_i128(&self) -> [i128; 2] {
        [self.x as i128, self.y as i128]
    }

    /// Applies the updates one after the other, starting at `self`.
    /// Returns `None` as soon as an intermediate valuation has a negative
    /// counter.
    pub fn apply_all<'a>(&self, updates: impl IntoIterator<Item = &'a Vector2>) -> Option<Vector2> {
        let mut current = *self;

        for update in updates {
            current = current.checked_add(update)?;

            if !current.is_non_negative() {
                return None;
            }
        }

        Some(current)
    }
}

/// Sums up a sequence of vectors, the empty sum is `(0, 0)`. Returns `None`
/// if the sum leaves the range of `i64`.
pub fn sum_vectors<'a>(vectors: impl IntoIterator<Item = &'a Vector2>) -> Option<Vector2> {
    vectors
        .into_iter()
        .try_fold(Vector2::ZERO, |acc, v| acc.checked_add(v))
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Self::Output {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Self::Output {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Self::Output {
        Vector2::new(-self.x, -self.y)
    }
}

impl Mul<i64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: i64) -> Self::Output {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Sum for Vector2 {
    fn sum<I: Iterator<Item = Vector2>>(iter: I) -> Self {
        iter.fold(Vector2::ZERO, |acc, v| acc + v)
    }
}

impl<'a> Sum<&'a Vector2> for Vector2 {
    fn sum<I: Iterator<Item = &'a Vector2>>(iter: I) -> Self {
        iter.fold(Vector2::ZERO, |acc, v| acc + *v)
    }
}

impl From<[i64; 2]> for Vector2 {
    fn from(values: [i64; 2]) -> Self {
        Vector2::new(values[0], values[1])
    }
}

impl From<Vector2> for [i64; 2] {
    fn from(vector: Vector2) -> Self {
        [vector.x, vector.y]
    }
}

impl From<(i64, i64)> for Vector2 {
    fn from((x, y): (i64, i64)) -> Self {
        Vector2::new(x, y)
    }
}

impl Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
