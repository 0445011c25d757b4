//! Exact integer linear algebra for systems `A x = b` where `A` has two rows.
//!
//! The integer solutions of such a system form a lattice `x0 + span(N)`. The
//! lattice is computed with a column style Hermite normal form `A U = H` that
//! only uses unimodular column operations, so `U` stays invertible over the
//! integers and its trailing columns span the integer kernel of `A`.

use itertools::{Either, Itertools};
use num::{CheckedAdd, CheckedDiv, Zero, rational::Ratio};

use crate::automaton::vass::counter::Vector2;

pub type Column = [i128; 2];

const MAX_REDUCTION_ROUNDS: usize = 64;
const MAX_GREEDY_STEPS: usize = 10_000;

/// Extended Euclidean algorithm. Returns `(g, s, t)` with `a * s + b * t = g`
/// and `g = gcd(a, b) >= 0`, or `None` if an intermediate value overflows.
pub fn extended_gcd(a: i128, b: i128) -> Option<(i128, i128, i128)> {
    if b == 0 {
        if a < 0 {
            Some((a.checked_neg()?, -1, 0))
        } else {
            Some((a, 1, 0))
        }
    } else {
        let (g, s, t) = extended_gcd(b, a.checked_rem(b)?)?;
        Some((g, t, s.checked_sub(a.checked_div(b)?.checked_mul(t)?)?))
    }
}

/// Rounds a fraction to the nearest integer, halves away from zero.
pub fn round_to_integer(value: &Ratio<i128>) -> Option<i128> {
    round_quotient(*value.numer(), *value.denom())
}

fn round_quotient(numer: i128, denom: i128) -> Option<i128> {
    if denom == 0 {
        return None;
    }

    let magnitude = numer.checked_abs()?;
    let divisor = denom.checked_abs()?;
    let (quotient, remainder) = (magnitude / divisor, magnitude % divisor);
    let rounded = if remainder >= divisor - remainder {
        quotient.checked_add(1)?
    } else {
        quotient
    };

    Some(if (numer < 0) != (denom < 0) { -rounded } else { rounded })
}

/// `Ratio::new` panics on `i128::MIN`, which has no positive counterpart.
fn ratio(numer: i128, denom: i128) -> Option<Ratio<i128>> {
    if denom == 0 || numer == i128::MIN || denom == i128::MIN {
        return None;
    }
    Some(Ratio::new(numer, denom))
}

fn dot(a: &[i128], b: &[i128]) -> Option<i128> {
    a.iter()
        .zip(b)
        .try_fold(0i128, |acc, (x, y)| acc.checked_add(x.checked_mul(*y)?))
}

fn cross(a: &Column, b: &Column) -> Option<i128> {
    a[0].checked_mul(b[1])?.checked_sub(a[1].checked_mul(b[0])?)
}

fn add_scaled(x: &[i128], direction: &[i128], factor: i128) -> Option<Vec<i128>> {
    x.iter()
        .zip(direction)
        .map(|(a, b)| a.checked_add(&factor.checked_mul(*b)?))
        .collect()
}

fn squared_distance(a: &[i128], b: &[i128]) -> Option<i128> {
    a.iter().zip(b).try_fold(0i128, |acc, (x, y)| {
        let difference = x.checked_sub(*y)?;
        acc.checked_add(difference.checked_mul(difference)?)
    })
}

/// Replaces columns `i` and `j` by `s * c_i + t * c_j` and `x * c_i + y * c_j`.
fn combine_columns<C: AsMut<[i128]>>(
    columns: &mut [C],
    i: usize,
    j: usize,
    (s, t): (i128, i128),
    (x, y): (i128, i128),
) -> Option<()> {
    let rows = columns[i].as_mut().len();
    for r in 0..rows {
        let a = columns[i].as_mut()[r];
        let b = columns[j].as_mut()[r];
        columns[i].as_mut()[r] = s.checked_mul(a)?.checked_add(t.checked_mul(b)?)?;
        columns[j].as_mut()[r] = x.checked_mul(a)?.checked_add(y.checked_mul(b)?)?;
    }
    Some(())
}

/// `A U = H` with `U` unimodular and `H` in column echelon form.
///
/// Column `pivots[k].1` of `H` is the `k`-th non-zero column, its first
/// non-zero entry sits in row `pivots[k].0`. All columns from `rank` on are
/// zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HermiteForm {
    pub h: Vec<Column>,
    /// Columns of `U`.
    pub u: Vec<Vec<i128>>,
    pub rank: usize,
    pub pivots: Vec<(usize, usize)>,
}

/// All integer solutions `particular + Σ k_i * basis[i]` of a system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionLattice {
    pub particular: Vec<i128>,
    pub basis: Vec<Vec<i128>>,
}

/// A system of two linear equations over `L` integer variables, stored by
/// columns.
///
/// Every computation on the system is exact. Results that would leave the
/// range of `i128` are reported as `None` instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerSystem {
    columns: Vec<Column>,
}

impl IntegerSystem {
    pub fn new(columns: Vec<Column>) -> Self {
        IntegerSystem { columns }
    }

    pub fn from_vectors(vectors: &[Vector2]) -> Self {
        Self::new(vectors.iter().map(|v| v.to_i128()).collect())
    }

    /// Computes `A x`.
    pub fn evaluate(&self, x: &[i128]) -> Option<Column> {
        self.columns.iter().zip(x).try_fold([0i128, 0i128], |acc, (c, v)| {
            Some([
                acc[0].checked_add(c[0].checked_mul(*v)?)?,
                acc[1].checked_add(c[1].checked_mul(*v)?)?,
            ])
        })
    }

    pub fn hermite_form(&self) -> Option<HermiteForm> {
        let n = self.columns.len();
        let mut h = self.columns.clone();
        let mut u: Vec<Vec<i128>> = (0..n)
            .map(|c| (0..n).map(|r| if r == c { 1 } else { 0 }).collect())
            .collect();
        let mut pivots = vec![];
        let mut rank = 0;

        for row in 0..2 {
            if rank == n {
                break;
            }

            // eliminate the entries right of the pivot column in this row
            for j in rank + 1..n {
                let a = h[rank][row];
                let b = h[j][row];
                if b == 0 {
                    continue;
                }

                let (g, s, t) = extended_gcd(a, b)?;
                let eliminate = (b.checked_neg()?.checked_div(g)?, a.checked_div(g)?);
                combine_columns(&mut h, rank, j, (s, t), eliminate)?;
                combine_columns(&mut u, rank, j, (s, t), eliminate)?;
            }

            if h[rank][row] != 0 {
                pivots.push((row, rank));
                rank += 1;
            }
        }

        Some(HermiteForm {
            h,
            u,
            rank,
            pivots,
        })
    }

    /// Computes the lattice of integer solutions of `A x = rhs`, or `None` if
    /// there is no integer solution or it can not be represented.
    pub fn solve_integer(&self, rhs: Column) -> Option<SolutionLattice> {
        let n = self.columns.len();
        let form = self.hermite_form()?;

        let mut residual = rhs;
        let mut y = vec![0i128; n];

        for row in 0..2 {
            if let Some(&(_, col)) = form.pivots.iter().find(|(r, _)| *r == row) {
                let pivot = form.h[col][row];
                if residual[row].checked_rem(pivot)? != 0 {
                    return None;
                }

                let value = residual[row].checked_div(pivot)?;
                y[col] = value;
                for (r, entry) in residual.iter_mut().enumerate() {
                    *entry = entry.checked_sub(value.checked_mul(form.h[col][r])?)?;
                }
            } else if residual[row] != 0 {
                return None;
            }
        }

        let particular = (0..n)
            .map(|r| {
                (0..n).try_fold(0i128, |acc, c| {
                    acc.checked_add(form.u[c][r].checked_mul(y[c])?)
                })
            })
            .collect::<Option<Vec<_>>>()?;

        let mut basis = form.u[form.rank..].to_vec();
        reduce_basis(&mut basis);

        Some(SolutionLattice { particular, basis })
    }

    /// Looks for a solution of `A x = rhs` with rational `x >= 0`.
    ///
    /// The vertices of the polyhedron of non-negative solutions are its basic
    /// solutions. In two dimensions they have at most two non-zero entries,
    /// so they are found by trying single columns and pairs of linearly
    /// independent columns. Returns the centroid of all vertices, which lies
    /// well inside the polyhedron, or `None` if there is no vertex or the
    /// centroid overflows.
    pub fn solve_non_negative_rational(&self, rhs: Column) -> Option<Vec<Ratio<i128>>> {
        let n = self.columns.len();

        if rhs == [0, 0] {
            return Some(vec![Ratio::zero(); n]);
        }

        let mut vertices: Vec<Vec<Ratio<i128>>> = vec![];

        for (i, column) in self.columns.iter().enumerate() {
            let along = dot(column, &rhs)?;
            if cross(column, &rhs)? == 0 && along > 0 {
                let mut vertex = vec![Ratio::zero(); n];
                vertex[i] = ratio(along, dot(column, column)?)?;
                vertices.push(vertex);
            }
        }

        for (i, j) in (0..n).tuple_combinations() {
            let (a, b) = (&self.columns[i], &self.columns[j]);
            let det = cross(a, b)?;
            if det == 0 {
                continue;
            }

            let lambda = cross(&rhs, b)?;
            let mu = cross(a, &rhs)?;
            if lambda.signum() * det.signum() >= 0 && mu.signum() * det.signum() >= 0 {
                let mut vertex = vec![Ratio::zero(); n];
                vertex[i] = ratio(lambda, det)?;
                vertex[j] = ratio(mu, det)?;
                vertices.push(vertex);
            }
        }

        if vertices.is_empty() {
            return None;
        }

        let count = Ratio::from_integer(vertices.len() as i128);
        (0..n)
            .map(|k| {
                vertices
                    .iter()
                    .try_fold(Ratio::zero(), |acc: Ratio<i128>, v| acc.checked_add(&v[k]))?
                    .checked_div(&count)
            })
            .collect()
    }
}

/// Pairwise size reduction of the basis vectors. Keeps the spanned lattice
/// and makes the vectors shorter, which makes a window of small
/// coefficients cover more of the lattice.
fn reduce_basis(basis: &mut [Vec<i128>]) {
    for _ in 0..MAX_REDUCTION_ROUNDS {
        let mut changed = false;

        for i in 0..basis.len() {
            for j in 0..basis.len() {
                if i == j {
                    continue;
                }

                if let Some(reduced) = reduce_against(&basis[i], &basis[j]) {
                    basis[i] = reduced;
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }
}

/// Subtracts the closest multiple of `other` from `vector`, if that makes it
/// strictly shorter.
fn reduce_against(vector: &[i128], other: &[i128]) -> Option<Vec<i128>> {
    let norm = dot(other, other)?;
    if norm == 0 {
        return None;
    }

    let factor = round_quotient(dot(vector, other)?, norm)?;
    if factor == 0 {
        return None;
    }

    let reduced = add_scaled(vector, other, factor.checked_neg()?)?;
    let shorter = match dot(vector, vector) {
        Some(length) => dot(&reduced, &reduced)? < length,
        None => dot(&reduced, &reduced).is_some(),
    };

    shorter.then_some(reduced)
}

impl SolutionLattice {
    /// Walks from the particular solution towards `target` along the basis
    /// vectors as long as the euclidean distance shrinks. Steps whose
    /// coordinates or distance overflow are not taken.
    pub fn closest_to(&self, target: &[i128]) -> Vec<i128> {
        let mut current = self.particular.clone();
        let mut distance = squared_distance(&current, target).unwrap_or(i128::MAX);

        for _ in 0..MAX_GREEDY_STEPS {
            let mut improved = false;

            for direction in &self.basis {
                if let Some((candidate, candidate_distance)) =
                    closer_step(&current, distance, target, direction)
                {
                    current = candidate;
                    distance = candidate_distance;
                    improved = true;
                }
            }

            if !improved {
                break;
            }
        }

        current
    }

    /// Enumerates non-negative lattice points around `centre`: first the
    /// centre itself, then `centre + Σ k_i * basis[i]` for every `k` in
    /// `[-window, window]^d` in product order. At most `max_combinations`
    /// combinations are looked at. Every point is yielded once.
    pub fn candidates(
        &self,
        centre: Vec<i128>,
        window: i64,
        max_combinations: usize,
    ) -> impl Iterator<Item = Vec<u64>> + '_ {
        let first = centre.clone();

        let combinations = if self.basis.is_empty() {
            Either::Left(std::iter::empty::<Vec<i128>>())
        } else {
            Either::Right(
                self.basis
                    .iter()
                    .map(|_| -window..=window)
                    .multi_cartesian_product()
                    .take(max_combinations)
                    .filter_map(move |factors| {
                        factors.iter().zip(&self.basis).try_fold(
                            centre.clone(),
                            |point, (&k, direction)| {
                                add_scaled(&point, direction, i128::from(k))
                            },
                        )
                    }),
            )
        };

        std::iter::once(first)
            .chain(combinations)
            .filter_map(|point| to_non_negative(&point))
            .unique()
    }
}

/// First of the projected step, one step forward and one step back along
/// `direction` that gets closer to `target` than `distance`.
fn closer_step(
    current: &[i128],
    distance: i128,
    target: &[i128],
    direction: &[i128],
) -> Option<(Vec<i128>, i128)> {
    let norm = dot(direction, direction)?;
    if norm == 0 {
        return None;
    }

    let projection = add_scaled(target, current, -1)
        .and_then(|difference| dot(&difference, direction))
        .and_then(|along| round_quotient(along, norm));

    [projection, Some(1), Some(-1)]
        .into_iter()
        .flatten()
        .filter(|&factor| factor != 0)
        .find_map(|factor| {
            let candidate = add_scaled(current, direction, factor)?;
            let candidate_distance = squared_distance(&candidate, target)?;
            (candidate_distance < distance).then_some((candidate, candidate_distance))
        })
}

fn to_non_negative(point: &[i128]) -> Option<Vec<u64>> {
    point.iter().map(|&v| u64::try_from(v).ok()).collect()
}
