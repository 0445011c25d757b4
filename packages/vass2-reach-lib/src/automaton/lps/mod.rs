use itertools::Itertools;

use crate::automaton::{
    cycle::Loop,
    path::SimplePath,
    vass::counter::{Vector2, sum_vectors},
};

pub mod builder;

/// A linear path scheme: a fixed prefix, then a sequence of loops that may
/// each be repeated any number of times, separated by fixed segments, then a
/// fixed suffix.
///
/// `between[i]` is applied after loop `i` and before loop `i + 1`, no matter
/// how often the loops are repeated, so there is one segment less than there
/// are loops. A scheme without loops is a plain path stored in `prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearPathScheme {
    pub prefix: Vec<Vector2>,
    pub loops: Vec<Loop>,
    pub between: Vec<Vec<Vector2>>,
    pub suffix: Vec<Vector2>,
    /// The simple path this scheme was built from, if any.
    pub path: Option<SimplePath>,
}

impl LinearPathScheme {
    /// Creates a new scheme.
    ///
    /// # Panics
    ///
    /// Panics if the number of between segments does not match the number of
    /// loops. Use [LinearPathScheme::try_new] for untrusted input.
    pub fn new(
        prefix: Vec<Vector2>,
        loops: Vec<Loop>,
        between: Vec<Vec<Vector2>>,
        suffix: Vec<Vector2>,
    ) -> Self {
        assert_eq!(
            between.len(),
            loops.len().saturating_sub(1),
            "a scheme with {} loops needs {} between segments",
            loops.len(),
            loops.len().saturating_sub(1)
        );

        LinearPathScheme {
            prefix,
            loops,
            between,
            suffix,
            path: None,
        }
    }

    pub fn try_new(
        prefix: Vec<Vector2>,
        loops: Vec<Loop>,
        between: Vec<Vec<Vector2>>,
        suffix: Vec<Vector2>,
    ) -> anyhow::Result<Self> {
        let expected = loops.len().saturating_sub(1);
        if between.len() != expected {
            anyhow::bail!(
                "a scheme with {} loops needs {} between segments, got {}",
                loops.len(),
                expected,
                between.len()
            );
        }

        Ok(Self::new(prefix, loops, between, suffix))
    }

    /// A scheme without loops that just follows `updates`.
    pub fn linear(updates: Vec<Vector2>) -> Self {
        Self::new(updates, vec![], vec![], vec![])
    }

    pub fn with_path(mut self, path: SimplePath) -> Self {
        self.path = Some(path);
        self
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn is_linear(&self) -> bool {
        self.loops.is_empty()
    }

    /// Total effect of all between segments, `None` on overflow.
    pub fn between_effect(&self) -> Option<Vector2> {
        sum_vectors(self.between.iter().flatten())
    }

    pub fn suffix_effect(&self) -> Option<Vector2> {
        sum_vectors(&self.suffix)
    }

    pub fn loop_effects(&self) -> Vec<Vector2> {
        self.loops.iter().map(|l| l.effect).collect()
    }

    /// Runs the scheme from `start`, repeating loop `i` exactly `iterations[i]`
    /// times, and returns the final valuation.
    ///
    /// Returns `None` if some counter would become negative on the way, if a
    /// loop is entered below its guard, if the number of iteration counts
    /// does not match the number of loops, or on arithmetic overflow.
    pub fn simulate(&self, start: Vector2, iterations: &[u64]) -> Option<Vector2> {
        if iterations.len() != self.loops.len() {
            return None;
        }

        let mut position = start.apply_all(&self.prefix)?;

        for (i, (l, &count)) in self.loops.iter().zip(iterations).enumerate() {
            if i > 0 {
                position = position.apply_all(&self.between[i - 1])?;
            }

            if count == 0 {
                continue;
            }

            let count = i64::try_from(count).ok()?;

            // entries of the traversals are linear in the repetition, so
            // checking the first and the last one covers all of them
            let last_entry = position.checked_add(&l.effect.checked_scale(count - 1)?)?;
            if !l.is_enabled(&position) || !l.is_enabled(&last_entry) {
                return None;
            }

            position = position.checked_add(&l.effect.checked_scale(count)?)?;
            if !position.is_non_negative() {
                return None;
            }
        }

        position.apply_all(&self.suffix)
    }

    /// Like [LinearPathScheme::simulate], but returns every valuation of the
    /// concrete run, starting with `start`. Loops are expanded transition by
    /// transition, summary loops one traversal at a time.
    pub fn unfold(&self, start: Vector2, iterations: &[u64]) -> Option<Vec<Vector2>> {
        if iterations.len() != self.loops.len() {
            return None;
        }

        let mut trace = vec![start];
        let mut position = start;

        for update in &self.prefix {
            push_step(&mut trace, &mut position, update)?;
        }

        for (i, (l, &count)) in self.loops.iter().zip(iterations).enumerate() {
            if i > 0 {
                for update in &self.between[i - 1] {
                    push_step(&mut trace, &mut position, update)?;
                }
            }

            for _ in 0..count {
                if !l.is_enabled(&position) {
                    return None;
                }

                if l.is_summary() {
                    push_step(&mut trace, &mut position, &l.effect)?;
                } else {
                    for update in &l.updates {
                        push_step(&mut trace, &mut position, update)?;
                    }
                }
            }
        }

        for update in &self.suffix {
            push_step(&mut trace, &mut position, update)?;
        }

        Some(trace)
    }

    pub fn to_fancy_string(&self) -> String {
        let loops = self
            .loops
            .iter()
            .enumerate()
            .map(|(i, l)| match self.between.get(i) {
                Some(segment) => format!(
                    "({})* [{}]",
                    l.to_fancy_string(),
                    segment.iter().join(", ")
                ),
                None => format!("({})*", l.to_fancy_string()),
            })
            .join(" ");

        format!(
            "[{}] {} [{}]",
            self.prefix.iter().join(", "),
            loops,
            self.suffix.iter().join(", ")
        )
    }
}

fn push_step(trace: &mut Vec<Vector2>, position: &mut Vector2, update: &Vector2) -> Option<()> {
    *position = position.checked_add(update)?;
    if !position.is_non_negative() {
        return None;
    }
    trace.push(*position);
    Some(())
}
