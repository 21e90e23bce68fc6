//! The pipe-composition algebra for building pipelines
//!
//! A pipeline is an ordered chain of unary steps applied left to right.
//! Steps are lifted with [`composable`] and joined with `|`, or appended
//! directly with [`Composed::then`]:
//!
//! ```
//! use gleaner_core::composable;
//!
//! fn squared(x: i64) -> i64 {
//!     x * x
//! }
//!
//! let pipeline = composable(|text: &str| text.parse::<i64>().unwrap()) | composable(squared);
//! assert_eq!(pipeline.call("2"), 4);
//! ```
//!
//! Pipelines are immutable: composition consumes its operands and builds
//! a new value, and `Clone` is cheap (the step chain is shared), so one
//! lifted step can appear in any number of pipelines.

use std::any::type_name;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

/// An ordered chain of unary steps applied left to right.
///
/// `Composed<A, B>` takes an `A` and produces a `B`. The chain with zero
/// steps is [`Composed::identity`], the identity function. Composing two
/// pipelines concatenates their step lists, so nesting compositions any
/// number of levels deep is observably identical to one flat pipeline,
/// and `(a | b) | c` behaves exactly like `a | (b | c)`.
pub struct Composed<A, B> {
    run: Arc<dyn Fn(A) -> B + Send + Sync>,
    steps: Vec<&'static str>,
}

impl<A, B> Clone for Composed<A, B> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
            steps: self.steps.clone(),
        }
    }
}

impl<A: 'static> Composed<A, A> {
    /// The empty pipeline: calling it returns the input unchanged
    pub fn identity() -> Self {
        Self {
            run: Arc::new(|input| input),
            steps: Vec::new(),
        }
    }
}

impl<A: 'static> Default for Composed<A, A> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<A, B> Composed<A, B> {
    /// Fold the input through the steps, left to right
    pub fn call(&self, input: A) -> B {
        (*self.run)(input)
    }

    /// Number of steps in the chain
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the chain has zero steps (the identity pipeline)
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a bare callable as the new final step.
    ///
    /// This is the composition form for closures and functions that have
    /// not been lifted with [`composable`].
    pub fn then<G, C>(self, step: G) -> Composed<A, C>
    where
        A: 'static,
        B: 'static,
        G: Fn(B) -> C + Send + Sync + 'static,
    {
        let Composed { run, mut steps } = self;
        steps.push(type_name::<G>());
        Composed {
            run: Arc::new(move |input| step((*run)(input))),
            steps,
        }
    }

    /// Concatenate another pipeline after this one.
    ///
    /// `a.pipe(b)` is what `a | b` desugars to.
    pub fn pipe<C>(self, next: Composed<B, C>) -> Composed<A, C>
    where
        A: 'static,
        B: 'static,
        C: 'static,
    {
        let Composed { run: first, mut steps } = self;
        let Composed { run: second, steps: tail } = next;
        steps.extend(tail);
        Composed {
            run: Arc::new(move |input| (*second)((*first)(input))),
            steps,
        }
    }
}

impl<A, B, C> BitOr<Composed<B, C>> for Composed<A, B>
where
    A: 'static,
    B: 'static,
    C: 'static,
{
    type Output = Composed<A, C>;

    fn bitor(self, next: Composed<B, C>) -> Composed<A, C> {
        self.pipe(next)
    }
}

/// Disclosed as a composed pipeline listing its steps in order, to aid
/// debugging pipeline definitions.
impl<A, B> fmt::Debug for Composed<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Composed[")?;
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", step)?;
        }
        write!(f, "]")
    }
}

/// Lift a plain function or closure into a one-step pipeline so it can
/// be composed with `|`.
pub fn composable<A, B, F>(step: F) -> Composed<A, B>
where
    F: Fn(A) -> B + Send + Sync + 'static,
{
    Composed {
        run: Arc::new(step),
        steps: vec![type_name::<F>()],
    }
}
