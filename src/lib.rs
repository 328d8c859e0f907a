//! # exercise_gen
//!
//! Reproducible practice exercises behind short, typable codes.
//!
//! Every exercise is determined by an [`Identity`]: which generator made it
//! (`kind`), how hard it is (`difficulty`) and a 64-bit `seed`. The identity
//! is printed as a checksummed base-36 code such as `136u-ptxo-3qcm-e0zy-ev`;
//! typing that code back in regenerates exactly the same exercise.
//!
//! ## How it works
//!
//! 1. Mint a fresh [`Identity`] (seed from an injected secure RNG) or parse
//!    one from a code.
//! 2. Build a [`GenerationContext`] and configure it: output, whether
//!    solutions are shown, which numbered parts are visible.
//! 3. Call [`GenerationContext::enter`] with the generator closure. The
//!    context seeds a ChaCha stream from the identity, runs the closure with
//!    a [`Generation`] and flushes the output on every exit path.
//!
//! ## Key guarantees
//!
//! - **Bit-exact codes**: `decode(encode(id)) == id` for every identity;
//!   codes are case-insensitive and a single typo is caught by the checksum
//!   in all but about 1 in 65536 cases.
//! - **Display settings never change content**: showing solutions or hiding
//!   parts yields the same random draws. Solution bodies cannot reach the
//!   random stream at all, and hidden parts still execute.
//! - **Lifecycle by construction**: a context is entered once and consumed;
//!   misuse is a compile error rather than a runtime check.
//!
//! ## Quick start
//!
//! ```rust
//! use exercise_gen::{GenerationContext, Identity, TextOutput};
//!
//! let id: Identity = "136u-ptxo-3qcm-e0zy-ev".parse()?;
//! assert_eq!((id.kind(), id.difficulty(), id.seed()), (1, 2, 42));
//!
//! let mut page = Vec::new();
//! let mut ctx = GenerationContext::new(id);
//! ctx.set_output(Box::new(TextOutput::new(&mut page)))?;
//! ctx.show_solutions();
//!
//! let summary = ctx.enter(|g| {
//!     g.section("Addition", |g| {
//!         let a: u32 = g.draw_range(1..=9);
//!         let b: u32 = g.draw_range(1..=9);
//!         g.paragraph(&format!("Compute {a} + {b}."));
//!         g.solution(|s| {
//!             s.paragraph(&format!("{a} + {b} = {}", a + b));
//!             Ok(())
//!         })
//!     })
//! })?;
//!
//! let text = String::from_utf8(page).unwrap();
//! assert!(text.contains("## Part 1: Addition"));
//! assert!(text.contains("### Solution"));
//! assert_eq!(summary.parts_opened, 1);
//! # Ok::<(), exercise_gen::Error>(())
//! ```

pub mod exercise_engine;

// Convenience re-exports so callers can use `exercise_gen::GenerationContext`
// directly without reaching into `exercise_engine::`.
pub use exercise_engine::{
    choose, choose_with_prob, decode, encode, ChoiceDeck, DifficultyRange, Error,
    ExerciseGenerator, Frame, Generation, GenerationContext, GenerationRequest,
    GenerationSummary, Identity, Layout, Output, Registry, Result, SolutionScope, TextOutput,
    WeightedChoices, MAX_KIND,
};

#[cfg(test)]
mod tests;
