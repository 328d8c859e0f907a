//! Generation context: the seeded random stream plus the lifecycle that keeps
//! exercises reproducible from their code alone.
//!
//! ## Lifecycle
//!
//! A [`GenerationContext`] is the setup state. It is configured (output,
//! solution visibility, visible parts) and then consumed by
//! [`GenerationContext::enter`], which hands a [`Generation`] (the working
//! state) to the generator closure and closes everything afterwards. Because
//! `enter` takes `self`, a context cannot be entered twice or used after it
//! closed:
//!
//! ```compile_fail
//! use exercise_gen::{GenerationContext, Identity};
//!
//! let ctx = GenerationContext::new(Identity::new(1, 0, 7).unwrap());
//! let _ = ctx.enter(|_| Ok(()));
//! let _ = ctx.enter(|_| Ok(()));
//! ```
//!
//! Working-state operations do not exist before `enter`:
//!
//! ```compile_fail
//! use exercise_gen::{GenerationContext, Identity};
//!
//! let mut ctx = GenerationContext::new(Identity::new(1, 0, 7).unwrap());
//! let _ = ctx.draw();
//! ```
//!
//! ## Reproducibility
//!
//! Solution visibility and the part filter are not part of the code, so they
//! must not change which random values the generator sees. Hidden parts still
//! run in full with their text silenced. Solution bodies receive a
//! [`SolutionScope`], which can emit text but has no access to the random
//! stream, and they cannot open a nested solution:
//!
//! ```compile_fail
//! use exercise_gen::{GenerationContext, Identity};
//!
//! let ctx = GenerationContext::new(Identity::new(1, 0, 7).unwrap());
//! let _ = ctx.enter(|g| {
//!     g.solution(|s| {
//!         let _ = s.draw();
//!         Ok(())
//!     })
//! });
//! ```
//!
//! ```compile_fail
//! use exercise_gen::{GenerationContext, Identity};
//!
//! let ctx = GenerationContext::new(Identity::new(1, 0, 7).unwrap());
//! let _ = ctx.enter(|g| {
//!     g.solution(|_| {
//!         let _ = g.draw();
//!         Ok(())
//!     })
//! });
//! ```

use std::collections::BTreeSet;

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, warn};

use crate::exercise_engine::{
    choice::{self, ChoiceDeck, WeightedChoices},
    code,
    error::{Error, Result},
    models::Identity,
    output::{Frame, Output, TextOutput},
};

/// Exclusive upper bound of the cosmetic theme hue.
pub const THEME_HUES: u16 = 360;

// ---------------------------------------------------------------------------
// Setup state
// ---------------------------------------------------------------------------

/// A context that has not started generating yet.
pub struct GenerationContext<'a> {
    identity: Identity,
    output: Option<Box<dyn Output + 'a>>,
    show_solutions: bool,
    visible_parts: Option<BTreeSet<u32>>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(identity: Identity) -> Self {
        GenerationContext {
            identity,
            output: None,
            show_solutions: false,
            visible_parts: None,
        }
    }

    /// Context for the exercise behind a text code.
    pub fn from_code(text: &str) -> Result<Self> {
        Ok(GenerationContext::new(code::decode(text)?))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Install the output collaborator. May be called once; a
    /// [`TextOutput`] on stdout is used if it never is.
    pub fn set_output(&mut self, output: Box<dyn Output + 'a>) -> Result<()> {
        if self.output.is_some() {
            return Err(Error::Precondition("output already configured".into()));
        }
        self.output = Some(output);
        Ok(())
    }

    /// Reveal solution blocks. There is no way to hide them again.
    pub fn show_solutions(&mut self) {
        self.show_solutions = true;
    }

    /// Only show the listed 1-based parts. Hidden parts still execute.
    pub fn set_visible_parts(&mut self, parts: impl IntoIterator<Item = u32>) -> Result<()> {
        let parts: BTreeSet<u32> = parts.into_iter().collect();
        if parts.contains(&0) {
            return Err(Error::Precondition("part numbers start at 1".into()));
        }
        self.visible_parts = Some(parts);
        Ok(())
    }

    /// Run `body` as the one and only generation pass of this context.
    ///
    /// The random stream is seeded from the identity and its first draw picks
    /// the theme hue, before `body` sees it. The output is flushed on every
    /// exit path; an error from `body` wins over a flush error.
    pub fn enter<T, F>(self, body: F) -> Result<GenerationSummary<T>>
    where
        F: FnOnce(&mut Generation<'a>) -> Result<T>,
    {
        let GenerationContext { identity, output, show_solutions, visible_parts } = self;
        let output: Box<dyn Output + 'a> = match output {
            Some(output) => output,
            None => Box::new(TextOutput::stdout()),
        };

        let mut rng = ChaCha20Rng::seed_from_u64(identity.seed() as u64);
        let theme_hue = rng.gen_range(0..THEME_HUES);

        let mut gen = Generation {
            identity,
            rng,
            theme_hue,
            show_solutions,
            visible_parts,
            part: 0,
            parts_opened: 0,
            output,
            closed: false,
        };

        debug!(
            kind = identity.kind(),
            difficulty = identity.difficulty(),
            theme_hue,
            show_solutions = gen.show_solutions,
            "entering generation"
        );

        let frame = Frame {
            code: identity.code(),
            kind: identity.kind(),
            difficulty: identity.difficulty(),
            theme_hue,
        };
        gen.output.begin_exercise(&frame);
        let result = body(&mut gen);
        if result.is_ok() {
            gen.output.end_exercise();
        }
        let flushed = gen.close();

        let value = result?;
        flushed?;
        Ok(GenerationSummary {
            value,
            identity,
            theme_hue,
            parts_opened: gen.parts_opened,
            stream_position: gen.stream_position(),
        })
    }
}

/// What is left once a context has closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary<T> {
    /// Whatever the generator closure returned.
    pub value: T,
    pub identity: Identity,
    pub theme_hue: u16,
    /// Sections opened across all variants.
    pub parts_opened: u32,
    /// Position of the random stream after generation, in 32-bit words.
    pub stream_position: u128,
}

// ---------------------------------------------------------------------------
// Working state
// ---------------------------------------------------------------------------

/// The working state handed to generator code inside [`GenerationContext::enter`].
pub struct Generation<'a> {
    identity: Identity,
    rng: ChaCha20Rng,
    theme_hue: u16,
    show_solutions: bool,
    visible_parts: Option<BTreeSet<u32>>,
    part: u32,
    parts_opened: u32,
    output: Box<dyn Output + 'a>,
    closed: bool,
}

impl<'a> Generation<'a> {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn difficulty(&self) -> i8 {
        self.identity.difficulty()
    }

    pub fn theme_hue(&self) -> u16 {
        self.theme_hue
    }

    /// Number of the most recently opened part (0 before the first).
    pub fn part_number(&self) -> u32 {
        self.part
    }

    pub fn solutions_visible(&self) -> bool {
        self.show_solutions
    }

    /// Position of the random stream, in 32-bit words consumed.
    pub fn stream_position(&self) -> u128 {
        self.rng.get_word_pos()
    }

    // -- randomness --------------------------------------------------------

    /// Direct access to the seeded stream for `rand::Rng` style generators.
    pub fn rng(&mut self) -> &mut impl Rng {
        &mut self.rng
    }

    /// Uniform float in `[0, 1)`.
    pub fn draw(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Uniform value in `range`.
    pub fn draw_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.rng.gen_range(range)
    }

    pub fn choose<'o, T>(&mut self, options: &'o [T]) -> Option<&'o T> {
        choice::choose(&mut self.rng, options)
    }

    pub fn choose_with_prob<T>(&mut self, p: f64, a: T, b: T) -> T {
        choice::choose_with_prob(&mut self.rng, p, a, b)
    }

    pub fn deal<T: Clone>(&mut self, deck: &mut ChoiceDeck<T>) -> T {
        deck.draw(&mut self.rng)
    }

    pub fn pick<'w, T>(&mut self, choices: &'w WeightedChoices<T>) -> &'w T {
        choices.choose(&mut self.rng)
    }

    // -- structure ---------------------------------------------------------

    /// Open the next numbered part and run `body` inside it.
    ///
    /// A part outside the visible filter is still executed in full, heading
    /// included; only its text is silenced.
    pub fn section<T, F>(&mut self, title: &str, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.part += 1;
        self.parts_opened += 1;
        let number = self.part;
        let hidden = self
            .visible_parts
            .as_ref()
            .is_some_and(|visible| !visible.contains(&number));

        if hidden {
            debug!(part = number, "part hidden");
            self.output.silence();
        }
        let heading = if title.is_empty() {
            format!("Part {number}")
        } else {
            format!("Part {number}: {title}")
        };
        self.output.heading(2, &heading);
        let result = body(self);
        if hidden {
            self.output.unsilence();
        }
        result
    }

    /// Run `body` only when solutions are shown.
    ///
    /// The body gets a [`SolutionScope`] and so cannot touch the random stream.
    pub fn solution<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce(&mut SolutionScope<'_, 'a>) -> Result<()>,
    {
        if !self.show_solutions {
            return Ok(());
        }
        self.output.heading(3, "Solution");
        let mut scope = SolutionScope {
            identity: self.identity,
            part: self.part,
            output: &mut *self.output,
        };
        body(&mut scope)
    }

    /// Start a new independent instance within the same pass: strong divider,
    /// part numbers restart at 1.
    pub fn reset_part_counter(&mut self) {
        debug!(after_part = self.part, "resetting part counter");
        self.output.divider(true);
        self.part = 0;
    }

    // -- emission ----------------------------------------------------------

    pub fn heading(&mut self, level: u8, text: &str) {
        self.output.heading(level, text);
    }

    pub fn paragraph(&mut self, text: &str) {
        self.output.paragraph(text);
    }

    pub fn code_block(&mut self, code: &str) {
        self.output.code_block(code);
    }

    pub fn list(&mut self, items: &[String]) {
        self.output.list(items);
    }

    pub fn divider(&mut self) {
        self.output.divider(false);
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        let flushed = self.output.flush();
        debug!(parts = self.parts_opened, ok = flushed.is_ok(), "generation closed");
        flushed.map_err(Error::from)
    }
}

impl Drop for Generation<'_> {
    // Only reached without `close` when the generator panicked.
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.output.flush() {
                warn!(error = %e, "flush failed while unwinding generation");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Solution scope
// ---------------------------------------------------------------------------

/// Emission-only view given to solution bodies.
pub struct SolutionScope<'s, 'a> {
    identity: Identity,
    part: u32,
    output: &'s mut (dyn Output + 'a),
}

impl SolutionScope<'_, '_> {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn part_number(&self) -> u32 {
        self.part
    }

    pub fn heading(&mut self, level: u8, text: &str) {
        self.output.heading(level, text);
    }

    pub fn paragraph(&mut self, text: &str) {
        self.output.paragraph(text);
    }

    pub fn code_block(&mut self, code: &str) {
        self.output.code_block(code);
    }

    pub fn list(&mut self, items: &[String]) {
        self.output.list(items);
    }
}
