use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::exercise_engine::{
    code,
    context::{Generation, GenerationContext, GenerationSummary},
    error::{Error, Result},
    models::{DifficultyRange, GenerationRequest, Identity, MAX_KIND},
    output::Output,
};

/// One kind of exercise.
///
/// Implementations draw all randomness from the [`Generation`] they are given
/// and put worked answers inside [`Generation::solution`] blocks.
pub trait ExerciseGenerator {
    /// Kind byte stored in the exercise code; unique within a [`Registry`].
    fn kind(&self) -> u8;
    fn name(&self) -> &str;
    fn difficulty(&self) -> DifficultyRange;
    fn generate(&self, gen: &mut Generation<'_>) -> Result<()>;
}

/// Generators indexed by kind.
#[derive(Default)]
pub struct Registry {
    generators: Vec<Box<dyn ExerciseGenerator>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, generator: Box<dyn ExerciseGenerator>) -> Result<()> {
        let kind = generator.kind();
        if kind > MAX_KIND {
            return Err(Error::Precondition(format!("generator kind {kind} exceeds {MAX_KIND}")));
        }
        if self.get(kind).is_some() {
            return Err(Error::Precondition(format!("kind {kind} registered twice")));
        }
        self.generators.push(generator);
        Ok(())
    }

    pub fn get(&self, kind: u8) -> Option<&dyn ExerciseGenerator> {
        self.generators.iter().find(|g| g.kind() == kind).map(|g| g.as_ref())
    }

    pub fn kinds(&self) -> Vec<u8> {
        let mut kinds: Vec<u8> = self.generators.iter().map(|g| g.kind()).collect();
        kinds.sort_unstable();
        kinds
    }

    fn lookup(&self, kind: u8) -> Result<&dyn ExerciseGenerator> {
        self.get(kind)
            .ok_or_else(|| Error::Precondition(format!("no generator registered for kind {kind}")))
    }

    /// Work out which exercise a request refers to.
    ///
    /// A code is decoded as-is. Otherwise a fresh seed is drawn from
    /// `entropy` for the requested kind, at the requested difficulty or the
    /// generator's goal difficulty.
    pub fn resolve_identity<R: RngCore + CryptoRng>(
        &self,
        request: &GenerationRequest,
        entropy: &mut R,
    ) -> Result<Identity> {
        if let Some(text) = &request.code {
            let id = code::decode(text)?;
            self.lookup(id.kind())?;
            return Ok(id);
        }

        let kind = request
            .kind
            .ok_or_else(|| Error::Precondition("request names neither a code nor a kind".into()))?;
        let range = self.lookup(kind)?.difficulty();
        let difficulty = request.difficulty.unwrap_or(range.goal);
        if !range.contains(difficulty) {
            return Err(Error::Precondition(format!(
                "difficulty {difficulty} outside {range} for kind {kind}"
            )));
        }
        Identity::mint(kind, difficulty, entropy)
    }

    /// Single entry point: resolve the identity, configure a context from the
    /// request and run the matching generator `variants` times in one pass.
    pub fn generate<'a, R: RngCore + CryptoRng>(
        &self,
        request: &GenerationRequest,
        entropy: &mut R,
        output: Box<dyn Output + 'a>,
    ) -> Result<GenerationSummary<()>> {
        if request.variants == 0 {
            return Err(Error::Precondition("at least one variant must be requested".into()));
        }
        let identity = self.resolve_identity(request, entropy)?;
        let generator = self.lookup(identity.kind())?;
        debug!(kind = identity.kind(), name = generator.name(), variants = request.variants, "dispatching");

        let mut ctx = GenerationContext::new(identity);
        ctx.set_output(output)?;
        if request.show_solutions {
            ctx.show_solutions();
        }
        if let Some(parts) = &request.parts {
            ctx.set_visible_parts(parts.iter().copied())?;
        }

        ctx.enter(|gen| {
            for variant in 0..request.variants {
                if variant > 0 {
                    gen.reset_part_counter();
                }
                generator.generate(gen)?;
            }
            Ok(())
        })
    }
}
