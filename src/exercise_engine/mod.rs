//! Core engine — exercise codes, seeded generation and the generation lifecycle.
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `models`    | Shared types: identity, difficulty ranges, generation requests |
//! | `code`      | Checksummed base-36 text codes and their byte layout |
//! | `choice`    | Uniform, Bernoulli, deck and weighted selection over a supplied RNG |
//! | `output`    | Output collaborator trait and the default plain-text renderer |
//! | `context`   | Setup → working → closed lifecycle, sections and solution gating |
//! | `generator` | Generator trait, registry and the single `generate` entry point |
//! | `error`     | Error taxonomy shared by all of the above |

pub mod choice;
pub mod code;
pub mod context;
pub mod error;
pub mod generator;
pub mod models;
pub mod output;

// Re-export the public API surface so callers can use
// `exercise_engine::GenerationContext` without reaching into sub-modules.
pub use choice::{choose, choose_with_prob, ChoiceDeck, WeightedChoices};
pub use code::{decode, encode, Layout};
pub use context::{Generation, GenerationContext, GenerationSummary, SolutionScope};
pub use error::{Error, Result};
pub use generator::{ExerciseGenerator, Registry};
pub use models::{DifficultyRange, GenerationRequest, Identity, MAX_KIND};
pub use output::{Frame, Output, TextOutput};
