use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::exercise_engine::{
    code,
    error::{Error, Result},
};

/// Largest kind that fits the one-byte kind field.
pub const MAX_KIND: u8 = 127;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The `(kind, difficulty, seed)` triple that fully determines one exercise.
///
/// Fields are private so that every `Identity` in existence has a kind in
/// `0..=MAX_KIND`; this is what lets [`code::encode`] be infallible.
/// Serialized as its canonical text code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Identity {
    kind: u8,
    difficulty: i8,
    seed: i64,
}

impl Identity {
    pub fn new(kind: u8, difficulty: i8, seed: i64) -> Result<Self> {
        if kind > MAX_KIND {
            return Err(Error::Precondition(format!(
                "kind {kind} out of range 0..={MAX_KIND}"
            )));
        }
        Ok(Identity { kind, difficulty, seed })
    }

    /// Mint a fresh identity with a seed drawn from `entropy`.
    ///
    /// The entropy source is only used for the seed; exercise content always
    /// comes from the seeded generator stream.
    pub fn mint<R: RngCore + CryptoRng>(kind: u8, difficulty: i8, entropy: &mut R) -> Result<Self> {
        Identity::new(kind, difficulty, entropy.next_u64() as i64)
    }

    pub fn kind(&self) -> u8 {
        self.kind
    }

    pub fn difficulty(&self) -> i8 {
        self.difficulty
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Canonical text code for this identity.
    pub fn code(&self) -> String {
        code::encode(self)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", code::encode(self))
    }
}

impl FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        code::decode(s)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> String {
        code::encode(&id)
    }
}

impl TryFrom<String> for Identity {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        code::decode(&s)
    }
}

// ---------------------------------------------------------------------------
// Generator metadata
// ---------------------------------------------------------------------------

/// Difficulty bounds declared by an exercise generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyRange {
    pub min: i8,
    /// Difficulty used when minting without an explicit request.
    pub goal: i8,
    pub max: i8,
}

impl DifficultyRange {
    pub fn new(min: i8, goal: i8, max: i8) -> Self {
        DifficultyRange { min, goal, max }
    }

    pub fn contains(&self, difficulty: i8) -> bool {
        (self.min..=self.max).contains(&difficulty)
    }
}

impl fmt::Display for DifficultyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} (goal {})", self.min, self.max, self.goal)
    }
}

// ---------------------------------------------------------------------------
// Generation request
// ---------------------------------------------------------------------------

/// Everything a caller can configure for one generation run.
///
/// `code` takes precedence over `kind`; when only `kind` is given a fresh
/// identity is minted. Solution visibility and the part filter are display
/// preferences and never change what gets generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    pub code: Option<String>,
    pub kind: Option<u8>,
    pub difficulty: Option<i8>,
    pub show_solutions: bool,
    /// 1-based part numbers to show; `None` shows every part.
    pub parts: Option<BTreeSet<u32>>,
    /// Number of independent instances to produce back to back.
    pub variants: u32,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        GenerationRequest {
            code: None,
            kind: None,
            difficulty: None,
            show_solutions: false,
            parts: None,
            variants: 1,
        }
    }
}

impl GenerationRequest {
    /// Request that reproduces the exercise behind `code`.
    pub fn from_code(code: impl Into<String>) -> Self {
        GenerationRequest { code: Some(code.into()), ..Default::default() }
    }

    /// Request for a fresh exercise of `kind`.
    pub fn new_of_kind(kind: u8) -> Self {
        GenerationRequest { kind: Some(kind), ..Default::default() }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Precondition(format!("malformed generation request: {e}")))
    }
}
