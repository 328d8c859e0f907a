//! End-to-end demo of exercise codes and reproducible generation.
//!
//! Run with: `cargo run --example demo`
//! (set `RUST_LOG=exercise_gen=debug` to see lifecycle events)
//!
//! 1. **Mint** — a fresh times-table drill gets a seed from the OS RNG and
//!    prints its code.
//! 2. **Reproduce** — the same code is parsed back and regenerated with
//!    solutions shown; the questions are identical to step 1.
//! 3. **Hide parts** — only part 2 is shown, yet it matches step 2's part 2.
//! 4. **Variants** — three independent instances in one pass.

use exercise_gen::{
    ChoiceDeck, DifficultyRange, ExerciseGenerator, Generation, GenerationRequest, Registry,
    Result, TextOutput, WeightedChoices,
};
use rand::rngs::OsRng;
use tracing_subscriber::EnvFilter;

/// Times-table questions; operands come from a deck so repeats stay rare.
struct TimesTable;

impl ExerciseGenerator for TimesTable {
    fn kind(&self) -> u8 {
        1
    }

    fn name(&self) -> &str {
        "times table"
    }

    fn difficulty(&self) -> DifficultyRange {
        DifficultyRange::new(1, 2, 4)
    }

    fn generate(&self, gen: &mut Generation<'_>) -> Result<()> {
        let top = 5 + 5 * i64::from(gen.difficulty());
        let mut deck = ChoiceDeck::new((2..=top).collect::<Vec<_>>())?;
        for _ in 0..3 {
            gen.section("Multiply", |g| {
                let (a, b) = (g.deal(&mut deck), g.deal(&mut deck));
                g.paragraph(&format!("What is {a} × {b}?"));
                g.solution(|s| {
                    s.paragraph(&format!("{a} × {b} = {}", a * b));
                    Ok(())
                })
            })?;
        }
        Ok(())
    }
}

/// Unit conversion with a bias towards the easier units.
struct Units;

impl ExerciseGenerator for Units {
    fn kind(&self) -> u8 {
        2
    }

    fn name(&self) -> &str {
        "unit conversion"
    }

    fn difficulty(&self) -> DifficultyRange {
        DifficultyRange::new(1, 1, 3)
    }

    fn generate(&self, gen: &mut Generation<'_>) -> Result<()> {
        let units = WeightedChoices::new(vec![(("km", "m", 1000), 4), (("h", "min", 60), 2), (("kg", "g", 1000), 1)])?;
        gen.section("Convert", |g| {
            let &(from, to, factor) = g.pick(&units);
            let amount: i64 = g.draw_range(2..=20);
            g.paragraph(&format!("How many {to} are in {amount} {from}?"));
            g.solution(|s| {
                s.paragraph(&format!("{amount} {from} = {} {to}", amount * factor));
                Ok(())
            })
        })
    }
}

fn run(registry: &Registry, request: &GenerationRequest) -> Result<exercise_gen::Identity> {
    let summary = registry.generate(request, &mut OsRng, Box::new(TextOutput::stdout()))?;
    Ok(summary.identity)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut registry = Registry::new();
    registry.register(Box::new(TimesTable))?;
    registry.register(Box::new(Units))?;

    println!("\n══ 1. Fresh exercise ══\n");
    let id = run(&registry, &GenerationRequest::new_of_kind(1))?;
    println!("\nCode: {id}  (kind {}, difficulty {}, seed {})", id.kind(), id.difficulty(), id.seed());

    println!("\n══ 2. Same code, solutions shown ══\n");
    let mut request = GenerationRequest::from_code(id.code().to_uppercase());
    request.show_solutions = true;
    run(&registry, &request)?;

    println!("\n══ 3. Only part 2 ══\n");
    request.parts = Some([2].into());
    run(&registry, &request)?;

    println!("\n══ 4. Three unit-conversion variants ══\n");
    let request = GenerationRequest::from_json(r#"{ "kind": 2, "variants": 3, "show_solutions": true }"#)?;
    run(&registry, &request)?;

    println!("\n══ 5. A typo ══\n");
    let mut typo = id.code();
    let last = typo.pop().map(|c| if c == '0' { '1' } else { '0' }).unwrap_or('0');
    typo.push(last);
    match typo.parse::<exercise_gen::Identity>() {
        Ok(_) => println!("{typo}: accepted (1 in 65536 chance)"),
        Err(e) => println!("{typo}: {e}"),
    }
    Ok(())
}
