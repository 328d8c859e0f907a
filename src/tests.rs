//! Unit tests for the `exercise_gen` crate.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Codes | Known vectors; every single-character typo is caught; invalid input errors |
//! | Determinism | Same code → identical page; different seeds → varied pages |
//! | Solutions | Showing solutions leaves every non-solution line and the random stream untouched |
//! | Parts | Hiding a part leaves the other parts and the random stream untouched |
//! | Registry | JSON request → minted or decoded identity → rendered variants |
//! | Entropy | Minting from the OS RNG yields a code that decodes back |

use std::collections::BTreeMap;

use rand::rngs::OsRng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::exercise_engine::{
    ChoiceDeck, DifficultyRange, Error, ExerciseGenerator, Generation, GenerationContext,
    GenerationRequest, GenerationSummary, Identity, Registry, Result, TextOutput,
    WeightedChoices,
};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Three-part arithmetic drill exercising every kind of draw.
struct ArithmeticDrill;

impl ExerciseGenerator for ArithmeticDrill {
    fn kind(&self) -> u8 {
        4
    }

    fn name(&self) -> &str {
        "arithmetic drill"
    }

    fn difficulty(&self) -> DifficultyRange {
        DifficultyRange::new(1, 2, 5)
    }

    fn generate(&self, gen: &mut Generation<'_>) -> Result<()> {
        let ops = WeightedChoices::new(vec![('+', 3), ('-', 2), ('*', 1)])?;
        let mut operands = ChoiceDeck::new((2..=9).collect::<Vec<i64>>())?;
        let max = 10 * i64::from(gen.difficulty().max(1));

        for title in ["warm-up", "main", "challenge"] {
            gen.section(title, |g| {
                let a: i64 = g.draw_range(1..=max);
                let b = g.deal(&mut operands);
                let op = *g.pick(&ops);
                let result = match op {
                    '+' => a + b,
                    '-' => a - b,
                    _ => a * b,
                };
                g.paragraph(&format!("Compute {a} {op} {b}."));
                g.solution(|s| {
                    s.paragraph(&format!("answer: {result}"));
                    Ok(())
                })?;
                let hint = g.choose_with_prob(0.3, "Work left to right.", "Check your sign.");
                g.paragraph(hint);
                Ok(())
            })?;
        }
        Ok(())
    }
}

fn drill_identity(seed: i64) -> Identity {
    Identity::new(ArithmeticDrill.kind(), 3, seed).unwrap()
}

/// Run the drill for `id` and return the rendered page with the summary.
fn render(
    id: Identity,
    configure: impl FnOnce(&mut GenerationContext<'_>),
) -> (String, GenerationSummary<()>) {
    let mut page = Vec::new();
    let summary = {
        let mut ctx = GenerationContext::new(id);
        ctx.set_output(Box::new(TextOutput::new(&mut page))).unwrap();
        configure(&mut ctx);
        ctx.enter(|g| ArithmeticDrill.generate(g)).unwrap()
    };
    (String::from_utf8(page).unwrap(), summary)
}

/// Split a rendered page into its numbered parts.
fn parts(page: &str) -> BTreeMap<u32, String> {
    page.split("## Part ")
        .skip(1)
        .map(|chunk| {
            let number = chunk.split(':').next().unwrap().parse().unwrap();
            (number, chunk.to_string())
        })
        .collect()
}

/// Page lines that do not belong to a solution block.
fn without_solutions(page: &str) -> Vec<&str> {
    page.lines()
        .filter(|l| !l.is_empty() && *l != "### Solution" && !l.starts_with("answer:"))
        .collect()
}

/// Page lines without the framing markers, which always name the code.
fn content_lines(page: &str) -> Vec<&str> {
    without_solutions(page).into_iter().filter(|l| !l.starts_with("===")).collect()
}

// ── codes ────────────────────────────────────────────────────────────────────

#[test]
fn reference_codes_behave() {
    let id: Identity = "2qfj-dt51-3igm-pyk8".parse().unwrap();
    assert_eq!((id.kind(), id.difficulty(), id.seed()), (0, 0, i64::MAX));
    assert!(matches!("2qfj-dt51-3igm-pyk9".parse::<Identity>(), Err(Error::Checksum { .. })));
    assert!(matches!("2fqj-dt51-3igm-pyk8".parse::<Identity>(), Err(Error::Checksum { .. })));
}

#[test]
fn every_single_character_typo_is_caught() {
    let code = "136u-ptxo-3qcm-e0zy-ev";
    assert!(code.parse::<Identity>().is_ok());
    let alphabet: Vec<char> = ('0'..='9').chain('a'..='z').collect();
    for (i, original) in code.char_indices().filter(|&(_, c)| c != '-') {
        for &replacement in alphabet.iter().filter(|&&c| c != original) {
            let mut typo = code.to_string();
            typo.replace_range(i..i + 1, &replacement.to_string());
            assert!(
                matches!(typo.parse::<Identity>(), Err(Error::Checksum { .. })),
                "typo {typo} was not caught"
            );
        }
    }
}

#[test]
fn invalid_input_never_decodes() {
    for bad in ["", " ", "hello world", "12#4", "zzzz-zzzz-zzzz-zzzz-zzzz"] {
        let err = bad.parse::<Identity>().unwrap_err();
        assert!(err.is_code_error(), "{bad:?} gave {err}");
        assert!(matches!(err, Error::Format(_) | Error::Overflow { .. }), "{bad:?} gave {err}");
    }
}

#[test]
fn minted_codes_decode_back() {
    for kind in [0, 17, 127] {
        let id = Identity::mint(kind, -2, &mut OsRng).unwrap();
        assert_eq!(id.code().parse::<Identity>().unwrap(), id);
    }
}

// ── determinism ──────────────────────────────────────────────────────────────

#[test]
fn same_code_produces_identical_page() {
    let code = drill_identity(12345).code();
    let (a, sa) = render(code.parse().unwrap(), |_| {});
    let (b, sb) = render(code.parse().unwrap(), |_| {});
    assert_eq!(a, b);
    assert_eq!(sa, sb);
    assert!(a.contains(&code));
}

#[test]
fn different_seeds_produce_varied_pages() {
    let mut same = 0usize;
    let pairs = 40i64;
    for seed in 0..pairs {
        let (a, _) = render(drill_identity(seed), |_| {});
        let (b, _) = render(drill_identity(seed + 500), |_| {});
        if content_lines(&a) == content_lines(&b) {
            same += 1;
        }
    }
    assert!(same < pairs as usize / 4, "too many identical pages ({same}/{pairs})");
}

// ── solutions ────────────────────────────────────────────────────────────────

#[test]
fn showing_solutions_does_not_change_content() {
    for seed in [1, 42, 999, 0xDEAD_BEEF, -7] {
        let id = drill_identity(seed);
        let (plain, plain_summary) = render(id, |_| {});
        let (full, full_summary) = render(id, |ctx| ctx.show_solutions());

        assert!(!plain.contains("answer:"));
        assert_eq!(full.matches("### Solution").count(), 3);
        assert_eq!(without_solutions(&plain), without_solutions(&full), "seed {seed}");
        assert_eq!(plain_summary.stream_position, full_summary.stream_position);
        assert_eq!(plain_summary.theme_hue, full_summary.theme_hue);
    }
}

// ── parts ────────────────────────────────────────────────────────────────────

#[test]
fn hiding_a_part_leaves_the_others_untouched() {
    for seed in [3, 1_000_003, i64::MIN] {
        let id = drill_identity(seed);
        let (all, all_summary) = render(id, |_| {});
        let (some, some_summary) = render(id, |ctx| ctx.set_visible_parts([1, 3]).unwrap());

        let (all_parts, some_parts) = (parts(&all), parts(&some));
        assert_eq!(all_parts.len(), 3);
        assert_eq!(some_parts.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(all_parts[&1], some_parts[&1]);
        assert_eq!(all_parts[&3], some_parts[&3]);
        assert_eq!(all_summary.stream_position, some_summary.stream_position);
        assert_eq!(some_summary.parts_opened, 3);
    }
}

#[test]
fn hiding_every_part_keeps_the_frame() {
    let (page, summary) = render(drill_identity(8), |ctx| ctx.set_visible_parts(Vec::new()).unwrap());
    assert!(parts(&page).is_empty());
    assert!(page.starts_with("=== exercise"));
    assert_eq!(summary.parts_opened, 3);
}

// ── registry ─────────────────────────────────────────────────────────────────

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(Box::new(ArithmeticDrill)).unwrap();
    registry
}

#[test]
fn json_request_runs_end_to_end() {
    let request = GenerationRequest::from_json(
        r#"{ "kind": 4, "show_solutions": true, "parts": [2], "variants": 2 }"#,
    )
    .unwrap();
    let mut page = Vec::new();
    let summary = registry()
        .generate(&request, &mut ChaCha20Rng::seed_from_u64(1), Box::new(TextOutput::new(&mut page)))
        .unwrap();
    let page = String::from_utf8(page).unwrap();

    assert_eq!(summary.identity.difficulty(), 2);
    assert_eq!(summary.parts_opened, 6);
    assert_eq!(page.matches("## Part 2: main").count(), 2);
    assert!(!page.contains("warm-up"));
    assert_eq!(page.matches("### Solution").count(), 2);
}

#[test]
fn regenerating_from_the_printed_code_matches() {
    let minted = registry()
        .generate(
            &GenerationRequest::new_of_kind(4),
            &mut ChaCha20Rng::seed_from_u64(2),
            Box::new(TextOutput::new(Vec::new())),
        )
        .unwrap();

    let mut first = Vec::new();
    let mut second = Vec::new();
    let request = GenerationRequest::from_code(minted.identity.code());
    registry()
        .generate(&request, &mut ChaCha20Rng::seed_from_u64(3), Box::new(TextOutput::new(&mut first)))
        .unwrap();
    registry()
        .generate(&request, &mut OsRng, Box::new(TextOutput::new(&mut second)))
        .unwrap();
    assert_eq!(first, second);
}
