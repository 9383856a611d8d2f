use rand::Rng;
use serde::Serialize;

use crate::cards::Rarity;

/// One weighted outcome within a slot: a rarity, the probability of rolling
/// it, and an optional source-set override.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEntry {
    pub rarity: Rarity,
    pub probability: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,
}

/// One pull position in a pack. Entries are ordered and their probabilities
/// sum to exactly 100; compilation enforces the invariant, so the entry list
/// is not writable from outside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotSpec {
    entries: Vec<SlotEntry>,
}

impl SlotSpec {
    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    /// Roll one weighted choice from this slot. A uniform draw in [0, 100)
    /// walks the entries in declaration order; the first entry whose
    /// cumulative probability exceeds the draw wins. Entries sum to 100, so
    /// the walk always selects one and the trailing first-entry fallback is
    /// unreachable for compiled slots.
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> Option<&SlotEntry> {
        let roll = rng.gen_range(0.0..100.0);
        let mut cumulative = 0.0;
        for entry in &self.entries {
            cumulative += f64::from(entry.probability);
            if roll < cumulative {
                return Some(entry);
            }
        }
        self.entries.first()
    }
}

/// Result of compiling a booster template definition. Compilation never
/// fails as a function: it returns every valid slot alongside every error
/// found, either of which may be empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledTemplate {
    pub slots: Vec<SlotSpec>,
    pub errors: Vec<String>,
}

/// Validation summary for a definition, as reported to template editors.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,

    /// Count of valid slots in the definition.
    pub slots: usize,
}

/// Compile a booster template definition.
///
/// A definition is a semicolon-separated list of slots, optionally wrapped
/// in braces. Each slot alternates rarity codes and integer probabilities,
/// e.g. `{r,75,m,25;u,100;c,100}`; a rarity code may carry a source-set
/// prefix (`neo:r`). Slots with errors are dropped without affecting their
/// siblings, and every probability list must sum to exactly 100.
pub fn compile(definition: &str) -> CompiledTemplate {
    let mut slots = Vec::new();
    let mut errors = Vec::new();

    let cleaned = definition.trim();
    let cleaned = cleaned.strip_prefix('{').unwrap_or(cleaned);
    let cleaned = cleaned.strip_suffix('}').unwrap_or(cleaned);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        errors.push("Empty definition".to_string());
        return CompiledTemplate { slots, errors };
    }

    for (index, slot_str) in cleaned.split(';').enumerate() {
        let slot_str = slot_str.trim();
        if slot_str.is_empty() {
            continue;
        }

        // Errors number slots by position in the definition, so a blank
        // entry between semicolons still occupies a number.
        let number = index + 1;

        match parse_slot(number, slot_str) {
            Ok(entries) => {
                let total: u32 = entries.iter().map(|e| e.probability).sum();
                if total != 100 {
                    errors.push(format!(
                        "Slot {number}: probabilities sum to {total}%, must be 100%."
                    ));
                    continue;
                }
                slots.push(SlotSpec { entries });
            }
            Err(error) => errors.push(error),
        }
    }

    if slots.is_empty() && errors.is_empty() {
        errors.push("No valid slots found in definition.".to_string());
    }

    tracing::debug!(
        "Compiled booster template: {} slots, {} errors.",
        slots.len(),
        errors.len()
    );

    CompiledTemplate { slots, errors }
}

/// Parse one slot's comma-separated token pairs. The first error abandons
/// the whole slot.
fn parse_slot(number: usize, slot_str: &str) -> Result<Vec<SlotEntry>, String> {
    let tokens: Vec<String> = slot_str
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .collect();

    let mut entries = Vec::new();
    let mut iter = tokens.iter();
    while let Some(raw) = iter.next() {
        let (set_code, code) = match raw.split_once(':') {
            Some((set_code, code)) => (Some(set_code.to_string()), code),
            None => (None, raw.as_str()),
        };

        let Some(rarity) = Rarity::from_code(code) else {
            return Err(format!(
                "Slot {number}: unknown rarity \"{code}\". Use c, u, r, or m. \
                 (Optional set prefix: setcode:r)"
            ));
        };

        let Some(prob_token) = iter.next() else {
            return Err(format!(
                "Slot {number}: missing probability after rarity \"{code}\"."
            ));
        };

        let probability = match prob_token.parse::<u32>() {
            Ok(p) if (1..=100).contains(&p) => p,
            _ => {
                return Err(format!(
                    "Slot {number}: invalid probability \"{prob_token}\". Must be 1-100."
                ));
            }
        };

        entries.push(SlotEntry {
            rarity,
            probability,
            set_code,
        });
    }

    Ok(entries)
}

/// Run compilation and summarise the outcome for template editors.
pub fn validate(definition: &str) -> ValidationReport {
    let compiled = compile(definition);
    ValidationReport {
        valid: compiled.errors.is_empty(),
        slots: compiled.slots.len(),
        errors: compiled.errors,
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::cards::Rarity;

    use super::{compile, validate};

    #[test]
    fn test_empty_definition() {
        for definition in ["", "   ", "{}", "{ }"] {
            let compiled = compile(definition);
            assert!(compiled.slots.is_empty());
            assert!(compiled.errors == vec!["Empty definition".to_string()]);
        }
    }

    #[test]
    fn test_compile_play_style_template() {
        let compiled = compile("{r,75,m,25;u,100;c,100;c,100;c,100}");
        assert!(compiled.errors.is_empty());
        assert!(compiled.slots.len() == 5);

        let first = compiled.slots[0].entries();
        assert!(first.len() == 2);
        assert!(first[0].rarity == Rarity::Rare);
        assert!(first[0].probability == 75);
        assert!(first[0].set_code.is_none());
        assert!(first[1].rarity == Rarity::Mythic);
        assert!(first[1].probability == 25);

        assert!(compiled.slots[1].entries()[0].rarity == Rarity::Uncommon);
        assert!(compiled.slots[2].entries()[0].rarity == Rarity::Common);
    }

    #[test]
    fn test_unknown_rarity_drops_slot() {
        let compiled = compile("{x,50,c,50}");
        assert!(compiled.slots.is_empty());
        assert!(compiled.errors.len() == 1);
        assert!(compiled.errors[0].contains("unknown rarity \"x\""));
        assert!(compiled.errors[0].contains("Slot 1"));
    }

    #[test]
    fn test_bad_sum_drops_slot_only() {
        let compiled = compile("{c,60,u,30;u,100}");
        assert!(compiled.slots.len() == 1);
        assert!(compiled.errors.len() == 1);
        assert!(compiled.errors[0].contains("sum to 90%"));
        assert!(compiled.slots[0].entries()[0].rarity == Rarity::Uncommon);
    }

    #[test]
    fn test_set_code_prefix() {
        let compiled = compile("{neo:r,75,neo:m,25}");
        assert!(compiled.errors.is_empty());
        assert!(compiled.slots.len() == 1);

        let entries = compiled.slots[0].entries();
        assert!(entries.len() == 2);
        assert!(entries[0].set_code.as_deref() == Some("neo"));
        assert!(entries[1].set_code.as_deref() == Some("neo"));
    }

    #[test]
    fn test_missing_probability() {
        let compiled = compile("{c,100,u}");
        assert!(compiled.slots.is_empty());
        assert!(compiled.errors.len() == 1);
        assert!(compiled.errors[0].contains("missing probability after rarity \"u\""));
    }

    #[test]
    fn test_invalid_probabilities() {
        for definition in ["{c,0}", "{c,101}", "{c,abc}", "{c,9.5}"] {
            let compiled = compile(definition);
            assert!(compiled.slots.is_empty(), "accepted {definition}");
            assert!(compiled.errors.len() == 1);
            assert!(compiled.errors[0].contains("invalid probability"));
        }
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let compiled = compile("{ C , 100 ; NEO:R , 100 }");
        assert!(compiled.errors.is_empty());
        assert!(compiled.slots.len() == 2);
        assert!(compiled.slots[0].entries()[0].rarity == Rarity::Common);
        assert!(compiled.slots[1].entries()[0].set_code.as_deref() == Some("neo"));
    }

    #[test]
    fn test_blank_slots_skipped_but_numbered() {
        let compiled = compile("c,100;;x,100");
        assert!(compiled.slots.len() == 1);
        assert!(compiled.errors.len() == 1);
        assert!(compiled.errors[0].contains("Slot 3"));
    }

    #[test]
    fn test_only_blank_slots() {
        let compiled = compile(";;;");
        assert!(compiled.slots.is_empty());
        assert!(compiled.errors == vec!["No valid slots found in definition.".to_string()]);
    }

    #[test]
    fn test_errors_do_not_abort_sibling_slots() {
        let compiled = compile("{x,100;u,100;c,50,c,50}");
        assert!(compiled.slots.len() == 2);
        assert!(compiled.errors.len() == 1);
        assert!(compiled.errors[0].contains("Slot 1"));
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let definition = "{neo:r,75,m,25;u,100;c,100}";
        assert!(compile(definition) == compile(definition));
    }

    #[test]
    fn test_compiled_slots_sum_to_hundred() {
        let compiled = compile("{r,75,m,25;u,100;c,50,u,30,r,20}");
        assert!(compiled.errors.is_empty());
        for slot in &compiled.slots {
            let total: u32 = slot.entries().iter().map(|e| e.probability).sum();
            assert!(total == 100);
        }
    }

    #[test]
    fn test_validation_report() {
        let report = validate("{r,75,m,25;u,100}");
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.slots == 2);

        let report = validate("{x,100}");
        assert!(!report.valid);
        assert!(report.errors.len() == 1);
        assert!(report.slots == 0);
    }

    #[test]
    fn test_resolve_always_selects_sole_entry() {
        let compiled = compile("{c,100}");
        let slot = &compiled.slots[0];
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let entry = slot.resolve(&mut rng).unwrap();
            assert!(entry.rarity == Rarity::Common);
        }
    }

    #[test]
    fn test_resolve_distribution() {
        let compiled = compile("{c,90,u,10}");
        assert!(compiled.errors.is_empty());
        let slot = &compiled.slots[0];

        const DRAWS: usize = 100_000;
        let mut rng = StdRng::seed_from_u64(1);
        let mut commons = 0usize;
        for _ in 0..DRAWS {
            if slot.resolve(&mut rng).unwrap().rarity == Rarity::Common {
                commons += 1;
            }
        }

        let share = commons as f64 / DRAWS as f64;
        assert!(
            (share - 0.9).abs() < 0.02,
            "common share {share} outside tolerance"
        );
    }
}
