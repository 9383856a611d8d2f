use std::collections::HashSet;

use rand::{seq::SliceRandom, thread_rng, Rng};

use crate::cards::{Card, CardPool, Rarity};

use super::{
    template::SlotSpec, BoosterKind, DrawnCard, LEGACY_FOIL_CHANCE, MYTHIC_CHANCE,
    PLAY_FOIL_WILDCARD_ALT_CHANCE, PLAY_WILDCARD_ALT_CHANCE,
};

/// Which art category a sub-pool is drawn from.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Art {
    Normal,
    Alt,
    Any,
}

fn matches_art(card: &Card, art: Art) -> bool {
    match art {
        Art::Normal => !card.is_alt_art(),
        Art::Alt => card.is_alt_art(),
        Art::Any => true,
    }
}

/// The two collector-booster special slots select on frame treatment rather
/// than the broader alternate-art predicate.
#[derive(Clone, Copy)]
enum FrameTreatment {
    /// Extended-art or borderless rares and mythics.
    Extended,
    /// Showcase or borderless rares and mythics.
    Showcase,
}

/// Which art category a built-in slot prefers when both exist.
#[derive(Clone, Copy)]
enum ArtPreference {
    /// Alternate-art cards if any exist, else normal-frame cards.
    AltFirst,
    /// Normal-frame cards if any exist, else the whole rarity pool.
    NormalFirst,
    /// No art partitioning.
    Any,
}

/// What a built-in booster slot draws from. A policy is a sequence of these
/// plus a foil flag, consumed by one shared assembly loop.
#[derive(Clone, Copy)]
enum SlotSource {
    Common(ArtPreference),
    Uncommon(ArtPreference),
    RareMythic(ArtPreference),

    /// Rolls the alt-art pool at the given odds, else the normal pool.
    Wildcard { alt_chance: f64 },

    /// Frame-treatment special, falling back through alt-art then normal
    /// rares and mythics when no qualifying card exists.
    Special(FrameTreatment),

    /// Any card in the set.
    AnyCard,
}

#[derive(Clone, Copy)]
struct SlotRequest {
    source: SlotSource,
    foil: bool,
}

fn push_slots(slots: &mut Vec<SlotRequest>, count: usize, source: SlotSource, foil: bool) {
    for _ in 0..count {
        slots.push(SlotRequest { source, foil });
    }
}

fn first_non_empty<'a>(primary: Vec<&'a Card>, fallback: Vec<&'a Card>) -> Vec<&'a Card> {
    if primary.is_empty() {
        fallback
    } else {
        primary
    }
}

/// The enabled, non-basic-land cards of one set, partitioned on demand into
/// the art-category and rarity sub-pools the built-in policies draw from.
/// Pools are small, so partitions are derived per slot rather than cached.
pub struct BoosterPool<'a> {
    cards: Vec<&'a Card>,
}

impl<'a> BoosterPool<'a> {
    /// Basic lands are never pack contents, and disabled cards are excluded
    /// from generation entirely.
    pub fn new(cards: &'a [Card]) -> Self {
        Self {
            cards: cards
                .iter()
                .filter(|c| !c.disabled && !c.is_basic_land())
                .collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    /// Sub-pool of a single rarity, over every art category.
    pub fn cards_of(&self, rarity: Rarity) -> Vec<&'a Card> {
        self.of_rarity(Art::Any, rarity)
    }

    fn art(&self, art: Art) -> Vec<&'a Card> {
        self.cards
            .iter()
            .filter(|c| matches_art(c, art))
            .copied()
            .collect()
    }

    fn of_rarity(&self, art: Art, rarity: Rarity) -> Vec<&'a Card> {
        self.cards
            .iter()
            .filter(|c| c.rarity == rarity && matches_art(c, art))
            .copied()
            .collect()
    }

    fn rare_mythic(&self, art: Art) -> Vec<&'a Card> {
        self.cards
            .iter()
            .filter(|c| matches!(c.rarity, Rarity::Rare | Rarity::Mythic) && matches_art(c, art))
            .copied()
            .collect()
    }

    fn frame_special(&self, treatment: FrameTreatment) -> Vec<&'a Card> {
        self.cards
            .iter()
            .filter(|c| matches!(c.rarity, Rarity::Rare | Rarity::Mythic))
            .filter(|c| match treatment {
                FrameTreatment::Extended => c.has_frame_effect("extendedart") || c.is_borderless(),
                FrameTreatment::Showcase => c.is_borderless() || c.has_frame_effect("showcase"),
            })
            .copied()
            .collect()
    }

    fn commons(&self, preference: ArtPreference) -> Vec<&'a Card> {
        match preference {
            ArtPreference::AltFirst => first_non_empty(
                self.of_rarity(Art::Alt, Rarity::Common),
                self.of_rarity(Art::Normal, Rarity::Common),
            ),
            ArtPreference::NormalFirst => first_non_empty(
                self.of_rarity(Art::Normal, Rarity::Common),
                self.of_rarity(Art::Any, Rarity::Common),
            ),
            ArtPreference::Any => self.of_rarity(Art::Any, Rarity::Common),
        }
    }

    fn uncommons(&self, preference: ArtPreference) -> Vec<&'a Card> {
        match preference {
            ArtPreference::AltFirst => first_non_empty(
                self.of_rarity(Art::Alt, Rarity::Uncommon),
                self.of_rarity(Art::Normal, Rarity::Uncommon),
            ),
            ArtPreference::NormalFirst => first_non_empty(
                self.of_rarity(Art::Normal, Rarity::Uncommon),
                self.of_rarity(Art::Any, Rarity::Uncommon),
            ),
            // The legacy booster pads exhausted uncommons with commons.
            ArtPreference::Any => first_non_empty(
                self.of_rarity(Art::Any, Rarity::Uncommon),
                self.of_rarity(Art::Any, Rarity::Common),
            ),
        }
    }

    /// Rare and mythic pools for a rare/mythic slot, in that order.
    fn rare_pools(&self, preference: ArtPreference) -> (Vec<&'a Card>, Vec<&'a Card>) {
        match preference {
            ArtPreference::AltFirst => (
                first_non_empty(
                    self.of_rarity(Art::Alt, Rarity::Rare),
                    self.of_rarity(Art::Normal, Rarity::Rare),
                ),
                first_non_empty(
                    self.of_rarity(Art::Alt, Rarity::Mythic),
                    self.of_rarity(Art::Normal, Rarity::Mythic),
                ),
            ),
            ArtPreference::NormalFirst => (
                first_non_empty(
                    self.of_rarity(Art::Normal, Rarity::Rare),
                    self.of_rarity(Art::Any, Rarity::Rare),
                ),
                first_non_empty(
                    self.of_rarity(Art::Normal, Rarity::Mythic),
                    self.of_rarity(Art::Any, Rarity::Mythic),
                ),
            ),
            // The legacy booster pads an exhausted rare pool with commons.
            ArtPreference::Any => (
                first_non_empty(
                    self.of_rarity(Art::Any, Rarity::Rare),
                    self.of_rarity(Art::Any, Rarity::Common),
                ),
                self.of_rarity(Art::Any, Rarity::Mythic),
            ),
        }
    }

    fn fill_slot<R: Rng>(
        &self,
        request: SlotRequest,
        mythic_chance: f64,
        used: &mut HashSet<&'a str>,
        rng: &mut R,
    ) -> Option<&'a Card> {
        match request.source {
            SlotSource::Common(preference) => pick_unique(&self.commons(preference), used, rng),
            SlotSource::Uncommon(preference) => pick_unique(&self.uncommons(preference), used, rng),
            SlotSource::RareMythic(preference) => {
                let (rares, mythics) = self.rare_pools(preference);
                pick_unique_by_rarity(&rares, &mythics, mythic_chance, used, rng)
            }
            SlotSource::Wildcard { alt_chance } => {
                let alt = self.art(Art::Alt);
                let use_alt = rng.gen_range(0.0..=1.0) < alt_chance && !alt.is_empty();
                let pool = if use_alt { alt } else { self.art(Art::Normal) };
                let pool = first_non_empty(pool, self.cards.clone());
                pick_unique(&pool, used, rng)
            }
            SlotSource::Special(treatment) => {
                let pool = first_non_empty(
                    self.frame_special(treatment),
                    first_non_empty(self.rare_mythic(Art::Alt), self.rare_mythic(Art::Normal)),
                );
                pick_unique(&pool, used, rng)
            }
            SlotSource::AnyCard => pick_unique(&self.cards, used, rng),
        }
    }
}

/// Draw one card not yet in the pack if any remain. Once the pool is
/// exhausted within this pack a repeat is allowed rather than leaving the
/// slot unfilled; only an empty pool yields nothing.
fn pick_unique<'a, R: Rng>(
    pool: &[&'a Card],
    used: &mut HashSet<&'a str>,
    rng: &mut R,
) -> Option<&'a Card> {
    let available: Vec<&'a Card> = pool
        .iter()
        .filter(|c| !used.contains(c.id.as_str()))
        .copied()
        .collect();

    match available.choose(rng) {
        Some(&card) => {
            used.insert(card.id.as_str());
            Some(card)
        }
        None => pool.choose(rng).copied(),
    }
}

/// Draw for a rare/mythic slot: roll the mythic chance while an unused
/// mythic exists, otherwise prefer an unused rare, then an unused mythic,
/// and finally permit a repeat across the union of both pools.
fn pick_unique_by_rarity<'a, R: Rng>(
    rares: &[&'a Card],
    mythics: &[&'a Card],
    mythic_chance: f64,
    used: &mut HashSet<&'a str>,
    rng: &mut R,
) -> Option<&'a Card> {
    let avail_rares: Vec<&'a Card> = rares
        .iter()
        .filter(|c| !used.contains(c.id.as_str()))
        .copied()
        .collect();
    let avail_mythics: Vec<&'a Card> = mythics
        .iter()
        .filter(|c| !used.contains(c.id.as_str()))
        .copied()
        .collect();

    if !avail_mythics.is_empty() && rng.gen_range(0.0..=1.0) < mythic_chance {
        if let Some(&card) = avail_mythics.choose(rng) {
            used.insert(card.id.as_str());
            return Some(card);
        }
    }
    if let Some(&card) = avail_rares.choose(rng) {
        used.insert(card.id.as_str());
        return Some(card);
    }
    if let Some(&card) = avail_mythics.choose(rng) {
        used.insert(card.id.as_str());
        return Some(card);
    }

    let combined: Vec<&'a Card> = rares.iter().chain(mythics.iter()).copied().collect();
    pick_unique(&combined, used, rng)
}

fn collector_slots() -> Vec<SlotRequest> {
    use ArtPreference::AltFirst;

    let mut slots = Vec::new();
    push_slots(&mut slots, 2, SlotSource::Common(AltFirst), true);
    push_slots(&mut slots, 2, SlotSource::Uncommon(AltFirst), true);
    push_slots(&mut slots, 2, SlotSource::Uncommon(AltFirst), false);
    push_slots(&mut slots, 2, SlotSource::RareMythic(AltFirst), false);
    push_slots(&mut slots, 2, SlotSource::RareMythic(AltFirst), true);
    push_slots(
        &mut slots,
        1,
        SlotSource::Special(FrameTreatment::Extended),
        false,
    );
    push_slots(
        &mut slots,
        1,
        SlotSource::Special(FrameTreatment::Showcase),
        true,
    );
    push_slots(&mut slots, 3, SlotSource::Common(AltFirst), true);
    slots
}

fn play_slots() -> Vec<SlotRequest> {
    use ArtPreference::NormalFirst;

    let mut slots = Vec::new();
    push_slots(&mut slots, 6, SlotSource::Common(NormalFirst), false);
    push_slots(&mut slots, 3, SlotSource::Uncommon(NormalFirst), false);
    push_slots(&mut slots, 1, SlotSource::RareMythic(NormalFirst), false);
    push_slots(
        &mut slots,
        1,
        SlotSource::Wildcard {
            alt_chance: PLAY_WILDCARD_ALT_CHANCE,
        },
        false,
    );
    push_slots(
        &mut slots,
        1,
        SlotSource::Wildcard {
            alt_chance: PLAY_FOIL_WILDCARD_ALT_CHANCE,
        },
        true,
    );
    push_slots(&mut slots, 2, SlotSource::Common(NormalFirst), false);
    slots
}

fn legacy_slots<R: Rng>(rng: &mut R) -> Vec<SlotRequest> {
    use ArtPreference::Any;

    let mut slots = Vec::new();
    push_slots(&mut slots, 1, SlotSource::RareMythic(Any), false);
    push_slots(&mut slots, 3, SlotSource::Uncommon(Any), false);

    // A quarter of packs trade the last common for a foil of any rarity;
    // the card count stays the same either way.
    if rng.gen_range(0.0..=1.0) < LEGACY_FOIL_CHANCE {
        push_slots(&mut slots, 10, SlotSource::Common(Any), false);
        push_slots(&mut slots, 1, SlotSource::AnyCard, true);
    } else {
        push_slots(&mut slots, 11, SlotSource::Common(Any), false);
    }
    slots
}

/// Open a built-in booster from a set's card pool. `pack_type` names the
/// policy: "collector", "play" (for sets of the play-booster era), and
/// anything else opens the legacy booster.
pub fn generate_pack(
    cards: &[Card],
    pack_type: &str,
    release_date: Option<&str>,
) -> Vec<DrawnCard> {
    generate_pack_with_rng(cards, pack_type, release_date, &mut thread_rng())
}

pub fn generate_pack_with_rng<R: Rng>(
    cards: &[Card],
    pack_type: &str,
    release_date: Option<&str>,
    rng: &mut R,
) -> Vec<DrawnCard> {
    let pool = BoosterPool::new(cards);
    let kind = BoosterKind::select(pack_type, release_date);

    let mythic_chance = if pool.cards_of(Rarity::Mythic).is_empty() {
        0.0
    } else {
        MYTHIC_CHANCE
    };

    let slots = match kind {
        BoosterKind::Collector => collector_slots(),
        BoosterKind::Play => play_slots(),
        BoosterKind::Legacy => legacy_slots(rng),
    };

    tracing::debug!(
        "Opening {kind:?} booster: {} slots over {} cards.",
        slots.len(),
        pool.size()
    );

    let mut used = HashSet::new();
    let mut result = Vec::new();
    for request in slots {
        if let Some(card) = pool.fill_slot(request, mythic_chance, &mut used, rng) {
            result.push(DrawnCard {
                card: card.clone(),
                is_foil: request.foil,
                is_alt_art: card.is_alt_art(),
            });
        }
    }

    result
}

/// Open a custom-template booster: one card per compiled slot, drawn from
/// the slot's source set, or the pack's own set when no override is given.
/// Custom draws are never foil.
pub fn generate_custom_pack(
    pool: &CardPool,
    slots: &[SlotSpec],
    default_set_code: &str,
) -> Vec<DrawnCard> {
    generate_custom_pack_with_rng(pool, slots, default_set_code, &mut thread_rng())
}

pub fn generate_custom_pack_with_rng<R: Rng>(
    pool: &CardPool,
    slots: &[SlotSpec],
    default_set_code: &str,
    rng: &mut R,
) -> Vec<DrawnCard> {
    let mut used: HashSet<&str> = HashSet::new();
    let mut result = Vec::new();

    for slot in slots {
        let Some(entry) = slot.resolve(rng) else {
            continue;
        };

        let set_code = entry.set_code.as_deref().unwrap_or(default_set_code);
        let set_cards = pool.cards_for_set(set_code);

        let mut candidates: Vec<&Card> = set_cards
            .iter()
            .filter(|c| {
                c.rarity == entry.rarity && !c.disabled && !used.contains(c.id.as_str())
            })
            .collect();

        // Rarity exhausted within this pack: relax uniqueness before giving
        // up on the slot.
        if candidates.is_empty() {
            candidates = set_cards
                .iter()
                .filter(|c| c.rarity == entry.rarity && !c.disabled)
                .collect();
        }

        if let Some(&card) = candidates.choose(rng) {
            used.insert(card.id.as_str());
            result.push(DrawnCard {
                card: card.clone(),
                is_foil: false,
                is_alt_art: card.is_alt_art(),
            });
        }
    }

    result
}

/// Every set code a caller must supply cards for before assembling a custom
/// pack: the pack's own set plus any per-entry overrides.
pub fn required_set_codes(slots: &[SlotSpec], default_set_code: &str) -> HashSet<String> {
    let mut codes = HashSet::new();
    codes.insert(default_set_code.to_string());
    for slot in slots {
        for entry in slot.entries() {
            if let Some(set_code) = &entry.set_code {
                codes.insert(set_code.clone());
            }
        }
    }
    codes
}
