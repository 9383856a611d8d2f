use serde::Serialize;

use crate::cards::Card;

mod packs;
pub mod template;

pub use packs::{
    generate_custom_pack, generate_custom_pack_with_rng, generate_pack, generate_pack_with_rng,
    required_set_codes, BoosterPool,
};

/// Chance that a rare/mythic slot resolves to a mythic, for sets that have
/// mythics at all.
pub const MYTHIC_CHANCE: f64 = 0.125;

/// Alt-art odds for the play booster's non-foil wildcard slot.
pub const PLAY_WILDCARD_ALT_CHANCE: f64 = 0.024;

/// Alt-art odds for the play booster's foil wildcard slot.
pub const PLAY_FOIL_WILDCARD_ALT_CHANCE: f64 = 0.015;

/// Chance that a legacy booster carries a foil slot in place of a common.
pub const LEGACY_FOIL_CHANCE: f64 = 0.25;

/// First release year whose sets open with the play booster layout.
pub const PLAY_BOOSTER_FIRST_YEAR: i32 = 2024;

/// One card drawn from a booster.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawnCard {
    pub card: Card,
    pub is_foil: bool,
    pub is_alt_art: bool,
}

/// Which built-in composition a pack opens with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoosterKind {
    Collector,
    Play,
    Legacy,
}

impl BoosterKind {
    /// Select the composition for a policy name and set release date. Any
    /// unrecognised name falls back to the legacy booster, as does a play
    /// booster for a set released before the play-booster era.
    pub fn select(pack_type: &str, release_date: Option<&str>) -> Self {
        match pack_type {
            "collector" => BoosterKind::Collector,
            "play" if release_year(release_date) >= PLAY_BOOSTER_FIRST_YEAR => BoosterKind::Play,
            _ => BoosterKind::Legacy,
        }
    }
}

fn release_year(release_date: Option<&str>) -> i32 {
    release_date
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse().ok())
        .unwrap_or(0)
}
