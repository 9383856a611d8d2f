//! Booster pack generation engine.
//!
//! Compiles booster template definitions (a small slot/probability DSL),
//! resolves weighted slots, and assembles packs from a caller-supplied card
//! pool, either through a compiled template or one of the built-in booster
//! compositions. The engine performs no I/O; fetching cards and persisting
//! opened packs belong to the caller.

pub mod booster;
pub mod cards;

pub use booster::template::{CompiledTemplate, SlotEntry, SlotSpec, ValidationReport};
pub use booster::{
    generate_custom_pack, generate_custom_pack_with_rng, generate_pack, generate_pack_with_rng,
    required_set_codes, BoosterKind, BoosterPool, DrawnCard,
};
pub use cards::{Card, CardPool, Rarity};
