use std::collections::HashMap;

pub mod scryfall;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Mythic,
    Rare,
    Uncommon,
    Common,
}

impl Rarity {
    /// Single-letter code used in booster template definitions. Codes are
    /// lowercased before lookup by the template compiler.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Rarity::Mythic),
            "r" => Some(Rarity::Rare),
            "u" => Some(Rarity::Uncommon),
            "c" => Some(Rarity::Common),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique, stable printing identifier.
    pub id: String,
    pub name: String,

    /// Set code, lowercased.
    pub set: String,
    pub rarity: Rarity,
    pub type_line: Option<String>,

    /// "borderless" marks an alternate-art printing.
    pub border_color: Option<String>,
    pub full_art: bool,

    /// Frame treatment tags, e.g. "showcase" or "extendedart".
    pub frame_effects: Vec<String>,

    /// Disabled cards are excluded from pack generation.
    pub disabled: bool,
}

impl Card {
    /// Basic lands are never drawn as booster contents.
    pub fn is_basic_land(&self) -> bool {
        let Some(type_line) = &self.type_line else {
            return false;
        };
        let type_line = type_line.to_lowercase();
        type_line.contains("basic land") || type_line.starts_with("basic ")
    }

    pub fn has_frame_effect(&self, effect: &str) -> bool {
        self.frame_effects.iter().any(|fe| fe == effect)
    }

    pub fn is_borderless(&self) -> bool {
        self.border_color.as_deref() == Some("borderless")
    }

    /// Whether this printing carries an alternate-art treatment (showcase or
    /// extended-art frame, borderless border, or full art) rather than the
    /// standard frame.
    pub fn is_alt_art(&self) -> bool {
        self.is_borderless()
            || self.full_art
            || self.has_frame_effect("showcase")
            || self.has_frame_effect("extendedart")
    }

    /// Display label for the alternate-art treatment, most specific match
    /// first. None for standard-frame printings.
    pub fn alt_art_label(&self) -> Option<&'static str> {
        if self.has_frame_effect("showcase") {
            Some("Showcase")
        } else if self.has_frame_effect("extendedart") {
            Some("Extended Art")
        } else if self.is_borderless() {
            Some("Borderless")
        } else if self.full_art {
            Some("Full Art")
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn sample(rarity: Rarity) -> Self {
        Self::sample_in_set(rarity, "tst")
    }

    #[cfg(test)]
    pub fn sample_in_set(rarity: Rarity, set: &str) -> Self {
        static ID: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(1);

        let id = ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Self {
            id: format!("card-{id}"),
            name: format!("Card {id}"),
            set: set.to_string(),
            rarity,
            type_line: Some("Creature".to_string()),
            border_color: Some("black".to_string()),
            full_art: false,
            frame_effects: Vec::new(),
            disabled: false,
        }
    }

    #[cfg(test)]
    pub fn sample_with_frame(rarity: Rarity, effect: &str) -> Self {
        let mut card = Self::sample(rarity);
        card.frame_effects.push(effect.to_string());
        card
    }

    #[cfg(test)]
    pub fn sample_borderless(rarity: Rarity) -> Self {
        let mut card = Self::sample(rarity);
        card.border_color = Some("borderless".to_string());
        card
    }

    #[cfg(test)]
    pub fn sample_basic_land() -> Self {
        let mut card = Self::sample(Rarity::Common);
        card.name = "Island".to_string();
        card.type_line = Some("Basic Land".to_string());
        card
    }
}

/// Cards grouped by set code, as supplied to custom template assembly.
pub struct CardPool {
    sets: HashMap<String, Vec<Card>>,
}

impl CardPool {
    pub fn new() -> Self {
        Self {
            sets: HashMap::new(),
        }
    }

    /// Add a card to the sub-pool for its own set code.
    pub fn add(&mut self, card: Card) {
        self.sets.entry(card.set.clone()).or_default().push(card);
    }

    /// All cards of a set; empty for set codes the pool has no cards for.
    pub fn cards_for_set(&self, code: &str) -> &[Card] {
        self.sets.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn size(&self) -> usize {
        self.sets.values().map(Vec::len).sum()
    }
}
