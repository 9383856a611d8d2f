use bytes::Buf;
use serde::de::DeserializeOwned;

use crate::cards::{Card, Rarity};

fn decode_json<T: DeserializeOwned>(bytes: bytes::Bytes) -> Result<T, String> {
    serde_json::de::from_reader(bytes.reader()).map_err(|e| e.to_string())
}

#[derive(serde::Deserialize, Debug)]
struct ScryfallCard {
    /// Scryfall card UUID.
    id: String,

    /// Card name. Includes both faces (!).
    name: String,

    /// Set code.
    set: String,

    /// Rarity string: mythic, rare, uncommon, common, special, bonus.
    rarity: String,

    /// Type line, used to recognise basic lands.
    type_line: Option<String>,

    border_color: Option<String>,

    #[serde(default)]
    full_art: bool,

    #[serde(default)]
    frame_effects: Vec<String>,
}

impl ScryfallCard {
    fn to_card(self) -> Option<Card> {
        // Generation only models the four booster rarities; special and
        // bonus sheet printings are not part of any pool.
        let rarity = match self.rarity.as_str() {
            "mythic" => Rarity::Mythic,
            "rare" => Rarity::Rare,
            "uncommon" => Rarity::Uncommon,
            "common" => Rarity::Common,
            _ => return None,
        };

        Some(Card {
            id: self.id,
            name: self.name,
            set: self.set,
            rarity,
            type_line: self.type_line,
            border_color: self.border_color,
            full_art: self.full_art,
            frame_effects: self.frame_effects,
            disabled: false,
        })
    }
}

/// Decode a Scryfall-style JSON card list into engine cards. Records with
/// rarities outside the four the engine models are skipped; freshly decoded
/// cards are enabled.
pub fn decode_cards(data: bytes::Bytes) -> Result<Vec<Card>, String> {
    let raw: Vec<ScryfallCard> = decode_json(data)?;
    let cards: Vec<Card> = raw.into_iter().filter_map(ScryfallCard::to_card).collect();
    tracing::debug!("Decoded {} cards from scryfall data.", cards.len());
    Ok(cards)
}

#[cfg(test)]
mod test {
    use super::decode_cards;
    use crate::cards::Rarity;

    #[test]
    fn test_decode_cards() {
        let data = bytes::Bytes::from_static(
            br#"[
                {"id": "aaa", "name": "Forest Bear", "set": "tst",
                 "rarity": "common", "type_line": "Creature",
                 "border_color": "black", "full_art": false,
                 "frame_effects": []},
                {"id": "bbb", "name": "Showy Dragon", "set": "tst",
                 "rarity": "mythic", "type_line": "Creature",
                 "border_color": "black", "frame_effects": ["showcase"]},
                {"id": "ccc", "name": "Promo Oddity", "set": "tst",
                 "rarity": "special", "type_line": "Artifact"}
            ]"#,
        );

        let cards = decode_cards(data).unwrap();
        assert!(cards.len() == 2);
        assert!(cards[0].rarity == Rarity::Common);
        assert!(cards[0].name == "Forest Bear");
        assert!(cards[1].rarity == Rarity::Mythic);
        assert!(cards[1].has_frame_effect("showcase"));
        assert!(cards[1].is_alt_art());
        assert!(cards.iter().all(|c| !c.disabled));
    }

    #[test]
    fn test_decode_tolerates_extra_fields() {
        let data = bytes::Bytes::from_static(
            br#"[{"id": "aaa", "name": "Forest Bear", "set": "tst",
                  "rarity": "rare", "oracle_text": "Trample",
                  "collector_number": "12", "prices": {"usd": "0.05"}}]"#,
        );

        let cards = decode_cards(data).unwrap();
        assert!(cards.len() == 1);
        assert!(cards[0].type_line.is_none());
        assert!(!cards[0].is_alt_art());
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(decode_cards(bytes::Bytes::from_static(b"not json")).is_err());
    }
}
