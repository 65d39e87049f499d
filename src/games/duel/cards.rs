//! Duel card catalog.

/// What a card does when played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardEffect {
    /// Damage to one opponent.
    Damage(i64),
    /// Shield on the player.
    Shield(i64),
    /// Healing on the player.
    Heal(i64),
}

impl CardEffect {
    /// Whether the card needs an opponent target.
    #[must_use]
    pub fn is_targeted(self) -> bool {
        matches!(self, CardEffect::Damage(_))
    }
}

/// Static card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardDef {
    /// Card id.
    pub id: &'static str,
    /// Energy cost.
    pub cost: i64,
    /// Effect when played.
    pub effect: CardEffect,
}

impl CardDef {
    /// Localization key of the card name.
    #[must_use]
    pub fn name_key(&self) -> String {
        name_key(self.id)
    }
}

/// Every card in the game.
pub static CARDS: [CardDef; 4] = [
    CardDef { id: "strike", cost: 1, effect: CardEffect::Damage(2) },
    CardDef { id: "fireball", cost: 3, effect: CardEffect::Damage(5) },
    CardDef { id: "barrier", cost: 2, effect: CardEffect::Shield(3) },
    CardDef { id: "mend", cost: 2, effect: CardEffect::Heal(3) },
];

/// Deck each player starts with, before shuffling.
pub const STARTING_DECK: [&str; 12] = [
    "strike", "strike", "strike", "strike", "fireball", "fireball",
    "barrier", "barrier", "barrier", "mend", "mend", "strike",
];

/// Look up a card by id.
#[must_use]
pub fn card(id: &str) -> Option<&'static CardDef> {
    CARDS.iter().find(|c| c.id == id)
}

/// `card.<id>.name`
#[must_use]
pub fn name_key(id: &str) -> String {
    format!("card.{id}.name")
}
