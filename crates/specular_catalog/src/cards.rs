//! A card game: cards, hands, players and a whole game state.

use specular_spec::{
    keys, preds, repeat0, spec_ref, tuple, Keys, Registry, SpecResult, Value,
};

pub const SUIT: &str = "cards/suit";
pub const RANK: &str = "cards/rank";
pub const CARD: &str = "cards/card";
pub const HAND: &str = "cards/hand";
pub const NAME: &str = "cards/name";
pub const SCORE: &str = "cards/score";
pub const PLAYER: &str = "cards/player";
pub const PLAYERS: &str = "cards/players";
pub const DECK: &str = "cards/deck";
pub const GAME: &str = "cards/game";

pub const SPECS: &[&str] = &[
    SUIT, RANK, CARD, HAND, NAME, SCORE, PLAYER, PLAYERS, DECK, GAME,
];

/// `:club :diamond :heart :spade`
pub fn suits() -> Vec<Value> {
    ["club", "diamond", "heart", "spade"]
        .into_iter()
        .map(Value::keyword)
        .collect()
}

/// Number cards 2 through 10, then the face cards and the ace.
pub fn ranks() -> Vec<Value> {
    (2..=10)
        .map(Value::Int)
        .chain(["jack", "queen", "king", "ace"].into_iter().map(Value::keyword))
        .collect()
}

/// Every `[rank suit]` pair, suit-major.
pub fn deck() -> Value {
    let ranks = ranks();
    Value::vector(suits().into_iter().flat_map(|suit| {
        ranks
            .iter()
            .map(move |rank| Value::vector([rank.clone(), suit.clone()]))
            .collect::<Vec<_>>()
    }))
}

pub fn card(rank: impl Into<Value>, suit: &str) -> Value {
    Value::vector([rank.into(), Value::keyword(suit)])
}

pub fn player(name: &str, score: i64, hand: Vec<Value>) -> Value {
    Value::map([
        (Value::keyword(NAME), name.into()),
        (Value::keyword(SCORE), score.into()),
        (Value::keyword(HAND), Value::Vector(hand)),
    ])
}

pub fn game(players: Vec<Value>, deck: Value) -> Value {
    Value::map([
        (Value::keyword(PLAYERS), Value::Vector(players)),
        (Value::keyword(DECK), deck),
    ])
}

pub fn install(registry: &Registry) -> SpecResult<()> {
    registry.register(SUIT, preds::one_of(suits()));
    registry.register(RANK, preds::one_of(ranks()));
    registry.register(CARD, tuple([spec_ref(RANK), spec_ref(SUIT)])?);
    registry.register(HAND, repeat0(spec_ref(CARD)));
    registry.register(NAME, preds::string());
    registry.register(SCORE, preds::int());
    registry.register(PLAYER, keys(Keys::new().req(NAME).req(SCORE).req(HAND)));
    registry.register(PLAYERS, repeat0(spec_ref(PLAYER)));
    registry.register(DECK, repeat0(spec_ref(CARD)));
    registry.register(GAME, keys(Keys::new().req(PLAYERS).req(DECK)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let registry = Registry::new();
        install(&registry).unwrap();
        registry
    }

    #[test]
    fn test_deck_has_every_card() {
        let deck = deck();
        assert_eq!(deck.count(), Some(52));
        assert!(registry().valid(DECK, &deck).unwrap());
    }

    #[test]
    fn test_card_rank_and_suit() {
        let registry = registry();
        assert!(registry.valid(CARD, &card(10, "heart")).unwrap());
        assert!(registry.valid(CARD, &card(Value::keyword("ace"), "spade")).unwrap());
        assert!(!registry.valid(CARD, &card(1, "heart")).unwrap());
        assert!(!registry.valid(CARD, &card(5, "star")).unwrap());
    }

    #[test]
    fn test_game_state() {
        let registry = registry();
        let kenny = player("Kenny Rogers", 100, vec![]);
        let game = game(vec![kenny], deck());
        assert!(registry.valid(GAME, &game).unwrap());

        let cheater = player("Cheater", 100, vec![card(11, "club")]);
        let explanation = registry.explain(GAME, &super::game(vec![cheater], deck())).unwrap();
        assert_eq!(explanation.len(), 1);
        assert_eq!(
            explanation.problems[0].in_path,
            vec![
                Value::keyword(PLAYERS),
                Value::Int(0),
                Value::keyword(HAND),
                Value::Int(0),
                Value::Int(0),
            ]
        );
    }
}
