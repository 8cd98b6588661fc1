use alloc::{string::String, vec::Vec};
use serde::Deserialize;

/// Summary of a quiz in the search index.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub number_of_questions: usize,
}

#[derive(Deserialize)]
struct Entity {
    card: Card,
}

/// Page of search results. Only the cards are kept.
#[derive(Deserialize, Debug, Default)]
#[serde(from = "RawResults")]
pub struct SearchResults {
    pub cards: Vec<Card>,
}

#[derive(Deserialize)]
struct RawResults {
    #[serde(default)]
    entities: Vec<Entity>,
}

impl From<RawResults> for SearchResults {
    fn from(raw: RawResults) -> Self {
        Self { cards: raw.entities.into_iter().map(|Entity { card }| card).collect() }
    }
}
