#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod answer;
pub mod color;
pub mod event;
pub mod quiz;
pub mod search;
pub mod token;

pub use answer::{Answer, AnswerKey};
pub use color::Color;
pub use event::Event;
pub use quiz::{Choice, Question, QuestionKind, Quiz};
