use crate::{color::Color, quiz::Quiz};
use alloc::{string::String, vec::Vec};
use core::fmt::{self, Display};

/// Precomputed answer for a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Choice {
        /// Position of the correct option.
        index: u8,
        question: String,
        text: String,
    },
    /// Question cannot be answered (unsupported kind or no correct option).
    Skip,
}

impl Answer {
    pub const fn index(&self) -> Option<u8> {
        match *self {
            Self::Choice { index, .. } => Some(index),
            Self::Skip => None,
        }
    }
}

/// Ordered answer key for a quiz. Order is load-bearing: answers are matched to live questions by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    pub title: String,
    pub creator: String,
    pub description: String,
    pub answers: Vec<Answer>,
}

impl AnswerKey {
    pub fn get(&self, question: usize) -> Option<&Answer> {
        self.answers.get(question)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl From<Quiz> for AnswerKey {
    fn from(quiz: Quiz) -> Self {
        let answers = quiz
            .questions
            .into_iter()
            .map(|question| {
                if !question.kind.is_answerable() {
                    return Answer::Skip;
                }
                let Some(index) = question.correct_index() else {
                    return Answer::Skip;
                };
                let Ok(position) = u8::try_from(index) else {
                    return Answer::Skip;
                };
                let mut choices = question.choices;
                let text = choices.swap_remove(index).answer;
                Answer::Choice { index: position, question: question.question, text }
            })
            .collect();
        Self { title: quiz.title, creator: quiz.creator_username, description: quiz.description, answers }
    }
}

impl Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Creator: {}", self.creator)?;
        writeln!(f, "Desc: {}", self.description)?;
        for (number, answer) in (1..).zip(&self.answers) {
            let Answer::Choice { index, question, text } = answer else {
                continue;
            };
            match Color::from_index(usize::from(*index)) {
                Some(color) => writeln!(f, "{number:>3}. {question}\n\t{text} [{color}]")?,
                None => writeln!(f, "{number:>3}. {question}\n\t{text} [#{index}]")?,
            }
        }
        Ok(())
    }
}
