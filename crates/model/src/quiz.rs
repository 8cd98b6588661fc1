use alloc::{string::String, vec::Vec};
use serde::{Deserialize, Serialize};

/// Kinds of question blocks a quiz may contain.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Quiz,
    MultipleSelectQuiz,
    /// Slides, polls, surveys and anything else without a gradable answer.
    #[serde(other)]
    Other,
}

impl QuestionKind {
    /// Whether the bot knows how to answer this kind of question.
    pub const fn is_answerable(self) -> bool {
        matches!(self, Self::Quiz | Self::MultipleSelectQuiz)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub answer: String,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Prompt text. Content slides have none.
    #[serde(default)]
    pub question: String,
    /// Options in the order the host displays them.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Question {
    /// Position of the first correct choice.
    pub fn correct_index(&self) -> Option<usize> {
        self.choices.iter().position(|choice| choice.correct)
    }
}

/// Quiz document as served by the quiz index.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    #[serde(default)]
    pub uuid: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub creator_username: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Number of choices for each question, in order.
    pub fn layout(&self) -> Vec<usize> {
        self.questions.iter().map(|question| question.choices.len()).collect()
    }

    /// Checks whether this quiz has the same shape as the one being hosted.
    pub fn matches_layout(&self, layout: &[usize]) -> bool {
        self.questions.len() == layout.len()
            && self.questions.iter().zip(layout).all(|(question, &count)| question.choices.len() == count)
    }
}

#[cfg(test)]
mod tests {
    use super::{QuestionKind, Quiz};

    const QUIZ: &str = r#"{
        "uuid": "0a1b2c3d-0000-4000-8000-000000000000",
        "title": "Planets",
        "description": "Solar system trivia",
        "creator_username": "astro",
        "visibility": 1,
        "questions": [
            {
                "type": "quiz",
                "question": "Largest planet?",
                "time": 20000,
                "choices": [
                    { "answer": "Mars", "correct": false },
                    { "answer": "Jupiter", "correct": true },
                    { "answer": "Venus", "correct": false },
                    { "answer": "Earth", "correct": false }
                ]
            },
            { "type": "content", "title": "Intermission" },
            {
                "type": "multiple_select_quiz",
                "question": "Gas giants?",
                "choices": [
                    { "answer": "Saturn", "correct": true },
                    { "answer": "Mercury" },
                    { "answer": "Neptune", "correct": true }
                ]
            }
        ]
    }"#;

    #[test]
    fn deserialize_quiz() {
        let quiz: Quiz = serde_json::from_str(QUIZ).unwrap();
        assert_eq!(quiz.title, "Planets");
        assert_eq!(quiz.creator_username, "astro");
        assert_eq!(quiz.questions.len(), 3);

        let kinds: Vec<_> = quiz.questions.iter().map(|q| q.kind).collect();
        assert_eq!(kinds, [QuestionKind::Quiz, QuestionKind::Other, QuestionKind::MultipleSelectQuiz]);
        assert!(quiz.questions[1].question.is_empty());
        assert!(!quiz.questions[2].choices[1].correct);

        assert_eq!(quiz.questions[0].correct_index(), Some(1));
        assert_eq!(quiz.questions[1].correct_index(), None);
        assert_eq!(quiz.questions[2].correct_index(), Some(0));
    }

    #[test]
    fn layout_matching() {
        let quiz: Quiz = serde_json::from_str(QUIZ).unwrap();
        assert_eq!(quiz.layout(), [4, 0, 3]);
        assert!(quiz.matches_layout(&[4, 0, 3]));
        assert!(!quiz.matches_layout(&[4, 0, 4]));
        assert!(!quiz.matches_layout(&[4, 0]));
        assert!(!quiz.matches_layout(&[4, 0, 3, 2]));
    }
}
