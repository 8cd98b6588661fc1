use crate::session::GameEvent;
use model::{
    event::{QuestionStart, QuizStart},
    Answer, AnswerKey, Event, QuestionKind,
};

/// Option submitted when the answer key has nothing for the current question.
pub const FALLBACK_CHOICE: u8 = 1;

/// Why the game ended for us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    GameOver,
    /// The host reset the controller (e.g. kicked the player).
    Reset,
    NameRejected,
}

/// What the driver should do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Ignore,
    /// The host announced its layout and no answer key is installed yet.
    Lookup(Vec<usize>),
    Answer {
        question: usize,
        choice: u8,
        fallback: bool,
    },
    TwoFactor,
    Finish(Finish),
}

/// Event-driven answering state. Holds no I/O so that every transition can be tested directly.
#[derive(Debug, Default)]
pub struct Reactor {
    key: Option<AnswerKey>,
    /// Index of the question currently being played.
    question: Option<usize>,
    two_factor_done: bool,
}

impl Reactor {
    pub fn new(key: Option<AnswerKey>) -> Self {
        Self { key, ..Default::default() }
    }

    pub fn install(&mut self, key: AnswerKey) {
        log::info!("answer key installed: {} ({} questions)", key.title, key.len());
        self.key = Some(key);
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    pub fn question(&self) -> Option<usize> {
        self.question
    }

    pub fn on_event(&mut self, event: &GameEvent) -> Reaction {
        match event.kind {
            Event::StartQuiz => {
                self.question = None;
                if self.key.is_some() {
                    return Reaction::Ignore;
                }
                let layout = event.payload::<QuizStart>().map(|start| start.quiz_question_answers).unwrap_or_default();
                Reaction::Lookup(layout)
            }
            Event::StartQuestion => {
                let QuestionStart { question_index, kind } =
                    event.payload().unwrap_or(QuestionStart { question_index: None, kind: QuestionKind::Quiz });
                self.on_question(question_index, kind)
            }
            Event::TwoFactorAuthCorrect => {
                self.two_factor_done = true;
                Reaction::Ignore
            }
            Event::ResetTwoFactorAuth if !self.two_factor_done => Reaction::TwoFactor,
            Event::GameOver => Reaction::Finish(Finish::GameOver),
            Event::ResetController => Reaction::Finish(Finish::Reset),
            Event::UsernameRejected => Reaction::Finish(Finish::NameRejected),
            _ => Reaction::Ignore,
        }
    }

    fn on_question(&mut self, index: Option<usize>, kind: QuestionKind) -> Reaction {
        let question = index.unwrap_or_else(|| self.question.map_or(0, |current| current + 1));
        self.question = Some(question);

        if !kind.is_answerable() {
            return Reaction::Ignore;
        }

        match self.key.as_ref().and_then(|key| key.get(question)).and_then(Answer::index) {
            Some(choice) => Reaction::Answer { question, choice, fallback: false },
            None => Reaction::Answer { question, choice: FALLBACK_CHOICE, fallback: true },
        }
    }
}
