use crate::quiz::QuestionKind;
use alloc::vec::Vec;
use core::fmt::{self, Display};
use serde::Deserialize;

/// Event codes sent by the quiz host on the player channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Event {
    GetReady = 1,
    StartQuestion = 2,
    GameOver = 3,
    TimeUp = 4,
    PlayAgain = 5,
    AnswerSelected = 6,
    AnswerResponse = 7,
    RevealAnswer = 8,
    StartQuiz = 9,
    ResetController = 10,
    SubmitFeedback = 11,
    Feedback = 12,
    RevealRanking = 13,
    UsernameAccepted = 14,
    UsernameRejected = 15,
    RequestRecoveryDataFromPlayer = 16,
    SendRecoveryDataToController = 17,
    JoinTeamMembers = 18,
    JoinTeamMembersResponse = 19,
    StartTeamTalk = 20,
    SkipTeamTalk = 21,
    IframeControllerEvent = 31,
    ServerIframeEvent = 32,
    StoryBlockGetReady = 40,
    ReactionSelected = 41,
    ReactionResponse = 42,
    GameBlockStart = 43,
    GameBlockEnd = 44,
    GameBlockAnswer = 45,
    SubmitTwoFactor = 50,
    TwoFactorAuthIncorrect = 51,
    TwoFactorAuthCorrect = 52,
    ResetTwoFactorAuth = 53,
}

impl Event {
    /// Outgoing message id for a submitted answer.
    pub const ANSWER_ID: u8 = Self::GameBlockAnswer as u8;
    /// Outgoing message id for a two-factor color sequence.
    pub const TWO_FACTOR_ID: u8 = Self::SubmitTwoFactor as u8;

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        use Event::*;
        Some(match code {
            1 => GetReady,
            2 => StartQuestion,
            3 => GameOver,
            4 => TimeUp,
            5 => PlayAgain,
            6 => AnswerSelected,
            7 => AnswerResponse,
            8 => RevealAnswer,
            9 => StartQuiz,
            10 => ResetController,
            11 => SubmitFeedback,
            12 => Feedback,
            13 => RevealRanking,
            14 => UsernameAccepted,
            15 => UsernameRejected,
            16 => RequestRecoveryDataFromPlayer,
            17 => SendRecoveryDataToController,
            18 => JoinTeamMembers,
            19 => JoinTeamMembersResponse,
            20 => StartTeamTalk,
            21 => SkipTeamTalk,
            31 => IframeControllerEvent,
            32 => ServerIframeEvent,
            40 => StoryBlockGetReady,
            41 => ReactionSelected,
            42 => ReactionResponse,
            43 => GameBlockStart,
            44 => GameBlockEnd,
            45 => GameBlockAnswer,
            50 => SubmitTwoFactor,
            51 => TwoFactorAuthIncorrect,
            52 => TwoFactorAuthCorrect,
            53 => ResetTwoFactorAuth,
            _ => return None,
        })
    }
}

impl TryFrom<u8> for Event {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(code)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Event::*;
        f.write_str(match self {
            GetReady => "GET READY",
            StartQuestion => "START QUESTION",
            GameOver => "GAME OVER",
            TimeUp => "TIME UP",
            PlayAgain => "PLAY AGAIN",
            AnswerSelected => "ANSWER SELECTED",
            AnswerResponse => "ANSWER RESPONSE",
            RevealAnswer => "REVEAL ANSWER",
            StartQuiz => "START QUIZ",
            ResetController => "RESET CONTROLLER",
            SubmitFeedback => "SUBMIT FEEDBACK",
            Feedback => "FEEDBACK",
            RevealRanking => "REVEAL RANKING",
            UsernameAccepted => "USERNAME ACCEPTED",
            UsernameRejected => "USERNAME REJECTED",
            RequestRecoveryDataFromPlayer => "REQUEST RECOVERY DATA FROM PLAYER",
            SendRecoveryDataToController => "SEND RECOVERY DATA TO CONTROLLER",
            JoinTeamMembers => "JOIN TEAM MEMBERS",
            JoinTeamMembersResponse => "JOIN TEAM MEMBERS RESPONSE",
            StartTeamTalk => "START TEAM TALK",
            SkipTeamTalk => "SKIP TEAM TALK",
            IframeControllerEvent => "IFRAME CONTROLLER EVENT",
            ServerIframeEvent => "SERVER IFRAME EVENT",
            StoryBlockGetReady => "STORY BLOCK GET READY",
            ReactionSelected => "REACTION SELECTED",
            ReactionResponse => "REACTION RESPONSE",
            GameBlockStart => "GAME BLOCK START",
            GameBlockEnd => "GAME BLOCK END",
            GameBlockAnswer => "GAME BLOCK ANSWER",
            SubmitTwoFactor => "SUBMIT TWO FACTOR",
            TwoFactorAuthIncorrect => "TWO FACTOR AUTH INCORRECT",
            TwoFactorAuthCorrect => "TWO FACTOR AUTH CORRECT",
            ResetTwoFactorAuth => "RESET TWO FACTOR AUTH",
        })
    }
}

/// Payload of [`Event::StartQuiz`].
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizStart {
    /// Number of choices for each question of the hosted quiz.
    #[serde(default)]
    pub quiz_question_answers: Vec<usize>,
}

/// Payload of [`Event::StartQuestion`].
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStart {
    #[serde(default)]
    pub question_index: Option<usize>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: QuestionKind,
}

const fn default_kind() -> QuestionKind {
    QuestionKind::Quiz
}

#[cfg(test)]
mod tests {
    use super::{Event, QuestionStart, QuizStart};
    use crate::quiz::QuestionKind;

    #[test]
    fn codes() {
        for code in 0..=u8::MAX {
            if let Some(event) = Event::from_code(code) {
                assert_eq!(event.code(), code);
            }
        }
        assert_eq!(Event::try_from(2), Ok(Event::StartQuestion));
        assert_eq!(Event::try_from(22), Err(22));
        assert_eq!(Event::ANSWER_ID, 45);
        assert_eq!(Event::TWO_FACTOR_ID, 50);
        assert_eq!(Event::ResetTwoFactorAuth.to_string(), "RESET TWO FACTOR AUTH");
    }

    #[test]
    fn payloads() {
        let quiz: QuizStart = serde_json::from_str(r#"{"quizQuestionAnswers":[4,2,4],"quizType":"quiz"}"#).unwrap();
        assert_eq!(quiz.quiz_question_answers, [4, 2, 4]);

        let question: QuestionStart =
            serde_json::from_str(r#"{"questionIndex":3,"type":"multiple_select_quiz","timeLeft":20}"#).unwrap();
        assert_eq!(question.question_index, Some(3));
        assert_eq!(question.kind, QuestionKind::MultipleSelectQuiz);

        let question: QuestionStart = serde_json::from_str(r#"{"type":"survey"}"#).unwrap();
        assert_eq!(question.question_index, None);
        assert_eq!(question.kind, QuestionKind::Other);

        let question: QuestionStart = serde_json::from_str("{}").unwrap();
        assert_eq!(question.kind, QuestionKind::Quiz);
    }
}
