use api::creator::{Source, DEFAULT_LIMIT};
use clap::Parser;
use core::fmt::{self, Display};

#[derive(Parser, Debug)]
#[command(name = "kbot", version, about = "Plays a live quiz using its published answer key")]
pub struct Args {
    /// Account email, for quizzes only visible when logged in
    #[arg(short = 'e', long, env = "KAHOOT_EMAIL", requires = "password")]
    pub email: Option<String>,

    /// Account password
    #[arg(short = 'a', long, env = "KAHOOT_PASSWORD", requires = "email", hide_env_values = true)]
    pub password: Option<String>,

    /// Nickname to join with
    #[arg(short = 'n', long = "nick")]
    pub nick: Option<String>,

    /// Game PIN
    #[arg(short = 'p', long, value_parser = parse_pin)]
    pub pin: Option<String>,

    /// Name of the quiz to search for
    #[arg(short = 'q', long = "quizName")]
    pub quiz_name: Option<String>,

    /// ID of the quiz (takes priority over the name)
    #[arg(short = 'i', long = "quizID")]
    pub quiz_id: Option<String>,

    /// Only list answer keys, never join a game
    #[arg(short = 's', long)]
    pub search: bool,

    /// Verbose logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Maximum number of search results
    #[arg(short = 'l', long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Search { source: Source },
    Play { pin: String, nickname: String, source: Option<Source> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    MissingSource,
    MissingPin,
    MissingNick,
}

impl Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingSource => "Search mode needs --quizName or --quizID.",
            Self::MissingPin => "Joining a game needs --pin.",
            Self::MissingNick => "Joining a game needs --nick.",
        })
    }
}

impl std::error::Error for UsageError {}

impl Args {
    pub fn source(&self) -> Option<Source> {
        if let Some(id) = &self.quiz_id {
            return Some(Source::Id(id.as_str().into()));
        }
        self.quiz_name.as_deref().map(|name| Source::Name(name.into()))
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.email.as_deref()?, self.password.as_deref()?))
    }

    pub fn mode(&self) -> Result<Mode, UsageError> {
        if self.search {
            let source = self.source().ok_or(UsageError::MissingSource)?;
            if self.pin.is_some() || self.nick.is_some() {
                log::warn!("--pin and --nick are ignored in search mode");
            }
            return Ok(Mode::Search { source });
        }

        let pin = self.pin.clone().ok_or(UsageError::MissingPin)?;
        let nickname = self.nick.clone().ok_or(UsageError::MissingNick)?;
        Ok(Mode::Play { pin, nickname, source: self.source() })
    }
}

fn parse_pin(pin: &str) -> Result<String, String> {
    let pin = pin.trim();
    if pin.is_empty() || !pin.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(String::from("a game PIN consists of digits only"));
    }
    Ok(pin.to_owned())
}
