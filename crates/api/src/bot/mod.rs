mod error;
pub mod prompt;
mod reactor;

use crate::{
    creator::{self, Creator, Source},
    session::{transport::LongPolling, Session},
};
use cometd::Transport;
use core::future::Future;
use model::{AnswerKey, Color, Event};
use tokio::io::AsyncBufRead;

pub use error::{Error, Result};
pub use reactor::{Finish, Reaction, Reactor, FALLBACK_CHOICE};

/// Where answer keys come from once the host reveals its layout.
pub trait KeySource {
    fn lookup(&self, source: &Source, layout: Option<&[usize]>) -> impl Future<Output = creator::Result<AnswerKey>>;
}

impl KeySource for Creator {
    fn lookup(&self, source: &Source, layout: Option<&[usize]>) -> impl Future<Output = creator::Result<AnswerKey>> {
        Creator::lookup(self, source, layout)
    }
}

/// Plays a joined game until the host ends it.
pub struct Bot<R, K = Creator, T = LongPolling> {
    session: Session<T>,
    keys: K,
    source: Option<Source>,
    reactor: Reactor,
    /// Where two-factor colors are read from.
    input: R,
}

impl<R, K, T> Bot<R, K, T>
where
    R: AsyncBufRead + Unpin,
    K: KeySource,
    T: Transport,
{
    pub fn new(session: Session<T>, keys: K, source: Option<Source>, key: Option<AnswerKey>, input: R) -> Self {
        Self { session, keys, source, reactor: Reactor::new(key), input }
    }

    pub async fn run(mut self) -> Result<Finish> {
        let result = self.play().await;
        if let Err(err) = self.session.leave().await {
            log::warn!("failed to leave cleanly: {err}");
        }
        result
    }

    async fn play(&mut self) -> Result<Finish> {
        loop {
            let event = self.session.next_event().await?;
            match event.kind {
                Event::ResetTwoFactorAuth => log::debug!("{}", event.kind),
                kind => log::info!("{kind}"),
            }
            log::debug!("{}", event.content);

            match self.reactor.on_event(&event) {
                Reaction::Ignore => {}
                Reaction::Lookup(layout) => self.lookup(&layout).await,
                Reaction::Answer { question, choice, fallback } => {
                    log::info!("------ {} ------", question + 1);
                    if fallback {
                        log::info!("SELECTED FALLBACK");
                    } else {
                        match Color::from_index(usize::from(choice)) {
                            Some(color) => log::info!("SELECTED {color}"),
                            None => log::info!("SELECTED #{choice}"),
                        }
                    }
                    self.session.answer(choice).await?;
                }
                Reaction::TwoFactor => self.two_factor().await?,
                Reaction::Finish(finish) => {
                    match finish {
                        Finish::GameOver => log::info!("game over"),
                        Finish::Reset => log::warn!("the host reset the controller"),
                        Finish::NameRejected => log::error!("nickname {} was rejected", self.session.nickname()),
                    }
                    return Ok(finish);
                }
            }
        }
    }

    /// Failed lookups are not fatal: every question falls back to the default choice.
    async fn lookup(&mut self, layout: &[usize]) {
        let Some(source) = &self.source else {
            log::warn!("no quiz name or ID given; answering with fallbacks");
            return;
        };

        let layout = (!layout.is_empty()).then_some(layout);
        match self.keys.lookup(source, layout).await {
            Ok(key) => {
                log::info!("ANSWERS RECEIVED");
                self.reactor.install(key);
            }
            Err(err) => log::error!("answer lookup failed: {err}"),
        }
    }

    async fn two_factor(&mut self) -> Result<()> {
        loop {
            let Some(colors) = prompt::ask(&mut self.input, "2fa (e.g. rbyg, yrgb) > ").await? else {
                return Err(Error::Prompt);
            };
            match prompt::two_factor_sequence(&colors) {
                Some(sequence) => {
                    self.session.submit_two_factor(&sequence).await?;
                    return Ok(());
                }
                None => log::warn!("use the letters r, b, y and g"),
            }
        }
    }
}

/// Interactive search: offers each result and prints the answer key of the ones accepted.
/// Returns the number of answer keys printed.
pub async fn browse<R>(creator: &Creator, source: &Source, input: &mut R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let query = match source {
        Source::Id(uuid) => {
            let key: AnswerKey = creator.quiz(uuid).await?.into();
            println!("{key}");
            return Ok(1);
        }
        Source::Name(query) => query,
    };

    let cards = creator.search(query).await?;
    println!("{} matching quizzes found", cards.len());

    let mut shown = 0;
    for card in cards {
        let question = format!("Check '{}'? [y/N] ", card.title);
        let Some(answer) = prompt::ask(input, &question).await? else {
            break;
        };
        if !prompt::is_yes(&answer) {
            continue;
        }

        match creator.quiz(&card.uuid).await {
            Ok(quiz) => {
                println!("{}", AnswerKey::from(quiz));
                shown += 1;
            }
            Err(err) => log::warn!("cannot open {}: {err}", card.title),
        }
    }

    Ok(shown)
}
