pub mod error;

use crate::http::Fetcher;
use http::StatusCode;
use hyper::{body::Bytes, header::AUTHORIZATION, Method, Response, Uri};
use model::{
    search::{Card, SearchResults},
    token::Token,
    AnswerKey, Quiz,
};
use core::future::Future;
use serde::Serialize;

pub use error::{Error, Result};

const REST: &str = "https://create.kahoot.it/rest";

pub const DEFAULT_LIMIT: u16 = 50;

/// Where to find the answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Id(Box<str>),
    Name(Box<str>),
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
    grant_type: &'static str,
}

/// Client for the public quiz index.
pub struct Creator {
    fetcher: Fetcher,
    token: Option<Token>,
    limit: u16,
}

impl Creator {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher, token: None, limit: DEFAULT_LIMIT }
    }

    /// Maximum number of search results to consider.
    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = limit;
        self
    }

    pub async fn authenticate(&mut self, email: &str, password: &str) -> Result<()> {
        let uri = Uri::from_static("https://create.kahoot.it/rest/authenticate");
        let builder = Fetcher::request(Method::POST, uri).header("x-kahoot-login-gate", "enabled");
        let req = Fetcher::json(builder, &Credentials { username: email, password, grant_type: "password" })?;
        let res = self.fetcher.send(req).await?;

        match res.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(Error::InvalidCredentials),
            status => {
                log::warn!("login failed with status {status}");
                return Err(Error::AuthRequired);
            }
        }

        let token: Token = Fetcher::parse(&res)?;
        match token.expires {
            Some(expires) => log::info!("authenticated as {email} until {expires}"),
            None => log::info!("authenticated as {email}"),
        }
        self.token = Some(token);
        Ok(())
    }

    async fn get(&self, uri: Uri) -> Result<Response<Bytes>> {
        let mut builder = Fetcher::request(Method::GET, uri);
        if let Some(Token { access, .. }) = &self.token {
            builder = builder.header(AUTHORIZATION, access.as_ref());
        }
        let req = Fetcher::empty(builder)?;
        Ok(self.fetcher.send(req).await?)
    }

    pub async fn quiz(&self, uuid: &str) -> Result<Quiz> {
        let uri = quiz_uri(uuid)?;
        let res = self.get(uri).await?;
        check_status(res.status())?;
        Ok(Fetcher::parse(&res)?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Card>> {
        let uri = search_uri(query, self.limit)?;
        let res = self.get(uri).await?;
        check_status(res.status())?;
        let SearchResults { cards } = Fetcher::parse(&res)?;
        Ok(cards)
    }

    /// Finds the answer key. When the host's layout is known, a search only accepts a quiz of the same shape.
    pub async fn lookup(&self, source: &Source, layout: Option<&[usize]>) -> Result<AnswerKey> {
        let name = match source {
            Source::Id(uuid) => {
                let quiz = self.quiz(uuid).await?;
                if layout.is_some_and(|layout| !quiz.matches_layout(layout)) {
                    log::warn!("quiz {uuid} does not match the hosted game; answers may be wrong");
                }
                return Ok(quiz.into());
            }
            Source::Name(name) => name,
        };

        let cards = self.search(name).await?;
        log::info!("{} matching quizzes found", cards.len());

        let quiz = first_match(&cards, layout, |card| self.quiz(&card.uuid)).await?;
        log::info!("quiz found: {}", quiz.title);
        Ok(quiz.into())
    }
}

/// Fetches candidates in search order and returns the first one shaped like `layout`. Private or vanished quizzes
/// are skipped; any other failure ends the search.
async fn first_match<'a, F, Fut>(cards: &'a [Card], layout: Option<&'a [usize]>, mut fetch: F) -> Result<Quiz>
where
    F: FnMut(&'a Card) -> Fut,
    Fut: Future<Output = Result<Quiz>>,
{
    for card in candidates(cards, layout) {
        log::info!("checking {}...", card.title);
        let quiz = match fetch(card).await {
            Ok(quiz) => quiz,
            Err(err @ (Error::NotFound | Error::AuthRequired)) => {
                log::debug!("skipping {}: {err}", card.uuid);
                continue;
            }
            Err(err) => return Err(err),
        };

        if layout.map_or(true, |layout| quiz.matches_layout(layout)) {
            return Ok(quiz);
        }

        log::info!("wrong question types");
    }

    Err(Error::NotFound)
}

/// Cards worth fetching, in search order.
fn candidates<'a>(cards: &'a [Card], layout: Option<&'a [usize]>) -> impl Iterator<Item = &'a Card> + 'a {
    cards.iter().filter(move |card| layout.map_or(true, |layout| card.number_of_questions == layout.len()))
}

fn check_status(status: StatusCode) -> Result<()> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::BAD_REQUEST => Err(Error::InvalidUuid),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::AuthRequired),
        StatusCode::NOT_FOUND => Err(Error::NotFound),
        status => {
            log::warn!("quiz index responded with {status}");
            Err(Error::Fetch)
        }
    }
}

fn quiz_uri(uuid: &str) -> Result<Uri> {
    if uuid.is_empty() || !uuid.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'-') {
        return Err(Error::InvalidUuid);
    }
    alloc_uri(format!("{REST}/kahoots/{uuid}")).ok_or(Error::InvalidUuid)
}

fn search_uri(query: &str, limit: u16) -> Result<Uri> {
    let limit = limit.to_string();
    let params = form_urlencoded::Serializer::new(String::new())
        .append_pair("query", query)
        .append_pair("cursor", "0")
        .append_pair("limit", &limit)
        .append_pair("topics", "")
        .append_pair("grades", "")
        .append_pair("orderBy", "relevance")
        .append_pair("searchCluster", "1")
        .append_pair("includeExtendedCounters", "false")
        .finish();
    alloc_uri(format!("{REST}/kahoots/?{params}")).ok_or(Error::Fetch)
}

fn alloc_uri(text: String) -> Option<Uri> {
    Uri::try_from(text).ok()
}

#[cfg(test)]
mod tests {
    use super::{candidates, check_status, first_match, quiz_uri, search_uri, Error, Result};
    use http::StatusCode;
    use model::{search::Card, Quiz};
    use std::collections::HashMap;

    fn card(uuid: &str, questions: usize) -> Card {
        Card { uuid: uuid.into(), title: uuid.to_uppercase(), number_of_questions: questions }
    }

    #[test]
    fn filter_candidates_by_question_count() {
        let cards = [card("a", 3), card("b", 5), card("c", 3)];
        let layout = [4, 4, 2];
        let ids: Vec<_> = candidates(&cards, Some(&layout[..])).map(|card| card.uuid.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);

        let ids: Vec<_> = candidates(&cards, None).map(|card| card.uuid.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(check_status(StatusCode::OK), Ok(()));
        assert_eq!(check_status(StatusCode::BAD_REQUEST), Err(Error::InvalidUuid));
        assert_eq!(check_status(StatusCode::FORBIDDEN), Err(Error::AuthRequired));
        assert_eq!(check_status(StatusCode::NOT_FOUND), Err(Error::NotFound));
        assert_eq!(check_status(StatusCode::BAD_GATEWAY), Err(Error::Fetch));
    }

    #[test]
    fn quiz_uri_rejects_path_tricks() {
        let uri = quiz_uri("0a1b2c3d-0000-4000-8000-000000000000").unwrap();
        assert_eq!(uri.path(), "/rest/kahoots/0a1b2c3d-0000-4000-8000-000000000000");
        assert_eq!(quiz_uri("../authenticate"), Err(Error::InvalidUuid));
        assert_eq!(quiz_uri(""), Err(Error::InvalidUuid));
    }

    #[test]
    fn search_query_is_encoded() {
        let uri = search_uri("solar system & more", 5).unwrap();
        assert_eq!(uri.host(), Some("create.kahoot.it"));
        let query = uri.query().unwrap();
        assert!(query.starts_with("query=solar+system+%26+more&cursor=0&limit=5&"));
        assert!(query.ends_with("orderBy=relevance&searchCluster=1&includeExtendedCounters=false"));
    }

    fn quiz(uuid: &str, layout: &[usize]) -> Quiz {
        let questions: Vec<_> = layout
            .iter()
            .map(|&count| {
                let choices: Vec<_> =
                    (0..count).map(|i| serde_json::json!({ "answer": i.to_string(), "correct": i == 0 })).collect();
                serde_json::json!({ "type": "quiz", "question": "?", "choices": choices })
            })
            .collect();
        serde_json::from_value(serde_json::json!({ "uuid": uuid, "title": uuid, "questions": questions })).unwrap()
    }

    async fn select(cards: &[Card], layout: Option<&[usize]>, index: &HashMap<&str, Result<Quiz>>) -> Result<Quiz> {
        first_match(cards, layout, |card| {
            let fetched = index.get(card.uuid.as_str()).cloned().unwrap_or(Err(Error::NotFound));
            core::future::ready(fetched)
        })
        .await
    }

    #[tokio::test(flavor = "current_thread")]
    async fn pick_first_quiz_with_same_shape() {
        let cards = [card("private", 3), card("gone", 3), card("shuffled", 3), card("short", 2), card("match", 3)];
        let index = HashMap::from([
            ("private", Err(Error::AuthRequired)),
            ("shuffled", Ok(quiz("shuffled", &[2, 4, 4]))),
            ("short", Ok(quiz("short", &[4, 2]))),
            ("match", Ok(quiz("match", &[4, 2, 4]))),
        ]);

        let found = select(&cards, Some(&[4, 2, 4][..]), &index).await.unwrap();
        assert_eq!(found.uuid.as_deref(), Some("match"));

        // Without a layout the first fetchable candidate wins.
        let found = select(&cards, None, &index).await.unwrap();
        assert_eq!(found.uuid.as_deref(), Some("shuffled"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn no_candidate_matches() {
        let cards = [card("a", 2), card("b", 2)];
        let index = HashMap::from([("a", Ok(quiz("a", &[4, 4]))), ("b", Ok(quiz("b", &[2, 4])))]);
        assert_eq!(select(&cards, Some(&[4, 2][..]), &index).await, Err(Error::NotFound));
        assert_eq!(select(&[], None, &index).await, Err(Error::NotFound));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetch_failure_ends_search() {
        let cards = [card("broken", 1), card("fine", 1)];
        let index = HashMap::from([("broken", Err(Error::Fetch)), ("fine", Ok(quiz("fine", &[4])))]);
        assert_eq!(select(&cards, Some(&[4][..]), &index).await, Err(Error::Fetch));
    }
}
