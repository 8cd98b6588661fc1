pub mod challenge;
pub mod error;
#[cfg(test)]
pub(crate) mod script;
pub mod transport;

use crate::http::Fetcher;
use cometd::{Client, Transport};
use http::StatusCode;
use hyper::{Method, Uri};
use model::Event;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use transport::LongPolling;

pub use error::{Error, Result};

pub const CONTROLLER: &str = "/service/controller";
pub const PLAYER: &str = "/service/player";
pub const STATUS: &str = "/service/status";

const HOST: &str = "kahoot.it";
const CAPTCHA_TOKEN: &str = "KAHOOT_TOKEN_eyJ2ZXJzaW9uIjoiIn0=";
const SESSION_TOKEN: &str = "x-kahoot-session-token";

/// Outcome of reserving a seat in the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Base64 token to be combined with the challenge solution.
    pub token: Box<str>,
    pub challenge: Box<str>,
    pub two_factor: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReservationBody {
    challenge: Box<str>,
    #[serde(default)]
    two_factor_auth: bool,
}

fn unix_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|time| time.as_millis()).unwrap_or_default()
}

pub async fn reserve(fetcher: &Fetcher, pin: &str) -> Result<Reservation> {
    let uri = format!("https://play.kahoot.it/reserve/session/{pin}/?{}", unix_millis() / 1000);
    let uri = Uri::try_from(uri).map_err(|_| Error::InvalidPin)?;
    let res = fetcher.send(Fetcher::empty(Fetcher::request(Method::GET, uri))?).await?;

    match res.status() {
        StatusCode::OK => {}
        StatusCode::NOT_FOUND => return Err(Error::InvalidPin),
        status => {
            log::warn!("reservation failed with status {status}");
            return Err(Error::ConnectionRefused);
        }
    }

    let token = res
        .headers()
        .get(SESSION_TOKEN)
        .and_then(|value| value.to_str().ok())
        .ok_or(Error::ConnectionRefused)?;
    let ReservationBody { challenge, two_factor_auth } = Fetcher::parse(&res)?;
    Ok(Reservation { token: token.into(), challenge, two_factor: two_factor_auth })
}

/// A host message on one of the subscribed channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    pub kind: Event,
    /// Raw JSON content of the event.
    pub content: Box<str>,
}

impl GameEvent {
    /// Interprets the `data` of a CometD event. Messages without an event code yield `None`.
    pub fn from_data(data: Value) -> Result<Option<Self>> {
        let Value::Object(mut fields) = data else {
            return Ok(None);
        };

        if let Some(error) = fields.get("error") {
            let description = match fields.get("description").and_then(Value::as_str) {
                Some(description) => description.into(),
                None => error.to_string().into(),
            };
            return Err(Error::Host(description));
        }

        let Some(code) = fields.get("id").and_then(Value::as_u64) else {
            return Ok(None);
        };
        let Some(kind) = u8::try_from(code).ok().and_then(Event::from_code) else {
            log::debug!("ignoring unknown event code {code}");
            return Ok(None);
        };

        let content = match fields.remove("content") {
            Some(Value::String(content)) => content.into(),
            Some(other) => other.to_string().into(),
            None => "{}".into(),
        };
        Ok(Some(Self { kind, content }))
    }

    /// Parses the content as a typed payload.
    pub fn payload<T: DeserializeOwned>(&self) -> Option<T> {
        match serde_json::from_str(&self.content) {
            Ok(payload) => Some(payload),
            Err(err) => {
                log::warn!("malformed {} payload: {err}", self.kind);
                None
            }
        }
    }
}

fn login_payload(pin: &str, nickname: &str) -> Value {
    json!({
        "host": HOST,
        "gameid": pin,
        "captchaToken": CAPTCHA_TOKEN,
        "name": nickname,
        "type": "login",
    })
}

fn message_payload(pin: &str, id: u8, content: &Value) -> Value {
    json!({
        "content": content.to_string(),
        "gameid": pin,
        "host": HOST,
        "type": "message",
        "id": id,
    })
}

fn answer_content(choice: u8) -> Value {
    json!({
        "choice": choice,
        "meta": {
            "lag": 0,
            "device": { "userAgent": "kbot", "screen": { "width": 1920, "height": 1080 } },
        },
    })
}

fn timesync_ext() -> Value {
    let now = u64::try_from(unix_millis()).unwrap_or_default();
    json!({ "ack": true, "timesync": { "tc": now, "l": 0, "o": 0 } })
}

/// A joined player in a live game.
pub struct Session<T = LongPolling> {
    pin: Box<str>,
    nickname: Box<str>,
    client: Client<T>,
}

impl Session {
    /// Reserves a seat, solves the challenge and logs in under `nickname`.
    pub async fn join(fetcher: Fetcher, pin: &str, nickname: &str) -> Result<Self> {
        let reservation = reserve(&fetcher, pin).await?;
        if reservation.two_factor {
            log::info!("game {pin} requires two-factor authentication");
        }

        let solution = challenge::solve(&reservation.challenge).ok_or(Error::Challenge)?;
        let session_id = challenge::session_id(&reservation.token, &solution).ok_or(Error::Challenge)?;
        let uri = Uri::try_from(format!("https://play.kahoot.it/cometd/{pin}/{session_id}"))
            .map_err(|_| Error::Challenge)?;

        let client = Client::new(LongPolling::new(fetcher, uri)).with_handshake_ext(timesync_ext());
        Self::login(client, pin, nickname).await
    }
}

impl<T: Transport> Session<T> {
    /// Logs in over an unconnected CometD client. A half-open server session is closed on failure.
    pub async fn login(client: Client<T>, pin: &str, nickname: &str) -> Result<Self> {
        let mut session = Self { pin: pin.into(), nickname: nickname.into(), client };
        if let Err(err) = session.enter().await {
            log::error!("failed to join game {pin}: {err}");
            session.client.disconnect().await?;
            return Err(Error::ConnectionRefused);
        }

        log::info!("joined game {pin} as {nickname}");
        Ok(session)
    }

    async fn enter(&mut self) -> cometd::Result<()> {
        self.client.handshake().await?;
        self.client.connect().await?;
        for channel in [CONTROLLER, PLAYER, STATUS] {
            self.client.subscribe(channel).await?;
        }
        self.client.publish(CONTROLLER, login_payload(&self.pin, &self.nickname)).await?;
        Ok(())
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Waits for the next host event. Host errors end the session.
    pub async fn next_event(&mut self) -> Result<GameEvent> {
        loop {
            let message = self.client.receive().await?;
            let Some(data) = message.data else {
                continue;
            };
            match GameEvent::from_data(data)? {
                Some(event) => return Ok(event),
                None => log::debug!("skipping message on {}", message.channel),
            }
        }
    }

    async fn send(&mut self, id: u8, content: &Value) -> Result<()> {
        let payload = message_payload(&self.pin, id, content);
        self.client.publish(CONTROLLER, payload).await?;
        Ok(())
    }

    /// Submits the option at position `choice` for the current question.
    pub async fn answer(&mut self, choice: u8) -> Result<()> {
        self.send(Event::ANSWER_ID, &answer_content(choice)).await
    }

    /// Submits the two-factor color sequence, given as option positions (`"0123"`).
    pub async fn submit_two_factor(&mut self, sequence: &str) -> Result<()> {
        self.send(Event::TWO_FACTOR_ID, &json!({ "sequence": sequence })).await
    }

    pub async fn leave(&mut self) -> Result<()> {
        self.client.disconnect().await?;
        log::info!("left game {}", self.pin);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        answer_content, login_payload, message_payload,
        script::{self, Script},
        Error, GameEvent, Session, CONTROLLER,
    };
    use cometd::{message, Client};
    use model::{event::QuestionStart, Event, QuestionKind};
    use serde_json::{json, Value};

    #[test]
    fn event_from_data() {
        let data = json!({ "id": 2, "type": "message", "content": "{\"questionIndex\":1,\"type\":\"quiz\"}" });
        let event = GameEvent::from_data(data).unwrap().unwrap();
        assert_eq!(event.kind, Event::StartQuestion);

        let question: QuestionStart = event.payload().unwrap();
        assert_eq!(question.question_index, Some(1));
        assert_eq!(question.kind, QuestionKind::Quiz);
    }

    #[test]
    fn unknown_or_codeless_data_is_skipped() {
        assert_eq!(GameEvent::from_data(json!({ "id": 99, "content": "{}" })), Ok(None));
        assert_eq!(GameEvent::from_data(json!({ "type": "status", "status": "ACTIVE" })), Ok(None));
        assert_eq!(GameEvent::from_data(Value::Null), Ok(None));
    }

    #[test]
    fn host_error_is_fatal() {
        let data = json!({ "error": "NONEXISTING_SESSION", "description": "Game not found" });
        assert_eq!(GameEvent::from_data(data), Err(Error::Host("Game not found".into())));

        let data = json!({ "error": "USER_INPUT" });
        assert_eq!(GameEvent::from_data(data), Err(Error::Host("\"USER_INPUT\"".into())));
    }

    #[test]
    fn login_message() {
        let login = login_payload("123456", "bot");
        assert_eq!(login["type"], "login");
        assert_eq!(login["gameid"], "123456");
        assert_eq!(login["name"], "bot");
        assert_eq!(login["host"], "kahoot.it");
    }

    #[test]
    fn answer_message_content_is_a_string() {
        let message = message_payload("123456", Event::ANSWER_ID, &answer_content(2));
        assert_eq!(message["id"], 45);
        assert_eq!(message["type"], "message");

        let content: Value = serde_json::from_str(message["content"].as_str().unwrap()).unwrap();
        assert_eq!(content["choice"], 2);
        assert_eq!(content["meta"]["device"]["userAgent"], "kbot");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn login_then_answer() {
        let mut replies = script::login();
        replies.push(Ok(vec![script::ok(CONTROLLER, 6)]));
        let script = Script::new(replies);

        let mut session = Session::login(Client::new(&script), "123456", "bot").await.unwrap();
        session.answer(3).await.unwrap();

        let published = script.published(CONTROLLER);
        assert_eq!(published.len(), 2);
        assert_eq!(published[0]["type"], "login");
        assert_eq!(published[1]["id"], Event::ANSWER_ID);
        let content: Value = serde_json::from_str(published[1]["content"].as_str().unwrap()).unwrap();
        assert_eq!(content["choice"], 3);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_login_disconnects() {
        let script = Script::new([
            Ok(vec![script::handshake("c1")]),
            Ok(vec![script::ok(message::CONNECT, 1)]),
            Ok(vec![cometd::message::Message {
                successful: Some(false),
                error: Some("403::Forbidden".into()),
                ..script::subscribed(2, CONTROLLER)
            }]),
            Ok(vec![script::ok(message::DISCONNECT, 3)]),
        ]);

        let result = Session::login(Client::new(&script), "123456", "bot").await;
        assert!(matches!(result, Err(Error::ConnectionRefused)));

        let sent = script.sent();
        let last = sent.last().unwrap();
        assert_eq!(last.channel.as_ref(), message::DISCONNECT);
        assert_eq!(last.client_id.as_deref(), Some("c1"));
    }
}
