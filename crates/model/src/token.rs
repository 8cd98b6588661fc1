use alloc::{
    boxed::Box,
    fmt::{self, Formatter},
};
use serde::{
    de::{IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer,
};

/// Access token issued by the authentication endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Access token prefixed with its type (`Bearer`), ready for the `Authorization` header.
    pub access: Box<str>,
    /// Expiry timestamp in milliseconds, when given.
    pub expires: Option<u64>,
}

struct TokenVisitor;

impl<'de> Visitor<'de> for TokenVisitor {
    type Value = Token;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("a valid token response")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        use serde::de::Error;

        let mut access = None::<Box<str>>;
        let mut expires = None::<u64>;

        // The response also carries the full user profile, which we skip over.
        while let Some(key) = map.next_key::<&str>()? {
            match key {
                "access_token" if access.is_some() => return Err(A::Error::duplicate_field("access_token")),
                "expires" if expires.is_some() => return Err(A::Error::duplicate_field("expires")),
                "access_token" => {
                    let token = map.next_value::<&str>()?;
                    if token.is_empty() {
                        return Err(A::Error::invalid_length(0, &"a non-empty token"));
                    }
                    access = Some(alloc::format!("Bearer {token}").into_boxed_str());
                }
                "expires" => expires = Some(map.next_value()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(Self::Value { access: access.ok_or_else(|| A::Error::missing_field("access_token"))?, expires })
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TokenVisitor)
    }
}
