use std::fmt::{self, Debug, Display};

/// A bearer token for the commerce API. Renders as `****` in both Debug and Display so the
/// credential cannot leak through config dumps or log lines; the raw value is only reachable
/// through an explicit [`ApiToken::reveal`] call at the point the Authorization header is built.
#[derive(Clone, Default)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod test {
    use super::ApiToken;

    #[test]
    fn token_is_redacted_in_debug_and_display() {
        let token = ApiToken::new("token_sekrit_001");
        assert_eq!(format!("{token}"), "****");
        assert_eq!(format!("{token:?}"), "****");
        assert_eq!(token.reveal(), "token_sekrit_001");
    }
}
