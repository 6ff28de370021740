/// Produces the bearer token sent in the `Authorization` header.
///
/// The client asks for a token once, when it is constructed.
pub trait TokenProvider {
    fn token(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> StaticToken {
        StaticToken(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> String {
        self.0.clone()
    }
}

impl<F: Fn() -> String> TokenProvider for F {
    fn token(&self) -> String {
        self()
    }
}

pub enum Credential {
    SubscriptionKey(String),
    Token(Box<dyn TokenProvider>),
}

impl Credential {
    pub fn subscription_key(key: impl Into<String>) -> Credential {
        Credential::SubscriptionKey(key.into())
    }

    pub fn token<P: TokenProvider + 'static>(provider: P) -> Credential {
        Credential::Token(Box::new(provider))
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Credential::SubscriptionKey(_) => f.write_str("SubscriptionKey(<redacted>)"),
            Credential::Token(_) => f.write_str("Token(<provider>)"),
        }
    }
}
