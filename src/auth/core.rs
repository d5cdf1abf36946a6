use bcrypt::verify;
use jsonwebtoken::{
    decode, encode, get_current_timestamp, DecodingKey, EncodingKey, Header, Validation,
};
use poem::{session::Session, Request};
use poem_openapi::{
    auth::{ApiKey, Basic},
    Object, SecurityScheme,
};
use serde::{Deserialize, Serialize};

/// Struct to hold user creds
#[derive(Clone, Debug, Deserialize)]
pub struct UserCred {
    pub username: String,
    pub hash: String,
}

/// Struct to return when authenticating
#[derive(Debug, Object, PartialEq)]
pub struct User {
    pub username: String,
}

const ONE_DAY: u64 = 60 * 60 * 24;
const ISSUER: &str = "Timesketch";

/// Session key the signed in username lives under
pub const SESSION_USERNAME: &str = "username";

/// Claim for JWT
#[derive(Deserialize, Serialize)]
struct Claim {
    sub: String,
    iat: u64,
    exp: u64,
    iss: String,
}

/// Create a new JWT
pub fn make_jwt(
    username: &str,
    encoding_key: &EncodingKey,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = get_current_timestamp();
    let claim = Claim {
        sub: username.to_string(),
        iat: now,
        exp: now + ONE_DAY,
        iss: ISSUER.to_string(),
    };

    encode(&Header::default(), &claim, encoding_key)
}

/// Look up the creds of a configured user
fn find_user_cred<'a>(req: &'a Request, username: &str) -> Option<&'a UserCred> {
    req.data::<Vec<UserCred>>()?
        .iter()
        .find(|user_cred| user_cred.username == username)
}

/// Is this still a configured user?
pub fn has_ui_access(username: &str, req: &Request) -> bool {
    find_user_cred(req, username).is_some()
}

/// Username of the signed in user, if the session has one that is still valid
pub fn session_user(session: &Session, req: &Request) -> Option<String> {
    let username: String = session.get(SESSION_USERNAME)?;
    has_ui_access(&username, req).then_some(username)
}

/// Trait for our auth methods
pub trait Auth {
    /// All auth methods need to be able to return usernames
    fn username(&self) -> &str;
}

/// Basic Authentication
#[derive(SecurityScheme)]
#[oai(ty = "basic", checker = "basic_checker")]
pub struct BasicAuth(User);

impl Auth for BasicAuth {
    fn username(&self) -> &str {
        &self.0.username
    }
}

/// How we authenticate for BasicAuth
pub async fn basic_checker(req: &Request, basic: Basic) -> Option<User> {
    let user_cred = find_user_cred(req, &basic.username)?;

    // Verify password to hash
    let valid = verify(&basic.password, &user_cred.hash).ok()?;

    valid.then_some(User {
        username: basic.username,
    })
}

/// Token Authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "api_key",
    key_name = "X-API-Key",
    key_in = "header",
    checker = "token_checker"
)]
pub struct TokenAuth(User);

impl Auth for TokenAuth {
    fn username(&self) -> &str {
        &self.0.username
    }
}

/// How TokenAuth validates a token
async fn token_checker(req: &Request, api_key: ApiKey) -> Option<User> {
    let decoding_key = req.data::<DecodingKey>()?;

    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);

    let token_data = decode::<Claim>(&api_key.key, decoding_key, &validation).ok()?;

    // Tokens outlive config changes, so make sure the user still exists.
    find_user_cred(req, &token_data.claims.sub)?;

    Some(User {
        username: token_data.claims.sub,
    })
}

/// Key or Basic Auth
#[derive(SecurityScheme)]
pub enum TokenOrBasicAuth {
    TokenAuth(TokenAuth),
    BasicAuth(BasicAuth),
}

impl Auth for TokenOrBasicAuth {
    fn username(&self) -> &str {
        match self {
            TokenOrBasicAuth::TokenAuth(auth) => auth.username(),
            TokenOrBasicAuth::BasicAuth(auth) => auth.username(),
        }
    }
}
