use crate::{
    auth::core::{make_jwt, Auth, TokenAuth, TokenOrBasicAuth, User},
    util::Tag,
};
use jsonwebtoken::EncodingKey;
use poem::{error::InternalServerError, web::Data};
use poem_openapi::{
    payload::{Json, PlainText},
    OpenApi,
};

/// Auth endpoints for the REST API
pub struct AuthApi;

#[OpenApi]
impl AuthApi {
    /// Generate a fresh JWT
    #[oai(path = "/gen_token", method = "post", tag = Tag::Auth)]
    async fn gen_token(
        &self,
        auth: TokenOrBasicAuth,
        Data(encoding_key): Data<&EncodingKey>,
    ) -> Result<PlainText<String>, poem::Error> {
        let token = make_jwt(auth.username(), encoding_key).map_err(InternalServerError)?;

        Ok(PlainText(token))
    }

    /// Who am I?
    #[oai(path = "/user/me", method = "get", tag = Tag::Auth)]
    async fn user_me(&self, auth: TokenAuth) -> Json<User> {
        Json(User {
            username: auth.username().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_utils::{gen_encode_decode_token, gen_test_token, gen_test_user_creds};
    use poem::{http::StatusCode, test::TestClient, web::headers::Authorization};
    use poem_openapi::OpenApiService;

    /// Test creating a token with basic auth
    #[tokio::test]
    async fn test_gen_token_basic() {
        let (encoding_key, _) = gen_encode_decode_token();

        let ep = OpenApiService::new(AuthApi, "test", "1.0");
        let cli = TestClient::new(ep);

        let response = cli
            .post("/gen_token")
            .typed_header(Authorization::basic("analyst", "abc123"))
            .data(encoding_key)
            .data(gen_test_user_creds(&["analyst"]))
            .send()
            .await;

        response.assert_status_is_ok();
    }

    /// Test creating a token with a bad password
    #[tokio::test]
    async fn test_gen_token_basic_bad() {
        let (encoding_key, _) = gen_encode_decode_token();

        let ep = OpenApiService::new(AuthApi, "test", "1.0");
        let cli = TestClient::new(ep);

        let response = cli
            .post("/gen_token")
            .typed_header(Authorization::basic("analyst", "bad_password"))
            .data(encoding_key)
            .data(gen_test_user_creds(&["analyst"]))
            .send()
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    /// Test refreshing a token with a token
    #[tokio::test]
    async fn test_gen_token_token() {
        let (encoding_key, decoding_key) = gen_encode_decode_token();
        let token = gen_test_token("analyst", &encoding_key);

        let ep = OpenApiService::new(AuthApi, "test", "1.0");
        let cli = TestClient::new(ep);

        let response = cli
            .post("/gen_token")
            .header("X-API-Key", &token)
            .data(encoding_key)
            .data(decoding_key)
            .data(gen_test_user_creds(&["analyst"]))
            .send()
            .await;

        response.assert_status_is_ok();
    }

    /// Test who am I
    #[tokio::test]
    async fn test_user_me() {
        let (encoding_key, decoding_key) = gen_encode_decode_token();
        let token = gen_test_token("analyst", &encoding_key);

        let ep = OpenApiService::new(AuthApi, "test", "1.0");
        let cli = TestClient::new(ep);

        let response = cli
            .get("/user/me")
            .header("X-API-Key", &token)
            .data(decoding_key)
            .data(gen_test_user_creds(&["analyst"]))
            .send()
            .await;

        response.assert_status_is_ok();

        let test_json = response.json().await;
        test_json
            .value()
            .object()
            .get("username")
            .assert_string("analyst");
    }

    /// Test who am I without a valid token
    #[tokio::test]
    async fn test_user_me_bad_token() {
        let (_, decoding_key) = gen_encode_decode_token();

        let ep = OpenApiService::new(AuthApi, "test", "1.0");
        let cli = TestClient::new(ep);

        let response = cli
            .get("/user/me")
            .header("X-API-Key", "bad_token")
            .data(decoding_key)
            .data(gen_test_user_creds(&["analyst"]))
            .send()
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
