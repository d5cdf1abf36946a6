use crate::{
    auth::{Auth, TokenAuth},
    search::core::{search_sketch_read, SearchSketch},
    util::Tag,
};
use poem::{error::InternalServerError, web::Data};
use poem_openapi::{param::Query, payload::Json, OpenApi};
use sqlx::PgPool;

/// Struct we will build our REST API / Webserver
pub struct SearchApi;

#[OpenApi]
impl SearchApi {
    /// Search sketches by title or description
    #[oai(path = "/search/sketch", method = "get", tag = Tag::Search)]
    async fn search_sketch_get(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Query(query): Query<Option<String>>,
        Query(page): Query<Option<u64>>,
    ) -> Result<Json<SearchSketch>, poem::Error> {
        // Default no page to 0
        let page = page.unwrap_or(0);
        let query = query.unwrap_or_default();

        // Start Transaction
        let mut tx = pool.begin().await.map_err(InternalServerError)?;

        // Pull sketches
        let search_sketch = search_sketch_read(&mut tx, &query, auth.username(), &page).await?;

        Ok(Json(search_sketch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_utils::{
        gen_encode_decode_token, gen_test_token, gen_test_user_creds, post_test_sketch,
    };
    use poem::test::TestClient;
    use poem_openapi::OpenApiService;

    /// Test sketch search
    #[sqlx::test]
    async fn test_search_sketch_get(pool: PgPool) {
        for index in 0..50 {
            post_test_sketch(&format!("test_sketch_{index}"), "alice", &pool).await;
        }
        post_test_sketch("foobar_sketch", "alice", &pool).await;
        post_test_sketch("test_sketch_bob", "bob", &pool).await;

        let (encoding_key, decoding_key) = gen_encode_decode_token();
        let token = gen_test_token("alice", &encoding_key);
        let user_creds = gen_test_user_creds(&["alice", "bob"]);

        // Test Client
        let ep = OpenApiService::new(SearchApi, "test", "1.0");
        let cli = TestClient::new(ep);

        {
            let response = cli
                .get("/search/sketch")
                .header("X-API-Key", &token)
                .query("query", &"sketch")
                .data(decoding_key.clone())
                .data(user_creds.clone())
                .data(pool.clone())
                .send()
                .await;

            response.assert_status_is_ok();

            let test_json = response.json().await;
            let json_value = test_json.value();

            json_value.object().get("sketches").array().assert_len(50);
            json_value.object().get("page").assert_i64(0);
            json_value.object().get("more").assert_bool(true);
        }

        {
            let response = cli
                .get("/search/sketch")
                .header("X-API-Key", &token)
                .query("query", &"sketch")
                .query("page", &1)
                .data(decoding_key.clone())
                .data(user_creds.clone())
                .data(pool.clone())
                .send()
                .await;

            response.assert_status_is_ok();

            let test_json = response.json().await;
            let json_value = test_json.value();

            json_value.object().get("sketches").array().assert_len(1);
            json_value.object().get("page").assert_i64(1);
            json_value.object().get("more").assert_bool(false);
        }

        {
            let response = cli
                .get("/search/sketch")
                .header("X-API-Key", &token)
                .data(decoding_key)
                .data(user_creds)
                .data(pool)
                .send()
                .await;

            response.assert_status_is_ok();

            let test_json = response.json().await;
            let json_value = test_json.value();

            json_value.object().get("sketches").array().assert_len(0);
            json_value.object().get("more").assert_bool(false);
        }
    }

    /// Test a page too far out is refused
    #[sqlx::test]
    async fn test_search_sketch_get_page_out_of_range(pool: PgPool) {
        let (encoding_key, decoding_key) = gen_encode_decode_token();
        let token = gen_test_token("alice", &encoding_key);

        let ep = OpenApiService::new(SearchApi, "test", "1.0");
        let cli = TestClient::new(ep);

        let response = cli
            .get("/search/sketch")
            .header("X-API-Key", &token)
            .query("query", &"sketch")
            .query("page", &u64::MAX)
            .data(decoding_key)
            .data(gen_test_user_creds(&["alice"]))
            .data(pool)
            .send()
            .await;

        response.assert_status(poem::http::StatusCode::BAD_REQUEST);
        response.assert_text("page is out of range").await;
    }

    /// Test search needs a token
    #[sqlx::test]
    async fn test_search_sketch_get_unauthorized(pool: PgPool) {
        let ep = OpenApiService::new(SearchApi, "test", "1.0");
        let cli = TestClient::new(ep);

        let response = cli
            .get("/search/sketch")
            .query("query", &"sketch")
            .data(gen_encode_decode_token().1)
            .data(pool)
            .send()
            .await;

        response.assert_status(poem::http::StatusCode::UNAUTHORIZED);
    }
}
