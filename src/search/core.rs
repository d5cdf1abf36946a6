use crate::{search::db::search_sketch_select, sketch::Sketch, util::PAGE_SIZE};
use poem::{error::InternalServerError, http::StatusCode};
use poem_openapi::Object;
use sqlx::{Postgres, Transaction};

/// Sketch Search Results
#[derive(Debug, Object)]
pub struct SearchSketch {
    pub sketches: Vec<Sketch>,
    pub page: u64,
    pub more: bool,
}

/// Offset of a page, if Postgres can take it
fn page_offset(page: u64) -> Option<u64> {
    page.checked_mul(PAGE_SIZE).filter(|offset| *offset <= i64::MAX as u64)
}

/// Search the sketches the user can read. A blank query matches nothing, anything else is
/// matched as is, surrounding whitespace included.
pub async fn search_sketch_read(
    tx: &mut Transaction<'_, Postgres>,
    query: &str,
    username: &str,
    page: &u64,
) -> Result<SearchSketch, poem::Error> {
    // Compute offset
    let offsets = page_offset(*page).zip(page.checked_add(1).and_then(page_offset));
    let Some((offset, next_offset)) = offsets else {
        return Err(poem::Error::from_string(
            "page is out of range",
            StatusCode::BAD_REQUEST,
        ));
    };

    if query.trim().is_empty() {
        return Ok(SearchSketch {
            sketches: Vec::new(),
            page: *page,
            more: false,
        });
    }

    // Pull the Sketches
    let sketches = search_sketch_select(tx, query, username, &Some(PAGE_SIZE), &Some(offset))
        .await
        .map_err(InternalServerError)?;

    // More sketches present?
    let next_sketch = search_sketch_select(tx, query, username, &Some(1), &Some(next_offset))
        .await
        .map_err(InternalServerError)?;

    let more = !next_sketch.is_empty();

    Ok(SearchSketch {
        sketches,
        page: *page,
        more,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{acl::make_public, util::test_utils::post_test_sketch};
    use pretty_assertions::assert_eq;
    use sqlx::PgPool;

    /// Test search only returns readable matches
    #[sqlx::test]
    async fn test_search_sketch_read(pool: PgPool) {
        let mine = post_test_sketch("Intrusion at ACME", "alice", &pool).await;
        let theirs = post_test_sketch("Intrusion at Initech", "bob", &pool).await;
        post_test_sketch("Phishing wave", "alice", &pool).await;

        let mut tx = pool.begin().await.unwrap();

        let search = search_sketch_read(&mut tx, "intrusion", "alice", &0)
            .await
            .unwrap();
        assert_eq!(search.sketches.len(), 1);
        assert_eq!(search.sketches[0].id, mine.id);
        assert_eq!(search.more, false);

        make_public(&mut tx, &theirs, "bob").await.unwrap();

        let search = search_sketch_read(&mut tx, "INTRUSION", "alice", &0)
            .await
            .unwrap();
        assert_eq!(search.sketches.len(), 2);

        // Description matches too
        let search = search_sketch_read(&mut tx, "wave description", "alice", &0)
            .await
            .unwrap();
        assert_eq!(search.sketches.len(), 1);

        // Whitespace is part of the query
        let search = search_sketch_read(&mut tx, "  wave", "alice", &0)
            .await
            .unwrap();
        assert_eq!(search.sketches.len(), 0);
    }

    /// Test empty and wildcard queries
    #[sqlx::test]
    async fn test_search_sketch_read_empty(pool: PgPool) {
        post_test_sketch("Intrusion", "alice", &pool).await;

        let mut tx = pool.begin().await.unwrap();

        let search = search_sketch_read(&mut tx, "  ", "alice", &0).await.unwrap();
        assert_eq!(search.sketches.len(), 0);
        assert_eq!(search.more, false);

        let search = search_sketch_read(&mut tx, "%", "alice", &0).await.unwrap();
        assert_eq!(search.sketches.len(), 0);
    }

    /// Test paging through results
    #[sqlx::test]
    async fn test_search_sketch_read_page(pool: PgPool) {
        for index in 0..51 {
            post_test_sketch(&format!("Case {index}"), "alice", &pool).await;
        }

        let mut tx = pool.begin().await.unwrap();

        let search = search_sketch_read(&mut tx, "case", "alice", &0).await.unwrap();
        assert_eq!(search.sketches.len(), 50);
        assert_eq!(search.page, 0);
        assert_eq!(search.more, true);

        let search = search_sketch_read(&mut tx, "case", "alice", &1).await.unwrap();
        assert_eq!(search.sketches.len(), 1);
        assert_eq!(search.page, 1);
        assert_eq!(search.more, false);
    }

    /// Test pages past what Postgres can offset
    #[sqlx::test]
    async fn test_search_sketch_read_page_out_of_range(pool: PgPool) {
        post_test_sketch("Intrusion", "alice", &pool).await;

        let mut tx = pool.begin().await.unwrap();

        for page in [u64::MAX, u64::MAX / PAGE_SIZE, i64::MAX as u64 / PAGE_SIZE] {
            let err = search_sketch_read(&mut tx, "intrusion", "alice", &page)
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert_eq!(format!("{err}"), "page is out of range");
        }

        let last_page = i64::MAX as u64 / PAGE_SIZE - 1;
        let search = search_sketch_read(&mut tx, "intrusion", "alice", &last_page)
            .await
            .unwrap();
        assert_eq!(search.sketches.len(), 0);
        assert_eq!(search.more, false);
    }
}
