use crate::saved_view::core::{SavedView, SavedViewParam};
use chrono::Utc;
use sqlx::{query_as, Postgres, Transaction};

/// Save a view to the saved_view table
pub async fn saved_view_insert(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    saved_view_param: &SavedViewParam,
    username: &str,
) -> Result<SavedView, sqlx::Error> {
    let saved_view = query_as::<_, SavedView>(
        "INSERT INTO saved_view (
            sketch_id,
            name,
            query,
            filter,
            created_by,
            created_date,
            modified_by,
            modified_date
        ) VALUES (
            $1,
            $2,
            $3,
            $4,
            $5,
            $6,
            $7,
            $8
        ) RETURNING
            id,
            sketch_id,
            name,
            query,
            filter,
            created_by,
            created_date,
            modified_by,
            modified_date",
    )
    .bind(sketch_id)
    .bind(&saved_view_param.name)
    .bind(&saved_view_param.query)
    .bind(&saved_view_param.filter)
    .bind(username)
    .bind(Utc::now())
    .bind(username)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(saved_view)
}

/// Pull one view of a sketch
pub async fn saved_view_select(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    saved_view_id: i32,
) -> Result<SavedView, sqlx::Error> {
    let saved_view = query_as::<_, SavedView>(
        "SELECT
            id,
            sketch_id,
            name,
            query,
            filter,
            created_by,
            created_date,
            modified_by,
            modified_date
        FROM
            saved_view
        WHERE
            sketch_id = $1
            AND id = $2",
    )
    .bind(sketch_id)
    .bind(saved_view_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(saved_view)
}

/// Pull every view of a sketch
pub async fn saved_view_select_by_sketch(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
) -> Result<Vec<SavedView>, sqlx::Error> {
    let saved_views = query_as::<_, SavedView>(
        "SELECT
            id,
            sketch_id,
            name,
            query,
            filter,
            created_by,
            created_date,
            modified_by,
            modified_date
        FROM
            saved_view
        WHERE
            sketch_id = $1
        ORDER BY
            id",
    )
    .bind(sketch_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(saved_views)
}

/// Delete a view of a sketch
pub async fn saved_view_drop(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    saved_view_id: i32,
) -> Result<SavedView, sqlx::Error> {
    let saved_view = query_as::<_, SavedView>(
        "DELETE FROM
            saved_view
        WHERE
            sketch_id = $1
            AND id = $2
        RETURNING
            id,
            sketch_id,
            name,
            query,
            filter,
            created_by,
            created_date,
            modified_by,
            modified_date",
    )
    .bind(sketch_id)
    .bind(saved_view_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(saved_view)
}
