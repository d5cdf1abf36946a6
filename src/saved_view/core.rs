use crate::{
    saved_view::db::{
        saved_view_drop, saved_view_insert, saved_view_select, saved_view_select_by_sketch,
    },
    sketch::sketch_read,
};
use chrono::{DateTime, Utc};
use poem::{
    error::{BadRequest, InternalServerError},
    http::StatusCode,
};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, Transaction};
use validator::Validate;

/// Search configuration saved inside a sketch
#[derive(Debug, FromRow, Object)]
pub struct SavedView {
    pub id: i32,
    pub sketch_id: i32,
    pub name: String,
    pub query: String,
    pub filter: serde_json::Value,
    pub created_by: String,
    pub created_date: DateTime<Utc>,
    pub modified_by: String,
    pub modified_date: DateTime<Utc>,
}

/// How to save a view
#[derive(Debug, Deserialize, Object, Serialize, Validate)]
pub struct SavedViewParam {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub query: String,
    pub filter: serde_json::Value,
}

/// Map a missing row to a 404 for saved views
fn not_found(err: sqlx::Error) -> poem::Error {
    match err {
        sqlx::Error::RowNotFound => {
            poem::Error::from_string("saved view does not exist", StatusCode::NOT_FOUND)
        }
        err => InternalServerError(err),
    }
}

/// Save a view in a sketch the user can read
pub async fn saved_view_add(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    saved_view_param: &SavedViewParam,
    username: &str,
) -> Result<SavedView, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    // Make sure the payload we got is good (check with Validate package).
    saved_view_param.validate().map_err(BadRequest)?;

    let saved_view = saved_view_insert(tx, sketch.id, saved_view_param, username)
        .await
        .map_err(InternalServerError)?;

    tracing::info!(
        sketch_id = sketch.id,
        saved_view_id = saved_view.id,
        "view saved",
    );

    Ok(saved_view)
}

/// Read one view of a sketch
pub async fn saved_view_read(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    saved_view_id: i32,
    username: &str,
) -> Result<SavedView, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    saved_view_select(tx, sketch.id, saved_view_id)
        .await
        .map_err(not_found)
}

/// Read every view of a sketch
pub async fn saved_view_read_by_sketch(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    username: &str,
) -> Result<Vec<SavedView>, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    saved_view_select_by_sketch(tx, sketch.id)
        .await
        .map_err(InternalServerError)
}

/// Remove one view of a sketch
pub async fn saved_view_remove(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    saved_view_id: i32,
    username: &str,
) -> Result<SavedView, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    saved_view_drop(tx, sketch.id, saved_view_id)
        .await
        .map_err(not_found)
}
