use crate::{
    auth::{Auth, TokenAuth},
    saved_view::core::{
        saved_view_add, saved_view_read, saved_view_read_by_sketch, saved_view_remove,
        SavedView, SavedViewParam,
    },
    util::Tag,
};
use poem::{error::InternalServerError, web::Data};
use poem_openapi::{param::Path, payload::Json, OpenApi};
use sqlx::PgPool;

/// Saved view endpoints for the REST API
pub struct SavedViewApi;

#[OpenApi]
impl SavedViewApi {
    /// Save a view in a sketch
    #[oai(path = "/sketch/:sketch_id/view", method = "post", tag = Tag::SavedView)]
    async fn saved_view_post(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
        Json(saved_view_param): Json<SavedViewParam>,
    ) -> Result<Json<SavedView>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let saved_view =
            saved_view_add(&mut tx, sketch_id, &saved_view_param, auth.username()).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(saved_view))
    }

    /// List the views of a sketch
    #[oai(path = "/sketch/:sketch_id/view", method = "get", tag = Tag::SavedView)]
    async fn saved_view_get_all(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
    ) -> Result<Json<Vec<SavedView>>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let saved_views = saved_view_read_by_sketch(&mut tx, sketch_id, auth.username()).await?;

        Ok(Json(saved_views))
    }

    /// Get a single view
    #[oai(
        path = "/sketch/:sketch_id/view/:saved_view_id",
        method = "get",
        tag = Tag::SavedView
    )]
    async fn saved_view_get(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
        Path(saved_view_id): Path<i32>,
    ) -> Result<Json<SavedView>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let saved_view =
            saved_view_read(&mut tx, sketch_id, saved_view_id, auth.username()).await?;

        Ok(Json(saved_view))
    }

    /// Delete a view
    #[oai(
        path = "/sketch/:sketch_id/view/:saved_view_id",
        method = "delete",
        tag = Tag::SavedView
    )]
    async fn saved_view_delete(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
        Path(saved_view_id): Path<i32>,
    ) -> Result<Json<SavedView>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let saved_view =
            saved_view_remove(&mut tx, sketch_id, saved_view_id, auth.username()).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(saved_view))
    }
}
