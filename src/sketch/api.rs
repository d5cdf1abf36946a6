use crate::{
    acl::{
        acl_read, grant_read, make_private, make_public, revoke_read, AccessControlEntry,
        AclParam, PublicParam,
    },
    auth::{Auth, TokenAuth, UserCred},
    sketch::core::{
        sketch_add, sketch_edit, sketch_read, sketch_read_list, sketch_read_with_children,
        sketch_remove, Sketch, SketchChildren, SketchList, SketchParam,
    },
    util::Tag,
};
use poem::{error::InternalServerError, web::Data};
use poem_openapi::{param::Path, payload::Json, OpenApi};
use sqlx::PgPool;

/// Sketch endpoints for the REST API
pub struct SketchApi;

#[OpenApi]
impl SketchApi {
    /// Create a sketch owned by the caller
    #[oai(path = "/sketch", method = "post", tag = Tag::Sketch)]
    async fn sketch_post(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Json(sketch_param): Json<SketchParam>,
    ) -> Result<Json<Sketch>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch = sketch_add(&mut tx, &sketch_param, auth.username()).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(sketch))
    }

    /// The caller's sketches and the ones shared with them
    #[oai(path = "/sketch", method = "get", tag = Tag::Sketch)]
    async fn sketch_get_all(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
    ) -> Result<Json<SketchList>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch_list = sketch_read_list(&mut tx, auth.username()).await?;

        Ok(Json(sketch_list))
    }

    /// Get a sketch with its timelines and saved views
    #[oai(path = "/sketch/:sketch_id", method = "get", tag = Tag::Sketch)]
    async fn sketch_get(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
    ) -> Result<Json<SketchChildren>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch_children = sketch_read_with_children(&mut tx, sketch_id, auth.username()).await?;

        Ok(Json(sketch_children))
    }

    /// Change the title or description of a sketch
    #[oai(path = "/sketch/:sketch_id", method = "put", tag = Tag::Sketch)]
    async fn sketch_put(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
        Json(sketch_param): Json<SketchParam>,
    ) -> Result<Json<Sketch>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch = sketch_edit(&mut tx, sketch_id, &sketch_param, auth.username()).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(sketch))
    }

    /// Delete a sketch
    #[oai(path = "/sketch/:sketch_id", method = "delete", tag = Tag::Sketch)]
    async fn sketch_delete(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
    ) -> Result<Json<Sketch>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch = sketch_remove(&mut tx, sketch_id, auth.username()).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(sketch))
    }

    /// Who can read a sketch
    #[oai(path = "/sketch/:sketch_id/acl", method = "get", tag = Tag::Sketch)]
    async fn sketch_acl_get(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
    ) -> Result<Json<Vec<AccessControlEntry>>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch = sketch_read(&mut tx, sketch_id, auth.username()).await?;
        let acl = acl_read(&mut tx, &sketch).await?;

        Ok(Json(acl))
    }

    /// Share a sketch with a user
    #[oai(path = "/sketch/:sketch_id/acl", method = "post", tag = Tag::Sketch)]
    async fn sketch_acl_post(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Data(user_creds): Data<&Vec<UserCred>>,
        Path(sketch_id): Path<i32>,
        Json(acl_param): Json<AclParam>,
    ) -> Result<Json<AccessControlEntry>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch = sketch_read(&mut tx, sketch_id, auth.username()).await?;
        let ace = grant_read(&mut tx, &sketch, &acl_param, user_creds, auth.username()).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(ace))
    }

    /// Stop sharing a sketch with a user
    #[oai(path = "/sketch/:sketch_id/acl/:grantee", method = "delete", tag = Tag::Sketch)]
    async fn sketch_acl_delete(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
        Path(grantee): Path<String>,
    ) -> Result<Json<AccessControlEntry>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch = sketch_read(&mut tx, sketch_id, auth.username()).await?;
        let ace = revoke_read(&mut tx, &sketch, &grantee, auth.username()).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(ace))
    }

    /// Open a sketch to everyone or make it private again
    #[oai(path = "/sketch/:sketch_id/public", method = "put", tag = Tag::Sketch)]
    async fn sketch_public_put(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
        Json(public_param): Json<PublicParam>,
    ) -> Result<Json<PublicParam>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch = sketch_read(&mut tx, sketch_id, auth.username()).await?;

        match public_param.public {
            true => make_public(&mut tx, &sketch, auth.username()).await?,
            false => make_private(&mut tx, &sketch, auth.username()).await?,
        };
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(public_param))
    }
}
