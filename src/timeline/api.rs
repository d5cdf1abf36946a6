use crate::{
    acl::{
        acl_read, grant_read, make_private, make_public, revoke_read, AccessControlEntry,
        AclParam, PublicParam,
    },
    auth::{Auth, TokenAuth, UserCred},
    timeline::core::{
        sketch_timeline_add, sketch_timeline_edit_color, sketch_timeline_read_by_sketch,
        sketch_timeline_remove, timeline_add, timeline_read, timeline_read_readable, ColorParam,
        SketchTimeline, SketchTimelineParam, Timeline, TimelineParam,
    },
    util::Tag,
};
use poem::{error::InternalServerError, web::Data};
use poem_openapi::{param::Path, payload::Json, OpenApi};
use sqlx::PgPool;

/// Timeline endpoints for the REST API
pub struct TimelineApi;

#[OpenApi]
impl TimelineApi {
    /// Register a timeline that already lives in the datastore
    #[oai(path = "/timeline", method = "post", tag = Tag::Timeline)]
    async fn timeline_post(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Json(timeline_param): Json<TimelineParam>,
    ) -> Result<Json<Timeline>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let timeline = timeline_add(&mut tx, &timeline_param, auth.username()).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(timeline))
    }

    /// List every timeline the user can read
    #[oai(path = "/timeline", method = "get", tag = Tag::Timeline)]
    async fn timeline_get_all(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
    ) -> Result<Json<Vec<Timeline>>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let timelines = timeline_read_readable(&mut tx, auth.username()).await?;

        Ok(Json(timelines))
    }

    /// Get a single timeline
    #[oai(path = "/timeline/:timeline_id", method = "get", tag = Tag::Timeline)]
    async fn timeline_get(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(timeline_id): Path<i32>,
    ) -> Result<Json<Timeline>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let timeline = timeline_read(&mut tx, timeline_id, auth.username()).await?;

        Ok(Json(timeline))
    }

    /// Who can read a timeline
    #[oai(path = "/timeline/:timeline_id/acl", method = "get", tag = Tag::Timeline)]
    async fn timeline_acl_get(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(timeline_id): Path<i32>,
    ) -> Result<Json<Vec<AccessControlEntry>>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let timeline = timeline_read(&mut tx, timeline_id, auth.username()).await?;
        let acl = acl_read(&mut tx, &timeline).await?;

        Ok(Json(acl))
    }

    /// Share a timeline with a user
    #[oai(path = "/timeline/:timeline_id/acl", method = "post", tag = Tag::Timeline)]
    async fn timeline_acl_post(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Data(user_creds): Data<&Vec<UserCred>>,
        Path(timeline_id): Path<i32>,
        Json(acl_param): Json<AclParam>,
    ) -> Result<Json<AccessControlEntry>, poem::Error> {
        let username = auth.username();

        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let timeline = timeline_read(&mut tx, timeline_id, username).await?;
        let ace = grant_read(&mut tx, &timeline, &acl_param, user_creds, username).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(ace))
    }

    /// Stop sharing a timeline with a user
    #[oai(
        path = "/timeline/:timeline_id/acl/:grantee",
        method = "delete",
        tag = Tag::Timeline
    )]
    async fn timeline_acl_delete(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(timeline_id): Path<i32>,
        Path(grantee): Path<String>,
    ) -> Result<Json<AccessControlEntry>, poem::Error> {
        let username = auth.username();

        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let timeline = timeline_read(&mut tx, timeline_id, username).await?;
        let ace = revoke_read(&mut tx, &timeline, &grantee, username).await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(ace))
    }

    /// Open a timeline to everyone, or close it again
    #[oai(path = "/timeline/:timeline_id/public", method = "put", tag = Tag::Timeline)]
    async fn timeline_public_put(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(timeline_id): Path<i32>,
        Json(public_param): Json<PublicParam>,
    ) -> Result<Json<PublicParam>, poem::Error> {
        let username = auth.username();

        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let timeline = timeline_read(&mut tx, timeline_id, username).await?;
        match public_param.public {
            true => make_public(&mut tx, &timeline, username).await?,
            false => make_private(&mut tx, &timeline, username).await?,
        };
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(public_param))
    }

    /// Timelines attached to a sketch
    #[oai(path = "/sketch/:sketch_id/timeline", method = "get", tag = Tag::Timeline)]
    async fn sketch_timeline_get(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
    ) -> Result<Json<Vec<SketchTimeline>>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch_timelines =
            sketch_timeline_read_by_sketch(&mut tx, sketch_id, auth.username()).await?;

        Ok(Json(sketch_timelines))
    }

    /// Attach timelines to a sketch
    #[oai(path = "/sketch/:sketch_id/timeline", method = "post", tag = Tag::Timeline)]
    async fn sketch_timeline_post(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
        Json(sketch_timeline_param): Json<SketchTimelineParam>,
    ) -> Result<Json<Vec<SketchTimeline>>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch_timelines = sketch_timeline_add(
            &mut tx,
            sketch_id,
            &sketch_timeline_param.timeline_ids,
            auth.username(),
        )
        .await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(sketch_timelines))
    }

    /// Change the color of an attached timeline
    #[oai(
        path = "/sketch/:sketch_id/timeline/:sketch_timeline_id",
        method = "put",
        tag = Tag::Timeline
    )]
    async fn sketch_timeline_put(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
        Path(sketch_timeline_id): Path<i32>,
        Json(color_param): Json<ColorParam>,
    ) -> Result<Json<SketchTimeline>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch_timeline = sketch_timeline_edit_color(
            &mut tx,
            sketch_id,
            sketch_timeline_id,
            &color_param,
            auth.username(),
        )
        .await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(sketch_timeline))
    }

    /// Detach a timeline from a sketch
    #[oai(
        path = "/sketch/:sketch_id/timeline/:sketch_timeline_id",
        method = "delete",
        tag = Tag::Timeline
    )]
    async fn sketch_timeline_delete(
        &self,
        auth: TokenAuth,
        Data(pool): Data<&PgPool>,
        Path(sketch_id): Path<i32>,
        Path(sketch_timeline_id): Path<i32>,
    ) -> Result<Json<SketchTimeline>, poem::Error> {
        let mut tx = pool.begin().await.map_err(InternalServerError)?;
        let sketch_timeline =
            sketch_timeline_remove(&mut tx, sketch_id, sketch_timeline_id, auth.username())
                .await?;
        tx.commit().await.map_err(InternalServerError)?;

        Ok(Json(sketch_timeline))
    }
}
