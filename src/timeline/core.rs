use crate::{
    acl::{can_read, AccessControlled, ObjectType},
    sketch::{sketch_read, Sketch},
    timeline::db::{
        sketch_timeline_drop, sketch_timeline_insert, sketch_timeline_select,
        sketch_timeline_select_by_sketch, sketch_timeline_update_color, timeline_insert,
        timeline_select, timeline_select_addable, timeline_select_readable,
    },
    util::index_validater,
};
use chrono::{DateTime, Utc};
use poem::{
    error::{BadRequest, Conflict, InternalServerError},
    http::StatusCode,
};
use poem_openapi::Object;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, Transaction};
use validator::{Validate, ValidationError};

/// Pre-indexed event dataset living in the datastore
#[derive(Debug, FromRow, Object)]
pub struct Timeline {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub datastore_index: String,
    pub owner: String,
    pub created_date: DateTime<Utc>,
    pub modified_by: String,
    pub modified_date: DateTime<Utc>,
}

impl AccessControlled for Timeline {
    fn object_type(&self) -> ObjectType {
        ObjectType::Timeline
    }

    fn object_id(&self) -> i32 {
        self.id
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}

/// How to register a timeline
#[derive(Debug, Deserialize, Object, Serialize, Validate)]
pub struct TimelineParam {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: String,
    #[validate(custom(function = index_validater))]
    pub datastore_index: String,
}

/// Timeline as attached to one sketch
#[derive(Debug, FromRow, Object)]
pub struct SketchTimeline {
    pub id: i32,
    pub sketch_id: i32,
    pub timeline_id: i32,
    pub timeline_title: String,
    pub datastore_index: String,
    pub color: String,
    pub created_by: String,
    pub created_date: DateTime<Utc>,
    pub modified_by: String,
    pub modified_date: DateTime<Utc>,
}

/// Timelines to attach to a sketch
#[derive(Debug, Deserialize, Object, Serialize)]
pub struct SketchTimelineParam {
    pub timeline_ids: Vec<i32>,
}

/// New color for an attached timeline
#[derive(Debug, Deserialize, Object, Serialize, Validate)]
pub struct ColorParam {
    #[validate(custom(function = color_validater))]
    pub color: String,
}

/// Drop any '#' and keep at most six characters
pub fn normalize_color(color: &str) -> String {
    color.replace('#', "").chars().take(6).collect()
}

/// Only allow short or full hex color codes, with or without the leading '#'. Exactly three or
/// six digits, so four and five digit codes are refused.
pub fn color_validater(color: &str) -> Result<(), ValidationError> {
    let color_regex = Regex::new("^([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$");
    match color_regex {
        Ok(re) if re.is_match(&normalize_color(color)) => Ok(()),
        _ => Err(ValidationError::new("Failed Color Regex Check")),
    }
}

/// Random RRGGBB color for a freshly attached timeline
pub fn generate_color() -> String {
    let mut rng = rand::rng();
    format!(
        "{:02X}{:02X}{:02X}",
        rng.random::<u8>(),
        rng.random::<u8>(),
        rng.random::<u8>(),
    )
}

/// Register a timeline owned by the user
pub async fn timeline_add(
    tx: &mut Transaction<'_, Postgres>,
    timeline_param: &TimelineParam,
    username: &str,
) -> Result<Timeline, poem::Error> {
    // Make sure the payload we got is good (check with Validate package).
    timeline_param.validate().map_err(BadRequest)?;

    let timeline = timeline_insert(tx, timeline_param, username)
        .await
        .map_err(Conflict)?;

    tracing::info!(
        timeline_id = timeline.id,
        datastore_index = %timeline.datastore_index,
        "timeline registered",
    );

    Ok(timeline)
}

/// Read a timeline the user has access to
pub async fn timeline_read(
    tx: &mut Transaction<'_, Postgres>,
    timeline_id: i32,
    username: &str,
) -> Result<Timeline, poem::Error> {
    let select = timeline_select(tx, timeline_id).await;

    let timeline = match select {
        Ok(timeline) => timeline,
        Err(sqlx::Error::RowNotFound) => {
            return Err(poem::Error::from_string(
                "timeline does not exist",
                StatusCode::NOT_FOUND,
            ))
        }
        Err(err) => return Err(InternalServerError(err)),
    };

    match can_read(tx, &timeline, username).await? {
        true => Ok(timeline),
        false => Err(poem::Error::from_string(
            "user does not have access to this timeline",
            StatusCode::FORBIDDEN,
        )),
    }
}

/// Every timeline the user can read
pub async fn timeline_read_readable(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> Result<Vec<Timeline>, poem::Error> {
    timeline_select_readable(tx, username)
        .await
        .map_err(InternalServerError)
}

/// Timelines the user can read that are not attached to the sketch yet
pub async fn timeline_read_addable(
    tx: &mut Transaction<'_, Postgres>,
    sketch: &Sketch,
    username: &str,
) -> Result<Vec<Timeline>, poem::Error> {
    timeline_select_addable(tx, sketch.id, username)
        .await
        .map_err(InternalServerError)
}

/// Attach timelines to a sketch, each with its own color
pub async fn sketch_timeline_add(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    timeline_ids: &[i32],
    username: &str,
) -> Result<Vec<SketchTimeline>, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    let mut sketch_timelines = Vec::with_capacity(timeline_ids.len());
    for timeline_id in timeline_ids {
        let timeline = timeline_read(tx, *timeline_id, username).await?;

        let sketch_timeline =
            sketch_timeline_insert(tx, sketch.id, timeline.id, &generate_color(), username)
                .await
                .map_err(Conflict)?;

        tracing::info!(
            sketch_id = sketch.id,
            timeline_id = timeline.id,
            "timeline attached",
        );

        sketch_timelines.push(sketch_timeline);
    }

    Ok(sketch_timelines)
}

/// Read one timeline attached to a sketch
pub async fn sketch_timeline_read(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    sketch_timeline_id: i32,
    username: &str,
) -> Result<SketchTimeline, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    let select = sketch_timeline_select(tx, sketch.id, sketch_timeline_id).await;

    match select {
        Ok(sketch_timeline) => Ok(sketch_timeline),
        Err(sqlx::Error::RowNotFound) => Err(poem::Error::from_string(
            "sketch timeline does not exist",
            StatusCode::NOT_FOUND,
        )),
        Err(err) => Err(InternalServerError(err)),
    }
}

/// Read every timeline attached to a sketch
pub async fn sketch_timeline_read_by_sketch(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    username: &str,
) -> Result<Vec<SketchTimeline>, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    sketch_timeline_select_by_sketch(tx, sketch.id)
        .await
        .map_err(InternalServerError)
}

/// Change the color of an attached timeline
pub async fn sketch_timeline_edit_color(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    sketch_timeline_id: i32,
    color_param: &ColorParam,
    username: &str,
) -> Result<SketchTimeline, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    // Make sure the payload we got is good (check with Validate package).
    color_param.validate().map_err(BadRequest)?;

    let color = normalize_color(&color_param.color);
    let update =
        sketch_timeline_update_color(tx, sketch.id, sketch_timeline_id, &color, username).await;

    match update {
        Ok(sketch_timeline) => Ok(sketch_timeline),
        Err(sqlx::Error::RowNotFound) => Err(poem::Error::from_string(
            "sketch timeline does not exist",
            StatusCode::NOT_FOUND,
        )),
        Err(err) => Err(InternalServerError(err)),
    }
}

/// Detach a timeline from a sketch
pub async fn sketch_timeline_remove(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    sketch_timeline_id: i32,
    username: &str,
) -> Result<SketchTimeline, poem::Error> {
    let sketch = sketch_read(tx, sketch_id, username).await?;

    let delete = sketch_timeline_drop(tx, sketch.id, sketch_timeline_id).await;

    match delete {
        Ok(sketch_timeline) => Ok(sketch_timeline),
        Err(sqlx::Error::RowNotFound) => Err(poem::Error::from_string(
            "sketch timeline does not exist",
            StatusCode::NOT_FOUND,
        )),
        Err(err) => Err(InternalServerError(err)),
    }
}
