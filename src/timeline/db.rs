use crate::timeline::core::{SketchTimeline, Timeline, TimelineParam};
use chrono::Utc;
use sqlx::{query_as, Postgres, Transaction};

/// Register a timeline in the timeline table
pub async fn timeline_insert(
    tx: &mut Transaction<'_, Postgres>,
    timeline_param: &TimelineParam,
    username: &str,
) -> Result<Timeline, sqlx::Error> {
    let timeline = query_as::<_, Timeline>(
        "INSERT INTO timeline (
            title,
            description,
            datastore_index,
            owner,
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
            $7
        ) RETURNING
            id,
            title,
            description,
            datastore_index,
            owner,
            created_date,
            modified_by,
            modified_date",
    )
    .bind(&timeline_param.title)
    .bind(&timeline_param.description)
    .bind(&timeline_param.datastore_index)
    .bind(username)
    .bind(Utc::now())
    .bind(username)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(timeline)
}

/// Pull one timeline
pub async fn timeline_select(
    tx: &mut Transaction<'_, Postgres>,
    timeline_id: i32,
) -> Result<Timeline, sqlx::Error> {
    let timeline = query_as::<_, Timeline>(
        "SELECT
            id,
            title,
            description,
            datastore_index,
            owner,
            created_date,
            modified_by,
            modified_date
        FROM
            timeline
        WHERE
            id = $1",
    )
    .bind(timeline_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(timeline)
}

/// Pull every timeline the user can read
pub async fn timeline_select_readable(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> Result<Vec<Timeline>, sqlx::Error> {
    let timelines = query_as::<_, Timeline>(
        "SELECT
            id,
            title,
            description,
            datastore_index,
            owner,
            created_date,
            modified_by,
            modified_date
        FROM
            timeline
        WHERE
            owner = $1
            OR EXISTS (
                SELECT
                    1
                FROM
                    access_control_entry ace
                WHERE
                    ace.object_type = 'timeline'
                    AND ace.object_id = timeline.id
                    AND ace.permission_read
                    AND (ace.username = $1 OR ace.username IS NULL)
            )
        ORDER BY
            id",
    )
    .bind(username)
    .fetch_all(&mut **tx)
    .await?;

    Ok(timelines)
}

/// Pull the timelines the user can read that the sketch does not have yet
pub async fn timeline_select_addable(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    username: &str,
) -> Result<Vec<Timeline>, sqlx::Error> {
    let timelines = query_as::<_, Timeline>(
        "SELECT
            id,
            title,
            description,
            datastore_index,
            owner,
            created_date,
            modified_by,
            modified_date
        FROM
            timeline
        WHERE
            NOT EXISTS (
                SELECT
                    1
                FROM
                    sketch_timeline
                WHERE
                    sketch_timeline.sketch_id = $1
                    AND sketch_timeline.timeline_id = timeline.id
            )
            AND (
                owner = $2
                OR EXISTS (
                    SELECT
                        1
                    FROM
                        access_control_entry ace
                    WHERE
                        ace.object_type = 'timeline'
                        AND ace.object_id = timeline.id
                        AND ace.permission_read
                        AND (ace.username = $2 OR ace.username IS NULL)
                )
            )
        ORDER BY
            id",
    )
    .bind(sketch_id)
    .bind(username)
    .fetch_all(&mut **tx)
    .await?;

    Ok(timelines)
}

/// Attach a timeline to a sketch
pub async fn sketch_timeline_insert(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    timeline_id: i32,
    color: &str,
    username: &str,
) -> Result<SketchTimeline, sqlx::Error> {
    let sketch_timeline = query_as::<_, SketchTimeline>(
        "WITH inserted AS (
            INSERT INTO sketch_timeline (
                sketch_id,
                timeline_id,
                color,
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
                $7
            ) RETURNING
                *
        ) SELECT
            inserted.id,
            inserted.sketch_id,
            inserted.timeline_id,
            timeline.title AS timeline_title,
            timeline.datastore_index,
            inserted.color,
            inserted.created_by,
            inserted.created_date,
            inserted.modified_by,
            inserted.modified_date
        FROM
            inserted
        INNER JOIN
            timeline
        ON
            inserted.timeline_id = timeline.id",
    )
    .bind(sketch_id)
    .bind(timeline_id)
    .bind(color)
    .bind(username)
    .bind(Utc::now())
    .bind(username)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(sketch_timeline)
}

/// Pull one timeline attached to a sketch
pub async fn sketch_timeline_select(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    sketch_timeline_id: i32,
) -> Result<SketchTimeline, sqlx::Error> {
    let sketch_timeline = query_as::<_, SketchTimeline>(
        "SELECT
            sketch_timeline.id,
            sketch_timeline.sketch_id,
            sketch_timeline.timeline_id,
            timeline.title AS timeline_title,
            timeline.datastore_index,
            sketch_timeline.color,
            sketch_timeline.created_by,
            sketch_timeline.created_date,
            sketch_timeline.modified_by,
            sketch_timeline.modified_date
        FROM
            sketch_timeline
        INNER JOIN
            timeline
        ON
            sketch_timeline.timeline_id = timeline.id
        WHERE
            sketch_timeline.sketch_id = $1
            AND sketch_timeline.id = $2",
    )
    .bind(sketch_id)
    .bind(sketch_timeline_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(sketch_timeline)
}

/// Pull every timeline attached to a sketch
pub async fn sketch_timeline_select_by_sketch(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
) -> Result<Vec<SketchTimeline>, sqlx::Error> {
    let sketch_timelines = query_as::<_, SketchTimeline>(
        "SELECT
            sketch_timeline.id,
            sketch_timeline.sketch_id,
            sketch_timeline.timeline_id,
            timeline.title AS timeline_title,
            timeline.datastore_index,
            sketch_timeline.color,
            sketch_timeline.created_by,
            sketch_timeline.created_date,
            sketch_timeline.modified_by,
            sketch_timeline.modified_date
        FROM
            sketch_timeline
        INNER JOIN
            timeline
        ON
            sketch_timeline.timeline_id = timeline.id
        WHERE
            sketch_timeline.sketch_id = $1
        ORDER BY
            sketch_timeline.id",
    )
    .bind(sketch_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(sketch_timelines)
}

/// Change the color a timeline is shown with in a sketch
pub async fn sketch_timeline_update_color(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    sketch_timeline_id: i32,
    color: &str,
    username: &str,
) -> Result<SketchTimeline, sqlx::Error> {
    let sketch_timeline = query_as::<_, SketchTimeline>(
        "WITH updated AS (
            UPDATE
                sketch_timeline
            SET
                color = $1,
                modified_by = $2,
                modified_date = $3
            WHERE
                sketch_id = $4
                AND id = $5
            RETURNING
                *
        ) SELECT
            updated.id,
            updated.sketch_id,
            updated.timeline_id,
            timeline.title AS timeline_title,
            timeline.datastore_index,
            updated.color,
            updated.created_by,
            updated.created_date,
            updated.modified_by,
            updated.modified_date
        FROM
            updated
        INNER JOIN
            timeline
        ON
            updated.timeline_id = timeline.id",
    )
    .bind(color)
    .bind(username)
    .bind(Utc::now())
    .bind(sketch_id)
    .bind(sketch_timeline_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(sketch_timeline)
}

/// Detach a timeline from a sketch
pub async fn sketch_timeline_drop(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    sketch_timeline_id: i32,
) -> Result<SketchTimeline, sqlx::Error> {
    let sketch_timeline = query_as::<_, SketchTimeline>(
        "WITH deleted AS (
            DELETE FROM
                sketch_timeline
            WHERE
                sketch_id = $1
                AND id = $2
            RETURNING
                *
        ) SELECT
            deleted.id,
            deleted.sketch_id,
            deleted.timeline_id,
            timeline.title AS timeline_title,
            timeline.datastore_index,
            deleted.color,
            deleted.created_by,
            deleted.created_date,
            deleted.modified_by,
            deleted.modified_date
        FROM
            deleted
        INNER JOIN
            timeline
        ON
            deleted.timeline_id = timeline.id",
    )
    .bind(sketch_id)
    .bind(sketch_timeline_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(sketch_timeline)
}
