use crate::sketch::core::{Sketch, SketchParam};
use chrono::Utc;
use sqlx::{query_as, Postgres, Transaction};

/// Add a sketch to the sketch table
pub async fn sketch_insert(
    tx: &mut Transaction<'_, Postgres>,
    sketch_param: &SketchParam,
    username: &str,
) -> Result<Sketch, sqlx::Error> {
    let sketch = query_as::<_, Sketch>(
        "INSERT INTO sketch (
            title,
            description,
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
            $6
        ) RETURNING
            id,
            title,
            description,
            owner,
            created_date,
            modified_by,
            modified_date",
    )
    .bind(&sketch_param.title)
    .bind(&sketch_param.description)
    .bind(username)
    .bind(Utc::now())
    .bind(username)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(sketch)
}

/// Pull one sketch
pub async fn sketch_select(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
) -> Result<Sketch, sqlx::Error> {
    let sketch = query_as::<_, Sketch>(
        "SELECT
            id,
            title,
            description,
            owner,
            created_date,
            modified_by,
            modified_date
        FROM
            sketch
        WHERE
            id = $1",
    )
    .bind(sketch_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(sketch)
}

/// Pull every sketch a user owns, newest first
pub async fn sketch_select_by_owner(
    tx: &mut Transaction<'_, Postgres>,
    owner: &str,
) -> Result<Vec<Sketch>, sqlx::Error> {
    let sketches = query_as::<_, Sketch>(
        "SELECT
            id,
            title,
            description,
            owner,
            created_date,
            modified_by,
            modified_date
        FROM
            sketch
        WHERE
            owner = $1
        ORDER BY
            created_date DESC,
            id DESC",
    )
    .bind(owner)
    .fetch_all(&mut **tx)
    .await?;

    Ok(sketches)
}

/// Pull sketches other users shared with this user, most recently shared first
pub async fn sketch_select_shared(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> Result<Vec<Sketch>, sqlx::Error> {
    let sketches = query_as::<_, Sketch>(
        "SELECT
            sketch.id,
            sketch.title,
            sketch.description,
            sketch.owner,
            sketch.created_date,
            sketch.modified_by,
            sketch.modified_date
        FROM
            sketch
        INNER JOIN
            access_control_entry ace
        ON
            ace.object_type = 'sketch'
            AND ace.object_id = sketch.id
        WHERE
            ace.username = $1
            AND ace.permission_read
            AND sketch.owner <> $1
        ORDER BY
            ace.created_date DESC,
            ace.id DESC",
    )
    .bind(username)
    .fetch_all(&mut **tx)
    .await?;

    Ok(sketches)
}

/// Update a sketch
pub async fn sketch_update(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
    sketch_param: &SketchParam,
    username: &str,
) -> Result<Sketch, sqlx::Error> {
    let sketch = query_as::<_, Sketch>(
        "UPDATE
            sketch
        SET
            title = $1,
            description = $2,
            modified_by = $3,
            modified_date = $4
        WHERE
            id = $5
        RETURNING
            id,
            title,
            description,
            owner,
            created_date,
            modified_by,
            modified_date",
    )
    .bind(&sketch_param.title)
    .bind(&sketch_param.description)
    .bind(username)
    .bind(Utc::now())
    .bind(sketch_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(sketch)
}

/// Delete a sketch. Attached timelines and saved views go with it.
pub async fn sketch_drop(
    tx: &mut Transaction<'_, Postgres>,
    sketch_id: i32,
) -> Result<Sketch, sqlx::Error> {
    let sketch = query_as::<_, Sketch>(
        "DELETE FROM
            sketch
        WHERE
            id = $1
        RETURNING
            id,
            title,
            description,
            owner,
            created_date,
            modified_by,
            modified_date",
    )
    .bind(sketch_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(sketch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::util::test_utils::gen_test_sketch_param;
    use pretty_assertions::assert_eq;
    use sqlx::{query, PgPool};

    /// Test create sketch
    #[sqlx::test]
    async fn test_sketch_insert(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();

        let sketch_param = gen_test_sketch_param("Intrusion");
        let sketch = sketch_insert(&mut tx, &sketch_param, "alice")
            .await
            .unwrap();

        assert_eq!(sketch.id, 1);
        assert_eq!(sketch.title, "Intrusion");
        assert_eq!(sketch.description, "Intrusion investigation");
        assert_eq!(sketch.owner, "alice");
        assert_eq!(sketch.modified_by, "alice");
    }

    /// Test sketch select
    #[sqlx::test]
    async fn test_sketch_select(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();

        let sketch_param = gen_test_sketch_param("Intrusion");
        sketch_insert(&mut tx, &sketch_param, "alice")
            .await
            .unwrap();

        let sketch = sketch_select(&mut tx, 1).await.unwrap();
        assert_eq!(sketch.title, "Intrusion");

        let err = sketch_select(&mut tx, 2).await.unwrap_err();
        match err {
            sqlx::Error::RowNotFound => (),
            err => panic!("Incorrect sqlx error type: {}", err),
        };
    }

    /// Test owned sketches come back newest first
    #[sqlx::test]
    async fn test_sketch_select_by_owner(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();

        for title in ["First", "Second", "Third"] {
            let sketch_param = gen_test_sketch_param(title);
            sketch_insert(&mut tx, &sketch_param, "alice")
                .await
                .unwrap();
        }
        let sketch_param = gen_test_sketch_param("Other");
        sketch_insert(&mut tx, &sketch_param, "bob").await.unwrap();

        let sketches = sketch_select_by_owner(&mut tx, "alice").await.unwrap();
        let titles: Vec<&str> = sketches.iter().map(|sketch| sketch.title.as_str()).collect();

        assert_eq!(titles, vec!["Third", "Second", "First"]);
    }

    /// Test shared sketches skip the user's own sketches
    #[sqlx::test]
    async fn test_sketch_select_shared(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();

        let sketch_param = gen_test_sketch_param("Bobs");
        sketch_insert(&mut tx, &sketch_param, "bob").await.unwrap();
        let sketch_param = gen_test_sketch_param("Alices");
        sketch_insert(&mut tx, &sketch_param, "alice")
            .await
            .unwrap();

        query(
            "INSERT INTO access_control_entry
                (object_type, object_id, username, permission_read, created_by, created_date)
            VALUES
                ('sketch', 1, 'alice', TRUE, 'bob', NOW()),
                ('sketch', 2, 'alice', TRUE, 'alice', NOW())",
        )
        .execute(&mut *tx)
        .await
        .unwrap();

        let sketches = sketch_select_shared(&mut tx, "alice").await.unwrap();

        assert_eq!(sketches.len(), 1);
        assert_eq!(sketches[0].title, "Bobs");
    }

    /// Test sketch update
    #[sqlx::test]
    async fn test_sketch_update(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();

        let sketch_param = gen_test_sketch_param("Intrusion");
        sketch_insert(&mut tx, &sketch_param, "alice")
            .await
            .unwrap();

        let sketch_param = gen_test_sketch_param("Exfiltration");
        let sketch = sketch_update(&mut tx, 1, &sketch_param, "bob")
            .await
            .unwrap();

        assert_eq!(sketch.title, "Exfiltration");
        assert_eq!(sketch.owner, "alice");
        assert_eq!(sketch.modified_by, "bob");

        let err = sketch_update(&mut tx, 2, &sketch_param, "bob")
            .await
            .unwrap_err();
        match err {
            sqlx::Error::RowNotFound => (),
            err => panic!("Incorrect sqlx error type: {}", err),
        };
    }

    /// Test sketch drop
    #[sqlx::test]
    async fn test_sketch_drop(pool: PgPool) {
        let mut tx = pool.begin().await.unwrap();

        let sketch_param = gen_test_sketch_param("Intrusion");
        sketch_insert(&mut tx, &sketch_param, "alice")
            .await
            .unwrap();

        let sketch = sketch_drop(&mut tx, 1).await.unwrap();
        assert_eq!(sketch.title, "Intrusion");

        let err = sketch_select(&mut tx, 1).await.unwrap_err();
        match err {
            sqlx::Error::RowNotFound => (),
            err => panic!("Incorrect sqlx error type: {}", err),
        };
    }
}
