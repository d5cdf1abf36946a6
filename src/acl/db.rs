use crate::acl::core::{AccessControlEntry, ObjectType};
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, Postgres, Transaction};

/// Does the user, or everyone, have read access to the object?
pub async fn ace_read_exists(
    tx: &mut Transaction<'_, Postgres>,
    object_type: &ObjectType,
    object_id: i32,
    username: &str,
) -> Result<bool, sqlx::Error> {
    let exists = query_scalar::<_, bool>(
        "SELECT EXISTS (
            SELECT
                1
            FROM
                access_control_entry
            WHERE
                object_type = $1
                AND object_id = $2
                AND permission_read
                AND (username = $3 OR username IS NULL)
        )",
    )
    .bind(object_type)
    .bind(object_id)
    .bind(username)
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

/// Is there an entry granting read access to everyone?
pub async fn ace_public_exists(
    tx: &mut Transaction<'_, Postgres>,
    object_type: &ObjectType,
    object_id: i32,
) -> Result<bool, sqlx::Error> {
    let exists = query_scalar::<_, bool>(
        "SELECT EXISTS (
            SELECT
                1
            FROM
                access_control_entry
            WHERE
                object_type = $1
                AND object_id = $2
                AND permission_read
                AND username IS NULL
        )",
    )
    .bind(object_type)
    .bind(object_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

/// Grant read access to one user
pub async fn ace_insert(
    tx: &mut Transaction<'_, Postgres>,
    object_type: &ObjectType,
    object_id: i32,
    grantee: &str,
    username: &str,
) -> Result<AccessControlEntry, sqlx::Error> {
    let ace = query_as::<_, AccessControlEntry>(
        "INSERT INTO access_control_entry (
            object_type,
            object_id,
            username,
            permission_read,
            created_by,
            created_date
        ) VALUES (
            $1,
            $2,
            $3,
            TRUE,
            $4,
            $5
        ) RETURNING
            id,
            object_type,
            object_id,
            username,
            permission_read,
            created_by,
            created_date",
    )
    .bind(object_type)
    .bind(object_id)
    .bind(grantee)
    .bind(username)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(ace)
}

/// Grant read access to everyone, if not already granted
pub async fn ace_public_insert(
    tx: &mut Transaction<'_, Postgres>,
    object_type: &ObjectType,
    object_id: i32,
    username: &str,
) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO access_control_entry (
            object_type,
            object_id,
            username,
            permission_read,
            created_by,
            created_date
        ) VALUES (
            $1,
            $2,
            NULL,
            TRUE,
            $3,
            $4
        ) ON CONFLICT DO NOTHING",
    )
    .bind(object_type)
    .bind(object_id)
    .bind(username)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Pull all entries for an object
pub async fn ace_select_by_object(
    tx: &mut Transaction<'_, Postgres>,
    object_type: &ObjectType,
    object_id: i32,
) -> Result<Vec<AccessControlEntry>, sqlx::Error> {
    let aces = query_as::<_, AccessControlEntry>(
        "SELECT
            id,
            object_type,
            object_id,
            username,
            permission_read,
            created_by,
            created_date
        FROM
            access_control_entry
        WHERE
            object_type = $1
            AND object_id = $2
        ORDER BY
            created_date DESC,
            id DESC",
    )
    .bind(object_type)
    .bind(object_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(aces)
}

/// Remove the entry for one user
pub async fn ace_drop(
    tx: &mut Transaction<'_, Postgres>,
    object_type: &ObjectType,
    object_id: i32,
    grantee: &str,
) -> Result<AccessControlEntry, sqlx::Error> {
    let ace = query_as::<_, AccessControlEntry>(
        "DELETE FROM
            access_control_entry
        WHERE
            object_type = $1
            AND object_id = $2
            AND username = $3
        RETURNING
            id,
            object_type,
            object_id,
            username,
            permission_read,
            created_by,
            created_date",
    )
    .bind(object_type)
    .bind(object_id)
    .bind(grantee)
    .fetch_one(&mut **tx)
    .await?;

    Ok(ace)
}

/// Remove the entry granting access to everyone
pub async fn ace_public_drop(
    tx: &mut Transaction<'_, Postgres>,
    object_type: &ObjectType,
    object_id: i32,
) -> Result<(), sqlx::Error> {
    query(
        "DELETE FROM
            access_control_entry
        WHERE
            object_type = $1
            AND object_id = $2
            AND username IS NULL",
    )
    .bind(object_type)
    .bind(object_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Remove every entry of an object
pub async fn ace_drop_by_object(
    tx: &mut Transaction<'_, Postgres>,
    object_type: &ObjectType,
    object_id: i32,
) -> Result<u64, sqlx::Error> {
    let result = query(
        "DELETE FROM
            access_control_entry
        WHERE
            object_type = $1
            AND object_id = $2",
    )
    .bind(object_type)
    .bind(object_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}
