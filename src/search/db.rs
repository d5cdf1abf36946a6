use crate::{sketch::Sketch, util::escape_like};
use sqlx::{Postgres, QueryBuilder, Transaction};

/// Pull the sketches the user can read whose title or description match the query
pub async fn search_sketch_select(
    tx: &mut Transaction<'_, Postgres>,
    query: &str,
    username: &str,
    limit: &Option<u64>,
    offset: &Option<u64>,
) -> Result<Vec<Sketch>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(query));

    // Query we will be modifying
    let mut builder = QueryBuilder::<'_, Postgres>::new(
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
        WHERE
            (sketch.title ILIKE ",
    );
    builder.push_bind(pattern.clone());
    builder.push(" OR sketch.description ILIKE ");
    builder.push_bind(pattern);

    // Only what the user can read
    builder.push(") AND (sketch.owner = ");
    builder.push_bind(username.to_string());
    builder.push(
        " OR EXISTS (
            SELECT
                1
            FROM
                access_control_entry ace
            WHERE
                ace.object_type = 'sketch'
                AND ace.object_id = sketch.id
                AND ace.permission_read
                AND (ace.username IS NULL OR ace.username = ",
    );
    builder.push_bind(username.to_string());
    builder.push(")))");

    // Add ORDER BY
    builder.push(" ORDER BY sketch.id ");

    // Add LIMIT
    if let Some(limit) = limit {
        builder.push(format!(" LIMIT {limit} "));

        // Add OFFSET
        if let Some(offset) = offset {
            builder.push(format!(" OFFSET {offset} "));
        }
    }

    // Run our generated SQL statement
    let sketches = builder
        .build_query_as::<Sketch>()
        .fetch_all(&mut **tx)
        .await?;

    Ok(sketches)
}
