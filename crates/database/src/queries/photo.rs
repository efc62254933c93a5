use chrono::{DateTime, Utc};
use model::{
    carpark::Carpark,
    photo::{NewPhoto, Photo},
    WithId,
};
use parking::database::Result;
use sqlx::{Executor, Postgres};
use utility::id::Id;

use super::convert_error;
use crate::data_model::{photo::PhotoRow, with_id};

pub async fn insert<'c, E>(
    executor: E,
    carpark: &Id<Carpark>,
    photo: NewPhoto,
    created_at: DateTime<Utc>,
) -> Result<WithId<Photo>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: PhotoRow = sqlx::query_as(
        "
        INSERT INTO photos(carpark_id, url, caption, taken_at, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, carpark_id, url, caption, taken_at, created_at;
        ",
    )
    .bind(carpark.raw_ref::<str>())
    .bind(photo.url)
    .bind(photo.caption)
    .bind(photo.taken_at)
    .bind(created_at)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?;
    with_id(row)
}

pub async fn delete_for_carpark<'c, E>(executor: E, carpark: &Id<Carpark>) -> Result<u64>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("DELETE FROM photos WHERE carpark_id = $1;")
        .bind(carpark.raw_ref::<str>())
        .execute(executor)
        .await
        .map(|result| result.rows_affected())
        .map_err(convert_error)
}

/// Photos of the given carparks, grouped by carpark and newest first within
/// each group. With a `limit`, only that many photos per carpark are
/// returned.
pub async fn for_carparks<'c, E>(
    executor: E,
    carparks: &[String],
    limit: Option<usize>,
) -> Result<Vec<PhotoRow>>
where
    E: Executor<'c, Database = Postgres>,
{
    if carparks.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as(
        "
        SELECT
            id, carpark_id, url, caption, taken_at, created_at
        FROM (
            SELECT
                id, carpark_id, url, caption, taken_at, created_at,
                ROW_NUMBER() OVER (
                    PARTITION BY carpark_id
                    ORDER BY created_at DESC, id
                ) AS position
            FROM photos
            WHERE carpark_id = ANY($1)
        ) AS ranked
        WHERE $2::BIGINT IS NULL OR position <= $2
        ORDER BY carpark_id, position;
        ",
    )
    .bind(carparks)
    .bind(limit.map(|limit| limit as i64))
    .fetch_all(executor)
    .await
    .map_err(convert_error)
}
