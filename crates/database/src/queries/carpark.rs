use model::{carpark::Carpark, photo::SEARCH_RESULT_PHOTOS, BoundingBox, WithId};
use parking::database::{DatabaseError, Result};
use sqlx::{Executor, PgConnection, Postgres};
use utility::id::Id;

use super::{convert_error, photo::for_carparks};
use crate::data_model::{carpark::CarparkRow, with_photos};

const COLUMNS: &str = "
    id, name, address, town, latitude, longitude, carpark_type,
    motorcycle_allowed, car_allowed, total_moto_lots, covered,
    pricing_notes, opening_hours, entrance_notes, verified,
    created_at, updated_at
";

fn moto_lots(carpark: &Carpark) -> Result<Option<i32>> {
    carpark
        .total_moto_lots
        .map(i32::try_from)
        .transpose()
        .map_err(DatabaseError::other)
}

/// Verified, motorcycle-allowed carparks inside the box, bounds inclusive,
/// each with its newest photos.
pub async fn in_box(
    connection: &mut PgConnection,
    bounding_box: &BoundingBox,
) -> Result<Vec<WithId<Carpark>>> {
    let query = format!(
        "
        SELECT {COLUMNS}
        FROM carparks
        WHERE
            verified AND motorcycle_allowed
            AND latitude BETWEEN $1 AND $2
            AND longitude BETWEEN $3 AND $4;
        "
    );
    let carparks: Vec<CarparkRow> = sqlx::query_as(&query)
        .bind(bounding_box.min_lat)
        .bind(bounding_box.max_lat)
        .bind(bounding_box.min_lng)
        .bind(bounding_box.max_lng)
        .fetch_all(&mut *connection)
        .await
        .map_err(convert_error)?;

    let ids = carparks.iter().map(|row| row.id.clone()).collect::<Vec<_>>();
    let photos = for_carparks(&mut *connection, &ids, Some(SEARCH_RESULT_PHOTOS)).await?;
    with_photos(carparks, photos)
}

pub async fn get(connection: &mut PgConnection, id: &Id<Carpark>) -> Result<WithId<Carpark>> {
    let query = format!("SELECT {COLUMNS} FROM carparks WHERE id = $1;");
    let carpark: CarparkRow = sqlx::query_as(&query)
        .bind(id.raw_ref::<str>())
        .fetch_one(&mut *connection)
        .await
        .map_err(convert_error)?;

    let photos = for_carparks(&mut *connection, &[carpark.id.clone()], None).await?;
    with_photos(vec![carpark], photos)?
        .pop()
        .ok_or(DatabaseError::NotFound)
}

/// All carparks ordered by name.
pub async fn get_all(connection: &mut PgConnection) -> Result<Vec<WithId<Carpark>>> {
    let query = format!("SELECT {COLUMNS} FROM carparks ORDER BY name, id;");
    let carparks: Vec<CarparkRow> = sqlx::query_as(&query)
        .fetch_all(&mut *connection)
        .await
        .map_err(convert_error)?;

    let ids = carparks.iter().map(|row| row.id.clone()).collect::<Vec<_>>();
    let photos = for_carparks(&mut *connection, &ids, None).await?;
    with_photos(carparks, photos)
}

/// Unverified carparks, newest first.
pub async fn get_pending(connection: &mut PgConnection) -> Result<Vec<WithId<Carpark>>> {
    let query = format!(
        "SELECT {COLUMNS} FROM carparks WHERE NOT verified ORDER BY created_at DESC, id;"
    );
    let carparks: Vec<CarparkRow> = sqlx::query_as(&query)
        .fetch_all(&mut *connection)
        .await
        .map_err(convert_error)?;

    let ids = carparks.iter().map(|row| row.id.clone()).collect::<Vec<_>>();
    let photos = for_carparks(&mut *connection, &ids, None).await?;
    with_photos(carparks, photos)
}

pub async fn insert<'c, E>(executor: E, carpark: Carpark) -> Result<WithId<Carpark>>
where
    E: Executor<'c, Database = Postgres>,
{
    let total_moto_lots = moto_lots(&carpark)?;
    let query = format!(
        "
        INSERT INTO carparks(
            name,
            address,
            town,
            latitude,
            longitude,
            carpark_type,
            motorcycle_allowed,
            car_allowed,
            total_moto_lots,
            covered,
            pricing_notes,
            opening_hours,
            entrance_notes,
            verified,
            created_at,
            updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING {COLUMNS};
        "
    );
    let row: CarparkRow = sqlx::query_as(&query)
        .bind(carpark.name)
        .bind(carpark.address)
        .bind(carpark.town)
        .bind(carpark.location.latitude)
        .bind(carpark.location.longitude)
        .bind(carpark.carpark_type.as_str())
        .bind(carpark.motorcycle_allowed)
        .bind(carpark.car_allowed)
        .bind(total_moto_lots)
        .bind(carpark.covered)
        .bind(carpark.pricing_notes)
        .bind(carpark.opening_hours)
        .bind(carpark.entrance_notes)
        .bind(carpark.verified)
        .bind(carpark.created_at)
        .bind(carpark.updated_at)
        .fetch_one(executor)
        .await
        .map_err(convert_error)?;
    with_photos(vec![row], vec![])?
        .pop()
        .ok_or(DatabaseError::NotFound)
}

/// Overwrites every column except the id and the creation time.
pub async fn update(
    connection: &mut PgConnection,
    carpark: WithId<Carpark>,
) -> Result<WithId<Carpark>> {
    let total_moto_lots = moto_lots(&carpark.content)?;
    let id = carpark.id.raw();
    let carpark = carpark.content;
    let query = format!(
        "
        UPDATE carparks SET
            name = $2,
            address = $3,
            town = $4,
            latitude = $5,
            longitude = $6,
            carpark_type = $7,
            motorcycle_allowed = $8,
            car_allowed = $9,
            total_moto_lots = $10,
            covered = $11,
            pricing_notes = $12,
            opening_hours = $13,
            entrance_notes = $14,
            verified = $15,
            updated_at = $16
        WHERE id = $1
        RETURNING {COLUMNS};
        "
    );
    let row: CarparkRow = sqlx::query_as(&query)
        .bind(&id)
        .bind(carpark.name)
        .bind(carpark.address)
        .bind(carpark.town)
        .bind(carpark.location.latitude)
        .bind(carpark.location.longitude)
        .bind(carpark.carpark_type.as_str())
        .bind(carpark.motorcycle_allowed)
        .bind(carpark.car_allowed)
        .bind(total_moto_lots)
        .bind(carpark.covered)
        .bind(carpark.pricing_notes)
        .bind(carpark.opening_hours)
        .bind(carpark.entrance_notes)
        .bind(carpark.verified)
        .bind(carpark.updated_at)
        .fetch_one(&mut *connection)
        .await
        .map_err(convert_error)?;

    let photos = for_carparks(&mut *connection, &[id], None).await?;
    with_photos(vec![row], photos)?
        .pop()
        .ok_or(DatabaseError::NotFound)
}

pub async fn delete<'c, E>(executor: E, id: &Id<Carpark>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM carparks WHERE id = $1;")
        .bind(id.raw_ref::<str>())
        .execute(executor)
        .await
        .map_err(convert_error)?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    Ok(())
}

pub async fn count<'c, E>(executor: E) -> Result<u64>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM carparks;")
        .fetch_one(executor)
        .await
        .map(|count: i64| count as u64)
        .map_err(convert_error)
}
