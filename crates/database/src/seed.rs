//! Initial data import from a CSV file.
//!
//! The header uses the JSON field names of a carpark, e.g.
//! `name,address,town,lat,lng,type,motorcycleAllowed,carAllowed,totalMotoLots`.
//! Imported carparks are administrative entries and thus verified unless a
//! `verified` column says otherwise.

use std::{error::Error, fs::File, io::Read, path::Path};

use model::carpark::{CarparkDraft, NewCarpark};
use parking::{database::Database, Client};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Reads all valid carparks. Rows which can not be parsed or validated are
/// logged and counted.
pub fn read_carparks<R: Read>(reader: R) -> (Vec<NewCarpark>, usize) {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut carparks = vec![];
    let mut skipped = 0;
    for (index, row) in csv_reader.deserialize::<CarparkDraft>().enumerate() {
        let carpark = row
            .map_err(|why| why.to_string())
            .and_then(|draft| draft.into_admin_entry().map_err(|why| why.to_string()));
        match carpark {
            Ok(carpark) => carparks.push(carpark),
            Err(why) => {
                // header is line 1
                log::warn!("skipping seed row {}: {}", index + 2, why);
                skipped += 1;
            }
        }
    }
    (carparks, skipped)
}

pub async fn seed<D, R>(client: &Client<D>, reader: R) -> Result<SeedReport, Box<dyn Error>>
where
    D: Database,
    R: Read,
{
    let (carparks, skipped) = read_carparks(reader);
    let imported = client.seed(carparks).await?;
    if imported == 0 {
        log::info!("database already holds carparks, seed not imported");
    } else {
        log::info!("imported {} carparks, skipped {} rows", imported, skipped);
    }
    Ok(SeedReport { imported, skipped })
}

pub async fn seed_from_file<D, P>(
    client: &Client<D>,
    path: P,
) -> Result<SeedReport, Box<dyn Error>>
where
    D: Database,
    P: AsRef<Path>,
{
    seed(client, File::open(path)?).await
}
