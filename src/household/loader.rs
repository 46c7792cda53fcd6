//! Load household snapshots handed over by the ingestion layer

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::Reader;

use super::{AssetPosition, Household};
use crate::error::InputError;

/// Load a household snapshot from a JSON file
pub fn load_household<P: AsRef<Path>>(path: P) -> Result<Household, InputError> {
    let file = File::open(path)?;
    load_household_from_reader(BufReader::new(file))
}

/// Load a household snapshot from any JSON reader
pub fn load_household_from_reader<R: Read>(reader: R) -> Result<Household, InputError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load asset positions from a `category,amount` CSV file
pub fn load_positions<P: AsRef<Path>>(path: P) -> Result<Vec<AssetPosition>, InputError> {
    let reader = Reader::from_path(path)?;
    collect_positions(reader)
}

/// Load asset positions from any CSV reader
pub fn load_positions_from_reader<R: Read>(reader: R) -> Result<Vec<AssetPosition>, InputError> {
    collect_positions(Reader::from_reader(reader))
}

fn collect_positions<R: Read>(mut reader: Reader<R>) -> Result<Vec<AssetPosition>, InputError> {
    let mut positions = Vec::new();
    for result in reader.deserialize() {
        let position: AssetPosition = result?;
        positions.push(position);
    }
    Ok(positions)
}
