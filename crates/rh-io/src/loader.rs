//! Dataset loaders.
//!
//! # Directory layout
//!
//! [`load_dataset`] expects four files in one directory:
//!
//! | File              | Format | Contents                                        |
//! |-------------------|--------|-------------------------------------------------|
//! | `node_data.json`  | JSON   | `{"<id>": {"lat": f, "lon": f}, ...}`           |
//! | `edges.csv`       | CSV    | `from,to,length`, 24 weekday + 24 weekend speeds |
//! | `drivers.csv`     | CSV    | `timestamp,lat,lon`                             |
//! | `passengers.csv`  | CSV    | `timestamp,start_lat,start_lon,end_lat,end_lon` |
//!
//! Every CSV file starts with a header row, which is skipped; columns are
//! read by position.  Timestamps use `%m/%d/%Y %H:%M:%S`.  Drivers and
//! passengers carry no ids in the data, so they are numbered from 1 in file
//! order.  Edges are directed; a two-way road appears as two rows.
//!
//! Each loader also has a `*_reader` variant accepting any `Read` source,
//! useful for testing (pass a `std::io::Cursor`).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use csv::{StringRecord, Trim};
use serde::Deserialize;
use tracing::info;

use rh_core::{
    DriverId, DriverRecord, EdgeRecord, GeoPoint, HOURS_PER_DAY, NodeRecord, PassengerId,
    PassengerRecord, Timestamp,
};

use crate::{LoadError, LoadResult};

pub const NODES_FILE: &str = "node_data.json";
pub const EDGES_FILE: &str = "edges.csv";
pub const DRIVERS_FILE: &str = "drivers.csv";
pub const PASSENGERS_FILE: &str = "passengers.csv";

/// Columns of one `edges.csv` row.
const EDGE_COLUMNS: usize = 3 + 2 * HOURS_PER_DAY;

/// Everything read from a dataset directory.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub nodes:      Vec<NodeRecord>,
    pub edges:      Vec<EdgeRecord>,
    pub drivers:    Vec<DriverRecord>,
    pub passengers: Vec<PassengerRecord>,
}

/// Load all four files from `dir`.
pub fn load_dataset(dir: &Path) -> LoadResult<Dataset> {
    let nodes = timed(NODES_FILE, || load_nodes(&dir.join(NODES_FILE)))?;
    let edges = timed(EDGES_FILE, || load_edges(&dir.join(EDGES_FILE)))?;
    let drivers = timed(DRIVERS_FILE, || load_drivers(&dir.join(DRIVERS_FILE)))?;
    let passengers = timed(PASSENGERS_FILE, || load_passengers(&dir.join(PASSENGERS_FILE)))?;
    Ok(Dataset { nodes, edges, drivers, passengers })
}

fn timed<T>(file: &'static str, load: impl FnOnce() -> LoadResult<Vec<T>>) -> LoadResult<Vec<T>> {
    let start = Instant::now();
    let records = load()?;
    info!(file, records = records.len(), elapsed_ms = start.elapsed().as_millis() as u64, "loaded");
    Ok(records)
}

fn open(path: &Path) -> LoadResult<File> {
    File::open(path).map_err(|source| LoadError::Open { path: path.to_path_buf(), source })
}

// ── Nodes ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeCoords {
    lat: f64,
    lon: f64,
}

pub fn load_nodes(path: &Path) -> LoadResult<Vec<NodeRecord>> {
    load_nodes_reader(open(path)?)
}

/// Nodes come back sorted by id.
pub fn load_nodes_reader<R: Read>(reader: R) -> LoadResult<Vec<NodeRecord>> {
    let raw: BTreeMap<u64, NodeCoords> = serde_json::from_reader(reader)
        .map_err(|source| LoadError::Json { file: NODES_FILE, source })?;
    Ok(raw
        .into_iter()
        .map(|(id, c)| NodeRecord { id, pos: GeoPoint::new(c.lat, c.lon) })
        .collect())
}

// ── Edges ─────────────────────────────────────────────────────────────────────

pub fn load_edges(path: &Path) -> LoadResult<Vec<EdgeRecord>> {
    load_edges_reader(open(path)?)
}

pub fn load_edges_reader<R: Read>(reader: R) -> LoadResult<Vec<EdgeRecord>> {
    let mut edges = Vec::new();
    for result in csv_reader(reader).records() {
        let record = result.map_err(|source| LoadError::Csv { file: EDGES_FILE, source })?;
        let row = Row::new(EDGES_FILE, &record);
        if record.len() != EDGE_COLUMNS {
            return Err(row.error(format!("expected {EDGE_COLUMNS} columns, found {}", record.len())));
        }
        let speeds = |range: std::ops::Range<usize>| {
            range.map(|i| row.parse::<f64>(i, "speed")).collect::<LoadResult<Vec<f64>>>()
        };
        edges.push(EdgeRecord {
            from_id:       row.parse(0, "from")?,
            to_id:         row.parse(1, "to")?,
            length:        row.parse(2, "length")?,
            weekday_speed: speeds(3..3 + HOURS_PER_DAY)?,
            weekend_speed: speeds(3 + HOURS_PER_DAY..EDGE_COLUMNS)?,
        });
    }
    Ok(edges)
}

// ── Drivers ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DriverRow {
    timestamp: String,
    lat:       f64,
    lon:       f64,
}

pub fn load_drivers(path: &Path) -> LoadResult<Vec<DriverRecord>> {
    load_drivers_reader(open(path)?)
}

pub fn load_drivers_reader<R: Read>(reader: R) -> LoadResult<Vec<DriverRecord>> {
    let mut drivers = Vec::new();
    for (i, result) in csv_reader(reader).records().enumerate() {
        let record = result.map_err(|source| LoadError::Csv { file: DRIVERS_FILE, source })?;
        let row = Row::new(DRIVERS_FILE, &record);
        let raw: DriverRow = row.deserialize()?;
        drivers.push(DriverRecord {
            id:        DriverId(sequential_id(&row, i)?),
            timestamp: row.timestamp(&raw.timestamp)?,
            pos:       row.point("driver", raw.lat, raw.lon)?,
        });
    }
    Ok(drivers)
}

// ── Passengers ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PassengerRow {
    timestamp: String,
    start_lat: f64,
    start_lon: f64,
    end_lat:   f64,
    end_lon:   f64,
}

pub fn load_passengers(path: &Path) -> LoadResult<Vec<PassengerRecord>> {
    load_passengers_reader(open(path)?)
}

/// Passengers keep file order; the dispatcher rejects out-of-order requests.
pub fn load_passengers_reader<R: Read>(reader: R) -> LoadResult<Vec<PassengerRecord>> {
    let mut passengers = Vec::new();
    for (i, result) in csv_reader(reader).records().enumerate() {
        let record = result.map_err(|source| LoadError::Csv { file: PASSENGERS_FILE, source })?;
        let row = Row::new(PASSENGERS_FILE, &record);
        let raw: PassengerRow = row.deserialize()?;
        passengers.push(PassengerRecord {
            id:        PassengerId(sequential_id(&row, i)?),
            timestamp: row.timestamp(&raw.timestamp)?,
            start:     row.point("pickup", raw.start_lat, raw.start_lon)?,
            end:       row.point("dropoff", raw.end_lat, raw.end_lon)?,
        });
    }
    Ok(passengers)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

/// 1-based id of the `index`-th data row.
fn sequential_id(row: &Row<'_>, index: usize) -> LoadResult<u32> {
    u32::try_from(index + 1).map_err(|_| row.error("too many rows for a 32-bit id".into()))
}

/// One CSV record plus where it came from, for error reporting.
struct Row<'a> {
    file:   &'static str,
    line:   u64,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    fn new(file: &'static str, record: &'a StringRecord) -> Self {
        let line = record.position().map_or(0, |p| p.line());
        Self { file, line, record }
    }

    fn error(&self, message: String) -> LoadError {
        LoadError::Row { file: self.file, line: self.line, message }
    }

    fn parse<T: std::str::FromStr>(&self, index: usize, name: &str) -> LoadResult<T> {
        let raw = self.record.get(index).unwrap_or("");
        raw.parse()
            .map_err(|_| self.error(format!("column {} ({name}): cannot parse {raw:?}", index + 1)))
    }

    /// Positional deserialization into a row struct.
    fn deserialize<T: serde::de::DeserializeOwned>(&self) -> LoadResult<T> {
        self.record.deserialize(None).map_err(|e| self.error(e.to_string()))
    }

    /// `NaN` and `inf` parse as `f64` but place nothing on the map.
    fn point(&self, what: &str, lat: f64, lon: f64) -> LoadResult<GeoPoint> {
        let pos = GeoPoint::new(lat, lon);
        if pos.is_finite() {
            Ok(pos)
        } else {
            Err(self.error(format!("{what} coordinates ({lat}, {lon}) are not finite")))
        }
    }

    fn timestamp(&self, raw: &str) -> LoadResult<Timestamp> {
        Timestamp::parse(raw).map_err(|e| self.error(e.to_string()))
    }
}
