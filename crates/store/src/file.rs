//! FileStore - append-only JSON-lines store on local disk
//!
//! Layout under the data directory:
//! - `raw_readings.jsonl`: one `StoredReading` per line
//! - `merged_records.jsonl`: one `StoredRecord` per line
//! - `devices.json`, `sessions.json`: snapshots rewritten on every upsert
//!
//! The merged-record index is rebuilt from disk at open. Queries seek to the
//! indexed byte offsets and decode only the lines they return.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use contracts::{
    BatchOrigin, DeviceRecord, DurableStore, MergedRecord, QueryPage, RawReading, RecordFilter,
    SessionRecord, SessionUpdate, StoreCounts, StoreError,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::index::RecordIndex;
use crate::rows::{StoredReading, StoredRecord};

const RAW_FILE: &str = "raw_readings.jsonl";
const MERGED_FILE: &str = "merged_records.jsonl";
const DEVICES_FILE: &str = "devices.json";
const SESSIONS_FILE: &str = "sessions.json";

struct FileState {
    devices: BTreeMap<String, DeviceRecord>,
    sessions: BTreeMap<String, SessionRecord>,
    raw: File,
    /// Byte length of `raw_readings.jsonl`
    raw_len: u64,
    raw_count: u64,
    merged: File,
    /// Byte length of `merged_records.jsonl`
    merged_len: u64,
    index: RecordIndex<u64>,
}

/// File-backed store
pub struct FileStore {
    name: String,
    root: PathBuf,
    state: Mutex<FileState>,
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("name", &self.name)
            .field("root", &self.root)
            .finish()
    }
}

impl FileStore {
    /// Open (or create) a store under `root`, rebuilding the record index
    pub fn open(name: impl Into<String>, root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let name = name.into();
        let root = root.into();
        fs::create_dir_all(&root)?;

        let devices: BTreeMap<String, DeviceRecord> = load_snapshot(&root.join(DEVICES_FILE))?;
        let sessions: BTreeMap<String, SessionRecord> = load_snapshot(&root.join(SESSIONS_FILE))?;

        let raw_path = root.join(RAW_FILE);
        let raw = open_append(&raw_path)?;
        let raw_count = count_lines(&raw_path)?;
        let raw_len = raw.metadata()?.len();

        let merged_path = root.join(MERGED_FILE);
        let (index, merged_len) = rebuild_index(&name, &merged_path)?;
        let merged = open_append(&merged_path)?;

        info!(
            store = %name,
            root = %root.display(),
            devices = devices.len(),
            sessions = sessions.len(),
            raw_readings = raw_count,
            merged_records = index.len(),
            "FileStore opened"
        );

        Ok(Self {
            name,
            root,
            state: Mutex::new(FileState {
                devices,
                sessions,
                raw,
                raw_len,
                raw_count,
                merged,
                merged_len,
                index,
            }),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_error(&self, operation: &'static str, e: impl std::fmt::Display) -> StoreError {
        error!(store = %self.name, operation, error = %e, "Write failed");
        StoreError::write(&self.name, operation, e.to_string())
    }

    fn read_records(&self, offsets: &[u64]) -> Result<Vec<MergedRecord>, StoreError> {
        let mut reader = BufReader::new(File::open(self.root.join(MERGED_FILE))?);
        let mut line = String::new();
        let mut records = Vec::with_capacity(offsets.len());
        for &offset in offsets {
            reader.seek(SeekFrom::Start(offset))?;
            line.clear();
            reader.read_line(&mut line)?;
            let row: StoredRecord = serde_json::from_str(line.trim_end())
                .map_err(|e| StoreError::query(&self.name, format!("offset {offset}: {e}")))?;
            records.push(row.record);
        }
        Ok(records)
    }
}

impl DurableStore for FileStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert_device(&self, device_id: &str, seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state
            .devices
            .entry(device_id.to_string())
            .and_modify(|device| device.last_seen = seen_at)
            .or_insert_with(|| DeviceRecord::first_contact(device_id, seen_at));
        write_snapshot(&self.root.join(DEVICES_FILE), &state.devices)
            .map_err(|e| self.write_error("upsert_device", e))
    }

    async fn upsert_session(&self, update: &SessionUpdate) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state
            .sessions
            .entry(update.session_id.clone())
            .and_modify(|session| session.absorb(update))
            .or_insert_with(|| SessionRecord::start(update));
        write_snapshot(&self.root.join(SESSIONS_FILE), &state.sessions)
            .map_err(|e| self.write_error("upsert_session", e))
    }

    #[instrument(
        name = "file_store_insert_raw",
        skip(self, origin, readings),
        fields(store = %self.name, readings = readings.len())
    )]
    async fn insert_raw_readings(
        &self,
        origin: &BatchOrigin,
        readings: &[RawReading],
    ) -> Result<usize, StoreError> {
        let received_at = Utc::now();
        let mut buf = Vec::new();
        for reading in readings {
            serde_json::to_writer(&mut buf, &StoredReading::new(origin, reading, received_at))?;
            buf.push(b'\n');
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;
        append_committed(&mut state.raw, state.raw_len, &buf)
            .map_err(|e| self.write_error("insert_raw_readings", e))?;
        state.raw_len += buf.len() as u64;
        state.raw_count += readings.len() as u64;
        Ok(readings.len())
    }

    #[instrument(
        name = "file_store_insert_merged",
        skip(self, origin, records),
        fields(store = %self.name, records = records.len())
    )]
    async fn insert_merged_records(
        &self,
        origin: &BatchOrigin,
        records: &[MergedRecord],
    ) -> Result<usize, StoreError> {
        let mut buf = Vec::new();
        let mut line_starts = Vec::with_capacity(records.len());
        for record in records {
            line_starts.push(buf.len() as u64);
            serde_json::to_writer(&mut buf, &StoredRecord::new(origin, record))?;
            buf.push(b'\n');
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;
        append_committed(&mut state.merged, state.merged_len, &buf)
            .map_err(|e| self.write_error("insert_merged_records", e))?;

        let base = state.merged_len;
        for (record, start) in records.iter().zip(line_starts) {
            state
                .index
                .insert(origin, record.timestamp_millis(), base + start);
        }
        state.merged_len += buf.len() as u64;
        debug!(bytes = buf.len(), "Merged records appended");
        Ok(records.len())
    }

    async fn query_merged_records(
        &self,
        filter: &RecordFilter,
        limit: usize,
    ) -> Result<QueryPage, StoreError> {
        let (offsets, total) = self.state.lock().index.latest(filter, limit);
        let records = self.read_records(&offsets)?;
        Ok(QueryPage { records, total })
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        let state = self.state.lock();
        Ok(StoreCounts {
            devices: state.devices.len() as u64,
            sessions: state.sessions.len() as u64,
            raw_readings: state.raw_count,
            merged_records: state.index.len() as u64,
        })
    }
}

/// Sink that can be cut back to a known length
trait Truncate {
    fn truncate(&mut self, len: u64) -> std::io::Result<()>;
}

impl Truncate for File {
    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }
}

/// Append `buf` to a sink whose committed length is `committed`.
///
/// A write that fails part way is cut back to `committed`, so the next append
/// starts where the index expects it.
fn append_committed<W: Write + Truncate>(
    sink: &mut W,
    committed: u64,
    buf: &[u8],
) -> std::io::Result<()> {
    let result = sink.write_all(buf).and_then(|()| sink.flush());
    if let Err(e) = result {
        if let Err(rollback) = sink.truncate(committed) {
            error!(committed, error = %rollback, "Failed to roll back partial append");
        }
        return Err(e);
    }
    Ok(())
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn count_lines(path: &Path) -> std::io::Result<u64> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.split(b'\n') {
        if !line?.is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Scan `merged_records.jsonl`, indexing every decodable line.
///
/// Undecodable lines are skipped with a warning. An unterminated final line
/// (a torn write) is truncated away so later appends start on a fresh line.
fn rebuild_index(store: &str, path: &Path) -> Result<(RecordIndex<u64>, u64), StoreError> {
    if !path.exists() {
        return Ok((RecordIndex::new(), 0));
    }

    let mut reader = BufReader::new(File::open(path)?);
    let mut index = RecordIndex::new();
    let mut offset = 0u64;
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        if !line.ends_with('\n') {
            warn!(store, offset, bytes = read, "Truncating torn record line");
            OpenOptions::new().write(true).open(path)?.set_len(offset)?;
            break;
        }
        let trimmed = line.trim_end();
        if !trimmed.is_empty() {
            match serde_json::from_str::<StoredRecord>(trimmed) {
                Ok(row) => index.insert(&row.origin, row.record.timestamp_millis(), offset),
                Err(e) => warn!(store, offset, error = %e, "Skipping unreadable record line"),
            }
        }
        offset += read as u64;
    }

    Ok((index, offset))
}

fn load_snapshot<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write to a sibling temp file, then rename over the snapshot
fn write_snapshot<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, value).map_err(std::io::Error::other)?;
        writer.flush()?;
    }
    fs::rename(tmp, path)
}
