//! JSONL (JSON Lines) storage.
//!
//! Each line is a valid JSON object representing one record. Full rewrites
//! go through a sibling temp file and a rename so readers never observe a
//! half-written file.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::StorageError;

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Replace the file contents with `entities`.
    pub fn write_all<'a, I>(&self, entities: I) -> Result<usize, StorageError>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.ensure_dir()?;

        let tmp = self.temp_path();
        let count = match write_lines(&tmp, entities)
            .and_then(|count| fs::rename(&tmp, &self.path).map(|_| count).map_err(Into::into))
        {
            Ok(count) => count,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&tmp) {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to remove {:?}: {}", tmp, cleanup);
                    }
                }
                return Err(e);
            }
        };

        debug!("Wrote {} records to {:?}", count, self.path);
        Ok(count)
    }
}

fn write_lines<'a, T, I>(path: &Path, entities: I) -> Result<usize, StorageError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let mut count = 0;

    for entity in entities {
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        count += 1;
    }

    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(count)
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all records. A missing file is an empty collection; unparseable
    /// lines are logged and skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", idx + 1, self.path, e);
                }
            }
        }

        debug!("Read {} records from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestRecord {
        id: String,
        value: u32,
    }

    fn record(id: &str, value: u32) -> TestRecord {
        TestRecord {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.jsonl");
        let records = vec![record("1", 100), record("2", 200)];

        let writer: JsonlWriter<TestRecord> = JsonlWriter::new(path.clone());
        assert_eq!(writer.write_all(&records).unwrap(), 2);

        let reader: JsonlReader<TestRecord> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), records);
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<TestRecord> =
            JsonlReader::new(temp_dir.path().join("nonexistent.jsonl"));

        assert!(!reader.exists());
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_all_replaces_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("records.jsonl");
        let writer: JsonlWriter<TestRecord> = JsonlWriter::new(path.clone());

        writer.write_all(&[record("1", 1), record("2", 2)]).unwrap();
        writer.write_all(&[record("3", 3)]).unwrap();

        let reader: JsonlReader<TestRecord> = JsonlReader::new(path.clone());
        assert_eq!(reader.read_all().unwrap(), vec![record("3", 3)]);
        assert!(!path.with_file_name("records.jsonl.tmp").exists());
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn test_failed_serialization_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.jsonl");
        let writer: JsonlWriter<Unserializable> = JsonlWriter::new(path.clone());

        let result = writer.write_all(&[Unserializable]);

        assert!(matches!(result, Err(StorageError::Json(_))));
        assert!(!path.exists());
        assert!(!path.with_file_name("records.jsonl.tmp").exists());
    }

    #[test]
    fn test_failed_rename_removes_temp_file_and_keeps_target() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.jsonl");
        // A non-empty directory at the target path makes the rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        let writer: JsonlWriter<TestRecord> = JsonlWriter::new(path.clone());

        let result = writer.write_all(&[record("1", 1)]);

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(path.join("keep").exists());
        assert!(!path.with_file_name("records.jsonl.tmp").exists());
    }

    #[test]
    fn test_read_all_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.jsonl");
        fs::write(
            &path,
            "{\"id\":\"1\",\"value\":1}\nnot json\n\n{\"id\":\"2\",\"value\":2}\n",
        )
        .unwrap();

        let reader: JsonlReader<TestRecord> = JsonlReader::new(path);
        let records = reader.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "2");
    }
}
