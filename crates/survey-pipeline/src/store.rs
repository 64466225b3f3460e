// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Artifact Stores
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Output side of the survey: named arrays grouped by interval and
//! category (`"ion"`, `"elc"`, `"barycenter"`).
//!
//! Writing a group replaces it wholesale; arrays from an earlier run
//! that are absent from the new group disappear.

use ndarray::{ArrayD, Dimension};
use ndarray_npy::{NpzReader, NpzWriter};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use survey_types::error::{SurveyError, SurveyResult};
use survey_types::units::Unit;

/// Group address: one interval, one product category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactKey {
    pub interval: usize,
    pub category: String,
}

impl ArtifactKey {
    pub fn new(interval: usize, category: &str) -> Self {
        ArtifactKey {
            interval,
            category: category.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Float(ArrayD<f64>),
    /// Timestamps [ns].
    Time(ArrayD<i64>),
}

impl ArrayData {
    pub fn shape(&self) -> &[usize] {
        match self {
            ArrayData::Float(a) => a.shape(),
            ArrayData::Time(a) => a.shape(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredArray {
    pub data: ArrayData,
    pub unit: Unit,
}

impl StoredArray {
    pub fn float<D: Dimension>(data: ndarray::Array<f64, D>, unit: Unit) -> Self {
        StoredArray {
            data: ArrayData::Float(data.into_dyn()),
            unit,
        }
    }

    pub fn time<D: Dimension>(data: ndarray::Array<i64, D>) -> Self {
        StoredArray {
            data: ArrayData::Time(data.into_dyn()),
            unit: Unit::new("ns"),
        }
    }
}

pub type ArrayGroup = BTreeMap<String, StoredArray>;

pub trait ArtifactStore: Send + Sync {
    /// Replace every array of `key` with `arrays`.
    fn replace_group(&self, key: &ArtifactKey, arrays: ArrayGroup) -> SurveyResult<()>;

    /// Arrays currently stored under `key`, `None` if the group is absent.
    fn read_group(&self, key: &ArtifactKey) -> SurveyResult<Option<ArrayGroup>>;
}

fn poisoned<T>(_: T) -> SurveyError {
    SurveyError::Storage("store lock poisoned".to_string())
}

/// Thread-safe in-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    groups: Mutex<BTreeMap<ArtifactKey, ArrayGroup>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> SurveyResult<Vec<ArtifactKey>> {
        let groups = self.groups.lock().map_err(poisoned)?;
        Ok(groups.keys().cloned().collect())
    }
}

impl ArtifactStore for MemoryStore {
    fn replace_group(&self, key: &ArtifactKey, arrays: ArrayGroup) -> SurveyResult<()> {
        let mut groups = self.groups.lock().map_err(poisoned)?;
        groups.insert(key.clone(), arrays);
        Ok(())
    }

    fn read_group(&self, key: &ArtifactKey) -> SurveyResult<Option<ArrayGroup>> {
        let groups = self.groups.lock().map_err(poisoned)?;
        Ok(groups.get(key).cloned())
    }
}

/// One `interval_{i}.npz` per interval with arrays named
/// `{category}/{name}`, plus an `interval_{i}.units.json` sidecar.
#[derive(Debug)]
pub struct NpzStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

type IntervalContents = BTreeMap<String, ArrayGroup>;

impl NpzStore {
    /// Store rooted at `root`; the directory is created if missing.
    pub fn new(root: impl AsRef<Path>) -> SurveyResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(NpzStore {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn interval_path(&self, interval: usize) -> PathBuf {
        self.root.join(format!("interval_{interval}.npz"))
    }

    fn units_path(&self, interval: usize) -> PathBuf {
        self.root.join(format!("interval_{interval}.units.json"))
    }

    fn load(&self, interval: usize) -> SurveyResult<IntervalContents> {
        let path = self.interval_path(interval);
        let mut contents = IntervalContents::new();
        if !path.exists() {
            return Ok(contents);
        }
        let units: BTreeMap<String, String> = match std::fs::read_to_string(self.units_path(interval)) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        let mut npz = NpzReader::new(File::open(&path)?)
            .map_err(|e| SurveyError::Storage(format!("Failed to open npz '{}': {e}", path.display())))?;
        let names = npz
            .names()
            .map_err(|e| SurveyError::Storage(format!("Failed to list npz '{}': {e}", path.display())))?;
        for raw in names {
            let full = raw.trim_end_matches(".npy").to_string();
            let Some((category, name)) = full.split_once('/') else {
                continue;
            };
            let data = read_array(&mut npz, &full)?;
            let unit = Unit::new(units.get(&full).map(String::as_str).unwrap_or(""));
            contents
                .entry(category.to_string())
                .or_default()
                .insert(name.to_string(), StoredArray { data, unit });
        }
        Ok(contents)
    }

    fn save(&self, interval: usize, contents: &IntervalContents) -> SurveyResult<()> {
        let path = self.interval_path(interval);
        let storage = |e: ndarray_npy::WriteNpzError| {
            SurveyError::Storage(format!("Failed to write npz '{}': {e}", path.display()))
        };
        let mut writer = NpzWriter::new(File::create(&path)?);
        let mut units = BTreeMap::new();
        for (category, group) in contents {
            for (name, array) in group {
                let full = format!("{category}/{name}");
                match &array.data {
                    ArrayData::Float(a) => writer.add_array(full.as_str(), a).map_err(storage)?,
                    ArrayData::Time(a) => writer.add_array(full.as_str(), a).map_err(storage)?,
                }
                units.insert(full, array.unit.as_str().to_string());
            }
        }
        writer.finish().map_err(storage)?;
        std::fs::write(self.units_path(interval), serde_json::to_string_pretty(&units)?)?;
        Ok(())
    }
}

fn read_array(npz: &mut NpzReader<File>, key: &str) -> SurveyResult<ArrayData> {
    let file = format!("{key}.npy");
    if let Ok(a) = npz
        .by_name::<ndarray::OwnedRepr<f64>, ndarray::IxDyn>(&file)
        .or_else(|_| npz.by_name::<ndarray::OwnedRepr<f64>, ndarray::IxDyn>(key))
    {
        return Ok(ArrayData::Float(a));
    }
    npz.by_name::<ndarray::OwnedRepr<i64>, ndarray::IxDyn>(&file)
        .or_else(|_| npz.by_name::<ndarray::OwnedRepr<i64>, ndarray::IxDyn>(key))
        .map(ArrayData::Time)
        .map_err(|e| SurveyError::Storage(format!("Failed to read {key} from npz: {e}")))
}

impl ArtifactStore for NpzStore {
    fn replace_group(&self, key: &ArtifactKey, arrays: ArrayGroup) -> SurveyResult<()> {
        let _guard = self.write_lock.lock().map_err(poisoned)?;
        let mut contents = self.load(key.interval)?;
        contents.insert(key.category.clone(), arrays);
        self.save(key.interval, &contents)
    }

    fn read_group(&self, key: &ArtifactKey) -> SurveyResult<Option<ArrayGroup>> {
        let _guard = self.write_lock.lock().map_err(poisoned)?;
        let mut contents = self.load(key.interval)?;
        Ok(contents.remove(&key.category))
    }
}
