use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{
    Block, BuildingRef, City, Country, Flat, LocationId, LocationLevel, LocationNode, Society,
    State, Tower,
};
use super::repository::LocationRepository;
use crate::error::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum LocationImportError {
    #[error("failed to read location export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid location CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown level '{level}'")]
    UnknownLevel { row: usize, level: String },
    #[error("row {row}: {level} requires a parent_id")]
    MissingParent { row: usize, level: LocationLevel },
    #[error("row {row}: building must be 'block' or 'tower', got '{value}'")]
    InvalidBuilding { row: usize, value: String },
    #[error("row {row}: name must not be blank")]
    BlankName { row: usize },
    #[error("could not store imported location: {0}")]
    Repository(#[from] RepositoryError),
}

/// Node counts per level written by [`LocationImporter::import_into`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: BTreeMap<LocationLevel, usize>,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.imported.values().sum()
    }
}

/// Loads location reference data from `level,id,parent_id,name[,building]` rows.
pub struct LocationImporter;

impl LocationImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<LocationNode>, LocationImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<LocationNode>, LocationImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut nodes = Vec::new();
        for (index, record) in csv_reader.deserialize::<LocationRow>().enumerate() {
            let row = record?;
            nodes.push(row.into_node(index + 1)?);
        }

        // Parents before children so a store that checks links accepts the batch.
        nodes.sort_by_key(|node| node.level());
        Ok(nodes)
    }

    pub async fn import_into<R>(
        repository: &R,
        nodes: Vec<LocationNode>,
    ) -> Result<ImportSummary, LocationImportError>
    where
        R: LocationRepository + ?Sized,
    {
        let mut summary = ImportSummary::default();
        for node in nodes {
            let stored = repository.save(node).await?;
            *summary.imported.entry(stored.level()).or_default() += 1;
        }
        Ok(summary)
    }
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    level: String,
    id: LocationId,
    #[serde(default)]
    parent_id: Option<LocationId>,
    name: String,
    #[serde(default)]
    building: Option<String>,
}

impl LocationRow {
    fn into_node(self, row: usize) -> Result<LocationNode, LocationImportError> {
        let level = LocationLevel::parse(&self.level).ok_or_else(|| {
            LocationImportError::UnknownLevel {
                row,
                level: self.level.clone(),
            }
        })?;

        if self.name.trim().is_empty() {
            return Err(LocationImportError::BlankName { row });
        }

        let id = self.id;
        let name = self.name;
        let parent = match (level, self.parent_id) {
            (LocationLevel::Country, _) => 0,
            (_, Some(parent)) => parent,
            (_, None) => return Err(LocationImportError::MissingParent { row, level }),
        };

        let node = match level {
            LocationLevel::Country => Country { id, name }.into(),
            LocationLevel::State => State {
                id,
                name,
                country_id: parent,
            }
            .into(),
            LocationLevel::City => City {
                id,
                name,
                state_id: parent,
            }
            .into(),
            LocationLevel::Society => Society {
                id,
                name,
                city_id: parent,
            }
            .into(),
            LocationLevel::Block => Block {
                id,
                name,
                society_id: parent,
            }
            .into(),
            LocationLevel::Tower => Tower {
                id,
                name,
                society_id: parent,
            }
            .into(),
            LocationLevel::Flat => {
                let building = match self.building.as_deref().map(str::to_ascii_lowercase) {
                    Some(kind) if kind == "block" => BuildingRef::Block(parent),
                    Some(kind) if kind == "tower" => BuildingRef::Tower(parent),
                    other => {
                        return Err(LocationImportError::InvalidBuilding {
                            row,
                            value: other.unwrap_or_default(),
                        })
                    }
                };
                Flat { id, name, building }.into()
            }
        };

        Ok(node)
    }
}
