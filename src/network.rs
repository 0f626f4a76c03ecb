//! The house network document edited by `congregation-sync house`.
//!
//! ```yaml
//! ccc_network:
//!
//! - house_name: Ascend House
//!   leader: Ruth
//!   members:
//!   - Naomi
//!   status: Active
//!   last_updated: 2025-03-09 14:05:07
//! ```
//!
//! House names match case-insensitively; member names match exactly. Keys
//! added by hand, on a house or at the top level, are written back as found.
//! Unlike the checklist, an unreadable network file is an error: it is never
//! silently replaced.

use crate::persist::{self, PersistError};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Network file is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("House '{0}' already exists")]
    HouseExists(String),
    #[error("House '{0}' not found")]
    HouseNotFound(String),
    #[error("Member '{member}' already exists in {house}")]
    MemberExists { house: String, member: String },
}

pub const DEFAULT_HOUSE_STATUS: &str = "Active";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(rename = "ccc_network", default)]
    pub houses: Vec<House>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub house_name: String,
    pub leader: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(flatten)]
    pub extra: Mapping,
}

fn default_status() -> String {
    DEFAULT_HOUSE_STATUS.to_string()
}

fn stamp(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

impl Network {
    /// Load the network file; a missing file is an empty network.
    pub fn load(path: &Path) -> Result<Self, NetworkError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), NetworkError> {
        persist::save(path, self)?;
        info!(path = %path.display(), "saved network file");
        Ok(())
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut House> {
        let wanted = name.to_lowercase();
        self.houses
            .iter_mut()
            .find(|h| h.house_name.to_lowercase() == wanted)
    }

    /// Add a house led by `leader`. Names are compared case-insensitively.
    pub fn add_house(
        &mut self,
        name: &str,
        leader: &str,
        now: &DateTime<Local>,
    ) -> Result<(), NetworkError> {
        if self.find_mut(name).is_some() {
            return Err(NetworkError::HouseExists(name.to_string()));
        }
        self.houses.push(House {
            house_name: name.to_string(),
            leader: leader.to_string(),
            members: Vec::new(),
            status: default_status(),
            last_updated: stamp(now),
            extra: Mapping::new(),
        });
        Ok(())
    }

    /// Append `member` to the house named `house`.
    ///
    /// Returns the house's stored name, which may differ in case from `house`.
    pub fn add_member(
        &mut self,
        house: &str,
        member: &str,
        now: &DateTime<Local>,
    ) -> Result<String, NetworkError> {
        let found = self
            .find_mut(house)
            .ok_or_else(|| NetworkError::HouseNotFound(house.to_string()))?;
        if found.members.iter().any(|m| m == member) {
            return Err(NetworkError::MemberExists {
                house: found.house_name.clone(),
                member: member.to_string(),
            });
        }
        found.members.push(member.to_string());
        found.last_updated = stamp(now);
        Ok(found.house_name.clone())
    }
}
