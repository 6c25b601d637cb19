//! Workshop elves.

use serde::{Deserialize, Serialize};

use santas_workshop_core::{ElfId, Energy};

/// An elf on the workshop roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Elf {
    pub id: ElfId,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub energy: Energy,
}

/// Raw elf form as submitted by a client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElfForm {
    pub name: String,
    pub role: String,
    pub energy: Option<i64>,
}

/// Payload for creating an elf.
///
/// The repository clamps `energy` into range and uses the default level when
/// it is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewElf {
    pub name: String,
    pub role: String,
    pub energy: Option<i64>,
}

/// Partial elf update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElfPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub energy: Option<i64>,
}

impl From<NewElf> for ElfPatch {
    fn from(elf: NewElf) -> Self {
        Self {
            name: Some(elf.name),
            role: Some(elf.role),
            energy: elf.energy,
        }
    }
}

/// Stored shape of an elf write, with energy already clamped.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ElfFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<Energy>,
}

impl From<NewElf> for ElfFields {
    fn from(elf: NewElf) -> Self {
        Self {
            name: Some(elf.name),
            role: Some(elf.role),
            energy: Some(elf.energy.map_or(Energy::DEFAULT, Energy::clamped)),
        }
    }
}

impl From<ElfPatch> for ElfFields {
    fn from(patch: ElfPatch) -> Self {
        Self {
            name: patch.name,
            role: patch.role,
            energy: patch.energy.map(Energy::clamped),
        }
    }
}
