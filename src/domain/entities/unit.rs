use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub condominium_id: i64,
    pub block: Option<String>,
    pub number: String,
}

impl Unit {
    pub fn label(&self) -> String {
        match &self.block {
            Some(block) => format!("{}-{}", block, self.number),
            None => self.number.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub id: i64,
    pub unit_id: i64,
    pub name: String,
    pub phone: Option<String>,
}

/// Join shape used by the destination-unit picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitWithResidents {
    pub unit: Unit,
    pub residents: Vec<Resident>,
}
