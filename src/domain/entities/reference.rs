use serde::{Deserialize, Serialize};

/// Visit classification. `free_entry` categories (restaurant, sport facility)
/// bypass approval and are created already APPROVED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitType {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub free_entry: bool,
    #[serde(default)]
    pub requires_unit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
}
