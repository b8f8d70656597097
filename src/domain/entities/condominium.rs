use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condominium {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    /// When set, the admin flow checks that no other ACTIVE device is bound
    /// before provisioning a new one. Checked, not enforced by the core.
    #[serde(default)]
    pub single_device: bool,
}
