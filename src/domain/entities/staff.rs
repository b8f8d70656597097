use serde::{Deserialize, Serialize};

/// Guard or administrator verified by the server-side PIN check. The hash
/// never leaves the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub condominium_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl Staff {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Local stand-in used by the no-backend mode: login succeeds without a
    /// network round trip and the kiosk runs fully offline.
    pub fn local_fallback(first_name: String, last_name: String) -> Self {
        Self {
            id: 0,
            condominium_id: 0,
            first_name,
            last_name,
            role: "guard".to_string(),
        }
    }
}
