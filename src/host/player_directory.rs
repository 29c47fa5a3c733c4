// Name <-> id registry for online and previously seen players.
//
// Shared between the host thread and workers, so it uses DashMap rather than
// a lock around a HashMap. Names are matched case-insensitively.

use dashmap::DashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct PlayerDirectory {
    /// lowercase name -> id
    by_name: DashMap<String, Uuid>,
    /// id -> display name
    by_id: DashMap<Uuid, String>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable id for a name when there is no account service to ask.
    pub fn offline_id(name: &str) -> Uuid {
        Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("OfflinePlayer:{}", name.to_lowercase()).as_bytes(),
        )
    }

    /// Record a player, replacing any previous name for the same id.
    pub fn register(&self, name: &str, id: Uuid) {
        if let Some(old) = self.by_id.insert(id, name.to_string()) {
            if !old.eq_ignore_ascii_case(name) {
                self.by_name.remove(&old.to_lowercase());
            }
        }
        self.by_name.insert(name.to_lowercase(), id);
    }

    pub fn id_of(&self, name: &str) -> Option<Uuid> {
        self.by_name.get(&name.to_lowercase()).map(|entry| *entry)
    }

    pub fn name_of(&self, id: Uuid) -> Option<String> {
        self.by_id.get(&id).map(|entry| entry.clone())
    }

    /// Display name, falling back to the raw id for unknown players.
    pub fn display(&self, id: Uuid) -> String {
        self.name_of(id).unwrap_or_else(|| id.to_string())
    }
}
