/// Preset ids are sequential integers assigned by the catalog store.
pub type DbId = i64;
