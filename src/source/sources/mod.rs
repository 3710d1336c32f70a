/// Curated JSON list source (manual community directories).
pub mod manual_list;
