// document constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: &str = ".";

// store constants
pub const MEMORY_SCHEME: &str = "memory";
pub const DEFAULT_ENTITY_ID_FIELD: &str = "id";

// identifier constants
pub const OBJECT_ID_LEN: usize = 12;
pub const OBJECT_ID_HEX_LEN: usize = 24;
