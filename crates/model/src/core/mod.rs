pub mod column;
pub mod error;
pub mod identifiers;
pub mod type_map;
pub mod utils;
pub mod value;
pub mod vendor_type;
