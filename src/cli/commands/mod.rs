pub mod scan;
pub mod version;
