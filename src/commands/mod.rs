pub mod delete;
pub mod migrate;
