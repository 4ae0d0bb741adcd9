pub mod clockify;
pub mod commands;
pub mod error;
pub mod mapping;
pub mod model;
pub mod report;
pub mod resolve;
pub mod timew;
