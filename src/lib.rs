pub mod application;
pub mod commands;
pub mod error;
pub mod paths;
pub mod registry;
pub mod runtime;
