pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod moves;
pub mod mutator;
pub mod records;
pub mod scanner;
pub mod selection;
pub mod session;
pub mod store;
pub mod tree;
