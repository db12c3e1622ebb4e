// src/lib.rs
pub mod augment;
pub mod config;
pub mod error;
pub mod model;
pub mod modules;
pub mod parser;
pub mod permission;
pub mod resolver;
pub mod router;
pub mod source;
pub mod storage;
pub mod tree;
