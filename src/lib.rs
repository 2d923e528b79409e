pub mod aggregate;
pub mod config;
pub mod domain;
pub mod error;
pub mod index;
pub mod merge;
pub mod output;
pub mod service;
pub mod source;
