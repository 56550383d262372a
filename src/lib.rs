//! Abstract recovery and text normalization for scholarly paper datasets.

pub mod db;
pub mod papers;
pub mod settings;
pub mod text;
pub mod utils;
