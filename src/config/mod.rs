//! Configuration management for video-gallery
//!
//! Settings come from, in increasing priority: built-in defaults, the JSON
//! config file, `GALLERY_*` environment variables, command line flags.

pub mod settings;

pub use settings::AppConfig;
