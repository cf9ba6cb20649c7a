pub mod config;
pub mod message;
pub mod prefs;
pub mod text_wrapping;
pub mod transcript_file;
