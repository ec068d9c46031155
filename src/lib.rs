//! Sticker pack import pipeline.
//!
//! Uploads pack icons and sticker images to an object store, derives a
//! thumbnail per sticker, and writes a pack document with a nested sticker
//! collection into a document store.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
