//! Turns tables of flood-affected settlements with DMS coordinates, plus
//! administrative boundary polygons, into a layered Leaflet map.
//!
//! The stages are plain functions over in-memory data:
//! [`pipeline::load_tables`] -> [`processing::normalize`] ->
//! [`layers::build_layers`] -> [`compose::compose`] ->
//! [`render::write_document`].

pub mod boundary;
pub mod compose;
pub mod config;
pub mod data;
pub mod dms;
pub mod layers;
pub mod pipeline;
pub mod processing;
pub mod render;
pub mod server;
pub mod types;
