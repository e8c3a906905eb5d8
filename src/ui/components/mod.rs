//! UI components module.

pub mod track_table;

pub use track_table::{render_track_table, TrackTableState};
