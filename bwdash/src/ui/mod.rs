//! UI module root: exposes drawing functions for individual panels.

pub mod graph;
pub mod header;
pub mod table;
pub mod theme;
pub mod util;
