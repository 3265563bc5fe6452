pub mod grid;

pub use grid::{project, GridMetrics, GridModel, RenderPlan, RenderState, RowView, TileView};
