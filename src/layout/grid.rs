use crate::models::{Collection, Item, LayoutMode};
use crate::nav::Cursor;

/// Per-tile surface handed to the widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct TileView {
    pub id: String,
    pub title: String,
    pub layout: LayoutMode,
    pub image_url: String,
    pub selected: bool,
    pub date: String,
    pub genre_summary: String,
    pub logo_url: Option<String>,
}

impl TileView {
    fn new(item: &Item, layout: LayoutMode, selected: bool) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            layout,
            image_url: layout.image_url(item).to_string(),
            selected,
            date: item.release_date.display_year(),
            genre_summary: item.genre_summary(),
            logo_url: item.logo_url().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub collection_id: String,
    pub title: String,
    pub theme: String,
    pub tiles: Vec<TileView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridModel {
    pub layout: LayoutMode,
    pub rows: Vec<RowView>,
}

#[cfg(test)]
impl GridModel {
    pub fn tile(&self, cursor: Cursor) -> Option<&TileView> {
        self.rows.get(cursor.row)?.tiles.get(cursor.col)
    }

    pub fn selected_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.tiles.iter())
            .filter(|tile| tile.selected)
            .count()
    }
}

/// Projects catalog state into rows of tiles. The tile at `cursor` is the
/// only one marked selected.
pub fn project(collections: &[Collection], cursor: Option<Cursor>, layout: LayoutMode) -> GridModel {
    let rows = collections
        .iter()
        .enumerate()
        .map(|(row, collection)| RowView {
            collection_id: collection.id.clone(),
            title: collection.title.clone(),
            theme: collection.theme.clone(),
            tiles: collection
                .items
                .iter()
                .enumerate()
                .map(|(col, item)| {
                    TileView::new(item, layout, cursor == Some(Cursor::new(row, col)))
                })
                .collect(),
        })
        .collect();

    GridModel { layout, rows }
}

/// Spacing of the grid widgets.
#[derive(Debug, Clone)]
pub struct GridMetrics {
    /// Horizontal gap between tiles in a row strip (default: 12)
    pub tile_gap: f32,
    /// Height of the collection title above each strip (default: 32)
    pub row_header: f32,
    /// Vertical space below each strip (default: 16)
    pub row_spacing: f32,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            tile_gap: 12.0,
            row_header: 32.0,
            row_spacing: 16.0,
        }
    }
}

impl GridMetrics {
    /// Horizontal distance from one tile's origin to the next.
    pub fn column_pitch(&self, layout: LayoutMode) -> f32 {
        layout.tile_size().0 as f32 + self.tile_gap
    }

    /// Height a row occupies, spacing included. An empty row shows only
    /// its header.
    pub fn row_height(&self, layout: LayoutMode, len: usize) -> f32 {
        let strip = if len > 0 { layout.tile_size().1 as f32 } else { 0.0 };
        self.row_header + strip + self.row_spacing
    }

    /// Whole tiles that fit in a strip of the given width, at least one.
    pub fn visible_columns(&self, layout: LayoutMode, strip_width: f32) -> usize {
        let pitch = self.column_pitch(layout);
        (((strip_width + self.tile_gap) / pitch).floor() as usize).max(1)
    }

    /// Scroll offset that centres tile `col` in a strip of `viewport` width.
    pub fn horizontal_target(&self, layout: LayoutMode, col: usize, len: usize, viewport: f32) -> f32 {
        let pitch = self.column_pitch(layout);
        let content = (len as f32 * pitch - self.tile_gap).max(0.0);
        scroll_target(
            col as f32 * pitch,
            layout.tile_size().0 as f32,
            viewport,
            content,
        )
    }

    /// Scroll offset that centres row `row` (its tiles, not the header)
    /// vertically in the viewport. `row_lengths` holds every row's tile count.
    pub fn vertical_target(
        &self,
        layout: LayoutMode,
        row: usize,
        row_lengths: &[usize],
        viewport: f32,
    ) -> f32 {
        let height = |len: &usize| self.row_height(layout, *len);
        let above: f32 = row_lengths.iter().take(row).map(height).sum();
        let content: f32 = row_lengths.iter().map(height).sum();
        let extent = row_lengths
            .get(row)
            .map_or(0.0, |&len| height(&len) - self.row_header - self.row_spacing);
        scroll_target(above + self.row_header, extent, viewport, content)
    }
}

/// Offset that puts the middle of `[start, start + extent)` in the middle of
/// the viewport, clamped to the scrollable range.
pub fn scroll_target(start: f32, extent: f32, viewport: f32, content: f32) -> f32 {
    let max_offset = (content - viewport).max(0.0);
    let centered = start + extent / 2.0 - viewport / 2.0;
    centered.clamp(0.0, max_offset)
}

/// What the widgets must do to match the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPlan {
    Unchanged,
    /// Only the selection moved: unmark `from`, mark `to`.
    Reselect {
        from: Option<Cursor>,
        to: Option<Cursor>,
    },
    Replace,
}

#[derive(Debug, Clone, PartialEq)]
struct Rendered {
    layout: LayoutMode,
    rows: Vec<(String, usize)>,
    cursor: Option<Cursor>,
}

/// Remembers what the widgets currently show so repeated syncs are free.
#[derive(Debug, Default)]
pub struct RenderState {
    rendered: Option<Rendered>,
}

impl RenderState {
    pub fn plan(
        &mut self,
        collections: &[Collection],
        cursor: Option<Cursor>,
        layout: LayoutMode,
    ) -> RenderPlan {
        let desired = Rendered {
            layout,
            rows: collections
                .iter()
                .map(|c| (c.id.clone(), c.len()))
                .collect(),
            cursor,
        };

        let plan = match &self.rendered {
            Some(current) if *current == desired => RenderPlan::Unchanged,
            Some(current) if current.layout == desired.layout && current.rows == desired.rows => {
                RenderPlan::Reselect {
                    from: current.cursor,
                    to: desired.cursor,
                }
            }
            _ => RenderPlan::Replace,
        };

        self.rendered = Some(desired);
        plan
    }

    /// Forget the rendered state, forcing the next plan to replace.
    pub fn invalidate(&mut self) {
        self.rendered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_item;

    fn collections(sizes: &[usize]) -> Vec<Collection> {
        sizes
            .iter()
            .enumerate()
            .map(|(r, &size)| {
                Collection::skeleton(
                    format!("c{r}"),
                    format!("Row {r}"),
                    format!("/c{r}"),
                    "light".to_string(),
                )
                .with_items((0..size).map(|c| sample_item(&format!("{r}.{c}"))).collect())
            })
            .collect()
    }

    #[test]
    fn exactly_one_tile_is_selected() {
        let catalog = collections(&[3, 0, 2]);
        let grid = project(&catalog, Some(Cursor::new(2, 1)), LayoutMode::Horizontal);

        assert_eq!(grid.rows.len(), 3);
        assert!(grid.rows[1].tiles.is_empty());
        assert_eq!(grid.selected_count(), 1);
        assert!(grid.tile(Cursor::new(2, 1)).unwrap().selected);

        let grid = project(&catalog, None, LayoutMode::Horizontal);
        assert_eq!(grid.selected_count(), 0);
    }

    #[test]
    fn tiles_follow_layout() {
        let catalog = collections(&[1]);
        let cursor = Some(Cursor::new(0, 0));

        let horizontal = project(&catalog, cursor, LayoutMode::Horizontal);
        let vertical = project(&catalog, cursor, LayoutMode::Vertical);

        let h = &horizontal.rows[0].tiles[0];
        let v = &vertical.rows[0].tiles[0];
        assert_eq!(h.image_url, "https://img.test/0.0/h.jpg");
        assert_eq!(v.image_url, "https://img.test/0.0/v.jpg");
        assert_eq!(v.layout, LayoutMode::Vertical);
        assert_eq!(h.id, v.id);
        assert!(h.selected && v.selected);
        assert_eq!(h.date, "2019");
        assert_eq!(h.genre_summary, "Drama • Comedy");
    }

    #[test]
    fn plan_replaces_then_patches() {
        let catalog = collections(&[3, 3]);
        let mut state = RenderState::default();
        let layout = LayoutMode::Horizontal;

        assert_eq!(
            state.plan(&catalog, Some(Cursor::new(0, 0)), layout),
            RenderPlan::Replace
        );
        assert_eq!(
            state.plan(&catalog, Some(Cursor::new(0, 0)), layout),
            RenderPlan::Unchanged
        );
        assert_eq!(
            state.plan(&catalog, Some(Cursor::new(1, 0)), layout),
            RenderPlan::Reselect {
                from: Some(Cursor::new(0, 0)),
                to: Some(Cursor::new(1, 0)),
            }
        );
        assert_eq!(
            state.plan(&catalog, Some(Cursor::new(1, 0)), LayoutMode::Vertical),
            RenderPlan::Replace
        );

        state.invalidate();
        assert_eq!(
            state.plan(&catalog, Some(Cursor::new(1, 0)), LayoutMode::Vertical),
            RenderPlan::Replace
        );
    }

    #[test]
    fn scroll_target_centres_and_clamps() {
        // Middle of a long strip
        assert_eq!(scroll_target(1000.0, 100.0, 400.0, 3000.0), 850.0);
        // Near the start
        assert_eq!(scroll_target(50.0, 100.0, 400.0, 3000.0), 0.0);
        // Near the end
        assert_eq!(scroll_target(2900.0, 100.0, 400.0, 3000.0), 2600.0);
        // Content shorter than viewport
        assert_eq!(scroll_target(100.0, 100.0, 400.0, 300.0), 0.0);
    }

    #[test]
    fn metrics_count_whole_tiles() {
        let metrics = GridMetrics::default();
        // 320 px tiles with a 12 px gap: 3 tiles need 984 px
        assert_eq!(metrics.visible_columns(LayoutMode::Horizontal, 984.0), 3);
        assert_eq!(metrics.visible_columns(LayoutMode::Horizontal, 983.0), 2);
        assert_eq!(metrics.visible_columns(LayoutMode::Horizontal, 10.0), 1);
        assert_eq!(metrics.visible_columns(LayoutMode::Vertical, 984.0), 5);
    }

    #[test]
    fn vertical_target_accounts_for_empty_rows() {
        let metrics = GridMetrics::default();
        let layout = LayoutMode::Horizontal;
        // Full rows are 32 + 180 + 16 = 228 px, the empty one 48 px.
        assert_eq!(metrics.row_height(layout, 3), 228.0);
        assert_eq!(metrics.row_height(layout, 0), 48.0);

        // Row 2 tiles span 308..488; centred in 200 px gives 298.
        assert_eq!(metrics.vertical_target(layout, 2, &[3, 0, 3], 200.0), 298.0);
        // Same row with no empty row above it.
        assert_eq!(metrics.vertical_target(layout, 2, &[3, 3, 3], 200.0), 478.0);
        // Clamped to the end of a short catalog.
        assert_eq!(metrics.vertical_target(layout, 1, &[3, 0], 200.0), 76.0);
    }

    #[test]
    fn horizontal_target_for_first_and_last_tile() {
        let metrics = GridMetrics::default();
        assert_eq!(
            metrics.horizontal_target(LayoutMode::Horizontal, 0, 10, 984.0),
            0.0
        );
        let last = metrics.horizontal_target(LayoutMode::Horizontal, 9, 10, 984.0);
        let content = 10.0 * 332.0 - 12.0;
        assert_eq!(last, content - 984.0);
    }
}
