use kurbo::{Point, Rect, Size};

use crate::{geom::RectExt, menu::Menu, style::MenuStyle, text::MeasureText};

/// One visible level of the open menu tree: the laid-out cell rects for the
/// level's items plus the panel chrome bounds and fade state.
///
/// Panels live in a flat arena owned by the controller; `parent` is an index
/// into that arena (`None` for the root), so the submenu tree carries no
/// recursive ownership. Cell references (`highlighted_cell`, `clicked_cell`)
/// are indices into `cell_bounds`, never pointers.
#[derive(Debug)]
pub struct MenuPanel {
    pub(crate) menu_path: Vec<usize>,
    pub(crate) cell_bounds: Vec<Rect>,
    /// Interior bounds: the padded union of the cells (mouse target area).
    pub(crate) target_rect: Rect,
    /// Visual bounds: `target_rect` grown by the drop-shadow margin.
    pub(crate) draw_rect: Rect,
    pub(crate) single_cell: Size,
    pub(crate) highlighted_cell: Option<usize>,
    pub(crate) clicked_cell: Option<usize>,
    pub(crate) parent: Option<usize>,
    pub(crate) blend_weight: f32,
    pub(crate) should_draw: bool,
    pub(crate) scroll_enabled: bool,
    pub(crate) scroll_offset: usize,
    pub(crate) scroll_max_rows: usize,
}

impl MenuPanel {
    /// Lay out one menu level at `origin`. Cells run top to bottom; when the
    /// next cell would cross the bottom of `max_bounds` (or the per-column
    /// item limit), layout either wraps to a new column or, with
    /// `scroll_if_too_big`, restarts as a scroll window pinned to the top
    /// scroll margin. Layout never fails; it degrades to scrolling or
    /// clipped bounds.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        style: &MenuStyle,
        max_bounds: Rect,
        expanded_override: Option<Rect>,
        menu: &Menu,
        origin: Point,
        parent: Option<usize>,
        menu_path: Vec<usize>,
        measure: &mut dyn MeasureText,
    ) -> Self {
        let single_cell = Self::largest_cell_size(style, menu, measure);
        let cell_w = single_cell.width;
        let cell_h = single_cell.height;

        let row_height = |i: usize| -> f64 {
            match menu.item(i) {
                Some(item) if item.is_separator() => style.separator_size,
                _ => cell_h,
            }
        };

        let mut cells: Vec<Rect> = Vec::with_capacity(menu.n_items());
        let mut scroll_enabled = false;
        let mut scroll_max_rows = 0usize;

        let mut left = origin.x + style.padding;
        let mut top = origin.y + style.padding;

        for i in 0..menu.n_items() {
            let mut inc_y = row_height(i);

            let new_column =
                style.max_column_items > 0 && i > 1 && i % style.max_column_items == 0;

            if top + inc_y + style.padding > max_bounds.y1 || new_column {
                if style.scroll_if_too_big && cell_h > 0.0 {
                    let max_top = max_bounds.y0 + style.padding + style.drop_shadow_size;
                    let max_bottom = max_bounds.y1 - style.padding;
                    // full-height rows, gaps included, that fit the scroll span
                    scroll_max_rows = ((max_bottom - max_top + style.cell_gap)
                        / (cell_h + style.cell_gap))
                        .floor()
                        .max(0.0) as usize;

                    // restart from the top scroll margin
                    cells.clear();
                    top = max_top;

                    if menu.n_items() < scroll_max_rows {
                        // fits in the row budget after all; no scroll window
                        for r in 0..menu.n_items() {
                            inc_y = row_height(r);
                            cells.push(Rect::new(left, top, left + cell_w, top + inc_y));
                            top += inc_y + style.cell_gap;
                        }
                    } else {
                        scroll_enabled = true;
                        for _ in 0..scroll_max_rows {
                            cells.push(Rect::new(left, top, left + cell_w, top + cell_h));
                            top += cell_h + style.cell_gap;
                        }
                    }
                    break;
                } else {
                    // wrap to a new column to the right
                    left += cell_w + style.cell_gap;
                    top = origin.y + style.padding;
                }
            }

            cells.push(Rect::new(left, top, left + cell_w, top + inc_y));
            top += inc_y + style.cell_gap;
        }

        let span = cells
            .iter()
            .copied()
            .reduce(|a, b| a.union(b))
            .unwrap_or_else(|| Rect::from_origin_size(origin, Size::ZERO));

        let target_rect = expanded_override.unwrap_or_else(|| span.padded(style.padding));
        let draw_rect = target_rect.padded(style.drop_shadow_size);

        Self {
            menu_path,
            cell_bounds: cells,
            target_rect,
            draw_rect,
            single_cell,
            highlighted_cell: None,
            clicked_cell: None,
            parent,
            blend_weight: 0.0,
            should_draw: true,
            scroll_enabled,
            scroll_offset: 0,
            scroll_max_rows,
        }
    }

    /// Uniform cell size for a menu: the widest measured item text plus the
    /// tick and submenu-arrow gutters.
    pub(crate) fn largest_cell_size(
        style: &MenuStyle,
        menu: &Menu,
        measure: &mut dyn MeasureText,
    ) -> Size {
        let mut span = Size::ZERO;
        for item in menu.items() {
            let text = measure.measure(&style.text, item.text());
            span.width = span.width.max(text.width);
            span.height = span.height.max(text.height);
        }
        Size::new(
            span.width + 2.0 * style.text_hpad + style.tick_size + style.arrow_size,
            span.height,
        )
    }

    /// Natural (single-column, unscrolled) panel target size, used for
    /// placement before the panel exists.
    pub(crate) fn natural_size(
        style: &MenuStyle,
        menu: &Menu,
        measure: &mut dyn MeasureText,
    ) -> Size {
        let cell = Self::largest_cell_size(style, menu, measure);
        let mut height = 0.0;
        for (i, item) in menu.items().iter().enumerate() {
            if i > 0 {
                height += style.cell_gap;
            }
            height += if item.is_separator() {
                style.separator_size
            } else {
                cell.height
            };
        }
        Size::new(
            cell.width + 2.0 * style.padding,
            height + 2.0 * style.padding,
        )
    }

    /// Map a visible cell index to its menu item index. The identity map
    /// unless a scroll window is active.
    pub fn item_index(&self, cell: usize) -> usize {
        if self.scroll_enabled {
            cell + self.scroll_offset
        } else {
            cell
        }
    }

    /// First cell containing the point whose item is enabled, if any.
    pub fn hit_test(&self, menu: &Menu, p: Point) -> Option<usize> {
        for (i, cell) in self.cell_bounds.iter().enumerate() {
            if cell.contains(p) {
                let enabled = menu
                    .item(self.item_index(i))
                    .is_some_and(|item| item.is_enabled());
                return enabled.then_some(i);
            }
        }
        None
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self, n_items: usize) {
        let max = n_items.saturating_sub(self.cell_bounds.len());
        self.scroll_offset = (self.scroll_offset + 1).min(max);
    }

    pub fn cell_bounds(&self) -> &[Rect] {
        &self.cell_bounds
    }

    pub fn cell(&self, index: usize) -> Option<Rect> {
        self.cell_bounds.get(index).copied()
    }

    pub fn target_rect(&self) -> Rect {
        self.target_rect
    }

    pub fn draw_rect(&self) -> Rect {
        self.draw_rect
    }

    pub fn single_cell(&self) -> Size {
        self.single_cell
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn menu_path(&self) -> &[usize] {
        &self.menu_path
    }

    pub fn should_draw(&self) -> bool {
        self.should_draw
    }

    pub fn blend_weight(&self) -> f32 {
        self.blend_weight
    }

    pub fn highlighted_cell(&self) -> Option<usize> {
        self.highlighted_cell
    }

    pub fn clicked_cell(&self) -> Option<usize> {
        self.clicked_cell
    }

    pub fn scroll_enabled(&self) -> bool {
        self.scroll_enabled
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuItem;
    use crate::text::FixedAdvance;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 400.0, 300.0);

    fn panel(style: &MenuStyle, menu: &Menu, origin: Point) -> MenuPanel {
        MenuPanel::new(
            style,
            SCREEN,
            None,
            menu,
            origin,
            None,
            Vec::new(),
            &mut FixedAdvance::default(),
        )
    }

    #[test]
    fn cells_are_uniform_width_and_ordered_top_to_bottom() {
        let style = MenuStyle::default();
        let menu = Menu::with_items("m", ["a", "bb", "ccc"]);
        let p = panel(&style, &menu, Point::new(10.0, 10.0));

        assert_eq!(p.cell_bounds.len(), 3);
        let w = p.cell_bounds[0].width();
        for pair in p.cell_bounds.windows(2) {
            assert_eq!(pair[1].width(), w);
            assert!(pair[1].y0 > pair[0].y1);
        }
    }

    #[test]
    fn separator_rows_use_separator_height() {
        let style = MenuStyle::default();
        let mut menu = Menu::new("m");
        menu.add_separator();
        menu.add("a");
        let p = panel(&style, &menu, Point::new(0.0, 0.0));

        assert_eq!(p.cell_bounds[0].height(), style.separator_size);
        assert!(p.cell_bounds[1].height() > style.separator_size);
    }

    #[test]
    fn empty_menu_yields_no_cells_and_degenerate_span() {
        let style = MenuStyle::default();
        let menu = Menu::new("m");
        let p = panel(&style, &menu, Point::new(50.0, 50.0));

        assert!(p.cell_bounds.is_empty());
        assert_eq!(p.target_rect.width(), 2.0 * style.padding);
        assert!(!p.scroll_enabled);
    }

    #[test]
    fn column_wrap_conserves_cell_count() {
        let mut style = MenuStyle::default();
        style.max_column_items = 3;
        let menu = Menu::with_items("m", ["a", "b", "c", "d", "e", "f", "g"]);
        let p = panel(&style, &menu, Point::new(0.0, 0.0));

        assert_eq!(p.cell_bounds.len(), menu.n_items());
        // three distinct column x positions
        let mut lefts: Vec<f64> = p.cell_bounds.iter().map(|c| c.x0).collect();
        lefts.dedup();
        assert_eq!(lefts.len(), 3);
    }

    #[test]
    fn overflow_without_scroll_starts_a_new_column() {
        let style = MenuStyle::default();
        let names: Vec<String> = (0..40).map(|i| format!("item {i}")).collect();
        let menu = Menu::with_items("m", names);
        let p = panel(&style, &menu, Point::new(0.0, 0.0));

        assert_eq!(p.cell_bounds.len(), menu.n_items());
        assert!(!p.scroll_enabled);
        let max_left = p.cell_bounds.iter().map(|c| c.x0).fold(0.0, f64::max);
        assert!(max_left > 0.0 + style.padding);
        // every cell stays above the bottom bound
        for cell in &p.cell_bounds {
            assert!(cell.y1 + style.padding <= SCREEN.y1);
        }
    }

    #[test]
    fn scroll_window_caps_visible_cells_and_stays_in_bounds() {
        let mut style = MenuStyle::default();
        style.scroll_if_too_big = true;
        let names: Vec<String> = (0..100).map(|i| format!("item {i}")).collect();
        let menu = Menu::with_items("m", names);
        let p = panel(&style, &menu, Point::new(0.0, 0.0));

        assert!(p.scroll_enabled);
        assert_eq!(
            p.cell_bounds.len(),
            menu.n_items().min(p.scroll_max_rows)
        );
        for cell in &p.cell_bounds {
            assert!(cell.y0 >= SCREEN.y0);
            assert!(cell.y1 <= SCREEN.y1);
        }
    }

    #[test]
    fn overflowing_menu_that_fits_row_budget_relayouts_without_scroll() {
        let mut style = MenuStyle::default();
        style.scroll_if_too_big = true;
        // tall origin forces the overflow branch even though the item count
        // fits the full-screen row budget
        let menu = Menu::with_items("m", ["a", "b", "c", "d"]);
        let p = panel(&style, &menu, Point::new(0.0, 280.0));

        assert!(!p.scroll_enabled);
        assert_eq!(p.cell_bounds.len(), 4);
        let max_top = SCREEN.y0 + style.padding + style.drop_shadow_size;
        assert_eq!(p.cell_bounds[0].y0, max_top);
    }

    #[test]
    fn scroll_clamp_is_idempotent() {
        let mut style = MenuStyle::default();
        style.scroll_if_too_big = true;
        let names: Vec<String> = (0..30).map(|i| format!("item {i}")).collect();
        let menu = Menu::with_items("m", names);
        let mut p = panel(&style, &menu, Point::new(0.0, 0.0));
        assert!(p.scroll_enabled);

        let max = menu.n_items() - p.cell_bounds.len();
        for _ in 0..100 {
            p.scroll_down(menu.n_items());
        }
        assert_eq!(p.scroll_offset, max);
        for _ in 0..100 {
            p.scroll_up();
        }
        assert_eq!(p.scroll_offset, 0);
    }

    #[test]
    fn scrolled_cells_map_to_shifted_item_indices() {
        let mut style = MenuStyle::default();
        style.scroll_if_too_big = true;
        let names: Vec<String> = (0..30).map(|i| format!("item {i}")).collect();
        let menu = Menu::with_items("m", names);
        let mut p = panel(&style, &menu, Point::new(0.0, 0.0));

        assert_eq!(p.item_index(0), 0);
        p.scroll_down(menu.n_items());
        p.scroll_down(menu.n_items());
        assert_eq!(p.item_index(0), 2);
        assert_eq!(p.item_index(3), 5);
    }

    #[test]
    fn hit_test_respects_enablement_and_misses() {
        let style = MenuStyle::default();
        let mut menu = Menu::new("m");
        menu.add("on");
        menu.push(MenuItem::new("off").disabled());
        let p = panel(&style, &menu, Point::new(0.0, 0.0));

        let inside = |cell: Rect| cell.center();
        assert_eq!(p.hit_test(&menu, inside(p.cell_bounds[0])), Some(0));
        assert_eq!(p.hit_test(&menu, inside(p.cell_bounds[1])), None);
        assert_eq!(p.hit_test(&menu, Point::new(-10.0, -10.0)), None);
    }

    #[test]
    fn expanded_override_replaces_target_rect() {
        let style = MenuStyle::default();
        let menu = Menu::with_items("m", ["a"]);
        let forced = Rect::new(0.0, 0.0, 222.0, 111.0);
        let p = MenuPanel::new(
            &style,
            SCREEN,
            Some(forced),
            &menu,
            Point::new(10.0, 10.0),
            None,
            Vec::new(),
            &mut FixedAdvance::default(),
        );

        assert_eq!(p.target_rect, forced);
        assert_eq!(p.draw_rect, forced.padded(style.drop_shadow_size));
    }

    #[test]
    fn natural_size_accounts_for_gaps_and_padding() {
        let style = MenuStyle::default();
        let menu = Menu::with_items("m", ["a", "b"]);
        let mut m = FixedAdvance::default();
        let size = MenuPanel::natural_size(&style, &menu, &mut m);
        let cell = MenuPanel::largest_cell_size(&style, &menu, &mut m);

        assert_eq!(size.width, cell.width + 2.0 * style.padding);
        assert_eq!(
            size.height,
            2.0 * cell.height + style.cell_gap + 2.0 * style.padding
        );
    }
}
