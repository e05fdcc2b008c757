use std::time::Duration;

use kurbo::{Point, Rect, Size};
use tracing::{debug, trace};

use crate::{
    geom::{CardinalDir, RectExt},
    menu::Menu,
    panel::MenuPanel,
    render::{MenuRenderer, Surface},
    style::{MenuStyle, TextStyle},
    text::MeasureText,
};

/// Base duration of one animation phase. Submenu fade-ins run at twice this
/// to hide layout jitter while the new panel settles.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(100);

/// Animation/visibility state of the control. `Collapsed` is both initial
/// and terminal; dismissal chains `Flickering → Collapsing → Idling →
/// Collapsed`, one animation phase each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupState {
    Collapsed,
    Expanding,
    Expanded,
    SubMenuAppearing,
    Flickering,
    Collapsing,
    Idling,
}

/// A weak reference to one cell: indices into the panel arena and into that
/// panel's cell list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRef {
    pub panel: usize,
    pub cell: usize,
}

/// What the control needs from the embedding UI. All methods are called from
/// the UI thread, re-entrancy free.
///
/// `mark_dirty(true)` must arm the animation scheduler for
/// [`PopupMenu::animation_duration`] and then drive
/// [`PopupMenu::animation_frame`] once per display refresh with normalized
/// progress; a progress value above 1.0 ends the phase.
pub trait Host {
    fn measure_text(&mut self, style: &TextStyle, text: &str) -> Size;
    fn mark_dirty(&mut self, trigger_animation: bool);
    fn set_tooltips_enabled(&mut self, enabled: bool);
    /// A click landed; `menu` is the level it landed in, with its chosen
    /// index recorded (or cleared) beforehand.
    fn on_menu_selection(&mut self, menu: &Menu);
}

struct HostMeasure<'a>(&'a mut dyn Host);

impl MeasureText for HostMeasure<'_> {
    fn measure(&mut self, style: &TextStyle, text: &str) -> Size {
        self.0.measure_text(style, text)
    }
}

/// A popup menu that stays within a configured bounds rect, animating
/// open/closed and materializing submenu panels as the pointer moves.
///
/// Panels are owned in a flat arena; parent/child structure is index-based
/// (`MenuPanel::parent`). The control owns the [`Menu`] for the duration of
/// a session and hands results back through the menu's chosen-index slot,
/// its completion callback and [`Host::on_menu_selection`].
pub struct PopupMenu {
    style: MenuStyle,
    state: PopupState,
    menu: Option<Menu>,
    anchor: Option<Rect>,
    max_bounds: Rect,
    collapsed_bounds: Rect,
    expanded_override: Option<Rect>,
    callout: bool,
    callout_dir: CardinalDir,
    callout_arrow: Option<Rect>,
    forced_south: bool,
    panels: Vec<MenuPanel>,
    active: Option<usize>,
    appearing: Option<usize>,
    mouse_cell: Option<CellRef>,
    prev_mouse_cell: Option<CellRef>,
    submenu_open: bool,
    /// Visual bounds the host should repaint (unions of panel draw rects).
    draw_bounds: Rect,
    /// Interactive bounds (unions of panel target rects).
    target_bounds: Rect,
}

impl PopupMenu {
    pub fn new(style: MenuStyle, max_bounds: Rect) -> Self {
        Self {
            style,
            state: PopupState::Collapsed,
            menu: None,
            anchor: None,
            max_bounds,
            collapsed_bounds: Rect::ZERO,
            expanded_override: None,
            callout: false,
            callout_dir: CardinalDir::East,
            callout_arrow: None,
            forced_south: false,
            panels: Vec::new(),
            active: None,
            appearing: None,
            mouse_cell: None,
            prev_mouse_cell: None,
            submenu_open: false,
            draw_bounds: Rect::ZERO,
            target_bounds: Rect::ZERO,
        }
    }

    /// The screen region the menu may occupy.
    pub fn set_max_bounds(&mut self, bounds: Rect) {
        self.max_bounds = bounds;
    }

    /// Bounds the control occupies while collapsed (usually empty).
    pub fn set_collapsed_bounds(&mut self, bounds: Rect) {
        self.collapsed_bounds = bounds;
    }

    /// Force the expanded panel's target rect instead of sizing to content.
    pub fn set_expanded_bounds(&mut self, bounds: Option<Rect>) {
        self.expanded_override = bounds;
    }

    /// Draw a pointing callout arrow between the anchor and the panel.
    pub fn set_callout(&mut self, callout: bool) {
        self.callout = callout;
    }

    /// Touch-friendly mode: always place directly below the anchor when it
    /// fits.
    pub fn set_forced_south(&mut self, forced_south: bool) {
        self.forced_south = forced_south;
    }

    pub fn style(&self) -> &MenuStyle {
        &self.style
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == PopupState::Expanded
    }

    /// Any state above collapsed keeps the control repainting.
    pub fn needs_redraw(&self) -> bool {
        self.state != PopupState::Collapsed
    }

    pub fn panels(&self) -> &[MenuPanel] {
        &self.panels
    }

    pub fn active_panel(&self) -> Option<&MenuPanel> {
        self.active.and_then(|i| self.panels.get(i))
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.menu.as_ref()
    }

    /// Reclaim the session menu (typically after collapse, to read results).
    pub fn take_menu(&mut self) -> Option<Menu> {
        self.menu.take()
    }

    pub fn draw_bounds(&self) -> Rect {
        self.draw_bounds
    }

    pub fn target_bounds(&self) -> Rect {
        self.target_bounds
    }

    pub fn callout_dir(&self) -> CardinalDir {
        self.callout_dir
    }

    pub fn callout_arrow(&self) -> Option<Rect> {
        self.callout_arrow
    }

    pub fn submenu_open(&self) -> bool {
        self.submenu_open
    }

    /// Duration the host should use when arming the animation for the
    /// current phase.
    pub fn animation_duration(&self) -> Duration {
        if self.state == PopupState::SubMenuAppearing {
            DEFAULT_ANIMATION_DURATION * 2
        } else {
            DEFAULT_ANIMATION_DURATION
        }
    }

    /// Begin a session: take ownership of `menu`, place the root panel
    /// relative to `anchor` and start the expand animation.
    #[tracing::instrument(skip_all)]
    pub fn open(&mut self, menu: Menu, anchor: Rect, host: &mut dyn Host) {
        self.menu = Some(menu);
        self.anchor = Some(anchor);
        self.expand(host);
    }

    fn expand(&mut self, host: &mut dyn Host) {
        let Some(menu) = self.menu.as_ref() else {
            return;
        };
        let anchor = self.anchor.unwrap_or_default();

        self.state = PopupState::Expanding;
        host.set_tooltips_enabled(false);
        self.panels.clear();

        let natural = MenuPanel::natural_size(&self.style, menu, &mut HostMeasure(&mut *host));
        let gap = if self.callout {
            self.style.callout_size
        } else {
            0.0
        };
        let (origin, dir) = place_root(
            &self.style,
            self.max_bounds,
            anchor,
            natural,
            self.forced_south,
            menu.has_submenus(),
            gap,
        );
        self.callout_dir = dir;
        self.callout_arrow = self
            .callout
            .then(|| callout_arrow_rect(anchor, dir, self.style.callout_size));

        let panel = MenuPanel::new(
            &self.style,
            self.max_bounds,
            self.expanded_override,
            menu,
            origin,
            None,
            Vec::new(),
            &mut HostMeasure(&mut *host),
        );
        self.target_bounds = panel.target_rect;
        self.draw_bounds = panel.draw_rect;
        self.panels.push(panel);
        self.active = Some(0);
        self.appearing = Some(0);

        debug!(?origin, ?dir, "menu expanding");
        host.mark_dirty(true);
    }

    fn hit_active(&self, p: Point) -> Option<CellRef> {
        let active = self.active?;
        let panel = self.panels.get(active)?;
        let menu = self.menu.as_ref()?.menu_at(&panel.menu_path)?;
        panel
            .hit_test(menu, p)
            .map(|cell| CellRef { panel: active, cell })
    }

    pub fn on_mouse_down(&mut self, p: Point, host: &mut dyn Host) {
        if self.state == PopupState::Expanded {
            self.mouse_cell = self.hit_active(p);
            self.collapse_everything(host);
        }
    }

    pub fn on_mouse_drag(&mut self, p: Point, host: &mut dyn Host) {
        self.mouse_cell = self.hit_active(p);
        self.calculate_menu_panels(host);
    }

    pub fn on_mouse_over(&mut self, p: Point, host: &mut dyn Host) {
        self.mouse_cell = self.hit_active(p);

        // outside the active panel: the pointer may be over an ancestor
        // panel (or nothing at all)
        if self.mouse_cell.is_none() {
            for i in (0..self.panels.len()).rev() {
                if self.panels[i].should_draw && self.panels[i].draw_rect.contains(p) {
                    self.active = Some(i);
                    self.mouse_cell = self.hit_active(p);
                    break;
                }
            }
        }

        if self.mouse_cell != self.prev_mouse_cell {
            self.calculate_menu_panels(host);
        }
        self.prev_mouse_cell = self.mouse_cell;
    }

    pub fn on_mouse_out(&mut self) {
        self.mouse_cell = None;
    }

    /// Page the active panel when it carries a scroll window.
    pub fn on_mouse_wheel(&mut self, _p: Point, delta: f64, host: &mut dyn Host) {
        if self.state != PopupState::Expanded {
            return;
        }
        let Some(active) = self.active else { return };
        let n_items = self
            .menu
            .as_ref()
            .and_then(|m| m.menu_at(&self.panels[active].menu_path))
            .map(Menu::n_items)
            .unwrap_or(0);
        let panel = &mut self.panels[active];
        if panel.scroll_enabled {
            if delta > 0.0 {
                panel.scroll_up();
            } else {
                panel.scroll_down(n_items);
            }
            host.mark_dirty(false);
        }
    }

    /// One-step reconciliation of which submenu branch is visible, re-run
    /// whenever the hovered cell changes. Only one leaf branch is ever open.
    fn calculate_menu_panels(&mut self, host: &mut dyn Host) {
        let Some(active_idx) = self.active else {
            host.mark_dirty(false);
            return;
        };
        let Some(mouse) = self.mouse_cell else {
            host.mark_dirty(false);
            return;
        };
        if mouse.panel != active_idx {
            host.mark_dirty(false);
            return;
        }

        let (item_idx, cell_rect, active_path) = match self.panels.get(active_idx) {
            Some(p) => match p.cell(mouse.cell) {
                Some(cell) => (p.item_index(mouse.cell), cell, p.menu_path.clone()),
                None => {
                    host.mark_dirty(false);
                    return;
                }
            },
            None => {
                host.mark_dirty(false);
                return;
            }
        };

        let Some(root) = self.menu.as_ref() else {
            host.mark_dirty(false);
            return;
        };
        let Some(level) = root.menu_at(&active_path) else {
            host.mark_dirty(false);
            return;
        };
        let Some(item) = level.item(item_idx) else {
            // stale scroll window; do nothing further this frame
            host.mark_dirty(false);
            return;
        };

        if let Some(submenu) = item.submenu() {
            let mut sub_path = active_path.clone();
            sub_path.push(item_idx);

            let existing = self.panels.iter().position(|p| p.menu_path == sub_path);
            for (i, p) in self.panels.iter_mut().enumerate() {
                p.should_draw = existing == Some(i);
            }
            self.panels[active_idx].highlighted_cell =
                item.is_enabled().then_some(mouse.cell);

            let shown = match existing {
                Some(i) => i,
                None => {
                    trace!(path = ?sub_path, "materializing submenu panel");
                    let natural =
                        MenuPanel::natural_size(&self.style, submenu, &mut HostMeasure(&mut *host));
                    let origin =
                        place_submenu(&self.style, self.max_bounds, cell_rect, natural);
                    let panel = MenuPanel::new(
                        &self.style,
                        self.max_bounds,
                        None,
                        submenu,
                        origin,
                        Some(active_idx),
                        sub_path,
                        &mut HostMeasure(&mut *host),
                    );
                    self.panels.push(panel);
                    self.panels.len() - 1
                }
            };
            self.submenu_open = true;

            // keep the whole ancestor chain of the visible branch drawn and
            // widen the control bounds to cover it
            for mr in 0..self.panels.len() {
                if !self.panels[mr].should_draw {
                    continue;
                }
                let mut draw = self.panels[mr].draw_rect;
                let mut target = self.panels[mr].target_rect;
                let mut parent = self.panels[mr].parent;
                while let Some(pi) = parent {
                    self.panels[pi].should_draw = true;
                    draw = draw.union(self.panels[pi].draw_rect);
                    target = target.union(self.panels[pi].target_rect);
                    parent = self.panels[pi].parent;
                }
                self.draw_bounds = self.draw_bounds.union(draw);
                self.target_bounds = self.target_bounds.union(target);

                if self.appearing != Some(mr) {
                    self.state = PopupState::SubMenuAppearing;
                    self.appearing = Some(shown);
                }
                host.mark_dirty(true);
                break;
            }
        } else {
            // hovering a plain item hides any open child of the active panel
            for i in 0..self.panels.len() {
                if self.panels[i].parent == Some(active_idx) {
                    self.panels[active_idx].highlighted_cell = None;
                    self.panels[i].should_draw = false;
                    self.submenu_open = false;
                }
            }
        }

        host.mark_dirty(false);
    }

    /// Click while expanded: record the selection (if the hit cell is
    /// choosable), fire the callbacks and start the teardown chain.
    #[tracing::instrument(skip_all)]
    fn collapse_everything(&mut self, host: &mut dyn Host) {
        if let Some(active_idx) = self.active {
            let path = self.panels[active_idx].menu_path.clone();

            let mut chosen = None;
            if let Some(mouse) = self.mouse_cell {
                if mouse.panel == active_idx {
                    let item_idx = self.panels[active_idx].item_index(mouse.cell);
                    let choosable = self
                        .menu
                        .as_ref()
                        .and_then(|m| m.menu_at(&path))
                        .and_then(|level| level.item(item_idx))
                        .is_some_and(|item| item.is_choosable());
                    if choosable {
                        chosen = Some(item_idx);
                        self.panels[active_idx].clicked_cell = Some(mouse.cell);
                    }
                }
            }

            if let Some(level) = self
                .menu
                .as_mut()
                .and_then(|m| m.menu_at_mut(&path))
            {
                level.set_chosen_index(chosen);
            }

            // completion callback lives on the root menu; it receives the
            // level the click landed in
            if let Some(root) = self.menu.as_mut() {
                if let Some(mut cb) = root.take_on_select() {
                    if let Some(level) = root.menu_at(&path) {
                        cb(level);
                    }
                    root.restore_on_select(Some(cb));
                }
            }
            if let Some(level) = self.menu.as_ref().and_then(|m| m.menu_at(&path)) {
                host.on_menu_selection(level);
            }

            debug!(?chosen, "menu dismissed");
        }

        self.submenu_open = false;
        self.active = None;
        self.state = PopupState::Flickering;
        host.mark_dirty(true);
    }

    /// Per-frame animation callback. Progress above 1.0 ends the phase,
    /// which either finalizes the state or re-arms the next phase of the
    /// teardown chain.
    pub fn animation_frame(&mut self, progress: f64, host: &mut dyn Host) {
        if progress > 1.0 {
            self.on_end_animation(host);
            return;
        }

        let opacity = self.style.opacity;
        match self.state {
            PopupState::Expanding => {
                if let Some(p) = self.appearing.and_then(|i| self.panels.get_mut(i)) {
                    p.blend_weight = progress as f32 * opacity;
                }
            }
            PopupState::SubMenuAppearing => {
                // submenus snap in near the end rather than fading, hiding
                // intermediate layout jitter
                if let Some(p) = self.appearing.and_then(|i| self.panels.get_mut(i)) {
                    p.blend_weight = if progress > 0.9 { opacity } else { 0.0 };
                }
            }
            PopupState::Collapsing => {
                for p in &mut self.panels {
                    p.blend_weight = (1.0 - progress) as f32 * opacity;
                }
            }
            PopupState::Idling => {
                // one fully transparent frame before geometry is reset
                for p in &mut self.panels {
                    p.blend_weight = 0.0;
                }
            }
            _ => {}
        }
    }

    fn on_end_animation(&mut self, host: &mut dyn Host) {
        debug!(state = ?self.state, "animation phase complete");
        match self.state {
            PopupState::Expanding | PopupState::SubMenuAppearing => {
                for p in &mut self.panels {
                    p.blend_weight = self.style.opacity;
                }
                self.state = PopupState::Expanded;
            }
            PopupState::Flickering => {
                self.state = PopupState::Collapsing;
                host.mark_dirty(true); // re-arm, don't finalize
            }
            PopupState::Collapsing => {
                self.target_bounds = self.collapsed_bounds;
                for p in &mut self.panels {
                    p.blend_weight = 0.0;
                }
                self.mouse_cell = None;
                self.prev_mouse_cell = None;
                self.anchor = None;
                self.state = PopupState::Idling;
                host.mark_dirty(true); // re-arm, don't finalize
            }
            PopupState::Idling => {
                host.set_tooltips_enabled(true);
                self.panels.clear();
                self.active = None;
                self.appearing = None;
                self.callout_arrow = None;
                self.draw_bounds = self.collapsed_bounds;
                self.state = PopupState::Collapsed;
            }
            _ => {}
        }
    }

    /// Render the visible branch: chrome then cells for each drawn panel,
    /// plus the callout arrow when configured.
    pub fn draw(&self, g: &mut dyn Surface, r: &dyn MenuRenderer) {
        let Some(root) = self.menu.as_ref() else {
            return;
        };
        let flickering = self.state == PopupState::Flickering;

        for (panel_idx, panel) in self.panels.iter().enumerate() {
            if !panel.should_draw {
                continue;
            }
            let Some(menu) = root.menu_at(&panel.menu_path) else {
                continue;
            };
            let blend = panel.blend_weight;

            r.draw_shadow(g, &self.style, panel.draw_rect, blend);
            r.draw_background(g, &self.style, panel.target_rect, blend);

            for (i, cell) in panel.cell_bounds.iter().enumerate() {
                let Some(item) = menu.item(panel.item_index(i)) else {
                    return;
                };

                if item.is_separator() {
                    r.draw_separator(g, &self.style, *cell, blend);
                    continue;
                }

                let cell_ref = CellRef {
                    panel: panel_idx,
                    cell: i,
                };
                let highlighted =
                    self.mouse_cell == Some(cell_ref) || panel.highlighted_cell == Some(i);

                if highlighted {
                    if panel.clicked_cell.is_some() {
                        r.draw_clicked_cell_background(
                            g,
                            &self.style,
                            *cell,
                            item,
                            blend,
                            flickering,
                        );
                    } else {
                        r.draw_highlighted_cell_background(g, &self.style, *cell, item, blend);
                    }
                    r.draw_highlighted_cell_text(g, &self.style, *cell, item, blend);
                    if item.is_checked() {
                        r.draw_tick(g, &self.style, *cell, item, blend, true);
                    }
                    if item.submenu().is_some() {
                        r.draw_submenu_arrow(g, &self.style, *cell, item, blend, true);
                    }
                } else {
                    r.draw_cell_background(g, &self.style, *cell, item, blend);
                    r.draw_cell_text(g, &self.style, *cell, item, blend);
                    if item.is_checked() {
                        r.draw_tick(g, &self.style, *cell, item, blend, false);
                    }
                    if item.submenu().is_some() {
                        r.draw_submenu_arrow(g, &self.style, *cell, item, blend, false);
                    }
                }
            }
        }

        if let Some(arrow) = self.callout_arrow {
            let blend = self.panels.first().map(|p| p.blend_weight).unwrap_or(0.0);
            r.draw_callout_arrow(g, &self.style, arrow, self.callout_dir, blend);
        }
    }
}

/// Root-panel placement ladder: prefer beside the anchor, fall back to
/// below/above it, and always end fully inside `max_bounds`.
fn place_root(
    style: &MenuStyle,
    b: Rect,
    anchor: Rect,
    size: Size,
    forced_south: bool,
    has_submenus: bool,
    gap: f64,
) -> (Point, CardinalDir) {
    let (w, h) = (size.width, size.height);

    // touch mode: directly below whenever it fits
    if forced_south {
        let y = anchor.y1 + gap;
        if y + h <= b.y1 {
            let x = clamp_span(anchor.center().x - w / 2.0, b.x0, b.x1, w);
            return (Point::new(x, y), CardinalDir::South);
        }
    }

    let east = anchor.center().x < b.center().x;
    let mut dir = if east {
        CardinalDir::East
    } else {
        CardinalDir::West
    };
    let mut x = if east {
        anchor.x1 + gap
    } else {
        anchor.x0 - gap - w
    };
    let mut y = anchor.center().y - h / 2.0;
    if anchor.center().y > b.center().y {
        // lower-half anchors bias the panel upward
        y -= h * 0.25;
    }

    let clips = x < b.x0 || x + w > b.x1 || y < b.y0 || y + h > b.y1;
    if clips {
        // submenu chains need room to breathe: pick the side with more
        // space instead of going by which half the anchor sits in
        let prefer_south = if has_submenus {
            (b.y1 - anchor.y1) >= (anchor.y0 - b.y0)
        } else {
            anchor.center().y <= b.center().y
        };

        if prefer_south {
            let sy = anchor.y1 + gap;
            if sy + h <= b.y1 {
                dir = CardinalDir::South;
                x = anchor.center().x - w / 2.0;
                y = sy;
            }
        } else {
            let ny = anchor.y0 - gap - h;
            if ny >= b.y0 {
                dir = CardinalDir::North;
                x = anchor.center().x - w / 2.0;
                y = ny;
            }
        }
    }

    if has_submenus {
        // shift away from the vertical screen edges so child panels have
        // somewhere to go
        if x - style.menu_shift < b.x0 {
            x += style.menu_shift;
        } else if x + w + style.menu_shift > b.x1 {
            x -= style.menu_shift;
        }
    }

    let x = clamp_span(x, b.x0, b.x1, w);
    let y = clamp_span(y, b.y0, b.y1, h);
    (Point::new(x, y), dir)
}

/// Submenu placement: to the right of the parent cell, flipped left when
/// that would clip, with the top clamped into bounds.
fn place_submenu(style: &MenuStyle, b: Rect, cell: Rect, size: Size) -> Point {
    let mut x = cell.x1 + style.padding;
    if x + size.width > b.x1 {
        x = cell.x0 - style.padding - size.width;
    }
    let x = clamp_span(x, b.x0, b.x1, size.width);
    let y = clamp_span(cell.y0, b.y0, b.y1, size.height);
    Point::new(x, y)
}

/// Clamp `pos` so `[pos, pos + len]` sits inside `[lo, hi]`, preferring to
/// keep the start edge visible when `len` exceeds the span.
fn clamp_span(pos: f64, lo: f64, hi: f64, len: f64) -> f64 {
    pos.min(hi - len).max(lo)
}

fn callout_arrow_rect(anchor: Rect, dir: CardinalDir, size: f64) -> Rect {
    let c = anchor.center();
    match dir {
        CardinalDir::East => Rect::new(anchor.x1, c.y - size / 2.0, anchor.x1 + size, c.y + size / 2.0),
        CardinalDir::West => Rect::new(anchor.x0 - size, c.y - size / 2.0, anchor.x0, c.y + size / 2.0),
        CardinalDir::South => Rect::new(c.x - size / 2.0, anchor.y1, c.x + size / 2.0, anchor.y1 + size),
        CardinalDir::North => Rect::new(c.x - size / 2.0, anchor.y0 - size, c.x + size / 2.0, anchor.y0),
    }
}
