use kurbo::{Point, Rect, Size};

use crate::{
    geom::{CardinalDir, RectExt},
    menu::MenuItem,
    style::{MenuStyle, TextStyle},
};

/// Straight (non-premultiplied) RGBA color. Doubles as the Parley text brush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const GRAY: Self = Self::new(127, 127, 127, 255);
    pub const MID_GRAY: Self = Self::new(200, 200, 200, 255);
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    pub const SHADOW: Self = Self::new(0, 0, 0, 96);
}

/// The primitive drawing ops the menu needs from a backend. `blend` is the
/// panel's current opacity weight in [0, 1].
pub trait Surface {
    fn fill_rect(&mut self, color: Rgba8, rect: Rect, blend: f32);
    fn fill_round_rect(&mut self, color: Rgba8, rect: Rect, radius: f64, blend: f32);
    fn fill_triangle(&mut self, color: Rgba8, a: Point, b: Point, c: Point, blend: f32);
    fn draw_text(&mut self, style: &TextStyle, text: &str, color: Rgba8, rect: Rect, blend: f32);
}

fn tick_rect(style: &MenuStyle, cell: Rect) -> Rect {
    Rect::new(cell.x0, cell.y0, cell.x0 + style.tick_size, cell.y1)
        .centred_inside(Size::new(style.tick_size, style.tick_size))
}

fn text_rect(style: &MenuStyle, cell: Rect) -> Rect {
    let tick = tick_rect(style, cell);
    Rect::new(
        tick.x1 + style.text_hpad,
        cell.y0,
        cell.x1 - style.text_hpad,
        cell.y1,
    )
}

/// Rendering strategy for panel chrome and cells. Every method has a stock
/// implementation; override the ones a skin needs to change.
pub trait MenuRenderer {
    fn draw_background(&self, g: &mut dyn Surface, style: &MenuStyle, bounds: Rect, blend: f32) {
        g.fill_round_rect(Rgba8::WHITE, bounds, style.roundness, blend);
    }

    fn draw_shadow(&self, g: &mut dyn Surface, style: &MenuStyle, bounds: Rect, blend: f32) {
        let offset = style.drop_shadow_size / 2.0;
        let shadow = bounds
            .padded(-style.drop_shadow_size)
            .at_origin(Point::new(bounds.x0 + offset, bounds.y0 + offset));
        g.fill_round_rect(Rgba8::SHADOW, shadow, style.roundness, blend);
    }

    fn draw_cell_background(
        &self,
        _g: &mut dyn Surface,
        _style: &MenuStyle,
        _bounds: Rect,
        _item: &MenuItem,
        _blend: f32,
    ) {
    }

    fn draw_highlighted_cell_background(
        &self,
        g: &mut dyn Surface,
        style: &MenuStyle,
        bounds: Rect,
        _item: &MenuItem,
        blend: f32,
    ) {
        g.fill_rect(Rgba8::BLUE, bounds.h_padded(style.padding), blend);
    }

    /// Clicked-cell background is suppressed while the control flickers, so
    /// the selection visibly blinks once before the menu fades.
    fn draw_clicked_cell_background(
        &self,
        g: &mut dyn Surface,
        style: &MenuStyle,
        bounds: Rect,
        item: &MenuItem,
        blend: f32,
        flickering: bool,
    ) {
        if !flickering {
            self.draw_highlighted_cell_background(g, style, bounds, item, blend);
        }
    }

    fn draw_cell_text(
        &self,
        g: &mut dyn Surface,
        style: &MenuStyle,
        bounds: Rect,
        item: &MenuItem,
        blend: f32,
    ) {
        let color = if item.is_enabled() {
            Rgba8::BLACK
        } else {
            Rgba8::GRAY
        };
        g.draw_text(&style.text, item.text(), color, text_rect(style, bounds), blend);
    }

    fn draw_highlighted_cell_text(
        &self,
        g: &mut dyn Surface,
        style: &MenuStyle,
        bounds: Rect,
        item: &MenuItem,
        blend: f32,
    ) {
        g.draw_text(
            &style.text,
            item.text(),
            Rgba8::WHITE,
            text_rect(style, bounds),
            blend,
        );
    }

    fn draw_tick(
        &self,
        g: &mut dyn Surface,
        style: &MenuStyle,
        bounds: Rect,
        _item: &MenuItem,
        blend: f32,
        highlighted: bool,
    ) {
        let color = if highlighted {
            Rgba8::WHITE
        } else {
            Rgba8::BLACK
        };
        let half = style.tick_size / 2.0;
        let dot = tick_rect(style, bounds).centred_inside(Size::new(half, half));
        g.fill_round_rect(color, dot, 2.0, blend);
    }

    fn draw_submenu_arrow(
        &self,
        g: &mut dyn Surface,
        style: &MenuStyle,
        bounds: Rect,
        _item: &MenuItem,
        blend: f32,
        highlighted: bool,
    ) {
        let color = if highlighted {
            Rgba8::WHITE
        } else {
            Rgba8::BLACK
        };
        let tri = Rect::new(
            bounds.x1 - style.arrow_size,
            bounds.y0 + 2.0,
            bounds.x1 - 2.0,
            bounds.y1 - 2.0,
        );
        g.fill_triangle(
            color,
            Point::new(tri.x0, tri.y0),
            Point::new(tri.x0, tri.y1),
            Point::new(tri.x1, tri.center().y),
            blend,
        );
    }

    fn draw_separator(&self, g: &mut dyn Surface, _style: &MenuStyle, bounds: Rect, blend: f32) {
        // only draw once the panel is essentially opaque
        if blend > 0.9 {
            g.fill_rect(Rgba8::MID_GRAY, bounds, 0.25);
        }
    }

    /// Arrow pointing from the panel back toward the anchor. `dir` is the
    /// side of the anchor the panel sits on.
    fn draw_callout_arrow(
        &self,
        g: &mut dyn Surface,
        _style: &MenuStyle,
        bounds: Rect,
        dir: CardinalDir,
        blend: f32,
    ) {
        let (a, b, c) = match dir {
            // panel east of the anchor, arrow points west
            CardinalDir::East => (
                Point::new(bounds.x1, bounds.y0),
                Point::new(bounds.x1, bounds.y1),
                Point::new(bounds.x0, bounds.center().y),
            ),
            CardinalDir::West => (
                Point::new(bounds.x0, bounds.y0),
                Point::new(bounds.x0, bounds.y1),
                Point::new(bounds.x1, bounds.center().y),
            ),
            // panel below the anchor, arrow points up
            CardinalDir::South => (
                Point::new(bounds.x0, bounds.y1),
                Point::new(bounds.x1, bounds.y1),
                Point::new(bounds.center().x, bounds.y0),
            ),
            CardinalDir::North => (
                Point::new(bounds.x0, bounds.y0),
                Point::new(bounds.x1, bounds.y0),
                Point::new(bounds.center().x, bounds.y1),
            ),
        };
        g.fill_triangle(Rgba8::WHITE, a, b, c, blend);
    }
}

/// The stock look: white rounded panels, blue highlight, black text.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRenderer;

impl MenuRenderer for DefaultRenderer {}
