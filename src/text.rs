use kurbo::Size;

use crate::{
    error::{PlumeError, PlumeResult},
    render::Rgba8,
    style::TextStyle,
};

/// Text measurement as the layout code consumes it: the tight extent of a
/// single line of styled text.
pub trait MeasureText {
    fn measure(&mut self, style: &TextStyle, text: &str) -> Size;
}

/// Parley-backed measurer. Shapes a single unwrapped line and reports the
/// layout extent. Fonts come from the system collection; `register_font` can
/// pin an explicit face from raw bytes instead.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family_override: Option<String>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family_override: None,
        }
    }

    /// Register a font from raw bytes and use its family for all subsequent
    /// measurement, regardless of the style's family.
    pub fn register_font(&mut self, font_bytes: &[u8]) -> PlumeResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PlumeError::text("no font families registered from font bytes"))?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PlumeError::text("registered font family has no name"))?
            .to_string();
        self.family_override = Some(family_name.clone());
        Ok(family_name)
    }

    fn layout_line(&mut self, style: &TextStyle, text: &str) -> parley::Layout<Rgba8> {
        let family = self
            .family_override
            .clone()
            .unwrap_or_else(|| style.family.clone());

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl MeasureText for TextShaper {
    fn measure(&mut self, style: &TextStyle, text: &str) -> Size {
        if text.is_empty() {
            return Size::new(0.0, f64::from(style.size_px));
        }
        let layout = self.layout_line(style, text);
        Size::new(f64::from(layout.width()), f64::from(layout.height()))
    }
}

/// Deterministic fixed-advance measurer for headless hosts and tests: every
/// character is `advance` wide, every line is `line_height` tall.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvance {
    pub advance: f64,
    pub line_height: f64,
}

impl Default for FixedAdvance {
    fn default() -> Self {
        Self {
            advance: 8.0,
            line_height: 16.0,
        }
    }
}

impl MeasureText for FixedAdvance {
    fn measure(&mut self, _style: &TextStyle, text: &str) -> Size {
        Size::new(
            text.chars().count() as f64 * self.advance,
            self.line_height,
        )
    }
}
