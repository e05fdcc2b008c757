use crate::error::{PlumeError, PlumeResult};

/// Text styling used for cell text measurement and drawing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    pub family: String,
    pub size_px: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size_px: 14.0,
        }
    }
}

/// Layout and appearance constants for the popup menu. Defaults mirror the
/// stock control: 5px padding, 2px cell gap, 2px separators, 10px drop
/// shadow, 0.95 opacity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MenuStyle {
    /// White space between the panel background edge and the cells.
    pub padding: f64,
    /// Vertical gap between adjacent cells.
    pub cell_gap: f64,
    /// Row height consumed by a separator item.
    pub separator_size: f64,
    /// Corner radius of the panel background.
    pub roundness: f64,
    /// Drop-shadow margin added around the panel's target rect.
    pub drop_shadow_size: f64,
    /// Panel opacity when fully expanded, in [0, 1].
    pub opacity: f32,
    /// Width of the checkmark gutter on the left of each cell.
    pub tick_size: f64,
    /// Width of the submenu-arrow gutter on the right of each cell.
    pub arrow_size: f64,
    /// Horizontal padding applied around measured item text.
    pub text_hpad: f64,
    /// Items per column before wrapping to a new column; 0 = no limit.
    pub max_column_items: usize,
    /// Page within one column instead of wrapping when the menu is too tall.
    pub scroll_if_too_big: bool,
    /// How far submenu-bearing menus shift away from screen edges.
    pub menu_shift: f64,
    /// Size of the callout arrow and the gap it keeps from the anchor.
    pub callout_size: f64,
    pub text: TextStyle,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self {
            padding: 5.0,
            cell_gap: 2.0,
            separator_size: 2.0,
            roundness: 5.0,
            drop_shadow_size: 10.0,
            opacity: 0.95,
            tick_size: 10.0,
            arrow_size: 8.0,
            text_hpad: 5.0,
            max_column_items: 0,
            scroll_if_too_big: false,
            menu_shift: 10.0,
            callout_size: 8.0,
            text: TextStyle::default(),
        }
    }
}

impl MenuStyle {
    pub fn from_json(json: &str) -> PlumeResult<Self> {
        let style: Self = serde_json::from_str(json)
            .map_err(|e| PlumeError::validation(format!("invalid style json: {e}")))?;
        style.validate()?;
        Ok(style)
    }

    pub fn validate(&self) -> PlumeResult<()> {
        let non_negative = [
            ("padding", self.padding),
            ("cell_gap", self.cell_gap),
            ("separator_size", self.separator_size),
            ("roundness", self.roundness),
            ("drop_shadow_size", self.drop_shadow_size),
            ("tick_size", self.tick_size),
            ("arrow_size", self.arrow_size),
            ("text_hpad", self.text_hpad),
            ("menu_shift", self.menu_shift),
            ("callout_size", self.callout_size),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PlumeError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(PlumeError::validation("opacity must be within [0, 1]"));
        }
        if !self.text.size_px.is_finite() || self.text.size_px <= 0.0 {
            return Err(PlumeError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        MenuStyle::default().validate().unwrap();
    }

    #[test]
    fn json_overrides_merge_with_defaults() {
        let style =
            MenuStyle::from_json(r#"{ "padding": 8.0, "scroll_if_too_big": true }"#).unwrap();
        assert_eq!(style.padding, 8.0);
        assert!(style.scroll_if_too_big);
        assert_eq!(style.cell_gap, MenuStyle::default().cell_gap);
    }

    #[test]
    fn out_of_range_opacity_is_rejected() {
        let err = MenuStyle::from_json(r#"{ "opacity": 1.5 }"#).unwrap_err();
        assert!(err.to_string().contains("opacity"));
    }

    #[test]
    fn negative_padding_is_rejected() {
        let mut style = MenuStyle::default();
        style.padding = -1.0;
        assert!(style.validate().is_err());
    }
}
