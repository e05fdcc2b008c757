use std::fmt;

/// Invoked synchronously when a choosable item is clicked. Receives the menu
/// level the click landed in, with its chosen index already recorded.
pub type MenuCallback = Box<dyn FnMut(&Menu)>;

/// One entry of a [`Menu`]: display text, state flags and an optional
/// submenu. Titles, separators, disabled items and submenu carriers are all
/// non-choosable.
#[derive(Debug)]
pub struct MenuItem {
    text: String,
    enabled: bool,
    checked: bool,
    title: bool,
    separator: bool,
    tag: Option<i64>,
    submenu: Option<Box<Menu>>,
}

impl MenuItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            enabled: true,
            checked: false,
            title: false,
            separator: false,
            tag: None,
            submenu: None,
        }
    }

    pub fn separator() -> Self {
        let mut item = Self::new("");
        item.separator = true;
        item
    }

    pub fn title(text: impl Into<String>) -> Self {
        let mut item = Self::new(text);
        item.title = true;
        item
    }

    pub fn with_submenu(text: impl Into<String>, submenu: Menu) -> Self {
        let mut item = Self::new(text);
        item.submenu = Some(Box::new(submenu));
        item
    }

    pub fn with_tag(mut self, tag: i64) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_title(&self) -> bool {
        self.title
    }

    pub fn is_separator(&self) -> bool {
        self.separator
    }

    pub fn tag(&self) -> Option<i64> {
        self.tag
    }

    pub fn submenu(&self) -> Option<&Menu> {
        self.submenu.as_deref()
    }

    pub fn submenu_mut(&mut self) -> Option<&mut Menu> {
        self.submenu.as_deref_mut()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    /// Whether clicking this item counts as a selection.
    pub fn is_choosable(&self) -> bool {
        !self.title && !self.separator && self.submenu.is_none() && self.enabled
    }
}

/// An ordered list of [`MenuItem`]s with a chosen-index result slot and an
/// optional completion callback. Submenus are owned by their parent item;
/// nested levels are addressed by a path of item indices from the root.
pub struct Menu {
    title: String,
    items: Vec<MenuItem>,
    chosen: Option<usize>,
    on_select: Option<MenuCallback>,
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("title", &self.title)
            .field("items", &self.items)
            .field("chosen", &self.chosen)
            .field("on_select", &self.on_select.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Menu {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
            chosen: None,
            on_select: None,
        }
    }

    /// Convenience for flat text-only menus.
    pub fn with_items<I, S>(title: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut menu = Self::new(title);
        for text in items {
            menu.push(MenuItem::new(text));
        }
        menu
    }

    pub fn push(&mut self, item: MenuItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn add(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(MenuItem::new(text))
    }

    pub fn add_separator(&mut self) -> &mut Self {
        self.push(MenuItem::separator())
    }

    pub fn add_submenu(&mut self, text: impl Into<String>, submenu: Menu) -> &mut Self {
        self.push(MenuItem::with_submenu(text, submenu))
    }

    pub fn set_on_select(&mut self, f: impl FnMut(&Menu) + 'static) {
        self.on_select = Some(Box::new(f));
    }

    pub(crate) fn take_on_select(&mut self) -> Option<MenuCallback> {
        self.on_select.take()
    }

    pub(crate) fn restore_on_select(&mut self, f: Option<MenuCallback>) {
        self.on_select = f;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&MenuItem> {
        self.items.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut MenuItem> {
        self.items.get_mut(index)
    }

    pub fn chosen_index(&self) -> Option<usize> {
        self.chosen
    }

    pub fn set_chosen_index(&mut self, index: Option<usize>) {
        self.chosen = index;
    }

    pub fn chosen_item(&self) -> Option<&MenuItem> {
        self.chosen.and_then(|i| self.item(i))
    }

    /// Whether any item at this level carries a submenu. Placement gives
    /// such menus extra breathing room near screen edges.
    pub fn has_submenus(&self) -> bool {
        self.items.iter().any(|item| item.submenu.is_some())
    }

    pub fn check_item(&mut self, index: usize, state: bool) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.set_checked(state);
                true
            }
            None => false,
        }
    }

    /// Check `index` and uncheck every other item at this level.
    pub fn check_item_alone(&mut self, index: usize) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.set_checked(i == index);
        }
    }

    /// Resolve a nested level by its item-index path from this menu.
    /// An empty path is this menu itself.
    pub fn menu_at(&self, path: &[usize]) -> Option<&Menu> {
        let mut menu = self;
        for &idx in path {
            menu = menu.item(idx)?.submenu()?;
        }
        Some(menu)
    }

    pub fn menu_at_mut(&mut self, path: &[usize]) -> Option<&mut Menu> {
        let mut menu = self;
        for &idx in path {
            menu = menu.item_mut(idx)?.submenu_mut()?;
        }
        Some(menu)
    }
}
