use kurbo::{Point, Rect, Size};
use plume::{
    CardinalDir, FixedAdvance, Host, Menu, MeasureText, MenuStyle, PopupMenu, PopupState,
    TextStyle,
};

const SCREEN: Rect = Rect::new(0.0, 0.0, 400.0, 300.0);

#[derive(Default)]
struct TestHost {
    measurer: FixedAdvance,
    armed: bool,
    selections: Vec<Option<usize>>,
}

impl Host for TestHost {
    fn measure_text(&mut self, style: &TextStyle, text: &str) -> Size {
        self.measurer.measure(style, text)
    }

    fn mark_dirty(&mut self, trigger_animation: bool) {
        if trigger_animation {
            self.armed = true;
        }
    }

    fn set_tooltips_enabled(&mut self, _enabled: bool) {}

    fn on_menu_selection(&mut self, menu: &Menu) {
        self.selections.push(menu.chosen_index());
    }
}

fn drive(control: &mut PopupMenu, host: &mut TestHost) {
    let mut phases = 0;
    while host.armed {
        host.armed = false;
        for p in [0.5, 1.0] {
            control.animation_frame(p, host);
        }
        control.animation_frame(1.01, host);
        phases += 1;
        assert!(phases < 16, "animation chain did not terminate");
    }
}

fn numbered_menu(n: usize) -> Menu {
    Menu::with_items("m", (0..n).map(|i| format!("item {i}")))
}

fn contained(inner: Rect, outer: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

#[test]
fn centered_anchor_opens_beside_the_anchor() {
    let mut host = TestHost::default();
    let mut control = PopupMenu::new(MenuStyle::default(), SCREEN);
    let anchor = Rect::new(190.0, 140.0, 210.0, 160.0);

    control.open(numbered_menu(3), anchor, &mut host);
    drive(&mut control, &mut host);

    let target = control.active_panel().unwrap().target_rect();
    assert!(contained(target, SCREEN));
    assert!(
        target.x0 >= anchor.x1 || target.x1 <= anchor.x0,
        "panel should sit beside the anchor, got {target:?}"
    );
    assert!(matches!(
        control.callout_dir(),
        CardinalDir::East | CardinalDir::West
    ));
}

#[test]
fn bottom_corner_anchor_clamps_the_panel_flush_to_the_bottom() {
    let mut host = TestHost::default();
    let mut control = PopupMenu::new(MenuStyle::default(), SCREEN);
    // 16 rows: tall enough that side and above-the-anchor placements clip,
    // short enough to fit the screen once clamped
    let anchor = Rect::new(380.0, 280.0, 395.0, 295.0);

    control.open(numbered_menu(16), anchor, &mut host);
    drive(&mut control, &mut host);

    let panel = control.active_panel().unwrap();
    let target = panel.target_rect();
    assert!(contained(target, SCREEN));
    assert_eq!(target.y1, SCREEN.y1);

    // still one column
    let left = panel.cell_bounds()[0].x0;
    assert!(panel.cell_bounds().iter().all(|c| c.x0 == left));
}

#[test]
fn forced_south_places_directly_below_the_anchor() {
    let mut host = TestHost::default();
    let mut control = PopupMenu::new(MenuStyle::default(), SCREEN);
    control.set_forced_south(true);
    let anchor = Rect::new(150.0, 40.0, 180.0, 60.0);

    control.open(numbered_menu(3), anchor, &mut host);
    drive(&mut control, &mut host);

    assert_eq!(control.callout_dir(), CardinalDir::South);
    let target = control.active_panel().unwrap().target_rect();
    assert_eq!(target.y0, anchor.y1);
    assert!(contained(target, SCREEN));
}

#[test]
fn callout_arrow_sits_between_anchor_and_panel() {
    let mut host = TestHost::default();
    let mut control = PopupMenu::new(MenuStyle::default(), SCREEN);
    control.set_callout(true);
    control.set_forced_south(true);
    let anchor = Rect::new(150.0, 40.0, 180.0, 60.0);

    control.open(numbered_menu(3), anchor, &mut host);

    let arrow = control.callout_arrow().expect("callout arrow");
    assert_eq!(arrow.y0, anchor.y1);
    assert_eq!(arrow.center().x, anchor.center().x);
    // the panel starts below the arrow gap
    let target = control.active_panel().unwrap().target_rect();
    assert_eq!(target.y0, anchor.y1 + control.style().callout_size);
}

#[test]
fn expanded_bounds_override_pins_the_target_rect() {
    let mut host = TestHost::default();
    let mut control = PopupMenu::new(MenuStyle::default(), SCREEN);
    let forced = Rect::new(20.0, 20.0, 300.0, 200.0);
    control.set_expanded_bounds(Some(forced));

    control.open(numbered_menu(3), Rect::new(10.0, 10.0, 30.0, 30.0), &mut host);
    assert_eq!(control.active_panel().unwrap().target_rect(), forced);
}

#[test]
fn oversized_menu_scrolls_and_selection_accounts_for_the_offset() {
    let mut host = TestHost::default();
    let mut style = MenuStyle::default();
    style.scroll_if_too_big = true;
    let mut control = PopupMenu::new(style, SCREEN);

    control.open(numbered_menu(100), Rect::new(10.0, 10.0, 30.0, 30.0), &mut host);
    drive(&mut control, &mut host);
    assert_eq!(control.state(), PopupState::Expanded);

    let panel = control.active_panel().unwrap();
    assert!(panel.scroll_enabled());
    assert!(panel.cell_bounds().len() < 100);
    assert!(contained(panel.target_rect(), SCREEN));
    let first_cell = panel.cell_bounds()[0].center();

    let wheel_at = Point::new(first_cell.x, first_cell.y);
    control.on_mouse_wheel(wheel_at, -1.0, &mut host);
    control.on_mouse_wheel(wheel_at, -1.0, &mut host);
    control.on_mouse_wheel(wheel_at, -1.0, &mut host);
    assert_eq!(control.active_panel().unwrap().scroll_offset(), 3);
    control.on_mouse_wheel(wheel_at, 1.0, &mut host);
    assert_eq!(control.active_panel().unwrap().scroll_offset(), 2);

    // the visible first cell now maps to item 2
    control.on_mouse_down(first_cell, &mut host);
    drive(&mut control, &mut host);
    assert_eq!(host.selections, vec![Some(2)]);
}

#[test]
fn wheel_is_ignored_when_nothing_scrolls() {
    let mut host = TestHost::default();
    let mut control = PopupMenu::new(MenuStyle::default(), SCREEN);

    control.open(numbered_menu(3), Rect::new(10.0, 10.0, 30.0, 30.0), &mut host);
    drive(&mut control, &mut host);

    control.on_mouse_wheel(Point::new(50.0, 50.0), -1.0, &mut host);
    assert_eq!(control.active_panel().unwrap().scroll_offset(), 0);
}
