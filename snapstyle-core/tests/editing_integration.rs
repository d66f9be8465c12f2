//! Editing Integration Tests
//!
//! Drives an `EditorSession` the way a host UI does:
//! - Uploading and drawing through pointer events
//! - Fill opacity, outline and glow editing
//! - Aspect-locked resizing
//! - Layer ordering

use std::cell::RefCell;
use std::rc::Rc;

use snapstyle_core::{
    ArrowStyle, Color, EditorSession, ObjectId, ObjectKind, Paint, Point, PointerEvent,
    RasterImage, SceneError, SceneEvent, SceneObject, Shadow, ShadowPlacement, ToolKind,
    ToolState,
};

/// Press, drag and release with the given tool armed.
fn draw(session: &mut EditorSession, tool: ToolKind, from: (f64, f64), to: (f64, f64)) {
    session.select_tool(tool).expect("arm tool");
    session
        .handle_pointer(PointerEvent::down(from.0, from.1))
        .expect("pointer down");
    session
        .handle_pointer(PointerEvent::moved(to.0, to.1))
        .expect("pointer move");
    session
        .handle_pointer(PointerEvent::up(to.0, to.1))
        .expect("pointer up");
}

/// Set the real outline of the active object through the setter its kind
/// uses. Returns `None` for combinations the kind cannot carry, since arrows
/// always keep a visible line.
fn set_outline(session: &mut EditorSession, stroke: Paint, width: f64) -> Option<()> {
    let is_arrow = matches!(
        session.selected().expect("selected").kind,
        ObjectKind::Arrow { .. }
    );
    if is_arrow {
        let color = stroke.color().filter(|_| width > 0.0)?;
        session.set_arrow_line(color, width).expect("arrow line");
    } else {
        session.set_stroke_color(stroke).expect("stroke");
        session.set_stroke_width(width).expect("width");
    }
    Some(())
}

fn glow_round_trip(session: &mut EditorSession) {
    session
        .set_shadow_placement(ShadowPlacement::Inside)
        .expect("inside");
    session
        .set_shadow_placement(ShadowPlacement::Outside)
        .expect("outside");
}

fn paint_order(session: &EditorSession) -> Vec<ObjectId> {
    session.scene().objects().iter().map(|o| o.id).collect()
}

// ============================================================================
// Upload and Drawing Workflow Tests
// ============================================================================

#[test]
fn test_upload_then_draw_rectangle() {
    let mut session = EditorSession::default();
    session
        .add_image(RasterImage::transparent(2000, 1000))
        .expect("upload");
    assert_eq!(session.content_size(), (1000, 500));

    draw(&mut session, ToolKind::Rectangle, (100.0, 100.0), (300.0, 250.0));

    let rect = session.selected().expect("rectangle selected");
    assert!(matches!(rect.kind, ObjectKind::Rectangle { .. }));
    assert_eq!((rect.left, rect.top), (100.0, 100.0));
    assert_eq!(rect.rendered_size(), (200.0, 150.0));
    assert_eq!(session.tool_state(), ToolState::Idle);
    assert!(session.scene().objects().iter().all(|o| o.selectable && o.evented));
}

#[test]
fn test_short_arrow_drag_adds_nothing() {
    let mut session = EditorSession::default();
    session.add_text().expect("text");
    let before = session.scene().len();

    draw(&mut session, ToolKind::Arrow, (10.0, 10.0), (10.0, 12.0));

    assert_eq!(session.scene().len(), before);
    assert_eq!(session.tool_state(), ToolState::Idle);
}

#[test]
fn test_pointer_mapping_respects_viewport() {
    let mut session = EditorSession::default();
    session
        .surface_mut()
        .set_viewport(2.0, 50.0, 50.0)
        .expect("viewport");

    draw(&mut session, ToolKind::Rectangle, (250.0, 250.0), (450.0, 350.0));

    let rect = session.selected().expect("rectangle");
    assert_eq!((rect.left, rect.top), (100.0, 100.0));
    assert_eq!(rect.rendered_size(), (100.0, 50.0));
}

#[test]
fn test_drawing_emits_selection_and_change_events() {
    let mut session = EditorSession::default();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    session.subscribe(move |e| sink.borrow_mut().push(*e));

    draw(&mut session, ToolKind::Ellipse, (0.0, 0.0), (30.0, 40.0));

    let id = session.scene().selected_id().expect("selected");
    let events = events.borrow();
    assert!(events.contains(&SceneEvent::SelectionChanged(Some(id))));
    assert_eq!(events.last(), Some(&SceneEvent::SceneChanged));
}

// ============================================================================
// Fill, Outline and Glow Tests
// ============================================================================

#[test]
fn test_fill_opacity_then_glow_round_trip() {
    let mut session = EditorSession::default();
    let rect = SceneObject::rectangle(100.0, 80.0)
        .with_shadow(Shadow::new(Color::rgba(0, 0, 0, 0.4), 25.0).with_offset(4.0, 6.0));
    let id = session.add_object(rect);
    session.select(Some(id)).expect("select");

    session
        .set_fill(Paint::Solid("#3366FF".parse().expect("color")))
        .expect("fill");
    session.set_opacity(50.0).expect("opacity");
    let fill = session.selected().expect("rect").fill;
    assert_eq!(fill.to_string(), "rgba(51,102,255,0.5)");

    session
        .set_shadow_placement(ShadowPlacement::Inside)
        .expect("inside");
    let glowing = session.selected().expect("rect");
    assert_eq!(glowing.stroke, Paint::Solid(Color::rgba(0, 0, 0, 0.4)));
    assert_eq!(glowing.stroke_width, 25.0);
    assert!(glowing.shadow.is_none());

    session
        .set_shadow_placement(ShadowPlacement::Outside)
        .expect("outside");
    let restored = session.selected().expect("rect");
    assert_eq!(restored.stroke, Paint::None);
    assert_eq!(restored.stroke_width, 0.0);
    let shadow = restored.shadow.expect("shadow rebuilt");
    assert_eq!((shadow.offset_x, shadow.offset_y), (0.0, 10.0));
    assert_eq!(shadow.blur, 25.0);
}

#[test]
fn test_glow_round_trip_restores_any_outline() {
    let outlines = [
        (Paint::None, 0.0),
        (Paint::Solid(Color::rgb(255, 0, 0)), 2.0),
        (Paint::Solid(Color::rgba(10, 20, 30, 0.25)), 11.5),
    ];
    let shapes: [fn() -> SceneObject; 3] = [
        || SceneObject::rectangle(30.0, 20.0),
        || SceneObject::ellipse(20.0),
        || SceneObject::arrow(Point::new(0.0, 0.0), Point::new(80.0, 40.0), ArrowStyle::End),
    ];
    for make in shapes {
        for (stroke, width) in outlines {
            let mut session = EditorSession::default();
            let id = session.add_object(make());
            session.select(Some(id)).expect("select");
            if set_outline(&mut session, stroke, width).is_none() {
                continue;
            }
            session.toggle_shadow().expect("shadow on");

            session
                .set_shadow_placement(ShadowPlacement::Inside)
                .expect("inside");
            session.set_shadow_blur(40.0).expect("glow width");
            session
                .set_shadow_placement(ShadowPlacement::Outside)
                .expect("outside");

            let obj = session.selected().expect("object");
            assert_eq!(
                (obj.stroke, obj.stroke_width),
                (stroke, width),
                "{:?}",
                obj.kind_tag()
            );
            assert_eq!(obj.shadow.expect("shadow").blur, 40.0);
        }
    }
}

#[test]
fn test_outline_edited_between_round_trips_survives() {
    let red = Color::rgb(255, 0, 0);
    for tool in [ToolKind::Rectangle, ToolKind::Arrow] {
        let mut session = EditorSession::default();
        draw(&mut session, tool, (10.0, 10.0), (120.0, 90.0));
        let id = *paint_order(&session).last().expect("drawn");
        session.select(Some(id)).expect("select");
        session.toggle_shadow().expect("shadow on");

        glow_round_trip(&mut session);
        set_outline(&mut session, Paint::Solid(red), 5.0).expect("outline");
        glow_round_trip(&mut session);

        let obj = session.selected().expect("object");
        assert_eq!((obj.stroke, obj.stroke_width), (Paint::Solid(red), 5.0), "{tool:?}");
    }
}

#[test]
fn test_arrow_line_locked_while_glow_inside() {
    let mut session = EditorSession::default();
    draw(&mut session, ToolKind::Arrow, (0.0, 0.0), (100.0, 0.0));
    let id = *paint_order(&session).last().expect("arrow");
    session.select(Some(id)).expect("select");
    session.toggle_shadow().expect("shadow on");
    session
        .set_shadow_placement(ShadowPlacement::Inside)
        .expect("inside");
    let glow = session.selected().expect("arrow").stroke;

    assert!(matches!(
        session.set_arrow_line(Color::rgb(255, 0, 0), 5.0),
        Err(SceneError::StrokeLocked)
    ));
    assert_eq!(session.selected().expect("arrow").stroke, glow);
}

#[test]
fn test_fill_opacity_leaves_stroke_and_object_opacity() {
    let shapes = [
        SceneObject::rectangle(10.0, 10.0),
        SceneObject::ellipse(5.0),
        SceneObject::text("label"),
    ];
    for shape in shapes {
        let mut session = EditorSession::default();
        let stroke = Paint::Solid(Color::rgba(1, 2, 3, 0.7));
        let id = session.add_object(shape.with_paint(Paint::Solid(Color::WHITE), stroke, 2.0));
        session.select(Some(id)).expect("select");

        for percent in [0.0, 12.5, 50.0, 100.0] {
            session.set_opacity(percent).expect("opacity");
            let obj = session.selected().expect("object");
            let fill = obj.fill.color().expect("fill");
            assert!((f64::from(fill.a) - percent / 100.0).abs() < 1e-3);
            assert_eq!((fill.r, fill.g, fill.b), (255, 255, 255));
            assert_eq!(obj.stroke, stroke);
            assert_eq!(obj.opacity, 1.0);
        }
    }
}

// ============================================================================
// Transform Tests
// ============================================================================

#[test]
fn test_aspect_lock() {
    for width in [1.0, 37.5, 640.0, 2048.0] {
        let mut session = EditorSession::default();
        let id = session.add_image(RasterImage::transparent(400, 300)).expect("upload");
        session.select(Some(id)).expect("select");
        let (_, before_h) = session.selected_size().expect("size");

        session.set_width(width, true).expect("locked width");
        let (w, h) = session.selected_size().expect("size");
        assert!((w - width).abs() < 1e-6);
        assert!((h - width * 300.0 / 400.0).abs() < 1e-6);

        session.set_height(before_h, true).expect("reset");
        session.set_width(width, false).expect("free width");
        let (_, h) = session.selected_size().expect("size");
        assert!((h - before_h).abs() < 1e-6);
    }
}

// ============================================================================
// Layer Ordering Tests
// ============================================================================

#[test]
fn test_repeated_steps_match_move_to_index() {
    let build = || {
        let mut session = EditorSession::default();
        let ids: Vec<ObjectId> = (0..5)
            .map(|_| session.add_object(SceneObject::rectangle(5.0, 5.0)))
            .collect();
        (session, ids)
    };

    for steps in 0..5 {
        let (mut stepped, ids) = build();
        for _ in 0..steps {
            stepped.bring_forward(ids[0]).expect("forward");
        }
        let (mut jumped, ids_b) = build();
        jumped.move_to_index(ids_b[0], steps).expect("move");

        let a: Vec<usize> = paint_order(&stepped)
            .iter()
            .map(|id| ids.iter().position(|x| x == id).expect("known"))
            .collect();
        let b: Vec<usize> = paint_order(&jumped)
            .iter()
            .map(|id| ids_b.iter().position(|x| x == id).expect("known"))
            .collect();
        assert_eq!(a, b, "after {steps} steps");
    }
}

#[test]
fn test_layer_list_mirrors_paint_order() {
    let mut session = EditorSession::default();
    let a = session.add_object(SceneObject::rectangle(5.0, 5.0));
    let b = session.add_object(SceneObject::ellipse(5.0));
    let c = session.add_text().expect("text");
    session.send_backward(c).expect("backward");
    session.toggle_visible(a).expect("hide");

    let listed: Vec<ObjectId> = session.layers().iter().map(|l| l.id).collect();
    let mut painted = paint_order(&session);
    painted.reverse();
    assert_eq!(listed, painted);
    assert_eq!(listed, vec![b, c, a]);
    assert!(!session.layers()[2].visible);
    assert!(session.layers()[1].selected);
}
