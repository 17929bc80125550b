//! Engine scenario tests
//!
//! Drive the engine the way a host would (points in, frames and images out)
//! and check the resulting layers, history and pixels.

use std::cell::RefCell;
use std::rc::Rc;

use inkpad_core::{Brush, Color, Node, PixelBuffer, Point, Rect, Size, ToolType};
use inkpad_paint::VisualContent;

use crate::{
    CanvasConfig, CanvasEngine, CanvasError, CanvasLayer, CanvasObserver, CommandOutcome,
    LayerKind, LayerPosition,
};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn engine_with(kinds: &[LayerKind]) -> CanvasEngine {
    let mut engine = CanvasEngine::new(CanvasConfig::testing());
    for &kind in kinds {
        engine.add_layer(CanvasLayer::new(kind), LayerPosition::Top);
    }
    engine
}

/// Draw one committed stroke through `points` on the active layer
fn stroke(engine: &mut CanvasEngine, points: &[(f32, f32)]) {
    let mut iter = points.iter().map(|&(x, y)| Point::new(x, y));
    let first = iter.next().expect("stroke needs a point");
    engine.begin_stroke(first).unwrap();
    for point in iter {
        engine.extend_stroke(point).unwrap();
    }
    engine.commit_stroke().unwrap();
}

fn horizontal(engine: &mut CanvasEngine, y: f32, color: Color) {
    engine.brush_mut().set_stroke_color(color);
    stroke(engine, &[(5.0, y), (20.0, y), (35.0, y)]);
}

fn alpha(pixels: &PixelBuffer, x: u32, y: u32) -> u8 {
    pixels.pixel(x, y).map_or(0, |p| p[3])
}

// ─────────────────────────────────────────────────────────────────────────────
// Layers and clearing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_clear_layer_leaves_other_layers_alone() {
    let mut engine = engine_with(&[LayerKind::Raster, LayerKind::Vector]);
    engine.set_active_layer(0).unwrap();
    horizontal(&mut engine, 10.0, Color::RED);
    engine.set_active_layer(1).unwrap();
    horizontal(&mut engine, 30.0, Color::BLUE);
    let untouched = engine.layer(1).cloned();

    engine.clear_layer(0).unwrap();

    assert!(engine.layer(0).unwrap().is_empty());
    assert_eq!(engine.layer(1).cloned(), untouched);
    assert!(engine.needs_redraw());

    engine.undo();
    assert_eq!(engine.layer(0).unwrap().len(), 1);
}

#[test]
fn test_clear_records_one_entry_per_layer() {
    let mut engine = engine_with(&[LayerKind::Raster, LayerKind::Raster, LayerKind::Vector]);
    for index in 0..3 {
        engine.set_active_layer(index).unwrap();
        horizontal(&mut engine, 10.0 + index as f32 * 10.0, Color::BLACK);
    }
    let before = engine.history().undo_len();

    engine.clear();

    assert_eq!(engine.history().undo_len(), before + 3);
    assert!(engine.layers().iter().all(CanvasLayer::is_empty));

    // Undo restores only the last cleared layer.
    engine.undo();
    assert_eq!(engine.layer(2).unwrap().len(), 1);
    assert!(engine.layer(0).unwrap().is_empty());
    assert!(engine.layer(1).unwrap().is_empty());
}

#[test]
fn test_invalid_indices_are_noops() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    horizontal(&mut engine, 10.0, Color::RED);
    let layers = engine.layers().to_vec();
    let undo = engine.history().undo_len();

    assert_eq!(
        engine.clear_layer(4),
        Err(CanvasError::LayerOutOfRange { index: 4, count: 1 })
    );
    assert!(engine.set_active_layer(9).is_err());
    assert!(engine.set_layer_visible(2, false).is_err());
    assert!(engine.set_layer_opacity(2, 0.5).is_err());
    assert!(engine.remove_layer(1).is_err());
    assert!(engine.export_layer(7).is_empty());

    assert_eq!(engine.layers(), layers.as_slice());
    assert_eq!(engine.history().undo_len(), undo);
    assert_eq!(engine.active_layer(), Some(0));
}

#[test]
fn test_add_layer_activates_it() {
    let mut engine = engine_with(&[]);
    assert_eq!(engine.active_layer(), None);

    assert_eq!(engine.add_layer(CanvasLayer::raster(), LayerPosition::Top), 0);
    assert_eq!(engine.add_layer(CanvasLayer::vector(), LayerPosition::Top), 1);
    assert_eq!(engine.active_layer(), Some(1));

    assert_eq!(
        engine.add_layer(CanvasLayer::raster().with_name("paper"), LayerPosition::Bottom),
        0
    );
    assert_eq!(engine.active_layer(), Some(0));
    assert_eq!(engine.layer(0).unwrap().name(), "paper");
    assert_eq!(engine.layer(2).unwrap().kind(), LayerKind::Vector);
}

#[test]
fn test_remove_layer_fixes_active() {
    let mut engine = engine_with(&[LayerKind::Raster, LayerKind::Raster, LayerKind::Raster]);

    engine.set_active_layer(2).unwrap();
    engine.remove_layer(0).unwrap();
    assert_eq!(engine.layer_count(), 2);
    assert_eq!(engine.active_layer(), Some(1));

    engine.remove_layer(1).unwrap();
    assert_eq!(engine.active_layer(), Some(0));
    engine.remove_layer(0).unwrap();
    assert_eq!(engine.active_layer(), None);
}

#[test]
fn test_history_follows_bottom_insert() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    horizontal(&mut engine, 10.0, Color::RED);

    engine.add_layer(CanvasLayer::raster(), LayerPosition::Bottom);
    assert!(engine.can_undo());

    let outcome = engine.undo().unwrap();
    assert_eq!(outcome.layer(), 1);
    assert!(engine.layer(1).unwrap().is_empty());
    assert!(engine.layer(0).unwrap().is_empty());

    engine.redo();
    assert_eq!(engine.layer(1).unwrap().len(), 1);
}

#[test]
fn test_history_follows_layer_removal() {
    let mut engine = engine_with(&[LayerKind::Raster, LayerKind::Raster, LayerKind::Raster]);
    engine.set_active_layer(0).unwrap();
    horizontal(&mut engine, 10.0, Color::RED);
    engine.set_active_layer(2).unwrap();
    horizontal(&mut engine, 20.0, Color::BLUE);
    assert_eq!(engine.history().undo_len(), 2);

    // Entries for other layers survive; the one above moves down.
    engine.remove_layer(1).unwrap();
    assert_eq!(engine.history().undo_len(), 2);
    assert_eq!(engine.undo().map(|o| o.layer()), Some(1));
    assert!(engine.layer(1).unwrap().is_empty());

    // Entries for the removed layer go with it.
    engine.remove_layer(1).unwrap();
    assert!(!engine.can_redo());
    assert_eq!(engine.history().undo_len(), 1);
    assert_eq!(engine.undo().map(|o| o.layer()), Some(0));
    assert!(engine.layer(0).unwrap().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Strokes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_stroke_state_machine() {
    let mut engine = engine_with(&[]);
    assert_eq!(
        engine.begin_stroke(Point::ZERO),
        Err(CanvasError::NoActiveLayer)
    );

    engine.add_layer(CanvasLayer::raster(), LayerPosition::Top);
    assert_eq!(
        engine.extend_stroke(Point::ZERO),
        Err(CanvasError::NoStrokeInProgress)
    );
    assert_eq!(engine.commit_stroke(), Err(CanvasError::NoStrokeInProgress));
    assert_eq!(engine.cancel_stroke(), Err(CanvasError::NoStrokeInProgress));

    engine.begin_stroke(Point::new(1.0, 1.0)).unwrap();
    assert_eq!(
        engine.begin_stroke(Point::new(2.0, 2.0)),
        Err(CanvasError::StrokeInProgress)
    );
    engine.extend_stroke(Point::new(3.0, 3.0)).unwrap();
    assert!(engine.is_stroking());

    engine.cancel_stroke().unwrap();
    assert!(!engine.is_stroking());
    assert!(engine.layer(0).unwrap().is_empty());
    assert!(!engine.can_undo());
}

#[test]
fn test_each_point_requests_redraw() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    engine.begin_stroke(Point::new(1.0, 1.0)).unwrap();
    assert!(engine.take_redraw_request());
    assert!(!engine.needs_redraw());

    engine.extend_stroke(Point::new(2.0, 2.0)).unwrap();
    assert!(engine.needs_redraw());

    engine.draw();
    assert!(!engine.needs_redraw());
}

#[test]
fn test_multi_group_gesture_is_one_node() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    engine.begin_stroke(Point::new(5.0, 5.0)).unwrap();
    engine.extend_stroke(Point::new(35.0, 5.0)).unwrap();
    engine.begin_stroke_group(Point::new(5.0, 35.0)).unwrap();
    engine.extend_stroke(Point::new(35.0, 35.0)).unwrap();
    engine.commit_stroke().unwrap();

    let layer = engine.layer(0).unwrap();
    assert_eq!(layer.len(), 1);
    assert_eq!(layer.node(0).unwrap().groups().len(), 2);

    let pixels = engine.export();
    assert!(alpha(&pixels, 20, 5) > 0);
    assert!(alpha(&pixels, 20, 35) > 0);
    assert_eq!(alpha(&pixels, 20, 20), 0);
}

#[test]
fn test_shape_tools_record_instructions() {
    let mut engine = engine_with(&[LayerKind::Vector]);
    engine.set_tool(ToolType::Rectangle);
    stroke(&mut engine, &[(5.0, 5.0), (20.0, 15.0), (30.0, 25.0)]);

    let node = engine.layer(0).unwrap().node(0).unwrap().clone();
    assert_eq!(node.tool(), ToolType::Rectangle);
    assert_eq!(node.groups()[0].len(), 4);
    assert_eq!(node.bounds(), Rect::new(5.0, 5.0, 25.0, 20.0));
}

#[test]
fn test_eraser_stroke_gets_eraser_brush() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    engine.set_tool(ToolType::Eraser);
    stroke(&mut engine, &[(1.0, 1.0), (2.0, 2.0)]);

    let node = engine.layer(0).unwrap().node(0).unwrap();
    assert!(node.brush().is_eraser());
    assert!(!engine.brush().is_eraser());
}

// ─────────────────────────────────────────────────────────────────────────────
// Undo / redo
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_undo_redo_restores_the_drawing() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    horizontal(&mut engine, 10.0, Color::RED);
    let drawn_layers = engine.layers().to_vec();
    let drawn_pixels = engine.export();

    let undone = engine.undo().unwrap();
    assert!(matches!(undone, CommandOutcome::Removed { layer: 0, ref nodes } if nodes.len() == 1));
    assert!(engine.layer(0).unwrap().is_empty());
    assert!(!engine.export().has_visible_pixels());

    let redone = engine.redo().unwrap();
    assert_eq!(redone, CommandOutcome::Appended { layer: 0, count: 1 });
    assert_eq!(engine.layers(), drawn_layers.as_slice());
    assert_eq!(engine.export(), drawn_pixels);
}

#[test]
fn test_new_action_clears_redo() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    horizontal(&mut engine, 10.0, Color::RED);
    engine.undo();
    assert!(engine.can_redo());

    horizontal(&mut engine, 20.0, Color::BLUE);
    assert!(!engine.can_redo());
    assert_eq!(engine.redo(), None);
    assert_eq!(engine.layer(0).unwrap().len(), 1);
}

#[test]
fn test_empty_history_is_noop() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    engine.take_redraw_request();
    assert_eq!(engine.undo(), None);
    assert_eq!(engine.redo(), None);
    assert!(!engine.needs_redraw());
}

#[test]
fn test_history_limit_drops_oldest() {
    let config = CanvasConfig::testing().with_history_limit(Some(2));
    let mut engine = CanvasEngine::new(config);
    engine.add_layer(CanvasLayer::raster(), LayerPosition::Top);

    for y in [5.0, 15.0, 25.0] {
        horizontal(&mut engine, y, Color::BLACK);
    }

    assert!(engine.undo().is_some());
    assert!(engine.undo().is_some());
    assert!(engine.undo().is_none());
    assert_eq!(engine.layer(0).unwrap().len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Selection, clipboard and images
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_selection_commit_leaves_layers_unchanged() {
    let mut engine = engine_with(&[LayerKind::Vector]);
    horizontal(&mut engine, 10.0, Color::RED);
    horizontal(&mut engine, 30.0, Color::BLUE);
    let layers = engine.layers().to_vec();
    let undo = engine.history().undo_len();

    engine.set_tool(ToolType::Selection);
    stroke(&mut engine, &[(0.0, 0.0), (40.0, 20.0)]);

    assert_eq!(engine.layers(), layers.as_slice());
    assert_eq!(engine.history().undo_len(), undo);

    let selection = engine.selection().unwrap();
    assert_eq!(selection.bounds, Rect::new(0.0, 0.0, 40.0, 20.0));
    assert_eq!(selection.layer, Some(0));
    assert_eq!(selection.nodes, vec![0]);
}

#[test]
fn test_copy_selection_then_paste() {
    let mut engine = engine_with(&[LayerKind::Raster, LayerKind::Raster]);
    engine.set_active_layer(0).unwrap();
    horizontal(&mut engine, 10.0, Color::RED);
    horizontal(&mut engine, 30.0, Color::BLUE);

    engine.set_tool(ToolType::Selection);
    stroke(&mut engine, &[(0.0, 25.0), (40.0, 40.0)]);
    assert_eq!(engine.copy_selection(), 1);

    engine.set_active_layer(1).unwrap();
    assert_eq!(engine.paste(), Ok(1));
    assert_eq!(engine.layer(1).unwrap().nodes(), &engine.layer(0).unwrap().nodes()[1..]);

    let outcome = engine.undo().unwrap();
    assert_eq!(outcome.layer(), 1);
    assert!(engine.layer(1).unwrap().is_empty());
    engine.redo();
    assert_eq!(engine.layer(1).unwrap().len(), 1);
}

#[test]
fn test_paste_empty_clipboard() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    engine.take_redraw_request();

    assert_eq!(engine.paste(), Ok(0));
    assert!(engine.layer(0).unwrap().is_empty());
    assert!(!engine.can_undo());
    assert!(engine.needs_redraw());
}

#[test]
fn test_paste_without_active_layer() {
    let mut engine = engine_with(&[]);
    engine.copy(&[Node::polyline(ToolType::Pen, Brush::default(), &[Point::ZERO])]);
    assert_eq!(engine.paste(), Err(CanvasError::NoActiveLayer));
}

#[test]
fn test_draw_image_is_aspect_fitted() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    let image = PixelBuffer::filled(20, 10, [0, 0, 255, 255]);

    let index = engine.draw_image(image, Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();

    let node = engine.layer(0).unwrap().node(index).unwrap();
    assert_eq!(node.tool(), ToolType::Image);
    assert_eq!(
        node.corners().unwrap(),
        &Rect::new(0.0, 10.0, 40.0, 20.0).corners()
    );
    assert!(engine.has_embedded_raster());
    assert!(engine.can_undo());

    let pixels = engine.export();
    assert_eq!(pixels.pixel(20, 20), Some(BLUE));
    assert_eq!(alpha(&pixels, 20, 5), 0);
}

#[test]
fn test_draw_image_with_empty_frame_uses_natural_size() {
    let mut engine = engine_with(&[LayerKind::Vector]);
    let image = PixelBuffer::filled(8, 6, [255, 0, 0, 255]);

    engine
        .draw_image(image, Rect::new(10.0, 10.0, 0.0, 0.0))
        .unwrap();

    let node = engine.layer(0).unwrap().node(0).unwrap();
    assert_eq!(
        node.corners().unwrap(),
        &Rect::new(10.0, 10.0, 8.0, 6.0).corners()
    );
}

#[test]
fn test_draw_image_guards() {
    let mut engine = engine_with(&[]);
    let image = PixelBuffer::filled(2, 2, [0, 0, 0, 255]);
    assert_eq!(
        engine.draw_image(image, Rect::new(0.0, 0.0, 10.0, 10.0)),
        Err(CanvasError::NoActiveLayer)
    );

    engine.add_layer(CanvasLayer::raster(), LayerPosition::Top);
    assert_eq!(
        engine.draw_image(PixelBuffer::empty(), Rect::new(0.0, 0.0, 10.0, 10.0)),
        Err(CanvasError::EmptyImage)
    );
    assert!(!engine.has_embedded_raster());
    assert!(engine.layer(0).unwrap().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering and export
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_frame_is_bottom_to_top_with_preview_last() {
    let mut engine = engine_with(&[LayerKind::Raster, LayerKind::Vector, LayerKind::Raster]);
    for index in 0..3 {
        engine.set_active_layer(index).unwrap();
        horizontal(&mut engine, 10.0, Color::BLACK);
    }
    engine.set_layer_visible(1, false).unwrap();
    engine.begin_stroke(Point::new(1.0, 1.0)).unwrap();
    engine.extend_stroke(Point::new(9.0, 9.0)).unwrap();

    let frame = engine.draw();

    assert_eq!(frame.layer_order(), vec![0, 2]);
    assert_eq!(frame.len(), 3);
    assert!(frame.preview().is_some());
    assert!(matches!(frame.items()[0].content, VisualContent::Raster(_)));
}

#[test]
fn test_vector_layer_has_one_shape_per_node() {
    let mut engine = engine_with(&[LayerKind::Vector]);
    horizontal(&mut engine, 10.0, Color::RED);
    horizontal(&mut engine, 20.0, Color::RED);

    let frame = engine.draw();
    assert_eq!(frame.items()[0].shape_count(), 2);
}

#[test]
fn test_selection_preview_is_dashed_outline() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    engine.brush_mut().set_thickness(12.0);
    engine.brush_mut().set_stroke_color(Color::RED);
    engine.set_tool(ToolType::Selection);
    engine.begin_stroke(Point::new(5.0, 5.0)).unwrap();
    engine.extend_stroke(Point::new(35.0, 35.0)).unwrap();

    let frame = engine.draw();
    let preview = frame.preview().unwrap();
    match &preview.content {
        VisualContent::Shapes(shapes) => {
            assert_eq!(shapes[0].dash, vec![4.0, 4.0]);
            assert_eq!(shapes[0].line_width, 1.0);
            assert!(shapes[0].fill.is_none());
        }
        other => panic!("preview should be a shape, got {:?}", other),
    }

    // Only a thin outline: the interior stays empty.
    let pixels = engine.export();
    assert_eq!(alpha(&pixels, 20, 20), 0);
}

#[test]
fn test_export_includes_preview() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    engine.brush_mut().set_stroke_color(Color::RED);
    engine.begin_stroke(Point::new(5.0, 20.0)).unwrap();
    engine.extend_stroke(Point::new(35.0, 20.0)).unwrap();

    assert_eq!(engine.export().pixel(20, 20), Some(RED));
}

#[test]
fn test_eraser_clears_raster_pixels() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    horizontal(&mut engine, 10.0, Color::RED);

    engine.set_tool(ToolType::Eraser);
    engine.brush_mut().set_opacity(0.2);
    stroke(&mut engine, &[(20.0, 0.0), (20.0, 40.0)]);

    let pixels = engine.export();
    assert_eq!(alpha(&pixels, 20, 10), 0);
    assert_eq!(pixels.pixel(8, 10), Some(RED));
}

#[test]
fn test_eraser_preview_clears_before_commit() {
    for kind in [LayerKind::Raster, LayerKind::Vector] {
        let mut engine = engine_with(&[kind]);
        horizontal(&mut engine, 10.0, Color::RED);

        engine.set_tool(ToolType::Eraser);
        engine.begin_stroke(Point::new(20.0, 0.0)).unwrap();
        engine.extend_stroke(Point::new(20.0, 40.0)).unwrap();

        let live = engine.export();
        assert_eq!(alpha(&live, 20, 10), 0, "{:?} layer", kind);
        assert_eq!(live.pixel(8, 10), Some(RED));
        assert!(engine.draw().preview().is_none());

        engine.commit_stroke().unwrap();
        assert_eq!(engine.export(), live);
    }
}

#[test]
fn test_eraser_preview_leaves_other_layers() {
    let mut engine = engine_with(&[LayerKind::Raster, LayerKind::Raster]);
    engine.set_active_layer(0).unwrap();
    horizontal(&mut engine, 10.0, Color::RED);
    engine.set_active_layer(1).unwrap();

    engine.set_tool(ToolType::Eraser);
    engine.begin_stroke(Point::new(20.0, 0.0)).unwrap();
    engine.extend_stroke(Point::new(20.0, 40.0)).unwrap();

    assert_eq!(engine.export().pixel(20, 10), Some(RED));
}

#[test]
fn test_layer_opacity_and_visibility() {
    let mut engine = engine_with(&[LayerKind::Raster]);
    horizontal(&mut engine, 10.0, Color::RED);

    engine.set_layer_opacity(0, 0.5).unwrap();
    let half = alpha(&engine.export(), 20, 10);
    assert!((120..=135).contains(&half), "alpha was {}", half);

    engine.set_layer_visible(0, false).unwrap();
    assert!(!engine.export().has_visible_pixels());
}

#[test]
fn test_export_layer_renders_only_that_layer() {
    let mut engine = engine_with(&[LayerKind::Raster, LayerKind::Vector]);
    engine.set_active_layer(0).unwrap();
    horizontal(&mut engine, 10.0, Color::RED);
    engine.set_active_layer(1).unwrap();
    horizontal(&mut engine, 30.0, Color::BLUE);

    let first = engine.export_layer(0);
    assert_eq!((first.width(), first.height()), (40, 40));
    assert_eq!(first.pixel(20, 10), Some(RED));
    assert_eq!(alpha(&first, 20, 30), 0);

    let second = engine.export_layer(1);
    assert_eq!(second.pixel(20, 30), Some(BLUE));
    assert_eq!(alpha(&second, 20, 10), 0);

    engine.add_layer(CanvasLayer::raster(), LayerPosition::Top);
    assert!(engine.export_layer(2).is_empty());
}

#[test]
fn test_export_nodes() {
    assert!(CanvasEngine::export_nodes(&[], Size::new(10.0, 10.0)).is_empty());

    let node = Node::polyline(
        ToolType::Pen,
        Brush::default().with_stroke_color(Color::RED),
        &[Point::new(0.0, 5.0), Point::new(10.0, 5.0)],
    );
    assert!(CanvasEngine::export_nodes(&[node.clone()], Size::ZERO).is_empty());

    let pixels = CanvasEngine::export_nodes(&[node], Size::new(10.0, 10.0));
    assert_eq!(pixels.pixel(5, 5), Some(RED));
}

#[test]
fn test_background_fills_export() {
    let config = CanvasConfig::testing().with_background(Some(Color::WHITE));
    let mut engine = CanvasEngine::new(config);
    engine.add_layer(CanvasLayer::raster(), LayerPosition::Top);

    let pixels = engine.export();
    assert_eq!(pixels.pixel(0, 0), Some([255, 255, 255, 255]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Observer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<String>>>);

impl CanvasObserver for Recorder {
    fn on_undo(&mut self, outcome: &CommandOutcome) {
        self.0.borrow_mut().push(format!("undo:{}", outcome.layer()));
    }

    fn on_redo(&mut self, outcome: &CommandOutcome) {
        self.0.borrow_mut().push(format!("redo:{}", outcome.layer()));
    }

    fn on_copy_nodes(&mut self, nodes: &[Node]) {
        self.0.borrow_mut().push(format!("copy:{}", nodes.len()));
    }

    fn on_paste_nodes(&mut self, layer: usize, nodes: &[Node]) {
        self.0
            .borrow_mut()
            .push(format!("paste:{}:{}", layer, nodes.len()));
    }

    fn on_draw_image(&mut self, layer: usize, node: &Node) {
        self.0
            .borrow_mut()
            .push(format!("image:{}:{:?}", layer, node.tool()));
    }
}

#[test]
fn test_observer_sees_every_event() {
    let recorder = Recorder::default();
    let events = recorder.0.clone();
    let mut engine = engine_with(&[LayerKind::Raster]);
    engine.set_observer(Box::new(recorder));

    horizontal(&mut engine, 10.0, Color::RED);
    let nodes = engine.layer(0).unwrap().nodes().to_vec();
    engine.copy(&nodes);
    engine.paste().unwrap();
    engine.undo();
    engine.redo();
    engine
        .draw_image(PixelBuffer::filled(1, 1, [0, 0, 0, 255]), Rect::new(0.0, 0.0, 4.0, 4.0))
        .unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            "copy:1".to_string(),
            "paste:0:1".to_string(),
            "undo:0".to_string(),
            "redo:0".to_string(),
            "image:0:Image".to_string(),
        ]
    );
}

#[test]
fn test_default_observer_methods_are_noops() {
    struct Silent;
    impl CanvasObserver for Silent {}

    let mut engine = engine_with(&[LayerKind::Raster]);
    engine.set_observer(Box::new(Silent));
    horizontal(&mut engine, 10.0, Color::RED);
    engine.copy(&[]);
    assert_eq!(engine.paste(), Ok(0));
    assert!(engine.undo().is_some());
    assert!(engine.take_observer().is_some());
}
