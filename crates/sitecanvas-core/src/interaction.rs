//! Pointer gesture state machine.
//!
//! One machine drives drag, resize, pan and connect gestures for both the
//! page canvas and the flowchart canvas. It is generic over [`Draggable`], so
//! page elements and flowchart nodes share the exact same geometry rules.
//!
//! States: `Idle -> {Dragging, Resizing, Panning, Connecting} -> Idle`.
//! A host attaches global pointer-move/up listeners when the machine leaves
//! `Idle` and detaches them when it returns (see [`listener_change`]).

use crate::selection::ResizeHandle;
use crate::snap::snap_point;
use kurbo::{Point, Rect, Size, Vec2};

/// Something with a position and size that can be dragged and resized.
pub trait Draggable {
    fn id(&self) -> &str;
    fn position(&self) -> Point;
    fn set_position(&mut self, position: Point);
    fn size(&self) -> Size;
    fn set_size(&mut self, size: Size);
    fn min_size(&self) -> Size;

    fn max_size(&self) -> Size {
        Size::new(f64::INFINITY, f64::INFINITY)
    }

    fn keeps_aspect_ratio(&self) -> bool {
        false
    }

    fn is_position_locked(&self) -> bool {
        false
    }

    fn is_size_locked(&self) -> bool {
        false
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.set_position(bounds.origin());
        self.set_size(bounds.size());
    }
}

fn find<'a, T: Draggable>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

fn find_mut<'a, T: Draggable>(items: &'a mut [T], id: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.id() == id)
}

/// Size bounds applied while resizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeLimits {
    pub min: Size,
    pub max: Size,
    pub keep_aspect_ratio: bool,
}

impl SizeLimits {
    pub fn of<T: Draggable>(item: &T) -> Self {
        Self {
            min: item.min_size(),
            max: item.max_size(),
            keep_aspect_ratio: item.keeps_aspect_ratio(),
        }
    }
}

fn clamp_len(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max.max(min))
}

/// Resize `origin` by dragging `handle` by `delta` (canvas units).
///
/// The edge opposite the handle stays fixed. With an aspect lock the
/// dimension the handle does not drive is recomputed from the original
/// ratio; on corners the horizontal edge drives.
pub fn apply_resize(origin: Rect, handle: ResizeHandle, delta: Vec2, limits: SizeLimits) -> Rect {
    let (ox, oy) = (origin.x0, origin.y0);
    let (ow, oh) = (origin.width(), origin.height());
    let (mut x, mut y, mut w, mut h) = (ox, oy, ow, oh);

    if handle.east() {
        w = clamp_len(ow + delta.x, limits.min.width, limits.max.width);
    }
    if handle.west() {
        w = clamp_len(ow - delta.x, limits.min.width, limits.max.width);
        x = ox + (ow - w);
    }
    if handle.south() {
        h = clamp_len(oh + delta.y, limits.min.height, limits.max.height);
    }
    if handle.north() {
        h = clamp_len(oh - delta.y, limits.min.height, limits.max.height);
        y = oy + (oh - h);
    }

    if limits.keep_aspect_ratio && ow > 0.0 && oh > 0.0 {
        let ratio = ow / oh;
        if handle.is_horizontal() {
            h = clamp_len(w / ratio, limits.min.height, limits.max.height);
            if handle.north() {
                y = oy + (oh - h);
            }
        } else {
            w = clamp_len(h * ratio, limits.min.width, limits.max.width);
        }
    }

    Rect::new(x, y, x + w, y + h)
}

/// Which state the machine is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Idle,
    Dragging,
    Resizing,
    Panning,
    Connecting,
}

/// Items being moved together.
#[derive(Debug, Clone)]
pub struct DragGesture {
    /// The item under the pointer.
    pub anchor: String,
    pub pointer_start: Point,
    /// Each dragged item's position at drag start.
    pub origins: Vec<(String, Point)>,
    /// Grid to snap each item to after the shared delta is applied.
    pub snap: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ResizeGesture {
    pub id: String,
    pub handle: ResizeHandle,
    pub pointer_start: Point,
    pub origin: Rect,
}

#[derive(Debug, Clone)]
pub struct PanGesture {
    pub pointer_start: Point,
    pub scroll_start: Vec2,
    pub scroll: Vec2,
}

#[derive(Debug, Clone)]
pub struct ConnectGesture {
    pub from: String,
    pub pointer: Point,
}

/// The active gesture.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragGesture),
    Resizing(ResizeGesture),
    Panning(PanGesture),
    Connecting(ConnectGesture),
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::Idle => GestureKind::Idle,
            Gesture::Dragging(_) => GestureKind::Dragging,
            Gesture::Resizing(_) => GestureKind::Resizing,
            Gesture::Panning(_) => GestureKind::Panning,
            Gesture::Connecting(_) => GestureKind::Connecting,
        }
    }
}

/// What a pointer move changed.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveEffect {
    Nothing,
    /// Item positions or sizes changed.
    Geometry,
    /// The scroll container should scroll to this offset.
    Scroll(Vec2),
    /// A connection preview line should end here (screen space).
    Preview(Point),
}

/// Result of ending a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    None,
    Moved { ids: Vec<String>, changed: bool },
    Resized { id: String, changed: bool },
    Panned { scroll: Vec2 },
    Connect { from: String, to: String },
    Cancelled,
}

impl GestureOutcome {
    /// Whether item geometry differs from gesture start.
    pub fn changed_geometry(&self) -> bool {
        match self {
            GestureOutcome::Moved { changed, .. } | GestureOutcome::Resized { changed, .. } => *changed,
            _ => false,
        }
    }
}

/// Global listener bookkeeping for a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerChange {
    Attach,
    Detach,
}

/// Listener change implied by moving from `before` to `after`.
pub fn listener_change(before: GestureKind, after: GestureKind) -> Option<ListenerChange> {
    match (before == GestureKind::Idle, after == GestureKind::Idle) {
        (true, false) => Some(ListenerChange::Attach),
        (false, true) => Some(ListenerChange::Detach),
        _ => None,
    }
}

/// Pointer gesture state machine.
#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    gesture: Gesture,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn kind(&self) -> GestureKind {
        self.gesture.kind()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Whether global pointer listeners should be attached.
    pub fn wants_global_pointer(&self) -> bool {
        !self.is_idle()
    }

    fn enter(&mut self, gesture: Gesture) {
        if !self.is_idle() {
            log::debug!("Replacing unfinished {:?} gesture", self.kind());
        }
        log::debug!("Gesture {:?} -> {:?}", self.kind(), gesture.kind());
        self.gesture = gesture;
    }

    /// Start dragging `anchor` together with `group`.
    ///
    /// Returns false (and stays idle) when the anchor is missing or its
    /// position is locked. Locked group members are left behind.
    pub fn begin_drag<T: Draggable>(
        &mut self,
        items: &[T],
        anchor: &str,
        group: &[String],
        pointer: Point,
        snap: Option<f64>,
    ) -> bool {
        let Some(anchor_item) = find(items, anchor) else {
            return false;
        };
        if anchor_item.is_position_locked() {
            return false;
        }

        let mut origins = vec![(anchor.to_string(), anchor_item.position())];
        for id in group.iter().filter(|id| id.as_str() != anchor) {
            if let Some(item) = find(items, id) {
                if !item.is_position_locked() {
                    origins.push((id.clone(), item.position()));
                }
            }
        }

        self.enter(Gesture::Dragging(DragGesture {
            anchor: anchor.to_string(),
            pointer_start: pointer,
            origins,
            snap,
        }));
        true
    }

    /// Start resizing an item from one of its handles.
    pub fn begin_resize<T: Draggable>(&mut self, items: &[T], id: &str, handle: ResizeHandle, pointer: Point) -> bool {
        let Some(item) = find(items, id) else {
            return false;
        };
        if item.is_size_locked() {
            return false;
        }

        self.enter(Gesture::Resizing(ResizeGesture {
            id: id.to_string(),
            handle,
            pointer_start: pointer,
            origin: item.bounds(),
        }));
        true
    }

    /// Start panning the scroll container.
    pub fn begin_pan(&mut self, scroll: Vec2, pointer: Point) {
        self.enter(Gesture::Panning(PanGesture {
            pointer_start: pointer,
            scroll_start: scroll,
            scroll,
        }));
    }

    /// Start dragging a connection out of an item.
    pub fn begin_connect<T: Draggable>(&mut self, items: &[T], from: &str, pointer: Point) -> bool {
        if find(items, from).is_none() {
            return false;
        }
        self.enter(Gesture::Connecting(ConnectGesture {
            from: from.to_string(),
            pointer,
        }));
        true
    }

    /// Feed a pointer move. `pointer` is in screen space; deltas are divided
    /// by `zoom` to get canvas units.
    pub fn pointer_move<T: Draggable>(&mut self, items: &mut [T], pointer: Point, zoom: f64) -> MoveEffect {
        let zoom = zoom.max(f64::EPSILON);
        match &mut self.gesture {
            Gesture::Idle => MoveEffect::Nothing,
            Gesture::Dragging(drag) => {
                let delta = (pointer - drag.pointer_start) / zoom;
                for (id, origin) in &drag.origins {
                    if let Some(item) = find_mut(items, id) {
                        let moved = Point::new((origin.x + delta.x).max(0.0), (origin.y + delta.y).max(0.0));
                        item.set_position(snap_point(moved, drag.snap).point);
                    }
                }
                MoveEffect::Geometry
            }
            Gesture::Resizing(resize) => {
                let delta = (pointer - resize.pointer_start) / zoom;
                match find_mut(items, &resize.id) {
                    Some(item) => {
                        let limits = SizeLimits::of(&*item);
                        item.set_bounds(apply_resize(resize.origin, resize.handle, delta, limits));
                        MoveEffect::Geometry
                    }
                    None => MoveEffect::Nothing,
                }
            }
            Gesture::Panning(pan) => {
                let scroll = pan.scroll_start - (pointer - pan.pointer_start);
                pan.scroll = Vec2::new(scroll.x.max(0.0), scroll.y.max(0.0));
                MoveEffect::Scroll(pan.scroll)
            }
            Gesture::Connecting(connect) => {
                connect.pointer = pointer;
                MoveEffect::Preview(pointer)
            }
        }
    }

    /// End the gesture. `target` is the item under the pointer, if any.
    pub fn pointer_up<T: Draggable>(&mut self, items: &[T], target: Option<&str>) -> GestureOutcome {
        let gesture = std::mem::take(&mut self.gesture);
        log::debug!("Gesture {:?} -> Idle", gesture.kind());

        match gesture {
            Gesture::Idle => GestureOutcome::None,
            Gesture::Dragging(drag) => {
                let changed = drag
                    .origins
                    .iter()
                    .any(|(id, origin)| find(items, id).is_some_and(|item| item.position() != *origin));
                GestureOutcome::Moved {
                    ids: drag.origins.into_iter().map(|(id, _)| id).collect(),
                    changed,
                }
            }
            Gesture::Resizing(resize) => {
                let changed = find(items, &resize.id).is_some_and(|item| item.bounds() != resize.origin);
                GestureOutcome::Resized { id: resize.id, changed }
            }
            Gesture::Panning(pan) => GestureOutcome::Panned { scroll: pan.scroll },
            Gesture::Connecting(connect) => match target {
                Some(to) if to != connect.from && find(items, to).is_some() => GestureOutcome::Connect {
                    from: connect.from,
                    to: to.to_string(),
                },
                _ => GestureOutcome::Cancelled,
            },
        }
    }

    /// Abort the gesture, restoring dragged/resized geometry.
    pub fn cancel<T: Draggable>(&mut self, items: &mut [T]) -> GestureOutcome {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureOutcome::None,
            Gesture::Dragging(drag) => {
                for (id, origin) in drag.origins {
                    if let Some(item) = find_mut(items, &id) {
                        item.set_position(origin);
                    }
                }
                GestureOutcome::Cancelled
            }
            Gesture::Resizing(resize) => {
                if let Some(item) = find_mut(items, &resize.id) {
                    item.set_bounds(resize.origin);
                }
                GestureOutcome::Cancelled
            }
            Gesture::Panning(_) | Gesture::Connecting(_) => GestureOutcome::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Block {
        id: String,
        bounds: Rect,
        min: Size,
        max: Size,
        aspect: bool,
        locked: bool,
    }

    impl Block {
        fn new(id: &str, x: f64, y: f64, w: f64, h: f64) -> Self {
            Self {
                id: id.to_string(),
                bounds: Rect::new(x, y, x + w, y + h),
                min: Size::new(50.0, 50.0),
                max: Size::new(f64::INFINITY, f64::INFINITY),
                aspect: false,
                locked: false,
            }
        }
    }

    impl Draggable for Block {
        fn id(&self) -> &str {
            &self.id
        }
        fn position(&self) -> Point {
            self.bounds.origin()
        }
        fn set_position(&mut self, position: Point) {
            self.bounds = Rect::from_origin_size(position, self.bounds.size());
        }
        fn size(&self) -> Size {
            self.bounds.size()
        }
        fn set_size(&mut self, size: Size) {
            self.bounds = Rect::from_origin_size(self.bounds.origin(), size);
        }
        fn min_size(&self) -> Size {
            self.min
        }
        fn max_size(&self) -> Size {
            self.max
        }
        fn keeps_aspect_ratio(&self) -> bool {
            self.aspect
        }
        fn is_position_locked(&self) -> bool {
            self.locked
        }
        fn is_size_locked(&self) -> bool {
            self.locked
        }
    }

    fn resize_e(block: &Block, dx: f64) -> Rect {
        apply_resize(block.bounds, ResizeHandle::E, Vec2::new(dx, 0.0), SizeLimits::of(block))
    }

    #[test]
    fn test_drag_divides_by_zoom() {
        let mut items = vec![Block::new("a", 100.0, 100.0, 60.0, 60.0)];
        let mut machine = InteractionMachine::new();

        assert!(machine.begin_drag(&items, "a", &[], Point::new(10.0, 10.0), None));
        assert_eq!(machine.kind(), GestureKind::Dragging);
        machine.pointer_move(&mut items, Point::new(50.0, 30.0), 2.0);

        assert_eq!(items[0].position(), Point::new(120.0, 110.0));
    }

    #[test]
    fn test_drag_clamps_at_origin() {
        let mut items = vec![Block::new("a", 10.0, 10.0, 60.0, 60.0)];
        let mut machine = InteractionMachine::new();

        machine.begin_drag(&items, "a", &[], Point::new(100.0, 100.0), None);
        machine.pointer_move(&mut items, Point::new(0.0, 95.0), 1.0);

        assert_eq!(items[0].position(), Point::new(0.0, 5.0));
    }

    #[test]
    fn test_locked_item_ignores_pointer_down() {
        let mut block = Block::new("a", 10.0, 10.0, 60.0, 60.0);
        block.locked = true;
        let items = vec![block];
        let mut machine = InteractionMachine::new();

        assert!(!machine.begin_drag(&items, "a", &[], Point::ZERO, None));
        assert!(!machine.begin_resize(&items, "a", ResizeHandle::SE, Point::ZERO));
        assert!(machine.is_idle());
    }

    #[test]
    fn test_group_drag_is_rigid() {
        let mut items = vec![
            Block::new("a", 0.0, 0.0, 60.0, 60.0),
            Block::new("b", 100.0, 100.0, 60.0, 60.0),
        ];
        let group = vec!["a".to_string(), "b".to_string()];
        let mut machine = InteractionMachine::new();

        machine.begin_drag(&items, "a", &group, Point::new(5.0, 5.0), None);
        machine.pointer_move(&mut items, Point::new(12.0, 9.0), 1.0);
        machine.pointer_move(&mut items, Point::new(15.0, 15.0), 1.0);

        assert_eq!(items[0].position(), Point::new(10.0, 10.0));
        assert_eq!(items[1].position(), Point::new(110.0, 110.0));
    }

    #[test]
    fn test_group_drag_snaps_each_item_after_shared_delta() {
        let mut items = vec![
            Block::new("a", 0.0, 0.0, 60.0, 60.0),
            Block::new("b", 100.0, 100.0, 60.0, 60.0),
        ];
        let group = vec!["a".to_string(), "b".to_string()];
        let mut machine = InteractionMachine::new();

        machine.begin_drag(&items, "a", &group, Point::ZERO, Some(3.0));
        machine.pointer_move(&mut items, Point::new(10.0, 10.0), 1.0);

        // 10 -> 9 and 110 -> 111: each snapped from its own moved position
        assert_eq!(items[0].position(), Point::new(9.0, 9.0));
        assert_eq!(items[1].position(), Point::new(111.0, 111.0));
    }

    #[test]
    fn test_pointer_up_reports_change() {
        let mut items = vec![Block::new("a", 0.0, 0.0, 60.0, 60.0)];
        let mut machine = InteractionMachine::new();

        machine.begin_drag(&items, "a", &[], Point::ZERO, None);
        let outcome = machine.pointer_up(&items, None);
        assert_eq!(outcome, GestureOutcome::Moved { ids: vec!["a".to_string()], changed: false });

        machine.begin_drag(&items, "a", &[], Point::ZERO, None);
        machine.pointer_move(&mut items, Point::new(4.0, 0.0), 1.0);
        assert!(machine.pointer_up(&items, None).changed_geometry());
        assert!(machine.is_idle());
    }

    #[test]
    fn test_resize_east_clamps_to_constraints() {
        let mut block = Block::new("a", 0.0, 0.0, 100.0, 80.0);
        block.max = Size::new(300.0, f64::INFINITY);

        assert_eq!(resize_e(&block, -80.0).width(), 50.0);
        assert_eq!(resize_e(&block, 400.0).width(), 300.0);
        assert_eq!(resize_e(&block, 50.0).width(), 150.0);
    }

    #[test]
    fn test_resize_west_keeps_right_edge() {
        let block = Block::new("a", 100.0, 100.0, 200.0, 100.0);
        let limits = SizeLimits::of(&block);

        let rect = apply_resize(block.bounds, ResizeHandle::W, Vec2::new(40.0, 0.0), limits);
        assert_eq!(rect, Rect::new(140.0, 100.0, 300.0, 200.0));

        // clamped at the minimum: right edge still fixed
        let rect = apply_resize(block.bounds, ResizeHandle::W, Vec2::new(500.0, 0.0), limits);
        assert_eq!(rect, Rect::new(250.0, 100.0, 300.0, 200.0));
    }

    #[test]
    fn test_resize_north_keeps_bottom_edge() {
        let block = Block::new("a", 0.0, 100.0, 100.0, 100.0);
        let rect = apply_resize(block.bounds, ResizeHandle::N, Vec2::new(0.0, -30.0), SizeLimits::of(&block));
        assert_eq!(rect, Rect::new(0.0, 70.0, 100.0, 200.0));
    }

    #[test]
    fn test_resize_aspect_lock_horizontal_wins_on_corner() {
        let mut block = Block::new("a", 0.0, 0.0, 200.0, 100.0);
        block.aspect = true;

        let rect = apply_resize(block.bounds, ResizeHandle::SE, Vec2::new(100.0, 10.0), SizeLimits::of(&block));
        assert_eq!(rect.width(), 300.0);
        assert_eq!(rect.height(), 150.0);

        let rect = apply_resize(block.bounds, ResizeHandle::S, Vec2::new(0.0, 50.0), SizeLimits::of(&block));
        assert_eq!(rect.width(), 300.0);
        assert_eq!(rect.height(), 150.0);
    }

    #[test]
    fn test_resize_aspect_lock_north_corner_anchors_bottom() {
        let mut block = Block::new("a", 0.0, 0.0, 200.0, 100.0);
        block.aspect = true;

        let rect = apply_resize(block.bounds, ResizeHandle::NE, Vec2::new(100.0, 0.0), SizeLimits::of(&block));
        assert_eq!(rect, Rect::new(0.0, -50.0, 300.0, 100.0));
    }

    #[test]
    fn test_resize_through_machine_uses_zoom() {
        let mut items = vec![Block::new("a", 0.0, 0.0, 100.0, 100.0)];
        let mut machine = InteractionMachine::new();

        assert!(machine.begin_resize(&items, "a", ResizeHandle::SE, Point::new(100.0, 100.0)));
        machine.pointer_move(&mut items, Point::new(140.0, 120.0), 0.5);
        assert_eq!(items[0].size(), Size::new(180.0, 140.0));

        let outcome = machine.pointer_up(&items, None);
        assert_eq!(outcome, GestureOutcome::Resized { id: "a".to_string(), changed: true });
    }

    #[test]
    fn test_cancel_restores_geometry() {
        let mut items = vec![Block::new("a", 10.0, 10.0, 100.0, 100.0)];
        let mut machine = InteractionMachine::new();

        machine.begin_drag(&items, "a", &[], Point::ZERO, None);
        machine.pointer_move(&mut items, Point::new(30.0, 30.0), 1.0);
        assert_eq!(machine.cancel(&mut items), GestureOutcome::Cancelled);
        assert_eq!(items[0].position(), Point::new(10.0, 10.0));
        assert!(machine.is_idle());
    }

    #[test]
    fn test_pan_moves_scroll_opposite_to_pointer() {
        let mut items: Vec<Block> = Vec::new();
        let mut machine = InteractionMachine::new();

        machine.begin_pan(Vec2::new(200.0, 200.0), Point::new(50.0, 50.0));
        let effect = machine.pointer_move(&mut items, Point::new(80.0, 20.0), 2.0);
        assert_eq!(effect, MoveEffect::Scroll(Vec2::new(170.0, 230.0)));

        let effect = machine.pointer_move(&mut items, Point::new(400.0, 20.0), 2.0);
        assert_eq!(effect, MoveEffect::Scroll(Vec2::new(0.0, 230.0)));

        assert_eq!(machine.pointer_up(&items, None), GestureOutcome::Panned { scroll: Vec2::new(0.0, 230.0) });
    }

    #[test]
    fn test_connect_requires_other_existing_target() {
        let items = vec![Block::new("a", 0.0, 0.0, 60.0, 60.0), Block::new("b", 100.0, 0.0, 60.0, 60.0)];
        let mut machine = InteractionMachine::new();

        machine.begin_connect(&items, "a", Point::ZERO);
        assert_eq!(machine.pointer_up(&items, Some("a")), GestureOutcome::Cancelled);

        machine.begin_connect(&items, "a", Point::ZERO);
        assert_eq!(machine.pointer_up(&items, Some("zzz")), GestureOutcome::Cancelled);

        machine.begin_connect(&items, "a", Point::ZERO);
        assert_eq!(
            machine.pointer_up(&items, Some("b")),
            GestureOutcome::Connect { from: "a".to_string(), to: "b".to_string() }
        );
    }

    #[test]
    fn test_listener_change() {
        assert_eq!(listener_change(GestureKind::Idle, GestureKind::Dragging), Some(ListenerChange::Attach));
        assert_eq!(listener_change(GestureKind::Panning, GestureKind::Idle), Some(ListenerChange::Detach));
        assert_eq!(listener_change(GestureKind::Idle, GestureKind::Idle), None);
    }
}
