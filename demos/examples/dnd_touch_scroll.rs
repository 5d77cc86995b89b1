// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch drags that compete with page scrolling.
//!
//! A horizontal-only row gives vertical swipes back to the browser and only
//! drags when the finger moves sideways.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example dnd_touch_scroll`

use kurbo::Rect;
use understory_dnd::DragDrop;
use understory_dnd::draggable::DraggableOptions;
use understory_dnd::event::{NativeEvent, PointerPosition, TouchPoint};
use understory_dnd::types::DragState;
use understory_dnd_scene::{ElementId, ElementSpec, Scene, SceneFeatures};

fn touch(x: f64, y: f64) -> Vec<TouchPoint> {
    vec![TouchPoint {
        identifier: 0,
        position: PointerPosition::at(x, y),
    }]
}

fn swipe(
    dnd: &mut DragDrop<Scene>,
    scene: &mut Scene,
    row: ElementId,
    to: (f64, f64),
) -> DragState {
    dnd.handle_event(
        scene,
        &NativeEvent::TouchStart {
            target: row,
            touches: touch(100.0, 100.0),
        },
    );
    let response = dnd.handle_event(
        scene,
        &NativeEvent::TouchMove {
            touches: touch(to.0, to.1),
        },
    );
    let state = dnd.drag_state();
    println!("swipe to {to:?}: {state:?}, scroll blocked: {}", response.default_prevented);
    dnd.handle_event(
        scene,
        &NativeEvent::TouchEnd {
            changed_touches: touch(to.0, to.1),
        },
    );
    state
}

fn main() {
    env_logger::init();

    let mut scene = Scene::new(SceneFeatures::TOUCH_EVENTS);
    let body = scene.body();
    let row = scene.insert(
        Some(body),
        ElementSpec::new("li").with_bounds(Rect::new(0.0, 80.0, 400.0, 120.0)),
    );
    let mut dnd: DragDrop<Scene> = DragDrop::new();
    dnd.add_draggable(&mut scene, [row], DraggableOptions::new().horizontal_only());

    assert_eq!(swipe(&mut dnd, &mut scene, row, (102.0, 130.0)), DragState::Idle);
    assert_eq!(swipe(&mut dnd, &mut scene, row, (140.0, 104.0)), DragState::Active);
}
