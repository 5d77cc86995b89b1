// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag a card onto a dropzone with a clone avatar.
//!
//! The scene stands in for a browser page; native mouse events are fed in by
//! hand and every notification is printed.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_dnd_demos --example dnd_basics`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Rect;
use understory_dnd::DragDrop;
use understory_dnd::avatar::CloneAvatar;
use understory_dnd::draggable::{DraggableEvent, DraggableOptions};
use understory_dnd::dropzone::{DropzoneEvent, DropzoneOptions};
use understory_dnd::event::{MouseButton, NativeEvent, PointerPosition};
use understory_dnd_scene::{ElementId, ElementSpec, Scene};

fn main() {
    env_logger::init();

    let mut scene = Scene::default();
    let body = scene.body();
    let card = scene.insert(
        Some(body),
        ElementSpec::new("div")
            .with_class("card")
            .with_bounds(Rect::new(20.0, 20.0, 120.0, 60.0)),
    );
    let trash = scene.insert(
        Some(body),
        ElementSpec::new("div")
            .with_class("trash")
            .with_bounds(Rect::new(300.0, 0.0, 400.0, 100.0)),
    );

    let mut dnd: DragDrop<Scene> = DragDrop::new();
    let id = dnd.add_draggable(
        &mut scene,
        [card],
        DraggableOptions::new().with_avatar(CloneAvatar::new()),
    );
    let zone = dnd.add_dropzone([trash], DropzoneOptions::new());

    let log: Rc<RefCell<Vec<String>>> = Rc::default();
    let draggable = dnd.draggable_mut(id).unwrap();
    let sink = log.clone();
    draggable
        .on_drag_start()
        .subscribe(move |e: &DraggableEvent<ElementId>| {
            sink.borrow_mut()
                .push(format!("drag start, avatar {:?}", e.avatar));
        });
    let sink = log.clone();
    draggable
        .on_drag_end()
        .subscribe(move |e: &DraggableEvent<ElementId>| {
            sink.borrow_mut()
                .push(format!("drag end at {:?}, cancelled: {}", e.position, e.cancelled));
        });
    let dropzone = dnd.dropzone_mut(zone).unwrap();
    let sink = log.clone();
    dropzone.on_drag_enter().subscribe(move |_: &DropzoneEvent<ElementId>| {
        sink.borrow_mut().push("enter trash".into());
    });
    let sink = log.clone();
    dropzone.on_drop().subscribe(move |e: &DropzoneEvent<ElementId>| {
        sink.borrow_mut()
            .push(format!("{:?} dropped into trash", e.draggable_id));
    });

    let at = PointerPosition::at;
    let events = [
        NativeEvent::MouseDown {
            target: card,
            button: MouseButton::Primary,
            position: at(40.0, 40.0),
        },
        NativeEvent::MouseMove {
            target: None,
            position: at(42.0, 41.0),
        },
        NativeEvent::MouseMove {
            target: None,
            position: at(200.0, 50.0),
        },
        NativeEvent::MouseMove {
            target: None,
            position: at(350.0, 50.0),
        },
        NativeEvent::MouseUp {
            target: None,
            position: at(350.0, 50.0),
        },
        NativeEvent::Click { target: card },
    ];
    for event in &events {
        let response = dnd.handle_event(&mut scene, event);
        if scene.take_frame_requests() > 0 {
            dnd.animation_frame(&mut scene);
        }
        println!("{event:?}\n  -> {response:?}");
    }
    dnd.tick();

    println!("== Notifications ==");
    for line in log.borrow().iter() {
        println!("  {line}");
    }
    assert_eq!(log.borrow().len(), 4);
    assert_eq!(dnd.listener_count(), 1);
}
