// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element events from the drag event dispatcher.
//!
//! Enter on the new target is emitted before leave on the old one, which lets
//! a dropzone ignore movement between its own children.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example dnd_dispatcher`

use understory_dnd::dispatcher::{DragEventDispatcher, ElementEvent};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum El {
    Page,
    ListItemA,
    ListItemB,
}

fn main() {
    let mut dispatcher: DragEventDispatcher<El> = DragEventDispatcher::new();

    for target in [El::Page, El::ListItemA, El::ListItemB] {
        println!("== over {target:?} ==");
        for event in dispatcher.dispatch_over(Some(target)) {
            println!("  {:?} {:?} (related {:?})", event.kind, event.target, event.related_target);
        }
    }
    let dropped = dispatcher.dispatch_drop(Some(El::ListItemB));
    println!("== drop ==\n  {dropped:?}");

    assert_eq!(
        dropped,
        vec![
            ElementEvent::drop(El::ListItemB),
            ElementEvent::leave(El::ListItemB, None),
        ]
    );
    assert_eq!(dispatcher.previous_target(), None);
}
