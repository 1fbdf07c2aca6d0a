// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes them as a JSON array, one object per event in recording order.

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
///
/// Every object carries `seq` (position in the recording), `name` and
/// `framebuffer`; event fields go under `args`.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes)
        .enumerate()
        .map(|(seq, recorded)| {
            json!({
                "seq": seq,
                "name": recorded.name(),
                "framebuffer": recorded.framebuffer().0,
                "args": args(&recorded),
            })
        })
        .collect();

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn args(recorded: &RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::SurfaceCreated(e) => json!({
            "width": e.width,
            "height": e.height,
            "color_format": format!("{:?}", e.color_format),
            "default_window": e.default_window,
        }),
        RecordedEvent::SlotAcquired(e) => json!({
            "slot": e.slot,
            "stamp": e.stamp,
        }),
        RecordedEvent::AttachmentCreated(e) => json!({
            "kind": format!("{:?}", e.kind),
            "format": format!("{:?}", e.format),
        }),
        RecordedEvent::FenceAttached(e) => json!({
            "slot": e.slot,
            "fence_id": e.fence.id,
            "fence_value": e.fence.value,
        }),
        RecordedEvent::SlotQueued(e) => json!({
            "slot": e.slot,
            "fenced": e.fenced,
            "stamp": e.stamp,
        }),
        RecordedEvent::SlotCanceled(e) => json!({
            "slot": e.slot,
        }),
        RecordedEvent::SurfaceDestroyed(e) => json!({
            "presents": e.presents,
        }),
    }
}
