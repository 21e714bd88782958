//! Screen-space text: loading screen, countdown/prompt line, room header and clock.

use engine_core::{hex_to_srgb, srgb_to_linear};
use landing::{Overlay, TextAnchor};
use renderer::OverlayTextBuilder;

const MARGIN: f32 = 20.0;
const TEXT_SCALE: f32 = 3.0;
const HEADER_SCALE: f32 = 4.0;
const CLOCK_SCALE: f32 = 2.0;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

fn hex(color: u32, alpha: f32) -> [f32; 4] {
    let [r, g, b] = hex_to_srgb(color).map(srgb_to_linear);
    [r, g, b, alpha]
}

/// Top-left corner for a line of `text_w` x `text_h` pixels placed at `anchor`.
pub fn anchor_origin(anchor: TextAnchor, text_w: f32, text_h: f32, sw: f32, sh: f32) -> (f32, f32) {
    match anchor {
        TextAnchor::BottomRight { bottom_frac } => {
            (sw - MARGIN - text_w, sh * (1.0 - bottom_frac) - text_h)
        }
        TextAnchor::BottomCenter { bottom_frac } => {
            ((sw - text_w) / 2.0, sh * (1.0 - bottom_frac) - text_h)
        }
    }
}

pub fn build(overlay: &Overlay, sw: f32, sh: f32) -> OverlayTextBuilder {
    let mut tb = OverlayTextBuilder::new(sw, sh);

    if overlay.loading_visible {
        tb.add_rect(0.0, 0.0, sw, sh, hex(0x0a0a12, 1.0));
        let label = "LOADING...";
        let (_, h) = OverlayTextBuilder::text_size(label, TEXT_SCALE);
        tb.add_text_centered(sw / 2.0, (sh - h) / 2.0, label, TEXT_SCALE, WHITE);
        return tb;
    }

    if let Some(text) = &overlay.text {
        if !text.content.is_empty() {
            let (w, h) = OverlayTextBuilder::text_size(&text.content, TEXT_SCALE);
            let (x, y) = anchor_origin(text.anchor, w, h, sw, sh);
            tb.add_rect(x - 8.0, y - 6.0, w + 16.0, h + 12.0, [0.0, 0.0, 0.0, 0.35]);
            tb.add_text(x, y, &text.content, TEXT_SCALE, WHITE);
        }
    }

    if overlay.header_visible {
        let ink = hex(0x3a3226, 1.0);
        tb.add_text(MARGIN, MARGIN, &overlay.header, HEADER_SCALE, ink);
        if !overlay.datetime.is_empty() {
            tb.add_text_right(sw - MARGIN, MARGIN, &overlay.datetime, CLOCK_SCALE, ink);
        }
    }

    tb
}
