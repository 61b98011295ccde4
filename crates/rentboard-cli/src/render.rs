// SPDX-License-Identifier: AGPL-3.0
// Rentboard CLI - Plain-text rendering of views

use rentboard_core::{city_label, Advertisement, UiState, ViewSnapshot};
use std::fmt::Write;

/// One line per listing, numbered from 1
pub fn render_ad(index: usize, ad: &Advertisement) -> String {
    let city = city_label(&ad.city).unwrap_or(ad.city.as_str());
    let price = ad
        .price
        .map(|p| format!("${}", p))
        .unwrap_or_else(|| "price on request".to_string());
    let rooms = ad
        .rooms
        .map(|r| format!("{}-room", r))
        .unwrap_or_else(|| "rooms n/a".to_string());

    let mut line = format!("{:>3}. {} | {} | {} | {}", index, city, rooms, price, ad.address);
    if let Some(phone) = &ad.phone {
        let _ = write!(line, " | {}", phone);
    }
    if !ad.images.is_empty() {
        let _ = write!(line, " [{} img]", ad.images.len());
    }
    if let Some(created_at) = ad.created_at {
        let _ = write!(line, " ({})", created_at.format("%d.%m %H:%M"));
    }
    line
}

/// Whole view with a status footer
pub fn render_view(snapshot: &ViewSnapshot) -> String {
    let mut out = format!("== {} ==\n", snapshot.view);

    if snapshot.records.is_empty() {
        out.push_str("  (no listings)\n");
    }
    for (i, ad) in snapshot.records.iter().enumerate() {
        out.push_str(&render_ad(i + 1, ad));
        out.push('\n');
    }

    let _ = write!(
        out,
        "-- {} shown, offset {}{}",
        snapshot.records.len(),
        snapshot.offset,
        if snapshot.exhausted { ", end of list" } else { "" }
    );
    if let Some(error) = &snapshot.error {
        let _ = write!(out, "\n!! {}", error);
    }
    out
}

/// Overlay status: modal image and form
pub fn render_overlays(ui: &UiState) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(url) = &ui.modal_image {
        parts.push(format!("[image] {}", url));
    }
    if ui.form_open {
        let draft = &ui.form_draft;
        parts.push(format!(
            "[form] city={} rooms={} price={} address={} phone={} images={}",
            draft.city,
            draft.rooms,
            draft.price,
            draft.address,
            draft.phone,
            draft.images.len()
        ));
    }
    (!parts.is_empty()).then(|| parts.join("\n"))
}
