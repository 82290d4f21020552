//! UI helper components

use eframe::egui;

use gateway_console_core::{ArgField, InputKind, NetworkFile, SubmissionStatus};

const ACCENT: egui::Color32 = egui::Color32::from_rgb(0, 180, 150);

/// Open URL in the system browser
pub fn open_url_new_tab(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::warn!(url, error = %e, "failed to open browser");
    }
}

pub fn copy_to_clipboard(text: &str) {
    if let Ok(mut clipboard) = arboard::Clipboard::new() {
        let _ = clipboard.set_text(text);
    }
}

/// Styled heading with accent color
pub fn styled_heading(ui: &mut egui::Ui, text: &str) {
    ui.heading(egui::RichText::new(text).color(ACCENT));
}

pub fn loading_spinner(ui: &mut egui::Ui, text: &str) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(text);
    });
}

pub fn error_message(ui: &mut egui::Ui, message: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("❌").size(16.0));
        ui.label(egui::RichText::new(message).color(egui::Color32::from_rgb(220, 80, 80)));
    });
}

pub fn warning_message(ui: &mut egui::Ui, message: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("⚠️").size(14.0));
        ui.label(egui::RichText::new(message).color(egui::Color32::from_rgb(230, 180, 60)));
    });
}

/// Primary button with enabled state
pub fn primary_button_enabled(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let btn = egui::Button::new(egui::RichText::new(text).size(14.0).color(egui::Color32::WHITE))
        .min_size(egui::vec2(110.0, 30.0))
        .fill(ACCENT);
    ui.add_enabled(enabled, btn)
}

pub fn secondary_button_enabled(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let btn = egui::Button::new(egui::RichText::new(text).size(14.0))
        .min_size(egui::vec2(80.0, 30.0));
    ui.add_enabled(enabled, btn)
}

/// Render content in a subtle card/frame
pub fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, add_contents);
}

/// Labelled input for one method argument. Returns the edited value when
/// the user changed it this frame.
pub fn arg_input(ui: &mut egui::Ui, index: usize, field: &ArgField) -> Option<String> {
    let mut value = field.value.clone();
    let changed = ui
        .horizontal(|ui| {
            ui.label(egui::RichText::new(format!("{}:", field.title)).strong());
            let edit = egui::TextEdit::singleline(&mut value)
                .id_salt(("arg", index))
                .font(egui::TextStyle::Monospace)
                .hint_text(field.kind.html_type());
            let edit = match field.kind {
                InputKind::Number => edit.desired_width(160.0),
                InputKind::Text => edit.desired_width(360.0),
            };
            ui.add(edit).changed()
        })
        .inner;

    if !changed {
        return None;
    }
    if field.kind == InputKind::Number {
        value.retain(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
    }
    Some(value)
}

/// `Status:` block. The transaction hash line, when present, carries copy
/// and explorer buttons.
pub fn status_block(ui: &mut egui::Ui, status: &SubmissionStatus, network: Option<NetworkFile>) {
    let lines = status.lines();
    let color = match status {
        SubmissionStatus::Failed { .. } => egui::Color32::from_rgb(220, 80, 80),
        SubmissionStatus::Completed { .. } => egui::Color32::from_rgb(80, 200, 120),
        _ => ui.visuals().text_color(),
    };

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Status:").strong());
        ui.label(egui::RichText::new(&lines[0]).color(color));
    });

    let hash = status.transaction_hash().map(|h| h.to_string());
    for line in &lines[1..] {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(line).monospace());
            let Some(hash) = hash.as_deref() else {
                return;
            };
            if !line.ends_with(hash) {
                return;
            }
            if ui
                .small_button("📋")
                .on_hover_text("Copy to clipboard")
                .clicked()
            {
                copy_to_clipboard(hash);
            }
            if let Some(network) = network {
                if ui
                    .small_button("🔗")
                    .on_hover_text("Open in block explorer")
                    .clicked()
                {
                    open_url_new_tab(&network.explorer_tx_url(hash));
                }
            }
        });
    }
}
