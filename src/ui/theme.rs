use egui::{Color32, CornerRadius, Style};

pub const WINDOW_CORNER_RADIUS: u8 = 0;
pub const WIDGET_CORNER_RADIUS: u8 = 4;

/// Near-black, slightly translucent.
pub const WINDOW_FILL: Color32 = Color32::from_rgba_premultiplied(13, 13, 13, 222);
pub const BORDER_COLOR: Color32 = Color32::from_rgb(20, 26, 31);
pub const TEXT_COLOR: Color32 = Color32::from_rgb(242, 245, 250);

/// Flat corners on windows, slightly rounded widgets, dark fill, light text.
pub fn apply(style: &mut Style) {
    let visuals = &mut style.visuals;
    visuals.window_corner_radius = CornerRadius::same(WINDOW_CORNER_RADIUS);

    let widgets = &mut visuals.widgets;
    for w in [
        &mut widgets.noninteractive,
        &mut widgets.inactive,
        &mut widgets.hovered,
        &mut widgets.active,
        &mut widgets.open,
    ] {
        w.corner_radius = CornerRadius::same(WIDGET_CORNER_RADIUS);
    }

    visuals.window_fill = WINDOW_FILL;
    visuals.window_stroke.color = BORDER_COLOR;
    visuals.override_text_color = Some(TEXT_COLOR);
}

/// Apply the loading theme to everything drawn through `ctx`.
pub fn install(ctx: &egui::Context) {
    ctx.style_mut(apply);
    log::debug!("Applied loading overlay theme");
}
