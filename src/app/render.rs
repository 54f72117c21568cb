use crate::editor::geometry::CanvasLayout;
use crate::editor::EditorSession;
use crate::model;
use earcutr::earcut;
use eframe::egui;

use super::{Background, View};

const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);
const GUIDE_DASH: [f32; 2] = [6.0, 4.0];

fn color_row(ui: &mut egui::Ui, rgba: &mut model::Rgba) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        let presets = [
            model::Rgba::new(0, 0, 255, rgba.a),
            model::Rgba::new(200, 40, 40, rgba.a),
            model::Rgba::new(40, 140, 60, rgba.a),
            model::Rgba::new(20, 20, 20, rgba.a),
        ];
        for preset in presets {
            if ui
                .add_sized([18.0, 18.0], egui::Button::new("").fill(preset.to_color32()))
                .clicked()
            {
                *rgba = preset;
                changed = true;
            }
        }
        let mut arr = [rgba.r, rgba.g, rgba.b, rgba.a];
        if ui.color_edit_button_srgba_unmultiplied(&mut arr).changed() {
            *rgba = model::Rgba::new(arr[0], arr[1], arr[2], arr[3]);
            changed = true;
        }
    });
    changed
}

/// Mask colours and outline width. Returns true when anything changed.
pub(super) fn style_editor(ui: &mut egui::Ui, style: &mut model::MaskStyle) -> bool {
    let mut changed = false;
    ui.label("Fill");
    changed |= color_row(ui, &mut style.fill);
    ui.label("Outline");
    changed |= color_row(ui, &mut style.stroke);
    changed |= ui
        .add(egui::Slider::new(&mut style.stroke_width, 0.5..=8.0).text("Width"))
        .changed();
    ui.label("Handles");
    changed |= color_row(ui, &mut style.handle_stroke);
    changed
}

pub(super) fn draw_background(
    painter: &egui::Painter,
    rect: egui::Rect,
    canvas: egui::Rect,
    background: Option<&Background>,
    view: &View,
) {
    painter.rect_filled(rect, 0.0, painter.ctx().style().visuals.extreme_bg_color);
    painter.rect_filled(canvas, 0.0, egui::Color32::from_gray(235));
    if let Some(background) = background {
        let image_rect =
            egui::Rect::from_min_size(canvas.min, background.display_size * view.zoom);
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        painter
            .with_clip_rect(canvas)
            .image(background.texture.id(), image_rect, uv, egui::Color32::WHITE);
    }
    painter.rect_stroke(
        canvas,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(120)),
        egui::StrokeKind::Outside,
    );
}

/// Dashed divider lines between the four quadrants.
pub(super) fn draw_quadrant_guides(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    layout: &CanvasLayout,
) {
    let stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(140));
    let at = |x: f32, y: f32| view.world_to_screen(origin, model::Point::new(x, y));
    let vertical = [at(layout.quadrant_width, 0.0), at(layout.quadrant_width, layout.height)];
    let horizontal = [at(0.0, layout.quadrant_height), at(layout.width, layout.quadrant_height)];
    for [from, to] in [vertical, horizontal] {
        draw_dashed_line(painter, from, to, stroke, GUIDE_DASH);
    }
}

pub(super) fn draw_masks(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    session: &EditorSession,
    style: &model::MaskStyle,
) {
    let fill = style.fill.to_color32();
    let stroke = egui::Stroke::new(style.stroke_width, style.stroke.to_color32());
    for group in session.groups() {
        for member in &group.members {
            let screen: Vec<egui::Pos2> = member
                .world_points()
                .into_iter()
                .map(|p| view.world_to_screen(origin, p))
                .collect();
            fill_polygon(painter, &screen, fill);
            painter.add(egui::Shape::closed_line(screen, stroke));
        }
    }
}

/// Selection frame, corner squares and the rotate knob of the selected
/// polygon, or the vertex handles of the group in edit mode.
pub(super) fn draw_handles(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    session: &EditorSession,
    style: &model::MaskStyle,
) {
    let handle_fill = style.handle_fill.to_color32();
    let handle_stroke = egui::Stroke::new(1.0, style.handle_stroke.to_color32());
    let radius = session.config().handle_radius * view.zoom;

    if let Some(handles) = session.selected().and_then(|id| session.transform_handles(id)) {
        let outline: Vec<egui::Pos2> = handles
            .outline
            .iter()
            .map(|p| view.world_to_screen(origin, *p))
            .collect();
        painter.add(egui::Shape::closed_line(
            outline,
            egui::Stroke::new(1.0, SELECTION_COLOR),
        ));

        let stem = view.world_to_screen(origin, handles.rotate_stem);
        let knob = view.world_to_screen(origin, handles.rotate);
        painter.line_segment([stem, knob], egui::Stroke::new(1.0, SELECTION_COLOR));
        painter.circle_filled(knob, radius, handle_fill);
        painter.circle_stroke(knob, radius, handle_stroke);

        for (_, corner) in handles.corners {
            let r = egui::Rect::from_center_size(
                view.world_to_screen(origin, corner),
                egui::vec2(radius * 2.0, radius * 2.0),
            );
            painter.rect_filled(r, 1.0, handle_fill);
            painter.rect_stroke(r, 1.0, handle_stroke, egui::StrokeKind::Middle);
        }
    }

    let active = session.edit_state().and_then(|state| state.active);
    for (handle, pos) in session.vertex_handles() {
        let center = view.world_to_screen(origin, pos);
        let fill = if active == Some(handle.polygon.quadrant) {
            SELECTION_COLOR
        } else {
            handle_fill
        };
        painter.circle_filled(center, radius, fill);
        painter.circle_stroke(center, radius, handle_stroke);
    }
}

/// Outline being drawn: committed edges, a dashed edge to the cursor and a
/// marker on every placed vertex.
pub(super) fn draw_drawing_preview(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    session: &EditorSession,
    style: &model::MaskStyle,
) {
    let drawing = session.drawing();
    let points: Vec<egui::Pos2> = drawing
        .points()
        .iter()
        .map(|p| view.world_to_screen(origin, *p))
        .collect();
    let Some(last) = points.last().copied() else {
        return;
    };
    let stroke = egui::Stroke::new(style.stroke_width, style.preview.to_color32());
    if points.len() > 1 {
        painter.add(egui::Shape::line(points.clone(), stroke));
    }
    if let Some(cursor) = drawing.cursor() {
        let pattern = style.preview_dash.map(|len| len * view.zoom);
        draw_dashed_line(painter, last, view.world_to_screen(origin, cursor), stroke, pattern);
    }
    let radius = 6.0 * view.zoom;
    let marker_stroke = egui::Stroke::new(1.0, style.handle_stroke.to_color32());
    for p in points {
        painter.circle_filled(p, radius, style.handle_fill.to_color32());
        painter.circle_stroke(p, radius, marker_stroke);
    }
}

fn fill_polygon(painter: &egui::Painter, points: &[egui::Pos2], fill: egui::Color32) {
    let triangles = triangulate(points);
    if triangles.is_empty() {
        return;
    }
    let mut mesh = egui::Mesh::default();
    for p in points {
        mesh.colored_vertex(*p, fill);
    }
    for [a, b, c] in triangles {
        mesh.add_triangle(a as u32, b as u32, c as u32);
    }
    painter.add(egui::Shape::mesh(mesh));
}

/// Triangle indices for a simple outline. A trailing copy of the first vertex
/// is ignored.
fn triangulate(points: &[egui::Pos2]) -> Vec<[usize; 3]> {
    let mut ring = points;
    if ring.len() > 1 && ring.first() == ring.last() {
        ring = &ring[..ring.len() - 1];
    }
    if ring.len() < 3 {
        return Vec::new();
    }
    let coords: Vec<f64> = ring
        .iter()
        .flat_map(|p| [f64::from(p.x), f64::from(p.y)])
        .collect();
    match earcut(&coords, &[], 2) {
        Ok(indices) => indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect(),
        Err(err) => {
            log::debug!("outline could not be triangulated: {err:?}");
            Vec::new()
        }
    }
}

/// Start and end distance of every dash along a line of length `len`. The
/// last dash is cut at the end of the line.
fn dash_spans(len: f32, [dash, gap]: [f32; 2]) -> Vec<(f32, f32)> {
    if len <= f32::EPSILON || dash <= 0.0 {
        return Vec::new();
    }
    let period = dash + gap.max(0.0);
    let count = (len / period).ceil() as usize;
    (0..count)
        .map(|i| i as f32 * period)
        .filter(|&start| start < len)
        .map(|start| (start, (start + dash).min(len)))
        .collect()
}

fn draw_dashed_line(
    painter: &egui::Painter,
    from: egui::Pos2,
    to: egui::Pos2,
    stroke: egui::Stroke,
    pattern: [f32; 2],
) {
    let along = to - from;
    let len = along.length();
    let dir = along.normalized();
    for (start, end) in dash_spans(len, pattern) {
        painter.line_segment([from + dir * start, from + dir * end], stroke);
    }
}
