use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use health_dashboard::data::aggregate::{CountTable, CrossTab, ProportionTable, Trend};
use health_dashboard::data::model::Column;

use crate::color::{blues, generate_palette};
use crate::state::AppState;
use crate::ui::layout::{self, Span};

const CHART_HEIGHT: f32 = 320.0;

/// Axis formatter showing category labels at integer positions.
fn category_formatter(
    labels: Vec<String>,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Bar charts (egui_plot)
// ---------------------------------------------------------------------------

/// Vertical bar per category, coloured by category.
pub fn bar_chart(ui: &mut Ui, id: &str, counts: &CountTable, state: &AppState) {
    let labels: Vec<String> = counts.rows.iter().map(|r| r.category.clone()).collect();
    let bars: Vec<Bar> = counts
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new(i as f64, r.count as f64)
                .name(&r.category)
                .fill(state.color(counts.column, &r.category))
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_label(counts.column.label())
        .y_axis_label("Number of Studies")
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Horizontal bar per category, largest on top.
pub fn horizontal_bar_chart(ui: &mut Ui, id: &str, counts: &CountTable) {
    let n = counts.rows.len();
    let palette = generate_palette(n.max(1));
    // Plot y grows upwards, so the first row goes on the highest position.
    let labels: Vec<String> = counts.rows.iter().rev().map(|r| r.category.clone()).collect();
    let bars: Vec<Bar> = counts
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new((n - 1 - i) as f64, r.count as f64)
                .name(&r.category)
                .fill(palette[i % palette.len()])
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_label("Number of Studies")
        .y_axis_label(counts.column.label())
        .y_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

/// Horizontal bars of proportions, one stacked segment per inner category.
pub fn stacked_share_chart(ui: &mut Ui, id: &str, shares: &ProportionTable, order: &[String], state: &AppState) {
    let n = order.len();
    let inners: BTreeSet<&str> = shares.rows.iter().map(|r| r.inner.as_str()).collect();
    // First entry of `order` on top.
    let labels: Vec<String> = order.iter().rev().cloned().collect();

    let mut charts: Vec<BarChart> = Vec::new();
    for inner in inners {
        let bars: Vec<Bar> = order
            .iter()
            .enumerate()
            .map(|(i, outer)| {
                let share = shares
                    .rows
                    .iter()
                    .find(|r| r.outer == *outer && r.inner == inner)
                    .map_or(0.0, |r| r.proportion);
                Bar::new((n - 1 - i) as f64, share).name(outer).width(0.7)
            })
            .collect();
        let chart = BarChart::new(bars)
            .name(inner)
            .color(state.color(shares.inner, inner))
            .horizontal();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = chart.stack_on(&below);
        charts.push(chart);
    }

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label("Proportion")
        .y_axis_label(shares.outer.label())
        .y_axis_formatter(category_formatter(labels))
        .include_x(1.0)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Line chart (egui_plot)
// ---------------------------------------------------------------------------

/// One line per series over the trend's time labels.
pub fn trend_chart(ui: &mut Ui, id: &str, trend: &Trend, state: &AppState) {
    let times: Vec<String> = trend.times().into_iter().map(str::to_string).collect();
    let series = trend.series();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Number of Publications")
        .x_axis_formatter(category_formatter(times.clone()))
        .show(ui, |plot_ui| {
            for (name, points) in series {
                let color = state.color(trend.series, name);
                let coords: Vec<[f64; 2]> = points
                    .iter()
                    .filter_map(|p| {
                        let x = times.iter().position(|t| *t == p.time)?;
                        Some([x as f64, p.count as f64])
                    })
                    .collect();
                plot_ui.line(
                    Line::new(coords.iter().copied().collect::<PlotPoints>())
                        .name(name)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(coords.into_iter().collect::<PlotPoints>())
                        .name(name)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Painter-based charts
// ---------------------------------------------------------------------------

fn fill_sector(painter: &egui::Painter, center: Pos2, inner: f32, outer: f32, span: Span, color: Color32) {
    for piece in layout::annular_pieces(center, inner, outer, span) {
        painter.add(Shape::convex_polygon(piece, color, Stroke::NONE));
    }
    // Hairline separators between neighbouring sectors.
    let sep = Stroke::new(1.0, Color32::WHITE);
    painter.line_segment([layout::polar(center, inner, span.start), layout::polar(center, outer, span.start)], sep);
}

fn legend(ui: &mut Ui, entries: &[(String, Color32)]) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, color) in entries {
            ui.colored_label(*color, "■");
            ui.label(label);
        }
    });
}

/// Pie chart of a count table with percentages on the larger slices.
pub fn pie_chart(ui: &mut Ui, counts: &CountTable, state: &AppState) {
    let weights: Vec<f64> = counts.rows.iter().map(|r| r.count as f64).collect();
    let total = counts.total().max(1) as f64;
    let spans = layout::pie_spans(&weights);

    let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let center = response.rect.center();
    let radius = 0.45 * response.rect.width().min(response.rect.height());

    let mut hovered = None;
    for (row, span) in counts.rows.iter().zip(&spans) {
        let color = state.color(counts.column, &row.category);
        fill_sector(&painter, center, 0.0, radius, *span, color);
        let pct = 100.0 * row.count as f64 / total;
        if span.sweep() > 0.25 {
            painter.text(
                layout::polar(center, radius * 0.65, span.mid()),
                Align2::CENTER_CENTER,
                format!("{pct:.1}%"),
                FontId::proportional(11.0),
                Color32::BLACK,
            );
        }
        if let Some(p) = response.hover_pos() {
            if p.distance(center) <= radius && span.contains(layout::angle_of(center, p)) {
                hovered = Some(format!("{}: {} ({pct:.1}%)", row.category, row.count));
            }
        }
    }
    if let Some(text) = hovered {
        response.on_hover_text_at_pointer(text);
    }

    let entries: Vec<(String, Color32)> = counts
        .rows
        .iter()
        .map(|r| (r.category.clone(), state.color(counts.column, &r.category)))
        .collect();
    legend(ui, &entries);
}

/// Two-level treemap, outer column as parents, coloured by count.
pub fn treemap_chart(ui: &mut Ui, tab: &CrossTab) {
    let groups = tab.groups();
    let weights: Vec<Vec<f64>> = groups
        .iter()
        .map(|(_, _, children)| children.iter().map(|c| c.count as f64).collect())
        .collect();
    let max = tab.rows.iter().map(|r| r.count).max().unwrap_or(1) as f32;

    let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rects = layout::treemap(response.rect, &weights);

    let mut hovered = None;
    for ((outer, subtotal, children), (parent, cells)) in groups.iter().zip(&rects) {
        for (child, cell) in children.iter().zip(cells) {
            let fill = blues(child.count as f32 / max);
            painter.rect_filled(cell.shrink(1.0), 0.0, fill);
            if cell.width() > 60.0 && cell.height() > 18.0 {
                painter.text(
                    cell.center(),
                    Align2::CENTER_CENTER,
                    &child.inner,
                    FontId::proportional(10.0),
                    Color32::BLACK,
                );
            }
            if response.hover_pos().is_some_and(|p| cell.contains(p)) {
                hovered = Some(format!("{outer} / {}: {}", child.inner, child.count));
            }
        }
        outline(&painter, *parent);
        if parent.width() > 40.0 {
            painter.text(
                parent.left_top() + egui::vec2(4.0, 2.0),
                Align2::LEFT_TOP,
                format!("{outer} ({subtotal})"),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }
    }
    if let Some(text) = hovered {
        response.on_hover_text_at_pointer(text);
    }
}

fn outline(painter: &egui::Painter, rect: Rect) {
    let stroke = Stroke::new(2.0, Color32::WHITE);
    let [a, b, c, d] = [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()];
    painter.line_segment([a, b], stroke);
    painter.line_segment([b, c], stroke);
    painter.line_segment([c, d], stroke);
    painter.line_segment([d, a], stroke);
}

/// Sunburst: outer column on the inner ring, inner column on the outer ring,
/// labels show the share of the parent ("percent entry").
pub fn sunburst_chart(ui: &mut Ui, tab: &CrossTab, state: &AppState) {
    let groups = tab.groups();
    let weights: Vec<Vec<f64>> = groups
        .iter()
        .map(|(_, _, children)| children.iter().map(|c| c.count as f64).collect())
        .collect();
    let rings = layout::sunburst_spans(&weights);
    let total = tab.total().max(1) as f64;

    let size = egui::vec2(ui.available_width(), CHART_HEIGHT + 80.0);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let center = response.rect.center();
    let radius = 0.47 * response.rect.width().min(response.rect.height());
    let (r0, r1, r2) = (radius * 0.2, radius * 0.6, radius);

    let hover = response.hover_pos().map(|p| (p.distance(center), layout::angle_of(center, p)));
    let mut hovered = None;

    for ((outer, subtotal, children), (parent, child_spans)) in groups.iter().zip(&rings) {
        let base = state.color(tab.outer, outer);
        fill_sector(&painter, center, r0, r1, *parent, base);
        if parent.sweep() > 0.3 {
            painter.text(
                layout::polar(center, (r0 + r1) / 2.0, parent.mid()),
                Align2::CENTER_CENTER,
                format!("{outer}\n{:.0}%", 100.0 * *subtotal as f64 / total),
                FontId::proportional(10.0),
                Color32::BLACK,
            );
        }
        if let Some((d, a)) = hover {
            if d >= r0 && d < r1 && parent.contains(a) {
                hovered = Some(format!("{outer}: {subtotal}"));
            }
        }

        for (child, span) in children.iter().zip(child_spans) {
            let fill = base.gamma_multiply(0.75);
            fill_sector(&painter, center, r1, r2, *span, fill);
            let pct = 100.0 * child.count as f64 / *subtotal as f64;
            if span.sweep() > 0.2 {
                painter.text(
                    layout::polar(center, (r1 + r2) / 2.0, span.mid()),
                    Align2::CENTER_CENTER,
                    format!("{}\n{pct:.0}%", child.inner),
                    FontId::proportional(9.0),
                    Color32::BLACK,
                );
            }
            if let Some((d, a)) = hover {
                if d >= r1 && d <= r2 && span.contains(a) {
                    hovered = Some(format!("{outer} / {}: {} ({pct:.1}% of {outer})", child.inner, child.count));
                }
            }
        }
    }
    if let Some(text) = hovered {
        response.on_hover_text_at_pointer(text);
    }
}

/// Small coloured legend for the columns a painter chart colours by.
pub fn column_legend(ui: &mut Ui, column: Column, labels: &[&str], state: &AppState) {
    let entries: Vec<(String, Color32)> = labels
        .iter()
        .map(|l| (l.to_string(), state.color(column, l)))
        .collect();
    legend(ui, &entries);
}
