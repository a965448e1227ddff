//! Paints the cockpit. Nothing in here changes simulator state except the
//! road surface's extent, which is only known once the layout is.

use crate::gauge::GaugeArc;
use crate::gui::cockpit::{Cockpit, Slider};
use crate::renderer::Extent;
use crate::risk::{Indicator, Indicators, Intensity, RiskMode};
use crate::road::{RoadScene, Shade};

use ratatui::{
    prelude::*,
    symbols,
    widgets::{
        block::{Position, Title},
        canvas::{Canvas, Context, Line as CanvasLine},
        *,
    },
};

// Logical size of the road canvas, matched by the road's tuning
const ROAD_WIDTH: f64 = 200.0;
const ROAD_HEIGHT: f64 = 100.0;

const AMBER: Color = Color::Rgb(245, 158, 11);
const CYAN: Color = Color::Rgb(34, 211, 238);

fn mode_color(mode: RiskMode) -> Color {
    match mode {
        RiskMode::Nominal => CYAN,
        RiskMode::Advisory => Color::White,
        RiskMode::Urgent => AMBER,
    }
}

// Darken an RGB colour toward black by `mask` in [0, 1]
fn masked(r: u8, g: u8, b: u8, mask: f64) -> Color {
    let keep = 1.0 - mask.clamp(0.0, 1.0);
    Color::Rgb(
        (r as f64 * keep) as u8,
        (g as f64 * keep) as u8,
        (b as f64 * keep) as u8,
    )
}

/// Draw the whole cockpit into `frame`.
pub fn draw(frame: &mut Frame, cockpit: &Cockpit) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(frame.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
        .split(outer[0]);

    draw_controls(frame, cockpit, columns[0]);
    draw_dashboard(frame, cockpit, columns[1]);
    draw_help(frame, outer[1]);
}

fn draw_controls(frame: &mut Frame, cockpit: &Cockpit, area: Rect) {
    let block = Block::default()
        .title(Title::from(" Input Parameters ".cyan().bold()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(6),
        ])
        .split(inner);

    let inputs = cockpit.inputs();
    let attention_color = if inputs.attention_warning() {
        AMBER
    } else {
        CYAN
    };
    draw_slider(
        frame,
        rows[0],
        "Driver Attention",
        inputs.attention,
        attention_color,
        "Real-time Gaze Tracking Polling...",
        cockpit.selected() == Slider::Attention,
    );
    draw_slider(
        frame,
        rows[1],
        "Env. Complexity",
        inputs.complexity,
        CYAN,
        "Fusing IMU + GPS telemetry...",
        cockpit.selected() == Slider::Complexity,
    );

    let t = cockpit.config().thresholds;
    let rule = Paragraph::new(vec![
        Line::from("Risk = (1-Atten)*0.7 + (Env)*0.3".fg(CYAN)),
        Line::styled(format!("If Risk > {}: STAGE_3_TOR", t.high), Style::default().fg(CYAN)),
        Line::styled(
            format!("Else If Risk > {}: STAGE_2_ADVISORY", t.low),
            Style::default().fg(CYAN),
        ),
    ])
    .block(
        Block::default()
            .title(" Decision Algorithm ".dark_gray())
            .borders(Borders::ALL),
    );
    frame.render_widget(rule, rows[2]);
}

fn draw_slider(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: u8,
    color: Color,
    caption: &str,
    selected: bool,
) {
    let marker = if selected { ">> " } else { "   " };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let heading = Line::from(vec![
        marker.magenta().bold(),
        Span::styled(label.to_owned(), Style::default().bold()),
        "  ".into(),
        Span::styled(format!("{}%", value), Style::default().fg(color).bold()),
    ]);
    frame.render_widget(Paragraph::new(heading), rows[0]);

    let gauge = LineGauge::default()
        .gauge_style(Style::default().fg(color))
        .line_set(symbols::line::THICK)
        .label("")
        .ratio(value as f64 / 100.0);
    frame.render_widget(gauge, rows[1]);

    frame.render_widget(
        Paragraph::new(Span::styled(
            caption.to_owned(),
            Style::default().fg(Color::DarkGray).italic(),
        )),
        rows[2],
    );
}

fn draw_dashboard(frame: &mut Frame, cockpit: &Cockpit, area: Rect) {
    let assessment = cockpit.assessment();
    let color = mode_color(assessment.mode);

    let title = Title::from(Line::from(vec![
        " HMI Logic State: ".into(),
        Span::styled(assessment.mode.label(), Style::default().fg(color).bold()),
        " ".into(),
    ]));
    let latency = Title::from(" System Latency 42.8ms ".dark_gray())
        .alignment(Alignment::Right);
    let block = Block::default()
        .title(title)
        .title(latency)
        .title(
            Title::from(" VIRTUAL COCKPIT ".white().bold())
                .alignment(Alignment::Center)
                .position(Position::Bottom),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(inner);

    draw_road(frame, cockpit, rows[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);
    draw_gauge(frame, cockpit, middle[0]);
    draw_indicators(frame, assessment.mode, middle[1]);
    draw_status_bar(frame, assessment.mode, rows[2]);
}

fn draw_road(frame: &mut Frame, cockpit: &Cockpit, area: Rect) {
    let surface = cockpit.surface();
    let extent = (area.width > 0 && area.height > 0 && cockpit.is_active()).then_some(Extent {
        width: ROAD_WIDTH,
        height: ROAD_HEIGHT,
    });
    surface.borrow_mut().set_extent(extent);

    let buffer = surface.borrow();
    let Some(scene) = buffer.latest() else {
        return;
    };

    let canvas = Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, scene.width])
        .y_bounds([0.0, scene.height])
        .paint(|ctx| paint_scene(ctx, scene));
    frame.render_widget(canvas, area);
}

fn paint_scene(ctx: &mut Context, scene: &RoadScene) {
    let mask = scene.vision_mask;
    let horizon = scene.segments.last().map(|s| s.far.y).unwrap_or(0.0);

    ctx.draw(&CanvasLine {
        x1: 0.0,
        y1: horizon,
        x2: scene.width,
        y2: horizon,
        color: masked(71, 85, 105, mask),
    });

    for segment in &scene.segments {
        let asphalt = match segment.shade {
            Shade::Light => masked(100, 116, 139, mask),
            Shade::Dark => masked(51, 65, 85, mask),
        };
        // fill the trapezoid with a few scanlines
        const SCANLINES: usize = 3;
        for k in 0..SCANLINES {
            let t = k as f64 / SCANLINES as f64;
            let y = segment.near.y + (segment.far.y - segment.near.y) * t;
            let left = segment.near.left + (segment.far.left - segment.near.left) * t;
            let right = segment.near.right + (segment.far.right - segment.near.right) * t;
            ctx.draw(&CanvasLine {
                x1: left,
                y1: y,
                x2: right,
                y2: y,
                color: asphalt,
            });
        }

        let edge = masked(226, 232, 240, mask);
        ctx.draw(&CanvasLine {
            x1: segment.near.left,
            y1: segment.near.y,
            x2: segment.far.left,
            y2: segment.far.y,
            color: edge,
        });
        ctx.draw(&CanvasLine {
            x1: segment.near.right,
            y1: segment.near.y,
            x2: segment.far.right,
            y2: segment.far.y,
            color: edge,
        });
        if segment.shade == Shade::Light {
            ctx.draw(&CanvasLine {
                x1: segment.near.centre(),
                y1: segment.near.y,
                x2: segment.far.centre(),
                y2: segment.far.y,
                color: masked(250, 204, 21, mask),
            });
        }
    }

    ctx.layer();
    paint_vehicle(ctx, scene);
}

fn paint_vehicle(ctx: &mut Context, scene: &RoadScene) {
    const HALF_W: f64 = 9.0;
    const HALF_H: f64 = 6.0;
    let cx = scene.width / 2.0 + scene.vehicle.offset;
    let cy = HALF_H + 2.0;
    let (sin, cos) = scene.vehicle.rotation.sin_cos();
    let corner = |dx: f64, dy: f64| (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos);
    let corners = [
        corner(-HALF_W, -HALF_H),
        corner(HALF_W, -HALF_H),
        corner(HALF_W, HALF_H),
        corner(-HALF_W, HALF_H),
    ];
    for i in 0..corners.len() {
        let (x1, y1) = corners[i];
        let (x2, y2) = corners[(i + 1) % corners.len()];
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color: CYAN,
        });
    }
}

fn draw_gauge(frame: &mut Frame, cockpit: &Cockpit, area: Rect) {
    let assessment = cockpit.assessment();
    let color = mode_color(assessment.mode);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(2)])
        .split(area);

    let arc = GaugeArc::new(0.0, 0.0, 1.0);
    let fraction = cockpit.gauge().fraction();
    let canvas = Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([-1.3, 1.3])
        .y_bounds([-1.3, 1.3])
        .paint(move |ctx| {
            for (line, color) in [
                (arc.polyline(1.0, 48), Color::DarkGray),
                (arc.polyline(fraction, 48), color),
            ] {
                for w in line.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: w[0].0,
                        y1: w[0].1,
                        x2: w[1].0,
                        y2: w[1].1,
                        color,
                    });
                }
            }
        });
    frame.render_widget(canvas, rows[0]);

    let mut pips: Vec<Span> = vec![
        Span::styled(
            format!("{}", assessment.display_score()),
            Style::default().fg(Color::White).bold(),
        ),
        "% ".dark_gray(),
    ];
    let pip_color = if assessment.mode == RiskMode::Urgent {
        AMBER
    } else {
        CYAN
    };
    for lit in assessment.pips() {
        pips.push(if lit {
            "▬ ".fg(pip_color)
        } else {
            "▬ ".dark_gray()
        });
    }
    let readout = Paragraph::new(vec![
        Line::from("AGGREGATE RISK".dark_gray()),
        Line::from(pips),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(readout, rows[1]);
}

fn indicator_line(indicator: &Indicator) -> Line<'static> {
    let style = match (indicator.active, indicator.intensity) {
        (false, _) => Style::default().fg(Color::DarkGray),
        (true, Intensity::High) => Style::default().fg(AMBER).bold(),
        (true, _) => Style::default().fg(CYAN),
    };
    let state = match (indicator.active, indicator.intensity) {
        (false, _) => "off",
        (true, Intensity::High) => "HIGH",
        (true, Intensity::Low) => "low",
        (true, Intensity::Normal) => "on",
    };
    let mark = if indicator.active { "● " } else { "○ " };
    Line::from(vec![
        Span::styled(mark, style),
        Span::styled(format!("{:<12}", indicator.label), style),
        Span::styled(state, style),
    ])
}

fn draw_indicators(frame: &mut Frame, mode: RiskMode, area: Rect) {
    let indicators = Indicators::for_mode(mode);
    let lines: Vec<Line> = indicators.iter().map(indicator_line).collect();
    let block = Block::default()
        .title(" Multimodal Output ".dark_gray())
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status_bar(frame: &mut Frame, mode: RiskMode, area: Rect) {
    let mut spans = vec![
        "Node Sync ".dark_gray(),
        "100% SECURE".fg(CYAN).bold(),
        "   AI Context ".dark_gray(),
        "LEVEL 4 ACTIVE".white().bold(),
        "   ".into(),
        Span::styled(mode.tor_stage(), Style::default().fg(mode_color(mode))),
    ];
    if mode.take_over_required() {
        spans.push("   ".into());
        spans.push(" ⚠ TAKE OVER REQUIRED ".black().on_yellow().bold());
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        " Select ".into(),
        "<Up>/<Down>".magenta().bold(),
        " Adjust ".into(),
        "<Left>/<Right>".magenta().bold(),
        " Step 10 ".into(),
        "<PgUp>/<PgDn>".magenta().bold(),
        " Reset ".into(),
        "<R>".magenta().bold(),
        " Quit ".into(),
        "<Q> ".magenta().bold(),
    ]);
    frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), area);
}
