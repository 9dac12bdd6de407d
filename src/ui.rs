use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::App,
    clock::Clock,
    controller::View,
    flash::LabelColor,
    format::format_duration,
    log_store::DurationRecord,
};

const HORIZONTAL_MARGIN: u16 = 2;
const STATUS_LINES: u16 = 2;

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controller = self.controller();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(STATUS_LINES)])
            .split(area);

        match controller.view() {
            View::Log(records) => render_log(records, chunks[0], buf),
            View::Idle => {
                centered(
                    vec![Line::from(Span::styled(
                        "Press Start to begin timing.",
                        bold_style,
                    ))],
                    chunks[0],
                    buf,
                );
            }
            View::Stopped {
                duration,
                start,
                end,
            } => {
                centered(
                    vec![
                        Line::from(Span::styled(
                            format!("Duration: {duration}"),
                            bold_style.fg(Color::Green),
                        )),
                        Line::from(Span::styled(format!("Start: {start}"), dim_style)),
                        Line::from(Span::styled(format!("End: {end}"), dim_style)),
                    ],
                    chunks[0],
                    buf,
                );
            }
            View::Running {
                text,
                color,
                snapshot,
            } => {
                // the label moves over the whole screen, status lines included
                let label_area = Rect::new(
                    area.x.saturating_add(snapshot.position.x.round().max(0.0) as u16),
                    area.y.saturating_add(snapshot.position.y.round().max(0.0) as u16),
                    text.width() as u16,
                    1,
                )
                .intersection(area);

                let style = match color {
                    LabelColor::Default => bold_style,
                    LabelColor::Flash(rgb) => bold_style.fg(Color::Rgb(rgb.r, rgb.g, rgb.b)),
                };
                Paragraph::new(Span::styled(text, style)).render(label_area, buf);
            }
        }

        let status = vec![
            Line::from(vec![
                Span::styled(format!("{} ", controller.phase()), bold_style),
                Span::raw(controller.message().unwrap_or_default().to_string()),
            ]),
            Line::from(Span::styled(
                "(s)tart / (x) stop / (l)og / (q)uit",
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        ];
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    }
}

fn centered(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let inner = Rect::new(area.x, area.y + top, area.width, height.min(area.height));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

fn render_log(records: &[DurationRecord], area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL).title("Durations");

    let lines: Vec<Line> = if records.is_empty() {
        vec![Line::from(Span::styled(
            "No sessions logged yet.",
            Style::default().add_modifier(Modifier::ITALIC),
        ))]
    } else {
        records
            .iter()
            .enumerate()
            .flat_map(|(idx, record)| {
                [
                    Line::from(Span::styled(
                        format!("#{}: {}", idx + 1, format_duration(record.duration as i64)),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(format!("    Start: {}", record.start)),
                    Line::from(format!("    End: {}", record.end)),
                ]
            })
            .collect()
    };

    let inner = Layout::default()
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Min(0)])
        .split(area)[0];

    Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .render(inner, buf);
}
