use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;
use std::time::SystemTime;

use crate::app::App;
use crate::view::{fmt_altitude, fmt_coord, fmt_speed, ViewEntry, ViewState};

const ACCENT: Color = Color::Cyan;
const WARN: Color = Color::Yellow;
const DANGER: Color = Color::Red;
const DIM: Color = Color::DarkGray;

pub fn ui(f: &mut Frame, app: &mut App) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(f, chunks[0], app);
    render_overview(f, chunks[1], app);
    render_body(f, chunks[2], app);
    render_footer(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let update_time = app
        .last_update
        .map(format_system_time)
        .unwrap_or_else(|| "--".to_string());
    let api_time = app
        .view
        .api_time
        .and_then(format_epoch)
        .unwrap_or_else(|| "--".to_string());

    let (status, status_color) = match &app.view.state {
        ViewState::Error(err) => (format!("ERR: {err}"), DANGER),
        ViewState::UpstreamUnavailable => ("UPSTREAM N/A".to_string(), WARN),
        ViewState::Loading => ("LOADING".to_string(), DIM),
        _ => ("OK".to_string(), Color::Green),
    };

    let scheduler = if app.paused { "PAUSED" } else { "RUNNING" };
    let scheduler_color = if app.paused { WARN } else { Color::Green };

    let line_top = Line::from(vec![
        Span::styled(
            "SKYWATCH",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("DISRUPTED {}", app.view.entries.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled(
            status,
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let line_bottom = Line::from(vec![
        Span::raw(format!("API {api_time}")),
        Span::raw(" | "),
        Span::raw(format!("LAST {update_time}")),
        Span::raw(" | "),
        Span::styled(scheduler, Style::default().fg(scheduler_color)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title("AIRSPACE DISRUPTION TRACKER");
    let paragraph = Paragraph::new(vec![line_top, line_bottom]).block(block);
    f.render_widget(paragraph, area);
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let constraints: Vec<Constraint> = app
        .regions
        .iter()
        .map(|_| Constraint::Ratio(1, app.regions.len().max(1) as u32))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (region, cell) in app.regions.iter().zip(cells.iter()) {
        let active = app.is_active(&region.key);
        let count = app.count_text(&region.key);
        let count_style = if count == "N/A" {
            Style::default().fg(WARN)
        } else {
            Style::default().fg(ACCENT)
        };
        let filter_span = if active {
            Span::styled("FILTER ON", Style::default().fg(Color::Green))
        } else {
            Span::styled("FILTER OFF", Style::default().fg(DIM))
        };

        let lines = vec![
            Line::from(vec![
                Span::raw("FLIGHTS "),
                Span::styled(count, count_style),
            ]),
            Line::from(vec![Span::raw("NOTAMS "), Span::styled("N/A", Style::default().fg(DIM))]),
            Line::from(filter_span),
        ];

        let title = format!("{} [{}]", region.name.to_uppercase(), region.icao);
        let border_style = if active {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(DIM)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title);
        f.render_widget(Paragraph::new(lines).block(block), *cell);
    }
}

fn render_body(f: &mut Frame, area: Rect, app: &mut App) {
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    render_flights(f, body[0], app);
    render_notams(f, body[1], app);
}

fn render_flights(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .title("POTENTIAL DISRUPTIONS");

    let message = match &app.view.state {
        ViewState::Loading => Some((
            "Loading flight data...".to_string(),
            Style::default().fg(DIM),
        )),
        ViewState::NoDisruptions => Some((
            "No flight disruptions detected. All flights appear to be operating normally."
                .to_string(),
            Style::default().fg(Color::Green),
        )),
        ViewState::UpstreamUnavailable => Some((
            "The flight-position API could not be reached for any region. Requests may \
             be blocked or rate limited; check network access and credentials. This is \
             an access problem, not quiet airspace."
                .to_string(),
            Style::default().fg(WARN),
        )),
        ViewState::Error(err) if app.view.entries.is_empty() => Some((
            format!("Failed to load flight data: {err}. Please try again later."),
            Style::default().fg(DANGER),
        )),
        // On Error with entries the previous list stays on screen; the
        // header already carries the error status.
        _ => None,
    };

    if let Some((text, style)) = message {
        let paragraph = Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let visible: Vec<&ViewEntry> = app
        .view
        .entries
        .iter()
        .filter(|entry| app.active_filters.contains(&entry.region_key))
        .collect();

    let header_cells = ["REGION", "CALLSIGN", "ORIGIN", "STATUS", "POSITION", "ALT", "SPD"]
        .iter()
        .map(|label| {
            Cell::from(*label).style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        });
    let header = Row::new(header_cells).height(1);

    let rows = visible.iter().map(|entry| {
        let status_style = if entry.status == "On Ground" {
            Style::default().fg(WARN)
        } else {
            Style::default().fg(DANGER)
        };
        let position = format!(
            "{}, {}",
            fmt_coord(entry.latitude),
            fmt_coord(entry.longitude)
        );
        Row::new(vec![
            Cell::from(entry.region_name.clone()).style(Style::default().fg(ACCENT)),
            Cell::from(entry.callsign.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from(entry.origin_country.clone().unwrap_or_else(|| "--".to_string())),
            Cell::from(entry.status).style(status_style),
            Cell::from(position),
            Cell::from(fmt_altitude(entry.altitude_m)),
            Cell::from(fmt_speed(entry.velocity_kmh)),
        ])
    });

    let constraints = [
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Length(20),
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, constraints)
        .header(header)
        .block(block)
        .column_spacing(1)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_notams(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .title("NOTAMS");
    let paragraph = Paragraph::new(app.notam.advisory())
        .style(Style::default().fg(WARN))
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let mut help =
        "q quit  r refresh  p pause  j/k select".to_string();
    for (i, region) in app.regions.iter().enumerate().take(9) {
        help.push_str(&format!("  {} {}", i + 1, region.key));
    }
    let paragraph =
        Paragraph::new(Span::styled(help, Style::default().fg(DIM)));
    f.render_widget(paragraph, area);
}

fn format_epoch(ts: i64) -> Option<String> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(ts, 0)?;
    Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn format_system_time(time: SystemTime) -> String {
    let dt: DateTime<Local> = time.into();
    dt.format("%H:%M:%S").to_string()
}
