use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen};
use crate::calendar::{GRID_COLS, GRID_ROWS, WEEKDAY_ABBR};
use crate::register::{RegisterField, RegisterForm};
use crate::validation::ValidationErrors;

const WEEKDAY_HEADERS: [&str; GRID_COLS] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

// ─── UI state ─────────────────────────────────────────────────────────────────

/// Register-screen state.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub form:       RegisterForm,
    pub focus:      RegisterField,
    pub errors:     ValidationErrors,
    pub submitting: bool,
}

impl UiState {
    pub fn reset_form(&mut self) {
        self.form       = RegisterForm::default();
        self.focus      = RegisterField::default();
        self.errors     = ValidationErrors::default();
        self.submitting = false;
    }
}

// ─── Root draw ────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &App) {
    let t    = &app.theme;
    let area = f.area();

    f.render_widget(Block::default().style(Style::default().bg(t.bg).fg(t.fg)), area);

    // Layout: [ header(3) | content | status_bar(1) ]
    let root = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    // Content: [ sidebar(26) | month ]
    let cols = Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(0)])
        .split(root[1]);

    draw_header(f, app, root[0]);
    draw_sidebar(f, app, cols[0]);
    draw_month(f, app, cols[1]);
    draw_statusbar(f, app, root[2]);

    match app.screen {
        Screen::Register => draw_register(f, area, app),
        Screen::Help     => draw_help(f, area, app),
        Screen::Calendar => {}
    }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let t     = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border))
        .style(Style::default().bg(t.bg));

    let key  = Style::default().fg(t.accent).add_modifier(Modifier::BOLD);
    let dim  = Style::default().fg(t.fg_dim);
    let line = Line::from(vec![
        Span::styled(" ▣ Calendar   ", Style::default().fg(t.fg).add_modifier(Modifier::BOLD)),
        Span::styled("[t]", key),
        Span::styled(" Today   ", dim),
        Span::styled("[‹]", key),
        Span::styled(" ", dim),
        Span::styled("[›]", key),
        Span::styled("   ", dim),
        Span::styled(app.grid.title(), Style::default().fg(t.accent).add_modifier(Modifier::BOLD)),
    ]);

    f.render_widget(Paragraph::new(line).block(block), area);
}

// ─── Sidebar ──────────────────────────────────────────────────────────────────

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let t     = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border))
        .style(Style::default().bg(t.bg));

    let grid = &app.sidebar_grid;
    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled(format!(" {:<19}", grid.title()), Style::default().fg(t.fg).add_modifier(Modifier::BOLD)),
            Span::styled("‹ ›", Style::default().fg(t.fg_dim)),
        ]),
        Line::from(""),
        Line::from(
            WEEKDAY_ABBR.iter().map(|d| Span::styled(format!(" {d}"), Style::default().fg(t.fg_dim)))
                .collect::<Vec<_>>(),
        ),
    ];

    for row in grid.rows() {
        let spans: Vec<Span> = row.iter().map(|cell| {
            let date  = cell.date();
            let label = format!("{:>3}", cell.day());
            let style = if date == app.selected_date {
                let (bg, fg) = t.selected;
                Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
            } else if date == app.today {
                let (bg, fg) = t.today;
                Style::default().bg(bg).fg(fg)
            } else if grid.in_target_month(date) {
                Style::default().fg(t.fg)
            } else {
                Style::default().fg(t.fg_dim)
            };
            Span::styled(label, style)
        }).collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Selected", Style::default().fg(t.accent))));
    lines.push(Line::from(Span::styled(
        format!(" {}", app.selected_date.format("%a, %b %-d %Y")),
        Style::default().fg(t.fg),
    )));
    lines.push(Line::from(Span::styled(
        format!(" Offset {}", app.month.get()),
        Style::default().fg(t.fg_dim),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

// ─── Month grid ───────────────────────────────────────────────────────────────

fn draw_month(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, GRID_ROWS as u32); GRID_ROWS])
        .split(area);

    for (r, (row_area, week)) in rows.iter().zip(app.grid.rows()).enumerate() {
        let cells = Layout::default().direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, GRID_COLS as u32); GRID_COLS])
            .split(*row_area);
        for (c, (cell_area, date)) in cells.iter().zip(week).enumerate() {
            draw_day(f, app, *cell_area, date.date(), (r == 0).then_some(c));
        }
    }
}

fn draw_day(
    f:       &mut Frame,
    app:     &App,
    area:    Rect,
    date:    NaiveDate,
    weekday: Option<usize>,
) {
    let t        = &app.theme;
    let selected = date == app.selected_date;
    let in_month = app.grid.in_target_month(date);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(if selected { t.border_active } else { t.border }))
        .style(Style::default().bg(t.bg));
    if let Some(col) = weekday {
        let style = if col == 0 || col == GRID_COLS - 1 {
            Style::default().fg(t.weekend).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.fg_dim).add_modifier(Modifier::BOLD)
        };
        block = block.title(Title::from(Span::styled(WEEKDAY_HEADERS[col], style))
            .alignment(Alignment::Center));
    }

    let day_style = if date == app.today {
        let (bg, fg) = t.today;
        Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
    } else if selected {
        let (_, fg) = t.selected;
        Style::default().bg(t.border_active).fg(fg).add_modifier(Modifier::BOLD)
    } else if in_month {
        Style::default().fg(t.fg)
    } else {
        Style::default().fg(t.fg_dim)
    };

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(format!("{:>2}", date.day()), day_style)))
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_statusbar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let (mode, hints) = match app.screen {
        Screen::Register => (" REGISTER ", "  Tab/↑↓:field  Enter:submit  Esc:back"),
        Screen::Help     => (" HELP ",     "  Esc:back"),
        Screen::Calendar => (" CALENDAR ", "  hjkl:day  [ ]:month  t:today  < >:mini  g:go  r:register  ?:help  q:quit"),
    };
    let bar = Paragraph::new(Line::from(vec![
        Span::styled(mode, Style::default().bg(t.accent).fg(t.bg).add_modifier(Modifier::BOLD)),
        Span::styled(hints, Style::default().fg(t.fg_dim)),
        Span::styled(
            format!("  {}", app.status),
            Style::default().fg(t.fg_dim).add_modifier(Modifier::ITALIC),
        ),
    ])).style(Style::default().bg(t.bg2));
    f.render_widget(bar, area);
}

// ─── Register form ────────────────────────────────────────────────────────────

fn draw_register(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let rect = centered(60, 80, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            " Register ",
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border_active))
        .style(Style::default().bg(t.popup_bg));

    let ui    = &app.ui;
    let acc   = Style::default().fg(t.accent).add_modifier(Modifier::BOLD);
    let dim   = Style::default().fg(t.fg_dim);
    let fg    = Style::default().fg(t.fg);
    let err   = Style::default().fg(t.error);
    let mut lines: Vec<Line> = vec![Line::from("")];

    for field in RegisterField::ALL {
        let focused = field == ui.focus;
        let value   = ui.form.get(field);
        lines.push(Line::from(Span::styled(
            format!("  {}:", field.label()),
            if focused { acc } else { dim },
        )));

        let shown = if value.is_empty() && !focused {
            Span::styled(field.placeholder(), dim)
        } else if field.is_secret() {
            Span::styled("•".repeat(value.chars().count()), fg)
        } else {
            Span::styled(value.to_owned(), fg)
        };
        lines.push(Line::from(vec![
            Span::styled(if focused { "  ▶ " } else { "    " }, acc),
            shown,
            Span::styled(if focused { "█" } else { "" }, fg),
        ]));

        lines.push(Line::from(Span::styled(
            format!("    {}", ui.errors.first(field.key()).unwrap_or_default()),
            err,
        )));
    }

    lines.push(Line::from(""));
    lines.push(if ui.submitting {
        Line::from(Span::styled("  [ … ]", dim))
    } else {
        Line::from(vec![
            Span::styled("  [ Submit ]", Style::default().fg(t.success).add_modifier(Modifier::BOLD)),
            Span::styled("   Enter", dim),
        ])
    });

    f.render_widget(Paragraph::new(lines).block(block), rect);
}

// ─── Help overlay ────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let rect = centered(60, 70, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            " Keyboard Shortcuts ",
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border_active))
        .style(Style::default().bg(t.popup_bg));

    let accent = Style::default().fg(t.accent).add_modifier(Modifier::BOLD);
    let dim    = Style::default().fg(t.fg_dim);
    let lines  = vec![
        Line::from(""),
        Line::from(Span::styled("  Month", accent)),
        Line::from(Span::styled("  [ / ]              Prev / Next month", dim)),
        Line::from(Span::styled("  t                  Jump to today", dim)),
        Line::from(Span::styled("  h/j/k/l  ←↓↑→     Move selected day", dim)),
        Line::from(""),
        Line::from(Span::styled("  Sidebar", accent)),
        Line::from(Span::styled("  < / >              Prev / Next mini month", dim)),
        Line::from(Span::styled("  g                  Show mini month in grid", dim)),
        Line::from(""),
        Line::from(Span::styled("  Account", accent)),
        Line::from(Span::styled("  r                  Register", dim)),
        Line::from(""),
        Line::from(Span::styled("  General", accent)),
        Line::from(Span::styled("  ?                  Toggle help", dim)),
        Line::from(Span::styled("  Esc                Cancel / back", dim)),
        Line::from(Span::styled("  q / Ctrl+c         Quit", dim)),
    ];

    f.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().fg(t.fg))
            .wrap(Wrap { trim: false }),
        rect,
    );
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn centered(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let vert = Layout::default().direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ]).split(r);
    Layout::default().direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ]).split(vert[1])[1]
}
