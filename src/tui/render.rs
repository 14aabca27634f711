use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::keymap::Action;
use crate::window::window;

use super::app::{App, EditForm, Field, Mode, StatusKind};

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: title | key hints | list | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let theme = &app.config.theme;
    frame.render_widget(
        Paragraph::new(Span::styled(
            "todoq - single queue",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(hint_line(app), Style::default().fg(theme.dim))),
        chunks[1],
    );

    render_list(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);

    if let Mode::Edit(form) = &app.mode {
        if app.store.selection().modal_open {
            render_editor(frame, app, form, chunks[2]);
        }
    }
}

fn hint_line(app: &App) -> String {
    let k = &app.config.keymap;
    format!(
        "{}/{}:move {}/{}:top/bottom {}:add {}:toggle {}:delete {}:edit {}:md export {}:csv export {}:quit",
        k.hint(Action::Down),
        k.hint(Action::Up),
        k.hint(Action::Top),
        k.hint(Action::Bottom),
        k.hint(Action::Add),
        k.hint(Action::ToggleDone),
        k.hint(Action::Delete),
        k.hint(Action::OpenModal),
        k.hint(Action::ExportMd),
        k.hint(Action::ExportCsv),
        k.hint(Action::Quit),
    )
}

/// Render only the rows inside the visible window
fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.config.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border)
        .border_style(Style::default().fg(theme.dim))
        .title(format!(" {} tasks ", app.store.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let tasks = app.store.tasks();
    if tasks.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                " Empty. Press 'a' to add.",
                Style::default().fg(theme.dim),
            )),
            inner,
        );
        return;
    }

    let size = app.config.list_window_size.min(inner.height as usize);
    let cursor = app.store.cursor();
    let range = window(cursor, tasks.len(), size);

    let lines: Vec<Line> = tasks[range.clone()]
        .iter()
        .zip(range)
        .map(|(task, idx)| {
            let selected = idx == cursor;
            let mark = if selected { "▶" } else { " " };
            let status = if task.done { "[x]" } else { "[ ]" };
            let title = task.title.replace('\n', " ");

            let mut style = Style::default().fg(theme.fg);
            if selected {
                style = style.bg(theme.selection).add_modifier(Modifier::BOLD);
            }
            if task.done {
                style = style.add_modifier(Modifier::DIM);
            }

            let mut spans = vec![Span::styled(format!("{} {} {}", mark, status, title), style)];
            if !task.tags.is_empty() {
                spans.push(Span::styled(
                    format!("  [{}]", task.tags.join(", ")),
                    Style::default().fg(theme.dim),
                ));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.config.theme;
    let line = match (&app.mode, &app.status) {
        (Mode::Add(buffer), _) => Line::from(vec![
            Span::styled("New task: ", Style::default().fg(theme.accent)),
            Span::styled(format!("{}_", buffer), Style::default().fg(theme.fg)),
        ]),
        (_, Some(status)) => {
            let color = match status.kind {
                StatusKind::Info => theme.fg,
                StatusKind::Error => theme.danger,
            };
            Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
        }
        (_, None) => Line::default(),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_editor(frame: &mut Frame, app: &App, form: &EditForm, area: Rect) {
    let theme = &app.config.theme;
    let popup = centered(area, 70, 9);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border)
        .border_style(Style::default().fg(theme.accent))
        .title(" Edit ");

    let field_line = |label: &'static str, value: &str, field: Field| {
        let active = form.field == field;
        let label_style = if active {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        let value = if active {
            format!("{}_", value)
        } else if value.is_empty() {
            "(none)".to_string()
        } else {
            value.to_string()
        };
        Line::from(vec![
            Span::styled(label, label_style),
            Span::styled(value, Style::default().fg(theme.fg)),
        ])
    };

    let lines = vec![
        field_line("Title:  ", &form.title, Field::Title),
        field_line("Tags:   ", &form.tags, Field::Tags),
        field_line("Detail: ", &form.detail, Field::Detail),
        Line::default(),
        Line::from(Span::styled(
            "Tab: next field  Enter: save  Esc: cancel",
            Style::default().fg(theme.dim),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}

/// Rect of `width_pct` percent width and `height` rows centered in `area`
fn centered(area: Rect, width_pct: u16, height: u16) -> Rect {
    let width = (area.width as u32 * width_pct as u32 / 100) as u16;
    let width = width.max(20).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
