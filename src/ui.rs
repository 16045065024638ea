use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect, Size},
    style::Modifier,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table,
    },
};
use tui_scrollview::{ScrollView, ScrollbarVisibility};
use unicode_width::UnicodeWidthStr;

use crate::app_core::state::{AppState, FocusPane};
use crate::model::TableRow;

/// Glyph drawn in the mark column of selected rows.
pub const MARK: &str = "●";

/// Widest a data column is allowed to grow before it is truncated.
pub const MAX_COLUMN_WIDTH: u16 = 32;

/// Lines the Inspect modal renders before truncating. Keeps the scroll
/// buffer within `u16` rows.
pub const MAX_INSPECT_LINES: usize = 10_000;

/// Main UI entry point that renders the entire application layout.
pub fn ui(f: &mut Frame, app: &mut AppState) {
    let bar_height = if app.selection.action_bar().is_some() {
        3
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),             // Table - takes all space
            Constraint::Length(bar_height), // Action bar, only while rows are selected
            Constraint::Length(1),          // Status bar
        ])
        .split(f.area());

    app.table_area = Some(chunks[0]);
    render_table(f, app, chunks[0]);

    if bar_height > 0 {
        app.action_bar_area = Some(chunks[1]);
        render_action_bar(f, app, chunks[1]);
    } else {
        app.action_bar_area = None;
        app.button_areas.clear();
    }

    render_status_bar(f, app, chunks[2]);

    if app.inspect_items.is_some() {
        render_inspect_modal(f, app);
    } else if app.show_help {
        render_help_overlay(f, app);
    }
}

fn cell_width(text: &str) -> u16 {
    u16::try_from(text.width()).unwrap_or(u16::MAX)
}

/// Column constraints: the mark column, then each data column sized to its
/// widest cell (header included), capped at [`MAX_COLUMN_WIDTH`].
pub fn column_widths(columns: &[String], rows: &[TableRow]) -> Vec<Constraint> {
    let mut widths = vec![Constraint::Length(cell_width(MARK))];
    for (col, header) in columns.iter().enumerate() {
        let widest = rows
            .iter()
            .filter_map(|row| row.cells.get(col))
            .map(|cell| cell_width(cell))
            .chain(std::iter::once(cell_width(header)))
            .max()
            .unwrap_or(0);
        widths.push(Constraint::Length(widest.min(MAX_COLUMN_WIDTH)));
    }
    widths
}

fn render_table(f: &mut Frame, app: &mut AppState, area: Rect) {
    let is_focused = app.focused_pane == FocusPane::Table;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.border_selected
        } else {
            app.theme.border
        })
        .title_style(app.theme.title)
        .title(format!(" {} ({}) ", app.source_label, app.selection.len()))
        .title_bottom(if is_focused {
            Line::from(" ↑/↓ move • Space toggle • Shift extend • Ctrl+A all ").right_aligned()
        } else {
            Line::from("").right_aligned()
        })
        .title_alignment(Alignment::Left)
        .style(app.theme.row_normal);

    // One header line sits above the body rows.
    let inner = block.inner(area);
    app.table_content_area = (inner.height > 1 && inner.width > 0).then(|| {
        Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 1)
    });

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(app.columns.iter().map(|column| Cell::from(column.as_str()))),
    )
    .style(app.theme.header);

    let rows = app.selection.rows().iter().map(|row| {
        let (mark, style) = if row.selected {
            (MARK, app.theme.row_marked)
        } else {
            ("", app.theme.row_normal)
        };
        Row::new(
            std::iter::once(Cell::from(mark))
                .chain(row.cells.iter().map(|cell| Cell::from(cell.as_str()))),
        )
        .style(style)
    });

    let widths = column_widths(&app.columns, app.selection.rows());
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(2)
        .row_highlight_style(app.theme.row_cursor);

    f.render_stateful_widget(table, area, &mut app.table_state);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
    let mut scrollbar_state = ScrollbarState::new(app.selection.len())
        .position(app.table_state.selected().unwrap_or(0));

    f.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

/// Renders the count label and the bar buttons, recording each button's
/// screen region for mouse hit-testing.
fn render_action_bar(f: &mut Frame, app: &mut AppState, area: Rect) {
    let is_focused = app.focused_pane == FocusPane::ActionBar;
    let Some(bar) = app.selection.action_bar() else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            app.theme.border_selected
        } else {
            app.theme.border
        })
        .title_style(app.theme.title)
        .title(" Actions ")
        .title_bottom(if is_focused {
            Line::from(" ←/→ choose • Enter run • Esc clear • Tab back ").right_aligned()
        } else {
            Line::from(" Tab focus ").right_aligned()
        })
        .style(app.theme.text);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut button_areas = Vec::with_capacity(bar.buttons.len());
    if inner.width == 0 || inner.height == 0 {
        app.button_areas = button_areas;
        return;
    }

    let label = bar.count_label();
    let label_width = cell_width(&label).min(inner.width.saturating_sub(1));
    f.render_widget(
        Paragraph::new(label).style(app.theme.title),
        Rect::new(inner.x + 1, inner.y, label_width, 1),
    );

    let mut x = inner.x + 1 + label_width + 3;
    for (pos, button) in bar.buttons.iter().enumerate() {
        let caption = format!(" {} ", button.caption());
        let width = cell_width(&caption);
        if x.saturating_add(width) > inner.right() {
            break;
        }
        let rect = Rect::new(x, inner.y, width, 1);
        let mut style = app.theme.buttons.for_variant(button.variant);
        if pos == bar.focused {
            style = style.add_modifier(Modifier::UNDERLINED);
            if is_focused {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
        }
        f.render_widget(Paragraph::new(caption).style(style), rect);
        button_areas.push(rect);
        x += width + 1;
    }

    app.button_areas = button_areas;
}

fn render_status_bar(f: &mut Frame, app: &mut AppState, area: Rect) {
    let area = Rect::new(
        area.x + 1,
        area.y,
        area.width.saturating_sub(2),
        area.height,
    );

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_status_bar_shortcuts(f, app, chunks[0]);
    render_status_bar_counts(f, app, chunks[1]);
    render_status_bar_message(f, app, chunks[2]);
}

fn render_status_bar_shortcuts(f: &mut Frame, app: &mut AppState, area: Rect) {
    let key_style = app.theme.title;
    let bar_style = app.theme.text.add_modifier(Modifier::DIM);

    let shortcuts = Line::from(vec![
        Span::styled("Tab ", key_style),
        Span::raw("actions  "),
        Span::styled("? ", key_style),
        Span::raw("help  "),
        Span::styled("q ", key_style),
        Span::raw("quit"),
    ]);

    f.render_widget(
        Paragraph::new(shortcuts)
            .style(bar_style)
            .alignment(Alignment::Left),
        area,
    );
}

fn render_status_bar_counts(f: &mut Frame, app: &mut AppState, area: Rect) {
    let bar_style = app.theme.text.add_modifier(Modifier::DIM);
    let mut spans = vec![Span::raw(format!(
        "Rows: {} | Selected: {}",
        app.selection.len(),
        app.selection.selection_len()
    ))];
    if !app.source_warnings.is_empty() {
        spans.push(Span::raw(" |"));
        spans.push(Span::styled(
            format!(" {} skipped", app.source_warnings.len()),
            app.theme.buttons.danger,
        ));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans))
            .style(bar_style)
            .alignment(Alignment::Center),
        area,
    );
}

fn render_status_bar_message(f: &mut Frame, app: &mut AppState, area: Rect) {
    let bar_style = app.theme.text.add_modifier(Modifier::DIM);
    let message = app.status_message.as_deref().unwrap_or("");

    f.render_widget(
        Paragraph::new(Line::from(message))
            .style(bar_style)
            .alignment(Alignment::Right),
        area,
    );
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn render_help_overlay(f: &mut Frame, app: &mut AppState) {
    let area = f.area();
    let popup_width = area.width.min(64).saturating_sub(4);
    let popup_height = 24.min(area.height.saturating_sub(2));
    if popup_width == 0 || popup_height == 0 {
        return;
    }
    let popup_rect = centered_popup(area, popup_width, popup_height);

    f.render_widget(Clear, popup_rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_selected)
        .style(app.theme.text)
        .title(" Help ")
        .border_type(BorderType::Double)
        .title_style(app.theme.title);

    let inner_area = block.inner(popup_rect);
    f.render_widget(block, popup_rect);

    let key_style = app.theme.title;
    let desc_style = app.theme.text;
    let header_style = key_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let format_section = |title: &str, items: Vec<(&str, &str)>| -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(title.to_string(), header_style))];
        for (key, desc) in items {
            lines.push(Line::from(vec![
                Span::styled(format!("{: <18}", key), key_style),
                Span::styled(desc.to_string(), desc_style),
            ]));
        }
        lines
    };

    let mut lines = format_section(
        "Selection",
        vec![
            ("Click", "select only this row"),
            ("Ctrl+Click", "toggle row"),
            ("Shift+Click", "select range from anchor"),
            ("Drag", "toggle rows under the pointer"),
            ("Space", "toggle focused row"),
            ("Shift+Up | Down", "extend selection"),
            ("Ctrl+A", "select all"),
            ("Esc", "clear selection"),
        ],
    );
    lines.push(Line::from(""));
    lines.extend(format_section(
        "Action Bar",
        vec![
            ("Tab", "focus bar | table"),
            ("Left | Right", "choose action"),
            ("Enter", "run action"),
            ("Esc", "clear selection"),
        ],
    ));
    lines.push(Line::from(""));
    lines.extend(format_section(
        "General",
        vec![
            ("Home | End", "first | last row"),
            ("PgUp | PgDn", "page"),
            ("?", "toggle help"),
            ("q", "quit"),
        ],
    ));

    f.render_widget(
        Paragraph::new(lines),
        inner_area.inner(Margin {
            vertical: 0,
            horizontal: 1,
        }),
    );
}

/// Renders the Inspect modal: the selected items as pretty JSON in a
/// scrollable view.
fn render_inspect_modal(f: &mut Frame, app: &mut AppState) {
    let Some(items) = &app.inspect_items else {
        return;
    };
    let count = items.len();
    let json = serde_json::to_string_pretty(items)
        .unwrap_or_else(|_| "Error formatting JSON".to_string());
    let (lines, total_lines) = inspect_lines(&json);
    let truncated = total_lines > MAX_INSPECT_LINES;

    let area = f.area();
    let popup_width = (area.width.saturating_mul(4) / 5).max(area.width.min(40));
    let popup_height = area.height.saturating_sub(4);
    if popup_width < 3 || popup_height < 3 {
        return;
    }
    let popup_rect = centered_popup(area, popup_width, popup_height);

    f.render_widget(Clear, popup_rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_selected)
        .style(app.theme.text)
        .title(format!(
            " Inspect ({} {}{}) ",
            count,
            if count == 1 { "item" } else { "items" },
            if truncated {
                format!(", first {} of {} lines", MAX_INSPECT_LINES, total_lines)
            } else {
                String::new()
            }
        ))
        .title_style(app.theme.title)
        .title_bottom(Line::from(" ↑/↓ scroll • Esc close ").right_aligned());

    let inner_area = block.inner(popup_rect);
    f.render_widget(block, popup_rect);

    let horizontal_padding = 1;
    let content_width = inner_area.width.saturating_sub(horizontal_padding * 2);
    if content_width == 0 || inner_area.height == 0 {
        return;
    }

    let content_height = u16::try_from(lines.len()).unwrap_or(u16::MAX);

    let mut scroll_view = ScrollView::new(Size::new(content_width, content_height))
        .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
        .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

    let scroll_area = scroll_view.area();
    scroll_view.buf_mut().set_style(scroll_area, app.theme.text);
    scroll_view.render_widget(
        Paragraph::new(lines).style(app.theme.text),
        Rect::new(0, 0, content_width, content_height),
    );

    let scroll_view_area = Rect::new(
        inner_area.x + horizontal_padding,
        inner_area.y,
        content_width,
        inner_area.height,
    );
    f.render_stateful_widget(scroll_view, scroll_view_area, &mut app.inspect_scroll);
}

/// Splits `json` into at most [`MAX_INSPECT_LINES`] lines, followed by a
/// marker when the rest was cut. Also returns the full line count.
fn inspect_lines(json: &str) -> (Vec<Line<'static>>, usize) {
    let total = json.lines().count();
    let mut lines: Vec<Line<'static>> = json
        .lines()
        .take(MAX_INSPECT_LINES)
        .map(|line| Line::from(line.to_string()))
        .collect();
    if total > MAX_INSPECT_LINES {
        lines.push(Line::from(format!(
            "… {} more lines, use Export for the full selection",
            total - MAX_INSPECT_LINES
        )));
    }
    (lines, total)
}
