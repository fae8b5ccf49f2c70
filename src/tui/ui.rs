//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::binary::Word;
use crate::cpu::Register;
use super::app::{DebuggerApp, LineStatus};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ])
        .split(frame.area());

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(9),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_program(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(13),
            Constraint::Length(5),
        ])
        .split(chunks[1]);

    draw_dump(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the program listing around the next line.
fn draw_program(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible = (area.height as usize).saturating_sub(2);
    let start = app.next_line.saturating_sub(visible / 2);

    let items: Vec<ListItem> = app.program.lines
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(idx, text)| {
            let is_next = idx == app.next_line;
            let prefix = if is_next { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(&idx) { "●" } else { " " };
            let mark = match app.lines[idx] {
                LineStatus::Pending => ' ',
                LineStatus::Done => '✓',
                LineStatus::Failed => '✗',
            };

            let style = if is_next {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                match app.lines[idx] {
                    LineStatus::Failed => Style::default().fg(Color::Red),
                    LineStatus::Done => Style::default().fg(Color::DarkGray),
                    LineStatus::Pending => Style::default(),
                }
            };

            ListItem::new(format!("{bp}{prefix}{:03} {mark} {text}", idx + 1)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Program ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw the register file in binary and decimal.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let snapshot = app.cpu.snapshot("");

    let mut content = vec![word_line("A ", snapshot.accumulator_word())];
    for reg in Register::ALL {
        content.push(word_line(reg.name(), snapshot.register_word(reg)));
    }
    content.push(Line::from(vec![
        Span::raw("PC: "),
        Span::styled(format!("{}", snapshot.pc), Style::default().fg(Color::Yellow)),
        Span::raw("   TC: "),
        Span::styled(format!("{}", snapshot.tc), Style::default().fg(Color::Cyan)),
        Span::raw("   PS: "),
        Span::styled(format!("{}", snapshot.sign), sign_style(snapshot.sign)),
    ]));

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(format!(" Registers ({} bits) ", snapshot.bit_size))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// One register row; values wider than the word are marked as wrapped.
fn word_line(name: &str, word: Word) -> Line<'static> {
    let style = if word.is_negative() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    };
    let mut spans = vec![
        Span::raw(format!("{name}: ")),
        Span::styled(word.to_bits(), style),
        Span::raw(format!(" = {}", word.value())),
    ];
    if !word.fits() {
        spans.push(Span::styled(" (wrapped)", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

/// Draw the state dump of the last cycle.
fn draw_dump(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let text = match &app.last {
        Some(snapshot) => snapshot.to_string(),
        None => "No instruction executed yet.".into(),
    };
    let dump = Paragraph::new(text)
        .block(Block::default()
            .title(" Last cycle ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(dump, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s/Enter: Step  r: Run  p: Pause"),
        Line::from("b: Breakpoint  x: Reset  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn sign_style(sign: u8) -> Style {
    if sign == 1 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}
