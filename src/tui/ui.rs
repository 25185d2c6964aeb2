//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::cpu::registers::CcFlag;
use super::app::{DebuggerApp, MEM_ROW};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(frame.area());

    // Left side: source and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_source(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Source lines with addresses, cursor and breakpoints.
fn draw_source(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let rows = app.source_view((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let prefix = if row.is_current { "▶ " } else { "  " };
            let bp = if row.is_breakpoint { "●" } else { " " };
            let addr = row.address.map_or("    ".to_string(), |a| format!("{:04X}", a));
            let text = format!("{} {}{:3} {}  {}", bp, prefix, row.index + 1, addr, row.text);

            let style = if row.is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if row.is_breakpoint {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Source ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = app.ctl.registers();
    let value = |text: String| Span::styled(text, Style::default().fg(Color::White));

    let flags: Vec<Span> = CcFlag::ALL
        .iter()
        .map(|&flag| {
            let style = if regs.flag(flag) {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(flag.letter().to_string(), style)
        })
        .collect();

    let mut cc_line = vec![Span::raw("CC: ")];
    cc_line.extend(flags);
    cc_line.push(Span::raw(format!(" (${:02X})", regs.cc)));

    let content = vec![
        Line::from(vec![
            Span::raw("PC: "),
            Span::styled(format!("{:04X}", regs.pc), Style::default().fg(Color::Yellow)),
            Span::raw("   DP: "),
            value(format!("{:02X}", regs.dp)),
        ]),
        Line::from(vec![
            Span::raw("A:  "),
            value(format!("{:02X}", regs.a)),
            Span::raw("     B:  "),
            value(format!("{:02X}", regs.b)),
            Span::raw("   D: "),
            value(format!("{:04X}", regs.d())),
        ]),
        Line::from(vec![
            Span::raw("X:  "),
            value(format!("{:04X}", regs.x)),
            Span::raw("   Y:  "),
            value(format!("{:04X}", regs.y)),
        ]),
        Line::from(vec![
            Span::raw("S:  "),
            value(format!("{:04X}", regs.s)),
            Span::raw("   U:  "),
            value(format!("{:04X}", regs.u)),
        ]),
        Line::from(cc_line),
        Line::from(vec![
            Span::raw("Executed: "),
            Span::styled(format!("{}", app.ctl.cpu().executed), Style::default().fg(Color::Cyan)),
            Span::raw("   History: "),
            Span::styled(format!("{}", app.ctl.history_len()), Style::default().fg(Color::Cyan)),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Hex dump, 16 bytes per row.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let pc = app.ctl.registers().pc as usize;
    let mem = &app.ctl.cpu().mem;

    let items: Vec<ListItem> = (app.mem_scroll..)
        .take(visible_rows)
        .take_while(|row| row * MEM_ROW < 0x10000)
        .map(|row| {
            let base = row * MEM_ROW;
            let bytes: Vec<String> = (0..MEM_ROW)
                .map(|i| format!("{:02X}", mem.peek((base + i) as u16)))
                .collect();
            let text = format!("{:04X}: {}", base, bytes.join(" "));

            let style = if (base..base + MEM_ROW).contains(&pc) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if mem.is_mapped(base as u16) {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
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
        Line::from("s: Step  u: Step back  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓/PgUp/PgDn: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
