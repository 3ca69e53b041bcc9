//! UI rendering logic

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use vantage_core::types::Address;
use vantage_core::Engine;

use crate::app::{App, PromptKind};

/// Draw the UI
pub fn draw(frame: &mut Frame, app: &mut App)
{
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(0),    // Listing
        Constraint::Length(3), // Footer / prompt / status
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_listing(frame, chunks[1], app);
    draw_footer(frame, chunks[2], app);
}

/// Draw the header bar with the target title
fn draw_header(frame: &mut Frame, area: Rect, app: &App)
{
    let header = Paragraph::new(app.title.clone())
        .block(Block::default().borders(Borders::ALL).title("Vantage"))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    frame.render_widget(header, area);
}

/// Draw the listing around the cursor: labels, comments, and queued
/// disassembly roots
fn draw_listing(frame: &mut Frame, area: Rect, app: &App)
{
    let analysis = app.engine.analysis();
    let cursor = analysis.cursor();

    let mut rows: Vec<(Address, String)> = analysis
        .labels()
        .map(|(addr, name)| (addr, name.to_string()))
        .collect();
    if let Some(addr) = cursor {
        if !rows.iter().any(|(row_addr, _)| *row_addr == addr) {
            rows.push((addr, String::new()));
        }
    }
    rows.sort_by_key(|(addr, _)| *addr);

    let visible = area.height.saturating_sub(2) as usize;
    let cursor_idx = cursor
        .and_then(|addr| rows.iter().position(|(row_addr, _)| *row_addr == addr))
        .unwrap_or(0);
    let first = cursor_idx.saturating_sub(visible / 2);

    let lines: Vec<Line> = rows
        .iter()
        .skip(first)
        .take(visible)
        .map(|(addr, name)| {
            let mut spans = vec![Span::raw(format!("{addr:>18}  "))];
            if !name.is_empty() {
                spans.push(Span::styled(name.clone(), Style::default().fg(Color::Yellow)));
            }
            if let Some(comment) = analysis.comment_at(*addr) {
                spans.push(Span::styled(
                    format!("  ; {comment}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            let line = Line::from(spans);
            if Some(*addr) == cursor {
                line.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                line
            }
        })
        .collect();

    let title = format!(
        "listing: {} labels, {} roots",
        analysis.labels().count(),
        analysis.roots().len()
    );
    let listing = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(listing, area);
}

/// Draw the footer: the open prompt, the latest status, or the key help
fn draw_footer(frame: &mut Frame, area: Rect, app: &App)
{
    let text = if let Some(prompt) = &app.prompt {
        let label = match prompt.kind {
            PromptKind::Goto => "goto",
            PromptKind::Rename => "rename",
            PromptKind::Comment => "comment",
        };
        format!("{label}> {}", prompt.buffer)
    } else if let Some(status) = &app.status {
        status.clone()
    } else {
        "g:Goto n:Rename ;:Comment c:Disassemble ↑/↓:Navigate q:Quit".to_string()
    };

    let style = if app.status.is_some() && app.prompt.is_none() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };

    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    frame.render_widget(footer, area);
}
