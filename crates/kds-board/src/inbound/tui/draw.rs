//! Render functions for the board screen. Pure: everything they show comes
//! in as arguments, which is what makes the buffer tests below possible.

use chrono::{DateTime, Local, Utc};
use kds_types::domain::action::next_action;
use kds_types::domain::lane::Lane;
use kds_types::domain::order::{Order, OrderItem, OrderStatus};
use kds_types::domain::timing::{elapsed_ms, is_new_pending, is_overdue, order_tone, Tone};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::application::board::BoardState;
use crate::notice::NoticeLevel;

/// Per-frame UI state owned by the screen loop.
#[derive(Debug, Clone)]
pub struct ScreenState {
    pub focused: Lane,
    pub selected: [usize; 3],
    pub sound_on: bool,
    pub now: DateTime<Utc>,
}

pub fn draw(f: &mut Frame, board: &BoardState, screen: &ScreenState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, chunks[0], board, screen);
    draw_summary(f, chunks[1], board, screen);
    draw_lanes(f, chunks[2], board, screen);
    draw_footer(f, chunks[3], board, screen);
}

fn draw_header(f: &mut Frame, area: Rect, board: &BoardState, screen: &ScreenState) {
    let clock = screen.now.with_timezone(&Local).format("%H:%M:%S");
    let (link, link_style) = if board.online {
        ("LIVE", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        ("OFFLINE", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    };
    let sound = if screen.sound_on { "sound on" } else { "sound off" };

    let line = Line::from(vec![
        Span::styled(
            "Kitchen Display",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {clock}  ")),
        Span::styled(link, link_style),
        Span::raw(format!("  {sound}  ")),
        Span::styled(
            "[1-3/arrows] lane  [up/down] card  [enter] action  [r]efresh  [s]ound  [q]uit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_summary(f: &mut Frame, area: Rect, board: &BoardState, screen: &ScreenState) {
    let overdue = board.lanes.overdue_count(screen.now);
    let synced = match board.synced_at {
        Some(at) => format!("synced {}", at.with_timezone(&Local).format("%H:%M:%S")),
        None => "syncing...".to_string(),
    };
    let overdue_style = if overdue > 0 {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::raw(format!(
            "received {}   preparing {}   ready {}   ",
            board.lanes.received.len(),
            board.lanes.preparing.len(),
            board.lanes.ready.len(),
        )),
        Span::styled(format!("overdue {overdue}"), overdue_style),
        Span::raw(format!("   {synced}")),
    ]);
    let summary = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(summary, area);
}

fn draw_lanes(f: &mut Frame, area: Rect, board: &BoardState, screen: &ScreenState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    for lane in Lane::ALL {
        draw_lane(f, chunks[lane.index()], board, screen, lane);
    }
}

fn draw_lane(f: &mut Frame, area: Rect, board: &BoardState, screen: &ScreenState, lane: Lane) {
    let orders = board.lanes.lane(lane);
    let focused = screen.focused == lane;

    let items: Vec<ListItem> = orders
        .iter()
        .map(|order| ListItem::new(card_lines(order, screen.now)))
        .collect();

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ({})", lane.title(), orders.len()))
                .border_style(border_style),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if focused && !orders.is_empty() {
        state.select(Some(screen.selected[lane.index()].min(orders.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_footer(f: &mut Frame, area: Rect, board: &BoardState, screen: &ScreenState) {
    let line = match &board.notice {
        Some(notice) => {
            let style = match notice.level {
                NoticeLevel::Info => Style::default().fg(Color::Cyan),
                NoticeLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            };
            Line::from(Span::styled(notice.text.clone(), style))
        }
        None => selection_hint(board, screen),
    };
    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

/// What pressing enter would do to the selected card, or why it would not.
fn selection_hint(board: &BoardState, screen: &ScreenState) -> Line<'static> {
    let lane = screen.focused;
    let Some(order) = board.lanes.lane(lane).get(screen.selected[lane.index()]) else {
        return Line::from("");
    };
    match next_action(lane, order.status) {
        Some(action) => Line::from(Span::styled(
            format!("[enter] {} #{:03}", action.label(), order.number),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled(
            format!("#{:03} {}", order.number, order.status.label()),
            Style::default().fg(Color::DarkGray),
        )),
    }
}

fn card_lines(order: &Order, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let tone = order_tone(order, now);
    let mut title = vec![
        Span::styled(
            format!("#{:03}", order.number),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} ", order.table.label)),
        Span::styled(mmss(elapsed_ms(order, now)), tone_style(tone)),
    ];
    if is_new_pending(order, now) {
        title.push(Span::raw(" "));
        title.push(Span::styled(
            "NEW",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }
    if is_overdue(order, now) {
        title.push(Span::raw(" "));
        title.push(Span::styled(
            "OVERDUE",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    if order.status == OrderStatus::Pending {
        title.push(Span::raw(" "));
        title.push(Span::styled(
            "unaccepted",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let items = order
        .items
        .iter()
        .map(item_label)
        .collect::<Vec<_>>()
        .join(", ");
    vec![
        Line::from(title),
        Line::from(Span::styled(items, Style::default().fg(Color::Gray))),
    ]
}

fn item_label(item: &OrderItem) -> String {
    let mut label = format!("{}x {}", item.qty, item.name);
    if let Some(modifiers) = &item.modifiers {
        if !modifiers.is_empty() {
            label.push_str(&format!(" ({})", modifiers.join(", ")));
        }
    }
    if let Some(note) = &item.note {
        label.push_str(&format!(" [{note}]"));
    }
    label
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Normal => Style::default().fg(Color::Green),
        Tone::Warning => Style::default().fg(Color::Yellow),
        Tone::Danger => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

/// Minutes:seconds on the board, e.g. `12:05`. Minutes keep counting past
/// the hour; the kitchen cares about totals, not wall time.
fn mmss(ms: i64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use kds_types::domain::lane::LaneBoard;
    use kds_types::domain::order::TableRef;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Position;
    use ratatui::Terminal;
    use uuid::Uuid;

    fn order(number: u32, status: OrderStatus, age_secs: i64, now: DateTime<Utc>) -> Order {
        Order {
            id: Uuid::new_v4(),
            number,
            status,
            created_at: now - Duration::seconds(age_secs),
            table: TableRef {
                id: Uuid::new_v4(),
                label: format!("T{number}"),
            },
            items: vec![OrderItem {
                name: "Carbonara".into(),
                qty: 2,
                status: None,
                modifiers: Some(vec!["no onion".into()]),
                note: None,
            }],
            total_cents: 2800,
        }
    }

    fn render(board: &BoardState, screen: &ScreenState) -> String {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, board, screen)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[Position::new(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn screen(now: DateTime<Utc>) -> ScreenState {
        ScreenState {
            focused: Lane::Received,
            selected: [0; 3],
            sound_on: true,
            now,
        }
    }

    #[test]
    fn board_renders_lanes_badges_and_counts() {
        let now = Utc::now();
        let orders = vec![
            order(7, OrderStatus::Accepted, 30, now),
            order(8, OrderStatus::Pending, 10, now),
            order(9, OrderStatus::Preparing, 16 * 60, now),
        ];
        let board = BoardState {
            lanes: LaneBoard::classify(orders),
            synced_at: Some(now),
            online: true,
            notice: None,
            pending_cues: 0,
        };

        let out = render(&board, &screen(now));
        assert!(out.contains("Kitchen Display"));
        assert!(out.contains("LIVE"));
        assert!(out.contains("Received (2)"));
        assert!(out.contains("Preparing (1)"));
        assert!(out.contains("Ready (0)"));
        assert!(out.contains("#007"));
        assert!(out.contains("NEW"));
        assert!(out.contains("unaccepted"));
        assert!(out.contains("OVERDUE"));
        assert!(out.contains("overdue 1"));
        assert!(out.contains("2x Carbonara (no onion)"));
    }

    #[test]
    fn nine_minute_cards_carry_no_badges() {
        let now = Utc::now();
        let board = BoardState {
            lanes: LaneBoard::classify(vec![order(4, OrderStatus::Preparing, 9 * 60, now)]),
            synced_at: Some(now),
            online: true,
            notice: None,
            pending_cues: 0,
        };
        let out = render(&board, &screen(now));
        assert!(out.contains("09:00"));
        assert!(!out.contains("OVERDUE"));
        assert!(!out.contains("NEW"));
        assert!(out.contains("overdue 0"));
    }

    #[test]
    fn footer_offers_the_forward_action_for_the_selection() {
        let now = Utc::now();
        let board = BoardState {
            lanes: LaneBoard::classify(vec![order(5, OrderStatus::Accepted, 30, now)]),
            synced_at: Some(now),
            online: true,
            notice: None,
            pending_cues: 0,
        };
        let out = render(&board, &screen(now));
        assert!(out.contains("[enter] Start Cooking #005"));
    }

    #[test]
    fn footer_prefers_an_active_notice() {
        let now = Utc::now();
        let board = BoardState {
            lanes: LaneBoard::default(),
            synced_at: None,
            online: false,
            notice: Some(crate::notice::Notice::error("network error: timeout")),
            pending_cues: 0,
        };
        let out = render(&board, &screen(now));
        assert!(out.contains("network error: timeout"));
        assert!(out.contains("OFFLINE"));
        assert!(out.contains("syncing..."));
    }

    #[test]
    fn age_formats_as_minutes_and_seconds() {
        assert_eq!(mmss(0), "00:00");
        assert_eq!(mmss(59_999), "00:59");
        assert_eq!(mmss(600_000), "10:00");
        assert_eq!(mmss(61 * 60 * 1000 + 5_000), "61:05");
    }
}
