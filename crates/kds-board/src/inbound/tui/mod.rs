//! Terminal adapter: the board screen and its key handling.
//!
//! The loop draws every pass and spends the rest of each tick waiting on the
//! keyboard, so key presses repaint immediately while the age clocks tick
//! about four times a second. Status changes run on spawned tasks; the
//! screen never blocks on the network.

pub mod draw;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use kds_types::domain::lane::Lane;
use kds_types::ports::order_source::OrderSource;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::application::alerts::cue_count;
use crate::application::board::{BoardService, BoardState, SyncTrigger};
use crate::notice::Notice;
use draw::ScreenState;

const TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct BoardTui<S: OrderSource> {
    service: Arc<BoardService<S>>,
    triggers: mpsc::Sender<SyncTrigger>,
    sound_on: bool,
    focused: Lane,
    selected: [usize; 3],
}

impl<S: OrderSource> BoardTui<S> {
    pub fn new(
        service: Arc<BoardService<S>>,
        triggers: mpsc::Sender<SyncTrigger>,
        sound_on: bool,
    ) -> Self {
        Self {
            service,
            triggers,
            sound_on,
            focused: Lane::Received,
            selected: [0; 3],
        }
    }

    /// Own the terminal until the operator quits. Raw mode is undone on the
    /// way out and from a panic hook, so a crash never leaves the shell in
    /// the alternate screen.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            default_hook(info);
        }));

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.screen_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    async fn screen_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut last_tick = Instant::now();
        loop {
            let board = self.service.state().await;
            self.clamp_selection(&board);
            let screen = ScreenState {
                focused: self.focused,
                selected: self.selected,
                sound_on: self.sound_on,
                now: Utc::now(),
            };
            terminal.draw(|f| draw::draw(f, &board, &screen))?;

            let timeout = TICK.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press
                        && self.handle_key(key.code, &board).await == Flow::Quit
                    {
                        return Ok(());
                    }
                }
            }

            if last_tick.elapsed() >= TICK {
                last_tick = Instant::now();
                self.service.expire_notice().await;
                let cues = self.service.take_cues().await;
                chime(cue_count(cues, self.sound_on));
            }
        }
    }

    async fn handle_key(&mut self, code: KeyCode, board: &BoardState) -> Flow {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Left => self.focused = cycle(self.focused, -1),
            KeyCode::Right => self.focused = cycle(self.focused, 1),
            KeyCode::Char('1') => self.focused = Lane::Received,
            KeyCode::Char('2') => self.focused = Lane::Preparing,
            KeyCode::Char('3') => self.focused = Lane::Ready,
            KeyCode::Up => {
                let sel = &mut self.selected[self.focused.index()];
                *sel = sel.saturating_sub(1);
            }
            KeyCode::Down => {
                let len = board.lanes.lane(self.focused).len();
                let sel = &mut self.selected[self.focused.index()];
                if *sel + 1 < len {
                    *sel += 1;
                }
            }
            KeyCode::Enter => self.dispatch(board),
            KeyCode::Char('r') => {
                let _ = self.triggers.try_send(SyncTrigger::Manual);
            }
            KeyCode::Char('s') => {
                self.sound_on = !self.sound_on;
                let text = if self.sound_on {
                    "sound on"
                } else {
                    "sound off"
                };
                self.service.push_notice(Notice::info(text)).await;
            }
            _ => {}
        }
        Flow::Continue
    }

    /// Fire the focused card's action on a worker task and resync behind it.
    /// Precondition checks live in the service; a blocked card only costs a
    /// footer notice.
    fn dispatch(&self, board: &BoardState) {
        let lane = self.focused;
        let Some(order) = board.lanes.lane(lane).get(self.selected[lane.index()]) else {
            return;
        };
        let id = order.id;
        let service = Arc::clone(&self.service);
        let triggers = self.triggers.clone();
        tokio::spawn(async move {
            if let Ok(Some(_)) = service.advance(lane, id).await {
                let _ = triggers.send(SyncTrigger::PostAction).await;
            }
        });
    }

    fn clamp_selection(&mut self, board: &BoardState) {
        for lane in Lane::ALL {
            let len = board.lanes.lane(lane).len();
            let sel = &mut self.selected[lane.index()];
            if len == 0 {
                *sel = 0;
            } else if *sel >= len {
                *sel = len - 1;
            }
        }
    }
}

fn cycle(lane: Lane, step: isize) -> Lane {
    let len = Lane::ALL.len() as isize;
    let idx = (lane.index() as isize + step).rem_euclid(len);
    Lane::ALL[idx as usize]
}

/// Terminal bell, once per fresh ticket. The alternate screen passes the
/// control byte through untouched.
fn chime(count: usize) {
    if count == 0 {
        return;
    }
    let mut out = io::stdout();
    for _ in 0..count {
        let _ = out.write_all(b"\x07");
    }
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_focus_cycles_both_ways() {
        assert_eq!(cycle(Lane::Received, 1), Lane::Preparing);
        assert_eq!(cycle(Lane::Preparing, 1), Lane::Ready);
        assert_eq!(cycle(Lane::Ready, 1), Lane::Received);
        assert_eq!(cycle(Lane::Received, -1), Lane::Ready);
        assert_eq!(cycle(Lane::Ready, -1), Lane::Preparing);
    }
}
