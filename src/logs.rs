//! Terminal progress display for deck runs.

use std::io::{stderr, Error as IoError, Stderr, Write};
use std::num::NonZero;
use std::time::{Duration, Instant};

use termion::color::{self, Color as TermColor};

/// Something that happened on the reader (`0`) or a worker thread.
#[derive(Debug, Clone)]
pub enum LogEvent {
    Rendered(usize),
    Failed(usize, String),
    Skipped(String),
    Total(usize),
    Warn(usize, String),
    Status(usize, String),
    Error(usize, String),
    Done(usize, String),
}

#[derive(Debug, Clone)]
enum Lane {
    Busy(String),
    Halted(String),
    Finished(String),
}

impl Default for Lane {
    fn default() -> Self {
        Self::Busy(String::new())
    }
}

#[derive(Debug, Clone, Default)]
struct Tally {
    /// Cards finished by each worker, indexed by worker id (slot 0 unused).
    per_worker: Vec<usize>,
    finished: usize,
    failed: usize,
    skipped: usize,
    total: Option<usize>,
}

/// One line per worker plus a deck-wide line, pinned to the bottom of the terminal while
/// warnings scroll above them.
#[derive(Debug, Clone)]
pub struct ProgressBar<T: Write> {
    tty: T,
    lanes: Vec<Lane>,
    tally: Tally,
    frame: usize,
    last_frame: Instant,
}

const DECK_WIDTH: usize = 16;
const LANE_WIDTH: usize = 8;
const LANE_STAGGER: usize = 3;
const FRAME: Duration = Duration::from_millis(100);

impl ProgressBar<Stderr> {
    pub fn new_stderr(n_workers: NonZero<usize>) -> Result<Self, IoError> {
        Self::new(n_workers, stderr())
    }
}

impl<T: Write> ProgressBar<T> {
    pub fn new(n_workers: NonZero<usize>, tty: T) -> Result<Self, IoError> {
        let lanes = n_workers.get() + 1;
        let mut pbar = Self {
            tty,
            lanes: vec![Lane::default(); lanes],
            tally: Tally { per_worker: vec![0; lanes], ..Default::default() },
            frame: 0,
            last_frame: Instant::now(),
        };
        // reserve the pinned rows
        write!(pbar.tty, "{}", "\n".repeat(lanes))?;
        pbar.show()?;
        Ok(pbar)
    }

    fn n_workers(&self) -> usize {
        self.lanes.len() - 1
    }

    /// Cards finished so far, including failed ones.
    pub fn count(&self) -> usize {
        self.tally.finished
    }

    pub fn failed(&self) -> usize {
        self.tally.failed
    }

    pub fn skipped(&self) -> usize {
        self.tally.skipped
    }

    pub fn log(&mut self, event: LogEvent) -> Result<(), IoError> {
        match event {
            LogEvent::Rendered(id) => self.tick(id),
            LogEvent::Failed(id, msg) => {
                self.tick(id);
                self.tally.failed += 1;
                self.scroll_message(id, "FAIL", &msg, color::LightRed)?;
            }
            LogEvent::Skipped(msg) => {
                self.tally.skipped += 1;
                self.scroll_message(0, "SKIP", &msg, color::LightBlack)?;
            }
            LogEvent::Warn(id, msg) => self.scroll_message(id, "WARN", &msg, color::LightYellow)?,
            LogEvent::Status(id, msg) => self.set_lane(id, Lane::Busy(msg)),
            LogEvent::Error(id, msg) => self.set_lane(id, Lane::Halted(msg)),
            LogEvent::Done(id, msg) => self.set_lane(id, Lane::Finished(msg)),
            LogEvent::Total(n) => self.tally.total = Some(n),
        }
        self.show()
    }

    /// Advances the animation when a frame has elapsed.
    pub fn update(&mut self) -> Result<(), IoError> {
        if self.last_frame.elapsed() < FRAME {
            return Ok(());
        }
        self.last_frame = Instant::now();
        self.frame = self.frame.wrapping_add(1);
        self.show()
    }

    fn tick(&mut self, id: usize) {
        self.tally.finished += 1;
        if let Some(n) = self.tally.per_worker.get_mut(id).filter(|_| id > 0) {
            *n += 1;
        }
    }

    fn set_lane(&mut self, id: usize, lane: Lane) {
        if let Some(slot) = self.lanes.get_mut(id) {
            *slot = lane;
        }
    }

    /// Prints `msg` above the pinned rows, scrolling older output up.
    fn scroll_message(
        &mut self,
        id: usize,
        label: &str,
        msg: &str,
        tint: impl TermColor,
    ) -> Result<(), IoError> {
        let (_, h) = termion::terminal_size()?;
        let clear = termion::clear::UntilNewline;
        let extra_lines = msg.matches('\n').count() as u16;
        let body = msg.replace('\t', "    ").replace('\n', &format!("{clear}\n"));
        let pinned = self.n_workers() as u16 + 1;
        let row = h.saturating_sub(pinned + 1 + extra_lines).max(1);
        write!(
            self.tty,
            "{}{}{}{} {}[{label}] {}{body}{clear}",
            termion::scroll::Up(1 + extra_lines),
            termion::cursor::Goto(1, row),
            color::Fg(color::LightBlack),
            worker_tag(id),
            color::Fg(tint),
            termion::style::Reset,
        )
    }

    fn show(&mut self) -> Result<(), IoError> {
        let (w, h) = termion::terminal_size()?;
        let top = h.saturating_sub(self.n_workers() as u16 + 1).max(1);
        write!(self.tty, "{}", termion::cursor::Goto(1, top))?;
        for id in 1..=self.n_workers() {
            let line = self.worker_line(id);
            self.paint(w, line)?;
        }
        let line = self.deck_line();
        self.paint(w, line)?;
        self.tty.flush()
    }

    fn worker_line(&self, id: usize) -> Line {
        let done = self.tally.per_worker[id];
        let (glyphs, tint, msg) = match &self.lanes[id] {
            Lane::Busy(msg) => {
                let glyphs = spinner(self.frame + id * LANE_STAGGER, LANE_WIDTH);
                (glyphs, color::Blue.fg_str(), msg)
            }
            Lane::Halted(msg) => ("!".repeat(LANE_WIDTH), color::LightRed.fg_str(), msg),
            Lane::Finished(msg) => ("-".repeat(LANE_WIDTH), color::LightGreen.fg_str(), msg),
        };
        Line {
            prefix: format!("{}{} ", color::Fg(color::LightBlack), worker_tag(id)),
            gauge: format!("{tint}[{glyphs} {done:3}]"),
            gauge_cols: LANE_WIDTH + 6,
            msg: msg.clone(),
        }
    }

    fn deck_line(&self) -> Line {
        let Tally { finished, failed, skipped, total, .. } = self.tally;
        let (glyphs, tint, msg) = match &self.lanes[0] {
            Lane::Busy(msg) => {
                let glyphs = match total {
                    Some(total) if total > 0 => meter(finished + skipped, total, DECK_WIDTH),
                    _ => marquee(self.frame, DECK_WIDTH),
                };
                (glyphs, color::LightBlue.fg_str(), msg)
            }
            Lane::Halted(msg) => ("!".repeat(DECK_WIDTH), color::LightRed.fg_str(), msg),
            Lane::Finished(msg) => ("=".repeat(DECK_WIDTH), color::LightGreen.fg_str(), msg),
        };
        let counter = match total {
            Some(total) => format!("{finished:3}/{total:3}"),
            None => format!("{finished:3}"),
        };
        let mut extras = String::new();
        if failed > 0 {
            extras += &format!(" {}✗{failed}", color::LightRed.fg_str());
        }
        if skipped > 0 {
            extras += &format!(" {}∅{skipped}", color::LightBlack.fg_str());
        }
        Line {
            prefix: String::new(),
            gauge: format!("{tint}[{glyphs} {counter}{extras}{tint}]"),
            gauge_cols: DECK_WIDTH + 20,
            msg: msg.clone(),
        }
    }

    fn paint(&mut self, w: u16, line: Line) -> Result<(), IoError> {
        let tag_cols = if line.prefix.is_empty() { 0 } else { 3 };
        let used = tag_cols + line.gauge_cols as u16;
        writeln!(
            self.tty,
            "{}{} {}{}{}",
            line.prefix,
            line.gauge,
            termion::style::Reset,
            ellipsize(&line.msg, w, used),
            termion::clear::UntilNewline,
        )
    }
}

/// One pinned row: an optional worker tag, a bracketed gauge and a status message.
struct Line {
    prefix: String,
    gauge: String,
    /// Printable width of `gauge`, ignoring escape codes.
    gauge_cols: usize,
    msg: String,
}

fn worker_tag(id: usize) -> String {
    if id > 0 {
        format!("{id:02}")
    } else {
        "  ".to_string()
    }
}

/// A single filled arrow travelling along `width` hollow ones.
fn spinner(frame: usize, width: usize) -> String {
    let at = frame % width;
    (0..width).map(|i| if i == at { '▶' } else { '▷' }).collect()
}

/// `done` out of `total` as filled arrows.
fn meter(done: usize, total: usize, width: usize) -> String {
    let filled = ((done as f64 / total as f64) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "▶".repeat(filled), "▷".repeat(width - filled))
}

/// A three-arrow block cycling around the bar while the total is unknown.
fn marquee(frame: usize, width: usize) -> String {
    let start = frame % width;
    (0..width)
        .map(|i| if (i + width - start) % width < 3 { '▶' } else { '▷' })
        .collect()
}

/// Cuts `s` so it fits in a `w` column terminal next to `used` columns of gauge.
fn ellipsize(s: &str, w: u16, used: u16) -> String {
    let room = w.saturating_sub(used) as usize;
    if s.chars().count() >= room {
        format!("{}...", s.chars().take(room.saturating_sub(4)).collect::<String>())
    } else {
        s.to_string()
    }
}
