use crate::config::Settings;
use crate::growth::RoomUpgrade;
use crate::model::{Effect, HeldItem, MoodTier, PetState, SleepPhase};
use crate::room::{Location, Point, Room};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

/// Filler placed right of a double-width glyph; never printed.
const WIDE_TAIL: char = '\0';
const PANEL_W: u16 = 34;
/// Room coordinates span 0..ROOM_EXTENT on both axes.
const ROOM_EXTENT: f32 = 512.0;
/// Names drawn on the room obstacles, in obstacle order.
const FURNITURE_LABELS: &[&str] = &["bed", "shelf", "wardrobe", "counter"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell {
            ch: ' ',
            fg: Color::White,
            bg,
        });
    }

    /// Text of row `y`, wide-glyph filler removed.
    #[cfg(test)]
    pub(crate) fn row_text(&self, y: u16) -> String {
        (0..self.w)
            .filter_map(|x| self.get(x, y))
            .map(|c| c.ch)
            .filter(|&ch| ch != WIDE_TAIL)
            .collect()
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] || c.ch == WIDE_TAIL {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F | 0x2E80..=0x303E | 0x3041..=0x33FF | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF | 0xA960..=0xA97F | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6 | 0x1F300..=0x1FAFF)
}

/// Terminal columns `s` occupies.
pub(crate) fn text_width(s: &str) -> u16 {
    s.chars().map(|c| if is_wide(c) { 2u16 } else { 1 }).sum()
}

/// Draws `s` from column `x`, stopping at `max_x`. Returns the next column.
pub(crate) fn draw_text_clipped(
    buf: &mut CellBuffer,
    x: u16,
    y: u16,
    max_x: u16,
    s: &str,
    fg: Color,
    bg: Color,
) -> u16 {
    let mut xx = x;
    for ch in s.chars() {
        let w = if is_wide(ch) { 2 } else { 1 };
        if xx.saturating_add(w) > max_x.min(buf.w) || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
        if w == 2 {
            let tail = Cell {
                ch: WIDE_TAIL,
                fg,
                bg,
            };
            buf.set(xx + 1, y, tail);
        }
        xx += w;
    }
    xx
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    let max_x = buf.w;
    draw_text_clipped(buf, x, y, max_x, s, fg, bg);
}

fn bar(value01: f32, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f32 + 0.5) as usize;
    let mut s = String::new();
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

/// Cell rectangle the room is drawn into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) w: u16,
    pub(crate) h: u16,
}

impl Viewport {
    pub(crate) fn beside_panel(cols: u16, rows: u16) -> Self {
        let x = PANEL_W.min(cols.saturating_sub(10));
        Self {
            x,
            y: 0,
            w: cols.saturating_sub(x),
            h: rows.saturating_sub(1),
        }
    }

    pub(crate) fn to_cell(&self, p: Point) -> (u16, u16) {
        let fx = (p.x / ROOM_EXTENT).clamp(0.0, 1.0);
        let fy = (p.y / ROOM_EXTENT).clamp(0.0, 1.0);
        let cx = self.x + ((fx * self.w.saturating_sub(1) as f32).round() as u16);
        let cy = self.y + ((fy * self.h.saturating_sub(1) as f32).round() as u16);
        (cx, cy)
    }
}

struct Palette {
    floor: Color,
    wall: Color,
    furniture: Color,
    text: Color,
    pet: Color,
    bubble: Color,
    accent: Color,
}

impl Palette {
    fn pick(st: &PetState, settings: &Settings) -> Self {
        if !settings.enable_color {
            return Self {
                floor: Color::Black,
                wall: Color::White,
                furniture: Color::White,
                text: Color::White,
                pet: Color::White,
                bubble: Color::White,
                accent: Color::White,
            };
        }
        let dark = st.room_dark;
        let pet = match st.needs.mood() {
            MoodTier::Happy => Color::Yellow,
            MoodTier::Neutral => Color::White,
            MoodTier::Sad => Color::Blue,
        };
        Self {
            floor: Color::Black,
            wall: if dark { Color::DarkGrey } else { Color::Grey },
            furniture: if dark { Color::DarkGrey } else { Color::DarkYellow },
            text: Color::White,
            pet: if dark { Color::DarkGrey } else { pet },
            bubble: Color::Cyan,
            accent: if dark { Color::DarkBlue } else { Color::Green },
        }
    }
}

fn pet_glyph(st: &PetState, now: u64) -> char {
    if st.sleep_phase.is_asleep() {
        return 'z';
    }
    if st.is_jumping(now) {
        return '^';
    }
    match st.needs.mood() {
        MoodTier::Happy => '☺',
        MoodTier::Neutral => '•',
        MoodTier::Sad => '☹',
    }
}

fn held_glyph(item: HeldItem) -> Option<char> {
    match item {
        HeldItem::None => None,
        HeldItem::Book => Some('b'),
        HeldItem::WateringCan => Some('w'),
        HeldItem::Duster => Some('d'),
        HeldItem::Roller => Some('r'),
    }
}

fn effect_glyph(effect: Effect) -> Option<char> {
    match effect {
        Effect::None => None,
        Effect::Water => Some('~'),
        Effect::Dust => Some('°'),
    }
}

pub(crate) fn draw_room(
    buf: &mut CellBuffer,
    vp: Viewport,
    room: &Room,
    st: &PetState,
    settings: &Settings,
    now: u64,
) {
    let pal = Palette::pick(st, settings);
    if vp.w < 4 || vp.h < 4 {
        return;
    }
    let on_floor = |ch, fg| Cell {
        ch,
        fg,
        bg: pal.floor,
    };

    let (bx1, by1) = vp.to_cell(Point::new(room.bounds.x1, room.bounds.y1));
    let (bx2, by2) = vp.to_cell(Point::new(room.bounds.x2, room.bounds.y2));
    for x in bx1..=bx2 {
        buf.set(x, by1, on_floor('─', pal.wall));
        buf.set(x, by2, on_floor('─', pal.wall));
    }
    for y in by1..=by2 {
        buf.set(bx1, y, on_floor('│', pal.wall));
        buf.set(bx2, y, on_floor('│', pal.wall));
    }

    for (i, r) in room.obstacles.iter().enumerate() {
        let (x1, y1) = vp.to_cell(Point::new(r.x1, r.y1));
        let (x2, y2) = vp.to_cell(Point::new(r.x2, r.y2));
        for y in y1..=y2 {
            for x in x1..=x2 {
                buf.set(x, y, on_floor('░', pal.furniture));
            }
        }
        if let Some(label) = FURNITURE_LABELS.get(i) {
            draw_text_clipped(buf, x1 + 1, y1 + (y2 - y1) / 2, x2, label, pal.text, pal.floor);
        }
    }

    for (loc, ch) in [(Location::Plant, '*'), (Location::Calendar, '#')] {
        let (x, y) = vp.to_cell(loc.point());
        buf.set(x, y, on_floor(ch, pal.accent));
    }

    let (px, mut py) = vp.to_cell(st.position);
    if st.is_jumping(now) {
        py = py.saturating_sub(1).max(vp.y);
    }
    buf.set(px, py, on_floor(pet_glyph(st, now), pal.pet));
    if let Some(ch) = held_glyph(st.held_item) {
        buf.set(px + 1, py, on_floor(ch, pal.accent));
    }
    if let Some(ch) = effect_glyph(st.effect) {
        buf.set(px.saturating_sub(1), py, on_floor(ch, pal.bubble));
    }

    if !st.bubble.text.is_empty() && py > vp.y {
        let right = vp.x + vp.w;
        let width = text_width(&st.bubble.text).min(vp.w);
        let x = px
            .saturating_sub(width / 2)
            .max(vp.x)
            .min(right.saturating_sub(width));
        draw_text_clipped(buf, x, py - 1, right, &st.bubble.text, pal.bubble, pal.floor);
    }
}

fn sleep_label(phase: SleepPhase) -> &'static str {
    match phase {
        SleepPhase::None => "awake",
        SleepPhase::MovingToBed => "going to bed",
        SleepPhase::Settling => "settling",
        SleepPhase::Blanketed => "under the blanket",
        SleepPhase::Sleeping => "asleep",
        SleepPhase::Waking => "waking up",
    }
}

pub(crate) fn draw_panel(
    buf: &mut CellBuffer,
    st: &PetState,
    settings: &Settings,
    upgrades: &[RoomUpgrade],
    chat_input: Option<&str>,
) {
    let pal = Palette::pick(st, settings);
    let (fg, bg) = (pal.text, Color::Black);
    let max_x = PANEL_W.min(buf.w);

    let title = format!("{}  ({:?})", settings.pet_name, st.needs.mood());
    draw_text_clipped(buf, 1, 0, max_x, &title, fg, bg);

    let n = st.needs;
    let meters = [("Hunger", n.hunger), ("Energy", n.energy), ("Love  ", n.affection)];
    for (i, (name, val)) in meters.iter().enumerate() {
        let s = format!("{name} {} {:>3.0}", bar(*val / 100.0, 14), val);
        draw_text_clipped(buf, 1, 2 + i as u16, max_x, &s, fg, bg);
    }

    let mut y = 6;
    let task = st.current_category.as_deref().unwrap_or("-");
    for line in [
        format!("Sleep: {}", sleep_label(st.sleep_phase)),
        format!("Task:  {task}"),
        format!("Light: {}", if st.room_dark { "off" } else { "on" }),
    ] {
        draw_text_clipped(buf, 1, y, max_x, &line, fg, bg);
        y += 1;
    }

    if !upgrades.is_empty() {
        y += 1;
        draw_text_clipped(buf, 1, y, max_x, "Room:", fg, bg);
        y += 1;
        for u in upgrades {
            let line = format!(" {} Lv{} {}", u.category, u.level, u.label);
            draw_text_clipped(buf, 1, y, max_x, &line, pal.accent, bg);
            y += 1;
        }
    }

    let bottom = buf.h.saturating_sub(1);
    match chat_input {
        Some(text) => {
            let line = format!("> {text}_");
            draw_text(buf, 1, bottom, &line, fg, bg);
        }
        None => draw_text(
            buf,
            1,
            bottom,
            "q quit | f feed | p pet | space poke | l light | z nap | / chat | h help",
            fg,
            bg,
        ),
    }
}

pub(crate) fn draw_help(buf: &mut CellBuffer) {
    let body = [
        "Your pet wanders the room and tidies up when",
        "left alone. Task events send it to its desk.",
        "",
        "F  feed (twice per 10 min)",
        "P  pet (three times per 10 min)",
        "Space  poke",
        "L  toggle the light",
        "Z  take a nap",
        "/  say something; Enter sends, Esc cancels",
        "",
        "Esc or H to close help.",
    ];
    let bw = 50.min(buf.w.saturating_sub(2));
    let bh = (body.len() as u16 + 4).min(buf.h.saturating_sub(2));
    let x0 = (buf.w.saturating_sub(bw)) / 2;
    let y0 = (buf.h.saturating_sub(bh)) / 2;
    let (fg, bg) = (Color::White, Color::Black);

    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            let edge_y = y == y0 || y + 1 == y0 + bh;
            let edge_x = x == x0 || x + 1 == x0 + bw;
            let ch = match (edge_x, edge_y) {
                (true, true) => '+',
                (false, true) => '─',
                (true, false) => '│',
                (false, false) => ' ',
            };
            buf.set(x, y, Cell { ch, fg, bg });
        }
    }
    draw_text_clipped(
        buf,
        x0 + 2,
        y0 + 1,
        (x0 + bw).saturating_sub(1),
        "How to care for your pet",
        fg,
        bg,
    );
    for (i, line) in body.iter().enumerate() {
        let y = y0 + 3 + i as u16;
        if y + 1 >= y0 + bh {
            break;
        }
        draw_text_clipped(buf, x0 + 2, y, (x0 + bw).saturating_sub(1), line, fg, bg);
    }
}
