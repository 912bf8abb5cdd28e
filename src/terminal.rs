//! Terminal front end
//!
//! Row 0 holds the menu bar and the last row the status line. Every cell in
//! between shows two raster pixels through an upper-half block.

use crate::camera::Camera;
use crate::device::RenderDevice;
use crate::error::ViewerError;
use crate::menu::MenuEntry;
use crate::raster::RasterDevice;
use crate::widget::ViewerWidget;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};
use tracing::warn;

pub const MIN_COLS: u16 = 20;
pub const MIN_ROWS: u16 = 6;
const MENU_ROWS: u16 = 1;
const STATUS_ROWS: u16 = 1;
const UPPER_HALF: char = '\u{2580}';

/// Terminal size in cells, falling back to 80x24 when it cannot be queried
pub fn initial_size() -> (u16, u16) {
    match termsize::get() {
        Some(size) => (size.cols, size.rows),
        None => terminal::size().unwrap_or((80, 24)),
    }
}

pub fn check_size(cols: u16, rows: u16) -> Result<(), ViewerError> {
    if cols < MIN_COLS || rows < MIN_ROWS {
        return Err(ViewerError::TerminalTooSmall { cols, rows });
    }
    Ok(())
}

/// Raster size for a terminal of `cols` x `rows` cells
pub fn viewport_pixels(cols: u16, rows: u16) -> (usize, usize) {
    let view_rows = rows.saturating_sub(MENU_ROWS + STATUS_ROWS);
    (usize::from(cols), usize::from(view_rows) * 2)
}

/// Center of the upper pixel of a viewport cell, or `None` on the menu bar
pub fn cell_to_pixel(column: u16, row: u16) -> Option<[f64; 2]> {
    let row = row.checked_sub(MENU_ROWS)?;
    Some([f64::from(column) + 0.5, f64::from(row) * 2.0 + 1.0])
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

/// Alternate-screen session, restored on drop
pub struct Screen<W: Write = Stdout> {
    out: W,
}

impl Screen<Stdout> {
    pub fn enter() -> Result<Self, ViewerError> {
        terminal::enable_raw_mode()?;
        Screen::open(io::stdout())
    }
}

impl<W: Write> Screen<W> {
    /// Switches `out` to the alternate screen. The session exists before the
    /// setup commands run, so a failure part way still restores the terminal.
    fn open(out: W) -> Result<Self, ViewerError> {
        let mut screen = Screen { out };
        execute!(screen.out, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        Ok(screen)
    }

    /// Draws the raster, the menu bar, any open menu and the status line
    pub fn present<C: Camera>(
        &mut self,
        device: &RasterDevice,
        widget: &ViewerWidget<C>,
    ) -> io::Result<()> {
        if let Some(message) = widget.size_error() {
            queue!(
                self.out,
                ResetColor,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0),
                Print(message)
            )?;
            return self.out.flush();
        }

        let (width, height) = device.viewport();
        let cols = width as u16;

        let mut colors: Option<([u8; 3], [u8; 3])> = None;
        for cell_row in 0..height / 2 {
            queue!(self.out, cursor::MoveTo(0, cell_row as u16 + MENU_ROWS))?;
            for x in 0..width {
                let pair = (device.pixel(x, cell_row * 2), device.pixel(x, cell_row * 2 + 1));
                if colors != Some(pair) {
                    queue!(
                        self.out,
                        SetForegroundColor(rgb(pair.0)),
                        SetBackgroundColor(rgb(pair.1))
                    )?;
                    colors = Some(pair);
                }
                queue!(self.out, Print(UPPER_HALF))?;
            }
        }
        queue!(self.out, ResetColor)?;

        self.menu_bar(widget, cols)?;
        self.drop_down(widget)?;

        let status_row = (height / 2) as u16 + MENU_ROWS;
        let status = fit(&widget.status_line(), usize::from(cols));
        queue!(
            self.out,
            cursor::MoveTo(0, status_row),
            SetAttribute(Attribute::Reverse),
            Print(status),
            SetAttribute(Attribute::Reset)
        )?;

        self.out.flush()
    }

    fn menu_bar<C: Camera>(&mut self, widget: &ViewerWidget<C>, cols: u16) -> io::Result<()> {
        let menu = widget.menu();
        let mut line = String::from(" ");
        for m in menu.menus() {
            line.push_str(&format!(" {}   ", m.title));
        }
        let line = fit(line.trim_end(), usize::from(cols));
        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            SetAttribute(Attribute::Reverse),
            Print(line),
            SetAttribute(Attribute::Reset)
        )?;

        if let Some((open, _)) = menu.open_menu() {
            let (start, _) = menu.title_span(open);
            queue!(
                self.out,
                cursor::MoveTo(start as u16, 0),
                SetAttribute(Attribute::Bold),
                Print(format!(" {} ", menu.menus()[open].title)),
                SetAttribute(Attribute::Reset)
            )?;
        }
        Ok(())
    }

    fn drop_down<C: Camera>(&mut self, widget: &ViewerWidget<C>) -> io::Result<()> {
        let menu = widget.menu();
        let Some((open, highlighted)) = menu.open_menu() else {
            return Ok(());
        };
        let (start, _) = menu.title_span(open);
        let width = menu.menus()[open].width();

        for (i, entry) in menu.menus()[open].entries.iter().enumerate() {
            let text = match entry {
                MenuEntry::Item { label, choice } => {
                    let mark = if widget.mode().is_selected(*choice) {
                        '\u{2022}'
                    } else {
                        ' '
                    };
                    format!(" ({mark}) {label}")
                }
                MenuEntry::Separator => "\u{2500}".repeat(width),
            };
            queue!(self.out, cursor::MoveTo(start as u16, i as u16 + MENU_ROWS))?;
            if i == highlighted {
                queue!(self.out, SetAttribute(Attribute::Reverse))?;
            }
            queue!(
                self.out,
                Print(format!("{text:<width$}")),
                SetAttribute(Attribute::Reset)
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Drop for Screen<W> {
    fn drop(&mut self) {
        let restored = execute!(
            self.out,
            ResetColor,
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .and_then(|()| terminal::disable_raw_mode());
        if let Err(err) = restored {
            warn!(%err, "failed to restore terminal");
        }
    }
}

/// Truncates or pads `text` to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let mut line: String = text.chars().take(width).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat(' ').take(width - len));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn viewport_excludes_menu_and_status_rows() {
        assert_eq!(viewport_pixels(80, 24), (80, 44));
        assert_eq!(viewport_pixels(10, 1), (10, 0));
    }

    #[test]
    fn menu_row_has_no_pixel() {
        assert_eq!(cell_to_pixel(3, 0), None);
        assert_eq!(cell_to_pixel(3, 1), Some([3.5, 1.0]));
        assert_eq!(cell_to_pixel(0, 4), Some([0.5, 7.0]));
    }

    #[test]
    fn small_terminal_is_rejected() {
        assert!(check_size(80, 24).is_ok());
        assert!(matches!(
            check_size(10, 24),
            Err(ViewerError::TerminalTooSmall { cols: 10, rows: 24 })
        ));
    }

    /// Writer that records what was sent and then fails
    #[derive(Clone, Default)]
    struct BrokenWriter {
        sent: Rc<RefCell<Vec<u8>>>,
    }

    impl Write for BrokenWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sent.borrow_mut().extend_from_slice(buf);
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_setup_still_restores() {
        let writer = BrokenWriter::default();
        let result = Screen::open(writer.clone());
        assert!(matches!(result, Err(ViewerError::Io(_))));

        let sent = String::from_utf8_lossy(&writer.sent.borrow()).into_owned();
        let setup = sent.find("\x1b[?1049h").unwrap();
        let restore = sent.find("\x1b[0m").unwrap();
        assert!(restore > setup, "{sent:?}");
    }

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
    }
}
