use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("cannot open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "terminal is {cols}x{rows} cells, need at least {min_cols}x{min_rows}",
        min_cols = crate::terminal::MIN_COLS,
        min_rows = crate::terminal::MIN_ROWS
    )]
    TerminalTooSmall { cols: u16, rows: u16 },
}
