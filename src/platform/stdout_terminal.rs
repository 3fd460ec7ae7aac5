//! Terminal backed by the process's standard output.
//!
//! Raw mode and key reading stay with the embedder; this type only writes frames and reports
//! the window size.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::config::env_config;
use crate::core::terminal::Terminal;

#[cfg(unix)]
use libc::{self, c_int};

const DEFAULT_COLUMNS: u16 = 80;
const DEFAULT_ROWS: u16 = 24;

#[cfg(unix)]
fn write_all_fd_with<FWrite>(fd: c_int, bytes: &[u8], mut write_once: FWrite) -> std::io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> std::io::Result<usize>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "write returned 0",
                ));
            }
            Ok(count) => written += count.min(bytes.len() - written),
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_fd(fd: c_int, data: &str) -> std::io::Result<()> {
    write_all_fd_with(fd, data.as_bytes(), |fd, buf| {
        let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
        if result < 0 {
            Err(std::io::Error::last_os_error())
        } else {
            Ok(result as usize)
        }
    })
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

#[cfg(not(unix))]
fn read_winsize(_fd: i32) -> Option<(u16, u16)> {
    None
}

pub struct StdoutTerminal {
    #[cfg(unix)]
    stdout_fd: c_int,
    #[cfg(not(unix))]
    stdout_fd: i32,
    cursor_top: usize,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
}

impl StdoutTerminal {
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            stdout_fd: libc::STDOUT_FILENO,
            #[cfg(not(unix))]
            stdout_fd: 1,
            cursor_top: 0,
            write_log_path: env_config().write_log.as_ref().map(PathBuf::from),
            write_log_failed: false,
        }
    }

    /// Window row the cursor is on when the prompt starts, if the embedder knows it
    /// (for example from a cursor position report).
    pub fn with_cursor_top(mut self, cursor_top: usize) -> Self {
        self.cursor_top = cursor_top;
        self
    }

    fn write_stdout(&self, data: &str) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            write_fd(self.stdout_fd, data)
        }
        #[cfg(not(unix))]
        {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data.as_bytes())?;
            stdout.flush()
        }
    }

    fn append_write_log(&mut self, data: &str) {
        if self.write_log_failed {
            return;
        }
        let Some(path) = self.write_log_path.as_ref() else {
            return;
        };
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(data.as_bytes()));
        if let Err(error) = result {
            tracing::warn!(%error, path = %path.display(), "write log disabled");
            self.write_log_failed = true;
        }
    }
}

impl Default for StdoutTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for StdoutTerminal {
    fn write(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        if let Err(error) = self.write_stdout(data) {
            tracing::warn!(%error, "terminal write failed");
        }
        self.append_write_log(data);
    }

    fn columns(&self) -> u16 {
        read_winsize(self.stdout_fd)
            .map(|(cols, _)| cols)
            .unwrap_or(DEFAULT_COLUMNS)
    }

    fn rows(&self) -> u16 {
        read_winsize(self.stdout_fd)
            .map(|(_, rows)| rows)
            .unwrap_or(DEFAULT_ROWS)
    }

    fn cursor_top(&self) -> usize {
        self.cursor_top
    }
}
