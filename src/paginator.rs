//! Page-by-page display of a log file.

use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;

use tracing::{info, warn};

use crate::error::{Result, ScanError};
use crate::log_file::LogFile;

/// Prompt shown by [`StdinPrompt`] between pages.
pub const CONTINUE_PROMPT: &str = "Press Enter to continue...";

/// One page of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    /// 1-based page number
    pub number: usize,
    /// Total number of pages
    pub total: usize,
    /// Lines on this page
    pub lines: &'a [String],
}

impl Page<'_> {
    /// Whether this is the last page.
    pub fn is_last(&self) -> bool {
        self.number == self.total
    }
}

/// Splits a slice of lines into fixed-size pages.
#[derive(Debug, Clone)]
pub struct Paginator<'a> {
    lines: &'a [String],
    page_size: NonZeroUsize,
    next: usize,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator.
    ///
    /// # Errors
    /// Returns [`ScanError::ZeroPageSize`] when `page_size` is zero.
    pub fn new(lines: &'a [String], page_size: usize) -> Result<Self> {
        let page_size = NonZeroUsize::new(page_size).ok_or(ScanError::ZeroPageSize)?;
        Ok(Self {
            lines,
            page_size,
            next: 0,
        })
    }

    /// Number of pages, `ceil(lines / page_size)`.
    pub fn total_pages(&self) -> usize {
        self.lines.len().div_ceil(self.page_size.get())
    }

    /// Returns the next page, or `None` once every page has been produced.
    pub fn next_page(&mut self) -> Option<Page<'a>> {
        let total = self.total_pages();
        if self.next >= total {
            return None;
        }
        let start = self.next * self.page_size.get();
        let end = (start + self.page_size.get()).min(self.lines.len());
        self.next += 1;
        Some(Page {
            number: self.next,
            total,
            lines: &self.lines[start..end],
        })
    }
}

impl<'a> Iterator for Paginator<'a> {
    type Item = Page<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page()
    }
}

/// Decides whether paging continues after a page has been shown.
///
/// Called between pages, never after the last one.
pub trait PageAdvance {
    /// Returns `Ok(true)` to show the next page, `Ok(false)` to stop.
    ///
    /// # Errors
    /// Returns an I/O error if the acknowledgment cannot be obtained.
    fn advance(&mut self, shown: &Page<'_>) -> io::Result<bool>;
}

impl<F> PageAdvance for F
where
    F: FnMut(&Page<'_>) -> io::Result<bool>,
{
    fn advance(&mut self, shown: &Page<'_>) -> io::Result<bool> {
        self(shown)
    }
}

/// Waits for a line on standard input between pages.
///
/// End of input stops paging.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl PageAdvance for StdinPrompt {
    fn advance(&mut self, _shown: &Page<'_>) -> io::Result<bool> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{CONTINUE_PROMPT}")?;
        stdout.flush()?;
        let mut answer = String::new();
        let read = io::stdin().lock().read_line(&mut answer)?;
        if read == 0 {
            warn!("End of input reached, stopping pagination.");
            return Ok(false);
        }
        Ok(true)
    }
}

/// Never pauses between pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPause;

impl PageAdvance for NoPause {
    fn advance(&mut self, _shown: &Page<'_>) -> io::Result<bool> {
        Ok(true)
    }
}

/// Writes one page: a blank separator, the `Page n/total` header, then the
/// trimmed lines.
///
/// # Errors
/// Returns an I/O error if writing fails.
pub fn write_page<W: Write>(page: &Page<'_>, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Page {}/{}", page.number, page.total)?;
    writeln!(out)?;
    for line in page.lines {
        writeln!(out, "{}", line.trim())?;
    }
    Ok(())
}

/// Displays a log file page by page, consulting `advance` between pages.
///
/// Returns the number of pages shown.
///
/// # Errors
/// Returns [`ScanError::ZeroPageSize`] before touching the file when
/// `page_size` is zero, and a [`ScanError`] if the file cannot be read or the
/// output cannot be written.
pub fn display_paged<A, W>(
    log: &LogFile,
    page_size: usize,
    advance: &mut A,
    out: &mut W,
) -> Result<usize>
where
    A: PageAdvance + ?Sized,
    W: Write,
{
    if page_size == 0 {
        return Err(ScanError::ZeroPageSize);
    }
    let lines = log.read_lines()?;
    let paginator = Paginator::new(&lines, page_size)?;
    let total = paginator.total_pages();

    let mut shown = 0;
    for page in paginator {
        write_page(&page, out)?;
        out.flush()?;
        shown += 1;
        if !page.is_last() && !advance.advance(&page)? {
            break;
        }
    }
    info!(
        "Displayed {}/{} page(s) of {} line(s) from {}",
        shown,
        total,
        lines.len(),
        log.path().display()
    );
    Ok(shown)
}
