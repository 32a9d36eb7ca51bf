//! Newline index over a source buffer.
//!
//! - One memchr pass records every '\n'.
//! - Line numbers are 1-based, matching the oracle's numbering.
//! - Line ends exclude the '\n' and a preceding '\r'.
//! - An empty buffer has 0 lines; otherwise lines = newlines + 1, so a
//!   trailing newline yields a final empty line (same as splitting on '\n').

#[derive(Debug, Clone)]
pub struct LineIndex<'a>
{
    text: &'a str,
    newlines: Vec<usize>,
}

impl<'a> LineIndex<'a>
{
    pub fn new(text: &'a str) -> Self
    {
        let newlines = memchr::memchr_iter(b'\n', text.as_bytes()).collect();
        Self { text, newlines }
    }

    pub fn line_count(&self) -> usize
    {
        if self
            .text
            .is_empty()
        {
            0
        }
        else
        {
            self.newlines
                .len()
                + 1
        }
    }

    /// Byte span (exclusive end) of a 1-based line
    pub fn span(
        &self,
        line: usize,
    ) -> Option<(usize, usize)>
    {
        if line == 0 || line > self.line_count()
        {
            return None;
        }

        let start = match line
        {
            1 => 0,
            _ => self.newlines[line - 2] + 1,
        };

        let mut end = self
            .newlines
            .get(line - 1)
            .copied()
            .unwrap_or(
                self.text
                    .len(),
            );
        if end > start
            && self
                .text
                .as_bytes()[end - 1]
                == b'\r'
        {
            end -= 1;
        }

        Some((start, end))
    }

    /// Text of a 1-based line without its terminator
    pub fn line(
        &self,
        line: usize,
    ) -> Option<&'a str>
    {
        let (s, e) = self.span(line)?;
        self.text
            .get(s..e)
    }

    /// Text of the inclusive 1-based span `first..=last`, inner newlines kept
    pub fn lines(
        &self,
        first: usize,
        last: usize,
    ) -> Option<&'a str>
    {
        if first > last
        {
            return None;
        }
        let (s, _) = self.span(first)?;
        let (_, e) = self.span(last)?;
        self.text
            .get(s..e)
    }
}
