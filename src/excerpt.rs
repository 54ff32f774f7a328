use once_cell::unsync::OnceCell;

/// A view over the document text that lazily builds a line-break index, used to turn a byte
/// offset into a 1-based line number and a short excerpt when reporting a [`crate::error::DocumentError`].
/// The index is only built if a caller actually asks for a position or excerpt — most
/// well-formed documents never need it.
pub(crate) struct Source<'s> {
    text: &'s str,
    line_breaks: OnceCell<Vec<usize>>,
}

impl<'s> Source<'s> {
    pub(crate) fn new(text: &'s str) -> Self {
        Source { text, line_breaks: OnceCell::new() }
    }

    fn line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.text
                .bytes()
                .enumerate()
                .filter_map(|(index, b)| if b == b'\n' { Some(index) } else { None })
                .collect()
        })
    }

    /// The 1-based line number containing `offset`.
    pub(crate) fn line_at(&self, offset: usize) -> usize {
        let breaks = self.line_breaks();
        match breaks.binary_search(&offset) {
            Ok(index) | Err(index) => index + 1,
        }
    }

    /// A short excerpt of the text around `offset`, for `LexStuck` diagnostics.
    pub(crate) fn excerpt_at(&self, offset: usize) -> String {
        const RADIUS: usize = 16;
        let start = offset.saturating_sub(RADIUS);
        let end = (offset + RADIUS).min(self.text.len());
        // Offsets come from byte-indexed scanning over ASCII structural characters, so `start`
        // and `end` may land inside a multi-byte UTF-8 sequence; widen to the nearest boundary.
        let start = (start..=offset).find(|&i| self.text.is_char_boundary(i)).unwrap_or(0);
        let end = (end..=self.text.len()).find(|&i| self.text.is_char_boundary(i)).unwrap_or(self.text.len());
        self.text[start..end].to_string()
    }
}
