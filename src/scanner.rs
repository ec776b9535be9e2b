//! Cursor primitives used to walk a command line one character at a time.
//!
//! Every primitive is a pure function from `(text, pos)` to a new position and can
//! never move past the end of the text. [`Cursor`] bundles the text and position for
//! the parser's convenience.

/// Width of every register name (`MAT_A` .. `MAT_F`).
pub const REGISTER_NAME_WIDTH: usize = 5;

fn is_blank(byte: u8) -> bool {
    byte.is_ascii_whitespace()
}

/// Advance past spaces, tabs and newlines.
pub fn skip_whitespace(text: &[u8], mut pos: usize) -> usize {
    while pos < text.len() && is_blank(text[pos]) {
        pos += 1;
    }
    pos
}

/// True at the end of the text or on a line feed.
pub fn is_end_of_command(text: &[u8], pos: usize) -> bool {
    matches!(text.get(pos), None | Some(b'\n') | Some(b'\0'))
}

/// Advance past leading whitespace, then past the following non-whitespace run.
pub fn skip_to_next_token(text: &[u8], pos: usize) -> usize {
    let mut pos = skip_whitespace(text, pos);
    while pos < text.len() && !is_blank(text[pos]) {
        pos += 1;
    }
    pos
}

/// Advance by exactly one register-name width, clamped to the end of the text.
pub fn skip_fixed_width(text: &[u8], pos: usize) -> usize {
    (pos + REGISTER_NAME_WIDTH).min(text.len())
}

/// Length of the whitespace-delimited token starting at `pos`.
pub fn token_len(text: &[u8], pos: usize) -> usize {
    text[pos.min(text.len())..]
        .iter()
        .take_while(|&&b| !is_blank(b) && b != b'\0')
        .count()
}

/// Scan a free-form floating point literal starting at `pos`.
///
/// Accepts leading whitespace, an optional sign, digits with an optional fraction
/// (at least one digit overall) and an optional exponent. Returns the value and the
/// position right after the literal, or `None` when nothing could be consumed.
pub fn scan_number(text: &[u8], pos: usize) -> Option<(f64, usize)> {
    let start = skip_whitespace(text, pos);
    let mut end = start;

    if matches!(text.get(end), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_digits = count_digits(text, end);
    end += int_digits;
    let mut frac_digits = 0;
    if text.get(end) == Some(&b'.') {
        frac_digits = count_digits(text, end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    // An exponent only counts when at least one digit follows it.
    if matches!(text.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(text.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(text, exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    let literal = std::str::from_utf8(&text[start..end]).ok()?;
    let value = literal.parse::<f64>().ok()?;
    Some((value, end))
}

fn count_digits(text: &[u8], pos: usize) -> usize {
    text[pos.min(text.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

/// A read position over one line of input.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            text: line.as_bytes(),
            pos: 0,
        }
    }

    pub fn at(line: &'a str, pos: usize) -> Self {
        let text = line.as_bytes();
        Self {
            text,
            pos: pos.min(text.len()),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The unread remainder of the line.
    pub fn rest(&self) -> &'a [u8] {
        &self.text[self.pos..]
    }

    pub fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    pub fn peek_is(&self, byte: u8) -> bool {
        self.peek() == Some(byte)
    }

    pub fn is_end_of_command(&self) -> bool {
        is_end_of_command(self.text, self.pos)
    }

    pub fn skip_whitespace(&mut self) {
        self.pos = skip_whitespace(self.text, self.pos);
    }

    pub fn skip_to_next_token(&mut self) {
        self.pos = skip_to_next_token(self.text, self.pos);
    }

    pub fn skip_fixed_width(&mut self) {
        self.pos = skip_fixed_width(self.text, self.pos);
    }

    /// Step over a single character. No-op at the end of the line.
    pub fn bump(&mut self) {
        if self.pos < self.text.len() {
            self.pos += 1;
        }
    }

    pub fn token_len(&self) -> usize {
        token_len(self.text, self.pos)
    }

    /// Scan a number; on success the cursor moves past it, otherwise it stays put.
    pub fn scan_number(&mut self) -> Option<f64> {
        let (value, end) = scan_number(self.text, self.pos)?;
        self.pos = end;
        Some(value)
    }
}
