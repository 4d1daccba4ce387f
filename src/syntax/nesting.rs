//! Lexical nesting scan run before the grammar.
//!
//! pest descends once per nested expression, so its stack use grows with the
//! nesting of the input. This scan walks the raw text without recursion and fails
//! as soon as the nesting it can see exceeds the allowance, so the grammar only
//! ever runs on input of bounded depth.
//!
//! The count is an upper bound on expression nesting: brackets, `if`/`while`/`case`
//! and `let` open a level each, and every prefix operator (`not`, `isvoid`, `~`, `<-`)
//! adds one to the level it appears in until that level reaches a separator.
//! Strings and comments are skipped. Malformed text is not diagnosed here.

/// Extra levels allowed over the configured limit. Class and method braces and the
/// `<-` of a let binding are counted here but are not expression levels.
pub const SCAN_SLACK: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    /// `(` or `{`
    Group,
    /// `if`, `while` or `case`, closed by `fi`, `pool` or `esac`
    Keyword,
    /// `let`; it has no closing keyword and ends with the slot that holds it
    Let { in_body: bool },
}

#[derive(Debug)]
struct Frame {
    level: Level,
    prefix: usize,
}

struct Scan {
    frames: Vec<Frame>,
    depth: usize,
    allowance: usize,
}

impl Scan {
    fn new(allowance: usize) -> Self {
        Self {
            frames: vec![Frame {
                level: Level::Group,
                prefix: 0,
            }],
            depth: 0,
            allowance,
        }
    }

    fn push(&mut self, level: Level) -> bool {
        self.frames.push(Frame { level, prefix: 0 });
        self.depth += 1;
        self.depth <= self.allowance
    }

    fn prefix(&mut self) -> bool {
        if let Some(top) = self.frames.last_mut() {
            top.prefix += 1;
        }
        self.depth += 1;
        self.depth <= self.allowance
    }

    /// Pops the top frame; the root frame is never popped.
    fn pop(&mut self) {
        if self.frames.len() > 1 {
            if let Some(frame) = self.frames.pop() {
                self.depth -= 1 + frame.prefix;
            }
        }
    }

    /// Ends the current slot: its prefix operators are complete.
    fn reset(&mut self) {
        if let Some(top) = self.frames.last_mut() {
            self.depth -= top.prefix;
            top.prefix = 0;
        }
    }

    fn top(&self) -> Option<Level> {
        self.frames.last().map(|frame| frame.level)
    }

    /// Closes `let`s on top of the stack. With `body_only`, a `let` still in its
    /// bindings is kept.
    fn close_lets(&mut self, body_only: bool) {
        while let Some(Level::Let { in_body }) = self.top() {
            if body_only && !in_body {
                break;
            }
            self.pop();
        }
    }

    fn close(&mut self, expected: Level) {
        self.close_lets(false);
        if self.top() == Some(expected) {
            self.pop();
        }
    }

    fn word(&mut self, word: &str) -> bool {
        match word.to_ascii_lowercase().as_str() {
            "if" | "while" | "case" => return self.push(Level::Keyword),
            "let" => return self.push(Level::Let { in_body: false }),
            "not" | "isvoid" => return self.prefix(),
            "fi" | "pool" | "esac" => self.close(Level::Keyword),
            "then" | "else" | "loop" | "of" => {
                self.close_lets(false);
                self.reset();
            }
            "in" => {
                self.close_lets(true);
                self.reset();
                if let Some(frame) = self.frames.last_mut() {
                    if let Level::Let { in_body } = &mut frame.level {
                        *in_body = true;
                    }
                }
            }
            _ => {}
        }
        true
    }
}

/// Scans `text` and returns the byte offset at which nesting first exceeds
/// `allowance`, or `None` when it never does.
pub fn exceeds_nesting(text: &str, allowance: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut scan = Scan::new(allowance);
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let next = bytes.get(i + 1).copied();
        let within = match (bytes[i], next) {
            (b'"', _) => {
                i = skip_string(bytes, i + 1);
                continue;
            }
            (b'-', Some(b'-')) => {
                i = skip_line(bytes, i);
                continue;
            }
            (b'(', Some(b'*')) => {
                i = skip_block_comment(bytes, i);
                continue;
            }
            (b'<', Some(b'-')) => {
                i += 2;
                scan.prefix()
            }
            (b'(', _) | (b'{', _) => {
                i += 1;
                scan.push(Level::Group)
            }
            (b')', _) | (b'}', _) => {
                i += 1;
                scan.close(Level::Group);
                true
            }
            (b'~', _) => {
                i += 1;
                scan.prefix()
            }
            (b';', _) => {
                i += 1;
                scan.close_lets(false);
                scan.reset();
                true
            }
            (b',', _) => {
                i += 1;
                scan.close_lets(true);
                scan.reset();
                true
            }
            (c, _) if c.is_ascii_alphanumeric() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                scan.word(&text[start..i])
            }
            _ => {
                i += 1;
                true
            }
        };

        if !within {
            return Some(start);
        }
    }

    None
}

/// Index just past the closing quote, or the end of the line for an unterminated
/// string.
fn skip_string(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_line(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

fn skip_block_comment(bytes: &[u8], mut i: usize) -> usize {
    let mut open = 0usize;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1).copied()) {
            (b'(', Some(b'*')) => {
                open += 1;
                i += 2;
            }
            (b'*', Some(b')')) => {
                open -= 1;
                i += 2;
                if open == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    bytes.len()
}
