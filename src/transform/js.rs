//! Script minifier.
//!
//! Classic JSMin: comments and insignificant whitespace are removed while
//! string, template and regular expression literals pass through untouched.
//! It never renames or restructures code, so the output is always safe to
//! feed back in.

use super::{ContentKind, Transform, TransformError};

/// The JavaScript transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsMinifier;

impl Transform for JsMinifier {
    fn kind(&self) -> ContentKind {
        ContentKind::Js
    }

    fn optimize(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        std::str::from_utf8(input)
            .map_err(|e| TransformError::new(ContentKind::Js, format!("not valid UTF-8: {e}")))?;
        minify(input)
    }
}

fn error(reason: &str) -> TransformError {
    TransformError::new(ContentKind::Js, reason)
}

fn is_alphanum(c: Option<u8>) -> bool {
    match c {
        Some(c) => c.is_ascii_alphanumeric() || c == b'_' || c == b'$' || c == b'\\' || c > 126,
        None => false,
    }
}

/// Minify script source bytes.
pub fn minify(source: &[u8]) -> Result<Vec<u8>, TransformError> {
    let input = source.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(source);
    let mut out = JsMin::new(input).run()?;

    let leading = out.iter().take_while(|&&c| c == b'\n').count();
    out.drain(..leading);
    Ok(out)
}

/// Minifier state; `a` is the byte being emitted, `b` the one after it.
/// `None` stands for end of input.
struct JsMin<'a> {
    input: &'a [u8],
    pos: usize,
    lookahead: Option<Option<u8>>,
    out: Vec<u8>,
    a: Option<u8>,
    b: Option<u8>,
    x: Option<u8>,
    y: Option<u8>,
}

enum Action {
    /// Output `a`, copy `b` to `a`, get the next `b`.
    Output,
    /// Copy `b` to `a`, get the next `b`.
    Copy,
    /// Get the next `b`.
    Skip,
}

impl<'a> JsMin<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            lookahead: None,
            out: Vec::with_capacity(input.len()),
            a: None,
            b: None,
            x: None,
            y: None,
        }
    }

    fn run(mut self) -> Result<Vec<u8>, TransformError> {
        self.a = Some(b'\n');
        self.action(Action::Skip)?;

        while self.a.is_some() {
            let action = match self.a {
                Some(b' ') => {
                    if is_alphanum(self.b) {
                        Action::Output
                    } else {
                        Action::Copy
                    }
                }
                Some(b'\n') => match self.b {
                    Some(b'{' | b'[' | b'(' | b'+' | b'-' | b'!' | b'~') => Action::Output,
                    Some(b' ') => Action::Skip,
                    _ if is_alphanum(self.b) => Action::Output,
                    _ => Action::Copy,
                },
                _ => match self.b {
                    Some(b' ') => {
                        if is_alphanum(self.a) {
                            Action::Output
                        } else {
                            Action::Skip
                        }
                    }
                    Some(b'\n') => match self.a {
                        Some(b'}' | b']' | b')' | b'+' | b'-' | b'"' | b'\'' | b'`') => Action::Output,
                        _ if is_alphanum(self.a) => Action::Output,
                        _ => Action::Skip,
                    },
                    _ => Action::Output,
                },
            };
            self.action(action)?;
        }

        Ok(self.out)
    }

    fn put(&mut self, c: Option<u8>) {
        if let Some(c) = c {
            self.out.push(c);
        }
    }

    /// Next input byte with control characters normalized.
    fn get(&mut self) -> Option<u8> {
        let c = match self.lookahead.take() {
            Some(c) => c,
            None => {
                let c = self.input.get(self.pos).copied();
                if c.is_some() {
                    self.pos += 1;
                }
                c
            }
        };
        match c {
            Some(b'\r') => Some(b'\n'),
            Some(c) if c >= b' ' || c == b'\n' => Some(c),
            Some(_) => Some(b' '),
            None => None,
        }
    }

    fn peek(&mut self) -> Option<u8> {
        let c = self.get();
        self.lookahead = Some(c);
        c
    }

    /// Next significant byte; comments collapse to a newline or a space.
    fn next(&mut self) -> Result<Option<u8>, TransformError> {
        let mut c = self.get();
        if c == Some(b'/') {
            match self.peek() {
                Some(b'/') => loop {
                    c = self.get();
                    if c.is_none_or(|c| c <= b'\n') {
                        break;
                    }
                },
                Some(b'*') => {
                    self.get();
                    loop {
                        match self.get() {
                            Some(b'*') if self.peek() == Some(b'/') => {
                                self.get();
                                c = Some(b' ');
                                break;
                            }
                            None => return Err(error("unterminated comment")),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        self.y = self.x;
        self.x = c;
        Ok(c)
    }

    fn action(&mut self, action: Action) -> Result<(), TransformError> {
        if matches!(action, Action::Output) {
            self.put(self.a);
            let operator = |c: Option<u8>| matches!(c, Some(b'+' | b'-' | b'*' | b'/'));
            if matches!(self.y, Some(b'\n' | b' ')) && operator(self.a) && operator(self.b) {
                self.put(self.y);
            }
        }

        if matches!(action, Action::Output | Action::Copy) {
            self.a = self.b;
            if matches!(self.a, Some(b'\'' | b'"' | b'`')) {
                self.copy_string()?;
            }
        }

        self.b = self.next()?;
        if self.b == Some(b'/') && self.regex_may_follow() {
            self.copy_regex()?;
            self.b = self.next()?;
        }
        Ok(())
    }

    fn copy_string(&mut self) -> Result<(), TransformError> {
        loop {
            self.put(self.a);
            self.a = self.get();
            if self.a == self.b {
                return Ok(());
            }
            if self.a == Some(b'\\') {
                self.put(self.a);
                self.a = self.get();
            }
            if self.a.is_none() {
                return Err(error("unterminated string literal"));
            }
        }
    }

    fn regex_may_follow(&self) -> bool {
        matches!(
            self.a,
            Some(
                b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'+' | b'-' | b'~'
                    | b'*' | b'/' | b'{' | b'}' | b';'
            )
        )
    }

    fn copy_regex(&mut self) -> Result<(), TransformError> {
        self.put(self.a);
        if matches!(self.a, Some(b'/' | b'*')) {
            self.put(Some(b' '));
        }
        self.put(self.b);
        loop {
            self.a = self.get();
            if self.a == Some(b'[') {
                loop {
                    self.put(self.a);
                    self.a = self.get();
                    if self.a == Some(b']') {
                        break;
                    }
                    if self.a == Some(b'\\') {
                        self.put(self.a);
                        self.a = self.get();
                    }
                    if self.a.is_none() {
                        return Err(error("unterminated set in regular expression literal"));
                    }
                }
            } else if self.a == Some(b'/') {
                if matches!(self.peek(), Some(b'/' | b'*')) {
                    return Err(error("unterminated set in regular expression literal"));
                }
                return Ok(());
            } else if self.a == Some(b'\\') {
                self.put(self.a);
                self.a = self.get();
            }
            if self.a.is_none() {
                return Err(error("unterminated regular expression literal"));
            }
            self.put(self.a);
        }
    }
}
