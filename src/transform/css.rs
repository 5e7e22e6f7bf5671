//! Stylesheet minifier.
//!
//! Single pass over the source: comments are dropped (except `/*! … */`),
//! whitespace runs collapse to one space and disappear next to structural
//! punctuation, and redundant semicolons go away. A declaration colon is
//! tight on both sides; a selector colon keeps the space before it, since
//! `a :hover` and `a:hover` match different elements. Strings, escapes and
//! unquoted `url(…)` bodies are copied verbatim.

use super::{ContentKind, Transform, TransformError};

/// The `text/css` transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssMinifier;

impl Transform for CssMinifier {
    fn kind(&self) -> ContentKind {
        ContentKind::Css
    }

    fn optimize(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let source = std::str::from_utf8(input)
            .map_err(|e| TransformError::new(ContentKind::Css, format!("not valid UTF-8: {e}")))?;
        minify(source).map(String::into_bytes)
    }
}

/// Characters after which whitespace is never needed.
fn tight_after(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',' | '>' | ':')
}

/// Characters before which whitespace is never needed.
fn tight_before(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',' | '>')
}

fn error(reason: &str) -> TransformError {
    TransformError::new(ContentKind::Css, reason)
}

struct Writer {
    out: String,
    pending_space: bool,
    after_semicolon: bool,
}

impl Writer {
    fn emit(&mut self, token: &str) {
        let Some(first) = token.chars().next() else {
            return;
        };
        if self.pending_space {
            if let Some(last) = self.out.chars().last() {
                if !tight_after(last) && !tight_before(first) {
                    self.out.push(' ');
                }
            }
        }
        self.out.push_str(token);
        self.pending_space = false;
        self.after_semicolon = false;
    }

    /// Whether the output ends with a `url` function name.
    fn ends_with_url(&self) -> bool {
        let bytes = self.out.as_bytes();
        if bytes.len() < 3 || !bytes[bytes.len() - 3..].eq_ignore_ascii_case(b"url") {
            return false;
        }
        match bytes.len().checked_sub(4).map(|i| bytes[i]) {
            Some(b) => !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
            None => true,
        }
    }
}

/// Minify stylesheet source text.
pub fn minify(source: &str) -> Result<String, TransformError> {
    let chars: Vec<char> = source.chars().collect();
    let mut w = Writer {
        out: String::with_capacity(source.len()),
        pending_space: false,
        after_semicolon: false,
    };
    let mut i = 0;
    let mut depth = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_ascii_whitespace() => {
                w.pending_space = true;
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let end = find_comment_end(&chars, i + 2).ok_or_else(|| error("unterminated comment"))?;
                if chars.get(i + 2) == Some(&'!') {
                    let comment: String = chars[i..end].iter().collect();
                    w.emit(&comment);
                } else {
                    w.pending_space = true;
                }
                i = end;
            }
            '"' | '\'' => {
                let end = find_string_end(&chars, i)?;
                let string: String = chars[i..end].iter().collect();
                w.emit(&string);
                i = end;
            }
            '\\' => {
                let end = (i + 2).min(chars.len());
                let escape: String = chars[i..end].iter().collect();
                w.emit(&escape);
                i = end;
            }
            '(' if w.ends_with_url() && !starts_quoted(&chars, i + 1) => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&c| c == ')')
                    .map(|p| i + 1 + p)
                    .ok_or_else(|| error("unterminated url()"))?;
                let body: String = chars[i + 1..close].iter().collect();
                w.emit(&format!("({})", body.trim_matches(|c: char| c.is_ascii_whitespace())));
                i = close + 1;
            }
            '{' => {
                depth += 1;
                w.emit("{");
                i += 1;
            }
            ':' => {
                if depth > 0 && ends_declaration_name(&chars, i + 1) {
                    w.pending_space = false;
                }
                w.emit(":");
                i += 1;
            }
            ';' => {
                if !w.after_semicolon {
                    w.emit(";");
                    w.after_semicolon = true;
                }
                i += 1;
            }
            '}' => {
                if w.after_semicolon {
                    w.out.pop();
                }
                depth = depth.saturating_sub(1);
                w.emit("}");
                i += 1;
            }
            c => {
                let mut buf = [0u8; 4];
                w.emit(c.encode_utf8(&mut buf));
                i += 1;
            }
        }
    }

    Ok(w.out)
}

/// Index just past the `*/` closing a comment whose body starts at `from`.
fn find_comment_end(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len().saturating_sub(1))
        .find(|&j| chars[j] == '*' && chars[j + 1] == '/')
        .map(|j| j + 2)
}

/// Index just past the quote closing the string that opens at `start`.
fn find_string_end(chars: &[char], start: usize) -> Result<usize, TransformError> {
    let quote = chars[start];
    let mut j = start + 1;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '\n' => break,
            c if c == quote => return Ok(j + 1),
            _ => j += 1,
        }
    }
    Err(error("unterminated string"))
}

/// Whether the colon before `from` separates a property from its value,
/// i.e. a `;` or `}` (or the end of input) comes before the next `{`.
fn ends_declaration_name(chars: &[char], from: usize) -> bool {
    let mut j = from;
    while j < chars.len() {
        match chars[j] {
            '{' => return false,
            ';' | '}' => return true,
            '\\' => j += 2,
            '"' | '\'' => match find_string_end(chars, j) {
                Ok(end) => j = end,
                Err(_) => return true,
            },
            '/' if chars.get(j + 1) == Some(&'*') => match find_comment_end(chars, j + 2) {
                Some(end) => j = end,
                None => return true,
            },
            _ => j += 1,
        }
    }
    true
}

fn starts_quoted(chars: &[char], from: usize) -> bool {
    chars[from..]
        .iter()
        .find(|c| !c.is_ascii_whitespace())
        .is_some_and(|&c| c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min(source: &str) -> String {
        minify(source).unwrap()
    }

    #[test]
    fn collapses_trailing_semicolon_and_whitespace() {
        assert_eq!(min("body{color:red;  }"), "body{color:red}");
    }

    #[test]
    fn strips_comments_and_layout() {
        let source = "/* reset */\nhtml,\nbody {\n    margin: 0;\n    padding: 0;\n}\n\na > span { color: #fff; }\n";
        assert_eq!(min(source), "html,body{margin:0;padding:0}a>span{color:#fff}");
    }

    #[test]
    fn keeps_meaningful_spaces() {
        assert_eq!(min(".nav  li   a:hover { border: 1px solid  red }"), ".nav li a:hover{border:1px solid red}");
        assert_eq!(
            min("@media screen and (max-width:600px) {\n  .a { width: calc(100% - 2px); }\n}"),
            "@media screen and (max-width:600px){.a{width:calc(100% - 2px)}}"
        );
    }

    #[test]
    fn preserves_strings_and_bang_comments() {
        let source = "/*! license */\na::after { content: \"a  ;  }\"; }";
        assert_eq!(min(source), "/*! license */ a::after{content:\"a  ;  }\"}");
    }

    #[test]
    fn unquoted_url_is_verbatim() {
        assert_eq!(
            min("a { background: url( data:image/png;base64,AA//*x ) no-repeat; }"),
            "a{background:url(data:image/png;base64,AA//*x) no-repeat}"
        );
    }

    #[test]
    fn declaration_colons_are_tight() {
        assert_eq!(min("a { font-weight : bold }"), "a{font-weight:bold}");
        assert_eq!(min("h1 , h2 { font-weight : bold ; }"), "h1,h2{font-weight:bold}");
        assert_eq!(
            min("a { background : url( x.png ) ; content : \"{\" }"),
            "a{background:url(x.png);content:\"{\"}"
        );
    }

    #[test]
    fn selector_colons_keep_their_space() {
        assert_eq!(min("a :hover { color : red }"), "a :hover{color:red}");
        assert_eq!(
            min("@media print { a :hover { color : red } }"),
            "@media print{a :hover{color:red}}"
        );
        assert_eq!(min("ul li :first-child{margin:0}"), "ul li :first-child{margin:0}");
    }

    #[test]
    fn drops_duplicate_semicolons() {
        assert_eq!(min("a{b:c;;d:e;;}"), "a{b:c;d:e}");
    }

    #[test]
    fn idempotent() {
        let sources = [
            "body{color:red;  }",
            "/*! keep */\n.a  .b { margin : 0 auto ; }\n/* drop */ .c{}",
            "a { background: url( x.png ) } b { content: '\\'' }",
            "p { font: 12px/1.5 \"Helvetica Neue\", sans-serif !important; }",
        ];
        for source in sources {
            let once = min(source);
            assert_eq!(min(&once), once, "not idempotent for {source:?}");
        }
    }

    #[test]
    fn malformed_input_fails() {
        let minifier = CssMinifier;
        let err = minifier.optimize(b"body { /* oops").unwrap_err();
        assert_eq!(err.kind, ContentKind::Css);
        assert_eq!(err.reason, "unterminated comment");

        assert!(minifier.optimize(b"a { content: \"open }").is_err());
        assert!(minifier.optimize(&[0x61, 0xff, 0x7b]).is_err());
    }
}
