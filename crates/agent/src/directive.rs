//! Directive grammar
//!
//! Two control directives may appear anywhere in a model response:
//!
//! ```text
//! ToolUsage: <tool_name>(<param1>,<param2>,...)
//! SpeakTo <assistant_name>:<utterance>
//! ```
//!
//! Names are ASCII alphanumerics plus `-` and `_`, optionally wrapped in
//! `[` `]`. The first well-formed occurrence wins, and everything the model
//! wrote after it is dropped by [`Directive::trim`].

pub const TOOL_MARKER: &str = "ToolUsage:";
pub const ASSISTANT_MARKER: &str = "SpeakTo";
pub const TOOL_OUTPUT_PREFIX: &str = "Output of ";
pub const ASSISTANT_RESPONSE_PREFIX: &str = "Response from ";

/// Markers that end an utterance early
const UTTERANCE_TERMINATORS: &[&str] = &[
    TOOL_MARKER,
    ASSISTANT_MARKER,
    ASSISTANT_RESPONSE_PREFIX,
    TOOL_OUTPUT_PREFIX,
];

/// What the model asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveRequest {
    ToolUsage {
        tool_name: String,
        parameters: Vec<String>,
    },
    AssistantQuery {
        assistant_name: String,
        utterance: String,
    },
    PlainAnswer {
        text: String,
    },
}

/// A parsed request plus the byte offset where it ends in the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub request: DirectiveRequest,
    pub end: usize,
}

impl Directive {
    /// The response cut right after the directive
    pub fn trim<'a>(&self, response: &'a str) -> &'a str {
        &response[..self.end]
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.request, DirectiveRequest::PlainAnswer { .. })
    }
}

/// Parse a response. Tool usage takes precedence; delegation is only
/// recognized when `delegation` is set.
pub fn parse(response: &str, delegation: bool) -> Directive {
    if let Some(directive) = parse_tool_usage(response) {
        return directive;
    }
    if delegation {
        if let Some(directive) = parse_assistant_query(response) {
            return directive;
        }
    }
    Directive {
        request: DirectiveRequest::PlainAnswer {
            text: response.to_string(),
        },
        end: response.len(),
    }
}

/// Find the first well-formed `ToolUsage:` directive.
///
/// Parameters split on commas outside double quotes, so `foo(a,"b,c")`
/// yields `["a", "b,c"]`, and a `)` inside quotes does not close the list.
/// Each parameter is trimmed and loses one pair of enclosing quotes. An
/// unbalanced quote makes the list close at the first `)` instead.
pub fn parse_tool_usage(response: &str) -> Option<Directive> {
    response
        .match_indices(TOOL_MARKER)
        .find_map(|(at, marker)| lex_tool_usage(response, at + marker.len()))
}

/// Find the first well-formed `SpeakTo` directive.
///
/// The utterance runs to end of line or to the next recognized marker.
pub fn parse_assistant_query(response: &str) -> Option<Directive> {
    response
        .match_indices(ASSISTANT_MARKER)
        .find_map(|(at, marker)| lex_assistant_query(response, at + marker.len()))
}

/// Tag a tool result for the next turn
pub fn tool_output(tool_name: &str, output: &str) -> String {
    format!("{}{}:{}", TOOL_OUTPUT_PREFIX, tool_name, output)
}

/// Tag a delegated answer for the next turn
pub fn assistant_response(assistant_name: &str, answer: &str) -> String {
    format!("{}{}:{}", ASSISTANT_RESPONSE_PREFIX, assistant_name, answer)
}

pub fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_'
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// `name` or `[name]`; either bracket may be missing
    fn name(&mut self, text: &'a str) -> Option<&'a str> {
        self.eat(b'[');
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        let name = &text[start..self.pos];
        self.eat(b']');
        Some(name)
    }
}

fn lex_tool_usage(text: &str, after_marker: usize) -> Option<Directive> {
    let mut cursor = Cursor::new(text, after_marker);
    cursor.skip_blanks();
    let tool_name = cursor.name(text)?;
    if !cursor.eat(b'(') {
        return None;
    }
    let (parameters, end) = split_parameters(text, cursor.pos)?;
    Some(Directive {
        request: DirectiveRequest::ToolUsage {
            tool_name: tool_name.to_string(),
            parameters,
        },
        end,
    })
}

/// Split the list starting after `(`; returns the parameters and the offset
/// just past the closing `)`. When a quote is left open the list is rescanned
/// with quotes as plain characters, closing at the first `)`.
fn split_parameters(text: &str, start: usize) -> Option<(Vec<String>, usize)> {
    match scan_parameters(text, start, true) {
        Ok(found) => Some(found),
        Err(true) => scan_parameters(text, start, false).ok(),
        Err(false) => None,
    }
}

/// `Err` carries whether the text ran out inside an open quote
fn scan_parameters(
    text: &str,
    start: usize,
    quote_aware: bool,
) -> Result<(Vec<String>, usize), bool> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut piece_start = start;
    let mut in_quotes = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'"' if quote_aware => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                pieces.push(&text[piece_start..i]);
                piece_start = i + 1;
            }
            b')' if !in_quotes => {
                let last = &text[piece_start..i];
                if !(pieces.is_empty() && last.trim().is_empty()) {
                    pieces.push(last);
                }
                let parameters = pieces.into_iter().map(unquote).collect();
                return Ok((parameters, i + 1));
            }
            _ => {}
        }
    }
    Err(in_quotes)
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}

fn lex_assistant_query(text: &str, after_marker: usize) -> Option<Directive> {
    let mut cursor = Cursor::new(text, after_marker);
    cursor.skip_blanks();
    let assistant_name = cursor.name(text)?;
    cursor.skip_blanks();
    if !cursor.eat(b':') {
        return None;
    }

    let body_start = cursor.pos;
    let body = &text[body_start..utterance_end(text, body_start)];
    let body = body.trim_end();
    let utterance = strip_brackets(body.trim_start());
    if utterance.is_empty() {
        return None;
    }

    Some(Directive {
        request: DirectiveRequest::AssistantQuery {
            assistant_name: assistant_name.to_string(),
            utterance: utterance.to_string(),
        },
        end: body_start + body.len(),
    })
}

fn utterance_end(text: &str, start: usize) -> usize {
    let rest = &text[start..];
    let line_end = rest.find('\n').unwrap_or(rest.len());
    let marker_end = UTTERANCE_TERMINATORS
        .iter()
        .filter_map(|marker| rest.find(marker))
        .min()
        .unwrap_or(rest.len());
    start + line_end.min(marker_end)
}

fn strip_brackets(s: &str) -> &str {
    let s = s.strip_prefix('[').unwrap_or(s);
    let s = s.strip_suffix(']').unwrap_or(s);
    s.trim()
}
