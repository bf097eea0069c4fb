//! Property-string expansion
//!
//! GS1 string literals may embed `#` escape codes referring to live values:
//! `"Hello #n"` greets the owner by nickname, `"#v(x+1)"` embeds an
//! expression. A string is first split into [`Segment`]s by a small nom
//! lexer, then rendered as a `$`-joined concatenation.
//!
//! Codes that name a property take an optional `(owner)` argument: `-1` or
//! nothing is the script object itself, `0` the contextual player, and `N`
//! the Nth player of the player list.

use super::{ExprCtx, Generator};
use crate::gs1::parse_expression;
use crate::sink::Sink;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1, take_while_m_n},
    character::complete::{char, one_of},
    combinator::{map, opt, value},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{pair, preceded, tuple},
    IResult,
};

/// A piece of a property string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text
    Text(&'a str),
    /// Escape code with optional slot index (`#C1`, `#P12`) and optional
    /// parenthesized argument
    Code {
        code: char,
        index: Option<&'a str>,
        arg: Option<&'a str>,
    },
}

/// Codes that take an optional owner (or, for `w`, weapon) argument
const OWNER_CODES: &str = "angfcL123578w";

/// Codes whose argument is an expression and is required
const EXPRESSION_CODES: &str = "vste";

/// Property of the owner addressed by a code
pub fn property_name(code: char) -> Option<&'static str> {
    let name = match code {
        'a' => "account",
        'n' => "nick",
        'g' => "guild",
        'f' => "image",
        'c' => "chat",
        'L' => "level.name",
        '1' => "sword",
        '2' => "shield",
        '3' => "head",
        '5' => "horse",
        '7' => "ani",
        '8' => "body",
        _ => return None,
    };
    Some(name)
}

/// Split a property string into segments
pub fn segments(input: &str) -> Vec<Segment<'_>> {
    match many0(segment)(input) {
        Ok((rest, mut parsed)) => {
            if !rest.is_empty() {
                parsed.push(Segment::Text(rest));
            }
            parsed
        }
        Err(_) => vec![Segment::Text(input)],
    }
}

fn segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        value(Segment::Text("#"), tag("##")),
        indexed_code,
        expression_code,
        owner_code,
        map(take_till1(|c| c == '#'), Segment::Text),
        map(tag("#"), Segment::Text),
    ))(input)
}

/// `#Cn(owner)` and `#Pnn(owner)`
fn indexed_code(input: &str) -> IResult<&str, Segment<'_>> {
    let (rest, (code, index, arg)) = preceded(
        char('#'),
        alt((
            tuple((char('C'), one_digit, opt(balanced))),
            tuple((char('P'), two_digits, opt(balanced))),
        )),
    )(input)?;
    Ok((rest, Segment::Code { code, index: Some(index), arg }))
}

fn one_digit(input: &str) -> IResult<&str, &str> {
    take_while_m_n(1, 1, |c: char| c.is_ascii_digit())(input)
}

fn two_digits(input: &str) -> IResult<&str, &str> {
    take_while_m_n(1, 2, |c: char| c.is_ascii_digit())(input)
}

/// `#v(expr)`, `#s(expr)`, `#t(expr)`, `#e(start,len,str)`
fn expression_code(input: &str) -> IResult<&str, Segment<'_>> {
    let (rest, (code, arg)) = preceded(char('#'), pair(one_of(EXPRESSION_CODES), balanced))(input)?;
    Ok((rest, Segment::Code { code, index: None, arg: Some(arg) }))
}

/// Owner-addressed property codes and `#w`
fn owner_code(input: &str) -> IResult<&str, Segment<'_>> {
    let (rest, (code, arg)) = preceded(char('#'), pair(one_of(OWNER_CODES), opt(balanced)))(input)?;
    Ok((rest, Segment::Code { code, index: None, arg }))
}

/// Parenthesized text with nested parentheses and quoted strings
fn balanced(input: &str) -> IResult<&str, &str> {
    let (body, _) = char('(')(input)?;

    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in body.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&body[i + 1..], &body[..i]));
                }
            }
            _ => {}
        }
    }

    Err(nom::Err::Error(Error::new(input, ErrorKind::Char)))
}

/// Split an argument list at top-level commas
fn split_args(arg: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = 0;
    for (i, ch) in arg.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                parts.push(arg[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(arg[start..].trim());
    parts
}

/// Quote literal text as a target-language string
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

impl Generator {
    /// Expand a string literal into a concatenation expression
    pub fn expand_property_string(&mut self, text: &str) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut literal = String::new();

        for segment in segments(text) {
            match segment {
                Segment::Text(t) => literal.push_str(t),
                Segment::Code { code, index, arg } => match self.render_code(code, index, arg) {
                    Some(rendered) => {
                        if !literal.is_empty() {
                            parts.push(quote(&std::mem::take(&mut literal)));
                        }
                        parts.push(rendered);
                    }
                    None => literal.push_str(&source_text(code, index, arg)),
                },
            }
        }

        if !literal.is_empty() {
            parts.push(quote(&literal));
        }

        if parts.is_empty() {
            "\"\"".to_string()
        } else {
            parts.join(" $ ")
        }
    }

    /// Target expression for a property code (e.g. `#c`) applied to an owner
    pub(crate) fn property_target(&mut self, code_text: &str, owner: &str) -> Option<String> {
        match segments(code_text.trim()).as_slice() {
            [Segment::Code { code, index, arg: None }] => {
                let name = slot_property(*code, *index)?;
                Some(format!("{}.{}", owner, name))
            }
            _ => None,
        }
    }

    fn render_code(&mut self, code: char, index: Option<&str>, arg: Option<&str>) -> Option<String> {
        match code {
            'v' | 's' => Some(format!("({})", self.embedded(arg?))),
            't' => Some(format!("this.tokens[{}]", self.embedded(arg?))),
            'e' => {
                let parts = split_args(arg?);
                if parts.len() != 3 {
                    self.report(0, format!("#e expects 3 arguments, found {}", parts.len()));
                    return None;
                }
                let start = self.embedded(parts[0]);
                let len = self.embedded(parts[1]);
                let text = self.expand_property_string(parts[2]);
                Some(format!("substring({}, {}, {})", text, start, len))
            }
            'w' => match arg.map(str::trim) {
                None | Some("-1") => Some("player.weapon.name".to_string()),
                Some(weapon) => Some(format!("player.weapons[{}].name", self.embedded(weapon))),
            },
            _ => {
                let name = slot_property(code, index)?;
                let owner = self.owner(arg);
                Some(format!("{}.{}", owner, name))
            }
        }
    }

    /// Object addressed by an owner argument
    fn owner(&mut self, arg: Option<&str>) -> String {
        let arg = match arg.map(str::trim) {
            None | Some("-1") => return "this".to_string(),
            Some("0") => return "player".to_string(),
            Some(arg) => arg,
        };

        if arg.chars().all(|c| c.is_ascii_digit()) {
            return format!("{}[{}]", self.tables.players(), arg);
        }

        self.request_helper("_propOwner");
        format!("this._propOwner({}, player)", self.embedded(arg))
    }

    /// Generate an embedded expression in a throwaway sink
    fn embedded(&mut self, source: &str) -> String {
        let (captured, ()) = self.redirected(Sink::new(), |g| {
            let text = match parse_expression(source) {
                Ok(expr) => g.expression(&expr, ExprCtx::default()),
                Err(err) => {
                    g.report(err.line(), format!("in property code: {}", err));
                    source.to_string()
                }
            };
            g.sinks.current().write(&text);
        });
        captured.into_string()
    }
}

fn slot_property(code: char, index: Option<&str>) -> Option<String> {
    match (code, index) {
        ('C', Some(n)) => Some(format!("colors[{}]", n)),
        ('P', Some(n)) => Some(format!("attr[{}]", n)),
        _ => property_name(code).map(str::to_string),
    }
}

/// Original text of a code that could not be rendered
fn source_text(code: char, index: Option<&str>, arg: Option<&str>) -> String {
    let mut out = format!("#{}{}", code, index.unwrap_or(""));
    if let Some(arg) = arg {
        out.push('(');
        out.push_str(arg);
        out.push(')');
    }
    out
}
