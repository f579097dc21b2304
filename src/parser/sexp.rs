//! S-expression reader for KIF game descriptions.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::map,
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw parsed element: symbol or list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Atom(String),
    List(Vec<Expr>),
}

impl Expr {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Expr::Atom(s) => Some(s),
            Expr::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Expr::Atom(_) => None,
            Expr::List(items) => Some(items),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(s) => write!(f, "{}", s),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')' && c != ';'
}

/// Skip whitespace and `;` comments (to end of line).
fn skip_space(mut input: &str) -> IResult<&str, ()> {
    loop {
        let trimmed = input.trim_start();
        if let Some(rest) = trimmed.strip_prefix(';') {
            input = match rest.find('\n') {
                Some(pos) => &rest[pos + 1..],
                None => "",
            };
        } else if trimmed.len() != input.len() {
            input = trimmed;
        } else {
            return Ok((input, ()));
        }
    }
}

fn parse_symbol(input: &str) -> IResult<&str, Expr> {
    map(take_while1(is_symbol_char), |s: &str| {
        Expr::Atom(s.to_string())
    })(input)
}

fn parse_list(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(
            char('('),
            many0(preceded(skip_space, parse_expr)),
            preceded(skip_space, char(')')),
        ),
        Expr::List,
    )(input)
}

fn parse_expr(input: &str) -> IResult<&str, Expr> {
    alt((parse_list, parse_symbol))(input)
}

/// Parse a whole source text into top-level expressions.
pub fn parse_exprs(input: &str) -> Result<Vec<Expr>, String> {
    let mut exprs = Vec::new();
    let mut rest = input;
    loop {
        let (after_space, _) = skip_space(rest).map_err(|e| e.to_string())?;
        if after_space.is_empty() {
            return Ok(exprs);
        }
        match parse_expr(after_space) {
            Ok((remaining, expr)) => {
                exprs.push(expr);
                rest = remaining;
            }
            Err(e) => {
                return Err(format!("at '{}': {}", truncate(after_space), e));
            }
        }
    }
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(24) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(s: &str) -> Expr {
        Expr::Atom(s.to_string())
    }

    #[test]
    fn parses_nested_lists() {
        let exprs = parse_exprs("(init (cell 1 1 b))").unwrap();
        assert_eq!(
            exprs,
            vec![Expr::List(vec![
                atom("init"),
                Expr::List(vec![atom("cell"), atom("1"), atom("1"), atom("b")]),
            ])]
        );
    }

    #[test]
    fn skips_comments_and_whitespace() {
        let source = "; tic-tac-toe\n(role xplayer) ; the only role\n\n(terminal)";
        let exprs = parse_exprs(source).unwrap();
        assert_eq!(exprs.len(), 2);
        assert_eq!(exprs[1], Expr::List(vec![atom("terminal")]));
    }

    #[test]
    fn keeps_question_mark_variables_as_symbols() {
        let exprs = parse_exprs("(<= (next (cell ?m)) (does ?p (mark ?m)))").unwrap();
        assert_eq!(exprs.len(), 1);
        let items = exprs[0].as_list().unwrap();
        assert_eq!(items[0], atom("<="));
    }

    #[test]
    fn unbalanced_list_is_an_error() {
        assert!(parse_exprs("(role xplayer").is_err());
    }
}
