use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::mask::{combine, BoolOp, Mask};
use crate::data::model::{Dataset, Row, Value};
use crate::error::{Result, SelectivityError};

/// Comparison operator between a column and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    fn accepts(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::NotEq => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::LtEq => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::GtEq => ord != Ordering::Less,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
        };
        f.write_str(s)
    }
}

/// A boolean condition evaluated per row.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column op literal`.  Null cells and cells of an incomparable type
    /// never satisfy the comparison.
    Compare {
        column: String,
        op: CmpOp,
        literal: Value,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Const(bool),
}

impl Predicate {
    pub fn compare(column: impl Into<String>, op: CmpOp, literal: impl Into<Value>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            literal: literal.into(),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Parse the textual form, e.g. `A > 5 AND (B == 6 OR NOT C < 1.5)`.
    pub fn parse(input: &str) -> Result<Self> {
        Parser::new(input)?.parse()
    }

    /// Check a single row.  Referenced columns must exist in the row.
    pub fn matches(&self, row: &Row) -> Result<bool> {
        match self {
            Predicate::Compare {
                column,
                op,
                literal,
            } => {
                let cell = row
                    .get(column)
                    .ok_or_else(|| SelectivityError::ColumnNotFound(column.clone()))?;
                Ok(cell.compare(literal).is_some_and(|ord| op.accepts(ord)))
            }
            Predicate::And(a, b) => Ok(a.matches(row)? && b.matches(row)?),
            Predicate::Or(a, b) => Ok(a.matches(row)? || b.matches(row)?),
            Predicate::Not(a) => Ok(!a.matches(row)?),
            Predicate::Const(v) => Ok(*v),
        }
    }

    /// Columns referenced anywhere in the predicate.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Compare { column, .. } => {
                if !out.contains(&column.as_str()) {
                    out.push(column);
                }
            }
            Predicate::And(a, b) | Predicate::Or(a, b) => {
                a.collect_columns(out);
                b.collect_columns(out);
            }
            Predicate::Not(a) => a.collect_columns(out),
            Predicate::Const(_) => {}
        }
    }

    /// Produce the row mask of this predicate over `dataset`.
    ///
    /// Every referenced column is checked against the schema first, so a
    /// missing column fails even when the dataset is empty.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<Mask> {
        for column in self.columns() {
            if !dataset.has_column(column) {
                return Err(SelectivityError::ColumnNotFound(column.to_string()));
            }
        }
        self.evaluate_checked(dataset)
    }

    fn evaluate_checked(&self, dataset: &Dataset) -> Result<Mask> {
        match self {
            Predicate::Compare {
                column,
                op,
                literal,
            } => {
                let bits = dataset
                    .column(column)?
                    .into_iter()
                    .map(|cell| cell.compare(literal).is_some_and(|ord| op.accepts(ord)))
                    .collect();
                Ok(Mask::from_bools(bits))
            }
            Predicate::And(a, b) => combine(
                &a.evaluate_checked(dataset)?,
                &b.evaluate_checked(dataset)?,
                BoolOp::And,
            ),
            Predicate::Or(a, b) => combine(
                &a.evaluate_checked(dataset)?,
                &b.evaluate_checked(dataset)?,
                BoolOp::Or,
            ),
            Predicate::Not(a) => a.evaluate_checked(dataset)?.not(),
            Predicate::Const(v) => Ok(Mask::constant(dataset.len(), *v)),
        }
    }
}

impl FromStr for Predicate {
    type Err = SelectivityError;

    fn from_str(s: &str) -> Result<Self> {
        Predicate::parse(s)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare {
                column,
                op,
                literal,
            } => write!(f, "{column} {op} {literal}"),
            Predicate::And(a, b) => write!(f, "({a} AND {b})"),
            Predicate::Or(a, b) => write!(f, "({a} OR {b})"),
            Predicate::Not(a) => write!(f, "NOT {a}"),
            Predicate::Const(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(Value),
    Op(CmpOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Op(CmpOp::Eq));
                i += if next == Some('=') { 2 } else { 1 };
            }
            '!' if next == Some('=') => {
                tokens.push(Token::Op(CmpOp::NotEq));
                i += 2;
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '<' => match next {
                Some('=') => {
                    tokens.push(Token::Op(CmpOp::LtEq));
                    i += 2;
                }
                Some('>') => {
                    tokens.push(Token::Op(CmpOp::NotEq));
                    i += 2;
                }
                _ => {
                    tokens.push(Token::Op(CmpOp::Lt));
                    i += 1;
                }
            },
            '>' => {
                if next == Some('=') {
                    tokens.push(Token::Op(CmpOp::GtEq));
                    i += 2;
                } else {
                    tokens.push(Token::Op(CmpOp::Gt));
                    i += 1;
                }
            }
            '&' if next == Some('&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == quote)
                    .map(|p| start + p)
                    .ok_or_else(|| format!("unterminated string starting at {i}"))?;
                let s: String = chars[start..end].iter().collect();
                tokens.push(Token::Literal(Value::String(s)));
                i = end + 1;
            }
            c if c.is_ascii_digit()
                || c == '.'
                || (c == '-' && next.is_some_and(|n| n.is_ascii_digit() || n == '.')) =>
            {
                let start = i;
                i += 1;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '.' | '+' | '-'))
                {
                    // a sign is only part of the number right after an exponent marker
                    if matches!(chars[i], '+' | '-') && !matches!(chars[i - 1], 'e' | 'E') {
                        break;
                    }
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = if let Ok(v) = text.parse::<i64>() {
                    Value::Integer(v)
                } else {
                    Value::Float(
                        text.parse::<f64>()
                            .map_err(|_| format!("invalid number '{text}'"))?,
                    )
                };
                tokens.push(Token::Literal(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let token = match word.to_ascii_uppercase().as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    "TRUE" => Token::Literal(Value::Bool(true)),
                    "FALSE" => Token::Literal(Value::Bool(false)),
                    _ => Token::Ident(word),
                };
                tokens.push(token);
            }
            other => return Err(format!("unexpected character '{other}' at {i}")),
        }
    }
    Ok(tokens)
}

/// Upper bound on connectives and open parentheses in one predicate.  Each
/// can add a level to the tree, and parsing, evaluation and drop all recurse
/// on tree depth.
const MAX_DEPTH: usize = 256;

/// Recursive-descent parser; `OR` binds loosest, then `AND`, then `NOT`.
struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self> {
        let tokens = tokenize(input).map_err(|reason| SelectivityError::InvalidPredicate {
            input: input.to_string(),
            reason,
        })?;
        Ok(Parser {
            input,
            tokens,
            pos: 0,
        })
    }

    fn error(&self, reason: impl Into<String>) -> SelectivityError {
        SelectivityError::InvalidPredicate {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn parse(mut self) -> Result<Predicate> {
        if self.tokens.is_empty() {
            return Err(self.error("empty predicate"));
        }
        let depth = self
            .tokens
            .iter()
            .filter(|tok| matches!(tok, Token::And | Token::Or | Token::Not | Token::LParen))
            .count();
        if depth > MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {MAX_DEPTH}")));
        }
        let pred = self.parse_or()?;
        match self.peek() {
            None => Ok(pred),
            Some(tok) => Err(self.error(format!("unexpected trailing {tok:?}"))),
        }
    }

    fn parse_or(&mut self) -> Result<Predicate> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            lhs = lhs.or(self.parse_and()?);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Predicate> {
        let mut lhs = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            lhs = lhs.and(self.parse_unary()?);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Predicate> {
        match self.next() {
            Some(Token::Not) => Ok(self.parse_unary()?.not()),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(self.error("expected ')'")),
                }
            }
            Some(Token::Literal(Value::Bool(v))) => Ok(Predicate::Const(v)),
            Some(Token::Ident(column)) => {
                let op = match self.next() {
                    Some(Token::Op(op)) => op,
                    _ => return Err(self.error(format!("expected comparison after '{column}'"))),
                };
                match self.next() {
                    Some(Token::Literal(literal)) => Ok(Predicate::Compare {
                        column,
                        op,
                        literal,
                    }),
                    _ => Err(self.error(format!("expected literal after '{column} {op}'"))),
                }
            }
            Some(tok) => Err(self.error(format!("unexpected {tok:?}"))),
            None => Err(self.error("unexpected end of input")),
        }
    }
}
