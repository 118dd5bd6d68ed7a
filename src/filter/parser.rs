//! Expression parser
//!
//! Precedence, lowest first: `||`, `&&`, comparisons, `+ -`, `* / %`,
//! unary `! -`, then member access and indexing.

use super::lexer::{tokenize, Spanned, Token};
use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Match,
    NotMatch,
    In,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    /// Top-level field of the record
    Field(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Regex operator with a literal pattern, compiled once
    Regex {
        subject: Box<Expr>,
        regex: Regex,
        negate: bool,
    },
}

/// Nesting allowed for groups, collections and unary operators
const MAX_DEPTH: usize = 64;

pub fn parse(source: &str) -> Result<Expr, String> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err("empty expression".into());
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.or()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some(extra) => Err(format!(
            "unexpected {:?} at offset {}",
            extra.token, extra.offset
        )),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        if self.eat(expected) {
            return Ok(());
        }
        match self.tokens.get(self.pos) {
            Some(found) => Err(format!(
                "expected {:?}, found {:?} at offset {}",
                expected, found.token, found.offset
            )),
            None => Err(format!("expected {:?} at end of expression", expected)),
        }
    }

    /// Run `inner` one nesting level deeper
    fn nested<T>(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<T, String>,
    ) -> Result<T, String> {
        if self.depth >= MAX_DEPTH {
            let offset = self.tokens.get(self.pos).map(|s| s.offset).unwrap_or_default();
            return Err(format!("expression nested too deeply at offset {offset}"));
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    fn or(&mut self) -> Result<Expr, String> {
        let mut left = self.and()?;
        while self.eat(&Token::Or) {
            let right = self.and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut left = self.comparison()?;
        while self.eat(&Token::And) {
            let right = self.comparison()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                Some(Token::Match) => BinaryOp::Match,
                Some(Token::NotMatch) => BinaryOp::NotMatch,
                Some(Token::Ident(word)) if word == "in" => BinaryOp::In,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.additive()?;

            left = match (op, right) {
                (BinaryOp::Match | BinaryOp::NotMatch, Expr::Literal(Value::String(pattern))) => {
                    let regex = Regex::new(&pattern)
                        .map_err(|e| format!("invalid regular expression {pattern:?}: {e}"))?;
                    Expr::Regex {
                        subject: Box::new(left),
                        regex,
                        negate: op == BinaryOp::NotMatch,
                    }
                }
                (op, right) => Expr::Binary(op, Box::new(left), Box::new(right)),
            };
        }
    }

    fn additive(&mut self) -> Result<Expr, String> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, String> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Not) {
            let operand = self.nested(Self::unary)?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        if self.eat(&Token::Minus) {
            let operand = self.nested(Self::unary)?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, String> {
        let mut expr = self.primary()?;
        loop {
            if self.eat(&Token::Dot) {
                match self.advance() {
                    Some(Token::Ident(name)) => expr = Expr::Member(Box::new(expr), name),
                    Some(Token::Number(n)) if n >= 0.0 && n.fract() == 0.0 => {
                        expr = Expr::Member(Box::new(expr), (n as u64).to_string())
                    }
                    other => return Err(format!("expected a field name after '.', found {other:?}")),
                }
            } else if self.eat(&Token::LBracket) {
                let index = self.nested(Self::or)?;
                self.expect(&Token::RBracket)?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::LParen | Token::LBracket | Token::LBrace) => self.nested(Self::atom),
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<Expr, String> {
        let offset = self.tokens.get(self.pos).map(|s| s.offset);
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Literal(number(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(Token::Ident(word)) => Ok(match word.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "nil" => Expr::Literal(Value::Null),
                _ => Expr::Field(word),
            }),
            Some(Token::LParen) => {
                let inner = self.or()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::LBracket) => {
                let mut items = Vec::new();
                if !self.eat(&Token::RBracket) {
                    loop {
                        items.push(self.or()?);
                        if self.eat(&Token::RBracket) {
                            break;
                        }
                        self.expect(&Token::Comma)?;
                    }
                }
                Ok(Expr::Array(items))
            }
            Some(Token::LBrace) => {
                let mut entries = Vec::new();
                if !self.eat(&Token::RBrace) {
                    loop {
                        let key = match self.advance() {
                            Some(Token::Str(key)) | Some(Token::Ident(key)) => key,
                            other => return Err(format!("expected an object key, found {other:?}")),
                        };
                        self.expect(&Token::Colon)?;
                        entries.push((key, self.or()?));
                        if self.eat(&Token::RBrace) {
                            break;
                        }
                        self.expect(&Token::Comma)?;
                    }
                }
                Ok(Expr::Object(entries))
            }
            Some(other) => Err(format!(
                "unexpected {:?} at offset {}",
                other,
                offset.unwrap_or_default()
            )),
            None => Err("unexpected end of expression".into()),
        }
    }
}

/// Integral numbers stay integers so they print without a fraction
pub fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let expr = parse("a || b && c").unwrap();
        let Expr::Binary(BinaryOp::Or, _, right) = expr else {
            panic!("expected ||, got {expr:?}");
        };
        assert!(matches!(*right, Expr::Binary(BinaryOp::And, _, _)));

        let expr = parse("(a + b) * 10").unwrap();
        let Expr::Binary(BinaryOp::Mul, left, _) = expr else {
            panic!("expected *, got {expr:?}");
        };
        assert!(matches!(*left, Expr::Binary(BinaryOp::Add, _, _)));
    }

    #[test]
    fn test_literal_regex_is_compiled() {
        assert!(matches!(
            parse(r#"name =~ "^my.*""#).unwrap(),
            Expr::Regex { negate: false, .. }
        ));
        assert!(matches!(
            parse(r#"name !~ "x""#).unwrap(),
            Expr::Regex { negate: true, .. }
        ));
        let err = parse(r#"name =~ "([a-z""#).unwrap_err();
        assert!(err.contains("invalid regular expression"));
    }

    #[test]
    fn test_collections() {
        assert!(matches!(parse("[id, 'name']").unwrap(), Expr::Array(items) if items.len() == 2));
        assert!(matches!(
            parse(r#"{"newKey": oldKey, other: a.b[0]}"#).unwrap(),
            Expr::Object(entries) if entries.len() == 2
        ));
        assert!(matches!(parse("[]").unwrap(), Expr::Array(items) if items.is_empty()));
    }

    #[test]
    fn test_numeric_member_segments() {
        let Expr::Member(target, segment) = parse("a.0.b").unwrap() else {
            panic!("expected member access");
        };
        assert_eq!(segment, "b");
        assert!(matches!(*target, Expr::Member(_, ref index) if index == "0"));
        assert!(parse("a.-1").is_err());
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(parse(&parens).unwrap_err().contains("nested too deeply"));

        let negations = format!("{}true", "!".repeat(10_000));
        assert!(parse(&negations).unwrap_err().contains("nested too deeply"));

        let arrays = format!("{}{}", "[".repeat(10_000), "]".repeat(10_000));
        assert!(parse(&arrays).unwrap_err().contains("nested too deeply"));

        let indexes = format!("a{}0{}", "[a".repeat(5_000), "]".repeat(5_000));
        assert!(parse(&indexes).is_err());

        let shallow = format!("{}1{}", "(".repeat(32), ")".repeat(32));
        assert!(parse(&shallow).is_ok());
    }

    #[test]
    fn test_syntax_errors() {
        for source in ["", "a ==", "(a", "[a, b", "a b", "{1: 2}", "a."] {
            assert!(parse(source).is_err(), "{source:?} should not parse");
        }
    }
}
