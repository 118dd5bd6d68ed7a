//! Tokenizer for filter and format expressions

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
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
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
}

/// Token with its byte offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Spanned>, String> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens: Vec<Spanned> = Vec::new();
    let mut i = 0;

    let peek = |i: usize| chars.get(i).map(|(_, c)| *c);

    while i < chars.len() {
        let (offset, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let two = |second: char| peek(i + 1) == Some(second);
        let previous = tokens.last().map(|s| &s.token);
        // `tags.0` is member access, `.5` alone is a number
        let after_operand = matches!(
            previous,
            Some(Token::Ident(_) | Token::Number(_) | Token::RBracket | Token::RParen)
        );
        let after_dot = previous == Some(&Token::Dot);

        let (token, width) = match c {
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            '[' => (Token::LBracket, 1),
            ']' => (Token::RBracket, 1),
            '{' => (Token::LBrace, 1),
            '}' => (Token::RBrace, 1),
            ',' => (Token::Comma, 1),
            ':' => (Token::Colon, 1),
            '.' if after_operand || !peek(i + 1).is_some_and(|d| d.is_ascii_digit()) => {
                (Token::Dot, 1)
            }
            '+' => (Token::Plus, 1),
            '-' => (Token::Minus, 1),
            '*' => (Token::Star, 1),
            '/' => (Token::Slash, 1),
            '%' => (Token::Percent, 1),
            '|' if two('|') => (Token::Or, 2),
            '&' if two('&') => (Token::And, 2),
            '=' if two('=') => (Token::Eq, 2),
            '=' if two('~') => (Token::Match, 2),
            '=' => (Token::Eq, 1),
            '!' if two('=') => (Token::Ne, 2),
            '!' if two('~') => (Token::NotMatch, 2),
            '!' => (Token::Not, 1),
            '<' if two('=') => (Token::Le, 2),
            '<' => (Token::Lt, 1),
            '>' if two('=') => (Token::Ge, 2),
            '>' => (Token::Gt, 1),
            '"' | '\'' => {
                let (text, consumed) = read_string(&chars[i..], c)
                    .ok_or_else(|| format!("unterminated string at offset {offset}"))?;
                (Token::Str(text), consumed)
            }
            c if c.is_ascii_digit() || c == '.' => {
                let end = (i..chars.len())
                    .find(|&j| {
                        let c = chars[j].1;
                        !(c.is_ascii_digit() || (c == '.' && !after_dot))
                    })
                    .unwrap_or(chars.len());
                let text: String = chars[i..end].iter().map(|(_, c)| c).collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number {text:?} at offset {offset}"))?;
                (Token::Number(number), end - i)
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let end = (i..chars.len())
                    .find(|&j| {
                        let c = chars[j].1;
                        !(c.is_alphanumeric() || c == '_' || c == '$')
                    })
                    .unwrap_or(chars.len());
                let text: String = chars[i..end].iter().map(|(_, c)| c).collect();
                (Token::Ident(text), end - i)
            }
            other => return Err(format!("unexpected character {other:?} at offset {offset}")),
        };

        tokens.push(Spanned { token, offset });
        i += width;
    }

    Ok(tokens)
}

/// Read a quoted string starting at `chars[0]`; returns the text and the
/// number of chars consumed, quotes included
fn read_string(chars: &[(usize, char)], quote: char) -> Option<(String, usize)> {
    let mut text = String::new();
    let mut i = 1;
    while i < chars.len() {
        match chars[i].1 {
            '\\' => {
                let escaped = chars.get(i + 1)?.1;
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
                i += 2;
            }
            c if c == quote => return Some((text, i + 1)),
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    None
}
