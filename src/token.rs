use logos::Logos;

/// Defines the set of recognizable tokens in the prototype scripting language.
/// The `#[derive(Logos)]` macro from the `logos` crate generates the lexer implementation.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+|#[^\n]*")] // Ignore whitespace and comments
pub enum Token {
    // Literals
    #[regex("[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    // Double-quoted strings decode escapes; single-quoted ones are raw.
    #[regex(r#""(?:[^"\\]|\\.)*"|'[^']*'"#, |lex| {
        let slice = lex.slice();
        // Slice the string to remove the opening and closing quotes.
        let body = &slice[1..slice.len() - 1];
        if slice.starts_with('"') {
            unescape(body)
        } else {
            Some(body.to_string())
        }
    })]
    String(String),

    // Keywords. Logos prefers exact tokens over the Identifier regex when
    // both match the same text.
    #[token("let")]
    Let,

    #[token("fn")]
    Fn,

    #[token("do")]
    Do,

    #[token("end")]
    End,

    #[token("self")]
    SelfKw,

    #[token("super")]
    Super,

    #[token("print")]
    Print,

    #[token("nil")]
    Nil,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Operators
    #[token("==")]
    EqualEqual,

    #[token("=")]
    Assign,

    #[token("+")]
    Plus,

    // Punctuation
    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,
}

/// Decodes `\"`, `\\`, `\n` and `\t`. Any other escape is rejected.
fn unescape(body: &str) -> Option<String> {
    let mut text = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next()? {
            '"' => text.push('"'),
            '\\' => text.push('\\'),
            'n' => text.push('\n'),
            't' => text.push('\t'),
            _ => return None,
        }
    }
    Some(text)
}

impl Token {
    /// Whether this token can begin an expression.
    pub fn starts_expression(&self) -> bool {
        matches!(
            self,
            Token::Integer(_)
                | Token::String(_)
                | Token::Identifier(_)
                | Token::Fn
                | Token::SelfKw
                | Token::Super
                | Token::Nil
                | Token::True
                | Token::False
                | Token::LParen
                | Token::LBrace
        )
    }
}
