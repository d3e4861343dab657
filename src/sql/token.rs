//! Tokens of rendered SQL.
//!
//! Expressions and plans write tokens without knowing the target database.
//! Quoting, literals, function names and pagination are settled when the
//! stream is serialized for a [`Dialect`].

use super::dialect::{Dialect, SqlDialect};
use super::expr::{BinaryOperator, Literal};

/// Fixed SQL words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    InnerJoin,
    As,
    On,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Asc,
    Desc,
    Case,
    When,
    Then,
    End,
    In,
    Distinct,
    False,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::InnerJoin => "INNER JOIN",
            Keyword::As => "AS",
            Keyword::On => "ON",
            Keyword::Where => "WHERE",
            Keyword::GroupBy => "GROUP BY",
            Keyword::Having => "HAVING",
            Keyword::OrderBy => "ORDER BY",
            Keyword::Asc => "ASC",
            Keyword::Desc => "DESC",
            Keyword::Case => "CASE",
            Keyword::When => "WHEN",
            Keyword::Then => "THEN",
            Keyword::End => "END",
            Keyword::In => "IN",
            Keyword::Distinct => "DISTINCT",
            Keyword::False => "FALSE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Operator(BinaryOperator),
    Comma,
    Dot,
    LParen,
    RParen,
    Space,
    Newline,
    Indent(usize),
    /// Table, column or alias name, quoted per dialect
    Ident(String),
    Literal(Literal),
    /// Function name, remapped per dialect (VAR_SAMP -> VAR on T-SQL)
    FunctionName(String),
    /// Row limit; `ordered` tells dialects that paginate after ORDER BY whether one was written
    Limit { rows: u64, ordered: bool },
}

impl Token {
    pub fn serialize(&self, dialect: Dialect) -> String {
        match self {
            Token::Keyword(keyword) => keyword.as_str().into(),
            Token::Operator(op) => op.symbol().into(),
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(depth) => "  ".repeat(*depth),
            Token::Ident(name) => dialect.quote_identifier(name),
            Token::Literal(literal) => serialize_literal(literal, dialect),
            Token::FunctionName(name) => dialect
                .remap_function(name)
                .map(str::to_string)
                .unwrap_or_else(|| name.to_uppercase()),
            Token::Limit { rows, ordered } => dialect.limit_clause(*rows, *ordered),
        }
    }
}

fn serialize_literal(literal: &Literal, dialect: Dialect) -> String {
    match literal {
        Literal::Int(n) => n.to_string(),
        Literal::Float(f) => {
            // Filter values are checked finite before they become literals
            assert!(f.is_finite(), "non-finite float literal {}", f);
            ryu::Buffer::new().format_finite(*f).to_string()
        }
        Literal::String(s) => dialect.quote_string(s),
        Literal::Bool(b) => dialect.format_bool(*b).into(),
        Literal::Null => "NULL".into(),
    }
}

/// Tokens in output order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn keyword(&mut self, keyword: Keyword) -> &mut Self {
        self.push(Token::Keyword(keyword))
    }

    /// Write `items` with `write`, separated by `, `.
    pub fn separated<T>(&mut self, items: &[T], mut write: impl FnMut(&mut Self, &T)) -> &mut Self {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.comma().space();
            }
            write(self, item);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn serialize(&self, dialect: Dialect) -> String {
        self.tokens.iter().map(|t| t.serialize(dialect)).collect()
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }

    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }

    pub fn indent(&mut self, depth: usize) -> &mut Self {
        self.push(Token::Indent(depth))
    }

    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }

    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }

    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
