use crate::span::Span;
use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Heights, and the `p`/`x` modifiers when written right after one
    #[regex(r"[0-9a-z]", first_char)]
    Symbol(char),

    #[regex(r"\.[0-9]+", |lex| lex.slice().to_string())]
    Decimal(String),

    // Hand prefixes and pass recipients
    #[regex(r"[A-Z]", first_char)]
    Upper(char),

    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,
    #[token("|")]
    Pipe,
    #[token("!")]
    Bang,
    #[token("*")]
    Star,

    Error,
}

fn first_char(lex: &mut logos::Lexer<Token>) -> Option<char> {
    lex.slice().chars().next()
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Symbol(c) | Token::Upper(c) => write!(f, "{}", c),
            Token::Decimal(d) => write!(f, "{}", d),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LAngle => write!(f, "<"),
            Token::RAngle => write!(f, ">"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Pipe => write!(f, "|"),
            Token::Bang => write!(f, "!"),
            Token::Star => write!(f, "*"),
            Token::Error => write!(f, "error"),
        }
    }
}

/// Lexer wrapper with position tracking
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<(Token, Span)>>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Lexer {
            inner: Token::lexer(source),
            peeked: None,
        }
    }

    pub fn next_token(&mut self) -> Option<(Token, Span)> {
        if let Some(peeked) = self.peeked.take() {
            return peeked;
        }
        let token = self.inner.next()?;
        let span = Span::from(self.inner.span());
        Some((token.unwrap_or(Token::Error), span))
    }

    pub fn peek_token(&mut self) -> Option<(Token, Span)> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_token());
        }
        self.peeked.as_ref().and_then(|x| x.clone())
    }

    pub fn source(&self) -> &'source str {
        self.inner.source()
    }

    pub fn slice(&self, span: Span) -> &'source str {
        &self.source()[span.to_range()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        while let Some((token, _)) = lexer.next_token() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn test_lex_heights() {
        assert_eq!(
            lex("b0 1"),
            vec![Token::Symbol('b'), Token::Symbol('0'), Token::Symbol('1')]
        );
    }

    #[test]
    fn test_lex_fraction_and_modifiers() {
        assert_eq!(
            lex("3.5pxB"),
            vec![
                Token::Symbol('3'),
                Token::Decimal(".5".into()),
                Token::Symbol('p'),
                Token::Symbol('x'),
                Token::Upper('B'),
            ]
        );
    }

    #[test]
    fn test_lex_punctuation() {
        assert_eq!(
            lex("{0}<(4,4)!|[33]*>"),
            vec![
                Token::LBrace,
                Token::Symbol('0'),
                Token::RBrace,
                Token::LAngle,
                Token::LParen,
                Token::Symbol('4'),
                Token::Comma,
                Token::Symbol('4'),
                Token::RParen,
                Token::Bang,
                Token::Pipe,
                Token::LBracket,
                Token::Symbol('3'),
                Token::Symbol('3'),
                Token::RBracket,
                Token::Star,
                Token::RAngle,
            ]
        );
    }

    #[test]
    fn test_lex_errors() {
        assert!(lex("531#").contains(&Token::Error));
        assert!(lex("3.a").contains(&Token::Error));
        assert!(lex("3p@").contains(&Token::Error));
    }

    #[test]
    fn test_spans_and_peek() {
        let mut lexer = Lexer::new("4 x");
        assert_eq!(lexer.peek_token(), Some((Token::Symbol('4'), Span::new(0, 1))));
        assert_eq!(lexer.next_token(), Some((Token::Symbol('4'), Span::new(0, 1))));
        let (token, span) = lexer.next_token().unwrap();
        assert_eq!(token, Token::Symbol('x'));
        assert_eq!(lexer.slice(span), "x");
        assert_eq!(lexer.next_token(), None);
    }
}
