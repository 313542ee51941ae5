use crate::ast::*;
use crate::error::{ParseError, Result};
use crate::evaluator::evaluate;
use crate::lexer::{Lexer, Token};
use crate::span::Span;
use siteswap_core::encoding::{ss_to_float, ss_to_int};
use siteswap_core::{Hand, Siteswap, VanillaSiteswap};

/// Recursive-descent parser for siteswap notation
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    last_end: usize,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            last_end: 0,
        }
    }

    /// Parse a complete pattern; trailing input is an error
    pub fn parse_pattern(&mut self) -> Result<PatternNode> {
        let start = match self.peek() {
            Some((_, span)) => span,
            None => return Err(ParseError::unexpected_eof("a pattern")),
        };

        let delays = match self.peek() {
            Some((Token::LBrace, _)) => Some(self.parse_delays()?),
            _ => None,
        };

        let (jugglers, bracketed) = match self.peek() {
            Some((Token::LAngle, open)) => {
                self.next();
                let mut jugglers = vec![self.parse_juggler()?];
                while let Some((Token::Pipe, _)) = self.peek() {
                    self.next();
                    jugglers.push(self.parse_juggler()?);
                }
                self.expect_close(Token::RAngle, '<', open)?;
                (jugglers, true)
            }
            _ => (vec![self.parse_juggler()?], false),
        };

        if let Some((token, span)) = self.next() {
            return Err(ParseError::unexpected_token("end of input", token.to_string(), span));
        }

        Ok(PatternNode {
            delays,
            jugglers,
            bracketed,
            span: start.until(self.last_end),
        })
    }

    /// `{d0,d1,...}`
    fn parse_delays(&mut self) -> Result<Vec<f64>> {
        let open = self.expect_token(Token::LBrace)?;
        let mut delays = vec![self.parse_number()?];
        loop {
            match self.next() {
                Some((Token::Comma, _)) => delays.push(self.parse_number()?),
                Some((Token::RBrace, _)) => return Ok(delays),
                Some((token, span)) => {
                    return Err(ParseError::unexpected_token("',' or '}'", token.to_string(), span))
                }
                None => return Err(ParseError::unclosed_delimiter('{', open)),
            }
        }
    }

    /// Decimal digits with an optional fraction, all adjacent
    fn parse_number(&mut self) -> Result<f64> {
        let mut text = String::new();
        let span = match self.next() {
            Some((Token::Symbol(c), span)) if c.is_ascii_digit() => {
                text.push(c);
                span
            }
            Some((token, span)) => {
                return Err(ParseError::unexpected_token("a number", token.to_string(), span))
            }
            None => return Err(ParseError::unexpected_eof("a number")),
        };
        while let Some(Token::Symbol(c)) = self.peek_adjacent() {
            if !c.is_ascii_digit() {
                break;
            }
            self.next();
            text.push(c);
        }
        if let Some(Token::Decimal(decimal)) = self.peek_adjacent() {
            self.next();
            text.push_str(&decimal);
        }
        let span = span.until(self.last_end);
        text.parse()
            .map_err(|_| ParseError::invalid_number(text.clone(), span))
    }

    /// Beats up to `|`, `>` or the end, then an optional `*`
    fn parse_juggler(&mut self) -> Result<JugglerNode> {
        let mut beats = Vec::new();
        loop {
            match self.peek() {
                None | Some((Token::Pipe | Token::RAngle | Token::Star, _)) => break,
                _ => beats.push(self.parse_beat()?),
            }
        }
        let Some(first) = beats.first() else {
            return Err(match self.peek() {
                Some((token, span)) => ParseError::unexpected_token("a beat", token.to_string(), span),
                None => ParseError::unexpected_eof("a beat"),
            });
        };
        let start = first.span();

        let repeat_flipped = matches!(self.peek(), Some((Token::Star, _)));
        if repeat_flipped {
            self.next();
        }

        Ok(JugglerNode {
            beats,
            repeat_flipped,
            span: start.until(self.last_end),
        })
    }

    fn parse_beat(&mut self) -> Result<BeatNode> {
        match self.peek() {
            Some((Token::LParen, open)) => {
                self.next();
                let left = self.parse_group()?;
                match self.next() {
                    Some((Token::Comma, _)) => {}
                    Some((token, span)) => {
                        return Err(ParseError::unexpected_token("','", token.to_string(), span))
                    }
                    None => return Err(ParseError::unclosed_delimiter('(', open)),
                }
                let right = self.parse_group()?;
                self.expect_close(Token::RParen, '(', open)?;
                let bang = matches!(self.peek(), Some((Token::Bang, _)));
                if bang {
                    self.next();
                }
                Ok(BeatNode::Sync {
                    left,
                    right,
                    bang,
                    span: open.until(self.last_end),
                })
            }
            Some((Token::Upper(c @ ('L' | 'R')), prefix)) => {
                self.next();
                let hand = if c == 'L' { Hand::Left } else { Hand::Right };
                let group = self.parse_group()?;
                Ok(BeatNode::Async {
                    hand: Some(hand),
                    group,
                    span: prefix.until(self.last_end),
                })
            }
            Some((Token::Symbol(_) | Token::LBracket, _)) => {
                let group = self.parse_group()?;
                let span = group.span;
                Ok(BeatNode::Async {
                    hand: None,
                    group,
                    span,
                })
            }
            Some((token, span)) => Err(ParseError::unexpected_token("a beat", token.to_string(), span)),
            None => Err(ParseError::unexpected_eof("a beat")),
        }
    }

    fn parse_group(&mut self) -> Result<GroupNode> {
        match self.peek() {
            Some((Token::LBracket, open)) => {
                self.next();
                let mut throws = Vec::new();
                while let Some((Token::Symbol(_), _)) = self.peek() {
                    throws.push(self.parse_throw()?);
                }
                if throws.is_empty() {
                    return Err(match self.peek() {
                        Some((Token::RBracket, close)) => {
                            ParseError::custom("Empty multiplex", Some(open.merge(close)))
                        }
                        Some((token, span)) => {
                            ParseError::unexpected_token("a throw", token.to_string(), span)
                        }
                        None => ParseError::unclosed_delimiter('[', open),
                    });
                }
                let close = self.expect_close(Token::RBracket, '[', open)?;
                Ok(GroupNode {
                    throws,
                    multiplex: true,
                    span: open.merge(close),
                })
            }
            _ => {
                let throw = self.parse_throw()?;
                let span = throw.span;
                Ok(GroupNode {
                    throws: vec![throw],
                    multiplex: false,
                    span,
                })
            }
        }
    }

    /// Height, then an adjacent fraction, modifiers and recipient
    fn parse_throw(&mut self) -> Result<ThrowNode> {
        let (symbol, start) = match self.next() {
            Some((Token::Symbol(c), span)) => (c, span),
            Some((token, span)) => {
                return Err(ParseError::unexpected_token("a throw", token.to_string(), span))
            }
            None => return Err(ParseError::unexpected_eof("a throw")),
        };

        let height = if let Some(Token::Decimal(decimal)) = self.peek_adjacent() {
            self.next();
            let text = format!("{}{}", symbol, decimal);
            let span = start.until(self.last_end);
            ss_to_float(&text).map_err(|_| ParseError::invalid_number(text, span))?
        } else {
            ss_to_int(&symbol.to_string())
                .map_err(|_| ParseError::invalid_number(symbol.to_string(), start))? as f64
        };

        let (mut pass, mut x) = (false, false);
        loop {
            match self.peek_adjacent() {
                Some(Token::Symbol('p')) if !pass => pass = true,
                Some(Token::Symbol('x')) if !x => x = true,
                _ => break,
            }
            self.next();
        }

        let mut recipient = None;
        if pass {
            if let Some(Token::Upper(c)) = self.peek_adjacent() {
                self.next();
                recipient = Some(c);
            }
        }

        Ok(ThrowNode {
            height,
            pass,
            x,
            recipient,
            span: start.until(self.last_end),
        })
    }

    fn peek(&mut self) -> Option<(Token, Span)> {
        self.lexer.peek_token()
    }

    /// The next token, only if nothing separates it from the last one
    fn peek_adjacent(&mut self) -> Option<Token> {
        let last_end = self.last_end;
        match self.peek() {
            Some((token, span)) if span.starts_at(last_end) => Some(token),
            _ => None,
        }
    }

    fn next(&mut self) -> Option<(Token, Span)> {
        let next = self.lexer.next_token();
        if let Some((_, span)) = &next {
            self.last_end = span.end;
        }
        next
    }

    fn expect_token(&mut self, expected: Token) -> Result<Span> {
        match self.next() {
            Some((token, span)) if token == expected => Ok(span),
            Some((token, span)) => Err(ParseError::unexpected_token(
                expected.to_string(),
                token.to_string(),
                span,
            )),
            None => Err(ParseError::unexpected_eof(expected.to_string())),
        }
    }

    fn expect_close(&mut self, expected: Token, delimiter: char, open: Span) -> Result<Span> {
        match self.next() {
            Some((token, span)) if token == expected => Ok(span),
            Some((token, span)) => Err(ParseError::unexpected_token(
                format!("'{}'", expected),
                token.to_string(),
                span,
            )),
            None => Err(ParseError::unclosed_delimiter(delimiter, open)),
        }
    }
}

/// Parse pattern text into its syntax tree
pub fn parse(source: &str) -> Result<PatternNode> {
    Parser::new(source).parse_pattern()
}

/// Parse and build a pattern. Syntax errors are `Err`; a pattern that parses
/// but cannot be juggled comes back with `is_valid() == false`.
pub fn parse_siteswap(source: &str) -> Result<Siteswap> {
    Ok(evaluate(&parse(source)?))
}

/// Heights only, with `[..]` multiplexes
pub fn parse_vanilla(source: &str) -> Result<VanillaSiteswap> {
    Ok(VanillaSiteswap::parse(source)?)
}

pub fn parse_stack(source: &str) -> Result<VanillaSiteswap> {
    Ok(VanillaSiteswap::parse_stack(source)?)
}

/// A vanilla pattern shared out between `hands / 2` jugglers
pub fn parse_khss(source: &str, hands: usize) -> Result<Siteswap> {
    Ok(Siteswap::from_khss(&parse_vanilla(source)?, hands)?)
}
