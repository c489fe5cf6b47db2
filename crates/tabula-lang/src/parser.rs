use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

/// Statements end at a newline (or `;`), so unlike most expression
/// grammars the parser never skips line breaks inside a statement.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        // Comments carry no meaning once lexed
        let tokens = tokens.into_iter().filter(|t| t.kind != TokenKind::Comment).collect();
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens.get(self.pos + offset).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn skip_newlines(&mut self) {
        while self.peek_kind() == TokenKind::Newline {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{:?} '{}'", t.kind, t.text),
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(&format!("{:?}", kind))),
        }
    }

    fn expect_end_of_statement(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn last_end(&self, fallback: usize) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span.end)
            .unwrap_or(fallback)
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();

        loop {
            self.skip_newlines();

            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Maximize | TokenKind::Minimize => {
                    items.push(Item::Objective(self.parse_objective()?));
                }
                TokenKind::Subject => {
                    self.advance();
                    self.expect(TokenKind::To)?;
                    if self.peek_kind() == TokenKind::Colon {
                        self.advance();
                    }
                    self.expect_end_of_statement()?;
                }
                TokenKind::St => {
                    self.advance();
                    if self.peek_kind() == TokenKind::Colon {
                        self.advance();
                    }
                    self.expect_end_of_statement()?;
                }
                TokenKind::Ident | TokenKind::Number | TokenKind::Plus | TokenKind::Minus => {
                    items.push(Item::Constraint(self.parse_constraint()?));
                }
                _ => return Err(self.unexpected("objective, 'subject to', or constraint")),
            }
        }

        Ok(Program { items })
    }

    fn parse_objective(&mut self) -> Result<ObjectiveDecl, ParseError> {
        let Some(token) = self.advance().cloned() else {
            return Err(ParseError::UnexpectedEof);
        };
        let direction = match token.kind {
            TokenKind::Maximize => Direction::Maximize,
            _ => Direction::Minimize,
        };

        // Optional "z =" or ":" before the expression
        if self.peek_kind() == TokenKind::Colon {
            self.advance();
        } else if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Eq {
            self.advance();
            self.advance();
        }

        let expr = self.parse_expr()?;
        self.expect_end_of_statement()?;

        Ok(ObjectiveDecl {
            span: token.span.merge(expr.span),
            direction,
            expr,
        })
    }

    fn parse_constraint(&mut self) -> Result<ConstraintDecl, ParseError> {
        let start = self.current().map(|t| t.span.start).unwrap_or(0);

        let mut label = None;
        if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Colon {
            label = self.advance().map(|t| t.text.clone());
            self.advance();
        }

        let lhs = self.parse_expr()?;
        let relation = match self.peek_kind() {
            TokenKind::Le => Relation::Le,
            TokenKind::Ge => Relation::Ge,
            TokenKind::Eq => Relation::Eq,
            _ => return Err(self.unexpected("<=, >=, or =")),
        };
        self.advance();
        let rhs = self.parse_expr()?;
        let end = self.last_end(start);
        self.expect_end_of_statement()?;

        Ok(ConstraintDecl {
            span: Span::new(start, end),
            label,
            lhs,
            relation,
            rhs,
        })
    }

    /// `[+|-] term { (+|-) term }`
    fn parse_expr(&mut self) -> Result<LinearExpr, ParseError> {
        let start = self.current().map(|t| t.span.start).unwrap_or(0);
        let mut terms = Vec::new();
        let mut constant = 0.0;

        let mut sign = self.parse_sign();
        loop {
            match self.parse_term(sign)? {
                (Some(term), _) => terms.push(term),
                (None, value) => constant += value,
            }
            match self.peek_kind() {
                TokenKind::Plus | TokenKind::Minus => sign = self.parse_sign(),
                _ => break,
            }
        }

        Ok(LinearExpr {
            span: Span::new(start, self.last_end(start)),
            terms,
            constant,
        })
    }

    /// Folds any run of `+`/`-` into a single sign
    fn parse_sign(&mut self) -> f64 {
        let mut sign = 1.0;
        loop {
            match self.peek_kind() {
                TokenKind::Plus => {}
                TokenKind::Minus => sign = -sign,
                _ => return sign,
            }
            self.advance();
        }
    }

    /// `number [*] ident`, `ident`, or a bare `number`. Returns the term, or
    /// `None` and the signed value for a bare number.
    fn parse_term(&mut self, sign: f64) -> Result<(Option<Term>, f64), ParseError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let token = self.expect(TokenKind::Number)?;
                let value: f64 = token
                    .text
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber(token.text.clone()))?;

                if self.peek_kind() == TokenKind::Star {
                    self.advance();
                    if self.peek_kind() != TokenKind::Ident {
                        return Err(self.unexpected("variable after '*'"));
                    }
                }
                if self.peek_kind() == TokenKind::Ident {
                    let var = self.expect(TokenKind::Ident)?;
                    return Ok((
                        Some(Term {
                            span: token.span.merge(var.span),
                            coefficient: sign * value,
                            variable: var.text,
                        }),
                        0.0,
                    ));
                }
                Ok((None, sign * value))
            }
            TokenKind::Ident => {
                let var = self.expect(TokenKind::Ident)?;
                Ok((
                    Some(Term {
                        span: var.span,
                        coefficient: sign,
                        variable: var.text,
                    }),
                    0.0,
                ))
            }
            _ => Err(self.unexpected("number or variable")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(program: &Program) -> Vec<&ConstraintDecl> {
        program
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Constraint(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_objective() {
        let program = Parser::parse("maximize 3 x1 + 5*x2").unwrap();
        assert_eq!(program.items.len(), 1);
        match &program.items[0] {
            Item::Objective(o) => {
                assert_eq!(o.direction, Direction::Maximize);
                assert_eq!(o.expr.terms.len(), 2);
                assert_eq!(o.expr.terms[1].variable, "x2");
                assert_eq!(o.expr.terms[1].coefficient, 5.0);
            }
            _ => panic!("Expected objective"),
        }
    }

    #[test]
    fn test_parse_objective_with_name() {
        let program = Parser::parse("min z = 2x1 + 3x2").unwrap();
        match &program.items[0] {
            Item::Objective(o) => {
                assert_eq!(o.direction, Direction::Minimize);
                assert_eq!(o.expr.terms[0].variable, "x1");
            }
            _ => panic!("Expected objective"),
        }
    }

    #[test]
    fn test_parse_problem() {
        let source = r#"
            # Scenario with three limits
            maximize 3x1 + 5x2
            subject to
              c1: x1 <= 4
              2 x2 <= 12
              3x1 + 2x2 <= 18
        "#;
        let program = Parser::parse(source).unwrap();
        assert_eq!(program.items.len(), 4);

        let cs = constraints(&program);
        assert_eq!(cs.len(), 3);
        assert_eq!(cs[0].label.as_deref(), Some("c1"));
        assert_eq!(cs[1].label, None);
        assert_eq!(cs[2].relation, Relation::Le);
        assert_eq!(cs[2].rhs.constant, 18.0);
        assert!(!cs[2].rhs.has_variables());
    }

    #[test]
    fn test_signs_and_constants() {
        let program = Parser::parse("- x1 - -2 x2 + 3 >= -4").unwrap();
        let cs = constraints(&program);
        let c = cs[0];
        assert_eq!(c.lhs.terms[0].coefficient, -1.0);
        assert_eq!(c.lhs.terms[1].coefficient, 2.0);
        assert_eq!(c.lhs.constant, 3.0);
        assert_eq!(c.relation, Relation::Ge);
        assert_eq!(c.rhs.constant, -4.0);
    }

    #[test]
    fn test_semicolon_separated() {
        let program = Parser::parse("min x + y; x + y = 10; x <= 7").unwrap();
        assert_eq!(program.items.len(), 3);
        assert_eq!(constraints(&program)[0].relation, Relation::Eq);
    }

    #[test]
    fn test_missing_relation() {
        let err = Parser::parse("x1 + x2 4").unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, span, .. } => {
                assert_eq!(expected, "<=, >=, or =");
                assert_eq!(span, Span::new(8, 9));
            }
            other => panic!("Expected unexpected token, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_operator() {
        assert_eq!(Parser::parse("x1 <= 4 +").unwrap_err(), ParseError::UnexpectedEof);
        assert!(matches!(
            Parser::parse("2 * <= 3"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }
}
