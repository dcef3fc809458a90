//! Restricted boolean-expression evaluation for conditional compilation.
//!
//! Conditional guards are evaluated by a small, closed interpreter rather
//! than a general expression engine. The accepted grammar is exactly:
//! string/boolean/null literals, `import.meta.STRATA_*` markers, strict
//! equality (`===`, `!==`), logical `&&`/`||`/`!`, and parentheses. Anything
//! else is a hard failure, never a silent `false`.

use crate::config::Metadata;
use thiserror::Error;

/// A value occurring during condition evaluation.
///
/// Derived equality gives strict-equality semantics: values of different
/// variants never compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Null,
}

impl Value {
    /// Truthiness of a value, matching the semantics guard expressions were
    /// originally written against: `Null` is falsy, strings are truthy when
    /// non-empty.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Null => false,
        }
    }
}

/// Errors local to condition evaluation. The conditional compiler converts
/// these into crate errors carrying the offending file path.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CondError {
    #[error("unsupported construct '{0}'")]
    Unsupported(String),

    #[error("unknown marker '{0}'")]
    UnknownMarker(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Ident(String),
    Dot,
    LParen,
    RParen,
    And,
    Or,
    Not,
    StrictEq,
    StrictNe,
}

fn tokenize(input: &str) -> Result<Vec<Token>, CondError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::And);
                    i += 2;
                } else {
                    return Err(CondError::Unsupported("&".to_string()));
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::Or);
                    i += 2;
                } else {
                    return Err(CondError::Unsupported("|".to_string()));
                }
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') && chars.get(i + 2) == Some(&'=') {
                    tokens.push(Token::StrictEq);
                    i += 3;
                } else {
                    // loose equality and assignment are outside the grammar
                    return Err(CondError::Unsupported("=".to_string()));
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    if chars.get(i + 2) == Some(&'=') {
                        tokens.push(Token::StrictNe);
                        i += 3;
                    } else {
                        return Err(CondError::Unsupported("!=".to_string()));
                    }
                } else {
                    tokens.push(Token::Not);
                    i += 1;
                }
            }
            '"' | '\'' => {
                let quote = c;
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        Some('\\') => {
                            if let Some(escaped) = chars.get(i + 1) {
                                value.push(*escaped);
                                i += 2;
                            } else {
                                return Err(CondError::Unsupported("\\".to_string()));
                            }
                        }
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            value.push(ch);
                            i += 1;
                        }
                        None => {
                            return Err(CondError::Unsupported(
                                "unterminated string".to_string(),
                            ))
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            _ if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let mut ident = String::new();
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    ident.push(chars[i]);
                    i += 1;
                }
                tokens.push(Token::Ident(ident));
            }
            _ => return Err(CondError::Unsupported(c.to_string())),
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser and evaluator over the token stream. Marker
/// values are substituted during evaluation, so there is no separate AST.
struct Evaluator<'a> {
    tokens: Vec<Token>,
    pos: usize,
    metadata: &'a Metadata,
}

impl<'a> Evaluator<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<Value, CondError> {
        self.or()
    }

    fn or(&mut self) -> Result<Value, CondError> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.and()?;
            // no short-circuit: the right side must still be evaluable
            if !left.truthy() {
                left = right;
            }
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Value, CondError> {
        let mut left = self.equality()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.equality()?;
            if left.truthy() {
                left = right;
            }
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Value, CondError> {
        let mut left = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::StrictEq) => {
                    self.advance();
                    let right = self.unary()?;
                    left = Value::Bool(left == right);
                }
                Some(Token::StrictNe) => {
                    self.advance();
                    let right = self.unary()?;
                    left = Value::Bool(left != right);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Value, CondError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let value = self.unary()?;
            return Ok(Value::Bool(!value.truthy()));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value, CondError> {
        match self.advance() {
            Some(Token::LParen) => {
                let value = self.expression()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(CondError::Unsupported("unbalanced parenthesis".to_string())),
                }
            }
            Some(Token::Str(s)) => Ok(Value::Str(s)),
            Some(Token::Ident(ident)) => match ident.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" | "undefined" => Ok(Value::Null),
                "import" => self.marker(),
                other => Err(CondError::Unsupported(other.to_string())),
            },
            Some(token) => Err(CondError::Unsupported(format!("{:?}", token))),
            None => Err(CondError::Unsupported("empty expression".to_string())),
        }
    }

    /// Parses the tail of an `import.meta.<FLAG>` marker and substitutes its
    /// metadata value.
    fn marker(&mut self) -> Result<Value, CondError> {
        if self.advance() != Some(Token::Dot) {
            return Err(CondError::Unsupported("import".to_string()));
        }
        match self.advance() {
            Some(Token::Ident(meta)) if meta == "meta" => {}
            _ => return Err(CondError::Unsupported("import.".to_string())),
        }
        if self.advance() != Some(Token::Dot) {
            return Err(CondError::Unsupported("import.meta".to_string()));
        }
        let flag = match self.advance() {
            Some(Token::Ident(flag)) => flag,
            _ => return Err(CondError::Unsupported("import.meta.".to_string())),
        };

        self.metadata
            .marker_value(&flag)
            .ok_or(CondError::UnknownMarker(flag))
    }
}

/// Evaluates a conditional guard expression against run metadata.
///
/// # Arguments
/// * `expression` - Source text of the guard, e.g.
///   `import.meta.STRATA_FRAMEWORK === "react"`
/// * `metadata` - The run's feature selections
///
/// # Errors
/// * `CondError::Unsupported` for any construct outside the grammar
/// * `CondError::UnknownMarker` for markers without a metadata field
pub fn evaluate(expression: &str, metadata: &Metadata) -> Result<bool, CondError> {
    let tokens = tokenize(expression)?;
    let mut evaluator = Evaluator { tokens, pos: 0, metadata };
    let value = evaluator.expression()?;

    if let Some(trailing) = evaluator.peek() {
        return Err(CondError::Unsupported(format!("{:?}", trailing)));
    }

    Ok(value.truthy())
}
