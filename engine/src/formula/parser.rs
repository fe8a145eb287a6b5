// Recursive-descent parser over the typed formula elements, compiling to a
// postfix program that is evaluated with an explicit value stack.
//
// Grammar (lowest to highest binding):
//   expr    := unary (binop unary)*        -- precedence climbing, left assoc
//   unary   := ('+' | '-')* primary
//   primary := number | variable | '(' expr ')'
use shared::models::{ElementKind, Formula};
use std::fmt;

use super::EvalError;

/// Deepest nesting of parentheses and operator levels the parser accepts.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Op {
    /// Maps an operator element to its operator, accepting the builder's
    /// display glyphs (`×`, `÷`, `−`) alongside the ASCII forms.
    pub fn from_symbol(symbol: &str) -> Option<Op> {
        match symbol.trim() {
            "+" => Some(Op::Add),
            "-" | "−" | "–" => Some(Op::Sub),
            "*" | "×" | "·" => Some(Op::Mul),
            "/" | "÷" => Some(Op::Div),
            "%" => Some(Op::Rem),
            _ => None,
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div | Op::Rem => 2,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
            Op::Rem => '%',
        }
    }

    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        match self {
            Op::Add => Ok(lhs + rhs),
            Op::Sub => Ok(lhs - rhs),
            Op::Mul => Ok(lhs * rhs),
            Op::Div => {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(lhs / rhs)
            }
            Op::Rem => {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                // Truncated remainder: the result takes the sign of the dividend.
                Ok(lhs % rhs)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Var(String),
    Op(Op),
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{}", n),
            Token::Var(name) => write!(f, "{}", name),
            Token::Op(op) => write!(f, "{}", op.symbol()),
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Instr {
    Num(f64),
    Var(String),
    Neg,
    Binary(Op),
}

/// A parsed formula in postfix order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    code: Vec<Instr>,
}

impl Program {
    /// Evaluates the program; `resolve` supplies the value of each variable.
    pub fn eval<F>(&self, resolve: &F) -> Result<f64, EvalError>
    where
        F: Fn(&str) -> f64,
    {
        let mut stack: Vec<f64> = Vec::with_capacity(self.code.len());
        for instr in &self.code {
            match instr {
                Instr::Num(n) => stack.push(*n),
                Instr::Var(name) => stack.push(resolve(name)),
                Instr::Neg => {
                    let value = stack.pop().ok_or(EvalError::UnexpectedEnd)?;
                    stack.push(-value);
                }
                Instr::Binary(op) => {
                    let rhs = stack.pop().ok_or(EvalError::UnexpectedEnd)?;
                    let lhs = stack.pop().ok_or(EvalError::UnexpectedEnd)?;
                    stack.push(op.apply(lhs, rhs)?);
                }
            }
        }
        match (stack.pop(), stack.is_empty()) {
            (Some(value), true) => Ok(value),
            _ => Err(EvalError::UnexpectedEnd),
        }
    }
}

fn paren_token(value: &str) -> Option<Token> {
    match value.trim() {
        "(" => Some(Token::Open),
        ")" => Some(Token::Close),
        _ => None,
    }
}

fn tokenize(formula: &Formula) -> Result<Vec<Token>, EvalError> {
    formula
        .elements()
        .iter()
        .map(|element| match element.kind {
            ElementKind::Variable => Ok(Token::Var(element.value.trim().to_string())),
            ElementKind::Number => {
                let literal = element.value.trim();
                match literal.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Token::Num(n)),
                    _ => Err(EvalError::InvalidNumber(element.value.clone())),
                }
            }
            ElementKind::Parenthesis => paren_token(&element.value)
                .ok_or_else(|| EvalError::UnexpectedToken(element.value.clone())),
            // Operator buttons may also carry the parentheses.
            ElementKind::Operator => paren_token(&element.value)
                .or_else(|| Op::from_symbol(&element.value).map(Token::Op))
                .ok_or_else(|| EvalError::UnknownOperator(element.value.clone())),
        })
        .collect()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    code: Vec<Instr>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_expr(&mut self, min_precedence: u8, depth: usize) -> Result<(), EvalError> {
        if depth > MAX_DEPTH {
            return Err(EvalError::TooDeep(MAX_DEPTH));
        }
        self.parse_unary(depth)?;
        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            if op.precedence() < min_precedence {
                break;
            }
            self.pos += 1;
            self.parse_expr(op.precedence() + 1, depth + 1)?;
            self.code.push(Instr::Binary(op));
        }
        Ok(())
    }

    // A run of signs collapses to at most one negation.
    fn parse_unary(&mut self, depth: usize) -> Result<(), EvalError> {
        let mut negate = false;
        while let Some(Token::Op(op)) = self.peek() {
            match *op {
                Op::Sub => negate = !negate,
                Op::Add => {}
                _ => break,
            }
            self.pos += 1;
        }
        self.parse_primary(depth)?;
        if negate {
            self.code.push(Instr::Neg);
        }
        Ok(())
    }

    fn parse_primary(&mut self, depth: usize) -> Result<(), EvalError> {
        match self.next() {
            Some(Token::Num(n)) => self.code.push(Instr::Num(n)),
            Some(Token::Var(name)) => self.code.push(Instr::Var(name)),
            Some(Token::Open) => {
                self.parse_expr(1, depth + 1)?;
                match self.next() {
                    Some(Token::Close) => {}
                    Some(other) => return Err(EvalError::UnexpectedToken(other.to_string())),
                    None => return Err(EvalError::UnbalancedParenthesis),
                }
            }
            Some(Token::Close) => return Err(EvalError::UnbalancedParenthesis),
            Some(other) => return Err(EvalError::UnexpectedToken(other.to_string())),
            None => return Err(EvalError::UnexpectedEnd),
        }
        Ok(())
    }
}

/// Parses a non-empty formula into a postfix program.
pub fn parse(formula: &Formula) -> Result<Program, EvalError> {
    let tokens = tokenize(formula)?;
    if tokens.is_empty() {
        return Err(EvalError::UnexpectedEnd);
    }
    let mut parser = Parser {
        code: Vec::with_capacity(tokens.len()),
        tokens,
        pos: 0,
    };
    parser.parse_expr(1, 0)?;
    match parser.next() {
        None => Ok(Program { code: parser.code }),
        Some(Token::Close) => Err(EvalError::UnbalancedParenthesis),
        Some(other) => Err(EvalError::UnexpectedToken(other.to_string())),
    }
}
