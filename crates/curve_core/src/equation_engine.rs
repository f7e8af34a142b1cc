//! Sandboxed expression language for user-authored curves.
//!
//! Source text is parsed into an [`Expr`], compiled into [`Bytecode`] and run by a
//! small stack [`VM`]. Compiled code can only see the parameter `t`, the constants
//! of the [`MathContext`] it was compiled against and a fixed whitelist of math
//! functions. Nothing else is reachable from an expression.

use crate::traits::PositionFunction;
use anyhow::{anyhow, bail};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use thiserror::Error;

/// Name of the curve parameter inside expressions.
pub const PARAMETER_NAME: &str = "t";

/// Deepest expression tree the parser will build.
pub const MAX_DEPTH: usize = 256;

/// Errors produced while turning source text into bytecode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected ')'")]
    ExpectedClosingParen,
    #[error("unexpected trailing input starting at {0}")]
    TrailingInput(String),
    #[error("unknown variable or constant: {0}")]
    UnknownIdentifier(String),
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Named constants visible to compiled expressions.
///
/// Passed explicitly into every evaluation; there is no global context.
/// A constant named `t` is shadowed by the curve parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MathContext {
    constants: BTreeMap<String, f64>,
}

impl MathContext {
    /// A context without any constants.
    pub fn empty() -> Self {
        Self {
            constants: BTreeMap::new(),
        }
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.constants.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constants.keys().map(String::as_str)
    }
}

impl Default for MathContext {
    /// `PI` and `Tau`, the constants every curve can rely on.
    fn default() -> Self {
        Self::empty()
            .with_constant("PI", std::f64::consts::PI)
            .with_constant("Tau", std::f64::consts::TAU)
    }
}

/// OpCodes for the stack-based virtual machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Pushes a constant `f64` value onto the stack.
    LoadConst(f64),
    /// Pushes the curve parameter `t`.
    LoadParameter,
    /// Pushes the value of a context constant (by index into the curve's constant table).
    LoadConstant(usize),
    /// Pops top two values (b, a), pushes (a + b).
    Add,
    /// Pops top two values (b, a), pushes (a - b).
    Sub,
    /// Pops top two values (b, a), pushes (a * b).
    Mul,
    /// Pops top two values (b, a), pushes (a / b).
    Div,
    /// Pops top two values (b, a), pushes (a ^ b).
    Pow,
    /// Pops top value (a), pushes -a.
    Neg,
    /// Pops top value (a), pushes f(a) for a whitelisted function.
    Call(MathFn),
}

/// Functions callable from expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Abs,
    /// Clamps to `[0, 1]`. Only available to colour expressions.
    ColorClamp,
}

impl MathFn {
    pub fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "sin" => MathFn::Sin,
            "cos" => MathFn::Cos,
            "tan" => MathFn::Tan,
            "exp" => MathFn::Exp,
            "ln" => MathFn::Ln,
            "sqrt" => MathFn::Sqrt,
            "abs" => MathFn::Abs,
            "colorClamp" => MathFn::ColorClamp,
            _ => return None,
        };
        Some(func)
    }

    fn apply(self, a: f64) -> f64 {
        match self {
            MathFn::Sin => a.sin(),
            MathFn::Cos => a.cos(),
            MathFn::Tan => a.tan(),
            MathFn::Exp => a.exp(),
            MathFn::Ln => a.ln(),
            MathFn::Sqrt => a.sqrt(),
            MathFn::Abs => a.abs(),
            MathFn::ColorClamp => clamp_unit(a),
        }
    }
}

/// Clamps to `[0, 1]`; NaN becomes 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Represents a compiled sequence of operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
}

/// Stack-based virtual machine for evaluating compiled expressions.
///
/// The VM is stateless; `execute` takes all necessary context:
/// - `bytecode`: instructions to run.
/// - `t`: the curve parameter.
/// - `constants`: values of the curve's constant table, in table order.
/// - `stack`: a mutable buffer for intermediate computations.
pub struct VM;

impl VM {
    pub fn execute(
        bytecode: &Bytecode,
        t: f64,
        constants: &[f64],
        stack: &mut Vec<f64>,
    ) -> anyhow::Result<f64> {
        stack.clear();

        for op in &bytecode.ops {
            match *op {
                OpCode::LoadConst(val) => stack.push(val),
                OpCode::LoadParameter => stack.push(t),
                OpCode::LoadConstant(idx) => {
                    let value = constants
                        .get(idx)
                        .copied()
                        .ok_or_else(|| anyhow!("constant slot {idx} is not bound"))?;
                    stack.push(value);
                }
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Pow => {
                    let b = pop(stack)?;
                    let a = pop(stack)?;
                    stack.push(match op {
                        OpCode::Add => a + b,
                        OpCode::Sub => a - b,
                        OpCode::Mul => a * b,
                        OpCode::Div => a / b,
                        _ => a.powf(b),
                    });
                }
                OpCode::Neg => {
                    let a = pop(stack)?;
                    stack.push(-a);
                }
                OpCode::Call(func) => {
                    let a = pop(stack)?;
                    stack.push(func.apply(a));
                }
            }
        }

        let result = pop(stack)?;
        if !stack.is_empty() {
            bail!("malformed bytecode: {} values left on the stack", stack.len());
        }
        Ok(result)
    }
}

fn pop(stack: &mut Vec<f64>) -> anyhow::Result<f64> {
    stack
        .pop()
        .ok_or_else(|| anyhow!("malformed bytecode: stack underflow"))
}

// --- AST & Parser ---

/// Abstract syntax tree nodes for expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Binary(Box<Expr>, char, Box<Expr>), // char is operator +, -, *, /, ^
    Unary(char, Box<Expr>),
    Call(String, Box<Expr>),
}

/// Compiles an AST into `Bytecode`, resolving names against a [`MathContext`].
///
/// Each compiler owns a constant table: the first time a context constant is
/// referenced it gets the next slot, so the table only lists names actually used.
pub struct Compiler<'a> {
    context: &'a MathContext,
    constants: Vec<String>,
    color: bool,
}

impl<'a> Compiler<'a> {
    pub fn new(context: &'a MathContext) -> Self {
        Self {
            context,
            constants: Vec::new(),
            color: false,
        }
    }

    /// A compiler for colour channels, which may also call `colorClamp`.
    pub fn for_color(context: &'a MathContext) -> Self {
        Self {
            color: true,
            ..Self::new(context)
        }
    }

    pub fn compile(&mut self, expr: &Expr) -> Result<Bytecode, CompileError> {
        let mut ops = Vec::new();
        self.compile_recursive(expr, &mut ops)?;
        Ok(Bytecode { ops })
    }

    /// Constant names in slot order.
    pub fn into_constants(self) -> Vec<String> {
        self.constants
    }

    fn constant_slot(&mut self, name: &str) -> usize {
        match self.constants.iter().position(|c| c == name) {
            Some(idx) => idx,
            None => {
                self.constants.push(name.to_string());
                self.constants.len() - 1
            }
        }
    }

    fn compile_recursive(&mut self, expr: &Expr, ops: &mut Vec<OpCode>) -> Result<(), CompileError> {
        match expr {
            Expr::Number(n) => ops.push(OpCode::LoadConst(*n)),
            Expr::Variable(name) => {
                if name == PARAMETER_NAME {
                    ops.push(OpCode::LoadParameter);
                } else if self.context.contains(name) {
                    let idx = self.constant_slot(name);
                    ops.push(OpCode::LoadConstant(idx));
                } else {
                    return Err(CompileError::UnknownIdentifier(name.clone()));
                }
            }
            Expr::Binary(left, op, right) => {
                self.compile_recursive(left, ops)?;
                self.compile_recursive(right, ops)?;
                ops.push(match op {
                    '+' => OpCode::Add,
                    '-' => OpCode::Sub,
                    '*' => OpCode::Mul,
                    '/' => OpCode::Div,
                    '^' => OpCode::Pow,
                    other => return Err(CompileError::UnexpectedToken(format!("'{other}'"))),
                });
            }
            Expr::Unary(op, operand) => {
                self.compile_recursive(operand, ops)?;
                match op {
                    '-' => ops.push(OpCode::Neg),
                    other => return Err(CompileError::UnexpectedToken(format!("'{other}'"))),
                }
            }
            Expr::Call(func, arg) => {
                let func = MathFn::from_name(func)
                    .filter(|f| self.color || *f != MathFn::ColorClamp)
                    .ok_or_else(|| CompileError::UnknownFunction(func.clone()))?;
                self.compile_recursive(arg, ops)?;
                ops.push(OpCode::Call(func));
            }
        }
        Ok(())
    }
}

// --- Parser ---

/// Parses a string expression into an AST.
pub fn parse(input: &str) -> Result<Expr, CompileError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let (expr, _) = parser.parse_expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(CompileError::TrailingInput(format!("{token:?}"))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut num_str = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    num_str.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            // Exponent, only when digits follow: `2e` stays `2` then `e`.
            if let Some(&(_, 'e' | 'E')) = chars.peek() {
                let mut ahead = chars.clone();
                ahead.next();
                let mut exponent = String::from("e");
                if let Some(&(_, sign @ ('+' | '-'))) = ahead.peek() {
                    exponent.push(sign);
                    ahead.next();
                }
                if ahead.peek().is_some_and(|&(_, d)| d.is_ascii_digit()) {
                    while let Some(&(_, d)) = ahead.peek() {
                        if !d.is_ascii_digit() {
                            break;
                        }
                        exponent.push(d);
                        ahead.next();
                    }
                    num_str.push_str(&exponent);
                    chars = ahead;
                }
            }
            let value = num_str
                .parse()
                .map_err(|_| CompileError::InvalidNumber(num_str.clone()))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() {
            let mut ident = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            let token = match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                '(' => Token::LParen,
                ')' => Token::RParen,
                _ => return Err(CompileError::UnexpectedCharacter { ch: c, pos }),
            };
            tokens.push(token);
            chars.next();
        }
    }
    Ok(tokens)
}

/// An expression with the depth of its tree.
type Parsed = (Expr, usize);

fn node(expr: Expr, depth: usize) -> Result<Parsed, CompileError> {
    if depth > MAX_DEPTH {
        return Err(CompileError::TooDeep(MAX_DEPTH));
    }
    Ok((expr, depth))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    // Current recursion depth, bounded by MAX_DEPTH.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        if self.depth >= MAX_DEPTH {
            return Err(CompileError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_expression(&mut self) -> Result<Parsed, CompileError> {
        let (mut left, mut depth) = self.parse_factor()?;

        loop {
            let op = match self.peek() {
                Some(Token::Plus) => '+',
                Some(Token::Minus) => '-',
                _ => break,
            };
            self.consume();
            let (right, right_depth) = self.parse_factor()?;
            (left, depth) = node(
                Expr::Binary(Box::new(left), op, Box::new(right)),
                depth.max(right_depth) + 1,
            )?;
        }
        Ok((left, depth))
    }

    fn parse_factor(&mut self) -> Result<Parsed, CompileError> {
        let (mut left, mut depth) = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Some(Token::Star) => '*',
                Some(Token::Slash) => '/',
                _ => break,
            };
            self.consume();
            let (right, right_depth) = self.parse_unary()?;
            (left, depth) = node(
                Expr::Binary(Box::new(left), op, Box::new(right)),
                depth.max(right_depth) + 1,
            )?;
        }
        Ok((left, depth))
    }

    // Unary minus binds looser than '^', so -t^2 is -(t^2).
    fn parse_unary(&mut self) -> Result<Parsed, CompileError> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let (expr, depth) = self.nested(Self::parse_unary)?;
            return node(Expr::Unary('-', Box::new(expr)), depth + 1);
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Parsed, CompileError> {
        let (base, base_depth) = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            // right associative: 2^3^2 = 2^(3^2)
            let (exponent, exponent_depth) = self.nested(Self::parse_unary)?;
            return node(
                Expr::Binary(Box::new(base), '^', Box::new(exponent)),
                base_depth.max(exponent_depth) + 1,
            );
        }
        Ok((base, base_depth))
    }

    fn parse_primary(&mut self) -> Result<Parsed, CompileError> {
        match self.consume() {
            Some(Token::Number(n)) => Ok((Expr::Number(n), 1)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume(); // eat '('
                    let (arg, depth) = self.nested(Self::parse_expression)?;
                    self.expect_closing_paren()?;
                    node(Expr::Call(name, Box::new(arg)), depth + 1)
                } else {
                    Ok((Expr::Variable(name), 1))
                }
            }
            Some(Token::LParen) => {
                let parsed = self.nested(Self::parse_expression)?;
                self.expect_closing_paren()?;
                Ok(parsed)
            }
            Some(token) => Err(CompileError::UnexpectedToken(format!("{token:?}"))),
            None => Err(CompileError::UnexpectedEnd),
        }
    }

    fn expect_closing_paren(&mut self) -> Result<(), CompileError> {
        match self.consume() {
            Some(Token::RParen) => Ok(()),
            _ => Err(CompileError::ExpectedClosingParen),
        }
    }
}

// --- ExpressionCurve ---

/// A curve compiled from a pair of expressions `x(t)` and `y(t)`.
pub struct ExpressionCurve {
    x: Bytecode,
    y: Bytecode,
    constants: Vec<String>,
    // Interior mutability for the VM buffers to avoid allocation per evaluation.
    // Note: this makes the curve !Sync.
    stack: RefCell<Vec<f64>>,
    constant_values: RefCell<Vec<f64>>,
}

/// Compiles `x(t)` and `y(t)` source text into an [`ExpressionCurve`].
///
/// Names are resolved against `context`; the same constants must be present
/// in the context passed to [`PositionFunction::evaluate`].
pub fn compile_curve(
    x_source: &str,
    y_source: &str,
    context: &MathContext,
) -> Result<ExpressionCurve, CompileError> {
    let x_expr = parse(x_source)?;
    let y_expr = parse(y_source)?;

    let mut compiler = Compiler::new(context);
    let x = compiler.compile(&x_expr)?;
    let y = compiler.compile(&y_expr)?;
    let constants = compiler.into_constants();

    Ok(ExpressionCurve {
        x,
        y,
        stack: RefCell::new(Vec::with_capacity(32)),
        constant_values: RefCell::new(Vec::with_capacity(constants.len())),
        constants,
    })
}

/// Looks up `names` in `ctx`, in order, replacing the contents of `values`.
pub(crate) fn bind_constants(
    names: &[String],
    ctx: &MathContext,
    values: &mut Vec<f64>,
) -> anyhow::Result<()> {
    values.clear();
    for name in names {
        let value = ctx
            .get(name)
            .ok_or_else(|| anyhow!("constant '{name}' is missing from the math context"))?;
        values.push(value);
    }
    Ok(())
}

impl ExpressionCurve {
    /// Constants the curve reads from its context, in slot order.
    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    /// Evaluates the curve once at `t = 0` and rejects non-finite output.
    pub fn validate(&self, ctx: &MathContext) -> anyhow::Result<()> {
        let origin = self.evaluate(0.0, ctx)?;
        if !(origin.x.is_finite() && origin.y.is_finite()) {
            bail!("curve is not finite at t=0: ({}, {})", origin.x, origin.y);
        }
        Ok(())
    }
}

impl PositionFunction for ExpressionCurve {
    fn evaluate(&self, t: f64, ctx: &MathContext) -> anyhow::Result<Point2<f64>> {
        let mut values = self.constant_values.borrow_mut();
        bind_constants(&self.constants, ctx, &mut values)?;

        let mut stack = self.stack.borrow_mut();
        let x = VM::execute(&self.x, t, &values, &mut stack)?;
        let y = VM::execute(&self.y, t, &values, &mut stack)?;
        Ok(Point2::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str, t: f64) -> f64 {
        let ctx = MathContext::default();
        let expr = parse(source).expect("expression should parse");
        let mut compiler = Compiler::new(&ctx);
        let code = compiler.compile(&expr).expect("expression should compile");
        let values: Vec<f64> = compiler
            .into_constants()
            .iter()
            .map(|name| ctx.get(name).expect("constant should exist"))
            .collect();
        VM::execute(&code, t, &values, &mut Vec::new()).expect("bytecode should run")
    }

    #[test]
    fn operator_precedence_and_associativity() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("8 / 4 / 2", 0.0), 1.0);
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval("-t ^ 2", 3.0), -9.0);
        assert_eq!(eval("10 - 2 - 3", 0.0), 5.0);
    }

    #[test]
    fn whitelisted_functions_and_constants() {
        assert!((eval("sin(PI / 2)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval("cos(Tau * t)", 0.5) + 1.0).abs() < 1e-12);
        assert_eq!(eval("sqrt(abs(-16))", 0.0), 4.0);
        assert!((eval("ln(exp(t))", 2.5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn scientific_literals() {
        assert!((eval("1e-3 * t", 2.0) - 0.002).abs() < 1e-15);
        assert_eq!(eval("2.5E2", 0.0), 250.0);
        assert_eq!(eval("1e+1 + t", 1.0), 11.0);
        assert!(matches!(parse("2e"), Err(CompileError::TrailingInput(_))));
    }

    #[test]
    fn deep_nesting_is_rejected_without_overflowing() {
        let minus = format!("{}t", "-".repeat(20_000));
        assert_eq!(parse(&minus), Err(CompileError::TooDeep(MAX_DEPTH)));

        let parens = format!("{}t{}", "(".repeat(20_000), ")".repeat(20_000));
        assert_eq!(parse(&parens), Err(CompileError::TooDeep(MAX_DEPTH)));

        let calls = format!("{}t{}", "sin(".repeat(20_000), ")".repeat(20_000));
        assert_eq!(parse(&calls), Err(CompileError::TooDeep(MAX_DEPTH)));

        let sum = format!("t{}", " + t".repeat(20_000));
        assert_eq!(parse(&sum), Err(CompileError::TooDeep(MAX_DEPTH)));

        let ctx = MathContext::default();
        assert_eq!(
            compile_curve(&minus, "t", &ctx).err(),
            Some(CompileError::TooDeep(MAX_DEPTH))
        );
    }

    #[test]
    fn moderate_nesting_still_compiles() {
        let nested = format!("{}t{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(eval(&nested, 0.5), 0.5);
        assert_eq!(eval(&format!("{}t", "-".repeat(100)), 0.5), 0.5);
        let sum = format!("t{}", " + t".repeat(99));
        assert!((eval(&sum, 1.0) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn color_clamp_is_reserved_for_colour_channels() {
        let ctx = MathContext::default();
        assert_eq!(
            compile_curve("colorClamp(t)", "t", &ctx).err(),
            Some(CompileError::UnknownFunction("colorClamp".into()))
        );

        let expr = parse("colorClamp(t * 2)").expect("expression should parse");
        let code = Compiler::for_color(&ctx)
            .compile(&expr)
            .expect("colour compiler should accept colorClamp");
        assert_eq!(VM::execute(&code, 0.25, &[], &mut Vec::new()).ok(), Some(0.5));
        assert_eq!(VM::execute(&code, 3.0, &[], &mut Vec::new()).ok(), Some(1.0));
        assert_eq!(VM::execute(&code, -1.0, &[], &mut Vec::new()).ok(), Some(0.0));
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }

    #[test]
    fn unknown_names_are_rejected_at_compile_time() {
        let ctx = MathContext::default();
        assert_eq!(
            compile_curve("window", "t", &ctx).err(),
            Some(CompileError::UnknownIdentifier("window".into()))
        );
        assert_eq!(
            compile_curve("t", "eval(t)", &ctx).err(),
            Some(CompileError::UnknownFunction("eval".into()))
        );
    }

    #[test]
    fn malformed_source_is_rejected() {
        assert!(matches!(
            parse("t; x"),
            Err(CompileError::UnexpectedCharacter { ch: ';', pos: 1 })
        ));
        assert_eq!(parse("sin(t"), Err(CompileError::ExpectedClosingParen));
        assert_eq!(parse("1 +"), Err(CompileError::UnexpectedEnd));
        assert_eq!(parse("1.2.3"), Err(CompileError::InvalidNumber("1.2.3".into())));
        assert!(matches!(parse("t t"), Err(CompileError::TrailingInput(_))));
    }

    #[test]
    fn curve_reads_constants_from_the_evaluation_context() {
        let ctx = MathContext::default().with_constant("radius", 2.0);
        let curve = compile_curve("radius * cos(Tau * t)", "radius * sin(Tau * t)", &ctx)
            .expect("curve should compile");
        assert_eq!(curve.constants(), &["radius".to_string(), "Tau".to_string()]);

        let start = curve.evaluate(0.0, &ctx).expect("curve should evaluate");
        assert!((start.x - 2.0).abs() < 1e-12 && start.y.abs() < 1e-12);

        let bigger = ctx.clone().with_constant("radius", 5.0);
        let start = curve.evaluate(0.0, &bigger).expect("curve should evaluate");
        assert!((start.x - 5.0).abs() < 1e-12);

        let err = curve
            .evaluate(0.0, &MathContext::empty())
            .expect_err("missing constants should fail");
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn validate_rejects_non_finite_origin() {
        let ctx = MathContext::default();
        let curve = compile_curve("1 / t", "0", &ctx).expect("curve should compile");
        assert!(curve.validate(&ctx).is_err());

        let curve = compile_curve("t", "t ^ 2", &ctx).expect("curve should compile");
        assert!(curve.validate(&ctx).is_ok());
    }
}
