//! Per-sample colouring from user-authored channel expressions.

use crate::equation_engine::{
    bind_constants, clamp_unit, parse, Bytecode, CompileError, Compiler, MathContext, VM,
};
use crate::sampling::Sample;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// A colour with every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// Clamps every channel into `[0, 1]`.
    pub fn clamped(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: clamp_unit(r),
            g: clamp_unit(g),
            b: clamp_unit(b),
            a: clamp_unit(a),
        }
    }

    /// 8-bit RGB, truncating like a canvas `rgba()` string expects.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|channel| (channel * 255.0).floor() as u8)
    }
}

/// Channel sources of a colour function. A missing alpha means fully opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSource {
    pub r: String,
    pub g: String,
    pub b: String,
    #[serde(default)]
    pub a: Option<String>,
}

/// Colour as a function of `t`, compiled from four channel expressions.
pub struct ColorFunction {
    r: Bytecode,
    g: Bytecode,
    b: Bytecode,
    a: Option<Bytecode>,
    constants: Vec<String>,
    stack: RefCell<Vec<f64>>,
    constant_values: RefCell<Vec<f64>>,
}

/// Compiles a [`ColorSource`]. Channel expressions may also call `colorClamp`.
pub fn compile_color(
    source: &ColorSource,
    context: &MathContext,
) -> Result<ColorFunction, CompileError> {
    let mut compiler = Compiler::for_color(context);
    let r = compiler.compile(&parse(&source.r)?)?;
    let g = compiler.compile(&parse(&source.g)?)?;
    let b = compiler.compile(&parse(&source.b)?)?;
    let a = match &source.a {
        Some(a) => Some(compiler.compile(&parse(a)?)?),
        None => None,
    };

    Ok(ColorFunction {
        r,
        g,
        b,
        a,
        constants: compiler.into_constants(),
        stack: RefCell::new(Vec::with_capacity(32)),
        constant_values: RefCell::new(Vec::new()),
    })
}

impl ColorFunction {
    /// Evaluates every channel at `t`, clamping the result.
    pub fn evaluate(&self, t: f64, ctx: &MathContext) -> anyhow::Result<Rgba> {
        let mut values = self.constant_values.borrow_mut();
        bind_constants(&self.constants, ctx, &mut values)?;

        let mut stack = self.stack.borrow_mut();
        let r = VM::execute(&self.r, t, &values, &mut stack)?;
        let g = VM::execute(&self.g, t, &values, &mut stack)?;
        let b = VM::execute(&self.b, t, &values, &mut stack)?;
        let a = match &self.a {
            Some(a) => VM::execute(a, t, &values, &mut stack)?,
            None => 1.0,
        };
        Ok(Rgba::clamped(r, g, b, a))
    }
}

/// Colour of every sample, in order.
pub fn colorize(
    samples: &[Sample],
    color: &ColorFunction,
    ctx: &MathContext,
) -> anyhow::Result<Vec<Rgba>> {
    samples
        .iter()
        .map(|sample| color.evaluate(sample.t, ctx))
        .collect()
}
