//! Built-in example curves written in the expression language.

use crate::color::{compile_color, ColorFunction, ColorSource};
use crate::equation_engine::{compile_curve, CompileError, ExpressionCurve, MathContext};

/// Channel sources of a preset's colour. Every preset is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetColor {
    pub r: &'static str,
    pub g: &'static str,
    pub b: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub x: &'static str,
    pub y: &'static str,
    pub color: PresetColor,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "original",
        x: "sin(t * 2 * PI) * 2",
        y: "cos(t * 2 * PI) * 3",
        color: PresetColor {
            r: "colorClamp(sin(t))",
            g: "colorClamp(sin(t + Tau / 3))",
            b: "colorClamp(sin(t + Tau / 3 * 2))",
        },
    },
    Preset {
        name: "spiral",
        x: "cos(t * 8 * PI) * t",
        y: "sin(t * 8 * PI) * t",
        color: PresetColor {
            r: "t",
            g: "1 - t",
            b: "sin(t * PI) * 0.5 + 0.5",
        },
    },
    Preset {
        name: "lissajous",
        x: "sin(t * 3 * PI)",
        y: "sin(t * 2 * PI)",
        color: PresetColor {
            r: "(sin(t * 4 * PI) + 1) * 0.5",
            g: "(cos(t * 6 * PI) + 1) * 0.5",
            b: "(sin(t * 8 * PI + PI / 2) + 1) * 0.5",
        },
    },
    Preset {
        name: "rose",
        x: "sin(5 * Tau * t) * cos(Tau * t)",
        y: "sin(5 * Tau * t) * sin(Tau * t)",
        color: PresetColor {
            r: "(sin(t * 6) + 1) * 0.5",
            g: "(sin(t * 6 + 2) + 1) * 0.5",
            b: "(sin(t * 6 + 4) + 1) * 0.5",
        },
    },
];

pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.name == name)
}

impl PresetColor {
    pub fn source(&self) -> ColorSource {
        ColorSource {
            r: self.r.to_string(),
            g: self.g.to_string(),
            b: self.b.to_string(),
            a: None,
        }
    }
}

impl Preset {
    pub fn compile(&self, context: &MathContext) -> Result<ExpressionCurve, CompileError> {
        compile_curve(self.x, self.y, context)
    }

    pub fn compile_color(&self, context: &MathContext) -> Result<ColorFunction, CompileError> {
        compile_color(&self.color.source(), context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_compiles_against_the_default_context() {
        let ctx = MathContext::default();
        for preset in PRESETS {
            let curve = preset
                .compile(&ctx)
                .unwrap_or_else(|e| panic!("preset {} failed to compile: {e}", preset.name));
            curve
                .validate(&ctx)
                .unwrap_or_else(|e| panic!("preset {} failed to validate: {e}", preset.name));
        }
    }

    #[test]
    fn every_preset_colour_stays_in_range() {
        let ctx = MathContext::default();
        for preset in PRESETS {
            let color = preset
                .compile_color(&ctx)
                .unwrap_or_else(|e| panic!("preset {} colour failed to compile: {e}", preset.name));
            for i in 0..=20 {
                let rgba = color
                    .evaluate(i as f64 / 20.0, &ctx)
                    .unwrap_or_else(|e| panic!("preset {} colour failed: {e}", preset.name));
                for channel in [rgba.r, rgba.g, rgba.b] {
                    assert!((0.0..=1.0).contains(&channel), "preset {}", preset.name);
                }
                assert_eq!(rgba.a, 1.0);
            }
        }
    }

    #[test]
    fn preset_colours_at_the_start() {
        let ctx = MathContext::default();
        let spiral = find("spiral").expect("spiral preset");
        let start = spiral
            .compile_color(&ctx)
            .expect("spiral colour should compile")
            .evaluate(0.0, &ctx)
            .expect("spiral colour should evaluate");
        assert_eq!((start.r, start.g, start.b), (0.0, 1.0, 0.5));

        let original = find("original").expect("original preset");
        let start = original
            .compile_color(&ctx)
            .expect("original colour should compile")
            .evaluate(0.0, &ctx)
            .expect("original colour should evaluate");
        assert_eq!(start.r, 0.0);
        assert!((start.g - (std::f64::consts::TAU / 3.0).sin()).abs() < 1e-12);
        // sin(2 Tau / 3) is negative, so colorClamp pins it to zero.
        assert_eq!(start.b, 0.0);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(find("rose").map(|p| p.name), Some("rose"));
        assert!(find("missing").is_none());
    }
}
