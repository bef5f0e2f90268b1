//! Engine configuration options.

/// Angle interpretation for trigonometric built-ins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
    Gradians,
}

impl AngleUnit {
    /// Convert an angle in this unit to radians.
    pub fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Radians => angle,
            AngleUnit::Degrees => angle * std::f64::consts::PI / 180.0,
            AngleUnit::Gradians => angle * std::f64::consts::PI / 200.0,
        }
    }

    /// Convert an angle in radians to this unit.
    pub fn from_radians(self, radians: f64) -> f64 {
        match self {
            AngleUnit::Radians => radians,
            AngleUnit::Degrees => radians * 180.0 / std::f64::consts::PI,
            AngleUnit::Gradians => radians * 200.0 / std::f64::consts::PI,
        }
    }
}

/// Tunable limits and modes shared by the lexer, parser, and evaluator.
///
/// The defaults match the documented behavior of the engine; embedders can
/// override individual fields before constructing a session.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Upper bound on identifier length in bytes.
    pub max_identifier_length: usize,

    /// Whether Pass 2 synthesizes `*` tokens between adjacent operands.
    pub implicit_multiplication: bool,

    /// Ceiling on the user-function call stack.
    pub max_recursion_depth: usize,

    /// Ceiling on bracket nesting in the parser.
    pub max_expression_depth: usize,

    /// Promote all rational arithmetic to IEEE-754 doubles.
    pub force_double_arithmetic: bool,

    /// Angle unit consulted by trigonometric built-ins.
    pub angle_unit: AngleUnit,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_identifier_length: 256,
            implicit_multiplication: true,
            max_recursion_depth: 1000,
            max_expression_depth: 1000,
            force_double_arithmetic: false,
            angle_unit: AngleUnit::Radians,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_identifier_length, 256);
        assert!(config.implicit_multiplication);
        assert_eq!(config.max_recursion_depth, 1000);
        assert_eq!(config.max_expression_depth, 1000);
        assert!(!config.force_double_arithmetic);
        assert_eq!(config.angle_unit, AngleUnit::Radians);
    }

    #[test]
    fn test_angle_conversions() {
        let eps = 1e-12;
        assert!((AngleUnit::Degrees.to_radians(180.0) - std::f64::consts::PI).abs() < eps);
        assert!((AngleUnit::Gradians.to_radians(200.0) - std::f64::consts::PI).abs() < eps);
        assert!((AngleUnit::Degrees.from_radians(std::f64::consts::PI) - 180.0).abs() < eps);
        assert_eq!(AngleUnit::Radians.to_radians(1.25), 1.25);
    }
}
