use crate::error::{RenderError, Result};
use crate::operator::{ArithmeticOperator, ConditionType};
use crate::value::ValueKind;
use std::cmp::Ordering;
use std::fmt;

/// Scalar values with fixed promotion and comparison rules.
///
/// Integer arithmetic wraps on overflow. Division or remainder by an
/// integer zero is a type error.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Int(i32),
    Long(i64),
    Double(f64),
    Char(char),
    Boolean(bool),
    String(String),
}

impl Primitive {
    pub fn kind(&self) -> ValueKind {
        match self {
            Primitive::Int(_) => ValueKind::Int,
            Primitive::Long(_) => ValueKind::Long,
            Primitive::Double(_) => ValueKind::Double,
            Primitive::Char(_) => ValueKind::Char,
            Primitive::Boolean(_) => ValueKind::Boolean,
            Primitive::String(_) => ValueKind::String,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Primitive::Int(_) | Primitive::Long(_) | Primitive::Double(_)
        )
    }

    /// Applies `operator` with `self` on the left and `other` on the right.
    pub fn operate(&self, operator: ArithmeticOperator, other: &Primitive) -> Result<Primitive> {
        use Primitive::*;
        match (self, other) {
            (Int(a), Int(b)) => int_operate(operator, *a, *b).map(Int),
            (Int(a), Long(b)) => long_operate(operator, i64::from(*a), *b).map(Long),
            (Long(a), Int(b)) => long_operate(operator, *a, i64::from(*b)).map(Long),
            (Long(a), Long(b)) => long_operate(operator, *a, *b).map(Long),
            (Int(a), Double(b)) => Ok(Double(double_operate(operator, f64::from(*a), *b))),
            (Double(a), Int(b)) => Ok(Double(double_operate(operator, *a, f64::from(*b)))),
            (Long(a), Double(b)) => Ok(Double(double_operate(operator, *a as f64, *b))),
            (Double(a), Long(b)) => Ok(Double(double_operate(operator, *a, *b as f64))),
            (Double(a), Double(b)) => Ok(Double(double_operate(operator, *a, *b))),
            (Char(c), Int(n)) => {
                let code = long_operate(operator, i64::from(u32::from(*c)), i64::from(*n))?;
                u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .map(Char)
                    .ok_or_else(|| {
                        RenderError::type_error(format!("{code} is not a valid character code"))
                    })
            }
            // Code points never exceed `i32::MAX`.
            (Char(a), Char(b)) => int_operate(operator, u32::from(*a) as i32, u32::from(*b) as i32)
                .map(Int),
            (String(_), _) | (_, String(_)) if operator == ArithmeticOperator::Plus => {
                self.concat(other)
            }
            _ => Err(RenderError::type_error(format!(
                "operator `{operator}` is not defined for {} and {}",
                self.kind(),
                other.kind()
            ))),
        }
    }

    fn concat(&self, other: &Primitive) -> Result<Primitive> {
        use Primitive::*;
        let joinable = match (self, other) {
            (String(_), String(_) | Int(_) | Long(_) | Double(_) | Char(_)) => true,
            (Int(_) | Long(_) | Double(_) | Char(_), String(_)) => true,
            _ => false,
        };
        if joinable {
            Ok(String(format!("{self}{other}")))
        } else {
            Err(RenderError::type_error(format!(
                "cannot concatenate {} and {}",
                self.kind(),
                other.kind()
            )))
        }
    }

    /// Evaluates `self <condition> other`.
    pub fn compare(&self, condition: ConditionType, other: &Primitive) -> Result<bool> {
        use Primitive::*;
        let ordering = match (self, other) {
            (Boolean(a), Boolean(b)) => equality_only(condition, a == b, self.kind())?,
            (String(a), String(b)) => equality_only(condition, a == b, self.kind())?,
            (Char(a), Char(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Int(_) | Long(_), Int(_) | Long(_)) => self.as_i64().cmp(&other.as_i64()),
            (a, b) if a.is_numeric() && b.is_numeric() => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Less),
            _ => {
                return Err(RenderError::type_error(format!(
                    "cannot compare {} with {} using `{condition}`",
                    self.kind(),
                    other.kind()
                )))
            }
        };
        Ok(condition.verify(ordering))
    }

    fn as_i64(&self) -> i64 {
        match self {
            Primitive::Int(n) => i64::from(*n),
            Primitive::Long(n) => *n,
            Primitive::Double(d) => *d as i64,
            _ => 0,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Primitive::Int(n) => f64::from(*n),
            Primitive::Long(n) => *n as f64,
            Primitive::Double(d) => *d,
            _ => f64::NAN,
        }
    }
}

/// Booleans and strings only answer `==` and `!=`. Inequality is reported
/// as the sentinel `Less`.
fn equality_only(condition: ConditionType, equal: bool, kind: ValueKind) -> Result<Ordering> {
    if !condition.is_equality() {
        return Err(RenderError::type_error(format!(
            "{kind} values only support `==` and `!=`, not `{condition}`"
        )));
    }
    Ok(if equal { Ordering::Equal } else { Ordering::Less })
}

fn int_operate(operator: ArithmeticOperator, a: i32, b: i32) -> Result<i32> {
    Ok(match operator {
        ArithmeticOperator::Plus => a.wrapping_add(b),
        ArithmeticOperator::Minus => a.wrapping_sub(b),
        ArithmeticOperator::Multiply => a.wrapping_mul(b),
        ArithmeticOperator::Divide => {
            if b == 0 {
                return Err(division_by_zero());
            }
            a.wrapping_div(b)
        }
        ArithmeticOperator::Modulo => {
            if b == 0 {
                return Err(division_by_zero());
            }
            a.wrapping_rem(b)
        }
    })
}

fn long_operate(operator: ArithmeticOperator, a: i64, b: i64) -> Result<i64> {
    Ok(match operator {
        ArithmeticOperator::Plus => a.wrapping_add(b),
        ArithmeticOperator::Minus => a.wrapping_sub(b),
        ArithmeticOperator::Multiply => a.wrapping_mul(b),
        ArithmeticOperator::Divide => {
            if b == 0 {
                return Err(division_by_zero());
            }
            a.wrapping_div(b)
        }
        ArithmeticOperator::Modulo => {
            if b == 0 {
                return Err(division_by_zero());
            }
            a.wrapping_rem(b)
        }
    })
}

fn double_operate(operator: ArithmeticOperator, a: f64, b: f64) -> f64 {
    match operator {
        ArithmeticOperator::Plus => a + b,
        ArithmeticOperator::Minus => a - b,
        ArithmeticOperator::Multiply => a * b,
        ArithmeticOperator::Divide => a / b,
        ArithmeticOperator::Modulo => a % b,
    }
}

fn division_by_zero() -> RenderError {
    RenderError::type_error("division by zero")
}

/// Integral doubles keep a trailing `.0`.
pub(crate) fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        (if value > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Int(n) => write!(f, "{n}"),
            Primitive::Long(n) => write!(f, "{n}"),
            Primitive::Double(d) => f.write_str(&format_double(*d)),
            Primitive::Char(c) => write!(f, "{c}"),
            Primitive::Boolean(b) => write!(f, "{b}"),
            Primitive::String(s) => f.write_str(s),
        }
    }
}
