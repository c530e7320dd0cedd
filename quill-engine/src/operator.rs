use std::cmp::Ordering;
use std::fmt;

/// Binary arithmetic operators of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOperator {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            '%' => Some(Self::Modulo),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
            Self::Modulo => '%',
        }
    }

    /// Precedence rank. A lower rank binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Plus | Self::Minus => 6,
            Self::Multiply | Self::Divide | Self::Modulo => 4,
        }
    }
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Comparison operators used by conditions and numbered loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionType {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEquals,
    LessOrEquals,
}

impl ConditionType {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterOrEquals => ">=",
            Self::LessOrEquals => "<=",
        }
    }

    /// Longest symbols first so `<=` is not read as `<`.
    pub(crate) const PARSE_ORDER: [ConditionType; 6] = [
        Self::Equals,
        Self::NotEquals,
        Self::GreaterOrEquals,
        Self::LessOrEquals,
        Self::GreaterThan,
        Self::LessThan,
    ];

    /// True for `==` and `!=`, the only comparisons some kinds support.
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Equals | Self::NotEquals)
    }

    pub fn verify(self, ordering: Ordering) -> bool {
        match self {
            Self::Equals => ordering == Ordering::Equal,
            Self::NotEquals => ordering != Ordering::Equal,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::LessThan => ordering == Ordering::Less,
            Self::GreaterOrEquals => ordering != Ordering::Less,
            Self::LessOrEquals => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicative_binds_tighter() {
        assert!(ArithmeticOperator::Multiply.precedence() < ArithmeticOperator::Plus.precedence());
        assert_eq!(
            ArithmeticOperator::Modulo.precedence(),
            ArithmeticOperator::Divide.precedence()
        );
    }

    #[test]
    fn test_verify() {
        assert!(ConditionType::LessOrEquals.verify(Ordering::Equal));
        assert!(!ConditionType::LessThan.verify(Ordering::Equal));
        assert!(ConditionType::NotEquals.verify(Ordering::Less));
    }
}
