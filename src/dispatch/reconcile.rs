//! Alignment of handler output to the caller's expected row count.

use crate::event::Value;

/// How the handler's output length compared to the expected count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Exact,
    /// Output was short; trailing slots were filled with null.
    Padded { missing: usize },
    /// Output was long; trailing values were dropped.
    Truncated { extra: usize },
}

impl Shape {
    pub fn of(produced: usize, expected: usize) -> Self {
        if produced < expected {
            Shape::Padded {
                missing: expected - produced,
            }
        } else if produced > expected {
            Shape::Truncated {
                extra: produced - expected,
            }
        } else {
            Shape::Exact
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Exact => "exact",
            Shape::Padded { .. } => "padded",
            Shape::Truncated { .. } => "truncated",
        }
    }
}

/// Pad with nulls or truncate so that exactly `expected` values remain.
/// The first `min(len, expected)` values keep their order.
pub fn reconcile(mut results: Vec<Value>, expected: usize) -> (Vec<Value>, Shape) {
    let shape = Shape::of(results.len(), expected);
    results.resize(expected, Value::Null);
    (results, shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_lengths() {
        for produced in 0..6usize {
            for expected in 0..6usize {
                let input: Vec<Value> = (0..produced).map(|i| Value::from(i as i64)).collect();
                let (output, shape) = reconcile(input, expected);
                assert_eq!(output.len(), expected);
                for (i, value) in output.iter().enumerate() {
                    if i < produced {
                        assert_eq!(*value, Value::from(i as i64));
                    } else {
                        assert!(value.is_null());
                    }
                }
                assert_eq!(shape, Shape::of(produced, expected));
            }
        }
    }

    #[test]
    fn test_shape() {
        assert_eq!(Shape::of(3, 3), Shape::Exact);
        assert_eq!(Shape::of(1, 3), Shape::Padded { missing: 2 });
        assert_eq!(Shape::of(4, 3), Shape::Truncated { extra: 1 });
        assert_eq!(Shape::of(4, 3).as_str(), "truncated");
    }
}
