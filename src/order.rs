//! Python operator precedence used when nesting generated expressions.
//!
//! Values follow the host editor's Python order table, scaled by ten so the
//! fractional member/call ranks stay integral. A lower rank binds tighter.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Order(u16);

impl Order {
    pub const ATOMIC: Order = Order(0);
    pub const COLLECTION: Order = Order(10);
    pub const STRING_CONVERSION: Order = Order(10);
    pub const MEMBER: Order = Order(21);
    pub const FUNCTION_CALL: Order = Order(22);
    pub const EXPONENTIATION: Order = Order(30);
    pub const UNARY_SIGN: Order = Order(40);
    pub const BITWISE_NOT: Order = Order(40);
    pub const MULTIPLICATIVE: Order = Order(50);
    pub const ADDITIVE: Order = Order(60);
    pub const BITWISE_SHIFT: Order = Order(70);
    pub const BITWISE_AND: Order = Order(80);
    pub const BITWISE_XOR: Order = Order(90);
    pub const BITWISE_OR: Order = Order(100);
    pub const RELATIONAL: Order = Order(110);
    pub const LOGICAL_NOT: Order = Order(120);
    pub const LOGICAL_AND: Order = Order(130);
    pub const LOGICAL_OR: Order = Order(140);
    pub const CONDITIONAL: Order = Order(150);
    pub const LAMBDA: Order = Order(160);
    pub const NONE: Order = Order(990);

    pub fn rank(self) -> u16 {
        self.0
    }

    /// Whether an expression of order `self` must be parenthesized when the
    /// surrounding context requires `required`.
    ///
    /// A child that binds strictly tighter than the context is left bare. An
    /// equal or looser child is wrapped, except for the atomic/atomic and
    /// none/none pairs which never need grouping.
    pub fn needs_parens(self, required: Order) -> bool {
        if self < required {
            return false;
        }
        !(self == required && (self == Order::ATOMIC || self == Order::NONE))
    }
}

pub fn wrap(code: String, order: Order, required: Order) -> String {
    if order.needs_parens(required) {
        format!("({})", code)
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Order; 21] = [
        Order::ATOMIC,
        Order::COLLECTION,
        Order::STRING_CONVERSION,
        Order::MEMBER,
        Order::FUNCTION_CALL,
        Order::EXPONENTIATION,
        Order::UNARY_SIGN,
        Order::BITWISE_NOT,
        Order::MULTIPLICATIVE,
        Order::ADDITIVE,
        Order::BITWISE_SHIFT,
        Order::BITWISE_AND,
        Order::BITWISE_XOR,
        Order::BITWISE_OR,
        Order::RELATIONAL,
        Order::LOGICAL_NOT,
        Order::LOGICAL_AND,
        Order::LOGICAL_OR,
        Order::CONDITIONAL,
        Order::LAMBDA,
        Order::NONE,
    ];

    #[test]
    fn tighter_child_is_never_wrapped() {
        for child in ALL {
            for context in ALL {
                if child < context {
                    assert!(
                        !child.needs_parens(context),
                        "{:?} inside {:?} was wrapped",
                        child,
                        context
                    );
                }
            }
        }
    }

    #[test]
    fn equal_or_looser_child_is_wrapped() {
        for child in ALL {
            for context in ALL {
                let exempt = child == context && (child == Order::ATOMIC || child == Order::NONE);
                if child >= context && !exempt {
                    assert!(child.needs_parens(context), "{:?} inside {:?}", child, context);
                }
            }
        }
    }

    #[test]
    fn wrap_adds_parentheses_only_when_needed() {
        assert_eq!(wrap("a + b".into(), Order::ADDITIVE, Order::MULTIPLICATIVE), "(a + b)");
        assert_eq!(wrap("a * b".into(), Order::MULTIPLICATIVE, Order::ADDITIVE), "a * b");
        assert_eq!(wrap("x".into(), Order::ATOMIC, Order::ATOMIC), "x");
        assert_eq!(wrap("a < b".into(), Order::RELATIONAL, Order::NONE), "a < b");
    }
}
