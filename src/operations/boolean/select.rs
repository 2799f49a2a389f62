/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Subtract,
    Intersect,
}

impl BooleanOp {
    /// Whether a piece belongs to the result, given its membership in the
    /// first and second operand.
    ///
    /// | in A | in B | Union | Subtract(A-B) | Intersect |
    /// |------|------|-------|---------------|-----------|
    /// | yes  | no   | keep  | keep          | discard   |
    /// | yes  | yes  | keep  | discard       | keep      |
    /// | no   | yes  | keep  | discard       | discard   |
    #[must_use]
    pub fn keeps(self, in_a: bool, in_b: bool) -> bool {
        match self {
            Self::Union => in_a || in_b,
            Self::Subtract => in_a && !in_b,
            Self::Intersect => in_a && in_b,
        }
    }
}
