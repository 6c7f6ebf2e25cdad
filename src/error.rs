//! Error types for Juris.
//!
//! All errors are strongly typed using thiserror. Missing knowledge is
//! deliberately NOT an error: `Unstated`, `Uncertain`, and `Stub` values
//! propagate through computation as first-class knowledge states. Only
//! structural/programming problems raise.

use thiserror::Error;

/// Contract violations: malformed inputs that indicate a programming error
/// in the caller or rule author, not missing data.
#[derive(Debug, Error)]
pub enum ContractError {
    /// A relationship name was empty or all whitespace.
    #[error("Relationship name cannot be empty")]
    EmptyRelationship,

    /// An entity id was empty or all whitespace.
    #[error("Entity id cannot be empty")]
    EmptyEntityId,

    /// A fact key's argument count was outside the supported range.
    #[error("Fact '{relationship}' has arity {arity}, supported range is 1..=3")]
    FactArity {
        /// The offending relationship name.
        relationship: String,
        /// The argument count supplied.
        arity: usize,
    },

    /// A rule was invoked with a different argument count than it declared.
    #[error("Rule '{relationship}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// The rule's relationship name.
        relationship: String,
        /// The declared arity.
        expected: usize,
        /// The arity actually supplied.
        actual: usize,
    },
}

/// Arithmetic domain errors raised by typed operators on temporal values.
///
/// These are local contracts of the numeric operators: a division by zero or
/// an overflow must fail with a typed error rather than propagate a silent
/// default through the timeline.
#[derive(Debug, Error)]
pub enum ArithmeticError {
    /// Division by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Integer arithmetic overflowed.
    #[error("Integer overflow in '{op}'")]
    Overflow {
        /// The operator that overflowed.
        op: &'static str,
    },

    /// Operand types are incompatible with the operator.
    #[error("Type mismatch in '{op}': {left} vs {right}")]
    TypeMismatch {
        /// The operator applied.
        op: &'static str,
        /// Type name of the left operand.
        left: &'static str,
        /// Type name of the right operand.
        right: &'static str,
    },
}

/// Failures of the backward-chaining resolver itself.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A rule transitively invoked itself for the same fact key. Reported
    /// distinctly so callers can present "rule authoring error" rather than
    /// a generic failure.
    #[error("Cyclic rule dependency on fact '{key}'")]
    CyclicDependency {
        /// Display form of the repeated fact key.
        key: String,
    },

    /// The rule-call stack exceeded the session's depth bound.
    #[error("Rule evaluation exceeded maximum depth of {max_depth}")]
    DepthExceeded {
        /// The bound in effect.
        max_depth: usize,
    },
}

/// Top-level error type for Juris.
///
/// This enum encompasses all possible errors that can occur when evaluating
/// goals against a fact store.
#[derive(Debug, Error)]
pub enum JurisError {
    /// Malformed input.
    #[error("Contract violation: {0}")]
    Contract(#[from] ContractError),

    /// Arithmetic domain failure inside an operator.
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// Resolver failure (cycle, depth).
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// An invariant the engine relies on was violated.
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl JurisError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a contract violation.
    #[must_use]
    pub const fn is_contract(&self) -> bool {
        matches!(self, Self::Contract(_))
    }

    /// Returns true if this is an arithmetic domain error.
    #[must_use]
    pub const fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Arithmetic(_))
    }

    /// Returns true if this is a cyclic-dependency or depth failure.
    #[must_use]
    pub const fn is_resolve(&self) -> bool {
        matches!(self, Self::Resolve(_))
    }
}

/// Result type alias for Juris operations.
pub type JurisResult<T> = Result<T, JurisError>;
