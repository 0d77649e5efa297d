//! # Type Definitions
//!
//! This module defines the set of basic data types the semantic analyzer
//! infers for Lyn expressions, and implements compatibility checks used
//! when assigning to an already-declared name or combining two operands.

/// Represents the fundamental data types in Lyn.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// A whole number type, inferred when a numeric literal equals its own
    /// integer truncation.
    Integer,
    /// A floating-point number type.
    Float,
    /// A sequence of characters.
    String,
    /// A user-defined class name (classes carry no further structure here;
    /// method dispatch is a documented emitter stub).
    Class(String),
    /// A type that is currently unknown (e.g. an undeclared identifier
    /// referenced before its implicit declaration is seen).
    Unknown,
}

impl Type {
    /// Checks if this type is compatible with another type for operations or
    /// assignments.
    ///
    /// `Unknown` widens to anything. Beyond that, types must match exactly
    /// (Lyn does not implicitly convert `Integer` and `Float`, unlike the
    /// reference implementation's predecessor; the analyzer infers the wider
    /// of the two ahead of time instead, per §4.6).
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unknown, _) | (_, Self::Unknown) => true,
            (a, b) => a == b,
        }
    }
}
