//! Core text-model primitives
//!
//! - Chars: XML 1.0 `Char` validation for terminals, qualified-name checks

pub mod chars;
