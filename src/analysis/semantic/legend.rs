//! Semantic token legend.
//!
//! Token type indices and modifier bit positions are part of the wire
//! contract: the enriched classification encoding carries
//! `(token_type + 1) << 8 | modifiers`, so the order of [`TOKEN_TYPES`] and
//! [`TOKEN_MODIFIERS`] must never change.

use tower_lsp_server::ls_types::{SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend};

/// Number of token types the decoder can produce.
pub const TOKEN_TYPE_COUNT: usize = 12;

/// Number of token modifiers; their bitmask always fits in 8 bits.
pub const TOKEN_MODIFIER_COUNT: usize = 4;

/// Token type indices, in legend order.
pub mod token_type {
    pub const CLASS: u32 = 0;
    pub const ENUM: u32 = 1;
    pub const INTERFACE: u32 = 2;
    pub const NAMESPACE: u32 = 3;
    pub const TYPE_PARAMETER: u32 = 4;
    pub const TYPE: u32 = 5;
    pub const PARAMETER: u32 = 6;
    pub const VARIABLE: u32 = 7;
    pub const PROPERTY: u32 = 8;
    pub const CONSTANT: u32 = 9;
    pub const FUNCTION: u32 = 10;
    pub const MEMBER: u32 = 11;
}

/// Token modifier bit positions, in legend order.
pub mod token_modifier {
    pub const DECLARATION: u32 = 0;
    pub const STATIC: u32 = 1;
    pub const ASYNC: u32 = 2;
    pub const READONLY: u32 = 3;
}

/// Semantic token types, indexed by [`token_type`].
pub const TOKEN_TYPES: [SemanticTokenType; TOKEN_TYPE_COUNT] = [
    SemanticTokenType::CLASS,
    SemanticTokenType::ENUM,
    SemanticTokenType::INTERFACE,
    SemanticTokenType::NAMESPACE,
    SemanticTokenType::TYPE_PARAMETER,
    SemanticTokenType::TYPE,
    SemanticTokenType::PARAMETER,
    SemanticTokenType::VARIABLE,
    SemanticTokenType::PROPERTY,
    SemanticTokenType::new("constant"),
    SemanticTokenType::FUNCTION,
    SemanticTokenType::new("member"),
];

/// Semantic token modifiers, indexed by [`token_modifier`] bit position.
pub const TOKEN_MODIFIERS: [SemanticTokenModifier; TOKEN_MODIFIER_COUNT] = [
    SemanticTokenModifier::DECLARATION,
    SemanticTokenModifier::STATIC,
    SemanticTokenModifier::ASYNC,
    SemanticTokenModifier::READONLY,
];

/// Build the legend advertised to the client.
pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TOKEN_TYPES.to_vec(),
        token_modifiers: TOKEN_MODIFIERS.to_vec(),
    }
}

/// Legend name of a token type index.
pub fn token_type_name(token_type: u32) -> Option<&'static str> {
    TOKEN_TYPE_NAMES.get(token_type as usize).copied()
}

/// Legend names of the bits set in `modifiers`, lowest bit first.
pub fn token_modifier_names(modifiers: u32) -> Vec<&'static str> {
    TOKEN_MODIFIER_NAMES
        .iter()
        .enumerate()
        .filter(|(bit, _)| modifiers & (1 << bit) != 0)
        .map(|(_, name)| *name)
        .collect()
}

const TOKEN_TYPE_NAMES: [&str; TOKEN_TYPE_COUNT] = [
    "class",
    "enum",
    "interface",
    "namespace",
    "typeParameter",
    "type",
    "parameter",
    "variable",
    "property",
    "constant",
    "function",
    "member",
];

const TOKEN_MODIFIER_NAMES: [&str; TOKEN_MODIFIER_COUNT] =
    ["declaration", "static", "async", "readonly"];
