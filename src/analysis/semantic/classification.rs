//! Decoding of backend classification codes into semantic token types.
//!
//! A classification code is interpreted per span under one of two schemes:
//!
//! - **Enriched**: `code > 0xFF`. The code packs `(token_type + 1) << 8 |
//!   modifiers`, with the modifier bitmask in the low 8 bits.
//! - **Fallback**: `code <= 0xFF`. The code is a base [`ClassificationType`];
//!   a handful of those map to a token type without modifiers and the rest
//!   carry no semantic token at all.
//!
//! The scheme is decided for every span on its own, so one response may mix
//! both.

use super::legend::{TOKEN_TYPE_COUNT, token_type};

/// Largest base classification value. Codes above it use the enriched scheme.
pub const ENRICHED_CODE_THRESHOLD: u32 = 0xFF;

/// Shift of the token type field in an enriched code.
pub const TOKEN_TYPE_SHIFT: u32 = 8;

/// Mask of the modifier bitmask in an enriched code (8 bits).
pub const TOKEN_MODIFIER_MASK: u32 = 0xFF;

/// Base classification identifiers of the fallback scheme.
///
/// The domain is `1..=25`; zero and anything above 25 are not base
/// classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ClassificationType {
    Comment = 1,
    Identifier = 2,
    Keyword = 3,
    NumericLiteral = 4,
    Operator = 5,
    StringLiteral = 6,
    RegularExpressionLiteral = 7,
    WhiteSpace = 8,
    Text = 9,
    Punctuation = 10,
    ClassName = 11,
    EnumName = 12,
    InterfaceName = 13,
    ModuleName = 14,
    TypeParameterName = 15,
    TypeAliasName = 16,
    ParameterName = 17,
    DocCommentTagName = 18,
    JsxOpenTagName = 19,
    JsxCloseTagName = 20,
    JsxSelfClosingTagName = 21,
    JsxAttribute = 22,
    JsxText = 23,
    JsxAttributeStringLiteralValue = 24,
    BigIntLiteral = 25,
}

impl ClassificationType {
    /// Look up a base classification by its numeric identifier.
    pub fn from_code(code: u32) -> Option<Self> {
        use ClassificationType::*;
        let classification = match code {
            1 => Comment,
            2 => Identifier,
            3 => Keyword,
            4 => NumericLiteral,
            5 => Operator,
            6 => StringLiteral,
            7 => RegularExpressionLiteral,
            8 => WhiteSpace,
            9 => Text,
            10 => Punctuation,
            11 => ClassName,
            12 => EnumName,
            13 => InterfaceName,
            14 => ModuleName,
            15 => TypeParameterName,
            16 => TypeAliasName,
            17 => ParameterName,
            18 => DocCommentTagName,
            19 => JsxOpenTagName,
            20 => JsxCloseTagName,
            21 => JsxSelfClosingTagName,
            22 => JsxAttribute,
            23 => JsxText,
            24 => JsxAttributeStringLiteralValue,
            25 => BigIntLiteral,
            _ => return None,
        };
        Some(classification)
    }

    /// Token type for this classification in the fallback scheme.
    ///
    /// Only names of declarations carry semantic meaning; keywords, literals,
    /// comments, punctuation and the rest return `None`.
    pub fn token_type(self) -> Option<u32> {
        match self {
            ClassificationType::ClassName => Some(token_type::CLASS),
            ClassificationType::EnumName => Some(token_type::ENUM),
            ClassificationType::InterfaceName => Some(token_type::INTERFACE),
            ClassificationType::ModuleName => Some(token_type::NAMESPACE),
            ClassificationType::TypeParameterName => Some(token_type::TYPE_PARAMETER),
            ClassificationType::TypeAliasName => Some(token_type::TYPE),
            ClassificationType::ParameterName => Some(token_type::PARAMETER),
            _ => None,
        }
    }
}

/// Which encoding a classification code uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationScheme {
    Enriched,
    Fallback,
}

impl ClassificationScheme {
    pub fn of(code: u32) -> Self {
        if code > ENRICHED_CODE_THRESHOLD {
            ClassificationScheme::Enriched
        } else {
            ClassificationScheme::Fallback
        }
    }
}

/// A span whose classification has been resolved to a token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub offset: u32,
    pub length: u32,
    pub token_type: u32,
    pub token_modifiers: u32,
}

/// Resolve one classification code to `(token_type, token_modifiers)`.
///
/// Returns `None` when the span carries no semantic token: a fallback code
/// outside the mapped subset, or an enriched code whose type has no legend
/// entry.
pub fn decode_classification(code: u32) -> Option<(u32, u32)> {
    match ClassificationScheme::of(code) {
        ClassificationScheme::Enriched => {
            let token_type = (code >> TOKEN_TYPE_SHIFT) - 1;
            if token_type as usize >= TOKEN_TYPE_COUNT {
                return None;
            }
            Some((token_type, code & TOKEN_MODIFIER_MASK))
        }
        ClassificationScheme::Fallback => ClassificationType::from_code(code)
            .and_then(ClassificationType::token_type)
            .map(|token_type| (token_type, 0)),
    }
}

/// Decode a flat `offset, length, code` triplet array.
///
/// Yields at most one span per triplet, in input order. A trailing partial
/// triplet is ignored.
pub fn decode_spans(spans: &[u32]) -> impl Iterator<Item = ResolvedSpan> + '_ {
    spans.chunks_exact(3).filter_map(|triplet| {
        let (offset, length, code) = (triplet[0], triplet[1], triplet[2]);
        let Some((token_type, token_modifiers)) = decode_classification(code) else {
            log::trace!(
                target: "tsclassify::semantic",
                "No semantic token for classification {} at {}+{}",
                code,
                offset,
                length
            );
            return None;
        };
        Some(ResolvedSpan {
            offset,
            length,
            token_type,
            token_modifiers,
        })
    })
}
