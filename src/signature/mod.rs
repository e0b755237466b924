//! Signature codec
//!
//! A signature is a compact string naming a symbol, either directly or
//! through something the index has to look up first:
//!
//! ```text
//! #M#C\App\Registry.get?app.mailer        direct: base + delimiter + literal
//! #M#C\App\Registry.get?#K#C\App\Ids.MAIL deferred: base + delimiter + reference signature
//! #K#C\App\Mailer.class                   class constant, resolvable without the index
//! #M#C\A.get?x|#M#C\B.get?y               union, each branch resolved on its own
//! ```
//!
//! Only call sites with exactly the expected number of arguments, whose first
//! argument is a non-empty string literal, a class constant or a field
//! reference, are encoded. Everything else is "no inference here".

pub mod deferred;
pub mod lookup;

pub use deferred::{resolve_literal, try_resolve_literal};
pub use lookup::{lookup_type_signature, merge_signature_results};

use crate::error::{Resolution, ResolveMiss};
use crate::symbol::normalize_fqn;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Joins alternatives inside a union signature
pub const UNION_DELIMITER: char = '|';

/// Separator between a call's base signature and its encoded argument
pub const DEFAULT_DELIMITER: char = '?';

pub const DEFAULT_ARGUMENT_COUNT: usize = 1;

/// Marker that prefixes every signature the index has to resolve
pub const DEFERRED_MARKER: char = '#';

/// Argument expression shapes as reported by the source parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Argument {
    /// String literal, contents without quotes
    StringLiteral { contents: String },
    /// `Foo::BAR` or `Foo::class`, with the reference's own index signature
    ClassConstant { signature: String },
    /// `$this->name`, with the reference's own index signature
    FieldReference { signature: String },
    /// Anything else (arithmetic, calls, variables, ...)
    Other { description: String },
}

/// A method call whose argument may key the returned type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Signature of the called method, if the platform could compute one
    pub signature: Option<String>,
    pub arguments: Vec<Argument>,
}

impl Argument {
    pub fn string(contents: impl Into<String>) -> Self {
        Self::StringLiteral {
            contents: contents.into(),
        }
    }

    pub fn class_constant(signature: impl Into<String>) -> Self {
        Self::ClassConstant {
            signature: signature.into(),
        }
    }

    pub fn field(signature: impl Into<String>) -> Self {
        Self::FieldReference {
            signature: signature.into(),
        }
    }

    pub fn other(description: impl Into<String>) -> Self {
        Self::Other {
            description: description.into(),
        }
    }
}

impl CallSite {
    pub fn new(signature: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            signature: Some(signature.into()),
            arguments,
        }
    }
}

/// Encode a single-argument call site
pub fn encode(call: &CallSite, delimiter: char) -> Option<String> {
    encode_with(call, delimiter, DEFAULT_ARGUMENT_COUNT)
}

/// Encode a call site expected to carry exactly `expected_arguments` arguments
pub fn encode_with(call: &CallSite, delimiter: char, expected_arguments: usize) -> Option<String> {
    try_encode(call, delimiter, expected_arguments).ok()
}

pub fn try_encode(
    call: &CallSite,
    delimiter: char,
    expected_arguments: usize,
) -> Resolution<String> {
    let base = call
        .signature
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ResolveMiss::Unencodable)?;

    if call.arguments.len() != expected_arguments {
        trace!(
            "not encoding {base}: {} arguments, expected {expected_arguments}",
            call.arguments.len()
        );
        return Err(ResolveMiss::Unencodable);
    }

    let payload = match call.arguments.first() {
        Some(Argument::StringLiteral { contents }) => contents.as_str(),
        // Restricted to constants and fields; evaluating arbitrary expressions
        // is not worth the cost on the typing path.
        Some(Argument::ClassConstant { signature })
        | Some(Argument::FieldReference { signature }) => signature.as_str(),
        Some(Argument::Other { description }) => {
            trace!("not encoding {base}: unsupported argument {description}");
            return Err(ResolveMiss::Unencodable);
        }
        None => return Err(ResolveMiss::Unencodable),
    };

    if payload.is_empty() {
        return Err(ResolveMiss::Unencodable);
    }

    Ok(format!("{base}{delimiter}{payload}"))
}

/// Split a union signature into its alternatives.
///
/// Empty segments are kept: `"a|"` yields `["a", ""]`.
pub fn decode_union(signature: &str) -> Vec<&str> {
    signature.split(UNION_DELIMITER).collect()
}

/// Kind markers of base signatures that end in a `.member` segment
const MEMBER_PREFIXES: [&str; 3] = ["#M#C", "#P#C", "#K#C"];

/// Split an encoded signature into `(base, parameter)`.
///
/// Class paths never contain `.` and member names are identifiers, so the
/// delimiter is the first one after the member separator of the base. This
/// keeps `.` usable as a delimiter: `#M#C\A.get.app.mailer` splits into
/// `#M#C\A.get` and `app.mailer`.
pub fn split_encoded(signature: &str, delimiter: char) -> Option<(&str, &str)> {
    let member = MEMBER_PREFIXES.iter().any(|p| signature.starts_with(p));
    let from = if member && delimiter == '.' {
        signature.find('.')? + 1
    } else {
        0
    };
    let at = from + signature[from..].find(delimiter)?;
    Some((&signature[..at], &signature[at + delimiter.len_utf8()..]))
}

/// Whether `delimiter` can separate a base signature from its argument.
///
/// Rejects characters that occur inside base signatures (`\`, `#`, the union
/// `|`) and identifier characters, which member names are made of.
pub fn is_valid_delimiter(delimiter: char) -> bool {
    !(delimiter == '\\'
        || delimiter == DEFERRED_MARKER
        || delimiter == UNION_DELIMITER
        || delimiter == '_'
        || delimiter.is_alphanumeric()
        || delimiter.is_whitespace())
}

pub fn is_deferred(signature: &str) -> bool {
    signature.starts_with(DEFERRED_MARKER)
}

pub fn class_signature(fqn: &str) -> String {
    format!("#C\\{}", normalize_fqn(fqn))
}

pub fn method_signature(class: &str, method: &str) -> String {
    format!("#M#C\\{}.{method}", normalize_fqn(class))
}

pub fn field_signature(class: &str, field: &str) -> String {
    format!("#P#C\\{}.{}", normalize_fqn(class), field.trim_start_matches('$'))
}

pub fn constant_signature(class: &str, constant: &str) -> String {
    format!("#K#C\\{}.{constant}", normalize_fqn(class))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET: &str = "#M#C\\App\\Registry.get";

    #[test]
    fn test_encode_string_literal() {
        let call = CallSite::new(GET, vec![Argument::string("app.mailer")]);
        assert_eq!(
            encode(&call, '?').as_deref(),
            Some("#M#C\\App\\Registry.get?app.mailer")
        );
    }

    #[test]
    fn test_encode_literal_round_trip() {
        for literal in ["app.mailer", "doctrine.orm.entity_manager", "a b", "x|y"] {
            let call = CallSite::new(GET, vec![Argument::string(literal)]);
            let encoded = encode(&call, DEFAULT_DELIMITER).unwrap();
            let (base, parameter) = split_encoded(&encoded, DEFAULT_DELIMITER).unwrap();
            assert_eq!(base, GET);
            assert_eq!(parameter, literal);
        }
    }

    #[test]
    fn test_dot_delimiter_keeps_member_in_base() {
        let call = CallSite::new(GET, vec![Argument::string("app.mailer")]);
        let encoded = encode(&call, '.').unwrap();
        assert_eq!(encoded, "#M#C\\App\\Registry.get.app.mailer");
        assert_eq!(split_encoded(&encoded, '.'), Some((GET, "app.mailer")));

        let deferred = "#M#C\\App\\Registry.get.#K#C\\App\\Ids.MAILER";
        assert_eq!(
            split_encoded(deferred, '.'),
            Some((GET, "#K#C\\App\\Ids.MAILER"))
        );

        // Member base without any argument
        assert_eq!(split_encoded(GET, '.'), None);
        // Function bases carry no member segment
        assert_eq!(split_encoded("#F\\locate.app.mailer", '.'), Some(("#F\\locate", "app.mailer")));
    }

    #[test]
    fn test_delimiter_validity() {
        for delimiter in ['?', '.', ':', '~'] {
            assert!(is_valid_delimiter(delimiter), "{delimiter:?}");
        }
        for delimiter in ['\\', '#', '|', 'a', '_', '7', ' '] {
            assert!(!is_valid_delimiter(delimiter), "{delimiter:?}");
        }
    }

    #[test]
    fn test_encode_references() {
        let constant = CallSite::new(GET, vec![Argument::class_constant("#K#C\\App\\Ids.MAILER")]);
        assert_eq!(
            encode(&constant, '?').as_deref(),
            Some("#M#C\\App\\Registry.get?#K#C\\App\\Ids.MAILER")
        );

        let field = CallSite::new(GET, vec![Argument::field("#P#C\\App\\Foo.serviceId")]);
        assert_eq!(
            encode(&field, '.').as_deref(),
            Some("#M#C\\App\\Registry.get.#P#C\\App\\Foo.serviceId")
        );
    }

    #[test]
    fn test_encode_rejects_argument_count_mismatch() {
        let call = CallSite::new(
            GET,
            vec![Argument::string("app.mailer"), Argument::string("extra")],
        );
        assert_eq!(encode(&call, '?'), None);
        assert_eq!(
            try_encode(&call, '?', 1),
            Err(ResolveMiss::Unencodable)
        );

        // The same call is fine when two arguments are expected
        assert_eq!(
            encode_with(&call, '?', 2).as_deref(),
            Some("#M#C\\App\\Registry.get?app.mailer")
        );

        let empty = CallSite::new(GET, vec![]);
        assert_eq!(encode_with(&empty, '?', 0), None);
    }

    #[test]
    fn test_encode_rejects_unsupported_shapes() {
        let arithmetic = CallSite::new(GET, vec![Argument::other("binary_expression")]);
        assert_eq!(encode(&arithmetic, '?'), None);

        let empty_literal = CallSite::new(GET, vec![Argument::string("")]);
        assert_eq!(encode(&empty_literal, '?'), None);

        let empty_reference = CallSite::new(GET, vec![Argument::field("")]);
        assert_eq!(encode(&empty_reference, '?'), None);
    }

    #[test]
    fn test_encode_requires_base_signature() {
        let missing = CallSite {
            signature: None,
            arguments: vec![Argument::string("app.mailer")],
        };
        assert_eq!(encode(&missing, '?'), None);

        let blank = CallSite::new("", vec![Argument::string("app.mailer")]);
        assert_eq!(encode(&blank, '?'), None);
    }

    #[test]
    fn test_decode_union() {
        assert_eq!(decode_union("#C\\Foo"), vec!["#C\\Foo"]);
        assert_eq!(decode_union("a|b"), vec!["a", "b"]);
        assert_eq!(decode_union("a|"), vec!["a", ""]);
        assert_eq!(decode_union("|a"), vec!["", "a"]);
        assert_eq!(decode_union("a||b"), vec!["a", "", "b"]);
        assert_eq!(decode_union(""), vec![""]);
    }

    #[test]
    fn test_element_signatures() {
        assert_eq!(class_signature("\\App\\Foo"), "#C\\App\\Foo");
        assert_eq!(method_signature("App\\Foo", "bar"), "#M#C\\App\\Foo.bar");
        assert_eq!(field_signature("App\\Foo", "$id"), "#P#C\\App\\Foo.id");
        assert_eq!(constant_signature("App\\Foo", "ID"), "#K#C\\App\\Foo.ID");
        assert!(is_deferred("#K#C\\App\\Foo.ID"));
        assert!(!is_deferred("app.mailer"));
    }
}
