//! Purpose: Bind a buffered JSON body into a typed destination.
//! Exports: `bind_slice`, `bind_prefix`.
//! Role: JSON layer that turns parser errors into structured `RawFailure` values.
//! Invariants: Field names come from tracked deserializer paths, never from error text.
//! Invariants: Exactly one JSON value per body; trailing non-whitespace is a syntax failure.
//! Notes: Offsets are byte offsets derived from the parser's line/column.
//! Notes: Field paths use one format for both failures: `lines[1].qty`; the root is `""`.
//! Notes: Unlike a single streaming `Decode` call in Go's `encoding/json`, a complete
//! value followed by more non-whitespace is rejected rather than silently accepted.
//! Bytes past the size limit are never read, so they cannot be checked.

use crate::core::classify::RawFailure;
use crate::core::limit::BodyTooLarge;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use std::io;

pub fn bind_slice<T: DeserializeOwned>(input: &[u8], strict: bool) -> Result<T, RawFailure> {
    bind_tracked(input, strict).map_err(|(raw, _)| raw)
}

/// Binds the prefix a size guard let through before it cut the stream.
///
/// Failures the prefix already proves (bad syntax, a value of the wrong type, an
/// unknown field in strict mode) are reported as they would be for the full body.
/// Running out of prefix is reported as the guard's `cut` signal.
pub fn bind_prefix<T: DeserializeOwned>(
    prefix: &[u8],
    strict: bool,
    cut: BodyTooLarge,
) -> Result<T, RawFailure> {
    match bind_tracked(prefix, strict) {
        Ok(value) => Ok(value),
        Err((RawFailure::Eof { .. }, Some(field))) => Err(RawFailure::UnknownField { field }),
        Err((RawFailure::Eof { .. }, None)) => Err(RawFailure::Read(cut.into())),
        Err((raw, _)) => Err(raw),
    }
}

/// On failure also returns the first unknown field when `strict` is set.
fn bind_tracked<T: DeserializeOwned>(
    input: &[u8],
    strict: bool,
) -> Result<T, (RawFailure, Option<String>)> {
    let mut json = serde_json::Deserializer::from_slice(input);
    let mut unknown: Option<String> = None;
    let mut track_unknown = |path: serde_ignored::Path<'_>| {
        if unknown.is_none() {
            unknown = Some(ignored_path(&path));
        }
    };
    let result = serde_path_to_error::deserialize::<_, T>(serde_ignored::Deserializer::new(
        &mut json,
        &mut track_unknown,
    ));
    let unknown = unknown.filter(|_| strict);

    match result {
        Ok(value) => {
            if let Err(err) = json.end() {
                return Err((raw_from_json(input, err, String::new()), unknown));
            }
            match unknown {
                Some(field) => Err((RawFailure::UnknownField { field: field.clone() }, Some(field))),
                None => Ok(value),
            }
        }
        Err(err) => {
            let field = field_path(err.path());
            let err = err.into_inner();
            // The first problem in the stream wins among semantic failures.
            if err.classify() == Category::Data {
                if let Some(field) = unknown {
                    return Err((RawFailure::UnknownField { field: field.clone() }, Some(field)));
                }
            }
            Err((raw_from_json(input, err, field), unknown))
        }
    }
}

/// Renders a binding path; the root renders as `""` rather than `.`.
fn field_path(path: &serde_path_to_error::Path) -> String {
    if path.iter().next().is_none() {
        String::new()
    } else {
        path.to_string()
    }
}

/// Renders an ignored-field path in the same `a[0].b` form as `field_path`.
fn ignored_path(path: &serde_ignored::Path<'_>) -> String {
    let mut out = String::new();
    push_ignored(path, &mut out);
    out
}

fn push_ignored(path: &serde_ignored::Path<'_>, out: &mut String) {
    match path {
        serde_ignored::Path::Root => {}
        serde_ignored::Path::Seq { parent, index } => {
            push_ignored(parent, out);
            out.push_str(&format!("[{index}]"));
        }
        serde_ignored::Path::Map { parent, key } => {
            push_ignored(parent, out);
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(key);
        }
        serde_ignored::Path::Some { parent }
        | serde_ignored::Path::NewtypeStruct { parent }
        | serde_ignored::Path::NewtypeVariant { parent } => push_ignored(parent, out),
    }
}

fn raw_from_json(input: &[u8], err: serde_json::Error, field: String) -> RawFailure {
    match err.classify() {
        Category::Syntax => RawFailure::Syntax {
            offset: byte_offset(input, err.line(), err.column()),
        },
        Category::Eof => RawFailure::Eof {
            value_started: input.iter().any(|byte| !is_json_whitespace(*byte)),
        },
        Category::Data => RawFailure::Data {
            field,
            offset: byte_offset(input, err.line(), err.column()),
        },
        Category::Io => RawFailure::Read(io::Error::from(err)),
    }
}

fn is_json_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

fn byte_offset(input: &[u8], line: usize, column: usize) -> u64 {
    let line_start = if line <= 1 {
        0
    } else {
        input
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte == b'\n')
            .nth(line - 2)
            .map(|(index, _)| index + 1)
            .unwrap_or(input.len())
    };
    (line_start + column).min(input.len()) as u64
}

#[cfg(test)]
mod tests {
    use super::{bind_prefix, bind_slice, byte_offset};
    use crate::core::classify::RawFailure;
    use crate::core::limit::{BodyTooLarge, size_limit_signal};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
        age: u32,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Order {
        id: u64,
        lines: Vec<Line>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Line {
        sku: String,
        qty: u32,
    }

    #[test]
    fn binds_matching_input() {
        let person: Person = bind_slice(br#"{"name":"Ada","age":36}"#, true).expect("bind");
        assert_eq!(
            person,
            Person {
                name: "Ada".to_string(),
                age: 36
            }
        );
    }

    #[test]
    fn syntax_offset_points_past_the_offending_byte() {
        let err = bind_slice::<Person>(br#"{"a":}"#, false).expect_err("syntax");
        assert!(matches!(err, RawFailure::Syntax { offset: 6 }), "{err:?}");
    }

    #[test]
    fn trailing_garbage_is_a_syntax_failure() {
        let err = bind_slice::<Person>(br#"{"name":"Ada","age":36} x"#, false).expect_err("trailing");
        assert!(matches!(err, RawFailure::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn whitespace_only_input_has_not_started_a_value() {
        let err = bind_slice::<Person>(b" \n\t ", false).expect_err("eof");
        assert!(matches!(
            err,
            RawFailure::Eof {
                value_started: false
            }
        ));
    }

    #[test]
    fn type_mismatch_reports_nested_path() {
        let err = bind_slice::<Order>(
            br#"{"id":1,"lines":[{"sku":"a","qty":1},{"sku":"b","qty":"two"}]}"#,
            false,
        )
        .expect_err("data");
        match err {
            RawFailure::Data { field, offset } => {
                assert_eq!(field, "lines[1].qty");
                assert!(offset > 0);
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn strict_mode_reports_nested_unknown_field_path() {
        let err = bind_slice::<Order>(
            br#"{"id":1,"lines":[{"sku":"a","qty":1,"note":"x"}]}"#,
            true,
        )
        .expect_err("unknown");
        match err {
            RawFailure::UnknownField { field } => assert_eq!(field, "lines[0].note"),
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn earlier_unknown_field_wins_over_later_type_mismatch() {
        let err = bind_slice::<Person>(br#"{"extra":1,"name":"Ada","age":"x"}"#, true)
            .expect_err("unknown");
        assert!(
            matches!(&err, RawFailure::UnknownField { field } if field == "extra"),
            "{err:?}"
        );
    }

    #[test]
    fn dynamic_destinations_never_report_unknown_fields() {
        let map: BTreeMap<String, u32> = bind_slice(br#"{"a":1,"b":2}"#, true).expect("bind");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn offsets_account_for_earlier_lines() {
        let input = b"{\n  \"a\": 1,\n  \"b\": }";
        assert_eq!(byte_offset(input, 1, 1), 1);
        assert_eq!(byte_offset(input, 3, 8), 20);
        assert_eq!(byte_offset(input, 3, 99), input.len() as u64);
    }

    #[test]
    fn missing_root_field_names_no_field() {
        let err = bind_slice::<Person>(br#"{"name":"Ada"}"#, false).expect_err("missing");
        match err {
            RawFailure::Data { field, offset } => {
                assert_eq!(field, "");
                assert_eq!(offset, 14);
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn missing_nested_field_names_the_enclosing_value() {
        let err = bind_slice::<Order>(br#"{"id":1,"lines":[{"sku":"a"}]}"#, false)
            .expect_err("missing");
        assert!(
            matches!(&err, RawFailure::Data { field, .. } if field == "lines[0]"),
            "{err:?}"
        );
    }

    const CUT: BodyTooLarge = BodyTooLarge { limit: 32 };

    #[test]
    fn prefix_syntax_error_beats_the_size_cut() {
        let err = bind_prefix::<Person>(br#"{"name":}                       "#, false, CUT)
            .expect_err("syntax");
        assert!(matches!(err, RawFailure::Syntax { offset: 9 }), "{err:?}");
    }

    #[test]
    fn prefix_ending_mid_value_is_the_size_cut() {
        let err = bind_prefix::<Person>(br#"{"name":"Ada","age":1"#, false, CUT)
            .expect_err("cut");
        match err {
            RawFailure::Read(io) => assert_eq!(size_limit_signal(&io), Some(CUT)),
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn prefix_unknown_field_beats_the_size_cut_in_strict_mode() {
        let err = bind_prefix::<Person>(br#"{"nick":"A","name":"Ada very l"#, true, CUT)
            .expect_err("unknown");
        assert!(
            matches!(&err, RawFailure::UnknownField { field } if field == "nick"),
            "{err:?}"
        );
    }

    #[test]
    fn complete_value_in_prefix_binds() {
        let person: Person =
            bind_prefix(br#"{"name":"Ada","age":1}          "#, true, CUT).expect("bind");
        assert_eq!(person.age, 1);
    }
}
