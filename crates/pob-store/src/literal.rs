//! Nom parser for the store's native literal encoding.
//!
//! Accepts one value per call: `null`, booleans, integers, reals, literal
//! strings, hex strings, names, arrays, dictionaries and `N G R`
//! references. Whitespace and `%` comments may separate tokens.

use indexmap::IndexMap;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, one_of, satisfy},
    combinator::{all_consuming, map, map_res, not, opt, peek, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use pob_types::{Name, ObjectRef};

use crate::error::{StoreError, StoreResult};
use crate::value::PdfValue;

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Parse exactly one value from `text`.
///
/// Leading and trailing whitespace is allowed; anything else after the value
/// is an error.
pub fn parse_value(text: &str) -> StoreResult<PdfValue> {
    match all_consuming(delimited(ws, pdf_value, ws))(text) {
        Ok((_, value)) => Ok(value),
        Err(e) => Err(to_store_error(text, e)),
    }
}

/// Convert a nom failure into a [`StoreError::Parse`] with a byte offset.
pub(crate) fn to_store_error(text: &str, err: nom::Err<nom::error::Error<&str>>) -> StoreError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => StoreError::Parse {
            offset: text.len() - e.input.len(),
            reason: format!("unexpected input ({:?})", e.code),
        },
        nom::Err::Incomplete(_) => StoreError::Parse {
            offset: text.len(),
            reason: "unexpected end of input".to_string(),
        },
    }
}

// =============================================================================
// LEXICAL HELPERS
// =============================================================================

fn is_pdf_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0c' | '\0')
}

fn is_delimiter(c: char) -> bool {
    "()<>[]{}/%".contains(c)
}

fn is_regular(c: char) -> bool {
    !is_pdf_whitespace(c) && !is_delimiter(c)
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('%'), take_while(|c| c != '\n' && c != '\r')))(input)
}

/// Zero or more whitespace runs and comments.
pub(crate) fn ws(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((take_while1(is_pdf_whitespace), comment))))(input)
}

/// At least one whitespace run or comment.
pub(crate) fn ws1(input: &str) -> IResult<&str, ()> {
    value((), pair(alt((take_while1(is_pdf_whitespace), comment)), ws))(input)
}

/// A keyword that must not run into a following regular character.
pub(crate) fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(word), not(peek(satisfy(is_regular))))
}

pub(crate) fn unsigned<T: std::str::FromStr>(input: &str) -> IResult<&str, T> {
    map_res(digit1, str::parse::<T>)(input)
}

// =============================================================================
// VALUE PARSERS
// =============================================================================

pub(crate) fn pdf_value(input: &str) -> IResult<&str, PdfValue> {
    alt((
        dictionary,
        hex_string,
        array,
        map(literal_string, PdfValue::String),
        map(name, PdfValue::Name),
        map(reference, PdfValue::Reference),
        number,
        value(PdfValue::Bool(true), keyword("true")),
        value(PdfValue::Bool(false), keyword("false")),
        value(PdfValue::Null, keyword("null")),
    ))(input)
}

fn dictionary(input: &str) -> IResult<&str, PdfValue> {
    let entry = pair(terminated(name, ws), terminated(pdf_value, ws));
    map(
        delimited(pair(tag("<<"), ws), many0(entry), tag(">>")),
        |entries| {
            let mut dict = IndexMap::with_capacity(entries.len());
            for (key, val) in entries {
                dict.insert(key, val);
            }
            PdfValue::Dictionary(dict)
        },
    )(input)
}

fn array(input: &str) -> IResult<&str, PdfValue> {
    map(
        delimited(pair(char('['), ws), many0(terminated(pdf_value, ws)), char(']')),
        PdfValue::Array,
    )(input)
}

fn hex_string(input: &str) -> IResult<&str, PdfValue> {
    map(
        delimited(
            char('<'),
            take_while(|c: char| c.is_ascii_hexdigit() || is_pdf_whitespace(c)),
            char('>'),
        ),
        |body: &str| PdfValue::HexString(decode_hex(body)),
    )(input)
}

fn decode_hex(body: &str) -> Vec<u8> {
    let mut digits: Vec<u8> = body
        .chars()
        .filter_map(|c| c.to_digit(16).map(|d| d as u8))
        .collect();
    if digits.len() % 2 == 1 {
        digits.push(0);
    }
    digits.chunks(2).map(|p| (p[0] << 4) | p[1]).collect()
}

pub(crate) fn name(input: &str) -> IResult<&str, Name> {
    map(preceded(char('/'), take_while(is_regular)), decode_name)(input)
}

fn decode_name(raw: &str) -> Name {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'#' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(b) = decoded {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    Name::new(String::from_utf8_lossy(&out).into_owned())
}

fn reference(input: &str) -> IResult<&str, ObjectRef> {
    map(
        tuple((unsigned::<u32>, ws1, unsigned::<u16>, ws1, keyword("R"))),
        |(number, _, generation, _, _)| ObjectRef::new(number, generation),
    )(input)
}

fn number(input: &str) -> IResult<&str, PdfValue> {
    let digits = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ));
    map_res(recognize(pair(opt(one_of("+-")), digits)), |text: &str| {
        if text.contains('.') {
            text.parse::<f64>().map(PdfValue::Real).map_err(|_| ())
        } else {
            text.parse::<i64>().map(PdfValue::Number).map_err(|_| ())
        }
    })(input)
}

/// Literal string with balanced parentheses and backslash escapes.
fn literal_string(input: &str) -> IResult<&str, Vec<u8>> {
    let (mut rest, _) = char('(')(input)?;
    let mut out = Vec::new();
    let mut depth = 0usize;

    loop {
        let mut chars = rest.chars();
        let Some(c) = chars.next() else {
            return Err(nom::Err::Error(nom::error::Error::new(
                rest,
                nom::error::ErrorKind::Char,
            )));
        };
        match c {
            '(' => {
                depth += 1;
                out.push(b'(');
                rest = chars.as_str();
            }
            ')' if depth == 0 => return Ok((chars.as_str(), out)),
            ')' => {
                depth -= 1;
                out.push(b')');
                rest = chars.as_str();
            }
            '\\' => rest = escape(chars.as_str(), &mut out),
            other => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
                rest = chars.as_str();
            }
        }
    }
}

/// Decode one escape sequence following a backslash; returns the remaining
/// input.
fn escape<'a>(input: &'a str, out: &mut Vec<u8>) -> &'a str {
    let mut chars = input.chars();
    let Some(c) = chars.next() else {
        return input;
    };
    match c {
        'n' => out.push(b'\n'),
        'r' => out.push(b'\r'),
        't' => out.push(b'\t'),
        'b' => out.push(0x08),
        'f' => out.push(0x0c),
        '(' | ')' | '\\' => out.push(c as u8),
        '\r' => {
            // Line continuation; swallow an optional following LF.
            let rest = chars.as_str();
            return rest.strip_prefix('\n').unwrap_or(rest);
        }
        '\n' => {}
        '0'..='7' => {
            let digits: String = input.chars().take(3).take_while(|d| d.is_digit(8)).collect();
            let code = u32::from_str_radix(&digits, 8).unwrap_or(0);
            out.push((code & 0xff) as u8);
            return &input[digits.len()..];
        }
        other => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
        }
    }
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> PdfValue {
        parse_value(text).unwrap()
    }

    #[test]
    fn keywords() {
        assert_eq!(parse("null"), PdfValue::Null);
        assert_eq!(parse(" true "), PdfValue::Bool(true));
        assert_eq!(parse("false"), PdfValue::Bool(false));
        assert!(parse_value("nullx").is_err());
    }

    #[test]
    fn numbers_and_reals() {
        assert_eq!(parse("42"), PdfValue::Number(42));
        assert_eq!(parse("-7"), PdfValue::Number(-7));
        assert_eq!(parse("+3"), PdfValue::Number(3));
        assert_eq!(parse("3.5"), PdfValue::Real(3.5));
        assert_eq!(parse("-.5"), PdfValue::Real(-0.5));
        assert_eq!(parse("4."), PdfValue::Real(4.0));
    }

    #[test]
    fn references_win_over_number_pairs() {
        assert_eq!(parse("12 0 R"), PdfValue::reference(12, 0));
        assert_eq!(
            parse("[1 2 R 3 4]"),
            PdfValue::Array(vec![
                PdfValue::reference(1, 2),
                PdfValue::Number(3),
                PdfValue::Number(4),
            ])
        );
    }

    #[test]
    fn literal_strings() {
        assert_eq!(parse("(hello)"), PdfValue::string("hello"));
        assert_eq!(parse("(a (nested) b)"), PdfValue::string("a (nested) b"));
        assert_eq!(parse("(esc\\)aped)"), PdfValue::string("esc)aped"));
        assert_eq!(parse("(line\\nbreak)"), PdfValue::string("line\nbreak"));
        assert_eq!(parse("(\\101\\102)"), PdfValue::string("AB"));
        assert_eq!(parse("(split\\\nline)"), PdfValue::string("splitline"));
        assert!(parse_value("(unterminated").is_err());
    }

    #[test]
    fn hex_strings() {
        assert_eq!(parse("<4142>"), PdfValue::HexString(b"AB".to_vec()));
        assert_eq!(parse("<41 4>"), PdfValue::HexString(vec![0x41, 0x40]));
        assert_eq!(parse("<>"), PdfValue::HexString(vec![]));
    }

    #[test]
    fn names_decode_escapes() {
        assert_eq!(parse("/Type"), PdfValue::name("Type"));
        assert_eq!(parse("/A#20B"), PdfValue::name("A B"));
        assert_eq!(parse("/"), PdfValue::name(""));
    }

    #[test]
    fn dictionaries_keep_order() {
        let value = parse("<< /Type /Catalog /Pages 2 0 R % comment\n /Count 3 >>");
        let PdfValue::Dictionary(dict) = value else {
            panic!("expected dictionary");
        };
        let keys: Vec<&str> = dict.keys().map(Name::as_str).collect();
        assert_eq!(keys, vec!["Type", "Pages", "Count"]);
        assert_eq!(dict[&Name::new("Pages")], PdfValue::reference(2, 0));
    }

    #[test]
    fn nested_containers() {
        let value = parse("<</Kids[<</A 1>>[]]>>");
        assert_eq!(
            value,
            PdfValue::dictionary([(
                "Kids",
                PdfValue::Array(vec![
                    PdfValue::dictionary([("A", PdfValue::Number(1))]),
                    PdfValue::Array(vec![]),
                ]),
            )])
        );
    }

    #[test]
    fn trailing_input_is_rejected_with_offset() {
        match parse_value("1 2") {
            Err(StoreError::Parse { offset, .. }) => assert_eq!(offset, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(parse_value("").is_err());
        assert!(parse_value("<< /A >>").is_err());
    }

    #[test]
    fn encoding_parses_back() {
        let value = parse("<< /S (a\\(b) /H <00FF> /N /x#2Fy /R [1.5 -2 0 0 R] /E null >>");
        let reparsed = parse(&value.to_string());
        assert!(value.identical(&reparsed));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_value() -> impl Strategy<Value = PdfValue> {
            let leaf = prop_oneof![
                Just(PdfValue::Null),
                any::<bool>().prop_map(PdfValue::Bool),
                any::<i64>().prop_map(PdfValue::Number),
                proptest::collection::vec(any::<u8>(), 0..8).prop_map(PdfValue::String),
                proptest::collection::vec(any::<u8>(), 0..8).prop_map(PdfValue::HexString),
                "[A-Za-z0-9 #/]{0,6}".prop_map(PdfValue::name),
                (0u32..1000, 0u16..4).prop_map(|(n, g)| PdfValue::reference(n, g)),
            ];
            leaf.prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    proptest::collection::vec(inner.clone(), 0..4).prop_map(PdfValue::Array),
                    proptest::collection::vec(("[A-Za-z]{1,4}", inner), 0..4)
                        .prop_map(|entries| PdfValue::dictionary(entries)),
                ]
            })
        }

        proptest! {
            #[test]
            fn encoder_output_is_accepted(value in arb_value()) {
                let text = value.to_string();
                let reparsed = parse_value(&text).unwrap();
                prop_assert!(value.identical(&reparsed), "{} reparsed as {}", text, reparsed);
            }
        }
    }
}
