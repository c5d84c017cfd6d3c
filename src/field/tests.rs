use super::*;
use crate::record::HttpVersion;
use crate::token::TokenKind;
use assert_matches::assert_matches;
use rstest::rstest;

fn word(pos: usize, text: &str) -> Token {
    Token::new(TokenKind::Word, pos, text)
}

fn quoted(pos: usize, text: &str) -> Token {
    Token::new(TokenKind::QuotedString, pos, text)
}

fn integer(pos: usize, text: &str) -> Token {
    Token::new(TokenKind::Integer, pos, text)
}

fn time_tokens(time: &str, zone: &str) -> Vec<Token> {
    vec![
        Token::new(TokenKind::LeftDelimiter, 0, "["),
        word(1, time),
        word(2 + time.len(), zone),
        Token::new(TokenKind::RightDelimiter, 2 + time.len() + zone.len(), "]"),
    ]
}

#[test]
fn test_item_count() {
    let result = FieldParser::TIME.parse(&[word(0, "x")]);
    assert_eq!(
        result,
        Err(FieldError::ItemCount {
            field: FieldKind::Time,
            expected: 4,
            actual: 1,
        })
    );
}

#[test]
fn test_error_token_skips_conversion() {
    let tokens = [Token::new(TokenKind::Error, 42, "\"curl")];
    let err = FieldParser::USER_AGENT.parse(&tokens).unwrap_err();
    assert_eq!(
        err,
        FieldError::InvalidToken {
            field: FieldKind::UserAgent,
            pos: 42,
            text: "\"curl".into(),
        }
    );
    assert_eq!(err.field(), FieldKind::UserAgent);
    assert_eq!(err.to_string(), "invalid value:42: \"curl");
}

#[test]
fn test_unexpected_token_kind() {
    let err = FieldParser::STATUS.parse(&[word(7, "200")]).unwrap_err();
    assert_matches!(err, FieldError::InvalidToken { field: FieldKind::Status, pos: 7, .. });
}

#[test]
fn test_first_offending_token() {
    let mut tokens = time_tokens("10/Oct/2020:13:55:36", "-0700");
    tokens[0] = Token::new(TokenKind::Error, 0, "x");
    tokens[3] = Token::new(TokenKind::Error, 27, "y");
    let err = FieldParser::TIME.parse(&tokens).unwrap_err();
    assert_eq!(err.field(), FieldKind::Time);
    assert_eq!(err.pos(), 0);
}

#[test]
fn test_time() {
    let parsed = FieldParser::TIME
        .parse(&time_tokens("10/Oct/2020:13:55:36", "-0700"))
        .unwrap();
    let expected = DateTime::parse_from_rfc3339("2020-10-10T13:55:36-07:00").unwrap();
    assert_eq!(parsed.value, Value::Time(expected));
    assert_eq!(parsed.span, 0..28);
}

#[test]
fn test_time_invalid() {
    let err = FieldParser::TIME
        .parse(&time_tokens("10/Foo/2020:13:55:36", "-0700"))
        .unwrap_err();
    assert_matches!(
        err,
        FieldError::Conversion {
            field: FieldKind::Time,
            cause: ConversionError::Time(_),
            ..
        }
    );
    assert!(err.to_string().starts_with("time: "), "{err}");
}

#[rstest]
#[case("10.0.0.1", Some("10.0.0.1"))]
#[case("255.255.255.255", Some("255.255.255.255"))]
#[case("999.1.2.3", None)]
#[case("1.2", None)]
#[case("", None)]
fn test_address(#[case] text: &str, #[case] expected: Option<&str>) {
    let tokens = [Token::new(TokenKind::Address, 0, text)];
    let parsed = FieldParser::ADDRESS.parse(&tokens).unwrap();
    let expected = expected.map(|x| x.parse::<IpAddr>().unwrap());
    assert_eq!(parsed.value, Value::Address(expected));
}

#[test]
fn test_ignore() {
    let parsed = FieldParser::IGNORE.parse(&[word(9, "-")]).unwrap();
    assert_eq!(parsed, Parsed { value: Value::Ignored, span: 9..10 });
}

#[test]
fn test_user() {
    let parsed = FieldParser::USER.parse(&[word(11, "alice")]).unwrap();
    assert_eq!(parsed.value, Value::User("alice".into()));
}

#[test]
fn test_request() {
    let parsed = FieldParser::REQUEST
        .parse(&[quoted(0, r#""GET /index.html HTTP/1.1""#)])
        .unwrap();
    assert_eq!(
        parsed.value,
        Value::Request(Request {
            method: "GET".into(),
            target: "/index.html".into(),
            version: HttpVersion::HTTP_1_1,
        })
    );
}

#[test]
fn test_request_arity() {
    let err = FieldParser::REQUEST.parse(&[quoted(60, r#""BAD""#)]).unwrap_err();
    assert_eq!(
        err,
        FieldError::Conversion {
            field: FieldKind::Request,
            pos: 60,
            cause: ConversionError::RequestParts(1),
        }
    );
    assert_eq!(err.to_string(), "request: invalid number of request parts: 1");
}

#[rstest]
#[case(FieldParser::STATUS, "200", Value::Status(200))]
#[case(FieldParser::STATUS, "0", Value::Status(0))]
#[case(FieldParser::BODY_BYTES, "1043", Value::BodyBytes(1043))]
#[case(FieldParser::BODY_BYTES, "9223372036854775807", Value::BodyBytes(i64::MAX))]
fn test_integers(#[case] parser: FieldParser, #[case] text: &str, #[case] expected: Value) {
    assert_eq!(parser.parse(&[integer(0, text)]).unwrap().value, expected);
}

#[rstest]
#[case(FieldParser::STATUS, "20x")]
#[case(FieldParser::STATUS, "abc")]
#[case(FieldParser::STATUS, "")]
#[case(FieldParser::BODY_BYTES, "1e3")]
#[case(FieldParser::BODY_BYTES, "9223372036854775808")]
fn test_integers_invalid(#[case] parser: FieldParser, #[case] text: &str) {
    let err = parser.parse(&[integer(0, text)]).unwrap_err();
    assert_matches!(
        err,
        FieldError::Conversion {
            cause: ConversionError::Integer(_),
            ..
        }
    );
}

#[rstest]
#[case(FieldParser::STATUS, "+200")]
#[case(FieldParser::STATUS, "-1")]
#[case(FieldParser::BODY_BYTES, "-5")]
fn test_integers_signed(#[case] parser: FieldParser, #[case] text: &str) {
    let err = parser.parse(&[integer(3, text)]).unwrap_err();
    assert_eq!(
        err,
        FieldError::Conversion {
            field: parser.kind(),
            pos: 3,
            cause: ConversionError::Signed(text.into()),
        }
    );
}

#[test]
fn test_referrer() {
    let absent = FieldParser::REFERRER.parse(&[quoted(0, r#""-""#)]).unwrap();
    assert_eq!(absent.value, Value::Referrer(None));

    let present = FieldParser::REFERRER
        .parse(&[quoted(0, r#""https://example.com/a?b=c""#)])
        .unwrap();
    assert_eq!(
        present.value,
        Value::Referrer(Some("https://example.com/a?b=c".parse().unwrap()))
    );

    let bare = FieldParser::REFERRER
        .parse(&[quoted(0, r#""https://Example.com""#)])
        .unwrap();
    assert_matches!(bare.value, Value::Referrer(Some(referrer)) => {
        assert_eq!(referrer.as_str(), "https://Example.com");
        assert_eq!(referrer.url().as_str(), "https://example.com/");
    });
}

#[rstest]
#[case(r#""not a url""#)]
#[case(r#""/relative/path""#)]
#[case(r#""""#)]
#[case(r#""--""#)]
fn test_referrer_invalid(#[case] text: &str) {
    let err = FieldParser::REFERRER.parse(&[quoted(5, text)]).unwrap_err();
    assert_matches!(
        err,
        FieldError::Conversion {
            field: FieldKind::Referrer,
            pos: 5,
            cause: ConversionError::Url(_),
        }
    );
}

#[test]
fn test_user_agent() {
    let parsed = FieldParser::USER_AGENT
        .parse(&[quoted(0, r#""Mozilla/5.0 (X11; Linux x86_64)""#)])
        .unwrap();
    assert_eq!(parsed.value, Value::UserAgent("Mozilla/5.0 (X11; Linux x86_64)".into()));
}

#[rstest]
#[case(r#""abc""#, "abc")]
#[case("'abc'", "abc")]
#[case("`a'b`", "a'b")]
#[case(r#""""#, "")]
#[case(r#""abc'"#, r#""abc'"#)]
#[case("x", "x")]
#[case("", "")]
fn test_unquote(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(unquote(input), expected);
}

#[test]
fn test_line_error_display() {
    let err = LineError::new(
        3,
        FieldError::Conversion {
            field: FieldKind::BodyBytes,
            pos: 50,
            cause: ConversionError::RequestTarget,
        },
    );
    assert_eq!(err.to_string(), "3:body-bytes: empty request target");

    let err = LineError::new(
        7,
        FieldError::InvalidToken {
            field: FieldKind::UserAgent,
            pos: 94,
            text: "\"curl".into(),
        },
    );
    assert_eq!(err.to_string(), "7:invalid value:94: \"curl");
}

#[test]
fn test_value_kind() {
    assert_eq!(Value::Ignored.kind(), FieldKind::Ignore);
    assert_eq!(Value::UserAgent(String::new()).kind(), FieldKind::UserAgent);
    assert_eq!(FieldKind::BodyBytes.as_ref(), "body-bytes");
}
