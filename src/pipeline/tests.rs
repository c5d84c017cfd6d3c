use std::io::Cursor;

use super::*;
use crate::field::{ConversionError, FieldError, FieldKind, FieldParser, Value};
use crate::scanner::Producer;
use crate::token::Token;
use assert_matches::assert_matches;
use rstest::rstest;

const GOOD: &str =
    r#"10.0.0.1 - alice [10/Oct/2020:13:55:36 -0700] "GET /index.html HTTP/1.1" 200 1043 "-" "curl/7.64.1""#;
const BAD_REQUEST: &str = r#"192.168.1.5 - - [01/Jan/2021:00:00:00 +0000] "BAD" 404 0 "-" "-""#;

fn input(n: usize) -> String {
    let mut s = String::new();
    for i in 0..n {
        if i % 7 == 3 {
            s.push_str(BAD_REQUEST);
        } else {
            s.push_str(&format!(
                r#"10.0.{}.{} - user{i} [10/Oct/2020:13:55:36 -0700] "GET /page/{i} HTTP/1.1" 200 {i} "-" "agent""#,
                i / 256,
                i % 256
            ));
        }
        s.push('\n');
    }
    s
}

fn pipeline(concurrency: usize) -> Pipeline {
    Pipeline::new(
        Arc::new(Grammar::combined()),
        Options {
            concurrency,
            queue_capacity: 4,
        },
    )
}

fn collect(pipeline: &Pipeline, data: &str) -> (Result<Stats>, Vec<Record>, Vec<LineError>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut output = Callbacks {
        on_record: |record: Record| {
            records.push(record);
            Ok(())
        },
        on_error: |error: LineError| {
            errors.push(error);
            Ok(())
        },
    };
    let stats = pipeline.run(Cursor::new(data.as_bytes()), &mut output);
    (stats, records, errors)
}

#[test]
fn test_single_line() {
    let (stats, records, errors) = collect(&pipeline(1), GOOD);
    assert_eq!(
        stats.unwrap(),
        Stats {
            lines: 1,
            records: 1,
            errors: 0
        }
    );
    assert!(errors.is_empty());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].to_string(), GOOD);
}

#[test]
fn test_error_attribution() {
    let data = format!("{GOOD}\n{GOOD}\n{BAD_REQUEST}\n{GOOD}\n");
    let (stats, records, errors) = collect(&pipeline(3), &data);
    assert_eq!(stats.unwrap().lines, 4);
    assert_eq!(records.len(), 3);
    assert_eq!(
        errors,
        vec![LineError::new(
            3,
            FieldError::Conversion {
                field: FieldKind::Request,
                pos: BAD_REQUEST.find('"').unwrap(),
                cause: ConversionError::RequestParts(1),
            }
        )]
    );
    assert_eq!(errors[0].to_string(), "3:request: invalid number of request parts: 1");
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(8)]
fn test_exactly_once(#[case] concurrency: usize) {
    let data = input(500);
    let (stats, records, errors) = collect(&pipeline(concurrency), &data);
    let stats = stats.unwrap();
    assert_eq!(stats.lines, 500);
    assert_eq!(stats.records + stats.errors, 500);
    assert_eq!(stats.records, records.len() as u64);
    assert_eq!(stats.errors, errors.len() as u64);

    let mut lines: Vec<_> = errors.iter().map(|e| e.line).collect();
    lines.sort();
    let expected: Vec<u64> = (0..500u64).filter(|i| i % 7 == 3).map(|i| i + 1).collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_same_results_regardless_of_concurrency() {
    let data = input(300);
    let sorted = |concurrency| {
        let (stats, records, errors) = collect(&pipeline(concurrency), &data);
        stats.unwrap();
        let mut records: Vec<_> = records.iter().map(|r| r.to_string()).collect();
        let mut errors: Vec<_> = errors.iter().map(|e| e.to_string()).collect();
        records.sort();
        errors.sort();
        (records, errors)
    };
    assert_eq!(sorted(1), sorted(6));
}

#[test]
fn test_line_endings() {
    let data = format!("{GOOD}\r\n\n{GOOD}");
    let (stats, records, errors) = collect(&pipeline(2), &data);
    assert_eq!(stats.unwrap().lines, 3);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.user_agent == "curl/7.64.1"));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 2);
}

#[test]
fn test_invalid_utf8_is_local() {
    let mut data = b"\xff\xfe garbage\n".to_vec();
    data.extend_from_slice(GOOD.as_bytes());
    let mut records = 0;
    let mut errors = Vec::new();
    let mut output = Callbacks {
        on_record: |_: Record| {
            records += 1;
            Ok(())
        },
        on_error: |error: LineError| {
            errors.push(error.line);
            Ok(())
        },
    };
    let stats = pipeline(2).run(Cursor::new(data), &mut output).unwrap();
    assert_eq!(stats.lines, 2);
    assert_eq!(records, 1);
    assert_eq!(errors, vec![1]);
}

#[test]
fn test_empty_input() {
    let (stats, records, errors) = collect(&pipeline(4), "");
    assert_eq!(stats.unwrap(), Stats::default());
    assert!(records.is_empty());
    assert!(errors.is_empty());
}

#[test]
fn test_output_error_stops_pipeline() {
    let data = input(2000);
    let mut seen = 0;
    let mut output = Callbacks {
        on_record: |_: Record| {
            seen += 1;
            if seen == 10 {
                Err(Error::Io(std::io::ErrorKind::BrokenPipe.into()))
            } else {
                Ok(())
            }
        },
        on_error: |_: LineError| Ok(()),
    };
    let result = pipeline(4).run(Cursor::new(data), &mut output);
    assert_matches!(result, Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::BrokenPipe);
    assert_eq!(seen, 10);
}

fn convert_wrong(_: &[Token]) -> std::result::Result<Value, ConversionError> {
    Ok(Value::Status(0))
}

#[test]
fn test_broken_grammar_is_fatal() {
    let grammar = Grammar::new(
        "broken",
        vec![FieldParser::new(FieldKind::User, &[Producer::WORD], Some(convert_wrong))],
    );
    let pipeline = Pipeline::new(
        Arc::new(grammar),
        Options {
            concurrency: 2,
            queue_capacity: 2,
        },
    );
    let (result, records, errors) = collect(&pipeline, &input(100));
    assert_matches!(
        result,
        Err(Error::ValueMismatch {
            field: FieldKind::User,
            actual: FieldKind::Status
        })
    );
    assert!(records.is_empty());
    assert!(errors.is_empty());
}
