use smc_fuzz_gen::{ArgumentKind, Error, Literal, parse_str};

fn parse_err(source: &str) -> Error {
    match parse_str(source) {
        Ok(spec) => panic!("expected a parse error, got {} calls", spec.calls.len()),
        Err(e) => e,
    }
}

// ── Accepted forms ──

#[test]
fn test_default_value_argument() {
    let spec = parse_str("smc: T 0x10\narg0 = 0x5\n").expect("parse");
    let call = spec.call("T").expect("call T");
    assert_eq!(call.numeric_id, Some(0x10));
    assert_eq!(call.arguments.len(), 1);

    let arg = &call.arguments[0];
    assert_eq!(arg.register, 0);
    assert_eq!(arg.kind, ArgumentKind::RawDefault);
    assert_eq!(arg.fields.len(), 1);

    let field = &arg.fields[0];
    assert_eq!((field.bit_start, field.bit_end), (0, 63));
    assert_eq!(field.default_value, Literal::hex(5));
    assert_eq!(field.call, "T");
    assert_eq!(field.argument, arg.label);
}

#[test]
fn test_range_default_expansion() {
    let spec = parse_str("smc: T\narg0: a\nfield:x:[0,0] = 0\narg2-arg4 = 0x0\n").expect("parse");
    let call = spec.call("T").unwrap();
    let registers: Vec<u8> = call.arguments.iter().map(|a| a.register).collect();
    assert_eq!(registers, vec![0, 2, 3, 4]);
    for arg in &call.arguments[1..] {
        assert_eq!(arg.kind, ArgumentKind::RawDefault);
        assert_eq!(arg.fields.len(), 1);
        assert_eq!(arg.fields[0].bit_end, 63);
        assert_eq!(arg.fields[0].default_value, Literal::hex(0));
        assert_eq!(arg.fields[0].register, arg.register);
    }
    assert_eq!(call.arguments[2].label, "T_arg_3");
}

#[test]
fn test_range_default_rejects_occupied_register() {
    let err = parse_err("smc: T\narg3 = 1\narg2-arg4 = 0x0\n");
    assert!(
        matches!(err, Error::RegisterAlreadySpecified { line: 3, register: 3, .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn test_deferred_id_resolution() {
    let spec = parse_str("smc: T LBL\narg0 = 0\ndefine LBL = 0x7\n").expect("parse");
    assert_eq!(spec.call("T").unwrap().numeric_id, Some(7));
    assert_eq!(spec.defines.get("LBL"), Some(&7));
}

#[test]
fn test_missing_define_is_fatal() {
    let err = parse_err("smc: T LBL\narg0 = 0\n");
    match err {
        Error::UnresolvedDefine { call, label } => {
            assert_eq!(call, "T");
            assert_eq!(label, "LBL");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_call_without_id() {
    let spec = parse_str("smc: T\narg0 = 0\n").expect("parse");
    let call = spec.call("T").unwrap();
    assert_eq!(call.numeric_id, None);
    assert_eq!(call.id_label, None);
}

#[test]
fn test_comments_blank_lines_and_indentation() {
    let source = "
        # SDEI interface
        smc: SDEI_EVENT_ENABLE 0xc4000026

            arg1: event
                # low half
                field:num:[0,31] = 0x0
                field:rsvd:[32,63] = 0
    ";
    let spec = parse_str(source).expect("parse");
    let call = spec.call("SDEI_EVENT_ENABLE").unwrap();
    assert_eq!(call.field_count(), 2);
    assert_eq!(call.fields().nth(1).unwrap().default_value, Literal::decimal(0));
}

#[test]
fn test_adjacent_fields_do_not_overlap() {
    let spec = parse_str("smc: T\narg1: a\nfield:lo:[0,3] = 0\nfield:hi:[4,7] = 0\n")
        .expect("parse");
    assert_eq!(spec.field_count(), 2);
}

// ── Structural rejections ──

#[test]
fn test_overlap_rejection() {
    let err = parse_err("smc: T\narg1: a\nfield:a:[0,3] = 0\nfield:b:[2,5] = 0\n");
    match err {
        Error::FieldOverlap {
            line,
            field,
            existing,
            ..
        } => {
            assert_eq!(line, 4);
            assert_eq!(field, "b");
            assert_eq!(existing, "a");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_overlap_rejection_for_containing_field() {
    let err = parse_err("smc: T\narg1: a\nfield:inner:[2,3] = 0\nfield:outer:[0,7] = 0\n");
    assert!(matches!(err, Error::FieldOverlap { .. }), "unexpected error: {err}");
}

#[test]
fn test_field_after_raw_argument_overlaps() {
    let err = parse_err("smc: T\narg0 = 0\nfield:x:[0,0] = 0\n");
    assert!(matches!(err, Error::FieldOverlap { .. }), "unexpected error: {err}");
}

#[test]
fn test_duplicate_register_rejected() {
    let err = parse_err("smc: T\narg1: a\nfield:x:[0,0] = 0\narg1: b\nfield:y:[0,0] = 0\n");
    assert!(
        matches!(err, Error::RegisterAlreadySpecified { line: 4, register: 1, .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn test_register_out_of_range() {
    let err = parse_err("smc: T\narg8 = 0\n");
    assert!(matches!(err, Error::RegisterOutOfRange { .. }), "unexpected error: {err}");
}

#[test]
fn test_reversed_register_range() {
    let err = parse_err("smc: T\narg4-arg2 = 0\n");
    assert!(
        matches!(err, Error::InvalidRegisterRange { first: 4, last: 2, .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn test_invalid_bit_ranges() {
    for field in ["field:x:[5,2] = 0", "field:x:[0,64] = 0", "field:x:[0,999] = 0"] {
        let err = parse_err(&format!("smc: T\narg1: a\n{field}\n"));
        assert!(matches!(err, Error::InvalidBitRange { .. }), "{field}: {err}");
    }
}

#[test]
fn test_empty_fielded_argument_rejected() {
    let err = parse_err("smc: T\narg1: a\nsmc: U\narg0 = 0\n");
    assert!(
        matches!(err, Error::EmptyArgument { line: 2, register: 1, .. }),
        "unexpected error: {err}"
    );
    let err = parse_err("smc: T\narg1: a\n");
    assert!(matches!(err, Error::EmptyArgument { .. }), "at end of file: {err}");
}

#[test]
fn test_duplicates_rejected() {
    let err = parse_err("smc: T\narg0 = 0\nsmc: T\narg0 = 0\n");
    assert!(matches!(err, Error::DuplicateCall { line: 3, .. }), "{err}");

    let err = parse_err("smc: T\narg0: a\nfield:x:[0,0] = 0\narg1: a\nfield:y:[0,0] = 0\n");
    assert!(matches!(err, Error::DuplicateArgumentLabel { .. }), "{err}");

    let err = parse_err("smc: T\narg0: a\nfield:x:[0,0] = 0\nfield:x:[1,1] = 0\n");
    assert!(matches!(err, Error::DuplicateField { .. }), "{err}");
}

#[test]
fn test_oversized_literal_rejected() {
    let err = parse_err("smc: T\narg0 = 0x10000000000000000\n");
    assert!(matches!(err, Error::InvalidLiteral { line: 2, .. }), "{err}");
}

// ── Sequencing ──

#[test]
fn test_field_before_argument_is_out_of_sequence() {
    let err = parse_err("smc: T\nfield:x:[0,3] = 0\n");
    match err {
        Error::OutOfSequence { line, what } => {
            assert_eq!(line, 2);
            assert!(what.contains("field x"), "{what}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_argument_before_call_is_out_of_sequence() {
    let err = parse_err("arg0 = 0\n");
    assert!(matches!(err, Error::OutOfSequence { line: 1, .. }), "{err}");
}

#[test]
fn test_call_without_arguments_is_out_of_sequence() {
    let err = parse_err("smc: T\nsmc: U\narg0 = 0\n");
    assert!(matches!(err, Error::OutOfSequence { line: 2, .. }), "{err}");
}

#[test]
fn test_incorrect_endings() {
    assert!(matches!(parse_err(""), Error::IncorrectEnding { .. }));
    assert!(matches!(parse_err("# nothing\n"), Error::IncorrectEnding { .. }));
    assert!(matches!(parse_err("smc: T 0x1\n"), Error::IncorrectEnding { .. }));
}

#[test]
fn test_malformed_line() {
    let err = parse_err("smc: T\narg0 = 0\nfield x 0..3\n");
    match err {
        Error::Malformed { line, text } => {
            assert_eq!(line, 3);
            assert_eq!(text, "field x 0..3");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_error_messages_name_the_offender() {
    let err = parse_err("smc: SDEI_X\narg1: ev\nfield:a:[0,3] = 0\nfield:b:[2,5] = 0\n");
    let message = err.to_string();
    assert!(message.contains("SDEI_X"), "{message}");
    assert!(message.contains("ev"), "{message}");
    assert!(message.contains("line 4"), "{message}");
}
