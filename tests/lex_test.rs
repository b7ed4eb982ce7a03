use minibasic::lang::{lex, Kind};

#[test]
fn test_line_numbers_keep_their_spelling() {
    let tokens = lex("010 PRINT \"X\"\n");
    assert_eq!(tokens[0].kind, Kind::LineNo);
    assert_eq!(tokens[0].literal, "010");
}

#[test]
fn test_statement_tokens() {
    let tokens = lex("10 LET A = 3\n");
    let kinds: Vec<Kind> = tokens.iter().map(|tok| tok.kind).collect();
    assert_eq!(
        kinds,
        vec![
            Kind::LineNo,
            Kind::Let,
            Kind::Ident,
            Kind::Equal,
            Kind::Number,
            Kind::Newline,
            Kind::Eof,
        ]
    );
}

#[test]
fn test_comparison_operators() {
    let tokens = lex("10 IF A <= 3 AND B <> 4 THEN PRINT A\n");
    let kinds: Vec<Kind> = tokens.iter().map(|tok| tok.kind).collect();
    assert_eq!(
        kinds,
        vec![
            Kind::LineNo,
            Kind::If,
            Kind::Ident,
            Kind::LessEqual,
            Kind::Number,
            Kind::And,
            Kind::Ident,
            Kind::NotEqual,
            Kind::Number,
            Kind::Then,
            Kind::Print,
            Kind::Ident,
            Kind::Newline,
            Kind::Eof,
        ]
    );
}

#[test]
fn test_negative_literal_after_step() {
    let tokens = lex("10 FOR I = 10 TO 1 STEP -2\n");
    let step = tokens
        .iter()
        .find(|tok| tok.literal == "-2")
        .expect("no -2 literal");
    assert_eq!(step.kind, Kind::Number);
}

#[test]
fn test_minus_after_value_is_subtraction() {
    let tokens = lex("10 LET A = B-2\n");
    let kinds: Vec<Kind> = tokens.iter().map(|tok| tok.kind).collect();
    assert!(kinds.contains(&Kind::Minus));
    assert!(!tokens.iter().any(|tok| tok.literal == "-2"));
}

#[test]
fn test_string_literal_keeps_punctuation() {
    let tokens = lex("10 PRINT \"Hello, world\"\n");
    assert_eq!(tokens[2].kind, Kind::String);
    assert_eq!(tokens[2].literal, "Hello, world");
}

#[test]
fn test_rem_swallows_the_line() {
    let tokens = lex("10 REM don't \"panic\": ok?\n20 END\n");
    assert_eq!(tokens[1].kind, Kind::Rem);
    assert_eq!(tokens[2].kind, Kind::Unknown);
    assert_eq!(tokens[3].kind, Kind::Newline);
    assert_eq!(tokens[4].kind, Kind::LineNo);
    assert_eq!(tokens[4].literal, "20");
}

#[test]
fn test_sigil_stays_on_identifier() {
    let tokens = lex("10 LET A$ = \"x\"\n");
    assert_eq!(tokens[2].kind, Kind::Ident);
    assert_eq!(tokens[2].literal, "A$");
}

#[test]
fn test_keywords_are_case_insensitive() {
    let tokens = lex("10 let a = 1\n");
    assert_eq!(tokens[1].kind, Kind::Let);
    assert_eq!(tokens[2].literal, "a");
}
