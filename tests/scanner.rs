#[cfg(test)]
mod scanner_tests {
    use treelox as lox;

    use lox::scanner::Scanner;
    use lox::token::{Token, TokenType};

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes().to_vec());
        let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

        assert_eq!(
            tokens.len(),
            expected.len(),
            "token count mismatch for {:?}",
            source
        );

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn one_and_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn comments_produce_no_tokens() {
        assert_token_sequence(
            "// a comment\n1 / 2",
            &[
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::SLASH, "/"),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_token_sequence(
            "var foo = while_not_a_keyword; fun return",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "foo"),
                (TokenType::EQUAL, "="),
                (TokenType::IDENTIFIER, "while_not_a_keyword"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::FUN, "fun"),
                (TokenType::RETURN, "return"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn number_literal_values() {
        let tokens: Vec<Token> = Scanner::new(b"123 45.67".to_vec())
            .filter_map(Result::ok)
            .collect();

        match tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 123.0),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
        match tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 45.67),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
    }

    #[test]
    fn trailing_dot_is_not_part_of_the_number() {
        assert_token_sequence(
            "123.foo",
            &[
                (TokenType::NUMBER(123.0), "123"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "foo"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn string_literal_keeps_contents_verbatim() {
        let tokens: Vec<Token> = Scanner::new(b"\"hello world\"".to_vec())
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].lexeme, "\"hello world\"");
        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "hello world"),
            other => panic!("expected STRING, got {:?}", other),
        }
    }

    #[test]
    fn multi_line_string_advances_the_line_counter() {
        let tokens: Vec<Token> = Scanner::new(b"\"a\nb\"\nfoo".to_vec())
            .filter_map(Result::ok)
            .collect();

        // The string closes on line 2; the identifier sits on line 3.
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].lexeme, "foo");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn unterminated_string_reports_and_still_emits_eof() {
        let results: Vec<_> = Scanner::new(b"\"oops".to_vec()).collect();

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].as_ref().unwrap_err().to_string(),
            "[line 1] Error: Unterminated string."
        );
        assert_eq!(
            results[1].as_ref().unwrap().token_type,
            TokenType::EOF
        );
    }

    #[test]
    fn unexpected_character_reports_and_scanning_continues() {
        let results: Vec<_> = Scanner::new(b",$(".to_vec()).collect();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().token_type, TokenType::COMMA);
        assert_eq!(
            results[1].as_ref().unwrap_err().to_string(),
            "[line 1] Error: Unexpected character."
        );
        assert_eq!(
            results[2].as_ref().unwrap().token_type,
            TokenType::LEFT_PAREN
        );
        assert_eq!(results[3].as_ref().unwrap().token_type, TokenType::EOF);
    }

    #[test]
    fn display_renders_type_lexeme_and_literal() {
        let tokens: Vec<Token> = Scanner::new(b"123 45.67 \"hi\" var".to_vec())
            .filter_map(Result::ok)
            .collect();

        // Integral number literals are forced to one decimal place;
        // non-literals render as null.
        assert_eq!(tokens[0].to_string(), "NUMBER 123 123.0");
        assert_eq!(tokens[1].to_string(), "NUMBER 45.67 45.67");
        assert_eq!(tokens[2].to_string(), "STRING \"hi\" hi");
        assert_eq!(tokens[3].to_string(), "VAR var null");
    }

    #[test]
    fn empty_input_yields_a_single_eof() {
        assert_token_sequence("", &[(TokenType::EOF, "")]);
    }

    #[test]
    fn leading_byte_order_mark_is_skipped() {
        let mut source: Vec<u8> = vec![0xEF, 0xBB, 0xBF];
        source.extend_from_slice(b"print");

        assert_token_sequence(
            std::str::from_utf8(&source).unwrap(),
            &[(TokenType::PRINT, "print"), (TokenType::EOF, "")],
        );
    }
}
