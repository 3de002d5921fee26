//! Shell-style word splitting for command lines.
//!
//! Follows POSIX quoting rules closely enough for command files:
//! - space, tab, CR and LF separate words; other Unicode spaces do not
//! - single quotes preserve everything up to the closing quote
//! - double quotes preserve whitespace; a backslash escapes `"` or `\` only
//! - a backslash outside quotes escapes the next character
//! - an unquoted `#` starts a comment running to the end of the line

use crate::error::LineParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Split a line into words.
///
/// # Errors
///
/// Returns [`LineParseError::Syntax`] on an unterminated quote or a trailing
/// backslash with nothing to escape.
pub fn split_words(line: &str) -> Result<Vec<String>, LineParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    // Tracks whether a word is open, so that `''` still yields an empty word.
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::None => match c {
                ' ' | '\t' | '\r' | '\n' => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                '#' => break,
                '\'' => {
                    quote = Quote::Single;
                    in_word = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_word = true;
                }
                '\\' => {
                    let escaped = chars
                        .next()
                        .ok_or_else(|| LineParseError::syntax("no escaped character"))?;
                    current.push(escaped);
                    in_word = true;
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some(escaped @ ('"' | '\\')) => current.push(escaped),
                    Some(other) => {
                        current.push('\\');
                        current.push(other);
                    }
                    None => return Err(LineParseError::syntax("no closing quotation")),
                },
                c => current.push(c),
            },
        }
    }

    if quote != Quote::None {
        return Err(LineParseError::syntax("no closing quotation"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn split(line: &str) -> Vec<String> {
        split_words(line).expect("line should split")
    }

    #[test_case("a b  c", &["a", "b", "c"] ; "plain words")]
    #[test_case("  a\tb  ", &["a", "b"] ; "surrounding whitespace")]
    #[test_case("a 'b c' d", &["a", "b c", "d"] ; "single quoted")]
    #[test_case(r#"a "b c" d"#, &["a", "b c", "d"] ; "double quoted")]
    #[test_case("--groups '1,2'", &["--groups", "1,2"] ; "quoted option value")]
    #[test_case("ab'cd'ef", &["abcdef"] ; "quotes inside a word")]
    #[test_case("a '' b", &["a", "", "b"] ; "empty quoted word")]
    #[test_case(r"a\ b", &["a b"] ; "escaped space")]
    #[test_case(r#""say \"hi\"""#, &[r#"say "hi""#] ; "escaped quote in double quotes")]
    #[test_case(r#""c:\temp""#, &[r"c:\temp"] ; "backslash kept in double quotes")]
    #[test_case(r"'a\b'", &[r"a\b"] ; "backslash literal in single quotes")]
    #[test_case("a\tb\r\nc", &["a", "b", "c"] ; "tabs and line endings separate words")]
    #[test_case("host\u{a0}name x", &["host\u{a0}name", "x"] ; "no-break space stays in word")]
    #[test_case("a\u{2003}b", &["a\u{2003}b"] ; "em space stays in word")]
    fn splits(line: &str, expected: &[&str]) {
        assert_eq!(split(line), expected);
    }

    #[test_case("cmd # trailing", &["cmd"] ; "trailing comment")]
    #[test_case("cmd --opt val # comment --other x", &["cmd", "--opt", "val"] ; "options after comment dropped")]
    #[test_case("cmd#comment", &["cmd"] ; "comment inside word")]
    #[test_case("cmd '#not a comment'", &["cmd", "#not a comment"] ; "quoted hash")]
    #[test_case("# only comment", &[] ; "whole line comment")]
    fn comments(line: &str, expected: &[&str]) {
        assert_eq!(split(line), expected);
    }

    #[test_case("cmd 'unterminated" ; "single quote")]
    #[test_case(r#"cmd "unterminated"# ; "double quote")]
    #[test_case(r"cmd trailing\" ; "trailing backslash")]
    fn malformed(line: &str) {
        let err = split_words(line).expect_err("should fail");
        assert!(matches!(err, LineParseError::Syntax { .. }));
    }

    #[test]
    fn empty_input_yields_no_words() {
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
    }
}
