//! Recovers a JUnit test suite from free-form model output.
//!
//! This is a lexical parser, not a Java parser: it tracks braces, string
//! and char literals and comments well enough to split a class body into
//! members. Anything it cannot place becomes shared scaffolding.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::models::{TestCaseGeneratedByLlm, TestSuiteGeneratedByLlm};

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[^\n]*\n(.*?)```").expect("code fence regex is valid")
});

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(import\s+(?:static\s+)?[\w.*]+\s*;)").expect("import regex is valid")
});

static RUN_WITH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@RunWith\s*\(\s*([^)]*?)\s*\)").expect("run-with regex is valid")
});

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bclass\s+\w+[^{;]*\{").expect("class regex is valid")
});

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@[\w.]+(?:\s*\([^)]*\))?").expect("annotation regex is valid")
});

static TEST_ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(?:org\.junit\.)?Test\b").expect("test annotation regex is valid"));

static METHOD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s*\(").expect("method name regex is valid"));

static EXPECTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@Test\s*\(\s*expected\s*=\s*([\w.]+)\.class").expect("expected regex is valid")
});

static ASSERT_THROWS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"assertThrows\s*\(\s*([\w.]+)\.class").expect("assertThrows regex is valid")
});

/// Code between the first pair of ``` fences, or the whole text.
pub fn extract_code(raw_text: &str) -> &str {
    CODE_FENCE_RE
        .captures(raw_text)
        .and_then(|captures| captures.get(1))
        .map_or(raw_text, |code| code.as_str())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    Code,
    LineComment,
    BlockComment,
    Str,
    Char,
}

/// Walks Java source, reporting brace depth outside literals and comments.
struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    state: Lexeme,
    escaped: bool,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            state: Lexeme::Code,
            escaped: false,
        }
    }

    /// Next character that is structural code, with its byte offset.
    fn next_code_char(&mut self) -> Option<(usize, char)> {
        while let Some((index, ch)) = self.chars.next() {
            match self.state {
                Lexeme::Code => match ch {
                    '/' => match self.chars.peek() {
                        Some((_, '/')) => {
                            self.chars.next();
                            self.state = Lexeme::LineComment;
                        }
                        Some((_, '*')) => {
                            self.chars.next();
                            self.state = Lexeme::BlockComment;
                        }
                        _ => return Some((index, ch)),
                    },
                    '"' => self.state = Lexeme::Str,
                    '\'' => self.state = Lexeme::Char,
                    _ => return Some((index, ch)),
                },
                Lexeme::LineComment => {
                    if ch == '\n' {
                        self.state = Lexeme::Code;
                    }
                }
                Lexeme::BlockComment => {
                    if ch == '*' && matches!(self.chars.peek(), Some((_, '/'))) {
                        self.chars.next();
                        self.state = Lexeme::Code;
                    }
                }
                Lexeme::Str | Lexeme::Char => {
                    let closing = if self.state == Lexeme::Str { '"' } else { '\'' };
                    if self.escaped {
                        self.escaped = false;
                    } else if ch == '\\' {
                        self.escaped = true;
                    } else if ch == closing {
                        self.state = Lexeme::Code;
                    }
                }
            }
        }
        None
    }
}

/// Byte range of the body of the first class, between its braces.
///
/// An unterminated class runs to the end of the text.
fn class_body(code: &str) -> Option<&str> {
    let header = CLASS_RE.find(code)?;
    let body_start = header.end();
    let body = &code[body_start..];

    let mut depth = 1usize;
    let mut scanner = Scanner::new(body);
    while let Some((index, ch)) = scanner.next_code_char() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[..index]);
                }
            }
            _ => {}
        }
    }
    Some(body)
}

fn push_member(members: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    // `int[] xs = {1, 2};` closes on the brace, leaving a lone `;`.
    if text == ";" {
        if let Some(last) = members.last_mut() {
            last.push(';');
        }
        return;
    }
    members.push(text.to_string());
}

/// Split a class body into top-level members.
fn split_members(body: &str) -> Vec<String> {
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut scanner = Scanner::new(body);

    while let Some((index, ch)) = scanner.next_code_char() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    push_member(&mut members, &body[start..=index]);
                    start = index + 1;
                }
            }
            ';' if depth == 0 => {
                push_member(&mut members, &body[start..=index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    push_member(&mut members, &body[start..]);

    members
}

/// Annotations and signature of a member, i.e. everything before its body.
fn member_header(member: &str) -> &str {
    member.find('{').map_or(member, |brace| &member[..brace])
}

fn test_case_from_member(member: &str) -> Option<TestCaseGeneratedByLlm> {
    let header = member_header(member);
    if !TEST_ANNOTATION_RE.is_match(header) {
        return None;
    }

    let signature = ANNOTATION_RE.replace_all(header, "");
    let name = METHOD_NAME_RE
        .captures_iter(&signature)
        .last()
        .and_then(|captures| captures.get(1))?
        .as_str()
        .to_string();

    let expected_exception = EXPECTED_RE
        .captures(header)
        .or_else(|| ASSERT_THROWS_RE.captures(member))
        .and_then(|captures| captures.get(1))
        .map(|exception| exception.as_str().to_string());

    Some(TestCaseGeneratedByLlm {
        name,
        code: member.to_string(),
        expected_exception,
    })
}

/// Parses model output into a [`TestSuiteGeneratedByLlm`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JUnitTestSuiteParser;

impl JUnitTestSuiteParser {
    pub fn new() -> Self {
        Self
    }

    /// `None` when no class body can be found in the text.
    pub fn parse_test_suite(
        &self,
        raw_text: &str,
        package_name: &str,
    ) -> Option<TestSuiteGeneratedByLlm> {
        let code = extract_code(raw_text);
        let body = class_body(code)?;

        let imports = IMPORT_RE
            .captures_iter(code)
            .filter_map(|captures| captures.get(1))
            .map(|import| import.as_str().to_string())
            .collect();

        let run_with = RUN_WITH_RE
            .captures(code)
            .and_then(|captures| captures.get(1))
            .map(|runner| runner.as_str().to_string())
            .unwrap_or_default();

        let mut test_cases = Vec::new();
        let mut other_info = Vec::new();
        for member in split_members(body) {
            match test_case_from_member(&member) {
                Some(test_case) => test_cases.push(test_case),
                None => other_info.push(member),
            }
        }

        Some(TestSuiteGeneratedByLlm {
            package_string: package_name.to_string(),
            imports,
            run_with,
            other_info: other_info.join("\n\n"),
            test_cases,
        })
    }
}
