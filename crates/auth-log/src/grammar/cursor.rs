//! 공백 단위 토큰 커서
//!
//! 문법 규칙은 이 커서 위의 작은 조합자(combinator)로 작성됩니다.
//! 각 규칙은 토큰 하나를 소비하거나 [`GrammarError`]를 반환하며,
//! [`TokenCursor::optional`]은 실패 시 커서 위치를 되돌립니다.

use std::fmt;

/// 문법 불일치 에러
///
/// 실패한 토큰 위치와 기대한 규칙 이름을 담습니다.
/// 디스패처는 이 에러를 debug 로그로만 남기고 라인을 건너뜁니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    /// 실패한 토큰 인덱스 (0부터)
    pub position: usize,
    /// 기대한 규칙
    pub expected: String,
    /// 실제로 만난 토큰 (라인 끝이면 `None`)
    pub found: Option<String>,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(token) => write!(
                f,
                "expected {} at token {}, found '{}'",
                self.expected, self.position, token
            ),
            None => write!(
                f,
                "expected {} at token {}, found end of line",
                self.expected, self.position
            ),
        }
    }
}

impl std::error::Error for GrammarError {}

/// 라인을 토큰으로 분리합니다.
///
/// 구분자는 ASCII 공백(스페이스, 탭, CR, LF, FF)입니다.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_ascii_whitespace().collect()
}

/// 출력 가능한 ASCII 문자로만 이루어진 비어 있지 않은 토큰인지 확인합니다.
///
/// Latin-1 문자와 제어 문자는 토큰 구분자가 아니므로 토큰 안에 남고,
/// 그런 토큰은 어떤 단어 규칙에도 맞지 않습니다.
pub fn is_printable(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_graphic())
}

/// 토큰 슬라이스 위의 읽기 커서
///
/// `'t`는 토큰 벡터의 수명, `'a`는 원본 라인의 수명입니다.
/// 캡처한 토큰은 원본 라인을 빌립니다.
#[derive(Debug, Clone, Copy)]
pub struct TokenCursor<'t, 'a> {
    tokens: &'t [&'a str],
    pos: usize,
}

impl<'t, 'a> TokenCursor<'t, 'a> {
    pub fn new(tokens: &'t [&'a str]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// 현재 위치 (소비한 토큰 수)
    pub fn position(&self) -> usize {
        self.pos
    }

    /// 남은 토큰 수
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    /// 현재 위치에서 실패를 만듭니다.
    pub fn error(&self, expected: impl Into<String>) -> GrammarError {
        GrammarError {
            position: self.pos,
            expected: expected.into(),
            found: self.tokens.get(self.pos).map(|t| (*t).to_owned()),
        }
    }

    /// 조건을 만족하는 토큰 하나를 소비합니다.
    pub fn token_where(
        &mut self,
        expected: &str,
        accept: impl Fn(&str) -> bool,
    ) -> Result<&'a str, GrammarError> {
        match self.tokens.get(self.pos) {
            Some(&token) if accept(token) => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error(expected)),
        }
    }

    /// 출력 가능한 ASCII 문자(`!`..`~`)로만 이루어진 토큰 하나를 소비합니다.
    pub fn word(&mut self, expected: &str) -> Result<&'a str, GrammarError> {
        self.token_where(expected, is_printable)
    }

    /// 정확히 일치하는 키워드를 소비합니다 (대소문자 구분).
    pub fn literal(&mut self, keyword: &str) -> Result<(), GrammarError> {
        self.token_where(&format!("'{keyword}'"), |t| t == keyword)
            .map(|_| ())
    }

    /// 최대 `max_len` 자리의 10진수 토큰을 소비합니다.
    pub fn digits(&mut self, expected: &str, max_len: usize) -> Result<&'a str, GrammarError> {
        self.token_where(expected, |t| {
            !t.is_empty() && t.len() <= max_len && t.bytes().all(|b| b.is_ascii_digit())
        })
    }

    /// 규칙을 시도하고, 실패하면 커서를 되돌린 뒤 `None`을 반환합니다.
    pub fn optional<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, GrammarError>,
    ) -> Option<T> {
        let mut attempt = *self;
        match rule(&mut attempt) {
            Ok(value) => {
                *self = attempt;
                Some(value)
            }
            Err(_) => None,
        }
    }

    /// 라인 끝이어야 합니다.
    pub fn end(&self) -> Result<(), GrammarError> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(self.error("end of line"))
        }
    }
}
