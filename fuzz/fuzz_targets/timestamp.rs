#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sshtrail_auth_log::timestamp;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 날짜/시각 토큰 (0개 이상)
    tokens: Vec<String>,
    /// 로그 연도 (허용 범위로 접어서 사용)
    year: u16,
}

fuzz_target!(|input: FuzzInput| {
    let year = 1970 + i32::from(input.year % 8030);
    let tokens: Vec<&str> = input.tokens.iter().map(String::as_str).collect();

    if let Some(datetime) = timestamp::normalize_tokens(&tokens, year) {
        let _ = timestamp::epoch_seconds(&datetime);
    }
});
