#![no_main]

use libfuzzer_sys::fuzz_target;
use sshtrail_auth_log::ingest::decode_latin1;
use sshtrail_auth_log::parser::AuthLogParser;

fuzz_target!(|data: &[u8]| {
    let Ok(parser) = AuthLogParser::new() else {
        return;
    };

    // 파일과 같은 경로: 임의 바이트 -> latin1 -> 파서
    let text = decode_latin1(data);
    let table = match parser.parse_log_data(&text, "fuzz", Some(2023)) {
        Ok(table) => table,
        Err(e) => panic!("valid log year must not fail: {e}"),
    };

    for event in &table {
        assert_eq!(event.session_id.len(), 64);
        assert!(event.domain.is_empty());
    }
});
