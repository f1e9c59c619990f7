#![no_main]

use libfuzzer_sys::fuzz_target;
use sshtrail_auth_log::grammar::{self, MessageKind};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    for kind in MessageKind::ALL {
        let _ = grammar::parse_line(kind, line);
    }
});
