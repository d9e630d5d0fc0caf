#![no_main]

//! Arbitrary text must either parse into a configuration that passes
//! validation or fail with a `ConfigError`; never panic.

use agentready_core::config::parse_config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = parse_config(s) {
        assert!(config.validate().is_ok());
        let scorer = config.scorer().expect("validated config builds a scorer");
        assert!((scorer.weights().total() - 100.0).abs() <= agentready_score::WEIGHT_SUM_TOLERANCE);
    }
});
