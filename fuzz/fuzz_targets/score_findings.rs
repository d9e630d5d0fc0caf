#![no_main]

//! Any finding list that deserializes must score within [0, 100].

use agentready_score::Scorer;
use agentready_types::Finding;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(findings) = serde_json::from_slice::<Vec<Finding>>(data) else {
        return;
    };
    let card = Scorer::default().score_findings(&findings);
    assert!(card.overall.is_finite());
    assert!((0.0..=100.0).contains(&card.overall), "overall {}", card.overall);
});
