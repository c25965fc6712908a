//! Identifier helpers

use bech32::Bech32m;
use uuid7::uuid7;

const ATTEMPT_HRP: &str = "attempt";

// a time-ordered uuid7 encoded as bech32m, e.g. attempt1qq...
pub fn new_attempt_id() -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(ATTEMPT_HRP)?;
    let encoded = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encoded)
}
