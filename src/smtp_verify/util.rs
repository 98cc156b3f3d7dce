use rand::{Rng, distributions::Alphanumeric};

/// Length of generated catch-all mailboxes: 36^12 possibilities.
pub const CATCH_ALL_LOCAL_LEN: usize = 12;

/// Random lowercase alphanumeric local part.
pub fn random_local_part(len: usize) -> String {
    let length = len.clamp(6, 64);
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}
