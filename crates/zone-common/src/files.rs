// files.rs — bounded-retry file loading for hot-reloadable resources.
// Converted from: myq2-common/src/files.rs (fs_load_file), which returns
// an Option rather than propagating an io::Error up the hot path. Here
// the retry/backoff loop is pulled out explicitly because spec.md §4.6
// and §7 both call for it by name ("Open-file racing is tolerated with
// capped retry+backoff", "Resource... retry with backoff up to 10 times
// then log and continue with the last-known list").

use crate::log::zlog_warn;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

pub const MAX_LOAD_RETRIES: u32 = 10;

/// Reads the whole file at `path`, retrying up to `MAX_LOAD_RETRIES` times
/// with a short linear backoff if the file is transiently locked or
/// missing (e.g. mid-write by an external editor). Returns `None` (and
/// logs a warning) only after all retries are exhausted; callers are
/// expected to fall back to the last-known-good content.
pub fn load_file_with_retry(path: &Path) -> Option<Vec<u8>> {
    load_file_with_retry_sleep(path, |attempt| sleep(Duration::from_millis(20 * attempt as u64)))
}

/// Test seam: takes an explicit sleep function so retry-count tests don't
/// actually wait on wall-clock time.
pub fn load_file_with_retry_sleep(path: &Path, mut backoff: impl FnMut(u32)) -> Option<Vec<u8>> {
    let mut attempt = 0;
    loop {
        match std::fs::read(path) {
            Ok(bytes) => return Some(bytes),
            Err(err) => {
                attempt += 1;
                if attempt >= MAX_LOAD_RETRIES {
                    zlog_warn(&format!(
                        "giving up loading {} after {attempt} attempts: {err}",
                        path.display()
                    ));
                    return None;
                }
                backoff(attempt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_then_gives_up_on_missing_file() {
        let mut backoffs = 0;
        let result = load_file_with_retry_sleep(Path::new("/nonexistent/obscene.txt"), |_| {
            backoffs += 1;
        });
        assert!(result.is_none());
        assert_eq!(backoffs, MAX_LOAD_RETRIES - 1);
    }

    #[test]
    fn reads_existing_file_on_first_try() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("zone_common_test_{}.txt", std::process::id()));
        std::fs::write(&path, b"hello").unwrap();
        let mut backoffs = 0;
        let result = load_file_with_retry_sleep(&path, |_| backoffs += 1);
        assert_eq!(result, Some(b"hello".to_vec()));
        assert_eq!(backoffs, 0);
        let _ = std::fs::remove_file(&path);
    }
}
