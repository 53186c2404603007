//! Property tests for the timestamp staleness predicate.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use proptest::prelude::*;

use venvstamp::graph::staleness::{check, decide};
use venvstamp::Staleness;

fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: stale exactly when the manifest is strictly newer.
    #[test]
    fn property_stale_iff_manifest_newer(manifest in 0u64..10_000, sentinel in 0u64..10_000) {
        let state = decide(Some(at(sentinel)), [(Path::new("requirements.txt"), at(manifest))]);
        prop_assert_eq!(state.is_stale(), manifest > sentinel);
    }

    /// PROPERTY: a missing sentinel is always stale, whatever the inputs.
    #[test]
    fn property_missing_output_always_stale(inputs in proptest::collection::vec(0u64..10_000, 0..5)) {
        let names: Vec<String> = (0..inputs.len()).map(|i| format!("in{i}")).collect();
        let stamped = names
            .iter()
            .zip(&inputs)
            .map(|(name, secs)| (Path::new(name.as_str()), at(*secs)));
        prop_assert_eq!(decide(None, stamped), Staleness::OutputMissing);
    }

    /// PROPERTY: with several inputs, stale iff any one is newer.
    #[test]
    fn property_any_newer_input_makes_stale(
        output in 0u64..10_000,
        inputs in proptest::collection::vec(0u64..10_000, 1..5),
    ) {
        let names: Vec<String> = (0..inputs.len()).map(|i| format!("in{i}")).collect();
        let stamped = names
            .iter()
            .zip(&inputs)
            .map(|(name, secs)| (Path::new(name.as_str()), at(*secs)));
        let expected = inputs.iter().any(|secs| *secs > output);
        prop_assert_eq!(decide(Some(at(output)), stamped).is_stale(), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the on-disk check agrees with the pure predicate.
    #[test]
    fn property_disk_check_matches_decide(manifest in 1i64..100_000, sentinel in 1i64..100_000) {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("requirements.txt");
        let sentinel_path = dir.path().join(".stamp");
        fs::write(&manifest_path, "requests\n").unwrap();
        fs::write(&sentinel_path, "").unwrap();
        set_file_mtime(&manifest_path, FileTime::from_unix_time(manifest, 0)).unwrap();
        set_file_mtime(&sentinel_path, FileTime::from_unix_time(sentinel, 0)).unwrap();

        let state = check(&sentinel_path, std::slice::from_ref(&manifest_path)).unwrap();
        prop_assert_eq!(state.is_stale(), manifest > sentinel);
    }
}
