use super::*;

#[test]
fn test_semantic_encoding() {
    assert_eq!(
        to_stored_version(true, "1.2.3", "20220101000000").unwrap(),
        "0001.0002.0003-20220101000000"
    );
    assert_eq!(to_stored_version(true, "10.0.1", "").unwrap(), "0010.0000.0001-");
}

#[test]
fn test_legacy_encoding() {
    assert_eq!(
        to_stored_version(false, "20220101000000", "").unwrap(),
        "0000.0000.0000-20220101000000"
    );
    assert!(to_stored_version(false, "", "").is_err());
}

#[test]
fn test_rejects_out_of_range() {
    assert!(to_stored_version(true, "10000.0.0", "").is_err());
    assert!(to_stored_version(true, "1.2.3-beta", "").is_err());
    assert!(to_stored_version(true, "0.0.0", "").is_err());
    assert!(to_stored_version(true, "1.2", "").is_err());
}

#[test]
fn test_decode_semantic() {
    let decoded = from_stored_version("0001.0020.0300-abc").unwrap();
    assert!(decoded.use_semantic_version);
    assert_eq!(decoded.version, "1.20.300");
    assert_eq!(decoded.suffix, "abc");
}

#[test]
fn test_decode_legacy() {
    let decoded = from_stored_version("0000.0000.0000-v7_add_users").unwrap();
    assert!(!decoded.use_semantic_version);
    assert_eq!(decoded.version, "v7_add_users");
    assert!(decoded.suffix.is_empty());
}

#[test]
fn test_decode_unprefixed_legacy_is_typed_error() {
    for stored in ["20220101000000", "1.2.3-x", "001.0002.0003-", "0001.0002-"] {
        let err = from_stored_version(stored).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidStoredVersion { .. }),
            "{stored}: {err}"
        );
        assert!(err.to_string().contains("invalid stored version"));
    }
}

#[test]
fn test_encoding_preserves_order() {
    let legacy = ["20210101000000", "20220101000000"];
    let semantic = ["1.0.0", "1.0.10", "1.2.0", "2.0.0", "10.0.0"];

    let mut stored: Vec<String> = legacy
        .iter()
        .map(|v| to_stored_version(false, v, "").unwrap())
        .collect();
    stored.extend(
        semantic
            .iter()
            .map(|v| to_stored_version(true, v, "").unwrap()),
    );

    let mut sorted = stored.clone();
    sorted.sort();
    assert_eq!(sorted, stored);

    let decoded: Vec<String> = sorted
        .iter()
        .map(|s| from_stored_version(s).unwrap().version)
        .collect();
    assert_eq!(
        decoded,
        vec![
            "20210101000000",
            "20220101000000",
            "1.0.0",
            "1.0.10",
            "1.2.0",
            "2.0.0",
            "10.0.0"
        ]
    );
}

#[test]
fn test_is_semantic() {
    assert!(is_semantic("1.2.3"));
    assert!(!is_semantic("1.2.3-rc1"));
    assert!(!is_semantic("20220101"));
}
