//! Integration smoke tests for `degree_forecast`

use degree_forecast::core::input::load_gradebook;
use degree_forecast::get_version;

#[test]
fn version_is_not_empty() {
    let v = get_version();
    assert!(!v.trim().is_empty());
}

#[test]
fn bundled_sample_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/samples/units.yml");
    let gradebook = load_gradebook(path).expect("sample gradebook should load");

    assert_eq!(gradebook.units.len(), 4);
    assert_eq!(gradebook.total_credits(), 120);
    assert_eq!(gradebook.bands().len(), 4);
}
