//! Cache keys over the shared marker fixtures.

use std::collections::HashSet;

use storage::CacheKey;
use test_utils::fixtures::{icons, specs};

fn fixture_specs() -> Vec<marker_common::MarkerSpec> {
    vec![
        specs::short_label(),
        specs::one_char(),
        specs::five_chars(),
        specs::price(),
        specs::price_with_pointer(),
        specs::price_with_counter(),
        specs::with_house_icon(),
        specs::full(),
        specs::special_with_icon(),
        specs::broken_icon(),
    ]
}

#[test]
fn test_every_fixture_has_its_own_key() {
    let specs = fixture_specs();
    let keys: HashSet<CacheKey> = specs.iter().map(CacheKey::marker).collect();
    assert_eq!(keys.len(), specs.len());
}

#[test]
fn test_state_and_icon_change_the_key() {
    let base = specs::price();
    let variants = [
        base.clone().selected(true),
        base.clone().visualized(true),
        base.clone().with_pointer(!base.has_pointer),
        base.clone().with_icon(icons::star()),
        base.clone().with_icon(icons::house()),
    ];
    let base_key = CacheKey::marker(&base);
    for spec in &variants {
        assert_ne!(CacheKey::marker(spec), base_key, "{:?}", spec);
    }
}

#[test]
fn test_frame_keys_depend_on_direction() {
    let (a, b) = (specs::one_char(), specs::five_chars());
    assert_ne!(CacheKey::frame(&a, &b, 0.5), CacheKey::frame(&b, &a, 0.5));
    assert_eq!(CacheKey::frame(&a, &b, 0.5), CacheKey::frame(&a, &b, 0.5));
}
