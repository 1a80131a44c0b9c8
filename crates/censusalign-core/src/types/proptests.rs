//! Property-based tests for core types.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::types::{GeoId, Level};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_block_normalization_width(raw in "[0-9]{14}") {
            let id = GeoId::block(&raw).unwrap();
            prop_assert_eq!(id.as_str().len(), 15);
            prop_assert!(id.as_str().starts_with('0'));
            prop_assert_eq!(&id.as_str()[1..], raw.as_str());
        }

        #[test]
        fn test_normalization_is_idempotent(raw in "[0-9]{14}") {
            let once = GeoId::block(&raw).unwrap();
            let twice = GeoId::block(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_truncate_is_monotone(raw in "[0-9]{15}") {
            let block = GeoId::block(&raw).unwrap();
            let via_tract = block
                .truncate(Level::Tract)
                .unwrap()
                .truncate(Level::County)
                .unwrap();
            let direct = block.truncate(Level::County).unwrap();
            prop_assert_eq!(via_tract, direct);
        }

        #[test]
        fn test_truncate_widths(raw in "[0-9]{15}") {
            let block = GeoId::block(&raw).unwrap();
            for level in Level::all() {
                let id = block.truncate(level).unwrap();
                prop_assert_eq!(id.as_str().len(), level.prefix_len());
                prop_assert_eq!(id.level(), Some(level));
            }
        }
    }
}
