// THEORY:
// The `change_analyzer` turns a sparse `DifferenceRaster` into a short list of
// meaningful "changes". It delegates grouping to the `component_labeler` and then
// applies the noise policy: any component whose area does not strictly exceed the
// configured `min_area` is treated as noise and dropped. Survivors are renumbered
// 1, 2, ... in the order the labeler discovered them, which makes the report
// deterministic and directly comparable across runs.

use crate::core_modules::component_labeler::component_labeler::label_components;
use crate::core_modules::component_labeler::{BoundingBox, ComponentId};
use crate::core_modules::difference_map::DifferenceRaster;
use serde::Serialize;

/// Components with an area at or below this many pixels are considered noise.
pub const DEFAULT_MIN_AREA: usize = 50;

/// One significant change: a connected component that survived area filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    /// 1-based id, assigned after filtering in labeling order.
    pub change_id: ComponentId,
    /// Area of the change in pixels.
    pub pixels: usize,
    pub bounding_box: BoundingBox,
}

/// The ordered list of changes produced by one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeReport {
    changes: Vec<ChangeRecord>,
}

impl ChangeReport {
    pub fn num_changes(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[ChangeRecord] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<ChangeRecord> {
        self.changes
    }

    /// Sum of the areas of all reported changes.
    pub fn total_pixels(&self) -> usize {
        self.changes.iter().map(|change| change.pixels).sum()
    }
}

/// Groups the raster's significant cells into 8-connected changes and keeps those
/// whose area is strictly greater than `min_area`.
pub fn analyze_changes(raster: &DifferenceRaster, min_area: usize) -> ChangeReport {
    let changes = label_components(raster)
        .into_components()
        .into_iter()
        .filter(|component| component.area > min_area)
        .zip(1..)
        .map(|(component, change_id)| ChangeRecord {
            change_id,
            pixels: component.area,
            bounding_box: component.bounding_box,
        })
        .collect();

    ChangeReport { changes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raster_with_block(width: u32, height: u32, block_w: u32, block_h: u32) -> DifferenceRaster {
        let mut cells = vec![0u8; (width * height) as usize];
        for y in 0..block_h {
            for x in 0..block_w {
                cells[(y * width + x) as usize] = 255;
            }
        }
        DifferenceRaster::from_raw(width, height, cells).unwrap()
    }

    #[test]
    fn corner_block_end_to_end() {
        let raster = raster_with_block(4, 4, 3, 3);

        let report = analyze_changes(&raster, 5);
        assert_eq!(report.num_changes(), 1);
        assert_eq!(report.changes()[0].change_id, 1);
        assert_eq!(report.changes()[0].pixels, 9);

        let report = analyze_changes(&raster, 10);
        assert_eq!(report.num_changes(), 0);
        assert!(report.is_empty());
    }

    #[test]
    fn area_equal_to_floor_is_noise() {
        // A 10x5 block has an area of exactly 50.
        let at_floor = raster_with_block(20, 20, 10, 5);
        assert_eq!(analyze_changes(&at_floor, DEFAULT_MIN_AREA).num_changes(), 0);

        let mut cells = at_floor.as_raw().to_vec();
        cells[10] = 7; // (10, 0) extends the block to 51 pixels.
        let above_floor = DifferenceRaster::from_raw(20, 20, cells).unwrap();
        let report = analyze_changes(&above_floor, DEFAULT_MIN_AREA);
        assert_eq!(report.num_changes(), 1);
        assert_eq!(report.changes()[0].pixels, 51);
    }

    #[test]
    fn diagonal_pixels_merge_with_zero_floor() {
        let raster = DifferenceRaster::from_raw(2, 2, vec![9, 0, 0, 9]).unwrap();
        let report = analyze_changes(&raster, 0);
        assert_eq!(report.num_changes(), 1);
        assert_eq!(report.changes()[0].pixels, 2);
    }

    #[test]
    fn single_pixel_is_dropped_by_default_floor() {
        let raster = DifferenceRaster::from_raw(3, 3, vec![0, 0, 0, 0, 200, 0, 0, 0, 0]).unwrap();
        assert!(analyze_changes(&raster, DEFAULT_MIN_AREA).is_empty());
    }

    #[test]
    fn all_background_reports_nothing() {
        let raster = DifferenceRaster::from_raw(16, 16, vec![0; 256]).unwrap();
        let report = analyze_changes(&raster, 0);
        assert_eq!(report.num_changes(), 0);
        assert_eq!(report.total_pixels(), 0);
    }

    #[test]
    fn all_foreground_is_one_change() {
        let raster = DifferenceRaster::from_raw(12, 10, vec![1; 120]).unwrap();
        let report = analyze_changes(&raster, DEFAULT_MIN_AREA);
        assert_eq!(report.num_changes(), 1);
        assert_eq!(report.changes()[0].pixels, 120);
    }

    #[test]
    fn ids_are_renumbered_after_filtering() {
        // Row 0: a 1-pixel speck at x=0, then a 3-pixel bar at x=2..=4.
        // Row 2: a 4-pixel bar.
        #[rustfmt::skip]
        let cells = vec![
            1, 0, 1, 1, 1, 0,
            0, 0, 0, 0, 0, 0,
            1, 1, 1, 1, 0, 0,
        ];
        let raster = DifferenceRaster::from_raw(6, 3, cells).unwrap();
        let report = analyze_changes(&raster, 1);
        let summary: Vec<_> = report
            .changes()
            .iter()
            .map(|change| (change.change_id, change.pixels))
            .collect();
        assert_eq!(summary, vec![(1, 3), (2, 4)]);
    }

    #[test]
    fn serializes_as_plain_list() {
        let raster = raster_with_block(3, 3, 2, 1);
        let json = serde_json::to_value(analyze_changes(&raster, 0)).unwrap();
        assert_eq!(json[0]["change_id"], 1);
        assert_eq!(json[0]["pixels"], 2);
        assert_eq!(json[0]["bounding_box"]["max_x"], 1);
    }

    fn binary_raster() -> impl Strategy<Value = DifferenceRaster> {
        (1u32..10, 1u32..10).prop_flat_map(|(width, height)| {
            prop::collection::vec(prop::bool::ANY, (width * height) as usize).prop_map(
                move |bits| {
                    let cells = bits.into_iter().map(|on| if on { 100 } else { 0 }).collect();
                    DifferenceRaster::from_raw(width, height, cells).unwrap()
                },
            )
        })
    }

    proptest! {
        #[test]
        fn counts_are_consistent(raster in binary_raster(), min_area in 0usize..12) {
            let report = analyze_changes(&raster, min_area);
            prop_assert_eq!(report.num_changes(), report.changes().len());
            prop_assert!(report.total_pixels() <= raster.foreground_count());
            for (expected_id, change) in (1..).zip(report.changes()) {
                prop_assert_eq!(change.change_id, expected_id);
                prop_assert!(change.pixels > min_area);
            }
        }

        #[test]
        fn zero_floor_accounts_for_every_foreground_cell(raster in binary_raster()) {
            let report = analyze_changes(&raster, 0);
            prop_assert_eq!(report.total_pixels(), raster.foreground_count());
        }

        #[test]
        fn analysis_is_deterministic(raster in binary_raster(), min_area in 0usize..6) {
            prop_assert_eq!(analyze_changes(&raster, min_area), analyze_changes(&raster, min_area));
        }
    }
}
