//! Results must not depend on record order or pixel layout

mod common;

use approx::assert_abs_diff_eq;
use common::{config, grid, watershed, CELL};
use pyrodiversity_core::diversity::{community_metrics, TraitCommunity};
use pyrodiversity_core::{
    DayOfYear, FireHistory, FireRecord, Pipeline, Polygon, Raster, TraitMap, TraitSurface,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Random rectangular fire with per-cell severity
fn random_fire(rng: &mut StdRng, index: usize) -> FireRecord {
    let grid = grid();
    let (c0, r0) = (rng.random_range(0..3usize), rng.random_range(0..3usize));
    let (c1, r1) = (rng.random_range(c0 + 1..=4), rng.random_range(r0 + 1..=4));

    let mut severity = Raster::nodata(grid.clone());
    for row in r0..r1 {
        for col in c0..c1 {
            severity.set(row, col, Some(rng.random_range(0.2..3.0)));
        }
    }
    let perimeter = Polygon::rectangle(
        c0 as f64 * CELL,
        grid.ymax - r1 as f64 * CELL,
        c1 as f64 * CELL,
        grid.ymax - r0 as f64 * CELL,
    );

    FireRecord::new(
        format!("fire-{index}"),
        rng.random_range(2000..=2010),
        DayOfYear::new(rng.random_range(1..=365)).unwrap(),
        severity,
        perimeter,
    )
}

#[test]
fn test_record_order_does_not_matter() {
    let mut rng = StdRng::seed_from_u64(2024);
    let records: Vec<FireRecord> = (0..12).map(|i| random_fire(&mut rng, i)).collect();
    let pipeline = Pipeline::new(config()).unwrap();
    let landscapes = [watershed("w1", 0..4)];

    let baseline = pipeline
        .run(&FireHistory::with_records(grid(), records.clone()), &landscapes, None)
        .unwrap()
        .remove(0);

    for _ in 0..5 {
        let mut shuffled = records.clone();
        shuffled.shuffle(&mut rng);
        let report = pipeline
            .run(&FireHistory::with_records(grid(), shuffled), &landscapes, None)
            .unwrap()
            .remove(0);

        let pairs = baseline.surfaces.iter().zip(report.surfaces.iter());
        for ((kind, expected), (_, actual)) in pairs {
            for (a, b) in expected.raster.values().iter().zip(actual.raster.values()) {
                if a.is_nan() {
                    assert!(b.is_nan(), "{kind} NoData changed");
                } else {
                    assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
                }
            }
        }
        assert_eq!(report.result.richness, baseline.result.richness);
        assert_eq!(report.result.valid_pixels, baseline.result.valid_pixels);
        assert_abs_diff_eq!(
            report.result.dispersion.unwrap(),
            baseline.result.dispersion.unwrap(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_pixel_permutation_does_not_matter() {
    let mut rng = StdRng::seed_from_u64(7);
    let records: Vec<FireRecord> = (0..8).map(|i| random_fire(&mut rng, i)).collect();
    let pipeline = Pipeline::new(config()).unwrap();
    let report = pipeline
        .run(&FireHistory::with_records(grid(), records), &[watershed("w1", 0..4)], None)
        .unwrap()
        .remove(0);

    let mut order: Vec<usize> = (0..grid().len()).collect();
    order.shuffle(&mut rng);
    let permuted: TraitMap<TraitSurface> = report.quantized.by_ref().map(|_, surface| {
        let values = surface.raster.values();
        let data = order.iter().map(|&i| values[i]).collect();
        surface.with_raster(Raster::new(grid(), data).unwrap())
    });

    let original = TraitCommunity::from_surfaces(&report.quantized, None).unwrap();
    let shuffled = TraitCommunity::from_surfaces(&permuted, None).unwrap();
    assert_eq!(original.classes(), shuffled.classes());

    let a = community_metrics(&original).unwrap();
    let b = community_metrics(&shuffled).unwrap();
    assert_eq!(a.dispersion.to_bits(), b.dispersion.to_bits());
    assert_abs_diff_eq!(report.result.dispersion.unwrap(), a.dispersion, epsilon = 1e-12);
}

#[test]
fn test_dispersion_is_non_negative() {
    let mut rng = StdRng::seed_from_u64(99);
    let pipeline = Pipeline::new(config()).unwrap();
    for _ in 0..10 {
        let records: Vec<FireRecord> = (0..6).map(|i| random_fire(&mut rng, i)).collect();
        let report = pipeline
            .run(&FireHistory::with_records(grid(), records), &[watershed("w1", 0..4)], None)
            .unwrap()
            .remove(0);
        if let Some(dispersion) = report.result.dispersion {
            assert!(dispersion >= 0.0 && dispersion.is_finite());
        }
    }
}
