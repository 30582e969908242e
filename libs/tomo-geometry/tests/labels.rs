use tomo_geometry::{
    build_surfaces, build_surfaces_from_labels, AnnotationSource, GeometryError, LabelParams,
    SurfaceOptions, Volume,
};

/// A flat disk of label 1, radius 30, spanning display z 40..=60.
fn slab_volume() -> Volume<u32> {
    Volume::from_fn([100, 100, 100], [1.0; 3], |z, y, x| {
        let d = (y as f64 - 50.0).hypot(x as f64 - 50.0);
        u32::from((40..=60).contains(&z) && d <= 30.0)
    })
}

/// A disk of label 1, radius 30, segmented in the single display slice z = 50.
fn planar_disk_volume() -> Volume<u32> {
    Volume::from_fn([100, 100, 100], [1.0; 3], |z, y, x| {
        let d = (y as f64 - 50.0).hypot(x as f64 - 50.0);
        u32::from(z == 50 && d <= 30.0)
    })
}

/// A ball of label 1, radius 30, centred in the volume.
fn ball_volume() -> Volume<u32> {
    Volume::from_fn([100, 100, 100], [1.0; 3], |z, y, x| {
        let d = ((z as f64 - 50.0).powi(2) + (y as f64 - 50.0).powi(2) + (x as f64 - 50.0).powi(2))
            .sqrt();
        u32::from(d <= 30.0)
    })
}

fn params() -> LabelParams {
    LabelParams {
        axis: 0,
        slicing_step: 10,
        sampling_step: 10,
    }
}

#[test]
fn slab_label_yields_one_closed_surface() {
    let volume = slab_volume();
    let mut outcome = build_surfaces_from_labels(&volume, 5.0, params(), None, true).unwrap();
    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.skipped, 0);

    let grid = &mut outcome.items[0];
    // One contour per slice at z = 40, 50, 60.
    assert_eq!(grid.lines().len(), 3);
    let samples = grid.samples().unwrap();
    // Columns span 20 pixels at separation 5.
    assert_eq!(samples.rows(), 5);
    assert!(samples.wraps());
    assert_eq!(samples.valid_count(), samples.rows() * samples.cols());
}

#[test]
fn slab_contours_stay_on_the_disk_rim() {
    let volume = slab_volume();
    let mut outcome = build_surfaces_from_labels(&volume, 5.0, params(), None, true).unwrap();
    let samples = outcome.items[0].samples().unwrap();
    for p in samples.positions() {
        let r = (p.x - 50.0).hypot(p.y - 50.0);
        assert!((29.0..=31.5).contains(&r), "radius {r}");
        assert!((40.0 - 1e-9..=60.0 + 1e-9).contains(&p.z));
    }
}

#[test]
fn ball_label_drops_short_tip_contours() {
    let volume = ball_volume();
    let mut outcome = build_surfaces_from_labels(&volume, 5.0, params(), None, true).unwrap();
    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.skipped, 0);

    let grid = &mut outcome.items[0];
    // The single-pixel tips at z = 20 and 80 subsample to one point each.
    assert_eq!(grid.lines().len(), 5);
    let samples = grid.samples().unwrap();
    assert!(samples.wraps());
    for p in samples.positions() {
        let r = (*p - glam::DVec3::splat(50.0)).length();
        assert!((26.0..=32.0).contains(&r), "radius {r}");
    }
}

#[test]
fn planar_disk_label_yields_one_surface() {
    let volume = planar_disk_volume();
    for closed in [true, false] {
        let mut outcome = build_surfaces_from_labels(&volume, 5.0, params(), None, closed).unwrap();
        assert_eq!(outcome.len(), 1, "closed = {closed}");
        assert_eq!(outcome.skipped, 0);

        let grid = &mut outcome.items[0];
        // Re-sliced along display y: rows 30..=70 cross the disk, the
        // single-pixel rows at 20 and 80 are dropped.
        assert_eq!(grid.lines().len(), 5);
        let samples = grid.samples().unwrap();
        assert_eq!(samples.wraps(), closed);
        for p in samples.positions() {
            assert!((p.z - 50.0).abs() <= 2.0, "z {}", p.z);
            assert!((p.x - 50.0).hypot(p.y - 50.0) <= 32.0);
        }
    }
}

#[test]
fn planar_disk_label_along_in_plane_axis() {
    let volume = planar_disk_volume();
    let params = LabelParams {
        axis: 1,
        ..params()
    };
    let outcome = build_surfaces_from_labels(&volume, 5.0, params, None, true).unwrap();
    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.items[0].lines().len(), 5);
}

#[test]
fn speck_label_is_not_a_surface() {
    let volume = Volume::from_fn([30, 30, 30], [1.0; 3], |z, y, x| {
        u32::from(z == 10 && y == 10 && x == 10)
    });
    let err = build_surfaces_from_labels(&volume, 5.0, params(), None, true).unwrap_err();
    assert!(matches!(err, GeometryError::NoGeometryGenerated { skipped: 1, .. }));
}

#[test]
fn label_source_dispatches_through_the_tag() {
    let source = AnnotationSource::LabelVolume(slab_volume(), params());
    let options = SurfaceOptions {
        separation: 5.0,
        inside_point: None,
        closed: true,
    };
    let outcome = build_surfaces(&source, &options).unwrap();
    assert_eq!(outcome.colors.len(), 1);
    assert_eq!(outcome.colors[0][3], 1.0);
}
