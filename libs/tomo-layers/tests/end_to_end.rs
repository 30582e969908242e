use approx::assert_relative_eq;
use config::constants::{
    DEFAULT_PARTICLE_SPACING_A, DEFAULT_RESAMPLE_SPACING_A, DEFAULT_RESAMPLE_THICKNESS_A,
    DEFAULT_SURFACE_SPACING_A,
};
use tomo_geometry::frames::euler_zyz_degrees;
use tomo_geometry::{GeometryError, Volume};
use tomo_layers::actions::{self, FilamentParticleParams};
use tomo_layers::{
    Geometry, GeometryKind, LayerData, LayerError, LayerId, LayerKind, LayerProperties,
    LayerStore, Payload, Shading, ShapeType, ShapesPayload,
};
use tracing_subscriber::EnvFilter;

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Three straight lines in the display plane z = 50, pixel size 2 Å.
fn planar_annotations(store: &mut LayerStore) -> LayerId {
    planar_annotations_at(store, 2.0)
}

fn planar_annotations_at(store: &mut LayerStore, pixel_size: f64) -> LayerId {
    let shapes = ShapesPayload {
        paths: (0..3)
            .map(|i| {
                let y = 10.0 + 10.0 * i as f64;
                vec![[50.0, y, 10.0], [50.0, y, 90.0]]
            })
            .collect(),
        group_ids: vec![0; 3],
        colors: vec![RED; 3],
    };
    store.insert(LayerData::shapes(shapes, "TS_01", [pixel_size; 3]))
}

fn tomogram(store: &mut LayerStore) -> LayerId {
    tomogram_at(store, 2.0)
}

fn tomogram_at(store: &mut LayerStore, pixel_size: f64) -> LayerId {
    let volume = Volume::from_fn([100, 100, 100], [pixel_size; 3], |_, _, _| 1.0_f32);
    store.insert(LayerData::image(volume, "TS_01"))
}

fn particle_rows(store: &LayerStore, id: LayerId) -> &tomo_layers::ParticleRows {
    match store.get(id).unwrap().payload() {
        Payload::Particles(rows) => rows,
        other => panic!("expected particles, got {:?}", other.kind()),
    }
}

#[test]
fn surface_from_polylines() {
    init_tracing();
    let mut store = LayerStore::new();
    let shapes = planar_annotations(&mut store);

    let surface = actions::generate_surface(&mut store, shapes, None, 20.0, false).unwrap();
    let layer = store.get(surface).unwrap();
    assert_eq!(layer.kind(), LayerKind::Surface);
    assert_eq!(layer.name(), "TS_01 - surface");
    let properties = layer.properties();
    assert_eq!(properties.scale, [2.0; 3]);
    assert_eq!(properties.metadata.experiment_id.as_deref(), Some("TS_01"));
    assert_eq!(properties.metadata.geometry, Some(GeometryKind::SurfaceGrids));
    assert_eq!(properties.metadata.colors.as_deref(), Some(&[RED][..]));
    assert_eq!(properties.hints.shading, Some(Shading::Smooth));

    let Payload::Surface(mesh) = layer.payload() else {
        panic!("expected a surface payload");
    };
    assert!(!mesh.faces.is_empty());
    assert_eq!(mesh.values.len(), mesh.vertices.len());
    // A single color shifts every value off the background entry.
    assert!(mesh.values.iter().all(|&v| v == 1.0));
    for v in &mesh.vertices {
        assert_relative_eq!(v[0], 50.0, epsilon = 1e-6);
    }
}

#[test]
fn surface_particles_share_the_grid() {
    init_tracing();
    let mut store = LayerStore::new();
    let shapes = planar_annotations(&mut store);
    let surface = actions::generate_surface(&mut store, shapes, None, 20.0, false).unwrap();

    let dense = actions::surface_particles(&mut store, surface, 20.0, true).unwrap();
    let points = store.get(dense.points).unwrap();
    assert_eq!(points.name(), "TS_01 - particle positions (surface picked)");
    assert_eq!(points.properties().hints.face_color.as_deref(), Some("surface_id"));
    let dense_count = particle_rows(&store, dense.points).len();
    assert!(dense_count > 0);
    assert_eq!(store.get(dense.vectors).unwrap().kind(), LayerKind::Vectors);

    let sparse = actions::surface_particles(&mut store, surface, 40.0, true).unwrap();
    let sparse_count = particle_rows(&store, sparse.points).len();
    assert!(sparse_count < dense_count);

    // The stored grid keeps the last spacing, in pixels.
    let Geometry::SurfaceGrids(grids) = store.geometry(surface, "test").unwrap() else {
        panic!("expected surface grids");
    };
    assert_relative_eq!(grids[0].separation(), 20.0);
}

#[test]
fn resample_along_surface_layer() {
    init_tracing();
    let mut store = LayerStore::new();
    let shapes = planar_annotations(&mut store);
    let image = tomogram(&mut store);
    let surface = actions::generate_surface(&mut store, shapes, None, 20.0, false).unwrap();

    let outputs = actions::resample_surface(&mut store, surface, image, 4.0, 20.0, false).unwrap();
    assert_eq!(outputs.len(), 1);
    let layer = store.get(outputs[0]).unwrap();
    assert_eq!(layer.name(), "TS_01 - surface_0 resampled");
    assert_eq!(layer.properties().metadata.stack, Some(false));
    assert_eq!(layer.properties().scale, [4.0; 3]);

    let Payload::Image(volume) = layer.payload() else {
        panic!("expected an image payload");
    };
    // 10 pixels of thickness at 2 pixel spacing.
    assert_eq!(volume.shape()[0], 5);
    for &value in volume.data() {
        assert_relative_eq!(value, 1.0, epsilon = 1e-5);
    }
}

#[test]
fn default_parameters_at_ten_angstrom_pixels() {
    init_tracing();
    let mut store = LayerStore::new();
    let shapes = planar_annotations_at(&mut store, 10.0);
    let image = tomogram_at(&mut store, 10.0);

    let surface =
        actions::generate_surface(&mut store, shapes, None, DEFAULT_SURFACE_SPACING_A, false).unwrap();
    let particles =
        actions::surface_particles(&mut store, surface, DEFAULT_PARTICLE_SPACING_A, false).unwrap();
    assert!(!particle_rows(&store, particles.points).is_empty());

    let outputs = actions::resample_surface(
        &mut store,
        surface,
        image,
        DEFAULT_RESAMPLE_SPACING_A,
        DEFAULT_RESAMPLE_THICKNESS_A,
        false,
    )
    .unwrap();
    let Payload::Image(volume) = store.get(outputs[0]).unwrap().payload() else {
        panic!("expected an image payload");
    };
    // 20 pixels of thickness at half-pixel spacing.
    assert_eq!(volume.shape()[0], 40);
    assert_eq!(volume.scale(), [5.0; 3]);
}

#[test]
fn filament_actions() {
    init_tracing();
    let mut store = LayerStore::new();
    let picks = store.insert(LayerData::points(
        vec![[10.0, 50.0, 50.0], [90.0, 50.0, 50.0]],
        "TS_01",
        [2.0; 3],
    ));
    let image = tomogram(&mut store);

    let filament = actions::generate_filament(&mut store, picks).unwrap();
    let layer = store.get(filament).unwrap();
    assert_eq!(layer.kind(), LayerKind::Shapes);
    assert_eq!(layer.name(), "TS_01 - filament");
    assert_eq!(layer.properties().hints.shape_type, Some(ShapeType::Path));
    let Payload::Shapes(shapes) = layer.payload() else {
        panic!("expected shapes");
    };
    assert_eq!(shapes.paths.len(), 1);
    assert_eq!(shapes.paths[0].len(), 100);

    let params = FilamentParticleParams {
        rise_a: 20.0,
        ..FilamentParticleParams::default()
    };
    let particles = actions::filament_particles(&mut store, filament, &params).unwrap();
    let rows = particle_rows(&store, particles.points);
    assert_eq!(rows.len(), 9);
    for (i, p) in rows.positions.iter().enumerate() {
        assert_relative_eq!(p[0], 10.0 + 10.0 * i as f64, epsilon = 1e-6);
        assert_relative_eq!(p[1], 50.0, epsilon = 1e-6);
    }

    let resampled = actions::resample_filament(&mut store, filament, image, 4.0, 20.0).unwrap();
    let layer = store.get(resampled).unwrap();
    assert_eq!(layer.name(), "TS_01 - filament resampled");
    let Payload::Image(volume) = layer.payload() else {
        panic!("expected an image payload");
    };
    assert_eq!(volume.shape(), [41, 5, 5]);
}

#[test]
fn sphere_actions() {
    init_tracing();
    let mut store = LayerStore::new();
    let picks = store.insert(LayerData::points(
        vec![[50.0, 50.0, 50.0], [50.0, 50.0, 60.0], [10.0, 10.0, 10.0]],
        "TS_01",
        [2.0; 3],
    ));

    let spheres = actions::generate_spheres(&mut store, picks).unwrap();
    let layer = store.get(spheres).unwrap();
    assert_eq!(layer.kind(), LayerKind::Surface);
    assert_eq!(layer.properties().hints.shading, Some(Shading::Flat));
    assert_eq!(layer.properties().metadata.geometry, Some(GeometryKind::Spheres));

    let particles = actions::sphere_particles(&mut store, spheres, 4.0).unwrap();
    assert_eq!(
        store.get(particles.points).unwrap().name(),
        "TS_01 - particle positions (spheres picked)"
    );
    // round(4π · 10² / 2²)
    assert_eq!(particle_rows(&store, particles.points).len(), 314);
}

#[test]
fn surface_from_labels() {
    init_tracing();
    let mut store = LayerStore::new();
    let volume = Volume::from_fn([100, 100, 100], [1.0; 3], |z, y, x| {
        let d = (y as f64 - 50.0).hypot(x as f64 - 50.0);
        u32::from((40..=60).contains(&z) && d <= 30.0)
    });
    let labels = store.insert(LayerData::labels(volume, "TS_02"));

    let inside = store.insert(LayerData::points(vec![[50.0, 50.0, 50.0]], "TS_02", [1.0; 3]));

    let surface = actions::generate_surface(&mut store, labels, Some(inside), 5.0, true).unwrap();
    let layer = store.get(surface).unwrap();
    assert_eq!(layer.name(), "TS_02 - surface");
    let Geometry::SurfaceGrids(grids) = store.geometry(surface, "test").unwrap() else {
        panic!("expected surface grids");
    };
    assert_eq!(grids.len(), 1);
}

#[test]
fn rotate_selected_particles() {
    let mut store = LayerStore::new();
    let picks = store.insert(LayerData::points(
        vec![[0.0, 0.0, 0.0], [0.0, 0.0, 100.0]],
        "TS_01",
        [1.0; 3],
    ));
    let filament = actions::generate_filament(&mut store, picks).unwrap();
    let params = FilamentParticleParams {
        rise_a: 10.0,
        ..FilamentParticleParams::default()
    };
    let particles = actions::filament_particles(&mut store, filament, &params).unwrap();
    let before = particle_rows(&store, particles.points).orientations.clone();

    actions::rotate_particles(&mut store, particles.points, &[0, 2], 90.0, 30.0, 0.0).unwrap();
    let after = &particle_rows(&store, particles.points).orientations;
    let expected = euler_zyz_degrees(90.0, 30.0, 0.0);
    assert_eq!(after[0], expected);
    assert_eq!(after[2], expected);
    assert_eq!(after[1], before[1]);

    let err = actions::rotate_particles(&mut store, particles.points, &[1, 99], 0.0, 0.0, 0.0);
    assert!(matches!(err, Err(LayerError::InvalidSelection { index: 99, .. })));
    // A rejected selection leaves every row untouched.
    assert_eq!(particle_rows(&store, particles.points).orientations[1], before[1]);

    let err = actions::rotate_particles(&mut store, filament, &[0], 0.0, 0.0, 0.0);
    assert!(matches!(err, Err(LayerError::NotParticles(_))));

    let anonymous = store.insert(LayerData::new(
        Payload::Particles(Default::default()),
        LayerProperties::new("loose particles", [1.0; 3]),
    ));
    let err = actions::rotate_particles(&mut store, anonymous, &[], 0.0, 0.0, 0.0);
    assert!(matches!(err, Err(LayerError::NotParticles(_))));
}

#[test]
fn dependent_actions_need_geometry() {
    let mut store = LayerStore::new();
    let shapes = planar_annotations(&mut store);
    let image = tomogram(&mut store);

    let err = actions::surface_particles(&mut store, shapes, 20.0, true).unwrap_err();
    assert!(matches!(err, LayerError::InvalidInput { .. }));
    assert!(err.to_string().contains("not a valid input for surface_particles"));

    let empty = store.insert(LayerData::points(Vec::new(), "TS_01", [2.0; 3]));
    let err = actions::generate_surface(&mut store, shapes, Some(empty), 20.0, false).unwrap_err();
    assert!(matches!(err, LayerError::InvalidInput { .. }));

    let surface = actions::generate_surface(&mut store, shapes, None, 20.0, false).unwrap();
    let err = actions::resample_filament(&mut store, surface, image, 4.0, 20.0).unwrap_err();
    assert!(matches!(err, LayerError::InvalidInput { .. }));
    let err = actions::resample_surface(&mut store, surface, shapes, 4.0, 20.0, false).unwrap_err();
    assert!(matches!(err, LayerError::InvalidInput { .. }));
}

#[test]
fn degenerate_annotations_are_fatal() {
    let mut store = LayerStore::new();
    let shapes = ShapesPayload {
        paths: vec![vec![[50.0, 10.0, 10.0]], vec![[50.0, 20.0, 10.0]]],
        group_ids: vec![0, 1],
        colors: vec![RED; 2],
    };
    let shapes = store.insert(LayerData::shapes(shapes, "TS_01", [1.0; 3]));
    let before = store.len();

    let err = actions::generate_surface(&mut store, shapes, None, 10.0, false).unwrap_err();
    assert!(matches!(
        err,
        LayerError::Geometry(GeometryError::NoGeometryGenerated { skipped: 2, .. })
    ));
    assert_eq!(store.len(), before);
}

#[test]
fn surface_layer_renders_as_json() {
    let mut store = LayerStore::new();
    let shapes = planar_annotations(&mut store);
    let surface = actions::generate_surface(&mut store, shapes, None, 20.0, false).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&store.get(surface).unwrap().to_json().unwrap()).unwrap();
    assert_eq!(json["kind"], "surface");
    assert_eq!(json["properties"]["hints"]["shading"], "smooth");
    assert_eq!(json["properties"]["metadata"]["geometry"], "surface_grids");
    assert_eq!(json["properties"]["metadata"]["experiment_id"], "TS_01");
}
