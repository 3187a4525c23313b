use horizonkit::config::{FusionConfig, FusionMethod};
use horizonkit::simulation::{
    DevicePose, MagneticField, SensorNoise, SimulatedChannels, angle_error, ideal_sample,
    measure_error_across_poses, measure_pointing,
};

fn pose_grid(altitudes: &[f32]) -> Vec<DevicePose> {
    let mut poses = Vec::new();
    for &altitude in altitudes {
        for step in 0..12 {
            poses.push(DevicePose::new(step as f32 * 30.0, altitude));
        }
    }
    poses
}

fn heading_fusion(window: usize) -> FusionConfig {
    FusionConfig {
        method: FusionMethod::Heading,
        heading_window: window,
        ..Default::default()
    }
}

#[test]
fn test_cross_product_noiseless_poses() {
    let poses = pose_grid(&[-45.0, -10.0, 0.0, 20.0, 45.0, 75.0]);
    let stats = measure_error_across_poses(
        &poses,
        &MagneticField::default(),
        SimulatedChannels::default(),
        &SensorNoise::default(),
        &FusionConfig::default(),
        5,
    );

    assert_eq!(stats.missing, 0);
    assert!(
        stats.max_azimuth_error < 0.05,
        "azimuth error {}",
        stats.max_azimuth_error
    );
    assert!(
        stats.max_altitude_error < 0.05,
        "altitude error {}",
        stats.max_altitude_error
    );
}

#[test]
fn test_cross_product_with_seeded_noise() {
    let poses = pose_grid(&[-30.0, -10.0, 0.0, 20.0, 45.0, 60.0]);

    for seed in 1..=5 {
        let noise = SensorNoise::default()
            .with_seed(seed)
            .with_gravity_std(0.005)
            .with_magnetic_std(0.5);
        let stats = measure_error_across_poses(
            &poses,
            &MagneticField::default(),
            SimulatedChannels::default(),
            &noise,
            &FusionConfig::default(),
            40,
        );

        assert_eq!(stats.missing, 0);
        assert!(
            stats.max_azimuth_error < 3.0,
            "seed {}: azimuth error {}",
            seed,
            stats.max_azimuth_error
        );
        assert!(
            stats.max_altitude_error < 1.0,
            "seed {}: altitude error {}",
            seed,
            stats.max_altitude_error
        );
    }
}

#[test]
fn test_southern_hemisphere_field() {
    // Upward-pointing field lines flip the sign of the inclination
    let field = MagneticField {
        inclination_degrees: -50.0,
        strength: 30.0,
    };
    let stats = measure_error_across_poses(
        &pose_grid(&[0.0, 30.0]),
        &field,
        SimulatedChannels::default(),
        &SensorNoise::default(),
        &FusionConfig::default(),
        5,
    );
    assert_eq!(stats.missing, 0);
    assert!(stats.max_azimuth_error < 0.05);
}

#[test]
fn test_declination_shifts_azimuth() {
    let config = FusionConfig {
        declination_degrees: 12.5,
        ..Default::default()
    };
    let pose = DevicePose::new(355.0, 10.0);
    let samples: Vec<_> = (0..5)
        .map(|i| ideal_sample(pose, &MagneticField::default(), SimulatedChannels::default(), i))
        .collect();

    let reading = measure_pointing(&samples, &config).unwrap();
    assert!(
        angle_error(reading.azimuth, 7.5).abs() < 0.05,
        "azimuth {}",
        reading.azimuth
    );
    assert!((reading.altitude - 10.0).abs() < 0.05);
}

#[test]
fn test_heading_method_with_attitude_channels() {
    let channels = SimulatedChannels {
        vectors: false,
        attitude: true,
        heading: false,
    };
    let poses = pose_grid(&[-20.0, 0.0, 35.0]);

    let exact = measure_error_across_poses(
        &poses,
        &MagneticField::default(),
        channels,
        &SensorNoise::default(),
        &heading_fusion(1),
        3,
    );
    assert_eq!(exact.missing, 0);
    assert!(exact.max_azimuth_error < 1e-3);
    assert!(exact.max_altitude_error < 1e-3);

    let noise = SensorNoise::default().with_seed(42).with_angle_std(0.3);
    let smoothed = measure_error_across_poses(
        &poses,
        &MagneticField::default(),
        channels,
        &noise,
        &heading_fusion(8),
        20,
    );
    assert_eq!(smoothed.missing, 0);
    assert!(
        smoothed.max_azimuth_error < 1.0,
        "azimuth error {}",
        smoothed.max_azimuth_error
    );
    assert!(smoothed.max_altitude_error < 1.0);
}

#[test]
fn test_heading_method_prefers_compass_heading() {
    let channels = SimulatedChannels {
        vectors: false,
        attitude: true,
        heading: true,
    };
    let stats = measure_error_across_poses(
        &pose_grid(&[5.0]),
        &MagneticField::default(),
        channels,
        &SensorNoise::default(),
        &heading_fusion(1),
        3,
    );
    assert_eq!(stats.missing, 0);
    assert!(stats.max_azimuth_error < 1e-3);
}

#[test]
fn test_heading_method_without_azimuth_source() {
    // Vectors alone give the heading strategy an altitude but no azimuth
    let stats = measure_error_across_poses(
        &pose_grid(&[0.0]),
        &MagneticField::default(),
        SimulatedChannels::default(),
        &SensorNoise::default(),
        &heading_fusion(1),
        3,
    );
    assert_eq!(stats.missing, 12);
}
