mod sweeps;

use approx::assert_abs_diff_eq;
use horizonkit::config::{CoordinateFormat, FillPolicy, HorizonConfig};
use horizonkit::export::HZN_HEADER;
use horizonkit::sensor::{ReplaySource, SensorSource, write_recording};
use horizonkit::session::CoverageStatus;
use horizonkit::simulation::{SyntheticHorizon, angle_error, horizon_sweep};
use horizonkit::{ExportFormat, SessionStore};

use sweeps::{capture_sweep, dipping_horizon, sweep_config};

#[test]
fn test_full_sweep_reaches_complete_coverage() {
    let config = HorizonConfig::default();
    let sweep = sweep_config(1);
    let horizon = SyntheticHorizon::default();
    let samples = horizon_sweep(&sweep, &horizon);

    let processor = capture_sweep(&config, &sweep, &samples);

    assert_eq!(processor.points().len(), 72);
    assert_abs_diff_eq!(processor.coverage(), 100.0, epsilon = 1e-3);
    assert!(processor.is_complete());
    assert_eq!(processor.status(), CoverageStatus::Complete);
    assert!(processor.gaps().is_empty());

    for point in processor.points() {
        let stop = (point.azimuth / 5.0).round() * 5.0;
        assert!(
            angle_error(point.azimuth, stop).abs() < 1.0,
            "azimuth {} too far from stop {}",
            point.azimuth,
            stop
        );
        let expected = horizon.altitude_at(stop);
        assert!(
            (point.altitude - expected).abs() < 1.0,
            "altitude {} at {}° should be near {}",
            point.altitude,
            stop,
            expected
        );
    }
}

#[test]
fn test_hzn_export_of_sweep() {
    let config = HorizonConfig::default();
    let sweep = sweep_config(2);
    let horizon = dipping_horizon();
    let samples = horizon_sweep(&sweep, &horizon);
    let processor = capture_sweep(&config, &sweep, &samples);

    let file = processor.export(ExportFormat::Hzn).unwrap();
    assert_eq!(file.filename, "horizon.hzn");

    let lines: Vec<&str> = file.content.lines().collect();
    assert_eq!(lines.len(), 361);
    assert_eq!(lines[0], HZN_HEADER);

    let mut at_horizon = 0;
    for (degree, line) in lines[1..].iter().enumerate() {
        let (az, alt) = line.split_once(' ').unwrap();
        assert_eq!(az.parse::<usize>().unwrap(), degree);
        let alt: f32 = alt.parse().unwrap();
        assert!(alt >= 0.0, "line {:?} below the horizon", line);
        if alt == 0.0 {
            at_horizon += 1;
        }
    }
    // The skyline dips to -4° between ridges
    assert!(at_horizon > 0);

    // Stop at 30° sits on a ridge crest: 2 + 6 * sin(90°)
    let crest: f32 = lines[1 + 30].split_once(' ').unwrap().1.parse().unwrap();
    assert_abs_diff_eq!(crest, 8.0, epsilon = 1.0);
}

#[test]
fn test_nearest_neighbor_profile_follows_points() {
    let mut config = HorizonConfig::default();
    config.export.fill_policy = FillPolicy::NearestNeighbor;
    let sweep = sweep_config(3);
    let horizon = SyntheticHorizon::default();
    let samples = horizon_sweep(&sweep, &horizon);
    let processor = capture_sweep(&config, &sweep, &samples);

    let profile = processor.profile();
    assert_eq!(profile.len(), 72);
    // The capture at north may land just below 360°, which is far from bucket 0
    for bucket in 1..72 {
        let azimuth = bucket as f32 * 5.0;
        assert!(
            (profile[bucket] - horizon.altitude_at(azimuth)).abs() < 1.0,
            "bucket {} altitude {}",
            bucket,
            profile[bucket]
        );
    }
}

#[test]
fn test_csv_and_json_export_of_sweep() {
    let mut config = HorizonConfig::default();
    config.export.delimiter = ';';
    config.export.include_timestamp = true;
    let sweep = sweep_config(4);
    let samples = horizon_sweep(&sweep, &dipping_horizon());
    let processor = capture_sweep(&config, &sweep, &samples);

    let csv = processor.export(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.content.lines().collect();
    assert_eq!(lines.len(), 73);
    assert_eq!(lines[0], "Azimuth;Altitude;Timestamp");
    let mut last_az = -1.0;
    for line in &lines[1..] {
        let fields: Vec<&str> = line.split(';').collect();
        assert_eq!(fields.len(), 3);
        let az: f32 = fields[0].parse().unwrap();
        let alt: f32 = fields[1].parse().unwrap();
        assert!(az >= last_az, "rows must be sorted by azimuth");
        assert!(alt >= 0.0);
        assert!(fields[2].starts_with("1970-01-01T"));
        last_az = az;
    }

    let json = processor.export(ExportFormat::Json).unwrap();
    let dump: serde_json::Value = serde_json::from_str(&json.content).unwrap();
    assert_eq!(dump["session"]["id"], "sweep");
    assert_eq!(dump["points"].as_array().unwrap().len(), 72);
    assert_eq!(dump["statistics"]["total_points"], 72);
    // Raw points keep their negative altitudes
    let min_alt = dump["statistics"]["min_altitude"].as_f64().unwrap();
    assert!(min_alt < 0.0);
}

#[test]
fn test_sexagesimal_csv() {
    let mut config = HorizonConfig::default();
    config.export.coordinate_format = CoordinateFormat::Sexagesimal;
    let sweep = sweep_config(5);
    let samples = horizon_sweep(&sweep, &SyntheticHorizon::default());
    let processor = capture_sweep(&config, &sweep, &samples);

    let csv = processor.export(ExportFormat::Csv).unwrap();
    let row = csv.content.lines().nth(1).unwrap();
    assert!(row.contains('°'), "row {:?} should be sexagesimal", row);
}

#[test]
fn test_session_end_persists_summary() {
    let config = HorizonConfig::default();
    let sweep = sweep_config(6);
    let samples = horizon_sweep(&sweep, &SyntheticHorizon::default());
    let mut processor = capture_sweep(&config, &sweep, &samples);

    let ended = processor.end_session(samples.last().unwrap().timestamp_ms).unwrap();
    assert_eq!(ended.total_points, 72);
    assert!(!ended.is_active());
    assert!(processor.session().is_none());

    let store = processor.into_store();
    assert_eq!(store.points("sweep").unwrap().len(), 72);
    assert_eq!(store.list_sessions().unwrap().len(), 1);
}

#[test]
fn test_recording_replay_matches_direct_samples() {
    let sweep = sweep_config(7);
    let samples = horizon_sweep(&sweep, &SyntheticHorizon::default());

    let path = std::env::temp_dir().join(format!("horizonkit-replay-{}.jsonl", std::process::id()));
    let file = std::fs::File::create(&path).unwrap();
    write_recording(std::io::BufWriter::new(file), &samples).unwrap();

    let mut source = ReplaySource::open(&path).unwrap();
    assert_eq!(source.len(), samples.len());

    let mut replayed = Vec::new();
    while let Some(sample) = source.next_sample().unwrap() {
        replayed.push(sample);
    }
    std::fs::remove_file(&path).unwrap();

    assert_eq!(replayed.len(), samples.len());
    for (a, b) in replayed.iter().zip(&samples) {
        assert_eq!(a.timestamp_ms, b.timestamp_ms);
        let (ga, gb) = (a.gravity_vector().unwrap(), b.gravity_vector().unwrap());
        assert!((ga - gb).norm() < 1e-5);
    }
}
