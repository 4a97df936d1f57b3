use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveTime};

use vtrack::decoder::Letterbox;
use vtrack::plate::PlateText;
use vtrack::{Config, Detection, Frame, Session};

/// 40x60 box centered at (x, y)
fn det_at(x: f32, y: f32) -> Detection {
    Detection::ltrb(x - 20.0, y - 30.0, x + 20.0, y + 30.0, 0.9)
}

/// Anchor-major frame, one `[xc, yc, w, h, score]` row per entry.
fn frame(rows: &[[f32; 5]]) -> Frame {
    let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Frame::new(vec![1, rows.len(), 5], data, Letterbox::default())
}

#[test]
fn vertical_motion_end_to_end() {
    let mut session = Session::new(Config::default()).unwrap();

    let out = session.process_detections(vec![det_at(300.0, 100.0)]);
    assert!(out.violations.is_empty());
    assert_eq!(out.tracks.len(), 1);
    assert_eq!(out.tracks[0].frames_tracked, 0);
    assert_eq!(out.tracks[0].speed, 0.0);

    let out = session.process_detections(vec![det_at(300.0, 140.0)]);
    assert!(out.violations.is_empty());
    assert_eq!(out.tracks[0].frames_tracked, 1);
    assert_relative_eq!(out.tracks[0].speed, 11.52, epsilon = 1e-3);

    let out = session.process_detections(vec![det_at(300.0, 180.0)]);
    assert!(out.violations.is_empty());
    assert_eq!(out.tracks[0].frames_tracked, 2);
    assert_relative_eq!(out.tracks[0].speed, 18.432, epsilon = 1e-3);

    // third match reaches the stability threshold
    let out = session.process_detections(vec![det_at(300.0, 220.0)]);
    assert_eq!(out.tracks[0].frames_tracked, 3);
    assert!(out.tracks[0].processed);
    assert_eq!(out.violations.len(), 1);

    let event = out.violations[0];
    assert_eq!(event.track_id, 1);
    assert_relative_eq!(event.speed, 22.5792, epsilon = 1e-3);
    assert!(!event.over_limit);
    assert_eq!(event.bbox, det_at(300.0, 220.0).bbox);
}

#[test]
fn violation_fires_once_over_a_long_run() {
    let mut session = Session::new(Config::default()).unwrap();
    let mut fired = Vec::new();

    for i in 0..60 {
        // alternating step sizes make the speed fluctuate
        let y = 100.0 + i as f32 * 30.0 + if i % 2 == 0 { 0.0 } else { 25.0 };
        let out = session.process_detections(vec![det_at(500.0, y)]);
        fired.extend(out.violations);
    }

    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].track_id, 1);
    assert!(session.tracker().get(1).unwrap().processed);
}

#[test]
fn lost_tracks_do_not_fire() {
    let mut session = Session::new(Config::default()).unwrap();

    for y in [100.0, 120.0, 140.0] {
        session.process_detections(vec![det_at(200.0, y)]);
    }

    let out = session.process_detections(vec![det_at(200.0, 160.0)]);
    assert_eq!(out.violations.len(), 1);

    // a second vehicle appears and disappears before becoming stable
    session.process_detections(vec![det_at(200.0, 180.0), det_at(900.0, 100.0)]);
    for _ in 0..30 {
        let out = session.process_detections(Vec::new());
        assert!(out.violations.is_empty());
    }

    assert!(session.tracks().is_empty());
}

#[test]
fn raw_frames_through_the_decoder() {
    let mut session = Session::new(Config::default()).unwrap();

    for (i, y) in [100.0, 140.0, 180.0, 220.0].into_iter().enumerate() {
        let out = session
            .process_frame(&frame(&[
                [300.0, y, 40.0, 60.0, 0.8],
                // duplicate box, removed by NMS
                [301.0, y + 1.0, 40.0, 60.0, 0.7],
                // below the score threshold
                [50.0, 50.0, 10.0, 10.0, 0.001],
            ]))
            .unwrap();

        assert_eq!(out.detections.len(), 1);
        assert_eq!(out.tracks.len(), 1);
        assert_eq!(out.violations.len(), usize::from(i == 3));
    }
}

#[test]
fn bad_layout_is_reported() {
    let mut session = Session::new(Config::default()).unwrap();
    let bad = Frame::new(vec![1, 10, 4], vec![0.0; 40], Letterbox::default());

    assert!(matches!(
        session.process_frame(&bad),
        Err(vtrack::error::Error::DecodeLayout { .. })
    ));
}

#[test]
fn recorded_violations_make_a_report() {
    let mut session = Session::new(Config::default()).unwrap();

    // two vehicles far apart, moving down at different rates
    let mut events = Vec::new();
    for i in 0..4 {
        let i = i as f32;
        let out = session.process_detections(vec![
            det_at(200.0, 100.0 + 40.0 * i),
            det_at(900.0, 100.0 + 150.0 * i),
        ]);
        events.extend(out.violations);
    }
    assert_eq!(events.len(), 2);
    assert!(!events[0].over_limit);
    assert!(events[1].over_limit);

    let time = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
    assert!(session
        .record_violation(&events[0], &PlateText::from_engine("Err"), time)
        .is_none());
    let rec = session
        .record_violation(&events[1], &PlateText::from_engine("ab 77 KLM1"), time)
        .unwrap();
    assert_eq!(rec.plate, "77KLM1");
    assert_eq!(rec.id, 2);

    let report = session
        .violations()
        .render(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        .unwrap();
    assert!(report.contains("PLACA: 77KLM1\n"));
    assert!(report.contains("ID: 2\n"));
    assert!(!report.contains("ID: 1\n"));
}

#[test]
fn frames_deserialize_from_json() {
    let frame: Frame =
        serde_json::from_str(r#"{"dims":[1,1,5],"data":[10,20,4,4,0.5]}"#).unwrap();
    assert_eq!(frame.letterbox, Letterbox::default());
    assert_eq!(frame.len(), 5);

    let json = serde_json::to_value(&frame).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["data", "dims", "letterbox"]);

    let det: Detection = serde_json::from_str(r#"{"bbox":[0,0,10,10],"p":0.5}"#).unwrap();
    assert_eq!(det.bbox.right(), 10.0);
}
