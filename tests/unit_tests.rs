use dental2yolo::conversion::{denormalize_box, normalize_box, parse_label_line};
use dental2yolo::error::Error;
use dental2yolo::index::{retain, BoxRow};
use dental2yolo::split::{assign_splits, SplitRatios};

fn sample_row(filename: &str, image_side: u32, bbox_side: i64) -> BoxRow {
    BoxRow {
        image_filename: filename.to_string(),
        image_width: image_side,
        image_height: image_side,
        class_id: 0,
        x_min: 100,
        y_min: 100,
        x_max: 100 + bbox_side,
        y_max: 100 + bbox_side,
        bbox_width: bbox_side,
        bbox_height: bbox_side,
    }
}

#[test]
fn test_normalize_box_scenario() {
    let norm = normalize_box(400, 300, 100.0, 50.0, 300.0, 200.0).unwrap();

    assert!((norm.x_center - 0.5).abs() < 1e-9);
    assert!((norm.y_center - 125.0 / 300.0).abs() < 1e-9);
    assert!((norm.width - 0.5).abs() < 1e-9);
    assert!((norm.height - 0.5).abs() < 1e-9);

    assert_eq!(
        norm.to_label_line(0),
        "0 0.500000 0.416667 0.500000 0.500000"
    );
}

#[test]
fn test_normalize_box_rejects_zero_dimensions() {
    assert!(matches!(
        normalize_box(0, 300, 0.0, 0.0, 10.0, 10.0),
        Err(Error::InvalidGeometry { .. })
    ));
    assert!(matches!(
        normalize_box(400, 0, 0.0, 0.0, 10.0, 10.0),
        Err(Error::InvalidGeometry { .. })
    ));
}

#[test]
fn test_normalize_box_clamps_overflow() {
    // An annotation past the right edge is pulled back inside [0, 1].
    let norm = normalize_box(100, 100, 90.0, 90.0, 150.0, 120.0).unwrap();
    assert_eq!(norm.x_center, 1.0);
    assert_eq!(norm.y_center, 1.0);
    assert!((norm.width - 0.6).abs() < 1e-9);
    assert!((norm.height - 0.3).abs() < 1e-9);
}

#[test]
fn test_box_round_trip_within_one_pixel() {
    let cases = [
        (400u32, 300u32, 100.0, 50.0, 300.0, 200.0),
        (640, 480, 0.0, 0.0, 640.0, 480.0),
        (1024, 768, 13.0, 7.0, 14.0, 9.0),
        (33, 77, 1.0, 2.0, 32.0, 76.0),
        (1920, 1080, 511.0, 333.0, 1600.0, 900.0),
    ];

    for (w, h, x_min, y_min, x_max, y_max) in cases {
        let norm = normalize_box(w, h, x_min, y_min, x_max, y_max).unwrap();
        let (rx_min, ry_min, rx_max, ry_max) = denormalize_box(w, h, &norm);

        assert!((rx_min.round() - x_min).abs() <= 1.0, "x_min for {}x{}", w, h);
        assert!((ry_min.round() - y_min).abs() <= 1.0, "y_min for {}x{}", w, h);
        assert!((rx_max.round() - x_max).abs() <= 1.0, "x_max for {}x{}", w, h);
        assert!((ry_max.round() - y_max).abs() <= 1.0, "y_max for {}x{}", w, h);
    }
}

#[test]
fn test_parse_label_line() {
    let (class_id, norm) = parse_label_line("0 0.500000 0.416667 0.500000 0.500000").unwrap();
    assert_eq!(class_id, 0);
    assert!((norm.x_center - 0.5).abs() < 1e-9);
    assert!((norm.y_center - 0.416667).abs() < 1e-9);

    assert!(parse_label_line("").is_none());
    assert!(parse_label_line("0 0.5 0.5 0.5").is_none());
    assert!(parse_label_line("0 0.5 0.5 0.5 0.5 0.5").is_none());
    assert!(parse_label_line("cavity 0.5 0.5 0.5 0.5").is_none());
}

#[test]
fn test_box_row_regenerates_label_line() {
    let row = BoxRow {
        image_filename: "dc1000_x.png".to_string(),
        image_width: 400,
        image_height: 300,
        class_id: 0,
        x_min: 100,
        y_min: 50,
        x_max: 300,
        y_max: 200,
        bbox_width: 200,
        bbox_height: 150,
    };

    assert_eq!(row.to_label_line(), "0 0.500000 0.416667 0.500000 0.500000");
    assert!((row.relative_area_percent() - 25.0).abs() < 1e-9);
}

#[test]
fn test_retain_drops_small_boxes() {
    // A 5x5 box in a 1000x1000 image covers 0.0025% of it.
    let rows = vec![
        sample_row("dc1000_small.png", 1000, 5),
        sample_row("dc1000_big.png", 1000, 400),
    ];

    let retained = retain(&rows, 0.1, None);
    assert_eq!(retained.len(), 1);
    assert_eq!(retained[0].image_filename, "dc1000_big.png");
}

#[test]
fn test_retain_scopes_to_prefix() {
    let rows = vec![
        sample_row("dc1000_a.png", 100, 50),
        sample_row("opg_xray_b.png", 100, 50),
    ];

    let retained = retain(&rows, 0.1, Some("dc1000_"));
    assert_eq!(retained.len(), 1);
    assert_eq!(retained[0].image_filename, "dc1000_a.png");

    let retained_all = retain(&rows, 0.1, None);
    assert_eq!(retained_all.len(), 2);
}

#[test]
fn test_split_ratios_validation() {
    assert!(SplitRatios::default().validate().is_ok());
    assert!(SplitRatios {
        train: 0.5,
        val: 0.3,
        test: 0.1
    }
    .validate()
    .is_err());
}

#[test]
fn test_assign_splits_counts_and_partition() {
    let names: Vec<String> = (0..10).map(|i| format!("img{:02}", i)).collect();
    let assignment = assign_splits(names.clone(), SplitRatios::default(), 42);

    assert_eq!(assignment.train.len(), 8);
    assert_eq!(assignment.val.len(), 1);
    assert_eq!(assignment.test.len(), 1);

    let mut all: Vec<String> = assignment
        .train
        .iter()
        .chain(assignment.val.iter())
        .chain(assignment.test.iter())
        .cloned()
        .collect();
    all.sort();
    let mut expected = names;
    expected.sort();
    assert_eq!(all, expected);
}

#[test]
fn test_assign_splits_is_deterministic() {
    let names: Vec<String> = (0..25).map(|i| format!("img{:02}", i)).collect();

    let first = assign_splits(names.clone(), SplitRatios::default(), 42);
    let second = assign_splits(names, SplitRatios::default(), 42);
    assert_eq!(first, second);
}

#[test]
fn test_assign_splits_ignores_input_order() {
    let sorted: Vec<String> = (0..12).map(|i| format!("img{:02}", i)).collect();
    let mut reversed = sorted.clone();
    reversed.reverse();

    let from_sorted = assign_splits(sorted, SplitRatios::default(), 7);
    let from_reversed = assign_splits(reversed, SplitRatios::default(), 7);
    assert_eq!(from_sorted, from_reversed);
}

#[test]
fn test_assign_splits_handles_empty_input() {
    let assignment = assign_splits(Vec::new(), SplitRatios::default(), 42);
    assert!(assignment.train.is_empty());
    assert!(assignment.val.is_empty());
    assert!(assignment.test.is_empty());
}
