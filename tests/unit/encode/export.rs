use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Fps;

fn timeline(frames: u64) -> Timeline {
    Timeline::new(frames, Fps::new(10, 1).unwrap()).unwrap()
}

fn bar(frame: &Frame<'_>) -> RunonResult<Pen> {
    let w = 2.0 + frame.i.0 as f64 * 2.0;
    Ok(Pen::from_rect(Rect::new(0.0, 0.0, w, 4.0)).f(Color::BLACK))
}

#[test]
fn every_frame_reaches_the_sink_in_order() {
    let rect = Rect::new(0.0, 0.0, 8.0, 4.0);
    let mut sink = InMemorySink::new();
    let n = export(&timeline(3), rect, &ExportOpts::default(), &mut sink, bar).unwrap();
    assert_eq!(n, 3);
    assert!(sink.is_ended());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (8, 4));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);
    let (_, last) = &sink.frames()[2];
    assert_eq!(last.pixel(5, 2).map(|p| p[3]), Some(255));
    let (_, first) = &sink.frames()[0];
    assert_eq!(first.pixel(5, 2).map(|p| p[3]), Some(0));
}

#[test]
fn background_and_scale_apply() {
    let rect = Rect::new(0.0, 0.0, 8.0, 4.0);
    let opts = ExportOpts {
        scale: 2.0,
        background: Some(Color::WHITE),
        range: Some(1..2),
        ..ExportOpts::default()
    };
    let mut sink = InMemorySink::new();
    export(&timeline(3), rect, &opts, &mut sink, bar).unwrap();
    assert_eq!(sink.frames().len(), 1);
    let (idx, frame) = &sink.frames()[0];
    assert_eq!(idx.0, 1);
    assert_eq!((frame.width, frame.height), (16, 8));
    assert_eq!(frame.pixel(15, 4), Some([255, 255, 255, 255]));
}

#[test]
fn first_failure_aborts_without_end() {
    let rect = Rect::new(0.0, 0.0, 8.0, 4.0);
    let mut sink = InMemorySink::new();
    let err = export(&timeline(4), rect, &ExportOpts::default(), &mut sink, |f: &Frame<'_>| {
        if f.i.0 == 2 {
            Err(RunonError::render("frame 2 exploded"))
        } else {
            bar(f)
        }
    })
    .unwrap_err();
    assert!(err.to_string().contains("frame 2 exploded"));
    assert_eq!(sink.frames().len(), 2);
    assert!(!sink.is_ended());
}

#[test]
fn bad_range_is_rejected() {
    let rect = Rect::new(0.0, 0.0, 8.0, 4.0);
    let opts = ExportOpts {
        range: Some(2..9),
        ..ExportOpts::default()
    };
    let mut sink = InMemorySink::new();
    let err = export(&timeline(3), rect, &opts, &mut sink, bar).unwrap_err();
    assert!(matches!(err, RunonError::Validation(_)));
}
