use super::*;
use crate::foundation::error::RunonError;
use std::cell::Cell;

#[test]
fn effect_receives_rect_and_returns_new_tree() {
    let calls = Cell::new(0);
    let boxed = |pen: Pen, rect: Rect| -> RunonResult<Pen> {
        calls.set(calls.get() + 1);
        Ok(Pen::group([Pen::from_rect(rect), pen]))
    };
    let r = Rect::new(0.0, 0.0, 20.0, 20.0);
    let out = Pen::from_rect(Rect::new(5.0, 5.0, 6.0, 6.0))
        .ch(&boxed, r)
        .unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(out.len(), 2);
    assert_eq!(out.ambit().unwrap(), r);
}

#[test]
fn effect_errors_propagate() {
    let failing = |_: Pen, _: Rect| -> RunonResult<Pen> { Err(RunonError::render("kernel")) };
    let err = Pen::new()
        .ch(&failing, Rect::new(0.0, 0.0, 1.0, 1.0))
        .unwrap_err();
    assert!(err.to_string().contains("kernel"));
}

#[test]
fn resolved_rect_prefers_frame() {
    let identity = |p: Pen, _: Rect| -> RunonResult<Pen> { Ok(p) };
    let framed = Pen::from_rect(Rect::new(1.0, 1.0, 2.0, 2.0))
        .with_frame(Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(
        framed.resolved_rect().unwrap(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    );
    assert!(Pen::new().ch_resolved(&identity).is_err());
}
