use super::*;

#[test]
fn draw_without_surface_reports_false() {
    let mut host = HeadlessHost::new();
    let drew = host.draw(&mut |_| Ok(())).unwrap();
    assert!(!drew);
}

#[test]
fn surface_is_reallocated_only_on_request() {
    let mut host = HeadlessHost::new();
    host.prepare(Rect::new(0.0, 0.0, 10.0, 5.0), true).unwrap();
    host.prepare(Rect::new(0.0, 0.0, 10.0, 5.0), false).unwrap();
    assert_eq!(host.surfaces_created(), 1);
    host.prepare(Rect::new(0.0, 0.0, 12.0, 5.0), true).unwrap();
    assert_eq!(host.surfaces_created(), 2);

    host.draw(&mut |c| {
        c.clear(Color::BLACK);
        Ok(())
    })
    .unwrap();
    host.present().unwrap();
    let frame = host.last_frame().unwrap();
    assert_eq!((frame.width, frame.height), (12, 5));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn clock_only_moves_when_sleeping_or_waiting() {
    let mut host = HeadlessHost::new();
    assert_eq!(host.now(), 0.0);
    host.poll_events();
    assert_eq!(host.now(), 0.0);
    host.sleep(0.5);
    host.wait_events(0.25);
    assert_eq!(host.now(), 0.75);
}

#[test]
fn scripted_batches_come_out_in_order_and_close() {
    let mut host = HeadlessHost::new();
    host.push_events([InputEvent::Focus(true)]);
    host.push_events([InputEvent::CloseRequested]);
    assert_eq!(host.poll_events(), vec![InputEvent::Focus(true)]);
    assert!(!host.should_close());
    assert_eq!(host.wait_events(1.0), vec![InputEvent::CloseRequested]);
    assert!(host.should_close());
    assert!(host.poll_events().is_empty());
}

#[test]
fn close_after_counts_polls() {
    let mut host = HeadlessHost::new().close_after(2);
    host.poll_events();
    assert!(!host.should_close());
    host.poll_events();
    assert!(host.should_close());
}

#[test]
fn clear_color_depends_on_transparency() {
    assert_eq!(window_clear_color(false).a, 1.0);
    assert_eq!(window_clear_color(true).a, 0.0);
}
