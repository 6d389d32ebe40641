use super::*;

#[test]
fn take_drains_once() {
    let mb = Mailbox::new();
    assert_eq!(mb.take(), None);
    mb.post("render");
    assert!(mb.is_ready());
    assert_eq!(mb.take().as_deref(), Some("render"));
    assert!(!mb.is_ready());
    assert_eq!(mb.take(), None);
}

#[test]
fn later_post_overwrites_unread_line() {
    let mb = Mailbox::new();
    mb.post("first");
    mb.post("second");
    assert_eq!(mb.take().as_deref(), Some("second"));
    assert_eq!(mb.take(), None);
}

#[test]
fn reader_thread_delivers_last_line() {
    let input = std::io::Cursor::new(b"one\ntwo\nthree\n".to_vec());
    let listener = StdinMailbox::spawn_reader(input);
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while !listener.is_finished() && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(listener.is_finished());
    assert_eq!(listener.mailbox().take().as_deref(), Some("three"));
}
