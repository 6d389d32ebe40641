use super::*;
use crate::foundation::core::FrameRGBA;
use std::collections::VecDeque;

#[derive(Default)]
struct Script {
    waiting: VecDeque<Vec<Preview>>,
    painted: Vec<(Vec<Option<String>>, Vec<usize>)>,
    fps: Option<f64>,
    layer: KeyLayer,
    reply: Option<LoopCommand>,
    shortcuts: Vec<Shortcut>,
    keys: Vec<Key>,
    chars: Vec<char>,
    moves: Vec<Point>,
    stdin: Vec<String>,
    scales: Vec<f64>,
    resets: usize,
    exits: usize,
}

impl Script {
    fn queue(&mut self, previews: Vec<Preview>) {
        self.waiting.push_back(previews);
    }
}

impl Renderer for Script {
    fn previews_waiting_to_paint(&mut self) -> Vec<Preview> {
        self.waiting.pop_front().unwrap_or_default()
    }

    fn previews_painted(&mut self, previews: Vec<Preview>, drawn: &[usize]) {
        let errors = previews.into_iter().map(|p| p.error).collect();
        self.painted.push((errors, drawn.to_vec()));
    }

    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn keylayer(&self) -> KeyLayer {
        self.layer
    }

    fn on_shortcut(&mut self, shortcut: Shortcut) -> Option<LoopCommand> {
        self.shortcuts.push(shortcut);
        self.reply.clone()
    }

    fn on_key(&mut self, key: Key, _action: KeyAction, _mods: Modifiers) -> Option<LoopCommand> {
        self.keys.push(key);
        None
    }

    fn on_character(&mut self, c: char) -> Option<LoopCommand> {
        self.chars.push(c);
        None
    }

    fn on_mouse_move(&mut self, pos: Point) -> Option<LoopCommand> {
        self.moves.push(pos);
        None
    }

    fn on_stdin(&mut self, line: &str) -> Option<LoopCommand> {
        self.stdin.push(line.to_string());
        self.reply.clone()
    }

    fn on_content_scale_changed(&mut self, scale: f64) {
        self.scales.push(scale);
    }

    fn reset_keystate(&mut self) {
        self.resets += 1;
    }

    fn on_exit(&mut self) {
        self.exits += 1;
    }
}

fn preview_loop() -> PreviewLoop<HeadlessHost> {
    PreviewLoop::new(PreviewConfig::default(), HeadlessHost::new())
}

fn rect(w: f64, h: f64) -> Rect {
    Rect::new(0.0, 0.0, w, h)
}

fn fill_local(color: Color) -> impl FnMut(&mut dyn Canvas) -> RunonResult<()> {
    move |canvas: &mut dyn Canvas| {
        canvas.draw_path(&crate::pen::drawing::rect_path(rect(20.0, 10.0)), &Paint::fill(color))
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn idle_backoff_grows_and_caps() {
    let mut l = preview_loop();
    let mut r = Script::default();
    assert_eq!(l.tick(&mut r).unwrap(), Tick::Idle);
    assert!(approx(l.backoff(), 0.035));
    for _ in 0..40 {
        l.tick(&mut r).unwrap();
    }
    assert!(approx(l.backoff(), 0.25));
    assert_eq!(r.resets, 41);
}

#[test]
fn painting_resets_backoff() {
    let mut l = preview_loop();
    let mut r = Script::default();
    for _ in 0..5 {
        l.tick(&mut r).unwrap();
    }
    r.queue(vec![Preview::direct(rect(20.0, 10.0), fill_local(Color::BLACK))]);
    assert_eq!(l.tick(&mut r).unwrap(), Tick::Rendered(vec![0]));
    assert!(approx(l.backoff(), 0.025));
    assert_eq!(l.host().presented().len(), 1);
}

#[test]
fn failed_preview_does_not_stop_the_next_one() {
    let mut l = preview_loop();
    let mut r = Script::default();
    let blue = Color::rgb(0.0, 0.0, 1.0);
    r.queue(vec![
        Preview::direct(rect(20.0, 10.0), |_: &mut dyn Canvas| {
            Err(RunonError::render("bad geometry\nsecond line"))
        }),
        Preview::direct(rect(20.0, 10.0), fill_local(blue)),
    ]);

    assert_eq!(l.tick(&mut r).unwrap(), Tick::Rendered(vec![1]));

    let (errors, drawn) = &r.painted[0];
    assert_eq!(drawn, &vec![1]);
    assert!(errors[0].as_deref().is_some_and(|m| m.contains("bad geometry")));
    assert!(errors[0].as_deref().is_some_and(|m| !m.contains("second line")));
    assert_eq!(errors[1], None);

    let frame = l.host().last_frame().unwrap();
    assert_eq!((frame.width, frame.height), (20, 21));
    assert_eq!(frame.pixel(10, 15), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(19, 9), Some([255, 255, 255, 255]));
}

#[test]
fn pen_previews_composite_with_and_without_precompose() {
    let red = Color::rgb(1.0, 0.0, 0.0);
    for composited in [false, true] {
        let mut l = preview_loop();
        let mut r = Script::default();
        let pen = Pen::from_rect(rect(20.0, 10.0)).f(red);
        let mut p = Preview::pen(rect(20.0, 10.0), pen);
        if composited {
            p = p.composited();
        }
        r.queue(vec![p]);
        assert_eq!(l.tick(&mut r).unwrap(), Tick::Rendered(vec![0]));
        let frame = l.host().last_frame().unwrap();
        assert_eq!(frame.pixel(10, 5), Some([255, 0, 0, 255]));
    }
}

#[test]
fn errored_preview_is_not_reported_drawn() {
    let mut l = preview_loop();
    let mut r = Script::default();
    let pen = Pen::from_rect(rect(20.0, 10.0)).f(Color::BLACK);
    r.queue(vec![Preview::pen(rect(20.0, 10.0), pen).with_error("boom")]);
    assert_eq!(l.tick(&mut r).unwrap(), Tick::Rendered(vec![]));
    assert_eq!(r.painted[0].0, vec![Some("boom".to_string())]);
}

#[test]
fn transparent_window_clears_to_clear() {
    let config = PreviewConfig {
        window_transparent: true,
        ..PreviewConfig::default()
    };
    let mut l = PreviewLoop::new(config, HeadlessHost::new());
    let mut r = Script::default();
    r.queue(vec![
        Preview::direct(rect(20.0, 10.0), |_: &mut dyn Canvas| Ok(())),
        Preview::direct(rect(10.0, 10.0), |_: &mut dyn Canvas| Ok(())),
    ]);
    l.tick(&mut r).unwrap();
    let frame = l.host().last_frame().unwrap();
    assert_eq!(frame.pixel(1, 15).map(|p| p[3]), Some(0));
}

#[test]
fn narrow_previews_are_centred() {
    let mut l = preview_loop();
    let mut r = Script::default();
    let green = Color::rgb(0.0, 1.0, 0.0);
    r.queue(vec![
        Preview::direct(rect(20.0, 10.0), fill_local(Color::BLACK)),
        Preview::direct(rect(10.0, 10.0), |_: &mut dyn Canvas| Ok(())).with_bg(green),
    ]);
    l.tick(&mut r).unwrap();
    let frame = l.host().last_frame().unwrap();
    let [pr, pg, pb, pa] = frame.pixel(2, 15).unwrap();
    assert!(pr == pg && pg == pb && (70..=80).contains(&pr) && pa == 255);
    assert_eq!(frame.pixel(10, 15), Some([0, 255, 0, 255]));
}

#[test]
fn stdin_line_is_trimmed_and_delivered_once() {
    let mailbox = Arc::new(Mailbox::new());
    let mut l = preview_loop().with_mailbox(mailbox.clone());
    let mut r = Script::default();
    mailbox.post("  next frame \n");
    l.tick(&mut r).unwrap();
    l.tick(&mut r).unwrap();
    mailbox.post("   ");
    l.tick(&mut r).unwrap();
    assert_eq!(r.stdin, vec!["next frame".to_string()]);
}

#[test]
fn close_request_ends_listen_and_calls_on_exit() {
    let mut host = HeadlessHost::new();
    host.push_events([InputEvent::Focus(true)]);
    host.push_events([InputEvent::CloseRequested]);
    let mut l = PreviewLoop::new(PreviewConfig::default(), host);
    let mut r = Script::default();
    l.listen(&mut r).unwrap();
    assert_eq!(r.exits, 1);
    assert!(l.is_focused());
}

#[test]
fn exit_command_from_stdin_stops_the_loop() {
    let mailbox = Arc::new(Mailbox::new());
    let mut l = preview_loop().with_mailbox(mailbox.clone());
    let mut r = Script {
        reply: Some(LoopCommand::Exit),
        ..Script::default()
    };
    mailbox.post("quit");
    l.listen(&mut r).unwrap();
    assert_eq!(r.stdin, vec!["quit".to_string()]);
    assert_eq!(r.exits, 1);
}

#[test]
fn shortcuts_resolve_in_default_layer() {
    let mut host = HeadlessHost::new();
    host.push_events([
        InputEvent::Key {
            key: Key::Right,
            action: KeyAction::Press,
            mods: Modifiers::empty(),
        },
        InputEvent::Key {
            key: Key::Char('q'),
            action: KeyAction::Repeat,
            mods: Modifiers::SUPER,
        },
        InputEvent::Char('x'),
    ]);
    let mut l = PreviewLoop::new(PreviewConfig::default(), host);
    let mut r = Script::default();
    l.tick(&mut r).unwrap();
    assert_eq!(r.shortcuts, vec![Shortcut::PreviewNext]);
    assert!(r.chars.is_empty());
}

#[test]
fn keylayer_bypasses_shortcuts() {
    let mut host = HeadlessHost::new();
    host.push_events([
        InputEvent::Key {
            key: Key::Right,
            action: KeyAction::Press,
            mods: Modifiers::empty(),
        },
        InputEvent::Char('x'),
    ]);
    let mut l = PreviewLoop::new(PreviewConfig::default(), host);
    let mut r = Script {
        layer: KeyLayer::Editing,
        ..Script::default()
    };
    l.tick(&mut r).unwrap();
    assert!(r.shortcuts.is_empty());
    assert_eq!(r.keys, vec![Key::Right]);
    assert_eq!(r.chars, vec!['x']);
}

#[test]
fn mouse_positions_are_scaled_and_flipped() {
    let mut host = HeadlessHost::new();
    host.set_content_scale(2.0);
    let mut l = PreviewLoop::new(PreviewConfig::default(), host);
    let mut r = Script::default();
    r.queue(vec![Preview::direct(rect(20.0, 10.0), |_: &mut dyn Canvas| Ok(()))]);
    l.tick(&mut r).unwrap();
    l.host_mut().push_events([InputEvent::MouseMove(Point::new(3.0, 4.0))]);
    l.tick(&mut r).unwrap();
    assert_eq!(r.moves, vec![Point::new(6.0, 2.0)]);
}

#[test]
fn scroll_accumulates_until_reset() {
    let mut host = HeadlessHost::new();
    host.push_events([
        InputEvent::Scroll { dx: 0.0, dy: 5.0 },
        InputEvent::Scroll { dx: 1.0, dy: -2.0 },
    ]);
    let mut l = PreviewLoop::new(PreviewConfig::default(), host);
    let mut r = Script::default();
    l.tick(&mut r).unwrap();
    assert_eq!(l.scroll_y(), 3.0);
    l.reset();
    assert_eq!(l.scroll_y(), 0.0);
}

#[test]
fn opacity_commands_are_clamped() {
    let press = InputEvent::Key {
        key: Key::Down,
        action: KeyAction::Press,
        mods: Modifiers::ALT,
    };
    let mut host = HeadlessHost::new();
    host.push_events([press.clone(), press]);
    let mut l = PreviewLoop::new(PreviewConfig::default(), host);
    let mut r = Script {
        reply: Some(LoopCommand::AdjustOpacity(-0.5)),
        ..Script::default()
    };
    l.tick(&mut r).unwrap();
    assert_eq!(r.shortcuts, vec![Shortcut::WindowOpacityDown; 2]);
    assert!(approx(l.host().opacity(), 0.1));
}

#[test]
fn declared_fps_paces_ticks() {
    let mut l = preview_loop();
    let mut r = Script {
        fps: Some(10.0),
        ..Script::default()
    };
    assert_eq!(l.tick(&mut r).unwrap(), Tick::Idle);
    assert_eq!(l.tick(&mut r).unwrap(), Tick::Waiting);
    assert!(l.host().now() >= 0.099);
}

#[test]
fn content_scale_change_is_reported() {
    let mut l = preview_loop();
    let mut r = Script::default();
    l.tick(&mut r).unwrap();
    l.host_mut().set_content_scale(2.0);
    l.tick(&mut r).unwrap();
    l.tick(&mut r).unwrap();
    assert_eq!(r.scales, vec![2.0]);
}

#[test]
fn preloaded_frames_play_and_wrap() {
    let dir = std::env::temp_dir().join(format!("runon-preloaded-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let mut paths = Vec::new();
    for (i, color) in [[255u8, 0, 0, 255], [0, 0, 255, 255]].iter().enumerate() {
        let frame = FrameRGBA::from_straight(4, 4, color.repeat(16)).unwrap();
        let path = dir.join(format!("{i:04}.png"));
        crate::render::image_io::save_png(&frame, &path).unwrap();
        paths.push(path);
    }

    let mut l = preview_loop();
    let mut r = Script::default();
    l.preload_frames(paths.clone());
    assert_eq!(l.tick(&mut r).unwrap(), Tick::Preloaded);
    assert_eq!(l.playing_preloaded(), Some(1));
    assert_eq!(l.host().last_frame().unwrap().pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(l.tick(&mut r).unwrap(), Tick::Preloaded);
    assert_eq!(l.host().last_frame().unwrap().pixel(1, 1), Some([0, 0, 255, 255]));
    assert_eq!(l.playing_preloaded(), Some(0));

    l.toggle_play_preloaded(paths);
    assert_eq!(l.playing_preloaded(), None);
    assert_eq!(l.tick(&mut r).unwrap(), Tick::Idle);
    std::fs::remove_dir_all(&dir).ok();
}

/// Raster canvas whose text drawing always fails.
struct NoText(crate::render::raster::RasterCanvas);

impl Canvas for NoText {
    fn size(&self) -> (u32, u32) {
        self.0.size()
    }
    fn save(&mut self) {
        self.0.save();
    }
    fn restore(&mut self) {
        self.0.restore();
    }
    fn transform(&self) -> kurbo::Affine {
        self.0.transform()
    }
    fn concat(&mut self, t: kurbo::Affine) {
        self.0.concat(t);
    }
    fn clip_path(&mut self, path: &kurbo::BezPath) {
        self.0.clip_path(path);
    }
    fn clear(&mut self, color: Color) {
        self.0.clear(color);
    }
    fn draw_path(&mut self, path: &kurbo::BezPath, paint: &Paint) -> RunonResult<()> {
        self.0.draw_path(path, paint)
    }
    fn draw_text(&mut self, _: &str, _: Point, _: f64, _: Color) -> RunonResult<()> {
        Err(RunonError::render("no font"))
    }
    fn snapshot(&mut self) -> Option<FrameRGBA> {
        self.0.snapshot()
    }
}

#[test]
fn untypesettable_error_text_does_not_fail_the_preview() {
    let mut canvas = NoText(crate::render::raster::RasterCanvas::new(20, 10).unwrap());
    let green = Color::rgb(0.0, 1.0, 0.0);

    let mut failing = Preview::direct(rect(20.0, 10.0), |_: &mut dyn Canvas| {
        Err(RunonError::render("bad geometry"))
    })
    .with_bg(green);
    draw_preview(&mut canvas, &mut failing, rect(20.0, 10.0), 1.0, 0.0, false).unwrap();
    assert!(failing.error.as_deref().is_some_and(|m| m.contains("bad geometry")));

    let mut errored = Preview::pen(rect(20.0, 10.0), Pen::from_rect(rect(20.0, 10.0)))
        .with_error("boom")
        .with_bg(green);
    draw_preview(&mut canvas, &mut errored, rect(20.0, 10.0), 1.0, 0.0, false).unwrap();

    let frame = canvas.snapshot().unwrap();
    assert_eq!(frame.pixel(10, 5), Some([0, 255, 0, 255]));
}
