use super::*;
use crate::encode::sink::{EncodedVideo, InMemoryRuntime};
use crate::history::MAX_HISTORY;
use crate::render::surface::{DrawCommand, FrameRGBA, RecordingSurface};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct Collect {
    saved: Vec<(String, usize)>,
    bytes: Vec<u8>,
    failures: Vec<String>,
    fail_save: bool,
}

impl ExportSink for Collect {
    fn save(&mut self, video: &EncodedVideo, suggested_name: &str) -> SketchResult<()> {
        if self.fail_save {
            return Err(SketchError::validation("disk full"));
        }
        self.saved.push((suggested_name.to_owned(), video.bytes.len()));
        self.bytes = video.bytes.clone();
        Ok(())
    }
}

impl Notifier for Collect {
    fn notify_failure(&mut self, message: &str) {
        self.failures.push(message.to_owned());
    }
}

/// Export surface that keeps the draw commands of every frame read from it.
struct FrameTap {
    inner: RecordingSurface,
    frames: Rc<RefCell<Vec<Vec<DrawCommand>>>>,
}

impl Surface for FrameTap {
    fn canvas(&self) -> Canvas {
        self.inner.canvas()
    }

    fn clear(&mut self, color: Rgba8) {
        self.inner.clear(color);
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &LineStyle) {
        self.inner.stroke_polyline(points, style);
    }

    fn read_frame(&mut self) -> SketchResult<FrameRGBA> {
        self.frames.borrow_mut().push(self.inner.commands().to_vec());
        self.inner.read_frame()
    }
}

fn same_drawing(a: &[DrawCommand], b: &[DrawCommand]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|pair| match pair {
            (DrawCommand::Clear(x), DrawCommand::Clear(y)) => x == y,
            (
                DrawCommand::Polyline {
                    points: pa,
                    style: sa,
                },
                DrawCommand::Polyline {
                    points: pb,
                    style: sb,
                },
            ) => {
                sa.color == sb.color
                    && (sa.width - sb.width).abs() < 1e-9
                    && pa.len() == pb.len()
                    && pa.iter().zip(pb).all(|(p, q)| p.distance(*q) < 1e-9)
            }
            _ => false,
        })
}

fn small_config() -> SketchConfig {
    SketchConfig {
        canvas: Canvas {
            width: 40,
            height: 30,
        },
        export: ExportSettings {
            duration_secs: 1,
            fps: 3,
            grace_ms: 100,
            ..ExportSettings::default()
        },
        ..SketchConfig::default()
    }
}

fn sketch() -> Sketch {
    Sketch::new(small_config()).unwrap().with_rng(Rng64::new(3))
}

fn drag(s: &mut Sketch, from: Point, to: Point, steps: usize) -> Option<GestureOutcome> {
    s.pointer_down(from);
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        s.pointer_move(from.lerp(to, t));
    }
    s.pointer_up()
}

#[test]
fn history_starts_with_empty_set() {
    let s = sketch();
    assert_eq!(s.history().len(), 1);
    assert!(s.strokes().is_empty());
    assert!(!s.is_exporting());
}

#[test]
fn drawing_appends_resampled_stroke_with_current_style() {
    let mut s = sketch();
    s.params_mut().color = Rgba8::rgb(200, 0, 0);
    s.params_mut().size = 6.0;
    let out = drag(&mut s, Point::new(0.0, 0.0), Point::new(300.0, 0.0), 299);
    assert_eq!(out, Some(GestureOutcome::Drawn));
    assert_eq!(s.strokes().len(), 1);

    let stroke = &s.strokes().as_slice()[0];
    assert_eq!(stroke.points().len(), 60);
    assert_eq!(stroke.color(), Rgba8::rgb(200, 0, 0));
    assert_eq!(stroke.size(), 6.0);
    assert!((0.0..1000.0).contains(&stroke.phase()));
    assert_eq!(s.history().len(), 2);
}

#[test]
fn single_point_gesture_is_dropped() {
    let mut s = sketch();
    s.pointer_down(Point::new(5.0, 5.0));
    assert_eq!(s.pointer_up(), Some(GestureOutcome::Dropped));
    assert!(s.strokes().is_empty());
    assert_eq!(s.history().len(), 1);
}

#[test]
fn release_without_press_does_nothing() {
    let mut s = sketch();
    s.pointer_move(Point::new(1.0, 1.0));
    assert_eq!(s.pointer_up(), None);
    assert!(!s.is_gesture_active());
}

#[test]
fn leaving_commits_like_release() {
    let mut s = sketch();
    s.pointer_enter();
    s.pointer_down(Point::new(0.0, 0.0));
    s.pointer_move(Point::new(20.0, 0.0));
    assert_eq!(s.pointer_leave(), Some(GestureOutcome::Drawn));
    assert_eq!(s.pointer_leave(), None);
}

#[test]
fn erase_removes_hit_strokes_in_one_snapshot() {
    let mut s = sketch();
    drag(&mut s, Point::new(0.0, 0.0), Point::new(100.0, 0.0), 20);
    drag(&mut s, Point::new(0.0, 50.0), Point::new(100.0, 50.0), 20);
    drag(&mut s, Point::new(0.0, 200.0), Point::new(100.0, 200.0), 20);
    assert_eq!(s.history().len(), 4);

    s.apply(Command::EraserMode);
    let out = drag(&mut s, Point::new(50.0, -10.0), Point::new(50.0, 60.0), 14);
    assert_eq!(out, Some(GestureOutcome::Erased { removed: 2 }));
    assert_eq!(s.strokes().len(), 1);
    assert_eq!(s.history().len(), 5);

    assert!(s.undo());
    assert_eq!(s.strokes().len(), 3);
}

#[test]
fn erase_that_misses_still_records_one_snapshot() {
    let mut s = sketch();
    drag(&mut s, Point::new(0.0, 0.0), Point::new(100.0, 0.0), 20);
    s.apply(Command::EraserMode);
    let out = drag(&mut s, Point::new(0.0, 100.0), Point::new(100.0, 100.0), 20);
    assert_eq!(out, Some(GestureOutcome::Erased { removed: 0 }));
    assert_eq!(s.strokes().len(), 1);
    assert_eq!(s.history().len(), 3);

    assert!(s.undo());
    assert_eq!(s.strokes().len(), 1);
    assert!(s.undo());
    assert!(s.strokes().is_empty());
}

#[test]
fn undo_redo_are_noops_at_bounds() {
    let mut s = sketch();
    assert!(!s.undo());
    assert!(!s.redo());

    drag(&mut s, Point::new(0.0, 0.0), Point::new(50.0, 0.0), 10);
    assert!(s.undo());
    assert!(s.strokes().is_empty());
    assert!(s.redo());
    assert_eq!(s.strokes().len(), 1);
    assert!(!s.redo());
}

#[test]
fn new_action_after_undo_discards_redo() {
    let mut s = sketch();
    drag(&mut s, Point::new(0.0, 0.0), Point::new(50.0, 0.0), 10);
    drag(&mut s, Point::new(0.0, 20.0), Point::new(50.0, 20.0), 10);
    s.undo();
    drag(&mut s, Point::new(0.0, 40.0), Point::new(50.0, 40.0), 10);
    assert!(!s.redo());
    assert_eq!(s.strokes().len(), 2);
}

#[test]
fn history_is_bounded() {
    let mut s = sketch();
    for i in 0..(MAX_HISTORY + 5) {
        let y = i as f64;
        drag(&mut s, Point::new(0.0, y), Point::new(30.0, y), 5);
    }
    assert_eq!(s.history().len(), MAX_HISTORY);
    let mut undos = 0;
    while s.undo() {
        undos += 1;
    }
    assert_eq!(undos, MAX_HISTORY - 1);
    assert_eq!(s.strokes().len(), 6);
}

#[test]
fn keys_switch_tools_and_undo() {
    let mut s = sketch();
    drag(&mut s, Point::new(0.0, 0.0), Point::new(50.0, 0.0), 10);
    assert_eq!(s.key(&KeyChord::plain("e")), Some(Command::EraserMode));
    assert_eq!(s.params().tool, ToolMode::Erase);
    assert_eq!(s.key(&KeyChord::ctrl("z")), Some(Command::Undo));
    assert!(s.strokes().is_empty());
    assert_eq!(s.key(&KeyChord::plain("x")), None);
    s.apply(Command::PenMode);
    assert_eq!(s.params().tool, ToolMode::Draw);
}

#[test]
fn tick_renders_strokes_and_gesture_preview() {
    let mut s = sketch();
    drag(&mut s, Point::new(0.0, 0.0), Point::new(30.0, 0.0), 10);
    s.pointer_down(Point::new(0.0, 10.0));
    s.pointer_move(Point::new(10.0, 10.0));

    let mut surface = RecordingSurface::new(s.canvas());
    assert!(s.tick(Instant::now(), &mut surface));
    let lines: Vec<_> = surface.polylines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].0, &[Point::new(0.0, 10.0), Point::new(10.0, 10.0)][..]);
    assert_eq!(lines[1].1.width, s.params().size);

    s.apply(Command::EraserMode);
    assert!(s.tick(Instant::now(), &mut surface));
    let last = surface.polylines().last().unwrap().1.width;
    assert_eq!(last, ERASE_RADIUS * 2.0);
}

#[test]
fn set_params_validates() {
    let mut s = sketch();
    let mut p = s.params().clone();
    p.size = -1.0;
    assert!(s.set_params(p).is_err());
    assert_eq!(s.params().size, 3.0);
}

#[test]
fn export_suppresses_tick_and_completes() {
    let mut s = sketch();
    drag(&mut s, Point::new(2.0, 2.0), Point::new(30.0, 20.0), 10);
    let mut io = Collect::default();
    let rt = InMemoryRuntime::new();
    let t0 = Instant::now();

    let mut notifier = Collect::default();
    s.start_export(&rt, t0, &mut notifier).unwrap();
    assert!(s.is_exporting());
    let mut surface = RecordingSurface::new(s.canvas());
    assert!(!s.tick(t0, &mut surface));
    assert!(surface.commands().is_empty());
    assert!(s.start_export(&rt, t0, &mut notifier).is_err());

    assert_eq!(s.pump_export(t0, &mut io, &mut notifier), ExportStatus::Waiting);
    let later = t0 + Duration::from_millis(150);
    assert_eq!(
        s.pump_export(later, &mut io, &mut notifier),
        ExportStatus::Rendering {
            rendered: 1,
            total: 3
        }
    );
    s.pump_export(later, &mut io, &mut notifier);
    let done = s.pump_export(later, &mut io, &mut notifier);
    assert_eq!(
        done,
        ExportStatus::Completed {
            filename: "jiggly_vectorizer_export.webm".to_owned(),
            frames: 3
        }
    );
    assert_eq!(io.saved, vec![("jiggly_vectorizer_export.webm".to_owned(), 3 * 40 * 30 * 4)]);
    assert!(!s.is_exporting());
    assert!(notifier.failures.is_empty());
    assert!(s.tick(later, &mut surface));
    assert_eq!(s.pump_export(later, &mut io, &mut notifier), ExportStatus::Idle);
}

#[test]
fn tick_and_export_draw_the_same_frame_at_equal_seconds() {
    let epoch = Instant::now();
    let config = SketchConfig {
        export: ExportSettings {
            duration_secs: 3,
            fps: 30,
            grace_ms: 0,
            ..ExportSettings::default()
        },
        ..small_config()
    };
    let mut s = Sketch::new(config)
        .unwrap()
        .with_rng(Rng64::new(3))
        .with_clock(WallClock::new(epoch));
    s.params_mut().thickness_intensity = 1.5;
    drag(&mut s, Point::new(2.0, 2.0), Point::new(36.0, 26.0), 12);
    drag(&mut s, Point::new(4.0, 26.0), Point::new(34.0, 4.0), 12);

    let mut live = RecordingSurface::new(s.canvas());
    assert!(s.tick(epoch + Duration::from_secs(2), &mut live));

    let frames = Rc::new(RefCell::new(Vec::new()));
    let tap = FrameTap {
        inner: RecordingSurface::new(s.canvas()),
        frames: Rc::clone(&frames),
    };
    let rt = InMemoryRuntime::new();
    let mut io = Collect::default();
    let mut notifier = Collect::default();
    s.start_export_on(&rt, Box::new(tap), epoch, &mut notifier)
        .unwrap();
    while s.is_exporting() {
        s.pump_export(epoch, &mut io, &mut notifier);
    }
    assert!(notifier.failures.is_empty());
    assert_eq!(io.saved.len(), 1);

    let frames = frames.borrow();
    assert_eq!(frames.len(), 90);
    assert!(same_drawing(live.commands(), &frames[60]));
    assert!(!same_drawing(live.commands(), &frames[0]));
}

#[test]
fn parameter_changes_reach_frames_rendered_afterwards() {
    fn run(retune_after_first_frame: bool) -> Vec<u8> {
        let mut s = sketch();
        drag(&mut s, Point::new(2.0, 15.0), Point::new(38.0, 15.0), 12);
        let rt = InMemoryRuntime::new();
        let mut io = Collect::default();
        let mut notifier = Collect::default();
        let t0 = Instant::now();
        s.start_export(&rt, t0, &mut notifier).unwrap();

        let later = t0 + Duration::from_secs(1);
        assert_eq!(
            s.pump_export(later, &mut io, &mut notifier),
            ExportStatus::Rendering {
                rendered: 1,
                total: 3
            }
        );
        if retune_after_first_frame {
            s.params_mut().jiggle_intensity = 12.0;
        }
        while s.is_exporting() {
            s.pump_export(later, &mut io, &mut notifier);
        }
        assert!(notifier.failures.is_empty());
        io.bytes
    }

    let frame = 40 * 30 * 4;
    let base = run(false);
    let tuned = run(true);
    assert_eq!(base.len(), 3 * frame);
    assert_eq!(tuned.len(), 3 * frame);
    assert_eq!(base[..frame], tuned[..frame]);
    assert_ne!(base[frame..2 * frame], tuned[frame..2 * frame]);
    assert_ne!(base[2 * frame..], tuned[2 * frame..]);
}

#[test]
fn unsupported_encoding_notifies_and_stays_idle() {
    let mut s = sketch();
    let rt = InMemoryRuntime::supporting(&[]);
    let mut notifier = Collect::default();
    assert!(s.start_export(&rt, Instant::now(), &mut notifier).is_err());
    assert!(!s.is_exporting());
    assert_eq!(notifier.failures.len(), 1);
}

#[test]
fn encoder_failure_clears_flag_and_notifies_once() {
    let mut s = sketch();
    let rt = InMemoryRuntime::new().failing_at(1);
    let mut io = Collect::default();
    let mut notifier = Collect::default();
    let t0 = Instant::now();
    s.start_export(&rt, t0, &mut notifier).unwrap();
    let later = t0 + Duration::from_secs(1);

    assert!(matches!(
        s.pump_export(later, &mut io, &mut notifier),
        ExportStatus::Rendering { .. }
    ));
    assert!(matches!(
        s.pump_export(later, &mut io, &mut notifier),
        ExportStatus::Failed { .. }
    ));
    assert!(!s.is_exporting());
    assert_eq!(s.pump_export(later, &mut io, &mut notifier), ExportStatus::Idle);
    assert_eq!(notifier.failures.len(), 1);
    assert!(io.saved.is_empty());

    let mut surface = RecordingSurface::new(s.canvas());
    assert!(s.tick(later, &mut surface));
}

#[test]
fn save_failure_is_reported() {
    let mut s = sketch();
    s.export_settings_mut().fps = 1;
    let rt = InMemoryRuntime::new();
    let mut io = Collect {
        fail_save: true,
        ..Collect::default()
    };
    let mut notifier = Collect::default();
    let t0 = Instant::now();
    s.start_export(&rt, t0, &mut notifier).unwrap();
    let status = s.pump_export(t0 + Duration::from_secs(1), &mut io, &mut notifier);
    assert!(matches!(status, ExportStatus::Failed { .. }));
    assert_eq!(notifier.failures.len(), 1);
    assert!(!s.is_exporting());
}

#[test]
fn cancel_export_restores_interactive_loop() {
    let mut s = sketch();
    let rt = InMemoryRuntime::new();
    let mut notifier = Collect::default();
    s.start_export(&rt, Instant::now(), &mut notifier).unwrap();
    s.cancel_export();
    assert!(!s.is_exporting());
    assert!(notifier.failures.is_empty());
}
