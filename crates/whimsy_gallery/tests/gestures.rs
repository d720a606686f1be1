//! Whole-frame gesture scenarios driven through `Gallery`

use whimsy_core::approx_eq;
use whimsy_gallery::{
    AnimatorConfig, FlipDir, Gallery, GalleryEvent, JumpDir, ScrubDir, CENTER_STACK, LEFT_STACK, RIGHT_STACK,
};

const FRAME: f32 = 1.0 / 60.0;

fn gallery_with(config: AnimatorConfig) -> Gallery {
    Gallery::new(1280.0, 720.0, 5, config).unwrap()
}

fn run(gallery: &mut Gallery, seconds: f32) {
    for _ in 0..(seconds / FRAME).ceil() as usize {
        gallery.update(FRAME).unwrap();
    }
}

fn scrub_to_end(gallery: &mut Gallery, dir: ScrubDir) {
    for step in 1..=20 {
        gallery.set_scrub(dir, step as f32 / 20.0);
        gallery.update(FRAME).unwrap();
    }
    gallery.commit_scrub();
    gallery.update(FRAME).unwrap();
}

#[test]
fn jump_there_and_back_restores_order() {
    let mut gallery = gallery_with(AnimatorConfig::default());

    gallery.request_jump(JumpDir::Forward);
    run(&mut gallery, 0.6);
    assert_eq!(gallery.center().borrow().order(), vec![1, 2, 3, 4, 0]);

    gallery.request_jump(JumpDir::Backward);
    run(&mut gallery, 0.6);

    let center = gallery.center().borrow();
    assert_eq!(center.order(), vec![0, 1, 2, 3, 4]);
    assert_eq!((center.y, center.z), (0.0, 0.0));
    drop(center);

    assert_eq!(
        gallery.drain_events(),
        vec![
            GalleryEvent::JumpFinished(JumpDir::Forward),
            GalleryEvent::JumpFinished(JumpDir::Backward),
        ]
    );
    assert!(!gallery.is_animating());
}

#[test]
fn interrupted_flip_never_reports() {
    let mut gallery = gallery_with(AnimatorConfig::default());

    gallery.request_flip(FlipDir::Up);
    run(&mut gallery, 0.2);
    gallery.request_jump(JumpDir::Forward);
    run(&mut gallery, 1.0);

    assert_eq!(gallery.drain_events(), vec![GalleryEvent::JumpFinished(JumpDir::Forward)]);
    // The flip was abandoned before shifting; only the jump moved the order
    assert_eq!(gallery.center().borrow().order(), vec![1, 2, 3, 4, 0]);
    let front = gallery.center().borrow().front().unwrap().clone();
    assert_eq!(front.borrow().rx, 0.0);
}

#[test]
fn focus_survives_a_jump() {
    let config = AnimatorConfig::default();
    let focus_scale = config.focus_scale;
    let zoom_depth = config.zoom_depth;
    let mut gallery = gallery_with(config);

    scrub_to_end(&mut gallery, ScrubDir::In);
    assert_eq!(gallery.animator().settled_focus(), 1.0);
    assert!(approx_eq(gallery.animator().selected_stack_offset_z(), zoom_depth, 1e-4));
    let left_x = gallery.left().borrow().x;
    assert!(left_x < -1280.0 * 0.36);

    gallery.request_jump(JumpDir::Forward);
    gallery.update(FRAME).unwrap();
    assert!(gallery.animator().selected_stack_offset_z() > zoom_depth);
    run(&mut gallery, 0.6);

    let center = gallery.center().borrow();
    assert!(approx_eq(center.sx, focus_scale, 1e-4));
    assert!(approx_eq(center.z, zoom_depth, 1e-4));
    assert_eq!(gallery.left().borrow().x, left_x);
    assert!(gallery.animator().gesture_state(CENTER_STACK).is_idle());
    assert!(gallery.animator().gesture_state(LEFT_STACK).is_idle());
}

#[test]
fn scrub_out_releases_focus() {
    let mut gallery = gallery_with(AnimatorConfig::default());
    let rest_z = gallery.camera().borrow().z();

    scrub_to_end(&mut gallery, ScrubDir::In);
    assert!(gallery.camera().borrow().z() < rest_z);

    scrub_to_end(&mut gallery, ScrubDir::Out);
    assert_eq!(gallery.animator().settled_focus(), 0.0);
    assert!(approx_eq(gallery.camera().borrow().z(), rest_z, 1e-3));
    assert!(approx_eq(gallery.center().borrow().sx, 1.0, 1e-5));
}

#[test]
fn configured_durations_drive_gestures() {
    let config = AnimatorConfig::from_toml_str(
        r#"
        flip_duration = 0.2
        flip_easing = 0
        "#,
    )
    .unwrap();
    let mut gallery = gallery_with(config);

    gallery.request_flip(FlipDir::Down);
    run(&mut gallery, 0.15);
    assert!(gallery.drain_events().is_empty());
    run(&mut gallery, 0.1);
    assert_eq!(gallery.drain_events(), vec![GalleryEvent::FlipFinished(FlipDir::Down)]);
    assert_eq!(gallery.center().borrow().order(), vec![4, 0, 1, 2, 3]);
}

fn assert_all_idle(gallery: &Gallery) {
    for id in [CENTER_STACK, LEFT_STACK, RIGHT_STACK] {
        let state = gallery.animator().gesture_state(id);
        assert!(state.is_idle(), "stack {} is {}", id.0, state.name());
    }
}

#[test]
fn jump_mid_scrub_settles_every_stack() {
    let mut gallery = gallery_with(AnimatorConfig::default());
    let rest_z = gallery.camera().borrow().z();
    let left_x = gallery.left().borrow().x;

    gallery.set_scrub(ScrubDir::In, 0.5);
    gallery.update(FRAME).unwrap();
    assert!(gallery.left().borrow().x < left_x);

    gallery.request_jump(JumpDir::Forward);
    run(&mut gallery, 1.0);

    assert_eq!(gallery.drain_events(), vec![GalleryEvent::JumpFinished(JumpDir::Forward)]);
    assert_all_idle(&gallery);
    assert_eq!(gallery.left().borrow().x, left_x);
    assert!(approx_eq(gallery.camera().borrow().z(), rest_z, 1e-3));
    let center = gallery.center().borrow();
    assert_eq!(center.order(), vec![1, 2, 3, 4, 0]);
    assert!(approx_eq(center.sx, 1.0, 1e-5));
    assert_eq!((center.y, center.z), (0.0, 0.0));
    drop(center);

    // Nothing is left to release
    gallery.commit_scrub();
    gallery.update(FRAME).unwrap();
    assert_eq!(gallery.animator().settled_focus(), 0.0);
    assert!(!gallery.is_animating());
}

#[test]
fn flip_mid_scrub_starts_from_rest() {
    let mut gallery = gallery_with(AnimatorConfig::default());
    let rest_z = gallery.camera().borrow().z();

    gallery.set_scrub(ScrubDir::Up, 0.6);
    gallery.update(FRAME).unwrap();
    assert!(gallery.right().borrow().y > 0.0);

    gallery.request_flip(FlipDir::Up);
    run(&mut gallery, 1.0);

    assert_eq!(gallery.drain_events(), vec![GalleryEvent::FlipFinished(FlipDir::Up)]);
    assert_all_idle(&gallery);
    assert_eq!(gallery.center().borrow().order(), vec![1, 2, 3, 4, 0]);
    assert_eq!(gallery.right().borrow().y, 0.0);
    assert_eq!(gallery.left().borrow().y, 0.0);
    assert!(approx_eq(gallery.camera().borrow().z(), rest_z, 1e-3));
    let front = gallery.center().borrow().front().unwrap().clone();
    assert_eq!(front.borrow().rx, 0.0);
}

#[test]
fn jump_during_settle_returns_camera_to_rest() {
    let mut gallery = gallery_with(AnimatorConfig::default());
    let rest_z = gallery.camera().borrow().z();

    gallery.set_scrub(ScrubDir::In, 0.8);
    gallery.update(FRAME).unwrap();
    gallery.commit_scrub();
    gallery.update(FRAME).unwrap();
    gallery.update(FRAME).unwrap();
    assert_eq!(gallery.animator().gesture_state(CENTER_STACK).name(), "settling");
    assert!(gallery.camera().borrow().z() < rest_z - 1.0);

    gallery.request_jump(JumpDir::Forward);
    run(&mut gallery, 1.0);

    assert!(approx_eq(gallery.camera().borrow().z(), rest_z, 1e-3));
    assert!(approx_eq(gallery.center().borrow().sx, 1.0, 1e-5));
    assert_all_idle(&gallery);
    assert_eq!(gallery.drain_events(), vec![GalleryEvent::JumpFinished(JumpDir::Forward)]);
}

#[test]
fn selected_offset_follows_release() {
    let mut gallery = gallery_with(AnimatorConfig::default());

    gallery.set_scrub(ScrubDir::In, 0.8);
    gallery.update(FRAME).unwrap();
    let held = gallery.animator().selected_stack_offset_z();
    assert!(approx_eq(held, gallery.center().borrow().z, 1e-3));
    assert!(held > 0.0);

    gallery.commit_scrub();
    gallery.update(FRAME).unwrap();
    let easing = gallery.animator().selected_stack_offset_z();
    // Still tracking the stack as it eases back, not snapped to rest
    assert!(easing > held * 0.5 && easing < held);
    assert!(approx_eq(easing, gallery.center().borrow().z, 1e-2));

    run(&mut gallery, 0.5);
    assert!(approx_eq(gallery.animator().selected_stack_offset_z(), 0.0, 1e-4));
    assert_eq!(gallery.center().borrow().z, 0.0);
}
