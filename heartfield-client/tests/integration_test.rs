use anyhow::Result;
use heartfield_client::{run_sequence, ImageSurface, MonoFontRasterizer, RunOptions};
use heartfield_core::sampler::{self, heart_curve, heart_to_screen};
use heartfield_core::{FieldConfig, GlyphRasterizer, Scene, SimpleRng, Surface, TargetLabel};
use heartfield_shared::PhraseSequence;
use std::f32::consts::TAU;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("heartfield-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_font_rasterizer_centers_text() {
    let mut rasterizer = MonoFontRasterizer::new();
    let mask = rasterizer
        .rasterize("Te amo", 800, 600, 96.0)
        .expect("bitmap font always renders");

    let points = sampler::opaque_points(&mask, 4, 50);
    assert!(!points.is_empty());

    let min_x = points.iter().map(|p| p.x).fold(f32::MAX, f32::min);
    let max_x = points.iter().map(|p| p.x).fold(f32::MIN, f32::max);
    let min_y = points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
    let max_y = points.iter().map(|p| p.y).fold(f32::MIN, f32::max);

    // 6 glyphs of 9px at 5x scale, 18px tall
    assert!(min_x >= 400.0 - 135.0 && max_x <= 400.0 + 135.0);
    assert!(min_y >= 300.0 - 45.0 && max_y <= 300.0 + 45.0);
    assert!(min_x < 400.0 && max_x > 400.0);
}

#[test]
fn test_font_rasterizer_handles_latin1() {
    let mut rasterizer = MonoFontRasterizer::new();
    let mask = rasterizer.rasterize("mi niña", 640, 480, 76.8).unwrap();
    assert!(!sampler::opaque_points(&mask, 2, 50).is_empty());
    assert!(rasterizer.rasterize("x", 0, 480, 76.8).is_none());
}

#[test]
fn test_end_to_end_text_then_heart() {
    let config = FieldConfig::simple();
    let mut scene = Scene::new(config.clone(), MonoFontRasterizer::new(), SimpleRng::new(9));
    scene.set_label(TargetLabel::parse("Te amo"));
    scene.start(800.0, 600.0);

    let targets = scene.targets().to_vec();
    assert!(!targets.is_empty());
    for p in &targets {
        assert!((0.0..=800.0).contains(&p.x) && (0.0..=600.0).contains(&p.y));
    }

    scene.set_label(TargetLabel::Heart);
    let count = scene.targets().len();
    let scale = 600.0 * config.heart_scale;
    for (i, p) in scene.targets().iter().enumerate() {
        let t = i as f32 / count as f32 * TAU;
        let expected = heart_to_screen(heart_curve(t), 800.0, 600.0, scale, &config);
        assert!((p.x - expected.x).abs() < 1e-3);
        assert!((p.y - expected.y).abs() < 1e-3);
    }
}

#[test]
fn test_layered_heart_follows_curve_within_jitter() {
    let config = FieldConfig::layered();
    let mut scene = Scene::new(config.clone(), MonoFontRasterizer::new(), SimpleRng::new(9));
    scene.set_label(TargetLabel::Heart);
    scene.start(800.0, 600.0);

    let layers = [1.0, 0.78, 0.58, 0.4, 0.27, 0.17, 0.1];
    let count = scene.targets().len();
    let scale = 600.0 * config.heart_scale;
    for (i, p) in scene.targets().iter().enumerate() {
        let t = (i + 1) as f32 / count as f32 * TAU * layers.len() as f32;
        let layer = layers[i % layers.len()];
        let expected = heart_to_screen(heart_curve(t), 800.0, 600.0, scale * layer, &config);
        assert!((p.x - expected.x).abs() <= 1.1 + 1e-3);
        assert!((p.y - expected.y).abs() <= 1.1 + 1e-3);
    }
}

#[test]
fn test_run_sequence_writes_snapshots() -> Result<()> {
    let dir = scratch_dir("snapshots");
    let mut scene = Scene::new(
        FieldConfig::layered(),
        MonoFontRasterizer::new(),
        SimpleRng::new(1),
    );
    let sequence = PhraseSequence::new(vec!["hola".to_string()], 100);
    let options = RunOptions {
        width: 320,
        height: 240,
        frames: 20,
        snapshot_every: 10,
        out_dir: Some(dir.clone()),
    };

    let (written, last_frame) = run_sequence(&mut scene, &sequence, &options)?;

    assert_eq!(written.len(), 2);
    assert!(written.iter().all(|path| path.exists()));
    assert!(last_frame.lit_pixels() > 0);
    // sequence ran out after 100ms, so the run ends on the heart
    assert_eq!(scene.label(), &TargetLabel::Heart);
    assert!(!scene.is_running());

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_run_sequence_rejects_empty_viewport() {
    let mut scene = Scene::new(
        FieldConfig::layered(),
        MonoFontRasterizer::new(),
        SimpleRng::new(1),
    );
    let options = RunOptions {
        width: 0,
        height: 240,
        frames: 5,
        snapshot_every: 0,
        out_dir: None,
    };

    assert!(run_sequence(&mut scene, &PhraseSequence::default(), &options).is_err());
}

#[test]
fn test_particles_settle_into_text() {
    let config = FieldConfig::layered();
    let mut scene = Scene::new(config, MonoFontRasterizer::new(), SimpleRng::new(2));
    scene.start(800.0, 600.0);
    let mut surface = ImageSurface::new(800, 600);

    for _ in 0..600 {
        scene.frame(&mut surface);
    }

    let field = scene.field().unwrap();
    let targets = scene.targets();
    let settled = field
        .particles
        .iter()
        .enumerate()
        .filter(|(i, p)| p.position.distance(&targets[i % targets.len()]) < 0.5)
        .count();
    assert_eq!(settled, field.len());

    surface.clear();
    assert_eq!(surface.lit_pixels(), 0);
}
