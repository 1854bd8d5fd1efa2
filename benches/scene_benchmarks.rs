//! Benchmarks for overlay placement and software rasterization

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use face_filter::{
    asset::ModelAsset,
    catalog::button_presets,
    interaction::CanvasSize,
    landmarks::PoseTransform,
    render::rasterize_overlay,
    scene::{project_overlay, PerspectiveCamera, Scene},
};
use nalgebra::{Matrix4, Vector3};
use std::fmt::Write;
use std::sync::Arc;

/// UV sphere as OBJ text, roughly helmet sized in triangle count
fn sphere_obj(rings: usize, segments: usize) -> String {
    let mut obj = String::new();
    for r in 0..=rings {
        let theta = std::f32::consts::PI * r as f32 / rings as f32;
        for s in 0..segments {
            let phi = std::f32::consts::TAU * s as f32 / segments as f32;
            let _ = writeln!(
                obj,
                "v {} {} {}",
                theta.sin() * phi.cos(),
                theta.cos(),
                theta.sin() * phi.sin()
            );
        }
    }
    for r in 0..rings {
        for s in 0..segments {
            let a = r * segments + s + 1;
            let b = r * segments + (s + 1) % segments + 1;
            let _ = writeln!(obj, "f {} {} {} {}", a, b, b + segments, a + segments);
        }
    }
    obj
}

fn benchmark_parse_obj(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_obj");
    for (rings, segments) in [(16, 32), (64, 128)] {
        let obj = sphere_obj(rings, segments);
        group.bench_with_input(BenchmarkId::new("sphere", rings * segments), &obj, |b, obj| {
            b.iter(|| black_box(ModelAsset::parse_obj(obj).unwrap()));
        });
    }
    group.finish();
}

fn benchmark_project_and_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay");
    let config = button_presets().remove(0);
    let pose = PoseTransform::new(Matrix4::new_translation(&Vector3::new(0.0, 0.0, -60.0)));
    let camera = PerspectiveCamera::for_canvas(CanvasSize::new(1280.0, 720.0), 63.0, 1.0, 10_000.0);
    let projection = camera.projection();
    let scene = Scene::lit();

    for (rings, segments) in [(16, 32), (64, 128)] {
        let asset = Arc::new(ModelAsset::parse_obj(&sphere_obj(rings, segments)).unwrap());

        group.bench_with_input(BenchmarkId::new("project", rings * segments), &asset, |b, asset| {
            b.iter(|| black_box(project_overlay(asset, &config, &pose)));
        });

        let node = project_overlay(&asset, &config, &pose);
        group.bench_with_input(BenchmarkId::new("rasterize", rings * segments), &node, |b, node| {
            b.iter(|| black_box(rasterize_overlay(node, &projection, 1.0, 1280.0, 720.0, &scene)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parse_obj, benchmark_project_and_rasterize);
criterion_main!(benches);
