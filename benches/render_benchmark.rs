//! Benchmarks for rendering and rasterization.
//!
//! Run with: cargo bench
//!
//! Documents are synthetic, with a configurable number of experience entries.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cvbuilder::export::{color_override_sheet, image_to_pdf, AssetSet, CaptureOptions, PageSize};
use cvbuilder::model::{Edit, Experience, Skill, SkillCategory};
use cvbuilder::raster::{BoxRasterizer, RasterRequest};
use cvbuilder::{apply, render, surface_for, Document, RenderOptions, Surface, ROOT_ID};

/// Creates a document with `entries` experiences and a handful of skills.
fn create_document(entries: usize) -> Document {
    let mut doc = Document::new();
    for i in 0..entries {
        let mut exp = Experience::new(format!("e{}", i), "Engineer", format!("Company {}", i));
        exp.description = "Built and shipped things. ".repeat(6);
        exp.achievements = vec!["Cut latency in half".into(), "Mentored the team".into()];
        exp.technologies = vec!["Rust".into(), "PostgreSQL".into(), "Docker".into()];
        doc = apply(&doc, Edit::AddExperience(exp));
    }
    for (i, name) in ["Rust", "TypeScript", "Kubernetes", "React"].iter().enumerate() {
        doc = apply(
            &doc,
            Edit::AddSkill(Skill::new(format!("s{}", i), *name, SkillCategory::Tool)),
        );
    }
    doc
}

/// Surface with the capture color override already installed.
fn capture_surface(doc: &Document) -> Surface {
    let mut surface = surface_for(doc, &RenderOptions::default());
    let root = surface.tree().root();
    let sheet = color_override_sheet(&surface, root, ROOT_ID);
    surface.inject_sheet(sheet);
    surface
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for entries in [1, 5, 20] {
        let doc = create_document(entries);
        group.bench_function(format!("{}_entries", entries), |b| {
            b.iter(|| render(black_box(&doc), &RenderOptions::default()))
        });
    }

    group.finish();
}

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");
    group.sample_size(20);

    let assets = AssetSet::new();
    let rasterizer = BoxRasterizer::new();
    for scale in [1.0, 2.0] {
        let surface = capture_surface(&create_document(5));
        let options = CaptureOptions::new().with_scale(scale);
        group.bench_function(format!("scale_{}", scale), |b| {
            b.iter(|| {
                rasterizer.render(RasterRequest {
                    surface: black_box(&surface),
                    root: surface.tree().root(),
                    assets: &assets,
                    options: &options,
                })
            })
        });
    }

    group.finish();
}

fn bench_pdf_packaging(c: &mut Criterion) {
    let surface = capture_surface(&create_document(5));
    let bitmap = BoxRasterizer::new()
        .render(RasterRequest {
            surface: &surface,
            root: surface.tree().root(),
            assets: &AssetSet::new(),
            options: &CaptureOptions::new(),
        })
        .expect("preview rasterizes once colors are pinned");

    c.bench_function("image_to_pdf_11x14", |b| {
        b.iter(|| image_to_pdf(black_box(&bitmap), PageSize::Oversized, "CV.pdf"))
    });
}

criterion_group!(benches, bench_render, bench_rasterize, bench_pdf_packaging);
criterion_main!(benches);
