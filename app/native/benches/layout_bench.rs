//! Benchmarks for the layout engine and the window directory.
//!
//! Run with: `cargo bench -p winctx`
//!
//! Results are saved to `target/criterion/` with HTML reports.
//!
//! ## Benchmark Groups
//!
//! - `layouts`: Split, snap and center layouts at various window counts
//! - `layouts_stress`: Split layouts with large window counts
//! - `directory`: Eligibility filtering and directory refresh
//! - `geometry`: Rect and monitor lookups

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use winctx_lib::config::{IgnoreRule, MatchStrategy};
use winctx_lib::desktop::layout::compute;
use winctx_lib::desktop::{
    EligibilityFilter, LayoutMode, LayoutWindow, Monitor, MonitorId, MonitorRecord,
    MonitorRegistry, Point, Rect, WindowDirectory, WindowHandle, WindowRecord, WindowState,
};
use winctx_lib::platform::{DesktopSnapshot, SnapshotDesktop};

// ============================================================================
// Test Data
// ============================================================================

const MINIMUM_SIZE: i32 = 100;

/// Two side-by-side 1080p displays with a 40px taskbar.
fn monitor_records() -> Vec<MonitorRecord> {
    vec![
        MonitorRecord {
            id: MonitorId(1),
            bounds: Rect::new(0, 0, 1920, 1080),
            work_area: Rect::new(0, 0, 1920, 1040),
            primary: true,
        },
        MonitorRecord {
            id: MonitorId(2),
            bounds: Rect::new(1920, 0, 3840, 1080),
            work_area: Rect::new(1920, 0, 3840, 1040),
            primary: false,
        },
    ]
}

/// A 4K display, large enough for the stress counts.
fn monitor_4k() -> Monitor {
    MonitorRegistry::from_records(&[MonitorRecord {
        id: MonitorId(1),
        bounds: Rect::new(0, 0, 3840, 2160),
        work_area: Rect::new(0, 0, 3840, 2100),
        primary: true,
    }])
    .primary()
    .clone()
}

fn monitor_1080p() -> Monitor { MonitorRegistry::from_records(&monitor_records()).primary().clone() }

fn layout_windows(count: u64) -> Vec<LayoutWindow> {
    (1..=count)
        .map(|i| LayoutWindow { handle: WindowHandle(i), bounds: Rect::new(100, 100, 900, 700) })
        .collect()
}

fn window_record(handle: u64, title: &str, executable: &str) -> WindowRecord {
    WindowRecord {
        handle: WindowHandle(handle),
        title: title.to_string(),
        pid: 1000 + u32::try_from(handle).unwrap_or(0),
        executable: format!("C:\\Program Files\\{executable}"),
        bounds: Rect::new(100, 100, 900, 700),
        visible: true,
        cloaked: false,
        state: WindowState::Normal,
        tool_window: false,
    }
}

fn window_records(count: u64) -> Vec<WindowRecord> {
    const APPS: [(&str, &str); 5] = [
        ("Document - Editor", "editor.exe"),
        ("Inbox - Mail", "mail.exe"),
        ("Program Manager", "explorer.exe"),
        ("Build Output", "terminal.exe"),
        ("Now Playing", "player.exe"),
    ];
    (0..count)
        .map(|i| {
            let (title, exe) = APPS[usize::try_from(i).unwrap_or(0) % APPS.len()];
            window_record(i + 1, title, exe)
        })
        .collect()
}

fn ignore_rules() -> Vec<IgnoreRule> {
    vec![
        IgnoreRule {
            title: Some("Program Manager".to_string()),
            executable: None,
            strategy: MatchStrategy::Exact,
        },
        IgnoreRule {
            title: None,
            executable: Some("player".to_string()),
            strategy: MatchStrategy::StartsWith,
        },
        IgnoreRule {
            title: Some(r"^Build (Output|Log)$".to_string()),
            executable: Some("terminal.exe".to_string()),
            strategy: MatchStrategy::Regex,
        },
    ]
}

// ============================================================================
// Layout Benchmarks
// ============================================================================

fn bench_layouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("layouts");
    let monitor = monitor_1080p();

    for count in [2, 4, 8] {
        let windows = layout_windows(count);

        group.bench_with_input(BenchmarkId::new("split_horizontal", count), &count, |b, _| {
            b.iter(|| {
                compute(
                    black_box(&windows),
                    black_box(&monitor),
                    black_box(LayoutMode::SplitHorizontal),
                    black_box(MINIMUM_SIZE),
                )
            });
        });

        group.bench_with_input(BenchmarkId::new("split_vertical", count), &count, |b, _| {
            b.iter(|| {
                compute(
                    black_box(&windows),
                    black_box(&monitor),
                    black_box(LayoutMode::SplitVertical),
                    black_box(MINIMUM_SIZE),
                )
            });
        });

        group.bench_with_input(BenchmarkId::new("center", count), &count, |b, _| {
            b.iter(|| {
                compute(
                    black_box(&windows),
                    black_box(&monitor),
                    black_box(LayoutMode::Center),
                    black_box(MINIMUM_SIZE),
                )
            });
        });
    }

    let single = layout_windows(1);
    for mode in [LayoutMode::SnapLeft, LayoutMode::Fullscreen, LayoutMode::Maximize] {
        group.bench_function(mode.to_string(), |b| {
            b.iter(|| {
                compute(
                    black_box(&single),
                    black_box(&monitor),
                    black_box(mode),
                    black_box(MINIMUM_SIZE),
                )
            });
        });
    }

    group.finish();
}

fn bench_layouts_stress(c: &mut Criterion) {
    let mut group = c.benchmark_group("layouts_stress");
    let monitor = monitor_4k();

    for count in [16, 20] {
        let windows = layout_windows(count);

        group.bench_with_input(BenchmarkId::new("split_horizontal", count), &count, |b, _| {
            b.iter(|| {
                compute(
                    black_box(&windows),
                    black_box(&monitor),
                    black_box(LayoutMode::SplitHorizontal),
                    black_box(MINIMUM_SIZE),
                )
            });
        });
    }

    // Rejections should stay cheap: the minimum size check fails fast.
    let crowded = layout_windows(64);
    group.bench_function("split_rejected", |b| {
        b.iter(|| {
            compute(
                black_box(&crowded),
                black_box(&monitor),
                black_box(LayoutMode::SplitVertical),
                black_box(MINIMUM_SIZE),
            )
        });
    });

    group.finish();
}

// ============================================================================
// Directory Benchmarks
// ============================================================================

fn bench_directory(c: &mut Criterion) {
    let mut group = c.benchmark_group("directory");
    let filter = EligibilityFilter::new(&ignore_rules());
    let records = window_records(50);

    group.bench_function("eligibility_50", |b| {
        b.iter(|| records.iter().filter(|record| filter.is_eligible(black_box(record))).count());
    });

    group.bench_function("compile_rules", |b| {
        let rules = ignore_rules();
        b.iter(|| EligibilityFilter::new(black_box(&rules)));
    });

    for count in [10, 50, 200] {
        let mut desktop = SnapshotDesktop::new(DesktopSnapshot {
            monitors: monitor_records(),
            windows: window_records(count),
            ..DesktopSnapshot::default()
        });
        let registry = MonitorRegistry::from_records(&monitor_records());
        let mut directory = WindowDirectory::new();

        group.bench_with_input(BenchmarkId::new("refresh", count), &count, |b, _| {
            b.iter(|| directory.refresh(&mut desktop, black_box(&registry), black_box(&filter)));
        });
    }

    group.finish();
}

// ============================================================================
// Geometry Benchmarks
// ============================================================================

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");
    let registry = MonitorRegistry::from_records(&monitor_records());
    let straddling = Rect::new(1500, 200, 2500, 900);
    let work_area = Rect::new(0, 0, 1920, 1040);

    group.bench_function("overlap_area", |b| {
        b.iter(|| black_box(&straddling).overlap_area(black_box(&work_area)));
    });

    group.bench_function("clamp_within", |b| {
        b.iter(|| black_box(&straddling).clamp_within(black_box(&work_area)));
    });

    group.bench_function("monitor_for_rect", |b| {
        b.iter(|| registry.for_rect(black_box(&straddling)).id);
    });

    group.bench_function("monitor_containing", |b| {
        b.iter(|| registry.containing(black_box(Point::new(2400, 500))).id);
    });

    group.finish();
}

criterion_group!(benches, bench_layouts, bench_layouts_stress, bench_directory, bench_geometry);
criterion_main!(benches);
