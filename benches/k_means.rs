use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use geogroup::Partition as _;
use geogroup::Point2D;


const SAMPLE_SIZE: usize = 100_000;

pub fn bench(c: &mut Criterion) {
    let points = generator::neighborhoods(
        Point2D::new(37.45, 126.80),
        Point2D::new(37.70, 127.15),
        10,
        SAMPLE_SIZE,
    );
    let mut partition = vec![0; points.len()];

    let core_count = num_cpus::get();
    let mut group = c.benchmark_group("k_means");

    for thread_count in [1, 2, 4, 8, 16] {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .spawn_handler(|thread| {
                let mut b = std::thread::Builder::new();
                if let Some(name) = thread.name() {
                    b = b.name(name.to_owned());
                }
                if let Some(stack_size) = thread.stack_size() {
                    b = b.stack_size(stack_size);
                }
                b.spawn(move || {
                    let core_idx = thread.index() % core_count;
                    core_affinity::set_for_current(core_affinity::CoreId { id: core_idx });
                    thread.run();
                })?;
                Ok(())
            })
            .build()
            .unwrap();
        group.bench_function(&thread_count.to_string(), |b| {
            pool.install(|| {
                b.iter(|| {
                    geogroup::KMeans {
                        group_count: 10,
                        ..Default::default()
                    }
                    .partition(black_box(&mut partition), black_box(&points[..]))
                })
            });
        });
    }
}

pub fn bench_uniform(c: &mut Criterion) {
    let points = generator::uniform_rectangle(
        Point2D::new(0., 0.),
        Point2D::new(30., 10.),
        SAMPLE_SIZE,
    );
    let mut partition = vec![0; points.len()];

    let mut group = c.benchmark_group("k_means_uniform");
    for group_count in [2, 5, 10] {
        group.bench_function(&group_count.to_string(), |b| {
            b.iter(|| {
                geogroup::KMeans {
                    group_count,
                    ..Default::default()
                }
                .partition(black_box(&mut partition), black_box(&points[..]))
            })
        });
    }
}

criterion_group!(benches, bench, bench_uniform);
criterion_main!(benches);
