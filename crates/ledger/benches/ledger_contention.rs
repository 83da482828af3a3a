use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use lockstep_ledger::{AccountId, Ledger};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;

const ACCOUNTS: usize = 10;
const OPS_PER_THREAD: usize = 10_000;

fn run_workers(threads: usize) -> bool {
    let ledger = Arc::new(Ledger::new(ACCOUNTS, 1_000).unwrap());

    let workers: Vec<_> = (0..threads)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(t as u64);
                for _ in 0..OPS_PER_THREAD {
                    let from = rng.gen_range(0..ACCOUNTS);
                    let to = (from + rng.gen_range(1..ACCOUNTS)) % ACCOUNTS;
                    let amount = rng.gen_range(1..=100);
                    black_box(ledger.transfer(AccountId::new(from), AccountId::new(to), amount));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    ledger.consistency_check()
}

fn bench_transfer_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer_scaling");
    group.sample_size(10);

    for threads in [1usize, 2, 4, 8, 16] {
        group.throughput(Throughput::Elements((threads * OPS_PER_THREAD) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| assert!(run_workers(threads)));
        });
    }

    group.finish();
}

fn bench_single_thread_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread");
    let ledger = Ledger::new(ACCOUNTS, 1_000_000).unwrap();

    group.bench_function("transfer", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let from = i % ACCOUNTS;
            let to = (i + 1) % ACCOUNTS;
            i = i.wrapping_add(1);
            black_box(ledger.transfer(AccountId::new(from), AccountId::new(to), 1))
        });
    });

    group.bench_function("total_balance", |b| {
        b.iter(|| black_box(ledger.total_balance()));
    });

    group.finish();
}

criterion_group!(benches, bench_transfer_scaling, bench_single_thread_ops);
criterion_main!(benches);
