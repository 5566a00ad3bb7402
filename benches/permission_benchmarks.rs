// SPDX-License-Identifier: PMPL-1.0-or-later
//! Performance benchmarks for Clearance permission evaluation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use clearance_core::{
    AccessCache, PermissionEvaluator, PermissionGate, PermissionRegistry, Role,
    UnknownPermissionPolicy, User,
};

// ============================================================================
// Single-key checks
// ============================================================================

fn bench_has_permission(c: &mut Criterion) {
    let evaluator = PermissionEvaluator::new(UnknownPermissionPolicy::Allow);
    let mut group = c.benchmark_group("has_permission");

    for role in Role::ALL {
        let user = User::new("bench", role.as_str());
        group.bench_with_input(BenchmarkId::new("known_key", role), &user, |b, user| {
            b.iter(|| black_box(evaluator.has_permission(Some(user), black_box("invoices.approve"))));
        });
    }

    let user = User::new("bench", "employee");
    group.bench_function("unknown_key", |b| {
        b.iter(|| black_box(evaluator.has_permission(Some(&user), black_box("not.a.real.key"))));
    });
    group.bench_function("override_key", |b| {
        let user = User::new("bench", "employee").with_job_complete(true);
        b.iter(|| black_box(evaluator.has_permission(Some(&user), black_box("projects.set_job_complete"))));
    });

    group.finish();
}

// ============================================================================
// Multi-key checks
// ============================================================================

fn bench_multi_key(c: &mut Criterion) {
    let evaluator = PermissionEvaluator::new(UnknownPermissionPolicy::Deny);
    let keys = PermissionRegistry::standard().all_permission_keys().into_iter().map(str::to_string).collect::<Vec<_>>();
    let user = User::new("bench", "manager");
    let mut group = c.benchmark_group("multi_key");

    for size in [1usize, 8, 32] {
        let slice = &keys[..size.min(keys.len())];
        group.throughput(Throughput::Elements(slice.len() as u64));
        group.bench_with_input(BenchmarkId::new("any", size), slice, |b, slice| {
            b.iter(|| black_box(evaluator.has_any_permission(Some(&user), slice)));
        });
        group.bench_with_input(BenchmarkId::new("all", size), slice, |b, slice| {
            b.iter(|| black_box(evaluator.has_all_permissions(Some(&user), slice)));
        });
    }

    group.bench_function("granted_permissions", |b| {
        b.iter(|| black_box(evaluator.granted_permissions(Some(&user)).len()));
    });

    group.finish();
}

// ============================================================================
// Access cache and gates
// ============================================================================

fn bench_access_cache(c: &mut Criterion) {
    let cache = AccessCache::default();
    let alice = User::new("alice", "manager");
    let bob = User::new("bob", "employee");
    let gate = PermissionGate::all_of(["invoices.view", "invoices.approve"]);
    let mut group = c.benchmark_group("access_cache");

    group.bench_function("hit", |b| {
        b.iter(|| black_box(gate.allows(&cache.resolve(Some(&alice)))));
    });
    group.bench_function("alternating_users", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let user = if flip { &alice } else { &bob };
            black_box(gate.allows(&cache.resolve(Some(user))))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_has_permission, bench_multi_key, bench_access_cache);
criterion_main!(benches);
