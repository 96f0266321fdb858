//! Performance benchmarks for building and evaluating expression trees.
//!
//! - Building: long operator chains, nested brackets, argument lists
//! - Evaluation: interpreting a prebuilt lambda

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flexpr::prelude::*;
use std::hint::black_box;

/// `1 + 2 * 3 - 4 / 5 + ...` with `terms` operands.
fn operator_chain(registry: &TypeRegistry, terms: i32) -> Result<NodeRef, BuildError> {
    let mut body = BodyBuilder::expression(registry, DataType::Int32);
    body.constant(1)?;
    for i in 1..terms {
        match i % 4 {
            0 => body.add()?,
            1 => body.multiply()?,
            2 => body.subtract()?,
            _ => body.shift_left()?,
        }
        body.constant(i % 7 + 1)?;
    }
    body.end_statement()?;
    body.complete()
}

/// `((((1 + 1) + 1) + 1) ...)` with `depth` brackets.
fn nested_brackets(registry: &TypeRegistry, depth: usize) -> Result<NodeRef, BuildError> {
    let mut body = BodyBuilder::expression(registry, DataType::Int32);
    for _ in 0..depth {
        body.brace()?;
    }
    body.constant(1)?;
    for _ in 0..depth {
        body.add()?;
        body.constant(1)?;
        body.unbrace()?;
    }
    body.end_statement()?;
    body.complete()
}

fn building_benchmarks(c: &mut Criterion) {
    let registry = TypeRegistry::with_builtins();
    let mut group = c.benchmark_group("builder/build");

    for terms in [16, 256] {
        group.throughput(Throughput::Elements(terms as u64));
        group.bench_function(format!("operator_chain_{}", terms), |b| {
            b.iter(|| operator_chain(&registry, black_box(terms)).map(|tree| tree.data_type()))
        });
    }

    for depth in [16, 128] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("nested_brackets_{}", depth), |b| {
            b.iter(|| nested_brackets(&registry, black_box(depth)).map(|tree| tree.data_type()))
        });
    }

    group.bench_function("string_length_arguments", |b| {
        b.iter(|| {
            Flex::start_expression(&registry, DataType::Int32)
                .constant(black_box("abc"))
                .and_then(|s| s.property("Length"))
                .and_then(|s| s.add())
                .and_then(|s| s.constant("defg"))
                .and_then(|s| s.property("Length"))
                .and_then(|s| s.end_statement())
                .and_then(|s| s.complete_lambda())
                .map(|lambda| lambda.arity())
        })
    });

    group.finish();
}

fn evaluation_benchmarks(c: &mut Criterion) {
    let registry = TypeRegistry::with_builtins();
    let signature = Signature::new(DataType::Int32, vec![DataType::Int32]);

    // int total; total += n * 3; total <<= 1; total > 100 ? total - 100 : total;
    let Ok(lambda) = Flex::start_lambda(&registry, &signature, &["n"])
        .and_then(|s| s.declare(DataType::Int32, "total"))
        .and_then(|s| s.var("total"))
        .and_then(|s| s.add_assign())
        .and_then(|s| s.var("n"))
        .and_then(|s| s.multiply())
        .and_then(|s| s.constant(3))
        .and_then(|s| s.end_statement())
        .and_then(|s| s.var("total"))
        .and_then(|s| s.shift_left_assign())
        .and_then(|s| s.constant(1))
        .and_then(|s| s.end_statement())
        .and_then(|s| s.var("total"))
        .and_then(|s| s.greater_than())
        .and_then(|s| s.constant(100))
        .and_then(|s| s.inline_if())
        .and_then(|s| s.var("total"))
        .and_then(|s| s.subtract())
        .and_then(|s| s.constant(100))
        .and_then(|s| s.inline_else())
        .and_then(|s| s.var("total"))
        .and_then(|s| s.end_statement())
        .and_then(|s| s.complete_lambda())
    else {
        panic!("benchmark lambda failed to build");
    };

    let interpreter = Interpreter::new(&registry);
    let mut group = c.benchmark_group("builder/evaluate");
    group.bench_function("statements_with_conditional", |b| {
        b.iter(|| interpreter.invoke(&lambda, &[Value::Int32(black_box(21))]))
    });

    let Ok(chain) = operator_chain(&registry, 256) else {
        panic!("operator chain failed to build");
    };
    group.bench_function("operator_chain_256", |b| {
        b.iter(|| interpreter.evaluate(black_box(&chain)))
    });

    group.finish();
}

criterion_group!(benches, building_benchmarks, evaluation_benchmarks);
criterion_main!(benches);
