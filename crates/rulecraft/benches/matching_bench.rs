use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rulecraft::actions::Actions;
use rulecraft::grammar::{CharClass, Expr, Grammar, GrammarBuilder};
use rulecraft::parser::{MatchConfig, Matcher};
use rulecraft::syntax::Match;
use std::hint::black_box;
use std::sync::Arc;

fn setup_grammar() -> Arc<Grammar> {
    GrammarBuilder::new("Arith")
        .rule("expr", Expr::separated(Expr::call("term"), Expr::call("addop"), 1))
        .rule("term", Expr::separated(Expr::call("factor"), Expr::call("mulop"), 1))
        .rule(
            "factor",
            Expr::choice([
                Expr::call("num"),
                Expr::goal(Expr::literal("("), Expr::literal(")"), Expr::call("expr")),
            ]),
        )
        .token("num", Expr::plus(Expr::class(CharClass::digit())))
        .proto("addop")
        .token_alt("addop", "+", Expr::sym())
        .token_alt("addop", "-", Expr::sym())
        .proto("mulop")
        .token_alt("mulop", "*", Expr::sym())
        .token_alt("mulop", "/", Expr::sym())
        .build_shared()
        .expect("valid grammar")
}

/// `1 + 2 * (3 - 4) + ...` with `terms` terms.
fn make_input(terms: usize) -> String {
    (0..terms)
        .map(|i| {
            if i % 3 == 0 {
                format!("({i} - {})", i + 1)
            } else {
                format!("{i} * {}", i + 2)
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

fn bench_full_parse(c: &mut Criterion) {
    let grammar = setup_grammar();
    let matcher = Matcher::new(&grammar);
    let input = make_input(8);

    c.bench_function("full_parse_small", |b| {
        b.iter(|| black_box(matcher.parse::<()>("expr", black_box(&input))));
    });
}

fn bench_input_sizes(c: &mut Criterion) {
    let grammar = setup_grammar();
    let matcher = Matcher::new(&grammar);
    let mut group = c.benchmark_group("parse_by_size");
    for terms in [10, 100, 1000] {
        let input = make_input(terms);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(terms), &input, |b, input| {
            b.iter(|| black_box(matcher.parse::<()>("expr", input)));
        });
    }
    group.finish();
}

fn bench_failure_memo(c: &mut Criterion) {
    let grammar = setup_grammar();
    // Unclosed parens make every level re-try `factor` at the same offsets.
    let input = format!("{}1", "(".repeat(40));
    let memo = Matcher::new(&grammar);
    let no_memo = Matcher::with_config(
        &grammar,
        MatchConfig {
            memoize_failures: false,
            ..MatchConfig::default()
        },
    );

    c.bench_function("failure_with_memo", |b| {
        b.iter(|| black_box(memo.parse::<()>("expr", black_box(&input))));
    });
    c.bench_function("failure_without_memo", |b| {
        b.iter(|| black_box(no_memo.parse::<()>("expr", black_box(&input))));
    });
}

fn bench_actions(c: &mut Criterion) {
    let grammar = setup_grammar();
    let matcher = Matcher::new(&grammar);
    let input = make_input(100);
    let actions = Actions::new()
        .on("num", |m: &Match<u64>, slot: &mut Option<u64>| {
            *slot = m.as_str().parse().ok();
        })
        .on("expr", |m: &Match<u64>, slot: &mut Option<u64>| {
            *slot = Some(m.all("term").iter().filter_map(Match::payload).sum());
        });

    c.bench_function("parse_and_reduce", |b| {
        b.iter(|| black_box(actions.reduce_with(&matcher, "expr", black_box(&input))));
    });
}

criterion_group!(
    benches,
    bench_full_parse,
    bench_input_sizes,
    bench_failure_memo,
    bench_actions
);
criterion_main!(benches);
