use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use xsplittr::{
    core::services::{BillService, GroupService, NewBill, ParticipantService},
    ledger::{Ledger, Participant, ParticipantId, SplitMethod},
    money::Money,
    settlement::{calculate_settlements, SettlementStrategy},
    split::{Split, SplitCalculator},
};

fn group_ledger(participants: usize, bills: usize) -> Ledger {
    let mut ledger = Ledger::new("Bench");
    GroupService::create(&mut ledger, "Bench", SplitMethod::Equal).expect("group");
    for index in 0..participants {
        ParticipantService::add(
            &mut ledger,
            "Bench",
            Participant::new(format!("P{index}"), "Bench", "Member"),
        )
        .expect("participant");
    }
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
    let calculator = SplitCalculator::default();
    for index in 0..bills {
        let payer = format!("P{}", (index * 7) % participants);
        let amount = Money::from_minor(1_000 + (index as i64 * 137) % 25_000);
        BillService::record(
            &mut ledger,
            "Bench",
            NewBill::new(format!("Bill {index}"), amount, date, payer, Split::Equal),
            &calculator,
        )
        .expect("bill");
    }
    ledger
}

fn bench_settlement(c: &mut Criterion) {
    let mut group = c.benchmark_group("settlement");
    for (participants, bills) in [(5, 50), (20, 500), (50, 2_000)] {
        let ledger = group_ledger(participants, bills);
        for strategy in [
            SettlementStrategy::GreedyMatching,
            SettlementStrategy::PairwiseNetting,
        ] {
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), format!("{participants}x{bills}")),
                &ledger,
                |b, ledger| {
                    b.iter(|| {
                        calculate_settlements(black_box(ledger), "Bench", strategy)
                            .expect("settle")
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let calculator = SplitCalculator::default();
    let participants: Vec<ParticipantId> =
        (0..50).map(|index| ParticipantId::new(format!("P{index}"))).collect();
    c.bench_function("split_equal_50", |b| {
        b.iter(|| {
            calculator
                .compute_shares(
                    black_box(Money::from_minor(123_456)),
                    &Split::Equal,
                    &participants,
                    &participants[0],
                )
                .expect("shares")
        })
    });
}

criterion_group!(benches, bench_settlement, bench_split);
criterion_main!(benches);
