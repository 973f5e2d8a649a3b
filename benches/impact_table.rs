// Wide-tree table build: 50 roots × 20 children, 3 indicators, 10 years with
// every third year missing so projection runs on most series.
//
// Run with: cargo bench --bench impact_table

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use impact_table::table::{build_indicator_tables, PlainValues, TableContext};
use impact_table::types::{EntityNode, GroupBy, ImpactRecord, Indicator};

const ROOTS: usize = 50;
const CHILDREN: usize = 20;

fn forest() -> Vec<EntityNode> {
    (0..ROOTS)
        .map(|root| {
            let children = (0..CHILDREN)
                .map(|child| EntityNode::new(format!("e{}-{}", root, child), format!("Entity {}-{}", root, child)))
                .collect();
            EntityNode::new(format!("e{}", root), format!("Entity {}", root)).with_children(children)
        })
        .collect()
}

fn indicators() -> Vec<Indicator> {
    (0..3)
        .map(|i| Indicator {
            id: format!("ind{}", i),
            short_name: format!("Indicator {}", i),
            unit: "t".to_string(),
        })
        .collect()
}

fn records(indicators: &[Indicator], years: &[i32]) -> Vec<ImpactRecord> {
    let mut records = Vec::new();
    for indicator in indicators {
        for root in 0..ROOTS {
            for child in 0..CHILDREN {
                for (offset, &year) in years.iter().enumerate() {
                    if (root + child + offset) % 3 == 0 {
                        continue;
                    }
                    let entity_id = format!("e{}-{}", root, child);
                    records.push(ImpactRecord {
                        indicator_id: indicator.id.clone(),
                        entity_name: entity_id.clone(),
                        entity_id,
                        year,
                        impact: (root * CHILDREN + child) as f64 + offset as f64 * 0.5,
                        tonnes: 10.0,
                        type_by_intervention: None,
                    });
                }
            }
        }
    }
    records
}

fn bench_build(c: &mut Criterion) {
    let entities = forest();
    let indicators = indicators();
    let range: Vec<i32> = (2015..2025).collect();
    let records = records(&indicators, &range);

    let context = TableContext {
        indicators: &indicators,
        entities: &entities,
        group_by: GroupBy::Material,
        range_of_years: &range,
        growth_rate: 1.5,
    };

    c.bench_function("build_indicator_tables_wide_tree", |b| {
        b.iter(|| {
            build_indicator_tables(black_box(&context), black_box(&records), PlainValues::from_record)
        })
    });
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
