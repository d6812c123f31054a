use criterion::{Criterion, black_box, criterion_group, criterion_main};
use haruspex::library::TestLibrary;
use haruspex::pipeline::{self, EvaluationRequest};
use haruspex::types::{
    ApoeGenotype, Category, ClinicalContext, PetOperatingPoint, Stage, TestObservation,
};

fn bench_evaluate(c: &mut Criterion) {
    let library = TestLibrary::default();
    let request = EvaluationRequest {
        context: ClinicalContext {
            age: 73.0,
            stage: Stage::Mci,
            apoe: ApoeGenotype::E3E4,
        },
        prior_override: None,
        pet: PetOperatingPoint::default(),
        primary: TestObservation::new("plasma_ptau217_generic", Category::Positive),
        secondary: Some(TestObservation::new(
            "csf_abeta42_40_lumipulse",
            Category::Negative,
        )),
    };

    c.bench_function("evaluate_two_tests", |b| {
        b.iter(|| pipeline::evaluate(black_box(&library), black_box(&request)).unwrap())
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
