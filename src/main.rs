// ========================================================================================
//
//                        THE CLINICAL ORCHESTRATOR: HARUSPEX
//
// ========================================================================================
//
// This binary is the only place where I/O happens. It parses arguments, loads
// the biomarker test library (built-in or a TOML file), drives the pure engine,
// and renders the structured results. The engine itself never reads a file,
// never prints, and never holds state between calls.

use clap::{Parser, Subcommand};
use haruspex::interpret::{self, DEFAULT_TRIAGE_CUTOFF};
use haruspex::library::TestLibrary;
use haruspex::pipeline::{self, EvaluationRequest};
use haruspex::risk::{HazardRates, HazardTable, PosteriorPreference};
use haruspex::types::{
    ApoeGenotype, Category, ClinicalContext, PetOperatingPoint, Stage, TestObservation,
};
use std::process;

#[derive(Parser)]
#[command(
    name = "haruspex",
    version,
    about = "A Bayesian engine for amyloid-status probability estimation."
)]
struct Cli {
    /// Path to a TOML test library replacing the built-in one.
    #[arg(long, global = true)]
    library: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute PET- and autopsy-referenced posteriors for one or two tests
    Evaluate {
        /// Age in years
        #[arg(long)]
        age: f64,

        /// Cognitive stage
        #[arg(long)]
        stage: Stage,

        /// APOE genotype
        #[arg(long, default_value = "unknown")]
        apoe: ApoeGenotype,

        /// Manual prior probability replacing the age/stage/APOE estimate
        #[arg(long)]
        prior: Option<f64>,

        /// Library id of the primary test
        #[arg(long)]
        test: String,

        /// Observed category of the primary test
        #[arg(long)]
        category: Category,

        /// Library id of an optional secondary test
        #[arg(long, requires = "second_category")]
        second_test: Option<String>,

        /// Observed category of the secondary test
        #[arg(long, requires = "second_test")]
        second_category: Option<Category>,

        /// PET sensitivity against autopsy
        #[arg(long, default_value = "0.92")]
        pet_se: f64,

        /// PET specificity against autopsy
        #[arg(long, default_value = "0.90")]
        pet_sp: f64,

        /// Therapy-triage cut-off on the PET-referenced posterior
        #[arg(long, default_value = "0.80")]
        triage: f64,
    },

    /// Re-reference a test's likelihood ratios through a mediating standard
    Bridge {
        /// Published positive likelihood ratio
        #[arg(long)]
        lr_pos: f64,

        /// Published negative likelihood ratio
        #[arg(long)]
        lr_neg: f64,

        /// Mediating standard's sensitivity against the target
        #[arg(long, default_value = "0.92")]
        mediator_se: f64,

        /// Mediating standard's specificity against the target
        #[arg(long, default_value = "0.90")]
        mediator_sp: f64,

        /// Target-positivity prevalence the predictive values are taken at
        #[arg(long, default_value = "0.5")]
        prevalence: f64,
    },

    /// Project a posterior probability into a multi-year conversion risk
    Risk {
        /// Posterior probability of amyloid positivity
        #[arg(long)]
        probability: f64,

        /// Which reference frame the probability lives in
        #[arg(long)]
        frame: PosteriorPreference,

        /// Cognitive stage selecting the hazard row
        #[arg(long)]
        stage: Stage,

        /// Horizon in years
        #[arg(long, default_value = "3")]
        horizon: f64,

        /// Annual hazard for the amyloid-positive state (stage default if omitted)
        #[arg(long)]
        hazard_pos: Option<f64>,

        /// Annual hazard for the amyloid-negative state (stage default if omitted)
        #[arg(long)]
        hazard_neg: Option<f64>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let library = match &cli.library {
        Some(path) => match TestLibrary::load(path) {
            Ok(lib) => {
                eprintln!("> Loaded test library from {path}");
                lib
            }
            Err(e) => {
                eprintln!("Error loading test library: {e}");
                process::exit(1);
            }
        },
        None => TestLibrary::default(),
    };

    let result = match cli.command {
        Commands::Evaluate {
            age,
            stage,
            apoe,
            prior,
            test,
            category,
            second_test,
            second_category,
            pet_se,
            pet_sp,
            triage,
        } => evaluate_command(
            &library,
            age,
            stage,
            apoe,
            prior,
            test,
            category,
            second_test.zip(second_category),
            pet_se,
            pet_sp,
            triage,
        ),
        Commands::Bridge {
            lr_pos,
            lr_neg,
            mediator_se,
            mediator_sp,
            prevalence,
        } => bridge_command(lr_pos, lr_neg, mediator_se, mediator_sp, prevalence),
        Commands::Risk {
            probability,
            frame,
            stage,
            horizon,
            hazard_pos,
            hazard_neg,
        } => risk_command(probability, frame, stage, horizon, hazard_pos, hazard_neg),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn evaluate_command(
    library: &TestLibrary,
    age: f64,
    stage: Stage,
    apoe: ApoeGenotype,
    prior: Option<f64>,
    test: String,
    category: Category,
    secondary: Option<(String, Category)>,
    pet_se: f64,
    pet_sp: f64,
    triage: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = EvaluationRequest {
        context: ClinicalContext { age, stage, apoe },
        prior_override: prior,
        pet: PetOperatingPoint {
            sensitivity: pet_se,
            specificity: pet_sp,
        },
        primary: TestObservation::new(test, category),
        secondary: secondary.map(|(id, cat)| TestObservation::new(id, cat)),
    };

    let report = pipeline::evaluate(library, &request)?;

    println!("Clinical prior          P(A+)   = {}", fmt_pct(report.clinical_prior));
    println!("PET-layer prior         P(PET+) = {}", fmt_pct(report.pet_prior));
    println!(
        "PET-referenced layer    P(PET+) = {}  [{:?}]",
        fmt_pct(report.pet_posterior),
        report.pet_tier
    );
    println!(
        "Autopsy-referenced layer P(A+)  = {}  [{:?}]",
        fmt_pct(report.autopsy_posterior),
        report.autopsy_tier
    );
    println!(
        "Envelope [1-NPV, PPV]           = [{}, {}]",
        fmt_pct(report.envelope.lo),
        fmt_pct(report.envelope.hi)
    );

    let cutoff = if triage > 0.0 && triage < 1.0 {
        triage
    } else {
        DEFAULT_TRIAGE_CUTOFF
    };
    if interpret::meets_triage(report.pet_posterior, cutoff) {
        println!("Meets therapy triage (>= {})", fmt_pct(cutoff));
    } else {
        println!("Below therapy triage ({} cut-off)", fmt_pct(cutoff));
    }
    Ok(())
}

fn bridge_command(
    lr_pos: f64,
    lr_neg: f64,
    mediator_se: f64,
    mediator_sp: f64,
    prevalence: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let out = haruspex::bridge::bridge_accuracy(lr_pos, lr_neg, mediator_se, mediator_sp, prevalence)?;
    println!(
        "Bridged: Se={:.3}, Sp={:.3} | LR+={:.2}, LR-={:.3}{}",
        out.sensitivity,
        out.specificity,
        out.lr_positive,
        out.lr_negative,
        if out.warn { " (clamped)" } else { "" }
    );
    Ok(())
}

fn risk_command(
    probability: f64,
    frame: PosteriorPreference,
    stage: Stage,
    horizon: f64,
    hazard_pos: Option<f64>,
    hazard_neg: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut hazards = HazardTable::default();
    if hazard_pos.is_some() || hazard_neg.is_some() {
        let base = hazards.rates_for(stage);
        let rates = HazardRates {
            positive: hazard_pos.unwrap_or(base.positive),
            negative: hazard_neg.unwrap_or(base.negative),
        };
        match stage {
            Stage::Cn => hazards.cn = rates,
            _ => hazards.mci = rates,
        }
    }

    let projection = haruspex::risk::project(probability, stage, horizon, &hazards);
    println!(
        "Projected {horizon:.0}-year conversion risk = {}  (A+: {}, A-: {}, {:?} P(A+)={})",
        fmt_pct(projection.risk),
        fmt_pct(projection.risk_positive),
        fmt_pct(projection.risk_negative),
        frame,
        fmt_pct(probability)
    );
    println!("Tier: {:?}", projection.tier);
    Ok(())
}

/// Percentage formatting: two decimals below 0.1%, one above.
fn fmt_pct(x: f64) -> String {
    let p = x * 100.0;
    if p < 0.1 {
        format!("{p:.2}%")
    } else {
        format!("{p:.1}%")
    }
}
