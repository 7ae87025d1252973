use popsynth::sampler::{AliasSampler, BasicSampler, BinarySampler};
use popsynth::{Sampler, SamplerKind, make_sampler};

use crate::utils::{categorical, chi_square, init_logging};

const DRAWS: usize = 100_000;
/// Chi-square critical value for three degrees of freedom at p = 0.001
const CRITICAL_DF3: f64 = 16.266;

fn observed_counts(sampler: &impl Sampler, seed: u64) -> Vec<usize> {
    let draws = sampler.draw_n_seeded(DRAWS, seed).unwrap();
    let outcomes = sampler.distribution().outcomes();
    let mut counts = vec![0; outcomes.len()];
    for draw in &draws {
        let index = outcomes.iter().position(|o| o == draw).unwrap();
        counts[index] += 1;
    }
    counts
}

#[test]
fn test_all_samplers_match_the_distribution() {
    init_logging();
    let probabilities = [0.1, 0.2, 0.3, 0.4];
    for kind in [SamplerKind::Basic, SamplerKind::Binary, SamplerKind::Alias] {
        let (_, distribution) = categorical(&probabilities);
        let sampler = make_sampler(kind, distribution);
        let counts = observed_counts(&sampler, 20_240_601);
        assert_eq!(counts.iter().sum::<usize>(), DRAWS);
        let statistic = chi_square(&counts, &probabilities);
        assert!(statistic < CRITICAL_DF3, "{kind} sampler: chi-square {statistic}");
    }
}

#[test]
fn test_scan_and_search_agree_draw_for_draw() {
    let probabilities = [0.05, 0.15, 0.3, 0.5];
    let (_, distribution) = categorical(&probabilities);
    let basic = BasicSampler::new(distribution.clone());
    let binary = BinarySampler::new(distribution);

    assert_eq!(basic.cumulative(), binary.cumulative());
    assert_eq!(
        basic.draw_n_seeded(10_000, 5).unwrap(),
        binary.draw_n_seeded(10_000, 5).unwrap()
    );
}

#[test]
fn test_alias_tables_reproduce_probabilities() {
    let probabilities = [0.5, 0.3, 0.2];
    let (_, distribution) = categorical(&probabilities);
    let sampler = AliasSampler::new(distribution);
    for (index, expected) in probabilities.iter().enumerate() {
        assert!((sampler.outcome_probability(index) - expected).abs() < 1e-12);
    }
}

#[test]
fn test_zero_mass_outcomes_never_drawn() {
    let probabilities = [0.5, 0.0, 0.5];
    let (_, distribution) = categorical(&probabilities);
    assert_eq!(distribution.len(), 2);
    let sampler = make_sampler(SamplerKind::Alias, distribution);
    let draws = sampler.draw_n_seeded(1_000, 9).unwrap();
    assert!(draws.iter().all(|d| sampler.distribution().probability_of(d) > 0.0));
}
