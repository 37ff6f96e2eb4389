//! Experiment parameters encoded in run directory names.
//!
//! Run directories look like `grid_atk30_trust1_lam2_gam3_mode1_d5_a0.5_s7`,
//! though older batches use `_p30_`, `_trust_` / `_notrust_` and omit most
//! knobs. Each field is resolved by an ordered list of strategies; the first
//! hit wins and fields nobody recognizes fall back to a neutral default.

use std::sync::LazyLock;

use regex::Regex;

use super::types::RunParams;

/// Neutral values for knobs missing from a run name
pub const DEFAULT_TRUST: u32 = 0;
pub const DEFAULT_LAMBDA: u32 = 0;
pub const DEFAULT_GAMMA: u32 = 1;

/// Compiled regex patterns for run name tokens
pub struct NamePatterns {
    /// Match: "_atk<n>_"
    pub attack_rate: Regex,
    /// Match: "_p<n>_" (legacy attack rate)
    pub legacy_attack_rate: Regex,
    /// Match: trailing "_s<n>"
    pub seed: Regex,
    /// Match: "_trust<n>_"
    pub trust: Regex,
    /// Match: "_lam<n>_gam<n>_"
    pub lambda_gamma: Regex,
    /// Match: "_mode<n>_"
    pub attack_mode: Regex,
    /// Match: "_d<n>_"
    pub sink_delta: Regex,
    /// Match: "_a<float>_"
    pub trust_alpha: Regex,
}

impl NamePatterns {
    pub fn new() -> Self {
        Self {
            attack_rate: Regex::new(r"_atk(\d+)_").expect("Invalid attack_rate regex"),
            legacy_attack_rate: Regex::new(r"_p(\d+)_").expect("Invalid legacy_attack_rate regex"),
            seed: Regex::new(r"_s(\d+)$").expect("Invalid seed regex"),
            trust: Regex::new(r"_trust(\d+)_").expect("Invalid trust regex"),
            lambda_gamma: Regex::new(r"_lam(\d+)_gam(\d+)_").expect("Invalid lambda_gamma regex"),
            attack_mode: Regex::new(r"_mode(\d+)_").expect("Invalid attack_mode regex"),
            sink_delta: Regex::new(r"_d(\d+)_").expect("Invalid sink_delta regex"),
            trust_alpha: Regex::new(r"_a([0-9.]+)_").expect("Invalid trust_alpha regex"),
        }
    }
}

impl Default for NamePatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Global patterns instance
pub static PATTERNS: LazyLock<NamePatterns> = LazyLock::new(NamePatterns::new);

type Strategy<T> = fn(&str) -> Option<T>;

const ATTACK_RATE_STRATEGIES: [Strategy<u32>; 2] = [attack_rate_token, legacy_attack_rate_token];

const TRUST_STRATEGIES: [Strategy<u32>; 3] = [trust_token, notrust_flag, trust_flag];

fn attack_rate_token(name: &str) -> Option<u32> {
    capture(&PATTERNS.attack_rate, name)
}

fn legacy_attack_rate_token(name: &str) -> Option<u32> {
    capture(&PATTERNS.legacy_attack_rate, name)
}

fn trust_token(name: &str) -> Option<u32> {
    capture(&PATTERNS.trust, name)
}

fn notrust_flag(name: &str) -> Option<u32> {
    name.contains("_notrust_").then_some(0)
}

fn trust_flag(name: &str) -> Option<u32> {
    name.contains("_trust_").then_some(1)
}

/// First capture group of `pattern`, parsed
fn capture<T: std::str::FromStr>(pattern: &Regex, name: &str) -> Option<T> {
    pattern.captures(name)?.get(1)?.as_str().parse().ok()
}

fn first_match<T>(strategies: &[Strategy<T>], name: &str) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(name))
}

fn lambda_gamma(name: &str) -> Option<(u32, u32)> {
    let caps = PATTERNS.lambda_gamma.captures(name)?;
    let lambda = caps.get(1)?.as_str().parse().ok()?;
    let gamma = caps.get(2)?.as_str().parse().ok()?;
    Some((lambda, gamma))
}

impl RunParams {
    /// Recover experiment parameters from a run directory name
    pub fn from_run_name(name: &str) -> Self {
        let topology = name.split('_').next().unwrap_or(name).to_string();
        let (lambda, gamma) = lambda_gamma(name).unwrap_or((DEFAULT_LAMBDA, DEFAULT_GAMMA));

        Self {
            topology,
            attack_rate: first_match(&ATTACK_RATE_STRATEGIES, name),
            trust: first_match(&TRUST_STRATEGIES, name).unwrap_or(DEFAULT_TRUST),
            lambda,
            gamma,
            attack_mode: capture(&PATTERNS.attack_mode, name),
            sink_delta: capture(&PATTERNS.sink_delta, name),
            trust_alpha: capture(&PATTERNS.trust_alpha, name),
            seed: capture(&PATTERNS.seed, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_run_name() {
        let params = RunParams::from_run_name("grid_atk30_trust1_lam2_gam3_mode1_d5_a0.5_s7");
        assert_eq!(params.topology, "grid");
        assert_eq!(params.attack_rate, Some(30));
        assert_eq!(params.trust, 1);
        assert_eq!(params.lambda, 2);
        assert_eq!(params.gamma, 3);
        assert_eq!(params.attack_mode, Some(1));
        assert_eq!(params.sink_delta, Some(5));
        assert_eq!(params.trust_alpha, Some(0.5));
        assert_eq!(params.seed, Some(7));
    }

    #[test]
    fn test_trust_flag_defaults_lambda_gamma() {
        let params = RunParams::from_run_name("line_p20_trust_s3");
        assert_eq!(params.trust, 1);
        assert_eq!(params.lambda, 0);
        assert_eq!(params.gamma, 1);
        assert_eq!(params.attack_rate, Some(20));
        assert_eq!(params.seed, Some(3));
    }

    #[test]
    fn test_notrust_token() {
        let params = RunParams::from_run_name("random_p10_notrust_s1");
        assert_eq!(params.trust, 0);
    }

    #[test]
    fn test_atk_preferred_over_legacy_rate() {
        let params = RunParams::from_run_name("grid_p10_atk40_trust0_s2");
        assert_eq!(params.attack_rate, Some(40));
        assert_eq!(params.trust, 0);
    }

    #[test]
    fn test_bare_name_defaults() {
        let params = RunParams::from_run_name("B_1");
        assert_eq!(params.topology, "B");
        assert_eq!(params.attack_rate, None);
        assert_eq!(params.trust, DEFAULT_TRUST);
        assert_eq!(params.lambda, DEFAULT_LAMBDA);
        assert_eq!(params.gamma, DEFAULT_GAMMA);
        assert_eq!(params.seed, None);
        assert_eq!(params.trust_alpha, None);
    }

    #[test]
    fn test_malformed_alpha_is_absent() {
        let params = RunParams::from_run_name("grid_a1.2.3_s1");
        assert_eq!(params.trust_alpha, None);
    }
}
