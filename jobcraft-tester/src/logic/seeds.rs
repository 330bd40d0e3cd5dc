use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;

const DEFAULT_SEED: u64 = 1337;
const MAX_RANGE_LEN: u64 = 10_000;

/// Resolve CLI seed tokens into server seeds.
///
/// Accepts literal integers (negative values use their magnitude) and
/// inclusive `start..end` ranges. Duplicates are dropped, first occurrence
/// wins.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    let mut seen = BTreeSet::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        for seed in parse_token(token)? {
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

fn parse_token(token: &str) -> Result<Vec<u64>> {
    if let Some((start, end)) = token.split_once("..") {
        let start = parse_seed(start)?;
        let end = parse_seed(end)?;
        if end < start {
            bail!("Seed range {token} is reversed");
        }
        if end - start >= MAX_RANGE_LEN {
            bail!("Seed range {token} spans more than {MAX_RANGE_LEN} seeds");
        }
        return Ok((start..=end).collect());
    }
    Ok(vec![parse_seed(token)?])
}

fn parse_seed(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    raw.parse::<u64>()
        .with_context(|| format!("Unrecognized seed token: {raw}"))
}
