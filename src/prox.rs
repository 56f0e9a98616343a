//! Sorted-L1 (SLOPE/OWL) proximal operator (C1).
//!
//! `prox_w(v) = argmin_x 1/2 ||x - v||^2 + sum_i w_(i) |x|_(i)` where `|x|_(i)`
//! is the sorted-descending order statistic of `|x|`. Computed via sort +
//! pool-adjacent-violators (PAV) projection onto the monotone cone, O(d log d).

fn sign0(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Isotonic regression (non-increasing) via pool-adjacent-violators.
fn pav_nonincreasing(t: &[f64]) -> Vec<f64> {
    // Stack of pooled blocks as (mean, count); merging keeps the running
    // mean non-increasing left to right.
    let mut blocks: Vec<(f64, f64)> = Vec::with_capacity(t.len());
    for &x in t {
        let mut mean = x;
        let mut count = 1.0;
        while let Some(&(prev_mean, prev_count)) = blocks.last() {
            if prev_mean < mean {
                blocks.pop();
                let total = prev_count + count;
                mean = (prev_mean * prev_count + mean * count) / total;
                count = total;
            } else {
                break;
            }
        }
        blocks.push((mean, count));
    }

    let mut out = Vec::with_capacity(t.len());
    for (mean, count) in blocks {
        for _ in 0..count.round() as usize {
            out.push(mean);
        }
    }
    out
}

/// Proximal operator of the sorted-L1 penalty with weights `w`.
///
/// `w` must be sorted non-increasing and non-negative (contract, not
/// validated here — see [`crate::path`] for where that's enforced once per
/// fit rather than once per prox call).
pub fn sorted_l1_prox(v: &[f64], w: &[f64]) -> Vec<f64> {
    let d = v.len();
    debug_assert_eq!(w.len(), d);
    if d == 0 {
        return Vec::new();
    }

    let sign: Vec<f64> = v.iter().copied().map(sign0).collect();
    let u: Vec<f64> = v.iter().map(|x| x.abs()).collect();

    let mut order: Vec<usize> = (0..d).collect();
    order.sort_by(|&a, &b| u[b].partial_cmp(&u[a]).unwrap_or(std::cmp::Ordering::Equal));

    let t: Vec<f64> = order.iter().zip(w.iter()).map(|(&i, &wi)| u[i] - wi).collect();
    let pooled = pav_nonincreasing(&t);

    let mut out = vec![0.0; d];
    for (rank, &orig_idx) in order.iter().enumerate() {
        out[orig_idx] = sign[orig_idx] * pooled[rank].max(0.0);
    }
    out
}

/// `sum_i w_(i) |x|_(i)`, the sorted-L1 penalty value at `x`.
pub fn sorted_l1_penalty(x: &[f64], w: &[f64]) -> f64 {
    let mut abs: Vec<f64> = x.iter().map(|v| v.abs()).collect();
    abs.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    abs.iter().zip(w.iter()).map(|(a, b)| a * b).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objective(x: &[f64], v: &[f64], w: &[f64]) -> f64 {
        let sq: f64 = x.iter().zip(v.iter()).map(|(xi, vi)| 0.5 * (xi - vi).powi(2)).sum();
        sq + sorted_l1_penalty(x, w)
    }

    #[test]
    fn reduces_to_soft_threshold_for_constant_weights() {
        let v = [3.0, -1.5, 0.2, -4.0];
        let w = [1.0, 1.0, 1.0, 1.0];
        let got = sorted_l1_prox(&v, &w);
        let expected: Vec<f64> = v.iter().map(|&x| sign0(x) * (x.abs() - 1.0).max(0.0)).collect();
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-12, "{g} vs {e}");
        }
    }

    #[test]
    fn idempotent_on_its_own_output() {
        let v = [5.0, -3.0, 1.0, -0.5, 2.0, -2.0];
        let w = [2.5, 2.0, 1.5, 1.0, 0.5, 0.1];
        let once = sorted_l1_prox(&v, &w);
        let twice = sorted_l1_prox(&once, &w);
        for (a, b) in once.iter().zip(twice.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn sign_is_preserved_or_zeroed() {
        let v = [5.0, -3.0, 1.0, -0.5, 2.0, -2.0];
        let w = [2.5, 2.0, 1.5, 1.0, 0.5, 0.1];
        let out = sorted_l1_prox(&v, &w);
        for (vi, oi) in v.iter().zip(out.iter()) {
            if *oi != 0.0 {
                assert_eq!(sign0(*oi), sign0(*vi));
            }
        }
    }

    #[test]
    fn output_magnitudes_are_sorted_in_input_order() {
        let v = [5.0, -3.0, 1.0, -0.5, 2.0, -2.0];
        let w = [2.5, 2.0, 1.5, 1.0, 0.5, 0.1];
        let out = sorted_l1_prox(&v, &w);

        let mut by_input: Vec<(f64, f64)> = v.iter().copied().zip(out.iter().copied()).collect();
        by_input.sort_by(|a, b| b.0.abs().partial_cmp(&a.0.abs()).unwrap());
        for pair in by_input.windows(2) {
            assert!(pair[0].1.abs() + 1e-9 >= pair[1].1.abs());
        }
    }

    #[test]
    fn local_optimality_against_random_perturbations() {
        use rand::prelude::*;
        let mut rng = StdRng::seed_from_u64(7);
        let v = [2.0, -1.2, 0.7, -3.3, 0.1];
        let w = [1.2, 1.0, 0.8, 0.5, 0.1];
        let x = sorted_l1_prox(&v, &w);
        let base_obj = objective(&x, &v, &w);

        for _ in 0..200 {
            let perturbed: Vec<f64> = x.iter().map(|&xi| xi + rng.gen_range(-0.05..0.05)).collect();
            assert!(objective(&perturbed, &v, &w) >= base_obj - 1e-9);
        }
    }

    #[test]
    fn zero_weight_is_identity() {
        let v = [1.0, -2.0, 3.0];
        let w = [0.0, 0.0, 0.0];
        let out = sorted_l1_prox(&v, &w);
        for (a, b) in out.iter().zip(v.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
