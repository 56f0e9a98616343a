use clap::Parser;
use nalgebra::DMatrix;
use rand::prelude::*;
use rand_distr::{Bernoulli, Normal};

use slope_path::{fit_path, matrix::DenseMatrix, FamilyKind, FitControl};

/// Demo driver: fits a synthetic SLOPE path and prints a one-line-per-sigma
/// summary. Never reads from disk — dataset generation is in-memory only,
/// data loading being out of scope for the library itself.
#[derive(Parser, Debug)]
#[command(name = "slope-fit", about = "Fit a synthetic sorted-L1 regularization path")]
struct Args {
    /// Number of observations.
    #[arg(long, default_value_t = 200)]
    n: usize,

    /// Number of predictors.
    #[arg(long, default_value_t = 20)]
    p: usize,

    /// Number of truly nonzero coefficients in the generating model.
    #[arg(long, default_value_t = 5)]
    k_true: usize,

    #[arg(long, value_enum, default_value = "gaussian")]
    family: FamilyArg,

    /// Number of sigma values in the path.
    #[arg(long, default_value_t = 20)]
    path_length: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FamilyArg {
    Gaussian,
    Binomial,
}

impl From<FamilyArg> for FamilyKind {
    fn from(a: FamilyArg) -> Self {
        match a {
            FamilyArg::Gaussian => FamilyKind::Gaussian,
            FamilyArg::Binomial => FamilyKind::Binomial,
        }
    }
}

fn bh_lambda(p: usize, q: f64) -> Vec<f64> {
    // Benjamini-Hochberg sequence, the standard default SLOPE weight shape;
    // constructing it here is just demo convenience, not the library's job.
    let normal = statrs_quantile_approx;
    (1..=p).map(|i| normal(1.0 - (i as f64 * q) / (2.0 * p as f64))).collect()
}

/// Minimal inverse-normal-CDF approximation (Acklam's rational approximation),
/// good enough for generating a demo lambda sequence without pulling in a
/// statistics crate for one closed-form call.
fn statrs_quantile_approx(p: f64) -> f64 {
    let p = p.clamp(1e-12, 1.0 - 1e-12);
    let a = [-3.969683028665376e+01, 2.209460984245205e+02, -2.759285104469687e+02, 1.383577518672690e+02, -3.066479806614716e+01, 2.506628277459239e+00];
    let b = [-5.447609879822406e+01, 1.615858368580409e+02, -1.556989798598866e+02, 6.680131188771972e+01, -1.328068155288572e+01];
    let c = [-7.784894002430293e-03, -3.223964580411365e-01, -2.400758277161838e+00, -2.549732539343734e+00, 4.374664141464968e+00, 2.938163982698783e+00];
    let d = [7.784695709041462e-03, 3.224671290700398e-01, 2.445134137142996e+00, 3.754408661907416e+00];
    let p_low = 0.02425;
    if p < p_low {
        let q = (-2.0 * p.ln()).sqrt();
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5]) / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    } else if p <= 1.0 - p_low {
        let q = p - 0.5;
        let r = q * q;
        (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5]) / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    }
}

fn synthesize(args: &Args) -> (DMatrix<f64>, DMatrix<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let normal = Normal::new(0.0, 1.0).unwrap();

    let mut true_beta = vec![0.0; args.p];
    for j in 0..args.k_true.min(args.p) {
        true_beta[j] = if j % 2 == 0 { 2.0 } else { -2.0 };
    }

    let x = DMatrix::from_fn(args.n, args.p, |_, _| normal.sample(&mut rng));
    let signal: Vec<f64> = (0..args.n)
        .map(|i| (0..args.p).map(|j| x[(i, j)] * true_beta[j]).sum::<f64>())
        .collect();

    let y = match args.family {
        FamilyArg::Gaussian => DMatrix::from_iterator(args.n, 1, signal.iter().map(|&s| s + normal.sample(&mut rng))),
        FamilyArg::Binomial => {
            let draws: Vec<f64> = signal
                .iter()
                .map(|&s| {
                    let prob = 1.0 / (1.0 + (-s).exp());
                    if Bernoulli::new(prob).unwrap().sample(&mut rng) {
                        1.0
                    } else {
                        -1.0
                    }
                })
                .collect();
            DMatrix::from_vec(args.n, 1, draws)
        }
    };

    (x, y, true_beta)
}

fn main() {
    let args = Args::parse();
    let (x, y, true_beta) = synthesize(&args);

    let lambda = bh_lambda(args.p, 0.1);
    let sigma_max = lambda[0] * 2.0;
    let sigma: Vec<f64> = (0..args.path_length)
        .map(|k| sigma_max * (0.01_f64).powf(k as f64 / (args.path_length - 1).max(1) as f64))
        .collect();

    let mut control = FitControl::new(args.family.into(), lambda, sigma);
    control.diagnostics = false;

    let design = DenseMatrix::new(x);
    match fit_path(&design, &y, &control, &slope_path::cancel::NeverCancel) {
        Ok(result) => {
            println!("solved {} of {} sigma values (terminated_early={})", result.sigma.len(), control.sigma.len(), result.terminated_early);
            for (k, sigma_k) in result.sigma.iter().enumerate() {
                println!(
                    "sigma[{k}]={sigma_k:.4}  active={}  deviance_ratio={:.4}  converged={}",
                    result.active_set_size[k], result.deviance_ratio[k], result.diagnostics[k].converged
                );
            }
            let recovered = result.beta.last().map(|b| b.iter().filter(|&&v| v != 0.0).count()).unwrap_or(0);
            println!("true nonzero count={}, recovered nonzero count at path end={}", true_beta.iter().filter(|&&v| v != 0.0).count(), recovered);
        }
        Err(err) => {
            eprintln!("fit failed: {err}");
            std::process::exit(1);
        }
    }
}
