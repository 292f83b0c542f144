//! Search a synthetic mountain range for its highest point.
//!
//! Run with: cargo run --example summit_search -- [cmaes|shgo] [--observed] [--seed N]
//! (`--help` lists every option)
//!
//! Set `RUST_LOG=info` (or `debug` for one line per iteration) to follow
//! the search.

use clap::{Parser, ValueEnum};
use summitopt::prelude::*;

/// Search method, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    /// CMA-ES population-based stochastic search
    Cmaes,
    /// SHGO deterministic partition search
    Shgo,
}

impl From<Method> for StrategyChoice {
    fn from(method: Method) -> Self {
        match method {
            Method::Cmaes => StrategyChoice::StochasticPopulation,
            Method::Shgo => StrategyChoice::DeterministicPartition,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "summit_search")]
#[command(about = "Search a synthetic mountain range for its highest point")]
struct Args {
    /// Search method
    #[arg(value_enum, default_value = "cmaes")]
    method: Method,

    /// Track the best evaluated point instead of the CMA-ES mean
    #[arg(long)]
    observed: bool,

    /// Seed for a reproducible CMA-ES run
    #[arg(long)]
    seed: Option<u64>,
}

/// Named hill tops of the synthetic range: (name, x, y, height, spread).
const HILLS: [(&str, f64, f64, f64, f64); 4] = [
    ("Beinn Mhor", 7_200.0, 5_400.0, 1_344.0, 900.0),
    ("Sgurr Dearg", 2_500.0, 2_000.0, 1_150.0, 700.0),
    ("Carn Liath", 8_800.0, 1_200.0, 980.0, 600.0),
    ("Meall Odhar", 1_500.0, 6_500.0, 870.0, 1_100.0),
];

fn elevation(p: &Point) -> f64 {
    HILLS
        .iter()
        .map(|&(_, x, y, height, spread)| {
            let d2 = (p.x - x).powi(2) + (p.y - y).powi(2);
            height * (-d2 / (2.0 * spread * spread)).exp()
        })
        .fold(120.0, f64::max)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let terrain = FnTerrain::new(10_000.0, 8_000.0, elevation);

    let mut cmaes = CmaesConfig::new();
    if let Some(seed) = args.seed {
        cmaes = cmaes.with_seed(seed);
    }
    let engine = SearchEngine::new(EngineConfig::new().with_cmaes(cmaes));
    let result = engine.run_on_terrain(&terrain, args.method.into(), args.observed)?;

    if let Some(message) = result.termination_message() {
        println!("{message}");
    }
    println!(
        "{}: {} iterations, {} evaluations in {:.2?}",
        result.strategy(),
        result.iterations(),
        result.function_evaluations(),
        result.duration()
    );
    for maximum in result.local_maxima().iter().take(5) {
        println!(
            "  local maximum {:>5}m at ({:.0}, {:.0})",
            maximum.height.round(),
            maximum.point.x,
            maximum.point.y
        );
    }

    let (name, d) = HILLS
        .iter()
        .map(|&(name, x, y, _, _)| (name, result.distance_to(&point(x, y))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap_or(("nowhere", f64::INFINITY));

    println!();
    println!(
        "{}",
        if d < 100.0 {
            "Congratulations!"
        } else if d < 1_000.0 {
            "Good job!"
        } else {
            "Interesting!"
        }
    );
    let best = result.best_point();
    println!(
        "You landed at an altitude of {}m, at ({:.0}, {:.0}).",
        result.summit_height(),
        best.x,
        best.y
    );
    let dm = if d < 1_000.0 {
        format!("{}m", d.round())
    } else {
        format!("{:.1}km", d / 1_000.0)
    };
    println!("You are {dm} from the nearest named hill top, \"{name}\".");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_default_arguments() {
        let args = Args::try_parse_from(["summit_search"]).unwrap();
        assert_eq!(args.method, Method::Cmaes);
        assert!(!args.observed);
        assert_eq!(args.seed, None);
        assert_eq!(StrategyChoice::from(args.method), StrategyChoice::default());
    }

    #[test]
    fn test_all_arguments() {
        let args =
            Args::try_parse_from(["summit_search", "shgo", "--observed", "--seed", "7"]).unwrap();
        assert_eq!(
            StrategyChoice::from(args.method),
            StrategyChoice::DeterministicPartition
        );
        assert!(args.observed);
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn test_help_and_bad_arguments() {
        let help = Args::try_parse_from(["summit_search", "--help"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let missing = Args::try_parse_from(["summit_search", "--seed"]).unwrap_err();
        assert!(missing.to_string().contains("--seed"));

        let unknown = Args::try_parse_from(["summit_search", "annealing"]).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_highest_named_hill_is_highest_terrain_point() {
        let (_, x, y, height, _) = HILLS[0];
        assert!((elevation(&point(x, y)) - height).abs() < 1e-9);
    }
}
