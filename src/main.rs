//! Planner entry point — CLI wiring and config-driven plan generation.

use std::path::Path;
use std::process;

use chrono::NaiveDate;

use wattplan::config::ScenarioConfig;
use wattplan::io::export::export_csv;
use wattplan::plan::assembler::generate_cost_plan;
use wattplan::plan::comfort::generate_comfort_plan;
use wattplan::plan::eco::generate_eco_plan;
use wattplan::plan::report::PlanReport;
use wattplan::plan::types::{EcoPlan, Plan, PlanKind};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    start_override: Option<NaiveDate>,
    plan: Option<PlanKind>,
    export_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("wattplan — household energy-usage planner");
    eprintln!();
    eprintln!("Usage: wattplan [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>     Load scenario from TOML config file");
    eprintln!("  --preset <name>       Use a built-in preset (baseline)");
    eprintln!("  --start <YYYY-MM-DD>  Override the horizon start date");
    eprintln!("  --plan <kind>         Print only one plan: cost, eco, or comfort");
    eprintln!("  --export-out <path>   Export plan schedules to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve               Start REST API server after planning");
        eprintln!("  --port <u16>          API server port (default: 3000)");
    }
    eprintln!("  --help                Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        start_override: None,
        plan: None,
        export_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--start" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --start requires a YYYY-MM-DD argument");
                    process::exit(1);
                }
                match args[i].parse::<NaiveDate>() {
                    Ok(date) => cli.start_override = Some(date),
                    Err(_) => {
                        eprintln!(
                            "error: --start value \"{}\" is not a valid YYYY-MM-DD date",
                            args[i]
                        );
                        process::exit(1);
                    }
                }
            }
            "--plan" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --plan requires a kind argument");
                    process::exit(1);
                }
                match PlanKind::parse(&args[i]) {
                    Some(kind) => cli.plan = Some(kind),
                    None => {
                        eprintln!(
                            "error: --plan value \"{}\" is not cost, eco, or comfort",
                            args[i]
                        );
                        process::exit(1);
                    }
                }
            }
            "--export-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --export-out requires a path argument");
                    process::exit(1);
                }
                cli.export_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Builds all three plans from a validated scenario.
fn build_plans(scenario: &ScenarioConfig, start: NaiveDate) -> (Plan, EcoPlan, Plan) {
    let devices = scenario.fleet();
    let exclusions = scenario.exclusions();
    let emissions = scenario.emissions();
    let price = scenario.household.price_per_kwh;
    let budget = &scenario.budget;

    let cost = generate_cost_plan(&devices, budget.monthly_limit, price, &exclusions, start)
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        });
    let eco = generate_eco_plan(
        &devices,
        budget.avg_monthly_cost,
        price,
        &exclusions,
        &emissions,
        start,
    )
    .unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    let comfort = generate_comfort_plan(
        &cost,
        &eco.plan,
        budget.avg_monthly_cost,
        budget.preferred_monthly,
        price,
    )
    .unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    (cost, eco, comfort)
}

fn print_plan(plan: &Plan, avg_monthly_cost: f64) {
    for day in &plan.schedule {
        println!("{day}");
    }
    println!("\n{}\n", PlanReport::from_plan(plan, avg_monthly_cost));
}

fn main() {
    tracing_subscriber::fmt().without_time().compact().init();

    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply start-date override
    if let Some(date) = cli.start_override {
        scenario.household.start_date = Some(date);
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let start = scenario.start_date();
    let avg_monthly_cost = scenario.budget.avg_monthly_cost;
    let (cost, eco, comfort) = build_plans(&scenario, start);

    // Print the selected plan, or all three
    match cli.plan {
        Some(PlanKind::Cost) => print_plan(&cost, avg_monthly_cost),
        Some(PlanKind::Eco) => print_plan(&eco.plan, avg_monthly_cost),
        Some(PlanKind::Comfort) => print_plan(&comfort, avg_monthly_cost),
        None => {
            print_plan(&cost, avg_monthly_cost);
            print_plan(&eco.plan, avg_monthly_cost);
            print_plan(&comfort, avg_monthly_cost);
        }
    }

    if matches!(cli.plan, None | Some(PlanKind::Eco)) {
        println!(
            "Eco plan: {}% average emission reduction",
            eco.avg_emission_reduction_pct
        );
        if !eco.infeasible_days.is_empty() {
            println!(
                "Eco plan: budget infeasible on {} day(s): {:?}",
                eco.infeasible_days.len(),
                eco.infeasible_days
            );
        }
    }

    // Export CSV if requested
    if let Some(ref path) = cli.export_out {
        let selected: Vec<&Plan> = match cli.plan {
            Some(PlanKind::Cost) => vec![&cost],
            Some(PlanKind::Eco) => vec![&eco.plan],
            Some(PlanKind::Comfort) => vec![&comfort],
            None => vec![&cost, &eco.plan, &comfort],
        };
        if let Err(e) = export_csv(&selected, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Schedules written to {path}");
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(wattplan::api::AppState {
            cost,
            eco,
            comfort,
            avg_monthly_cost,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(wattplan::api::serve(state, addr));
    }
}
