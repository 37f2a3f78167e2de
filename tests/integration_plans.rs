//! Integration tests for the full three-plan generation pipeline.

mod common;

use wattplan::device::DeviceKind;
use wattplan::plan::allocator::{allocate_budget, validate_budget};
use wattplan::plan::assembler::generate_cost_plan;
use wattplan::plan::comfort::generate_comfort_plan;
use wattplan::plan::eco::generate_eco_plan;
use wattplan::plan::report::PlanReport;

use common::{default_emissions, default_fleet, default_start, device, no_exclusions};

#[test]
fn reference_two_device_scenario() {
    // Refrigerator (1500 W, priority 5, 24 h) + TV (120 W, priority 1,
    // 5 h) against a 2.00 daily budget at 0.15/kWh: the fridge's 4-hour
    // minimum costs 0.90, the TV caps at 5 h for 0.09, and the fridge
    // absorbs most of the remainder.
    let devices = vec![
        wattplan::device::Device {
            kind: DeviceKind::Refrigeration,
            ..device("fridge", 1500.0, 5, 24.0)
        },
        device("tv", 120.0, 1, 5.0),
    ];

    let alloc = allocate_budget(&devices, 2.0, 0.15).expect("valid input");
    assert_eq!(alloc.entries.len(), 2);

    let fridge = alloc.get("fridge").expect("fridge present");
    let tv = alloc.get("tv").expect("tv present");
    assert!(fridge.hours >= 4.0);
    assert_eq!(tv.hours, 5.0);
    assert!((tv.cost - 0.09).abs() < 1e-9);

    let check = validate_budget(&alloc, 2.0);
    assert!(check.valid, "total {} exceeds budget", check.total_cost);
}

#[test]
fn three_plans_from_one_fleet() {
    let devices = default_fleet();
    let start = default_start();
    let exclusions = no_exclusions();
    let emissions = default_emissions();

    let cost = generate_cost_plan(&devices, 75.0, 0.22, &exclusions, start)
        .expect("cost plan should build");
    let eco = generate_eco_plan(&devices, 80.0, 0.22, &exclusions, &emissions, start)
        .expect("eco plan should build");
    let comfort = generate_comfort_plan(&cost, &eco.plan, 80.0, 70.0, 0.22)
        .expect("comfort plan should build");

    for plan in [&cost, &eco.plan, &comfort] {
        assert_eq!(plan.schedule.len(), 30);
        for day in &plan.schedule {
            assert_eq!(day.devices.len(), devices.len());
        }
    }
}

#[test]
fn every_cost_day_respects_the_daily_budget() {
    let devices = default_fleet();
    let plan = generate_cost_plan(&devices, 75.0, 0.22, &no_exclusions(), default_start())
        .expect("valid input");
    let daily = 75.0 / 30.0;
    for day in &plan.schedule {
        assert!(
            day.total_cost <= daily + 0.01,
            "day {} over budget: {} > {}",
            day.day_number,
            day.total_cost,
            daily
        );
    }
}

#[test]
fn comfort_cost_sits_inside_the_envelope() {
    let devices = default_fleet();
    let start = default_start();
    let cost = generate_cost_plan(&devices, 75.0, 0.22, &no_exclusions(), start)
        .expect("valid input");
    let eco = generate_eco_plan(&devices, 80.0, 0.22, &no_exclusions(), &default_emissions(), start)
        .expect("valid input");
    let comfort =
        generate_comfort_plan(&cost, &eco.plan, 80.0, 70.0, 0.22).expect("valid input");

    let lo = cost.total_monthly_cost.min(eco.plan.total_monthly_cost);
    let hi = cost.total_monthly_cost.max(eco.plan.total_monthly_cost);
    assert!(
        comfort.total_monthly_cost >= lo && comfort.total_monthly_cost <= hi,
        "comfort {} outside [{lo}, {hi}]",
        comfort.total_monthly_cost
    );
}

#[test]
fn weekend_and_frequent_cadences_hit_expected_day_counts() {
    let devices = default_fleet();
    let plan = generate_cost_plan(&devices, 200.0, 0.22, &no_exclusions(), default_start())
        .expect("valid input");

    // Monday start → 8 weekend days in the horizon.
    let console_days = plan
        .schedule
        .iter()
        .filter(|d| {
            d.devices
                .iter()
                .any(|e| e.device_id == "console" && e.hours > 0.0)
        })
        .count();
    assert_eq!(console_days, 8);

    // `frequently` cadence: 9 of 30 days.
    let washer_days = plan
        .schedule
        .iter()
        .filter(|d| {
            d.devices
                .iter()
                .any(|e| e.device_id == "washer" && e.hours > 0.0)
        })
        .count();
    assert_eq!(washer_days, 9);
}

#[test]
fn whole_pipeline_is_deterministic() {
    let run = || {
        let devices = default_fleet();
        let start = default_start();
        let cost = generate_cost_plan(&devices, 75.0, 0.22, &no_exclusions(), start)
            .expect("valid input");
        let eco = generate_eco_plan(
            &devices,
            80.0,
            0.22,
            &no_exclusions(),
            &default_emissions(),
            start,
        )
        .expect("valid input");
        let comfort =
            generate_comfort_plan(&cost, &eco.plan, 80.0, 70.0, 0.22).expect("valid input");
        (cost, eco, comfort)
    };

    let (cost_a, eco_a, comfort_a) = run();
    let (cost_b, eco_b, comfort_b) = run();
    assert_eq!(cost_a, cost_b);
    assert_eq!(eco_a, eco_b);
    assert_eq!(comfort_a, comfort_b);
}

#[test]
fn weather_exclusion_flows_through_all_plans() {
    let devices = default_fleet();
    let start = default_start();
    let mut exclusions = no_exclusions();
    exclusions.exclude(2, "ac");

    let cost = generate_cost_plan(&devices, 75.0, 0.22, &exclusions, start)
        .expect("valid input");
    let eco = generate_eco_plan(&devices, 80.0, 0.22, &exclusions, &default_emissions(), start)
        .expect("valid input");
    let comfort =
        generate_comfort_plan(&cost, &eco.plan, 80.0, 70.0, 0.22).expect("valid input");

    for plan in [&cost, &eco.plan, &comfort] {
        let ac_day2 = plan.schedule[1]
            .devices
            .iter()
            .find(|e| e.device_id == "ac")
            .expect("ac present");
        assert_eq!(
            ac_day2.hours, 0.0,
            "{} plan should exclude the AC on day 2",
            plan.kind
        );
    }
}

#[test]
fn reports_agree_with_plan_totals() {
    let devices = default_fleet();
    let plan = generate_cost_plan(&devices, 75.0, 0.22, &no_exclusions(), default_start())
        .expect("valid input");
    let report = PlanReport::from_plan(&plan, 80.0);

    assert_eq!(report.total_monthly_cost, plan.total_monthly_cost);
    assert_eq!(
        report.active_device_days + report.idle_device_days,
        30 * devices.len()
    );
    assert!(
        (report.projected_savings - (80.0 - plan.total_monthly_cost)).abs() < 0.01,
        "savings should be the delta to the average monthly cost"
    );
}

#[test]
fn eco_plan_reduces_energy_against_unconstrained_usage() {
    let devices = default_fleet();
    let eco = generate_eco_plan(
        &devices,
        80.0,
        0.22,
        &no_exclusions(),
        &default_emissions(),
        default_start(),
    )
    .expect("valid input");

    // The AC (level 5) never runs more than 70% of its typical hours.
    for day in &eco.plan.schedule {
        let ac = day
            .devices
            .iter()
            .find(|e| e.device_id == "ac")
            .expect("ac present");
        assert!(ac.hours <= 6.0 * 0.7 + 1e-9);
    }
    assert!(eco.avg_emission_reduction_pct > 0);
}
