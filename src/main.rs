use anyhow::Result;
use impulse_charger::hardware::{BatteryProfile, SimEvent, SimulatedCharger};
use impulse_charger::{ChargeController, ChargerConfig, Phase};
use tracing::{error, info};

/// Ticks allowed for one bench charge, well above the six hour limit
const BENCH_TICK_BUDGET: u64 = 100_000;

fn main() -> Result<()> {
    let config = ChargerConfig::default();
    impulse_charger::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Impulse charger {} starting on the simulated bench",
        env!("APP_VERSION")
    );

    let bench = SimulatedCharger::new(&config.sampling).schedule(
        2_500,
        SimEvent::InsertBattery(BatteryProfile::nimh_aa().with_ripple(4)),
    );
    let mut controller = ChargeController::new(bench, config)
        .map_err(|e| anyhow::anyhow!("Failed to create controller: {}", e))?;

    controller.power_on();
    match controller.run_until(BENCH_TICK_BUDGET, |c| {
        matches!(
            c.phase(),
            Phase::Finished | Phase::OverheatFault | Phase::TimeoutFault
        )
    }) {
        Ok(phase) => info!(
            "Bench charge ended in {} after {} s simulated",
            phase,
            controller.uptime_ms() / 1000
        ),
        Err(e) => {
            error!("Bench charge did not finish: {}", e);
            return Err(anyhow::anyhow!("Bench error: {}", e));
        }
    }

    println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
    println!(
        "{}",
        serde_json::to_string_pretty(&controller.sessions().get_session_stats())?
    );
    Ok(())
}
