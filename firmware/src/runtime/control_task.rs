use embassy_time::Timer;
use handheld_core::control::DEFAULT_TICK_PERIOD;
use handheld_core::hal::Clock;

use super::FirmwareControl;
use crate::hw::clock::to_embassy;
use crate::telemetry;

#[embassy_executor::task]
pub async fn run(mut control: FirmwareControl) -> ! {
    let period = to_embassy(DEFAULT_TICK_PERIOD);
    loop {
        let report = control.tick();
        telemetry::log_report(&report, control.clock().now());
        if let Some(error) = report.fault {
            telemetry::log_control_error(error);
        }
        if let Some(error) = control.motion_mut().last_error() {
            telemetry::log_sensor_fault(error);
        }
        Timer::after(period).await;
    }
}
