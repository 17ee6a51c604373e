use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::{Adc, AdcChannel};
use embassy_stm32::gpio::{Flex, Level, Output, Speed};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::mode::Blocking;
use embassy_stm32::time::Hertz;
use handheld_core::control::{ControlConfig, ControlLoop, Peripherals};
use handheld_core::hal::Board;
use handheld_core::input::ALL_BUTTONS;

use crate::hw::clock::EmbassyClock;
use crate::hw::display::DefmtRenderer;
use crate::hw::gpio::{Backlight, ButtonPin, StatusLed};
use crate::hw::mpu6886::Mpu6886;
use crate::hw::noise::NoiseAdc;
use crate::telemetry;

mod control_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Concrete peripheral set for the STM32G0 handheld.
pub struct FirmwareBoard;

impl Board for FirmwareBoard {
    type Clock = EmbassyClock;
    type Input = ButtonPin<'static>;
    type Backlight = Backlight<'static>;
    type Motion = Mpu6886<I2c<'static, Blocking>>;
    type Noise = NoiseAdc<'static>;
    type Renderer = DefmtRenderer;
    type Decoration = StatusLed<'static>;
}

pub type FirmwareControl = ControlLoop<FirmwareBoard>;

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA5,
        PA8,
        PB3,
        PB4,
        PB5,
        PB8,
        PB9,
        ADC1,
        I2C1,
        ..
    } = hal::init(config);

    let i2c = I2c::new_blocking(I2C1, PB8, PB9, Hertz(400_000), i2c::Config::default());
    let motion = Mpu6886::new_with_default_address(i2c).expect("MPU6886 init");

    let peripherals = Peripherals::<FirmwareBoard> {
        clock: EmbassyClock,
        buttons: [
            ButtonPin::new(Flex::new(PB3)),
            ButtonPin::new(Flex::new(PB4)),
            ButtonPin::new(Flex::new(PB5)),
        ],
        backlight: Backlight::new(Output::new(PA8, Level::Low, Speed::Low)),
        motion,
        noise: NoiseAdc::new(Adc::new(ADC1), PA0.degrade_adc()),
        renderer: DefmtRenderer,
        decoration: StatusLed::new(Output::new(PA5, Level::Low, Speed::Low)),
    };

    let mut control = FirmwareControl::new(peripherals, ControlConfig::default());
    for line in ALL_BUTTONS {
        control.on_button(line.id, telemetry::button_changed, line.id);
    }
    control.initialize();
    defmt::info!("handheld: control loop initialised");

    spawner
        .spawn(control_task::run(control))
        .expect("failed to spawn control task");

    core::future::pending::<()>().await;
}
