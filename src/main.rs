//! sensorlog - ESP32-S3 固件入口
//!
//! 混合调度:
//! - 高优先级 InterruptExecutor: 看门狗 (必须能抢占另外两个任务)
//! - 中优先级 InterruptExecutor: 生产者 (1 tick 采样周期)
//! - 主执行器 (线程模式): 消费者 (Flash 写入可能较慢)
//!
//! 硬件目标: ESP32-S3-N16R8 (双核 Xtensa LX7 @ 240MHz, 16MB Flash, 8MB PSRAM)

#![no_std]
#![no_main]

esp_bootloader_esp_idf::esp_app_desc!();

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::{
    interrupt::{software::SoftwareInterruptControl, Priority},
    timer::timg::TimerGroup,
};
use esp_rtos::embassy::InterruptExecutor;
use esp_storage::FlashStorage;
use static_cell::StaticCell;

use sensorlog::fs::{FlashLog, FlashLogConfig};
use sensorlog::sensor::SimulatedSensor;
use sensorlog::tasks::{Consumer, LivenessMonitor, PipelineResources, Producer};
use sensorlog::{PipelineConfig, SystemClock};

// ===== 条件编译日志 =====
#[allow(unused_imports)]
use sensorlog::util::log::*;

#[cfg(feature = "log-defmt")]
use defmt_rtt as _;

// ===== Panic Handler =====
#[cfg(any(feature = "dev", feature = "log-println"))]
use esp_backtrace as _;

#[cfg(not(any(feature = "dev", feature = "log-println")))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {
        core::hint::spin_loop();
    }
}

// ===== 静态分配 =====
/// 高优先级执行器 - 看门狗
static HIGH_PRIO_EXECUTOR: StaticCell<InterruptExecutor<2>> = StaticCell::new();

/// 中优先级执行器 - 生产者
static MID_PRIO_EXECUTOR: StaticCell<InterruptExecutor<1>> = StaticCell::new();

/// 任务间共享资源
static RESOURCES: StaticCell<PipelineResources> = StaticCell::new();

// ===== 任务 =====

/// 看门狗任务 (高优先级)
#[embassy_executor::task]
async fn watchdog_task(resources: &'static PipelineResources) {
    let mut monitor = LivenessMonitor::new(resources, &PipelineConfig::default());
    monitor.run().await
}

/// 生产者任务 (中优先级)
#[embassy_executor::task]
async fn producer_task(resources: &'static PipelineResources) {
    let mut producer = Producer::new(
        SimulatedSensor::default(),
        resources,
        &PipelineConfig::default(),
    );
    producer.run().await
}

/// 消费者任务 (主执行器)
#[embassy_executor::task]
async fn consumer_task(resources: &'static PipelineResources, flash: FlashStorage<'static>) {
    let log = match FlashLog::mount(flash, FlashLogConfig::default()) {
        Ok(log) => log,
        Err(e) => {
            // 不签到，看门狗会持续报告消费者停滞
            log_error!("Log partition mount failed: {}", e);
            loop {
                Timer::after(Duration::from_secs(60)).await;
            }
        }
    };

    log_info!("Log mounted: {} / {} bytes used", log.len(), log.capacity());

    let mut consumer = Consumer::new(log, SystemClock, resources, &PipelineConfig::default());
    consumer.run().await
}

// ===== 主入口点 =====
#[esp_rtos::main]
async fn main(low_prio_spawner: Spawner) {
    // ========================================
    // 1. 硬件初始化
    // ========================================
    let peripherals = esp_hal::init(esp_hal::Config::default());
    esp_alloc::heap_allocator!(size: 32 * 1024);

    log_info!("{} v{} starting on ESP32-S3", sensorlog::NAME, sensorlog::VERSION);

    // ========================================
    // 2. 时间驱动 + 软件中断
    // ========================================
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_ints = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);

    esp_rtos::start(timg0.timer0);

    log_info!("esp-rtos started");

    // ========================================
    // 3. 共享资源
    // ========================================
    let resources: &'static PipelineResources = RESOURCES.init(PipelineResources::new());

    // ========================================
    // 4. 高优先级执行器 - 看门狗
    // ========================================
    let high_prio_executor = InterruptExecutor::new(sw_ints.software_interrupt2);
    let high_prio_executor = HIGH_PRIO_EXECUTOR.init(high_prio_executor);
    let high_prio_spawner = high_prio_executor.start(Priority::Priority3);

    high_prio_spawner.must_spawn(watchdog_task(resources));
    log_info!("High priority executor started (Priority3)");

    // ========================================
    // 5. 中优先级执行器 - 生产者
    // ========================================
    let mid_prio_executor = InterruptExecutor::new(sw_ints.software_interrupt1);
    let mid_prio_executor = MID_PRIO_EXECUTOR.init(mid_prio_executor);
    let mid_prio_spawner = mid_prio_executor.start(Priority::Priority2);

    mid_prio_spawner.must_spawn(producer_task(resources));
    log_info!("Mid priority executor started (Priority2)");

    // ========================================
    // 6. 主执行器 - 消费者
    // ========================================
    let flash = FlashStorage::new(peripherals.FLASH);
    low_prio_spawner.must_spawn(consumer_task(resources, flash));

    log_info!("All tasks spawned");

    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}
